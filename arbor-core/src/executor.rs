//! Running commands and scripts inside package directories.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::command_validator::CommandValidator;
use crate::config::WorkspaceConfig;
use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::package::Package;
use crate::path_utils::to_slash;
use crate::process::{self, shell_quote, SpawnOptions};

pub const ENV_PACKAGE_NAME: &str = "ARBOR_PACKAGE_NAME";
pub const ENV_PACKAGE_ABS_PATH: &str = "ARBOR_PACKAGE_ABS_PATH";
pub const ENV_PACKAGE_REL_PATH: &str = "ARBOR_PACKAGE_REL_PATH";
pub const ENV_ROOT_PATH: &str = "ARBOR_ROOT_PATH";

/// Where a script was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptSource {
    /// The package's own `scripts`, run through npm.
    Manifest,
    /// The workspace `.arborrc`, run through the shell.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptOutcome {
    Ran(ScriptSource),
    /// Neither the package nor the workspace defines the script.
    Skipped,
}

/// Environment injected into every child process for `package`.
pub fn package_env(root: &Path, package: &Package) -> Vec<(String, String)> {
    vec![
        (ENV_PACKAGE_NAME.to_string(), package.name.clone()),
        (
            ENV_PACKAGE_ABS_PATH.to_string(),
            package.absolute_path(root).to_string_lossy().into_owned(),
        ),
        (ENV_PACKAGE_REL_PATH.to_string(), to_slash(&package.path)),
        (ENV_ROOT_PATH.to_string(), root.to_string_lossy().into_owned()),
    ]
}

pub struct Executor {
    root: PathBuf,
    config: WorkspaceConfig,
    validator: CommandValidator,
}

impl Executor {
    pub fn new(root: impl Into<PathBuf>, config: WorkspaceConfig) -> Self {
        Self {
            root: root.into(),
            config,
            validator: CommandValidator::new(),
        }
    }

    pub fn with_validator(mut self, validator: CommandValidator) -> Self {
        self.validator = validator;
        self
    }

    fn options(&self, package: &Package) -> SpawnOptions {
        SpawnOptions {
            cwd: Some(package.absolute_path(&self.root)),
            env: package_env(&self.root, package),
        }
    }

    /// Runs `command` through `sh -c` in the package directory.
    pub fn exec(&self, package: &Package, command: &str) -> Result<()> {
        self.validator.validate(command)?;
        debug!(package = %package.name, %command, "running command");

        let args = vec!["-c".to_string(), command.to_string()];
        process::spawn("sh", &args, &self.options(package))
            .map_err(|e| with_package(e, package, command))
    }

    /// Runs the script `name` for `package`.
    ///
    /// A script in the package manifest takes precedence and runs via
    /// `npm run`. Otherwise a script of the same name in `.arborrc` runs via
    /// the shell with `args` appended. Packages defining neither are skipped.
    pub fn run_script(&self, package: &Package, name: &str, args: &[String]) -> Result<ScriptOutcome> {
        let manifest = Manifest::read_in(package.absolute_path(&self.root))?;

        if manifest.script(name).is_some() {
            info!(package = %package.name, script = name, "running package script");
            let mut npm_args = vec!["run".to_string(), name.to_string()];
            if !args.is_empty() {
                npm_args.push("--".to_string());
                npm_args.extend(args.iter().cloned());
            }
            process::spawn("npm", &npm_args, &self.options(package))
                .map_err(|e| with_package(e, package, name))?;
            return Ok(ScriptOutcome::Ran(ScriptSource::Manifest));
        }

        if let Some(script) = self.config.script(name) {
            info!(package = %package.name, script = name, "running workspace script");
            let command = std::iter::once(script.to_string())
                .chain(args.iter().map(|a| shell_quote(a)))
                .collect::<Vec<_>>()
                .join(" ");
            self.exec(package, &command)?;
            return Ok(ScriptOutcome::Ran(ScriptSource::Config));
        }

        debug!(package = %package.name, script = name, "script not defined, skipping");
        Ok(ScriptOutcome::Skipped)
    }
}

/// Attaches package context to a failure to start the child.
fn with_package(error: Error, package: &Package, command: &str) -> Error {
    match error {
        Error::Io(e) => Error::Execution {
            package: package.name.clone(),
            command: command.to_string(),
            message: e.to_string(),
        },
        other => other,
    }
}
