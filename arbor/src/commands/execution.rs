//! Commands that spawn processes in package directories.

use anyhow::{anyhow, Result};
use clap::Parser;

use arbor_core::{CommandValidator, Executor, ScriptOutcome};

use crate::formatting::print_warning;
use crate::TargetArgs;

use super::{for_each_package, Action, Workspace};

const EXEC: Action = Action {
    title: "Running command",
    verb: "run command in",
    done: "Ran command in",
    progress: false,
};

const RUN: Action = Action {
    title: "Running script",
    verb: "run script in",
    done: "Ran script in",
    progress: false,
};

pub fn cmd_exec(mut ws: Workspace, targets: &TargetArgs, command: &[String], no_shell: bool) -> Result<()> {
    let command = command.join(" ");
    let validator = if no_shell {
        CommandValidator::strict()
    } else {
        CommandValidator::new()
    };
    validator.validate(&command)?;

    let executor = Executor::new(&ws.root, ws.config.clone()).with_validator(validator);
    for_each_package(&mut ws, targets, &EXEC, |package| executor.exec(package, &command))
}

pub fn cmd_run(mut ws: Workspace, targets: &TargetArgs, script: &str, args: &[String]) -> Result<()> {
    let executor = Executor::new(&ws.root, ws.config.clone());
    let mut skipped = Vec::new();

    let result = for_each_package(&mut ws, targets, &RUN, |package| {
        if executor.run_script(package, script, args)? == ScriptOutcome::Skipped {
            skipped.push(package.name.clone());
        }
        Ok(())
    });

    if !ws.silent && !skipped.is_empty() {
        print_warning(&format!(
            "Skipped packages without a \"{}\" script: {}",
            script,
            skipped.join(", ")
        ));
    }

    result
}

/// Arguments accepted after a script name from `.arborrc`.
#[derive(Parser)]
struct ScriptArgs {
    #[command(flatten)]
    targets: TargetArgs,
    /// Arguments passed through to the script
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

/// Runs `arbor <script>` for a script defined in `.arborrc`.
pub fn cmd_config_script(ws: Workspace, argv: Vec<String>) -> Result<()> {
    let mut argv = argv.into_iter();
    let script = argv.next().ok_or_else(|| anyhow!("No command given"))?;

    if ws.config.script(&script).is_none() {
        let known: Vec<&str> = ws.config.scripts.keys().map(String::as_str).collect();
        anyhow::bail!(
            "Unknown command \"{}\". Scripts defined in .arborrc: {}",
            script,
            if known.is_empty() { "(none)".to_string() } else { known.join(", ") }
        );
    }

    let parsed = ScriptArgs::try_parse_from(std::iter::once(script.clone()).chain(argv))?;
    cmd_run(ws, &parsed.targets, &script, &parsed.args)
}
