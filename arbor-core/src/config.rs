//! Workspace configuration read from `.arborrc`.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

pub const CONFIG_FILE: &str = ".arborrc";

/// Package directories of a workspace that keeps every package under
/// `packages/node_modules`, scoped or not.
pub const DEFAULT_INCLUDE: &str = "packages/node_modules/{*,@*/*}";

/// One glob or a list of globs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Include {
    One(String),
    Many(Vec<String>),
}

/// Workspace-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Named shell scripts runnable in every package.
    #[serde(default)]
    pub scripts: IndexMap<String, String>,
    /// Globs, relative to the workspace root, matching package directories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Include>,
}

impl WorkspaceConfig {
    /// Loads `.arborrc` from `root`, falling back to defaults when it is absent.
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let path = root.as_ref().join(CONFIG_FILE);
        if !path.exists() {
            debug!(root = %root.as_ref().display(), "no .arborrc found");
            return Ok(Self::default());
        }

        debug!(path = %path.display(), "loading .arborrc");
        let content = fs::read_to_string(&path)?;
        Self::parse(&content, &path)
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Writes the config to `<root>/.arborrc`.
    pub fn save(&self, root: impl AsRef<Path>) -> Result<PathBuf> {
        let path = root.as_ref().join(CONFIG_FILE);
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Include globs, or the conventional layout when none are configured.
    pub fn include_patterns(&self) -> Vec<String> {
        match &self.include {
            Some(Include::One(pattern)) => vec![pattern.clone()],
            Some(Include::Many(patterns)) if !patterns.is_empty() => patterns.clone(),
            _ => vec![DEFAULT_INCLUDE.to_string()],
        }
    }

    pub fn script(&self, name: &str) -> Option<&str> {
        self.scripts.get(name).map(String::as_str)
    }

    /// Builds the scripts table from `name=command` pairs.
    ///
    /// Only the first `=` separates, so commands may contain `=` themselves.
    pub fn with_script_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut scripts = IndexMap::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (name, command) = pair.split_once('=').ok_or_else(|| Error::Config {
                path: PathBuf::from(CONFIG_FILE),
                message: format!("script \"{}\" must look like name=command", pair),
            })?;
            if name.is_empty() || command.is_empty() {
                return Err(Error::Config {
                    path: PathBuf::from(CONFIG_FILE),
                    message: format!("script \"{}\" must look like name=command", pair),
                });
            }
            scripts.insert(name.to_string(), command.to_string());
        }
        Ok(Self {
            scripts,
            include: None,
        })
    }
}
