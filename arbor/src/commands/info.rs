//! Workspace setup and inspection commands.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use arbor_core::config::CONFIG_FILE;
use arbor_core::manifest::MANIFEST_FILE;
use arbor_core::{find_workspace_root, Error, WorkspaceConfig};

use crate::formatting::{print_key_value, print_section_header, print_success, SectionStyle};

use super::Workspace;

/// Prints every package name, sorted, one per line.
pub fn cmd_list(mut ws: Workspace, json: bool) -> Result<()> {
    let names = ws.registry.list_all()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else {
        for name in names {
            println!("{}", name);
        }
    }

    Ok(())
}

/// Writes `.arborrc` at the workspace root.
///
/// A directory with a `package.json` but no `.git` is accepted as the root
/// when nothing above it qualifies, so a fresh repository can be initialized.
pub fn cmd_init(force: bool, scripts: Vec<String>, silent: bool) -> Result<()> {
    let cwd = env::current_dir().context("Failed to read the current directory")?;
    let root = init_root(cwd)?;

    let path = root.join(CONFIG_FILE);
    if path.exists() && !force {
        return Err(Error::AlreadyConfigured(path).into());
    }

    let config = WorkspaceConfig::with_script_pairs(&scripts)?;
    let path = config.save(&root)?;

    if !silent {
        print_section_header("Initialized arbor", SectionStyle::Success);
        print_key_value("Config", &path.display().to_string());
        for (name, command) in &config.scripts {
            print_key_value(name, command);
        }
        println!();
        print_success(&format!("Wrote {}", CONFIG_FILE));
    }

    Ok(())
}

fn init_root(cwd: PathBuf) -> Result<PathBuf> {
    match find_workspace_root(&cwd) {
        Ok(root) => Ok(root),
        Err(_) if cwd.join(MANIFEST_FILE).is_file() => Ok(cwd),
        Err(e) => Err(e.into()),
    }
}
