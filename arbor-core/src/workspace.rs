//! Workspace root discovery.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::CONFIG_FILE;
use crate::error::{Error, Result};
use crate::manifest::MANIFEST_FILE;

/// Walks up from `start` to the monorepo root.
///
/// The root is the first directory holding a `package.json` alongside either
/// an `.arborrc` or a `.git` entry.
pub fn find_workspace_root(start: impl AsRef<Path>) -> Result<PathBuf> {
    let start = start.as_ref();
    let mut current = Some(start);

    while let Some(dir) = current {
        if is_workspace_root(dir) {
            debug!(root = %dir.display(), "found workspace root");
            return Ok(dir.to_path_buf());
        }
        current = dir.parent();
    }

    Err(Error::WorkspaceRootNotFound(start.to_path_buf()))
}

fn is_workspace_root(dir: &Path) -> bool {
    if !dir.join(MANIFEST_FILE).is_file() {
        return false;
    }
    dir.join(CONFIG_FILE).exists() || dir.join(".git").exists()
}
