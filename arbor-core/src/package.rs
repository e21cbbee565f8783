//! Package data model.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Directory that holds every package in the conventional workspace layout.
pub const CONVENTIONAL_PACKAGES_DIR: &str = "packages/node_modules";

/// A named package discovered in the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Package {
    /// Name declared in the package's manifest.
    pub name: String,
    /// Workspace-relative directory containing the manifest.
    pub path: PathBuf,
}

impl Package {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Absolute directory of the package under `root`.
    #[inline]
    pub fn absolute_path(&self, root: &Path) -> PathBuf {
        root.join(&self.path)
    }

    /// Whether the package lives under the shared `packages/node_modules` directory.
    pub fn is_conventional(&self) -> bool {
        self.path.starts_with(CONVENTIONAL_PACKAGES_DIR)
    }
}
