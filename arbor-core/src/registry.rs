//! Package discovery and the name/path index.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::manifest::{Manifest, MANIFEST_FILE};
use crate::package::Package;

/// Index of every package in the workspace.
///
/// Discovery runs once, lazily, on the first query. `reset` clears the index
/// so the next query rescans.
#[derive(Debug)]
pub struct PackageRegistry {
    root: PathBuf,
    include: Vec<String>,
    by_name: HashMap<String, PathBuf>,
    by_path: HashMap<PathBuf, String>,
    discovered: bool,
}

impl PackageRegistry {
    /// Creates a registry over `root` scanning the given include globs.
    pub fn new(root: impl Into<PathBuf>, include: Vec<String>) -> Self {
        Self {
            root: root.into(),
            include,
            by_name: HashMap::new(),
            by_path: HashMap::new(),
            discovered: false,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scans the include globs for manifests and indexes them by name.
    ///
    /// A no-op after the first successful call until `reset`.
    pub fn discover(&mut self) -> Result<()> {
        if self.discovered {
            return Ok(());
        }

        let mut by_name: HashMap<String, PathBuf> = HashMap::new();
        let mut by_path: HashMap<PathBuf, String> = HashMap::new();

        for relative in self.find_package_dirs()? {
            if by_path.contains_key(&relative) {
                continue;
            }
            let manifest = Manifest::read(self.root.join(&relative).join(MANIFEST_FILE))?;
            let name = manifest
                .name()
                .ok_or_else(|| Error::UnnamedPackage(relative.join(MANIFEST_FILE)))?
                .to_string();

            if let Some(existing) = by_name.get(&name) {
                return Err(Error::DuplicatePackage {
                    name,
                    first: existing.clone(),
                    second: relative,
                });
            }

            trace!(package = %name, path = %relative.display(), "indexed package");
            by_path.insert(relative.clone(), name.clone());
            by_name.insert(name, relative);
        }

        debug!(count = by_name.len(), "discovered packages");
        self.by_name = by_name;
        self.by_path = by_path;
        self.discovered = true;
        Ok(())
    }

    fn find_package_dirs(&self) -> Result<Vec<PathBuf>> {
        let escaped_root = glob::Pattern::escape(&self.root.to_string_lossy());
        let mut dirs = Vec::new();

        for include in &self.include {
            for pattern in expand_braces(include) {
                let full = format!(
                    "{}/{}/{}",
                    escaped_root.trim_end_matches('/'),
                    pattern.trim_matches('/'),
                    MANIFEST_FILE
                );
                trace!(pattern = %full, "globbing for manifests");
                let entries = glob::glob(&full).map_err(|e| Error::Glob {
                    pattern: include.clone(),
                    message: e.to_string(),
                })?;
                for entry in entries {
                    let manifest_path = entry.map_err(|e| Error::Io(e.into()))?;
                    let Some(dir) = manifest_path.parent() else {
                        continue;
                    };
                    let relative = dir.strip_prefix(&self.root).unwrap_or(dir).to_path_buf();
                    dirs.push(relative);
                }
            }
        }

        dirs.sort();
        Ok(dirs)
    }

    /// Whether `name` identifies a known package.
    pub fn is_package(&mut self, name: &str) -> Result<bool> {
        self.discover()?;
        Ok(self.by_name.contains_key(name))
    }

    /// Workspace-relative directory of `name`.
    pub fn path_of(&mut self, name: &str) -> Result<PathBuf> {
        self.discover()?;
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownPackage {
                name: name.to_string(),
                available: self.sorted_names().join(", "),
            })
    }

    /// Looks up a package by name.
    pub fn get(&mut self, name: &str) -> Result<Package> {
        let path = self.path_of(name)?;
        Ok(Package::new(name, path))
    }

    /// Name of the package rooted at the workspace-relative `path`, if any.
    pub fn name_at(&mut self, path: &Path) -> Result<Option<String>> {
        self.discover()?;
        Ok(self.by_path.get(path).cloned())
    }

    /// All package names, sorted.
    pub fn list_all(&mut self) -> Result<Vec<String>> {
        self.discover()?;
        Ok(self.sorted_names())
    }

    /// All packages, sorted by name.
    pub fn packages(&mut self) -> Result<Vec<Package>> {
        self.discover()?;
        let mut packages: Vec<Package> = self
            .by_name
            .iter()
            .map(|(name, path)| Package::new(name.clone(), path.clone()))
            .collect();
        packages.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(packages)
    }

    /// Picks the packages a command should act on.
    ///
    /// Explicit names win. Without them, a `cwd` inside a package directory
    /// selects that package alone. Otherwise every package is selected.
    pub fn resolve_targets(&mut self, explicit: &[String], cwd: &Path) -> Result<Vec<String>> {
        if !explicit.is_empty() {
            let mut names = explicit.to_vec();
            names.sort();
            names.dedup();
            debug!(packages = ?names, "using explicitly requested packages");
            return Ok(names);
        }

        if let Some(name) = self.infer_from_cwd(cwd)? {
            debug!(package = %name, cwd = %cwd.display(), "inferred package from working directory");
            return Ok(vec![name]);
        }

        self.list_all()
    }

    fn infer_from_cwd(&mut self, cwd: &Path) -> Result<Option<String>> {
        self.discover()?;
        let Ok(relative) = cwd.strip_prefix(&self.root) else {
            return Ok(None);
        };

        // Nested packages: the deepest containing directory wins.
        Ok(self
            .by_path
            .iter()
            .filter(|(path, _)| relative.starts_with(path))
            .max_by_key(|(path, _)| path.components().count())
            .map(|(_, name)| name.clone()))
    }

    /// Clears the index and the discovery flag.
    pub fn reset(&mut self) {
        self.by_name.clear();
        self.by_path.clear();
        self.discovered = false;
    }

    fn sorted_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.by_name.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Expands shell-style `{a,b}` alternations, which `glob` does not support.
///
/// Nested groups are expanded recursively: `x/{a,@*/{b,c}}` yields
/// `x/a`, `x/@*/b` and `x/@*/c`.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };

    let mut depth = 0;
    let mut close = None;
    let mut splits = Vec::new();
    for (i, c) in pattern[open..].char_indices() {
        let at = open + i;
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(at);
                    break;
                }
            }
            ',' if depth == 1 => splits.push(at),
            _ => {}
        }
    }

    let Some(close) = close else {
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];
    let mut bounds = vec![open];
    bounds.extend(splits);
    bounds.push(close);

    bounds
        .windows(2)
        .flat_map(|w| {
            let alternative = &pattern[w[0] + 1..w[1]];
            expand_braces(&format!("{}{}{}", prefix, alternative, suffix))
        })
        .collect()
}
