//! Moving package dependencies into the root manifest.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::manifest::{Manifest, DEPENDENCIES, DEV_DEPENDENCIES};
use crate::package::Package;
use crate::path_utils::to_slash;
use crate::version::reconcile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoistOptions {
    /// Reconcile differing ranges instead of refusing them.
    pub risky: bool,
}

/// What a hoist changed in the root manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoistReport {
    pub package: String,
    /// Dependencies the root did not declare before.
    pub added: Vec<String>,
    /// Dependencies whose root range was replaced by a reconciled one.
    pub updated: Vec<String>,
    /// Whether a `file:` reference to the package itself was written.
    pub linked: bool,
}

/// Hoists package dependencies into `<root>/package.json`.
pub struct Hoister {
    root: PathBuf,
    options: HoistOptions,
}

impl Hoister {
    pub fn new(root: impl Into<PathBuf>, options: HoistOptions) -> Self {
        Self {
            root: root.into(),
            options,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Hoists one package.
    ///
    /// Both manifests are rewritten only when every dependency merged cleanly;
    /// on a conflict neither file is touched.
    pub fn hoist(&self, package: &Package) -> Result<HoistReport> {
        let dir = package.absolute_path(&self.root);
        let mut package_manifest = Manifest::read_in(&dir)?;
        let mut root_manifest = Manifest::read_in(&self.root)?;

        let report = self.merge(package, &mut package_manifest, &mut root_manifest)?;

        root_manifest.write_in(&self.root)?;
        package_manifest.write_in(&dir)?;

        info!(
            package = %package.name,
            added = report.added.len(),
            updated = report.updated.len(),
            "hoisted dependencies"
        );
        Ok(report)
    }

    /// Applies the hoist to in-memory manifests.
    ///
    /// On error the manifests may be partially modified; callers must discard them.
    pub fn merge(
        &self,
        package: &Package,
        package_manifest: &mut Manifest,
        root_manifest: &mut Manifest,
    ) -> Result<HoistReport> {
        let mut incoming: IndexMap<String, String> = IndexMap::new();
        incoming.extend(package_manifest.dependency_map(DEPENDENCIES));
        incoming.extend(package_manifest.dependency_map(DEV_DEPENDENCIES));

        let mut root_deps: IndexMap<String, String> =
            root_manifest.dependencies().into_iter().collect();
        let mut report = HoistReport {
            package: package.name.clone(),
            ..Default::default()
        };

        for (dependency, version) in incoming {
            let Some(existing) = root_deps.get(&dependency) else {
                debug!(%dependency, %version, "adopting");
                report.added.push(dependency.clone());
                root_deps.insert(dependency, version);
                continue;
            };

            if *existing == version {
                continue;
            }

            if !self.options.risky {
                return Err(Error::Conflict {
                    package: package.name.clone(),
                    dependency,
                    existing: existing.clone(),
                    incoming: version,
                    reason: "versions differ. Pass --risky to reconcile them".to_string(),
                });
            }

            let reconciled = reconcile(Some(existing.as_str()), Some(version.as_str())).map_err(|e| {
                Error::Conflict {
                    package: package.name.clone(),
                    dependency: dependency.clone(),
                    existing: existing.clone(),
                    incoming: version.clone(),
                    reason: e.to_string(),
                }
            })?;

            if reconciled != *existing {
                debug!(%dependency, from = %existing, to = %reconciled, "reconciled");
                report.updated.push(dependency.clone());
                root_deps.insert(dependency, reconciled);
            }
        }

        package_manifest.remove(DEPENDENCIES);
        package_manifest.remove(DEV_DEPENDENCIES);

        if !package.is_conventional() {
            let link = format!("file:./{}", to_slash(&package.path));
            debug!(package = %package.name, %link, "linking package from root");
            root_deps.insert(package.name.clone(), link);
            report.linked = true;
        }

        root_deps.sort_keys();
        root_manifest.set_dependency_map(DEPENDENCIES, root_deps);

        Ok(report)
    }
}
