//! Generating package dependency maps from their imports.

use std::path::Path;

use tracing::{debug, info, trace};

use crate::error::{Error, Result};
use crate::manifest::{Manifest, DEPENDENCIES};
use crate::package::Package;
use crate::path_utils::{descender, to_slash};
use crate::resolver::DependencyResolver;

/// Modules provided by the Node runtime, never declared as dependencies.
pub const NODE_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

pub fn is_builtin(module: &str) -> bool {
    module.starts_with("node:") || NODE_BUILTINS.contains(&module)
}

/// External modules imported by `package`, sorted.
pub fn list(resolver: &mut DependencyResolver<'_>, package: &Package) -> Result<Vec<String>> {
    resolver.resolve(package)
}

/// Rewrites the `dependencies` of `package` from what its sources import.
///
/// Versions come from the root manifest. Returns the map that was written.
pub fn generate(
    root: &Path,
    resolver: &mut DependencyResolver<'_>,
    package: &Package,
) -> Result<Vec<(String, String)>> {
    let imported = list(resolver, package)?;
    let root_manifest = Manifest::read_in(root)?;
    let versioned = attach_versions(&root_manifest, package, &imported)?;

    let dir = package.absolute_path(root);
    let mut manifest = Manifest::read_in(&dir)?;
    manifest.set_dependency_map(DEPENDENCIES, versioned.clone());
    manifest.write_in(&dir)?;

    info!(package = %package.name, count = versioned.len(), "generated dependencies");
    Ok(versioned)
}

/// Pairs each imported module with the version the root manifest declares.
///
/// Builtins and self-imports are dropped. A root `file:` reference is
/// rewritten so it stays valid from inside the package directory.
pub fn attach_versions(
    root_manifest: &Manifest,
    package: &Package,
    imported: &[String],
) -> Result<Vec<(String, String)>> {
    debug!(package = %package.name, "adding versions to dependencies");
    let climb = descender(&package.path);
    let mut versioned = Vec::with_capacity(imported.len());

    for dependency in imported {
        if is_builtin(dependency) || *dependency == package.name {
            trace!(%dependency, "skipping");
            continue;
        }

        let version = root_manifest
            .dependency(dependency)
            .ok_or_else(|| Error::MissingRootDependency {
                package: package.name.clone(),
                dependency: dependency.clone(),
            })?;

        let version = match version.strip_prefix("file:") {
            Some(local) => {
                let relative = climb.join(local.trim_start_matches('/'));
                let rewritten = format!("file:{}", to_slash(&relative));
                debug!(%dependency, from = version, to = %rewritten, "rewrote local path");
                rewritten
            }
            None => version.to_string(),
        };
        versioned.push((dependency.clone(), version));
    }

    Ok(versioned)
}
