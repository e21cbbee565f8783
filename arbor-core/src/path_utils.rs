//! Shared path utilities.

use std::path::{Component, Path, PathBuf};

/// Lexically normalizes a path, folding `.` and `..` components.
///
/// Does not touch the filesystem, so symlinks are not resolved. A `..` that
/// would climb above the root (or above the start of a relative path) is kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Returns a relative path that climbs out of `relative_dir`, one `..` per segment.
///
/// `packages/node_modules/foo` yields `../../..`.
pub fn descender(relative_dir: &Path) -> PathBuf {
    relative_dir
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .map(|_| Component::ParentDir)
        .collect()
}

/// Renders a path with forward slashes, as manifests expect.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::CurDir => Some(".".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
