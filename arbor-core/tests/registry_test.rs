use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use arbor_core::config::DEFAULT_INCLUDE;
use arbor_core::error::Error;
use arbor_core::registry::PackageRegistry;

fn create_package(root: &Path, dir: &str, name: &str) {
    let pkg_dir = root.join(dir);
    fs::create_dir_all(&pkg_dir).unwrap();
    fs::write(
        pkg_dir.join("package.json"),
        format!("{{\n  \"name\": \"{}\",\n  \"version\": \"1.0.0\"\n}}\n", name),
    )
    .unwrap();
}

fn conventional(root: &Path) -> PackageRegistry {
    PackageRegistry::new(root, vec![DEFAULT_INCLUDE.to_string()])
}

#[test]
fn test_discover_conventional_layout() {
    let temp = TempDir::new().unwrap();
    create_package(temp.path(), "packages/node_modules/foo", "foo");
    create_package(temp.path(), "packages/node_modules/@scope/bar", "@scope/bar");

    let mut registry = conventional(temp.path());
    assert_eq!(registry.list_all().unwrap(), vec!["@scope/bar", "foo"]);
    assert!(registry.is_package("foo").unwrap());
    assert!(!registry.is_package("baz").unwrap());
    assert_eq!(
        registry.path_of("@scope/bar").unwrap(),
        PathBuf::from("packages/node_modules/@scope/bar")
    );
}

#[test]
fn test_name_comes_from_manifest_not_directory() {
    let temp = TempDir::new().unwrap();
    create_package(temp.path(), "packages/node_modules/some-dir", "actual-name");

    let mut registry = conventional(temp.path());
    assert_eq!(registry.list_all().unwrap(), vec!["actual-name"]);
    assert_eq!(
        registry
            .name_at(Path::new("packages/node_modules/some-dir"))
            .unwrap()
            .as_deref(),
        Some("actual-name")
    );
}

#[test]
fn test_duplicate_names_fail_discovery() {
    let temp = TempDir::new().unwrap();
    create_package(temp.path(), "packages/node_modules/one", "foo");
    create_package(temp.path(), "packages/node_modules/two", "foo");

    let mut registry = conventional(temp.path());
    let err = registry.discover().unwrap_err();
    assert!(matches!(err, Error::DuplicatePackage { name, .. } if name == "foo"));
}

#[test]
fn test_unknown_package_lists_available() {
    let temp = TempDir::new().unwrap();
    create_package(temp.path(), "packages/node_modules/foo", "foo");

    let mut registry = conventional(temp.path());
    let err = registry.path_of("nope").unwrap_err();
    assert!(matches!(err, Error::UnknownPackage { name, available } if name == "nope" && available == "foo"));
}

#[test]
fn test_unparseable_manifest_fails_discovery() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("packages/node_modules/broken");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("package.json"), "{ not json").unwrap();

    let mut registry = conventional(temp.path());
    assert!(matches!(
        registry.discover().unwrap_err(),
        Error::ManifestParse { .. }
    ));
}

#[test]
fn test_custom_include_globs() {
    let temp = TempDir::new().unwrap();
    create_package(temp.path(), "frontend/web", "web");
    create_package(temp.path(), "backend/api", "api");
    create_package(temp.path(), "tools/ignored", "ignored");

    let mut registry = PackageRegistry::new(temp.path(), vec!["{frontend,backend}/*".to_string()]);
    assert_eq!(registry.list_all().unwrap(), vec!["api", "web"]);
    let packages = registry.packages().unwrap();
    assert_eq!(packages[0].path, PathBuf::from("backend/api"));
    assert!(!packages[0].is_conventional());
}

#[test]
fn test_resolve_targets_explicit_names_are_sorted() {
    let temp = TempDir::new().unwrap();
    create_package(temp.path(), "packages/node_modules/a", "a");
    create_package(temp.path(), "packages/node_modules/b", "b");

    let mut registry = conventional(temp.path());
    let targets = registry
        .resolve_targets(&["b".to_string(), "a".to_string(), "b".to_string()], temp.path())
        .unwrap();
    assert_eq!(targets, vec!["a", "b"]);
}

#[test]
fn test_resolve_targets_infers_from_cwd() {
    let temp = TempDir::new().unwrap();
    create_package(temp.path(), "packages/node_modules/a", "a");
    create_package(temp.path(), "packages/node_modules/b", "b");
    let nested = temp.path().join("packages/node_modules/b/src/lib");
    fs::create_dir_all(&nested).unwrap();

    let mut registry = conventional(temp.path());
    assert_eq!(registry.resolve_targets(&[], &nested).unwrap(), vec!["b"]);
    assert_eq!(
        registry
            .resolve_targets(&[], &temp.path().join("packages/node_modules/a"))
            .unwrap(),
        vec!["a"]
    );
}

#[test]
fn test_resolve_targets_falls_back_to_all() {
    let temp = TempDir::new().unwrap();
    create_package(temp.path(), "packages/node_modules/b", "b");
    create_package(temp.path(), "packages/node_modules/a", "a");

    let mut registry = conventional(temp.path());
    assert_eq!(registry.resolve_targets(&[], temp.path()).unwrap(), vec!["a", "b"]);
}

#[test]
fn test_discovery_runs_once_until_reset() {
    let temp = TempDir::new().unwrap();
    create_package(temp.path(), "packages/node_modules/a", "a");

    let mut registry = conventional(temp.path());
    assert_eq!(registry.list_all().unwrap(), vec!["a"]);

    create_package(temp.path(), "packages/node_modules/b", "b");
    assert_eq!(registry.list_all().unwrap(), vec!["a"]);

    registry.reset();
    assert_eq!(registry.list_all().unwrap(), vec!["a", "b"]);
}
