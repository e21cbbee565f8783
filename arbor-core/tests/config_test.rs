use std::fs;
use std::path::Path;

use tempfile::TempDir;

use arbor_core::config::{Include, WorkspaceConfig, CONFIG_FILE, DEFAULT_INCLUDE};
use arbor_core::error::Error;
use arbor_core::workspace::find_workspace_root;

#[test]
fn test_missing_config_uses_defaults() {
    let temp = TempDir::new().unwrap();
    let config = WorkspaceConfig::load(temp.path()).unwrap();
    assert!(config.scripts.is_empty());
    assert_eq!(config.include_patterns(), vec![DEFAULT_INCLUDE]);
}

#[test]
fn test_parse_scripts_and_include() {
    let content = r#"{
        "scripts": {"lint": "eslint .", "build": "tsc -b"},
        "include": ["frontend/*", "backend/*"]
    }"#;
    let config = WorkspaceConfig::parse(content, Path::new(CONFIG_FILE)).unwrap();

    let names: Vec<&String> = config.scripts.keys().collect();
    assert_eq!(names, vec!["lint", "build"]);
    assert_eq!(config.script("lint"), Some("eslint ."));
    assert_eq!(config.include_patterns(), vec!["frontend/*", "backend/*"]);
}

#[test]
fn test_single_include_string() {
    let config = WorkspaceConfig::parse(r#"{"include": "apps/*"}"#, Path::new(CONFIG_FILE)).unwrap();
    assert_eq!(config.include, Some(Include::One("apps/*".to_string())));
    assert_eq!(config.include_patterns(), vec!["apps/*"]);
}

#[test]
fn test_invalid_config_is_reported() {
    let err = WorkspaceConfig::parse("{\"scripts\": 3}", Path::new(CONFIG_FILE)).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn test_script_pairs_split_on_first_equals() {
    let config = WorkspaceConfig::with_script_pairs(["env=FOO=bar printenv FOO", "test=jest"]).unwrap();
    assert_eq!(config.script("env"), Some("FOO=bar printenv FOO"));
    assert_eq!(config.script("test"), Some("jest"));

    assert!(WorkspaceConfig::with_script_pairs(["nameonly"]).is_err());
    assert!(WorkspaceConfig::with_script_pairs(["=cmd"]).is_err());
}

#[test]
fn test_save_and_load_round_trip() {
    let temp = TempDir::new().unwrap();
    let config = WorkspaceConfig::with_script_pairs(["build=tsc"]).unwrap();
    let path = config.save(temp.path()).unwrap();

    assert_eq!(path, temp.path().join(CONFIG_FILE));
    assert!(fs::read_to_string(&path).unwrap().ends_with("}\n"));
    assert_eq!(WorkspaceConfig::load(temp.path()).unwrap(), config);
}

#[test]
fn test_find_workspace_root_from_nested_dir() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("package.json"), "{}").unwrap();
    fs::write(temp.path().join(CONFIG_FILE), "{}").unwrap();
    let nested = temp.path().join("packages/node_modules/a/src");
    fs::create_dir_all(&nested).unwrap();
    fs::write(temp.path().join("packages/node_modules/a/package.json"), "{}").unwrap();

    assert_eq!(find_workspace_root(&nested).unwrap(), temp.path());
}

#[test]
fn test_find_workspace_root_accepts_git_marker() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("package.json"), "{}").unwrap();
    fs::create_dir(temp.path().join(".git")).unwrap();

    assert_eq!(find_workspace_root(temp.path()).unwrap(), temp.path());
}
