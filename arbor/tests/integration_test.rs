use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn create_workspace(arborrc: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("package.json"),
        r#"{"name": "monorepo", "dependencies": {"lodash": "^4.17.0"}}"#,
    )
    .unwrap();
    fs::write(temp.path().join(".arborrc"), arborrc).unwrap();
    temp
}

fn create_package(root: &Path, name: &str, manifest: &str) {
    let dir = root.join("packages/node_modules").join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("package.json"), manifest).unwrap();
}

fn arbor(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_arbor"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_list_command() {
    let temp = create_workspace("{}");
    create_package(temp.path(), "b", r#"{"name": "b"}"#);
    create_package(temp.path(), "a", r#"{"name": "a"}"#);

    let output = arbor(temp.path(), &["list"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "a\nb\n");
}

#[test]
fn test_exec_sets_package_environment() {
    let temp = create_workspace("{}");
    create_package(temp.path(), "a", r#"{"name": "a"}"#);

    let output = arbor(
        temp.path(),
        &["exec", "-p", "a", "--", "sh", "-c", "'echo $ARBOR_PACKAGE_NAME > name.txt'"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let written = fs::read_to_string(temp.path().join("packages/node_modules/a/name.txt")).unwrap();
    assert_eq!(written.trim(), "a");
}

#[test]
fn test_exec_failure_exits_non_zero() {
    let temp = create_workspace("{}");
    create_package(temp.path(), "a", r#"{"name": "a"}"#);
    create_package(temp.path(), "b", r#"{"name": "b"}"#);

    let output = arbor(temp.path(), &["exec", "--", "exit", "3"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("a, b"), "{}", stderr);
}

#[test]
fn test_fail_fast_summary_shows_packages_not_run() {
    let temp = create_workspace("{}");
    create_package(temp.path(), "a", r#"{"name": "a"}"#);
    create_package(temp.path(), "b", r#"{"name": "b"}"#);
    create_package(temp.path(), "c", r#"{"name": "c"}"#);

    let output = arbor(temp.path(), &["exec", "--fail-fast", "--", "exit", "2"]);
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let rows = stdout
        .lines()
        .filter(|line| line.contains('│') && line.contains("not run"))
        .count();
    assert_eq!(rows, 2, "{}", stdout);
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to run command in a"));
}

#[test]
fn test_exec_infers_package_from_cwd() {
    let temp = create_workspace("{}");
    create_package(temp.path(), "a", r#"{"name": "a"}"#);
    create_package(temp.path(), "b", r#"{"name": "b"}"#);

    let cwd = temp.path().join("packages/node_modules/b");
    let output = arbor(&cwd, &["exec", "--", "touch", "marker"]);
    assert!(output.status.success());
    assert!(cwd.join("marker").exists());
    assert!(!temp.path().join("packages/node_modules/a/marker").exists());
}

#[test]
fn test_no_shell_rejects_pipes() {
    let temp = create_workspace("{}");
    create_package(temp.path(), "a", r#"{"name": "a"}"#);

    let output = arbor(temp.path(), &["exec", "--no-shell", "--", "ls", "|", "wc"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--no-shell"));
}

#[test]
fn test_config_script_runs_as_subcommand() {
    let temp = create_workspace(r#"{"scripts": {"mark": "touch"}}"#);
    create_package(temp.path(), "a", r#"{"name": "a"}"#);

    let output = arbor(temp.path(), &["mark", "-p", "a", "done"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(temp.path().join("packages/node_modules/a/done").exists());
}

#[test]
fn test_unknown_subcommand_fails() {
    let temp = create_workspace("{}");
    let output = arbor(temp.path(), &["frobnicate"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("frobnicate"));
}

#[test]
fn test_hoist_command() {
    let temp = create_workspace("{}");
    create_package(
        temp.path(),
        "a",
        r#"{"name": "a", "dependencies": {"react": "^18.0.0"}}"#,
    );

    let output = arbor(temp.path(), &["hoist", "--silent"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let root = read_json(&temp.path().join("package.json"));
    assert_eq!(root["dependencies"]["react"], "^18.0.0");
    let package = read_json(&temp.path().join("packages/node_modules/a/package.json"));
    assert!(package.get("dependencies").is_none());
}

#[test]
fn test_deps_generate_command() {
    let temp = create_workspace("{}");
    create_package(temp.path(), "a", r#"{"name": "a", "main": "index.js"}"#);
    fs::write(
        temp.path().join("packages/node_modules/a/index.js"),
        "const _ = require('lodash');\nmodule.exports = _;\n",
    )
    .unwrap();

    let output = arbor(temp.path(), &["deps:generate", "-p", "a"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let package = read_json(&temp.path().join("packages/node_modules/a/package.json"));
    assert_eq!(package["dependencies"]["lodash"], "^4.17.0");
}

#[test]
fn test_init_refuses_to_overwrite() {
    let temp = create_workspace("{}");

    let output = arbor(temp.path(), &["init"]);
    assert!(!output.status.success());

    let output = arbor(temp.path(), &["init", "--force", "--script", "lint=eslint ."]);
    assert!(output.status.success());
    let config = read_json(&temp.path().join(".arborrc"));
    assert_eq!(config["scripts"]["lint"], "eslint .");
}
