//! Error types and result aliases.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse manifest {path}: {error}")]
    ManifestParse {
        path: PathBuf,
        error: serde_json::Error,
    },

    #[error("Failed to read manifest {path}: {error}")]
    ManifestRead {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("Manifest {0} does not declare a name")]
    UnnamedPackage(PathBuf),

    #[error("Package \"{name}\" is declared by both {first} and {second}")]
    DuplicatePackage {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("\"{name}\" does not appear to identify a package. Available packages: {available}")]
    UnknownPackage { name: String, available: String },

    #[error("Could not find source module identified by {0}")]
    SourceNotFound(PathBuf),

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Cannot select a version from \"null\" and \"null\"")]
    NoVersion,

    #[error("\"{0}\" is not a valid semver")]
    InvalidSemver(String),

    #[error("\"{left}\" and \"{right}\" are not compatible")]
    IncompatibleVersions { left: String, right: String },

    #[error("Cowardly refusing to overwrite \"{dependency}@{existing}\" with \"{dependency}@{incoming}\" from \"{package}\": {reason}")]
    Conflict {
        package: String,
        dependency: String,
        existing: String,
        incoming: String,
        reason: String,
    },

    #[error("Package \"{package}\" depends on \"{dependency}\", which the root package.json does not declare")]
    MissingRootDependency { package: String, dependency: String },

    #[error("{command} exited with code {code}")]
    Spawn {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("Failed to execute {command} for {package}: {message}")]
    Execution {
        package: String,
        command: String,
        message: String,
    },

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Could not locate the workspace root from {0}. Expected a directory containing package.json and either .arborrc or .git")]
    WorkspaceRootNotFound(PathBuf),

    #[error("Config error in {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Project already configured for arbor. Pass --force to overwrite")]
    AlreadyConfigured(PathBuf),

    #[error("Invalid glob pattern {pattern}: {message}")]
    Glob { pattern: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
