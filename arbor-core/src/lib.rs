//! Core library for JavaScript monorepo maintenance.

pub mod adapter;
pub mod command_validator;
pub mod config;
pub mod deps;
pub mod error;
pub mod executor;
pub mod hoist;
pub mod manifest;
pub mod package;
pub mod path_utils;
pub mod process;
pub mod registry;
pub mod resolver;
pub mod runner;
pub mod version;
pub mod workspace;

pub use adapter::{parse_imports, ParseOutcome, SourceParser};
pub use command_validator::CommandValidator;
pub use config::{Include, WorkspaceConfig};
pub use error::{Error, Result};
pub use executor::{Executor, ScriptOutcome, ScriptSource};
pub use hoist::{HoistOptions, HoistReport, Hoister};
pub use manifest::Manifest;
pub use package::Package;
pub use registry::PackageRegistry;
pub use resolver::DependencyResolver;
pub use runner::{PackageRunner, RunReport};
pub use version::{reconcile, RangeOperator, VersionRange};
pub use workspace::find_workspace_root;
