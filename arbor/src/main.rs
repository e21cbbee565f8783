mod commands;
mod formatting;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use owo_colors::OwoColorize;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "arbor", version)]
#[command(about = "Maintenance tool for JavaScript monorepos")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print nothing but errors
    #[arg(short, long, action, global = true)]
    silent: bool,

    /// Print the full error chain on failure
    #[arg(long, action, global = true)]
    stack: bool,
}

/// Package selection shared by every per-package command.
#[derive(Args, Clone, Debug, Default)]
pub struct TargetArgs {
    /// Package to act on. May be given more than once
    #[arg(
        short = 'p',
        long = "package-name",
        visible_aliases = ["package", "packageName"],
        value_name = "NAME"
    )]
    pub packages: Vec<String>,

    /// Stop at the first package that fails
    #[arg(long = "fail-fast", visible_alias = "failFast", action)]
    pub fail_fast: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a shell command in each package directory
    Exec {
        #[command(flatten)]
        targets: TargetArgs,
        /// Reject commands that chain, pipe or substitute
        #[arg(long, action)]
        no_shell: bool,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Run a package script, or an .arborrc script, in each package
    Run {
        #[command(flatten)]
        targets: TargetArgs,
        script: String,
        /// Arguments passed through to the script
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// Move package dependencies into the root package.json
    Hoist {
        #[command(flatten)]
        targets: TargetArgs,
        /// Reconcile differing version ranges instead of refusing them
        #[arg(long, action)]
        risky: bool,
    },
    /// Inspect or regenerate package dependencies from their imports
    #[command(subcommand)]
    Deps(DepsCommands),
    #[command(name = "deps:generate", hide = true)]
    DepsGenerate {
        #[command(flatten)]
        targets: TargetArgs,
    },
    /// Write an .arborrc for this workspace
    Init {
        #[arg(long, action)]
        force: bool,
        /// Script to add, as name=command. May be given more than once
        #[arg(long = "script", value_name = "NAME=COMMAND")]
        scripts: Vec<String>,
    },
    /// List package names
    List {
        #[arg(long, action)]
        json: bool,
    },
    #[command(external_subcommand)]
    External(Vec<String>),
}

#[derive(Subcommand)]
enum DepsCommands {
    /// Rewrite each package's dependencies from what its sources import
    Generate {
        #[command(flatten)]
        targets: TargetArgs,
    },
    /// Print what each package imports
    List {
        #[command(flatten)]
        targets: TargetArgs,
        #[arg(long, action)]
        json: bool,
    },
}

fn init_tracing(verbose: u8, silent: bool) {
    let log_level = if silent {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false);

    if std::env::var_os("RUST_LOG").is_some() {
        builder.with_env_filter(EnvFilter::from_default_env()).init();
    } else {
        builder.with_max_level(log_level).init();
    }
}

fn run(cli: Cli) -> Result<()> {
    let silent = cli.silent;

    match cli.command {
        Commands::Init { force, scripts } => commands::cmd_init(force, scripts, silent),
        Commands::List { json } => commands::cmd_list(commands::Workspace::load(silent)?, json),
        Commands::Exec {
            targets,
            no_shell,
            command,
        } => commands::cmd_exec(commands::Workspace::load(silent)?, &targets, &command, no_shell),
        Commands::Run {
            targets,
            script,
            args,
        } => commands::cmd_run(commands::Workspace::load(silent)?, &targets, &script, &args),
        Commands::Hoist { targets, risky } => {
            commands::cmd_hoist(commands::Workspace::load(silent)?, &targets, risky)
        }
        Commands::Deps(DepsCommands::Generate { targets }) | Commands::DepsGenerate { targets } => {
            commands::cmd_deps_generate(commands::Workspace::load(silent)?, &targets)
        }
        Commands::Deps(DepsCommands::List { targets, json }) => {
            commands::cmd_deps_list(commands::Workspace::load(silent)?, &targets, json)
        }
        Commands::External(args) => commands::cmd_config_script(commands::Workspace::load(silent)?, args),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.silent);
    let stack = cli.stack;

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if stack {
                eprintln!("{} {:?}", "error:".red().bold(), err);
            } else {
                eprintln!("{} {:#}", "error:".red().bold(), err);
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_package_flag_aliases() {
        let cli = Cli::try_parse_from([
            "arbor", "hoist", "-p", "a", "--package", "b", "--package-name", "c", "--risky",
        ])
        .unwrap();
        match cli.command {
            Commands::Hoist { targets, risky } => {
                assert_eq!(targets.packages, vec!["a", "b", "c"]);
                assert!(risky);
            }
            _ => panic!("expected hoist"),
        }
    }

    #[test]
    fn test_exec_takes_trailing_command() {
        let cli = Cli::try_parse_from(["arbor", "exec", "--fail-fast", "npm", "test", "--", "-u"]).unwrap();
        match cli.command {
            Commands::Exec { targets, command, .. } => {
                assert!(targets.fail_fast);
                assert_eq!(command, vec!["npm", "test", "--", "-u"]);
            }
            _ => panic!("expected exec"),
        }
    }

    #[test]
    fn test_unknown_subcommand_is_external() {
        let cli = Cli::try_parse_from(["arbor", "lint", "-p", "a"]).unwrap();
        match cli.command {
            Commands::External(args) => assert_eq!(args, vec!["lint", "-p", "a"]),
            _ => panic!("expected external subcommand"),
        }
    }

    #[test]
    fn test_deps_generate_alias() {
        let cli = Cli::try_parse_from(["arbor", "deps:generate", "-p", "a"]).unwrap();
        assert!(matches!(cli.command, Commands::DepsGenerate { .. }));
    }
}
