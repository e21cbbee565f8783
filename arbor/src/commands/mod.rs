//! Command implementations for the CLI.

mod dependencies;
mod execution;
mod info;

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use arbor_core::{find_workspace_root, Package, PackageRegistry, PackageRunner, RunReport, WorkspaceConfig};

use crate::formatting::{
    create_progress_bar, format_duration, print_run_summary, print_section_header, print_success,
    print_warning, SectionStyle, Status,
};
use crate::TargetArgs;

pub use dependencies::{cmd_deps_generate, cmd_deps_list, cmd_hoist};
pub use execution::{cmd_config_script, cmd_exec, cmd_run};
pub use info::{cmd_init, cmd_list};

/// The monorepo the CLI was invoked in.
pub struct Workspace {
    pub root: PathBuf,
    pub cwd: PathBuf,
    pub config: WorkspaceConfig,
    pub registry: PackageRegistry,
    pub silent: bool,
}

impl Workspace {
    pub fn load(silent: bool) -> Result<Self> {
        let cwd = env::current_dir().context("Failed to read the current directory")?;
        let root = find_workspace_root(&cwd)?;
        let config = WorkspaceConfig::load(&root)?;
        let registry = PackageRegistry::new(&root, config.include_patterns());

        Ok(Self {
            root,
            cwd,
            config,
            registry,
            silent,
        })
    }
}

/// How a per-package command presents itself.
pub struct Action {
    /// Section title, e.g. "Hoisting dependencies".
    pub title: &'static str,
    /// Infinitive used in failure messages, e.g. "hoist".
    pub verb: &'static str,
    /// Past tense used in the closing line, e.g. "Hoisted".
    pub done: &'static str,
    /// Show a progress bar instead of one line per package. Only suitable for
    /// tasks that do not write to the terminal themselves.
    pub progress: bool,
}

/// Runs `task` for every targeted package, one at a time, then reports.
///
/// Fails when any package failed. With `--fail-fast` only the first failure
/// is reported.
pub fn for_each_package<F>(ws: &mut Workspace, targets: &TargetArgs, action: &Action, mut task: F) -> Result<()>
where
    F: FnMut(&Package) -> arbor_core::Result<()>,
{
    let start = Instant::now();
    let names = ws.registry.resolve_targets(&targets.packages, &ws.cwd)?;
    let silent = ws.silent;

    if names.is_empty() {
        if !silent {
            print_warning("No packages found");
        }
        return Ok(());
    }

    if !silent {
        print_section_header(
            &format!("{} ({} packages)", action.title, names.len()),
            SectionStyle::Primary,
        );
    }

    let progress = (!silent && action.progress).then(|| create_progress_bar(names.len() as u64));
    let registry = &mut ws.registry;

    let report = PackageRunner::new(targets.fail_fast).run(&names, |name| {
        match &progress {
            Some(pb) => pb.set_message(name.to_string()),
            None if !silent => println!("{} {}", Status::Info.colored_symbol(), name.bold()),
            None => {}
        }
        let package = registry.get(name)?;
        let result = task(&package);
        if let Some(pb) = &progress {
            pb.inc(1);
        }
        result
    });

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    conclude(report, action, targets.fail_fast, silent, start)
}

fn conclude(report: RunReport, action: &Action, fail_fast: bool, silent: bool, start: Instant) -> Result<()> {
    if report.is_success() {
        if !silent {
            println!();
            print_success(&format!(
                "{} {} packages in {}",
                action.done,
                report.len(),
                format_duration(start.elapsed().as_secs_f64())
            ));
        }
        return Ok(());
    }

    if fail_fast {
        if !silent {
            println!();
            print_run_summary(&report);
            if report.aborted() {
                println!();
                print_warning(&format!(
                    "Stopped early, {} packages did not run",
                    report.not_run.len()
                ));
            }
        }
        let (name, error) = report
            .outcomes
            .into_iter()
            .find_map(|(name, outcome)| outcome.err().map(|e| (name, e)))
            .context("run failed without an error")?;
        return Err(anyhow::Error::new(error).context(format!("Failed to {} {}", action.verb, name)));
    }

    let failed: Vec<String> = report.failed().iter().map(|(name, _)| name.to_string()).collect();
    if !silent {
        println!();
        print_run_summary(&report);
        println!();
        print_warning(&format!(
            "{} succeeded, {} failed",
            report.succeeded().len(),
            failed.len()
        ));
    }

    anyhow::bail!("Failed to {} {}", action.verb, failed.join(", "))
}
