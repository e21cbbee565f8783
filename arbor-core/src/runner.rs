//! Sequential per-package execution.

use tracing::debug;

use crate::error::{Error, Result};

/// Outcome of one package.
pub type PackageOutcome = (String, Result<()>);

/// Outcomes of a run, in execution order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<PackageOutcome>,
    /// Packages never started because a fail-fast run stopped early.
    pub not_run: Vec<String>,
}

impl RunReport {
    pub fn succeeded(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, r)| r.is_ok())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn failed(&self) -> Vec<(&str, &Error)> {
        self.outcomes
            .iter()
            .filter_map(|(name, r)| r.as_ref().err().map(|e| (name.as_str(), e)))
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|(_, r)| r.is_ok())
    }

    pub fn aborted(&self) -> bool {
        !self.not_run.is_empty()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Runs a task for each package, one at a time.
///
/// Every package runs to completion before the next starts. By default all
/// failures are collected; with `fail_fast` the run stops after the first.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageRunner {
    fail_fast: bool,
}

impl PackageRunner {
    pub fn new(fail_fast: bool) -> Self {
        Self { fail_fast }
    }

    pub fn run<F>(&self, packages: &[String], mut task: F) -> RunReport
    where
        F: FnMut(&str) -> Result<()>,
    {
        let mut report = RunReport::default();

        for (index, package) in packages.iter().enumerate() {
            debug!(%package, "running");
            let outcome = task(package);
            let failed = outcome.is_err();
            if let Err(e) = &outcome {
                debug!(%package, error = %e, "package failed");
            }
            report.outcomes.push((package.clone(), outcome));

            if failed && self.fail_fast {
                report.not_run = packages[index + 1..].to_vec();
                debug!(remaining = report.not_run.len(), "stopping after first failure");
                break;
            }
        }

        report
    }
}
