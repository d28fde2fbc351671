//! Test Run Executor
//!
//! Runs discovered containers and reports as it goes. Everything happens on
//! the calling thread, one container and one test case at a time.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Unit (ContainerDefs registered via #[flux::container], or built by hand)
//!       │
//!       ▼
//! ┌─────────────┐
//! │  discover   │  Order containers and cases, resolve hooks
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │  lifecycle  │  class-init, gating, class-cleanup per container
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │  execution  │  test-init, body, test-cleanup per case
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │  Reporter   │  Headings, diagnostics, summaries
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`execution`] - Single test case execution
//! - [`lifecycle`] - Per-container orchestration and class summaries

mod execution;
mod lifecycle;

pub use execution::{CaseOutcome, ExecutionConfig, IgnoreReason, Step, StepResult, TestExecutor};
pub use lifecycle::{ContainerOutcome, Orchestrator};

use fluxtest_core::{DiscoveryError, TestContainer, Unit, discover};
use fluxtest_report::{Reporter, RunSummary};
use std::io::{self, Write};
use std::time::Instant;
use thiserror::Error;

/// Faults that abort a run before or outside test execution
#[derive(Debug, Error)]
pub enum EngineError {
    /// The unit could not be turned into containers
    #[error("discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),
    /// The report sink rejected a write
    #[error("failed to write report: {0}")]
    Output(#[from] io::Error),
}

/// Result of a whole run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Aggregate counts across containers
    pub summary: RunSummary,
    /// Per-container outcomes, in execution order
    pub containers: Vec<ContainerOutcome>,
}

impl RunOutcome {
    /// Every container succeeded; true for an empty run
    pub fn succeeded(&self) -> bool {
        self.summary.succeeded()
    }
}

/// Run already discovered containers in order
///
/// A run over zero containers prints only the run summary and succeeds.
pub fn run_containers<W: Write>(
    containers: &[TestContainer],
    config: &ExecutionConfig,
    reporter: &mut Reporter<W>,
) -> io::Result<RunOutcome> {
    let start = Instant::now();
    let orchestrator = Orchestrator::new(config.clone());

    let mut outcomes = Vec::with_capacity(containers.len());
    for container in containers {
        outcomes.push(orchestrator.run_container(container, reporter)?);
    }

    let mut summary = RunSummary::from_classes(outcomes.iter().map(|o| &o.summary));
    summary.elapsed = start.elapsed();
    reporter.run_summary(&summary)?;
    reporter.flush()?;

    tracing::info!(
        containers = summary.containers,
        failed_containers = summary.failed_containers,
        succeeded = summary.succeeded(),
        "run finished"
    );

    Ok(RunOutcome {
        summary,
        containers: outcomes,
    })
}

/// Discover `unit` and run it
///
/// A discovery fault aborts before any container runs and nothing is
/// written to the reporter.
pub fn run_unit<W: Write>(
    unit: Unit,
    config: &ExecutionConfig,
    reporter: &mut Reporter<W>,
) -> Result<RunOutcome, EngineError> {
    let containers = discover(unit).inspect_err(|e| tracing::warn!("discovery fault: {e}"))?;
    Ok(run_containers(&containers, config, reporter)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxtest_core::{CapturedError, ContainerBuilder};
    use fluxtest_report::ReportStyle;

    #[derive(Default)]
    struct Empty;

    fn quiet_reporter() -> Reporter<Vec<u8>> {
        Reporter::with_style(
            Vec::new(),
            ReportStyle {
                show_durations: false,
                ..ReportStyle::default()
            },
        )
    }

    #[test]
    fn test_empty_unit_succeeds() {
        let mut reporter = quiet_reporter();
        let outcome = run_unit(Unit::new(), &ExecutionConfig::default(), &mut reporter).unwrap();

        assert!(outcome.succeeded());
        assert!(outcome.containers.is_empty());
        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(!text.contains("Summary:"));
        assert!(text.contains("Run summary"));
    }

    #[test]
    fn test_discovery_fault_writes_nothing() {
        let unit = Unit::new()
            .with(ContainerBuilder::<Empty>::with_default("dup").build())
            .with(ContainerBuilder::<Empty>::with_default("dup").build());
        let mut reporter = quiet_reporter();

        let err = run_unit(unit, &ExecutionConfig::default(), &mut reporter).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Discovery(DiscoveryError::DuplicateContainer(ref name)) if name == "dup"
        ));
        assert!(reporter.into_inner().is_empty());
    }

    #[test]
    fn test_one_failing_container_fails_run() {
        let unit = Unit::new()
            .with(
                ContainerBuilder::<Empty>::with_default("a")
                    .case("ok", |_: &mut Empty| ())
                    .build(),
            )
            .with(
                ContainerBuilder::<Empty>::with_default("b")
                    .case("bad", |_: &mut Empty| {
                        Err::<(), _>(CapturedError::new("check", "nope"))
                    })
                    .build(),
            );
        let mut reporter = quiet_reporter();

        let outcome = run_unit(unit, &ExecutionConfig::default(), &mut reporter).unwrap();
        assert!(!outcome.succeeded());
        assert_eq!(outcome.summary.containers, 2);
        assert_eq!(outcome.summary.failed_containers, 1);
        assert!(outcome.containers[0].succeeded());
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let unit = Unit::new().with(
            ContainerBuilder::<Empty>::with_default("suite")
                .case("b", |_: &mut Empty| ())
                .case("a", |_: &mut Empty| {
                    Err::<(), _>(CapturedError::new("check", "nope"))
                })
                .ignored_case("c", |_: &mut Empty| ())
                .build(),
        );
        let containers = discover(unit).unwrap();
        let config = ExecutionConfig::default();

        let first = run_containers(&containers, &config, &mut quiet_reporter()).unwrap();
        let second = run_containers(&containers, &config, &mut quiet_reporter()).unwrap();
        assert_eq!(first.containers[0].summary, second.containers[0].summary);
        assert_eq!(first.succeeded(), second.succeeded());
    }
}
