#![warn(missing_docs)]
//! FluxTest CLI Library
//!
//! This module provides the execution engine and the CLI harness for test binaries.
//! Use `fluxtest::run()` (or `fluxtest_cli::run()`) in your main function to run
//! every container registered with `#[flux::container]`.
//!
//! # Example
//!
//! ```ignore
//! use fluxtest::prelude::*;
//!
//! #[derive(Default)]
//! struct MathTests;
//!
//! #[flux::container]
//! impl MathTests {
//!     #[case]
//!     fn adds(&mut self) {
//!         assert_eq!(1 + 1, 2);
//!     }
//! }
//!
//! fn main() -> std::process::ExitCode {
//!     match fluxtest::run() {
//!         Ok(true) => std::process::ExitCode::SUCCESS,
//!         _ => std::process::ExitCode::FAILURE,
//!     }
//! }
//! ```

mod config;
mod executor;
mod planner;

pub use config::*;
pub use executor::{
    CaseOutcome, ContainerOutcome, EngineError, ExecutionConfig, IgnoreReason, Orchestrator,
    RunOutcome, Step, StepResult, TestExecutor, run_containers, run_unit,
};
pub use planner::{ExecutionPlan, build_plan, case_id};

use anyhow::Context;
use clap::{Parser, Subcommand};
use fluxtest_core::{Unit, discover};
use fluxtest_report::Reporter;
use regex::Regex;
use std::io::Write;
use tracing_subscriber::EnvFilter;

/// FluxTest CLI arguments
#[derive(Parser, Debug, Default)]
#[command(name = "fluxtest")]
#[command(author, version, about = "FluxTest - lifecycle-driven test runner for Rust")]
pub struct Cli {
    /// Optional subcommand (List, Run); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Only run test cases whose `container::case` id matches this regex
    pub filter: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not print step durations
    #[arg(long)]
    pub no_durations: bool,

    /// Do not record backtraces for panics in test code
    #[arg(long)]
    pub no_backtraces: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// List all discovered containers and test cases
    List,
    /// Run test cases (default)
    Run,
}

/// Run the FluxTest CLI with the process arguments.
/// This is the main entry point for test binaries.
///
/// # Returns
/// `Ok(true)` when every container succeeded, `Ok(false)` when any failed,
/// or an error when the run could not take place at all.
pub fn run() -> anyhow::Result<bool> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the FluxTest CLI with pre-parsed arguments against the global registry.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<bool> {
    init_logging(cli.verbose);

    // Discover fluxtest.toml configuration (CLI flags override)
    let config = FluxTestConfig::discover().unwrap_or_default();
    let unit = Unit::from_registry();

    let stdout = std::io::stdout();
    run_with_unit(&cli, &config, unit, stdout.lock())
}

/// Run `unit` with explicit arguments and configuration, reporting to `out`
///
/// `list` prints the plan and always returns `Ok(true)`.
pub fn run_with_unit<W: Write>(
    cli: &Cli,
    config: &FluxTestConfig,
    unit: Unit,
    out: W,
) -> anyhow::Result<bool> {
    let filter = resolve_filter(cli, config)?;
    let containers = discover(unit).context("test discovery failed")?;
    let plan = planner::build_plan(containers, filter.as_ref());

    match cli.command {
        Some(Commands::List) => {
            list_containers(&plan, out)?;
            Ok(true)
        }
        Some(Commands::Run) | None => {
            let mut style = config.report_style();
            if cli.no_durations {
                style.show_durations = false;
            }
            let mut execution = config.execution_config();
            if cli.no_backtraces {
                execution.capture_backtraces = false;
            }

            let mut reporter = Reporter::with_style(out, style);
            let outcome = run_containers(&plan.containers, &execution, &mut reporter)
                .context("failed to write test report")?;
            Ok(outcome.succeeded())
        }
    }
}

/// Initialize the tracing subscriber on stderr; `RUST_LOG` takes precedence
fn init_logging(verbose: bool) {
    let default = if verbose {
        "fluxtest=debug"
    } else {
        "fluxtest=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed by the embedding binary
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// CLI filter wins over `[runner] filter`
fn resolve_filter(cli: &Cli, config: &FluxTestConfig) -> anyhow::Result<Option<Regex>> {
    let Some(pattern) = cli.filter.as_deref().or(config.runner.filter.as_deref()) else {
        return Ok(None);
    };
    let re = Regex::new(pattern).with_context(|| format!("invalid filter regex: {pattern}"))?;
    Ok(Some(re))
}

fn list_containers<W: Write>(plan: &ExecutionPlan, mut out: W) -> anyhow::Result<()> {
    writeln!(out, "FluxTest Plan:")?;

    for container in &plan.containers {
        let marker = if container.ignored { " [ignored]" } else { "" };
        writeln!(out, "├── container: {}{}", container.name, marker)?;
        for case in &container.cases {
            let marker = if case.ignored { " [ignored]" } else { "" };
            writeln!(out, "│   ├── {}{}", case.name, marker)?;
        }
    }

    writeln!(
        out,
        "{} containers, {} test cases found.",
        plan.containers.len(),
        plan.case_count()
    )?;
    Ok(())
}
