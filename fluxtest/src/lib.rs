#![warn(missing_docs)]
//! # FluxTest
//!
//! Deterministic test harness for Rust with class and test lifecycle hooks.
//!
//! FluxTest runs test containers, each a set of test cases sharing lifecycle hooks:
//! - **Deterministic Order**: Containers and test cases run sorted by name, one at a time
//! - **Lifecycle Hooks**: class-init / class-cleanup around a container, test-init / test-cleanup around each case
//! - **Fresh Instances**: Every test case gets its own instance of the container type
//! - **Failure Isolation**: Panics and errors are captured per step; siblings keep running
//! - **Structured Diagnostics**: Message, kind, metadata, stack trace and nested causes
//!
//! ## Quick Start
//!
//! ```ignore
//! use fluxtest::prelude::*;
//!
//! #[derive(Default)]
//! struct Parser {
//!     input: String,
//! }
//!
//! #[flux::container]
//! impl Parser {
//!     #[test_init]
//!     fn load(&mut self) {
//!         self.input = "1 + 2".to_string();
//!     }
//!
//!     #[case]
//!     fn tokenizes(&mut self) {
//!         assert_eq!(self.input.split(' ').count(), 3);
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
//!
//! ## Async Test Cases
//!
//! ```ignore
//! #[flux::container]
//! impl Service {
//!     #[case]
//!     async fn responds(&mut self) -> Result<(), ServiceError> {
//!         self.client.ping().await
//!     }
//! }
//! ```
//!
//! ## Without Macros
//!
//! ```ignore
//! let unit = Unit::new().with(
//!     ContainerBuilder::<Parser>::with_default("parser")
//!         .case("tokenizes", |p: &mut Parser| assert!(p.input.is_empty()))
//!         .build(),
//! );
//! let outcome = fluxtest::run_unit(unit, &ExecutionConfig::default(), &mut Reporter::new(std::io::stdout()))?;
//! ```

// Re-export core types
pub use fluxtest_core::{
    CapturedError, ContainerBuilder, ContainerDef, DiscoveryError, ExecutionResult, HookRole,
    IntoTestResult, Registration, Status, TestCase, TestContainer, TestResult, Unit, discover,
};

// Re-export macros
pub use fluxtest_macros::container;

// Re-export report types
pub use fluxtest_report::{
    ClassSummary, HookStatus, ReportStyle, Reporter, RunSummary, format_diagnostics,
};

// Re-export engine types
pub use fluxtest_cli::{
    CaseOutcome, ContainerOutcome, EngineError, ExecutionConfig, FluxTestConfig, IgnoreReason,
    RunOutcome, run_containers, run_unit,
};

/// Internal re-exports for macro use
#[doc(hidden)]
pub mod internal {
    pub use inventory;
    pub use tokio;
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        CapturedError, ContainerBuilder, IntoTestResult, Status, TestResult, Unit, container, flux,
    };
}

/// Attribute namespace for flux macros
pub mod flux {
    pub use fluxtest_macros::container;
}

/// Run the FluxTest CLI harness.
///
/// Call this from your test binary's `main()` and turn the verdict into an
/// exit code:
/// ```ignore
/// fn main() -> std::process::ExitCode {
///     match fluxtest::run() {
///         Ok(true) => std::process::ExitCode::SUCCESS,
///         Ok(false) => std::process::ExitCode::FAILURE,
///         Err(e) => {
///             eprintln!("{e:#}");
///             std::process::ExitCode::from(2)
///         }
///     }
/// }
/// ```
pub use fluxtest_cli::run;
