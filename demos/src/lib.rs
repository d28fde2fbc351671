//! FluxTest Examples
//!
//! Runnable demonstrations of every FluxTest feature. This crate is not
//! published; it exists solely to host examples that depend on `fluxtest`.
//!
//! Run any example with:
//! ```sh
//! cargo run --example <name> -p fluxtest-demos
//! ```
//!
//! ## Feature Examples
//!
//! | Example | Feature |
//! |---------|---------|
//! | `feature_lifecycle` | Class and test hooks, fresh instances, ignored cases and containers |
//! | `feature_failures` | Errors with causes, panics, metadata, failing hooks |
//! | `feature_async` | `async fn` test cases and hooks on Tokio |
//! | `feature_builder` | `ContainerBuilder` and `run_unit` without macros |
//!
//! ## Use-Case Examples
//!
//! | Example | Scenario |
//! |---------|----------|
//! | `ci_suite` | CI pipeline: filters, `fluxtest.toml`, exit codes |
