#![warn(missing_docs)]
//! FluxTest Core - Test Model and Invocation
//!
//! This crate provides everything the engine needs before and around a single
//! invocation:
//! - `ContainerBuilder` / `Registration` for registering containers
//! - `inventory`-backed registry fed by `#[flux::container]`
//! - Discovery: deterministic ordering and hook resolution
//! - `CapturedError` with metadata and cause chains
//! - Panic-safe, timed invocation and outcome classification

mod builder;
mod capture;
mod discovery;
mod error;
mod model;
mod outcome;
mod registry;

pub use builder::ContainerBuilder;
pub use capture::catch_panic;
pub use discovery::{DiscoveryError, discover};
pub use error::{
    CapturedError, DYN_ERROR_KIND, INVOCATION_FAULT_KIND, IntoTestResult, PANIC_KIND, TestResult,
};
pub use model::{
    HookFn, HookRole, HookSet, InstanceFactory, InstanceFn, LifecycleHook, Registration, StaticFn,
    TestCase, TestContainer, TestInstance,
};
pub use outcome::{ExecutionResult, Status, invoke};
pub use registry::{ContainerDef, REGISTRY_ANCHOR, Unit, registered};
