//! Discovery
//!
//! Turns a [`Unit`] into the ordered, resolved list of [`TestContainer`]s the
//! orchestrator runs:
//! - containers ascending by qualified name
//! - test cases ascending by name within each container
//! - one hook per role: the first candidate in registration order wins,
//!   later candidates are discarded
//!
//! Malformed registrations are a [`DiscoveryError`], which aborts the run
//! before any container executes.

use crate::model::{HookFn, HookSet, Registration, TestContainer};
use crate::registry::Unit;
use std::collections::BTreeSet;
use thiserror::Error;

/// The unit cannot be turned into a runnable set of containers
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum DiscoveryError {
    /// A container was registered without a name
    #[error("Container registered with an empty name")]
    EmptyContainerName,

    /// Two containers share a qualified name
    #[error("Duplicate container: {0}")]
    DuplicateContainer(String),

    /// A test case was registered without a name
    #[error("Empty test case name in container {0}")]
    EmptyCaseName(String),

    /// Two test cases of one container share a name
    #[error("Duplicate test case {case} in container {container}")]
    DuplicateCase {
        /// Container name
        container: String,
        /// Test case name
        case: String,
    },

    /// A hook's callable does not match its role (instance vs. static)
    #[error("Hook {hook} in container {container} cannot fill role {role}")]
    HookShape {
        /// Container name
        container: String,
        /// Hook name
        hook: String,
        /// Role label
        role: &'static str,
    },
}

/// Discover the containers of `unit`
pub fn discover(unit: Unit) -> Result<Vec<TestContainer>, DiscoveryError> {
    let mut seen = BTreeSet::new();
    let mut containers = Vec::with_capacity(unit.len());

    for registration in unit.into_registrations() {
        if registration.name.is_empty() {
            return Err(DiscoveryError::EmptyContainerName);
        }
        if !seen.insert(registration.name.clone()) {
            return Err(DiscoveryError::DuplicateContainer(registration.name));
        }
        containers.push(resolve(registration)?);
    }

    containers.sort_by(|a, b| a.name.cmp(&b.name));

    tracing::debug!(containers = containers.len(), "discovery complete");
    Ok(containers)
}

fn resolve(registration: Registration) -> Result<TestContainer, DiscoveryError> {
    let Registration {
        name,
        ignored,
        factory,
        mut cases,
        hooks: candidates,
    } = registration;

    let mut case_names = BTreeSet::new();
    for case in &cases {
        if case.name.is_empty() {
            return Err(DiscoveryError::EmptyCaseName(name));
        }
        if !case_names.insert(case.name.as_str()) {
            return Err(DiscoveryError::DuplicateCase {
                container: name.clone(),
                case: case.name.clone(),
            });
        }
    }
    cases.sort_by(|a, b| a.name.cmp(&b.name));

    let mut hooks = HookSet::default();
    for candidate in candidates {
        let shape_ok = match candidate.call {
            HookFn::Static(_) => !candidate.role.is_per_test(),
            HookFn::Instance(_) => candidate.role.is_per_test(),
        };
        if !shape_ok {
            return Err(DiscoveryError::HookShape {
                container: name,
                hook: candidate.name,
                role: candidate.role.label(),
            });
        }

        let slot = hooks.slot_mut(candidate.role);
        if let Some(selected) = slot.as_ref() {
            tracing::warn!(
                container = %name,
                role = %candidate.role,
                selected = %selected.name,
                discarded = %candidate.name,
                "hook role already filled, discarding candidate"
            );
            continue;
        }
        *slot = Some(candidate);
    }

    Ok(TestContainer {
        name,
        ignored,
        factory,
        cases,
        hooks,
    })
}
