//! Run Planner
//!
//! Narrows discovered containers to the test cases selected by a regex over
//! `container::case` ids.
//!
//! Ordering is inherited from discovery: containers and cases stay sorted
//! by name. Without a filter the plan is the discovered set unchanged, empty
//! containers included.

use fluxtest_core::TestContainer;
use regex::Regex;

/// Containers to run, in order
#[derive(Debug)]
pub struct ExecutionPlan {
    /// Containers holding at least one selected case (all of them when unfiltered)
    pub containers: Vec<TestContainer>,
}

impl ExecutionPlan {
    /// Number of selected test cases
    pub fn case_count(&self) -> usize {
        self.containers.iter().map(|c| c.cases.len()).sum()
    }

    /// No container was selected
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}

/// `container::case`, the id matched by run filters
pub fn case_id(container: &str, case: &str) -> String {
    format!("{container}::{case}")
}

/// Build an execution plan from discovered containers
///
/// Filtered-out cases are removed and are not counted anywhere. A container
/// left with no case is dropped.
pub fn build_plan(containers: Vec<TestContainer>, filter: Option<&Regex>) -> ExecutionPlan {
    let Some(re) = filter else {
        return ExecutionPlan { containers };
    };

    let containers = containers
        .into_iter()
        .filter_map(|mut container| {
            let name = container.name.clone();
            container.retain_cases(|case| re.is_match(&case_id(&name, &case.name)));
            if container.cases.is_empty() {
                tracing::debug!(container = %name, "no test case matches filter");
                None
            } else {
                Some(container)
            }
        })
        .collect();

    ExecutionPlan { containers }
}
