//! Summary Data Structures

use fluxtest_core::{ExecutionResult, Status};
use std::fmt;
use std::time::Duration;

/// Reported status of a class-level hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStatus {
    /// The container has no hook for this role
    NotPresent,
    /// The hook ran and succeeded
    Succeeded,
    /// The hook ran and failed
    Failed,
}

impl HookStatus {
    /// Status of an optional hook invocation
    pub fn from_result(result: Option<&ExecutionResult>) -> Self {
        match result {
            None => HookStatus::NotPresent,
            Some(r) if r.succeeded() => HookStatus::Succeeded,
            Some(_) => HookStatus::Failed,
        }
    }

    /// An absent hook counts as success
    pub fn succeeded(self) -> bool {
        !matches!(self, HookStatus::Failed)
    }

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            HookStatus::NotPresent => "Not present",
            HookStatus::Succeeded => "Succeeded",
            HookStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for HookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-container aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSummary {
    /// Qualified container name
    pub container: String,
    /// Test cases in the container
    pub total: usize,
    /// Test cases whose lifecycle was executed
    pub ran: usize,
    /// Test cases classified Ignored
    pub ignored: usize,
    /// Test cases classified Passed
    pub passed: usize,
    /// Test cases classified Failed
    pub failed: usize,
    /// class-init outcome
    pub class_init: HookStatus,
    /// class-cleanup outcome
    pub class_cleanup: HookStatus,
}

impl ClassSummary {
    /// Empty summary for `container`
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            total: 0,
            ran: 0,
            ignored: 0,
            passed: 0,
            failed: 0,
            class_init: HookStatus::NotPresent,
            class_cleanup: HookStatus::NotPresent,
        }
    }

    /// Fold one test case outcome into the counts
    pub fn record(&mut self, status: Status) {
        self.total += 1;
        match status {
            Status::Ignored => self.ignored += 1,
            Status::Passed => {
                self.ran += 1;
                self.passed += 1;
            }
            Status::Failed => {
                self.ran += 1;
                self.failed += 1;
            }
        }
    }

    /// class-init succeeded, no test failed, class-cleanup succeeded
    pub fn succeeded(&self) -> bool {
        self.class_init.succeeded() && self.failed == 0 && self.class_cleanup.succeeded()
    }
}

/// Aggregate over every container of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Containers processed
    pub containers: usize,
    /// Containers whose overall outcome failed
    pub failed_containers: usize,
    /// Test cases across all containers
    pub total: usize,
    /// Executed test cases
    pub ran: usize,
    /// Ignored test cases
    pub ignored: usize,
    /// Passed test cases
    pub passed: usize,
    /// Failed test cases
    pub failed: usize,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl RunSummary {
    /// Aggregate container summaries
    pub fn from_classes<'a>(classes: impl IntoIterator<Item = &'a ClassSummary>) -> Self {
        classes
            .into_iter()
            .fold(RunSummary::default(), |mut run, class| {
                run.containers += 1;
                if !class.succeeded() {
                    run.failed_containers += 1;
                }
                run.total += class.total;
                run.ran += class.ran;
                run.ignored += class.ignored;
                run.passed += class.passed;
                run.failed += class.failed;
                run
            })
    }

    /// Logical AND of every container's outcome; vacuously true when empty
    pub fn succeeded(&self) -> bool {
        self.failed_containers == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxtest_core::CapturedError;

    #[test]
    fn test_hook_status_from_result() {
        let ok = ExecutionResult::passed(Duration::ZERO);
        let bad = ExecutionResult::failed(Duration::ZERO, CapturedError::new("k", "m"));

        assert_eq!(HookStatus::from_result(None), HookStatus::NotPresent);
        assert_eq!(HookStatus::from_result(Some(&ok)), HookStatus::Succeeded);
        assert_eq!(HookStatus::from_result(Some(&bad)), HookStatus::Failed);
        assert!(HookStatus::NotPresent.succeeded());
        assert_eq!(HookStatus::NotPresent.to_string(), "Not present");
    }

    #[test]
    fn test_class_summary_counts() {
        let mut summary = ClassSummary::new("suite");
        summary.record(Status::Passed);
        summary.record(Status::Failed);
        summary.record(Status::Ignored);

        assert_eq!(
            (summary.total, summary.ran, summary.ignored, summary.passed, summary.failed),
            (3, 2, 1, 1, 1)
        );
        assert!(!summary.succeeded());
    }

    #[test]
    fn test_class_summary_hook_failure() {
        let mut summary = ClassSummary::new("suite");
        summary.record(Status::Passed);
        assert!(summary.succeeded());

        summary.class_cleanup = HookStatus::Failed;
        assert!(!summary.succeeded());
    }

    #[test]
    fn test_run_summary() {
        let mut good = ClassSummary::new("a");
        good.record(Status::Passed);
        let mut bad = ClassSummary::new("b");
        bad.class_init = HookStatus::Failed;
        bad.record(Status::Ignored);

        let run = RunSummary::from_classes([&good, &bad]);
        assert_eq!(run.containers, 2);
        assert_eq!(run.failed_containers, 1);
        assert_eq!(run.total, 2);
        assert!(!run.succeeded());

        assert!(RunSummary::from_classes(std::iter::empty()).succeeded());
    }
}
