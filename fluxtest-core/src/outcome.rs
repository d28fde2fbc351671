//! Outcome Classification
//!
//! Every hook and test invocation yields an [`ExecutionResult`]; nothing
//! raised by user code unwinds past [`invoke`].

use crate::capture::catch_panic;
use crate::error::{CapturedError, TestResult};
use std::fmt;
use std::time::{Duration, Instant};

/// Tri-state outcome of a test case or hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Every invoked step succeeded
    Passed,
    /// At least one invoked step failed
    Failed,
    /// Not executed: ignore marker or container gating
    Ignored,
}

impl Status {
    /// Classify a sequence of invoked steps
    ///
    /// `executed == false` means the case was gated out before any step ran.
    pub fn classify<'a>(
        executed: bool,
        steps: impl IntoIterator<Item = &'a ExecutionResult>,
    ) -> Status {
        if !executed {
            return Status::Ignored;
        }
        if steps.into_iter().all(ExecutionResult::succeeded) {
            Status::Passed
        } else {
            Status::Failed
        }
    }

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            Status::Passed => "Passed",
            Status::Failed => "Failed",
            Status::Ignored => "Ignored",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one timed invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    /// Passed or Failed (Ignored for steps that never ran)
    pub status: Status,
    /// Wall-clock time spent in the invocation
    pub elapsed: Duration,
    /// The captured error, when failed
    pub error: Option<CapturedError>,
}

impl ExecutionResult {
    /// A successful invocation
    pub fn passed(elapsed: Duration) -> Self {
        Self {
            status: Status::Passed,
            elapsed,
            error: None,
        }
    }

    /// A failed invocation
    pub fn failed(elapsed: Duration, error: CapturedError) -> Self {
        Self {
            status: Status::Failed,
            elapsed,
            error: Some(error),
        }
    }

    /// A step that was never invoked
    pub fn ignored() -> Self {
        Self {
            status: Status::Ignored,
            elapsed: Duration::ZERO,
            error: None,
        }
    }

    /// Whether the invocation succeeded
    pub fn succeeded(&self) -> bool {
        self.status == Status::Passed
    }
}

/// Invoke user code, timing it and capturing errors and panics
pub fn invoke(backtraces: bool, f: impl FnOnce() -> TestResult) -> ExecutionResult {
    let start = Instant::now();
    let outcome = catch_panic(backtraces, f);
    let elapsed = start.elapsed();

    match outcome {
        Ok(Ok(())) => ExecutionResult::passed(elapsed),
        Ok(Err(error)) | Err(error) => ExecutionResult::failed(elapsed, error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoke_success() {
        let result = invoke(false, || Ok(()));
        assert_eq!(result.status, Status::Passed);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_invoke_error() {
        let result = invoke(false, || Err(CapturedError::new("k", "bad")));
        assert_eq!(result.status, Status::Failed);
        assert_eq!(result.error.unwrap().message(), "bad");
    }

    #[test]
    fn test_invoke_panic() {
        let result = invoke(false, || panic!("kaboom"));
        assert_eq!(result.status, Status::Failed);
        assert_eq!(result.error.unwrap().kind(), crate::error::PANIC_KIND);
    }

    #[test]
    fn test_invoke_measures_time() {
        let result = invoke(false, || {
            std::thread::sleep(Duration::from_millis(5));
            Ok(())
        });
        assert!(result.elapsed >= Duration::from_millis(5));
    }

    #[test]
    fn test_classify() {
        let ok = ExecutionResult::passed(Duration::ZERO);
        let bad = ExecutionResult::failed(Duration::ZERO, CapturedError::new("k", "m"));

        assert_eq!(Status::classify(false, [&bad]), Status::Ignored);
        assert_eq!(Status::classify(true, Vec::<&ExecutionResult>::new()), Status::Passed);
        assert_eq!(Status::classify(true, [&ok, &ok]), Status::Passed);
        assert_eq!(Status::classify(true, [&ok, &bad]), Status::Failed);
    }
}
