//! Test Case Execution
//!
//! Runs one test case against a fresh instance of its container.
//!
//! ## Step Order
//!
//! ```text
//! ignore marker? ──yes──▶ Ignored (no instance built)
//!       │ no
//!       ▼
//!  construct instance ──fail──▶ Failed (invocation fault)
//!       │
//!       ▼
//!   test-init ──fail──▶ Failed (body and test-cleanup skipped)
//!       │
//!       ▼
//!     body ──────fail──▶ Failed (test-cleanup skipped)
//!       │
//!       ▼
//!  test-cleanup ──▶ Passed / Failed
//!       │
//!       ▼
//!  drop instance ──panic──▶ Failed (recorded as a disposal step)
//! ```
//!
//! Absent hooks are skipped and count as success. Each step is timed on its
//! own. The instance is dropped as soon as the case finishes, whichever step
//! it stopped at; a disposal step appears only when the drop panics.

use fluxtest_core::{
    CapturedError, ExecutionResult, HookFn, LifecycleHook, Status, TestCase, TestContainer,
    TestInstance, catch_panic, invoke,
};
use std::any::Any;
use std::fmt;
use std::time::Instant;

/// Configuration for test execution
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Record backtraces for panics raised by user code
    pub capture_backtraces: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            capture_backtraces: true,
        }
    }
}

/// A step of a test case's lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Building the fresh test instance
    Construct,
    /// The container's test-init hook
    TestInit,
    /// The test body
    Body,
    /// The container's test-cleanup hook
    TestCleanup,
    /// Dropping the test instance
    Dispose,
}

impl Step {
    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            Step::Construct => "Instance construction",
            Step::TestInit => "Test init",
            Step::Body => "Test body",
            Step::TestCleanup => "Test cleanup",
            Step::Dispose => "Instance disposal",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of one invoked step
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Which step ran
    pub step: Step,
    /// Name of the hook that filled the step, if any
    pub hook: Option<String>,
    /// Its outcome
    pub result: ExecutionResult,
}

/// Why a test case was not executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The test case carries the ignore marker
    Marked,
    /// The container carries the ignore marker
    ContainerIgnored,
    /// The container's class-init did not succeed
    ClassInitFailed,
}

impl IgnoreReason {
    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            IgnoreReason::Marked => "test case marked ignore",
            IgnoreReason::ContainerIgnored => "container marked ignore",
            IgnoreReason::ClassInitFailed => "class init failed",
        }
    }
}

/// Outcome of a single test case
#[derive(Debug, Clone)]
pub struct CaseOutcome {
    /// Test case name
    pub name: String,
    /// Classified status
    pub status: Status,
    /// Set when the case was not executed
    pub ignored: Option<IgnoreReason>,
    /// Steps that were invoked, in order
    pub steps: Vec<StepResult>,
}

impl CaseOutcome {
    /// A case that was gated out before any step ran
    pub fn ignored(name: impl Into<String>, reason: IgnoreReason) -> Self {
        Self {
            name: name.into(),
            status: Status::classify(false, std::iter::empty::<&ExecutionResult>()),
            ignored: Some(reason),
            steps: Vec::new(),
        }
    }

    /// Result of `step`, if it was invoked
    pub fn step(&self, step: Step) -> Option<&ExecutionResult> {
        self.steps.iter().find(|s| s.step == step).map(|s| &s.result)
    }
}

/// Runs individual test cases
pub struct TestExecutor {
    config: ExecutionConfig,
}

impl TestExecutor {
    /// Create an executor
    pub fn new(config: ExecutionConfig) -> Self {
        Self { config }
    }

    /// Execution configuration in use
    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Run `case` of `container`
    pub fn execute(&self, container: &TestContainer, case: &TestCase) -> CaseOutcome {
        if case.ignored {
            tracing::debug!(container = %container.name, case = %case.name, "ignored");
            return CaseOutcome::ignored(case.name.as_str(), IgnoreReason::Marked);
        }

        tracing::debug!(container = %container.name, case = %case.name, "running test case");
        let mut steps = Vec::new();

        let start = Instant::now();
        let constructed = catch_panic(self.config.capture_backtraces, || container.new_instance())
            .and_then(|instance| instance);
        let mut instance = match constructed {
            Ok(instance) => instance,
            Err(error) => {
                let fault = CapturedError::invocation_fault(format!(
                    "could not construct a test instance of {}",
                    container.name
                ))
                .with_data("case", &case.name)
                .with_cause(error);
                steps.push(StepResult {
                    step: Step::Construct,
                    hook: None,
                    result: ExecutionResult::failed(start.elapsed(), fault),
                });
                return self.finish(case, steps);
            }
        };

        let initialized = self.run_hook(
            Step::TestInit,
            container.hooks.test_init.as_ref(),
            instance.as_mut(),
            &mut steps,
        );
        if initialized && self.run_body(case, instance.as_mut(), &mut steps) {
            self.run_hook(
                Step::TestCleanup,
                container.hooks.test_cleanup.as_ref(),
                instance.as_mut(),
                &mut steps,
            );
        }

        self.dispose(instance, &mut steps);
        self.finish(case, steps)
    }

    fn finish(&self, case: &TestCase, steps: Vec<StepResult>) -> CaseOutcome {
        let status = Status::classify(true, steps.iter().map(|s| &s.result));
        tracing::debug!(case = %case.name, %status, "test case finished");
        CaseOutcome {
            name: case.name.clone(),
            status,
            ignored: None,
            steps,
        }
    }

    /// Drop `instance` under panic capture; user `Drop` impls are user code
    fn dispose(&self, instance: TestInstance, steps: &mut Vec<StepResult>) {
        let start = Instant::now();
        if let Err(error) = catch_panic(self.config.capture_backtraces, move || drop(instance)) {
            steps.push(StepResult {
                step: Step::Dispose,
                hook: None,
                result: ExecutionResult::failed(start.elapsed(), error),
            });
        }
    }

    fn run_body(&self, case: &TestCase, instance: &mut dyn Any, steps: &mut Vec<StepResult>) -> bool {
        let result = invoke(self.config.capture_backtraces, || (case.body)(instance));
        let succeeded = result.succeeded();
        steps.push(StepResult {
            step: Step::Body,
            hook: None,
            result,
        });
        succeeded
    }

    /// Returns whether the next step may run
    fn run_hook(
        &self,
        step: Step,
        hook: Option<&LifecycleHook>,
        instance: &mut dyn Any,
        steps: &mut Vec<StepResult>,
    ) -> bool {
        let Some(hook) = hook else {
            return true;
        };

        let result = match &hook.call {
            HookFn::Instance(call) => invoke(self.config.capture_backtraces, || call(instance)),
            HookFn::Static(_) => ExecutionResult::failed(
                std::time::Duration::ZERO,
                CapturedError::invocation_fault(format!(
                    "{} hook {} does not take a test instance",
                    hook.role, hook.name
                )),
            ),
        };
        let succeeded = result.succeeded();
        steps.push(StepResult {
            step,
            hook: Some(hook.name.clone()),
            result,
        });
        succeeded
    }
}
