//! Container Lifecycle
//!
//! Drives one container from class-init to class-cleanup:
//!
//! 1. class-init (absent counts as success)
//! 2. gating: an ignored container, or a failed class-init, classifies every
//!    case Ignored without building an instance
//! 3. each case in order through the [`TestExecutor`]
//! 4. class-cleanup, unconditionally
//! 5. [`ClassSummary`]

use super::execution::{CaseOutcome, ExecutionConfig, IgnoreReason, TestExecutor};
use fluxtest_core::{
    CapturedError, ExecutionResult, HookFn, LifecycleHook, Status, TestContainer, invoke,
};
use fluxtest_report::{ClassSummary, HookStatus, Reporter};
use std::io::{self, Write};
use std::time::Duration;

/// Everything recorded while running one container
#[derive(Debug, Clone)]
pub struct ContainerOutcome {
    /// Aggregate counts and hook statuses
    pub summary: ClassSummary,
    /// class-init result, `None` when the container has no class-init
    pub class_init: Option<ExecutionResult>,
    /// class-cleanup result, `None` when the container has no class-cleanup
    pub class_cleanup: Option<ExecutionResult>,
    /// Per-case outcomes in execution order
    pub cases: Vec<CaseOutcome>,
}

impl ContainerOutcome {
    /// class-init succeeded, no case failed, class-cleanup succeeded
    pub fn succeeded(&self) -> bool {
        self.summary.succeeded()
    }
}

/// Runs containers one at a time, reporting as it goes
pub struct Orchestrator {
    executor: TestExecutor,
}

impl Orchestrator {
    /// Create an orchestrator
    pub fn new(config: ExecutionConfig) -> Self {
        Self {
            executor: TestExecutor::new(config),
        }
    }

    /// The per-case executor
    pub fn executor(&self) -> &TestExecutor {
        &self.executor
    }

    /// Run every case of `container` between its class hooks
    pub fn run_container<W: Write>(
        &self,
        container: &TestContainer,
        reporter: &mut Reporter<W>,
    ) -> io::Result<ContainerOutcome> {
        tracing::info!(
            container = %container.name,
            cases = container.cases.len(),
            ignored = container.ignored,
            "running container"
        );

        let title = format!("Container: {}", container.name);
        if container.ignored {
            reporter.heading(&[title.as_str(), "(container marked ignore)"])?;
        } else {
            reporter.heading(&[title.as_str()])?;
        }

        let class_init = self.run_class_hook(container.hooks.class_init.as_ref());
        if let Some(result) = &class_init {
            reporter.step(&hook_label("Class init", container.hooks.class_init.as_ref()), result)?;
        }

        let gate = if container.ignored {
            Some(IgnoreReason::ContainerIgnored)
        } else if class_init.as_ref().is_some_and(|r| !r.succeeded()) {
            tracing::warn!(container = %container.name, "class init failed, skipping test cases");
            Some(IgnoreReason::ClassInitFailed)
        } else {
            None
        };

        let mut summary = ClassSummary::new(container.name.as_str());
        let mut cases = Vec::with_capacity(container.cases.len());
        for case in &container.cases {
            let outcome = match gate {
                Some(reason) => CaseOutcome::ignored(case.name.as_str(), reason),
                None => self.executor.execute(container, case),
            };
            report_case(reporter, &outcome)?;
            summary.record(outcome.status);
            cases.push(outcome);
        }

        let class_cleanup = self.run_class_hook(container.hooks.class_cleanup.as_ref());
        if let Some(result) = &class_cleanup {
            reporter.step(
                &hook_label("Class cleanup", container.hooks.class_cleanup.as_ref()),
                result,
            )?;
        }

        summary.class_init = HookStatus::from_result(class_init.as_ref());
        summary.class_cleanup = HookStatus::from_result(class_cleanup.as_ref());
        reporter.class_summary(&summary)?;

        tracing::info!(
            container = %container.name,
            passed = summary.passed,
            failed = summary.failed,
            ignored = summary.ignored,
            succeeded = summary.succeeded(),
            "container finished"
        );

        Ok(ContainerOutcome {
            summary,
            class_init,
            class_cleanup,
            cases,
        })
    }

    fn run_class_hook(&self, hook: Option<&LifecycleHook>) -> Option<ExecutionResult> {
        let hook = hook?;
        tracing::debug!(hook = %hook.name, role = %hook.role, "invoking class hook");
        let result = match &hook.call {
            HookFn::Static(call) => invoke(self.executor.config().capture_backtraces, || call()),
            HookFn::Instance(_) => ExecutionResult::failed(
                Duration::ZERO,
                CapturedError::invocation_fault(format!(
                    "{} hook {} cannot take a test instance",
                    hook.role, hook.name
                )),
            ),
        };
        Some(result)
    }
}

fn hook_label(role: &str, hook: Option<&LifecycleHook>) -> String {
    match hook {
        Some(hook) => format!("{role} ({})", hook.name),
        None => role.to_string(),
    }
}

fn report_case<W: Write>(reporter: &mut Reporter<W>, outcome: &CaseOutcome) -> io::Result<()> {
    let title = format!("Test: {}", outcome.name);
    reporter.subheading(&[title.as_str()])?;

    if let Some(reason) = outcome.ignored {
        return reporter.line(&format!("Result: {} ({})", Status::Ignored, reason.label()));
    }

    for step in &outcome.steps {
        let label = match &step.hook {
            Some(name) => format!("{} ({name})", step.step),
            None => step.step.label().to_string(),
        };
        reporter.step(&label, &step.result)?;
    }
    reporter.line(&format!("Result: {}", outcome.status))
}
