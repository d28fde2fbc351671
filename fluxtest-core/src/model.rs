//! Test Model
//!
//! Registration-time descriptors ([`Registration`]) and the resolved,
//! immutable structures produced by discovery ([`TestContainer`],
//! [`TestCase`], [`LifecycleHook`]).
//!
//! Callables are stored type-erased: instance-scoped callables receive the
//! test instance as `&mut dyn Any` and downcast it themselves.

use crate::error::{CapturedError, TestResult};
use std::any::Any;
use std::fmt;

/// A fresh test instance, owned by exactly one test case invocation
pub type TestInstance = Box<dyn Any>;

/// Constructs a fresh [`TestInstance`]
pub type InstanceFactory = Box<dyn Fn() -> Result<TestInstance, CapturedError>>;

/// Callable run without an instance (class-init / class-cleanup)
pub type StaticFn = Box<dyn Fn() -> TestResult>;

/// Callable run against a test instance (test body, test-init, test-cleanup)
pub type InstanceFn = Box<dyn Fn(&mut dyn Any) -> TestResult>;

/// Role a lifecycle hook fills within its container
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HookRole {
    /// Runs once before any test case of the container
    ClassInit,
    /// Runs once after every test case of the container
    ClassCleanup,
    /// Runs before each test case body
    TestInit,
    /// Runs after each successful test case body
    TestCleanup,
}

impl HookRole {
    /// Whether the hook runs against a test instance
    pub fn is_per_test(self) -> bool {
        matches!(self, HookRole::TestInit | HookRole::TestCleanup)
    }

    /// Display label used in reports and logs
    pub fn label(self) -> &'static str {
        match self {
            HookRole::ClassInit => "class-init",
            HookRole::ClassCleanup => "class-cleanup",
            HookRole::TestInit => "test-init",
            HookRole::TestCleanup => "test-cleanup",
        }
    }
}

impl fmt::Display for HookRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Callable bound to a hook role
pub enum HookFn {
    /// Class-scoped, no instance
    Static(StaticFn),
    /// Test-scoped, receives the test instance
    Instance(InstanceFn),
}

/// A lifecycle hook (or hook candidate, before discovery)
pub struct LifecycleHook {
    /// Name of the callable that provides the hook
    pub name: String,
    /// Role the hook fills
    pub role: HookRole,
    /// The callable
    pub call: HookFn,
}

impl fmt::Debug for LifecycleHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleHook")
            .field("name", &self.name)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// A single named unit of test logic
pub struct TestCase {
    /// Test case name, unique within its container
    pub name: String,
    /// Ignore marker
    pub ignored: bool,
    /// Test body
    pub body: InstanceFn,
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("ignored", &self.ignored)
            .finish_non_exhaustive()
    }
}

/// A container as registered, before discovery orders it and resolves hooks
pub struct Registration {
    /// Qualified container name
    pub name: String,
    /// Ignore marker for the whole container
    pub ignored: bool,
    /// Instance constructor
    pub factory: InstanceFactory,
    /// Test cases in registration order
    pub cases: Vec<TestCase>,
    /// Hook candidates in registration order; several may share a role
    pub hooks: Vec<LifecycleHook>,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("ignored", &self.ignored)
            .field("cases", &self.cases)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

/// Resolved hook slots of a container; at most one hook per role
#[derive(Debug, Default)]
pub struct HookSet {
    /// class-init
    pub class_init: Option<LifecycleHook>,
    /// class-cleanup
    pub class_cleanup: Option<LifecycleHook>,
    /// test-init
    pub test_init: Option<LifecycleHook>,
    /// test-cleanup
    pub test_cleanup: Option<LifecycleHook>,
}

impl HookSet {
    /// The hook filling `role`, if any
    pub fn get(&self, role: HookRole) -> Option<&LifecycleHook> {
        match role {
            HookRole::ClassInit => self.class_init.as_ref(),
            HookRole::ClassCleanup => self.class_cleanup.as_ref(),
            HookRole::TestInit => self.test_init.as_ref(),
            HookRole::TestCleanup => self.test_cleanup.as_ref(),
        }
    }

    pub(crate) fn slot_mut(&mut self, role: HookRole) -> &mut Option<LifecycleHook> {
        match role {
            HookRole::ClassInit => &mut self.class_init,
            HookRole::ClassCleanup => &mut self.class_cleanup,
            HookRole::TestInit => &mut self.test_init,
            HookRole::TestCleanup => &mut self.test_cleanup,
        }
    }
}

/// A discovered test container: cases sorted by name, hooks resolved
pub struct TestContainer {
    /// Qualified container name
    pub name: String,
    /// Ignore marker for the whole container
    pub ignored: bool,
    /// Instance constructor, called once per executed test case
    pub factory: InstanceFactory,
    /// Test cases, ascending by name
    pub cases: Vec<TestCase>,
    /// Resolved lifecycle hooks
    pub hooks: HookSet,
}

impl TestContainer {
    /// Build a fresh test instance
    pub fn new_instance(&self) -> Result<TestInstance, CapturedError> {
        (self.factory)()
    }

    /// Keep only the test cases accepted by `keep`
    pub fn retain_cases(&mut self, keep: impl FnMut(&TestCase) -> bool) {
        self.cases.retain(keep);
    }
}

impl fmt::Debug for TestContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestContainer")
            .field("name", &self.name)
            .field("ignored", &self.ignored)
            .field("cases", &self.cases)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}
