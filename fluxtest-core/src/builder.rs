//! Container Builder
//!
//! Typed front end for registering a container. Bodies and hooks are written
//! against the concrete instance type `T`; the builder erases them into the
//! [`Registration`] form the engine consumes.
//!
//! ```ignore
//! let registration = ContainerBuilder::<Fixture>::with_default("db::Queries")
//!     .class_init("start_server", || start_server())
//!     .test_init("open", |f: &mut Fixture| f.open())
//!     .case("select_one", |f: &mut Fixture| f.select_one())
//!     .build();
//! ```

use crate::error::{CapturedError, IntoTestResult, TestResult};
use crate::model::{
    HookFn, HookRole, InstanceFactory, InstanceFn, LifecycleHook, Registration, StaticFn, TestCase,
    TestInstance,
};
use std::any::Any;
use std::marker::PhantomData;

/// Registers one container whose test instances have type `T`
pub struct ContainerBuilder<T> {
    name: String,
    ignored: bool,
    factory: InstanceFactory,
    cases: Vec<TestCase>,
    hooks: Vec<LifecycleHook>,
    _instance: PhantomData<fn() -> T>,
}

impl<T: 'static> ContainerBuilder<T> {
    /// Start a container with a fallible instance constructor
    pub fn new<F, E>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<T, E> + 'static,
        E: Into<CapturedError>,
    {
        let factory: InstanceFactory = Box::new(move || {
            factory()
                .map(|instance| Box::new(instance) as TestInstance)
                .map_err(Into::into)
        });
        Self {
            name: name.into(),
            ignored: false,
            factory,
            cases: Vec::new(),
            hooks: Vec::new(),
            _instance: PhantomData,
        }
    }

    /// Set the container's ignore marker
    pub fn ignore(mut self, ignored: bool) -> Self {
        self.ignored = ignored;
        self
    }

    /// Add a test case
    pub fn case<F, R>(self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut T) -> R + 'static,
        R: IntoTestResult,
    {
        self.push_case(name.into(), false, body)
    }

    /// Add a test case carrying the ignore marker
    pub fn ignored_case<F, R>(self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut T) -> R + 'static,
        R: IntoTestResult,
    {
        self.push_case(name.into(), true, body)
    }

    /// Add a class-init hook candidate
    pub fn class_init<F, R>(self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn() -> R + 'static,
        R: IntoTestResult,
    {
        self.push_static(name.into(), HookRole::ClassInit, hook)
    }

    /// Add a class-cleanup hook candidate
    pub fn class_cleanup<F, R>(self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn() -> R + 'static,
        R: IntoTestResult,
    {
        self.push_static(name.into(), HookRole::ClassCleanup, hook)
    }

    /// Add a test-init hook candidate
    pub fn test_init<F, R>(self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&mut T) -> R + 'static,
        R: IntoTestResult,
    {
        self.push_instance(name.into(), HookRole::TestInit, hook)
    }

    /// Add a test-cleanup hook candidate
    pub fn test_cleanup<F, R>(self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&mut T) -> R + 'static,
        R: IntoTestResult,
    {
        self.push_instance(name.into(), HookRole::TestCleanup, hook)
    }

    /// Finish registration
    pub fn build(self) -> Registration {
        Registration {
            name: self.name,
            ignored: self.ignored,
            factory: self.factory,
            cases: self.cases,
            hooks: self.hooks,
        }
    }

    fn push_case<F, R>(mut self, name: String, ignored: bool, body: F) -> Self
    where
        F: Fn(&mut T) -> R + 'static,
        R: IntoTestResult,
    {
        self.cases.push(TestCase {
            name,
            ignored,
            body: erase_instance_fn(body),
        });
        self
    }

    fn push_static<F, R>(mut self, name: String, role: HookRole, hook: F) -> Self
    where
        F: Fn() -> R + 'static,
        R: IntoTestResult,
    {
        let call: StaticFn = Box::new(move || hook().into_test_result());
        self.hooks.push(LifecycleHook {
            name,
            role,
            call: HookFn::Static(call),
        });
        self
    }

    fn push_instance<F, R>(mut self, name: String, role: HookRole, hook: F) -> Self
    where
        F: Fn(&mut T) -> R + 'static,
        R: IntoTestResult,
    {
        self.hooks.push(LifecycleHook {
            name,
            role,
            call: HookFn::Instance(erase_instance_fn(hook)),
        });
        self
    }
}

impl<T: Default + 'static> ContainerBuilder<T> {
    /// Start a container whose instances come from `T::default()`
    pub fn with_default(name: impl Into<String>) -> Self {
        Self::new(name, || Ok::<T, CapturedError>(T::default()))
    }
}

fn erase_instance_fn<T, F, R>(f: F) -> InstanceFn
where
    T: 'static,
    F: Fn(&mut T) -> R + 'static,
    R: IntoTestResult,
{
    Box::new(move |instance: &mut dyn Any| -> TestResult {
        match instance.downcast_mut::<T>() {
            Some(instance) => f(instance).into_test_result(),
            None => Err(CapturedError::invocation_fault(format!(
                "test instance is not a {}",
                std::any::type_name::<T>()
            ))),
        }
    })
}
