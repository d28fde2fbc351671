//! Captured Errors
//!
//! Every failure raised by user code (test bodies and lifecycle hooks) is
//! converted into a [`CapturedError`] at the point of invocation. A captured
//! error carries everything the diagnostics formatter renders: message, kind,
//! metadata, originating component, help link, stack trace and cause chain.
//!
//! `CapturedError` does not implement `std::error::Error`; any
//! `E: std::error::Error` converts into it with `?`.

use std::collections::BTreeMap;
use std::fmt;

/// Kind reported for errors reached only through `Error::source()`
pub const DYN_ERROR_KIND: &str = "dyn Error";

/// Kind reported for panics caught in user code
pub const PANIC_KIND: &str = "panic";

/// Kind reported when the engine cannot invoke a hook or test case
pub const INVOCATION_FAULT_KIND: &str = "fluxtest::InvocationFault";

/// An error raised by test or hook code, captured for reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedError {
    message: String,
    kind: String,
    data: BTreeMap<String, String>,
    component: Option<String>,
    help_link: Option<String>,
    stack_trace: Option<String>,
    cause: Option<Box<CapturedError>>,
}

/// Result type returned by test bodies and lifecycle hooks
pub type TestResult = Result<(), CapturedError>;

impl CapturedError {
    /// Create an error with an explicit kind identifier
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: kind.into(),
            data: BTreeMap::new(),
            component: None,
            help_link: None,
            stack_trace: None,
            cause: None,
        }
    }

    /// Capture a concrete error value, keeping its type name as the kind
    ///
    /// The `source()` chain of `error` becomes the cause chain.
    pub fn from_error<E>(error: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let mut captured = Self::new(std::any::type_name::<E>(), error.to_string());
        captured.cause = error.source().map(|s| Box::new(Self::from_source(s)));
        captured
    }

    fn from_source(error: &(dyn std::error::Error + 'static)) -> Self {
        let mut captured = Self::new(DYN_ERROR_KIND, error.to_string());
        captured.cause = error.source().map(|s| Box::new(Self::from_source(s)));
        captured
    }

    /// The engine itself could not run a hook or test case
    pub fn invocation_fault(message: impl Into<String>) -> Self {
        Self::new(INVOCATION_FAULT_KIND, message).with_component("fluxtest")
    }

    /// Attach a key/value metadata pair
    pub fn with_data(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.data.insert(key.into(), value.to_string());
        self
    }

    /// Label the component the error originated from
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Attach an external reference link
    pub fn with_help_link(mut self, link: impl Into<String>) -> Self {
        self.help_link = Some(link.into());
        self
    }

    /// Attach a raw stack trace (normalized by the formatter)
    pub fn with_stack_trace(mut self, trace: impl Into<String>) -> Self {
        self.stack_trace = Some(trace.into());
        self
    }

    /// Set the underlying cause
    pub fn with_cause(mut self, cause: impl Into<CapturedError>) -> Self {
        self.cause = Some(Box::new(cause.into()));
        self
    }

    /// Human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Concrete kind identifier
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Metadata pairs, in key order
    pub fn data(&self) -> &BTreeMap<String, String> {
        &self.data
    }

    /// Originating component label
    pub fn component(&self) -> Option<&str> {
        self.component.as_deref()
    }

    /// External reference link
    pub fn help_link(&self) -> Option<&str> {
        self.help_link.as_deref()
    }

    /// Raw stack trace, if captured
    pub fn stack_trace(&self) -> Option<&str> {
        self.stack_trace.as_deref()
    }

    /// Underlying cause
    pub fn cause(&self) -> Option<&CapturedError> {
        self.cause.as_deref()
    }

    /// Iterate over this error and every cause beneath it
    pub fn chain(&self) -> impl Iterator<Item = &CapturedError> {
        std::iter::successors(Some(self), |e| e.cause())
    }
}

impl fmt::Display for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl<E> From<E> for CapturedError
where
    E: std::error::Error,
{
    fn from(error: E) -> Self {
        Self::from_error(&error)
    }
}

/// Conversion from the return value of a test body or hook
///
/// Implemented for `()` and for `Result<(), E>` where `E` converts into a
/// [`CapturedError`], so tests may either return nothing (and panic on
/// failure) or return errors with `?`.
pub trait IntoTestResult {
    /// Convert into the engine's result type
    fn into_test_result(self) -> TestResult;
}

impl IntoTestResult for () {
    fn into_test_result(self) -> TestResult {
        Ok(())
    }
}

impl<E> IntoTestResult for Result<(), E>
where
    E: Into<CapturedError>,
{
    fn into_test_result(self) -> TestResult {
        self.map_err(Into::into)
    }
}
