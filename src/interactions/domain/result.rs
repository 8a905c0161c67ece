//! Uniform dispatch results and handler faults.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a failed dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No registered command matches the interaction.
    UnknownCommand,
    /// The matched command cannot handle the supplied interaction kind.
    ParseFailed,
    /// Argument binding failed.
    BadArgs,
    /// A hook or the handler body faulted.
    Exception,
    /// The handler finished without a recognizable result.
    Unsuccessful,
    /// The precondition chain rejected the dispatch.
    UnmetPrecondition,
}

impl ErrorKind {
    /// Returns the canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownCommand => "unknown_command",
            Self::ParseFailed => "parse_failed",
            Self::BadArgs => "bad_args",
            Self::Exception => "exception",
            Self::Unsuccessful => "unsuccessful",
            Self::UnmetPrecondition => "unmet_precondition",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fault raised by module construction, a lifecycle hook or a handler
/// body.
///
/// `HandlerError` converts from any `std::error::Error`, so handlers can use
/// `?` on their own error types. It deliberately does not implement
/// `std::error::Error` itself, which keeps that blanket conversion coherent.
#[derive(Clone)]
pub struct HandlerError {
    inner: Arc<dyn StdError + Send + Sync>,
}

impl HandlerError {
    /// Wraps an error value.
    pub fn new(err: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(err),
        }
    }

    /// Creates a fault from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(FaultMessage(message.into()))
    }

    /// Converts a captured panic payload into a fault.
    #[must_use]
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|text| (*text).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "handler panicked".to_owned());
        Self::new(HandlerPanic(message))
    }

    /// Returns the wrapped error.
    #[must_use]
    pub fn get_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.inner
    }

    /// Peels wrapper errors through [`StdError::source`] and returns the
    /// innermost cause.
    #[must_use]
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        let mut current: &(dyn StdError + 'static) = &*self.inner;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }

    /// Returns `true` when the fault was produced from a panic.
    #[must_use]
    pub fn is_panic(&self) -> bool {
        self.root_cause().is::<HandlerPanic>()
    }
}

impl<E> From<E> for HandlerError
where
    E: StdError + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self::new(err)
    }
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandlerError").field(&self.inner).finish()
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
struct FaultMessage(String);

/// Fault produced when a handler or hook panics.
#[derive(Debug, Error)]
#[error("handler panicked: {0}")]
pub struct HandlerPanic(pub String);

/// Details of a failed dispatch.
#[derive(Debug, Clone)]
pub struct InteractionError {
    kind: ErrorKind,
    reason: String,
    nested: Vec<InteractionResult>,
    fault: Option<HandlerError>,
}

impl InteractionError {
    /// Returns the failure classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the human-readable reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Returns the per-branch results of a failed precondition group.
    #[must_use]
    pub fn nested(&self) -> &[InteractionResult] {
        &self.nested
    }

    /// Returns the fault behind an [`ErrorKind::Exception`] result.
    #[must_use]
    pub const fn fault(&self) -> Option<&HandlerError> {
        self.fault.as_ref()
    }
}

impl PartialEq for InteractionError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.reason == other.reason && self.nested == other.nested
    }
}

/// Outcome of a dispatch: either success or a classified error.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionResult {
    /// The dispatch succeeded.
    Success,
    /// The dispatch failed.
    Error(InteractionError),
}

impl InteractionResult {
    /// Creates an error result of the given kind.
    pub fn error(kind: ErrorKind, reason: impl Into<String>) -> Self {
        Self::Error(InteractionError {
            kind,
            reason: reason.into(),
            nested: Vec::new(),
            fault: None,
        })
    }

    /// Creates an [`ErrorKind::UnknownCommand`] result.
    pub fn unknown_command(reason: impl Into<String>) -> Self {
        Self::error(ErrorKind::UnknownCommand, reason)
    }

    /// Creates an [`ErrorKind::BadArgs`] result.
    pub fn bad_args(reason: impl Into<String>) -> Self {
        Self::error(ErrorKind::BadArgs, reason)
    }

    /// Creates an [`ErrorKind::UnmetPrecondition`] result.
    pub fn unmet_precondition(reason: impl Into<String>) -> Self {
        Self::error(ErrorKind::UnmetPrecondition, reason)
    }

    /// Creates an aggregated precondition-group failure carrying every
    /// branch result.
    pub fn group_failure(reason: impl Into<String>, nested: Vec<Self>) -> Self {
        Self::Error(InteractionError {
            kind: ErrorKind::UnmetPrecondition,
            reason: reason.into(),
            nested,
            fault: None,
        })
    }

    /// Creates an [`ErrorKind::Exception`] result from a fault, using the
    /// fault's root cause as the reason.
    #[must_use]
    pub fn from_fault(fault: HandlerError) -> Self {
        Self::Error(InteractionError {
            kind: ErrorKind::Exception,
            reason: fault.root_cause().to_string(),
            nested: Vec::new(),
            fault: Some(fault),
        })
    }

    /// Returns `true` for [`InteractionResult::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns the error details of a failed result.
    #[must_use]
    pub const fn as_error(&self) -> Option<&InteractionError> {
        match self {
            Self::Success => None,
            Self::Error(error) => Some(error),
        }
    }

    /// Returns the error kind of a failed result.
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.as_error().map(InteractionError::kind)
    }
}

impl fmt::Display for InteractionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Error(error) => write!(f, "{}: {}", error.kind, error.reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, Error)]
    #[error("database offline")]
    struct Offline;

    #[derive(Debug, Error)]
    #[error("query failed")]
    struct QueryFailed(#[source] Offline);

    #[derive(Debug, Error)]
    #[error("handler wrapper")]
    struct Wrapper(#[source] QueryFailed);

    #[rstest]
    fn root_cause_peels_every_wrapper() {
        let fault = HandlerError::new(Wrapper(QueryFailed(Offline)));

        assert_eq!(fault.root_cause().to_string(), "database offline");
        assert_eq!(fault.to_string(), "handler wrapper");
    }

    #[rstest]
    fn exception_result_reports_root_cause() {
        let result = InteractionResult::from_fault(HandlerError::new(QueryFailed(Offline)));

        let error = result.as_error().expect("exception result");
        assert_eq!(error.kind(), ErrorKind::Exception);
        assert_eq!(error.reason(), "database offline");
        assert!(error.fault().is_some());
    }

    #[rstest]
    fn panic_payloads_become_faults() {
        let payload: Box<dyn Any + Send> = Box::new("boom");

        let fault = HandlerError::from_panic(payload.as_ref());

        assert!(fault.is_panic());
        assert_eq!(fault.to_string(), "handler panicked: boom");
    }

    #[rstest]
    fn results_compare_without_faults() {
        let left = InteractionResult::bad_args("missing user");
        let right = InteractionResult::bad_args("missing user");

        assert_eq!(left, right);
        assert_ne!(left, InteractionResult::Success);
    }
}
