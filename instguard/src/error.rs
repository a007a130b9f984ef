//! Guard error taxonomy.
//!
//! - `NotAnInstance`: the owner is known but the receiver is missing or is
//!   not an instance of it. Re-evaluated on every call.
//! - `FailedInstanceCheck`: the owner cannot be determined. Permanent for
//!   the callable; the failure is cached and replayed.
//! - `AmbiguousOwner`: several distinct classes share the owner's name and
//!   the configuration rejects guessing. Also permanent.

use instguard_runtime::{CallError, FunctionObject};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by an instance guard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    /// Receiver missing or not an instance of the owner.
    #[error(
        "The `{method}` method can only be called by an instance of `{owner}` or one of its subclasses."
    )]
    NotAnInstance { method: Arc<str>, owner: Arc<str> },

    /// The owning class could not be determined.
    #[error("The owner of `{method}` could not be determined from its defining scope.")]
    FailedInstanceCheck { method: Arc<str> },

    /// The owner's name matches more than one class in the defining scope.
    #[error("The owner of `{method}` is ambiguous: {candidates} classes named `{owner}` are in scope.")]
    AmbiguousOwner {
        method: Arc<str>,
        owner: Arc<str>,
        candidates: usize,
    },
}

impl From<GuardError> for CallError {
    fn from(err: GuardError) -> Self {
        CallError::raised(err)
    }
}

/// Recover a guard error from a call error.
///
/// Guard errors travel as `CallError::Raised`, never as
/// `CallError::TypeError`. Callers that need to tell a rejected receiver
/// apart from other failures match through this function rather than on
/// the `TypeError` variant.
pub fn guard_error(err: &CallError) -> Option<&GuardError> {
    err.downcast_ref::<GuardError>()
}

// =============================================================================
// Resolution Failure
// =============================================================================

/// Why an owner could not be resolved. Cached per callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionFailure {
    /// No class matches the path's head and nothing is wrapped.
    Unowned,
    /// A tail segment is not an attribute of the running owner.
    MissingAttribute { segment: Arc<str> },
    /// The path walk ended on something that is not a class.
    NotAClass,
    /// The `wraps` chain is longer than the configured limit.
    WrapDepthExceeded { depth: usize },
    /// More than one distinct class matches the head.
    Ambiguous { owner: Arc<str>, candidates: usize },
}

impl ResolutionFailure {
    /// The error surfaced to callers of `func`.
    pub fn to_error(&self, func: &FunctionObject) -> GuardError {
        let method = Arc::from(func.name());
        match self {
            Self::Ambiguous { owner, candidates } => GuardError::AmbiguousOwner {
                method,
                owner: owner.clone(),
                candidates: *candidates,
            },
            _ => GuardError::FailedInstanceCheck { method },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use instguard_runtime::{Namespace, QualName, Value};

    #[test]
    fn test_not_an_instance_message() {
        let err = GuardError::NotAnInstance {
            method: "wrapped_method".into(),
            owner: "Class".into(),
        };
        assert_eq!(
            err.to_string(),
            "The `wrapped_method` method can only be called by an instance of `Class` or one of its subclasses."
        );
    }

    #[test]
    fn test_round_trip_through_call_error() {
        let err = GuardError::FailedInstanceCheck {
            method: "free".into(),
        };
        let call_err: CallError = err.clone().into();
        assert_eq!(guard_error(&call_err), Some(&err));
        assert!(guard_error(&CallError::type_error("x")).is_none());
    }

    #[test]
    fn test_guard_errors_are_not_type_errors() {
        let err = GuardError::NotAnInstance {
            method: "wrapped_method".into(),
            owner: "Class".into(),
        };
        let call_err: CallError = err.into();
        assert!(!matches!(call_err, CallError::TypeError { .. }));
        assert!(matches!(call_err, CallError::Raised(_)));
        assert!(matches!(
            guard_error(&call_err),
            Some(GuardError::NotAnInstance { .. })
        ));
    }

    #[test]
    fn test_failure_maps_to_error_kind() {
        let module = Namespace::module("mod");
        let func = FunctionObject::new(QualName::parse("Thing.run").unwrap(), &module, |_| {
            Ok(Value::None)
        });

        assert_eq!(
            ResolutionFailure::Unowned.to_error(&func),
            GuardError::FailedInstanceCheck { method: "run".into() }
        );
        assert_eq!(
            ResolutionFailure::Ambiguous {
                owner: "Thing".into(),
                candidates: 2
            }
            .to_error(&func),
            GuardError::AmbiguousOwner {
                method: "run".into(),
                owner: "Thing".into(),
                candidates: 2
            }
        );
    }
}
