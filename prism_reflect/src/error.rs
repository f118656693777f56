//! Outward error types.
//!
//! Callers of an accessor only ever see [`ReflectError`]. Raw [`Fault`]s are
//! carried as the `source` of an error, never returned on their own.

use crate::descriptor::CallableId;
use crate::fault::{Fault, FaultClass};
use std::sync::Arc;
use thiserror::Error;

/// Result type for accessor operations.
pub type ReflectResult<T> = Result<T, ReflectError>;

// =============================================================================
// Reflect Error
// =============================================================================

/// Error returned by accessor construction and `construct` calls.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReflectError {
    /// The caller passed arguments that do not fit the constructor.
    ///
    /// Retrying with corrected arguments may succeed.
    #[error("{message}")]
    InvalidArgument {
        /// Either `ArityMismatch` or `ArgumentTypeMismatch`.
        class: FaultClass,
        message: String,
        /// The binding fault, absent when the arity was checked up front.
        #[source]
        cause: Option<Fault>,
    },

    /// The constructor was entered and failed, or the call machinery did.
    #[error("constructor `{callable}` failed: {cause}")]
    InvocationFailed {
        callable: Arc<str>,
        /// Either `CalleeFailure` or `OtherFailure`.
        class: FaultClass,
        #[source]
        cause: Fault,
    },

    /// No accessor could be built for the callable.
    #[error(transparent)]
    ResolutionFailed(#[from] ResolveError),
}

impl ReflectError {
    /// Argument count rejected before anything was invoked.
    pub fn wrong_arity(argc: usize, expected: usize) -> Self {
        ReflectError::InvalidArgument {
            class: FaultClass::ArityMismatch,
            message: format!(
                "wrong number of arguments: {} expected: {}",
                argc, expected
            ),
            cause: None,
        }
    }

    #[inline]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, ReflectError::InvalidArgument { .. })
    }

    #[inline]
    pub fn is_invocation_failed(&self) -> bool {
        matches!(self, ReflectError::InvocationFailed { .. })
    }

    #[inline]
    pub fn is_resolution_failed(&self) -> bool {
        matches!(self, ReflectError::ResolutionFailed(_))
    }

    /// Classification of the per-call fault, if this is a per-call error.
    pub fn fault_class(&self) -> Option<FaultClass> {
        match self {
            ReflectError::InvalidArgument { class, .. }
            | ReflectError::InvocationFailed { class, .. } => Some(*class),
            ReflectError::ResolutionFailed(_) => None,
        }
    }

    /// The underlying fault, if one was raised.
    pub fn cause(&self) -> Option<&Fault> {
        match self {
            ReflectError::InvalidArgument { cause, .. } => cause.as_ref(),
            ReflectError::InvocationFailed { cause, .. } => Some(cause),
            ReflectError::ResolutionFailed(_) => None,
        }
    }
}

// =============================================================================
// Resolve Error
// =============================================================================

/// Failure to turn a descriptor into an invocable target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no constructor registered for `{name}` ({id:?})")]
    UnknownCallable { id: CallableId, name: Arc<str> },

    #[error("cannot instantiate abstract class `{name}`")]
    NotInstantiable { name: Arc<str> },

    #[error("descriptor for `{name}` does not match the registered constructor")]
    StaleDescriptor { name: Arc<str> },
}

// =============================================================================
// Config Error
// =============================================================================

/// Rejected policy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("inflation threshold must be greater than zero")]
    ZeroThreshold,

    #[error("invalid value `{value}` for {var}")]
    Malformed { var: &'static str, value: String },
}
