//! Raw invocation faults and their classification.
//!
//! A [`Fault`] is whatever an invoker raises while calling through to a
//! constructor. Faults never leave an accessor as-is: [`classify`] decides
//! whether the caller passed bad arguments or the constructor itself failed,
//! and produces the outward [`ReflectError`].
//!
//! ```text
//!   Fault ──▶ originated at argument binding? ──┬── yes ─▶ InvalidArgument
//!                                               │          (arity / type mismatch)
//!                                               └── no  ─▶ InvocationFailed
//!                                                          (callee / other)
//! ```
//!
//! The same fault kind can land on either side. A type-cast failure while
//! binding argument 0 is the caller's fault; the identical failure raised
//! inside the constructor body after binding succeeded is the callee's.

use crate::descriptor::CallableDescriptor;
use crate::error::ReflectError;
use std::fmt;

// =============================================================================
// Fault
// =============================================================================

/// What went wrong during an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Argument count did not match the bound arity.
    WrongArity,
    /// A fixed-arity entry point was used with a shape it was not linked for.
    WrongCallShape,
    /// A value could not be converted to the required type.
    TypeCast,
    /// A value was absent where one was required.
    NullValue,
    /// The constructor deliberately raised an error.
    Raised,
    /// Unexpected failure in the invocation machinery.
    Internal,
}

/// Where in the call a fault was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultOrigin {
    /// While matching arguments to formal parameters, before the body ran.
    ArgumentBinding,
    /// Inside the constructor body.
    Callee,
    /// In the surrounding runtime (linking, bookkeeping).
    Runtime,
}

/// A failure raised by an invoker.
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    kind: FaultKind,
    origin: FaultOrigin,
    /// Argument position the fault is about, if any.
    arg_index: Option<usize>,
    message: String,
}

impl Fault {
    /// Create a fault with an explicit kind and origin.
    pub fn new(kind: FaultKind, origin: FaultOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            arg_index: None,
            message: message.into(),
        }
    }

    /// Argument count mismatch detected while binding.
    pub fn wrong_arity(expected: usize, actual: usize) -> Self {
        Self::new(
            FaultKind::WrongArity,
            FaultOrigin::ArgumentBinding,
            format!("expected {} arguments, got {}", expected, actual),
        )
    }

    /// Entry point used with the wrong number of arguments for its shape.
    pub fn wrong_call_shape(expected: usize, actual: usize) -> Self {
        Self::new(
            FaultKind::WrongCallShape,
            FaultOrigin::ArgumentBinding,
            format!("call shape takes {} arguments, called with {}", expected, actual),
        )
    }

    /// Argument `index` could not be bound to its parameter type.
    pub fn arg_type_cast(index: usize, expected: &str, actual: &str) -> Self {
        Self {
            arg_index: Some(index),
            ..Self::new(
                FaultKind::TypeCast,
                FaultOrigin::ArgumentBinding,
                format!("cannot cast {} to {}", actual, expected),
            )
        }
    }

    /// Argument `index` was `None` for a parameter that requires a value.
    pub fn arg_null(index: usize, expected: &str) -> Self {
        Self {
            arg_index: Some(index),
            ..Self::new(
                FaultKind::NullValue,
                FaultOrigin::ArgumentBinding,
                format!("None passed where {} is required", expected),
            )
        }
    }

    /// Error raised on purpose by a constructor body.
    pub fn raised(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Raised, FaultOrigin::Callee, message)
    }

    /// Cast failure inside a constructor body.
    pub fn type_cast(message: impl Into<String>) -> Self {
        Self::new(FaultKind::TypeCast, FaultOrigin::Callee, message)
    }

    /// Missing value inside a constructor body.
    pub fn null_value(message: impl Into<String>) -> Self {
        Self::new(FaultKind::NullValue, FaultOrigin::Callee, message)
    }

    /// Failure of the invocation machinery itself.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Internal, FaultOrigin::Runtime, message)
    }

    /// Re-tag this fault as raised by the constructor body.
    ///
    /// Anything surfacing from a body is the callee's, whatever kind it has.
    #[must_use]
    pub fn in_callee(mut self) -> Self {
        self.origin = FaultOrigin::Callee;
        self
    }

    #[inline]
    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    #[inline]
    pub fn origin(&self) -> FaultOrigin {
        self.origin
    }

    #[inline]
    pub fn arg_index(&self) -> Option<usize> {
        self.arg_index
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the fault was raised while binding arguments to parameters.
    #[inline]
    pub fn originated_at_argument_binding(&self) -> bool {
        self.origin == FaultOrigin::ArgumentBinding
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            FaultKind::WrongArity => "wrong arity",
            FaultKind::WrongCallShape => "wrong call shape",
            FaultKind::TypeCast => "type cast failed",
            FaultKind::NullValue => "null value",
            FaultKind::Raised => "raised",
            FaultKind::Internal => "internal error",
        };
        match self.arg_index {
            Some(index) => write!(f, "{} (argument {}): {}", label, index, self.message),
            None => write!(f, "{}: {}", label, self.message),
        }
    }
}

impl std::error::Error for Fault {}

// =============================================================================
// Classification
// =============================================================================

/// Classification of a fault from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultClass {
    /// Argument count did not match the bound arity.
    ArityMismatch,
    /// An argument was incompatible with its formal parameter.
    ArgumentTypeMismatch,
    /// The constructor started and then failed.
    CalleeFailure,
    /// Anything else.
    OtherFailure,
}

impl FaultClass {
    /// Classify a raw fault.
    pub fn of(fault: &Fault) -> Self {
        if fault.originated_at_argument_binding() {
            return match fault.kind() {
                FaultKind::WrongArity => FaultClass::ArityMismatch,
                FaultKind::WrongCallShape | FaultKind::TypeCast | FaultKind::NullValue => {
                    FaultClass::ArgumentTypeMismatch
                }
                // Not a binding outcome; blame the binder, not the caller.
                FaultKind::Raised | FaultKind::Internal => FaultClass::OtherFailure,
            };
        }
        match fault.origin() {
            FaultOrigin::Callee => FaultClass::CalleeFailure,
            _ => FaultClass::OtherFailure,
        }
    }

    /// Whether this class surfaces as [`ReflectError::InvalidArgument`].
    #[inline]
    pub const fn is_invalid_argument(self) -> bool {
        matches!(
            self,
            FaultClass::ArityMismatch | FaultClass::ArgumentTypeMismatch
        )
    }
}

/// Map a fault raised while invoking `descriptor` to the outward error.
pub fn classify(descriptor: &CallableDescriptor, fault: Fault) -> ReflectError {
    let class = FaultClass::of(&fault);
    match class {
        FaultClass::ArityMismatch => ReflectError::InvalidArgument {
            class,
            message: format!("wrong number of arguments: {}", fault.message()),
            cause: Some(fault),
        },
        FaultClass::ArgumentTypeMismatch => ReflectError::InvalidArgument {
            class,
            message: "argument type mismatch".to_string(),
            cause: Some(fault),
        },
        FaultClass::CalleeFailure | FaultClass::OtherFailure => ReflectError::InvocationFailed {
            callable: descriptor.name_arc(),
            class,
            cause: fault,
        },
    }
}
