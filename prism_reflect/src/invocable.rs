//! Resolved call targets and the resolution interface.
//!
//! An [`Invocable`] is a directly callable handle bound to one descriptor.
//! It has two ways in:
//!
//! - [`Invocable::invoke`], a sequence-based entry that works for any arity
//!   and is always available;
//! - [`Invocable::link_direct`], which produces a [`DirectEntry`] taking its
//!   arguments as separate values. Linking may be expensive, so accessors
//!   only ask for it once a callable is hot.
//!
//! Both entries must raise arity and argument faults tagged as originating
//! at argument binding, and must tag faults from the constructor body as
//! originating in the callee.

use crate::descriptor::CallableDescriptor;
use crate::error::ResolveError;
use crate::fault::Fault;
use crate::native::NativeEntry;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Outcome of any invocation.
pub type InvokeResult = Result<Value, Fault>;

// =============================================================================
// Direct Entry
// =============================================================================

pub type NullaryFn = Box<dyn Fn() -> InvokeResult + Send + Sync>;
pub type UnaryFn = Box<dyn Fn(Value) -> InvokeResult + Send + Sync>;
pub type BinaryFn = Box<dyn Fn(Value, Value) -> InvokeResult + Send + Sync>;
pub type TernaryFn = Box<dyn Fn(Value, Value, Value) -> InvokeResult + Send + Sync>;
pub type SpreadFn = Box<dyn Fn(&[Value]) -> InvokeResult + Send + Sync>;

/// A linked calling path for one exact arity.
///
/// `Spread` is the overflow shape for arities above the specialized ones.
pub enum DirectEntry {
    Nullary(NullaryFn),
    Unary(UnaryFn),
    Binary(BinaryFn),
    Ternary(TernaryFn),
    Spread(SpreadFn),
}

impl DirectEntry {
    /// Fixed argument count of the shape, `None` for `Spread`.
    #[inline]
    pub fn fixed_arity(&self) -> Option<usize> {
        match self {
            DirectEntry::Nullary(_) => Some(0),
            DirectEntry::Unary(_) => Some(1),
            DirectEntry::Binary(_) => Some(2),
            DirectEntry::Ternary(_) => Some(3),
            DirectEntry::Spread(_) => None,
        }
    }
}

impl fmt::Debug for DirectEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match self {
            DirectEntry::Nullary(_) => "Nullary",
            DirectEntry::Unary(_) => "Unary",
            DirectEntry::Binary(_) => "Binary",
            DirectEntry::Ternary(_) => "Ternary",
            DirectEntry::Spread(_) => "Spread",
        };
        f.debug_tuple("DirectEntry").field(&shape).finish()
    }
}

// =============================================================================
// Invocable
// =============================================================================

/// A resolved, directly callable constructor.
pub trait Invocable: Send + Sync + fmt::Debug {
    /// The descriptor this handle is bound to.
    fn descriptor(&self) -> &Arc<CallableDescriptor>;

    /// Call with an argument sequence of any length.
    fn invoke(&self, args: &[Value]) -> InvokeResult;

    /// Link a direct entry point for the bound arity.
    ///
    /// Entries linked for the same descriptor are interchangeable.
    fn link_direct(&self) -> Result<DirectEntry, Fault>;
}

// =============================================================================
// Resolver
// =============================================================================

/// Turns descriptors into invocable handles.
pub trait Resolver: Send + Sync {
    /// Resolve a descriptor to its invocable handle.
    fn resolve(&self, descriptor: &CallableDescriptor)
    -> Result<Arc<dyn Invocable>, ResolveError>;

    /// Resolve the low-level fallback entry for a descriptor.
    fn native_entry(
        &self,
        descriptor: &CallableDescriptor,
    ) -> Result<Arc<dyn NativeEntry>, ResolveError>;
}
