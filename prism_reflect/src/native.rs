//! Low-level fallback invocation.
//!
//! A [`NativeEntry`] is the always-available path the runtime offers for
//! instantiating a descriptor without linking anything. Native accessors
//! call it directly: no strategy selection, no promotion, no eager arity
//! check. Its faults still go through the same classification as every
//! other accessor.

use crate::descriptor::CallableDescriptor;
use crate::invocable::InvokeResult;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Non-adaptive instantiation path.
pub trait NativeEntry: Send + Sync + fmt::Debug {
    /// Instantiate `descriptor` with `args`.
    fn new_instance(&self, descriptor: &CallableDescriptor, args: &[Value]) -> InvokeResult;
}

/// Accessor body that forwards every call to a [`NativeEntry`].
#[derive(Debug, Clone)]
pub struct NativeAccessor {
    entry: Arc<dyn NativeEntry>,
}

impl NativeAccessor {
    pub fn new(entry: Arc<dyn NativeEntry>) -> Self {
        Self { entry }
    }

    #[inline]
    pub fn invoke(&self, descriptor: &CallableDescriptor, args: &[Value]) -> InvokeResult {
        self.entry.new_instance(descriptor, args)
    }
}
