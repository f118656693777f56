//! Invoker strategies.
//!
//! Two ways to call through to an [`Invocable`]:
//!
//! | Strategy | Build cost | Per-call cost | Arity |
//! |----------|-----------|---------------|-------|
//! | [`GenericInvoker`] | trivial | packs fixed forms into a sequence | any |
//! | [`SpecializedInvoker`] | links a direct entry | direct call | exact |
//!
//! Both expose the same five entry points. Accessors pick the entry point
//! from the bound arity, so a correctly linked specialized invoker only ever
//! sees the shape it was linked for.

use crate::fault::Fault;
use crate::invocable::{DirectEntry, Invocable, InvokeResult};
use crate::value::Value;
use std::sync::Arc;

/// Largest arity with a dedicated calling shape.
///
/// Above this, accessors call the sequence-based entry and do not check the
/// argument count up front.
pub const SPECIALIZED_PARAM_COUNT: usize = 3;

/// Which strategy an invoker implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Generic,
    Specialized,
}

// =============================================================================
// Generic Invoker
// =============================================================================

/// Always-correct invoker that calls the sequence-based entry.
#[derive(Debug, Clone)]
pub struct GenericInvoker {
    target: Arc<dyn Invocable>,
}

impl GenericInvoker {
    #[inline]
    pub fn new(target: Arc<dyn Invocable>) -> Self {
        Self { target }
    }

    #[inline]
    pub fn invoke0(&self) -> InvokeResult {
        self.target.invoke(&[])
    }

    #[inline]
    pub fn invoke1(&self, a: Value) -> InvokeResult {
        self.target.invoke(&[a])
    }

    #[inline]
    pub fn invoke2(&self, a: Value, b: Value) -> InvokeResult {
        self.target.invoke(&[a, b])
    }

    #[inline]
    pub fn invoke3(&self, a: Value, b: Value, c: Value) -> InvokeResult {
        self.target.invoke(&[a, b, c])
    }

    #[inline]
    pub fn invoke_spread(&self, args: &[Value]) -> InvokeResult {
        self.target.invoke(args)
    }
}

// =============================================================================
// Specialized Invoker
// =============================================================================

/// Invoker bound to a direct entry linked for one exact arity.
#[derive(Debug)]
pub struct SpecializedInvoker {
    entry: DirectEntry,
}

impl SpecializedInvoker {
    /// Link a direct entry for `target`'s arity.
    ///
    /// Fails if linking fails or the linked shape does not fit the arity.
    pub fn link(target: &dyn Invocable) -> Result<Self, Fault> {
        let arity = target.descriptor().arity();
        let entry = target.link_direct()?;
        let fits = match entry.fixed_arity() {
            Some(fixed) => fixed == arity,
            None => arity > SPECIALIZED_PARAM_COUNT,
        };
        if !fits {
            return Err(Fault::internal(format!(
                "linked {:?} for `{}` with arity {}",
                entry,
                target.descriptor().name(),
                arity
            )));
        }
        Ok(Self { entry })
    }

    #[inline]
    pub fn entry(&self) -> &DirectEntry {
        &self.entry
    }

    #[inline]
    pub fn invoke0(&self) -> InvokeResult {
        match &self.entry {
            DirectEntry::Nullary(f) => f(),
            DirectEntry::Spread(f) => f(&[]),
            other => Err(shape_mismatch(other, 0)),
        }
    }

    #[inline]
    pub fn invoke1(&self, a: Value) -> InvokeResult {
        match &self.entry {
            DirectEntry::Unary(f) => f(a),
            DirectEntry::Spread(f) => f(&[a]),
            other => Err(shape_mismatch(other, 1)),
        }
    }

    #[inline]
    pub fn invoke2(&self, a: Value, b: Value) -> InvokeResult {
        match &self.entry {
            DirectEntry::Binary(f) => f(a, b),
            DirectEntry::Spread(f) => f(&[a, b]),
            other => Err(shape_mismatch(other, 2)),
        }
    }

    #[inline]
    pub fn invoke3(&self, a: Value, b: Value, c: Value) -> InvokeResult {
        match &self.entry {
            DirectEntry::Ternary(f) => f(a, b, c),
            DirectEntry::Spread(f) => f(&[a, b, c]),
            other => Err(shape_mismatch(other, 3)),
        }
    }

    /// Sequence call; unpacks into the fixed shape when the count fits.
    pub fn invoke_spread(&self, args: &[Value]) -> InvokeResult {
        match (&self.entry, args) {
            (DirectEntry::Spread(f), _) => f(args),
            (DirectEntry::Nullary(f), []) => f(),
            (DirectEntry::Unary(f), [a]) => f(a.clone()),
            (DirectEntry::Binary(f), [a, b]) => f(a.clone(), b.clone()),
            (DirectEntry::Ternary(f), [a, b, c]) => f(a.clone(), b.clone(), c.clone()),
            (other, _) => Err(shape_mismatch(other, args.len())),
        }
    }
}

#[cold]
fn shape_mismatch(entry: &DirectEntry, actual: usize) -> Fault {
    Fault::wrong_call_shape(entry.fixed_arity().unwrap_or(actual), actual)
}

// =============================================================================
// Invoker
// =============================================================================

/// The strategy an accessor calls through.
#[derive(Debug)]
pub enum Invoker {
    Generic(GenericInvoker),
    Specialized(SpecializedInvoker),
}

impl Invoker {
    #[inline]
    pub fn kind(&self) -> StrategyKind {
        match self {
            Invoker::Generic(_) => StrategyKind::Generic,
            Invoker::Specialized(_) => StrategyKind::Specialized,
        }
    }

    #[inline]
    pub fn invoke0(&self) -> InvokeResult {
        match self {
            Invoker::Generic(g) => g.invoke0(),
            Invoker::Specialized(s) => s.invoke0(),
        }
    }

    #[inline]
    pub fn invoke1(&self, a: Value) -> InvokeResult {
        match self {
            Invoker::Generic(g) => g.invoke1(a),
            Invoker::Specialized(s) => s.invoke1(a),
        }
    }

    #[inline]
    pub fn invoke2(&self, a: Value, b: Value) -> InvokeResult {
        match self {
            Invoker::Generic(g) => g.invoke2(a, b),
            Invoker::Specialized(s) => s.invoke2(a, b),
        }
    }

    #[inline]
    pub fn invoke3(&self, a: Value, b: Value, c: Value) -> InvokeResult {
        match self {
            Invoker::Generic(g) => g.invoke3(a, b, c),
            Invoker::Specialized(s) => s.invoke3(a, b, c),
        }
    }

    #[inline]
    pub fn invoke_spread(&self, args: &[Value]) -> InvokeResult {
        match self {
            Invoker::Generic(g) => g.invoke_spread(args),
            Invoker::Specialized(s) => s.invoke_spread(args),
        }
    }
}

impl From<GenericInvoker> for Invoker {
    fn from(invoker: GenericInvoker) -> Self {
        Invoker::Generic(invoker)
    }
}

impl From<SpecializedInvoker> for Invoker {
    fn from(invoker: SpecializedInvoker) -> Self {
        Invoker::Specialized(invoker)
    }
}
