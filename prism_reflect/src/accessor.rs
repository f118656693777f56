//! Constructor accessors.
//!
//! A [`ConstructorAccessor`] is the single entry point callers use to
//! instantiate a resolved constructor: `construct(args)`. It owns the
//! descriptor, the strategy (fixed, adaptive, or native), and the call
//! statistics, and it is what the accessor cache hands out.
//!
//! # Call Path
//!
//! ```text
//!  construct(args)
//!     │
//!     ├─ native? ─────────────▶ NativeEntry ───────────────┐
//!     │                                                    │
//!     ├─ arity ≤ 3 && argc ≠ arity ─▶ InvalidArgument      │
//!     │                                                    │
//!     ▼                                                    │
//!  current invoker (fixed or from the dispatcher)          │
//!     │                                                    │
//!     ├─ arity 0..=3 ─▶ invoke0 / invoke1 / invoke2 / invoke3
//!     └─ arity > 3 ──▶ invoke_spread                       │
//!                 │                                        │
//!                 ▼                                        ▼
//!           Ok(instance) or Fault ─────▶ classify ─▶ ReflectError
//! ```

use crate::descriptor::CallableDescriptor;
use crate::dispatcher::{AdaptiveDispatcher, PromotionState};
use crate::error::{ReflectError, ReflectResult};
use crate::fault::classify;
use crate::invocable::{Invocable, InvokeResult};
use crate::invoker::{Invoker, SPECIALIZED_PARAM_COUNT, StrategyKind};
use crate::native::NativeAccessor;
use crate::stats::AccessorStats;
use crate::value::Value;
use std::sync::Arc;

/// How an accessor picks its invoker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    /// One fixed invoker for its whole life.
    Direct,
    /// Generic until hot, then specialized.
    Adaptive,
    /// Forwards to the native fallback entry.
    Native,
}

/// Invoker currently serving calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentStrategy {
    Generic,
    Specialized,
    Native,
}

impl From<StrategyKind> for CurrentStrategy {
    fn from(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::Generic => CurrentStrategy::Generic,
            StrategyKind::Specialized => CurrentStrategy::Specialized,
        }
    }
}

#[derive(Debug)]
enum Strategy {
    Direct(Invoker),
    Adaptive(AdaptiveDispatcher),
    Native(NativeAccessor),
}

/// Reflective accessor for one constructor.
#[derive(Debug)]
pub struct ConstructorAccessor {
    descriptor: Arc<CallableDescriptor>,
    param_count: usize,
    strategy: Strategy,
    stats: Arc<AccessorStats>,
}

impl ConstructorAccessor {
    /// Accessor that always calls through `invoker`.
    pub fn direct(descriptor: Arc<CallableDescriptor>, invoker: Invoker) -> Self {
        Self::with_strategy(descriptor, Arc::default(), Strategy::Direct(invoker))
    }

    /// Accessor that promotes after `threshold` generic calls.
    pub fn adaptive(target: Arc<dyn Invocable>, threshold: u32) -> Self {
        let descriptor = Arc::clone(target.descriptor());
        let stats = Arc::new(AccessorStats::new());
        let dispatcher = AdaptiveDispatcher::new(target, threshold, Arc::clone(&stats));
        Self::with_strategy(descriptor, stats, Strategy::Adaptive(dispatcher))
    }

    /// Accessor that forwards to the native fallback entry.
    pub fn native(descriptor: Arc<CallableDescriptor>, native: NativeAccessor) -> Self {
        Self::with_strategy(descriptor, Arc::default(), Strategy::Native(native))
    }

    fn with_strategy(
        descriptor: Arc<CallableDescriptor>,
        stats: Arc<AccessorStats>,
        strategy: Strategy,
    ) -> Self {
        Self {
            param_count: descriptor.arity(),
            descriptor,
            strategy,
            stats,
        }
    }

    /// Instantiate the constructor with `args`.
    ///
    /// # Errors
    ///
    /// - [`ReflectError::InvalidArgument`] if the argument count or an
    ///   argument's type does not fit the constructor.
    /// - [`ReflectError::InvocationFailed`] if the constructor, or the call
    ///   machinery, failed after the call started.
    pub fn construct(&self, args: &[Value]) -> ReflectResult<Value> {
        let result = match &self.strategy {
            Strategy::Native(native) => {
                self.stats.record_native_call();
                native.invoke(&self.descriptor, args)
            }
            Strategy::Direct(invoker) => {
                self.check_arity(args.len())?;
                self.invoke_impl(invoker, args)
            }
            Strategy::Adaptive(dispatcher) => {
                // Rejected calls never reach the dispatcher, so they do not
                // count toward promotion.
                self.check_arity(args.len())?;
                self.invoke_impl(dispatcher.invoker(), args)
            }
        };

        result.map_err(|fault| {
            let err = classify(&self.descriptor, fault);
            self.stats.record_error(&err);
            err
        })
    }

    /// Only shapes up to the specialized arity have a fixed count worth
    /// checking here; larger arities are checked by the callee's binding.
    #[inline]
    fn check_arity(&self, argc: usize) -> ReflectResult<()> {
        if self.param_count <= SPECIALIZED_PARAM_COUNT && argc != self.param_count {
            let err = ReflectError::wrong_arity(argc, self.param_count);
            self.stats.record_error(&err);
            return Err(err);
        }
        Ok(())
    }

    #[inline]
    fn invoke_impl(&self, invoker: &Invoker, args: &[Value]) -> InvokeResult {
        self.stats.record_call(invoker.kind());
        match (self.param_count, args) {
            (0, []) => invoker.invoke0(),
            (1, [a]) => invoker.invoke1(a.clone()),
            (2, [a, b]) => invoker.invoke2(a.clone(), b.clone()),
            (3, [a, b, c]) => invoker.invoke3(a.clone(), b.clone(), c.clone()),
            _ => invoker.invoke_spread(args),
        }
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    #[inline]
    pub fn descriptor(&self) -> &Arc<CallableDescriptor> {
        &self.descriptor
    }

    pub fn kind(&self) -> AccessorKind {
        match self.strategy {
            Strategy::Direct(_) => AccessorKind::Direct,
            Strategy::Adaptive(_) => AccessorKind::Adaptive,
            Strategy::Native(_) => AccessorKind::Native,
        }
    }

    /// Strategy the next call will use, without counting it.
    pub fn current_strategy(&self) -> CurrentStrategy {
        match &self.strategy {
            Strategy::Direct(invoker) => invoker.kind().into(),
            Strategy::Adaptive(dispatcher) => match dispatcher.promoted() {
                Some(invoker) => invoker.kind().into(),
                None => CurrentStrategy::Generic,
            },
            Strategy::Native(_) => CurrentStrategy::Native,
        }
    }

    /// Promotion state; `None` for accessors that never promote.
    pub fn promotion_state(&self) -> Option<PromotionState> {
        match &self.strategy {
            Strategy::Adaptive(dispatcher) => Some(dispatcher.state()),
            _ => None,
        }
    }

    #[inline]
    pub fn is_promoted(&self) -> bool {
        self.promotion_state() == Some(PromotionState::Promoted)
    }

    /// The published specialized invoker of an adaptive accessor.
    pub fn promoted_invoker(&self) -> Option<&Invoker> {
        match &self.strategy {
            Strategy::Adaptive(dispatcher) => dispatcher.promoted(),
            _ => None,
        }
    }

    #[inline]
    pub fn stats(&self) -> &AccessorStats {
        &self.stats
    }
}
