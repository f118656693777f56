//! Adaptive strategy selection.
//!
//! An adaptive accessor starts with the generic invoker and counts calls.
//! Once the count passes the inflation threshold it links a specialized
//! invoker and publishes it; from then on every call uses it.
//!
//! ```text
//!   invoker()
//!      │
//!      ▼
//!   promoted? ──yes──▶ specialized invoker        (one acquire load)
//!      │
//!      no
//!      ▼
//!   count += 1 (relaxed, may lose updates)
//!      │
//!   count > threshold && !abandoned? ──no──▶ generic invoker
//!      │
//!      yes
//!      ▼
//!   link ──ok──▶ publish once ──▶ published invoker
//!      │
//!      err ──▶ abandon promotion ──▶ generic invoker
//! ```
//!
//! # Concurrency
//!
//! The promoted slot is a [`OnceLock`]: a reader either sees nothing or a
//! fully linked invoker. Threads that cross the threshold together may each
//! link one; the first to publish wins and the others drop theirs, which is
//! fine because invokers linked for the same descriptor are interchangeable.
//! The counter only gates an optimization, so it uses plain relaxed loads
//! and stores instead of a read-modify-write.

use crate::invocable::Invocable;
use crate::invoker::{GenericInvoker, Invoker, SpecializedInvoker};
use crate::stats::AccessorStats;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Promotion state of an adaptive accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionState {
    /// Calling through the generic invoker and counting.
    Unpromoted,
    /// A specialized invoker is published. Terminal.
    Promoted,
    /// Linking failed; the generic invoker is used for good.
    Abandoned,
}

/// Chooses between the generic and the promoted invoker for each call.
#[derive(Debug)]
pub struct AdaptiveDispatcher {
    target: Arc<dyn Invocable>,
    generic: Invoker,
    promoted: OnceLock<Invoker>,
    /// Wider than the threshold so every threshold value can be exceeded.
    invocations: AtomicU64,
    abandoned: AtomicBool,
    threshold: u32,
    stats: Arc<AccessorStats>,
}

impl AdaptiveDispatcher {
    pub fn new(target: Arc<dyn Invocable>, threshold: u32, stats: Arc<AccessorStats>) -> Self {
        Self {
            generic: Invoker::Generic(GenericInvoker::new(Arc::clone(&target))),
            target,
            promoted: OnceLock::new(),
            invocations: AtomicU64::new(0),
            abandoned: AtomicBool::new(false),
            threshold,
            stats,
        }
    }

    /// The invoker to use for the current call.
    #[inline]
    pub fn invoker(&self) -> &Invoker {
        if let Some(invoker) = self.promoted.get() {
            return invoker;
        }
        self.slow_invoker()
    }

    #[inline(never)]
    fn slow_invoker(&self) -> &Invoker {
        let count = self.invocations.load(Ordering::Relaxed).saturating_add(1);
        self.invocations.store(count, Ordering::Relaxed);

        if count > u64::from(self.threshold) && !self.abandoned.load(Ordering::Relaxed) {
            return self.promote();
        }
        &self.generic
    }

    #[cold]
    fn promote(&self) -> &Invoker {
        let descriptor = self.target.descriptor();
        match SpecializedInvoker::link(&*self.target) {
            Ok(specialized) => {
                if self.promoted.set(Invoker::Specialized(specialized)).is_ok() {
                    self.stats.record_promotion();
                    tracing::debug!(
                        callable = descriptor.name(),
                        arity = descriptor.arity(),
                        threshold = self.threshold,
                        "promoted constructor accessor to specialized invoker"
                    );
                }
                self.promoted.get().unwrap_or(&self.generic)
            }
            Err(fault) => {
                if !self.abandoned.swap(true, Ordering::Relaxed) {
                    self.stats.record_promotion_failure();
                    tracing::debug!(
                        callable = descriptor.name(),
                        %fault,
                        "specialized invoker failed to link; staying generic"
                    );
                }
                &self.generic
            }
        }
    }

    /// The published specialized invoker, if promotion has happened.
    #[inline]
    pub fn promoted(&self) -> Option<&Invoker> {
        self.promoted.get()
    }

    pub fn state(&self) -> PromotionState {
        if self.promoted.get().is_some() {
            PromotionState::Promoted
        } else if self.abandoned.load(Ordering::Relaxed) {
            PromotionState::Abandoned
        } else {
            PromotionState::Unpromoted
        }
    }

    /// Best-effort count of calls made while unpromoted.
    #[inline]
    pub fn invocation_count(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}
