//! Per-accessor call statistics.
//!
//! Counters are relaxed atomics: they are for tuning and tests, and never
//! feed back into dispatch decisions.

use crate::error::ReflectError;
use crate::invoker::StrategyKind;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters owned by one accessor.
#[derive(Debug, Default)]
pub struct AccessorStats {
    /// Calls made through a generic invoker.
    pub generic_calls: AtomicU64,
    /// Calls made through a specialized invoker.
    pub specialized_calls: AtomicU64,
    /// Calls forwarded to a native entry.
    pub native_calls: AtomicU64,
    /// Specialized invokers published by this accessor (0 or 1).
    pub promotions: AtomicU64,
    /// Specialized invokers that failed to link.
    pub promotion_failures: AtomicU64,
    /// Calls that failed with `InvalidArgument`.
    pub invalid_arguments: AtomicU64,
    /// Calls that failed with `InvocationFailed`.
    pub invocation_failures: AtomicU64,
}

impl AccessorStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_call(&self, strategy: StrategyKind) {
        let counter = match strategy {
            StrategyKind::Generic => &self.generic_calls,
            StrategyKind::Specialized => &self.specialized_calls,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_native_call(&self) {
        self.native_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_promotion(&self) {
        self.promotions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_promotion_failure(&self) {
        self.promotion_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a per-call error by its outward kind.
    pub fn record_error(&self, error: &ReflectError) {
        match error {
            ReflectError::InvalidArgument { .. } => {
                self.invalid_arguments.fetch_add(1, Ordering::Relaxed);
            }
            ReflectError::InvocationFailed { .. } => {
                self.invocation_failures.fetch_add(1, Ordering::Relaxed);
            }
            ReflectError::ResolutionFailed(_) => {}
        }
    }

    /// Copy the current counter values.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            generic_calls: self.generic_calls.load(Ordering::Relaxed),
            specialized_calls: self.specialized_calls.load(Ordering::Relaxed),
            native_calls: self.native_calls.load(Ordering::Relaxed),
            promotions: self.promotions.load(Ordering::Relaxed),
            promotion_failures: self.promotion_failures.load(Ordering::Relaxed),
            invalid_arguments: self.invalid_arguments.load(Ordering::Relaxed),
            invocation_failures: self.invocation_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`AccessorStats`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub generic_calls: u64,
    pub specialized_calls: u64,
    pub native_calls: u64,
    pub promotions: u64,
    pub promotion_failures: u64,
    pub invalid_arguments: u64,
    pub invocation_failures: u64,
}

impl StatsSnapshot {
    /// Calls that reached an invoker or native entry.
    #[inline]
    pub fn total_calls(&self) -> u64 {
        self.generic_calls + self.specialized_calls + self.native_calls
    }

    /// Fraction of calls served by a specialized invoker (0.0 to 1.0).
    #[inline]
    pub fn specialized_rate(&self) -> f64 {
        let total = self.total_calls();
        if total == 0 {
            0.0
        } else {
            self.specialized_calls as f64 / total as f64
        }
    }
}
