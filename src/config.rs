//! Engine configuration and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Tuning knobs for [`Fixplex`][crate::fixplex::Fixplex].
///
/// ```
/// use fixplex::config::FixplexConfig;
///
/// let config = FixplexConfig::default()
///     .with_max_iterations(10_000)
///     .with_seed(42);
/// assert_eq!(config.blands_rule_threshold, 1000);
/// ```
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FixplexConfig {
    /// Pivots allowed per `make_feasible` call before giving up with `Unknown`.
    pub max_iterations: usize,
    /// Repeated selections of already-seen variables tolerated before switching
    /// to Bland's rule.
    pub blands_rule_threshold: usize,
    /// Seed for the default random generator.
    pub seed: u64,
}

impl FixplexConfig {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_blands_rule_threshold(mut self, threshold: usize) -> Self {
        self.blands_rule_threshold = threshold;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for FixplexConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1_000_000,
            blands_rule_threshold: 1000,
            seed: 0,
        }
    }
}

/// External resource budget, polled once per iteration of the feasibility loop.
///
/// `inc` returns `false` once the budget is exhausted (or the search was
/// cancelled); the loop then stops with `Unknown` at a pivot boundary.
pub trait ResourceLimit {
    fn inc(&self) -> bool;
}

/// No external limit.
#[derive(Debug, Copy, Clone, Default)]
pub struct Unlimited;

impl ResourceLimit for Unlimited {
    fn inc(&self) -> bool {
        true
    }
}

impl<F> ResourceLimit for F
where
    F: Fn() -> bool,
{
    fn inc(&self) -> bool {
        self()
    }
}

/// A cancellation flag that can be raised from another thread or a callback.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

impl ResourceLimit for CancelFlag {
    fn inc(&self) -> bool {
        !self.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn test_builder() {
        let config = FixplexConfig::default()
            .with_max_iterations(5)
            .with_blands_rule_threshold(2)
            .with_seed(7);
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.blands_rule_threshold, 2);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn test_cancel_flag() {
        let flag = CancelFlag::new();
        let shared = flag.clone();
        assert!(flag.inc());
        shared.cancel();
        assert!(!flag.inc());
        flag.clear();
        assert!(shared.inc());
    }

    #[test]
    fn test_closure_limit() {
        let budget = Cell::new(2u32);
        let limit = || {
            let left = budget.get();
            budget.set(left.saturating_sub(1));
            left > 0
        };
        assert!(limit.inc());
        assert!(limit.inc());
        assert!(!limit.inc());
        assert!(Unlimited.inc());
    }
}
