//! Soft/hard time budget for one top-level search call.

use std::time::{Duration, Instant};

/// Nodes searched between deadline polls. Timing calls are not free;
/// polling every node would dominate cheap leaf nodes.
pub const NODE_CHECK_INTERVAL: u64 = 2048;

/// Wall-clock budget created once per top-level search. Sub-searches
/// only read it.
#[derive(Clone, Copy, Debug)]
pub struct TimeBudget {
    start: Instant,
    soft: Duration,
    hard: Duration,
}

impl TimeBudget {
    /// Budget from a single wall-clock limit. The soft limit gates new
    /// iterations at half the budget; the hard limit aborts mid-search.
    pub fn new(limit: Duration) -> Self {
        Self {
            start: Instant::now(),
            soft: limit / 2,
            hard: limit,
        }
    }

    /// Explicit soft/hard split.
    pub fn with_limits(soft: Duration, hard: Duration) -> Self {
        Self {
            start: Instant::now(),
            soft,
            hard: hard.max(soft),
        }
    }

    /// Effectively unbounded; depth alone terminates the search.
    pub fn unlimited() -> Self {
        let far = Duration::from_secs(60 * 60 * 24);
        Self {
            start: Instant::now(),
            soft: far,
            hard: far,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Hard limit reached: abort mid-search, keep the last completed
    /// depth's result.
    pub fn hard_expired(&self) -> bool {
        self.start.elapsed() >= self.hard
    }

    /// Soft gate: start another iteration only if the remaining budget
    /// plausibly covers it. The next iteration is extrapolated from the
    /// previous one's cost; the branching factor makes 2x a floor.
    pub fn should_start_iteration(&self, last_iter: Duration) -> bool {
        let elapsed = self.start.elapsed();
        if elapsed >= self.soft {
            return false;
        }
        let remaining = self.hard - elapsed;
        remaining > last_iter * 2
    }
}
