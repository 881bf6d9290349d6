// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Yield policies for the cooperative work loop.
//!
//! A [`Deadline`] tells [`Renderer::run_slice`](crate::Renderer::run_slice)
//! when to hand the thread back. The loop always completes at least one unit
//! per slice before consulting the deadline, so even a zero budget makes
//! progress.

/// Decides when a work slice should yield.
pub trait Deadline {
    /// Called after each completed unit of work. Returning `true` ends the
    /// slice (remaining work resumes next slice).
    fn should_yield(&mut self) -> bool;
}

/// Never yields; a slice runs until the pass commits.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unbounded;

impl Deadline for Unbounded {
    fn should_yield(&mut self) -> bool {
        false
    }
}

/// Yields after a fixed number of units. Deterministic, for tests and
/// single-threaded drivers without a clock.
#[derive(Clone, Copy, Debug)]
pub struct UnitBudget {
    per_slice: u32,
    used: u32,
}

impl UnitBudget {
    /// A budget of `per_slice` units for the next slice.
    #[must_use]
    pub fn new(per_slice: u32) -> Self {
        Self { per_slice, used: 0 }
    }

    /// Rearms the budget for another slice.
    pub fn reset(&mut self) {
        self.used = 0;
    }
}

impl Deadline for UnitBudget {
    fn should_yield(&mut self) -> bool {
        self.used += 1;
        self.used >= self.per_slice
    }
}

/// Yields once a wall-clock budget is spent.
#[cfg(feature = "std")]
#[derive(Clone, Copy, Debug)]
pub struct TimeSlice {
    end: std::time::Instant,
}

#[cfg(feature = "std")]
impl TimeSlice {
    /// A slice ending `budget` from now.
    #[must_use]
    pub fn new(budget: core::time::Duration) -> Self {
        Self {
            end: std::time::Instant::now() + budget,
        }
    }
}

#[cfg(feature = "std")]
impl Deadline for TimeSlice {
    fn should_yield(&mut self) -> bool {
        std::time::Instant::now() >= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_never_yields() {
        let mut d = Unbounded;
        for _ in 0..100 {
            assert!(!d.should_yield());
        }
    }

    #[test]
    fn unit_budget_counts_units() {
        let mut d = UnitBudget::new(3);
        assert!(!d.should_yield());
        assert!(!d.should_yield());
        assert!(d.should_yield());
        d.reset();
        assert!(!d.should_yield());
    }

    #[test]
    fn zero_budget_yields_immediately() {
        let mut d = UnitBudget::new(0);
        assert!(d.should_yield());
    }
}
