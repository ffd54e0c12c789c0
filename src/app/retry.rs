//! Bounded retry budgets.
//!
//! A [`RetryBudget`] is a value: the attempt counter lives on the stack of a
//! single [`RetryBudget::run`] call, so nothing carries over between calls
//! (or across a restart).

use core::time::Duration;

use super::ports::Clock;

/// Maximum attempts with a fixed delay between consecutive attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    max_attempts: u32,
    spacing: Duration,
}

/// Result of spending a budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempted<T> {
    Succeeded { value: T, attempts: u32 },
    Exhausted { attempts: u32 },
}

impl RetryBudget {
    pub const fn new(max_attempts: u32, spacing: Duration) -> Self {
        Self {
            max_attempts,
            spacing,
        }
    }

    pub const fn from_ms(max_attempts: u32, spacing_ms: u32) -> Self {
        Self::new(max_attempts, Duration::from_millis(spacing_ms as u64))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn spacing(&self) -> Duration {
        self.spacing
    }

    /// Worst-case time spent sleeping before exhaustion.
    pub fn ceiling(&self) -> Duration {
        self.spacing * self.max_attempts.saturating_sub(1)
    }

    /// Call `attempt` (1-based attempt number) until it yields `Some` or the
    /// budget is spent. Sleeps `spacing` between attempts, never after the
    /// last one.
    pub fn run<T, C, F>(&self, clock: &mut C, mut attempt: F) -> Attempted<T>
    where
        C: Clock + ?Sized,
        F: FnMut(u32) -> Option<T>,
    {
        for n in 1..=self.max_attempts {
            if let Some(value) = attempt(n) {
                return Attempted::Succeeded { value, attempts: n };
            }
            if n < self.max_attempts {
                clock.sleep(self.spacing);
            }
        }
        Attempted::Exhausted {
            attempts: self.max_attempts,
        }
    }
}
