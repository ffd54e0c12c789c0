//! Time synchroniser: bounded attempts to set the wall clock from the
//! network before the first record is stamped.

use log::{info, warn};

use super::ports::{Clock, TimeSourcePort};
use super::retry::{Attempted, RetryBudget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Synced { attempts: u32 },
    Exhausted { attempts: u32 },
}

pub struct TimeSynchronizer<T> {
    source: T,
}

impl<T: TimeSourcePort> TimeSynchronizer<T> {
    pub fn new(source: T) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &T {
        &self.source
    }

    pub fn sync<C: Clock + ?Sized>(&mut self, budget: RetryBudget, clock: &mut C) -> SyncOutcome {
        let max = budget.max_attempts();
        let source = &mut self.source;
        let outcome = budget.run(clock, |n| {
            info!("Syncing time with NTP server, attempt {}/{}", n, max);
            match source.sync_once() {
                Ok(()) => Some(()),
                Err(e) => {
                    warn!("Time sync attempt {}/{} failed: {}", n, max, e);
                    None
                }
            }
        });
        match outcome {
            Attempted::Succeeded { attempts, .. } => {
                info!("Time synchronized after {} attempt(s)", attempts);
                SyncOutcome::Synced { attempts }
            }
            Attempted::Exhausted { attempts } => {
                warn!("Failed to obtain time after {} attempt(s)", attempts);
                SyncOutcome::Exhausted { attempts }
            }
        }
    }
}
