//! Blink pattern table for the single status LED.
//!
//! Each [`StatusSignal`] maps to a fixed number of blinks with a symmetric
//! on/off period. Operators read the station's state from these alone, so
//! the table is stable across firmware revisions.
//!
//! | Signal                 | Blinks | On = off |
//! |------------------------|--------|----------|
//! | WifiConnected          | 3      | 100 ms   |
//! | WifiConnectFailed      | 5      | 100 ms   |
//! | WifiReconnected        | 3      | 100 ms   |
//! | WifiReconnectFailed    | 5      | 100 ms   |
//! | TimeSyncFailed         | 4      | 300 ms   |
//! | UploadOk               | 1      | 3 s      |
//! | UploadRejected         | 4      | 100 ms   |
//! | UploadTransportFailed  | 4      | 100 ms   |
//! | CycleComplete          | 1      | 1 s      |
//! | FatalError             | 6      | 200 ms   |

use core::time::Duration;

use crate::app::events::StatusSignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkPattern {
    pub count: u8,
    /// Duration of each on phase and each off phase.
    pub period: Duration,
}

impl BlinkPattern {
    const fn new(count: u8, period_ms: u64) -> Self {
        Self {
            count,
            period: Duration::from_millis(period_ms),
        }
    }

    /// Wall time the pattern occupies.
    pub fn total(&self) -> Duration {
        self.period * u32::from(self.count) * 2
    }
}

pub const fn pattern_for(signal: StatusSignal) -> BlinkPattern {
    match signal {
        StatusSignal::WifiConnected => BlinkPattern::new(3, 100),
        StatusSignal::WifiConnectFailed => BlinkPattern::new(5, 100),
        StatusSignal::WifiReconnected => BlinkPattern::new(3, 100),
        StatusSignal::WifiReconnectFailed => BlinkPattern::new(5, 100),
        StatusSignal::TimeSyncFailed => BlinkPattern::new(4, 300),
        StatusSignal::UploadOk => BlinkPattern::new(1, 3_000),
        StatusSignal::UploadRejected => BlinkPattern::new(4, 100),
        StatusSignal::UploadTransportFailed => BlinkPattern::new(4, 100),
        StatusSignal::CycleComplete => BlinkPattern::new(1, 1_000),
        StatusSignal::FatalError => BlinkPattern::new(6, 200),
    }
}
