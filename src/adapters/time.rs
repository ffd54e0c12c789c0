//! Time adapters.
//!
//! - [`SystemClock`] implements [`Clock`]: blocking sleep plus the system
//!   wall clock. `std` time works on both targets (ESP-IDF backs it with
//!   FreeRTOS and newlib).
//! - [`SntpTimeSource`] implements [`TimeSourcePort`].
//!   - **`target_os = "espidf"`**: `esp_idf_svc::sntp::EspSntp`, polled for
//!     completion once per attempt.
//!   - **`not(target_os = "espidf")`**: the host OS keeps its own clock, so
//!     an attempt only checks that the clock is plausible.

use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::app::ports::{Clock, TimeSourcePort, TimeSyncError};

/// 2020-01-01T00:00:00Z. Anything earlier means the clock was never set.
pub const EPOCH_2020: u64 = 1_577_836_800;

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn unix_time(&self) -> u64 {
        unix_now()
    }
}

// ───────────────────────────────────────────────────────────────
// SNTP time source
// ───────────────────────────────────────────────────────────────

pub struct SntpTimeSource {
    server: &'static str,
    #[cfg(target_os = "espidf")]
    sntp: Option<esp_idf_svc::sntp::EspSntp<'static>>,
}

impl SntpTimeSource {
    pub fn new(server: &str) -> Self {
        Self {
            // Lives for the whole session; allocated once at boot.
            server: String::from(server).leak(),
            #[cfg(target_os = "espidf")]
            sntp: None,
        }
    }

    pub fn server(&self) -> &str {
        self.server
    }
}

#[cfg(target_os = "espidf")]
impl TimeSourcePort for SntpTimeSource {
    fn sync_once(&mut self) -> Result<(), TimeSyncError> {
        use esp_idf_svc::sntp::{EspSntp, SntpConf, SyncStatus};

        if self.sntp.is_none() {
            let mut conf = SntpConf::default();
            conf.servers[0] = self.server;
            let sntp = EspSntp::new(&conf).map_err(|e| {
                log::warn!("SNTP start failed: {:?}", e);
                TimeSyncError::Unreachable
            })?;
            log::info!("SNTP started against {}", self.server);
            self.sntp = Some(sntp);
        }

        let completed = self
            .sntp
            .as_ref()
            .is_some_and(|s| s.get_sync_status() == SyncStatus::Completed);
        if !completed {
            return Err(TimeSyncError::Pending);
        }
        if unix_now() < EPOCH_2020 {
            return Err(TimeSyncError::Implausible);
        }
        Ok(())
    }
}

#[cfg(not(target_os = "espidf"))]
impl TimeSourcePort for SntpTimeSource {
    fn sync_once(&mut self) -> Result<(), TimeSyncError> {
        if unix_now() < EPOCH_2020 {
            return Err(TimeSyncError::Implausible);
        }
        log::info!("Time(sim): host clock trusted (server {} not queried)", self.server);
        Ok(())
    }
}
