//! Platform services: memory housekeeping and the final restart.
//!
//! - **`target_os = "espidf"`**: heap statistics from `esp_idf_svc::sys` and
//!   `esp_idf_hal::reset::restart()`.
//! - **all other targets**: the process exits with [`RESTART_EXIT_CODE`] so
//!   a supervisor (systemd, a shell loop) starts a fresh session.

use log::{error, info};

use crate::app::controller::RestartRequest;
use crate::app::ports::PlatformPort;

/// Host exit status for "restart me" (`EX_TEMPFAIL`).
pub const RESTART_EXIT_CODE: i32 = 75;
/// Host exit status for an unusable boot configuration (`EX_CONFIG`).
pub const CONFIG_EXIT_CODE: i32 = 78;

#[derive(Debug, Default)]
pub struct EspPlatform {
    reclaim_passes: u64,
}

impl EspPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reclaim_passes(&self) -> u64 {
        self.reclaim_passes
    }
}

impl PlatformPort for EspPlatform {
    // The Rust allocator frees eagerly; this pass only reports heap
    // headroom so fragmentation shows up in the logs before it bites.
    #[cfg(target_os = "espidf")]
    fn reclaim_memory(&mut self) {
        self.reclaim_passes += 1;
        // SAFETY: read-only heap statistics queries.
        let (free, min_free) = unsafe {
            (
                esp_idf_svc::sys::esp_get_free_heap_size(),
                esp_idf_svc::sys::esp_get_minimum_free_heap_size(),
            )
        };
        info!("Heap: {} bytes free (low-water {})", free, min_free);
    }

    #[cfg(not(target_os = "espidf"))]
    fn reclaim_memory(&mut self) {
        self.reclaim_passes += 1;
        log::debug!("Memory reclaim pass {} (sim)", self.reclaim_passes);
    }
}

/// Hand control back to the platform. Never returns.
#[cfg(target_os = "espidf")]
pub fn restart(request: &RestartRequest) -> ! {
    error!(
        "RESTART | reason={} cycles={}",
        request.reason, request.cycles
    );
    esp_idf_hal::reset::restart();
}

/// Hand control back to the platform. Never returns.
#[cfg(not(target_os = "espidf"))]
pub fn restart(request: &RestartRequest) -> ! {
    error!(
        "RESTART | reason={} cycles={} (exit {})",
        request.reason, request.cycles, RESTART_EXIT_CODE
    );
    info!("Restarting...");
    log::logger().flush();
    std::process::exit(RESTART_EXIT_CODE);
}
