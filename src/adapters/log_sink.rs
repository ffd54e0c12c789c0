//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC on the device, stderr on the host). Every
//! line starts with a fixed tag so serial captures can be grepped.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink {
    /// Local offset from UTC, applied to displayed times only.
    utc_offset_secs: i64,
}

impl LogEventSink {
    pub fn new(timezone_offset_hours: i8) -> Self {
        Self {
            utc_offset_secs: i64::from(timezone_offset_hours) * 3_600,
        }
    }

    /// `HH:MM:SS` local time of day for `unix_time`.
    pub fn local_time_of_day(&self, unix_time: u64) -> String {
        let local = (unix_time as i64 + self.utc_offset_secs).rem_euclid(86_400);
        format!(
            "{:02}:{:02}:{:02}",
            local / 3_600,
            (local % 3_600) / 60,
            local % 60
        )
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {} -> {}", from, to);
            }
            AppEvent::Associated { ip, attempts } => match ip {
                Some(ip) => info!("NET | associated ip={} attempts={}", ip, attempts),
                None => info!("NET | associated attempts={}", attempts),
            },
            AppEvent::TimeSynced {
                unix_time,
                attempts,
            } => {
                info!(
                    "TIME | synced unix={} local={} attempts={}",
                    unix_time,
                    self.local_time_of_day(*unix_time),
                    attempts
                );
            }
            AppEvent::Telemetry(record) => {
                info!("TELEM | {}", record);
            }
            AppEvent::UploadAccepted => {
                info!("UPLOAD | accepted");
            }
            AppEvent::UploadRejected { status, body } => {
                warn!("UPLOAD | rejected status={} body={}", status, body);
            }
            AppEvent::CycleCompleted { cycle } => {
                info!("CYCLE | {} complete", cycle);
            }
            AppEvent::RestartRequested { reason, cycles } => {
                error!("RESTART | requested reason={} cycles={}", reason, cycles);
            }
        }
    }
}
