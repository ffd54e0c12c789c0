//! Outbound application events and status signals.
//!
//! The [`ResilienceController`](super::controller::ResilienceController)
//! emits [`AppEvent`]s through the [`EventSink`](super::ports::EventSink)
//! port and [`StatusSignal`]s through the
//! [`IndicatorPort`](super::ports::IndicatorPort).

use std::net::Ipv4Addr;

use crate::error::Error;
use crate::fsm::StateId;

use super::telemetry::TelemetryRecord;

/// Operator-facing outcome codes, each mapped to a fixed blink pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusSignal {
    WifiConnected,
    WifiConnectFailed,
    WifiReconnected,
    WifiReconnectFailed,
    TimeSyncFailed,
    UploadOk,
    UploadRejected,
    UploadTransportFailed,
    CycleComplete,
    FatalError,
}

impl StatusSignal {
    pub const ALL: [StatusSignal; 10] = [
        Self::WifiConnected,
        Self::WifiConnectFailed,
        Self::WifiReconnected,
        Self::WifiReconnectFailed,
        Self::TimeSyncFailed,
        Self::UploadOk,
        Self::UploadRejected,
        Self::UploadTransportFailed,
        Self::CycleComplete,
        Self::FatalError,
    ];
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The controller moved between states.
    StateChanged { from: StateId, to: StateId },

    /// WiFi association completed (initially or after a drop).
    Associated { ip: Option<Ipv4Addr>, attempts: u32 },

    /// The wall clock was set from the network.
    TimeSynced { unix_time: u64, attempts: u32 },

    /// A record was built and is about to be uploaded.
    Telemetry(TelemetryRecord),

    /// The server acknowledged the record.
    UploadAccepted,

    /// The server answered with something other than 204.
    UploadRejected { status: u16, body: String },

    /// A full operational cycle finished (before the idle window).
    CycleCompleted { cycle: u64 },

    /// The controller gave up; a restart follows.
    RestartRequested { reason: Error, cycles: u64 },
}
