//! Port traits: the hexagonal boundary between the resilience controller
//! and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ResilienceController (domain)
//! ```
//!
//! Driven adapters (WiFi, SNTP, sensors, HTTP, status LED, platform) implement
//! these traits. The controller consumes them via generics, so the domain core
//! never touches hardware directly and every port can be replaced by a
//! scripted double in tests.
//!
//! All calls are blocking. Nothing here is `Send` or `Sync` on purpose: the
//! firmware runs one thread of control and every port is exclusively owned.

use core::fmt;
use core::time::Duration;
use std::net::Ipv4Addr;

use crate::config::{SystemConfig, WifiConfig};
use crate::error::{SensorError, TransportError};

use super::events::{AppEvent, StatusSignal};
use super::telemetry::Reading;

// ───────────────────────────────────────────────────────────────
// Clock (sleep + wall time)
// ───────────────────────────────────────────────────────────────

/// Blocking delay plus synchronised wall-clock time.
///
/// Every wait in the firmware goes through this port so that tests can
/// simulate elapsed time deterministically.
pub trait Clock {
    /// Block the caller for `duration`.
    fn sleep(&mut self, duration: Duration);

    /// Seconds since the Unix epoch, from the (synchronised) system clock.
    fn unix_time(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// WiFi association primitive
// ───────────────────────────────────────────────────────────────

/// The raw association primitive the network associator polls.
pub trait WifiPort {
    /// Start (or restart) association with the configured access point.
    /// Non-blocking: success only means the request was accepted.
    fn begin(&mut self, credentials: &WifiConfig) -> Result<(), ConnectivityError>;

    /// `true` once the station is associated and has an address.
    fn is_associated(&self) -> bool;

    /// Address assigned by DHCP, when known.
    fn ip_address(&self) -> Option<Ipv4Addr>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    InvalidSsid,
    InvalidPassword,
    DriverFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::DriverFailed => write!(f, "WiFi driver rejected the request"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Time source
// ───────────────────────────────────────────────────────────────

/// One synchronisation attempt against the remote time source.
pub trait TimeSourcePort {
    /// Try once to set the system clock from the network.
    fn sync_once(&mut self) -> Result<(), TimeSyncError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSyncError {
    /// The server could not be reached.
    Unreachable,
    /// No answer yet.
    Pending,
    /// The clock reads a time before 2020 after the exchange.
    Implausible,
}

impl fmt::Display for TimeSyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable => write!(f, "time server unreachable"),
            Self::Pending => write!(f, "no response from time server yet"),
            Self::Implausible => write!(f, "clock not plausible after sync"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Sensor port
// ───────────────────────────────────────────────────────────────

/// Read-side port: one fresh [`Reading`] per call.
pub trait SensorPort {
    fn read(&mut self) -> Result<Reading, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// HTTP transport
// ───────────────────────────────────────────────────────────────

/// A response whose status line was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Minimal blocking HTTP client: one POST, one response.
pub trait HttpTransport {
    /// `Err` only when no status line was received at all.
    fn post(
        &mut self,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
    ) -> Result<HttpResponse, TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Status indicator
// ───────────────────────────────────────────────────────────────

/// Operator-facing feedback. Blocks for the whole blink pattern.
pub trait IndicatorPort {
    fn signal(&mut self, signal: StatusSignal);
}

// ───────────────────────────────────────────────────────────────
// Platform services
// ───────────────────────────────────────────────────────────────

/// Execution-environment hooks the controller needs between cycles.
pub trait PlatformPort {
    /// Advisory memory-reclamation pass. Never fails.
    fn reclaim_memory(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The controller emits structured [`AppEvent`]s through this port.
/// Adapters decide where they go (serial log, test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Produces the boot-time configuration.
///
/// Implementations MUST validate before returning; the firmware never
/// reconfigures at runtime.
pub trait ConfigPort {
    fn load(&self) -> Result<SystemConfig, ConfigError>;
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// The configured source does not exist.
    NotFound,
    /// The source could not be parsed.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error reading the source.
    IoError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
