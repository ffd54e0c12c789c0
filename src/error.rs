//! Unified error types for the weather station firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! controller's escalation handling uniform: every variant that reaches the
//! controller ends the session with a restart.

use core::fmt;

/// Capacity of the message carried by [`Error::Unanticipated`].
pub const FAULT_MESSAGE_CAP: usize = 96;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fatal condition in the firmware funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The sensor bus could not be opened or a device did not respond.
    Sensor(SensorError),
    /// A network association or time synchronisation budget ran out.
    Comms(CommsError),
    /// The upload exchange could not be completed at all.
    Transport(TransportError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
    /// A fault nobody anticipated (a caught panic).
    Unanticipated(heapless::String<FAULT_MESSAGE_CAP>),
}

impl Error {
    /// Build an [`Error::Unanticipated`], truncating `msg` to capacity on a
    /// char boundary.
    pub fn unanticipated(msg: &str) -> Self {
        let mut s = heapless::String::new();
        for ch in msg.chars() {
            if s.push(ch).is_err() {
                break;
            }
        }
        Self::Unanticipated(s)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Unanticipated(msg) => write!(f, "unanticipated: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The I2C bus could not be opened.
    BusUnavailable,
    /// The environment sensor did not answer on the bus.
    NoResponse,
    /// ADC read returned an error.
    AdcReadFailed,
    /// Reading is not a finite number.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusUnavailable => write!(f, "sensor bus unavailable"),
            Self::NoResponse => write!(f, "device not responding"),
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors (exhausted retry budgets)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    WifiConnectFailed,
    WifiReconnectFailed,
    TimeSyncFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WifiConnectFailed => write!(f, "WiFi connect budget exhausted"),
            Self::WifiReconnectFailed => write!(f, "WiFi reconnect budget exhausted"),
            Self::TimeSyncFailed => write!(f, "time sync budget exhausted"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Transport errors (upload exchange never completed)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The request could not be built (bad URL, header too long).
    InvalidRequest,
    /// TCP/TLS connection to the server failed.
    ConnectFailed,
    /// The server did not answer within the request timeout.
    Timeout,
    /// The connection broke mid-exchange.
    Io,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRequest => write!(f, "invalid request"),
            Self::ConnectFailed => write!(f, "connection failed"),
            Self::Timeout => write!(f, "request timed out"),
            Self::Io => write!(f, "I/O error"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}
