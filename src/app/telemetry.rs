//! Readings and the line-protocol encoder.
//!
//! ```text
//! <measurement>,location=<loc> temperature=<f>,humidity=<f>,rain=<i>,pressure=<f> <unix-secs>
//! ```
//!
//! Field order is fixed; the backend dashboards depend on it.

use core::fmt::{self, Write};

use crate::config::InfluxConfig;

/// Seconds since the Unix epoch.
pub type Timestamp = u64;

/// One sensor acquisition. Produced fresh each cycle, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Degrees Celsius.
    pub temperature: f32,
    /// Hectopascal.
    pub pressure: f32,
    /// Relative humidity, percent.
    pub humidity: f32,
    /// Raw ADC sample from the rain gauge.
    pub rain_level: u16,
}

impl Reading {
    /// `true` when every float field is finite (encodable).
    pub fn is_finite(&self) -> bool {
        self.temperature.is_finite() && self.pressure.is_finite() && self.humidity.is_finite()
    }
}

/// An encoded, immutable line-protocol record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryRecord(String);

impl TelemetryRecord {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for TelemetryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds records for one measurement / location pair.
#[derive(Debug, Clone)]
pub struct TelemetryEncoder {
    /// Measurement and tag set, already escaped: `Weather_Station,location=X`.
    series_key: String,
}

impl TelemetryEncoder {
    pub fn new(measurement: &str, location: &str) -> Self {
        let mut series_key = String::with_capacity(measurement.len() + location.len() + 10);
        escape_into(&mut series_key, measurement, &[',', ' ']);
        series_key.push_str(",location=");
        escape_into(&mut series_key, location, &[',', ' ', '=']);
        Self { series_key }
    }

    pub fn from_config(influx: &InfluxConfig) -> Self {
        Self::new(&influx.measurement, &influx.location)
    }

    /// Encode a reading taken at `timestamp`. Floats use the shortest
    /// representation that round-trips and always carry a decimal part
    /// (`55.0`, not `55`).
    pub fn encode(&self, reading: &Reading, timestamp: Timestamp) -> TelemetryRecord {
        let mut line = String::with_capacity(self.series_key.len() + 96);
        line.push_str(&self.series_key);
        // Writing into a String cannot fail.
        let _ = write!(
            line,
            " temperature={:?},humidity={:?},rain={},pressure={:?} {}",
            reading.temperature, reading.humidity, reading.rain_level, reading.pressure, timestamp
        );
        TelemetryRecord(line)
    }
}

/// Backslash-escape the characters line protocol reserves in keys and tags.
fn escape_into(out: &mut String, raw: &str, reserved: &[char]) {
    for ch in raw.chars() {
        if ch == '\\' || reserved.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
}
