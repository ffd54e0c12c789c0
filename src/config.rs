//! System configuration parameters
//!
//! One immutable [`SystemConfig`] is built at boot and handed to every
//! collaborator's constructor. Defaults come from compile-time environment
//! variables (`WIFI_SSID`, `WIFI_PASS`, `INFLUX_URL`, `INFLUX_TOKEN`,
//! `STATION_HOSTNAME`, `STATION_LOCATION`); host builds may override the
//! whole value from a JSON file at boot. There is no runtime reconfiguration.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::app::retry::RetryBudget;
use crate::pins;

pub const SSID_CAP: usize = 32;
pub const PASSWORD_CAP: usize = 64;
pub const HOSTNAME_CAP: usize = 32;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    pub wifi: WifiConfig,
    pub influx: InfluxConfig,
    pub pins: PinConfig,
    pub policy: ResiliencePolicy,
    /// NTP server queried by the time synchroniser.
    pub ntp_server: String,
    /// Local offset from UTC in whole hours (log output only; records are UTC).
    pub timezone_offset_hours: i8,
}

/// Station-mode WiFi credentials and the DHCP hostname.
#[derive(Clone, Serialize, Deserialize)]
pub struct WifiConfig {
    pub ssid: heapless::String<SSID_CAP>,
    pub password: heapless::String<PASSWORD_CAP>,
    pub hostname: heapless::String<HOSTNAME_CAP>,
}

/// InfluxDB v2 write endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct InfluxConfig {
    /// Full write URL including `org`, `bucket` and `precision=s`.
    pub url: String,
    /// API token sent as `Authorization: Token <token>`.
    pub token: String,
    /// Line-protocol measurement name.
    pub measurement: String,
    /// Value of the `location` tag.
    pub location: String,
    /// Upper bound for one upload exchange (milliseconds).
    pub request_timeout_ms: u32,
}

/// GPIO assignments (defaults in [`crate::pins`]).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PinConfig {
    pub i2c_sda: i32,
    pub i2c_scl: i32,
    pub rain_adc: i32,
    pub status_led: i32,
}

/// Retry budgets and idle timing for the resilience controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResiliencePolicy {
    // --- Bootstrapping ---
    pub connect_attempts: u32,
    pub connect_spacing_ms: u32,
    pub time_sync_attempts: u32,
    pub time_sync_spacing_ms: u32,

    // --- Operational ---
    pub reconnect_attempts: u32,
    pub reconnect_spacing_ms: u32,
    /// Total idle time between cycles.
    pub idle_window_ms: u32,
    /// Connectivity is re-checked at every slice boundary of the idle window.
    pub idle_slice_ms: u32,

    // --- Restarting ---
    /// Pause after a failure signal before the restart is issued.
    pub restart_settle_ms: u32,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const DEFAULT_URL: &str = "http://localhost:8086/api/v2/write?org=ORG&bucket=BUCKET&precision=s";
const DEFAULT_HOSTNAME: &str = "WeatherStation";
const DEFAULT_MEASUREMENT: &str = "Weather_Station";
const DEFAULT_LOCATION: &str = "LOCATION";
const DEFAULT_NTP_SERVER: &str = "za.pool.ntp.org";

/// Copy `s` into a bounded string; an oversized value yields an empty
/// string so that [`SystemConfig::validate`] rejects it instead of silently
/// truncating credentials.
fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
    heapless::String::try_from(s).unwrap_or_default()
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            wifi: WifiConfig::default(),
            influx: InfluxConfig::default(),
            pins: PinConfig::default(),
            policy: ResiliencePolicy::default(),
            ntp_server: DEFAULT_NTP_SERVER.into(),
            timezone_offset_hours: 2,
        }
    }
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            ssid: bounded(option_env!("WIFI_SSID").unwrap_or("")),
            password: bounded(option_env!("WIFI_PASS").unwrap_or("")),
            hostname: bounded(option_env!("STATION_HOSTNAME").unwrap_or(DEFAULT_HOSTNAME)),
        }
    }
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            url: option_env!("INFLUX_URL").unwrap_or(DEFAULT_URL).into(),
            token: option_env!("INFLUX_TOKEN").unwrap_or("").into(),
            measurement: DEFAULT_MEASUREMENT.into(),
            location: option_env!("STATION_LOCATION")
                .unwrap_or(DEFAULT_LOCATION)
                .into(),
            request_timeout_ms: 10_000,
        }
    }
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            i2c_sda: pins::I2C_SDA_GPIO,
            i2c_scl: pins::I2C_SCL_GPIO,
            rain_adc: pins::RAIN_ADC_GPIO,
            status_led: pins::STATUS_LED_GPIO,
        }
    }
}

impl Default for ResiliencePolicy {
    fn default() -> Self {
        Self {
            connect_attempts: 30,
            connect_spacing_ms: 2_000,
            time_sync_attempts: 5,
            time_sync_spacing_ms: 2_000,
            reconnect_attempts: 10,
            reconnect_spacing_ms: 1_000,
            idle_window_ms: 60_000,
            idle_slice_ms: 2_000,
            restart_settle_ms: 2_000,
        }
    }
}

// Secrets stay out of log output.
impl fmt::Debug for WifiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WifiConfig")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .field("hostname", &self.hostname)
            .finish()
    }
}

impl fmt::Debug for InfluxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfluxConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("measurement", &self.measurement)
            .field("location", &self.location)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Budgets
// ---------------------------------------------------------------------------

impl ResiliencePolicy {
    pub fn connect_budget(&self) -> RetryBudget {
        RetryBudget::from_ms(self.connect_attempts, self.connect_spacing_ms)
    }

    pub fn time_sync_budget(&self) -> RetryBudget {
        RetryBudget::from_ms(self.time_sync_attempts, self.time_sync_spacing_ms)
    }

    pub fn reconnect_budget(&self) -> RetryBudget {
        RetryBudget::from_ms(self.reconnect_attempts, self.reconnect_spacing_ms)
    }

    /// Number of slices in one idle window (at least one).
    pub fn idle_slices(&self) -> u32 {
        (self.idle_window_ms / self.idle_slice_ms.max(1)).max(1)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl SystemConfig {
    /// Reject values the firmware cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        crate::adapters::wifi::validate_credentials(&self.wifi.ssid, &self.wifi.password)
            .map_err(|_| ConfigError::ValidationFailed("wifi credentials invalid"))?;
        if self.wifi.hostname.is_empty() {
            return Err(ConfigError::ValidationFailed("hostname empty"));
        }

        let url = self.influx.url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationFailed(
                "influx url must start with http:// or https://",
            ));
        }
        if self.influx.measurement.is_empty() {
            return Err(ConfigError::ValidationFailed("measurement empty"));
        }
        if self.influx.location.is_empty() {
            return Err(ConfigError::ValidationFailed("location empty"));
        }
        if self.influx.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("request timeout zero"));
        }
        if self.ntp_server.is_empty() {
            return Err(ConfigError::ValidationFailed("ntp server empty"));
        }
        if !(-12..=14).contains(&self.timezone_offset_hours) {
            return Err(ConfigError::ValidationFailed(
                "timezone offset outside -12..=14",
            ));
        }

        let pin_map = &self.pins;
        for gpio in [pin_map.i2c_sda, pin_map.i2c_scl, pin_map.rain_adc, pin_map.status_led] {
            if !pins::is_valid_gpio(gpio) {
                return Err(ConfigError::ValidationFailed("pin outside GPIO 0..=48"));
            }
        }
        if pins::adc1_channel_for_gpio(pin_map.rain_adc).is_none() {
            return Err(ConfigError::ValidationFailed("rain pin has no ADC1 channel"));
        }

        let p = &self.policy;
        if p.connect_attempts == 0 || p.time_sync_attempts == 0 || p.reconnect_attempts == 0 {
            return Err(ConfigError::ValidationFailed("retry budget with zero attempts"));
        }
        if p.idle_slice_ms == 0 {
            return Err(ConfigError::ValidationFailed("idle slice zero"));
        }
        if p.idle_slice_ms > p.idle_window_ms {
            return Err(ConfigError::ValidationFailed("idle slice longer than window"));
        }
        Ok(())
    }
}
