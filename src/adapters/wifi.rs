//! WiFi station-mode adapter.
//!
//! Implements [`WifiPort`], the raw association primitive the
//! [`NetworkAssociator`](crate::app::network::NetworkAssociator) polls.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation that associates as soon as it is asked to.

use std::net::Ipv4Addr;

use log::info;

use crate::app::ports::{ConnectivityError, WifiPort};
use crate::config::WifiConfig;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

/// Space through tilde, inclusive.
fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

/// SSID must be 1-32 printable ASCII bytes; the password is empty (open
/// network) or 8-64 bytes (WPA2).
pub fn validate_credentials(ssid: &str, password: &str) -> Result<(), ConnectivityError> {
    validate_ssid(ssid)?;
    validate_password(password)
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter (ESP-IDF)
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct WifiAdapter {
    wifi: esp_idf_svc::wifi::EspWifi<'static>,
    started: bool,
}

#[cfg(target_os = "espidf")]
impl WifiAdapter {
    pub fn new(
        modem: esp_idf_hal::modem::Modem,
        sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
        nvs: Option<esp_idf_svc::nvs::EspDefaultNvsPartition>,
    ) -> Result<Self, ConnectivityError> {
        let wifi = esp_idf_svc::wifi::EspWifi::new(modem, sysloop, nvs).map_err(|e| {
            log::error!("WiFi driver init failed: {:?}", e);
            ConnectivityError::DriverFailed
        })?;
        Ok(Self {
            wifi,
            started: false,
        })
    }
}

#[cfg(target_os = "espidf")]
impl WifiPort for WifiAdapter {
    fn begin(&mut self, credentials: &WifiConfig) -> Result<(), ConnectivityError> {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        validate_credentials(&credentials.ssid, &credentials.password)?;
        let auth_method = if credentials.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
            ssid: credentials
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidSsid)?,
            password: credentials
                .password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });

        let driver = |e: esp_idf_svc::sys::EspError| {
            log::warn!("WiFi driver error: {:?}", e);
            ConnectivityError::DriverFailed
        };
        self.wifi.set_configuration(&config).map_err(driver)?;
        if !self.started {
            if let Err(e) = self.wifi.sta_netif_mut().set_hostname(&credentials.hostname) {
                log::warn!("Could not set hostname '{}': {:?}", credentials.hostname, e);
            }
            self.wifi.start().map_err(driver)?;
            self.started = true;
        }
        self.wifi.connect().map_err(driver)?;
        info!("WiFi: association with '{}' requested", credentials.ssid);
        Ok(())
    }

    fn is_associated(&self) -> bool {
        self.wifi.is_up().unwrap_or(false)
    }

    fn ip_address(&self) -> Option<Ipv4Addr> {
        self.wifi.sta_netif().get_ip_info().ok().map(|info| info.ip)
    }
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter (simulation)
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub struct WifiAdapter {
    associated: bool,
    begin_calls: u32,
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
impl WifiAdapter {
    pub fn new() -> Self {
        Self {
            associated: false,
            begin_calls: 0,
        }
    }

    /// Simulate the access point going away.
    pub fn sim_drop_link(&mut self) {
        info!("WiFi(sim): link dropped");
        self.associated = false;
    }

    pub fn begin_calls(&self) -> u32 {
        self.begin_calls
    }
}

#[cfg(not(target_os = "espidf"))]
impl WifiPort for WifiAdapter {
    fn begin(&mut self, credentials: &WifiConfig) -> Result<(), ConnectivityError> {
        validate_credentials(&credentials.ssid, &credentials.password)?;
        self.begin_calls += 1;
        self.associated = true;
        info!(
            "WiFi(sim): associated with '{}' as '{}' (begin #{})",
            credentials.ssid, credentials.hostname, self.begin_calls
        );
        Ok(())
    }

    fn is_associated(&self) -> bool {
        self.associated
    }

    fn ip_address(&self) -> Option<Ipv4Addr> {
        self.associated.then_some(Ipv4Addr::new(192, 168, 4, 2))
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
