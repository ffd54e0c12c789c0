//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                  |
//! |----------------|--------------------|------------------------------|
//! | `config_store` | ConfigPort         | Compile-time defaults / JSON |
//! | `http`         | HttpTransport      | EspHttpConnection / reqwest  |
//! | `log_sink`     | EventSink          | Serial log output            |
//! | `platform`     | PlatformPort       | ESP-IDF heap stats, restart  |
//! | `time`         | Clock              | std sleep + system clock     |
//! |                | TimeSourcePort     | ESP-IDF SNTP                 |
//! | `wifi`         | WifiPort           | ESP-IDF WiFi STA             |
//!
//! Sensors and the status LED implement their ports directly in
//! [`crate::sensors`] and [`crate::drivers`].

pub mod config_store;
pub mod http;
pub mod log_sink;
pub mod platform;
pub mod time;
pub mod wifi;
