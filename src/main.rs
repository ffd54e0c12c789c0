//! Weather station firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  WifiAdapter    SntpTimeSource   SensorHub      HttpClient     │
//! │  (WifiPort)     (TimeSource)     (SensorPort)   (HttpTransport)│
//! │  StatusIndicator  LogEventSink   EspPlatform    SystemClock    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │          ResilienceController (pure logic)             │    │
//! │  │  FSM · retry budgets · encoder · uploader              │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One session runs from boot to a [`RestartRequest`]; the platform
//! restart then starts the next session from scratch.

#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info};

use weatherstation::adapters::config_store::BootConfigLoader;
use weatherstation::adapters::http::HttpClient;
use weatherstation::adapters::log_sink::LogEventSink;
use weatherstation::adapters::platform::{self, EspPlatform};
use weatherstation::adapters::time::{SntpTimeSource, SystemClock};
use weatherstation::adapters::wifi::WifiAdapter;
use weatherstation::app::controller::{ResilienceController, RestartRequest, StationPorts, fail_boot};
use weatherstation::app::ports::{ConfigError, ConfigPort};
use weatherstation::app::upload::InfluxUploader;
use weatherstation::config::{PinConfig, SystemConfig};
use weatherstation::drivers::hw_init::{self, GpioOutput};
use weatherstation::drivers::status_led::{StatusIndicator, StatusLed};
use weatherstation::error::Error;
use weatherstation::sensors::SensorHub;
use weatherstation::sensors::environment::EnvironmentSensor;
use weatherstation::sensors::rain::RainGauge;

type Indicator = StatusIndicator<GpioOutput, SystemClock>;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Platform bootstrap + logging ───────────────────────
    init_logging()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  WeatherStation v{}                ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Boot configuration ─────────────────────────────────
    let config = match BootConfigLoader::from_env().load() {
        Ok(cfg) => cfg,
        Err(e) => config_failure(&e),
    };
    info!("Config: {:?}", config);

    // ── 3. Session ────────────────────────────────────────────
    let request = match run_station(&config) {
        Ok(request) => request,
        Err(e) => {
            error!("Boot failed: {:#}", e);
            boot_failure(
                &config.pins,
                Error::Init("boot failed"),
                config.policy.restart_settle_ms,
            )
        }
    };

    // ── 4. Restart ────────────────────────────────────────────
    platform::restart(&request)
}

#[cfg(target_os = "espidf")]
fn init_logging() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn init_logging() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    Ok(())
}

/// The device has no operator to read an exit code: blink and restart.
#[cfg(target_os = "espidf")]
fn config_failure(e: &ConfigError) -> ! {
    error!("Config invalid: {}", e);
    // The stored pin map is suspect too; blink on the board default.
    let request = boot_failure(
        &PinConfig::default(),
        Error::Config("boot configuration invalid"),
        2_000,
    );
    platform::restart(&request)
}

/// On a host, restarting cannot fix a config file: exit with `EX_CONFIG`.
#[cfg(not(target_os = "espidf"))]
fn config_failure(e: &ConfigError) -> ! {
    error!("Config invalid: {}", e);
    std::process::exit(platform::CONFIG_EXIT_CODE);
}

/// Signal a fault raised before the station's own indicator exists.
fn boot_failure(pins: &PinConfig, reason: Error, settle_ms: u32) -> RestartRequest {
    let pin = hw_init::init_status_led(pins.status_led).unwrap_or_else(|e| {
        error!("Status LED init: {}", e);
        GpioOutput::new(pins.status_led)
    });
    let mut indicator = StatusIndicator::new(StatusLed::new(pin), SystemClock::new());
    fail_boot(&mut indicator, &mut SystemClock::new(), reason, settle_ms)
}

// ── Station wiring ────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn run_station(config: &SystemConfig) -> Result<RestartRequest> {
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let hw = hw_init::init_peripherals(&config.pins)?;
    let mut indicator = StatusIndicator::new(StatusLed::new(hw.status_led), SystemClock::new());
    let settle = config.policy.restart_settle_ms;

    let environment = match EnvironmentSensor::open(peripherals.i2c0, &config.pins) {
        Ok(sensor) => sensor,
        Err(e) => return Ok(fail_boot(&mut indicator, &mut SystemClock::new(), e.into(), settle)),
    };
    let wifi = match WifiAdapter::new(peripherals.modem, sysloop, Some(nvs)) {
        Ok(wifi) => wifi,
        Err(e) => {
            error!("WiFi init: {}", e);
            let reason = Error::Init("wifi driver");
            return Ok(fail_boot(&mut indicator, &mut SystemClock::new(), reason, settle));
        }
    };
    let sensors = SensorHub::new(environment, RainGauge::new(hw.rain_channel));
    Ok(run_session(config, wifi, sensors, indicator))
}

#[cfg(not(target_os = "espidf"))]
fn run_station(config: &SystemConfig) -> Result<RestartRequest> {
    let hw = hw_init::init_peripherals(&config.pins)?;
    let mut indicator = StatusIndicator::new(StatusLed::new(hw.status_led), SystemClock::new());

    let environment = match EnvironmentSensor::open(&config.pins) {
        Ok(sensor) => sensor,
        Err(e) => {
            return Ok(fail_boot(
                &mut indicator,
                &mut SystemClock::new(),
                e.into(),
                config.policy.restart_settle_ms,
            ));
        }
    };
    let sensors = SensorHub::new(environment, RainGauge::new(hw.rain_channel));
    Ok(run_session(config, WifiAdapter::new(), sensors, indicator))
}

fn run_session(
    config: &SystemConfig,
    wifi: WifiAdapter,
    sensors: SensorHub,
    mut indicator: Indicator,
) -> RestartRequest {
    let transport = match HttpClient::new(&config.influx) {
        Ok(transport) => transport,
        Err(e) => {
            let settle = config.policy.restart_settle_ms;
            return fail_boot(&mut indicator, &mut SystemClock::new(), e.into(), settle);
        }
    };
    let ports = StationPorts {
        wifi,
        time_source: SntpTimeSource::new(&config.ntp_server),
        sensors,
        uploader: InfluxUploader::new(transport, &config.influx),
        indicator,
        platform: EspPlatform::new(),
        clock: SystemClock::new(),
        sink: LogEventSink::new(config.timezone_offset_hours),
    };
    let mut controller = ResilienceController::new(config, ports);
    controller.run_supervised()
}
