//! BME280 temperature / pressure / humidity sensor on I2C.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: `bme280` driver over an `esp-idf-hal` I2C master at the
//! primary address (0x76). Pressure arrives in Pa and is reported in hPa.
//! On host/test: reads from static atomics for injection, with a fault
//! switch that makes the next reads fail with `NoResponse`.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::config::PinConfig;
use crate::error::SensorError;

/// One raw environment sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentSample {
    pub temperature_c: f32,
    pub pressure_hpa: f32,
    pub humidity_pct: f32,
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
static SIM_TEMPERATURE: AtomicU32 = AtomicU32::new(0x41AC_0000); // 21.5
#[cfg(not(target_os = "espidf"))]
static SIM_PRESSURE: AtomicU32 = AtomicU32::new(0x447D_4CCD); // 1013.2
#[cfg(not(target_os = "espidf"))]
static SIM_HUMIDITY: AtomicU32 = AtomicU32::new(0x425C_0000); // 55.0
#[cfg(not(target_os = "espidf"))]
static SIM_FAULT: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_environment(temperature_c: f32, pressure_hpa: f32, humidity_pct: f32) {
    SIM_TEMPERATURE.store(temperature_c.to_bits(), Ordering::Relaxed);
    SIM_PRESSURE.store(pressure_hpa.to_bits(), Ordering::Relaxed);
    SIM_HUMIDITY.store(humidity_pct.to_bits(), Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_environment_fault(faulted: bool) {
    SIM_FAULT.store(faulted, Ordering::Relaxed);
}

// ── Driver ────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct EnvironmentSensor {
    bme: bme280::i2c::BME280<esp_idf_hal::i2c::I2cDriver<'static>>,
    delay: esp_idf_hal::delay::FreeRtos,
}

#[cfg(target_os = "espidf")]
impl EnvironmentSensor {
    /// Open the I2C bus on the configured pins and initialise the BME280.
    pub fn open(i2c: esp_idf_hal::i2c::I2C0, pins: &PinConfig) -> Result<Self, SensorError> {
        use esp_idf_hal::gpio::AnyIOPin;
        use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
        use esp_idf_hal::units::Hertz;

        let config = I2cConfig::new().baudrate(Hertz(crate::pins::I2C_FREQ_HZ));
        // SAFETY: the pin numbers come from validated config and are not
        // claimed by any other driver.
        let (sda, scl) = unsafe { (AnyIOPin::new(pins.i2c_sda), AnyIOPin::new(pins.i2c_scl)) };
        let bus = I2cDriver::new(i2c, sda, scl, &config).map_err(|e| {
            log::error!("I2C bus init failed: {:?}", e);
            SensorError::BusUnavailable
        })?;

        let mut delay = esp_idf_hal::delay::FreeRtos;
        let mut bme = bme280::i2c::BME280::new_primary(bus);
        bme.init(&mut delay).map_err(|e| {
            log::error!("Could not find a valid BME280 sensor, check wiring: {:?}", e);
            SensorError::NoResponse
        })?;
        log::info!(
            "BME280 ready on SDA=GPIO{} SCL=GPIO{}",
            pins.i2c_sda,
            pins.i2c_scl
        );
        Ok(Self { bme, delay })
    }

    pub fn read(&mut self) -> Result<EnvironmentSample, SensorError> {
        let m = self.bme.measure(&mut self.delay).map_err(|e| {
            log::warn!("BME280 measurement failed: {:?}", e);
            SensorError::NoResponse
        })?;
        Ok(EnvironmentSample {
            temperature_c: m.temperature,
            pressure_hpa: m.pressure / 100.0,
            humidity_pct: m.humidity,
        })
    }
}

#[cfg(not(target_os = "espidf"))]
pub struct EnvironmentSensor {
    _pins: PinConfig,
}

#[cfg(not(target_os = "espidf"))]
impl EnvironmentSensor {
    pub fn open(pins: &PinConfig) -> Result<Self, SensorError> {
        log::info!(
            "BME280(sim) on SDA=GPIO{} SCL=GPIO{}",
            pins.i2c_sda,
            pins.i2c_scl
        );
        Ok(Self { _pins: *pins })
    }

    pub fn read(&mut self) -> Result<EnvironmentSample, SensorError> {
        if SIM_FAULT.load(Ordering::Relaxed) {
            return Err(SensorError::NoResponse);
        }
        Ok(EnvironmentSample {
            temperature_c: f32::from_bits(SIM_TEMPERATURE.load(Ordering::Relaxed)),
            pressure_hpa: f32::from_bits(SIM_PRESSURE.load(Ordering::Relaxed)),
            humidity_pct: f32::from_bits(SIM_HUMIDITY.load(Ordering::Relaxed)),
        })
    }
}
