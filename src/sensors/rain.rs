//! Resistive rain gauge, read as a raw 12-bit ADC sample.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the ADC1 channel via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static AtomicU16 for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::error::SensorError;

#[cfg(not(target_os = "espidf"))]
static SIM_RAIN_ADC: AtomicU16 = AtomicU16::new(1024);
#[cfg(not(target_os = "espidf"))]
static SIM_RAIN_FAULT: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_rain_adc(raw: u16) {
    SIM_RAIN_ADC.store(raw, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_rain_fault(faulted: bool) {
    SIM_RAIN_FAULT.store(faulted, Ordering::Relaxed);
}

pub struct RainGauge {
    channel: u32,
}

impl RainGauge {
    /// `channel` is the ADC1 channel returned by `hw_init::init_peripherals`.
    pub fn new(channel: u32) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> u32 {
        self.channel
    }

    #[cfg(target_os = "espidf")]
    pub fn read(&self) -> Result<u16, SensorError> {
        hw_init::adc1_read(self.channel).map_err(|rc| {
            log::warn!("Rain gauge ADC read failed (rc={})", rc);
            SensorError::AdcReadFailed
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn read(&self) -> Result<u16, SensorError> {
        if SIM_RAIN_FAULT.load(Ordering::Relaxed) {
            return Err(SensorError::AdcReadFailed);
        }
        Ok(SIM_RAIN_ADC.load(Ordering::Relaxed))
    }
}
