//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns both sensor drivers and produces one [`Reading`] per
//! operational cycle. Unlike a control loop, telemetry has no use for a
//! stale value: any read failure is returned to the controller.

pub mod environment;
pub mod rain;

use log::{info, warn};

use crate::app::ports::SensorPort;
use crate::app::telemetry::Reading;
use crate::error::SensorError;
use environment::EnvironmentSensor;
use rain::RainGauge;

pub struct SensorHub {
    pub environment: EnvironmentSensor,
    pub rain: RainGauge,
}

impl SensorHub {
    /// Pass in pre-built drivers (built in main where peripheral ownership
    /// is established).
    pub fn new(environment: EnvironmentSensor, rain: RainGauge) -> Self {
        Self { environment, rain }
    }
}

impl SensorPort for SensorHub {
    fn read(&mut self) -> Result<Reading, SensorError> {
        let env = self.environment.read()?;
        let rain_level = self.rain.read()?;

        let reading = Reading {
            temperature: env.temperature_c,
            pressure: env.pressure_hpa,
            humidity: env.humidity_pct,
            rain_level,
        };
        if !reading.is_finite() {
            warn!("Sensor returned a non-finite value: {:?}", reading);
            return Err(SensorError::OutOfRange);
        }
        info!(
            "Temp: {} C, Pressure: {} hPa, Humidity: {} %, Rain Level: {}",
            reading.temperature, reading.pressure, reading.humidity, reading.rain_level
        );
        Ok(reading)
    }
}
