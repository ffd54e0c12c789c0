//! Default GPIO / peripheral pin assignments for the weather station board.
//!
//! These are the defaults baked into [`PinConfig`](crate::config::PinConfig);
//! drivers read the pin numbers from the config value they are constructed
//! with, never from this module directly.

// ---------------------------------------------------------------------------
// I²C bus (BME280 temperature / pressure / humidity)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 16;
pub const I2C_SCL_GPIO: i32 = 17;
/// Standard-mode I²C.
pub const I2C_FREQ_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// Rain gauge: analog voltage via resistive divider
// ---------------------------------------------------------------------------

/// ADC1 channel 3 (GPIO 4 on ESP32-S3). ADC2 is unusable while WiFi is up.
pub const RAIN_ADC_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Status LED (single discrete LED, active HIGH)
// ---------------------------------------------------------------------------

pub const STATUS_LED_GPIO: i32 = 2;

/// Highest GPIO number on the ESP32-S3.
pub const MAX_GPIO: i32 = 48;

pub const fn is_valid_gpio(gpio: i32) -> bool {
    gpio >= 0 && gpio <= MAX_GPIO
}

/// Map an ADC1-capable GPIO to its ADC1 channel on the ESP32-S3.
///
/// GPIO 1–10 are ADC1 channels 0–9; everything else is not on ADC1.
pub const fn adc1_channel_for_gpio(gpio: i32) -> Option<u32> {
    if gpio >= 1 && gpio <= 10 {
        Some((gpio - 1) as u32)
    } else {
        None
    }
}
