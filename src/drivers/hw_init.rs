//! One-shot hardware peripheral initialization.
//!
//! Configures the ADC1 channel behind the rain gauge and the status LED
//! output using raw ESP-IDF sys calls. Called once from `main()` before the
//! controller starts. The I2C bus is opened by the environment sensor
//! driver itself through `esp-idf-hal`.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use core::convert::Infallible;

use crate::config::PinConfig;
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    /// No such GPIO on this chip.
    InvalidPin(i32),
    /// The configured GPIO has no ADC1 channel.
    NotAnAdcPin(i32),
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidPin(gpio)     => write!(f, "GPIO{} does not exist", gpio),
            Self::NotAnAdcPin(gpio)    => write!(f, "GPIO{} is not an ADC1 pin", gpio),
            Self::AdcInitFailed(rc)    => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

/// Handles produced by [`init_peripherals`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Peripherals {
    /// ADC1 channel wired to the rain gauge.
    pub rain_channel: u32,
    pub status_led: GpioOutput,
}

#[cfg(target_os = "espidf")]
use log::info;

/// Resolve pin assignments and configure the analog and digital pins.
pub fn init_peripherals(cfg: &PinConfig) -> Result<Peripherals, HwInitError> {
    let rain_channel =
        pins::adc1_channel_for_gpio(cfg.rain_adc).ok_or(HwInitError::NotAnAdcPin(cfg.rain_adc))?;

    let status_led = init_status_led(cfg.status_led)?;

    #[cfg(target_os = "espidf")]
    {
        // SAFETY: Called once from main() before the controller runs; single-threaded.
        unsafe { init_adc(rain_channel)? };
        info!("hw_init: all peripherals configured");
    }
    #[cfg(not(target_os = "espidf"))]
    log::info!(
        "hw_init(sim): peripheral init skipped (rain=ADC1_CH{}, led=GPIO{})",
        rain_channel,
        cfg.status_led
    );

    Ok(Peripherals {
        rain_channel,
        status_led,
    })
}

/// Configure only the status LED output. Used on its own when the rest of
/// the board could not be brought up but the fault still has to be shown.
pub fn init_status_led(pin: i32) -> Result<GpioOutput, HwInitError> {
    if !pins::is_valid_gpio(pin) {
        return Err(HwInitError::InvalidPin(pin));
    }
    #[cfg(target_os = "espidf")]
    {
        // SAFETY: single-threaded boot path; the pin number is in range.
        unsafe { init_gpio_output(pin)? };
    }
    Ok(GpioOutput::new(pin))
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// controller's read path. `init_adc()` completes before the first read.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc(channel: u32) -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }

    // 12 dB attenuation: full 0-3.3 V swing of the rain gauge divider.
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), channel, &chan_cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }

    info!("hw_init: ADC1 configured (CH{}=rain)", channel);
    Ok(())
}

/// One raw 12-bit sample. `Err` carries the ESP-IDF return code.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> Result<u16, i32> {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract, single-threaded access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return Err(ret);
    }
    Ok(raw.clamp(0, i32::from(u16::MAX)) as u16)
}

// ── GPIO output ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_output(pin: i32) -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
    unsafe { gpio_set_level(pin, 0) };

    info!("hw_init: GPIO{} output configured", pin);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin.
    unsafe { gpio_set_level(pin, u32::from(high)); }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

/// A configured push-pull output, usable wherever `embedded-hal` expects
/// an [`OutputPin`](embedded_hal::digital::OutputPin).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioOutput {
    pin: i32,
}

impl GpioOutput {
    pub const fn new(pin: i32) -> Self {
        Self { pin }
    }

    pub fn pin(&self) -> i32 {
        self.pin
    }
}

impl embedded_hal::digital::ErrorType for GpioOutput {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for GpioOutput {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.pin, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.pin, true);
        Ok(())
    }
}
