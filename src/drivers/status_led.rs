//! Single-LED status indicator.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: the pin is a [`GpioOutput`](super::hw_init::GpioOutput)
//! configured by hw_init.
//! On host/test: the same `GpioOutput` turns writes into no-ops, and tests
//! pass any `embedded-hal` pin.

use embedded_hal::digital::OutputPin;
use log::debug;

use crate::app::events::StatusSignal;
use crate::app::ports::{Clock, IndicatorPort};

use super::led_patterns::pattern_for;

pub struct StatusLed<P> {
    pin: P,
    lit: bool,
}

impl<P: OutputPin> StatusLed<P> {
    pub fn new(pin: P) -> Self {
        let mut led = Self { pin, lit: true };
        led.off();
        led
    }

    // Pin errors are dropped: a broken LED must never stop telemetry.
    pub fn on(&mut self) {
        let _ = self.pin.set_high();
        self.lit = true;
    }

    pub fn off(&mut self) {
        let _ = self.pin.set_low();
        self.lit = false;
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

/// Plays blink patterns on a [`StatusLed`], blocking for their duration.
pub struct StatusIndicator<P, C> {
    led: StatusLed<P>,
    clock: C,
}

impl<P: OutputPin, C: Clock> StatusIndicator<P, C> {
    pub fn new(led: StatusLed<P>, clock: C) -> Self {
        Self { led, clock }
    }

    pub fn led(&self) -> &StatusLed<P> {
        &self.led
    }
}

impl<P: OutputPin, C: Clock> IndicatorPort for StatusIndicator<P, C> {
    fn signal(&mut self, signal: StatusSignal) {
        let pattern = pattern_for(signal);
        debug!("LED: {:?} ({} x {:?})", signal, pattern.count, pattern.period);
        for _ in 0..pattern.count {
            self.led.on();
            self.clock.sleep(pattern.period);
            self.led.off();
            self.clock.sleep(pattern.period);
        }
    }
}
