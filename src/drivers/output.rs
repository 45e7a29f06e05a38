//! Active-high digital output (buzzer, relay coil driver).
//!
//! A dumb actuator: the control loop decides the level, this driver only
//! writes it and remembers what it wrote. The GPIO level is the only
//! state that survives from one cycle to the next.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the pin via hw_init helpers.
//! On host/test: tracks state in-memory only.

use log::debug;

use crate::drivers::hw_init;

pub struct GpioOutput {
    name: &'static str,
    gpio: i32,
    high: bool,
}

impl GpioOutput {
    /// Pins start LOW (configured so in hw_init).
    pub fn new(name: &'static str, gpio: i32) -> Self {
        Self {
            name,
            gpio,
            high: false,
        }
    }

    pub fn set(&mut self, high: bool) {
        hw_init::gpio_write(self.gpio, high);
        if high != self.high {
            debug!("{} (GPIO{}) -> {}", self.name, self.gpio, if high { "HIGH" } else { "LOW" });
        }
        self.high = high;
    }

    pub fn off(&mut self) {
        self.set(false);
    }

    pub fn is_high(&self) -> bool {
        self.high
    }
}
