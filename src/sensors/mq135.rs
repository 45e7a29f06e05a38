//! MQ-135 air-quality sensor.
//!
//! The analog output is sampled raw through ADC1 (12-bit, 0 – 4095). The
//! mapping to ppm lives in [`alarm::map_gas`](crate::alarm::map_gas) so
//! it stays a pure function of the raw count.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the pin's ADC1 channel via the oneshot API
//! (initialised by hw_init).
//! On host/test: reads from a static `AtomicU16` for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

use crate::drivers::hw_init::{self, HwInitError};

#[cfg(not(target_os = "espidf"))]
static SIM_GAS_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_gas_adc(raw: u16) {
    SIM_GAS_ADC.store(raw, Ordering::Relaxed);
}

/// Full-scale 12-bit reading.
pub const ADC_MAX: u16 = 4095;

pub struct GasSensor {
    channel: u32,
}

impl GasSensor {
    pub fn new(adc_gpio: i32) -> Result<Self, HwInitError> {
        Ok(Self {
            channel: hw_init::adc1_channel(adc_gpio)?,
        })
    }

    pub fn channel(&self) -> u32 {
        self.channel
    }

    /// Raw ADC count, clamped to the 12-bit range.
    pub fn read_raw(&mut self) -> u16 {
        self.read_adc().min(ADC_MAX)
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(self.channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_GAS_ADC.load(Ordering::Relaxed)
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn channel_follows_the_wired_pin() {
        assert_eq!(GasSensor::new(35).unwrap().channel(), 7);
        assert!(GasSensor::new(25).is_err());
    }
}
