//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and both alarm outputs, exposing them through
//! [`SensorPort`] and [`ActuatorPort`]. On non-espidf targets, the
//! underlying drivers use cfg-gated simulation stubs.

use crate::alarm::SensorReading;
use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::output::GpioOutput;
use crate::pins;
use crate::sensors::SensorHub;

/// Concrete adapter that combines all board I/O behind port traits.
pub struct HardwareAdapter {
    sensor_hub: SensorHub,
    buzzer: GpioOutput,
    relay: GpioOutput,
}

impl HardwareAdapter {
    pub fn new(sensor_hub: SensorHub) -> Self {
        Self {
            sensor_hub,
            buzzer: GpioOutput::new("buzzer", pins::BUZZER_GPIO),
            relay: GpioOutput::new("relay", pins::RELAY_GPIO),
        }
    }

    pub fn buzzer_on(&self) -> bool {
        self.buzzer.is_high()
    }

    pub fn relay_on(&self) -> bool {
        self.relay.is_high()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read(&mut self) -> SensorReading {
        self.sensor_hub.read()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn set_buzzer(&mut self, on: bool) {
        self.buzzer.set(on);
    }

    fn set_relay(&mut self, on: bool) {
        self.relay.set(on);
    }

    fn all_off(&mut self) {
        self.buzzer.off();
        self.relay.off();
    }
}
