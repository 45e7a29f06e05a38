//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns both sensor drivers and produces one [`SensorReading`]
//! per cycle.

pub mod dht11;
pub mod mq135;

use log::warn;

use crate::alarm::SensorReading;
use dht11::ClimateSensor;
use mq135::GasSensor;

/// Aggregates the DHT11 and MQ-135 into a single reading.
pub struct SensorHub {
    pub climate: ClimateSensor,
    pub gas: GasSensor,
}

impl SensorHub {
    /// Construct a new hub from pre-built drivers (built in main where
    /// peripheral ownership is established).
    pub fn new(climate: ClimateSensor, gas: GasSensor) -> Self {
        Self { climate, gas }
    }

    /// Sample both sensors.
    ///
    /// A DHT11 failure is logged here and reported as NaN temperature and
    /// humidity; the control loop decides what a fault means.
    pub fn read(&mut self) -> SensorReading {
        let (temperature_c, humidity_pct) = match self.climate.read() {
            Ok(c) => (c.temperature_c, c.humidity_pct),
            Err(e) => {
                warn!("DHT11 read failed: {}", e);
                (f32::NAN, f32::NAN)
            }
        };
        let raw_gas = self.gas.read_raw();

        SensorReading {
            temperature_c,
            humidity_pct,
            raw_gas,
        }
    }
}
