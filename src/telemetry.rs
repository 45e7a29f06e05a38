//! Telemetry payload and its wire encoding.
//!
//! The JSON shape is fixed by the monitoring backend:
//!
//! ```text
//! {"temperature":25,"humidity":60,"gasPPM":0,"buzzerStatus":0,"relayStatus":0}
//! ```
//!
//! Whole numbers are written without a fractional part; anything else is
//! rounded to two decimals.

use serde::{Deserialize, Serialize, Serializer};

use crate::alarm::Decision;
use crate::error::CommsError;

/// One telemetry record, built once per completed cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryPayload {
    #[serde(serialize_with = "compact_number")]
    pub temperature: f32,
    #[serde(serialize_with = "compact_number")]
    pub humidity: f32,
    #[serde(rename = "gasPPM", serialize_with = "compact_number")]
    pub gas_ppm: f32,
    #[serde(rename = "buzzerStatus")]
    pub buzzer_status: u8,
    #[serde(rename = "relayStatus")]
    pub relay_status: u8,
}

impl TelemetryPayload {
    /// Buzzer and relay both mirror the alarm.
    pub fn from_decision(decision: &Decision) -> Self {
        let status = u8::from(decision.alarm_active());
        Self {
            temperature: decision.temperature_c,
            humidity: decision.humidity_pct,
            gas_ppm: decision.gas_ppm,
            buzzer_status: status,
            relay_status: status,
        }
    }

    pub fn to_json(&self) -> Result<String, CommsError> {
        serde_json::to_string(self).map_err(|_| CommsError::PayloadEncodeFailed)
    }
}

pub(crate) fn compact_number<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
    let v = f64::from(*value);
    if !v.is_finite() {
        return serializer.serialize_none();
    }
    let rounded = (v * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 && rounded.abs() < 1e15 {
        serializer.serialize_i64(rounded as i64)
    } else {
        serializer.serialize_f64(rounded)
    }
}
