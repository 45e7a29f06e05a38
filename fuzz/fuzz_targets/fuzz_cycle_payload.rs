//! Fuzz target: reading → decision → telemetry JSON
//!
//! Any finite reading must evaluate, and its payload must be valid JSON
//! whose two status fields agree with the alarm.
//!
//! cargo fuzz run fuzz_cycle_payload

#![no_main]

use libfuzzer_sys::fuzz_target;
use smartkitchen::alarm::{SensorReading, evaluate};
use smartkitchen::config::Thresholds;
use smartkitchen::telemetry::TelemetryPayload;

fuzz_target!(|input: (f32, f32, u16)| {
    let (temperature_c, humidity_pct, raw_gas) = input;
    let reading = SensorReading { temperature_c, humidity_pct, raw_gas };

    let Ok(decision) = evaluate(&reading, &Thresholds::default()) else {
        assert!(reading.is_fault());
        return;
    };

    let json = TelemetryPayload::from_decision(&decision)
        .to_json()
        .expect("payload encodes");
    let v: serde_json::Value = serde_json::from_str(&json).expect("payload is valid JSON");
    let status = u64::from(decision.alarm_active());
    assert_eq!(v["buzzerStatus"], status);
    assert_eq!(v["relayStatus"], status);
});
