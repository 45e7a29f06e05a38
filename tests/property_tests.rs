//! Property tests for the alarm mapping and the telemetry encoding.
//!
//! Runs on host (x86_64) only: proptest is not available for ESP32 targets.
//! On ESP32, these tests are compiled out.

#![cfg(not(target_os = "espidf"))]

use proptest::prelude::*;
use smartkitchen::alarm::{SensorReading, display_plan, evaluate, map_gas};
use smartkitchen::config::Thresholds;
use smartkitchen::sensors::dht11::decode_frame;
use smartkitchen::telemetry::TelemetryPayload;

fn reading(temperature_c: f32, humidity_pct: f32, raw_gas: u16) -> SensorReading {
    SensorReading {
        temperature_c,
        humidity_pct,
        raw_gas,
    }
}

proptest! {
    /// The alarm is exactly the disjunction of the three threshold checks.
    #[test]
    fn alarm_is_any_threshold_breach(
        t in -40.0f32..80.0,
        h in 0.0f32..100.0,
        g in 0u16..=4095,
    ) {
        let th = Thresholds::default();
        let d = evaluate(&reading(t, h, g), &th).unwrap();
        let expected = t > th.temp_threshold_c
            || h < th.hum_threshold_pct
            || map_gas(g, &th) > th.gas_threshold_ppm;
        prop_assert_eq!(d.alarm_active(), expected);
    }

    /// Mapping is monotone and stays inside the output range.
    #[test]
    fn gas_mapping_is_monotone_and_bounded(a in any::<u16>(), b in any::<u16>()) {
        let th = Thresholds::default();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (m_lo, m_hi) = (map_gas(lo, &th), map_gas(hi, &th));
        prop_assert!(m_lo <= m_hi);
        prop_assert!((0.0..=f32::from(th.gas_range_max)).contains(&m_hi));
        prop_assert_eq!(m_lo.fract(), 0.0);
    }

    /// Buzzer status, relay status and the alarm always agree on the wire.
    #[test]
    fn payload_statuses_mirror_alarm(
        t in -40.0f32..80.0,
        h in 0.0f32..100.0,
        g in 0u16..=4095,
    ) {
        let d = evaluate(&reading(t, h, g), &Thresholds::default()).unwrap();
        let p = TelemetryPayload::from_decision(&d);
        prop_assert_eq!(p.buzzer_status, p.relay_status);
        prop_assert_eq!(p.buzzer_status == 1, d.alarm_active());

        let json = p.to_json().unwrap();
        let prefix = r#"{"temperature":"#;
        prop_assert!(json.starts_with(prefix));
    }

    /// An alarm cycle shows only the danger screen; a quiet one shows three.
    #[test]
    fn display_plan_length_follows_alarm(
        t in -40.0f32..80.0,
        h in 0.0f32..100.0,
        g in 0u16..=4095,
    ) {
        let d = evaluate(&reading(t, h, g), &Thresholds::default()).unwrap();
        let expected = if d.alarm_active() { 1 } else { 3 };
        prop_assert_eq!(display_plan(&d).len(), expected);
    }

    /// Any NaN in temperature or humidity is a fault, whatever the gas reads.
    #[test]
    fn nan_climate_is_always_a_fault(h in 0.0f32..100.0, g in any::<u16>(), which in 0u8..3) {
        let r = match which {
            0 => reading(f32::NAN, h, g),
            1 => reading(h, f32::NAN, g),
            _ => reading(f32::NAN, f32::NAN, g),
        };
        prop_assert!(evaluate(&r, &Thresholds::default()).is_err());
    }

    /// The DHT11 decoder never panics, and only accepts frames whose
    /// checksum matches.
    #[test]
    fn dht_frame_decoder_never_panics(bytes in any::<[u8; 5]>()) {
        let sum = bytes[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        prop_assert_eq!(decode_frame(bytes).is_ok(), sum == bytes[4]);
    }
}
