//! Integration tests for the sensor → decision → outputs pipeline.
//!
//! Each test drives [`ControlLoop::run_cycle`] against the recording
//! mocks and checks what every port saw during the cycle.

use smartkitchen::alarm::{AlarmCause, Screen};
use smartkitchen::app::events::AppEvent;
use smartkitchen::app::ports::{CardId, CardUpdate, Severity};
use smartkitchen::app::service::{ControlLoop, CycleOutcome};
use smartkitchen::config::SystemConfig;
use smartkitchen::error::CommsError;

use crate::mock_hw::{
    ActuatorCall, MockDashboard, MockDelay, MockDisplay, MockHardware, MockTelemetry,
    RecordingSink,
};

struct Rig {
    app: ControlLoop,
    hw: MockHardware,
    telemetry: MockTelemetry,
    dashboard: MockDashboard,
    display: MockDisplay,
    delay: MockDelay,
    sink: RecordingSink,
}

impl Rig {
    fn new(temperature_c: f32, humidity_pct: f32, raw_gas: u16) -> Self {
        Self::with_config(SystemConfig::default(), temperature_c, humidity_pct, raw_gas)
    }

    fn with_config(config: SystemConfig, temperature_c: f32, humidity_pct: f32, raw_gas: u16) -> Self {
        Self {
            app: ControlLoop::new(config),
            hw: MockHardware::new(temperature_c, humidity_pct, raw_gas),
            telemetry: MockTelemetry::default(),
            dashboard: MockDashboard::default(),
            display: MockDisplay::default(),
            delay: MockDelay::default(),
            sink: RecordingSink::default(),
        }
    }

    fn cycle(&mut self) -> CycleOutcome {
        self.app.run_cycle(
            &mut self.hw,
            &mut self.telemetry,
            &mut self.dashboard,
            &mut self.display,
            &mut self.delay,
            &mut self.sink,
        )
    }

    /// Forget everything recorded so far.
    fn clear(&mut self) {
        self.hw.calls.clear();
        self.telemetry.published.clear();
        self.dashboard.staged.clear();
        self.dashboard.flushes = 0;
        self.display.screens.clear();
        self.delay.dwell_ms.clear();
        self.sink.events.clear();
    }
}

// ── Start-up ──────────────────────────────────────────────────

#[test]
fn start_drives_outputs_low_and_announces() {
    let mut rig = Rig::new(25.0, 60.0, 0);
    rig.app.start(&mut rig.hw, &mut rig.sink);

    assert_eq!(rig.hw.calls, vec![ActuatorCall::AllOff]);
    assert!(matches!(rig.sink.events.as_slice(), [AppEvent::Started]));
}

// ── Reference scenarios ───────────────────────────────────────

#[test]
fn quiet_kitchen_publishes_and_rotates_three_screens() {
    let mut rig = Rig::new(25.0, 60.0, 0);
    let outcome = rig.cycle();

    let CycleOutcome::Completed(report) = outcome else {
        panic!("expected a completed cycle, got {:?}", outcome);
    };
    assert!(!report.decision.alarm_active());
    assert_eq!(report.decision.gas_ppm, 0.0);
    assert!(report.telemetry_sent);

    assert_eq!(
        rig.telemetry.published,
        vec![(
            "v1/devices/me/telemetry".to_owned(),
            r#"{"temperature":25,"humidity":60,"gasPPM":0,"buzzerStatus":0,"relayStatus":0}"#
                .to_owned()
        )]
    );
    assert_eq!(
        rig.hw.calls,
        vec![ActuatorCall::Buzzer(false), ActuatorCall::Relay(false)]
    );
    assert_eq!(
        rig.display.screens,
        vec![
            Screen::Temperature(25.0),
            Screen::Humidity(60.0),
            Screen::Gas(0.0)
        ]
    );
    assert_eq!(rig.delay.dwell_ms, vec![2000, 2000, 2000]);
}

#[test]
fn hot_kitchen_trips_buzzer_and_relay() {
    let mut rig = Rig::new(35.0, 60.0, 0);
    rig.cycle();

    assert!(rig.hw.buzzer_on());
    assert!(rig.hw.relay_on());
    assert_eq!(
        rig.dashboard.last(CardId::Buzzer),
        Some(CardUpdate::Status {
            label: "Active",
            severity: Severity::Danger
        })
    );
    assert_eq!(
        rig.dashboard.last(CardId::Relay),
        Some(CardUpdate::Status {
            label: "Triggered",
            severity: Severity::Danger
        })
    );
    assert_eq!(rig.display.screens, vec![Screen::Danger]);
    assert_eq!(rig.delay.dwell_ms, vec![2000]);

    let (_, payload) = &rig.telemetry.published[0];
    assert!(payload.contains(r#""buzzerStatus":1,"relayStatus":1"#));
    assert!(rig.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::AlarmRaised(c) if c.contains(AlarmCause::OverTemperature)
    )));
}

#[test]
fn dry_air_trips_alarm() {
    let mut rig = Rig::new(25.0, 40.0, 0);
    let CycleOutcome::Completed(report) = rig.cycle() else {
        panic!("expected a completed cycle");
    };
    assert!(report.decision.causes.contains(AlarmCause::LowHumidity));
    assert!(!report.decision.causes.contains(AlarmCause::OverTemperature));
    assert!(rig.hw.buzzer_on() && rig.hw.relay_on());
}

#[test]
fn saturated_gas_maps_to_full_range_and_trips_alarm() {
    let mut rig = Rig::new(25.0, 60.0, 4095);
    let CycleOutcome::Completed(report) = rig.cycle() else {
        panic!("expected a completed cycle");
    };
    assert_eq!(report.decision.gas_ppm, 1000.0);
    assert!(report.decision.causes.contains(AlarmCause::GasHigh));
    assert_eq!(rig.dashboard.last(CardId::Gas), Some(CardUpdate::Count(1000)));
    assert!(rig.telemetry.published[0].1.contains(r#""gasPPM":1000"#));
}

#[test]
fn unreadable_dht_skips_every_output_but_the_fault_screen() {
    let mut rig = Rig::new(f32::NAN, 60.0, 0);
    let outcome = rig.cycle();

    assert_eq!(outcome, CycleOutcome::SensorFault { consecutive: 1 });
    assert!(rig.telemetry.published.is_empty());
    assert!(rig.hw.calls.is_empty());
    assert!(rig.dashboard.staged.is_empty());
    assert_eq!(rig.dashboard.flushes, 0);
    assert_eq!(rig.display.screens, vec![Screen::Fault]);
    assert_eq!(rig.delay.dwell_ms, vec![2000]);
}

// ── Boundaries ────────────────────────────────────────────────

#[test]
fn gas_threshold_is_strict() {
    let mut rig = Rig::new(25.0, 60.0, 3075);
    rig.cycle();
    assert!(!rig.hw.buzzer_on(), "750 ppm is not over the threshold");

    rig.hw.set_reading(25.0, 60.0, 3076);
    rig.cycle();
    assert!(rig.hw.buzzer_on(), "751 ppm is over the threshold");
}

#[test]
fn thresholds_themselves_do_not_alarm() {
    let mut rig = Rig::new(32.0, 50.0, 0);
    let CycleOutcome::Completed(report) = rig.cycle() else {
        panic!("expected a completed cycle");
    };
    assert!(!report.decision.alarm_active());
}

// ── Faults across cycles ──────────────────────────────────────

#[test]
fn fault_keeps_previous_output_levels() {
    let mut rig = Rig::new(35.0, 60.0, 0);
    rig.cycle();
    assert!(rig.hw.relay_on());

    rig.clear();
    rig.hw.set_reading(f32::NAN, f32::NAN, 0);
    rig.cycle();
    rig.cycle();

    assert!(rig.hw.calls.is_empty(), "no actuator writes during faults");
    assert_eq!(rig.app.consecutive_faults(), 2);
    assert_eq!(rig.app.cycle_count(), 3);
}

#[test]
fn recovery_resets_fault_streak_and_clears_alarm() {
    let mut rig = Rig::new(35.0, 60.0, 0);
    rig.cycle();
    rig.hw.set_reading(f32::NAN, 60.0, 0);
    rig.cycle();

    rig.clear();
    rig.hw.set_reading(25.0, 60.0, 0);
    rig.cycle();

    assert_eq!(rig.app.consecutive_faults(), 0);
    assert!(!rig.hw.buzzer_on() && !rig.hw.relay_on());
    assert!(rig.sink.events.iter().any(|e| matches!(e, AppEvent::AlarmCleared)));
}

#[test]
fn failsafe_forces_outputs_off_once() {
    let config = SystemConfig {
        failsafe_after_faults: Some(3),
        ..SystemConfig::default()
    };
    let mut rig = Rig::with_config(config, 35.0, 60.0, 0);
    rig.cycle();
    assert!(rig.hw.relay_on());

    rig.clear();
    rig.hw.set_reading(f32::NAN, 60.0, 0);
    for _ in 0..2 {
        rig.cycle();
    }
    assert!(rig.hw.calls.is_empty());

    rig.cycle();
    assert_eq!(rig.hw.calls, vec![ActuatorCall::AllOff]);
    assert!(rig.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::FailsafeEngaged { consecutive: 3 }
    )));

    rig.cycle();
    assert_eq!(rig.hw.calls.len(), 1, "failsafe is not repeated");
}

#[test]
fn without_failsafe_outputs_stay_latched() {
    let mut rig = Rig::new(35.0, 60.0, 0);
    rig.cycle();
    rig.hw.set_reading(f32::NAN, 60.0, 0);
    for _ in 0..20 {
        rig.cycle();
    }
    assert!(rig.hw.relay_on());
    assert!(!rig.sink.events.iter().any(|e| matches!(e, AppEvent::FailsafeEngaged { .. })));
}

// ── Telemetry isolation ───────────────────────────────────────

#[test]
fn broker_outage_does_not_block_other_outputs() {
    let mut rig = Rig::new(35.0, 60.0, 0);
    rig.telemetry.offline = true;

    let CycleOutcome::Completed(report) = rig.cycle() else {
        panic!("expected a completed cycle");
    };
    assert!(!report.telemetry_sent);
    assert!(rig.hw.buzzer_on() && rig.hw.relay_on());
    assert_eq!(rig.dashboard.flushes, 1);
    assert_eq!(rig.display.screens, vec![Screen::Danger]);
    assert!(rig.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::TelemetryDropped(CommsError::MqttDisconnected)
    )));
}

#[test]
fn dashboard_shows_quiet_labels() {
    let mut rig = Rig::new(25.0, 60.0, 100);
    rig.cycle();

    assert_eq!(rig.dashboard.last(CardId::Temperature), Some(CardUpdate::Value(25.0)));
    assert_eq!(rig.dashboard.last(CardId::Humidity), Some(CardUpdate::Value(60.0)));
    // 100 * 1000 / 4095 = 24.4 → 24
    assert_eq!(rig.dashboard.last(CardId::Gas), Some(CardUpdate::Count(24)));
    assert_eq!(
        rig.dashboard.last(CardId::Buzzer),
        Some(CardUpdate::Status {
            label: "Inactive",
            severity: Severity::Normal
        })
    );
    assert_eq!(
        rig.dashboard.last(CardId::Relay),
        Some(CardUpdate::Status {
            label: "Normal",
            severity: Severity::Normal
        })
    );
    assert_eq!(rig.dashboard.flushes, 1);
}

#[test]
fn custom_dwell_is_honoured() {
    let config = SystemConfig {
        screen_dwell_ms: 500,
        ..SystemConfig::default()
    };
    let mut rig = Rig::with_config(config, 25.0, 60.0, 0);
    rig.cycle();
    assert_eq!(rig.delay.dwell_ms, vec![500, 500, 500]);
}
