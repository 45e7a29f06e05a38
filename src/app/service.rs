//! Control loop: the hexagonal core.
//!
//! [`ControlLoop`] runs one sensor-to-actuator cycle per call. All I/O
//! flows through port traits injected at call sites, making the loop
//! testable with mock adapters.
//!
//! ```text
//!   SensorPort ──▶ ┌────────────────────────┐ ──▶ ActuatorPort
//!                  │      ControlLoop       │ ──▶ TelemetryPort
//!                  │  map · evaluate · plan │ ──▶ DashboardPort
//!                  └────────────────────────┘ ──▶ DisplayPort (+ DelayNs)
//! ```
//!
//! A cycle either completes (outputs, telemetry, dashboard, display all
//! updated) or aborts on a sensor fault, in which case only the fault
//! screen is drawn and the outputs keep their previous level.

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::alarm::{self, AlarmCauses, Decision, Screen};
use crate::config::SystemConfig;
use crate::error::SensorError;
use crate::telemetry::TelemetryPayload;

use super::events::{AppEvent, CycleReport};
use super::ports::{
    ActuatorPort, CardId, CardUpdate, DashboardPort, DisplayPort, EventSink, SensorPort, Severity,
    TelemetryPort,
};

/// Result of one [`ControlLoop::run_cycle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    Completed(CycleReport),
    SensorFault { consecutive: u32 },
}

/// The decision loop. Holds no sensor history; the counters below only
/// feed logging and the optional failsafe.
pub struct ControlLoop {
    config: SystemConfig,
    cycle_count: u64,
    consecutive_faults: u32,
    failsafe_engaged: bool,
    last_causes: AlarmCauses,
}

impl ControlLoop {
    pub fn new(config: SystemConfig) -> Self {
        Self {
            config,
            cycle_count: 0,
            consecutive_faults: 0,
            failsafe_engaged: false,
            last_causes: AlarmCauses::NONE,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive both outputs LOW and announce the start.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.all_off();
        sink.emit(&AppEvent::Started);
        info!(
            "ControlLoop started (T>{}°C | H<{}% | gas>{}ppm)",
            self.config.thresholds.temp_threshold_c,
            self.config.thresholds.hum_threshold_pct,
            self.config.thresholds.gas_threshold_ppm,
        );
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one full cycle: read → map → evaluate → emit.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`], mirroring the single board adapter. The display
    /// dwell is spent inside this call, so a quiet cycle takes three dwell
    /// periods and an alarm cycle one.
    pub fn run_cycle(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        telemetry: &mut impl TelemetryPort,
        dashboard: &mut impl DashboardPort,
        display: &mut impl DisplayPort,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> CycleOutcome {
        self.cycle_count += 1;

        // 1. Acquire
        let reading = hw.read();

        // 2 + 3. Derive and evaluate
        let decision = match alarm::evaluate(&reading, &self.config.thresholds) {
            Ok(d) => d,
            Err(e) => return self.handle_fault(e, hw, display, delay, sink),
        };

        if self.consecutive_faults > 0 {
            info!(
                "Sensor recovered after {} faulted cycle(s)",
                self.consecutive_faults
            );
        }
        self.consecutive_faults = 0;
        self.failsafe_engaged = false;

        self.track_alarm(&decision, sink);

        // 4. Emit: actuators first; each sink is independent.
        let active = decision.alarm_active();
        hw.set_buzzer(active);
        hw.set_relay(active);

        let telemetry_sent = self.publish_telemetry(&decision, telemetry, sink);
        update_dashboard(&decision, dashboard);

        for screen in &alarm::display_plan(&decision) {
            display.render(screen);
            delay.delay_ms(self.config.screen_dwell_ms);
        }

        let report = CycleReport {
            cycle: self.cycle_count,
            decision,
            telemetry_sent,
        };
        sink.emit(&AppEvent::CycleCompleted(report));
        CycleOutcome::Completed(report)
    }

    // ── Queries ───────────────────────────────────────────────

    /// Cycles run since start, faulted ones included.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// Faulted cycles in a row; reset by the next valid reading.
    pub fn consecutive_faults(&self) -> u32 {
        self.consecutive_faults
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn handle_fault(
        &mut self,
        error: SensorError,
        hw: &mut impl ActuatorPort,
        display: &mut impl DisplayPort,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> CycleOutcome {
        self.consecutive_faults = self.consecutive_faults.saturating_add(1);
        let consecutive = self.consecutive_faults;
        warn!("DHT sensor error: {} (consecutive={})", error, consecutive);
        sink.emit(&AppEvent::SensorFault { consecutive });

        if let Some(limit) = self.config.failsafe_after_faults {
            if consecutive >= limit && !self.failsafe_engaged {
                warn!("Failsafe: {} consecutive faults, forcing outputs off", consecutive);
                hw.all_off();
                self.failsafe_engaged = true;
                self.last_causes = AlarmCauses::NONE;
                sink.emit(&AppEvent::FailsafeEngaged { consecutive });
            }
        }

        display.render(&Screen::Fault);
        delay.delay_ms(self.config.fault_settle_ms);
        CycleOutcome::SensorFault { consecutive }
    }

    fn track_alarm(&mut self, decision: &Decision, sink: &mut impl EventSink) {
        let causes = decision.causes;
        if causes.is_active() && !self.last_causes.is_active() {
            for cause in causes.iter() {
                warn!("ALARM: {}", cause);
            }
            sink.emit(&AppEvent::AlarmRaised(causes));
        } else if !causes.is_active() && self.last_causes.is_active() {
            info!("ALARM cleared");
            sink.emit(&AppEvent::AlarmCleared);
        }
        self.last_causes = causes;
    }

    fn publish_telemetry(
        &self,
        decision: &Decision,
        telemetry: &mut impl TelemetryPort,
        sink: &mut impl EventSink,
    ) -> bool {
        let result = TelemetryPayload::from_decision(decision)
            .to_json()
            .and_then(|json| {
                debug!("Telemetry: {}", json);
                telemetry.publish(self.config.telemetry_topic.as_str(), &json)
            });
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("Telemetry dropped: {}", e);
                sink.emit(&AppEvent::TelemetryDropped(e));
                false
            }
        }
    }
}

fn update_dashboard(decision: &Decision, dashboard: &mut impl DashboardPort) {
    let active = decision.alarm_active();
    let (buzzer_label, relay_label, severity) = if active {
        ("Active", "Triggered", Severity::Danger)
    } else {
        ("Inactive", "Normal", Severity::Normal)
    };

    dashboard.update_card(CardId::Temperature, CardUpdate::Value(decision.temperature_c));
    dashboard.update_card(CardId::Humidity, CardUpdate::Value(decision.humidity_pct));
    dashboard.update_card(CardId::Gas, CardUpdate::Count(decision.gas_ppm as i32));
    dashboard.update_card(
        CardId::Buzzer,
        CardUpdate::Status {
            label: buzzer_label,
            severity,
        },
    );
    dashboard.update_card(
        CardId::Relay,
        CardUpdate::Status {
            label: relay_label,
            severity,
        },
    );
    dashboard.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::SensorReading;
    use crate::error::CommsError;

    struct Board {
        reading: SensorReading,
        buzzer: Option<bool>,
    }

    impl SensorPort for Board {
        fn read(&mut self) -> SensorReading {
            self.reading
        }
    }

    impl ActuatorPort for Board {
        fn set_buzzer(&mut self, on: bool) {
            self.buzzer = Some(on);
        }
        fn set_relay(&mut self, _on: bool) {}
        fn all_off(&mut self) {
            self.buzzer = Some(false);
        }
    }

    struct Offline;
    impl TelemetryPort for Offline {
        fn publish(&mut self, _topic: &str, _payload: &str) -> Result<(), CommsError> {
            Err(CommsError::MqttDisconnected)
        }
    }

    struct Nop;
    impl DashboardPort for Nop {
        fn update_card(&mut self, _card: CardId, _update: CardUpdate) {}
        fn flush(&mut self) {}
    }
    impl DisplayPort for Nop {
        fn render(&mut self, _screen: &Screen) {}
    }
    impl DelayNs for Nop {
        fn delay_ns(&mut self, _ns: u32) {}
    }
    impl EventSink for Nop {
        fn emit(&mut self, _event: &AppEvent) {}
    }

    #[test]
    fn offline_telemetry_still_drives_outputs() {
        let mut board = Board {
            reading: SensorReading {
                temperature_c: 35.0,
                humidity_pct: 60.0,
                raw_gas: 0,
            },
            buzzer: None,
        };
        let mut cl = ControlLoop::new(SystemConfig::default());
        let outcome = cl.run_cycle(&mut board, &mut Offline, &mut Nop, &mut Nop, &mut Nop, &mut Nop);
        match outcome {
            CycleOutcome::Completed(report) => assert!(!report.telemetry_sent),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(board.buzzer, Some(true));
    }
}
