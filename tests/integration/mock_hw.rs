//! Mock adapters for integration tests.
//!
//! Every port is backed by a recorder so tests can assert on the full
//! call history without touching GPIO, I²C or the network.

use embedded_hal::delay::DelayNs;

use smartkitchen::alarm::{Screen, SensorReading};
use smartkitchen::app::events::AppEvent;
use smartkitchen::app::ports::{
    ActuatorPort, CardId, CardUpdate, DashboardPort, DisplayPort, EventSink, SensorPort,
    TelemetryPort,
};
use smartkitchen::error::CommsError;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    Buzzer(bool),
    Relay(bool),
    AllOff,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub reading: SensorReading,
    pub calls: Vec<ActuatorCall>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(temperature_c: f32, humidity_pct: f32, raw_gas: u16) -> Self {
        Self {
            reading: SensorReading {
                temperature_c,
                humidity_pct,
                raw_gas,
            },
            calls: Vec::new(),
        }
    }

    pub fn set_reading(&mut self, temperature_c: f32, humidity_pct: f32, raw_gas: u16) {
        self.reading = SensorReading {
            temperature_c,
            humidity_pct,
            raw_gas,
        };
    }

    pub fn buzzer_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::Buzzer(on) => Some(*on),
                ActuatorCall::AllOff => Some(false),
                ActuatorCall::Relay(_) => None,
            })
            .unwrap_or(false)
    }

    pub fn relay_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::Relay(on) => Some(*on),
                ActuatorCall::AllOff => Some(false),
                ActuatorCall::Buzzer(_) => None,
            })
            .unwrap_or(false)
    }
}

impl SensorPort for MockHardware {
    fn read(&mut self) -> SensorReading {
        self.reading
    }
}

impl ActuatorPort for MockHardware {
    fn set_buzzer(&mut self, on: bool) {
        self.calls.push(ActuatorCall::Buzzer(on));
    }

    fn set_relay(&mut self, on: bool) {
        self.calls.push(ActuatorCall::Relay(on));
    }

    fn all_off(&mut self) {
        self.calls.push(ActuatorCall::AllOff);
    }
}

// ── MockTelemetry ─────────────────────────────────────────────

#[derive(Default)]
pub struct MockTelemetry {
    pub published: Vec<(String, String)>,
    pub offline: bool,
}

impl TelemetryPort for MockTelemetry {
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), CommsError> {
        if self.offline {
            return Err(CommsError::MqttDisconnected);
        }
        self.published.push((topic.to_owned(), payload.to_owned()));
        Ok(())
    }
}

// ── MockDashboard ─────────────────────────────────────────────

#[derive(Default)]
pub struct MockDashboard {
    pub staged: Vec<(CardId, CardUpdate)>,
    pub flushes: usize,
}

#[allow(dead_code)]
impl MockDashboard {
    pub fn last(&self, card: CardId) -> Option<CardUpdate> {
        self.staged
            .iter()
            .rev()
            .find(|(id, _)| *id == card)
            .map(|(_, u)| *u)
    }
}

impl DashboardPort for MockDashboard {
    fn update_card(&mut self, card: CardId, update: CardUpdate) {
        self.staged.push((card, update));
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}

// ── MockDisplay + MockDelay ───────────────────────────────────

#[derive(Default)]
pub struct MockDisplay {
    pub screens: Vec<Screen>,
}

impl DisplayPort for MockDisplay {
    fn render(&mut self, screen: &Screen) {
        self.screens.push(*screen);
    }
}

/// Records every requested dwell instead of sleeping.
#[derive(Default)]
pub struct MockDelay {
    pub dwell_ms: Vec<u32>,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.dwell_ms.push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.dwell_ms.push(ms);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
