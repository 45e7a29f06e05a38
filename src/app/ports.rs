//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlLoop (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, telemetry, dashboard, display,
//! event sinks) implement these traits. The
//! [`ControlLoop`](super::service::ControlLoop) consumes them via generics,
//! so the domain core never touches hardware or the network directly.
//!
//! Only [`TelemetryPort`] is fallible. Display and dashboard failures are
//! the adapter's business; the loop treats them as fire-and-forget.

use crate::alarm::{Screen, SensorReading};
use crate::error::CommsError;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per cycle.
pub trait SensorPort {
    /// Sample every sensor. Temperature and humidity are NaN when the
    /// DHT11 could not be read.
    fn read(&mut self) -> SensorReading;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: synchronous GPIO levels for the alarm outputs.
pub trait ActuatorPort {
    /// Drive the buzzer output (true = HIGH).
    fn set_buzzer(&mut self, on: bool);

    /// Drive the relay output (true = HIGH).
    fn set_relay(&mut self, on: bool);

    /// Drive every output LOW: safe shutdown.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Telemetry port (driven adapter: domain → MQTT)
// ───────────────────────────────────────────────────────────────

/// Publishes a telemetry payload. Implementations own connection
/// maintenance and may block while reconnecting.
pub trait TelemetryPort {
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), CommsError>;
}

// ───────────────────────────────────────────────────────────────
// Dashboard port (driven adapter: domain → local web dashboard)
// ───────────────────────────────────────────────────────────────

/// Dashboard cards, one per monitored quantity or output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardId {
    Temperature,
    Humidity,
    Gas,
    Buzzer,
    Relay,
}

impl CardId {
    pub const ALL: [CardId; 5] = [
        Self::Temperature,
        Self::Humidity,
        Self::Gas,
        Self::Buzzer,
        Self::Relay,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Temperature => "Temperature",
            Self::Humidity => "Humidity",
            Self::Gas => "Gas PPM",
            Self::Buzzer => "Alarm",
            Self::Relay => "Relay Status",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Humidity => "%",
            Self::Gas => "PPM",
            Self::Buzzer | Self::Relay => "",
        }
    }
}

/// Status-card colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Normal,
    Danger,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Danger => "danger",
        }
    }
}

/// New content for one card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardUpdate {
    Value(f32),
    Count(i32),
    Status {
        label: &'static str,
        severity: Severity,
    },
}

/// Best-effort dashboard. Updates are staged until [`flush`](Self::flush).
pub trait DashboardPort {
    fn update_card(&mut self, card: CardId, update: CardUpdate);

    fn flush(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → OLED)
// ───────────────────────────────────────────────────────────────

/// Draws one full screen. The dwell that follows is the loop's job.
pub trait DisplayPort {
    fn render(&mut self, screen: &Screen);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
