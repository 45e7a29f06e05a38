//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::CycleCompleted(r) => {
                let d = &r.decision;
                info!(
                    "CYCLE #{} | T={:.1}\u{00b0}C H={:.1}% gas={:.0}ppm | alarm={} causes=0b{:03b} | mqtt={}",
                    r.cycle,
                    d.temperature_c,
                    d.humidity_pct,
                    d.gas_ppm,
                    if d.alarm_active() { "ON" } else { "off" },
                    d.causes.bits(),
                    if r.telemetry_sent { "sent" } else { "dropped" },
                );
            }
            AppEvent::SensorFault { consecutive } => {
                warn!("FAULT | DHT11 unreadable ({} in a row)", consecutive);
            }
            AppEvent::AlarmRaised(causes) => {
                for cause in causes.iter() {
                    warn!("ALARM | {}", cause);
                }
            }
            AppEvent::AlarmCleared => {
                info!("ALARM | cleared");
            }
            AppEvent::FailsafeEngaged { consecutive } => {
                warn!("FAILSAFE | outputs forced LOW after {} faults", consecutive);
            }
            AppEvent::TelemetryDropped(e) => {
                warn!("TELEM | dropped: {}", e);
            }
            AppEvent::Started => {
                info!("START | control loop running");
            }
        }
    }
}
