//! Outbound application events.
//!
//! The [`ControlLoop`](super::service::ControlLoop) emits these through
//! the [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them: log to serial, count them, etc.

use crate::alarm::{AlarmCauses, Decision};
use crate::error::CommsError;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The loop has been started.
    Started,

    /// A cycle ran to completion.
    CycleCompleted(CycleReport),

    /// Temperature or humidity was unreadable; the cycle was skipped.
    SensorFault { consecutive: u32 },

    /// The alarm went from quiet to active.
    AlarmRaised(AlarmCauses),

    /// The alarm went from active to quiet.
    AlarmCleared,

    /// Consecutive faults reached the configured limit; outputs forced off.
    FailsafeEngaged { consecutive: u32 },

    /// The telemetry publish failed; the cycle carried on without it.
    TelemetryDropped(CommsError),
}

/// Summary of one completed cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    /// 1-based count of cycles run since start, faulted ones included.
    pub cycle: u64,
    pub decision: Decision,
    pub telemetry_sent: bool,
}
