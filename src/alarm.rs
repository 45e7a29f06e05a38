//! Alarm evaluation.
//!
//! Pure functions from one [`SensorReading`] to one [`Decision`]: the gas
//! ADC value is mapped to ppm, each threshold is checked, and the breached
//! conditions are collected into an [`AlarmCauses`] bitmask. The alarm is
//! active when any bit is set. Nothing here carries state between cycles.
//!
//! ```text
//!   SensorReading ──▶ map_gas ──▶ evaluate ──▶ Decision ──▶ display_plan
//! ```

use core::fmt;

use crate::config::Thresholds;
use crate::error::SensorError;

/// One sensor sample as handed over by the [`SensorPort`](crate::app::ports::SensorPort).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// °C, NaN when the DHT11 could not be read.
    pub temperature_c: f32,
    /// % relative, NaN when the DHT11 could not be read.
    pub humidity_pct: f32,
    /// Raw MQ-135 ADC count.
    pub raw_gas: u16,
}

impl SensorReading {
    /// True when temperature or humidity is undefined.
    pub fn is_fault(&self) -> bool {
        self.temperature_c.is_nan() || self.humidity_pct.is_nan()
    }
}

/// Threshold conditions that can trip the alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AlarmCause {
    OverTemperature = 0b0000_0001,
    LowHumidity = 0b0000_0010,
    GasHigh = 0b0000_0100,
}

impl AlarmCause {
    pub const ALL: [AlarmCause; 3] = [Self::OverTemperature, Self::LowHumidity, Self::GasHigh];

    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for AlarmCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OverTemperature => write!(f, "over temperature"),
            Self::LowHumidity => write!(f, "low humidity"),
            Self::GasHigh => write!(f, "gas high"),
        }
    }
}

/// Bitmask of breached conditions for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlarmCauses(u8);

impl AlarmCauses {
    pub const NONE: Self = Self(0);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, cause: AlarmCause) -> bool {
        self.0 & cause.mask() != 0
    }

    pub fn is_active(self) -> bool {
        self.0 != 0
    }

    fn set_if(&mut self, cause: AlarmCause, condition: bool) {
        if condition {
            self.0 |= cause.mask();
        }
    }

    /// Iterate over the causes present in this mask.
    pub fn iter(self) -> impl Iterator<Item = AlarmCause> {
        AlarmCause::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

/// Everything the loop derives from one valid reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub gas_ppm: f32,
    pub causes: AlarmCauses,
}

impl Decision {
    /// Drives buzzer, relay, telemetry status and the danger screen.
    pub fn alarm_active(&self) -> bool {
        self.causes.is_active()
    }
}

/// Linear map of the raw gas count onto `[0, gas_range_max]` ppm.
///
/// Integer arithmetic with truncation, matching the Arduino `map()` the
/// legacy firmware used. Counts above the domain clamp to the range end.
pub fn map_gas(raw: u16, thresholds: &Thresholds) -> f32 {
    let domain = u32::from(thresholds.gas_domain_max.max(1));
    let range = u32::from(thresholds.gas_range_max);
    let clamped = u32::from(raw).min(domain);
    (clamped * range / domain) as f32
}

/// Evaluate the thresholds for one reading.
///
/// Returns [`SensorError::Fault`] when temperature or humidity is NaN;
/// the caller must then skip every actuator, telemetry, and dashboard
/// update for the cycle.
pub fn evaluate(reading: &SensorReading, thresholds: &Thresholds) -> Result<Decision, SensorError> {
    if reading.is_fault() {
        return Err(SensorError::Fault);
    }

    let gas_ppm = map_gas(reading.raw_gas, thresholds);

    let mut causes = AlarmCauses::NONE;
    causes.set_if(
        AlarmCause::OverTemperature,
        reading.temperature_c > thresholds.temp_threshold_c,
    );
    causes.set_if(
        AlarmCause::LowHumidity,
        reading.humidity_pct < thresholds.hum_threshold_pct,
    );
    causes.set_if(AlarmCause::GasHigh, gas_ppm > thresholds.gas_threshold_ppm);

    Ok(Decision {
        temperature_c: reading.temperature_c,
        humidity_pct: reading.humidity_pct,
        gas_ppm,
        causes,
    })
}

/// What the OLED shows. Values are carried for the sensor screens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen {
    Fault,
    Danger,
    Temperature(f32),
    Humidity(f32),
    Gas(f32),
}

/// Ordered screens for one completed cycle, each held for one dwell.
pub fn display_plan(decision: &Decision) -> heapless::Vec<Screen, 3> {
    let mut plan = heapless::Vec::new();
    if decision.alarm_active() {
        let _ = plan.push(Screen::Danger);
    } else {
        let _ = plan.push(Screen::Temperature(decision.temperature_c));
        let _ = plan.push(Screen::Humidity(decision.humidity_pct));
        let _ = plan.push(Screen::Gas(decision.gas_ppm));
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(t: f32, h: f32, g: u16) -> SensorReading {
        SensorReading {
            temperature_c: t,
            humidity_pct: h,
            raw_gas: g,
        }
    }

    #[test]
    fn map_gas_endpoints() {
        let th = Thresholds::default();
        assert_eq!(map_gas(0, &th), 0.0);
        assert_eq!(map_gas(4095, &th), 1000.0);
    }

    #[test]
    fn map_gas_truncates_like_legacy() {
        let th = Thresholds::default();
        // 2048 * 1000 / 4095 = 500.12…
        assert_eq!(map_gas(2048, &th), 500.0);
        // 3071 * 1000 / 4095 = 749.93…
        assert_eq!(map_gas(3071, &th), 749.0);
    }

    #[test]
    fn map_gas_clamps_above_domain() {
        let th = Thresholds::default();
        assert_eq!(map_gas(u16::MAX, &th), 1000.0);
    }

    #[test]
    fn gas_threshold_boundary() {
        let th = Thresholds::default();
        // 3075 → 750 ppm (not above), 3076 → 751 ppm.
        let at = evaluate(&reading(25.0, 60.0, 3075), &th).unwrap();
        assert_eq!(at.gas_ppm, 750.0);
        assert!(!at.alarm_active());
        let over = evaluate(&reading(25.0, 60.0, 3076), &th).unwrap();
        assert!(over.causes.contains(AlarmCause::GasHigh));
    }

    #[test]
    fn thresholds_are_strict() {
        let th = Thresholds::default();
        assert!(!evaluate(&reading(32.0, 50.0, 0), &th).unwrap().alarm_active());
        assert!(evaluate(&reading(32.1, 50.0, 0), &th).unwrap().alarm_active());
        assert!(evaluate(&reading(32.0, 49.9, 0), &th).unwrap().alarm_active());
    }

    #[test]
    fn nominal_reading_is_quiet() {
        let d = evaluate(&reading(25.0, 60.0, 0), &Thresholds::default()).unwrap();
        assert_eq!(d.causes, AlarmCauses::NONE);
        assert_eq!(d.gas_ppm, 0.0);
    }

    #[test]
    fn multiple_causes_accumulate() {
        let d = evaluate(&reading(40.0, 20.0, 4095), &Thresholds::default()).unwrap();
        assert_eq!(d.causes.bits(), 0b111);
        assert_eq!(d.causes.iter().count(), 3);
    }

    #[test]
    fn nan_is_a_fault() {
        let th = Thresholds::default();
        assert_eq!(evaluate(&reading(f32::NAN, 60.0, 0), &th), Err(SensorError::Fault));
        assert_eq!(evaluate(&reading(25.0, f32::NAN, 0), &th), Err(SensorError::Fault));
    }

    #[test]
    fn plan_is_danger_only_when_active() {
        let th = Thresholds::default();
        let hot = evaluate(&reading(35.0, 60.0, 0), &th).unwrap();
        assert_eq!(display_plan(&hot).as_slice(), &[Screen::Danger]);
    }

    #[test]
    fn plan_rotates_three_screens_when_quiet() {
        let d = evaluate(&reading(25.0, 60.0, 0), &Thresholds::default()).unwrap();
        assert_eq!(
            display_plan(&d).as_slice(),
            &[Screen::Temperature(25.0), Screen::Humidity(60.0), Screen::Gas(0.0)]
        );
    }
}
