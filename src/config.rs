//! System configuration parameters
//!
//! The alarm thresholds and gas mapping are fixed at build time; there is
//! no runtime reconfiguration. Network credentials are baked in from the
//! build environment (`SK_WIFI_SSID`, `SK_WIFI_PASSWORD`, `SK_AP_SSID`,
//! `SK_AP_PASSWORD`, `SK_TB_HOST`, `SK_TB_TOKEN`) with fallbacks below.

use serde::{Deserialize, Serialize};

/// Alarm thresholds and the gas ADC mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Alarm when temperature (°C) is strictly above this.
    pub temp_threshold_c: f32,
    /// Alarm when relative humidity (%) is strictly below this.
    pub hum_threshold_pct: f32,
    /// Alarm when mapped gas concentration (ppm) is strictly above this.
    pub gas_threshold_ppm: f32,
    /// Upper end of the raw ADC domain (12-bit ADC → 4095).
    pub gas_domain_max: u16,
    /// Upper end of the mapped ppm range.
    pub gas_range_max: u16,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temp_threshold_c: 32.0,
            hum_threshold_pct: 50.0,
            gas_threshold_ppm: 750.0,
            gas_domain_max: 4095,
            gas_range_max: 1000,
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    pub thresholds: Thresholds,

    // --- Display timing ---
    /// How long each OLED screen is held (milliseconds).
    pub screen_dwell_ms: u32,
    /// Pause after a sensor fault before the next cycle (milliseconds).
    pub fault_settle_ms: u32,

    // --- Telemetry ---
    /// MQTT topic the payload is published to.
    pub telemetry_topic: heapless::String<64>,

    // --- Safety ---
    /// Force buzzer and relay off after this many consecutive sensor
    /// faults. `None` leaves them at their last commanded level.
    pub failsafe_after_faults: Option<u32>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut topic = heapless::String::new();
        let _ = topic.push_str("v1/devices/me/telemetry");
        Self {
            thresholds: Thresholds::default(),
            screen_dwell_ms: 2000,
            fault_settle_ms: 2000,
            telemetry_topic: topic,
            failsafe_after_faults: None,
        }
    }
}

impl SystemConfig {
    /// Reject values that would make the alarm mapping meaningless.
    pub fn validate(&self) -> Result<(), &'static str> {
        let t = &self.thresholds;
        if t.gas_domain_max == 0 {
            return Err("gas_domain_max must be non-zero");
        }
        if t.gas_range_max == 0 {
            return Err("gas_range_max must be non-zero");
        }
        if !t.temp_threshold_c.is_finite()
            || !t.hum_threshold_pct.is_finite()
            || !t.gas_threshold_ppm.is_finite()
        {
            return Err("thresholds must be finite");
        }
        if !(0.0..=100.0).contains(&t.hum_threshold_pct) {
            return Err("hum_threshold_pct must be within 0-100");
        }
        if self.telemetry_topic.is_empty() {
            return Err("telemetry_topic must not be empty");
        }
        if self.failsafe_after_faults == Some(0) {
            return Err("failsafe_after_faults must be at least 1");
        }
        Ok(())
    }
}

/// Station / soft-AP / broker settings used by the network adapters.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub wifi_ssid: &'static str,
    pub wifi_password: &'static str,
    pub ap_ssid: &'static str,
    pub ap_password: &'static str,
    pub broker_host: &'static str,
    pub broker_port: u16,
    pub client_id: &'static str,
    pub access_token: &'static str,
    /// Wait between broker reconnection checks (milliseconds).
    pub reconnect_delay_ms: u32,
    /// Reconnection checks before a publish is dropped.
    pub reconnect_attempts: u32,
    /// HTTP port for the dashboard on the soft-AP.
    pub dashboard_port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            wifi_ssid: option_env!("SK_WIFI_SSID").unwrap_or("SmartKitchen-Uplink"),
            wifi_password: option_env!("SK_WIFI_PASSWORD").unwrap_or(""),
            ap_ssid: option_env!("SK_AP_SSID").unwrap_or("Smart_Kitchen"),
            ap_password: option_env!("SK_AP_PASSWORD").unwrap_or("00000000"),
            broker_host: option_env!("SK_TB_HOST").unwrap_or("demo.thingsboard.io"),
            broker_port: 1883,
            client_id: "ESP32",
            access_token: option_env!("SK_TB_TOKEN").unwrap_or(""),
            reconnect_delay_ms: 5000,
            reconnect_attempts: 3,
            dashboard_port: 80,
        }
    }
}
