//! WiFi adapter (AP + STA).
//!
//! Implements [`ConnectivityPort`]: the hexagonal boundary for network
//! connectivity. The station interface joins the kitchen's network for
//! ThingsBoard telemetry; the soft-AP (`Smart_Kitchen` by default) hosts
//! the local dashboard so it stays reachable without an uplink.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Reconnection policy
//!
//! When the station link drops, [`poll`](ConnectivityPort::poll) retries
//! with an exponential backoff (2 s → 4 s → 8 s … capped at 60 s). Retries
//! only re-associate the station; the AP + STA configuration is applied
//! once, so the soft-AP and its dashboard clients are unaffected.

use core::fmt;
use std::time::{Duration, Instant};

use log::{error, info, warn};

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{
    AccessPointConfiguration, AuthMethod, BlockingWifi, ClientConfiguration, Configuration,
    EspWifi,
};

use crate::config::NetworkConfig;

// ───────────────────────────────────────────────────────────────
// Port trait
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

impl core::error::Error for ConnectivityError {}

pub trait ConnectivityPort {
    fn connect(&mut self) -> Result<(), ConnectivityError>;
    fn is_connected(&self) -> bool;
    fn poll(&mut self);
    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError>;
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
}

const INITIAL_BACKOFF_SECS: u32 = 2;
const MAX_BACKOFF_SECS: u32 = 60;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    ap_ssid: heapless::String<32>,
    ap_password: heapless::String<64>,
    backoff_secs: u32,
    next_retry: Option<Instant>,
    last_rssi: Option<i8>,
    /// Interfaces configured and started; retries only re-associate.
    started: bool,
    #[cfg(target_os = "espidf")]
    driver: Option<BlockingWifi<EspWifi<'static>>>,
    /// Simulation: link state and injected connect failures.
    #[cfg(not(target_os = "espidf"))]
    sim_link_up: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_failures_pending: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_ap_starts: u32,
}

impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl WifiAdapter {
    pub fn new() -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            ap_ssid: heapless::String::new(),
            ap_password: heapless::String::new(),
            backoff_secs: INITIAL_BACKOFF_SECS,
            next_retry: None,
            last_rssi: None,
            started: false,
            #[cfg(target_os = "espidf")]
            driver: None,
            #[cfg(not(target_os = "espidf"))]
            sim_link_up: false,
            #[cfg(not(target_os = "espidf"))]
            sim_failures_pending: 0,
            #[cfg(not(target_os = "espidf"))]
            sim_ap_starts: 0,
        }
    }

    /// Build an adapter with both station and soft-AP credentials applied.
    pub fn from_config(net: &NetworkConfig) -> Result<Self, ConnectivityError> {
        let mut adapter = Self::new();
        adapter.set_credentials(net.wifi_ssid, net.wifi_password)?;
        adapter.set_access_point(net.ap_ssid, net.ap_password)?;
        Ok(adapter)
    }

    /// Hand over the ESP-IDF driver (needs the modem peripheral, owned by main).
    #[cfg(target_os = "espidf")]
    pub fn attach(&mut self, driver: BlockingWifi<EspWifi<'static>>) {
        self.driver = Some(driver);
    }

    pub fn set_access_point(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ap_ssid.clear();
        self.ap_ssid.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        self.ap_password.clear();
        self.ap_password.push_str(password).map_err(|_| ConnectivityError::InvalidPassword)?;
        Ok(())
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn ap_ssid(&self) -> &str {
        &self.ap_ssid
    }

    fn on_connected(&mut self) {
        self.state = WifiState::Connected;
        self.backoff_secs = INITIAL_BACKOFF_SECS;
        self.next_retry = None;
        self.last_rssi = self.platform_rssi();
    }

    fn schedule_retry(&mut self, attempt: u32) {
        self.state = WifiState::Reconnecting { attempt };
        self.next_retry = Some(Instant::now() + Duration::from_secs(u64::from(self.backoff_secs)));
    }

    // ── Platform-specific ─────────────────────────────────────

    /// Apply the AP + STA configuration and start the driver. Runs once:
    /// re-applying it restarts the soft-AP and drops dashboard clients.
    fn ensure_started(&mut self) -> Result<(), ConnectivityError> {
        if self.started {
            return Ok(());
        }
        self.platform_start()?;
        self.started = true;
        info!("WiFi: soft-AP '{}' up", self.ap_ssid);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_start(&mut self) -> Result<(), ConnectivityError> {
        let Some(wifi) = self.driver.as_mut() else {
            error!("WiFi(espidf): driver not attached");
            return Err(ConnectivityError::ConnectionFailed);
        };

        let client = ClientConfiguration {
            ssid: self.ssid.as_str().try_into().map_err(|_| ConnectivityError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method: if self.password.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            },
            ..Default::default()
        };
        let ap = AccessPointConfiguration {
            ssid: self.ap_ssid.as_str().try_into().map_err(|_| ConnectivityError::InvalidSsid)?,
            password: self
                .ap_password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method: if self.ap_password.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            },
            ..Default::default()
        };

        wifi.set_configuration(&Configuration::Mixed(client, ap))
            .and_then(|()| wifi.start())
            .map_err(|e| {
                warn!("WiFi(espidf): start: {}", e);
                ConnectivityError::ConnectionFailed
            })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&mut self) -> Result<(), ConnectivityError> {
        self.sim_ap_starts += 1;
        Ok(())
    }

    /// Associate the station interface and wait for an IP.
    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        let Some(wifi) = self.driver.as_mut() else {
            return Err(ConnectivityError::ConnectionFailed);
        };
        wifi.connect().and_then(|()| wifi.wait_netif_up()).map_err(|e| {
            warn!("WiFi(espidf): {}", e);
            ConnectivityError::ConnectionFailed
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        if self.sim_failures_pending > 0 {
            self.sim_failures_pending -= 1;
            warn!("WiFi(sim): simulated association failure");
            return Err(ConnectivityError::ConnectionFailed);
        }
        self.sim_link_up = true;
        info!("WiFi(sim): connected to '{}'", self.ssid);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.driver
            .as_ref()
            .is_some_and(|w| w.is_connected().unwrap_or(false))
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.sim_link_up
    }

    #[cfg(target_os = "espidf")]
    fn platform_rssi(&self) -> Option<i8> {
        let mut rssi: i32 = 0;
        // SAFETY: plain out-parameter query; fails harmlessly when not associated.
        let ret = unsafe { esp_idf_sys::esp_wifi_sta_get_rssi(&mut rssi) };
        (ret == esp_idf_sys::ESP_OK as i32).then_some(rssi as i8)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_rssi(&self) -> Option<i8> {
        self.sim_link_up.then_some(-60)
    }

    // ── Simulation hooks ──────────────────────────────────────

    /// Simulate the access point going away.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_drop_link(&mut self) {
        self.sim_link_up = false;
    }

    /// Make the next `n` connection attempts fail.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_fail_next(&mut self, n: u32) {
        self.sim_failures_pending = n;
    }

    /// How many times the interfaces were configured and started.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_ap_starts(&self) -> u32 {
        self.sim_ap_starts
    }

    /// Let the next `poll` retry immediately instead of waiting out the backoff.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_expire_backoff(&mut self) {
        self.next_retry = Some(Instant::now());
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn connect(&mut self) -> Result<(), ConnectivityError> {
        if self.ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }
        if self.state == WifiState::Connected {
            return Ok(());
        }
        self.ensure_started()?;

        info!("WiFi: connecting to '{}'", self.ssid);
        self.state = WifiState::Connecting;

        match self.platform_connect() {
            Ok(()) => {
                self.on_connected();
                info!("WiFi: connected (RSSI={:?})", self.last_rssi);
                Ok(())
            }
            Err(e) => {
                error!("WiFi: connection failed: {}", e);
                self.schedule_retry(0);
                Err(e)
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.state == WifiState::Connected && self.platform_is_connected()
    }

    fn poll(&mut self) {
        match self.state {
            WifiState::Reconnecting { attempt } => {
                if self.next_retry.is_some_and(|t| Instant::now() < t) {
                    return;
                }
                info!("WiFi: reconnect attempt {} (backoff {}s)", attempt + 1, self.backoff_secs);
                if self.platform_connect().is_ok() {
                    self.on_connected();
                    info!("WiFi: reconnected (RSSI={:?})", self.last_rssi);
                } else {
                    self.backoff_secs = (self.backoff_secs * 2).min(MAX_BACKOFF_SECS);
                    self.schedule_retry(attempt + 1);
                }
            }
            WifiState::Connected => {
                if self.platform_is_connected() {
                    self.last_rssi = self.platform_rssi();
                } else {
                    warn!("WiFi: connection lost, entering reconnect");
                    self.last_rssi = None;
                    self.schedule_retry(0);
                }
            }
            _ => {}
        }
    }

    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password.push_str(password).map_err(|_| ConnectivityError::InvalidPassword)?;
        info!("WiFi: credentials updated (SSID='{}')", self.ssid);
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
