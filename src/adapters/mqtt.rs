//! ThingsBoard MQTT telemetry adapter.
//!
//! Implements [`TelemetryPort`]. The broker connection is tracked through
//! a shared flag that the MQTT event callback flips; `publish` checks it
//! first and, if the link is down, blocks for up to `reconnect_attempts`
//! fixed delays waiting for the client's own reconnect to land.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspMqttClient` with a callback.
//! - **all other targets**: in-memory broker for host-side tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;
use log::{info, warn};

#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};

use crate::app::ports::TelemetryPort;
use crate::config::NetworkConfig;
use crate::error::CommsError;

pub struct MqttTelemetry<D> {
    connected: Arc<AtomicBool>,
    delay: D,
    reconnect_delay_ms: u32,
    reconnect_attempts: u32,
    #[cfg(target_os = "espidf")]
    client: EspMqttClient<'static>,
    #[cfg(not(target_os = "espidf"))]
    sim_published: Vec<(String, String)>,
}

impl<D: DelayNs> MqttTelemetry<D> {
    /// Start the client. The connection itself completes in the background.
    #[cfg(target_os = "espidf")]
    pub fn start(net: &NetworkConfig, delay: D) -> anyhow::Result<Self> {
        use std::time::Duration;

        let url = format!("mqtt://{}:{}", net.broker_host, net.broker_port);
        let connected = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&connected);

        let conf = MqttClientConfiguration {
            client_id: Some(net.client_id),
            username: Some(net.access_token),
            reconnect_timeout: Some(Duration::from_millis(u64::from(net.reconnect_delay_ms))),
            ..Default::default()
        };

        let client = EspMqttClient::new_cb(&url, &conf, move |event| match event.payload() {
            EventPayload::Connected(_) => {
                flag.store(true, Ordering::Relaxed);
                info!("MQTT: connected");
            }
            EventPayload::Disconnected => {
                flag.store(false, Ordering::Relaxed);
                warn!("MQTT: disconnected");
            }
            EventPayload::Error(e) => warn!("MQTT: {:?}", e),
            _ => {}
        })?;

        info!("MQTT: client started ({} as '{}')", url, net.client_id);
        Ok(Self {
            connected,
            delay,
            reconnect_delay_ms: net.reconnect_delay_ms,
            reconnect_attempts: net.reconnect_attempts,
            client,
        })
    }

    /// In-memory broker, initially reachable.
    #[cfg(not(target_os = "espidf"))]
    pub fn start(net: &NetworkConfig, delay: D) -> anyhow::Result<Self> {
        info!("MQTT(sim): broker {}:{}", net.broker_host, net.broker_port);
        Ok(Self {
            connected: Arc::new(AtomicBool::new(true)),
            delay,
            reconnect_delay_ms: net.reconnect_delay_ms,
            reconnect_attempts: net.reconnect_attempts,
            sim_published: Vec::new(),
        })
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Block until the broker link is back, or give up after the
    /// configured number of delays.
    fn ensure_connected(&mut self) -> Result<(), CommsError> {
        for attempt in 1..=self.reconnect_attempts {
            if self.is_connected() {
                return Ok(());
            }
            warn!(
                "MQTT: broker unreachable, retrying in {}ms ({}/{})",
                self.reconnect_delay_ms, attempt, self.reconnect_attempts
            );
            self.delay.delay_ms(self.reconnect_delay_ms);
        }
        if self.is_connected() {
            Ok(())
        } else {
            Err(CommsError::MqttDisconnected)
        }
    }

    #[cfg(target_os = "espidf")]
    fn send(&mut self, topic: &str, payload: &str) -> Result<(), CommsError> {
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload.as_bytes())
            .map(|_| ())
            .map_err(|e| {
                warn!("MQTT: publish failed: {}", e);
                CommsError::MqttPublishFailed
            })
    }

    #[cfg(not(target_os = "espidf"))]
    fn send(&mut self, topic: &str, payload: &str) -> Result<(), CommsError> {
        self.sim_published.push((topic.to_owned(), payload.to_owned()));
        Ok(())
    }

    // ── Simulation hooks ──────────────────────────────────────

    /// Handle to the link flag, standing in for the broker's reachability.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_link(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.connected)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_published(&self) -> &[(String, String)] {
        &self.sim_published
    }
}

impl<D: DelayNs> TelemetryPort for MqttTelemetry<D> {
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), CommsError> {
        self.ensure_connected()?;
        self.send(topic, payload)
    }
}
