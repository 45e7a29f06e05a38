//! Task Watchdog Timer (TWDT) driver.
//!
//! The control loop blocks in three places: the station reconnect inside
//! `WifiAdapter::poll` (one association, up to ~15 s), the broker wait
//! inside `MqttTelemetry::publish` (up to 3 × 5 s), and the screen dwells
//! (2 s each). None of these alone comes near the 30 s timeout, but they
//! add up past it, so the loop feeds before and after the Wi-Fi poll and
//! every blocking delay goes through a [`FeedingDelay`].

use embedded_hal::delay::DelayNs;

#[cfg(target_os = "espidf")]
use esp_idf_sys::*;

#[cfg(not(target_os = "espidf"))]
use std::sync::Arc;
#[cfg(not(target_os = "espidf"))]
use std::sync::atomic::{AtomicU32, Ordering};

/// Default TWDT timeout.
pub const DEFAULT_TIMEOUT_MS: u32 = 30_000;

/// Handle to the task's TWDT subscription. Clones feed the same timer.
#[derive(Clone)]
pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_feeds: Arc<AtomicU32>,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_MS)
    }
}

impl Watchdog {
    /// Reconfigure the TWDT and subscribe the calling task.
    pub fn new(timeout_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        {
            let cfg = esp_task_wdt_config_t {
                timeout_ms,
                idle_core_mask: 0,
                trigger_panic: true,
            };
            // SAFETY: plain config struct by reference; called once from main.
            let ret = unsafe { esp_task_wdt_reconfigure(&cfg) };
            if ret != ESP_OK as i32 {
                log::warn!("TWDT reconfigure returned {} (already configured?)", ret);
            }

            // SAFETY: null handle subscribes the current task.
            let ret = unsafe { esp_task_wdt_add(core::ptr::null_mut()) };
            let subscribed = ret == ESP_OK as i32;
            if subscribed {
                log::info!("Watchdog: loop task subscribed ({}ms)", timeout_ms);
            } else {
                log::warn!("Watchdog: failed to subscribe ({})", ret);
            }
            Self { subscribed }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            log::info!("Watchdog(sim): {}ms budget, counting feeds", timeout_ms);
            Self {
                sim_feeds: Arc::new(AtomicU32::new(0)),
            }
        }
    }

    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                // SAFETY: resets the current task's own subscription.
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            self.sim_feeds.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Number of feeds so far, across all clones.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_feed_count(&self) -> u32 {
        self.sim_feeds.load(Ordering::Relaxed)
    }
}

/// A delay that feeds the watchdog after every wait.
pub struct FeedingDelay<D> {
    inner: D,
    watchdog: Watchdog,
}

impl<D: DelayNs> FeedingDelay<D> {
    pub fn new(inner: D, watchdog: Watchdog) -> Self {
        Self { inner, watchdog }
    }
}

impl<D: DelayNs> DelayNs for FeedingDelay<D> {
    fn delay_ns(&mut self, ns: u32) {
        self.inner.delay_ns(ns);
        self.watchdog.feed();
    }

    fn delay_us(&mut self, us: u32) {
        self.inner.delay_us(us);
        self.watchdog.feed();
    }

    fn delay_ms(&mut self, ms: u32) {
        self.inner.delay_ms(ms);
        self.watchdog.feed();
    }
}
