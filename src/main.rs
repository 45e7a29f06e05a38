//! SmartKitchen Firmware: Main Entry Point
//!
//! Hexagonal architecture with a single blocking control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   MqttTelemetry   WebDashboard │
//! │  (Sensor+Actuator) (EventSink)    (Telemetry)     (Dashboard)  │
//! │  OledDisplay       WifiAdapter                                 │
//! │  (Display)         (Connectivity)                              │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              ControlLoop (pure logic)                  │    │
//! │  │  gas mapping · alarm evaluation · display plan         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::FromValueType;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::{error, info, warn};

use smartkitchen::adapters::dashboard::WebDashboard;
use smartkitchen::adapters::hardware::HardwareAdapter;
use smartkitchen::adapters::log_sink::LogEventSink;
use smartkitchen::adapters::mqtt::MqttTelemetry;
use smartkitchen::adapters::oled::OledDisplay;
use smartkitchen::adapters::wifi::{ConnectivityPort, WifiAdapter};
use smartkitchen::app::service::ControlLoop;
use smartkitchen::config::{NetworkConfig, SystemConfig};
use smartkitchen::drivers::hw_init;
use smartkitchen::drivers::watchdog::{FeedingDelay, Watchdog};
use smartkitchen::error::Error;
use smartkitchen::pins;
use smartkitchen::sensors::{SensorHub, dht11::ClimateSensor, mq135::GasSensor};

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SmartKitchen v{}                 ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = SystemConfig::default();
    config.validate().map_err(Error::Config)?;
    let net = NetworkConfig::default();

    // ── 2. Initialise hardware peripherals ────────────────────
    hw_init::init_peripherals().context("peripheral init")?;
    let peripherals = Peripherals::take()?;

    // GPIO4 = pins::DHT_GPIO
    let climate = ClimateSensor::new(peripherals.pins.gpio4.into())?;
    let gas = GasSensor::new(pins::MQ135_ADC_GPIO)?;
    let mut hw = HardwareAdapter::new(SensorHub::new(climate, gas));

    // GPIO21/22 = pins::I2C_SDA_GPIO / pins::I2C_SCL_GPIO
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(pins::I2C_FREQ_HZ.Hz()),
    )?;
    // A missing panel is fatal: without it the device has no local alarm text.
    let mut oled = OledDisplay::new(i2c, pins::OLED_I2C_ADDR)
        .map_err(|e| anyhow::anyhow!("SSD1306 init failed: {:?}", e))?;

    // ── 3. Network: soft-AP dashboard + STA uplink ────────────
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let mut wifi = WifiAdapter::from_config(&net)?;
    wifi.attach(BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?,
        sysloop,
    )?);
    if let Err(e) = wifi.connect() {
        // Keep going: the dashboard and alarm work without an uplink.
        warn!("WiFi: {}: telemetry will wait for reconnect", e);
    }

    let mut dashboard = WebDashboard::new();
    dashboard.serve(net.dashboard_port)?;
    info!("Dashboard: http://192.168.4.1:{}/ on '{}'", net.dashboard_port, wifi.ap_ssid());

    // ── 4. Control loop ───────────────────────────────────────
    let watchdog = Watchdog::default();
    let mut telemetry = MqttTelemetry::start(&net, FeedingDelay::new(FreeRtos, watchdog.clone()))?;
    let mut log_sink = LogEventSink::new();
    let mut control = ControlLoop::new(config);
    control.start(&mut hw, &mut log_sink);

    info!("System ready. Entering control loop.");

    let mut delay = FeedingDelay::new(FreeRtos, watchdog.clone());
    loop {
        // A station retry blocks for one association attempt.
        watchdog.feed();
        wifi.poll();
        watchdog.feed();
        control.run_cycle(
            &mut hw,
            &mut telemetry,
            &mut dashboard,
            &mut oled,
            &mut delay,
            &mut log_sink,
        );
        if control.consecutive_faults() > 0 && control.consecutive_faults() % 10 == 0 {
            error!("DHT11 has failed {} cycles in a row", control.consecutive_faults());
        }
    }
}
