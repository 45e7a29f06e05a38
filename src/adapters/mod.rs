//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements         | Connects to                   |
//! |-------------|--------------------|-------------------------------|
//! | `dashboard` | DashboardPort      | HTTP server on the soft-AP    |
//! | `hardware`  | SensorPort         | DHT11 GPIO, MQ-135 ADC        |
//! |             | ActuatorPort       | Buzzer/relay GPIO             |
//! | `log_sink`  | EventSink          | Serial log output             |
//! | `mqtt`      | TelemetryPort      | ThingsBoard MQTT broker       |
//! | `oled`      | DisplayPort        | SSD1306 over I²C              |
//! | `wifi`      | ConnectivityPort   | ESP-IDF WiFi AP + STA         |

pub mod dashboard;
pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod oled;
pub mod wifi;
