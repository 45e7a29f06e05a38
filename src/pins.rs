//! GPIO / peripheral pin assignments for the SmartKitchen board (ESP32 DevKit).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// DHT11 temperature/humidity sensor: single-wire, open-drain with pull-up.
pub const DHT_GPIO: i32 = 4;

/// MQ-135 air-quality sensor: analog output.
/// ADC1 channel 6 (GPIO 34, input-only on ESP32).
pub const MQ135_ADC_GPIO: i32 = 34;

// ---------------------------------------------------------------------------
// Alarm outputs (active HIGH)
// ---------------------------------------------------------------------------

pub const BUZZER_GPIO: i32 = 25;
pub const RELAY_GPIO: i32 = 27;

// ---------------------------------------------------------------------------
// I²C bus (SSD1306 OLED)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
/// 7-bit address of the 128×64 SSD1306.
pub const OLED_I2C_ADDR: u8 = 0x3C;
pub const I2C_FREQ_HZ: u32 = 400_000;
