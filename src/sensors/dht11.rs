//! DHT11 temperature / humidity sensor (single-wire protocol).
//!
//! The host pulls the line low for 18 ms, releases it, and the sensor
//! answers with an 80 µs low / 80 µs high handshake followed by 40 data
//! bits. Each bit is a ~50 µs low followed by a high pulse: ~27 µs for
//! `0`, ~70 µs for `1`. The fifth byte is the 8-bit sum of the first four.
//!
//! [`Dht11`] is generic over `embedded-hal` pins and delays so the bit
//! timing can be exercised on the host with a simulated line.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: [`ClimateSensor`] drives GPIO4 as open-drain through
//! `PinDriver` with `Ets` microsecond delays.
//! On host/test: [`ClimateSensor`] reads static atomics for injection.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::error::SensorError;

const START_LOW_MS: u32 = 18;
const RELEASE_US: u32 = 40;
const HANDSHAKE_TIMEOUT_US: u32 = 100;
const BIT_TIMEOUT_US: u32 = 100;
/// High pulses longer than this are a `1`.
const ONE_THRESHOLD_US: u32 = 40;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Decode the five raw bytes of a DHT11 frame.
pub fn decode_frame(bytes: [u8; 5]) -> Result<ClimateReading, SensorError> {
    let sum = bytes[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != bytes[4] {
        return Err(SensorError::Checksum);
    }

    let humidity_pct = f32::from(bytes[0]) + f32::from(bytes[1]) * 0.1;

    let mut temperature_c = f32::from(bytes[2]);
    if bytes[3] & 0x80 != 0 {
        temperature_c = -1.0 - temperature_c;
    }
    temperature_c += f32::from(bytes[3] & 0x0F) * 0.1;

    Ok(ClimateReading {
        temperature_c,
        humidity_pct,
    })
}

/// Bit-banged DHT11 driver over an open-drain pin.
pub struct Dht11<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> Dht11<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    /// Run one full transaction and decode the result.
    pub fn read(&mut self) -> Result<ClimateReading, SensorError> {
        self.start()?;
        decode_frame(self.receive()?)
    }

    /// Pull the line low for the start signal, then release it.
    pub fn start(&mut self) -> Result<(), SensorError> {
        self.pin.set_low().map_err(|_| SensorError::GpioFailed)?;
        self.delay.delay_ms(START_LOW_MS);
        self.pin.set_high().map_err(|_| SensorError::GpioFailed)?;
        self.delay.delay_us(RELEASE_US);
        Ok(())
    }

    /// Time the handshake and the 40 data bits. Pulse widths decide the
    /// bit values, so the caller must keep interrupts off for the ~5 ms
    /// this takes on hardware.
    pub fn receive(&mut self) -> Result<[u8; 5], SensorError> {
        // Handshake: sensor low, sensor high, then the first bit's low.
        self.wait_for(false, HANDSHAKE_TIMEOUT_US)?;
        self.wait_for(true, HANDSHAKE_TIMEOUT_US)?;
        self.wait_for(false, HANDSHAKE_TIMEOUT_US)?;

        let mut bytes = [0u8; 5];
        for bit in 0..40 {
            self.wait_for(true, BIT_TIMEOUT_US)?;
            let high_us = self.wait_for(false, BIT_TIMEOUT_US)?;
            if high_us > ONE_THRESHOLD_US {
                bytes[bit / 8] |= 0x80 >> (bit % 8);
            }
        }
        Ok(bytes)
    }

    /// Poll until the line reaches `high`; returns the microseconds waited.
    fn wait_for(&mut self, high: bool, timeout_us: u32) -> Result<u32, SensorError> {
        for elapsed in 0..=timeout_us {
            if self.pin.is_high().map_err(|_| SensorError::GpioFailed)? == high {
                return Ok(elapsed);
            }
            self.delay.delay_us(1);
        }
        Err(SensorError::Timeout)
    }
}

// ── Board-level sensor ────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicU32, Ordering};

    // f32 bit patterns: 22.0 °C and 55.0 %.
    static SIM_TEMP_BITS: AtomicU32 = AtomicU32::new(0x41B0_0000);
    static SIM_HUM_BITS: AtomicU32 = AtomicU32::new(0x425C_0000);

    pub fn set(temperature_c: f32, humidity_pct: f32) {
        SIM_TEMP_BITS.store(temperature_c.to_bits(), Ordering::Relaxed);
        SIM_HUM_BITS.store(humidity_pct.to_bits(), Ordering::Relaxed);
    }

    pub fn get() -> (f32, f32) {
        (
            f32::from_bits(SIM_TEMP_BITS.load(Ordering::Relaxed)),
            f32::from_bits(SIM_HUM_BITS.load(Ordering::Relaxed)),
        )
    }
}

/// Inject the climate values the host build reports. NaN simulates a
/// sensor that does not answer.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_climate(temperature_c: f32, humidity_pct: f32) {
    sim::set(temperature_c, humidity_pct);
}

#[cfg(target_os = "espidf")]
type BoardPin = esp_idf_hal::gpio::PinDriver<
    'static,
    esp_idf_hal::gpio::AnyIOPin,
    esp_idf_hal::gpio::InputOutput,
>;

/// The DHT11 wired to [`DHT_GPIO`](crate::pins::DHT_GPIO).
pub struct ClimateSensor {
    #[cfg(target_os = "espidf")]
    driver: Dht11<BoardPin, esp_idf_hal::delay::Ets>,
}

impl ClimateSensor {
    #[cfg(target_os = "espidf")]
    pub fn new(pin: esp_idf_hal::gpio::AnyIOPin) -> anyhow::Result<Self> {
        let mut pin = esp_idf_hal::gpio::PinDriver::input_output_od(pin)?;
        pin.set_pull(esp_idf_hal::gpio::Pull::Up)?;
        pin.set_high()?;
        Ok(Self {
            driver: Dht11::new(pin, esp_idf_hal::delay::Ets),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {}
    }

    /// The start pulse runs with interrupts on; the timed receive runs
    /// inside an ISR critical section so Wi-Fi interrupts cannot stretch
    /// a `0` pulse into a `1`.
    #[cfg(target_os = "espidf")]
    pub fn read(&mut self) -> Result<ClimateReading, SensorError> {
        self.driver.start()?;
        let bytes = esp_idf_hal::interrupt::free(|| self.driver.receive())?;
        decode_frame(bytes)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn read(&mut self) -> Result<ClimateReading, SensorError> {
        let (temperature_c, humidity_pct) = sim::get();
        if temperature_c.is_nan() || humidity_pct.is_nan() {
            return Err(SensorError::Timeout);
        }
        Ok(ClimateReading {
            temperature_c,
            humidity_pct,
        })
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for ClimateSensor {
    fn default() -> Self {
        Self::new()
    }
}
