//! SmartKitchen firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.
//!
//! Host tests: `cargo test`. Device build: `cargo build --release
//! --target xtensa-esp32-espidf --features espidf`.

#![deny(unused_must_use)]

#[cfg(all(target_os = "espidf", not(feature = "espidf")))]
compile_error!("ESP-IDF targets need the `espidf` feature: build with `--features espidf`");

pub mod alarm;
pub mod app;
pub mod config;
pub mod display;
pub mod error;
pub mod pins;
pub mod telemetry;

// Hardware-facing modules. On non-espidf targets their drivers fall back
// to simulation stubs so the whole crate builds and tests on the host.
pub mod adapters;
pub mod drivers;
pub mod sensors;
