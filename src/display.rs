//! OLED screen layouts.
//!
//! Each [`Screen`] is drawn from scratch onto any monochrome
//! `embedded-graphics` target. Small text uses a 6×10 font, large text a
//! 10×20 font; positions match the 0/20/40 px rows of the panel.

use core::fmt::Write;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_10X20};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use heapless::String;

use crate::alarm::Screen;

const ROW_HEADER: i32 = 0;
const ROW_LABEL: i32 = 20;
const ROW_VALUE: i32 = 40;

pub const FAULT_TEXT: &str = "DHT Sensor Error";
pub const DANGER_TEXT: &str = "*-DANGER-*";
const CLIMATE_HEADER: &str = "DHT11 Sensor Data";
const GAS_HEADER: &str = "MQ-135 Sensor Data";

/// Fits `-f32::MAX` at two decimals (43 bytes) plus the longest unit, `" PPM"`.
pub const VALUE_LINE_CAP: usize = 48;

/// `"<value with 2 decimals><unit>"`, e.g. `"25.00 C"`.
pub fn value_line(value: f32, unit: &str) -> String<VALUE_LINE_CAP> {
    let mut s = String::new();
    // Cannot overflow with the screen units.
    let _ = write!(s, "{:.2}{}", value, unit);
    s
}

pub fn draw_screen<D>(target: &mut D, screen: &Screen) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let small = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    let large = MonoTextStyle::new(&FONT_10X20, BinaryColor::On);

    target.clear(BinaryColor::Off)?;

    match *screen {
        Screen::Fault => {
            Text::with_baseline(FAULT_TEXT, Point::new(0, ROW_HEADER), small, Baseline::Top)
                .draw(target)?;
        }
        Screen::Danger => {
            Text::with_baseline(DANGER_TEXT, Point::new(0, ROW_LABEL), large, Baseline::Top)
                .draw(target)?;
        }
        Screen::Temperature(t) => {
            labelled(target, CLIMATE_HEADER, "Temp:", &value_line(t, " C"), large)?;
        }
        Screen::Humidity(h) => {
            labelled(target, CLIMATE_HEADER, "Hum:", &value_line(h, " %"), large)?;
        }
        Screen::Gas(ppm) => {
            // The gas page stays in the small font; its value can run to 11 chars.
            labelled(target, GAS_HEADER, "Gas:", &value_line(ppm, " PPM"), small)?;
        }
    }
    Ok(())
}

fn labelled<D>(
    target: &mut D,
    header: &str,
    label: &str,
    value: &str,
    body: MonoTextStyle<'_, BinaryColor>,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let small = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    Text::with_baseline(header, Point::new(0, ROW_HEADER), small, Baseline::Top).draw(target)?;
    Text::with_baseline(label, Point::new(0, ROW_LABEL), body, Baseline::Top).draw(target)?;
    Text::with_baseline(value, Point::new(0, ROW_VALUE), body, Baseline::Top).draw(target)?;
    Ok(())
}
