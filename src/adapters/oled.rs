//! OLED display adapter.
//!
//! Implements [`DisplayPort`] on top of the SSD1306 driver. Drawing into
//! the frame buffer cannot fail; bus errors on flush are logged once per
//! outage and otherwise swallowed, so a loose display never stalls the
//! control loop.

use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::alarm::Screen;
use crate::app::ports::DisplayPort;
use crate::display::draw_screen;
use crate::drivers::ssd1306::{FrameBuffer, Ssd1306};

pub struct OledDisplay<I2C> {
    panel: Ssd1306<I2C>,
    bus_failing: bool,
}

impl<I2C: I2c> OledDisplay<I2C> {
    /// Initialise the panel. Failure here is fatal to the caller.
    pub fn new(i2c: I2C, addr: u8) -> Result<Self, I2C::Error> {
        let mut panel = Ssd1306::new(i2c, addr);
        panel.init()?;
        info!("OLED: SSD1306 ready at 0x{:02X}", addr);
        Ok(Self {
            panel,
            bus_failing: false,
        })
    }

    pub fn frame(&self) -> &FrameBuffer {
        self.panel.frame()
    }
}

impl<I2C: I2c> DisplayPort for OledDisplay<I2C> {
    fn render(&mut self, screen: &Screen) {
        let Ok(()) = draw_screen(self.panel.frame_mut(), screen);

        match self.panel.flush() {
            Ok(()) => {
                if self.bus_failing {
                    info!("OLED: bus recovered");
                    self.bus_failing = false;
                }
            }
            Err(e) => {
                if !self.bus_failing {
                    warn!("OLED: flush failed: {:?}", e);
                    self.bus_failing = true;
                }
            }
        }
    }
}
