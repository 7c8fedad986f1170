//! Display control module for PineTime

use display_interface_spi::SPIInterfaceNoCS;
use embassy_embedded_hal::shared_bus::blocking::spi::SpiDevice;
use embassy_nrf::{
    gpio::Output,
    peripherals::{P0_18, P0_25, P0_26, SPI2},
    spim::Spim,
};
use embassy_sync_05::blocking_mutex::raw::NoopRawMutex;
use embassy_time::Delay;
use embedded_graphics::{pixelcolor::Rgb565, prelude::*};
use mipidsi::{models::ST7789, Builder, Orientation};
use rand::RngCore;
use watchface::{AccentFace, SCREEN_H, SCREEN_W};

/// LCD on the shared SPI bus, chip select P0.25
pub type LcdSpi = SpiDevice<'static, NoopRawMutex, Spim<'static, SPI2>, Output<'static, P0_25>>;

type Lcd = mipidsi::Display<SPIInterfaceNoCS<LcdSpi, Output<'static, P0_18>>, ST7789, Output<'static, P0_26>>;

pub struct Display {
    /// Display instance
    lcd: Lcd,
}

impl Display {
    /// Configure display settings on boot
    pub fn init(
        spi: LcdSpi,
        dc_pin: Output<'static, P0_18>,
        rst_pin: Output<'static, P0_26>,
    ) -> Result<Self, Error> {
        let lcd = Builder::st7789(SPIInterfaceNoCS::new(spi, dc_pin))
            .with_display_size(SCREEN_W as u16, SCREEN_H as u16)
            .with_orientation(Orientation::Portrait(false))
            .init(&mut Delay, Some(rst_pin))
            .map_err(|_| Error::Init)?;

        let mut display = Self { lcd };
        display.clear(Rgb565::BLACK)?;
        Ok(display)
    }
    /// Clear the display
    pub fn clear(&mut self, color: Rgb565) -> Result<(), Error> {
        self.lcd.clear(color).map_err(|_| Error::Interface)
    }
    /// Draw the current state of the watch face
    pub fn draw_face<R: RngCore>(&mut self, face: &AccentFace<R>) -> Result<(), Error> {
        face.draw(&mut self.lcd).map_err(|_| Error::Interface)
    }
}

#[derive(Debug, defmt::Format)]
pub enum Error {
    /// Controller did not come up
    Init,
    /// Writing to the controller failed
    Interface,
}
