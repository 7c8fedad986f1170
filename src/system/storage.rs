//! Key-value store on the external SPI flash
//!
//! The whole table lives in the last flash sector. The flash stays powered
//! down between accesses.

use embedded_hal::spi::SpiDevice;
use watchface::{persist::IMAGE_CAPACITY, SectorBackend, SectorStore};

use crate::peripherals::spi_flash::{self, Flash, FLASH_SIZE, SECTOR_SIZE};

/// Start of the sector holding the table
const STORE_ADDRESS: u32 = FLASH_SIZE - SECTOR_SIZE;

// The table is written with a single page program
const _: () = assert!(IMAGE_CAPACITY <= spi_flash::PAGE_SIZE);

/// Key-value store backed by the flash sector
pub type FlashStore<SPI> = SectorStore<FlashSector<SPI>>;

pub struct FlashSector<SPI>
where
    SPI: SpiDevice,
{
    flash: Flash<SPI>,
}

impl<SPI> FlashSector<SPI>
where
    SPI: SpiDevice,
{
    pub fn new(flash: Flash<SPI>) -> Self {
        Self { flash }
    }
}

impl<SPI> SectorBackend for FlashSector<SPI>
where
    SPI: SpiDevice,
{
    type Error = spi_flash::Error;

    fn read_sector(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        let id = self.flash.wake_and_read_id()?;
        defmt::debug!("Flash device id: {:#x}", id);
        self.flash.read(STORE_ADDRESS, buf)?;
        self.flash.into_power_down()
    }

    fn write_sector(&mut self, image: &[u8]) -> Result<(), Self::Error> {
        self.flash.wake_and_read_id()?;
        self.flash.erase_sector(STORE_ADDRESS)?;
        self.flash.program_page(STORE_ADDRESS, image)?;
        self.flash.into_power_down()
    }
}
