//! SPI flash module
//!
//! Driver for the 4 MiB SPI NOR flash (XT25F32B) sharing the SPI bus with
//! the LCD.

use embassy_time::{block_for, Duration};
use embedded_hal::spi::{Operation, SpiDevice};

/// Erase granularity
pub const SECTOR_SIZE: u32 = 4096;
/// Largest single program operation
pub const PAGE_SIZE: usize = 256;
/// Total capacity
pub const FLASH_SIZE: u32 = 4 * 1024 * 1024;

const CMD_PAGE_PROGRAM: u8 = 0x02;
const CMD_READ: u8 = 0x03;
const CMD_READ_STATUS: u8 = 0x05;
const CMD_WRITE_ENABLE: u8 = 0x06;
const CMD_SECTOR_ERASE: u8 = 0x20;
const CMD_RELEASE_POWER_DOWN: u8 = 0xab;
const CMD_POWER_DOWN: u8 = 0xb9;

/// Write in progress bit of the status register
const STATUS_BUSY: u8 = 0x01;

pub struct Flash<SPI>
where
    SPI: SpiDevice,
{
    /// Flash SPI interface
    interface: SPI,
}

impl<SPI> Flash<SPI>
where
    SPI: SpiDevice,
{
    /// Configure flash settings on boot
    pub fn init(spi: SPI) -> Self {
        Self { interface: spi }
    }
    /// Enable deep power down state
    pub fn into_power_down(&mut self) -> Result<(), Error> {
        // Write 0xb9 with CS framing, then keep CS high for 0.1μs
        self.interface
            .write(&[CMD_POWER_DOWN])
            .map_err(|_| Error::Spi)?;
        block_for(Duration::from_micros(1));
        Ok(())
    }
    /// Wake from deep power down state and read device ID
    pub fn wake_and_read_id(&mut self) -> Result<u8, Error> {
        let buf: &mut [u8] = &mut [CMD_RELEASE_POWER_DOWN, 0x00, 0x00, 0x00, 0x00];
        // Shift instruction code `ABH` followed by 3 dummy bytes, then keep
        // CS high for 20μs
        self.interface
            .transfer_in_place(buf)
            .map_err(|_| Error::Spi)?;
        block_for(Duration::from_micros(20));
        Ok(buf[4])
    }
    /// Read `buf.len()` bytes starting at `address`
    pub fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), Error> {
        check_bounds(address, buf.len())?;
        let header = command(CMD_READ, address);
        self.interface
            .transaction(&mut [Operation::Write(&header), Operation::Read(buf)])
            .map_err(|_| Error::Spi)
    }
    /// Erase the sector containing `address`
    pub fn erase_sector(&mut self, address: u32) -> Result<(), Error> {
        check_bounds(address, 0)?;
        self.write_enable()?;
        self.interface
            .write(&command(CMD_SECTOR_ERASE, address & !(SECTOR_SIZE - 1)))
            .map_err(|_| Error::Spi)?;
        self.wait_ready()
    }
    /// Program erased memory. The data must not cross a page boundary.
    pub fn program_page(&mut self, address: u32, data: &[u8]) -> Result<(), Error> {
        check_bounds(address, data.len())?;
        let page_offset = address as usize % PAGE_SIZE;
        if page_offset + data.len() > PAGE_SIZE {
            return Err(Error::CrossesPage);
        }
        self.write_enable()?;
        let header = command(CMD_PAGE_PROGRAM, address);
        self.interface
            .transaction(&mut [Operation::Write(&header), Operation::Write(data)])
            .map_err(|_| Error::Spi)?;
        self.wait_ready()
    }

    fn write_enable(&mut self) -> Result<(), Error> {
        self.interface
            .write(&[CMD_WRITE_ENABLE])
            .map_err(|_| Error::Spi)
    }

    fn read_status(&mut self) -> Result<u8, Error> {
        let buf: &mut [u8] = &mut [CMD_READ_STATUS, 0x00];
        self.interface
            .transfer_in_place(buf)
            .map_err(|_| Error::Spi)?;
        Ok(buf[1])
    }

    /// Sector erase takes up to a few hundred ms
    fn wait_ready(&mut self) -> Result<(), Error> {
        while self.read_status()? & STATUS_BUSY != 0 {
            block_for(Duration::from_micros(100));
        }
        Ok(())
    }
}

fn command(code: u8, address: u32) -> [u8; 4] {
    let [_, a2, a1, a0] = address.to_be_bytes();
    [code, a2, a1, a0]
}

fn check_bounds(address: u32, len: usize) -> Result<(), Error> {
    if address as u64 + len as u64 > FLASH_SIZE as u64 {
        return Err(Error::OutOfBounds);
    }
    Ok(())
}

#[derive(Debug, defmt::Format)]
pub enum Error {
    /// Bus transfer failed
    Spi,
    /// Access past the end of the chip
    OutOfBounds,
    /// Program data runs over a page boundary
    CrossesPage,
}
