//! Fixed accent palettes
//!
//! Index `i` of [`DARK`] always pairs with index `i` of [`LIGHT`].

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

use crate::picker::ColorChoice;

/// Number of entries in each palette
pub const PALETTE_LEN: usize = 8;

/// Window background behind the panels
pub const BACKGROUND: Rgb565 = Rgb565::BLACK;
/// Time and date text
pub const TEXT: Rgb565 = Rgb565::WHITE;

/// Dark panel colors
pub const DARK: [Rgb565; PALETTE_LEN] = [
    rgb(0x0055AA), // cobalt blue
    rgb(0x005500), // dark green
    rgb(0xAA0000), // dark candy apple red
    rgb(0xFF5500), // orange
    rgb(0x005555), // midnight green
    rgb(0x555555), // dark gray
    rgb(0x000055), // oxford blue
    rgb(0x5500AA), // indigo
];

/// Light panel colors
pub const LIGHT: [Rgb565; PALETTE_LEN] = [
    rgb(0x55AAFF), // picton blue
    rgb(0x00AA00), // islamic green
    rgb(0xFF0000), // red
    rgb(0xFFAA00), // chrome yellow
    rgb(0x00AAAA), // tiffany blue
    rgb(0xAAAAAA), // light gray
    rgb(0x5500AA), // indigo
    rgb(0xAA55FF), // vivid violet
];

/// Convert a 24-bit `0xRRGGBB` value to the panel's RGB565 format
const fn rgb(hex: u32) -> Rgb565 {
    let r = ((hex >> 16) & 0xff) as u8;
    let g = ((hex >> 8) & 0xff) as u8;
    let b = (hex & 0xff) as u8;
    Rgb565::new(r >> 3, g >> 2, b >> 3)
}

/// Colors of the two background panels for one day
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccentPair {
    /// Center band behind the time
    pub dark: Rgb565,
    /// Full-screen panel behind everything else
    pub light: Rgb565,
}

impl AccentPair {
    /// Look up the pair for a color choice
    pub fn for_choice(choice: ColorChoice) -> Self {
        let index = choice.index() as usize;
        Self {
            dark: DARK[index],
            light: LIGHT[index],
        }
    }
}
