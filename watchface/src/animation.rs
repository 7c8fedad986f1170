//! Panel slide-in animation
//!
//! Both panels move together: the light panel grows in from the left edge
//! while the dark band slides in from the right.

use embedded_graphics::{
    geometry::{Point, Size},
    primitives::Rectangle,
};

use crate::{SCREEN_H, SCREEN_W};

/// Default slide duration
pub const SLIDE_DURATION_MS: u32 = 800;

/// Top edge of the dark band
pub const BAND_Y: i32 = 62;
/// Height of the dark band
pub const BAND_H: u32 = 116;

const FULL: i32 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Slide {
    from: Rectangle,
    to: Rectangle,
}

impl Slide {
    fn at(&self, eased: i32) -> Rectangle {
        let from = self.from;
        let to = self.to;
        Rectangle::new(
            Point::new(
                lerp(from.top_left.x, to.top_left.x, eased),
                lerp(from.top_left.y, to.top_left.y, eased),
            ),
            Size::new(
                lerp(from.size.width as i32, to.size.width as i32, eased) as u32,
                lerp(from.size.height as i32, to.size.height as i32, eased) as u32,
            ),
        )
    }
}

fn lerp(from: i32, to: i32, eased: i32) -> i32 {
    from + (to - from) * eased / FULL
}

/// Quadratic ease-in-out on a 0..=1000 scale
fn ease_in_out(linear: i32) -> i32 {
    if linear < FULL / 2 {
        2 * linear * linear / FULL
    } else {
        let rest = FULL - linear;
        FULL - 2 * rest * rest / FULL
    }
}

/// One run of the panel slide
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlideAnimation {
    light: Slide,
    dark: Slide,
    duration_ms: u32,
    elapsed_ms: u32,
}

impl SlideAnimation {
    pub fn new(duration_ms: u32) -> Self {
        let w = SCREEN_W as i32;
        Self {
            light: Slide {
                from: Rectangle::new(Point::new(-w, 0), Size::new(0, SCREEN_H)),
                to: Rectangle::new(Point::zero(), Size::new(SCREEN_W, SCREEN_H)),
            },
            dark: Slide {
                from: Rectangle::new(Point::new(w, BAND_Y), Size::new(SCREEN_W, BAND_H)),
                to: Rectangle::new(Point::new(0, BAND_Y), Size::new(SCREEN_W, BAND_H)),
            },
            duration_ms,
            elapsed_ms: 0,
        }
    }

    /// Move the animation forward. Returns whether it is still running.
    pub fn advance(&mut self, elapsed_ms: u32) -> bool {
        self.elapsed_ms = self
            .elapsed_ms
            .saturating_add(elapsed_ms)
            .min(self.duration_ms);
        !self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }

    pub fn light_frame(&self) -> Rectangle {
        self.light.at(self.eased())
    }

    pub fn dark_frame(&self) -> Rectangle {
        self.dark.at(self.eased())
    }

    fn eased(&self) -> i32 {
        if self.is_finished() {
            return FULL;
        }
        let linear = (self.elapsed_ms as u64 * FULL as u64 / self.duration_ms as u64) as i32;
        ease_in_out(linear)
    }
}
