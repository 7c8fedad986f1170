//! Watch face state and drawing
//!
//! [`AccentFace`] is driven through three entry points: [`AccentFace::on_start`]
//! when the face is shown, [`AccentFace::on_minute_tick`] once a minute and
//! [`AccentFace::on_stop`] when it is torn down.

use chrono::{Datelike, Timelike};
use defmt_or_log as log;
use embedded_graphics::{
    geometry::{Point, Size},
    mono_font::{iso_8859_1::FONT_10X20, MonoTextStyle},
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use profont::PROFONT_24_POINT;
use rand::RngCore;

use crate::{
    animation::{SlideAnimation, SLIDE_DURATION_MS},
    format::{format_date, format_time, ClockStyle, DateText, TimeText},
    palette::{AccentPair, BACKGROUND, TEXT},
    persist::KeyValueStore,
    picker::{pick_daily_color, ColorChoice, DayOfWeek, PersistedState},
    SCREEN_H, SCREEN_W,
};

const TIME_POS: Point = Point::new(SCREEN_W as i32 / 2, 104);
const DATE_POS: Point = Point::new(SCREEN_W as i32 / 2, 148);

/// Face settings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceConfig {
    pub clock_style: ClockStyle,
    /// Length of the panel slide on start
    pub slide_duration_ms: u32,
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            clock_style: ClockStyle::default(),
            slide_duration_ms: SLIDE_DURATION_MS,
        }
    }
}

/// What a minute tick changed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickOutcome {
    /// The day rolled over and a new color was picked
    pub recolored: bool,
}

/// State of the running watch face
pub struct AccentFace<R: RngCore> {
    rng: R,
    clock_style: ClockStyle,
    color: ColorChoice,
    day: DayOfWeek,
    time_text: TimeText,
    date_text: DateText,
    slide: SlideAnimation,
}

impl<R: RngCore> AccentFace<R> {
    /// Show the face: format the labels, pick today's color and start the
    /// panel slide
    pub fn on_start<S, T>(
        config: FaceConfig,
        mut rng: R,
        now: &T,
        store: &mut S,
    ) -> Result<Self, S::Error>
    where
        S: KeyValueStore,
        T: Datelike + Timelike,
    {
        let today = DayOfWeek::of(now);
        let stored = PersistedState::load(store)?;
        let color = pick_daily_color(today, stored, &mut rng);
        log::info!("Face started with color {}", color.index());

        Ok(Self {
            rng,
            clock_style: config.clock_style,
            color,
            day: today,
            time_text: format_time(now, config.clock_style),
            date_text: format_date(now),
            slide: SlideAnimation::new(config.slide_duration_ms),
        })
    }

    /// Refresh the time and, when the day changed since the last color
    /// decision, pick a new color and refresh the date
    pub fn on_minute_tick<T>(&mut self, now: &T) -> TickOutcome
    where
        T: Datelike + Timelike,
    {
        self.time_text = format_time(now, self.clock_style);

        let today = DayOfWeek::of(now);
        if today == self.day {
            return TickOutcome { recolored: false };
        }

        log::info!("Day changed from {} to {}", self.day.number(), today.number());
        let previous = PersistedState {
            color: self.color,
            day: self.day,
        };
        self.color = pick_daily_color(today, Some(previous), &mut self.rng);
        self.day = today;
        self.date_text = format_date(now);
        TickOutcome { recolored: true }
    }

    /// Store the current decision for the next start
    pub fn on_stop<S: KeyValueStore>(&self, store: &mut S) -> Result<(), S::Error> {
        log::info!("Storing color {} for day {}", self.color.index(), self.day.number());
        PersistedState {
            color: self.color,
            day: self.day,
        }
        .save(store)
    }

    pub fn color(&self) -> ColorChoice {
        self.color
    }

    pub fn day(&self) -> DayOfWeek {
        self.day
    }

    pub fn accent(&self) -> AccentPair {
        AccentPair::for_choice(self.color)
    }

    pub fn time_text(&self) -> &str {
        &self.time_text
    }

    pub fn date_text(&self) -> &str {
        &self.date_text
    }

    /// Step the panel slide. Returns whether it is still running.
    pub fn advance_animation(&mut self, elapsed_ms: u32) -> bool {
        self.slide.advance(elapsed_ms)
    }

    pub fn is_animating(&self) -> bool {
        !self.slide.is_finished()
    }

    /// Draw the whole face
    pub fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let screen = Rectangle::new(Point::zero(), Size::new(SCREEN_W, SCREEN_H));
        let accent = self.accent();
        let light = self.slide.light_frame();

        // Whatever the light panel does not cover yet
        let covered_to = (light.top_left.x + light.size.width as i32).max(0);
        Rectangle::new(
            Point::new(covered_to, 0),
            Size::new(SCREEN_W.saturating_sub(covered_to as u32), SCREEN_H),
        )
        .intersection(&screen)
        .into_styled(PrimitiveStyle::with_fill(BACKGROUND))
        .draw(target)?;

        light
            .intersection(&screen)
            .into_styled(PrimitiveStyle::with_fill(accent.light))
            .draw(target)?;
        self.slide
            .dark_frame()
            .intersection(&screen)
            .into_styled(PrimitiveStyle::with_fill(accent.dark))
            .draw(target)?;

        let centered = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Middle)
            .build();
        Text::with_text_style(
            &self.time_text,
            TIME_POS,
            MonoTextStyle::new(&PROFONT_24_POINT, TEXT),
            centered,
        )
        .draw(target)?;
        Text::with_text_style(
            &self.date_text,
            DATE_POS,
            MonoTextStyle::new(&FONT_10X20, TEXT),
            centered,
        )
        .draw(target)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        animation::BAND_Y,
        persist::{MemoryStore, COLOR_KEY, DAY_KEY},
    };
    use chrono::{NaiveDate, NaiveDateTime};
    use core::convert::Infallible;
    use rand::{rngs::SmallRng, SeedableRng};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn start(now: &NaiveDateTime, store: &mut MemoryStore, seed: u64) -> AccentFace<SmallRng> {
        AccentFace::on_start(
            FaceConfig::default(),
            SmallRng::seed_from_u64(seed),
            now,
            store,
        )
        .unwrap()
    }

    struct Framebuffer {
        pixels: Vec<Rgb565>,
    }

    impl Framebuffer {
        fn new() -> Self {
            Self {
                pixels: vec![Rgb565::new(1, 2, 3); (SCREEN_W * SCREEN_H) as usize],
            }
        }

        fn at(&self, x: u32, y: u32) -> Rgb565 {
            self.pixels[(y * SCREEN_W + x) as usize]
        }
    }

    impl OriginDimensions for Framebuffer {
        fn size(&self) -> Size {
            Size::new(SCREEN_W, SCREEN_H)
        }
    }

    impl DrawTarget for Framebuffer {
        type Color = Rgb565;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(point, color) in pixels {
                if (0..SCREEN_W as i32).contains(&point.x) && (0..SCREEN_H as i32).contains(&point.y)
                {
                    self.pixels[(point.y as u32 * SCREEN_W + point.x as u32) as usize] = color;
                }
            }
            Ok(())
        }
    }

    #[test]
    fn start_formats_labels() {
        let mut store = MemoryStore::new();
        let face = start(&at(2024, 1, 1, 13, 5), &mut store, 7);
        assert_eq!(face.time_text(), "13:05");
        assert_eq!(face.date_text(), "MON, JAN 1");
        assert_eq!(face.day().number(), 1);
        assert!(face.is_animating());
    }

    #[test]
    fn twelve_hour_config_is_used() {
        let mut store = MemoryStore::new();
        let config = FaceConfig {
            clock_style: ClockStyle::TwelveHour,
            ..FaceConfig::default()
        };
        let now = at(2024, 1, 1, 13, 5);
        let mut face =
            AccentFace::on_start(config, SmallRng::seed_from_u64(1), &now, &mut store).unwrap();
        assert_eq!(face.time_text(), "01:05");
        face.on_minute_tick(&at(2024, 1, 1, 14, 0));
        assert_eq!(face.time_text(), "02:00");
    }

    #[test]
    fn restart_on_same_day_keeps_color() {
        let mut store = MemoryStore::new();
        let face = start(&at(2024, 3, 5, 8, 0), &mut store, 1);
        face.on_stop(&mut store).unwrap();

        for seed in 2..20 {
            let again = start(&at(2024, 3, 5, 21, 30), &mut store, seed);
            assert_eq!(again.color(), face.color());
        }
    }

    #[test]
    fn restart_on_next_day_changes_color() {
        let mut store = MemoryStore::new();
        let face = start(&at(2024, 3, 5, 8, 0), &mut store, 1);
        face.on_stop(&mut store).unwrap();

        for seed in 2..50 {
            let next = start(&at(2024, 3, 6, 8, 0), &mut store, seed);
            assert_ne!(next.color(), face.color());
        }
    }

    #[test]
    fn stop_writes_color_and_day() {
        let mut store = MemoryStore::new();
        let face = start(&at(2024, 12, 25, 9, 0), &mut store, 3);
        face.on_stop(&mut store).unwrap();
        assert_eq!(
            store.read_int(COLOR_KEY),
            Ok(Some(face.color().index() as i32))
        );
        assert_eq!(store.read_int(DAY_KEY), Ok(Some(3)));
    }

    #[test]
    fn ticks_within_a_day_keep_color() {
        let mut store = MemoryStore::new();
        let mut face = start(&at(2024, 1, 1, 10, 0), &mut store, 9);
        let color = face.color();

        let outcome = face.on_minute_tick(&at(2024, 1, 1, 10, 1));
        assert!(!outcome.recolored);
        let outcome = face.on_minute_tick(&at(2024, 1, 1, 10, 2));
        assert!(!outcome.recolored);
        assert_eq!(face.color(), color);
        assert_eq!(face.time_text(), "10:02");
    }

    #[test]
    fn day_rollover_recolors_once() {
        let mut store = MemoryStore::new();
        let mut face = start(&at(2024, 1, 1, 23, 59), &mut store, 11);
        let monday = face.color();

        let outcome = face.on_minute_tick(&at(2024, 1, 2, 0, 0));
        assert!(outcome.recolored);
        let tuesday = face.color();
        assert_ne!(tuesday, monday);
        assert_eq!(face.date_text(), "TUES, JAN 2");
        assert_eq!(face.time_text(), "00:00");

        let outcome = face.on_minute_tick(&at(2024, 1, 2, 0, 1));
        assert!(!outcome.recolored);
        assert_eq!(face.color(), tuesday);
    }

    #[test]
    fn draws_panels_after_slide() {
        let mut store = MemoryStore::new();
        let mut face = start(&at(2024, 1, 1, 10, 0), &mut store, 5);
        while face.advance_animation(33) {}

        let mut fb = Framebuffer::new();
        face.draw(&mut fb).unwrap();
        let accent = face.accent();
        assert_eq!(fb.at(5, 5), accent.light);
        assert_eq!(fb.at(5, 235), accent.light);
        assert_eq!(fb.at(2, BAND_Y as u32 + 2), accent.dark);
        assert!(fb.pixels.iter().any(|&pixel| pixel == TEXT));
    }

    #[test]
    fn draws_background_before_slide() {
        let mut store = MemoryStore::new();
        let face = start(&at(2024, 1, 1, 10, 0), &mut store, 5);

        let mut fb = Framebuffer::new();
        face.draw(&mut fb).unwrap();
        assert_eq!(fb.at(5, 5), BACKGROUND);
        assert_eq!(fb.at(235, 235), BACKGROUND);
    }
}
