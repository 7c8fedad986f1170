//! Daily accent color selection

use chrono::{Datelike, Weekday};
use defmt_or_log as log;
use rand::{Rng, RngCore};

use crate::palette::PALETTE_LEN;

/// Upper bound on redraws while avoiding yesterday's color
pub const MAX_DRAWS: u32 = 100;

/// Index into the accent palettes, always below [`PALETTE_LEN`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ColorChoice(u8);

impl ColorChoice {
    /// Create a color choice, `None` if the index is outside the palette
    pub fn new(index: u8) -> Option<Self> {
        ((index as usize) < PALETTE_LEN).then_some(Self(index))
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

/// Day of the week, Sunday = 0 through Saturday = 6
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    pub const SUNDAY: Self = Self(0);

    /// Create a day of the week, `None` if the value is above 6
    pub fn new(day: u8) -> Option<Self> {
        (day < 7).then_some(Self(day))
    }

    /// Day of the week of a date
    pub fn of(date: &impl Datelike) -> Self {
        Self::from(date.weekday())
    }

    pub fn number(self) -> u8 {
        self.0
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        Self(weekday.num_days_from_sunday() as u8)
    }
}

/// Color decision carried over from the previous run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PersistedState {
    pub color: ColorChoice,
    pub day: DayOfWeek,
}

/// Choose the accent color for `today`.
///
/// A stored decision from the same day is kept as is. Otherwise a new color
/// is drawn uniformly, redrawing while it matches the stored color. With
/// nothing stored every color is acceptable.
pub fn pick_daily_color<R: RngCore>(
    today: DayOfWeek,
    stored: Option<PersistedState>,
    rng: &mut R,
) -> ColorChoice {
    match stored {
        Some(state) if state.day == today => {
            log::debug!("Keeping color {} for day {}", state.color.0, today.0);
            state.color
        }
        stored => {
            let excluded = stored.map(|state| state.color);
            let choice = draw_excluding(excluded, || {
                ColorChoice(rng.random_range(0..PALETTE_LEN as u8))
            });
            log::info!("Picked color {} for day {}", choice.0, today.0);
            choice
        }
    }
}

/// Call `draw` until it yields something other than `excluded`, accepting the
/// last draw after [`MAX_DRAWS`] attempts.
fn draw_excluding(
    excluded: Option<ColorChoice>,
    mut draw: impl FnMut() -> ColorChoice,
) -> ColorChoice {
    let mut choice = draw();
    if PALETTE_LEN < 2 {
        return choice;
    }
    let mut draws = 1;
    while Some(choice) == excluded && draws < MAX_DRAWS {
        choice = draw();
        draws += 1;
    }
    if Some(choice) == excluded {
        log::warn!("Gave up avoiding color {} after {} draws", choice.0, draws);
    }
    choice
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    fn state(color: u8, day: u8) -> PersistedState {
        PersistedState {
            color: ColorChoice::new(color).unwrap(),
            day: DayOfWeek::new(day).unwrap(),
        }
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(ColorChoice::new(7).is_some());
        assert!(ColorChoice::new(8).is_none());
        assert!(DayOfWeek::new(6).is_some());
        assert!(DayOfWeek::new(7).is_none());
    }

    #[test]
    fn weekday_numbers_start_on_sunday() {
        assert_eq!(DayOfWeek::from(Weekday::Sun).number(), 0);
        assert_eq!(DayOfWeek::from(Weekday::Mon).number(), 1);
        assert_eq!(DayOfWeek::from(Weekday::Sat).number(), 6);
    }

    #[test]
    fn keeps_color_on_same_day() {
        let mut rng = SmallRng::seed_from_u64(1);
        for color in 0..PALETTE_LEN as u8 {
            for day in 0..7 {
                let today = DayOfWeek::new(day).unwrap();
                let picked = pick_daily_color(today, Some(state(color, day)), &mut rng);
                assert_eq!(picked.index(), color);
            }
        }
    }

    #[test]
    fn never_repeats_on_new_day() {
        let mut rng = SmallRng::seed_from_u64(0x5eed);
        for trial in 0..10_000u32 {
            let color = (trial % PALETTE_LEN as u32) as u8;
            let stored = state(color, 2);
            let picked = pick_daily_color(DayOfWeek::new(3).unwrap(), Some(stored), &mut rng);
            assert!((picked.index() as usize) < PALETTE_LEN);
            assert_ne!(picked.index(), color);
        }
    }

    #[test]
    fn first_run_is_roughly_uniform() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut counts = [0u32; PALETTE_LEN];
        for _ in 0..8_000 {
            let picked = pick_daily_color(DayOfWeek::SUNDAY, None, &mut rng);
            counts[picked.index() as usize] += 1;
        }
        for count in counts {
            assert!((800..1200).contains(&count), "skewed counts: {counts:?}");
        }
    }

    #[test]
    fn redraws_are_capped() {
        let stuck = ColorChoice::new(4).unwrap();
        let mut calls = 0;
        let picked = draw_excluding(Some(stuck), || {
            calls += 1;
            stuck
        });
        assert_eq!(picked, stuck);
        assert_eq!(calls, MAX_DRAWS);
    }

    #[test]
    fn no_exclusion_takes_first_draw() {
        let mut calls = 0;
        let picked = draw_excluding(None, || {
            calls += 1;
            ColorChoice::new(0).unwrap()
        });
        assert_eq!(picked.index(), 0);
        assert_eq!(calls, 1);
    }
}
