//! Time and date labels

use core::fmt::Write;

use chrono::{Datelike, Timelike};
use heapless::String;

use crate::picker::DayOfWeek;

/// Time label, `HH:MM`
pub type TimeText = String<5>;
/// Date label, e.g. `THURS, SEPT 30`
pub type DateText = String<16>;

const WEEKDAYS: [&str; 7] = ["SUN", "MON", "TUES", "WED", "THURS", "FRI", "SAT"];
const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUNE", "JULY", "AUG", "SEPT", "OCT", "NOV", "DEC",
];

/// Clock format preference
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockStyle {
    #[default]
    TwentyFourHour,
    TwelveHour,
}

pub fn weekday_abbrev(day: DayOfWeek) -> &'static str {
    WEEKDAYS[day.number() as usize]
}

/// Abbreviation for a zero-based month
pub fn month_abbrev(month0: u32) -> &'static str {
    MONTHS[month0 as usize % MONTHS.len()]
}

/// Format hours and minutes, both zero-padded
pub fn format_time(time: &impl Timelike, style: ClockStyle) -> TimeText {
    let hour = match style {
        ClockStyle::TwentyFourHour => time.hour(),
        ClockStyle::TwelveHour => time.hour12().1,
    };
    let mut text = TimeText::new();
    let written = write!(text, "{:02}:{:02}", hour, time.minute());
    debug_assert!(written.is_ok(), "both fields are at most two digits");
    text
}

/// Format as `<DOW>, <MON> <DAY>` with no leading zero on the day
pub fn format_date(date: &impl Datelike) -> DateText {
    let mut text = DateText::new();
    let written = write!(
        text,
        "{}, {} {}",
        weekday_abbrev(DayOfWeek::of(date)),
        month_abbrev(date.month0()),
        date.day()
    );
    debug_assert!(written.is_ok(), "the longest label, THURS, SEPT 30, fits");
    text
}
