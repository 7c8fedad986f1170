//! Minute boundary arithmetic for the tick source

use chrono::Timelike;

const MINUTE_US: u64 = 60_000_000;

/// Microseconds from `time` until the minute changes, never zero.
///
/// An instant exactly on `:00` waits a whole minute. During a leap second
/// (`nanosecond() >= 1_000_000_000`) the boundary has already passed, so the
/// shortest wait is returned.
pub fn micros_until_next_minute(time: &impl Timelike) -> u64 {
    let into_minute = time.second() as u64 * 1_000_000 + time.nanosecond() as u64 / 1_000;
    MINUTE_US.saturating_sub(into_minute).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn on_the_minute_waits_a_full_minute() {
        let time = NaiveTime::from_hms_milli_opt(12, 0, 0, 0).unwrap();
        assert_eq!(micros_until_next_minute(&time), 60_000_000);
    }

    #[test]
    fn just_before_the_minute() {
        let time = NaiveTime::from_hms_milli_opt(12, 0, 59, 999).unwrap();
        assert_eq!(micros_until_next_minute(&time), 1_000);
    }

    #[test]
    fn mid_minute() {
        let time = NaiveTime::from_hms_micro_opt(8, 15, 30, 250_000).unwrap();
        assert_eq!(micros_until_next_minute(&time), 29_750_000);
    }

    #[test]
    fn leap_second_waits_the_minimum() {
        let time = NaiveTime::from_hms_milli_opt(23, 59, 59, 1_500).unwrap();
        assert_eq!(time.nanosecond(), 1_500_000_000);
        assert_eq!(micros_until_next_minute(&time), 1);
    }
}
