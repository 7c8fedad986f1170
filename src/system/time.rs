//! Wall clock for PineTime
//!
//! The watch has no battery-backed clock, so the time is a reference point
//! (set from the build time) plus the uptime elapsed since it was taken.

use chrono::{DateTime, NaiveDateTime, TimeDelta};
use embassy_time::{Duration, Instant};
use watchface::clock::micros_until_next_minute;

#[derive(Clone, Copy)]
pub struct TimeReference {
    /// Local clock time
    time: NaiveDateTime,
    /// Related system time
    instant: Instant,
}

impl TimeReference {
    /// Create new time reference from a UTC timestamp and an offset to local time
    pub fn from_timestamp(utc_secs: i64, offset_secs: i32) -> Self {
        let time = DateTime::from_timestamp(utc_secs + offset_secs as i64, 0)
            .map(|time| time.naive_utc())
            .unwrap_or_default();

        Self {
            time,
            instant: Instant::now(),
        }
    }
}

#[derive(Clone, Copy)]
pub struct TimeManager {
    reference: TimeReference,
}

impl TimeManager {
    /// Initialize time measurement on boot
    pub fn init(reference: TimeReference) -> Self {
        defmt::info!("Clock starts at {}", defmt::Display2Format(&reference.time));
        Self { reference }
    }
    /// Get current local time
    pub fn now(&self) -> NaiveDateTime {
        let elapsed = Instant::now().duration_since(self.reference.instant);
        self.reference.time + TimeDelta::microseconds(elapsed.as_micros() as i64)
    }
    /// Time left until the minute changes
    pub fn until_next_minute(&self) -> Duration {
        Duration::from_micros(micros_until_next_minute(&self.now()))
    }
}
