//! Calendar window resolution.
//!
//! Turns a calendar date range, a daily clock window and the weekend-skip
//! flag into the ordered list of active days plus the fixed per-day
//! active duration that the allocator works against.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ScheduleError;

const SECONDS_PER_HOUR: u32 = 3600;
const SECONDS_PER_MINUTE: u32 = 60;

/// A wall-clock time of day with minute precision (`HH:MM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u32,
    minute: u32,
}

impl ClockTime {
    /// Create a clock time, rejecting hours above 23 and minutes above 59.
    pub fn new(hour: u32, minute: u32) -> Result<Self, ScheduleError> {
        if hour > 23 || minute > 59 {
            return Err(ScheduleError::InvalidClockTime(format!("{hour}:{minute}")));
        }
        Ok(Self { hour, minute })
    }

    /// Parse `HH:MM`. Single-digit hours (`9:00`) are accepted.
    pub fn parse(s: &str) -> Result<Self, ScheduleError> {
        let invalid = || ScheduleError::InvalidClockTime(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        if h.is_empty() || m.is_empty() || h.len() > 2 || m.len() > 2 {
            return Err(invalid());
        }
        if !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let hour = h.parse::<u32>().map_err(|_| invalid())?;
        let minute = m.parse::<u32>().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Seconds since local midnight.
    pub fn seconds_from_midnight(&self) -> u32 {
        self.hour * SECONDS_PER_HOUR + self.minute * SECONDS_PER_MINUTE
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// The daily recurring interval `[start, end)` in which items may be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl DayWindow {
    /// Create a day window. The end must be strictly after the start.
    pub fn new(start: ClockTime, end: ClockTime) -> Result<Self, ScheduleError> {
        let window = Self { start, end };
        window.duration_secs()?;
        Ok(window)
    }

    /// Active seconds per day.
    pub fn duration_secs(&self) -> Result<u32, ScheduleError> {
        let start = self.start.seconds_from_midnight();
        let end = self.end.seconds_from_midnight();
        if end <= start {
            return Err(ScheduleError::InvalidTimeRange {
                start: self.start.to_string(),
                end: self.end.to_string(),
            });
        }
        Ok(end - start)
    }

    /// Check whether a time of day lies inside `[start, end)`.
    pub fn contains_time(&self, time: NaiveTime) -> bool {
        let start = NaiveTime::from_num_seconds_from_midnight_opt(self.start.seconds_from_midnight(), 0);
        let end = NaiveTime::from_num_seconds_from_midnight_opt(self.end.seconds_from_midnight(), 0);
        match (start, end) {
            (Some(start), Some(end)) => time >= start && time < end,
            _ => false,
        }
    }
}

/// Ordered active days plus the shared per-day duration.
///
/// Only [`resolve_window`] builds one, so `days` is never empty, is sorted,
/// and `day_duration` is positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveWindow {
    days: Vec<NaiveDate>,
    day_duration: u32,
}

impl ActiveWindow {
    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    /// Seconds per active day.
    pub fn day_duration(&self) -> u32 {
        self.day_duration
    }

    /// Length of the concatenated timeline in seconds.
    pub fn total_duration(&self) -> u64 {
        self.days.len() as u64 * u64::from(self.day_duration)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days.binary_search(&date).is_ok()
    }
}

/// Returns true for Saturday and Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Resolve the calendar and clock window into active days.
///
/// # Errors
/// - [`ScheduleError::InvalidTimeRange`] if `daily_end` is not after `daily_start`
/// - [`ScheduleError::InvalidDateRange`] if `start_date` is after `end_date`
/// - [`ScheduleError::EmptyWindow`] if every date in range was skipped
pub fn resolve_window(
    start_date: NaiveDate,
    end_date: NaiveDate,
    daily_start: ClockTime,
    daily_end: ClockTime,
    skip_weekends: bool,
) -> Result<ActiveWindow, ScheduleError> {
    let day_duration = DayWindow { start: daily_start, end: daily_end }.duration_secs()?;

    if start_date > end_date {
        return Err(ScheduleError::InvalidDateRange {
            start: start_date,
            end: end_date,
        });
    }

    let mut days = Vec::new();
    let mut current = start_date;
    while current <= end_date {
        if !(skip_weekends && is_weekend(current)) {
            days.push(current);
        }
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }

    if days.is_empty() {
        return Err(ScheduleError::EmptyWindow {
            start: start_date,
            end: end_date,
        });
    }

    Ok(ActiveWindow { days, day_duration })
}
