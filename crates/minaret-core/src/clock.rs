//! Wall-clock times as published by prayer-time sources.
//!
//! Sources publish times either in 24-hour `"HH:MM"` form or in 12-hour
//! `"HH:MM AM"`/`"HH:MM PM"` form. [`Clock::parse`] accepts both and
//! normalizes to a 24-hour hour/minute pair. No timezone is attached here;
//! the timezone is supplied separately when an event is built.

use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from parsing a published time value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClockParseError {
    /// The value does not look like `HH:MM` or `HH:MM AM/PM`.
    #[error("malformed time value: {0:?}")]
    Malformed(String),

    /// The hour or minute is outside the valid range for its format.
    #[error("time value out of range: {0:?}")]
    OutOfRange(String),
}

/// A time of day in local civil time, minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Clock {
    /// Hour in 24-hour form (0..=23).
    pub hour: u8,
    /// Minute (0..=59).
    pub minute: u8,
}

impl Clock {
    /// Creates a clock value, returning `None` when out of range.
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    /// Parses a published time value, converting 12-hour forms to 24-hour.
    ///
    /// Accepted inputs:
    /// - `"05:30"`, `"5:30"` — already 24-hour, passed through
    /// - `"09:15 PM"`, `"9:15pm"` — converted (`12 AM` → 00, `12 PM` → 12)
    pub fn parse(value: &str) -> Result<Self, ClockParseError> {
        let trimmed = value.trim();

        let (digits, meridiem) = match split_meridiem(trimmed) {
            Some((rest, m)) => (rest.trim_end(), Some(m)),
            None => (trimmed, None),
        };

        let (hour_part, minute_part) = digits
            .split_once(':')
            .ok_or_else(|| ClockParseError::Malformed(value.to_string()))?;

        let hour: u8 = hour_part
            .trim()
            .parse()
            .map_err(|_| ClockParseError::Malformed(value.to_string()))?;
        let minute: u8 = minute_part
            .trim()
            .parse()
            .map_err(|_| ClockParseError::Malformed(value.to_string()))?;

        if minute > 59 {
            return Err(ClockParseError::OutOfRange(value.to_string()));
        }

        let hour = match meridiem {
            None => {
                if hour > 23 {
                    return Err(ClockParseError::OutOfRange(value.to_string()));
                }
                hour
            }
            Some(m) => {
                if hour == 0 || hour > 12 {
                    return Err(ClockParseError::OutOfRange(value.to_string()));
                }
                match (m, hour) {
                    (Meridiem::Am, 12) => 0,
                    (Meridiem::Am, h) => h,
                    (Meridiem::Pm, 12) => 12,
                    (Meridiem::Pm, h) => h + 12,
                }
            }
        };

        Ok(Self { hour, minute })
    }

    /// Converts to a `chrono` time of day.
    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
            .expect("clock within range")
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

#[derive(Clone, Copy)]
enum Meridiem {
    Am,
    Pm,
}

fn split_meridiem(value: &str) -> Option<(&str, Meridiem)> {
    let lower_tail = value.get(value.len().saturating_sub(2)..)?;
    let meridiem = match lower_tail.to_ascii_lowercase().as_str() {
        "am" => Meridiem::Am,
        "pm" => Meridiem::Pm,
        _ => return None,
    };
    Some((&value[..value.len() - 2], meridiem))
}
