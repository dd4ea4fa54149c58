//! Packed calendar dates.
//!
//! A date is stored as `year << 16 | month << 8 | day`, so ordering the
//! packed integers orders the dates chronologically.

use std::fmt;

use kestrel_common::{KestrelError, KestrelResult, MAX_DATE_YEAR, MIN_DATE_YEAR};

/// A calendar date packed into a `u32`. The zero value is not a valid date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Date(u32);

impl Date {
    /// The invalid zero date.
    pub const ZERO: Self = Self(0);

    /// Creates a date after validating the calendar fields.
    pub fn from_ymd(year: u32, month: u32, day: u32) -> KestrelResult<Self> {
        if !(MIN_DATE_YEAR..=MAX_DATE_YEAR).contains(&year) {
            return Err(KestrelError::invalid_value(format!(
                "year {year} out of range"
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(KestrelError::invalid_value(format!(
                "month {month} out of range"
            )));
        }
        if day == 0 || day > days_in_month(year, month) {
            return Err(KestrelError::invalid_value(format!(
                "day {day} out of range for {year:04}-{month:02}"
            )));
        }
        Ok(Self(year << 16 | month << 8 | day))
    }

    /// Wraps an already packed value without validation.
    pub const fn from_packed(packed: u32) -> Self {
        Self(packed)
    }

    /// Parses `YYYY-MM-DD` (single-digit month and day are accepted).
    pub fn parse(text: &str) -> KestrelResult<Self> {
        let invalid = || KestrelError::invalid_value(format!("'{text}' is not a date"));

        let mut parts = text.trim().splitn(3, '-');
        let mut field = || -> KestrelResult<u32> {
            let part = parts.next().ok_or_else(invalid)?;
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse().map_err(|_| invalid())
        };
        let year = field()?;
        let month = field()?;
        let day = field()?;
        Self::from_ymd(year, month, day)
    }

    /// Returns the packed representation.
    pub const fn packed(self) -> u32 {
        self.0
    }

    /// Year component.
    pub const fn year(self) -> u32 {
        self.0 >> 16
    }

    /// Month component.
    pub const fn month(self) -> u32 {
        (self.0 >> 8) & 0xff
    }

    /// Day component.
    pub const fn day(self) -> u32 {
        self.0 & 0xff
    }

    /// Returns false for the zero date.
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

fn is_leap_year(year: u32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}
