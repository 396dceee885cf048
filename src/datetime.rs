//! Calendar value types and BCD register utilities.
//!
//! This module provides the time and date values exchanged with the driver and
//! the validated conversion between them and the BCD encoded calendar
//! registers.
//!
//! # Features
//!
//! - Range validation that honours the active hour format
//! - Conversion to/from the time (TR) and date (DR) registers
//! - 12-hour / 24-hour conversions
//!
//! # Error Handling
//!
//! Conversion errors are reported via [`DateTimeError`]. The driver itself
//! never surfaces these: an out of range field passed to a setter is ignored.

use crate::registers::{DateReg, HourFormat, Period, TimeReg};

/// Errors raised when a value does not fit the calendar registers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DateTimeError {
    /// A time field is out of range for the hour format
    InvalidTime,
    /// A date field is out of range
    InvalidDate,
}

impl core::fmt::Display for DateTimeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DateTimeError::InvalidTime => write!(f, "time field out of range"),
            DateTimeError::InvalidDate => write!(f, "date field out of range"),
        }
    }
}

/// Helper function to convert a number to BCD format with validation.
///
/// Returns `(ones, tens)`.
pub(crate) fn make_bcd(value: u8, max_value: u8) -> Result<(u8, u8), DateTimeError> {
    if value > max_value {
        return Err(DateTimeError::InvalidTime);
    }
    Ok((value % 10, value / 10))
}

/// Inverse of [`make_bcd`].
pub(crate) fn from_bcd(tens: u8, ones: u8) -> u8 {
    10 * tens + ones
}

/// Wall-clock time of day.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Time {
    /// Hours, 0-23 in 24-hour format or 1-12 in 12-hour format
    pub hours: u8,
    /// Minutes (0-59)
    pub minutes: u8,
    /// Seconds (0-59)
    pub seconds: u8,
    /// Milliseconds (0-999)
    pub subseconds: u16,
    /// AM/PM, always [`Period::Am`] in 24-hour format
    pub period: Period,
}

impl Time {
    /// Creates a 24-hour time without subseconds.
    pub const fn new(hours: u8, minutes: u8, seconds: u8) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            subseconds: 0,
            period: Period::Am,
        }
    }

    /// Creates a 12-hour time.
    pub const fn new_12h(hours: u8, minutes: u8, seconds: u8, period: Period) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            subseconds: 0,
            period,
        }
    }

    /// Returns a copy with the subseconds set.
    #[must_use]
    pub const fn with_subseconds(mut self, subseconds: u16) -> Self {
        self.subseconds = subseconds;
        self
    }

    /// Checks the hours, minutes and seconds against `format`.
    ///
    /// Subseconds are not checked: they are read only on the hardware.
    pub fn is_valid(&self, format: HourFormat) -> bool {
        is_valid_hour(self.hours, format) && self.minutes <= 59 && self.seconds <= 59
    }

    /// Hours converted to 24-hour notation.
    pub fn hours_24(&self, format: HourFormat) -> u8 {
        to_24h(self.hours, self.period, format)
    }

    /// Builds a time from 24-hour fields, converted to `format`.
    pub fn from_24h(hours: u8, minutes: u8, seconds: u8, format: HourFormat) -> Self {
        let (hours, period) = from_24h(hours, format);
        Self::new_12h(hours, minutes, seconds, period)
    }

    pub(crate) fn to_register(self, format: HourFormat) -> Result<TimeReg, DateTimeError> {
        if !self.is_valid(format) {
            return Err(DateTimeError::InvalidTime);
        }
        let (hours, ten_hours) = make_bcd(self.hours, 23)?;
        let (minutes, ten_minutes) = make_bcd(self.minutes, 59)?;
        let (seconds, ten_seconds) = make_bcd(self.seconds, 59)?;

        let mut value = TimeReg::default();
        value.set_ten_hours(ten_hours);
        value.set_hours(hours);
        value.set_ten_minutes(ten_minutes);
        value.set_minutes(minutes);
        value.set_ten_seconds(ten_seconds);
        value.set_seconds(seconds);
        value.set_period(match format {
            HourFormat::TwentyFourHour => Period::Am,
            HourFormat::TwelveHour => self.period,
        });
        Ok(value)
    }

    pub(crate) fn from_register(reg: TimeReg) -> Self {
        Self {
            hours: from_bcd(reg.ten_hours(), reg.hours()),
            minutes: from_bcd(reg.ten_minutes(), reg.minutes()),
            seconds: from_bcd(reg.ten_seconds(), reg.seconds()),
            subseconds: 0,
            period: reg.period(),
        }
    }
}

/// Calendar date with a two digit year.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Date {
    /// Year within the century (0-99)
    pub year: u8,
    /// Month (1-12)
    pub month: u8,
    /// Day of month (1-31)
    pub day: u8,
    /// Day of week (1-7, Monday is 1)
    pub weekday: u8,
}

impl Default for Date {
    /// Saturday 1 January 2001, the date programmed on first initialization.
    fn default() -> Self {
        Self::new(1, 1, 1, 6)
    }
}

impl Date {
    /// Creates a date from its fields.
    pub const fn new(year: u8, month: u8, day: u8, weekday: u8) -> Self {
        Self {
            year,
            month,
            day,
            weekday,
        }
    }

    /// Checks every field against its range.
    pub fn is_valid(&self) -> bool {
        self.year <= 99
            && (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && (1..=7).contains(&self.weekday)
    }

    pub(crate) fn to_register(self) -> Result<DateReg, DateTimeError> {
        if !self.is_valid() {
            return Err(DateTimeError::InvalidDate);
        }
        let (year, ten_year) = make_bcd(self.year, 99).map_err(|_| DateTimeError::InvalidDate)?;
        let (month, ten_month) =
            make_bcd(self.month, 12).map_err(|_| DateTimeError::InvalidDate)?;
        let (day, ten_day) = make_bcd(self.day, 31).map_err(|_| DateTimeError::InvalidDate)?;

        let mut value = DateReg::default();
        value.set_ten_year(ten_year);
        value.set_year(year);
        value.set_weekday(self.weekday);
        value.set_ten_month(ten_month);
        value.set_month(month);
        value.set_ten_day(ten_day);
        value.set_day(day);
        Ok(value)
    }

    pub(crate) fn from_register(reg: DateReg) -> Self {
        Self {
            year: from_bcd(reg.ten_year(), reg.year()),
            month: from_bcd(reg.ten_month(), reg.month()),
            day: from_bcd(reg.ten_day(), reg.day()),
            weekday: reg.weekday(),
        }
    }
}

/// Checks an hour value against the hour format.
pub fn is_valid_hour(hours: u8, format: HourFormat) -> bool {
    match format {
        HourFormat::TwentyFourHour => hours <= 23,
        HourFormat::TwelveHour => (1..=12).contains(&hours),
    }
}

/// Converts an hour in `format` to 24-hour notation.
pub fn to_24h(hours: u8, period: Period, format: HourFormat) -> u8 {
    match format {
        HourFormat::TwentyFourHour => hours,
        HourFormat::TwelveHour => match period {
            Period::Am => hours % 12,
            Period::Pm => hours % 12 + 12,
        },
    }
}

/// Converts a 24-hour value to `format`, returning the hour and period.
pub fn from_24h(hours: u8, format: HourFormat) -> (u8, Period) {
    match format {
        HourFormat::TwentyFourHour => (hours, Period::Am),
        HourFormat::TwelveHour => match hours {
            0 => (12, Period::Am),             // 12 AM
            1..=11 => (hours, Period::Am),     // 1-11 AM
            12 => (12, Period::Pm),            // 12 PM
            _ => (hours - 12, Period::Pm),     // 1-11 PM
        },
    }
}
