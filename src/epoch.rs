//! Conversion between calendar fields and Unix timestamps.
//!
//! The calendar only stores a two digit year, interpreted as 2000-2099. All
//! conversions are UTC. Timestamps outside the representable range are
//! clamped: anything before 2000-01-01T00:00:00Z maps to that instant, anything
//! after 2099-12-31T23:59:59Z maps to that instant.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Timelike};

use crate::{
    datetime::{Date, Time},
    registers::HourFormat,
};

/// Unix timestamp of 2000-01-01T00:00:00Z.
pub const EPOCH_Y2K_OFFSET: u32 = 946_684_800;
/// Unix timestamp of 2099-12-31T23:59:59Z.
pub const EPOCH_MAX: u32 = 4_102_444_799;

/// Converts calendar fields to a Unix timestamp.
///
/// 12-hour times are converted to 24-hour first. A day past the end of the
/// month rolls into the next month.
pub fn to_epoch(date: &Date, time: &Time, format: HourFormat) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(2000 + i32::from(date.year), u32::from(date.month), 1)
    else {
        return EPOCH_Y2K_OFFSET;
    };
    let day = first
        .checked_add_days(Days::new(u64::from(date.day.saturating_sub(1))))
        .unwrap_or(first);
    let time_of_day = NaiveTime::from_hms_opt(
        u32::from(time.hours_24(format)),
        u32::from(time.minutes),
        u32::from(time.seconds),
    )
    .unwrap_or_default();

    let timestamp = day.and_time(time_of_day).and_utc().timestamp();
    u32::try_from(timestamp)
        .unwrap_or(EPOCH_MAX)
        .clamp(EPOCH_Y2K_OFFSET, EPOCH_MAX)
}

/// Converts a Unix timestamp to calendar fields in `format`.
pub fn from_epoch(timestamp: u32, format: HourFormat) -> (Date, Time) {
    let timestamp = timestamp.clamp(EPOCH_Y2K_OFFSET, EPOCH_MAX);
    let datetime = DateTime::from_timestamp(i64::from(timestamp), 0)
        .map(|dt| dt.naive_utc())
        .unwrap_or_default();

    let date = Date::new(
        u8::try_from(datetime.year() - 2000).unwrap_or(0),
        datetime.month() as u8,
        datetime.day() as u8,
        datetime.weekday().number_from_monday() as u8,
    );
    let time = Time::from_24h(
        datetime.hour() as u8,
        datetime.minute() as u8,
        datetime.second() as u8,
        format,
    );
    (date, time)
}

/// Converts calendar fields to seconds since 2000-01-01T00:00:00Z.
pub fn to_y2k_epoch(date: &Date, time: &Time, format: HourFormat) -> u32 {
    to_epoch(date, time, format) - EPOCH_Y2K_OFFSET
}

/// Converts seconds since 2000-01-01T00:00:00Z to calendar fields.
pub fn from_y2k_epoch(timestamp: u32, format: HourFormat) -> (Date, Time) {
    from_epoch(timestamp.saturating_add(EPOCH_Y2K_OFFSET), format)
}

/// Day of week (Monday is 1) of a calendar date, `None` for an invalid date.
pub(crate) fn weekday(year: u8, month: u8, day: u8) -> Option<u8> {
    NaiveDate::from_ymd_opt(2000 + i32::from(year), u32::from(month), u32::from(day))
        .map(|date| date.weekday().number_from_monday() as u8)
}

/// Moves `date` forward by `days`, the year wraps within the century.
///
/// An invalid date is returned unchanged.
pub(crate) fn add_days(date: &Date, days: u32) -> Date {
    let Some(next) = NaiveDate::from_ymd_opt(
        2000 + i32::from(date.year),
        u32::from(date.month),
        u32::from(date.day),
    )
    .and_then(|d| d.checked_add_days(Days::new(u64::from(days)))) else {
        return *date;
    };
    // The weekday follows the wrapped year, 2100 reads back as 2000.
    let year = (next.year() - 2000).rem_euclid(100) as u8;
    let (month, day) = (next.month() as u8, next.day() as u8);
    let weekday = weekday(year, month, day)
        .unwrap_or_else(|| next.weekday().number_from_monday() as u8);
    Date::new(year, month, day, weekday)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::Period;

    #[test]
    fn test_known_instant() {
        // 2023-06-15T10:30:00Z, a Thursday
        let (date, time) = from_epoch(1_686_825_000, HourFormat::TwentyFourHour);
        assert_eq!(date, Date::new(23, 6, 15, 4));
        assert_eq!(time, Time::new(10, 30, 0));
        assert_eq!(
            to_epoch(&date, &time, HourFormat::TwentyFourHour),
            1_686_825_000
        );
    }

    #[test]
    fn test_round_trip_over_range() {
        let mut ts = EPOCH_Y2K_OFFSET;
        while ts < EPOCH_MAX - 7_777_777 {
            let (date, time) = from_epoch(ts, HourFormat::TwentyFourHour);
            assert!(date.is_valid());
            assert_eq!(to_epoch(&date, &time, HourFormat::TwentyFourHour), ts);
            ts += 7_777_777;
        }
    }

    #[test]
    fn test_clamping() {
        let (date, time) = from_epoch(0, HourFormat::TwentyFourHour);
        assert_eq!(date, Date::new(0, 1, 1, 6));
        assert_eq!(time, Time::new(0, 0, 0));

        let (date, time) = from_epoch(u32::MAX, HourFormat::TwentyFourHour);
        assert_eq!(date, Date::new(99, 12, 31, 4));
        assert_eq!(time, Time::new(23, 59, 59));
        assert_eq!(to_epoch(&date, &time, HourFormat::TwentyFourHour), EPOCH_MAX);
    }

    #[test]
    fn test_y2k_offset() {
        let date = Date::new(23, 6, 15, 4);
        let time = Time::new(10, 30, 0);
        assert_eq!(
            to_epoch(&date, &time, HourFormat::TwentyFourHour)
                - to_y2k_epoch(&date, &time, HourFormat::TwentyFourHour),
            EPOCH_Y2K_OFFSET
        );
        assert_eq!(
            from_y2k_epoch(0, HourFormat::TwentyFourHour),
            from_epoch(EPOCH_Y2K_OFFSET, HourFormat::TwentyFourHour)
        );
    }

    #[test]
    fn test_twelve_hour_conversion() {
        let (date, time) = from_epoch(1_686_825_000 + 4 * 3600, HourFormat::TwelveHour);
        assert_eq!(time, Time::new_12h(2, 30, 0, Period::Pm));
        assert_eq!(
            to_epoch(&date, &time, HourFormat::TwelveHour),
            1_686_825_000 + 4 * 3600
        );

        let midnight = Time::new_12h(12, 0, 0, Period::Am);
        assert_eq!(
            to_epoch(&date, &midnight, HourFormat::TwelveHour),
            1_686_787_200
        );
    }

    #[test]
    fn test_weekday_is_monday_based() {
        // 2024-01-07 is a Sunday, 2024-01-08 a Monday
        let (sunday, _) = from_epoch(1_704_585_600, HourFormat::TwentyFourHour);
        assert_eq!(sunday.weekday, 7);
        let (monday, _) = from_epoch(1_704_672_000, HourFormat::TwentyFourHour);
        assert_eq!(monday.weekday, 1);
    }

    #[test]
    fn test_day_overflow_rolls_forward() {
        let feb_30 = Date::new(23, 2, 30, 1);
        let mar_2 = Date::new(23, 3, 2, 4);
        let time = Time::new(0, 0, 0);
        assert_eq!(
            to_epoch(&feb_30, &time, HourFormat::TwentyFourHour),
            to_epoch(&mar_2, &time, HourFormat::TwentyFourHour)
        );
    }

    #[test]
    fn test_add_days() {
        assert_eq!(add_days(&Date::new(23, 6, 15, 4), 1), Date::new(23, 6, 16, 5));
        assert_eq!(add_days(&Date::new(24, 2, 28, 3), 1), Date::new(24, 2, 29, 4));
        assert_eq!(add_days(&Date::new(23, 12, 31, 7), 2), Date::new(24, 1, 2, 2));
        // 2099-12-31 wraps to 2000-01-01, a Saturday.
        assert_eq!(add_days(&Date::new(99, 12, 31, 4), 1), Date::new(0, 1, 1, 6));
        assert_eq!(add_days(&Date::new(23, 2, 30, 1), 1), Date::new(23, 2, 30, 1));
    }

    #[test]
    fn test_weekday() {
        assert_eq!(weekday(23, 6, 15), Some(4));
        assert_eq!(weekday(1, 1, 1), Some(1));
        assert_eq!(weekday(24, 1, 7), Some(7));
        assert_eq!(weekday(23, 2, 29), None);
    }
}
