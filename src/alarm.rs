//! Alarm configuration for the RTC.
//!
//! An [`Alarm`] holds the day, time and sub second values to compare against
//! the calendar together with an [`AlarmMask`] naming the fields that take
//! part in the comparison.
//!
//! # Mask polarity
//!
//! [`AlarmMask`] bits name the fields that must MATCH. The hardware mask bits
//! (MSK1..MSK4) name the fields that are IGNORED. The translation between the
//! two happens here and nowhere else.
//!
//! # Common masks
//!
//! - [`AlarmMask::MATCH_SS`] - every minute at the given second
//! - [`AlarmMask::MATCH_MMSS`] - every hour at the given minute and second
//! - [`AlarmMask::MATCH_HHMMSS`] - every day at the given time
//! - [`AlarmMask::MATCH_DHHMMSS`] - every month at the given day and time
//!
//! Month and year bits are accepted but have no effect: the hardware cannot
//! compare them.

use core::ops::{BitOr, BitOrAssign};

use crate::{
    datetime::{from_bcd, is_valid_hour, make_bcd, DateTimeError},
    prescaler::Prescaler,
    registers::{AlarmReg, AlarmSubsecondReg, DaySelect, HourFormat, Period},
};

/// Hardware alarm identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmId {
    /// Alarm A, present on every family
    A = 0,
    /// Alarm B, calendar RTC only
    B = 1,
}

impl AlarmId {
    /// Every alarm identifier.
    pub const ALL: [AlarmId; 2] = [AlarmId::A, AlarmId::B];

    /// Index into per-alarm tables.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Set of calendar fields an alarm compares.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmMask(u8);

impl AlarmMask {
    /// Alarm disabled
    pub const OFF: Self = Self(0);
    /// Match seconds
    pub const SECONDS: Self = Self(1);
    /// Match minutes
    pub const MINUTES: Self = Self(2);
    /// Match hours (and AM/PM)
    pub const HOURS: Self = Self(4);
    /// Match day of month
    pub const DAY: Self = Self(8);
    /// Match month, no hardware effect
    pub const MONTH: Self = Self(16);
    /// Match year, no hardware effect
    pub const YEAR: Self = Self(32);
    /// Every field
    pub const ALL: Self = Self(0xFF);

    /// Every minute.
    pub const MATCH_SS: Self = Self::SECONDS;
    /// Every hour.
    pub const MATCH_MMSS: Self = Self(Self::SECONDS.0 | Self::MINUTES.0);
    /// Every day.
    pub const MATCH_HHMMSS: Self = Self(Self::MATCH_MMSS.0 | Self::HOURS.0);
    /// Every month.
    pub const MATCH_DHHMMSS: Self = Self(Self::MATCH_HHMMSS.0 | Self::DAY.0);

    /// Creates a mask from raw bits.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw bits.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no bit is set.
    pub const fn is_off(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for AlarmMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for AlarmMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Sub second value meaning "do not compare sub seconds".
pub const SUBSECONDS_IGNORED: u16 = 1000;

/// Alarm settings.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Alarm {
    /// Day of month (1-31), 0 until first configured
    pub day: u8,
    /// Hours in the active hour format
    pub hours: u8,
    /// Minutes (0-59)
    pub minutes: u8,
    /// Seconds (0-59)
    pub seconds: u8,
    /// Milliseconds (0-999), [`SUBSECONDS_IGNORED`] or more to skip the comparison
    pub subseconds: u16,
    /// AM/PM in 12-hour format
    pub period: Period,
    /// Fields to match
    pub mask: AlarmMask,
}

impl Alarm {
    /// Creates a 24-hour alarm without sub second matching.
    pub const fn new(day: u8, hours: u8, minutes: u8, seconds: u8, mask: AlarmMask) -> Self {
        Self {
            day,
            hours,
            minutes,
            seconds,
            subseconds: SUBSECONDS_IGNORED,
            period: Period::Am,
            mask,
        }
    }

    /// Returns a copy with the sub second comparator set.
    #[must_use]
    pub const fn with_subseconds(mut self, subseconds: u16) -> Self {
        self.subseconds = subseconds;
        self
    }

    /// Returns a copy with the period set.
    #[must_use]
    pub const fn with_period(mut self, period: Period) -> Self {
        self.period = period;
        self
    }

    /// Checks day, hours, minutes and seconds against `format`.
    pub fn is_valid(&self, format: HourFormat) -> bool {
        (1..=31).contains(&self.day)
            && is_valid_hour(self.hours, format)
            && self.minutes <= 59
            && self.seconds <= 59
    }

    /// Encodes the alarm into the alarm and alarm sub second registers.
    pub(crate) fn to_registers<P: Prescaler>(
        &self,
        format: HourFormat,
        prescaler: &P,
    ) -> Result<(AlarmReg, AlarmSubsecondReg), DateTimeError> {
        if !self.is_valid(format) {
            return Err(DateTimeError::InvalidTime);
        }
        let (day, ten_day) = make_bcd(self.day, 31)?;
        let (hours, ten_hours) = make_bcd(self.hours, 23)?;
        let (minutes, ten_minutes) = make_bcd(self.minutes, 59)?;
        let (seconds, ten_seconds) = make_bcd(self.seconds, 59)?;

        let mut reg = AlarmReg::default();
        reg.set_day_select(DaySelect::Date);
        reg.set_ten_day(ten_day);
        reg.set_day(day);
        reg.set_ten_hours(ten_hours);
        reg.set_hours(hours);
        reg.set_period(match format {
            HourFormat::TwentyFourHour => Period::Am,
            HourFormat::TwelveHour => self.period,
        });
        reg.set_ten_minutes(ten_minutes);
        reg.set_minutes(minutes);
        reg.set_ten_seconds(ten_seconds);
        reg.set_seconds(seconds);

        // Hardware mask bits ignore a field, the caller's bits require it.
        let mask = self.mask;
        let ignore_all = mask.is_off();
        reg.set_mask_seconds(ignore_all || !mask.contains(AlarmMask::SECONDS));
        reg.set_mask_minutes(ignore_all || !mask.contains(AlarmMask::MINUTES));
        reg.set_mask_hours(ignore_all || !mask.contains(AlarmMask::HOURS));
        reg.set_mask_day(ignore_all || !mask.contains(AlarmMask::DAY));

        let mut ss = AlarmSubsecondReg::default();
        if self.subseconds < SUBSECONDS_IGNORED {
            ss.set_mask(prescaler.subsecond_bits());
            ss.set_subsecond(
                u16::try_from(prescaler.millis_to_ticks(self.subseconds)).unwrap_or(0),
            );
        }

        Ok((reg, ss))
    }

    /// Decodes the alarm registers.
    pub(crate) fn from_registers<P: Prescaler>(
        reg: AlarmReg,
        ss: AlarmSubsecondReg,
        prescaler: &P,
    ) -> Self {
        let mut mask = AlarmMask::OFF;
        if !reg.mask_seconds() {
            mask |= AlarmMask::SECONDS;
        }
        if !reg.mask_minutes() {
            mask |= AlarmMask::MINUTES;
        }
        if !reg.mask_hours() {
            mask |= AlarmMask::HOURS;
        }
        if !reg.mask_day() {
            mask |= AlarmMask::DAY;
        }

        let subseconds = if ss.mask() == 0 {
            SUBSECONDS_IGNORED
        } else {
            prescaler.ticks_to_millis(u32::from(ss.subsecond()))
        };

        Self {
            day: from_bcd(reg.ten_day(), reg.day()),
            hours: from_bcd(reg.ten_hours(), reg.hours()),
            minutes: from_bcd(reg.ten_minutes(), reg.minutes()),
            seconds: from_bcd(reg.ten_seconds(), reg.seconds()),
            subseconds,
            period: reg.period(),
            mask,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prescaler::SplitPrescaler;

    const LSE: SplitPrescaler = SplitPrescaler::new(127, 255);

    #[test]
    fn test_mask_combinations() {
        assert_eq!(AlarmMask::MATCH_SS.bits(), 1);
        assert_eq!(AlarmMask::MATCH_MMSS.bits(), 3);
        assert_eq!(AlarmMask::MATCH_HHMMSS.bits(), 7);
        assert_eq!(AlarmMask::MATCH_DHHMMSS.bits(), 15);
        assert_eq!(
            AlarmMask::SECONDS | AlarmMask::MINUTES | AlarmMask::HOURS,
            AlarmMask::MATCH_HHMMSS
        );
        assert!(AlarmMask::ALL.contains(AlarmMask::YEAR));
        assert!(!AlarmMask::MATCH_MMSS.contains(AlarmMask::HOURS));
        assert!(AlarmMask::OFF.is_off());
    }

    #[test]
    fn test_mask_polarity_minutes_seconds() {
        let alarm = Alarm::new(1, 0, 30, 15, AlarmMask::SECONDS | AlarmMask::MINUTES);
        let (reg, _) = alarm.to_registers(HourFormat::TwentyFourHour, &LSE).unwrap();
        assert!(!reg.mask_seconds());
        assert!(!reg.mask_minutes());
        assert!(reg.mask_hours());
        assert!(reg.mask_day());
    }

    #[test]
    fn test_mask_off_ignores_everything() {
        let alarm = Alarm::new(1, 0, 0, 0, AlarmMask::OFF);
        let (reg, _) = alarm.to_registers(HourFormat::TwentyFourHour, &LSE).unwrap();
        assert!(reg.mask_seconds() && reg.mask_minutes() && reg.mask_hours() && reg.mask_day());
    }

    #[test]
    fn test_month_and_year_have_no_effect() {
        let plain = Alarm::new(5, 1, 2, 3, AlarmMask::MATCH_DHHMMSS);
        let extended = Alarm::new(
            5,
            1,
            2,
            3,
            AlarmMask::MATCH_DHHMMSS | AlarmMask::MONTH | AlarmMask::YEAR,
        );
        assert_eq!(
            plain.to_registers(HourFormat::TwentyFourHour, &LSE).unwrap(),
            extended.to_registers(HourFormat::TwentyFourHour, &LSE).unwrap()
        );
    }

    #[test]
    fn test_register_encoding() {
        let alarm = Alarm::new(15, 10, 30, 0, AlarmMask::MATCH_DHHMMSS);
        let (reg, ss) = alarm.to_registers(HourFormat::TwentyFourHour, &LSE).unwrap();
        assert_eq!(u32::from(reg), 0x1510_3000);
        assert_eq!(ss.mask(), 0);
        assert_eq!(Alarm::from_registers(reg, ss, &LSE), alarm);
    }

    #[test]
    fn test_subsecond_encoding() {
        let alarm = Alarm::new(1, 0, 0, 0, AlarmMask::MATCH_SS).with_subseconds(500);
        let (_, ss) = alarm.to_registers(HourFormat::TwentyFourHour, &LSE).unwrap();
        assert_eq!(ss.mask(), 8);
        assert_eq!(ss.subsecond(), 127);

        let back = Alarm::from_registers(AlarmReg::default(), ss, &LSE);
        assert_eq!(back.subseconds, 500);
    }

    #[test]
    fn test_twelve_hour_period() {
        let alarm = Alarm::new(1, 7, 0, 0, AlarmMask::MATCH_HHMMSS).with_period(Period::Pm);
        let (reg, _) = alarm.to_registers(HourFormat::TwelveHour, &LSE).unwrap();
        assert_eq!(reg.period(), Period::Pm);

        // The period is forced to AM in 24-hour format.
        let (reg, _) = alarm.to_registers(HourFormat::TwentyFourHour, &LSE).unwrap();
        assert_eq!(reg.period(), Period::Am);
    }

    #[test]
    fn test_invalid_alarm_rejected() {
        for alarm in [
            Alarm::new(0, 0, 0, 0, AlarmMask::MATCH_SS),
            Alarm::new(32, 0, 0, 0, AlarmMask::MATCH_SS),
            Alarm::new(1, 24, 0, 0, AlarmMask::MATCH_SS),
            Alarm::new(1, 0, 60, 0, AlarmMask::MATCH_SS),
            Alarm::new(1, 0, 0, 60, AlarmMask::MATCH_SS),
        ] {
            assert!(alarm.to_registers(HourFormat::TwentyFourHour, &LSE).is_err());
        }
        assert!(Alarm::new(1, 0, 0, 0, AlarmMask::MATCH_SS)
            .to_registers(HourFormat::TwelveHour, &LSE)
            .is_err());
    }

    #[test]
    fn test_decode_reports_wildcards_as_off() {
        let alarm = Alarm::new(1, 2, 3, 4, AlarmMask::OFF);
        let (reg, ss) = alarm.to_registers(HourFormat::TwentyFourHour, &LSE).unwrap();
        let back = Alarm::from_registers(reg, ss, &LSE);
        assert_eq!(back.mask, AlarmMask::OFF);
        assert_eq!((back.day, back.hours, back.minutes, back.seconds), (1, 2, 3, 4));
    }
}
