//! Register definitions and bitfield structures for the STM32 RTC.
//!
//! Two register files are modelled:
//!
//! - the calendar RTC (BCD time/date registers, split prescaler, two alarms,
//!   wakeup timer) found on most STM32 families, addressed by [`CalendarReg`];
//! - the counter RTC of the STM32F1 (32-bit seconds counter, 20-bit reload,
//!   single alarm counter), addressed by [`CounterReg`].
//!
//! All registers are 32 bits wide. Offsets are relative to the peripheral
//! base address.

use bitfield::bitfield;

/// Register offsets of the calendar RTC.
#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalendarReg {
    /// Time register (TR)
    Time = 0x00,
    /// Date register (DR)
    Date = 0x04,
    /// Control register (CR)
    Control = 0x08,
    /// Initialization and status register (ISR)
    Status = 0x0C,
    /// Prescaler register (PRER)
    Prescaler = 0x10,
    /// Wakeup timer register (WUTR)
    WakeupTimer = 0x14,
    /// Alarm A register (ALRMAR)
    AlarmA = 0x1C,
    /// Alarm B register (ALRMBR)
    AlarmB = 0x20,
    /// Write protection register (WPR)
    WriteProtect = 0x24,
    /// Sub second register (SSR)
    Subsecond = 0x28,
    /// Alarm A sub second register (ALRMASSR)
    AlarmASubsecond = 0x44,
    /// Alarm B sub second register (ALRMBSSR)
    AlarmBSubsecond = 0x48,
}

/// Register offsets of the counter RTC.
#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CounterReg {
    /// Control register high (CRH), interrupt enables
    ControlHigh = 0x00,
    /// Control register low (CRL), flags and configuration mode
    ControlLow = 0x04,
    /// Prescaler load register high (PRLH)
    PrescalerHigh = 0x08,
    /// Prescaler load register low (PRLL)
    PrescalerLow = 0x0C,
    /// Prescaler divider register high (DIVH)
    DividerHigh = 0x10,
    /// Prescaler divider register low (DIVL)
    DividerLow = 0x14,
    /// Counter register high (CNTH)
    CounterHigh = 0x18,
    /// Counter register low (CNTL)
    CounterLow = 0x1C,
    /// Alarm register high (ALRH)
    AlarmHigh = 0x20,
    /// Alarm register low (ALRL)
    AlarmLow = 0x24,
}

/// First write protection unlock key.
pub const WPR_KEY1: u32 = 0xCA;
/// Second write protection unlock key.
pub const WPR_KEY2: u32 = 0x53;
/// Any other value re-enables write protection.
pub const WPR_LOCK: u32 = 0xFF;

/// Wakeup clock selection for the 1 Hz `ck_spre` clock.
pub const WUCKSEL_CK_SPRE: u8 = 0b100;

/// Reset value of the counter RTC alarm registers.
pub const COUNTER_ALARM_RESET: u32 = 0xFFFF_FFFF;

/// Hour format of the calendar.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HourFormat {
    /// 24-hour format (0-23)
    #[default]
    TwentyFourHour = 0,
    /// 12-hour format (1-12 + AM/PM)
    TwelveHour = 1,
}
impl From<u8> for HourFormat {
    /// Creates an `HourFormat` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => HourFormat::TwentyFourHour,
            1 => HourFormat::TwelveHour,
            _ => panic!("Invalid value for HourFormat: {}", v),
        }
    }
}
impl From<HourFormat> for u8 {
    /// Converts an `HourFormat` to its raw register value.
    fn from(v: HourFormat) -> Self {
        v as u8
    }
}

/// AM/PM notation, only meaningful in 12-hour format.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Period {
    /// Ante meridiem, also used for every hour in 24-hour format
    #[default]
    Am = 0,
    /// Post meridiem
    Pm = 1,
}
impl From<u8> for Period {
    /// Creates a `Period` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => Period::Am,
            1 => Period::Pm,
            _ => panic!("Invalid value for Period: {}", v),
        }
    }
}
impl From<Period> for u8 {
    /// Converts a `Period` to its raw register value.
    fn from(v: Period) -> Self {
        v as u8
    }
}

/// What the day field of an alarm register is compared against.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DaySelect {
    /// Day of month (1-31)
    Date = 0,
    /// Day of week (1-7)
    Weekday = 1,
}
impl From<u8> for DaySelect {
    /// Creates a `DaySelect` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => DaySelect::Date,
            1 => DaySelect::Weekday,
            _ => panic!("Invalid value for DaySelect: {}", v),
        }
    }
}
impl From<DaySelect> for u8 {
    /// Converts a `DaySelect` to its raw register value.
    fn from(v: DaySelect) -> Self {
        v as u8
    }
}

// This macro generates the From<u32> and Into<u32> implementations for the
// register type
macro_rules! from_register_u32 {
    ($typ:ty) => {
        impl From<u32> for $typ {
            fn from(v: u32) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u32 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Time register (TR) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct TimeReg(u32);
    impl Debug;
    u8;
    /// AM/PM notation
    pub from into Period, period, set_period: 22, 22;
    /// Tens place of hours (0-2)
    pub ten_hours, set_ten_hours: 21, 20;
    /// Ones place of hours (0-9)
    pub hours, set_hours: 19, 16;
    /// Tens place of minutes (0-5)
    pub ten_minutes, set_ten_minutes: 14, 12;
    /// Ones place of minutes (0-9)
    pub minutes, set_minutes: 11, 8;
    /// Tens place of seconds (0-5)
    pub ten_seconds, set_ten_seconds: 6, 4;
    /// Ones place of seconds (0-9)
    pub seconds, set_seconds: 3, 0;
}
from_register_u32!(TimeReg);

#[cfg(feature = "defmt")]
impl defmt::Format for TimeReg {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "TimeReg({}{}:{}{}:{}{} {})",
            self.ten_hours(),
            self.hours(),
            self.ten_minutes(),
            self.minutes(),
            self.ten_seconds(),
            self.seconds(),
            self.period()
        );
    }
}

bitfield! {
    /// Date register (DR) with BCD encoding.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct DateReg(u32);
    impl Debug;
    u8;
    /// Tens place of year (0-9)
    pub ten_year, set_ten_year: 23, 20;
    /// Ones place of year (0-9)
    pub year, set_year: 19, 16;
    /// Day of week (1-7, Monday is 1)
    pub weekday, set_weekday: 15, 13;
    /// Tens place of month (0-1)
    pub ten_month, set_ten_month: 12, 12;
    /// Ones place of month (0-9)
    pub month, set_month: 11, 8;
    /// Tens place of day of month (0-3)
    pub ten_day, set_ten_day: 5, 4;
    /// Ones place of day of month (0-9)
    pub day, set_day: 3, 0;
}
from_register_u32!(DateReg);

#[cfg(feature = "defmt")]
impl defmt::Format for DateReg {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "DateReg(20{}{}-{}{}-{}{} wd={})",
            self.ten_year(),
            self.year(),
            self.ten_month(),
            self.month(),
            self.ten_day(),
            self.day(),
            self.weekday()
        );
    }
}

bitfield! {
    /// Control register (CR).
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct ControlReg(u32);
    impl Debug;
    u8;
    /// Wakeup timer interrupt enable
    pub wakeup_interrupt, set_wakeup_interrupt: 14;
    /// Alarm B interrupt enable
    pub alarm_b_interrupt, set_alarm_b_interrupt: 13;
    /// Alarm A interrupt enable
    pub alarm_a_interrupt, set_alarm_a_interrupt: 12;
    /// Wakeup timer enable
    pub wakeup_enable, set_wakeup_enable: 10;
    /// Alarm B enable
    pub alarm_b_enable, set_alarm_b_enable: 9;
    /// Alarm A enable
    pub alarm_a_enable, set_alarm_a_enable: 8;
    /// Hour format
    pub from into HourFormat, hour_format, set_hour_format: 6, 6;
    /// Bypass the shadow registers on calendar reads
    pub bypass_shadow, set_bypass_shadow: 5;
    /// Wakeup clock selection
    pub wakeup_clock, set_wakeup_clock: 2, 0;
}
from_register_u32!(ControlReg);

bitfield! {
    /// Initialization and status register (ISR).
    ///
    /// The interrupt flags are cleared by writing 0, writing 1 leaves them
    /// unchanged.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct StatusReg(u32);
    impl Debug;
    /// Wakeup timer flag
    pub wakeup_flag, set_wakeup_flag: 10;
    /// Alarm B flag
    pub alarm_b_flag, set_alarm_b_flag: 9;
    /// Alarm A flag
    pub alarm_a_flag, set_alarm_a_flag: 8;
    /// Initialization mode request
    pub init, set_init: 7;
    /// Initialization mode entered
    pub init_ready, set_init_ready: 6;
    /// Calendar registers synchronized
    pub synchronized, set_synchronized: 5;
    /// Calendar has been initialized (year is not zero)
    pub initialized, set_initialized: 4;
    /// Wakeup timer write allowed
    pub wakeup_writable, set_wakeup_writable: 2;
    /// Alarm B write allowed
    pub alarm_b_writable, set_alarm_b_writable: 1;
    /// Alarm A write allowed
    pub alarm_a_writable, set_alarm_a_writable: 0;
}
from_register_u32!(StatusReg);

impl StatusReg {
    /// Value to write so that no rc_w0 flag is cleared by accident.
    pub const KEEP_FLAGS: u32 = 0x0000_0720;
}

bitfield! {
    /// Prescaler register (PRER).
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct PrescalerReg(u32);
    impl Debug;
    /// Asynchronous prescaler factor (0-127)
    pub u8, asynch, set_asynch: 22, 16;
    /// Synchronous prescaler factor (0-32767)
    pub u16, synch, set_synch: 14, 0;
}
from_register_u32!(PrescalerReg);

bitfield! {
    /// Alarm register (ALRMAR / ALRMBR) with BCD encoding and match masks.
    ///
    /// A set mask bit makes the field a wildcard.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct AlarmReg(u32);
    impl Debug;
    u8;
    /// Day field ignored
    pub mask_day, set_mask_day: 31;
    /// Day field selection
    pub from into DaySelect, day_select, set_day_select: 30, 30;
    /// Tens place of day (0-3)
    pub ten_day, set_ten_day: 29, 28;
    /// Ones place of day (0-9)
    pub day, set_day: 27, 24;
    /// Hours field ignored
    pub mask_hours, set_mask_hours: 23;
    /// AM/PM notation
    pub from into Period, period, set_period: 22, 22;
    /// Tens place of hours (0-2)
    pub ten_hours, set_ten_hours: 21, 20;
    /// Ones place of hours (0-9)
    pub hours, set_hours: 19, 16;
    /// Minutes field ignored
    pub mask_minutes, set_mask_minutes: 15;
    /// Tens place of minutes (0-5)
    pub ten_minutes, set_ten_minutes: 14, 12;
    /// Ones place of minutes (0-9)
    pub minutes, set_minutes: 11, 8;
    /// Seconds field ignored
    pub mask_seconds, set_mask_seconds: 7;
    /// Tens place of seconds (0-5)
    pub ten_seconds, set_ten_seconds: 6, 4;
    /// Ones place of seconds (0-9)
    pub seconds, set_seconds: 3, 0;
}
from_register_u32!(AlarmReg);

bitfield! {
    /// Alarm sub second register (ALRMASSR / ALRMBSSR).
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct AlarmSubsecondReg(u32);
    impl Debug;
    /// Number of least significant sub second bits compared (0 = none)
    pub u8, mask, set_mask: 27, 24;
    /// Sub second comparator value
    pub u16, subsecond, set_subsecond: 14, 0;
}
from_register_u32!(AlarmSubsecondReg);

bitfield! {
    /// Counter RTC control register high (CRH), interrupt enables.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct CounterInterrupts(u32);
    impl Debug;
    /// Overflow interrupt enable
    pub overflow, set_overflow: 2;
    /// Alarm interrupt enable
    pub alarm, set_alarm: 1;
    /// Second interrupt enable
    pub second, set_second: 0;
}
from_register_u32!(CounterInterrupts);

bitfield! {
    /// Counter RTC control register low (CRL).
    ///
    /// The event flags are cleared by writing 0.
    #[derive(Clone, Copy, Default, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct CounterStatus(u32);
    impl Debug;
    /// Last write operation terminated
    pub write_done, set_write_done: 5;
    /// Configuration mode
    pub configure, set_configure: 4;
    /// Registers synchronized
    pub synchronized, set_synchronized: 3;
    /// Overflow flag
    pub overflow_flag, set_overflow_flag: 2;
    /// Alarm flag
    pub alarm_flag, set_alarm_flag: 1;
    /// Second flag
    pub second_flag, set_second_flag: 0;
}
from_register_u32!(CounterStatus);

impl CounterStatus {
    /// Value to write so that no rc_w0 flag is cleared by accident.
    pub const KEEP_FLAGS: u32 = 0x0000_000F;
}
