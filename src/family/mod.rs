//! Hardware family strategies.
//!
//! STM32 parts carry one of two RTC designs:
//!
//! - [`Calendar`]: a BCD calendar with split prescaler, sub second counter,
//!   two alarms and a wakeup timer (F0, F2, F3, F4, F7, G0, G4, H7, L0, L1,
//!   L4, U5, WB, WL...).
//! - [`Counter`]: the STM32F1 32-bit seconds counter with a single alarm
//!   counter. The date is kept in software and persisted in two backup
//!   registers.
//!
//! The [`Rtc`](crate::Rtc) driver talks to both through the [`Family`] trait.

/// Generates typed getters and setters over a [`RegisterBus`](crate::RegisterBus).
macro_rules! register_access {
    ($addr:ty; $(($name:ident, $reg:expr, $typ:ty)),+ $(,)?) => {
        $(
            paste::paste! {
                #[allow(unused)]
                fn [< set_ $name >](&mut self, value: $typ) {
                    trace!("write {:?} = {:#x}", $reg, u32::from(value));
                    crate::platform::RegisterBus::<$addr>::write(&mut self.hw, $reg, value.into());
                }
            }

            #[allow(unused)]
            fn $name(&mut self) -> $typ {
                <$typ>::from(crate::platform::RegisterBus::<$addr>::read(&mut self.hw, $reg))
            }
        )+
    };
}
pub(crate) use register_access;

mod calendar;
mod counter;

pub use calendar::Calendar;
pub use counter::{Counter, DEFAULT_DATE_REGISTER};

use crate::{
    alarm::{Alarm, AlarmId},
    datetime::{Date, Time},
    dispatch::Events,
    platform::Platform,
    prescaler::Prescaler,
    registers::HourFormat,
};

/// Operations the driver needs from an RTC hardware design.
///
/// Values handed to the setters are already validated by the driver.
pub trait Family {
    /// Prescaler layout of the hardware.
    type Prescaler: Prescaler;
    /// Clock tree, backup domain and interrupt services.
    type Platform: Platform;

    /// Alarms implemented by the hardware.
    const ALARMS: &'static [AlarmId];
    /// Whether the calendar can run in 12-hour format.
    const TWELVE_HOUR: bool;

    /// Whether alarm `id` exists on this hardware.
    fn supports(id: AlarmId) -> bool {
        Self::ALARMS.contains(&id)
    }

    /// Divider applied to the HSE clock, `None` when the frequency is too
    /// high for every available divider.
    fn hse_divider(hse_hz: u32) -> Option<u8>;

    /// Platform services.
    fn platform(&mut self) -> &mut Self::Platform;

    /// Whether the calendar was initialized since the last backup domain reset.
    fn is_initialized(&mut self) -> bool;

    /// Hour format the calendar counts in.
    fn hour_format(&mut self) -> HourFormat;

    /// Prescaler currently programmed, when the hardware lets it be read.
    fn hardware_prescaler(&mut self) -> Option<Self::Prescaler>;

    /// Programs the hour format and the prescaler.
    fn init(&mut self, format: HourFormat, prescaler: &Self::Prescaler);

    /// Warm start on an already running calendar with an unchanged clock.
    fn restore(&mut self);

    /// Final step of every initialization path.
    fn ready(&mut self);

    /// Puts every RTC register back to its reset value.
    fn deinit(&mut self);

    /// Reads the time of day, sub seconds included where supported.
    fn time(&mut self, prescaler: &Self::Prescaler) -> Time;

    /// Writes the time of day. Sub seconds are read only and ignored.
    fn set_time(&mut self, time: &Time, format: HourFormat);

    /// Reads the date.
    fn date(&mut self) -> Date;

    /// Writes the date.
    fn set_date(&mut self, date: &Date);

    /// Writes the date and the time of day together.
    fn set_date_time(&mut self, date: &Date, time: &Time, format: HourFormat) {
        self.set_date(date);
        self.set_time(time, format);
    }

    /// Programs alarm `id` and arms it, unless its mask is
    /// [`AlarmMask::OFF`](crate::AlarmMask::OFF) in which case it is left
    /// disarmed with every field ignored.
    fn set_alarm(
        &mut self,
        id: AlarmId,
        alarm: &Alarm,
        format: HourFormat,
        prescaler: &Self::Prescaler,
    );

    /// Reads back alarm `id`.
    fn alarm(&mut self, id: AlarmId, prescaler: &Self::Prescaler) -> Alarm;

    /// Clears the flag of alarm `id` and disarms it.
    fn disable_alarm(&mut self, id: AlarmId);

    /// Whether the interrupt of alarm `id` is enabled.
    fn is_alarm_enabled(&mut self, id: AlarmId) -> bool;

    /// Starts the one second interrupt.
    fn enable_seconds(&mut self);

    /// Stops the one second interrupt where the hardware dedicates a source
    /// to it.
    fn disable_seconds(&mut self);

    /// Reads and clears the pending, enabled interrupt flags.
    fn take_events(&mut self) -> Events;
}
