//! A calendar, alarm and wakeup driver for the STM32 real-time clock.
//!
//! The driver covers both RTC designs found on STM32 parts:
//!
//! - the BCD calendar RTC with its split prescaler, sub second counter, two
//!   alarms and wakeup timer ([`Calendar`]);
//! - the STM32F1 seconds counter, with the date kept in backup registers
//!   ([`Counter`]).
//!
//! Register access and the clock tree, backup domain and interrupt controller
//! services are supplied by the application through the [`RegisterBus`] and
//! [`Platform`] traits, usually as thin wrappers over the device's peripheral
//! access crate.
//!
//! ```ignore
//! let mut rtc = Rtc::new(Calendar::new(board_rtc), Config::default());
//! rtc.init(HourFormat::TwentyFourHour, ClockSource::Lse, false)?;
//! rtc.set_epoch(1_686_825_000);
//! rtc.attach_alarm_callback(AlarmId::A, on_alarm, 0);
//! rtc.start_alarm(AlarmId::A, Alarm::new(15, 10, 31, 0, AlarmMask::MATCH_HHMMSS));
//!
//! // RTC_Alarm interrupt handler
//! rtc.on_interrupt();
//! ```
//!
//! # Features
//!
//! - `log`: log through the [`log`](https://docs.rs/log) facade.
//! - `defmt`: log through [`defmt`](https://docs.rs/defmt) and derive
//!   `defmt::Format` for the public types.
//! - `sim`: expose [`sim`], a register level model of both RTC designs that
//!   runs the driver on the host.
#![cfg_attr(not(test), no_std)]

// This must be first so the macros are visible to the other modules.
#[macro_use]
mod fmt;

pub mod alarm;
pub mod clock;
pub mod datetime;
pub mod dispatch;
pub mod epoch;
pub mod family;
pub mod platform;
pub mod prescaler;
pub mod registers;
pub mod rtc;
#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use alarm::{Alarm, AlarmId, AlarmMask};
pub use clock::{ClockSelection, ClockSource, Oscillators};
pub use datetime::{Date, DateTimeError, Time};
pub use dispatch::{AlarmCallback, Dispatcher, Events, SecondsCallback};
pub use family::{Calendar, Counter, Family};
pub use platform::{Irq, Platform, RegisterBus};
pub use prescaler::{CombinedPrescaler, Prescaler, SplitPrescaler};
pub use registers::{HourFormat, Period};
pub use rtc::{Config, Rtc};

/// Configuration errors. They leave the RTC unconfigured.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Raw clock source selector out of range
    UnknownClockSource(u8),
    /// HSE frequency too high for every RTC divider
    HseTooFast(u32),
    /// No prescaler divides the clock frequency down to 1 Hz
    PrescalerOutOfRange(u32),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::UnknownClockSource(v) => write!(f, "unknown clock source {}", v),
            ConfigError::HseTooFast(hz) => write!(f, "HSE at {}Hz is too fast for the RTC", hz),
            ConfigError::PrescalerOutOfRange(hz) => {
                write!(f, "no prescaler divides {}Hz down to 1Hz", hz)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        assert_eq!(
            ConfigError::UnknownClockSource(3).to_string(),
            "unknown clock source 3"
        );
        assert_eq!(
            ConfigError::HseTooFast(48_000_000).to_string(),
            "HSE at 48000000Hz is too fast for the RTC"
        );
        assert_eq!(
            ConfigError::PrescalerOutOfRange(0).to_string(),
            "no prescaler divides 0Hz down to 1Hz"
        );
    }
}
