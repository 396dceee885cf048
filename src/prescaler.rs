//! Prescaler calculation for the 1 Hz calendar tick.
//!
//! The calendar RTC divides its input clock with two chained prescalers, an
//! asynchronous one (7 bits) followed by a synchronous one (15 bits) whose
//! down-counter is also the sub second register. The counter RTC has a single
//! 20-bit reload prescaler and no sub second resolution.
//!
//! Both are modelled behind the [`Prescaler`] trait so the driver can cache
//! and convert without knowing which hardware it runs on.

use crate::ConfigError;

/// Largest asynchronous prescaler value.
pub const ASYNCH_MAX: u8 = 0x7F;
/// Largest synchronous prescaler value.
pub const SYNCH_MAX: u16 = 0x7FFF;
/// Largest counter RTC reload value.
pub const RELOAD_MAX: u32 = 0x000F_FFFF;

/// Prescaler configuration producing the 1 Hz calendar tick.
pub trait Prescaler: Copy + PartialEq + core::fmt::Debug {
    /// Value loaded by a backup domain reset (1 Hz from the 32.768kHz LSE).
    const RESET: Self;

    /// Computes the prescaler for an RTC input clock of `clock_hz`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PrescalerOutOfRange`] when no value fits the
    /// hardware.
    fn compute(clock_hz: u32) -> Result<Self, ConfigError>;

    /// Whether every field fits the hardware range.
    fn is_valid(&self) -> bool;

    /// Input frequency that this prescaler divides down to 1 Hz.
    fn input_hz(&self) -> u32;

    /// Number of meaningful sub second bits, 0 without sub second support.
    fn subsecond_bits(&self) -> u8;

    /// Converts a sub second down-counter value to milliseconds.
    fn ticks_to_millis(&self, ticks: u32) -> u16;

    /// Converts milliseconds (0-999) to a sub second down-counter value.
    fn millis_to_ticks(&self, millis: u16) -> u32;
}

/// Asynchronous/synchronous prescaler pair of the calendar RTC.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SplitPrescaler {
    /// Asynchronous prescaler (0-127)
    pub asynch: u8,
    /// Synchronous prescaler (0-32767)
    pub synch: u16,
}

impl SplitPrescaler {
    /// Creates a prescaler pair without validation.
    pub const fn new(asynch: u8, synch: u16) -> Self {
        Self { asynch, synch }
    }
}

impl Prescaler for SplitPrescaler {
    const RESET: Self = Self::new(ASYNCH_MAX, 0xFF);

    fn compute(clock_hz: u32) -> Result<Self, ConfigError> {
        if clock_hz == 0 {
            return Err(ConfigError::PrescalerOutOfRange(clock_hz));
        }

        // Largest asynchronous divider that divides the clock exactly.
        let exact = (0..=ASYNCH_MAX).rev().find_map(|asynch| {
            let div = u32::from(asynch) + 1;
            (clock_hz % div == 0).then(|| (asynch, clock_hz / div - 1))
        });

        if let Some((asynch, synch)) = exact {
            if let Ok(synch) = u16::try_from(synch) {
                if synch <= SYNCH_MAX {
                    debug!("exact prescaler for {}Hz: {}/{}", clock_hz, asynch, synch);
                    return Ok(Self { asynch, synch });
                }
            }
        }

        // Closest approximation at the maximum asynchronous divider.
        let synch = (clock_hz / (u32::from(ASYNCH_MAX) + 1))
            .checked_sub(1)
            .and_then(|s| u16::try_from(s).ok())
            .filter(|s| *s <= SYNCH_MAX)
            .ok_or(ConfigError::PrescalerOutOfRange(clock_hz))?;
        warn!(
            "no exact prescaler for {}Hz, using {}/{}",
            clock_hz,
            ASYNCH_MAX,
            synch
        );
        Ok(Self {
            asynch: ASYNCH_MAX,
            synch,
        })
    }

    fn is_valid(&self) -> bool {
        self.asynch <= ASYNCH_MAX && self.synch <= SYNCH_MAX
    }

    fn input_hz(&self) -> u32 {
        (u32::from(self.asynch) + 1) * (u32::from(self.synch) + 1)
    }

    fn subsecond_bits(&self) -> u8 {
        // floor(log2(synch)) + 1, with log2(0) taken as 0
        if self.synch == 0 {
            1
        } else {
            (16 - self.synch.leading_zeros()) as u8
        }
    }

    fn ticks_to_millis(&self, ticks: u32) -> u16 {
        let synch = u32::from(self.synch);
        let millis = synch.saturating_sub(ticks) * 1000 / (synch + 1);
        u16::try_from(millis).unwrap_or(999)
    }

    fn millis_to_ticks(&self, millis: u16) -> u32 {
        let synch = u32::from(self.synch);
        synch.saturating_sub(u32::from(millis) * (synch + 1) / 1000)
    }
}

/// 20-bit reload prescaler of the counter RTC.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CombinedPrescaler {
    /// Reload value, the input clock is divided by `reload + 1`
    pub reload: u32,
}

impl CombinedPrescaler {
    /// Creates a reload prescaler without validation.
    pub const fn new(reload: u32) -> Self {
        Self { reload }
    }
}

impl Prescaler for CombinedPrescaler {
    const RESET: Self = Self::new(0x7FFF);

    fn compute(clock_hz: u32) -> Result<Self, ConfigError> {
        let reload = clock_hz
            .checked_sub(1)
            .filter(|r| *r <= RELOAD_MAX)
            .ok_or(ConfigError::PrescalerOutOfRange(clock_hz))?;
        debug!("reload prescaler for {}Hz: {}", clock_hz, reload);
        Ok(Self { reload })
    }

    fn is_valid(&self) -> bool {
        self.reload <= RELOAD_MAX
    }

    fn input_hz(&self) -> u32 {
        self.reload + 1
    }

    fn subsecond_bits(&self) -> u8 {
        0
    }

    fn ticks_to_millis(&self, _ticks: u32) -> u16 {
        0
    }

    fn millis_to_ticks(&self, _millis: u16) -> u32 {
        0
    }
}
