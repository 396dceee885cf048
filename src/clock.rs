//! RTC clock source selection and prescaler caching.
//!
//! The RTC can be clocked from the low speed internal oscillator (LSI), the
//! low speed external crystal (LSE) or a divided high speed external clock
//! (HSE). [`ClockManager`] tracks the selected source, the resulting RTC input
//! frequency and the prescaler that turns it into the 1 Hz calendar tick.

use crate::{prescaler::Prescaler, ConfigError};

/// Oscillator feeding the RTC.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// Low speed internal RC oscillator
    #[default]
    Lsi = 0,
    /// Low speed external crystal
    Lse = 1,
    /// High speed external clock, divided down for the RTC
    Hse = 2,
}
impl TryFrom<u8> for ClockSource {
    type Error = ConfigError;

    /// Creates a `ClockSource` from a raw selector value.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownClockSource`] for anything but 0, 1 or 2.
    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(ClockSource::Lsi),
            1 => Ok(ClockSource::Lse),
            2 => Ok(ClockSource::Hse),
            _ => Err(ConfigError::UnknownClockSource(v)),
        }
    }
}
impl From<ClockSource> for u8 {
    /// Converts a `ClockSource` to its raw selector value.
    fn from(v: ClockSource) -> Self {
        v as u8
    }
}

/// Nominal oscillator frequencies of the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Oscillators {
    /// LSI frequency in Hz
    pub lsi_hz: u32,
    /// LSE frequency in Hz
    pub lse_hz: u32,
    /// HSE frequency in Hz, before the RTC divider
    pub hse_hz: u32,
}

impl Default for Oscillators {
    fn default() -> Self {
        Self {
            lsi_hz: 32_000,
            lse_hz: 32_768,
            hse_hz: 8_000_000,
        }
    }
}

/// Kernel clock selection handed to the platform.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockSelection {
    /// Selected oscillator
    pub source: ClockSource,
    /// HSE divider, 1 for the low speed sources
    pub hse_divider: u8,
}

/// Selected clock source and cached prescaler.
#[derive(Debug)]
pub(crate) struct ClockManager<P: Prescaler> {
    source: ClockSource,
    clock_hz: u32,
    computed: Option<P>,
    user: Option<P>,
}

impl<P: Prescaler> ClockManager<P> {
    pub(crate) const fn new() -> Self {
        Self {
            source: ClockSource::Lsi,
            clock_hz: 0,
            computed: None,
            user: None,
        }
    }

    pub(crate) fn source(&self) -> ClockSource {
        self.source
    }

    /// Selects `source` and computes the RTC input frequency.
    ///
    /// `hse_divider` maps the HSE frequency to the divider the hardware
    /// applies, `None` when no divider brings it in range.
    pub(crate) fn set_source(
        &mut self,
        source: ClockSource,
        oscillators: &Oscillators,
        hse_divider: impl FnOnce(u32) -> Option<u8>,
    ) -> Result<ClockSelection, ConfigError> {
        let (clock_hz, divider) = match source {
            ClockSource::Lsi => (oscillators.lsi_hz, 1),
            ClockSource::Lse => (oscillators.lse_hz, 1),
            ClockSource::Hse => {
                let divider = hse_divider(oscillators.hse_hz)
                    .ok_or(ConfigError::HseTooFast(oscillators.hse_hz))?;
                (oscillators.hse_hz / u32::from(divider), divider)
            }
        };

        if source != self.source || clock_hz != self.clock_hz {
            debug!(
                "clock source {:?} at {}Hz (divider {})",
                source,
                clock_hz,
                divider
            );
            self.computed = None;
        }
        self.source = source;
        self.clock_hz = clock_hz;

        Ok(ClockSelection {
            source,
            hse_divider: divider,
        })
    }

    /// Effective prescaler: the user override, else the cached value, else a
    /// freshly computed one.
    pub(crate) fn prescaler(&mut self) -> Result<P, ConfigError> {
        if let Some(user) = self.user {
            return Ok(user);
        }
        if let Some(computed) = self.computed {
            return Ok(computed);
        }
        let computed = P::compute(self.clock_hz)?;
        self.computed = Some(computed);
        Ok(computed)
    }

    /// Installs a user override. Invalid values clear the override.
    pub(crate) fn set_user(&mut self, prescaler: P) {
        if prescaler.is_valid() {
            self.user = Some(prescaler);
        } else {
            warn!("prescaler out of range, using computed value");
            self.user = None;
        }
    }

    pub(crate) fn has_user(&self) -> bool {
        self.user.is_some()
    }

    /// Adopts the value found in the hardware as the computed prescaler.
    pub(crate) fn adopt(&mut self, prescaler: P) {
        if prescaler.is_valid() && self.computed.is_none() {
            self.computed = Some(prescaler);
        }
    }
}
