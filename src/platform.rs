//! Hardware seams of the driver.
//!
//! The RTC registers are reached through [`RegisterBus`], everything outside
//! the RTC block (oscillators, kernel clock mux, backup domain, interrupt
//! controller) through [`Platform`]. A board support crate implements both on
//! top of its peripheral access crate; the tests implement them on a
//! simulated peripheral.

use crate::clock::{ClockSelection, ClockSource};

/// Interrupt lines used by the driver.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Irq {
    /// Alarm interrupt (both alarms share it)
    Alarm,
    /// One second interrupt (native seconds or wakeup timer)
    Seconds,
}

/// 32-bit register access to the RTC block.
pub trait RegisterBus<A> {
    /// Reads the register at `reg`.
    fn read(&mut self, reg: A) -> u32;
    /// Writes `value` to the register at `reg`.
    fn write(&mut self, reg: A, value: u32);
}

/// Clock tree, backup domain and interrupt controller services.
pub trait Platform {
    /// Starts `source` and waits until it is ready.
    fn enable_oscillator(&mut self, source: ClockSource);

    /// Currently selected RTC kernel clock, `None` when no clock is selected.
    fn rtc_clock(&mut self) -> Option<ClockSource>;

    /// Selects the RTC kernel clock.
    ///
    /// The hardware only accepts a new selection after a backup domain reset,
    /// implementations reset the domain when the selection changes.
    fn select_rtc_clock(&mut self, selection: ClockSelection);

    /// Gates the RTC kernel clock on.
    fn enable_rtc(&mut self);

    /// Gates the RTC kernel clock off.
    fn disable_rtc(&mut self);

    /// Enables write access to the backup domain.
    fn enable_backup_domain(&mut self);

    /// Resets the backup domain, including the RTC and the backup registers.
    fn reset_backup_domain(&mut self);

    /// Reads backup register `index`.
    fn backup_register(&mut self, index: usize) -> u32;

    /// Writes backup register `index`.
    fn set_backup_register(&mut self, index: usize, value: u32);

    /// Sets the priority of `irq`.
    fn set_irq_priority(&mut self, irq: Irq, priority: u8);

    /// Unmasks `irq`.
    fn enable_irq(&mut self, irq: Irq);

    /// Masks `irq`.
    fn disable_irq(&mut self, irq: Irq);
}
