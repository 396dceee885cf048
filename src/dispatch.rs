//! Interrupt to callback dispatch.
//!
//! Handlers are plain function pointers stored in
//! [`critical_section::Mutex`] cells so they can be attached from the main
//! context while the interrupt handler reads them. The entry is copied out
//! inside the critical section and invoked outside of it.

use core::cell::Cell;

use critical_section::Mutex;

use crate::alarm::AlarmId;

/// Alarm callback, receives the context word given at attach time.
pub type AlarmCallback = fn(usize);

/// One second callback.
pub type SecondsCallback = fn();

#[derive(Copy, Clone)]
struct AlarmHandler {
    callback: AlarmCallback,
    data: usize,
}

/// Pending RTC events, as read (and cleared) from the hardware flags.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Events {
    /// Alarm match flags, indexed by [`AlarmId::index`]
    pub alarms: [bool; 2],
    /// One second tick
    pub seconds: bool,
}

impl Events {
    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        !self.alarms[0] && !self.alarms[1] && !self.seconds
    }
}

/// Callback table for the alarm and seconds interrupts.
pub struct Dispatcher {
    alarms: [Mutex<Cell<Option<AlarmHandler>>>; 2],
    seconds: Mutex<Cell<Option<SecondsCallback>>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Creates an empty table.
    pub const fn new() -> Self {
        Self {
            alarms: [Mutex::new(Cell::new(None)), Mutex::new(Cell::new(None))],
            seconds: Mutex::new(Cell::new(None)),
        }
    }

    /// Registers `callback` for alarm `id`, replacing any previous one.
    pub fn attach_alarm(&self, id: AlarmId, callback: AlarmCallback, data: usize) {
        critical_section::with(|cs| {
            self.alarms[id.index()]
                .borrow(cs)
                .set(Some(AlarmHandler { callback, data }));
        });
    }

    /// Removes the callback for alarm `id`.
    pub fn detach_alarm(&self, id: AlarmId) {
        critical_section::with(|cs| self.alarms[id.index()].borrow(cs).set(None));
    }

    /// Registers the one second callback.
    pub fn attach_seconds(&self, callback: SecondsCallback) {
        critical_section::with(|cs| self.seconds.borrow(cs).set(Some(callback)));
    }

    /// Removes the one second callback.
    pub fn detach_seconds(&self) {
        critical_section::with(|cs| self.seconds.borrow(cs).set(None));
    }

    /// Whether a callback is registered for alarm `id`.
    pub fn has_alarm(&self, id: AlarmId) -> bool {
        critical_section::with(|cs| self.alarms[id.index()].borrow(cs).get().is_some())
    }

    /// Whether a one second callback is registered.
    pub fn has_seconds(&self) -> bool {
        critical_section::with(|cs| self.seconds.borrow(cs).get().is_some())
    }

    /// Removes every callback.
    pub fn clear(&self) {
        critical_section::with(|cs| {
            for slot in &self.alarms {
                slot.borrow(cs).set(None);
            }
            self.seconds.borrow(cs).set(None);
        });
    }

    /// Invokes the callbacks of the pending `events`, alarm A first.
    pub fn dispatch(&self, events: Events) {
        for id in AlarmId::ALL {
            if !events.alarms[id.index()] {
                continue;
            }
            let handler = critical_section::with(|cs| self.alarms[id.index()].borrow(cs).get());
            match handler {
                Some(handler) => {
                    trace!("alarm {:?} callback", id);
                    (handler.callback)(handler.data);
                }
                None => trace!("alarm {:?} without callback", id),
            }
        }
        if events.seconds {
            if let Some(callback) = critical_section::with(|cs| self.seconds.borrow(cs).get()) {
                callback();
            }
        }
    }
}
