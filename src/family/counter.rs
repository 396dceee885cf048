use super::Family;
use crate::{
    alarm::{Alarm, AlarmId, AlarmMask},
    datetime::{Date, Time},
    dispatch::Events,
    epoch,
    platform::{Platform, RegisterBus},
    prescaler::CombinedPrescaler,
    registers::{CounterInterrupts, CounterReg, CounterStatus, HourFormat, COUNTER_ALARM_RESET},
};

const SECONDS_PER_DAY: u32 = 24 * 3600;

/// Fixed divider between the HSE and the counter RTC.
const HSE_DIVIDER: u8 = 128;

/// Reset value of the prescaler load register.
const PRESCALER_RESET: u32 = 0x8000;

/// Backup register holding the upper half of the date record.
pub const DEFAULT_DATE_REGISTER: usize = 6;

/// STM32F1 counter RTC.
///
/// The hardware only counts seconds. The counter holds the time of day and is
/// rebased at midnight on the first read past it, the date lives in software
/// and is persisted in two 16-bit backup registers as
/// `year << 24 | day << 16 | month << 8 | weekday`.
#[derive(Debug)]
pub struct Counter<H> {
    hw: H,
    date: Date,
    date_register: usize,
}

impl<H> Counter<H> {
    /// Wraps the hardware access, the date record lives in backup registers
    /// [`DEFAULT_DATE_REGISTER`] and the one after it.
    pub fn new(hw: H) -> Self {
        Self {
            hw,
            date: Date::default(),
            date_register: DEFAULT_DATE_REGISTER,
        }
    }

    /// Moves the date record to backup registers `index` and `index + 1`.
    #[must_use]
    pub fn with_date_register(mut self, index: usize) -> Self {
        self.date_register = index;
        self
    }

    /// Hardware access.
    pub fn hardware(&mut self) -> &mut H {
        &mut self.hw
    }

    /// Gives the hardware access back.
    pub fn release(self) -> H {
        self.hw
    }
}

impl<H: RegisterBus<CounterReg>> Counter<H> {
    register_access!(
        CounterReg;
        (interrupts, CounterReg::ControlHigh, CounterInterrupts),
        (status, CounterReg::ControlLow, CounterStatus),
        (prescaler_high, CounterReg::PrescalerHigh, u32),
        (prescaler_low, CounterReg::PrescalerLow, u32),
        (counter_high, CounterReg::CounterHigh, u32),
        (counter_low, CounterReg::CounterLow, u32),
        (alarm_high, CounterReg::AlarmHigh, u32),
        (alarm_low, CounterReg::AlarmLow, u32),
    );

    /// Runs `f` in configuration mode and waits for the writes to land.
    fn configure<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        while !self.status().write_done() {}
        self.modify_status(|status| status.set_configure(true));
        let result = f(self);
        self.modify_status(|status| status.set_configure(false));
        while !self.status().write_done() {}
        result
    }

    fn modify_status(&mut self, f: impl FnOnce(&mut CounterStatus)) {
        let mut status = CounterStatus::from(u32::from(self.status()) | CounterStatus::KEEP_FLAGS);
        f(&mut status);
        self.set_status(status);
    }

    fn modify_interrupts(&mut self, f: impl FnOnce(&mut CounterInterrupts)) {
        let mut interrupts = self.interrupts();
        f(&mut interrupts);
        self.configure(|rtc| rtc.set_interrupts(interrupts));
    }

    fn counter(&mut self) -> u32 {
        // The low half may carry into the high half between the two reads.
        loop {
            let high = self.counter_high() & 0xFFFF;
            let low = self.counter_low() & 0xFFFF;
            if self.counter_high() & 0xFFFF == high {
                return high << 16 | low;
            }
        }
    }

    fn write_counter(&mut self, value: u32) {
        self.configure(|rtc| {
            rtc.set_counter_high(value >> 16);
            rtc.set_counter_low(value & 0xFFFF);
        });
    }

    fn alarm_counter(&mut self) -> u32 {
        (self.alarm_high() & 0xFFFF) << 16 | self.alarm_low() & 0xFFFF
    }

    fn write_alarm_counter(&mut self, value: u32) {
        self.configure(|rtc| {
            rtc.set_alarm_high(value >> 16);
            rtc.set_alarm_low(value & 0xFFFF);
        });
    }

    fn write_prescaler(&mut self, reload: u32) {
        self.configure(|rtc| {
            rtc.set_prescaler_high(reload >> 16 & 0xF);
            rtc.set_prescaler_low(reload & 0xFFFF);
        });
    }

    /// Reads the counter, moving the date forward when it passed midnight.
    /// Returns the seconds since midnight.
    fn time_of_day(&mut self) -> u32
    where
        H: Platform,
    {
        let counter = self.counter();
        let days = counter / SECONDS_PER_DAY;
        if days == 0 {
            return counter;
        }

        let alarm = self.alarm_counter();
        let remaining = (alarm != COUNTER_ALARM_RESET && alarm > counter).then(|| alarm - counter);
        let counter = counter % SECONDS_PER_DAY;
        self.write_counter(counter);
        self.write_alarm_counter(match remaining {
            Some(remaining) => counter + remaining,
            None => COUNTER_ALARM_RESET,
        });

        self.date = epoch::add_days(&self.date, days);
        debug!(
            "counter rolled over {} day(s) to {}-{}-{}",
            days,
            self.date.year,
            self.date.month,
            self.date.day
        );
        self.store_date();
        counter
    }

    fn load_date(&mut self) -> Option<Date>
    where
        H: Platform,
    {
        let high = self.hw.backup_register(self.date_register) & 0xFFFF;
        let low = self.hw.backup_register(self.date_register + 1) & 0xFFFF;
        let record = high << 16 | low;
        (record != 0).then(|| {
            Date::new(
                (record >> 24) as u8,
                (record >> 8) as u8,
                (record >> 16) as u8,
                record as u8,
            )
        })
    }

    fn store_date(&mut self)
    where
        H: Platform,
    {
        let record = u32::from(self.date.year) << 24
            | u32::from(self.date.day) << 16
            | u32::from(self.date.month) << 8
            | u32::from(self.date.weekday);
        self.hw.set_backup_register(self.date_register, record >> 16);
        self.hw
            .set_backup_register(self.date_register + 1, record & 0xFFFF);
    }
}

impl<H> Family for Counter<H>
where
    H: Platform + RegisterBus<CounterReg>,
{
    type Prescaler = CombinedPrescaler;
    type Platform = H;

    const ALARMS: &'static [AlarmId] = &[AlarmId::A];
    const TWELVE_HOUR: bool = false;

    fn hse_divider(_hse_hz: u32) -> Option<u8> {
        Some(HSE_DIVIDER)
    }

    fn platform(&mut self) -> &mut H {
        &mut self.hw
    }

    // Picks up the date kept by a previous driver instance.
    fn is_initialized(&mut self) -> bool {
        match self.load_date() {
            Some(date) => {
                self.date = date;
                true
            }
            None => false,
        }
    }

    fn hour_format(&mut self) -> HourFormat {
        HourFormat::TwentyFourHour
    }

    // The prescaler load register is write only.
    fn hardware_prescaler(&mut self) -> Option<CombinedPrescaler> {
        None
    }

    fn init(&mut self, _format: HourFormat, prescaler: &CombinedPrescaler) {
        debug!("counter init: reload {}", prescaler.reload);
        self.write_prescaler(prescaler.reload);
    }

    fn restore(&mut self) {
        if let Some(date) = self.load_date() {
            self.date = date;
        }
        self.time_of_day();
    }

    fn ready(&mut self) {
        self.modify_status(|status| status.set_synchronized(false));
        while !self.status().synchronized() {}
    }

    fn deinit(&mut self) {
        debug!("counter deinit");
        self.configure(|rtc| {
            rtc.set_interrupts(CounterInterrupts::default());
            rtc.set_counter_high(0);
            rtc.set_counter_low(0);
            rtc.set_prescaler_high(PRESCALER_RESET >> 16);
            rtc.set_prescaler_low(PRESCALER_RESET & 0xFFFF);
            rtc.set_alarm_high(COUNTER_ALARM_RESET >> 16);
            rtc.set_alarm_low(COUNTER_ALARM_RESET & 0xFFFF);
        });
        self.modify_status(|status| {
            status.set_second_flag(false);
            status.set_alarm_flag(false);
            status.set_overflow_flag(false);
        });
    }

    fn time(&mut self, _prescaler: &CombinedPrescaler) -> Time {
        let counter = self.time_of_day();
        Time::new(
            (counter / 3600) as u8,
            (counter % 3600 / 60) as u8,
            (counter % 60) as u8,
        )
    }

    fn set_time(&mut self, time: &Time, format: HourFormat) {
        let counter = u32::from(time.hours_24(format)) * 3600
            + u32::from(time.minutes) * 60
            + u32::from(time.seconds);
        self.write_counter(counter);
        self.modify_status(|status| {
            status.set_second_flag(false);
            status.set_overflow_flag(false);
        });

        // A pending alarm earlier in the day now belongs to tomorrow.
        let alarm = self.alarm_counter();
        if alarm != COUNTER_ALARM_RESET && alarm < counter {
            self.write_alarm_counter(alarm + SECONDS_PER_DAY);
        }
    }

    fn date(&mut self) -> Date {
        self.time_of_day();
        self.date
    }

    fn set_date(&mut self, date: &Date) {
        let weekday = epoch::weekday(date.year, date.month, date.day).unwrap_or(date.weekday);
        self.date = Date { weekday, ..*date };
        self.store_date();
    }

    fn set_alarm(
        &mut self,
        _id: AlarmId,
        alarm: &Alarm,
        format: HourFormat,
        _prescaler: &CombinedPrescaler,
    ) {
        if alarm.mask.is_off() {
            self.disable_alarm(AlarmId::A);
            return;
        }

        let now = self.time_of_day();
        let mut counter = u32::from(crate::datetime::to_24h(alarm.hours, alarm.period, format))
            * 3600
            + u32::from(alarm.minutes) * 60
            + u32::from(alarm.seconds);
        if counter < now {
            counter += SECONDS_PER_DAY;
        }
        debug!("alarm at counter {}", counter);

        self.write_alarm_counter(counter);
        self.modify_status(|status| status.set_alarm_flag(false));
        self.modify_interrupts(|interrupts| interrupts.set_alarm(true));
    }

    fn alarm(&mut self, _id: AlarmId, _prescaler: &CombinedPrescaler) -> Alarm {
        let counter = self.alarm_counter();
        if counter == COUNTER_ALARM_RESET {
            return Alarm::new(self.date.day, 0, 0, 0, AlarmMask::OFF);
        }
        let counter = counter % SECONDS_PER_DAY;
        Alarm::new(
            self.date.day,
            (counter / 3600) as u8,
            (counter % 3600 / 60) as u8,
            (counter % 60) as u8,
            AlarmMask::MATCH_HHMMSS,
        )
    }

    fn disable_alarm(&mut self, _id: AlarmId) {
        self.write_alarm_counter(COUNTER_ALARM_RESET);
        self.modify_status(|status| status.set_alarm_flag(false));
        self.modify_interrupts(|interrupts| interrupts.set_alarm(false));
    }

    fn is_alarm_enabled(&mut self, id: AlarmId) -> bool {
        id == AlarmId::A && self.interrupts().alarm()
    }

    fn enable_seconds(&mut self) {
        self.modify_status(|status| status.set_second_flag(false));
        self.modify_interrupts(|interrupts| interrupts.set_second(true));
    }

    fn disable_seconds(&mut self) {
        self.modify_interrupts(|interrupts| interrupts.set_second(false));
        self.modify_status(|status| status.set_second_flag(false));
    }

    fn take_events(&mut self) -> Events {
        let status = self.status();
        let interrupts = self.interrupts();
        let events = Events {
            alarms: [status.alarm_flag() && interrupts.alarm(), false],
            seconds: status.second_flag() && interrupts.second(),
        };
        if !events.is_empty() {
            self.modify_status(|status| {
                if events.alarms[AlarmId::A.index()] {
                    status.set_alarm_flag(false);
                }
                if events.seconds {
                    status.set_second_flag(false);
                }
            });
        }
        events
    }
}
