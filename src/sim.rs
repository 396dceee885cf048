//! Simulated RTC peripherals.
//!
//! [`Sim`] implements [`Platform`] and [`RegisterBus`] over a register level
//! model of either RTC design, so the driver can run on the host. The models
//! follow the reference manual behaviour the driver relies on: write
//! protection, initialization mode, rc_w0 flags, write-allowed flags and the
//! alarm and wakeup comparators. Time only moves when the test advances it.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::{
    clock::{ClockSelection, ClockSource},
    datetime::{Date, Time},
    platform::{Irq, Platform, RegisterBus},
    registers::{
        AlarmReg, AlarmSubsecondReg, CalendarReg, ControlReg, CounterReg, DateReg, DaySelect,
        HourFormat, PrescalerReg, StatusReg, TimeReg, COUNTER_ALARM_RESET, WPR_KEY1, WPR_KEY2,
    },
};

/// Number of simulated backup registers.
pub const BACKUP_REGISTERS: usize = 20;

/// Clock tree, backup domain and interrupt controller state.
#[derive(Debug, Default)]
pub struct SimPlatform {
    /// Running oscillators, indexed by [`ClockSource`]
    pub oscillators: [bool; 3],
    /// Selected RTC kernel clock
    pub rtc_clock: Option<ClockSource>,
    /// HSE divider of the last selection
    pub hse_divider: u8,
    /// RTC kernel clock gate
    pub rtc_enabled: bool,
    /// Backup domain write access
    pub backup_enabled: bool,
    /// Backup registers
    pub backup: [u32; BACKUP_REGISTERS],
    /// Interrupt enables, indexed by [`Irq`]
    pub irq_enabled: [bool; 2],
    /// Interrupt priorities, indexed by [`Irq`]
    pub irq_priority: [u8; 2],
    /// Number of backup domain resets
    pub domain_resets: u32,
}

/// Register level model of an RTC design.
pub trait SimRegisters: Default {
    /// Register address type.
    type Addr;

    /// Reads a register.
    fn read(&mut self, reg: Self::Addr) -> u32;

    /// Writes a register.
    fn write(&mut self, reg: Self::Addr, value: u32);

    /// Lets `seconds` seconds of RTC time pass.
    fn advance_seconds(&mut self, seconds: u32);
}

/// Simulated RTC peripheral with its platform.
#[derive(Debug, Default)]
pub struct Sim<R> {
    /// Platform state
    pub platform: SimPlatform,
    /// RTC registers
    pub rtc: R,
}

impl<R: SimRegisters> Sim<R> {
    /// Lets `seconds` seconds of RTC time pass.
    pub fn advance_seconds(&mut self, seconds: u32) {
        self.rtc.advance_seconds(seconds);
    }
}

impl Sim<SimCalendar> {
    /// Lets `ticks` sub second ticks pass.
    pub fn advance_ticks(&mut self, ticks: u32) {
        self.rtc.advance_ticks(ticks);
    }
}

fn irq_index(irq: Irq) -> usize {
    match irq {
        Irq::Alarm => 0,
        Irq::Seconds => 1,
    }
}

impl<R: SimRegisters> Platform for Sim<R> {
    fn enable_oscillator(&mut self, source: ClockSource) {
        self.platform.oscillators[usize::from(u8::from(source))] = true;
    }

    fn rtc_clock(&mut self) -> Option<ClockSource> {
        self.platform.rtc_clock
    }

    fn select_rtc_clock(&mut self, selection: ClockSelection) {
        if let Some(current) = self.platform.rtc_clock {
            if current != selection.source {
                self.reset_backup_domain();
            }
        }
        self.platform.rtc_clock = Some(selection.source);
        self.platform.hse_divider = selection.hse_divider;
    }

    fn enable_rtc(&mut self) {
        self.platform.rtc_enabled = true;
    }

    fn disable_rtc(&mut self) {
        self.platform.rtc_enabled = false;
    }

    fn enable_backup_domain(&mut self) {
        self.platform.backup_enabled = true;
    }

    fn reset_backup_domain(&mut self) {
        self.rtc = R::default();
        self.platform.backup = [0; BACKUP_REGISTERS];
        self.platform.rtc_clock = None;
        self.platform.rtc_enabled = false;
        self.platform.domain_resets += 1;
    }

    fn backup_register(&mut self, index: usize) -> u32 {
        self.platform.backup.get(index).copied().unwrap_or(0)
    }

    fn set_backup_register(&mut self, index: usize, value: u32) {
        if let Some(register) = self.platform.backup.get_mut(index) {
            *register = value;
        }
    }

    fn set_irq_priority(&mut self, irq: Irq, priority: u8) {
        self.platform.irq_priority[irq_index(irq)] = priority;
    }

    fn enable_irq(&mut self, irq: Irq) {
        self.platform.irq_enabled[irq_index(irq)] = true;
    }

    fn disable_irq(&mut self, irq: Irq) {
        self.platform.irq_enabled[irq_index(irq)] = false;
    }
}

impl<R: SimRegisters> RegisterBus<R::Addr> for Sim<R> {
    fn read(&mut self, reg: R::Addr) -> u32 {
        self.rtc.read(reg)
    }

    fn write(&mut self, reg: R::Addr, value: u32) {
        self.rtc.write(reg, value);
    }
}

/// Calendar RTC model.
#[derive(Debug)]
pub struct SimCalendar {
    now: NaiveDateTime,
    weekday: u8,
    control: ControlReg,
    init: bool,
    flags: StatusReg,
    prescaler: PrescalerReg,
    subsecond: u32,
    wakeup_reload: u32,
    wakeup_count: u32,
    alarms: [AlarmReg; 2],
    alarm_subseconds: [AlarmSubsecondReg; 2],
    unlock_stage: u8,
    init_sessions: u32,
}

impl Default for SimCalendar {
    fn default() -> Self {
        let prescaler = PrescalerReg::from(0x007F_00FF);
        Self {
            now: NaiveDateTime::new(
                NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
                NaiveTime::default(),
            ),
            weekday: 1,
            control: ControlReg::default(),
            init: false,
            flags: StatusReg::default(),
            prescaler,
            subsecond: u32::from(prescaler.synch()),
            wakeup_reload: 0xFFFF,
            wakeup_count: 0xFFFF,
            alarms: [AlarmReg::default(); 2],
            alarm_subseconds: [AlarmSubsecondReg::default(); 2],
            unlock_stage: 0,
            init_sessions: 0,
        }
    }
}

impl SimCalendar {
    /// Number of times initialization mode was entered.
    pub fn init_sessions(&self) -> u32 {
        self.init_sessions
    }

    fn unlocked(&self) -> bool {
        self.unlock_stage == 2
    }

    fn format(&self) -> HourFormat {
        self.control.hour_format()
    }

    fn alarm_enabled(&self, index: usize) -> bool {
        match index {
            0 => self.control.alarm_a_enable(),
            _ => self.control.alarm_b_enable(),
        }
    }

    fn time_register(&self) -> TimeReg {
        let format = self.format();
        Time::from_24h(
            self.now.hour() as u8,
            self.now.minute() as u8,
            self.now.second() as u8,
            format,
        )
        .to_register(format)
        .unwrap_or_default()
    }

    fn date_register(&self) -> DateReg {
        Date::new(
            (self.now.year() % 100) as u8,
            self.now.month() as u8,
            self.now.day() as u8,
            self.weekday,
        )
        .to_register()
        .unwrap_or_default()
    }

    fn status(&self) -> StatusReg {
        let mut status = self.flags;
        status.set_alarm_a_writable(!self.control.alarm_a_enable());
        status.set_alarm_b_writable(!self.control.alarm_b_enable());
        status.set_wakeup_writable(!self.control.wakeup_enable());
        status.set_initialized(self.now.year() != 2000);
        status.set_synchronized(true);
        status.set_init_ready(self.init);
        status.set_init(self.init);
        status
    }

    fn write_time(&mut self, value: u32) {
        let time = Time::from_register(TimeReg::from(value));
        if !time.is_valid(self.format()) {
            return;
        }
        if let Some(t) = NaiveTime::from_hms_opt(
            u32::from(time.hours_24(self.format())),
            u32::from(time.minutes),
            u32::from(time.seconds),
        ) {
            self.now = NaiveDateTime::new(self.now.date(), t);
        }
    }

    fn write_date(&mut self, value: u32) {
        let date = Date::from_register(DateReg::from(value));
        if let Some(d) = NaiveDate::from_ymd_opt(
            2000 + i32::from(date.year),
            u32::from(date.month),
            u32::from(date.day),
        ) {
            self.now = NaiveDateTime::new(d, self.now.time());
            self.weekday = date.weekday;
        }
    }

    fn write_status(&mut self, value: u32) {
        let written = StatusReg::from(value);
        if self.unlocked() {
            let init = written.init();
            if !self.init && init {
                self.init_sessions += 1;
            }
            if self.init && !init {
                // Leaving initialization mode restarts the prescalers.
                self.subsecond = u32::from(self.prescaler.synch());
            }
            self.init = init;
        }
        let flags = u32::from(self.flags) & (value | !0x0000_0700);
        self.flags = StatusReg::from(flags & 0x0000_0700);
    }

    fn write_control(&mut self, value: u32) {
        let control = ControlReg::from(value);
        if !self.control.wakeup_enable() && control.wakeup_enable() {
            self.wakeup_count = self.wakeup_reload;
        }
        self.control = control;
    }

    fn write_unlock(&mut self, value: u32) {
        self.unlock_stage = match (self.unlock_stage, value) {
            (_, WPR_KEY1) => 1,
            (1, WPR_KEY2) => 2,
            _ => 0,
        };
    }

    fn alarm_matches(&self, index: usize) -> bool {
        let alarm = self.alarms[index];
        let time = self.time_register();
        let date = self.date_register();

        if !alarm.mask_seconds()
            && (alarm.ten_seconds(), alarm.seconds()) != (time.ten_seconds(), time.seconds())
        {
            return false;
        }
        if !alarm.mask_minutes()
            && (alarm.ten_minutes(), alarm.minutes()) != (time.ten_minutes(), time.minutes())
        {
            return false;
        }
        if !alarm.mask_hours()
            && (alarm.ten_hours(), alarm.hours(), alarm.period())
                != (time.ten_hours(), time.hours(), time.period())
        {
            return false;
        }
        if !alarm.mask_day() {
            let matches = match alarm.day_select() {
                DaySelect::Date => {
                    (alarm.ten_day(), alarm.day()) == (date.ten_day(), date.day())
                }
                DaySelect::Weekday => alarm.day() == self.weekday,
            };
            if !matches {
                return false;
            }
        }

        let bits = u32::from(self.alarm_subseconds[index].mask()).min(15);
        let mask = (1u32 << bits) - 1;
        self.subsecond & mask == u32::from(self.alarm_subseconds[index].subsecond()) & mask
    }

    fn check_alarms(&mut self, subsecond_alarms: bool) {
        for index in 0..2 {
            let compares_subseconds = self.alarm_subseconds[index].mask() != 0;
            if self.alarm_enabled(index)
                && compares_subseconds == subsecond_alarms
                && self.alarm_matches(index)
            {
                match index {
                    0 => self.flags.set_alarm_a_flag(true),
                    _ => self.flags.set_alarm_b_flag(true),
                }
            }
        }
    }

    fn next_second(&mut self) {
        let day = self.now.date();
        self.now = self
            .now
            .checked_add_signed(Duration::seconds(1))
            .unwrap_or(self.now);
        if self.now.year() > 2099 {
            self.now = self.now.with_year(2000).unwrap_or(self.now);
        }
        if self.now.date() != day {
            self.weekday = self.weekday % 7 + 1;
        }

        self.check_alarms(false);

        // Only the 1 Hz wakeup clock is modelled.
        if self.control.wakeup_enable() && self.control.wakeup_clock() & 0b110 == 0b100 {
            if self.wakeup_count == 0 {
                self.flags.set_wakeup_flag(true);
                self.wakeup_count = self.wakeup_reload;
            } else {
                self.wakeup_count -= 1;
            }
        }
    }

    fn tick(&mut self) {
        if self.subsecond == 0 {
            self.subsecond = u32::from(self.prescaler.synch());
            self.next_second();
        } else {
            self.subsecond -= 1;
        }
        self.check_alarms(true);
    }

    /// Lets `ticks` sub second ticks pass.
    pub fn advance_ticks(&mut self, ticks: u32) {
        if self.init {
            return;
        }
        for _ in 0..ticks {
            self.tick();
        }
    }
}

impl SimRegisters for SimCalendar {
    type Addr = CalendarReg;

    fn read(&mut self, reg: CalendarReg) -> u32 {
        match reg {
            CalendarReg::Time => self.time_register().into(),
            CalendarReg::Date => self.date_register().into(),
            CalendarReg::Control => self.control.into(),
            CalendarReg::Status => self.status().into(),
            CalendarReg::Prescaler => self.prescaler.into(),
            CalendarReg::WakeupTimer => self.wakeup_reload,
            CalendarReg::AlarmA => self.alarms[0].into(),
            CalendarReg::AlarmB => self.alarms[1].into(),
            CalendarReg::WriteProtect => 0,
            CalendarReg::Subsecond => self.subsecond,
            CalendarReg::AlarmASubsecond => self.alarm_subseconds[0].into(),
            CalendarReg::AlarmBSubsecond => self.alarm_subseconds[1].into(),
        }
    }

    fn write(&mut self, reg: CalendarReg, value: u32) {
        match reg {
            CalendarReg::WriteProtect => self.write_unlock(value),
            CalendarReg::Status => self.write_status(value),
            _ if !self.unlocked() => {}
            CalendarReg::Time if self.init => self.write_time(value),
            CalendarReg::Date if self.init => self.write_date(value),
            CalendarReg::Prescaler if self.init => self.prescaler = PrescalerReg::from(value),
            CalendarReg::Control => self.write_control(value),
            CalendarReg::WakeupTimer if !self.control.wakeup_enable() => {
                self.wakeup_reload = value & 0xFFFF;
            }
            CalendarReg::AlarmA if !self.control.alarm_a_enable() => {
                self.alarms[0] = AlarmReg::from(value);
            }
            CalendarReg::AlarmB if !self.control.alarm_b_enable() => {
                self.alarms[1] = AlarmReg::from(value);
            }
            CalendarReg::AlarmASubsecond if !self.control.alarm_a_enable() => {
                self.alarm_subseconds[0] = AlarmSubsecondReg::from(value);
            }
            CalendarReg::AlarmBSubsecond if !self.control.alarm_b_enable() => {
                self.alarm_subseconds[1] = AlarmSubsecondReg::from(value);
            }
            _ => {}
        }
    }

    fn advance_seconds(&mut self, seconds: u32) {
        if self.init {
            return;
        }
        let per_tick = (0..2)
            .any(|index| self.alarm_enabled(index) && self.alarm_subseconds[index].mask() != 0);
        if per_tick {
            let ticks_per_second = u32::from(self.prescaler.synch()) + 1;
            self.advance_ticks(seconds.saturating_mul(ticks_per_second));
        } else {
            for _ in 0..seconds {
                self.next_second();
            }
        }
    }
}

/// Counter RTC model.
#[derive(Debug)]
pub struct SimCounter {
    counter: u32,
    alarm: u32,
    prescaler: u32,
    interrupts: u32,
    flags: u32,
    configure: bool,
}

impl Default for SimCounter {
    fn default() -> Self {
        Self {
            counter: 0,
            alarm: COUNTER_ALARM_RESET,
            prescaler: 0x8000,
            interrupts: 0,
            flags: 0,
            configure: false,
        }
    }
}

impl SimCounter {
    const FLAGS: u32 = 0b111;
    const SYNCHRONIZED: u32 = 1 << 3;
    const CONFIGURE: u32 = 1 << 4;
    const WRITE_DONE: u32 = 1 << 5;

    /// Prescaler reload value, the register itself is write only.
    pub fn prescaler(&self) -> u32 {
        self.prescaler
    }
}

fn set_high(value: &mut u32, high: u32) {
    *value = (high & 0xFFFF) << 16 | *value & 0xFFFF;
}

fn set_low(value: &mut u32, low: u32) {
    *value = *value & 0xFFFF_0000 | low & 0xFFFF;
}

impl SimRegisters for SimCounter {
    type Addr = CounterReg;

    fn read(&mut self, reg: CounterReg) -> u32 {
        match reg {
            CounterReg::ControlHigh => self.interrupts,
            CounterReg::ControlLow => {
                let configure = if self.configure { Self::CONFIGURE } else { 0 };
                self.flags | Self::SYNCHRONIZED | configure | Self::WRITE_DONE
            }
            CounterReg::PrescalerHigh | CounterReg::PrescalerLow => 0,
            CounterReg::DividerHigh => self.prescaler >> 16,
            CounterReg::DividerLow => self.prescaler & 0xFFFF,
            CounterReg::CounterHigh => self.counter >> 16,
            CounterReg::CounterLow => self.counter & 0xFFFF,
            CounterReg::AlarmHigh => self.alarm >> 16,
            CounterReg::AlarmLow => self.alarm & 0xFFFF,
        }
    }

    fn write(&mut self, reg: CounterReg, value: u32) {
        match reg {
            CounterReg::ControlHigh => self.interrupts = value & 0b111,
            CounterReg::ControlLow => {
                self.configure = value & Self::CONFIGURE != 0;
                self.flags &= value & Self::FLAGS;
            }
            _ if !self.configure => {}
            CounterReg::PrescalerHigh => set_high(&mut self.prescaler, value & 0xF),
            CounterReg::PrescalerLow => set_low(&mut self.prescaler, value),
            CounterReg::CounterHigh => set_high(&mut self.counter, value),
            CounterReg::CounterLow => set_low(&mut self.counter, value),
            CounterReg::AlarmHigh => set_high(&mut self.alarm, value),
            CounterReg::AlarmLow => set_low(&mut self.alarm, value),
            CounterReg::DividerHigh | CounterReg::DividerLow => {}
        }
    }

    fn advance_seconds(&mut self, seconds: u32) {
        for _ in 0..seconds {
            self.counter = self.counter.wrapping_add(1);
            self.flags |= 1;
            if self.counter == 0 {
                self.flags |= 1 << 2;
            }
            if self.counter == self.alarm {
                self.flags |= 1 << 1;
            }
        }
    }
}
