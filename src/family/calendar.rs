use super::Family;
use crate::{
    alarm::{Alarm, AlarmId},
    datetime::{Date, Time},
    dispatch::Events,
    platform::{Platform, RegisterBus},
    prescaler::{Prescaler, SplitPrescaler},
    registers::{
        AlarmReg, AlarmSubsecondReg, CalendarReg, ControlReg, DateReg, HourFormat, PrescalerReg,
        StatusReg, TimeReg, WPR_KEY1, WPR_KEY2, WPR_LOCK, WUCKSEL_CK_SPRE,
    },
};

/// Highest RTC input frequency accepted from the divided HSE.
const HSE_RTC_MAX_HZ: u32 = 1_000_000;

/// Reset value of the date register: Monday 1 January, year 00.
const DATE_RESET: u32 = 0x0000_2101;
/// Reset value of the prescaler register: 127 / 255.
const PRESCALER_RESET: u32 = 0x007F_00FF;
/// Reset value of the wakeup timer register.
const WAKEUP_RESET: u32 = 0x0000_FFFF;

/// BCD calendar RTC.
///
/// `H` gives access to the RTC registers and to the platform services, usually
/// a thin wrapper around the device's peripheral access crate.
#[derive(Debug)]
pub struct Calendar<H> {
    hw: H,
}

impl<H> Calendar<H> {
    /// Wraps the hardware access.
    pub fn new(hw: H) -> Self {
        Self { hw }
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

impl<H: RegisterBus<CalendarReg>> Calendar<H> {
    register_access!(
        CalendarReg;
        (time_register, CalendarReg::Time, TimeReg),
        (date_register, CalendarReg::Date, DateReg),
        (control, CalendarReg::Control, ControlReg),
        (status, CalendarReg::Status, StatusReg),
        (prescaler_register, CalendarReg::Prescaler, PrescalerReg),
        (wakeup_timer, CalendarReg::WakeupTimer, u32),
        (alarm_a, CalendarReg::AlarmA, AlarmReg),
        (alarm_b, CalendarReg::AlarmB, AlarmReg),
        (write_protect, CalendarReg::WriteProtect, u32),
        (subsecond, CalendarReg::Subsecond, u32),
        (alarm_a_subsecond, CalendarReg::AlarmASubsecond, AlarmSubsecondReg),
        (alarm_b_subsecond, CalendarReg::AlarmBSubsecond, AlarmSubsecondReg),
    );

    /// Runs `f` with the write protection lifted.
    fn unlocked<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.set_write_protect(WPR_KEY1);
        self.set_write_protect(WPR_KEY2);
        let result = f(self);
        self.set_write_protect(WPR_LOCK);
        result
    }

    /// Runs `f` in initialization mode, the calendar counters are stopped.
    fn init_mode<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.unlocked(|rtc| {
            rtc.modify_status(|status| status.set_init(true));
            while !rtc.status().init_ready() {}
            let result = f(rtc);
            rtc.modify_status(|status| status.set_init(false));
            result
        })
    }

    fn modify_control(&mut self, f: impl FnOnce(&mut ControlReg)) {
        let mut control = self.control();
        f(&mut control);
        self.set_control(control);
    }

    // The flags are rc_w0: write them back as 1 unless `f` clears them.
    fn modify_status(&mut self, f: impl FnOnce(&mut StatusReg)) {
        let mut status = StatusReg::from(u32::from(self.status()) | StatusReg::KEEP_FLAGS);
        f(&mut status);
        self.set_status(status);
    }

    fn sub_second_ticks(&mut self) -> u32 {
        self.subsecond() & 0xFFFF
    }

    fn alarm_registers(&mut self, id: AlarmId) -> (AlarmReg, AlarmSubsecondReg) {
        match id {
            AlarmId::A => (self.alarm_a(), self.alarm_a_subsecond()),
            AlarmId::B => (self.alarm_b(), self.alarm_b_subsecond()),
        }
    }

    fn set_alarm_registers(&mut self, id: AlarmId, reg: AlarmReg, ss: AlarmSubsecondReg) {
        match id {
            AlarmId::A => {
                self.set_alarm_a(reg);
                self.set_alarm_a_subsecond(ss);
            }
            AlarmId::B => {
                self.set_alarm_b(reg);
                self.set_alarm_b_subsecond(ss);
            }
        }
    }
}

fn arm(control: &mut ControlReg, id: AlarmId, enable: bool) {
    match id {
        AlarmId::A => {
            control.set_alarm_a_enable(enable);
            control.set_alarm_a_interrupt(enable);
        }
        AlarmId::B => {
            control.set_alarm_b_enable(enable);
            control.set_alarm_b_interrupt(enable);
        }
    }
}

fn alarm_writable(status: StatusReg, id: AlarmId) -> bool {
    match id {
        AlarmId::A => status.alarm_a_writable(),
        AlarmId::B => status.alarm_b_writable(),
    }
}

fn clear_alarm_flag(status: &mut StatusReg, id: AlarmId) {
    match id {
        AlarmId::A => status.set_alarm_a_flag(false),
        AlarmId::B => status.set_alarm_b_flag(false),
    }
}

impl<H> Family for Calendar<H>
where
    H: Platform + RegisterBus<CalendarReg>,
{
    type Prescaler = SplitPrescaler;
    type Platform = H;

    const ALARMS: &'static [AlarmId] = &[AlarmId::A, AlarmId::B];
    const TWELVE_HOUR: bool = true;

    fn hse_divider(hse_hz: u32) -> Option<u8> {
        (2u8..=31).find(|divider| hse_hz / u32::from(*divider) <= HSE_RTC_MAX_HZ)
    }

    fn platform(&mut self) -> &mut H {
        &mut self.hw
    }

    fn is_initialized(&mut self) -> bool {
        self.status().initialized()
    }

    fn hour_format(&mut self) -> HourFormat {
        self.control().hour_format()
    }

    fn hardware_prescaler(&mut self) -> Option<SplitPrescaler> {
        let prer = self.prescaler_register();
        Some(SplitPrescaler::new(prer.asynch(), prer.synch()))
    }

    fn init(&mut self, format: HourFormat, prescaler: &SplitPrescaler) {
        debug!(
            "calendar init: {:?}, prescaler {}/{}",
            format,
            prescaler.asynch,
            prescaler.synch
        );
        self.init_mode(|rtc| {
            rtc.modify_control(|control| control.set_hour_format(format));
            let mut prer = PrescalerReg::default();
            prer.set_asynch(prescaler.asynch);
            prer.set_synch(prescaler.synch);
            rtc.set_prescaler_register(prer);
        });
    }

    fn restore(&mut self) {}

    fn ready(&mut self) {
        self.unlocked(|rtc| rtc.modify_control(|control| control.set_bypass_shadow(true)));
    }

    fn deinit(&mut self) {
        debug!("calendar deinit");
        self.unlocked(|rtc| {
            rtc.set_control(ControlReg::default());
            while !rtc.status().wakeup_writable() {}
            rtc.set_wakeup_timer(WAKEUP_RESET);
            for id in AlarmId::ALL {
                while !alarm_writable(rtc.status(), id) {}
                rtc.set_alarm_registers(id, AlarmReg::default(), AlarmSubsecondReg::default());
            }

            rtc.modify_status(|status| status.set_init(true));
            while !rtc.status().init_ready() {}
            rtc.set_time_register(TimeReg::default());
            rtc.set_date_register(DateReg::from(DATE_RESET));
            rtc.set_prescaler_register(PrescalerReg::from(PRESCALER_RESET));

            // Leaves initialization mode and clears every flag.
            rtc.set_status(StatusReg::default());
        });
    }

    fn time(&mut self, prescaler: &SplitPrescaler) -> Time {
        // The shadow registers are bypassed: retry when the sub second
        // counter reloaded between the two reads.
        loop {
            let before = self.sub_second_ticks();
            let reg = self.time_register();
            let after = self.sub_second_ticks();
            if after <= before {
                return Time::from_register(reg).with_subseconds(prescaler.ticks_to_millis(after));
            }
        }
    }

    fn set_time(&mut self, time: &Time, format: HourFormat) {
        match time.to_register(format) {
            Ok(reg) => self.init_mode(|rtc| rtc.set_time_register(reg)),
            Err(e) => warn!("time not written: {}", e),
        }
    }

    fn date(&mut self) -> Date {
        Date::from_register(self.date_register())
    }

    fn set_date(&mut self, date: &Date) {
        match date.to_register() {
            Ok(reg) => self.init_mode(|rtc| rtc.set_date_register(reg)),
            Err(e) => warn!("date not written: {}", e),
        }
    }

    // One initialization session, the calendar never shows the new date
    // with the old time.
    fn set_date_time(&mut self, date: &Date, time: &Time, format: HourFormat) {
        match (date.to_register(), time.to_register(format)) {
            (Ok(date), Ok(time)) => self.init_mode(|rtc| {
                rtc.set_date_register(date);
                rtc.set_time_register(time);
            }),
            (Err(e), _) | (_, Err(e)) => warn!("date and time not written: {}", e),
        }
    }

    fn set_alarm(
        &mut self,
        id: AlarmId,
        alarm: &Alarm,
        format: HourFormat,
        prescaler: &SplitPrescaler,
    ) {
        let (reg, ss) = match alarm.to_registers(format, prescaler) {
            Ok(regs) => regs,
            Err(e) => {
                warn!("alarm {:?} not written: {}", id, e);
                return;
            }
        };
        debug!(
            "alarm {:?}: {:#x} / {:#x}",
            id,
            u32::from(reg),
            u32::from(ss)
        );
        self.unlocked(|rtc| {
            rtc.modify_control(|control| arm(control, id, false));
            while !alarm_writable(rtc.status(), id) {}
            rtc.set_alarm_registers(id, reg, ss);
            rtc.modify_status(|status| clear_alarm_flag(status, id));
            if !alarm.mask.is_off() {
                rtc.modify_control(|control| arm(control, id, true));
            }
        });
    }

    fn alarm(&mut self, id: AlarmId, prescaler: &SplitPrescaler) -> Alarm {
        let (reg, ss) = self.alarm_registers(id);
        Alarm::from_registers(reg, ss, prescaler)
    }

    fn disable_alarm(&mut self, id: AlarmId) {
        self.unlocked(|rtc| {
            rtc.modify_control(|control| arm(control, id, false));
            rtc.modify_status(|status| clear_alarm_flag(status, id));
        });
    }

    fn is_alarm_enabled(&mut self, id: AlarmId) -> bool {
        let control = self.control();
        match id {
            AlarmId::A => control.alarm_a_interrupt(),
            AlarmId::B => control.alarm_b_interrupt(),
        }
    }

    fn enable_seconds(&mut self) {
        self.unlocked(|rtc| {
            rtc.modify_control(|control| {
                control.set_wakeup_enable(false);
                control.set_wakeup_interrupt(false);
            });
            while !rtc.status().wakeup_writable() {}
            // ck_spre with a zero reload wakes up once per second.
            rtc.set_wakeup_timer(0);
            rtc.modify_control(|control| control.set_wakeup_clock(WUCKSEL_CK_SPRE));
            rtc.modify_status(|status| status.set_wakeup_flag(false));
            rtc.modify_control(|control| {
                control.set_wakeup_enable(true);
                control.set_wakeup_interrupt(true);
            });
        });
    }

    fn disable_seconds(&mut self) {}

    fn take_events(&mut self) -> Events {
        let status = self.status();
        let control = self.control();
        let events = Events {
            alarms: [
                status.alarm_a_flag() && control.alarm_a_interrupt(),
                status.alarm_b_flag() && control.alarm_b_interrupt(),
            ],
            seconds: status.wakeup_flag() && control.wakeup_interrupt(),
        };
        if !events.is_empty() {
            self.unlocked(|rtc| {
                rtc.modify_status(|status| {
                    if events.alarms[AlarmId::A.index()] {
                        status.set_alarm_a_flag(false);
                    }
                    if events.alarms[AlarmId::B.index()] {
                        status.set_alarm_b_flag(false);
                    }
                    if events.seconds {
                        status.set_wakeup_flag(false);
                    }
                });
            });
        }
        events
    }
}
