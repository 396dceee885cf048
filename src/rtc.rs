//! The RTC driver.
//!
//! [`Rtc`] owns a hardware [`Family`] and keeps the state the hardware cannot
//! hold: the selected clock source and prescaler, the hour format, the alarm
//! settings that are not armed yet and the callback table.
//!
//! Setters are permissive: a value out of range for its field is ignored and
//! the hardware is left untouched. Every accessor is a no-op returning a
//! default value until [`Rtc::init`] succeeded.

use crate::{
    alarm::{Alarm, AlarmId, AlarmMask},
    clock::{ClockManager, ClockSelection, ClockSource, Oscillators},
    datetime::{from_24h, to_24h, Date, Time},
    dispatch::{AlarmCallback, Dispatcher, SecondsCallback},
    epoch,
    family::Family,
    platform::{Irq, Platform},
    prescaler::Prescaler,
    registers::{HourFormat, Period},
    ConfigError,
};

/// Driver configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Oscillator frequencies
    pub oscillators: Oscillators,
    /// Priority of the alarm interrupt
    pub alarm_irq_priority: u8,
    /// Priority of the one second interrupt
    pub seconds_irq_priority: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            oscillators: Oscillators::default(),
            alarm_irq_priority: 2,
            seconds_irq_priority: 2,
        }
    }
}

/// Converts an hour between formats.
fn convert_hours(hours: u8, period: Period, from: HourFormat, to: HourFormat) -> (u8, Period) {
    from_24h(to_24h(hours, period, from), to)
}

/// RTC driver over a hardware [`Family`].
pub struct Rtc<F: Family> {
    family: F,
    config: Config,
    clock: ClockManager<F::Prescaler>,
    format: HourFormat,
    configured: bool,
    time_set: bool,
    alarms: [Alarm; 2],
    dispatcher: Dispatcher,
}

impl<F: Family> Rtc<F> {
    /// Creates the driver. Nothing is touched before [`Rtc::init`].
    pub fn new(family: F, config: Config) -> Self {
        Self {
            family,
            config,
            clock: ClockManager::new(),
            format: HourFormat::TwentyFourHour,
            configured: false,
            time_set: false,
            alarms: [Alarm::default(); 2],
            dispatcher: Dispatcher::new(),
        }
    }

    /// Initializes the RTC on `source`.
    ///
    /// - A calendar that was never initialized, or `reset`, starts over:
    ///   the clock and prescaler are programmed and the date is set to
    ///   Saturday 1 January 2001.
    /// - A running calendar on the same clock is left untouched.
    /// - A running calendar on another clock is moved to `source`: the time,
    ///   the date and the armed alarms survive the backup domain reset this
    ///   requires.
    ///
    /// Hardware without 12-hour support always runs in 24-hour format.
    ///
    /// Returns `true` when the calendar was (re)initialized.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `source` cannot clock the RTC. The RTC
    /// is not reconfigured in that case.
    pub fn init(
        &mut self,
        format: HourFormat,
        source: ClockSource,
        reset: bool,
    ) -> Result<bool, ConfigError> {
        let format = if F::TWELVE_HOUR {
            format
        } else {
            if format == HourFormat::TwelveHour {
                warn!("12-hour format not supported, using 24-hour format");
            }
            HourFormat::TwentyFourHour
        };

        let platform = self.family.platform();
        platform.enable_backup_domain();
        if reset {
            debug!("backup domain reset requested");
            platform.reset_backup_domain();
        }
        platform.enable_rtc();
        let current = platform.rtc_clock();

        let reinit = if reset || !self.family.is_initialized() {
            debug!("initializing calendar on {:?}", source);
            let selection = self.select_source(source)?;
            let prescaler = self.clock.prescaler()?;
            self.start_clock(selection);
            self.family.init(format, &prescaler);
            self.format = format;
            self.family.set_date(&Date::default());
            true
        } else if current != Some(source) {
            self.switch_source(format, source)?;
            false
        } else {
            debug!("calendar already running on {:?}", source);
            let selection = self.select_source(source)?;
            self.start_clock(selection);
            if !self.clock.has_user() {
                if let Some(prescaler) = self.family.hardware_prescaler() {
                    self.clock.adopt(prescaler);
                }
            }
            self.format = format;
            self.family.restore();
            false
        };

        self.family.ready();
        self.configured = true;
        self.time_set = !reinit;
        self.sync_alarms();
        Ok(reinit)
    }

    /// Moves a running calendar to `source`.
    fn switch_source(&mut self, format: HourFormat, source: ClockSource) -> Result<(), ConfigError> {
        debug!(
            "clock source change {:?} -> {:?}",
            self.clock.source(),
            source
        );
        // A new driver knows neither, the hardware does.
        let previous_format = self.family.hour_format();
        let previous = match self.family.hardware_prescaler() {
            Some(prescaler) => prescaler,
            None => self.active_prescaler(),
        };
        let time = self.family.time(&previous);
        let date = self.family.date();
        let family = &mut self.family;
        let armed = AlarmId::ALL.map(|id| {
            if F::supports(id) && family.is_alarm_enabled(id) {
                Some(family.alarm(id, &previous))
            } else {
                None
            }
        });

        let selection = self.select_source(source)?;
        let prescaler = self.clock.prescaler()?;

        self.shutdown();
        self.start_clock(selection);
        self.family.init(format, &prescaler);
        self.format = format;

        let (hours, period) = convert_hours(time.hours, time.period, previous_format, format);
        self.family.set_time(
            &Time::new_12h(hours, time.minutes, time.seconds, period),
            format,
        );
        self.family.set_date(&date);

        for (id, alarm) in AlarmId::ALL.into_iter().zip(armed) {
            if let Some(mut alarm) = alarm {
                (alarm.hours, alarm.period) =
                    convert_hours(alarm.hours, alarm.period, previous_format, format);
                self.arm(id, &alarm);
            }
        }
        if self.dispatcher.has_seconds() {
            self.enable_seconds();
        }
        Ok(())
    }

    fn select_source(&mut self, source: ClockSource) -> Result<ClockSelection, ConfigError> {
        self.clock
            .set_source(source, &self.config.oscillators, F::hse_divider)
    }

    fn start_clock(&mut self, selection: ClockSelection) {
        let platform = self.family.platform();
        platform.enable_oscillator(selection.source);
        platform.select_rtc_clock(selection);
        platform.enable_rtc();
    }

    /// Refreshes the alarm cache, alarms never configured take the current
    /// time.
    fn sync_alarms(&mut self) {
        let prescaler = self.active_prescaler();
        let time = self.family.time(&prescaler);
        let date = self.family.date();
        for &id in F::ALARMS {
            let alarm = self.family.alarm(id, &prescaler);
            let cached = &mut self.alarms[id.index()];
            *cached = alarm;
            if !(1..=31).contains(&cached.day) {
                cached.day = date.day;
                cached.hours = time.hours;
                cached.minutes = time.minutes;
                cached.seconds = time.seconds;
                cached.subseconds = time.subseconds;
                cached.period = time.period;
            }
        }
    }

    fn shutdown(&mut self) {
        self.family.deinit();
        let platform = self.family.platform();
        platform.disable_rtc();
        platform.disable_irq(Irq::Alarm);
        platform.disable_irq(Irq::Seconds);
    }

    /// Stops the RTC, optionally dropping every callback.
    pub fn deinit(&mut self, reset_callbacks: bool) {
        debug!("deinit");
        self.shutdown();
        if reset_callbacks {
            self.dispatcher.clear();
        }
        self.configured = false;
        self.time_set = false;
    }

    /// Selects the clock source. A running RTC is moved to it right away,
    /// otherwise it is used by the next [`Rtc::init`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `source` cannot clock the RTC.
    pub fn set_clock_source(&mut self, source: ClockSource) -> Result<(), ConfigError> {
        if self.configured {
            self.init(self.format, source, false)?;
        } else {
            self.select_source(source)?;
        }
        Ok(())
    }

    /// Selected clock source.
    pub fn clock_source(&self) -> ClockSource {
        self.clock.source()
    }

    /// Initializes the RTC on `source` for use as a low power wakeup source.
    /// A calendar whose time was never set starts at 12:00:00.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `source` cannot clock the RTC.
    pub fn configure_for_low_power(&mut self, source: ClockSource) -> Result<(), ConfigError> {
        self.init(self.format, source, false)?;
        if !self.time_set {
            self.set_time(Time::new_12h(12, 0, 0, Period::Am));
        }
        Ok(())
    }

    /// Prescaler in use: the user override, else the value computed for the
    /// clock source, else the value found in the hardware.
    pub fn prescaler(&mut self) -> F::Prescaler {
        self.active_prescaler()
    }

    /// Overrides the computed prescaler. Takes effect on the next
    /// initialization, an out of range value restores the computed one.
    pub fn set_prescaler(&mut self, prescaler: F::Prescaler) {
        self.clock.set_user(prescaler);
    }

    fn active_prescaler(&mut self) -> F::Prescaler {
        if let Ok(prescaler) = self.clock.prescaler() {
            return prescaler;
        }
        if self.configured {
            if let Some(prescaler) = self.family.hardware_prescaler() {
                return prescaler;
            }
        }
        F::Prescaler::RESET
    }

    /// Hour format of the calendar.
    pub fn hour_format(&self) -> HourFormat {
        self.format
    }

    /// Whether the hardware calendar holds a configuration, possibly from
    /// before a system reset.
    pub fn is_configured(&mut self) -> bool {
        self.family.is_initialized()
    }

    /// Whether the time was set since the calendar was last initialized.
    pub fn is_time_set(&self) -> bool {
        self.time_set
    }

    fn check_ready(&self) -> bool {
        if !self.configured {
            warn!("RTC not initialized");
        }
        self.configured
    }

    /// Reads the time of day.
    pub fn time(&mut self) -> Time {
        if !self.check_ready() {
            return Time::default();
        }
        let prescaler = self.active_prescaler();
        self.family.time(&prescaler)
    }

    /// Sets the time of day. Sub seconds are ignored, the hardware counter
    /// cannot be written.
    pub fn set_time(&mut self, time: Time) {
        if !self.check_ready() {
            return;
        }
        if !time.is_valid(self.format) {
            warn!(
                "invalid time {}:{}:{} ignored",
                time.hours,
                time.minutes,
                time.seconds
            );
            return;
        }
        let time = match self.format {
            HourFormat::TwentyFourHour => Time {
                period: Period::Am,
                ..time
            },
            HourFormat::TwelveHour => time,
        };
        self.family.set_time(&time, self.format);
        self.time_set = true;
    }

    fn update_time(&mut self, f: impl FnOnce(&mut Time)) {
        if !self.check_ready() {
            return;
        }
        let mut time = self.time();
        f(&mut time);
        self.set_time(time);
    }

    /// Seconds (0-59).
    pub fn seconds(&mut self) -> u8 {
        self.time().seconds
    }

    /// Sets the seconds.
    pub fn set_seconds(&mut self, seconds: u8) {
        self.update_time(|time| time.seconds = seconds);
    }

    /// Minutes (0-59).
    pub fn minutes(&mut self) -> u8 {
        self.time().minutes
    }

    /// Sets the minutes.
    pub fn set_minutes(&mut self, minutes: u8) {
        self.update_time(|time| time.minutes = minutes);
    }

    /// Hours in the active format, with the period for 12-hour format.
    pub fn hours(&mut self) -> (u8, Period) {
        let time = self.time();
        (time.hours, time.period)
    }

    /// Sets the hours, `period` only matters in 12-hour format.
    pub fn set_hours(&mut self, hours: u8, period: Period) {
        self.update_time(|time| {
            time.hours = hours;
            time.period = period;
        });
    }

    /// Milliseconds within the current second.
    pub fn subseconds(&mut self) -> u16 {
        self.time().subseconds
    }

    /// Reads the date.
    pub fn date(&mut self) -> Date {
        if !self.check_ready() {
            return Date::default();
        }
        self.family.date()
    }

    /// Sets the date.
    pub fn set_date(&mut self, date: Date) {
        if !self.check_ready() {
            return;
        }
        if !date.is_valid() {
            warn!(
                "invalid date {}-{}-{} ({}) ignored",
                date.year,
                date.month,
                date.day,
                date.weekday
            );
            return;
        }
        self.family.set_date(&date);
        self.time_set = true;
    }

    fn update_date(&mut self, f: impl FnOnce(&mut Date)) {
        if !self.check_ready() {
            return;
        }
        let mut date = self.date();
        f(&mut date);
        self.set_date(date);
    }

    /// Day of week (1-7, Monday is 1).
    pub fn weekday(&mut self) -> u8 {
        self.date().weekday
    }

    /// Sets the day of week.
    pub fn set_weekday(&mut self, weekday: u8) {
        self.update_date(|date| date.weekday = weekday);
    }

    /// Day of month (1-31).
    pub fn day(&mut self) -> u8 {
        self.date().day
    }

    /// Sets the day of month.
    pub fn set_day(&mut self, day: u8) {
        self.update_date(|date| date.day = day);
    }

    /// Month (1-12).
    pub fn month(&mut self) -> u8 {
        self.date().month
    }

    /// Sets the month.
    pub fn set_month(&mut self, month: u8) {
        self.update_date(|date| date.month = month);
    }

    /// Year within the century (0-99).
    pub fn year(&mut self) -> u8 {
        self.date().year
    }

    /// Sets the year.
    pub fn set_year(&mut self, year: u8) {
        self.update_date(|date| date.year = year);
    }

    fn check_alarm(&self, id: AlarmId) -> bool {
        if !self.check_ready() {
            return false;
        }
        if !F::supports(id) {
            warn!("alarm {:?} not available", id);
            return false;
        }
        true
    }

    /// Programs the hardware and, unless the mask is off, enables the
    /// interrupt.
    fn arm(&mut self, id: AlarmId, alarm: &Alarm) {
        let prescaler = self.active_prescaler();
        self.family.set_alarm(id, alarm, self.format, &prescaler);
        if !alarm.mask.is_off() {
            let priority = self.config.alarm_irq_priority;
            let platform = self.family.platform();
            platform.set_irq_priority(Irq::Alarm, priority);
            platform.enable_irq(Irq::Alarm);
        }
    }

    /// Programs and arms alarm `id`.
    ///
    /// [`AlarmMask::OFF`] programs every field as ignored and leaves the alarm
    /// disarmed. An alarm with a field out of range is ignored.
    pub fn start_alarm(&mut self, id: AlarmId, alarm: Alarm) {
        if !self.check_alarm(id) {
            return;
        }
        if !alarm.is_valid(self.format) {
            warn!(
                "invalid alarm {:?} at day {} {}:{}:{} ignored",
                id,
                alarm.day,
                alarm.hours,
                alarm.minutes,
                alarm.seconds
            );
            return;
        }
        let alarm = match self.format {
            HourFormat::TwentyFourHour => alarm.with_period(Period::Am),
            HourFormat::TwelveHour => alarm,
        };
        self.alarms[id.index()] = alarm;
        self.arm(id, &alarm);
    }

    /// Disarms alarm `id` and clears its pending flag.
    pub fn stop_alarm(&mut self, id: AlarmId) {
        if self.check_alarm(id) {
            self.family.disable_alarm(id);
        }
    }

    /// Whether alarm `id` is armed.
    pub fn is_alarm_enabled(&mut self, id: AlarmId) -> bool {
        self.configured && F::supports(id) && self.family.is_alarm_enabled(id)
    }

    /// Settings of alarm `id`, read back from the hardware while armed.
    pub fn alarm(&mut self, id: AlarmId) -> Alarm {
        if !self.check_alarm(id) {
            return Alarm::default();
        }
        if self.family.is_alarm_enabled(id) {
            let prescaler = self.active_prescaler();
            self.alarms[id.index()] = self.family.alarm(id, &prescaler);
        }
        self.alarms[id.index()]
    }

    /// Arms alarm `id` with its stored settings and `mask`, or stops it when
    /// `mask` is [`AlarmMask::OFF`].
    pub fn enable_alarm(&mut self, id: AlarmId, mask: AlarmMask) {
        if mask.is_off() {
            self.stop_alarm(id);
        } else {
            let alarm = Alarm {
                mask,
                ..self.alarms[id.index()]
            };
            self.start_alarm(id, alarm);
        }
    }

    fn update_alarm(&mut self, id: AlarmId, valid: bool, f: impl FnOnce(&mut Alarm)) {
        if !self.check_alarm(id) {
            return;
        }
        if !valid {
            warn!("invalid alarm {:?} field ignored", id);
            return;
        }
        f(&mut self.alarms[id.index()]);
    }

    /// Stores the alarm day, applied by [`Rtc::enable_alarm`].
    pub fn set_alarm_day(&mut self, id: AlarmId, day: u8) {
        self.update_alarm(id, (1..=31).contains(&day), |alarm| alarm.day = day);
    }

    /// Stores the alarm hours, applied by [`Rtc::enable_alarm`].
    pub fn set_alarm_hours(&mut self, id: AlarmId, hours: u8, period: Period) {
        let valid = crate::datetime::is_valid_hour(hours, self.format);
        self.update_alarm(id, valid, |alarm| {
            alarm.hours = hours;
            alarm.period = period;
        });
    }

    /// Stores the alarm minutes, applied by [`Rtc::enable_alarm`].
    pub fn set_alarm_minutes(&mut self, id: AlarmId, minutes: u8) {
        self.update_alarm(id, minutes <= 59, |alarm| alarm.minutes = minutes);
    }

    /// Stores the alarm seconds, applied by [`Rtc::enable_alarm`].
    pub fn set_alarm_seconds(&mut self, id: AlarmId, seconds: u8) {
        self.update_alarm(id, seconds <= 59, |alarm| alarm.seconds = seconds);
    }

    /// Stores the alarm sub seconds in milliseconds, applied by
    /// [`Rtc::enable_alarm`]. Values of 1000 and above disable the
    /// sub second comparison.
    pub fn set_alarm_subseconds(&mut self, id: AlarmId, subseconds: u16) {
        self.update_alarm(id, true, |alarm| alarm.subseconds = subseconds);
    }

    /// Stores the alarm time of day, applied by [`Rtc::enable_alarm`].
    pub fn set_alarm_time(&mut self, id: AlarmId, time: Time) {
        let valid = time.is_valid(self.format);
        self.update_alarm(id, valid, |alarm| {
            alarm.hours = time.hours;
            alarm.minutes = time.minutes;
            alarm.seconds = time.seconds;
            alarm.subseconds = time.subseconds;
            alarm.period = time.period;
        });
    }

    /// Arms alarm `id` for the Unix timestamp `timestamp`.
    ///
    /// The hardware cannot compare month and year:
    /// [`AlarmMask::MATCH_DHHMMSS`] fires on the day of month of `timestamp`
    /// in every month.
    pub fn set_alarm_from_epoch(
        &mut self,
        id: AlarmId,
        timestamp: u32,
        mask: AlarmMask,
        subseconds: u16,
    ) {
        let (date, time) = epoch::from_epoch(timestamp, self.format);
        self.start_alarm(
            id,
            Alarm {
                day: date.day,
                hours: time.hours,
                minutes: time.minutes,
                seconds: time.seconds,
                subseconds,
                period: time.period,
                mask,
            },
        );
    }

    /// Unix timestamp of alarm `id` within the current month.
    pub fn alarm_epoch(&mut self, id: AlarmId) -> u32 {
        let alarm = self.alarm(id);
        let date = Date {
            day: alarm.day,
            ..self.date()
        };
        let time = Time::new_12h(alarm.hours, alarm.minutes, alarm.seconds, alarm.period);
        epoch::to_epoch(&date, &time, self.format)
    }

    /// Current Unix timestamp.
    pub fn epoch(&mut self) -> u32 {
        self.epoch_with_subseconds().0
    }

    /// Current Unix timestamp and milliseconds within the second.
    pub fn epoch_with_subseconds(&mut self) -> (u32, u16) {
        // Re-read when midnight passes between the time and date reads.
        let mut date = self.date();
        loop {
            let time = self.time();
            let after = self.date();
            if after == date {
                return (epoch::to_epoch(&date, &time, self.format), time.subseconds);
            }
            date = after;
        }
    }

    /// Sets date and time from a Unix timestamp, clamped to 2000-2099.
    pub fn set_epoch(&mut self, timestamp: u32) {
        if !self.check_ready() {
            return;
        }
        let (date, time) = epoch::from_epoch(timestamp, self.format);
        self.family.set_date_time(&date, &time, self.format);
        self.time_set = true;
    }

    /// Seconds since 2000-01-01T00:00:00Z.
    pub fn y2k_epoch(&mut self) -> u32 {
        self.epoch() - epoch::EPOCH_Y2K_OFFSET
    }

    /// Sets date and time from seconds since 2000-01-01T00:00:00Z.
    pub fn set_y2k_epoch(&mut self, timestamp: u32) {
        self.set_epoch(timestamp.saturating_add(epoch::EPOCH_Y2K_OFFSET));
    }

    /// Calls `callback` with `data` when alarm `id` fires.
    pub fn attach_alarm_callback(&mut self, id: AlarmId, callback: AlarmCallback, data: usize) {
        if F::supports(id) {
            self.dispatcher.attach_alarm(id, callback, data);
        } else {
            warn!("alarm {:?} not available", id);
        }
    }

    /// Removes the callback of alarm `id`.
    pub fn detach_alarm_callback(&mut self, id: AlarmId) {
        self.dispatcher.detach_alarm(id);
    }

    fn enable_seconds(&mut self) {
        self.family.enable_seconds();
        let priority = self.config.seconds_irq_priority;
        let platform = self.family.platform();
        platform.set_irq_priority(Irq::Seconds, priority);
        platform.enable_irq(Irq::Seconds);
    }

    /// Calls `callback` once per second.
    pub fn attach_seconds_callback(&mut self, callback: SecondsCallback) {
        if !self.check_ready() {
            return;
        }
        self.dispatcher.attach_seconds(callback);
        self.enable_seconds();
    }

    /// Removes the one second callback.
    pub fn detach_seconds_callback(&mut self) {
        self.dispatcher.detach_seconds();
        if self.configured {
            self.family.disable_seconds();
        }
    }

    /// Interrupt handler body: clears the pending flags and runs the
    /// callbacks. Call it from the alarm and one second interrupt handlers.
    pub fn on_interrupt(&mut self) {
        if !self.configured {
            return;
        }
        let events = self.family.take_events();
        trace!(
            "events: alarm a {} alarm b {} seconds {}",
            events.alarms[0],
            events.alarms[1],
            events.seconds
        );
        self.dispatcher.dispatch(events);
    }

    /// Hardware family.
    pub fn family(&self) -> &F {
        &self.family
    }

    /// Hardware family, for direct register access.
    pub fn family_mut(&mut self) -> &mut F {
        &mut self.family
    }

    /// Gives the hardware family back.
    pub fn release(self) -> F {
        self.family
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        family::{Calendar, Counter},
        platform::RegisterBus,
        prescaler::{CombinedPrescaler, SplitPrescaler},
        registers::{AlarmReg, CalendarReg},
        sim::{Sim, SimCalendar, SimCounter},
    };
    use core::sync::atomic::{AtomicUsize, Ordering};

    type CalendarRtc = Rtc<Calendar<Sim<SimCalendar>>>;
    type CounterRtc = Rtc<Counter<Sim<SimCounter>>>;

    // 2023-06-15T10:30:00Z, a Thursday
    const JUNE_15: u32 = 1_686_825_000;

    fn calendar_rtc() -> CalendarRtc {
        Rtc::new(Calendar::new(Sim::default()), Config::default())
    }

    fn counter_rtc() -> CounterRtc {
        Rtc::new(Counter::new(Sim::default()), Config::default())
    }

    fn running(format: HourFormat) -> CalendarRtc {
        let mut rtc = calendar_rtc();
        assert_eq!(rtc.init(format, ClockSource::Lse, false), Ok(true));
        rtc.set_epoch(JUNE_15);
        rtc
    }

    fn calendar_sim(rtc: &mut CalendarRtc) -> &mut Sim<SimCalendar> {
        rtc.family_mut().hardware()
    }

    fn counter_sim(rtc: &mut CounterRtc) -> &mut Sim<SimCounter> {
        rtc.family_mut().hardware()
    }

    #[test]
    fn test_first_init() {
        let mut rtc = calendar_rtc();
        assert!(!rtc.is_configured());
        assert_eq!(
            rtc.init(HourFormat::TwentyFourHour, ClockSource::Lse, false),
            Ok(true)
        );
        assert!(rtc.is_configured());
        assert!(!rtc.is_time_set());
        assert_eq!(rtc.clock_source(), ClockSource::Lse);
        assert_eq!(rtc.prescaler(), SplitPrescaler::new(127, 255));
        assert_eq!(rtc.date(), Date::new(1, 1, 1, 6));
        assert_eq!(rtc.time(), Time::new(0, 0, 0));

        let platform = &calendar_sim(&mut rtc).platform;
        assert!(platform.backup_enabled);
        assert!(platform.rtc_enabled);
        assert!(platform.oscillators[usize::from(u8::from(ClockSource::Lse))]);
        assert_eq!(platform.rtc_clock, Some(ClockSource::Lse));
    }

    #[test]
    fn test_hse_clock() {
        let mut rtc = calendar_rtc();
        assert_eq!(
            rtc.init(HourFormat::TwentyFourHour, ClockSource::Hse, false),
            Ok(true)
        );
        assert_eq!(rtc.prescaler(), SplitPrescaler::new(124, 7999));
        assert_eq!(calendar_sim(&mut rtc).platform.hse_divider, 8);
    }

    #[test]
    fn test_hse_too_fast() {
        let mut config = Config::default();
        config.oscillators.hse_hz = 48_000_000;
        let mut rtc = Rtc::new(Calendar::new(Sim::<SimCalendar>::default()), config);
        assert_eq!(
            rtc.init(HourFormat::TwentyFourHour, ClockSource::Hse, false),
            Err(ConfigError::HseTooFast(48_000_000))
        );
        assert!(!rtc.is_configured());
        assert_eq!(calendar_sim(&mut rtc).platform.rtc_clock, None);
    }

    #[test]
    fn test_user_prescaler() {
        let mut rtc = calendar_rtc();
        rtc.set_prescaler(SplitPrescaler::new(3, 8191));
        rtc.init(HourFormat::TwentyFourHour, ClockSource::Lse, false)
            .unwrap();
        assert_eq!(rtc.prescaler(), SplitPrescaler::new(3, 8191));
        assert_eq!(
            rtc.family_mut().hardware_prescaler(),
            Some(SplitPrescaler::new(3, 8191))
        );

        // Out of range: back to the computed value.
        rtc.set_prescaler(SplitPrescaler::new(200, 255));
        assert_eq!(rtc.prescaler(), SplitPrescaler::new(127, 255));
    }

    #[test]
    fn test_epoch_scenario() {
        let mut rtc = running(HourFormat::TwentyFourHour);
        assert!(rtc.is_time_set());
        assert_eq!(rtc.date(), Date::new(23, 6, 15, 4));
        assert_eq!(rtc.time(), Time::new(10, 30, 0));
        assert_eq!(rtc.epoch(), JUNE_15);
        assert_eq!(rtc.y2k_epoch(), JUNE_15 - epoch::EPOCH_Y2K_OFFSET);

        calendar_sim(&mut rtc).advance_ticks(256 * 2 + 64);
        assert_eq!(rtc.epoch_with_subseconds(), (JUNE_15 + 2, 250));

        rtc.set_y2k_epoch(0);
        assert_eq!(rtc.date(), Date::new(0, 1, 1, 6));
        assert_eq!(rtc.epoch(), epoch::EPOCH_Y2K_OFFSET);
    }

    #[test]
    fn test_field_accessors() {
        let mut rtc = running(HourFormat::TwentyFourHour);
        rtc.set_seconds(42);
        rtc.set_minutes(7);
        rtc.set_hours(21, Period::Am);
        rtc.set_weekday(5);
        rtc.set_day(16);
        rtc.set_month(7);
        rtc.set_year(24);
        assert_eq!(rtc.seconds(), 42);
        assert_eq!(rtc.minutes(), 7);
        assert_eq!(rtc.hours(), (21, Period::Am));
        assert_eq!(rtc.subseconds(), 0);
        assert_eq!(rtc.weekday(), 5);
        assert_eq!(rtc.day(), 16);
        assert_eq!(rtc.month(), 7);
        assert_eq!(rtc.year(), 24);
    }

    #[test]
    fn test_setters_ignore_invalid_values() {
        let mut rtc = running(HourFormat::TwentyFourHour);
        rtc.set_seconds(60);
        rtc.set_minutes(61);
        rtc.set_hours(24, Period::Am);
        rtc.set_weekday(0);
        rtc.set_weekday(8);
        rtc.set_day(32);
        rtc.set_month(13);
        rtc.set_month(0);
        rtc.set_year(100);
        rtc.set_time(Time::new(10, 60, 0));
        rtc.set_date(Date::new(23, 6, 0, 4));
        assert_eq!(rtc.time(), Time::new(10, 30, 0));
        assert_eq!(rtc.date(), Date::new(23, 6, 15, 4));

        let alarm = rtc.alarm(AlarmId::A);
        rtc.set_alarm_day(AlarmId::A, 0);
        rtc.set_alarm_hours(AlarmId::A, 24, Period::Am);
        rtc.set_alarm_minutes(AlarmId::A, 60);
        rtc.set_alarm_seconds(AlarmId::A, 60);
        assert_eq!(rtc.alarm(AlarmId::A), alarm);

        rtc.start_alarm(AlarmId::A, Alarm::new(15, 25, 0, 0, AlarmMask::MATCH_HHMMSS));
        assert!(!rtc.is_alarm_enabled(AlarmId::A));
    }

    #[test]
    fn test_before_init() {
        let mut rtc = calendar_rtc();
        rtc.set_time(Time::new(10, 0, 0));
        rtc.set_date(Date::new(23, 6, 15, 4));
        rtc.start_alarm(AlarmId::A, Alarm::new(15, 10, 0, 0, AlarmMask::MATCH_SS));
        assert_eq!(rtc.time(), Time::default());
        assert_eq!(rtc.date(), Date::default());
        assert!(!rtc.is_time_set());
        assert!(!rtc.is_alarm_enabled(AlarmId::A));
        assert_eq!(rtc.alarm(AlarmId::A), Alarm::default());

        // The hardware was not touched.
        let sim = calendar_sim(&mut rtc);
        assert!(!sim.platform.rtc_enabled);
        assert_eq!(sim.read(CalendarReg::Time), 0);
        assert_eq!(sim.read(CalendarReg::Control), 0);
    }

    #[test]
    fn test_warm_init_keeps_calendar() {
        let mut rtc = running(HourFormat::TwentyFourHour);
        calendar_sim(&mut rtc).advance_seconds(5);
        assert_eq!(
            rtc.init(HourFormat::TwentyFourHour, ClockSource::Lse, false),
            Ok(false)
        );
        assert!(rtc.is_time_set());
        assert_eq!(rtc.epoch(), JUNE_15 + 5);

        // Same after a system reset: a new driver over the running hardware.
        let hw = rtc.release().release();
        let mut rtc = Rtc::new(Calendar::new(hw), Config::default());
        assert!(rtc.is_configured());
        assert_eq!(
            rtc.init(HourFormat::TwentyFourHour, ClockSource::Lse, false),
            Ok(false)
        );
        assert_eq!(rtc.prescaler(), SplitPrescaler::new(127, 255));
        assert_eq!(rtc.epoch(), JUNE_15 + 5);
        assert_eq!(calendar_sim(&mut rtc).platform.domain_resets, 0);
    }

    #[test]
    fn test_forced_reset() {
        let mut rtc = running(HourFormat::TwentyFourHour);
        assert_eq!(
            rtc.init(HourFormat::TwentyFourHour, ClockSource::Lse, true),
            Ok(true)
        );
        assert!(!rtc.is_time_set());
        assert_eq!(rtc.date(), Date::new(1, 1, 1, 6));
        assert_eq!(calendar_sim(&mut rtc).platform.domain_resets, 1);
    }

    static SWITCH_ALARMS: AtomicUsize = AtomicUsize::new(0);

    fn on_switch_alarm(_data: usize) {
        SWITCH_ALARMS.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn test_clock_switch_preserves_state() {
        let mut rtc = running(HourFormat::TwentyFourHour);
        let alarm = Alarm::new(15, 10, 31, 0, AlarmMask::MATCH_DHHMMSS);
        rtc.start_alarm(AlarmId::A, alarm);
        rtc.attach_alarm_callback(AlarmId::A, on_switch_alarm, 0);
        calendar_sim(&mut rtc).advance_seconds(5);

        assert_eq!(
            rtc.init(HourFormat::TwentyFourHour, ClockSource::Lsi, false),
            Ok(false)
        );
        assert_eq!(rtc.clock_source(), ClockSource::Lsi);
        assert_eq!(rtc.prescaler(), SplitPrescaler::new(127, 249));
        assert_eq!(
            rtc.family_mut().hardware_prescaler(),
            Some(SplitPrescaler::new(127, 249))
        );
        assert_eq!(rtc.epoch(), JUNE_15 + 5);
        assert!(rtc.is_alarm_enabled(AlarmId::A));
        assert_eq!(rtc.alarm(AlarmId::A), alarm);

        let sim = calendar_sim(&mut rtc);
        assert_eq!(sim.platform.domain_resets, 1);
        assert_eq!(sim.platform.rtc_clock, Some(ClockSource::Lsi));
        assert!(sim.platform.irq_enabled[0]);

        calendar_sim(&mut rtc).advance_seconds(55);
        rtc.on_interrupt();
        assert_eq!(SWITCH_ALARMS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_twelve_hour_clock_switch_after_system_reset() {
        let mut rtc = running(HourFormat::TwelveHour);
        rtc.set_epoch(JUNE_15 + 4 * 3600);
        assert_eq!(rtc.hours(), (2, Period::Pm));

        let hw = rtc.release().release();
        let mut rtc = Rtc::new(Calendar::new(hw), Config::default());
        assert_eq!(
            rtc.init(HourFormat::TwelveHour, ClockSource::Lsi, false),
            Ok(false)
        );
        assert_eq!(rtc.hours(), (2, Period::Pm));
        assert_eq!(rtc.epoch(), 1_686_839_400);
        assert_eq!(calendar_sim(&mut rtc).platform.domain_resets, 1);
    }

    #[test]
    fn test_set_epoch_writes_date_and_time_together() {
        let mut rtc = running(HourFormat::TwentyFourHour);
        let sessions = calendar_sim(&mut rtc).rtc.init_sessions();
        rtc.set_epoch(JUNE_15 + 86_400 + 60);
        assert_eq!(calendar_sim(&mut rtc).rtc.init_sessions(), sessions + 1);
        assert_eq!(rtc.date(), Date::new(23, 6, 16, 5));
        assert_eq!(rtc.epoch(), JUNE_15 + 86_400 + 60);
    }

    #[test]
    fn test_set_clock_source() {
        let mut rtc = calendar_rtc();
        rtc.set_clock_source(ClockSource::Lsi).unwrap();
        assert_eq!(rtc.clock_source(), ClockSource::Lsi);
        assert_eq!(calendar_sim(&mut rtc).platform.rtc_clock, None);

        rtc.init(HourFormat::TwentyFourHour, ClockSource::Lsi, false)
            .unwrap();
        rtc.set_epoch(JUNE_15);
        rtc.set_clock_source(ClockSource::Lse).unwrap();
        assert_eq!(calendar_sim(&mut rtc).platform.rtc_clock, Some(ClockSource::Lse));
        assert_eq!(rtc.prescaler(), SplitPrescaler::new(127, 255));
        assert_eq!(rtc.epoch(), JUNE_15);
    }

    #[test]
    fn test_configure_for_low_power() {
        let mut rtc = calendar_rtc();
        rtc.configure_for_low_power(ClockSource::Lse).unwrap();
        assert!(rtc.is_time_set());
        assert_eq!(rtc.time(), Time::new(12, 0, 0));

        // A time already set is kept.
        rtc.set_time(Time::new(8, 15, 0));
        rtc.configure_for_low_power(ClockSource::Lse).unwrap();
        assert_eq!(rtc.time(), Time::new(8, 15, 0));
    }

    static ALARM_CALLS: AtomicUsize = AtomicUsize::new(0);
    static ALARM_DATA: AtomicUsize = AtomicUsize::new(0);

    fn on_alarm(data: usize) {
        ALARM_CALLS.fetch_add(1, Ordering::SeqCst);
        ALARM_DATA.store(data, Ordering::SeqCst);
    }

    #[test]
    fn test_alarm_fires_callback_once() {
        let mut rtc = running(HourFormat::TwentyFourHour);
        rtc.set_time(Time::new(10, 29, 58));
        rtc.attach_alarm_callback(AlarmId::A, on_alarm, 0xC0FFEE);
        rtc.start_alarm(AlarmId::A, Alarm::new(15, 10, 30, 0, AlarmMask::MATCH_HHMMSS));

        let platform = &calendar_sim(&mut rtc).platform;
        assert!(platform.irq_enabled[0]);
        assert_eq!(platform.irq_priority[0], 2);

        calendar_sim(&mut rtc).advance_seconds(1);
        rtc.on_interrupt();
        assert_eq!(ALARM_CALLS.load(Ordering::SeqCst), 0);

        calendar_sim(&mut rtc).advance_seconds(1);
        rtc.on_interrupt();
        rtc.on_interrupt();
        assert_eq!(ALARM_CALLS.load(Ordering::SeqCst), 1);
        assert_eq!(ALARM_DATA.load(Ordering::SeqCst), 0xC0FFEE);

        rtc.detach_alarm_callback(AlarmId::A);
        calendar_sim(&mut rtc).advance_seconds(24 * 3600);
        rtc.on_interrupt();
        assert_eq!(ALARM_CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_alarm_mask_polarity() {
        let mut rtc = running(HourFormat::TwentyFourHour);
        rtc.start_alarm(AlarmId::A, Alarm::new(15, 10, 45, 0, AlarmMask::MATCH_MMSS));
        let reg = AlarmReg::from(calendar_sim(&mut rtc).read(CalendarReg::AlarmA));
        assert!(reg.mask_day());
        assert!(reg.mask_hours());
        assert!(!reg.mask_minutes());
        assert!(!reg.mask_seconds());
        assert_eq!(rtc.alarm(AlarmId::A).mask, AlarmMask::MATCH_MMSS);

        // Month and year cannot be compared, they do not change the hardware.
        rtc.start_alarm(
            AlarmId::A,
            Alarm::new(15, 10, 45, 0, AlarmMask::MATCH_MMSS | AlarmMask::MONTH | AlarmMask::YEAR),
        );
        assert_eq!(
            AlarmReg::from(calendar_sim(&mut rtc).read(CalendarReg::AlarmA)),
            reg
        );

        // Fires every hour at minute 45.
        calendar_sim(&mut rtc).advance_seconds(15 * 60);
        assert_eq!(rtc.family_mut().take_events().alarms, [true, false]);
        calendar_sim(&mut rtc).advance_seconds(3600);
        assert_eq!(rtc.family_mut().take_events().alarms, [true, false]);
    }

    #[test]
    fn test_alarm_off_disarms() {
        let mut rtc = running(HourFormat::TwentyFourHour);
        rtc.start_alarm(AlarmId::A, Alarm::new(15, 10, 45, 0, AlarmMask::MATCH_SS));
        assert!(rtc.is_alarm_enabled(AlarmId::A));
        rtc.enable_alarm(AlarmId::A, AlarmMask::OFF);
        assert!(!rtc.is_alarm_enabled(AlarmId::A));

        rtc.start_alarm(AlarmId::A, Alarm::new(15, 10, 45, 0, AlarmMask::OFF));
        assert!(!rtc.is_alarm_enabled(AlarmId::A));
        let reg = calendar_sim(&mut rtc).read(CalendarReg::AlarmA);
        assert_eq!(reg & 0x8080_8080, 0x8080_8080);
    }

    #[test]
    fn test_alarm_b_independent() {
        let mut rtc = running(HourFormat::TwentyFourHour);
        rtc.start_alarm(AlarmId::A, Alarm::new(15, 10, 30, 10, AlarmMask::MATCH_SS));
        rtc.start_alarm(AlarmId::B, Alarm::new(15, 10, 30, 20, AlarmMask::MATCH_SS));
        assert!(rtc.is_alarm_enabled(AlarmId::A));
        assert!(rtc.is_alarm_enabled(AlarmId::B));

        calendar_sim(&mut rtc).advance_seconds(10);
        assert_eq!(rtc.family_mut().take_events().alarms, [true, false]);
        calendar_sim(&mut rtc).advance_seconds(10);
        assert_eq!(rtc.family_mut().take_events().alarms, [false, true]);

        rtc.stop_alarm(AlarmId::A);
        assert!(!rtc.is_alarm_enabled(AlarmId::A));
        assert!(rtc.is_alarm_enabled(AlarmId::B));
        assert_eq!(rtc.alarm(AlarmId::B).seconds, 20);

        calendar_sim(&mut rtc).advance_seconds(60);
        assert_eq!(rtc.family_mut().take_events().alarms, [false, true]);
    }

    #[test]
    fn test_enable_alarm_with_stored_fields() {
        let mut rtc = running(HourFormat::TwentyFourHour);
        // Never configured: the stored alarm mirrors the time of the first init.
        let mirrored = rtc.alarm(AlarmId::B);
        assert_eq!((mirrored.day, mirrored.hours, mirrored.minutes), (1, 0, 0));

        rtc.set_alarm_day(AlarmId::B, 15);
        rtc.set_alarm_time(AlarmId::B, Time::new(10, 30, 5).with_subseconds(1000));
        rtc.enable_alarm(AlarmId::B, AlarmMask::MATCH_DHHMMSS);
        assert!(rtc.is_alarm_enabled(AlarmId::B));
        assert_eq!(
            rtc.alarm(AlarmId::B),
            Alarm::new(15, 10, 30, 5, AlarmMask::MATCH_DHHMMSS)
        );

        calendar_sim(&mut rtc).advance_seconds(5);
        assert_eq!(rtc.family_mut().take_events().alarms, [false, true]);
    }

    #[test]
    fn test_alarm_subseconds() {
        let mut rtc = running(HourFormat::TwentyFourHour);
        rtc.set_alarm_seconds(AlarmId::A, 1);
        rtc.set_alarm_subseconds(AlarmId::A, 250);
        rtc.enable_alarm(AlarmId::A, AlarmMask::MATCH_SS);
        assert_eq!(rtc.alarm(AlarmId::A).subseconds, 250);

        calendar_sim(&mut rtc).advance_ticks(256 + 63);
        assert!(rtc.family_mut().take_events().is_empty());
        calendar_sim(&mut rtc).advance_ticks(1);
        assert_eq!(rtc.family_mut().take_events().alarms, [true, false]);
    }

    #[test]
    fn test_alarm_epoch() {
        let mut rtc = running(HourFormat::TwentyFourHour);
        rtc.set_alarm_from_epoch(AlarmId::A, JUNE_15 + 90, AlarmMask::MATCH_DHHMMSS, 1000);
        assert_eq!(
            rtc.alarm(AlarmId::A),
            Alarm::new(15, 10, 31, 30, AlarmMask::MATCH_DHHMMSS)
        );
        assert_eq!(rtc.alarm_epoch(AlarmId::A), JUNE_15 + 90);

        calendar_sim(&mut rtc).advance_seconds(90);
        assert_eq!(rtc.family_mut().take_events().alarms, [true, false]);
    }

    static SECONDS: AtomicUsize = AtomicUsize::new(0);

    fn on_second() {
        SECONDS.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn test_seconds_callback() {
        let mut rtc = running(HourFormat::TwentyFourHour);
        rtc.attach_seconds_callback(on_second);
        assert!(calendar_sim(&mut rtc).platform.irq_enabled[1]);
        for _ in 0..3 {
            calendar_sim(&mut rtc).advance_seconds(1);
            rtc.on_interrupt();
        }
        assert_eq!(SECONDS.load(Ordering::SeqCst), 3);

        rtc.detach_seconds_callback();
        calendar_sim(&mut rtc).advance_seconds(1);
        rtc.on_interrupt();
        assert_eq!(SECONDS.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_twelve_hour_format() {
        let mut rtc = running(HourFormat::TwelveHour);
        assert_eq!(rtc.hour_format(), HourFormat::TwelveHour);
        assert_eq!(rtc.time(), Time::new_12h(10, 30, 0, Period::Am));

        rtc.set_epoch(JUNE_15 + 4 * 3600);
        assert_eq!(rtc.hours(), (2, Period::Pm));
        assert_eq!(rtc.epoch(), JUNE_15 + 4 * 3600);

        rtc.set_hours(0, Period::Am);
        assert_eq!(rtc.hours(), (2, Period::Pm));

        rtc.set_time(Time::new_12h(11, 59, 59, Period::Pm));
        calendar_sim(&mut rtc).advance_seconds(1);
        assert_eq!(rtc.time(), Time::new_12h(12, 0, 0, Period::Am));
        assert_eq!(rtc.date(), Date::new(23, 6, 16, 5));
    }

    #[test]
    fn test_deinit() {
        let mut rtc = running(HourFormat::TwentyFourHour);
        rtc.attach_seconds_callback(on_second);
        rtc.attach_alarm_callback(AlarmId::A, on_alarm, 1);
        rtc.start_alarm(AlarmId::A, Alarm::new(15, 10, 45, 0, AlarmMask::MATCH_SS));

        rtc.deinit(true);
        assert!(!rtc.is_configured());
        assert!(!rtc.is_time_set());
        assert_eq!(rtc.time(), Time::default());

        let platform = &calendar_sim(&mut rtc).platform;
        assert!(!platform.rtc_enabled);
        assert_eq!(platform.irq_enabled, [false, false]);
    }

    #[test]
    fn test_counter_family() {
        let mut rtc = counter_rtc();
        assert_eq!(
            rtc.init(HourFormat::TwelveHour, ClockSource::Lse, false),
            Ok(true)
        );
        assert_eq!(rtc.hour_format(), HourFormat::TwentyFourHour);
        assert_eq!(rtc.prescaler(), CombinedPrescaler::new(32_767));
        // The weekday is derived from the date on this hardware.
        assert_eq!(rtc.date(), Date::new(1, 1, 1, 1));

        rtc.set_epoch(JUNE_15);
        assert_eq!(rtc.epoch(), JUNE_15);
        assert_eq!(rtc.subseconds(), 0);

        rtc.start_alarm(AlarmId::B, Alarm::new(15, 10, 31, 0, AlarmMask::MATCH_HHMMSS));
        assert!(!rtc.is_alarm_enabled(AlarmId::B));
        rtc.start_alarm(AlarmId::A, Alarm::new(15, 10, 31, 0, AlarmMask::MATCH_HHMMSS));
        assert!(rtc.is_alarm_enabled(AlarmId::A));
        counter_sim(&mut rtc).advance_seconds(60);
        assert_eq!(rtc.family_mut().take_events().alarms, [true, false]);
    }

    #[test]
    fn test_counter_midnight_rollover() {
        let mut rtc = counter_rtc();
        rtc.init(HourFormat::TwentyFourHour, ClockSource::Lse, false)
            .unwrap();
        // 2023-06-14T23:59:59Z
        rtc.set_epoch(1_686_787_199);
        counter_sim(&mut rtc).advance_seconds(2);

        assert_eq!(rtc.epoch(), 1_686_787_201);
        assert_eq!(rtc.date(), Date::new(23, 6, 15, 4));
        let backup = counter_sim(&mut rtc).platform.backup;
        assert_eq!(backup[6], 0x170F);
        assert_eq!(backup[7], 0x0604);

        // The date record survives a system reset.
        let hw = rtc.release().release();
        let mut rtc = Rtc::new(Counter::new(hw), Config::default());
        assert_eq!(
            rtc.init(HourFormat::TwentyFourHour, ClockSource::Lse, false),
            Ok(false)
        );
        assert_eq!(rtc.epoch(), 1_686_787_201);
    }

    #[test]
    fn test_counter_clock_switch_after_system_reset() {
        let mut rtc = counter_rtc();
        rtc.init(HourFormat::TwentyFourHour, ClockSource::Lse, false)
            .unwrap();
        rtc.set_epoch(JUNE_15);

        let hw = rtc.release().release();
        let mut rtc = Rtc::new(Counter::new(hw), Config::default());
        assert_eq!(
            rtc.init(HourFormat::TwentyFourHour, ClockSource::Lsi, false),
            Ok(false)
        );
        assert_eq!(rtc.clock_source(), ClockSource::Lsi);
        assert_eq!(rtc.date(), Date::new(23, 6, 15, 4));
        assert_eq!(rtc.epoch(), JUNE_15);
    }

    #[test]
    fn test_counter_clock_switch() {
        let mut rtc = counter_rtc();
        rtc.init(HourFormat::TwentyFourHour, ClockSource::Lse, false)
            .unwrap();
        rtc.set_epoch(JUNE_15);
        rtc.start_alarm(AlarmId::A, Alarm::new(15, 11, 0, 0, AlarmMask::MATCH_HHMMSS));

        assert_eq!(
            rtc.init(HourFormat::TwentyFourHour, ClockSource::Hse, false),
            Ok(false)
        );
        assert_eq!(rtc.prescaler(), CombinedPrescaler::new(62_499));
        assert_eq!(counter_sim(&mut rtc).rtc.prescaler(), 62_499);
        assert_eq!(rtc.epoch(), JUNE_15);
        assert!(rtc.is_alarm_enabled(AlarmId::A));
        assert_eq!(rtc.alarm(AlarmId::A).hours, 11);
    }
}
