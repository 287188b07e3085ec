//! Time-of-day clock with alarm.
//!
//! The clock counts nanoseconds since midnight in a single u64 (one
//! second = 10^9 ticks) and wraps at 24 hours. On the register interface
//! everything is BCD with 12-hour AM/PM hours.
//!
//! Register semantics, as on the 6526:
//! - Reading hours latches all four registers so a multi-register read
//!   is consistent; reading tenths releases the latch.
//! - Writing hours/minutes/seconds buffers the value; writing tenths
//!   commits the whole set atomically, to the clock or to the alarm
//!   depending on control register B bit 7. A clock write stops the
//!   clock until the tenths commit restarts it.

const NANOS_PER_SECOND: u64 = 1_000_000_000;
const NANOS_PER_TENTH: u64 = NANOS_PER_SECOND / 10;
const TICKS_PER_DAY: u64 = 24 * 60 * 60 * NANOS_PER_SECOND;

pub(crate) struct Tod {
    /// Nanoseconds since midnight.
    ticks: u64,
    running: bool,
    /// CPU clock driving `update`.
    frequency_hz: u32,
    /// Remainder accumulator for exact cycle-to-nanosecond conversion.
    cycle_acc: u64,
    /// Snapshot taken on an hours read, released by a tenths read.
    read_latch: Option<u64>,
    /// Buffered BCD writes, committed by the tenths write.
    write_hours: u8,
    write_minutes: u8,
    write_seconds: u8,
    /// Alarm time in ticks; `None` until an alarm is written.
    alarm: Option<u64>,
}

impl Tod {
    pub(crate) fn new(frequency_hz: u32) -> Self {
        assert!(frequency_hz > 0, "TOD clock frequency must be non-zero");
        Self {
            ticks: 0,
            running: true,
            frequency_hz,
            cycle_acc: 0,
            read_latch: None,
            write_hours: 0,
            write_minutes: 0,
            write_seconds: 0,
            alarm: None,
        }
    }

    /// Advance by `cycles` CPU cycles. Returns true if the alarm matched.
    pub(crate) fn update(&mut self, cycles: u32) -> bool {
        if !self.running {
            return false;
        }
        self.cycle_acc += u64::from(cycles) * NANOS_PER_SECOND;
        let advance = self.cycle_acc / u64::from(self.frequency_hz);
        self.cycle_acc %= u64::from(self.frequency_hz);
        if advance == 0 {
            return false;
        }

        let old = self.ticks;
        self.ticks = (old + advance) % TICKS_PER_DAY;

        match self.alarm {
            // Fired if the alarm tick lies within (old, old + advance],
            // modulo the 24-hour wrap.
            Some(alarm) => {
                let distance = (alarm + TICKS_PER_DAY - old) % TICKS_PER_DAY;
                distance != 0 && distance <= advance
            }
            None => false,
        }
    }

    fn current(&self) -> u64 {
        self.read_latch.unwrap_or(self.ticks)
    }

    /// Read tenths-of-seconds (BCD). Releases the read latch.
    pub(crate) fn read_tenths(&mut self) -> u8 {
        let ticks = self.current();
        self.read_latch = None;
        ((ticks % NANOS_PER_SECOND) / NANOS_PER_TENTH) as u8
    }

    pub(crate) fn read_seconds(&self) -> u8 {
        to_bcd(((self.current() / NANOS_PER_SECOND) % 60) as u8)
    }

    pub(crate) fn read_minutes(&self) -> u8 {
        to_bcd(((self.current() / (60 * NANOS_PER_SECOND)) % 60) as u8)
    }

    /// Read hours (12-hour BCD, bit 7 = PM). Latches all four registers.
    pub(crate) fn read_hours(&mut self) -> u8 {
        self.read_latch = Some(self.ticks);
        let h24 = ((self.current() / (3600 * NANOS_PER_SECOND)) % 24) as u8;
        let pm = h24 >= 12;
        let mut h12 = h24 % 12;
        if h12 == 0 {
            h12 = 12;
        }
        to_bcd(h12) | if pm { 0x80 } else { 0 }
    }

    pub(crate) fn write_hours(&mut self, value: u8, alarm_select: bool) {
        if !alarm_select {
            // A clock write stops the clock until the tenths commit.
            self.running = false;
        }
        self.write_hours = value;
    }

    pub(crate) fn write_minutes(&mut self, value: u8) {
        self.write_minutes = value;
    }

    pub(crate) fn write_seconds(&mut self, value: u8) {
        self.write_seconds = value;
    }

    /// Commit the buffered hours/minutes/seconds plus `value` tenths, to
    /// the alarm or the clock per `alarm_select`.
    pub(crate) fn write_tenths(&mut self, value: u8, alarm_select: bool) {
        let pm = self.write_hours & 0x80 != 0;
        let h12 = from_bcd(self.write_hours & 0x7F);
        let h24 = u64::from(h12 % 12) + if pm { 12 } else { 0 };

        let ticks = h24 * 3600 * NANOS_PER_SECOND
            + u64::from(from_bcd(self.write_minutes)) * 60 * NANOS_PER_SECOND
            + u64::from(from_bcd(self.write_seconds)) * NANOS_PER_SECOND
            + u64::from(value & 0x0F) * NANOS_PER_TENTH;
        let ticks = ticks % TICKS_PER_DAY;

        if alarm_select {
            self.alarm = Some(ticks);
        } else {
            self.ticks = ticks;
            self.cycle_acc = 0;
            self.running = true;
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running
    }

    /// Ticks since midnight, for observation.
    pub(crate) fn ticks(&self) -> u64 {
        self.ticks
    }
}

fn to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

fn from_bcd(value: u8) -> u8 {
    (value >> 4) * 10 + (value & 0x0F)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 10 Hz drive: one cycle advances exactly one tenth of a second.
    const TENTH_HZ: u32 = 10;

    fn set_clock(tod: &mut Tod, hours: u8, minutes: u8, seconds: u8, tenths: u8) {
        tod.write_hours(hours, false);
        tod.write_minutes(minutes);
        tod.write_seconds(seconds);
        tod.write_tenths(tenths, false);
    }

    #[test]
    fn counts_tenths_seconds_minutes() {
        let mut tod = Tod::new(TENTH_HZ);
        tod.update(10 * 61 + 3); // 61.3 seconds
        assert_eq!(tod.read_hours(), 0x12, "midnight reads as 12 AM");
        assert_eq!(tod.read_minutes(), 0x01);
        assert_eq!(tod.read_seconds(), 0x01);
        assert_eq!(tod.read_tenths(), 3);
    }

    #[test]
    fn conversion_accumulates_without_drift() {
        // At 7 Hz, 7 cycles must advance exactly one second.
        let mut tod = Tod::new(7);
        for _ in 0..7 {
            tod.update(1);
        }
        assert_eq!(tod.read_seconds(), 0x01);
        assert_eq!(tod.read_tenths(), 0);
    }

    #[test]
    fn hours_read_latches_until_tenths_read() {
        let mut tod = Tod::new(TENTH_HZ);
        set_clock(&mut tod, 0x01, 0x59, 0x59, 9);

        let hours = tod.read_hours(); // latch here
        tod.update(5); // clock rolls over to 02:00:00.4
        assert_eq!(hours, 0x01);
        assert_eq!(tod.read_minutes(), 0x59, "latched value");
        assert_eq!(tod.read_seconds(), 0x59, "latched value");
        assert_eq!(tod.read_tenths(), 9, "latched value, releases latch");

        assert_eq!(tod.read_minutes(), 0x00, "live again after release");
    }

    #[test]
    fn clock_write_stops_until_tenths_commit() {
        let mut tod = Tod::new(TENTH_HZ);
        tod.write_hours(0x03, false);
        assert!(!tod.is_running());
        tod.update(100);
        assert_eq!(tod.read_minutes(), 0, "halted while write pending");

        tod.write_minutes(0x15);
        tod.write_seconds(0x30);
        tod.write_tenths(0, false);
        assert!(tod.is_running());
        assert_eq!(tod.read_hours(), 0x03);
        assert_eq!(tod.read_minutes(), 0x15);
        assert_eq!(tod.read_seconds(), 0x30);
    }

    #[test]
    fn pm_hours_round_trip() {
        let mut tod = Tod::new(TENTH_HZ);
        set_clock(&mut tod, 0x80 | 0x11, 0, 0, 0); // 11 PM
        assert_eq!(tod.read_hours(), 0x80 | 0x11);

        set_clock(&mut tod, 0x80 | 0x12, 0, 0, 0); // 12 PM = noon
        assert_eq!(tod.read_hours(), 0x80 | 0x12);
        assert_eq!(tod.ticks(), 12 * 3600 * NANOS_PER_SECOND);

        set_clock(&mut tod, 0x12, 0, 0, 0); // 12 AM = midnight
        assert_eq!(tod.ticks(), 0);
    }

    #[test]
    fn wraps_at_24_hours() {
        let mut tod = Tod::new(TENTH_HZ);
        set_clock(&mut tod, 0x80 | 0x11, 0x59, 0x59, 9); // 23:59:59.9
        tod.update(1);
        assert_eq!(tod.ticks(), 0, "wrapped to midnight");
    }

    #[test]
    fn alarm_fires_on_crossing() {
        let mut tod = Tod::new(TENTH_HZ);
        // Alarm at 00:00:01.0
        tod.write_hours(0x12, true);
        tod.write_minutes(0);
        tod.write_seconds(0x01);
        tod.write_tenths(0, true);

        assert!(!tod.update(9), "00:00:00.9, not yet");
        assert!(tod.update(1), "reaches 00:00:01.0 exactly");
        assert!(!tod.update(1), "fires only once per crossing");
    }

    #[test]
    fn alarm_fires_when_skipped_over() {
        let mut tod = Tod::new(TENTH_HZ);
        tod.write_hours(0x12, true);
        tod.write_minutes(0);
        tod.write_seconds(0x01);
        tod.write_tenths(5, true);

        assert!(tod.update(30), "a coarse update crossing the alarm fires");
    }

    #[test]
    fn no_alarm_until_one_is_written() {
        let mut tod = Tod::new(TENTH_HZ);
        assert!(!tod.update(24 * 3600 * 10), "a full day with no alarm set");
    }
}
