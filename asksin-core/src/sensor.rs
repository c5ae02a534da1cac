//! Temperature/humidity sensor module: the measurement record handed
//! to the protocol engine and the scheduler deciding when a new value
//! is worth a transmission.

use crate::timer::WaitTimer;

/// Time between two sensor readings. Transmissions happen on a reading
/// boundary, so send delays below this are rounded up to it.
pub const MEASURE_EVERY_MS: u32 = 1000;

/// One sensor reading as reported towards the protocol engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Measurement {
    /// Temperature in centi-degrees Celsius.
    pub temp: i16,
    /// Relative humidity in percent, 0 when the board has no sensor.
    pub hum: u8,
    /// Battery voltage in centivolts.
    pub bat: u16,
}

/// Fills a [`Measurement`] from the actual hardware.
pub trait Measure {
    fn measure(&mut self, out: &mut Measurement);
}

/// Transmission policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendMode {
    /// Report every send-delay interval regardless of the value.
    Interval,
    /// Report when the temperature moved by at least the configured
    /// step, but never more often than the send delay allows.
    OnChange,
}

/// Measurement scheduler for one sensor channel.
pub struct ThSensor {
    values: Measurement,
    mode: SendMode,
    send_delay_ms: u32,
    /// Minimum temperature movement (centi-degrees) that triggers an
    /// on-change report.
    level_change: u8,
    measure_timer: WaitTimer,
    send_timer: WaitTimer,
    last_sent: i16,
    sent_once: bool,
}

impl ThSensor {
    pub const fn new() -> Self {
        Self {
            values: Measurement {
                temp: 0,
                hum: 0,
                bat: 0,
            },
            mode: SendMode::Interval,
            send_delay_ms: 0,
            level_change: 0,
            measure_timer: WaitTimer::new(),
            send_timer: WaitTimer::new(),
            last_sent: 0,
            sent_once: false,
        }
    }

    /// Configure the schedule. `first_delay_ms` staggers the first
    /// report; pass the value from [`send_slot`] so nodes sharing a
    /// power-up moment do not also share their airtime.
    pub fn config(
        &mut self,
        mode: SendMode,
        send_delay_ms: u32,
        level_change: u8,
        first_delay_ms: u32,
        now: u32,
    ) {
        self.mode = mode;
        self.send_delay_ms = send_delay_ms;
        self.level_change = level_change;
        self.measure_timer.set(0, now);
        self.send_timer.set(first_delay_ms, now);
        self.sent_once = false;
    }

    /// Take a reading if one is due and decide whether it should be
    /// transmitted. Returns the measurement exactly when a report is
    /// due; the caller hands it to the protocol engine.
    pub fn poll(&mut self, now: u32, m: &mut impl Measure) -> Option<&Measurement> {
        if !self.measure_timer.done(now) {
            return None;
        }
        self.measure_timer.set(MEASURE_EVERY_MS, now);
        m.measure(&mut self.values);

        if !self.send_timer.done(now) {
            return None;
        }
        match self.mode {
            SendMode::Interval => {
                self.send_timer.set(self.send_delay_ms, now);
                Some(&self.values)
            }
            SendMode::OnChange => {
                let delta = (self.values.temp as i32 - self.last_sent as i32).unsigned_abs();
                if self.sent_once && delta < self.level_change as u32 {
                    return None;
                }
                self.last_sent = self.values.temp;
                self.sent_once = true;
                self.send_timer.set(self.send_delay_ms, now);
                Some(&self.values)
            }
        }
    }

    /// Last reading, whether or not it was reported.
    pub fn values(&self) -> &Measurement {
        &self.values
    }
}

impl Default for ThSensor {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic per-device offset into a send interval.
///
/// Nodes derive their first transmission slot from their device id so
/// that identically configured devices spread out over the interval
/// instead of colliding forever.
pub fn send_slot(device_id: [u8; 3], interval_ms: u32) -> u32 {
    let id = u32::from(device_id[0]) << 16 | u32::from(device_id[1]) << 8 | u32::from(device_id[2]);
    let hash = id.wrapping_mul(1103515245).wrapping_add(12345);
    (hash >> 16) % interval_ms.max(1)
}

/// Temperature in centi-degrees Celsius from a reading of the AVR's
/// internal sensor against the 1.1V reference, using the datasheet's
/// typical transfer function T = (adc - 324.31) / 1.22.
pub const fn internal_temp_centi(adc: u16) -> i16 {
    ((adc as i32 * 100 - 32431) * 100 / 122) as i16
}
