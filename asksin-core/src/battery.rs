//! Battery voltage scaling and the low-battery monitor.

use crate::timer::WaitTimer;

/// Nominal AVR bandgap reference in millivolts.
pub const BANDGAP_MV: u32 = 1100;

/// Supply voltage in centivolts from an ADC reading of the internal
/// bandgap against AVcc. `adc` is the raw 10 bit conversion result.
///
/// The bandgap is the input and AVcc the reference, so the reading
/// shrinks as the supply rises: vcc = 1100mV * 1023 / adc.
pub const fn internal_centivolt(adc: u16) -> u16 {
    (BANDGAP_MV * 1023 / adc as u32 / 10) as u16
}

/// Battery voltage in centivolts from an ADC reading of an external
/// resistor divider against the 1.1V reference. `divider_pct` is the
/// divider ratio times 100 (e.g. 570 for a 470k/100k network).
pub const fn external_centivolt(adc: u16, divider_pct: u16) -> u16 {
    (adc as u32 * BANDGAP_MV / 1023 * divider_pct as u32 / 100 / 10) as u16
}

/// Supplies a fresh battery voltage reading in centivolts.
pub trait VoltageSource {
    fn read_centivolt(&mut self) -> u16;
}

/// Periodic low-battery check.
///
/// Measures once when armed via [`Battery::set`] and again whenever the
/// interval expires. The low flag compares the last measurement against
/// the configured threshold.
pub struct Battery {
    threshold_cv: u16,
    measured_cv: u16,
    low: bool,
    interval_ms: u32,
    timer: WaitTimer,
}

impl Battery {
    pub const fn new() -> Self {
        Self {
            threshold_cv: 0,
            measured_cv: 0,
            low: false,
            interval_ms: 0,
            timer: WaitTimer::new(),
        }
    }

    /// Arm the monitor and take an immediate measurement.
    pub fn set(
        &mut self,
        threshold_cv: u16,
        interval_ms: u32,
        now: u32,
        source: &mut impl VoltageSource,
    ) {
        self.threshold_cv = threshold_cv;
        self.interval_ms = interval_ms;
        self.measure(now, source);
    }

    /// Re-measure once the check interval has elapsed.
    pub fn poll(&mut self, now: u32, source: &mut impl VoltageSource) {
        if !self.timer.done(now) {
            return;
        }
        self.measure(now, source);
    }

    fn measure(&mut self, now: u32, source: &mut impl VoltageSource) {
        self.measured_cv = source.read_centivolt();
        self.low = self.measured_cv < self.threshold_cv;
        self.timer.set(self.interval_ms, now);
    }

    /// Last measured battery voltage in centivolts.
    pub fn centivolt(&self) -> u16 {
        self.measured_cv
    }

    pub fn is_low(&self) -> bool {
        self.low
    }
}

impl Default for Battery {
    fn default() -> Self {
        Self::new()
    }
}
