//! Status LED blink patterns.
//!
//! Pattern tables come in a two-LED (red/green) and a one-LED flavour,
//! matching the two board variants. Durations are in 10 ms ticks; the
//! slots of a pattern alternate on/off starting with on, and a repeat
//! count of 0 plays forever.

use embedded_hal::digital::v2::OutputPin;

use crate::timer::WaitTimer;

/// Indication to play, indexing into the active pattern table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    Pairing = 0,
    PairingSuccess = 1,
    PairingError = 2,
    Send = 3,
    Ack = 4,
    NoAck = 5,
    BatteryLow = 6,
    Defect = 7,
    Welcome = 8,
    KeyLong = 9,
}

struct BlinkPattern {
    len: u8,
    repeat: u8,
    red: bool,
    grn: bool,
    dur: [u8; 6],
}

macro_rules! pat {
    ($len:expr, $repeat:expr, $red:expr, $grn:expr, [$($dur:expr),*]) => {
        BlinkPattern {
            len: $len,
            repeat: $repeat,
            red: $red != 0,
            grn: $grn != 0,
            dur: [$($dur),*],
        }
    };
}

#[rustfmt::skip]
static TWO_LED: [BlinkPattern; 10] = [
    pat!(2, 0, 1, 1, [50, 50, 0, 0, 0, 0]),       // pairing
    pat!(2, 1, 0, 1, [200, 0, 0, 0, 0, 0]),       // pairing success
    pat!(2, 1, 1, 0, [200, 0, 0, 0, 0, 0]),       // pairing error
    pat!(2, 1, 1, 1, [5, 1, 0, 0, 0, 0]),         // send indicator
    pat!(2, 1, 0, 1, [5, 1, 0, 0, 0, 0]),         // ack indicator
    pat!(2, 1, 1, 0, [10, 1, 0, 0, 0, 0]),        // no ack indicator
    pat!(6, 3, 1, 0, [50, 10, 10, 10, 10, 100]),  // battery low indicator
    pat!(6, 3, 1, 0, [10, 10, 10, 10, 10, 100]),  // defect indicator
    pat!(6, 1, 0, 1, [10, 10, 50, 10, 50, 100]),  // welcome indicator
    pat!(2, 6, 1, 0, [20, 20, 0, 0, 0, 0]),       // key long indicator
];

#[rustfmt::skip]
static ONE_LED: [BlinkPattern; 10] = [
    pat!(2, 0, 1, 0, [50, 50, 0, 0, 0, 0]),       // pairing
    pat!(2, 1, 1, 0, [200, 0, 0, 0, 0, 0]),       // pairing success
    pat!(2, 3, 1, 0, [5, 10, 0, 0, 0, 0]),        // pairing error
    pat!(2, 1, 1, 0, [5, 1, 0, 0, 0, 0]),         // send indicator
    pat!(0, 0, 0, 0, [0, 0, 0, 0, 0, 0]),         // ack indicator
    pat!(0, 0, 0, 0, [0, 0, 0, 0, 0, 0]),         // no ack indicator
    pat!(6, 3, 1, 0, [50, 10, 10, 10, 10, 100]),  // battery low indicator
    pat!(6, 3, 1, 0, [10, 10, 10, 10, 10, 100]),  // defect indicator
    pat!(6, 1, 1, 0, [10, 10, 50, 10, 50, 100]),  // welcome indicator
    pat!(2, 6, 1, 0, [20, 20, 0, 0, 0, 0]),       // key long indicator
];

/// Placeholder for the missing green LED on one-LED boards.
pub struct NoLed;

impl OutputPin for NoLed {
    type Error = core::convert::Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Plays blink patterns on one or two status LEDs.
///
/// Driven from the poll loop; nothing here blocks or delays.
pub struct StatusLed<R, G> {
    red: R,
    grn: Option<G>,
    active_low: bool,
    table: &'static [BlinkPattern; 10],
    active: Option<&'static BlinkPattern>,
    slot: u8,
    cycles: u8,
    timer: WaitTimer,
}

impl<R, E> StatusLed<R, NoLed>
where
    R: OutputPin<Error = E>,
{
    /// Board with a single (red) status LED.
    pub fn one(red: R, active_low: bool) -> Self {
        Self {
            red,
            grn: None,
            active_low,
            table: &ONE_LED,
            active: None,
            slot: 0,
            cycles: 0,
            timer: WaitTimer::new(),
        }
    }
}

impl<R, G, E> StatusLed<R, G>
where
    R: OutputPin<Error = E>,
    G: OutputPin<Error = E>,
{
    /// Board with red and green status LEDs.
    pub fn two(red: R, grn: G, active_low: bool) -> Self {
        Self {
            red,
            grn: Some(grn),
            active_low,
            table: &TWO_LED,
            active: None,
            slot: 0,
            cycles: 0,
            timer: WaitTimer::new(),
        }
    }

    /// Start playing `pattern` from its first slot, replacing whatever
    /// was active. Patterns with no slots (unassigned indications on
    /// one-LED boards) just switch the LEDs off.
    pub fn set(&mut self, pattern: Pattern, now: u32) -> Result<(), E> {
        let table = self.table;
        let p = &table[pattern as usize];
        if p.len == 0 {
            return self.stop();
        }
        self.active = Some(p);
        self.slot = 0;
        self.cycles = 0;
        self.timer.set(p.dur[0] as u32 * 10, now);
        self.show(p, true)
    }

    /// Stop the active pattern and switch the LEDs off.
    pub fn stop(&mut self) -> Result<(), E> {
        self.active = None;
        self.drive(false, false)
    }

    /// Advance the active pattern. Call once per poll-loop iteration.
    pub fn poll(&mut self, now: u32) -> Result<(), E> {
        let Some(p) = self.active else {
            return Ok(());
        };
        if !self.timer.done(now) {
            return Ok(());
        }

        self.slot += 1;
        if self.slot >= p.len {
            self.cycles += 1;
            if p.repeat != 0 && self.cycles >= p.repeat {
                return self.stop();
            }
            self.slot = 0;
        }
        self.timer.set(p.dur[self.slot as usize] as u32 * 10, now);
        // Even slots light the pattern's LEDs, odd slots are the gaps.
        self.show(p, self.slot % 2 == 0)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    fn show(&mut self, p: &BlinkPattern, lit: bool) -> Result<(), E> {
        self.drive(lit && p.red, lit && p.grn)
    }

    fn drive(&mut self, red_on: bool, grn_on: bool) -> Result<(), E> {
        set_level(&mut self.red, red_on != self.active_low)?;
        if let Some(grn) = self.grn.as_mut() {
            set_level(grn, grn_on != self.active_low)?;
        }
        Ok(())
    }
}

fn set_level<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), P::Error> {
    if high {
        pin.set_high()
    } else {
        pin.set_low()
    }
}
