//! Register-level half of the pin change tracker: the three ATmega328P
//! vectors, their interrupt handlers and the shared tracker instance.

use core::cell::RefCell;

use asksin_core::pcint::{self, PinChange, PinState};
use avr_device::interrupt::{self, Mutex};

use crate::clock::Ticks;

use super::hal;

/// PCINT0/PCINT1/PCINT2 serve ports B, C and D.
pub const VECTORS: usize = 3;

pub const VEC_B: u8 = 0;
pub const VEC_C: u8 = 1;
pub const VEC_D: u8 = 2;

/// One pin-change-capable GPIO port, addressed at register level. The
/// pins handed to the tracker are never constructed as HAL singletons;
/// this is their only driver.
#[derive(Clone, Copy)]
pub enum Port {
    B,
    C,
    D,
}

impl Port {
    fn group_bit(self) -> u8 {
        match self {
            Port::B => 0,
            Port::C => 1,
            Port::D => 2,
        }
    }
}

impl pcint::PinPort for Port {
    fn make_input_pullup(&self, bit: u8) {
        // SAFETY: single-core device, called with the tracker mutex
        // held, so these read-modify-writes cannot interleave.
        unsafe {
            match self {
                Port::B => {
                    let p = &*hal::pac::PORTB::ptr();
                    p.ddrb.modify(|r, w| w.bits(r.bits() & !(1 << bit)));
                    p.portb.modify(|r, w| w.bits(r.bits() | 1 << bit));
                }
                Port::C => {
                    let p = &*hal::pac::PORTC::ptr();
                    p.ddrc.modify(|r, w| w.bits(r.bits() & !(1 << bit)));
                    p.portc.modify(|r, w| w.bits(r.bits() | 1 << bit));
                }
                Port::D => {
                    let p = &*hal::pac::PORTD::ptr();
                    p.ddrd.modify(|r, w| w.bits(r.bits() & !(1 << bit)));
                    p.portd.modify(|r, w| w.bits(r.bits() | 1 << bit));
                }
            }
        }
    }

    fn unmask_interrupt(&self, bit: u8) {
        // SAFETY: as above; EXINT is only touched through this path.
        unsafe {
            let exint = &*hal::pac::EXINT::ptr();
            match self {
                Port::B => exint.pcmsk0.modify(|r, w| w.bits(r.bits() | 1 << bit)),
                Port::C => exint.pcmsk1.modify(|r, w| w.bits(r.bits() | 1 << bit)),
                Port::D => exint.pcmsk2.modify(|r, w| w.bits(r.bits() | 1 << bit)),
            }
            exint
                .pcicr
                .modify(|r, w| w.bits(r.bits() | 1 << self.group_bit()));
        }
    }

    fn read(&self) -> u8 {
        // SAFETY: reading a PINx register has no side effects.
        unsafe {
            match self {
                Port::B => (*hal::pac::PORTB::ptr()).pinb.read().bits(),
                Port::C => (*hal::pac::PORTC::ptr()).pinc.read().bits(),
                Port::D => (*hal::pac::PORTD::ptr()).pind.read().bits(),
            }
        }
    }
}

type Tracker = PinChange<Port, Ticks, VECTORS>;

/// Shared between the poll loop and the interrupt handlers; every
/// access goes through a critical section.
static TRACKER: Mutex<RefCell<Option<Tracker>>> = Mutex::new(RefCell::new(None));

pub fn init(callback: Option<pcint::PinCallback>) {
    let ports = [Port::B, Port::C, Port::D];
    let tracker = match callback {
        Some(cb) => PinChange::with_callback(ports, Ticks, cb),
        None => PinChange::new(ports, Ticks),
    };
    interrupt::free(|cs| {
        TRACKER.borrow(cs).replace(Some(tracker));
    });
}

/// Start watching a pin. Call after [`init`], during setup.
pub fn register(vector: u8, bit: u8) -> Result<(), pcint::Error> {
    interrupt::free(|cs| {
        TRACKER
            .borrow(cs)
            .borrow_mut()
            .as_mut()
            .unwrap()
            .register(vector, bit)
    })
}

/// Poll one watched pin, optionally applying the debounce window.
pub fn check(vector: u8, bit: u8, debounce: bool) -> PinState {
    interrupt::free(|cs| {
        TRACKER
            .borrow(cs)
            .borrow_mut()
            .as_mut()
            .unwrap()
            .check(vector, bit, debounce)
    })
}

fn capture(vector: u8) {
    interrupt::free(|cs| {
        if let Some(tracker) = TRACKER.borrow(cs).borrow_mut().as_mut() {
            tracker.capture(vector);
        }
    });
}

#[avr_device::interrupt(atmega328p)]
fn PCINT0() {
    capture(VEC_B);
}

#[avr_device::interrupt(atmega328p)]
fn PCINT1() {
    capture(VEC_C);
}

#[avr_device::interrupt(atmega328p)]
fn PCINT2() {
    capture(VEC_D);
}
