use core::cell::Cell;

use avr_device::interrupt::{self, Mutex};

use super::hal;

static MILLIS: Mutex<Cell<u32>> = Mutex::new(Cell::new(0));

/// Run TC0 in CTC mode as a 1ms tick. 8MHz / 64 / 125 = 1kHz.
pub fn init(tc0: hal::pac::TC0) {
    tc0.tccr0a.write(|w| w.wgm0().ctc());
    tc0.ocr0a.write(|w| w.bits(124));
    tc0.tccr0b.write(|w| w.cs0().prescale_64());
    tc0.timsk0.write(|w| w.ocie0a().set_bit());
}

/// Milliseconds since boot. Wraps after about 49 days; consumers
/// compare with wrapping subtraction.
pub fn millis() -> u32 {
    interrupt::free(|cs| MILLIS.borrow(cs).get())
}

#[avr_device::interrupt(atmega328p)]
fn TIMER0_COMPA() {
    interrupt::free(|cs| {
        let millis = MILLIS.borrow(cs);
        millis.set(millis.get().wrapping_add(1));
    });
}

/// Clock collaborator handed to the hardware-independent modules.
#[derive(Clone, Copy)]
pub struct Ticks;

impl asksin_core::pcint::Clock for Ticks {
    fn now(&self) -> u32 {
        millis()
    }
}
