use hal::wdt::WdtOps;

use super::hal;

pub struct Watchdog {
    wdt: hal::pac::WDT,
}

impl Watchdog {
    pub fn new(mut wdt: hal::pac::WDT, mcusr: &hal::pac::cpu::MCUSR) -> Self {
        wdt.raw_init(mcusr);
        Self { wdt }
    }

    pub fn start(&mut self, timeout: hal::wdt::Timeout) -> Result<(), ()> {
        self.wdt.raw_start(timeout)
    }

    /// Reset the countdown. The poll loop calls this once per pass; a
    /// stuck loop ends in a hardware reset.
    pub fn feed(&mut self) {
        self.wdt.raw_feed();
    }
}
