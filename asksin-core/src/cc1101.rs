//! CC1101 transceiver access plumbing: chip select handshake, the
//! bit-banged SPI byte transfer and the polled GDO0 edge detector.
//! Protocol framing on top of this lives in the protocol engine, not
//! here.

use bitflags::bitflags;
use embedded_hal::digital::v2::{InputPin, OutputPin};

/// Command strobes understood over the control lines.
pub mod strobe {
    /// Reset chip.
    pub const SRES: u8 = 0x30;
    /// No operation; clocks out the status byte.
    pub const SNOP: u8 = 0x3D;
}

bitflags! {
    /// Status byte the chip shifts out during every transfer.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ChipStatus: u8 {
        const CHIP_RDY_N = 1 << 7;
        const STATE = 0b111 << 4;
        const FIFO_BYTES = 0x0F;
    }
}

/// Control-line driver for the CC1101.
///
/// All five lines are plain GPIO; the SPI clocking is done in software
/// (mode 0, MSB first). Pin directions are fixed by the types handed
/// to the constructor, so there is no separate init step.
pub struct Cc1101<Cs, Mosi, Miso, Sclk, Gdo0> {
    cs: Cs,
    mosi: Mosi,
    miso: Miso,
    sclk: Sclk,
    gdo0: Gdo0,
    gdo0_prev: bool,
}

impl<Cs, Mosi, Miso, Sclk, Gdo0, E> Cc1101<Cs, Mosi, Miso, Sclk, Gdo0>
where
    Cs: OutputPin<Error = E>,
    Mosi: OutputPin<Error = E>,
    Miso: InputPin<Error = E>,
    Sclk: OutputPin<Error = E>,
    Gdo0: InputPin<Error = E>,
{
    /// Take over the control lines, leaving the chip deselected and
    /// the clock idle low.
    pub fn new(cs: Cs, mosi: Mosi, miso: Miso, sclk: Sclk, gdo0: Gdo0) -> Result<Self, E> {
        let mut cc = Self {
            cs,
            mosi,
            miso,
            sclk,
            gdo0,
            gdo0_prev: false,
        };
        cc.cs.set_high()?;
        cc.sclk.set_low()?;
        Ok(cc)
    }

    /// Select the chip and wait for it to signal readiness by pulling
    /// MISO low.
    pub fn select(&mut self) -> Result<(), E> {
        self.cs.set_low()?;
        while self.miso.is_high()? {}
        Ok(())
    }

    pub fn deselect(&mut self) -> Result<(), E> {
        self.cs.set_high()
    }

    /// Shift one byte out while shifting the chip's answer in.
    /// MOSI is valid before the rising clock edge, MISO is sampled
    /// while the clock is high.
    pub fn transfer_byte(&mut self, byte: u8) -> Result<u8, E> {
        let mut out = byte;
        let mut inp = 0u8;
        for _ in 0..8 {
            set_level(&mut self.mosi, out & 0x80 != 0)?;
            out <<= 1;
            self.sclk.set_high()?;
            inp <<= 1;
            if self.miso.is_high()? {
                inp |= 1;
            }
            self.sclk.set_low()?;
        }
        Ok(inp)
    }

    /// Issue a command strobe and return the chip status byte.
    pub fn command(&mut self, strobe: u8) -> Result<ChipStatus, E> {
        self.select()?;
        let status = self.transfer_byte(strobe)?;
        self.deselect()?;
        Ok(ChipStatus::from_bits_retain(status))
    }

    /// Poll GDO0 for a falling edge, which the chip raises when data
    /// arrived in the receive FIFO. Returns true exactly once per
    /// high-to-low transition.
    pub fn gdo0_falling(&mut self) -> Result<bool, E> {
        let curr = self.gdo0.is_high()?;
        if curr == self.gdo0_prev {
            return Ok(false);
        }
        self.gdo0_prev = curr;
        Ok(!curr)
    }
}

fn set_level<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), P::Error> {
    if high {
        pin.set_high()
    } else {
        pin.set_low()
    }
}
