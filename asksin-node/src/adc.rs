use hal::adc::AdcOps;

use crate::power;

use super::hal;

/// ADC driver allowing the use of noise reduction mode, which the HAL's
/// blocking driver does not expose. Used for the bandgap battery
/// measurement and the internal temperature channel.
pub struct Adc {
    adc: hal::pac::ADC,
}

impl Adc {
    pub fn new(adc: hal::pac::ADC, settings: hal::adc::AdcSettings) -> Self {
        let mut s = Self { adc };
        s.initialize(settings);
        s
    }

    /// Re-runs the raw init, e.g. to switch the reference voltage
    /// between the bandgap and temperature channels.
    pub fn initialize(&mut self, settings: hal::adc::AdcSettings) {
        self.adc.raw_init(settings);
    }

    /// Convert with the CPU halted in ADC noise reduction sleep. The
    /// ADC interrupt must be enabled so the conversion wakes us up.
    pub fn read_blocking_noise_reduction(
        &mut self,
        channel: <hal::pac::ADC as hal::adc::AdcOps<super::Hal>>::Channel,
        cpu: &hal::pac::CPU,
    ) -> u16 {
        self.adc.raw_set_channel(channel);
        power::sleep_enable(cpu, power::SleepMode::AdcNoiseReduction);
        loop {
            avr_device::asm::sleep();
            if !self.adc.raw_is_converting() {
                break;
            }
        }
        power::sleep_disable(cpu);
        self.adc.raw_read_adc()
    }

    pub fn interrupt(&mut self, enable: bool) {
        self.adc.adcsra.modify(|_, w| w.adie().bit(enable));
    }
}
