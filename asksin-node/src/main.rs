#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]

pub use atmega_hal as hal;
use hal::usart::BaudrateArduinoExt;
use hal::{port::Pin, prelude::*};
use panic_halt as _;

use asksin_core::battery::{internal_centivolt, Battery, VoltageSource};
use asksin_core::cc1101::{strobe, Cc1101};
use asksin_core::led::{Pattern, StatusLed};
use asksin_core::pcint::PinState;
use asksin_core::sensor::{internal_temp_centi, send_slot, Measure, Measurement, SendMode, ThSensor};

mod adc;
mod clock;
mod pcint;
mod power;
mod watchdog;

type Hal = hal::Atmega;
type Speed = hal::clock::MHz8;

/// Device identity within the home-automation network. Also seeds the
/// send slot so co-located nodes spread out their reports.
const HM_ID: [u8; 3] = [0x4a, 0x21, 0x66];

/// 2 x AA cells are empty below 2.2V.
const BATTERY_LOW_CV: u16 = 220;
const BATTERY_CHECK_MS: u32 = 600_000;
const SEND_INTERVAL_MS: u32 = 180_000;

/// Config key on PB0, wired against ground.
const KEY_VEC: u8 = pcint::VEC_B;
const KEY_BIT: u8 = 0;

avr_hal_generic::renamed_pins! {
    type Pin = Pin;

    pub struct Pins from hal::Pins {
        pub uart_rx: hal::port::PD0 = pd0,
        pub uart_tx: hal::port::PD1 = pd1,
        pub cc_gdo0: hal::port::PD2 = pd2,
        pub led_red: hal::port::PD4 = pd4,
        pub led_grn: hal::port::PD5 = pd5,
        pub config_key: hal::port::PB0 = pb0,
        pub cc_cs: hal::port::PB2 = pb2,
        pub cc_mosi: hal::port::PB3 = pb3,
        pub cc_miso: hal::port::PB4 = pb4,
        pub cc_sclk: hal::port::PB5 = pb5,
    }
}

fn adc_settings(ref_voltage: hal::adc::ReferenceVoltage) -> hal::adc::AdcSettings {
    hal::adc::AdcSettings {
        clock_divider: hal::adc::ClockDivider::Factor64,
        ref_voltage,
    }
}

/// The ADC-backed measurements: supply voltage over the bandgap and the
/// die temperature sensor.
struct NodeSensors<'a> {
    adc: adc::Adc,
    cpu: &'a hal::pac::CPU,
}

impl NodeSensors<'_> {
    fn read_vbg(&mut self) -> u16 {
        self.adc
            .read_blocking_noise_reduction(hal::pac::adc::admux::MUX_A::ADC_VBG, self.cpu)
    }
}

impl VoltageSource for NodeSensors<'_> {
    fn read_centivolt(&mut self) -> u16 {
        internal_centivolt(self.read_vbg())
    }
}

impl Measure for NodeSensors<'_> {
    fn measure(&mut self, out: &mut Measurement) {
        // The temperature channel needs the 1.1V reference, the supply
        // check measures the bandgap against AVcc.
        self.adc
            .initialize(adc_settings(hal::adc::ReferenceVoltage::Internal));
        let temp_adc = self
            .adc
            .read_blocking_noise_reduction(hal::pac::adc::admux::MUX_A::TEMPSENS, self.cpu);
        self.adc
            .initialize(adc_settings(hal::adc::ReferenceVoltage::AVcc));

        out.temp = internal_temp_centi(temp_adc);
        out.hum = 0; // no humidity sensor on this board
        out.bat = internal_centivolt(self.read_vbg());
    }
}

// Wakes the CPU from noise reduction sleep when a conversion is done.
#[avr_device::interrupt(atmega328p)]
fn ADC() {}

#[hal::entry]
fn main() -> ! {
    let dp = hal::Peripherals::take().unwrap();
    let pins = Pins::with_mcu_pins(hal::pins!(dp));

    clock::init(dp.TC0);

    let mut watchdog = watchdog::Watchdog::new(dp.WDT, &dp.CPU.mcusr);
    watchdog.start(hal::wdt::Timeout::Ms2000).unwrap();

    let mut adc = adc::Adc::new(dp.ADC, adc_settings(hal::adc::ReferenceVoltage::AVcc));
    // Enable ADC interrupt for noise reduction mode
    adc.interrupt(true);
    let mut sensors = NodeSensors { adc, cpu: &dp.CPU };

    let mut uart = hal::usart::Usart0::<Speed>::new(
        dp.USART0,
        pins.uart_rx,
        pins.uart_tx.into_output(),
        9600.into_baudrate(),
    );

    let mut led = StatusLed::two(
        pins.led_red.into_output(),
        pins.led_grn.into_output(),
        false,
    );

    let mut radio = Cc1101::new(
        pins.cc_cs.into_output(),
        pins.cc_mosi.into_output(),
        pins.cc_miso.into_floating_input(),
        pins.cc_sclk.into_output(),
        pins.cc_gdo0.into_floating_input(),
    )
    .unwrap();

    pcint::init(None);
    pcint::register(KEY_VEC, KEY_BIT).unwrap();
    // The key pin is driven at register level by the tracker.
    let _ = pins.config_key;

    unsafe { avr_device::interrupt::enable() };

    radio.command(strobe::SRES).unwrap();

    // The first conversion after power-up reads low, throw it away.
    sensors.read_centivolt();

    let now = clock::millis();
    let mut battery = Battery::new();
    battery.set(BATTERY_LOW_CV, BATTERY_CHECK_MS, now, &mut sensors);

    let mut th = ThSensor::new();
    th.config(
        SendMode::Interval,
        SEND_INTERVAL_MS,
        0,
        send_slot(HM_ID, SEND_INTERVAL_MS),
        now,
    );

    led.set(Pattern::Welcome, now).unwrap();
    ufmt::uwriteln!(&mut uart, "booted, batt: {} cV", battery.centivolt()).void_unwrap();

    let mut battery_reported = false;

    loop {
        watchdog.feed();
        let now = clock::millis();

        // Pressing the config key pulls PB0 to ground.
        match pcint::check(KEY_VEC, KEY_BIT, true) {
            PinState::Falling => {
                ufmt::uwriteln!(&mut uart, "key pressed").void_unwrap();
                led.set(Pattern::Pairing, now).unwrap();
            }
            PinState::Rising => {
                ufmt::uwriteln!(&mut uart, "key released").void_unwrap();
            }
            _ => {}
        }

        battery.poll(now, &mut sensors);
        if battery.is_low() && !battery_reported {
            battery_reported = true;
            ufmt::uwriteln!(&mut uart, "battery low: {} cV", battery.centivolt()).void_unwrap();
            led.set(Pattern::BatteryLow, now).unwrap();
        }

        if let Some(m) = th.poll(now, &mut sensors) {
            // Wake the chip over the control lines; framing and the
            // actual transmission belong to the protocol engine.
            let status = radio.command(strobe::SNOP).unwrap();
            ufmt::uwriteln!(
                &mut uart,
                "report: temp {} bat {} cc {}",
                m.temp,
                m.bat,
                status.bits()
            )
            .void_unwrap();
            led.set(Pattern::Send, now).unwrap();
        }

        if radio.gdo0_falling().unwrap() {
            ufmt::uwriteln!(&mut uart, "rx pending").void_unwrap();
        }

        led.poll(now).unwrap();

        // Doze until the next millisecond tick or pin change.
        power::sleep_enable(&dp.CPU, power::SleepMode::Idle);
        avr_device::asm::sleep();
        power::sleep_disable(&dp.CPU);
    }
}
