//! Hardware-independent pieces of an AskSin sensor node: pin change
//! tracking, status LED patterns, battery monitoring and the sensor
//! send scheduler. Everything here runs on the host for testing; the
//! firmware crate provides the register-level collaborators.
#![no_std]

pub mod battery;
pub mod cc1101;
pub mod led;
pub mod pcint;
pub mod sensor;
pub mod timer;
