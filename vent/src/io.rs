//! Boundaries between the control loop and the physical unit.
//!
//! The loop only sees these traits; the adapters in [`crate::hardware`]
//! and [`crate::radio`] map concrete bus/pin/port errors into the error
//! kinds the loop knows how to react to.

use std::error::Error;
use std::fmt;

use shared::{HallStatus, ValveState};

/// What went wrong at a hardware boundary, as far as the loop cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IoError {
    /// A sensor transaction could not complete; there is no reading this
    /// cycle and no decision may be made from the missing value.
    SensorUnavailable,
    /// The radio rejected or failed an outbound payload.
    TransmitFailure,
    /// The radio failed while polling for inbound payloads.
    ReceiveFailure,
    /// The valve output could not be driven.
    ActuationFailure,
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IoError::SensorUnavailable => "sensor unavailable",
            IoError::TransmitFailure => "radio transmit failed",
            IoError::ReceiveFailure => "radio receive failed",
            IoError::ActuationFailure => "valve actuation failed",
        };
        f.write_str(text)
    }
}

impl Error for IoError {}

/// Source of compensated pressure/temperature readings.
pub trait PressureSensor {
    fn sample(&mut self) -> Result<ms8607::Reading, IoError>;
}

/// The valve actuator output.
pub trait ValveDriver {
    fn actuate(&mut self, state: ValveState) -> Result<(), IoError>;
}

/// The Hall/magnetic proxy input.
pub trait MagneticSensor {
    fn status(&mut self) -> Result<HallStatus, IoError>;
}
