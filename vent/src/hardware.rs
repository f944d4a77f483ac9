//! Adapters from the physical unit to the [`crate::io`] boundary traits.

use core::fmt;

use anyhow::{anyhow, Result};
use embedded_hal::blocking::{delay::DelayMs, i2c};
use embedded_hal::digital::v2::{InputPin, OutputPin};
use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::SysfsPin;
use log::{info, warn};
use ms8607::Ms8607;
use shared::{HallStatus, ValveState};

use crate::io::{IoError, MagneticSensor, PressureSensor, ValveDriver};

/// The two bus addresses the sensor family can strap to.
const FAMILY_ADDRESSES: [u8; 2] = [0x76, 0x77];

/// One-shot bus scan at startup. Probes the two family addresses and
/// falls back to the configured one when neither answers (the reset at
/// driver init will then surface the real fault).
pub fn discover_sensor<E: fmt::Debug>(
    i2c: &mut impl i2c::Read<Error = E>,
    configured: u8,
) -> u8 {
    for address in FAMILY_ADDRESSES {
        let mut probe = [0u8; 1];
        if i2c.read(address, &mut probe).is_ok() {
            return address;
        }
    }
    warn!("bus scan found no sensor, falling back to {:#04x}", configured);
    configured
}

/// The pressure sensor behind the loop boundary.
pub struct Barometer<I2C, D> {
    inner: Ms8607<I2C, D>,
}

impl<I2C, D> Barometer<I2C, D> {
    pub fn new(inner: Ms8607<I2C, D>) -> Self {
        Self { inner }
    }
}

impl<E, I2C, D> PressureSensor for Barometer<I2C, D>
where
    E: fmt::Debug,
    I2C: i2c::Write<Error = E> + i2c::Read<Error = E>,
    D: DelayMs<u8>,
{
    fn sample(&mut self) -> Result<ms8607::Reading, IoError> {
        self.inner.sample().map_err(|error| {
            warn!("sensor: {:?}", error);
            IoError::SensorUnavailable
        })
    }
}

/// Valve actuator on a GPIO output: high opens, low closes.
pub struct ValvePin<P> {
    pin: P,
}

impl<P> ValvePin<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P> ValveDriver for ValvePin<P>
where
    P: OutputPin,
    P::Error: fmt::Debug,
{
    fn actuate(&mut self, state: ValveState) -> Result<(), IoError> {
        let result = match state {
            ValveState::Open => self.pin.set_high(),
            ValveState::Closed => self.pin.set_low(),
        };
        result.map_err(|error| {
            warn!("valve pin: {:?}", error);
            IoError::ActuationFailure
        })
    }
}

/// Hall proxy on a GPIO input: high means the magnet is in range.
pub struct HallPin<P> {
    pin: P,
}

impl<P> HallPin<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P> MagneticSensor for HallPin<P>
where
    P: InputPin,
    P::Error: fmt::Debug,
{
    fn status(&mut self) -> Result<HallStatus, IoError> {
        let engaged = self.pin.is_high().map_err(|error| {
            warn!("hall pin: {:?}", error);
            IoError::SensorUnavailable
        })?;
        Ok(HallStatus::from_engaged(engaged))
    }
}

/// Export a sysfs GPIO as an output, initialized low.
pub fn output_pin(number: u64) -> Result<SysfsPin> {
    let pin = SysfsPin::new(number);
    pin.0
        .export()
        .map_err(|error| anyhow!("gpio {}: {}", number, error))?;
    pin.0
        .set_direction(Direction::Low)
        .map_err(|error| anyhow!("gpio {}: {}", number, error))?;
    Ok(pin)
}

/// Export a sysfs GPIO as an input.
pub fn input_pin(number: u64) -> Result<SysfsPin> {
    let pin = SysfsPin::new(number);
    pin.0
        .export()
        .map_err(|error| anyhow!("gpio {}: {}", number, error))?;
    pin.0
        .set_direction(Direction::In)
        .map_err(|error| anyhow!("gpio {}: {}", number, error))?;
    Ok(pin)
}

/// Drive the heater enable high and leave it on, as the original unit did
/// from boot.
pub fn enable_heater(number: u64) -> Result<()> {
    let pin = SysfsPin::new(number);
    pin.0
        .export()
        .map_err(|error| anyhow!("gpio {}: {}", number, error))?;
    pin.0
        .set_direction(Direction::High)
        .map_err(|error| anyhow!("gpio {}: {}", number, error))?;
    info!("heater enabled on gpio {}", number);
    Ok(())
}
