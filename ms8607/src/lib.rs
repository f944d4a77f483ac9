#![cfg_attr(not(test), no_std)]

//! Driver for the MS8607/MS5611 barometric pressure and temperature
//! sensors, generic over any `embedded-hal` blocking I2C bus.
//!
//! The sensor speaks a command-then-read protocol with no repeated start:
//! every transaction is a one-byte command write, optionally followed by a
//! separate read of the big-endian result. A measurement is a two-phase
//! sequence (pressure conversion, then temperature conversion), each phase
//! a fixed sleep long enough to cover the worst-case conversion time.

use core::fmt;

use embedded_hal::blocking::{delay::DelayMs, i2c};

mod compensate;
mod consts;

pub use compensate::{compensate, Variant};
use consts::{cmd, CONVERSION_DELAY_MS, RESET_DELAY_MS};

/// Default bus address (CSB high). The alternate address is 0x77.
pub const DEFAULT_ADDRESS: u8 = 0x76;

/// Factory PROM calibration coefficients.
///
/// Read once from the sensor's non-volatile memory at startup and held for
/// the life of the process; every compensated reading is derived from them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub struct Calibration {
    /// Pressure sensitivity.
    pub c1: u16,
    /// Pressure offset.
    pub c2: u16,
    /// Temperature coefficient of pressure sensitivity.
    pub c3: u16,
    /// Temperature coefficient of pressure offset.
    pub c4: u16,
    /// Reference temperature.
    pub c5: u16,
    /// Temperature coefficient of the temperature.
    pub c6: u16,
}

/// One raw conversion pair, consumed within the cycle that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub struct RawSample {
    /// 24-bit raw pressure conversion.
    pub d1: u32,
    /// 24-bit raw temperature conversion.
    pub d2: u32,
}

/// A compensated measurement. Temperature and pressure always come from
/// the same conversion pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub struct Reading {
    /// Centi-degrees Celsius.
    pub temperature: i32,
    /// Hundredths of a millibar.
    pub pressure: i32,
}

impl Reading {
    pub fn temperature_celsius(&self) -> f32 {
        self.temperature as f32 / 100.0
    }

    pub fn pressure_mbar(&self) -> f32 {
        self.pressure as f32 / 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error<E: fmt::Debug> {
    /// A bus transaction failed.
    I2c(E),
    /// The PROM read back blank; the sensor is absent, unpowered, or the
    /// bus is floating.
    InvalidCalibration,
}

impl<E: fmt::Debug> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Error::I2c(error)
    }
}

pub struct Ms8607<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    variant: Variant,
    calibration: Calibration,
}

impl<E, I2C, D> Ms8607<I2C, D>
where
    E: fmt::Debug,
    I2C: i2c::Write<Error = E> + i2c::Read<Error = E>,
    D: DelayMs<u8>,
{
    /// Reset the sensor and read its calibration PROM.
    pub fn new(i2c: I2C, delay: D, address: u8, variant: Variant) -> Result<Self, Error<E>> {
        let mut this = Self {
            i2c,
            delay,
            address,
            variant,
            calibration: Calibration {
                c1: 0,
                c2: 0,
                c3: 0,
                c4: 0,
                c5: 0,
                c6: 0,
            },
        };

        this.reset()?;
        this.calibration = this.read_calibration()?;

        Ok(this)
    }

    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Reset the sensor and wait for it to reload the PROM.
    pub fn reset(&mut self) -> Result<(), Error<E>> {
        self.i2c.write(self.address, &[cmd::RESET])?;
        self.delay.delay_ms(RESET_DELAY_MS);
        Ok(())
    }

    /// Run one full measurement: both conversions plus compensation.
    pub fn sample(&mut self) -> Result<Reading, Error<E>> {
        let raw = self.convert()?;
        Ok(compensate(self.variant, &self.calibration, raw))
    }

    /// Run the two-phase conversion sequence and read both raw values.
    pub fn convert(&mut self) -> Result<RawSample, Error<E>> {
        let d1 = self.convert_one(cmd::CONVERT_D1)?;
        let d2 = self.convert_one(cmd::CONVERT_D2)?;
        Ok(RawSample { d1, d2 })
    }

    /// Release the bus and delay resources.
    pub fn free(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn convert_one(&mut self, command: u8) -> Result<u32, Error<E>> {
        self.i2c.write(self.address, &[command])?;
        // The ADC result is undefined while a conversion is running, so
        // wait out the bound rather than poll.
        self.delay.delay_ms(CONVERSION_DELAY_MS);
        self.read_adc()
    }

    fn read_adc(&mut self) -> Result<u32, Error<E>> {
        self.i2c.write(self.address, &[cmd::READ_ADC])?;
        let mut buf = [0; 3];
        self.i2c.read(self.address, &mut buf)?;
        Ok(u32::from(buf[0]) << 16 | u32::from(buf[1]) << 8 | u32::from(buf[2]))
    }

    fn read_prom_word(&mut self, command: u8) -> Result<u16, Error<E>> {
        self.i2c.write(self.address, &[command])?;
        let mut buf = [0; 2];
        self.i2c.read(self.address, &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn read_calibration(&mut self) -> Result<Calibration, Error<E>> {
        let mut words = [0u16; 6];
        for (i, word) in words.iter_mut().enumerate() {
            *word = self.read_prom_word(cmd::PROM_BASE + 2 * (i as u8 + 1))?;
        }

        if words.iter().all(|&w| w == 0x0000) || words.iter().all(|&w| w == 0xFFFF) {
            return Err(Error::InvalidCalibration);
        }

        Ok(Calibration {
            c1: words[0],
            c2: words[1],
            c3: words[2],
            c4: words[3],
            c5: words[4],
            c6: words[5],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Scripted bus: records command writes, serves canned read results.
    struct FakeBus {
        writes: Vec<Vec<u8>>,
        reads: VecDeque<Vec<u8>>,
        failing: bool,
    }

    impl FakeBus {
        fn new(reads: Vec<Vec<u8>>) -> Self {
            Self {
                writes: Vec::new(),
                reads: reads.into(),
                failing: false,
            }
        }

        fn commands(&self) -> Vec<u8> {
            self.writes.iter().map(|w| w[0]).collect()
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct BusFault;

    impl i2c::Write for FakeBus {
        type Error = BusFault;

        fn write(&mut self, _address: u8, bytes: &[u8]) -> Result<(), BusFault> {
            if self.failing {
                return Err(BusFault);
            }
            self.writes.push(bytes.to_vec());
            Ok(())
        }
    }

    impl i2c::Read for FakeBus {
        type Error = BusFault;

        fn read(&mut self, _address: u8, buffer: &mut [u8]) -> Result<(), BusFault> {
            if self.failing {
                return Err(BusFault);
            }
            let data = self.reads.pop_front().expect("unexpected read");
            buffer.copy_from_slice(&data);
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayMs<u8> for NoDelay {
        fn delay_ms(&mut self, _ms: u8) {}
    }

    const PROM_WORDS: [u16; 6] = [40127, 36924, 23317, 23282, 33464, 28312];

    fn prom_reads() -> Vec<Vec<u8>> {
        PROM_WORDS.iter().map(|w| w.to_be_bytes().to_vec()).collect()
    }

    #[test]
    fn startup_reads_the_prom() {
        let bus = FakeBus::new(prom_reads());
        let sensor = Ms8607::new(bus, NoDelay, DEFAULT_ADDRESS, Variant::Ms5611).unwrap();

        assert_eq!(
            sensor.calibration(),
            Calibration {
                c1: 40127,
                c2: 36924,
                c3: 23317,
                c4: 23282,
                c5: 33464,
                c6: 28312,
            }
        );

        let (bus, _) = sensor.free();
        // Reset, then six PROM word commands.
        assert_eq!(bus.commands(), [0x1E, 0xA2, 0xA4, 0xA6, 0xA8, 0xAA, 0xAC]);
    }

    #[test]
    fn blank_prom_is_rejected() {
        let bus = FakeBus::new(vec![vec![0x00, 0x00]; 6]);
        let result = Ms8607::new(bus, NoDelay, DEFAULT_ADDRESS, Variant::Ms8607);
        assert!(matches!(result, Err(Error::InvalidCalibration)));

        let bus = FakeBus::new(vec![vec![0xFF, 0xFF]; 6]);
        let result = Ms8607::new(bus, NoDelay, DEFAULT_ADDRESS, Variant::Ms8607);
        assert!(matches!(result, Err(Error::InvalidCalibration)));
    }

    #[test]
    fn sample_runs_both_conversions_and_compensates() {
        let mut reads = prom_reads();
        // D1 = 9085466, D2 = 8569150.
        reads.push(vec![0x8A, 0xA2, 0x1A]);
        reads.push(vec![0x82, 0xC1, 0x3E]);

        let bus = FakeBus::new(reads);
        let mut sensor = Ms8607::new(bus, NoDelay, DEFAULT_ADDRESS, Variant::Ms5611).unwrap();
        let reading = sensor.sample().unwrap();

        assert_eq!(reading.temperature, 2007);
        assert_eq!(reading.pressure, 100009);

        let (bus, _) = sensor.free();
        // Convert D1, read ADC, convert D2, read ADC.
        assert_eq!(bus.commands()[7..], [0x44, 0x00, 0x54, 0x00]);
    }

    #[test]
    fn bus_fault_surfaces_as_i2c_error() {
        let mut reads = prom_reads();
        reads.push(vec![0x8A, 0xA2, 0x1A]);
        let bus = FakeBus::new(reads);
        let mut sensor = Ms8607::new(bus, NoDelay, DEFAULT_ADDRESS, Variant::Ms5611).unwrap();

        // Fail the bus mid-sequence; no partial reading escapes.
        sensor.i2c.failing = true;
        assert_eq!(sensor.sample(), Err(Error::I2c(BusFault)));
    }
}
