//! Manufacturer compensation math for the MS8607/MS5611 sensor family.

use serde::{Deserialize, Serialize};

use crate::{Calibration, RawSample, Reading};

/// Which part number is on the board.
///
/// The two parts share the formula shape but not its constants, and only
/// the MS5611 datasheet specifies the low-temperature second-order
/// correction. Mixing the constant sets silently corrupts every reading,
/// so the variant is an explicit constructor argument and each set lives
/// in exactly one `match` arm below.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, defmt::Format)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Ms8607,
    Ms5611,
}

/// Apply the calibration polynomial to one raw conversion pair.
///
/// Pure integer math; identical inputs always produce identical readings.
/// Both halves of `raw` must come from the same conversion sequence.
pub fn compensate(variant: Variant, cal: &Calibration, raw: RawSample) -> Reading {
    let d1 = raw.d1 as i64;
    let d2 = raw.d2 as i64;

    // Difference between the measured and the reference temperature.
    let dt = d2 - ((cal.c5 as i64) << 8);
    let mut temp = 2000 + ((dt * cal.c6 as i64) >> 23);

    let (mut off, mut sens) = match variant {
        Variant::Ms8607 => (
            ((cal.c2 as i64) << 17) + ((cal.c4 as i64 * dt) >> 6),
            ((cal.c1 as i64) << 16) + ((cal.c3 as i64 * dt) >> 7),
        ),
        Variant::Ms5611 => (
            ((cal.c2 as i64) << 16) + ((cal.c4 as i64 * dt) >> 7),
            ((cal.c1 as i64) << 15) + ((cal.c3 as i64 * dt) >> 8),
        ),
    };

    // Second-order correction below 20 C, MS5611 only. The MS8607 flight
    // script runs first-order; applying this to it would be wrong.
    if variant == Variant::Ms5611 && temp < 2000 {
        let t2 = (dt * dt) >> 31;
        let band = temp - 2000;
        let mut off2 = 5 * band * band / 2;
        let mut sens2 = 5 * band * band / 4;
        if temp < -1500 {
            let low = temp + 1500;
            off2 += 7 * low * low;
            sens2 += 11 * low * low / 2;
        }
        temp -= t2;
        off -= off2;
        sens -= sens2;
    }

    let pressure = (((d1 * sens) >> 21) - off) >> 15;

    Reading {
        temperature: temp as i32,
        pressure: pressure as i32,
    }
}
