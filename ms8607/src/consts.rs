pub mod cmd {
    /// Reset, reloads the PROM into the sensor's internal registers.
    pub const RESET: u8 = 0x1E;
    /// Start a D1 (pressure) conversion.
    pub const CONVERT_D1: u8 = 0x44;
    /// Start a D2 (temperature) conversion.
    pub const CONVERT_D2: u8 = 0x54;
    /// Read the 24-bit ADC result of the last conversion.
    pub const READ_ADC: u8 = 0x00;
    /// PROM word base; C1 lives at base + 2, C2 at base + 4, and so on.
    pub const PROM_BASE: u8 = 0xA0;
}

/// Settle time after a reset before the PROM can be read.
pub const RESET_DELAY_MS: u8 = 20;

/// Fixed wait per conversion. The datasheet bounds the conversion time at
/// the OSR selected by [`cmd::CONVERT_D1`]/[`cmd::CONVERT_D2`] well under
/// this; the sensor has no ready flag worth polling, so a sleep past the
/// bound is the whole protocol.
pub const CONVERSION_DELAY_MS: u8 = 20;
