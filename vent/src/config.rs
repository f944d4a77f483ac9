//! Startup configuration.
//!
//! The original unit hardcoded its thresholds, pins, and calibration
//! constants in the script; here they load from a JSON file, with flight
//! defaults for every field so a partial file is fine.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use log::info;
use serde::Deserialize;

use crate::controller::ThresholdConfig;
use crate::cycle::Pacing;

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Millibar. At or above this pressure no venting is required.
    pub open_above: f32,
    /// Millibar. Close the vent below this pressure.
    pub close_below: f32,
    /// Seconds of `Auto` without reaching the close threshold before the
    /// valve is forced closed.
    pub auto_timeout_secs: f32,
    /// Which sensor part number is fitted: `"ms8607"` or `"ms5611"`.
    pub variant: ms8607::Variant,
    pub i2c_bus: String,
    /// Fallback address when the bus scan finds neither family address.
    pub sensor_address: u8,
    pub radio_port: String,
    pub radio_baud: u32,
    /// GPIO numbers (sysfs numbering).
    pub valve_pin: u64,
    pub hall_pin: u64,
    /// When set, driven high once at startup and left on.
    pub heater_pin: Option<u64>,
    /// Seconds between the sensor read and the command poll (radio clock
    /// sync).
    pub sync_interval_secs: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            open_above: 30.0,
            close_below: 26.0,
            auto_timeout_secs: 1800.0,
            variant: ms8607::Variant::Ms8607,
            i2c_bus: "/dev/i2c-1".into(),
            sensor_address: ms8607::DEFAULT_ADDRESS,
            radio_port: "/dev/ttyUSB0".into(),
            radio_baud: 9600,
            valve_pin: 17,
            hall_pin: 27,
            heater_pin: None,
            sync_interval_secs: 3.0,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn thresholds(&self) -> ThresholdConfig {
        ThresholdConfig {
            open_above: self.open_above,
            close_below: self.close_below,
            auto_timeout: Duration::from_secs_f32(self.auto_timeout_secs),
        }
    }

    pub fn pacing(&self) -> Pacing {
        Pacing {
            sync_interval: Duration::from_secs_f32(self.sync_interval_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_flight_sane() {
        let config = Config::default();
        assert!(config.close_below < config.open_above);
        assert!(config.auto_timeout_secs > 0.0);
        assert_eq!(config.sensor_address, 0x76);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"open_above": 31.5, "variant": "ms5611"}"#).unwrap();
        assert_eq!(config.open_above, 31.5);
        assert_eq!(config.variant, ms8607::Variant::Ms5611);
        assert_eq!(config.close_below, 26.0);
        assert_eq!(config.radio_baud, 9600);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: std::result::Result<Config, _> =
            serde_json::from_str(r#"{"open_abovee": 31.5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn thresholds_and_pacing_convert() {
        let config = Config::default();
        let thresholds = config.thresholds();
        assert_eq!(thresholds.auto_timeout, Duration::from_secs(1800));
        assert_eq!(config.pacing().sync_interval, Duration::from_secs(3));
    }
}
