//! Balloon vent unit flight controller.
//!
//! Reads the barometric sensor, runs the valve state machine, and talks
//! to the coordinator over the XBee link. Runs unattended until power
//! loss; nothing past startup is allowed to kill the process.

mod config;
mod controller;
mod cycle;
mod hardware;
mod io;
mod radio;

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use linux_embedded_hal::{Delay, I2cdev};
use log::info;
use ms8607::Ms8607;

use crate::config::Config;
use crate::controller::VentController;
use crate::hardware::{Barometer, HallPin, ValvePin};
use crate::radio::SerialRadio;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("vent.json"));
    let config = Config::load(&path)?;
    info!(
        "vent control initialize: open above {} mbar, close below {} mbar, {:?}",
        config.open_above, config.close_below, config.variant
    );

    let mut i2c = I2cdev::new(&config.i2c_bus)
        .with_context(|| format!("failed to open {}", config.i2c_bus))?;
    let address = hardware::discover_sensor(&mut i2c, config.sensor_address);
    info!("pressure sensor at {:#04x}", address);

    let sensor = Ms8607::new(i2c, Delay, address, config.variant)
        .map_err(|error| anyhow!("sensor init failed: {:?}", error))?;
    info!("calibration PROM: {:?}", sensor.calibration());
    let mut sensor = Barometer::new(sensor);

    let mut radio = SerialRadio::open(&config.radio_port, config.radio_baud)?;

    if let Some(pin) = config.heater_pin {
        hardware::enable_heater(pin)?;
    }
    let mut valve = ValvePin::new(hardware::output_pin(config.valve_pin)?);
    let mut hall = HallPin::new(hardware::input_pin(config.hall_pin)?);

    let mut controller = VentController::new(config.thresholds());
    let pacing = config.pacing();

    info!("entering control loop");
    loop {
        cycle::run_cycle(
            &mut controller,
            &mut sensor,
            &mut radio,
            &mut valve,
            &mut hall,
            &pacing,
        );
    }
}
