//! One control-loop iteration.
//!
//! Strictly sequential: sample, evaluate, pace, poll, apply, report. No
//! error here is fatal; every failure is inspected, logged, and survives
//! into the next cycle, because nobody is around to restart the process.

use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use shared::Command;

use crate::controller::{Action, VentController};
use crate::io::{MagneticSensor, PressureSensor, ValveDriver};
use crate::radio::{self, Radio};

/// Loop timing constants.
#[derive(Clone, Copy, Debug)]
pub struct Pacing {
    /// Pause between the sensor read and the command poll. Transmitting
    /// without it desynchronizes the radio clock; this is a hard external
    /// constraint, not optional pacing.
    pub sync_interval: Duration,
}

pub fn run_cycle(
    controller: &mut VentController,
    sensor: &mut dyn PressureSensor,
    radio: &mut dyn Radio,
    valve: &mut dyn ValveDriver,
    hall: &mut dyn MagneticSensor,
    pacing: &Pacing,
) {
    match sensor.sample() {
        Ok(reading) => {
            debug!(
                "T={:.1}C P={:.1}mbar",
                reading.temperature_celsius(),
                reading.pressure_mbar()
            );

            let telemetry = format!(
                "T={:.1},P={:.1}",
                reading.temperature_celsius(),
                reading.pressure_mbar()
            );
            if let Err(error) = radio.transmit(telemetry.as_bytes()) {
                warn!("{}, telemetry dropped", error);
            }

            if let Some(action) = controller.on_reading(reading.pressure_mbar(), Instant::now()) {
                perform(action, valve, radio);
            }
        }
        // No reading, no decision: mode and valve state stay untouched
        // and the next cycle is the retry.
        Err(error) => warn!("{}, skipping this cycle's reading", error),
    }

    thread::sleep(pacing.sync_interval);

    let command = radio::poll_command(radio);
    if command != Command::None {
        info!("received {:?}", command);
    }
    if let Some(action) = controller.apply(command, Instant::now()) {
        perform(action, valve, radio);
    }

    match hall.status() {
        Ok(status) => {
            if let Err(error) = radio.transmit(status.code().as_bytes()) {
                warn!("{}, status report dropped", error);
            }
        }
        Err(error) => warn!("{}, no status report this cycle", error),
    }
}

fn perform(action: Action, valve: &mut dyn ValveDriver, radio: &mut dyn Radio) {
    if let Err(error) = valve.actuate(action.valve) {
        warn!("{}", error);
    }
    if let Some(code) = action.broadcast.and_then(Command::code) {
        if let Err(error) = radio.transmit(code.as_bytes()) {
            warn!("{}, actuation broadcast dropped", error);
        }
    }
}
