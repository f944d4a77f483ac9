//! Valve control state machine.

use std::time::{Duration, Instant};

use log::info;
use shared::{Command, ValveState};

/// The active operating mode. Exactly one at a time; transitions happen
/// only through accepted commands or the auto-timeout expiry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlMode {
    /// No automatic control; the valve stays where it was left.
    Idle,
    /// The valve is pinned open by command.
    ManualOpen,
    /// The valve is pinned closed by command.
    ManualClosed,
    /// Pressure-driven venting inside the hysteresis band.
    Auto,
}

/// Vent thresholds and the stuck-open safety timeout.
#[derive(Clone, Copy, Debug)]
pub struct ThresholdConfig {
    /// Millibar. At or above this pressure no venting is required.
    pub open_above: f32,
    /// Millibar. Close the vent below this pressure.
    pub close_below: f32,
    /// Force-close and drop out of `Auto` after this long without
    /// reaching the close threshold.
    pub auto_timeout: Duration,
}

/// What the loop must do after a controller step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Action {
    pub valve: ValveState,
    /// Outbound actuation broadcast, when the step calls for one.
    pub broadcast: Option<Command>,
}

pub struct VentController {
    config: ThresholdConfig,
    mode: ControlMode,
    valve: ValveState,
    /// Start of the current `Auto` timeout window. `Some` exactly while
    /// the mode is `Auto`.
    auto_since: Option<Instant>,
}

impl VentController {
    pub fn new(config: ThresholdConfig) -> Self {
        Self {
            config,
            mode: ControlMode::Idle,
            valve: ValveState::Closed,
            auto_since: None,
        }
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn valve(&self) -> ValveState {
        self.valve
    }

    /// Apply one received command.
    ///
    /// A manual command always wins over the automatic evaluation within
    /// the same cycle because the loop applies it afterwards. `Auto`
    /// re-engages only through an explicit `AutoOn`. [`Command::None`]
    /// never transitions anything.
    pub fn apply(&mut self, command: Command, now: Instant) -> Option<Action> {
        match command {
            Command::OpenValve => {
                self.enter(ControlMode::ManualOpen);
                Some(self.actuate(ValveState::Open, None))
            }
            Command::CloseValve => {
                self.enter(ControlMode::ManualClosed);
                Some(self.actuate(ValveState::Closed, None))
            }
            Command::Idle => {
                self.enter(ControlMode::Idle);
                None
            }
            Command::AutoOn => {
                self.enter(ControlMode::Auto);
                self.auto_since = Some(now);
                None
            }
            Command::AutoOff => {
                self.enter(ControlMode::Idle);
                None
            }
            Command::None => None,
        }
    }

    /// Evaluate one pressure reading. Only `Auto` acts on readings; in any
    /// other mode the reading is telemetry only.
    ///
    /// Close is strictly-below the close threshold and the open band is
    /// strictly-between the thresholds, so a reading exactly on either
    /// bound changes nothing.
    pub fn on_reading(&mut self, pressure_mbar: f32, now: Instant) -> Option<Action> {
        if self.mode != ControlMode::Auto {
            return None;
        }

        let since = *self.auto_since.get_or_insert(now);
        if now.duration_since(since) > self.config.auto_timeout {
            // Safety fallback against a stuck-open valve: the close
            // threshold was never reached in time.
            info!("auto timeout expired, forcing valve closed");
            self.enter(ControlMode::Idle);
            return Some(self.actuate(ValveState::Closed, Some(Command::CloseValve)));
        }

        if pressure_mbar < self.config.close_below {
            // Target reached; re-arm the timeout window.
            self.auto_since = Some(now);
            Some(self.actuate(ValveState::Closed, Some(Command::CloseValve)))
        } else if pressure_mbar > self.config.close_below && pressure_mbar < self.config.open_above
        {
            Some(self.actuate(ValveState::Open, Some(Command::OpenValve)))
        } else {
            // At or above the open threshold no venting is required.
            None
        }
    }

    fn enter(&mut self, mode: ControlMode) {
        if mode != self.mode {
            info!("mode {:?} -> {:?}", self.mode, mode);
        }
        if mode != ControlMode::Auto {
            self.auto_since = None;
        }
        self.mode = mode;
    }

    fn actuate(&mut self, state: ValveState, broadcast: Option<Command>) -> Action {
        self.valve = state;
        Action { valve: state, broadcast }
    }
}
