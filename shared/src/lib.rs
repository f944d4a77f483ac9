#![cfg_attr(not(test), no_std)] // Disable the standard library when not testing.

mod command;
mod status;

pub use command::Command;
pub use status::HallStatus;

/// The last physical command issued to the valve driver.
///
/// This is not an operating mode: `Auto` control drives the valve either
/// way from pressure, and the manual modes pin it in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum ValveState {
    /// The vent valve is closed.
    Closed,
    /// The vent valve is open, venting gas.
    Open,
}
