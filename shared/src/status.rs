//! Auxiliary status codes sent up to the coordinator.

/// State of the Hall/magnetic proxy sensor, reported once per cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum HallStatus {
    /// The magnet is in range of the sensor.
    Engaged,
    /// The magnet is out of range.
    Released,
}

impl HallStatus {
    pub fn from_engaged(engaged: bool) -> Self {
        if engaged {
            HallStatus::Engaged
        } else {
            HallStatus::Released
        }
    }

    /// The 3-character uplink code for this state.
    pub fn code(self) -> &'static str {
        match self {
            HallStatus::Engaged => "VCR",
            HallStatus::Released => "VOA",
        }
    }
}
