//! Shared definitions for the vent unit <-> coordinator radio link.

/// A command decoded from a 3-character inbound radio code.
///
/// `None` means "no valid command arrived this cycle". It never transitions
/// the controller and must not be collapsed into an implicit [`Idle`]
/// (`Command::Idle` is an explicit instruction with its own code).
///
/// [`Idle`]: Command::Idle
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum Command {
    /// Open the vent valve and hold it open.
    OpenValve,
    /// Close the vent valve and hold it closed.
    CloseValve,
    /// Drop to idle; the valve stays where it is.
    Idle,
    /// Engage automatic pressure control.
    AutoOn,
    /// Disengage automatic pressure control.
    AutoOff,
    /// No valid command this cycle.
    None,
}

impl Command {
    /// Decode the first three characters of an inbound payload.
    ///
    /// Total: short, empty, non-text, or unrecognized payloads all decode
    /// to [`Command::None`]. Decoding never fails.
    pub fn decode(payload: &[u8]) -> Command {
        match payload.get(..3) {
            Some(b"JKL") => Command::OpenValve,
            Some(b"MNO") => Command::CloseValve,
            Some(b"ABC") => Command::Idle,
            Some(b"VWX") => Command::AutoOn,
            Some(b"PQR") => Command::AutoOff,
            _ => Command::None,
        }
    }

    /// The outbound 3-character code for this command.
    ///
    /// [`Command::None`] has no wire representation.
    pub fn code(self) -> Option<&'static str> {
        match self {
            Command::OpenValve => Some("JKL"),
            Command::CloseValve => Some("MNO"),
            Command::Idle => Some("ABC"),
            Command::AutoOn => Some("VWX"),
            Command::AutoOff => Some("PQR"),
            Command::None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_known_codes() {
        assert_eq!(Command::decode(b"JKL"), Command::OpenValve);
        assert_eq!(Command::decode(b"MNO"), Command::CloseValve);
        assert_eq!(Command::decode(b"ABC"), Command::Idle);
        assert_eq!(Command::decode(b"VWX"), Command::AutoOn);
        assert_eq!(Command::decode(b"PQR"), Command::AutoOff);
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        assert_eq!(Command::decode(b"JKLxyz"), Command::OpenValve);
        assert_eq!(Command::decode(b"MNO\xff\xff"), Command::CloseValve);
    }

    #[test]
    fn short_or_empty_payloads_decode_to_none() {
        assert_eq!(Command::decode(b""), Command::None);
        assert_eq!(Command::decode(b"XX"), Command::None);
        assert_eq!(Command::decode(b"JK"), Command::None);
    }

    #[test]
    fn unknown_and_binary_payloads_decode_to_none() {
        assert_eq!(Command::decode(b"ZZZ"), Command::None);
        assert_eq!(Command::decode(b"jkl"), Command::None);
        assert_eq!(Command::decode(&[0xff, 0xfe, 0xfd, 0x00]), Command::None);
    }

    #[test]
    fn codes_round_trip() {
        for command in [
            Command::OpenValve,
            Command::CloseValve,
            Command::Idle,
            Command::AutoOn,
            Command::AutoOff,
        ] {
            let code = command.code().unwrap();
            assert_eq!(Command::decode(code.as_bytes()), command);
        }
        assert_eq!(Command::None.code(), None);
    }
}
