//! PC-CMD V2 Protocol Library
//!
//! This crate provides framing, command encoding, and notification parsing
//! for the PC-CMD V2 protocol spoken by Icom professional (IDAS/dPMR)
//! transceivers over a serial line.
//!
//! # Format
//! - Frames: `0x02` + ASCII command text + `0x03`, no in-band escaping
//! - Commands: `*SET|*GET,<domain>,<op>[,<args>...][,ACK]`
//! - Domains: `DPMR`, `IDAS`, `MCH`, `UI`, `INFO`
//! - Notifications mirror the comma grammar prefixed `*NTF,...`
//!
//! The two digital sub-modes differ only in how station IDs are written:
//! dPMR zero-pads to 7 digits, IDAS (NXDN) sends them unpadded.
//!
//! Everything here is pure: bytes and strings in, typed values out. The
//! blocking read loop, timeouts, and channel bookkeeping live in the
//! driver crate.
//!
//! # Example
//!
//! ```rust
//! use pccmd_protocol::{frame, notification, Command, Mode, Notification};
//!
//! // Encode a channel-select command into its wire frame
//! let text = Command::SelectChannel(5).encode(Mode::Idas);
//! assert_eq!(frame::encode(&text), b"\x02*SET,MCH,SEL,5\x03");
//!
//! // Parse the radio's echo
//! match notification::parse("*NTF,MCH,SEL,5") {
//!     Notification::ChannelSelected { channel } => assert_eq!(channel, "5"),
//!     other => panic!("unexpected record: {other:?}"),
//! }
//! ```

pub mod command;
pub mod error;
pub mod frame;
pub mod notification;

pub use command::Command;
pub use error::FrameError;
pub use notification::{MessageKind, Notification, NTF_MARKER};

/// Digital sub-mode of the transceiver.
///
/// Selects the command domain (`DPMR` vs `IDAS`) and the station-ID
/// formatting convention on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// dPMR — station IDs are zero-padded to 7 digits
    Dpmr,
    /// IDAS (NXDN) — station IDs are sent unpadded
    Idas,
}

impl Mode {
    /// The command/notification domain field for this sub-mode
    pub fn domain(&self) -> &'static str {
        match self {
            Mode::Dpmr => "DPMR",
            Mode::Idas => "IDAS",
        }
    }

    /// Render a station ID with this sub-mode's padding convention.
    ///
    /// dPMR always pads to exactly 7 digits (`6210` -> `"0006210"`)
    /// regardless of magnitude; IDAS passes the ID through unpadded.
    pub fn format_id(&self, id: u32) -> String {
        match self {
            Mode::Dpmr => format!("{id:07}"),
            Mode::Idas => id.to_string(),
        }
    }

    /// Returns a human-readable name for the sub-mode
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Dpmr => "dPMR",
            Mode::Idas => "IDAS (NXDN)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Mode;

    #[test]
    fn dpmr_ids_pad_to_seven_digits() {
        assert_eq!(Mode::Dpmr.format_id(6210), "0006210");
        assert_eq!(Mode::Dpmr.format_id(0), "0000000");
        assert_eq!(Mode::Dpmr.format_id(1_107), "0001107");
    }

    #[test]
    fn dpmr_ids_longer_than_seven_digits_are_not_truncated() {
        assert_eq!(Mode::Dpmr.format_id(12_345_678), "12345678");
    }

    #[test]
    fn idas_ids_are_never_padded() {
        assert_eq!(Mode::Idas.format_id(6210), "6210");
        assert_eq!(Mode::Idas.format_id(0), "0");
    }
}
