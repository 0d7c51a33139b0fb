//! Frame layer: delimiter-bounded wire format
//!
//! One frame is a start-of-frame byte, UTF-8 command text, and an
//! end-of-frame byte. The protocol has no in-band escaping, so a payload
//! can never legally contain the terminator — that is a constraint of the
//! grammar itself, not of this implementation.

use crate::error::FrameError;

/// Start-of-frame marker
pub const STX: u8 = 0x02;

/// End-of-frame marker
pub const ETX: u8 = 0x03;

/// Encode command text into its wire frame.
///
/// The command grammar produces ASCII text free of the terminator byte;
/// no escaping is applied.
pub fn encode(command: &str) -> Vec<u8> {
    let mut data = Vec::with_capacity(command.len() + 2);
    data.push(STX);
    data.extend_from_slice(command.as_bytes());
    data.push(ETX);
    data
}

/// Decode one raw delimiter-bounded byte run into command text.
///
/// `raw` is everything accumulated up to and including the terminator.
/// The first and last byte are stripped and the remainder decoded as
/// UTF-8; a run shorter than two bytes decodes to the empty string.
pub fn decode(raw: &[u8]) -> Result<String, FrameError> {
    let payload = if raw.len() >= 2 {
        &raw[1..raw.len() - 1]
    } else {
        &[][..]
    };
    Ok(std::str::from_utf8(payload)?.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encode_wraps_in_delimiters() {
        assert_eq!(encode("*GET,MCH,SEL"), b"\x02*GET,MCH,SEL\x03");
    }

    #[test]
    fn decode_strips_delimiters() {
        assert_eq!(decode(b"\x02*NTF,MCH,SEL,5\x03").unwrap(), "*NTF,MCH,SEL,5");
    }

    #[test]
    fn decode_of_bare_terminator_is_empty() {
        assert_eq!(decode(b"\x03").unwrap(), "");
        assert_eq!(decode(b"\x02\x03").unwrap(), "");
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        let result = decode(&[STX, 0xFF, 0xFE, ETX]);
        assert!(matches!(result, Err(FrameError::InvalidUtf8(_))));
    }

    proptest! {
        #[test]
        fn round_trip_printable_ascii(command in "[ -~]*") {
            let decoded = decode(&encode(&command)).unwrap();
            prop_assert_eq!(decoded, command);
        }
    }
}
