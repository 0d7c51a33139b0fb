//! Notification parsing
//!
//! Maps one decoded `*NTF` frame into a typed [`Notification`] record.
//! Dispatch is a two-level lookup on the domain field and the subtype
//! field, then (for `SQL`/`DBUSY`/`RXMSG`) on a discriminator field.
//! Parsing is total: a frame that matches no table row is
//! [`Notification::Unrecognized`], never an error.

use tracing::debug;

/// Leading marker of every notification frame
pub const NTF_MARKER: &str = "*NTF";

/// Payload kind carried by an incoming `RXMSG` frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageKind {
    /// Free text (`MSG` tag)
    Text,
    /// GPS coordinates carried in the text field (`GPS` tag)
    Gps,
}

/// One parsed notification frame.
///
/// Station IDs are kept as the wire strings (dPMR IDs arrive zero-padded,
/// IDAS IDs unpadded); fields a variant does not list are simply not
/// carried by that event on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Notification {
    /// Incoming digital voice call (`RXVCALL`)
    VoiceCall {
        sender_id: String,
        dest_id: String,
        dest_type: String,
        info: String,
    },
    /// Incoming text or GPS-position message (`RXMSG`)
    Message {
        sender_id: String,
        dest_id: String,
        dest_type: String,
        kind: MessageKind,
        text: String,
    },
    /// Incoming status value (`RXSTAT`)
    Status {
        sender_id: String,
        dest_id: String,
        dest_type: String,
        status: String,
    },
    /// Scrambler state report (`RXENCRYPT`)
    Scrambler { state: String },
    /// Colour-code / RAN report (`RXRAN` / `RXCC`)
    ColorCode { value: String },
    /// Channel-selection echo (`MCH,SEL`)
    ChannelSelected { channel: String },
    /// Squelch opened or closed (`CTRL,SQL`)
    Squelch { detail: String },
    /// Audio path switched on or off (`CTRL,AUD`)
    Audio { state: String },
    /// Digital busy indicator (`CTRL,DBUSY`)
    DigitalBusy { detail: String },
    /// Syntactically valid frame with no mapping
    Unrecognized,
}

/// Parse one notification frame.
///
/// Pure function over the frame text; identical input always yields an
/// identical record. The quoted `MSG`/`GPS` payload is extracted by
/// substring (it may contain commas) and ends at the first `"` after the
/// tag — the wire grammar has no escape for an embedded quote, so a
/// payload containing one is truncated at that point.
pub fn parse(frame: &str) -> Notification {
    let fields: Vec<&str> = frame.split(',').collect();
    let domain = fields.get(1).copied().unwrap_or("");
    let subtype = fields.get(2).copied().unwrap_or("");

    let record = match (domain, subtype) {
        ("IDAS" | "DPMR", "RXVCALL") => parse_voice_call(&fields),
        ("IDAS" | "DPMR", "RXMSG") => parse_message(frame, &fields),
        ("IDAS" | "DPMR", "RXSTAT") => parse_status(&fields),
        ("IDAS" | "DPMR", "RXENCRYPT") => fields.get(3).map(|state| Notification::Scrambler {
            state: (*state).to_string(),
        }),
        ("IDAS" | "DPMR", "RXRAN" | "RXCC") => fields.get(3).map(|value| Notification::ColorCode {
            value: (*value).to_string(),
        }),
        ("MCH", "SEL") => fields.get(3).map(|channel| Notification::ChannelSelected {
            channel: (*channel).to_string(),
        }),
        ("CTRL", "SQL") => match fields.get(3).copied() {
            Some("OPEN") => fields.get(5).map(|detail| Notification::Squelch {
                detail: (*detail).to_string(),
            }),
            Some("CLOSE") => Some(Notification::Squelch {
                detail: "CLOSE".to_string(),
            }),
            _ => None,
        },
        ("CTRL", "AUD") => fields.get(3).map(|state| Notification::Audio {
            state: (*state).to_string(),
        }),
        ("CTRL", "DBUSY") => match fields.get(3).copied() {
            Some("ON") => fields.get(5).map(|detail| Notification::DigitalBusy {
                detail: (*detail).to_string(),
            }),
            Some("OFF") => Some(Notification::DigitalBusy {
                detail: "OFF".to_string(),
            }),
            _ => None,
        },
        _ => None,
    };

    record.unwrap_or_else(|| {
        debug!(frame, "notification matched no table row");
        Notification::Unrecognized
    })
}

/// `*NTF,<domain>,RXVCALL,<dest_type>,<dest>,<sender>,...,<info>`
fn parse_voice_call(fields: &[&str]) -> Option<Notification> {
    Some(Notification::VoiceCall {
        sender_id: (*fields.get(5)?).to_string(),
        dest_id: (*fields.get(4)?).to_string(),
        dest_type: (*fields.get(3)?).to_string(),
        info: (*fields.get(7)?).to_string(),
    })
}

/// `*NTF,<domain>,RXMSG,<dest_type>,<dest>,<sender>,...,<MSG|GPS>,"<text>"`
fn parse_message(frame: &str, fields: &[&str]) -> Option<Notification> {
    let (kind, marker) = match fields.get(8).copied() {
        Some("MSG") => (MessageKind::Text, ",MSG,\""),
        Some("GPS") => (MessageKind::Gps, ",GPS,\""),
        _ => return None,
    };
    Some(Notification::Message {
        sender_id: (*fields.get(5)?).to_string(),
        dest_id: (*fields.get(4)?).to_string(),
        dest_type: (*fields.get(3)?).to_string(),
        kind,
        text: quoted_after(frame, marker)?.to_string(),
    })
}

/// `*NTF,<domain>,RXSTAT,<dest_type>,<dest>,<sender>,...,<status>`
fn parse_status(fields: &[&str]) -> Option<Notification> {
    Some(Notification::Status {
        sender_id: (*fields.get(5)?).to_string(),
        dest_id: (*fields.get(4)?).to_string(),
        dest_type: (*fields.get(3)?).to_string(),
        status: (*fields.get(8)?).to_string(),
    })
}

/// Extract the quoted payload following the last occurrence of `marker`.
///
/// The payload may contain commas; it may not contain a literal `"` — an
/// embedded quote ends extraction early.
fn quoted_after<'a>(frame: &'a str, marker: &str) -> Option<&'a str> {
    let start = frame.rfind(marker)? + marker.len();
    let rest = &frame[start..];
    let end = rest.find('"').unwrap_or(rest.len());
    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::{parse, MessageKind, Notification};

    #[test]
    fn channel_select_echo() {
        assert_eq!(
            parse("*NTF,MCH,SEL,5"),
            Notification::ChannelSelected {
                channel: "5".to_string()
            }
        );
    }

    #[test]
    fn voice_call_field_positions() {
        let record = parse("*NTF,IDAS,RXVCALL,IND,4324,6210,0,1");
        assert_eq!(
            record,
            Notification::VoiceCall {
                sender_id: "6210".to_string(),
                dest_id: "4324".to_string(),
                dest_type: "IND".to_string(),
                info: "1".to_string(),
            }
        );
    }

    #[test]
    fn text_message_payload_keeps_commas() {
        let record = parse("*NTF,DPMR,RXMSG,IND,0004324,0006210,095,0,MSG,\"Hello, World\"");
        assert_eq!(
            record,
            Notification::Message {
                sender_id: "0006210".to_string(),
                dest_id: "0004324".to_string(),
                dest_type: "IND".to_string(),
                kind: MessageKind::Text,
                text: "Hello, World".to_string(),
            }
        );
    }

    #[test]
    fn gps_message_uses_gps_marker() {
        let record = parse("*NTF,IDAS,RXMSG,IND,4324,6210,095,0,GPS,\"4843.33N,00225.16E\"");
        match record {
            Notification::Message { kind, text, .. } => {
                assert_eq!(kind, MessageKind::Gps);
                assert_eq!(text, "4843.33N,00225.16E");
            }
            other => panic!("expected Message, got {other:?}"),
        }
    }

    #[test]
    fn embedded_quote_truncates_payload() {
        // No escaping on the wire; extraction stops at the first quote.
        let record = parse("*NTF,DPMR,RXMSG,IND,0004324,0006210,095,0,MSG,\"say \"hi\" now\"");
        match record {
            Notification::Message { text, .. } => assert_eq!(text, "say "),
            other => panic!("expected Message, got {other:?}"),
        }
    }

    #[test]
    fn status_report() {
        let record = parse("*NTF,IDAS,RXSTAT,IND,4324,6210,0,0,7");
        assert_eq!(
            record,
            Notification::Status {
                sender_id: "6210".to_string(),
                dest_id: "4324".to_string(),
                dest_type: "IND".to_string(),
                status: "7".to_string(),
            }
        );
    }

    #[test]
    fn scrambler_and_color_code() {
        assert_eq!(
            parse("*NTF,DPMR,RXENCRYPT,ON"),
            Notification::Scrambler {
                state: "ON".to_string()
            }
        );
        assert_eq!(
            parse("*NTF,IDAS,RXRAN,3"),
            Notification::ColorCode {
                value: "3".to_string()
            }
        );
        assert_eq!(
            parse("*NTF,DPMR,RXCC,12"),
            Notification::ColorCode {
                value: "12".to_string()
            }
        );
    }

    #[test]
    fn squelch_open_carries_level_close_carries_close() {
        assert_eq!(
            parse("*NTF,CTRL,SQL,OPEN,0,9"),
            Notification::Squelch {
                detail: "9".to_string()
            }
        );
        assert_eq!(
            parse("*NTF,CTRL,SQL,CLOSE"),
            Notification::Squelch {
                detail: "CLOSE".to_string()
            }
        );
    }

    #[test]
    fn audio_and_digital_busy() {
        assert_eq!(
            parse("*NTF,CTRL,AUD,ON"),
            Notification::Audio {
                state: "ON".to_string()
            }
        );
        assert_eq!(
            parse("*NTF,CTRL,DBUSY,ON,0,1"),
            Notification::DigitalBusy {
                detail: "1".to_string()
            }
        );
        assert_eq!(
            parse("*NTF,CTRL,DBUSY,OFF"),
            Notification::DigitalBusy {
                detail: "OFF".to_string()
            }
        );
    }

    #[test]
    fn unmatched_frames_are_unrecognized() {
        assert_eq!(parse("*NTF,UI,AFVOL,128"), Notification::Unrecognized);
        assert_eq!(parse("*NTF,CTRL,SQL,HALFWAY"), Notification::Unrecognized);
        assert_eq!(parse("garbage"), Notification::Unrecognized);
        assert_eq!(parse(""), Notification::Unrecognized);
    }

    #[test]
    fn truncated_frames_are_unrecognized() {
        // Right domain and subtype but missing the positional fields.
        assert_eq!(parse("*NTF,IDAS,RXVCALL,IND"), Notification::Unrecognized);
        assert_eq!(
            parse("*NTF,DPMR,RXMSG,IND,1,2,3,4"),
            Notification::Unrecognized
        );
    }

    #[test]
    fn parse_is_pure() {
        let frame = "*NTF,DPMR,RXMSG,IND,0004324,0006210,095,0,MSG,\"ping\"";
        assert_eq!(parse(frame), parse(frame));
    }
}
