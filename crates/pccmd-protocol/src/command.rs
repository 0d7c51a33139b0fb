//! Typed command grammar
//!
//! Every operation the driver can issue is a [`Command`] variant, rendered
//! to the comma grammar `*SET|*GET,<domain>,<op>[,<args>...][,ACK]`.
//! Station IDs go through [`Mode::format_id`], which is where the dPMR
//! 7-digit zero-padding vs IDAS unpadded distinction lives.

use crate::Mode;

/// One PC-CMD command
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    /// Select a memory channel: `*SET,MCH,SEL,<ch>`
    SelectChannel(u16),
    /// Query the selected channel: `*GET,MCH,SEL`
    GetChannel,
    /// Set speaker volume (0-255): `*SET,UI,AFVOL,<vol>`
    SetVolume(u8),
    /// Query speaker volume: `*GET,UI,AFVOL`
    GetVolume,
    /// Program the TX/RX frequency pair in Hz: `*SET,MCH,FREQ,<tx>,<rx>`
    SetFrequency { tx_hz: u64, rx_hz: u64 },
    /// Query the TX/RX frequency pair: `*GET,MCH,FREQ`
    GetFrequency,
    /// Query one line of the clone comment: `*GET,INFO,COMMENT,<line>`
    GetCloneComment { line: u8 },
    /// Query the electronic serial number: `*GET,INFO,ESN`
    GetEsn,
    /// Write text to the front-panel display, empty text clears it:
    /// `*SET,UI,TEXT,"<text>"`
    SetUiText(String),
    /// Soft-reset the user interface: `*SET,UI,RESET`
    Reset,
    /// Bind the radio's own station ID: `*SET,<domain>,OWNID,<id>`
    SetRadioId(u32),
    /// Query the bound station ID: `*GET,<domain>,OWNID`
    GetRadioId,
    /// Individual text message with a delivery report requested:
    /// `*SET,<domain>,TXMSG,IND,<dest>,<own>,MSG,"<text>",ACK`
    SendMessage {
        dest_id: u32,
        own_id: u32,
        text: String,
    },
    /// Individual status with a delivery report requested:
    /// `*SET,<domain>,TXSTAT,IND,<dest>,<own>,<status>,ACK`
    SendStatus {
        dest_id: u32,
        own_id: u32,
        status: u16,
    },
}

impl Command {
    /// Render the command text for `mode`.
    ///
    /// `mode` only matters for the commands under the `DPMR`/`IDAS`
    /// domains; channel, UI, and INFO commands read the same in both
    /// sub-modes.
    pub fn encode(&self, mode: Mode) -> String {
        match self {
            Command::SelectChannel(channel) => format!("*SET,MCH,SEL,{channel}"),
            Command::GetChannel => "*GET,MCH,SEL".to_string(),
            Command::SetVolume(volume) => format!("*SET,UI,AFVOL,{volume}"),
            Command::GetVolume => "*GET,UI,AFVOL".to_string(),
            Command::SetFrequency { tx_hz, rx_hz } => format!("*SET,MCH,FREQ,{tx_hz},{rx_hz}"),
            Command::GetFrequency => "*GET,MCH,FREQ".to_string(),
            Command::GetCloneComment { line } => format!("*GET,INFO,COMMENT,{line}"),
            Command::GetEsn => "*GET,INFO,ESN".to_string(),
            Command::SetUiText(text) => format!("*SET,UI,TEXT,\"{text}\""),
            Command::Reset => "*SET,UI,RESET".to_string(),
            Command::SetRadioId(id) => {
                format!("*SET,{},OWNID,{}", mode.domain(), mode.format_id(*id))
            }
            Command::GetRadioId => format!("*GET,{},OWNID", mode.domain()),
            Command::SendMessage {
                dest_id,
                own_id,
                text,
            } => format!(
                "*SET,{},TXMSG,IND,{},{},MSG,\"{}\",ACK",
                mode.domain(),
                mode.format_id(*dest_id),
                mode.format_id(*own_id),
                text
            ),
            Command::SendStatus {
                dest_id,
                own_id,
                status,
            } => format!(
                "*SET,{},TXSTAT,IND,{},{},{},ACK",
                mode.domain(),
                mode.format_id(*dest_id),
                mode.format_id(*own_id),
                status
            ),
        }
    }

    /// The notification prefix that answers this command.
    ///
    /// The radio mirrors the command grammar under `*NTF`; waits loop
    /// until a frame carrying this prefix arrives and skip everything
    /// else. Fire-and-forget setters have an echo prefix too, the driver
    /// just never waits on it.
    pub fn reply_prefix(&self, mode: Mode) -> String {
        match self {
            Command::SelectChannel(_) | Command::GetChannel => "*NTF,MCH,SEL,".to_string(),
            Command::SetVolume(_) | Command::GetVolume => "*NTF,UI,AFVOL,".to_string(),
            Command::SetFrequency { .. } | Command::GetFrequency => "*NTF,MCH,FREQ,".to_string(),
            Command::GetCloneComment { .. } => "*NTF,INFO,COMMENT".to_string(),
            Command::GetEsn => "*NTF,INFO,ESN".to_string(),
            Command::SetUiText(_) => "*NTF,UI,TEXT".to_string(),
            Command::Reset => "*NTF,UI,RESET".to_string(),
            Command::SetRadioId(_) | Command::GetRadioId => {
                format!("*NTF,{},OWNID,", mode.domain())
            }
            Command::SendMessage { .. } => format!("*NTF,{},TXMSG,IND,", mode.domain()),
            Command::SendStatus { .. } => format!("*NTF,{},TXSTAT,IND,", mode.domain()),
        }
    }
}
