//! Virtual transceiver simulation
//!
//! Provides a simulated radio that consumes PC-CMD command frames and
//! answers with protocol-accurate notification frames. It implements
//! `Read`/`Write`, so it can stand in for the serial port under a real
//! session.

use std::collections::VecDeque;
use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};
use tracing::debug;

use pccmd_protocol::{frame, Mode};

/// Configuration for creating a virtual radio
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualRadioConfig {
    /// Digital sub-mode the radio answers in
    pub mode: Mode,
    /// Initially selected memory channel
    pub channel: u16,
    /// Initial speaker volume
    pub volume: u8,
    /// Initial TX frequency in Hz
    pub tx_hz: u64,
    /// Initial RX frequency in Hz
    pub rx_hz: u64,
    /// Electronic serial number
    pub esn: u64,
    /// The two clone comment lines
    pub comment: [String; 2],
}

impl Default for VirtualRadioConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Idas,
            channel: 1,
            volume: 128,
            tx_hz: 145_500_000,
            rx_hz: 145_000_000,
            esn: 1_234_567,
            comment: ["IC-F3400D".to_string(), "DEMO FLEET".to_string()],
        }
    }
}

/// A simulated transceiver that answers PC-CMD traffic.
///
/// Command frames written to it are handled as soon as their terminator
/// arrives; notification frames queue on the read side. Setters are
/// echoed with an `*NTF` frame the way the hardware does, which gives
/// driver tests realistic unrelated traffic to skip.
#[derive(Debug)]
pub struct VirtualRadio {
    mode: Mode,
    channel: u16,
    volume: u8,
    tx_hz: u64,
    rx_hz: u64,
    esn: u64,
    comment: [String; 2],
    own_id: Option<String>,
    ui_text: String,
    /// When set, TXMSG/TXSTAT exchanges answer `ACK,NG`
    reject_sends: bool,
    /// Notification bytes the driver has not read yet
    outbound: VecDeque<u8>,
    /// Partial inbound frame bytes
    inbound: Vec<u8>,
}

impl VirtualRadio {
    /// Create a virtual radio from configuration
    pub fn new(config: VirtualRadioConfig) -> Self {
        Self {
            mode: config.mode,
            channel: config.channel,
            volume: config.volume,
            tx_hz: config.tx_hz,
            rx_hz: config.rx_hz,
            esn: config.esn,
            comment: config.comment,
            own_id: None,
            ui_text: String::new(),
            reject_sends: false,
            outbound: VecDeque::new(),
            inbound: Vec::new(),
        }
    }

    /// Currently selected channel
    pub fn channel(&self) -> u16 {
        self.channel
    }

    /// Current speaker volume
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Current TX/RX frequency pair in Hz
    pub fn freq(&self) -> (u64, u64) {
        (self.tx_hz, self.rx_hz)
    }

    /// Text currently on the front-panel display
    pub fn ui_text(&self) -> &str {
        &self.ui_text
    }

    /// Station ID bound via `OWNID`, as received on the wire
    pub fn own_id(&self) -> Option<&str> {
        self.own_id.as_deref()
    }

    /// Make TXMSG/TXSTAT exchanges answer `ACK,NG`
    pub fn set_reject_sends(&mut self, reject: bool) {
        self.reject_sends = reject;
    }

    /// Queue an arbitrary notification payload on the read side
    pub fn push_notification(&mut self, payload: &str) {
        self.outbound.extend(frame::encode(payload));
    }

    /// Queue raw bytes on the read side (noise, partial frames)
    pub fn push_raw(&mut self, bytes: &[u8]) {
        self.outbound.extend(bytes.iter().copied());
    }

    /// Handle one decoded command
    fn handle_command(&mut self, command: &str) {
        debug!(command, "virtual radio received");
        let fields: Vec<&str> = command.split(',').collect();
        match fields.as_slice() {
            ["*GET", "MCH", "SEL"] => {
                self.push_notification(&format!("*NTF,MCH,SEL,{}", self.channel));
            }
            ["*SET", "MCH", "SEL", channel] => {
                if let Ok(channel) = channel.parse() {
                    self.channel = channel;
                }
                self.push_notification(&format!("*NTF,MCH,SEL,{}", self.channel));
            }
            ["*GET", "UI", "AFVOL"] => {
                self.push_notification(&format!("*NTF,UI,AFVOL,{}", self.volume));
            }
            ["*SET", "UI", "AFVOL", volume] => {
                if let Ok(volume) = volume.parse() {
                    self.volume = volume;
                }
                self.push_notification(&format!("*NTF,UI,AFVOL,{}", self.volume));
            }
            ["*GET", "MCH", "FREQ"] => {
                self.push_notification(&format!("*NTF,MCH,FREQ,{},{}", self.tx_hz, self.rx_hz));
            }
            ["*SET", "MCH", "FREQ", tx, rx] => {
                if let (Ok(tx), Ok(rx)) = (tx.parse(), rx.parse()) {
                    self.tx_hz = tx;
                    self.rx_hz = rx;
                }
                self.push_notification(&format!("*NTF,MCH,FREQ,{},{}", self.tx_hz, self.rx_hz));
            }
            ["*GET", "INFO", "COMMENT", line] => {
                let text = match *line {
                    "1" => self.comment[0].as_str(),
                    "2" => self.comment[1].as_str(),
                    _ => "",
                };
                self.push_notification(&format!("*NTF,INFO,COMMENT,{line},{text}"));
            }
            ["*GET", "INFO", "ESN"] => {
                self.push_notification(&format!("*NTF,INFO,ESN,{}", self.esn));
            }
            ["*SET", "UI", "TEXT", ..] => {
                self.ui_text = quoted_text(command).unwrap_or_default().to_string();
            }
            ["*SET", "UI", "RESET"] => {
                self.ui_text.clear();
            }
            ["*SET", domain, "OWNID", id] if *domain == self.mode.domain() => {
                self.own_id = Some((*id).to_string());
                self.push_notification(&format!("*NTF,{domain},OWNID,{id}"));
            }
            ["*GET", domain, "OWNID"] if *domain == self.mode.domain() => {
                let id = self.own_id.clone().unwrap_or_else(|| "0".to_string());
                self.push_notification(&format!("*NTF,{domain},OWNID,{id}"));
            }
            ["*SET", domain, "TXMSG", "IND", dest, own, ..]
                if *domain == self.mode.domain() =>
            {
                let text = message_text(command).unwrap_or_default().to_string();
                let verdict = if self.reject_sends { "NG" } else { "OK" };
                self.push_notification(&format!(
                    "*NTF,{domain},TXMSG,IND,{dest},{own},MSG,\"{text}\",ACK,{verdict}"
                ));
            }
            ["*SET", domain, "TXSTAT", "IND", dest, own, status, ..]
                if *domain == self.mode.domain() =>
            {
                let verdict = if self.reject_sends { "NG" } else { "OK" };
                self.push_notification(&format!(
                    "*NTF,{domain},TXSTAT,IND,{dest},{own},{status},ACK,{verdict}"
                ));
            }
            _ => debug!(command, "virtual radio ignoring unknown command"),
        }
    }
}

/// Text between the first `"` and the one after it
fn quoted_text(command: &str) -> Option<&str> {
    let start = command.find('"')? + 1;
    let rest = &command[start..];
    let end = rest.find('"')?;
    Some(&rest[..end])
}

/// Quoted payload of a `TXMSG` command
fn message_text(command: &str) -> Option<&str> {
    let start = command.find(",MSG,\"")? + ",MSG,\"".len();
    let rest = &command[start..];
    let end = rest.find('"').unwrap_or(rest.len());
    Some(&rest[..end])
}

impl Write for VirtualRadio {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inbound.extend_from_slice(buf);
        while let Some(pos) = self.inbound.iter().position(|&b| b == frame::ETX) {
            let raw: Vec<u8> = self.inbound.drain(..=pos).collect();
            match frame::decode(&raw) {
                Ok(command) => self.handle_command(&command),
                Err(e) => debug!(error = %e, "virtual radio dropping undecodable frame"),
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for VirtualRadio {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.outbound.is_empty() {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "no traffic pending"));
        }
        let n = buf.len().min(self.outbound.len());
        for slot in buf.iter_mut().take(n) {
            *slot = self.outbound.pop_front().unwrap_or_default();
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(radio: &mut VirtualRadio) -> Vec<u8> {
        let mut buf = [0u8; 256];
        let mut collected = Vec::new();
        while let Ok(n) = radio.read(&mut buf) {
            collected.extend_from_slice(&buf[..n]);
        }
        collected
    }

    #[test]
    fn answers_channel_query() {
        let mut radio = VirtualRadio::new(VirtualRadioConfig {
            channel: 9,
            ..Default::default()
        });
        radio.write_all(b"\x02*GET,MCH,SEL\x03").unwrap();
        assert_eq!(drain(&mut radio), b"\x02*NTF,MCH,SEL,9\x03");
    }

    #[test]
    fn channel_select_updates_state_and_echoes() {
        let mut radio = VirtualRadio::new(VirtualRadioConfig::default());
        radio.write_all(b"\x02*SET,MCH,SEL,4\x03").unwrap();
        assert_eq!(radio.channel(), 4);
        assert_eq!(drain(&mut radio), b"\x02*NTF,MCH,SEL,4\x03");
    }

    #[test]
    fn message_exchange_echoes_ack() {
        let mut radio = VirtualRadio::new(VirtualRadioConfig::default());
        radio
            .write_all(b"\x02*SET,IDAS,TXMSG,IND,4324,6210,MSG,\"Hello, World\",ACK\x03")
            .unwrap();
        assert_eq!(
            drain(&mut radio),
            &b"\x02*NTF,IDAS,TXMSG,IND,4324,6210,MSG,\"Hello, World\",ACK,OK\x03"[..]
        );
    }

    #[test]
    fn rejected_status_echoes_ng() {
        let mut radio = VirtualRadio::new(VirtualRadioConfig::default());
        radio.set_reject_sends(true);
        radio
            .write_all(b"\x02*SET,IDAS,TXSTAT,IND,4324,6210,7,ACK\x03")
            .unwrap();
        assert_eq!(
            drain(&mut radio),
            &b"\x02*NTF,IDAS,TXSTAT,IND,4324,6210,7,ACK,NG\x03"[..]
        );
    }

    #[test]
    fn ui_text_is_stored_without_echo() {
        let mut radio = VirtualRadio::new(VirtualRadioConfig::default());
        radio.write_all(b"\x02*SET,UI,TEXT,\"ON AIR\"\x03").unwrap();
        assert_eq!(radio.ui_text(), "ON AIR");
        assert!(drain(&mut radio).is_empty());

        radio.write_all(b"\x02*SET,UI,RESET\x03").unwrap();
        assert_eq!(radio.ui_text(), "");
    }

    #[test]
    fn commands_split_across_writes_are_reassembled() {
        let mut radio = VirtualRadio::new(VirtualRadioConfig::default());
        radio.write_all(b"\x02*GET,INFO,").unwrap();
        assert!(drain(&mut radio).is_empty());
        radio.write_all(b"ESN\x03").unwrap();
        assert_eq!(drain(&mut radio), b"\x02*NTF,INFO,ESN,1234567\x03");
    }

    #[test]
    fn wrong_domain_commands_are_ignored() {
        let mut radio = VirtualRadio::new(VirtualRadioConfig::default());
        radio.write_all(b"\x02*GET,DPMR,OWNID\x03").unwrap();
        assert!(drain(&mut radio).is_empty());
    }
}
