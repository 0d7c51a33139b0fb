//! The transceiver session
//!
//! One [`Transceiver`] owns one byte stream and runs strictly half-duplex
//! command/notification exchanges over it: send a frame, then read frames
//! until one answers, skipping valid-but-unrelated traffic. Message and
//! status sends run on a dedicated message channel and always put the
//! radio back on the restore channel before returning, whatever the
//! outcome.

use std::io::{Read, Write};
use std::time::Duration;

use tracing::{debug, trace, warn};

use pccmd_protocol::{frame, notification, Command, Mode, Notification, NTF_MARKER};

use crate::channel::ChannelState;
use crate::error::LinkError;
use crate::reader::FrameReader;

/// Result of a channel-select exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The echoed channel matches the requested one
    Confirmed,
    /// The radio echoed a different channel
    Refused,
}

/// Terminal outcome of a message or status send.
///
/// Negative acknowledgements are outcomes, not errors: the exchange
/// itself completed and the channel has been restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The destination acknowledged delivery (`ACK,OK`)
    Delivered,
    /// The destination negatively acknowledged (`ACK,NG`)
    Rejected,
    /// The radio refused the status exchange (`NG` without an ACK echo)
    StatusRejected,
    /// The echo matched the exchange but carried no known suffix
    UnknownReply,
}

/// Construction parameters for a [`Transceiver`] session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// This station's ID
    pub own_id: u32,
    /// Digital sub-mode; selects the command domain and ID padding
    pub mode: Mode,
    /// Channel used while a message/status exchange is in flight.
    /// `None` seeds it from the radio's current channel at connect.
    pub message_channel: Option<u16>,
    /// Channel restored after every send. `None` seeds it from the radio.
    pub default_channel: Option<u16>,
    /// Deadline for single-round-trip exchanges
    pub timeout: Duration,
}

impl SessionConfig {
    pub fn new(own_id: u32, mode: Mode) -> Self {
        Self {
            own_id,
            mode,
            message_channel: None,
            default_channel: None,
            timeout: Duration::from_secs(2),
        }
    }
}

/// A session with one transceiver over an injected byte stream.
///
/// Fully synchronous: every operation blocks until a matching frame, a
/// frame-level error, or the deadline. Not thread-safe by design — one
/// command may be outstanding at a time, so sharing a session across
/// threads requires external mutual exclusion.
pub struct Transceiver<S> {
    io: FrameReader<S>,
    mode: Mode,
    own_id: u32,
    timeout: Duration,
    channels: ChannelState,
}

impl<S: Read + Write> Transceiver<S> {
    /// Open a session over `stream`.
    ///
    /// When the config leaves the message or default channel unset, the
    /// radio's current channel is queried to seed it; the session then
    /// selects the resolved default channel. Construction therefore does
    /// blocking I/O and can time out like any other exchange.
    pub fn connect(stream: S, config: SessionConfig) -> Result<Self, LinkError> {
        let mut session = Self {
            io: FrameReader::new(stream),
            mode: config.mode,
            own_id: config.own_id,
            timeout: config.timeout,
            channels: ChannelState::new(0, 0),
        };

        let message = match config.message_channel {
            Some(channel) => channel,
            None => session.get_channel()?,
        };
        let default = match config.default_channel {
            Some(channel) => channel,
            None => session.get_channel()?,
        };
        session.channels = ChannelState::new(default, message);

        if session.select_channel(default, false)? == SwitchOutcome::Refused {
            warn!(channel = default, "radio refused the initial channel select");
        }
        Ok(session)
    }

    /// The sub-mode this session talks
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// This station's ID
    pub fn own_id(&self) -> u32 {
        self.own_id
    }

    /// Current channel bookkeeping
    pub fn channels(&self) -> ChannelState {
        self.channels
    }

    /// Mutable access to the underlying byte stream
    pub fn stream_mut(&mut self) -> &mut S {
        self.io.stream_mut()
    }

    /// Consume the session, returning the byte stream
    pub fn into_inner(self) -> S {
        self.io.into_inner()
    }

    // -----------------------------------------------------------------
    // Single-round-trip operations
    // -----------------------------------------------------------------

    /// Query the currently selected memory channel
    pub fn get_channel(&mut self) -> Result<u16, LinkError> {
        let reply = self.query(Command::GetChannel)?;
        let channel = parse_field(last_field(&reply), &reply)?;
        self.channels.select(channel);
        Ok(channel)
    }

    /// Select a memory channel and wait for the radio's echo.
    ///
    /// With `reset_default`, the radio's currently effective channel is
    /// read first and captured as the new restore target before the
    /// select goes out. Single request/response, no retry: [`SwitchOutcome::Confirmed`]
    /// when the echoed channel equals the requested one, otherwise
    /// [`SwitchOutcome::Refused`].
    pub fn select_channel(
        &mut self,
        channel: u16,
        reset_default: bool,
    ) -> Result<SwitchOutcome, LinkError> {
        if reset_default {
            match self.get_channel() {
                Ok(current) => self.channels.capture_restore(current),
                // Keep the previous restore target rather than poisoning it.
                Err(e) => warn!(error = %e, "could not capture current channel as restore target"),
            }
        }

        let reply = self.query(Command::SelectChannel(channel))?;
        let echoed: u16 = parse_field(last_field(&reply), &reply)?;
        self.channels.select(echoed);
        if echoed == channel {
            Ok(SwitchOutcome::Confirmed)
        } else {
            debug!(requested = channel, echoed, "channel select echoed a different channel");
            Ok(SwitchOutcome::Refused)
        }
    }

    /// Query the speaker volume (0-255)
    pub fn get_volume(&mut self) -> Result<u8, LinkError> {
        let reply = self.query(Command::GetVolume)?;
        parse_field(last_field(&reply), &reply)
    }

    /// Set the speaker volume (0-255); no reply is awaited
    pub fn set_volume(&mut self, volume: u8) -> Result<(), LinkError> {
        self.send_command(&Command::SetVolume(volume))
    }

    /// Query the TX/RX frequency pair in Hz
    pub fn get_freq(&mut self) -> Result<(u64, u64), LinkError> {
        let reply = self.query(Command::GetFrequency)?;
        let mut fields = reply.rsplit(',');
        let rx_hz = parse_field(fields.next().unwrap_or(""), &reply)?;
        let tx_hz = parse_field(fields.next().unwrap_or(""), &reply)?;
        Ok((tx_hz, rx_hz))
    }

    /// Program the TX/RX frequency pair in Hz; no reply is awaited
    pub fn set_freq(&mut self, tx_hz: u64, rx_hz: u64) -> Result<(), LinkError> {
        self.send_command(&Command::SetFrequency { tx_hz, rx_hz })
    }

    /// Read one line (1 or 2) of the clone comment
    pub fn get_clone_comment(&mut self, line: u8) -> Result<String, LinkError> {
        let reply = self.query(Command::GetCloneComment { line })?;
        Ok(last_field(&reply).to_string())
    }

    /// Read the radio's electronic serial number
    pub fn get_esn(&mut self) -> Result<u64, LinkError> {
        let reply = self.query(Command::GetEsn)?;
        parse_field(last_field(&reply), &reply)
    }

    /// Query the bound station ID
    pub fn get_radio_id(&mut self) -> Result<u32, LinkError> {
        let reply = self.query(Command::GetRadioId)?;
        parse_field(last_field(&reply), &reply)
    }

    /// Bind the radio's own station ID; no reply is awaited
    pub fn set_radio_id(&mut self, id: u32) -> Result<(), LinkError> {
        self.send_command(&Command::SetRadioId(id))
    }

    /// Write text to the front-panel display; empty text clears it
    pub fn set_ui_text(&mut self, text: &str) -> Result<(), LinkError> {
        self.send_command(&Command::SetUiText(text.to_string()))
    }

    /// Soft-reset the user interface
    pub fn reset(&mut self) -> Result<(), LinkError> {
        self.send_command(&Command::Reset)
    }

    // -----------------------------------------------------------------
    // Message / status exchanges
    // -----------------------------------------------------------------

    /// Send an individual text message and wait for the delivery report.
    ///
    /// The exchange runs on the message channel; whatever channel was
    /// effective beforehand becomes the restore target and is re-selected
    /// on every exit path — acknowledge, reject, unknown reply, or error.
    pub fn send_message(
        &mut self,
        text: &str,
        other_id: u32,
        timeout: Duration,
    ) -> Result<SendOutcome, LinkError> {
        let command = Command::SendMessage {
            dest_id: other_id,
            own_id: self.own_id,
            text: text.to_string(),
        };
        let text = text.to_string();
        self.send_with_ack(command, timeout, move |reply| {
            classify_message_echo(reply, &text)
        })
    }

    /// Send an individual status value and wait for the delivery report.
    ///
    /// Channel handling is identical to [`Transceiver::send_message`].
    pub fn send_status(
        &mut self,
        status: u16,
        other_id: u32,
        timeout: Duration,
    ) -> Result<SendOutcome, LinkError> {
        let command = Command::SendStatus {
            dest_id: other_id,
            own_id: self.own_id,
            status,
        };
        self.send_with_ack(command, timeout, move |reply| {
            classify_status_echo(reply, status)
        })
    }

    /// Wait for one inbound notification and parse it.
    ///
    /// Frames that are not notifications are discarded and the wait
    /// continues; each read gets the full `timeout`. Frame-level errors
    /// (timeout, decode failure) abort immediately and surface as `Err`.
    pub fn receive_message(&mut self, timeout: Duration) -> Result<Notification, LinkError> {
        loop {
            let reply = self.io.read_frame(timeout)?;
            trace!(frame = %reply, "<- radio");
            if !reply.starts_with(NTF_MARKER) {
                debug!(frame = %reply, "skipping non-notification frame");
                continue;
            }
            return Ok(notification::parse(&reply));
        }
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    /// Frame and write one command
    fn send_command(&mut self, command: &Command) -> Result<(), LinkError> {
        let text = command.encode(self.mode);
        debug!(command = %text, "-> radio");
        self.io.stream_mut().write_all(&frame::encode(&text))?;
        Ok(())
    }

    /// Single round trip: send, then wait for the command's reply prefix
    fn query(&mut self, command: Command) -> Result<String, LinkError> {
        let prefix = command.reply_prefix(self.mode);
        self.send_command(&command)?;
        self.wait_for(&prefix, self.timeout)
    }

    /// Read frames until one carries `prefix`, discarding the rest.
    /// Every read gets the full `timeout`, as the protocol prescribes.
    fn wait_for(&mut self, prefix: &str, timeout: Duration) -> Result<String, LinkError> {
        loop {
            let reply = self.io.read_frame(timeout)?;
            trace!(frame = %reply, "<- radio");
            if reply.contains(prefix) {
                return Ok(reply);
            }
            debug!(frame = %reply, expected = prefix, "skipping unrelated frame");
        }
    }

    /// Shared body of the message/status exchanges: switch to the message
    /// channel, fire the command, wait for its echo, classify, and
    /// restore the channel on every exit path.
    fn send_with_ack(
        &mut self,
        command: Command,
        timeout: Duration,
        classify: impl Fn(&str) -> SendOutcome,
    ) -> Result<SendOutcome, LinkError> {
        let message_channel = self.channels.message;
        // A failed switch does not abort the send: the frame still goes
        // out and the device's own ACK or the timeout decides.
        match self.select_channel(message_channel, true) {
            Ok(SwitchOutcome::Confirmed) => {}
            Ok(SwitchOutcome::Refused) => {
                warn!(channel = message_channel, "radio refused the message-channel select")
            }
            Err(e) => {
                warn!(channel = message_channel, error = %e, "message-channel select failed, sending anyway")
            }
        }

        let prefix = command.reply_prefix(self.mode);
        if let Err(e) = self.send_command(&command) {
            self.restore_default();
            return Err(e);
        }

        let outcome = loop {
            let reply = match self.io.read_frame(timeout) {
                Ok(reply) => reply,
                Err(e) => {
                    self.restore_default();
                    return Err(e);
                }
            };
            trace!(frame = %reply, "<- radio");
            if !reply.contains(&prefix) {
                debug!(frame = %reply, "skipping frame unrelated to the exchange");
                continue;
            }
            break classify(&reply);
        };

        self.restore_default();
        Ok(outcome)
    }

    /// Put the radio back on the restore channel.
    ///
    /// Runs on every exit path of a send exchange; its own failure is
    /// logged and swallowed so the primary outcome survives.
    fn restore_default(&mut self) {
        let target = self.channels.restore;
        match self.select_channel(target, false) {
            Ok(SwitchOutcome::Confirmed) => {}
            Ok(SwitchOutcome::Refused) => {
                warn!(channel = target, "radio refused the default-channel restore")
            }
            Err(e) => warn!(channel = target, error = %e, "default-channel restore failed"),
        }
    }
}

/// Last comma-separated field of a reply
fn last_field(reply: &str) -> &str {
    reply.rsplit(',').next().unwrap_or(reply)
}

/// Parse one reply field, keeping the whole reply in the error
fn parse_field<T: std::str::FromStr>(field: &str, reply: &str) -> Result<T, LinkError> {
    field
        .trim()
        .parse()
        .map_err(|_| LinkError::MalformedReply(reply.to_string()))
}

/// Classify a prefix-matched `TXMSG` echo against the sent text
fn classify_message_echo(reply: &str, text: &str) -> SendOutcome {
    if reply.contains(&format!("\"{text}\",ACK,OK")) {
        SendOutcome::Delivered
    } else if reply.contains(&format!("\"{text}\",ACK,NG")) {
        SendOutcome::Rejected
    } else {
        SendOutcome::UnknownReply
    }
}

/// Classify a prefix-matched `TXSTAT` echo against the sent status
fn classify_status_echo(reply: &str, status: u16) -> SendOutcome {
    if reply.contains(&format!("{status},ACK,OK")) {
        SendOutcome::Delivered
    } else if reply.contains(&format!("{status},ACK,NG")) {
        SendOutcome::Rejected
    } else if reply.contains("NG") {
        SendOutcome::StatusRejected
    } else {
        SendOutcome::UnknownReply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_echo_classification() {
        let ok = "*NTF,DPMR,TXMSG,IND,0004324,0006210,MSG,\"Hello\",ACK,OK";
        let ng = "*NTF,DPMR,TXMSG,IND,0004324,0006210,MSG,\"Hello\",ACK,NG";
        let odd = "*NTF,DPMR,TXMSG,IND,0004324,0006210,MSG,\"Hello\",ACK,??";
        assert_eq!(classify_message_echo(ok, "Hello"), SendOutcome::Delivered);
        assert_eq!(classify_message_echo(ng, "Hello"), SendOutcome::Rejected);
        assert_eq!(classify_message_echo(odd, "Hello"), SendOutcome::UnknownReply);
    }

    #[test]
    fn message_echo_for_a_different_text_is_unknown() {
        let reply = "*NTF,DPMR,TXMSG,IND,0004324,0006210,MSG,\"other\",ACK,OK";
        assert_eq!(
            classify_message_echo(reply, "Hello"),
            SendOutcome::UnknownReply
        );
    }

    #[test]
    fn status_echo_classification() {
        let ok = "*NTF,IDAS,TXSTAT,IND,4324,6210,7,ACK,OK";
        let ng = "*NTF,IDAS,TXSTAT,IND,4324,6210,7,ACK,NG";
        let refused = "*NTF,IDAS,TXSTAT,IND,4324,6210,NG";
        assert_eq!(classify_status_echo(ok, 7), SendOutcome::Delivered);
        assert_eq!(classify_status_echo(ng, 7), SendOutcome::Rejected);
        assert_eq!(classify_status_echo(refused, 7), SendOutcome::StatusRejected);
    }

    #[test]
    fn last_field_of_a_reply() {
        assert_eq!(last_field("*NTF,MCH,SEL,5"), "5");
        assert_eq!(last_field("bare"), "bare");
    }
}
