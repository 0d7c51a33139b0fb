//! PC-CMD Session Driver
//!
//! This crate drives one Icom professional (IDAS/dPMR) transceiver over a
//! blocking byte stream using the PC-CMD V2 protocol.
//!
//! # Architecture
//!
//! - [`reader::FrameReader`] pulls delimiter-bounded frames off the
//!   stream under a wall-clock deadline checked before every read
//! - [`channel::ChannelState`] is the explicit channel bookkeeping:
//!   selected channel, restore target, and message channel
//! - [`session::Transceiver`] runs the half-duplex exchanges: getters and
//!   setters, channel selection with echo confirmation, message/status
//!   sends with unconditional channel restoration, and the notification
//!   listener
//! - [`serial`] opens a real port; any other `Read + Write` stream works
//!   the same way, which is how the test simulator plugs in
//!
//! The protocol grammar itself (framing bytes, command text, notification
//! records) lives in `pccmd-protocol`.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use pccmd_driver::{serial, SessionConfig, Transceiver};
//! use pccmd_protocol::Mode;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let port = serial::open("/dev/ttyUSB0", 19_200)?;
//! let mut radio = Transceiver::connect(port, SessionConfig::new(6210, Mode::Idas))?;
//!
//! println!("channel: {}", radio.get_channel()?);
//! println!("ESN: {}", radio.get_esn()?);
//!
//! let outcome = radio.send_message("Hello World", 4324, Duration::from_secs(10))?;
//! println!("delivery: {outcome:?}");
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod error;
pub mod reader;
pub mod serial;
pub mod session;
pub mod transport;

pub use channel::ChannelState;
pub use error::LinkError;
pub use reader::FrameReader;
pub use session::{SendOutcome, SessionConfig, SwitchOutcome, Transceiver};
pub use transport::ByteStream;
