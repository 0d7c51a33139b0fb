//! PC-CMD Simulation Library
//!
//! Test collaborators for exercising the driver without radio hardware:
//!
//! - [`VirtualRadio`]: a stateful transceiver that consumes command
//!   frames and answers with protocol-accurate notification frames. It
//!   implements `Read`/`Write`, so a session can run against it directly.
//! - [`ScriptedPort`]: a byte stream with an ordered expectation queue,
//!   for tests that need exact control over every frame on the wire —
//!   mismatched echoes, negative acknowledgements, silence, line noise.
//!
//! # Example
//!
//! ```rust
//! use pccmd_sim::{VirtualRadio, VirtualRadioConfig};
//!
//! let mut radio = VirtualRadio::new(VirtualRadioConfig::default());
//! radio.push_notification("*NTF,MCH,SEL,5");
//! // `radio` now yields the framed notification from its `Read` side.
//! ```

pub mod port;
pub mod radio;

pub use port::ScriptedPort;
pub use radio::{VirtualRadio, VirtualRadioConfig};
