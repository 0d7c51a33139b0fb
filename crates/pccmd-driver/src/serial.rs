//! Blocking serial-port opening
//!
//! The session itself is generic over any byte stream; this is the thin
//! convenience for the common case of a real port.

use std::time::Duration;

use serialport::SerialPort;
use tracing::debug;

/// Per-read timeout on the port itself. Kept short so the session's own
/// wall-clock deadline governs how long an exchange waits, not the port.
const PORT_READ_TIMEOUT: Duration = Duration::from_millis(50);

/// Open `path` at `baud` with the 8N1 framing the radios use.
///
/// The returned port implements `Read + Write` and plugs straight into
/// [`crate::Transceiver::connect`].
pub fn open(path: &str, baud: u32) -> serialport::Result<Box<dyn SerialPort>> {
    debug!(path, baud, "opening serial port");
    serialport::new(path, baud)
        .data_bits(serialport::DataBits::Eight)
        .parity(serialport::Parity::None)
        .stop_bits(serialport::StopBits::One)
        .timeout(PORT_READ_TIMEOUT)
        .open()
}
