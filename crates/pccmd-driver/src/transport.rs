//! Byte-stream abstraction over the serial link

use std::io::{Read, Write};

/// The injected byte-stream collaborator.
///
/// A short or empty read means "nothing available yet", never an error;
/// the frame reader keeps its own wall-clock deadline on top. Anything
/// `Read + Write` qualifies, which covers `serialport` ports, TCP
/// bridges, and the simulator.
pub trait ByteStream: Read + Write {}

impl<T: Read + Write + ?Sized> ByteStream for T {}
