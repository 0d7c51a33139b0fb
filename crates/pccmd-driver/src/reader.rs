//! Buffered frame extraction with a wall-clock deadline

use std::io::{ErrorKind, Read};
use std::time::{Duration, Instant};

use tracing::warn;

use pccmd_protocol::frame::{self, ETX};

use crate::error::LinkError;

/// How many bytes to request from the stream per read
const READ_CHUNK: usize = 64;

/// Upper bound on buffered bytes while hunting for a terminator.
/// Frames are tens of bytes; anything near this is line noise.
const MAX_BUF: usize = 4096;

/// Pulls delimiter-bounded frames off a byte stream.
///
/// Reads are chunked to keep syscall overhead sane, but the timeout is
/// measured across the whole frame: elapsed wall-clock time is checked
/// against the deadline before every underlying read, so an overrun is
/// bounded by one read's blocking latency. Bytes received past a
/// terminator stay buffered for the next frame.
pub struct FrameReader<S> {
    stream: S,
    buf: Vec<u8>,
}

impl<S> FrameReader<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buf: Vec::with_capacity(READ_CHUNK),
        }
    }

    /// Mutable access to the underlying stream, for writes
    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Consume the reader, returning the stream
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read> FrameReader<S> {
    /// Read one frame, waiting at most `timeout` for its terminator.
    ///
    /// Returns the decoded command text. [`LinkError::Timeout`] if no
    /// terminator arrives before the deadline, [`LinkError::Decode`] if
    /// the payload between the delimiters is not valid UTF-8. A timed-out
    /// or empty read from the stream itself means "nothing yet" and the
    /// wait continues.
    pub fn read_frame(&mut self, timeout: Duration) -> Result<String, LinkError> {
        let start = Instant::now();
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == ETX) {
                let raw: Vec<u8> = self.buf.drain(..=pos).collect();
                return Ok(frame::decode(&raw)?);
            }
            if self.buf.len() > MAX_BUF {
                warn!(len = self.buf.len(), "no terminator in oversized buffer, resetting");
                self.buf.clear();
            }
            if start.elapsed() >= timeout {
                return Err(LinkError::Timeout(timeout));
            }
            let mut chunk = [0u8; READ_CHUNK];
            match self.stream.read(&mut chunk) {
                Ok(0) => {}
                Ok(n) => self.buf.extend_from_slice(&chunk[..n]),
                Err(e)
                    if matches!(
                        e.kind(),
                        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                    ) => {}
                Err(e) => return Err(LinkError::Io(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Byte stream returning one pre-loaded chunk per read call.
    struct ChunkedStream {
        chunks: std::collections::VecDeque<Vec<u8>>,
    }

    impl ChunkedStream {
        fn new(chunks: &[&[u8]]) -> Self {
            Self {
                chunks: chunks.iter().map(|c| c.to_vec()).collect(),
            }
        }
    }

    impl Read for ChunkedStream {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.chunks.pop_front() {
                Some(chunk) => {
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
                None => Ok(0),
            }
        }
    }

    #[test]
    fn reads_a_whole_frame() {
        let mut reader = FrameReader::new(ChunkedStream::new(&[&b"\x02*NTF,MCH,SEL,5\x03"[..]]));
        let frame = reader.read_frame(Duration::from_millis(100)).unwrap();
        assert_eq!(frame, "*NTF,MCH,SEL,5");
    }

    #[test]
    fn reassembles_a_frame_split_across_reads() {
        let mut reader =
            FrameReader::new(ChunkedStream::new(&[&b"\x02*NTF,UI,"[..], &b"AFVOL,128\x03"[..]]));
        let frame = reader.read_frame(Duration::from_millis(100)).unwrap();
        assert_eq!(frame, "*NTF,UI,AFVOL,128");
    }

    #[test]
    fn keeps_bytes_past_the_terminator_for_the_next_frame() {
        let mut reader = FrameReader::new(ChunkedStream::new(&[&b"\x02*NTF,MCH,SEL,1\x03\x02*NTF,MCH,SEL,2\x03"[..]]));
        let timeout = Duration::from_millis(100);
        assert_eq!(reader.read_frame(timeout).unwrap(), "*NTF,MCH,SEL,1");
        assert_eq!(reader.read_frame(timeout).unwrap(), "*NTF,MCH,SEL,2");
    }

    #[test]
    fn times_out_when_no_terminator_arrives() {
        let timeout = Duration::from_millis(50);
        let mut reader = FrameReader::new(ChunkedStream::new(&[&b"\x02*NTF,partial"[..]]));

        let start = Instant::now();
        let result = reader.read_frame(timeout);
        let elapsed = start.elapsed();

        assert!(matches!(result, Err(LinkError::Timeout(_))));
        // Deadline honoured: not early, and not much past one read's latency.
        assert!(elapsed >= timeout);
        assert!(elapsed < timeout + Duration::from_millis(50));
    }

    #[test]
    fn invalid_utf8_is_a_decode_error() {
        let mut reader = FrameReader::new(ChunkedStream::new(&[&[0x02, 0xFF, 0xFE, 0x03][..]]));
        let result = reader.read_frame(Duration::from_millis(100));
        assert!(matches!(result, Err(LinkError::Decode(_))));
    }
}
