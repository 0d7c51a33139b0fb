//! Scripted byte stream for deterministic driver tests

use std::collections::VecDeque;
use std::io::{self, Read, Write};

/// A pre-loaded exchange: the exact outbound frame bytes expected next,
/// and the reply bytes the port feeds back once they arrive.
#[derive(Debug, Clone)]
struct Exchange {
    request: Vec<u8>,
    reply: Vec<u8>,
}

/// Byte stream with an ordered expectation queue.
///
/// A write consumes the next expectation; a mismatch or an exhausted
/// queue is an `InvalidData` error, so an out-of-order command fails the
/// test at the point it happens. Reads hand out pending reply bytes,
/// honouring short reads; with nothing pending they report `TimedOut`,
/// the same as an idle serial port.
#[derive(Debug, Default)]
pub struct ScriptedPort {
    exchanges: VecDeque<Exchange>,
    pending: VecDeque<u8>,
    sent: Vec<Vec<u8>>,
}

impl ScriptedPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an expected outbound frame and the bytes to return for it
    pub fn expect(&mut self, request: &[u8], reply: &[u8]) {
        self.exchanges.push_back(Exchange {
            request: request.to_vec(),
            reply: reply.to_vec(),
        });
    }

    /// Queue inbound bytes with no matching request (unsolicited traffic)
    pub fn push_inbound(&mut self, bytes: &[u8]) {
        self.pending.extend(bytes.iter().copied());
    }

    /// Every write issued so far, one entry per call
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    /// Expectations not yet consumed
    pub fn remaining_expectations(&self) -> usize {
        self.exchanges.len()
    }
}

impl Write for ScriptedPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sent.push(buf.to_vec());
        let Some(exchange) = self.exchanges.pop_front() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "no scripted exchange left",
            ));
        };
        if buf != exchange.request.as_slice() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "unexpected write: expected {:02X?}, got {:02X?}",
                    exchange.request, buf
                ),
            ));
        }
        self.pending.extend(exchange.reply.iter().copied());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for ScriptedPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "no scripted data pending",
            ));
        }
        let n = buf.len().min(self.pending.len());
        for slot in buf.iter_mut().take(n) {
            // Length was checked above; the queue cannot run dry mid-loop.
            *slot = self.pending.pop_front().unwrap_or_default();
        }
        Ok(n)
    }
}
