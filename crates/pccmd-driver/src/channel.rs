//! Channel selection state

/// Channel bookkeeping for one session.
///
/// `selected` is the channel the radio is believed to be tuned to,
/// `restore` is the channel every send-class operation puts back on exit,
/// and `message` is the channel message/status exchanges run on. Owned
/// exclusively by one session; every mutation goes through the session's
/// own operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelState {
    /// Channel the radio last confirmed
    pub selected: u16,
    /// Restore target after message/status exchanges
    pub restore: u16,
    /// Channel used while a message/status exchange is in flight
    pub message: u16,
}

impl ChannelState {
    pub fn new(restore: u16, message: u16) -> Self {
        Self {
            selected: restore,
            restore,
            message,
        }
    }

    /// Record a channel the radio confirmed
    pub fn select(&mut self, channel: u16) {
        self.selected = channel;
    }

    /// Capture `channel` as the new restore target
    pub fn capture_restore(&mut self, channel: u16) {
        self.restore = channel;
    }
}
