//! Per-connection counters.

use std::fmt;

/// Counters accumulated over the life of a [`Link`](super::Link).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Supervisory frames written, retransmissions included.
    pub frames_sent: u64,
    /// Frames written again after a timeout.
    pub retransmissions: u64,
    /// Timeout windows that ended without an acknowledgment.
    pub timeouts: u64,
    /// Expected frames recognized.
    pub frames_received: u64,
    /// Bytes read from the device.
    pub bytes_read: u64,
    /// Partially matched frames that were abandoned.
    pub resyncs: u64,
}

impl LinkStats {
    /// Fold the counters of one synchronizer run into the totals.
    pub(crate) fn absorb_sync(&mut self, bytes_read: u64, resyncs: u64, matched: bool) {
        self.bytes_read += bytes_read;
        self.resyncs += resyncs;
        if matched {
            self.frames_received += 1;
        }
    }
}

impl fmt::Display for LinkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sent={} retransmitted={} timeouts={} received={} bytes_read={} resyncs={}",
            self.frames_sent,
            self.retransmissions,
            self.timeouts,
            self.frames_received,
            self.bytes_read,
            self.resyncs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorb_sync() {
        let mut stats = LinkStats::default();
        stats.absorb_sync(12, 1, true);
        stats.absorb_sync(3, 0, false);

        assert_eq!(stats.bytes_read, 15);
        assert_eq!(stats.resyncs, 1);
        assert_eq!(stats.frames_received, 1);
    }

    #[test]
    fn test_display() {
        let stats = LinkStats {
            frames_sent: 3,
            retransmissions: 1,
            timeouts: 1,
            frames_received: 2,
            bytes_read: 10,
            resyncs: 0,
        };
        assert_eq!(
            stats.to_string(),
            "sent=3 retransmitted=1 timeouts=1 received=2 bytes_read=10 resyncs=0"
        );
    }
}
