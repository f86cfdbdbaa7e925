//! Frame Synchronizer.
//!
//! Recognizes one expected supervisory frame inside an arbitrary byte stream.
//! The recognizer is a byte-driven state machine:
//!
//! ```text
//!                 FLAG            FLAG
//!               +------+        +------+
//!               v      |        v      |
//! AWAIT_START --FLAG--> GOT_FLAG --A--> GOT_ADDRESS --C--> GOT_CONTROL
//!                                                              |
//!                                                          A^C |
//!                                                              v
//!                         COMPLETE <--FLAG-- GOT_CHECKSUM <----+
//! ```
//!
//! From GOT_ADDRESS and GOT_CONTROL a FLAG restarts at GOT_FLAG. Every other
//! unexpected byte returns to AWAIT_START, which lets the receiver recover
//! from line noise and truncated frames without help from the sender.

use tracing::trace;

use crate::core::{FLAG, LinkResult, Transport};

use super::catalog::SupervisoryFrame;

/// Position of the synchronizer inside the expected frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Waiting for an opening FLAG.
    AwaitStart,
    /// Saw one or more FLAG bytes.
    GotFlag,
    /// Saw the expected address.
    GotAddress,
    /// Saw the expected control field.
    GotControl,
    /// Saw a valid BCC.
    GotChecksum,
    /// Saw the closing FLAG; the frame matched.
    Complete,
}

/// Byte-driven recognizer for one expected supervisory frame.
#[derive(Debug, Clone)]
pub struct FrameSynchronizer {
    expected: SupervisoryFrame,
    state: SyncState,
    /// Bytes fed since creation.
    bytes_read: u64,
    /// Times a partially matched frame was abandoned.
    resyncs: u64,
}

impl FrameSynchronizer {
    /// Create a synchronizer expecting `expected`.
    pub fn new(expected: SupervisoryFrame) -> Self {
        Self {
            expected,
            state: SyncState::AwaitStart,
            bytes_read: 0,
            resyncs: 0,
        }
    }

    /// The frame header this synchronizer is waiting for.
    pub fn expected(&self) -> SupervisoryFrame {
        self.expected
    }

    /// Current state.
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Check if the expected frame has been recognized.
    pub fn is_complete(&self) -> bool {
        self.state == SyncState::Complete
    }

    /// Total bytes fed through [`step`](Self::step).
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Number of partially matched frames that were abandoned.
    pub fn resyncs(&self) -> u64 {
        self.resyncs
    }

    /// Discard any partial match and wait for a new opening FLAG.
    ///
    /// A discarded partial match counts as a resync.
    pub fn reset(&mut self) {
        if !matches!(self.state, SyncState::AwaitStart | SyncState::Complete) {
            self.resyncs += 1;
        }
        self.state = SyncState::AwaitStart;
    }

    /// Feed one byte and return the new state.
    ///
    /// Feeding a byte after [`SyncState::Complete`] starts looking for the
    /// next frame.
    pub fn step(&mut self, byte: u8) -> SyncState {
        self.bytes_read += 1;
        let SupervisoryFrame { address, control } = self.expected;

        let next = match self.state {
            SyncState::AwaitStart | SyncState::Complete => {
                if byte == FLAG {
                    SyncState::GotFlag
                } else {
                    SyncState::AwaitStart
                }
            }
            // Repeated flags are absorbed.
            SyncState::GotFlag if byte == FLAG => SyncState::GotFlag,
            SyncState::GotFlag if byte == address => SyncState::GotAddress,
            SyncState::GotAddress if byte == control => SyncState::GotControl,
            SyncState::GotControl if byte == self.expected.bcc() => SyncState::GotChecksum,
            SyncState::GotAddress | SyncState::GotControl if byte == FLAG => SyncState::GotFlag,
            SyncState::GotChecksum if byte == FLAG => SyncState::Complete,
            SyncState::GotFlag
            | SyncState::GotAddress
            | SyncState::GotControl
            | SyncState::GotChecksum => {
                trace!(byte = format_args!("{byte:#04x}"), from = ?self.state, "resync");
                self.resyncs += 1;
                SyncState::AwaitStart
            }
        };

        self.state = next;
        next
    }

    /// Read bytes from `transport` until the expected frame has been seen.
    ///
    /// Starts from [`SyncState::AwaitStart`]. Never gives up on its own: the
    /// only exits are a complete match or a transport error.
    pub async fn receive<T: Transport>(&mut self, transport: &mut T) -> LinkResult<()> {
        self.reset();
        loop {
            let byte = transport.read_byte().await?;
            trace!(byte = format_args!("{byte:#04x}"), "read byte");
            if self.step(byte) == SyncState::Complete {
                return Ok(());
            }
        }
    }
}
