//! Retransmission Engine: stop-and-wait ARQ around one supervisory frame.
//!
//! The frame is written immediately, then every read is bounded by the
//! current timeout window. When a window ends without the expected reply the
//! frame is written again and a fresh window starts, until the retry budget
//! runs out. A reply split across a window boundary is abandoned.

use std::io;

use tokio::time::timeout_at;
use tracing::{debug, trace, warn};

use crate::core::{LinkError, LinkResult, SUPERVISORY_FRAME_LEN, Transport};
use crate::frame::{FrameKind, FrameSynchronizer, SupervisoryFrame, SyncState};

use super::config::LinkConfig;
use super::stats::LinkStats;
use super::timer::RetransmitTimer;

/// Progress of the current `send_with_retry` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryState {
    /// Times the frame has been written.
    pub attempts: u32,
    /// Timeout windows that ended without a reply.
    pub expirations: u32,
}

/// Write one catalog frame, failing on a short write.
pub(crate) async fn write_frame<T: Transport>(
    transport: &mut T,
    kind: FrameKind,
    stats: &mut LinkStats,
) -> LinkResult<()> {
    let written = transport.write_bytes(kind.bytes()).await?;
    if written != SUPERVISORY_FRAME_LEN {
        return Err(io::Error::new(
            io::ErrorKind::WriteZero,
            format!("short write of {kind}: {written}/{SUPERVISORY_FRAME_LEN} bytes"),
        )
        .into());
    }
    stats.frames_sent += 1;
    debug!(frame = %kind, "wrote frame");
    Ok(())
}

/// Sends a frame and waits for its acknowledgment, retransmitting on timeout.
///
/// One engine belongs to one connection; calls never overlap.
#[derive(Debug, Clone)]
pub struct Retransmitter {
    timer: RetransmitTimer,
    max_retransmissions: u32,
    retry: RetryState,
}

impl Retransmitter {
    /// Create an engine using the timeout and retry budget from `config`.
    pub fn new(config: &LinkConfig) -> Self {
        Self {
            timer: RetransmitTimer::new(config.timeout),
            max_retransmissions: config.max_retransmissions,
            retry: RetryState::default(),
        }
    }

    /// State of the most recent call.
    pub fn retry_state(&self) -> RetryState {
        self.retry
    }

    /// Check if the timer is running. Always false between calls.
    pub fn is_timer_armed(&self) -> bool {
        self.timer.is_armed()
    }

    /// Write `frame` and wait for `expected`, retransmitting on timeout.
    ///
    /// # Errors
    ///
    /// - [`LinkError::RetryExhausted`] when `max_retransmissions + 1` windows
    ///   end without the expected frame.
    /// - [`LinkError::Transport`] as soon as a read or write fails.
    pub async fn send_with_retry<T: Transport>(
        &mut self,
        transport: &mut T,
        frame: FrameKind,
        expected: SupervisoryFrame,
        stats: &mut LinkStats,
    ) -> LinkResult<()> {
        self.retry = RetryState::default();
        let mut sync = FrameSynchronizer::new(expected);

        let result = self.run(transport, frame, &mut sync, stats).await;

        self.timer.disarm();
        stats.absorb_sync(sync.bytes_read(), sync.resyncs(), result.is_ok());
        result
    }

    async fn run<T: Transport>(
        &mut self,
        transport: &mut T,
        frame: FrameKind,
        sync: &mut FrameSynchronizer,
        stats: &mut LinkStats,
    ) -> LinkResult<()> {
        write_frame(transport, frame, stats).await?;
        self.retry.attempts = 1;
        let mut deadline = self.timer.arm();

        loop {
            match timeout_at(deadline, transport.read_byte()).await {
                Ok(read) => {
                    let byte = read?;
                    trace!(byte = format_args!("{byte:#04x}"), "read byte");
                    if sync.step(byte) == SyncState::Complete {
                        debug!(
                            frame = %frame,
                            attempts = self.retry.attempts,
                            "acknowledged"
                        );
                        return Ok(());
                    }
                }
                Err(_elapsed) => {
                    self.retry.expirations += 1;
                    stats.timeouts += 1;
                    sync.reset();

                    if self.retry.expirations > self.max_retransmissions {
                        warn!(
                            frame = %frame,
                            attempts = self.retry.attempts,
                            "no acknowledgment, giving up"
                        );
                        return Err(LinkError::RetryExhausted {
                            attempts: self.retry.attempts,
                        });
                    }

                    warn!(
                        frame = %frame,
                        expirations = self.retry.expirations,
                        "timeout, retransmitting"
                    );
                    write_frame(transport, frame, stats).await?;
                    stats.retransmissions += 1;
                    self.retry.attempts += 1;
                    deadline = self.timer.arm();
                }
            }
        }
    }
}
