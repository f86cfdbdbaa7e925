//! Connection Manager: open and close handshakes for one link.
//!
//! ```text
//! open                           close
//! Initiator        Responder     Initiator             Responder
//!    |--- SET ------->|             |--- DISC ------------>|
//!    |<-- UA ---------|             |<-- DISC -------------|
//!                                   |--- UA -------------->|
//! ```
//!
//! Frames on the left of each arrow are retried until acknowledged. The
//! responder's UA on open and the initiator's UA on close are written once
//! and never acknowledged.

use std::fmt;

use tracing::{info, warn};

use crate::core::{Connector, LinkError, LinkResult, Transport};
use crate::frame::{FrameKind, FrameSynchronizer};

use super::config::{LinkConfig, Role};
use super::retransmit::{Retransmitter, write_frame};
use super::stats::LinkStats;

/// Link lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkPhase {
    /// Device owned, no handshake attempted.
    Idle,
    /// Open handshake in progress.
    Establishing,
    /// Open handshake completed.
    Established,
    /// Close handshake in progress.
    Closing,
    /// Close handshake completed and device released.
    Closed,
    /// A handshake failed; the device has been released.
    Failed,
}

impl LinkPhase {
    /// Lower-case name of the phase.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Establishing => "establishing",
            Self::Established => "established",
            Self::Closing => "closing",
            Self::Closed => "closed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for LinkPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One point-to-point connection over a byte-stream device.
///
/// Owns the device from construction until [`close`](Self::close) or a
/// failed [`open`](Self::open), both of which release it.
#[derive(Debug)]
pub struct Link<T: Transport> {
    config: LinkConfig,
    transport: T,
    retransmitter: Retransmitter,
    phase: LinkPhase,
    stats: LinkStats,
}

impl<T: Transport> Link<T> {
    /// Take ownership of an already opened device without any handshake.
    pub fn new(config: LinkConfig, transport: T) -> Self {
        let retransmitter = Retransmitter::new(&config);
        Self {
            config,
            transport,
            retransmitter,
            phase: LinkPhase::Idle,
            stats: LinkStats::default(),
        }
    }

    /// Run the open handshake for the configured role over `transport`.
    ///
    /// On failure the device is closed before the error is returned.
    pub async fn open(config: LinkConfig, transport: T) -> LinkResult<Self> {
        let mut link = Self::new(config, transport);
        match link.establish().await {
            Ok(()) => Ok(link),
            Err(err) => {
                link.phase = LinkPhase::Failed;
                link.release().await;
                Err(err)
            }
        }
    }

    /// Open the configured device through `connector`, then run [`open`](Self::open).
    pub async fn connect<C>(config: LinkConfig, connector: &C) -> LinkResult<Self>
    where
        C: Connector<Transport = T>,
    {
        config.validate()?;
        let transport = connector.open(&config.device, config.baud_rate).await?;
        Self::open(config, transport).await
    }

    /// Configuration this link was built with.
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Local role.
    pub fn role(&self) -> Role {
        self.config.role
    }

    /// Current phase.
    pub fn phase(&self) -> LinkPhase {
        self.phase
    }

    /// Counters so far.
    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    /// Check if the open handshake has completed.
    pub fn is_established(&self) -> bool {
        self.phase == LinkPhase::Established
    }

    /// Run the close handshake and release the device.
    ///
    /// The device is released whether or not the handshake succeeds. Returns
    /// the final counters.
    pub async fn close(mut self) -> LinkResult<LinkStats> {
        let handshake = if self.phase == LinkPhase::Established {
            self.phase = LinkPhase::Closing;
            self.teardown().await
        } else {
            Err(LinkError::InvalidPhase {
                phase: self.phase.as_str(),
            })
        };

        match handshake {
            Ok(()) => {
                self.transport.close().await?;
                self.phase = LinkPhase::Closed;
                info!(role = %self.config.role, stats = %self.stats, "disconnected");
                Ok(self.stats)
            }
            Err(err) => {
                self.phase = LinkPhase::Failed;
                self.release().await;
                warn!(role = %self.config.role, error = %err, stats = %self.stats, "close failed");
                Err(err)
            }
        }
    }

    async fn establish(&mut self) -> LinkResult<()> {
        self.config.validate()?;
        self.phase = LinkPhase::Establishing;

        match self.config.role {
            Role::Initiator => {
                self.retransmitter
                    .send_with_retry(
                        &mut self.transport,
                        FrameKind::Set,
                        FrameKind::UaFromResponder.descriptor(),
                        &mut self.stats,
                    )
                    .await?;
            }
            Role::Responder => {
                self.expect(FrameKind::Set).await?;
                write_frame(&mut self.transport, FrameKind::UaFromResponder, &mut self.stats)
                    .await?;
            }
        }

        self.phase = LinkPhase::Established;
        info!(role = %self.config.role, device = %self.config.device, "connected");
        Ok(())
    }

    async fn teardown(&mut self) -> LinkResult<()> {
        match self.config.role {
            Role::Initiator => {
                self.retransmitter
                    .send_with_retry(
                        &mut self.transport,
                        FrameKind::DiscFromInitiator,
                        FrameKind::DiscFromResponder.descriptor(),
                        &mut self.stats,
                    )
                    .await?;
                write_frame(&mut self.transport, FrameKind::UaFromInitiator, &mut self.stats)
                    .await
            }
            Role::Responder => {
                self.expect(FrameKind::DiscFromInitiator).await?;
                self.retransmitter
                    .send_with_retry(
                        &mut self.transport,
                        FrameKind::DiscFromResponder,
                        FrameKind::UaFromInitiator.descriptor(),
                        &mut self.stats,
                    )
                    .await
            }
        }
    }

    /// Block until the peer sends `kind`.
    async fn expect(&mut self, kind: FrameKind) -> LinkResult<()> {
        let mut sync = FrameSynchronizer::new(kind.descriptor());
        let result = sync.receive(&mut self.transport).await;
        self.stats
            .absorb_sync(sync.bytes_read(), sync.resyncs(), result.is_ok());
        result
    }

    /// Close the device after a failure, keeping the original error.
    async fn release(&mut self) {
        if let Err(err) = self.transport.close().await {
            warn!(error = %err, "failed to close device");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{MemoryConnector, MemoryTransport, drop_first, prefix_noise};
    use crate::frame::SupervisoryFrame;
    use std::time::Duration;
    use tokio::time::Instant;

    const TIMEOUT: Duration = Duration::from_secs(3);

    fn config(role: Role, max_retransmissions: u32) -> LinkConfig {
        LinkConfig::builder(role)
            .device("sim0")
            .timeout(TIMEOUT)
            .max_retransmissions(max_retransmissions)
            .build()
            .unwrap()
    }

    /// Wait for `expected` on `peer` and answer with `reply`, `times` times.
    async fn answer(peer: &mut MemoryTransport, expected: FrameKind, reply: FrameKind, times: usize) {
        for _ in 0..times {
            FrameSynchronizer::new(expected.descriptor())
                .receive(peer)
                .await
                .unwrap();
            peer.write_bytes(reply.bytes()).await.unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_and_close_both_roles() {
        let (a, b) = MemoryTransport::pair();
        let (probe_a, probe_b) = (a.probe(), b.probe());

        let (initiator, responder) = tokio::join!(
            Link::open(config(Role::Initiator, 3), a),
            Link::open(config(Role::Responder, 3), b),
        );
        let (initiator, responder) = (initiator.unwrap(), responder.unwrap());
        assert!(initiator.is_established());
        assert!(responder.is_established());

        let (closed_i, closed_r) = tokio::join!(initiator.close(), responder.close());
        let (stats_i, stats_r) = (closed_i.unwrap(), closed_r.unwrap());

        // SET, DISC, UA from the initiator; UA, DISC from the responder.
        assert_eq!(stats_i.frames_sent, 3);
        assert_eq!(stats_r.frames_sent, 2);
        assert_eq!(stats_i.retransmissions, 0);
        assert_eq!(stats_i.frames_received, 2);
        assert_eq!(stats_r.frames_received, 3);
        assert!(probe_a.is_closed());
        assert!(probe_b.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_without_peer_exhausts_retries() {
        let (a, _b) = MemoryTransport::pair();
        let probe = a.probe();
        let start = Instant::now();

        let err = Link::open(config(Role::Initiator, 2), a).await.unwrap_err();

        assert!(matches!(err, LinkError::RetryExhausted { attempts: 3 }));
        assert_eq!(probe.write_count(), 3);
        assert!(probe.is_closed());
        assert!(start.elapsed() >= TIMEOUT * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retransmissions_single_attempt() {
        let (a, _b) = MemoryTransport::pair();
        let probe = a.probe();

        let err = Link::open(config(Role::Initiator, 0), a).await.unwrap_err();

        assert!(matches!(err, LinkError::RetryExhausted { attempts: 1 }));
        assert_eq!(probe.write_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_set_is_sent_immediately() {
        let (a, _b) = MemoryTransport::pair();
        let probe = a.probe();
        let start = Instant::now();

        let _ = Link::open(config(Role::Initiator, 1), a).await;

        let writes = probe.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].at, start);
        assert_eq!(writes[0].bytes, FrameKind::Set.bytes().to_vec());

        let gap = writes[1].at.duration_since(writes[0].at);
        assert!(gap >= TIMEOUT && gap < TIMEOUT + Duration::from_millis(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lost_ua_recovered_by_one_retransmission() {
        let (a, b) = MemoryTransport::pair();
        let probe = a.probe();
        let mut peer = b.with_write_filter(drop_first(1));

        let (link, ()) = tokio::join!(
            Link::open(config(Role::Initiator, 3), a),
            answer(&mut peer, FrameKind::Set, FrameKind::UaFromResponder, 2),
        );

        let link = link.unwrap();
        assert!(link.is_established());
        assert_eq!(link.stats().retransmissions, 1);
        assert_eq!(link.stats().timeouts, 1);
        assert_eq!(probe.write_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_noisy_ua_still_accepted() {
        let (a, b) = MemoryTransport::pair();
        let mut peer = b.with_write_filter(prefix_noise(vec![0x7E, 0x03, 0x55, 0x00]));

        let (link, ()) = tokio::join!(
            Link::open(config(Role::Initiator, 3), a),
            answer(&mut peer, FrameKind::Set, FrameKind::UaFromResponder, 1),
        );

        let stats = link.unwrap().stats();
        assert_eq!(stats.resyncs, 1);
        assert_eq!(stats.retransmissions, 0);
        assert_eq!(stats.bytes_read, 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_reply_is_ignored_until_timeout() {
        let (a, b) = MemoryTransport::pair();
        let mut peer = b;

        // The peer answers with its own DISC, which is not an acknowledgment.
        let (link, ()) = tokio::join!(
            Link::open(config(Role::Initiator, 1), a),
            answer(&mut peer, FrameKind::Set, FrameKind::DiscFromResponder, 2),
        );

        assert!(matches!(
            link.unwrap_err(),
            LinkError::RetryExhausted { attempts: 2 }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_peer_gone_is_transport_error() {
        let (a, b) = MemoryTransport::pair();
        let probe = a.probe();
        drop(b);

        let err = Link::open(config(Role::Initiator, 3), a).await.unwrap_err();

        assert!(err.is_transport());
        assert!(probe.is_closed());
    }

    #[tokio::test]
    async fn test_invalid_config_releases_device() {
        let (a, _b) = MemoryTransport::pair();
        let probe = a.probe();
        let bad = LinkConfig {
            timeout: Duration::ZERO,
            ..LinkConfig::default()
        };

        let err = Link::open(bad, a).await.unwrap_err();

        assert!(matches!(err, LinkError::Config(_)));
        assert!(probe.is_closed());
        assert_eq!(probe.write_count(), 0);
    }

    #[tokio::test]
    async fn test_close_before_open_is_rejected() {
        let (a, _b) = MemoryTransport::pair();
        let probe = a.probe();
        let link = Link::new(config(Role::Initiator, 3), a);
        assert_eq!(link.phase(), LinkPhase::Idle);

        let err = link.close().await.unwrap_err();

        assert!(matches!(err, LinkError::InvalidPhase { phase: "idle" }));
        assert!(probe.is_closed());
        assert_eq!(probe.write_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_without_peer_reply_still_releases() {
        let (a, b) = MemoryTransport::pair();
        let probe = a.probe();
        let mut peer = b;

        let (link, ()) = tokio::join!(
            Link::open(config(Role::Initiator, 1), a),
            answer(&mut peer, FrameKind::Set, FrameKind::UaFromResponder, 1),
        );
        let link = link.unwrap();

        let err = link.close().await.unwrap_err();

        assert!(err.is_retry_exhausted());
        assert!(probe.is_closed());
        // SET, then DISC twice.
        assert_eq!(probe.write_count(), 3);
        drop(peer);
    }

    #[tokio::test(start_paused = true)]
    async fn test_responder_close_retries_disc_until_ua() {
        let (a, b) = MemoryTransport::pair();
        let mut peer = a;
        let probe = b.probe();

        let responder = async {
            let link = Link::open(config(Role::Responder, 3), b).await.unwrap();
            link.close().await
        };
        let initiator = async {
            peer.write_bytes(FrameKind::Set.bytes()).await.unwrap();
            FrameSynchronizer::new(FrameKind::UaFromResponder.descriptor())
                .receive(&mut peer)
                .await
                .unwrap();
            peer.write_bytes(FrameKind::DiscFromInitiator.bytes()).await.unwrap();
            // Ignore the first DISC so the responder has to retransmit it.
            let disc = FrameKind::DiscFromResponder.descriptor();
            FrameSynchronizer::new(disc).receive(&mut peer).await.unwrap();
            FrameSynchronizer::new(disc).receive(&mut peer).await.unwrap();
            peer.write_bytes(FrameKind::UaFromInitiator.bytes()).await.unwrap();
        };

        let (stats, ()) = tokio::join!(responder, initiator);
        let stats = stats.unwrap();

        assert_eq!(stats.retransmissions, 1);
        assert_eq!(stats.frames_sent, 3);
        assert!(probe.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_opens_configured_device() {
        let (a, b) = MemoryTransport::pair();
        let connector = MemoryConnector::new(a);
        let mut peer = b;

        let (link, ()) = tokio::join!(
            Link::connect(config(Role::Initiator, 3), &connector),
            answer(&mut peer, FrameKind::Set, FrameKind::UaFromResponder, 1),
        );

        assert!(link.unwrap().is_established());
        assert_eq!(connector.opened_with(), Some(("sim0".to_string(), 9600)));
    }

    #[test]
    fn test_expected_replies_match_catalog() {
        assert_eq!(
            FrameKind::UaFromResponder.descriptor(),
            SupervisoryFrame::new(FrameKind::Set.descriptor().address, crate::core::CTRL_UA)
        );
        assert_eq!(LinkPhase::Established.to_string(), "established");
    }
}
