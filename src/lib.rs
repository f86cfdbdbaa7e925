//! # hdlc-link
//!
//! A minimal data-link layer for point-to-point serial connections.
//!
//! Connections are opened and closed with HDLC-style supervisory frames
//! (SET, UA, DISC). Each frame is five bytes:
//!
//! ```text
//! FLAG(0x7E) | ADDRESS | CONTROL | ADDRESS ^ CONTROL | FLAG(0x7E)
//! ```
//!
//! The crate provides:
//!
//! - **Frame synchronization**: a byte-driven state machine that finds an
//!   expected frame in a noisy stream and resynchronizes on garbage
//! - **Retransmission**: stop-and-wait ARQ with a bounded number of
//!   retransmissions per frame
//! - **Connection management**: open/close handshakes for the initiator and
//!   responder roles
//! - **Devices**: an in-memory line for tests, any tokio byte stream, and a
//!   serial-over-TCP connector
//!
//! ## Feature Flags
//!
//! - `tcp` (default): [`device::TcpConnector`]
//!
//! ## Example Usage
//!
//! ```rust
//! use hdlc_link::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), LinkError> {
//! let (a, b) = MemoryTransport::pair();
//!
//! let initiator = LinkConfig::builder(Role::Initiator).device("sim0").build()?;
//! let responder = LinkConfig::builder(Role::Responder).device("sim1").build()?;
//!
//! let (tx, rx) = tokio::join!(Link::open(initiator, a), Link::open(responder, b));
//! let (tx, rx) = (tx?, rx?);
//!
//! let (tx_stats, rx_stats) = tokio::join!(tx.close(), rx.close());
//! assert_eq!(tx_stats?.retransmissions, 0);
//! assert_eq!(rx_stats?.frames_received, 3);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included)
pub mod core;

pub mod device;
pub mod frame;
pub mod link;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::*;

    pub use crate::device::{MemoryTransport, StreamTransport};
    #[cfg(feature = "tcp")]
    pub use crate::device::TcpConnector;

    pub use crate::frame::{FrameKind, FrameSynchronizer, SupervisoryFrame, SyncState};
    pub use crate::link::{Link, LinkConfig, LinkPhase, LinkStats, Retransmitter, Role};
}

// Re-export commonly used items at crate root
pub use crate::core::{Connector, LinkError, LinkResult, Transport};
pub use frame::{FrameKind, FrameSynchronizer, SupervisoryFrame};
pub use link::{Link, LinkConfig, LinkPhase, LinkStats, Role};
