//! Link layer - connection management and retransmission.
//!
//! - **Configuration**: [`LinkConfig`] and [`Role`], fixed per connection
//! - **Retransmission**: [`Retransmitter`], stop-and-wait ARQ bounded by
//!   [`RetransmitTimer`]
//! - **Connection manager**: [`Link`] running the open and close handshakes
//! - **Statistics**: [`LinkStats`]
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Link (open / close)             │
//! ├─────────────────────────────────────────┤
//! │   Retransmitter (send, wait, resend)    │
//! ├─────────────────────────────────────────┤
//! │   FrameSynchronizer (byte state machine)│
//! ├─────────────────────────────────────────┤
//! │        Transport (byte device)          │
//! └─────────────────────────────────────────┘
//! ```

mod config;
mod connection;
mod retransmit;
mod stats;
mod timer;

pub use config::{LinkConfig, LinkConfigBuilder, Role};
pub use connection::{Link, LinkPhase};
pub use retransmit::{RetryState, Retransmitter};
pub use stats::LinkStats;
pub use timer::RetransmitTimer;
