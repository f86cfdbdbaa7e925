//! Supervisory frames: the catalog of wire encodings and the synchronizer
//! that recognizes them in a noisy byte stream.

mod catalog;
mod sync;

pub use catalog::{Control, FrameKind, SupervisoryFrame};
pub use sync::{FrameSynchronizer, SyncState};
