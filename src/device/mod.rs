//! Byte-stream devices implementing [`Transport`](crate::core::Transport).
//!
//! - [`MemoryTransport`]: connected in-memory pair with loss/noise injection
//! - [`StreamTransport`]: any tokio `AsyncRead + AsyncWrite` stream
//! - [`TcpConnector`]: serial-over-TCP bridge (requires `tcp` feature)

mod memory;
mod stream;
#[cfg(feature = "tcp")]
mod tcp;

pub use memory::{
    MemoryConnector, MemoryProbe, MemoryTransport, WriteFilter, WriteRecord, drop_first,
    prefix_noise,
};
pub use stream::StreamTransport;
#[cfg(feature = "tcp")]
pub use tcp::{DEFAULT_CONNECT_TIMEOUT, TcpConnector};
