//! Connector for serial-over-TCP bridges (ser2net, socat and friends).
//!
//! The device identifier is the bridge's `host:port`. The line rate is
//! configured on the bridge itself, so it is only logged here.

use std::io;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::core::Connector;

use super::stream::StreamTransport;

/// Default time allowed for the TCP connect.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a [`StreamTransport`] to a serial bridge.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    connect_timeout: Duration,
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl TcpConnector {
    /// Create a connector with the default connect timeout.
    pub fn new() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }
}

impl Connector for TcpConnector {
    type Transport = StreamTransport<TcpStream>;

    async fn open(&self, device: &str, baud_rate: u32) -> io::Result<Self::Transport> {
        let stream = timeout(self.connect_timeout, TcpStream::connect(device))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "bridge connect timed out"))??;
        stream.set_nodelay(true)?;
        debug!(device, baud_rate, "connected to serial bridge");
        Ok(StreamTransport::new(stream))
    }
}
