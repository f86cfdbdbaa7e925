//! Device abstractions consumed by the link layer.
//!
//! The link layer never touches a serial port directly. It talks to a
//! byte-stream device through [`Transport`], and opens one through a
//! [`Connector`].

use std::future::Future;
use std::io;

/// A point-to-point byte-stream device.
///
/// # Requirements
///
/// - `read_byte` MUST be cancel safe: if the returned future is dropped before
///   completing, no byte may be consumed. The retransmission engine bounds
///   every read by the remaining deadline and drops the read on expiry.
/// - End of stream is reported as an error (`UnexpectedEof`), never as a byte.
/// - `close` MUST be idempotent.
pub trait Transport {
    /// Wait for and return the next byte from the device.
    fn read_byte(&mut self) -> impl Future<Output = io::Result<u8>> + Send;

    /// Write a buffer to the device, returning the number of bytes written.
    fn write_bytes(&mut self, buf: &[u8]) -> impl Future<Output = io::Result<usize>> + Send;

    /// Release the device.
    fn close(&mut self) -> impl Future<Output = io::Result<()>> + Send;
}

/// Opens a [`Transport`] given a device identifier and a line rate.
pub trait Connector {
    /// Device type produced by this connector.
    type Transport: Transport;

    /// Open the device identified by `device` at `baud_rate`.
    fn open(
        &self,
        device: &str,
        baud_rate: u32,
    ) -> impl Future<Output = io::Result<Self::Transport>> + Send;
}
