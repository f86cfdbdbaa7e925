//! Byte-stream device over any tokio stream.
//!
//! Wraps anything that is `AsyncRead + AsyncWrite`: a serial port stream
//! opened by the application, a pipe, a pty, or a socket to a serial bridge.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::core::Transport;

/// [`Transport`] over a tokio byte stream.
#[derive(Debug)]
pub struct StreamTransport<S> {
    /// The underlying stream.
    stream: S,
    /// Whether `close` has run.
    closed: bool,
}

impl<S> StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap a connected stream.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            closed: false,
        }
    }

    /// Get a reference to the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Unwrap the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Check if `close` has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> io::Result<()> {
        if self.closed {
            Err(io::Error::new(io::ErrorKind::NotConnected, "stream closed"))
        } else {
            Ok(())
        }
    }
}

impl<S> Transport for StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn read_byte(&mut self) -> io::Result<u8> {
        self.ensure_open()?;
        // A one-byte read either completes or consumes nothing.
        self.stream.read_u8().await
    }

    async fn write_bytes(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.ensure_open()?;
        self.stream.write_all(buf).await?;
        self.stream.flush().await?;
        Ok(buf.len())
    }

    async fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.stream.shutdown().await
    }
}
