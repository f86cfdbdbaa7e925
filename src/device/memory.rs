//! In-memory byte channel standing in for a serial line.
//!
//! [`MemoryTransport::pair`] returns two connected ends. Each end can carry a
//! write filter that rewrites what actually reaches the wire, which is how
//! tests simulate lost or noisy frames. A [`MemoryProbe`] observes one end
//! from outside: every write with its timestamp, and whether it was closed.

use std::fmt;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::core::{Connector, Transport};

/// Rewrites one write before it reaches the peer.
///
/// Receives the zero-based index of the write on this end and the bytes the
/// caller wrote; returns the bytes to deliver (empty to drop the write).
pub type WriteFilter = Box<dyn FnMut(usize, &[u8]) -> Vec<u8> + Send>;

/// A filter that drops the first `count` writes and passes the rest.
pub fn drop_first(count: usize) -> WriteFilter {
    Box::new(move |index, bytes| {
        if index < count {
            Vec::new()
        } else {
            bytes.to_vec()
        }
    })
}

/// A filter that prepends `noise` to every write.
pub fn prefix_noise(noise: Vec<u8>) -> WriteFilter {
    Box::new(move |_, bytes| {
        let mut out = noise.clone();
        out.extend_from_slice(bytes);
        out
    })
}

/// One write as issued by the caller, before filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    /// When the write happened.
    pub at: Instant,
    /// Bytes passed to `write_bytes`.
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct Shared {
    writes: Vec<WriteRecord>,
    closed: bool,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Read-only view of one [`MemoryTransport`] end.
#[derive(Debug, Clone)]
pub struct MemoryProbe {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryProbe {
    /// All writes issued so far.
    pub fn writes(&self) -> Vec<WriteRecord> {
        lock(&self.shared).writes.clone()
    }

    /// Number of writes issued so far.
    pub fn write_count(&self) -> usize {
        lock(&self.shared).writes.len()
    }

    /// Check if the end has been closed.
    pub fn is_closed(&self) -> bool {
        lock(&self.shared).closed
    }
}

/// One end of an in-memory serial line.
pub struct MemoryTransport {
    rx: mpsc::UnboundedReceiver<u8>,
    tx: Option<mpsc::UnboundedSender<u8>>,
    filter: Option<WriteFilter>,
    shared: Arc<Mutex<Shared>>,
}

impl fmt::Debug for MemoryTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryTransport")
            .field("open", &self.tx.is_some())
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}

impl MemoryTransport {
    /// Create two connected ends.
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_b) = mpsc::unbounded_channel();
        let (tx_b, rx_a) = mpsc::unbounded_channel();
        (Self::from_parts(tx_a, rx_a), Self::from_parts(tx_b, rx_b))
    }

    fn from_parts(tx: mpsc::UnboundedSender<u8>, rx: mpsc::UnboundedReceiver<u8>) -> Self {
        Self {
            rx,
            tx: Some(tx),
            filter: None,
            shared: Arc::new(Mutex::new(Shared::default())),
        }
    }

    /// Rewrite every outgoing write through `filter`.
    pub fn with_write_filter(mut self, filter: WriteFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Handle for observing this end.
    pub fn probe(&self) -> MemoryProbe {
        MemoryProbe {
            shared: Arc::clone(&self.shared),
        }
    }

    fn not_connected() -> io::Error {
        io::Error::new(io::ErrorKind::NotConnected, "memory transport closed")
    }
}

impl Transport for MemoryTransport {
    async fn read_byte(&mut self) -> io::Result<u8> {
        if self.tx.is_none() {
            return Err(Self::not_connected());
        }
        // `recv` is cancel safe: a dropped read leaves the byte queued.
        self.rx
            .recv()
            .await
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "peer closed"))
    }

    async fn write_bytes(&mut self, buf: &[u8]) -> io::Result<usize> {
        let tx = self.tx.as_ref().ok_or_else(Self::not_connected)?;

        let index = {
            let mut shared = lock(&self.shared);
            shared.writes.push(WriteRecord {
                at: Instant::now(),
                bytes: buf.to_vec(),
            });
            shared.writes.len() - 1
        };

        let delivered = match self.filter.as_mut() {
            Some(filter) => filter(index, buf),
            None => buf.to_vec(),
        };
        for byte in delivered {
            // A vanished peer looks like a line that swallows bytes.
            let _ = tx.send(byte);
        }
        Ok(buf.len())
    }

    async fn close(&mut self) -> io::Result<()> {
        self.tx = None;
        self.rx.close();
        lock(&self.shared).closed = true;
        Ok(())
    }
}

/// Hands out a pre-built [`MemoryTransport`] exactly once.
#[derive(Debug)]
pub struct MemoryConnector {
    transport: Mutex<Option<MemoryTransport>>,
    opened_with: Mutex<Option<(String, u32)>>,
}

impl MemoryConnector {
    /// Wrap one end so it can be opened by device identifier.
    pub fn new(transport: MemoryTransport) -> Self {
        Self {
            transport: Mutex::new(Some(transport)),
            opened_with: Mutex::new(None),
        }
    }

    /// Device identifier and rate of the successful open, if any.
    pub fn opened_with(&self) -> Option<(String, u32)> {
        self.opened_with
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Connector for MemoryConnector {
    type Transport = MemoryTransport;

    async fn open(&self, device: &str, baud_rate: u32) -> io::Result<MemoryTransport> {
        let transport = self
            .transport
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::AddrInUse, "device already open"))?;
        *self.opened_with.lock().unwrap_or_else(PoisonError::into_inner) =
            Some((device.to_string(), baud_rate));
        Ok(transport)
    }
}
