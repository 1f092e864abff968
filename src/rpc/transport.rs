//! Transport abstraction: any byte-oriented channel on the peer side.
//!
//! Concrete implementations:
//! - [`NullTransport`]
//! - stdin/stdout (the `upd-peer` binary)
//!
//! [`service`] is generic over `Transport`, so adding a new transport
//! requires no changes to the dispatcher.

use core::fmt;

use log::{debug, warn};

use super::dispatcher::{Dispatcher, PacketStatus};
use crate::error::Error;

/// Read chunk size used by [`service`].
const READ_CHUNK: usize = 64;

/// Byte-oriented transport channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: fmt::Debug;

    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns the number of bytes actually read; 0 when nothing arrived.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write `data` to the transport.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Check if data is available for reading.
    fn available(&self) -> bool;
}

/// A null transport that discards all writes and never reads.
pub struct NullTransport;

impl Transport for NullTransport {
    type Error = ();

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, ()> {
        Ok(0)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }

    fn available(&self) -> bool {
        false
    }
}

// ── Service pump ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError<E> {
    /// The byte stream broke the protocol; the dispatcher was reset.
    Protocol(Error),
    /// The transport failed.
    Transport(E),
    /// The transport accepted no bytes of a pending response.
    Stalled,
}

impl<E: fmt::Debug> fmt::Display for ServiceError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Protocol(e) => write!(f, "protocol: {e}"),
            Self::Transport(e) => write!(f, "transport: {e:?}"),
            Self::Stalled => write!(f, "transport stopped accepting bytes"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for ServiceError<E> {}

/// Feed everything `transport` has into `dispatcher`, writing and
/// flushing each resolved response as soon as it is ready.
///
/// Returns when the transport has nothing more to read, with the number
/// of packets resolved. A partial trailing packet stays in the
/// dispatcher for the next call, as do response bytes the transport
/// refused; those are written first on the next call.
pub fn service<T: Transport, const I: usize, const O: usize>(
    dispatcher: &mut Dispatcher<I, O>,
    transport: &mut T,
) -> Result<usize, ServiceError<T::Error>> {
    let mut buf = [0u8; READ_CHUNK];
    let mut resolved = 0;

    // Left over from a write that failed on an earlier call.
    if dispatcher.is_loaded() {
        write_pending(dispatcher, transport)?;
    }

    while transport.available() {
        let n = transport.read(&mut buf).map_err(ServiceError::Transport)?;
        if n == 0 {
            break;
        }
        for &byte in &buf[..n] {
            match dispatcher.put(byte) {
                Ok(PacketStatus::Loading) => {}
                Ok(PacketStatus::Resolved) => {
                    resolved += 1;
                    write_pending(dispatcher, transport)?;
                }
                Err(e) => {
                    warn!("IO: {}, resetting dispatcher", e);
                    dispatcher.reset();
                    return Err(ServiceError::Protocol(e));
                }
            }
        }
    }

    if resolved > 0 {
        debug!("IO: {} packets resolved", resolved);
    }
    Ok(resolved)
}

/// Write queued response bytes until the queue is empty, then flush.
///
/// Bytes leave the queue only once the transport accepted them, so a
/// failed write keeps the rest for the next call.
fn write_pending<T: Transport, const I: usize, const O: usize>(
    dispatcher: &mut Dispatcher<I, O>,
    transport: &mut T,
) -> Result<(), ServiceError<T::Error>> {
    while dispatcher.is_loaded() {
        let (front, _) = dispatcher.pending_slices();
        let n = transport.write(front).map_err(ServiceError::Transport)?;
        if n == 0 {
            return Err(ServiceError::Stalled);
        }
        let accepted = n.min(front.len());
        dispatcher.consume(accepted);
    }
    transport.flush().map_err(ServiceError::Transport)
}
