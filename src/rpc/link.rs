//! In-process links between a [`Client`](super::client::Client) and a
//! [`Dispatcher`].
//!
//! - [`Loopback`] resolves each request directly on an owned dispatcher.
//! - [`ByteLink`] carries the raw byte stream over a pair of
//!   `embassy-sync` channels; the host half is a [`LinkTransport`] and
//!   the peer half runs [`serve`].

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use log::{debug, warn};

use super::client::{Reply, RequestTransport};
use super::dispatcher::{Dispatcher, PacketStatus};
use super::keyring::Keyring;
use crate::error::{Error, Result};

// ── Loopback ──────────────────────────────────────────────────

/// Request transport that resolves packets on a local dispatcher.
pub struct Loopback<const I: usize, const O: usize> {
    dispatcher: Dispatcher<I, O>,
}

impl<const I: usize, const O: usize> Loopback<I, O> {
    pub fn new(dispatcher: Dispatcher<I, O>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher<I, O> {
        &mut self.dispatcher
    }
}

impl<const I: usize, const O: usize> RequestTransport for Loopback<I, O> {
    type Error = Error;

    async fn new_request(&mut self, payload: &[u8]) -> Result<Reply> {
        let response = self.dispatcher.resolve(payload)?;
        Ok(Reply::Raw(response.to_vec()))
    }
}

// ── Channel link ──────────────────────────────────────────────

/// Two byte channels: requests towards the peer, responses back.
pub struct ByteLink<M: RawMutex, const N: usize> {
    requests: Channel<M, u8, N>,
    responses: Channel<M, u8, N>,
}

impl<M: RawMutex, const N: usize> ByteLink<M, N> {
    pub const fn new() -> Self {
        Self {
            requests: Channel::new(),
            responses: Channel::new(),
        }
    }

    /// Host half of the link for the operations in `keyring`.
    pub fn transport(&self, keyring: &Keyring) -> LinkTransport<'_, M, N> {
        LinkTransport {
            link: self,
            return_widths: keyring
                .signatures()
                .iter()
                .map(|sig| sig.return_width())
                .collect(),
        }
    }
}

impl<M: RawMutex, const N: usize> Default for ByteLink<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Host half of a [`ByteLink`].
///
/// The stream carries no framing, so the transport reads back exactly
/// the return width the keyring declares for the opcode.
pub struct LinkTransport<'a, M: RawMutex, const N: usize> {
    link: &'a ByteLink<M, N>,
    return_widths: Vec<usize>,
}

impl<M: RawMutex, const N: usize> RequestTransport for LinkTransport<'_, M, N> {
    type Error = Error;

    async fn new_request(&mut self, payload: &[u8]) -> Result<Reply> {
        let &opcode = payload.first().ok_or(Error::PacketLength {
            expected: 1,
            received: 0,
        })?;
        let width = *self
            .return_widths
            .get(usize::from(opcode))
            .ok_or(Error::UnknownOpcode(opcode))?;

        for &b in payload {
            self.link.requests.send(b).await;
        }
        let mut bytes = Vec::with_capacity(width);
        for _ in 0..width {
            bytes.push(self.link.responses.receive().await);
        }
        Ok(Reply::Raw(bytes))
    }
}

/// Peer loop: feed request bytes from `link` into `dispatcher` and send
/// every resolved response back.
///
/// Runs until the byte stream breaks the protocol; the dispatcher is
/// reset and the error returned.
pub async fn serve<M: RawMutex, const N: usize, const I: usize, const O: usize>(
    link: &ByteLink<M, N>,
    dispatcher: &mut Dispatcher<I, O>,
) -> Error {
    loop {
        let byte = link.requests.receive().await;
        match dispatcher.put(byte) {
            Ok(PacketStatus::Loading) => {}
            Ok(PacketStatus::Resolved) => {
                let mut sent = 0;
                while let Some(b) = dispatcher.get() {
                    link.responses.send(b).await;
                    sent += 1;
                }
                debug!("LINK: {} response bytes sent", sent);
            }
            Err(e) => {
                warn!("LINK: {}, resetting dispatcher", e);
                dispatcher.reset();
                return e;
            }
        }
    }
}
