//! Packet dispatcher: the peer-side state machine.
//!
//! ```text
//!            put(b), b unknown ──▶ Err(UnknownOpcode)
//!   ┌─────────────────┐
//!   │ ExpectingOpcode │──── b known, 0-width args ───────┐
//!   └─────────────────┘                                   │
//!            │ b known                                    ▼
//!            ▼                                     invoke handler
//!   ┌────────────────────────┐   last byte        queue response
//!   │ AccumulatingArguments  │ ─────────────────▶ (drain via get)
//!   └────────────────────────┘
//! ```
//!
//! Responses queue in arrival order, so a new request may be assembled
//! while an earlier response is still draining. The same registry backs
//! the bulk interface ([`Dispatcher::resolve`],
//! [`Dispatcher::resolve_completely`]).
//!
//! Buffers are fixed at compile time: `I` bytes of argument accumulator
//! and `O` bytes of pending response queue.

use heapless::Deque;
use log::{debug, warn};

use super::registry::{Handler, Registry};
use crate::error::{Error, Result};

/// Default size of both dispatcher buffers.
pub const DEFAULT_BUFFER: usize = 64;

/// Outcome of feeding one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketStatus {
    /// The packet needs more bytes.
    Loading,
    /// The packet was complete and its response is queued.
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    ExpectingOpcode,
    AccumulatingArguments { opcode: u8, expected: usize },
}

/// Return bytes of one resolved packet.
pub type Response<const O: usize> = heapless::Vec<u8, O>;

/// Result of [`Dispatcher::resolve_completely`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch<const O: usize> {
    /// One response per resolved packet, in arrival order.
    pub responses: Vec<Response<O>>,
    /// Bytes that made up the resolved packets.
    pub consumed: usize,
    /// Trailing bytes left for a later call.
    pub unconsumed: usize,
}

/// Streaming and bulk request resolver over a [`Registry`].
pub struct Dispatcher<const I: usize = DEFAULT_BUFFER, const O: usize = DEFAULT_BUFFER> {
    registry: Registry,
    state: ParseState,
    input: heapless::Vec<u8, I>,
    pending: Deque<u8, O>,
}

impl Dispatcher {
    /// Dispatcher with the default buffer sizes.
    pub fn new(registry: Registry) -> Result<Self> {
        Self::with_buffers(registry)
    }
}

impl<const I: usize, const O: usize> Dispatcher<I, O> {
    /// Dispatcher with `I`/`O` byte buffers.
    ///
    /// Fails with [`Error::Capacity`] if a registered operation has more
    /// argument bytes than `I` or more return bytes than `O`.
    pub fn with_buffers(registry: Registry) -> Result<Self> {
        for (opcode, d) in registry.iter() {
            if d.argument_width() > I {
                return Err(Error::Capacity {
                    opcode,
                    needed: d.argument_width(),
                    available: I,
                });
            }
            if d.return_width() > O {
                return Err(Error::Capacity {
                    opcode,
                    needed: d.return_width(),
                    available: O,
                });
            }
        }
        Ok(Self {
            registry,
            state: ParseState::ExpectingOpcode,
            input: heapless::Vec::new(),
            pending: Deque::new(),
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Swap the handler behind `opcode`. Widths are unchanged.
    pub fn replace(&mut self, opcode: u8, handler: impl Handler + 'static) -> Result<()> {
        self.registry.replace(opcode, handler)
    }

    // ── Streaming interface ─────────────────────────────────────

    /// Feed one request byte.
    ///
    /// On error the partial packet is discarded and the dispatcher waits
    /// for an opcode again; queued responses are kept.
    pub fn put(&mut self, byte: u8) -> Result<PacketStatus> {
        let result = self.feed(byte);
        if result.is_err() {
            self.abandon_packet();
        }
        result
    }

    fn feed(&mut self, byte: u8) -> Result<PacketStatus> {
        let opcode = match self.state {
            ParseState::ExpectingOpcode => {
                let width = match self.registry.lookup(byte) {
                    Some(d) => d.argument_width(),
                    None => {
                        warn!("DISPATCH: unknown opcode 0x{:02x}", byte);
                        return Err(Error::UnknownOpcode(byte));
                    }
                };
                if width > 0 {
                    self.state = ParseState::AccumulatingArguments {
                        opcode: byte,
                        expected: width,
                    };
                    return Ok(PacketStatus::Loading);
                }
                byte
            }
            ParseState::AccumulatingArguments { opcode, expected } => {
                // `with_buffers` guarantees room for every argument width.
                self.input
                    .push(byte)
                    .map_err(|_| Error::Capacity {
                        opcode,
                        needed: expected,
                        available: I,
                    })?;
                if self.input.len() < expected {
                    return Ok(PacketStatus::Loading);
                }
                opcode
            }
        };

        let room = self.pending.capacity() - self.pending.len();
        let response = invoke::<O>(&mut self.registry, opcode, &self.input, room)?;
        self.abandon_packet();
        for &b in &response {
            // Room was checked before the handler ran.
            let _ = self.pending.push_back(b);
        }
        debug!(
            "DISPATCH: opcode 0x{:02x} resolved, {} bytes queued",
            opcode,
            response.len()
        );
        Ok(PacketStatus::Resolved)
    }

    fn abandon_packet(&mut self) {
        self.state = ParseState::ExpectingOpcode;
        self.input.clear();
    }

    /// Pull one byte from `source` into [`Self::put`].
    pub fn read_from(&mut self, source: impl FnOnce() -> u8) -> Result<PacketStatus> {
        self.put(source())
    }

    /// `true` while queued response bytes remain.
    pub fn is_loaded(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Number of queued response bytes.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Queued response bytes, oldest first, as up to two contiguous runs.
    ///
    /// The first run is empty only when nothing is queued.
    pub fn pending_slices(&self) -> (&[u8], &[u8]) {
        self.pending.as_slices()
    }

    /// Drop the `n` oldest queued bytes, e.g. once a transport accepted
    /// them from [`Self::pending_slices`].
    pub fn consume(&mut self, n: usize) {
        for _ in 0..n {
            if self.pending.pop_front().is_none() {
                break;
            }
        }
    }

    /// Pop the next queued response byte.
    pub fn get(&mut self) -> Option<u8> {
        self.pending.pop_front()
    }

    /// Push one queued byte into `sink`. Returns `false` if nothing was
    /// pending.
    pub fn write_to(&mut self, sink: impl FnOnce(u8)) -> bool {
        match self.get() {
            Some(b) => {
                sink(b);
                true
            }
            None => false,
        }
    }

    /// Push every queued byte into `sink`; returns how many were written.
    pub fn drain_to(&mut self, mut sink: impl FnMut(u8)) -> usize {
        let mut n = 0;
        while let Some(b) = self.get() {
            sink(b);
            n += 1;
        }
        n
    }

    /// Drop the partial packet and every queued response byte.
    pub fn reset(&mut self) {
        self.abandon_packet();
        self.pending.clear();
    }

    // ── Bulk interface ──────────────────────────────────────────

    fn ensure_idle(&self) -> Result<()> {
        match self.state {
            ParseState::ExpectingOpcode => Ok(()),
            ParseState::AccumulatingArguments { .. } => Err(Error::PacketInFlight),
        }
    }

    /// Resolve a buffer holding exactly one request packet.
    ///
    /// The packet is validated before the handler runs. The streaming
    /// response queue is untouched.
    pub fn resolve(&mut self, packet: &[u8]) -> Result<Response<O>> {
        self.ensure_idle()?;
        let (&opcode, args) = packet.split_first().ok_or(Error::PacketLength {
            expected: 1,
            received: 0,
        })?;
        let expected = match self.registry.lookup(opcode) {
            Some(d) => d.request_len(),
            None => {
                warn!("DISPATCH: unknown opcode 0x{:02x}", opcode);
                return Err(Error::UnknownOpcode(opcode));
            }
        };
        if packet.len() != expected {
            return Err(Error::PacketLength {
                expected,
                received: packet.len(),
            });
        }
        invoke(&mut self.registry, opcode, args, O)
    }

    /// Resolve every complete packet at the front of `bytes`.
    ///
    /// At each packet boundary, with `rest` the unread bytes:
    /// - a known opcode is resolved when `rest` holds its whole request,
    ///   otherwise resolution stops;
    /// - an unknown opcode fails with [`Error::UnknownOpcode`] when `rest`
    ///   is at least as long as the longest registered request, otherwise
    ///   resolution stops.
    ///
    /// On error no response is returned, even for packets resolved before
    /// the failure.
    pub fn resolve_completely(&mut self, bytes: &[u8]) -> Result<Batch<O>> {
        self.ensure_idle()?;
        let max_request = self.registry.max_request_len();
        let mut responses = Vec::new();
        let mut offset = 0;

        while let Some(&opcode) = bytes.get(offset) {
            let rest = &bytes[offset..];
            let len = match self.registry.lookup(opcode) {
                Some(d) => d.request_len(),
                None if rest.len() >= max_request => {
                    warn!("DISPATCH: unknown opcode 0x{:02x} at offset {}", opcode, offset);
                    return Err(Error::UnknownOpcode(opcode));
                }
                None => break,
            };
            if rest.len() < len {
                break;
            }
            responses.push(invoke(&mut self.registry, opcode, &rest[1..len], O)?);
            offset += len;
        }

        debug!(
            "DISPATCH: batch resolved {} packets, {} bytes left",
            responses.len(),
            bytes.len() - offset
        );
        Ok(Batch {
            responses,
            consumed: offset,
            unconsumed: bytes.len() - offset,
        })
    }
}

/// Run the handler of `opcode` on `args` into a fresh response of at most
/// `room` bytes.
fn invoke<const O: usize>(
    registry: &mut Registry,
    opcode: u8,
    args: &[u8],
    room: usize,
) -> Result<Response<O>> {
    let d = registry
        .lookup_mut(opcode)
        .ok_or(Error::UnknownOpcode(opcode))?;
    let width = d.return_width();
    let capacity = Error::Capacity {
        opcode,
        needed: width,
        available: room.min(O),
    };
    if width > room {
        return Err(capacity);
    }
    let mut response = Response::<O>::new();
    response.resize(width, 0).map_err(|()| capacity)?;
    d.invoke(args, &mut response)?;
    Ok(response)
}
