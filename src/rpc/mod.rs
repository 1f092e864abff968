//! Padding-free RPC subsystem.
//!
//! ```text
//! ┌────────────────────────── host ───────────────────────────┐
//! │  Keyring ──▶ FunctionKey ──▶ Client ──▶ RequestTransport  │
//! │  (manifest)  (encode/decode)  (call)     (Loopback/Link)  │
//! └────────────────────────────────────────────┬──────────────┘
//!                         opcode ++ args        │  return bytes
//! ┌────────────────────────── peer ────────────▼──────────────┐
//! │  Transport ──▶ Dispatcher ──▶ Registry ──▶ Handler        │
//! │  (service)     (state machine) (opcode table) (Action/fn) │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Both sides agree on the keyring before any byte is exchanged; nothing
//! on the wire describes the layout of a packet.

pub mod action;
pub mod client;
pub mod codec;
pub mod dispatcher;
pub mod key;
pub mod keyring;
pub mod link;
pub mod registry;
pub mod transport;

pub use action::Action;
pub use client::{CallError, Client, Reply, RequestTransport};
pub use codec::{Scalar, Value};
pub use dispatcher::{Batch, Dispatcher, PacketStatus, Response};
pub use key::{FunctionKey, Signature};
pub use keyring::Keyring;
pub use link::{ByteLink, LinkTransport, Loopback, serve};
pub use registry::{Descriptor, Handler, Registry};
pub use transport::{NullTransport, ServiceError, Transport, service};
