//! Padding-free binary RPC between a host and a resource-constrained peer.
//!
//! A request is one opcode byte followed by the arguments, packed back to
//! back. A response is the bare return value. The peer side
//! ([`rpc::Dispatcher`]) is synchronous and allocation-free per byte; the
//! host side ([`rpc::Client`]) is async over any [`rpc::RequestTransport`].

#![deny(unused_must_use)]

pub mod config;
pub mod error;
pub mod rpc;

pub use config::{Endianness, SignedMode, WireFormat};
pub use error::{Error, Result};
