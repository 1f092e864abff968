//! Unified error types for the protocol core.
//!
//! A single `Error` enum that every component converts into, so a caller
//! driving a dispatcher or a client handles one type. All variants are
//! `Copy` and carry the offending byte or width where one exists.

use core::fmt;

use crate::rpc::codec::Scalar;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An argument or return value does not fit its declared width.
    Encoding(EncodingError),
    /// A byte buffer does not match the declared layout.
    Decoding(DecodingError),
    /// The byte does not map to a registered operation.
    UnknownOpcode(u8),
    /// The opcode slot is already populated.
    DuplicateOpcode(u8),
    /// The opcode exceeds the table capacity.
    OutOfRange { opcode: usize, capacity: usize },
    /// A packet or table does not fit a fixed-capacity buffer.
    Capacity {
        opcode: u8,
        needed: usize,
        available: usize,
    },
    /// A buffer holds more or fewer bytes than exactly one packet.
    PacketLength { expected: usize, received: usize },
    /// A streamed packet is partially assembled.
    PacketInFlight,
    /// A signature manifest could not be loaded.
    Manifest(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encoding(e) => write!(f, "encoding: {e}"),
            Self::Decoding(e) => write!(f, "decoding: {e}"),
            Self::UnknownOpcode(b) => write!(f, "unknown opcode 0x{b:02x}"),
            Self::DuplicateOpcode(b) => write!(f, "opcode 0x{b:02x} already registered"),
            Self::OutOfRange { opcode, capacity } => {
                write!(f, "opcode {opcode} out of range (capacity {capacity})")
            }
            Self::Capacity {
                opcode,
                needed,
                available,
            } => write!(
                f,
                "opcode 0x{opcode:02x} needs {needed} bytes, buffer holds {available}"
            ),
            Self::PacketLength { expected, received } => {
                write!(f, "packet needs {expected} bytes, got {received}")
            }
            Self::PacketInFlight => write!(f, "a streamed packet is still being assembled"),
            Self::Manifest(msg) => write!(f, "manifest: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Encoding errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingError {
    /// The number of values differs from the signature.
    ArgumentCount { expected: usize, got: usize },
    /// Value at `index` cannot be represented as `scalar`.
    Unrepresentable { index: usize, scalar: Scalar },
    /// A handler returned a value for a void operation, or nothing for a
    /// non-void one.
    ReturnMismatch,
    /// The output buffer is smaller than the encoded layout.
    BufferTooSmall { needed: usize, available: usize },
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArgumentCount { expected, got } => {
                write!(f, "expected {expected} arguments, got {got}")
            }
            Self::Unrepresentable { index, scalar } => {
                write!(f, "value #{index} does not fit {scalar}")
            }
            Self::ReturnMismatch => write!(f, "return value does not match signature"),
            Self::BufferTooSmall { needed, available } => {
                write!(f, "needs {needed} bytes, buffer holds {available}")
            }
        }
    }
}

impl From<EncodingError> for Error {
    fn from(e: EncodingError) -> Self {
        Self::Encoding(e)
    }
}

// ---------------------------------------------------------------------------
// Decoding errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodingError {
    /// The byte count differs from the declared width.
    Length { expected: usize, got: usize },
    /// A boolean field holds something other than 0 or 1.
    InvalidBool(u8),
    /// The output slice has room for fewer values than the layout holds.
    Capacity { needed: usize, available: usize },
}

impl fmt::Display for DecodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length { expected, got } => {
                write!(f, "expected {expected} bytes, got {got}")
            }
            Self::InvalidBool(b) => write!(f, "invalid boolean byte 0x{b:02x}"),
            Self::Capacity { needed, available } => {
                write!(f, "{needed} fields, room for {available}")
            }
        }
    }
}

impl From<DecodingError> for Error {
    fn from(e: DecodingError) -> Self {
        Self::Decoding(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
