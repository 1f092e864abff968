//! Wire format parameters
//!
//! Byte order and signed-integer representation shared by both ends of a
//! link. A host and a peer built from the same keyring must agree on these
//! values; nothing on the wire announces them.

use serde::{Deserialize, Serialize};

/// Byte order of every multi-byte field in a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Endianness {
    /// Least significant byte first
    #[default]
    Little,
    /// Most significant byte first
    Big,
}

/// Representation of signed integers on the wire.
///
/// The representation does not have to match the one of either platform:
/// values are converted on encode and decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignedMode {
    #[default]
    TwosComplement,
    OnesComplement,
    SignedMagnitude,
    /// Excess-2^(n-1): the stored value is `x + 2^(n-1)`.
    OffsetBinary,
}

/// Serialisation parameters carried by keys, actions and keyrings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WireFormat {
    pub endianness: Endianness,
    pub signed_mode: SignedMode,
}

impl WireFormat {
    pub const fn new(endianness: Endianness, signed_mode: SignedMode) -> Self {
        Self {
            endianness,
            signed_mode,
        }
    }

    /// Little-endian, two's complement: the layout of most MCUs.
    pub const fn little_endian() -> Self {
        Self::new(Endianness::Little, SignedMode::TwosComplement)
    }

    pub const fn big_endian() -> Self {
        Self::new(Endianness::Big, SignedMode::TwosComplement)
    }

    pub const fn with_signed_mode(self, signed_mode: SignedMode) -> Self {
        Self {
            endianness: self.endianness,
            signed_mode,
        }
    }
}
