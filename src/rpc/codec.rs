//! Fixed-width wire codec.
//!
//! Wire format of a request:
//! ```text
//! ┌──────────┬─────────┬─────────┬─────┬─────────┐
//! │ opcode   │ arg 0   │ arg 1   │ ... │ arg N-1 │
//! │ 1 B      │ w0 B    │ w1 B    │     │ wN-1 B  │
//! └──────────┴─────────┴─────────┴─────┴─────────┘
//! ```
//!
//! A response is the bare return value (`w` bytes, or nothing for a void
//! operation). Fields are concatenated with no padding, no length prefix and
//! no checksum. Byte order and signed representation come from
//! [`WireFormat`].
//!
//! Everything here is a pure transform over caller-supplied slices.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{Endianness, SignedMode, WireFormat};
use crate::error::{DecodingError, EncodingError};

/// Fixed-width field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scalar {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    Bool,
}

impl Scalar {
    /// Size of the field on the wire, in bytes.
    pub const fn width(self) -> usize {
        match self {
            Self::U8 | Self::I8 | Self::Bool => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 => 4,
            Self::U64 | Self::I64 => 8,
        }
    }

    pub const fn is_signed(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    const fn bits(self) -> u32 {
        self.width() as u32 * 8
    }

    const fn mask(self) -> u64 {
        if self.bits() == 64 {
            u64::MAX
        } else {
            (1u64 << self.bits()) - 1
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// Sum of the widths of `fields`.
pub fn layout_width(fields: &[Scalar]) -> usize {
    fields.iter().map(|s| s.width()).sum()
}

/// Runtime value of one argument or return field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Unsigned(u64),
    Signed(i64),
    Bool(bool),
}

impl Value {
    pub fn as_u64(self) -> Option<u64> {
        match self {
            Self::Unsigned(v) => Some(v),
            Self::Signed(v) => u64::try_from(v).ok(),
            Self::Bool(_) => None,
        }
    }

    pub fn as_i64(self) -> Option<i64> {
        match self {
            Self::Unsigned(v) => i64::try_from(v).ok(),
            Self::Signed(v) => Some(v),
            Self::Bool(_) => None,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(b),
            _ => None,
        }
    }
}

macro_rules! value_from {
    ($variant:ident, $target:ty, $($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Self::$variant(<$target>::from(v))
            }
        })*
    };
}

value_from!(Unsigned, u64, u8, u16, u32, u64);
value_from!(Signed, i64, i8, i16, i32, i64);
value_from!(Bool, bool, bool);

// ── Signed representations ───────────────────────────────────

fn signed_to_raw(mode: SignedMode, scalar: Scalar, v: i64) -> Option<u64> {
    let half = 1i128 << (scalar.bits() - 1);
    let v = i128::from(v);
    let (min, max) = match mode {
        SignedMode::TwosComplement | SignedMode::OffsetBinary => (-half, half - 1),
        SignedMode::OnesComplement | SignedMode::SignedMagnitude => (-(half - 1), half - 1),
    };
    if v < min || v > max {
        return None;
    }

    let mask = scalar.mask();
    let raw = match mode {
        SignedMode::TwosComplement => (v as u64) & mask,
        SignedMode::OffsetBinary => (v + half) as u64,
        SignedMode::OnesComplement if v < 0 => !((-v) as u64) & mask,
        SignedMode::SignedMagnitude if v < 0 => ((-v) as u64) | (half as u64),
        SignedMode::OnesComplement | SignedMode::SignedMagnitude => v as u64,
    };
    Some(raw)
}

fn signed_from_raw(mode: SignedMode, scalar: Scalar, raw: u64) -> i64 {
    let mask = scalar.mask();
    let sign = 1u64 << (scalar.bits() - 1);
    let negative = raw & sign != 0;
    match mode {
        SignedMode::TwosComplement if negative => (raw | !mask) as i64,
        SignedMode::OnesComplement if negative => -((!raw & mask) as i64),
        SignedMode::SignedMagnitude if negative => -((raw & !sign) as i64),
        SignedMode::OffsetBinary => (i128::from(raw) - i128::from(sign)) as i64,
        _ => raw as i64,
    }
}

fn to_raw(mode: SignedMode, scalar: Scalar, value: Value) -> Option<u64> {
    match (scalar, value) {
        (Scalar::Bool, Value::Bool(b)) => Some(u64::from(b)),
        (Scalar::Bool, _) | (_, Value::Bool(_)) => None,
        (s, v) if s.is_signed() => signed_to_raw(mode, s, v.as_i64()?),
        (s, v) => v.as_u64().filter(|&raw| raw <= s.mask()),
    }
}

fn write_raw(endianness: Endianness, raw: u64, out: &mut [u8]) {
    let bytes = raw.to_le_bytes();
    let n = out.len();
    match endianness {
        Endianness::Little => out.copy_from_slice(&bytes[..n]),
        Endianness::Big => {
            for (dst, src) in out.iter_mut().rev().zip(&bytes[..n]) {
                *dst = *src;
            }
        }
    }
}

fn read_raw(endianness: Endianness, bytes: &[u8]) -> u64 {
    let fold = |acc: u64, b: &u8| (acc << 8) | u64::from(*b);
    match endianness {
        Endianness::Little => bytes.iter().rev().fold(0, fold),
        Endianness::Big => bytes.iter().fold(0, fold),
    }
}

// ── Encode ────────────────────────────────────────────────────

/// Encode one value into the first `scalar.width()` bytes of `out`.
pub fn encode_value(
    format: WireFormat,
    scalar: Scalar,
    value: Value,
    out: &mut [u8],
) -> Result<usize, EncodingError> {
    let width = scalar.width();
    if out.len() < width {
        return Err(EncodingError::BufferTooSmall {
            needed: width,
            available: out.len(),
        });
    }
    let raw = to_raw(format.signed_mode, scalar, value)
        .ok_or(EncodingError::Unrepresentable { index: 0, scalar })?;
    write_raw(format.endianness, raw, &mut out[..width]);
    Ok(width)
}

/// Concatenate `args` laid out as `params` into `out`.
///
/// Returns the number of bytes written.
pub fn encode_args(
    format: WireFormat,
    params: &[Scalar],
    args: &[Value],
    out: &mut [u8],
) -> Result<usize, EncodingError> {
    if params.len() != args.len() {
        return Err(EncodingError::ArgumentCount {
            expected: params.len(),
            got: args.len(),
        });
    }
    let needed = layout_width(params);
    if out.len() < needed {
        return Err(EncodingError::BufferTooSmall {
            needed,
            available: out.len(),
        });
    }

    let mut offset = 0;
    for (index, (&scalar, &value)) in params.iter().zip(args).enumerate() {
        offset += encode_value(format, scalar, value, &mut out[offset..])
            .map_err(|_| EncodingError::Unrepresentable { index, scalar })?;
    }
    Ok(offset)
}

// ── Decode ────────────────────────────────────────────────────

/// Decode one value from exactly `scalar.width()` bytes.
pub fn decode_value(
    format: WireFormat,
    scalar: Scalar,
    bytes: &[u8],
) -> Result<Value, DecodingError> {
    if bytes.len() != scalar.width() {
        return Err(DecodingError::Length {
            expected: scalar.width(),
            got: bytes.len(),
        });
    }
    let raw = read_raw(format.endianness, bytes);
    Ok(match scalar {
        Scalar::Bool => match raw {
            0 => Value::Bool(false),
            1 => Value::Bool(true),
            _ => return Err(DecodingError::InvalidBool(bytes[0])),
        },
        s if s.is_signed() => Value::Signed(signed_from_raw(format.signed_mode, s, raw)),
        _ => Value::Unsigned(raw),
    })
}

/// Decode the fields of `params` from `bytes` into `out`.
///
/// `bytes` must hold exactly the layout; `out` must have room for one
/// value per parameter. Returns the number of values written.
pub fn decode_args(
    format: WireFormat,
    params: &[Scalar],
    bytes: &[u8],
    out: &mut [Value],
) -> Result<usize, DecodingError> {
    let expected = layout_width(params);
    if bytes.len() != expected {
        return Err(DecodingError::Length {
            expected,
            got: bytes.len(),
        });
    }
    if out.len() < params.len() {
        return Err(DecodingError::Capacity {
            needed: params.len(),
            available: out.len(),
        });
    }

    let mut offset = 0;
    for (slot, &scalar) in out.iter_mut().zip(params) {
        let end = offset + scalar.width();
        *slot = decode_value(format, scalar, &bytes[offset..end])?;
        offset = end;
    }
    Ok(params.len())
}

/// Decode a response.
///
/// An empty buffer is the void sentinel (`None`). Any other buffer must
/// hold exactly the declared return value.
pub fn decode_return(
    format: WireFormat,
    ret: Option<Scalar>,
    bytes: &[u8],
) -> Result<Option<Value>, DecodingError> {
    if bytes.is_empty() {
        return Ok(None);
    }
    match ret {
        Some(scalar) => decode_value(format, scalar, bytes).map(Some),
        None => Err(DecodingError::Length {
            expected: 0,
            got: bytes.len(),
        }),
    }
}
