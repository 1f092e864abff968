//! Operation signatures and host-side function keys.
//!
//! A [`Signature`] is the static description of one remote operation: the
//! ordered parameter types and the return type. A [`FunctionKey`] binds a
//! signature to its opcode and wire format; it is all the host needs to
//! build a request packet and read the reply.

use serde::{Deserialize, Serialize};

use super::codec::{self, Scalar, Value};
use crate::config::WireFormat;
use crate::error::{DecodingError, EncodingError, Error, Result};

/// Maximum number of parameters of one operation.
pub const MAX_PARAMS: usize = 16;

/// Maximum length of an operation name, in bytes.
pub const MAX_NAME_LEN: usize = 64;

/// Parameter and return layout of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub name: heapless::String<MAX_NAME_LEN>,
    #[serde(default)]
    pub params: heapless::Vec<Scalar, MAX_PARAMS>,
    /// `None` for operations that return nothing.
    #[serde(default)]
    pub ret: Option<Scalar>,
}

impl Signature {
    pub fn new(name: &str, params: &[Scalar], ret: Option<Scalar>) -> Result<Self> {
        let name = heapless::String::try_from(name)
            .map_err(|()| Error::Manifest("operation name too long"))?;
        let params = heapless::Vec::from_slice(params)
            .map_err(|()| Error::Manifest("too many parameters"))?;
        Ok(Self { name, params, ret })
    }

    /// Sum of the parameter widths.
    pub fn argument_width(&self) -> usize {
        codec::layout_width(&self.params)
    }

    /// Width of the return value, 0 for void operations.
    pub fn return_width(&self) -> usize {
        self.ret.map_or(0, Scalar::width)
    }

    /// Length of a request packet: opcode plus arguments.
    pub fn request_len(&self) -> usize {
        1 + self.argument_width()
    }
}

/// Typed handle for one remote operation.
///
/// Immutable and cheap to clone; one key per operation can be shared by
/// every caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionKey {
    opcode: u8,
    signature: Signature,
    format: WireFormat,
}

impl FunctionKey {
    pub fn new(opcode: u8, signature: Signature, format: WireFormat) -> Self {
        Self {
            opcode,
            signature,
            format,
        }
    }

    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn format(&self) -> WireFormat {
        self.format
    }

    /// Length of the request packet this key builds.
    pub fn payload_len(&self) -> usize {
        self.signature.request_len()
    }

    /// Length of the response packet this key expects.
    pub fn response_len(&self) -> usize {
        self.signature.return_width()
    }

    /// Write the request packet into `out` without allocating.
    ///
    /// Returns the number of bytes written.
    pub fn encode_into(
        &self,
        args: &[Value],
        out: &mut [u8],
    ) -> core::result::Result<usize, EncodingError> {
        let needed = self.payload_len();
        if out.len() < needed {
            return Err(EncodingError::BufferTooSmall {
                needed,
                available: out.len(),
            });
        }
        out[0] = self.opcode;
        let n = codec::encode_args(self.format, &self.signature.params, args, &mut out[1..])?;
        Ok(1 + n)
    }

    /// Build the request packet: opcode byte followed by the arguments.
    pub fn encode(&self, args: &[Value]) -> core::result::Result<Vec<u8>, EncodingError> {
        let mut packet = vec![0u8; self.payload_len()];
        let n = self.encode_into(args, &mut packet)?;
        packet.truncate(n);
        Ok(packet)
    }

    /// Read the reply; `None` is the void sentinel.
    pub fn decode(&self, bytes: &[u8]) -> core::result::Result<Option<Value>, DecodingError> {
        codec::decode_return(self.format, self.signature.ret, bytes)
    }
}
