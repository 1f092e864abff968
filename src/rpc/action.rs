//! Typed actions: a native function bound to its signature.
//!
//! An [`Action`] decodes the argument bytes into [`Value`]s, calls the
//! wrapped function and encodes whatever it returns. It implements
//! [`Handler`], so it can sit in a registry slot next to raw byte
//! handlers.

use super::codec::{self, Value};
use super::key::{MAX_PARAMS, Signature};
use super::registry::Handler;
use crate::config::WireFormat;
use crate::error::{EncodingError, Result};

/// A native function bound to its signature and wire format.
pub struct Action<F> {
    signature: Signature,
    format: WireFormat,
    f: F,
}

impl<F> Action<F>
where
    F: FnMut(&[Value]) -> Option<Value> + Send,
{
    pub fn new(signature: Signature, format: WireFormat, f: F) -> Self {
        Self {
            signature,
            format,
            f,
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

impl<F> Handler for Action<F>
where
    F: FnMut(&[Value]) -> Option<Value> + Send,
{
    fn call(&mut self, args: &[u8], out: &mut [u8]) -> Result<()> {
        let mut values = [Value::Unsigned(0); MAX_PARAMS];
        let n = codec::decode_args(self.format, &self.signature.params, args, &mut values)?;

        match (self.signature.ret, (self.f)(&values[..n])) {
            (None, None) => Ok(()),
            (Some(scalar), Some(value)) => {
                codec::encode_value(self.format, scalar, value, out)?;
                Ok(())
            }
            _ => Err(EncodingError::ReturnMismatch.into()),
        }
    }
}
