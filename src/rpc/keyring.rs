//! Keyring: the ordered signature table shared by host and peer.
//!
//! The opcode of an operation is its index in the table. Both ends load
//! the same keyring before any packet is exchanged: the host to build
//! [`FunctionKey`]s, the peer to size its registry and bind handlers.
//!
//! A keyring is a plain value. It can be built in code or loaded from a
//! JSON or postcard manifest produced by whatever tool extracts the
//! signatures from the peer's native function table.

use serde::{Deserialize, Serialize};

use super::action::Action;
use super::codec::Value;
use super::key::{FunctionKey, Signature};
use super::registry::MAX_OPCODES;
use crate::config::WireFormat;
use crate::error::{Error, Result};

/// Ordered signature table; the opcode of an operation is its index.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Keyring {
    #[serde(default)]
    format: WireFormat,
    functions: Vec<Signature>,
}

impl Keyring {
    pub fn new(format: WireFormat, functions: Vec<Signature>) -> Result<Self> {
        let keyring = Self { format, functions };
        keyring.validate()?;
        Ok(keyring)
    }

    fn validate(&self) -> Result<()> {
        if self.functions.len() > MAX_OPCODES {
            return Err(Error::Manifest("more operations than opcodes"));
        }
        // Hosts look keys up by name.
        for (i, f) in self.functions.iter().enumerate() {
            if self.functions[..i].iter().any(|g| g.name == f.name) {
                return Err(Error::Manifest("duplicate operation name"));
            }
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let keyring: Self =
            serde_json::from_str(json).map_err(|_| Error::Manifest("malformed JSON manifest"))?;
        keyring.validate()?;
        Ok(keyring)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|_| Error::Manifest("JSON serialisation failed"))
    }

    pub fn from_postcard(bytes: &[u8]) -> Result<Self> {
        let keyring: Self = postcard::from_bytes(bytes)
            .map_err(|_| Error::Manifest("malformed postcard manifest"))?;
        keyring.validate()?;
        Ok(keyring)
    }

    pub fn to_postcard(&self) -> Result<Vec<u8>> {
        postcard::to_allocvec(self).map_err(|_| Error::Manifest("postcard serialisation failed"))
    }

    pub fn format(&self) -> WireFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.functions
    }

    pub fn signature(&self, opcode: u8) -> Option<&Signature> {
        self.functions.get(usize::from(opcode))
    }

    pub fn opcode_of(&self, name: &str) -> Option<u8> {
        self.functions
            .iter()
            .position(|sig| sig.name.as_str() == name)
            .map(|i| i as u8)
    }

    pub fn key(&self, opcode: u8) -> Option<FunctionKey> {
        self.signature(opcode)
            .map(|sig| FunctionKey::new(opcode, sig.clone(), self.format))
    }

    pub fn key_by_name(&self, name: &str) -> Option<FunctionKey> {
        self.opcode_of(name).and_then(|opcode| self.key(opcode))
    }

    /// Iterate over every key, in opcode order.
    pub fn keys(&self) -> impl Iterator<Item = FunctionKey> + '_ {
        (0..self.functions.len()).filter_map(|i| self.key(i as u8))
    }

    /// Bind `f` to the signature at `opcode`.
    pub fn action<F>(&self, opcode: u8, f: F) -> Result<Action<F>>
    where
        F: FnMut(&[Value]) -> Option<Value> + Send,
    {
        let sig = self.signature(opcode).ok_or(Error::UnknownOpcode(opcode))?;
        Ok(Action::new(sig.clone(), self.format, f))
    }

    pub fn max_argument_width(&self) -> usize {
        self.functions
            .iter()
            .map(Signature::argument_width)
            .max()
            .unwrap_or(0)
    }

    pub fn max_return_width(&self) -> usize {
        self.functions
            .iter()
            .map(Signature::return_width)
            .max()
            .unwrap_or(0)
    }
}
