//! Function registry: an opcode-indexed table of native handlers.
//!
//! The table length is fixed when the registry is built. Slots are
//! populated once; afterwards only the handler of a populated slot may
//! change (via [`Registry::replace`]), never its widths, so the wire
//! contract seen by the host stays the same.

use core::fmt;

use log::info;

use super::action::Action;
use super::codec::Value;
use crate::error::{Error, Result};

/// Number of distinct single-byte opcodes.
pub const MAX_OPCODES: usize = 256;

/// A native operation bound to an opcode.
///
/// `args` always holds exactly the argument width of the slot and `out`
/// exactly its return width.
pub trait Handler: Send {
    /// Run the operation on `args`, writing the return bytes into `out`.
    fn call(&mut self, args: &[u8], out: &mut [u8]) -> Result<()>;
}

impl<F> Handler for F
where
    F: FnMut(&[u8], &mut [u8]) + Send,
{
    fn call(&mut self, args: &[u8], out: &mut [u8]) -> Result<()> {
        self(args, out);
        Ok(())
    }
}

/// Widths and handler of one opcode.
pub struct Descriptor {
    argument_width: usize,
    return_width: usize,
    handler: Box<dyn Handler>,
}

impl Descriptor {
    pub fn new(
        argument_width: usize,
        return_width: usize,
        handler: impl Handler + 'static,
    ) -> Self {
        Self {
            argument_width,
            return_width,
            handler: Box::new(handler),
        }
    }

    /// Descriptor whose widths come from the action's signature.
    pub fn from_action<F>(action: Action<F>) -> Self
    where
        F: FnMut(&[Value]) -> Option<Value> + Send + 'static,
    {
        let sig = action.signature();
        Self::new(sig.argument_width(), sig.return_width(), action)
    }

    pub fn argument_width(&self) -> usize {
        self.argument_width
    }

    pub fn return_width(&self) -> usize {
        self.return_width
    }

    /// Length of a request packet for this operation.
    pub fn request_len(&self) -> usize {
        1 + self.argument_width
    }

    pub(crate) fn invoke(&mut self, args: &[u8], out: &mut [u8]) -> Result<()> {
        self.handler.call(args, out)
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("argument_width", &self.argument_width)
            .field("return_width", &self.return_width)
            .finish_non_exhaustive()
    }
}

/// Opcode-indexed table of descriptors.
#[derive(Debug)]
pub struct Registry {
    slots: Vec<Option<Descriptor>>,
}

impl Registry {
    /// Empty table with `capacity` opcodes, `[0, capacity)`.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity > MAX_OPCODES {
            return Err(Error::OutOfRange {
                opcode: capacity - 1,
                capacity: MAX_OPCODES,
            });
        }
        Ok(Self {
            slots: (0..capacity).map(|_| None).collect(),
        })
    }

    /// Table populated from an ordered list: entry `i` gets opcode `i`.
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = Descriptor>) -> Result<Self> {
        let slots: Vec<_> = descriptors.into_iter().map(Some).collect();
        if slots.len() > MAX_OPCODES {
            return Err(Error::OutOfRange {
                opcode: slots.len() - 1,
                capacity: MAX_OPCODES,
            });
        }
        Ok(Self { slots })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of populated opcodes.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot_mut(&mut self, opcode: u8) -> Result<&mut Option<Descriptor>> {
        let capacity = self.slots.len();
        self.slots
            .get_mut(usize::from(opcode))
            .ok_or(Error::OutOfRange {
                opcode: usize::from(opcode),
                capacity,
            })
    }

    pub fn register(
        &mut self,
        opcode: u8,
        argument_width: usize,
        return_width: usize,
        handler: impl Handler + 'static,
    ) -> Result<()> {
        self.register_descriptor(opcode, Descriptor::new(argument_width, return_width, handler))
    }

    pub fn register_action<F>(&mut self, opcode: u8, action: Action<F>) -> Result<()>
    where
        F: FnMut(&[Value]) -> Option<Value> + Send + 'static,
    {
        self.register_descriptor(opcode, Descriptor::from_action(action))
    }

    pub fn register_descriptor(&mut self, opcode: u8, descriptor: Descriptor) -> Result<()> {
        let slot = self.slot_mut(opcode)?;
        if slot.is_some() {
            return Err(Error::DuplicateOpcode(opcode));
        }
        *slot = Some(descriptor);
        Ok(())
    }

    /// Swap the handler of a registered opcode, keeping its widths.
    pub fn replace(&mut self, opcode: u8, handler: impl Handler + 'static) -> Result<()> {
        let descriptor = self
            .lookup_mut(opcode)
            .ok_or(Error::UnknownOpcode(opcode))?;
        descriptor.handler = Box::new(handler);
        info!("REGISTRY: handler for opcode 0x{:02x} replaced", opcode);
        Ok(())
    }

    pub fn lookup(&self, opcode: u8) -> Option<&Descriptor> {
        self.slots.get(usize::from(opcode))?.as_ref()
    }

    pub(crate) fn lookup_mut(&mut self, opcode: u8) -> Option<&mut Descriptor> {
        self.slots.get_mut(usize::from(opcode))?.as_mut()
    }

    /// Populated opcodes with their descriptors, in opcode order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Descriptor)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|d| (i as u8, d)))
    }

    /// Longest request packet any populated opcode accepts (1 when empty).
    pub fn max_request_len(&self) -> usize {
        self.iter()
            .map(|(_, d)| d.request_len())
            .max()
            .unwrap_or(1)
    }
}
