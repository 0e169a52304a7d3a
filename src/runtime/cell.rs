//! Memory cells: the only path between registers and memory

use std::fmt;

use super::register::Register;
use super::session::Session;
use super::Word;
use crate::error::{Error, Result};
use crate::trace::{AccessEvent, SlotId};

/// Transient view of one memory location
///
/// Produced by [`Pointer::deref`](super::Pointer::deref) and
/// [`Pointer::index`](super::Pointer::index). A cell owns nothing and cannot be
/// cloned. Loads go through [`load`](Self::load) or
/// [`Register::load_from`], stores through [`store`](Self::store); each one is
/// recorded in the session's access log. Cells are not [`Operand`](super::Operand)s,
/// so arithmetic on memory without loading it first does not compile.
pub struct MemoryCell<'s> {
    session: &'s Session,
    address: u64,
}

/// Right-hand side of a store
#[derive(Debug)]
pub enum StoreSource<'a, 's> {
    /// Immediate value; logged without a register
    Literal(Word),
    /// Value of a register; logged with its slot
    Register(&'a Register<'s>),
    /// Another memory cell; always rejected
    Cell(&'a MemoryCell<'s>),
}

impl<'a, 's> From<Word> for StoreSource<'a, 's> {
    fn from(value: Word) -> Self {
        StoreSource::Literal(value)
    }
}

impl<'a, 's> From<&'a Register<'s>> for StoreSource<'a, 's> {
    fn from(register: &'a Register<'s>) -> Self {
        StoreSource::Register(register)
    }
}

impl<'a, 's> From<&'a MemoryCell<'s>> for StoreSource<'a, 's> {
    fn from(cell: &'a MemoryCell<'s>) -> Self {
        StoreSource::Cell(cell)
    }
}

impl<'s> MemoryCell<'s> {
    pub(crate) fn new(session: &'s Session, address: u64) -> Self {
        MemoryCell { session, address }
    }

    /// Raw address of the cell
    pub fn address(&self) -> u64 {
        self.address
    }

    /// Address of the cell in the reporting space
    pub fn virtual_address(&self) -> u64 {
        self.session.virtual_address(self.address)
    }

    /// Loads the cell into a fresh register, recording a read
    pub fn load(&self) -> Result<Register<'s>> {
        Register::load(self)
    }

    /// Stores a literal or a register's value, recording a write
    ///
    /// Returns the stored value. Storing another cell fails with
    /// [`Error::DirectMemoryCopyForbidden`], and storing a register of another
    /// session with [`Error::ForeignHandle`]; both leave memory and log untouched.
    pub fn store<'a>(&self, source: impl Into<StoreSource<'a, 's>>) -> Result<Word>
    where
        's: 'a,
    {
        let (value, slot) = match source.into() {
            StoreSource::Literal(value) => (value, None),
            StoreSource::Register(register) => {
                let (value, slot) = register.store_parts(self.session)?;
                (value, Some(slot))
            }
            StoreSource::Cell(other) => {
                tracing::warn!(
                    "rejected memory-to-memory copy {:#x} -> {:#x}",
                    other.address,
                    self.address
                );
                return Err(Error::DirectMemoryCopyForbidden);
            }
        };

        self.session.write_word(self.address, value);
        self.session.record(AccessEvent::write(self.address, slot));
        Ok(value)
    }

    pub(crate) fn session(&self) -> &'s Session {
        self.session
    }

    /// Reads the cell on behalf of the register holding `slot`
    pub(crate) fn traced_read(&self, slot: SlotId) -> Word {
        let value = self.session.read_word(self.address);
        self.session.record(AccessEvent::read(self.address, slot));
        value
    }
}

/// Shows the stored value without recording an access
impl fmt::Display for MemoryCell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.session.read_word(self.address))
    }
}

impl fmt::Debug for MemoryCell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCell")
            .field("address", &format_args!("{:#x}", self.address))
            .finish()
    }
}
