//! Pointer handles over the session's memory

use std::fmt;
use std::ops::{Add, Sub};

use super::cell::MemoryCell;
use super::operand::Operand;
use super::owner::{HandleState, SlotOwner};
use super::session::Session;
use super::{Word, ELEMENT_SIZE};
use crate::error::Result;
use crate::trace::SlotId;

/// Address into session memory that also occupies one register slot
///
/// The slot never holds the address; it only makes pointer lifetimes count
/// against the same pool as registers. Offsets are in elements, not bytes.
///
/// ```rust
/// use regtrace::Session;
///
/// # fn main() -> regtrace::Result<()> {
/// let session = Session::new();
/// let buf = session.load_buffer(&[10, 20, 30, 40])?;
/// session.set_address_mapping(buf, 0x1000)?;
///
/// let p = session.pointer(buf)?;
/// let r = (&p + 3)?.deref()?.load()?;
/// assert_eq!(r.value()?, 40);
/// assert_eq!(session.trace_lines(), vec![format!("L 100c,4 {}", r.slot()?)]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Pointer<'s> {
    owner: SlotOwner<'s>,
    address: u64,
}

impl<'s> Pointer<'s> {
    /// Allocates a pointer to the raw `address`
    ///
    /// Locks the session's address mapping.
    pub fn new(session: &'s Session, address: u64) -> Result<Self> {
        let owner = SlotOwner::acquire(session)?;
        session.lock_mapping();
        Ok(Pointer { owner, address })
    }

    /// Copies this pointer into a newly allocated slot
    pub fn try_clone(&self) -> Result<Self> {
        self.owner.check("copy")?;
        Pointer::new(self.owner.session(), self.address)
    }

    /// Moves address and slot into a new pointer; `self` becomes inactive
    pub fn take(&mut self) -> Result<Self> {
        Ok(Pointer {
            owner: self.owner.take()?,
            address: self.address,
        })
    }

    // =========================================================================
    // Assignment
    // =========================================================================

    /// Copies another pointer's address; both keep their slots (`p = q`)
    pub fn assign(&mut self, other: &Pointer<'_>) -> Result<()> {
        self.owner.check("assign")?;
        let address = other.address()?;
        self.owner.ensure_same_session(other.owner.session())?;
        self.address = address;
        Ok(())
    }

    /// Moves another pointer into this one
    ///
    /// This pointer gives up its own slot and inherits `other`'s, which
    /// becomes inactive.
    pub fn assign_take(&mut self, other: &mut Pointer<'s>) -> Result<()> {
        self.owner.check("assign")?;
        other.owner.ensure_same_session(self.owner.session())?;
        self.owner = other.owner.take()?;
        self.address = other.address;
        Ok(())
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Raw address
    pub fn address(&self) -> Result<u64> {
        self.owner.check("read")?;
        Ok(self.address)
    }

    /// Address in the reporting space
    pub fn virtual_address(&self) -> Result<u64> {
        Ok(self.owner.session().virtual_address(self.address()?))
    }

    /// Slot owned by this pointer
    pub fn slot(&self) -> Result<SlotId> {
        self.owner.check("read")
    }

    /// Lifecycle state
    pub fn state(&self) -> HandleState {
        self.owner.state()
    }

    /// Returns true while the pointer owns a slot
    pub fn is_active(&self) -> bool {
        self.state() == HandleState::Active
    }

    /// Debug rendering, e.g. `$0(ACTIVE): 4108` with the virtual address in decimal
    pub fn info(&self) -> String {
        match self.owner.slot() {
            Some(slot) => format!(
                "${}({}): {}",
                slot,
                HandleState::Active,
                self.owner.session().virtual_address(self.address)
            ),
            None => format!("$-({})", HandleState::Inactive),
        }
    }

    // =========================================================================
    // Dereference
    // =========================================================================

    /// Cell at the pointed-to address
    pub fn deref(&self) -> Result<MemoryCell<'s>> {
        self.owner.check("dereference")?;
        Ok(MemoryCell::new(self.owner.session(), self.address))
    }

    /// Cell `offset` elements past the pointed-to address
    pub fn index(&self, offset: impl Operand) -> Result<MemoryCell<'s>> {
        self.owner.check("dereference")?;
        let address = displace(self.address, offset.operand_value()?);
        Ok(MemoryCell::new(self.owner.session(), address))
    }

    // =========================================================================
    // Address arithmetic
    // =========================================================================

    /// New pointer `offset` elements forward (`p + n`), taking its own slot
    pub fn offset(&self, offset: impl Operand) -> Result<Pointer<'s>> {
        self.owner.check("compute")?;
        let address = displace(self.address, offset.operand_value()?);
        Pointer::new(self.owner.session(), address)
    }

    /// New pointer `offset` elements backward (`p - n`), taking its own slot
    pub fn offset_back(&self, offset: impl Operand) -> Result<Pointer<'s>> {
        self.owner.check("compute")?;
        let address = displace(self.address, offset.operand_value()?.wrapping_neg());
        Pointer::new(self.owner.session(), address)
    }

    /// `p += n`
    pub fn advance(&mut self, offset: impl Operand) -> Result<&mut Self> {
        self.owner.check("compute")?;
        self.address = displace(self.address, offset.operand_value()?);
        Ok(self)
    }

    /// `p -= n`
    pub fn retreat(&mut self, offset: impl Operand) -> Result<&mut Self> {
        self.owner.check("compute")?;
        self.address = displace(self.address, offset.operand_value()?.wrapping_neg());
        Ok(self)
    }

    /// `++p`; post-increment is intentionally unsupported
    pub fn increment(&mut self) -> Result<&mut Self> {
        self.advance(1)
    }

    /// `--p`
    pub fn decrement(&mut self) -> Result<&mut Self> {
        self.retreat(1)
    }

    /// Element count between two pointers (`self - other`)
    pub fn distance(&self, other: &Pointer<'_>) -> Result<i64> {
        let (from, to) = (self.address()?, other.address()?);
        self.owner.ensure_same_session(other.owner.session())?;
        let bytes = from.wrapping_sub(to) as i64;
        Ok(bytes / ELEMENT_SIZE as i64)
    }
}

/// Renders the virtual address, e.g. `0x100c`
impl fmt::Display for Pointer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.virtual_address() {
            Ok(address) => write!(f, "{:#x}", address),
            Err(_) => write!(f, "<inactive>"),
        }
    }
}

impl<'s, R: Operand> Add<R> for &Pointer<'s> {
    type Output = Result<Pointer<'s>>;

    fn add(self, offset: R) -> Result<Pointer<'s>> {
        self.offset(offset)
    }
}

impl<'s, R: Operand> Sub<R> for &Pointer<'s> {
    type Output = Result<Pointer<'s>>;

    fn sub(self, offset: R) -> Result<Pointer<'s>> {
        self.offset_back(offset)
    }
}

fn displace(address: u64, elements: Word) -> u64 {
    address.wrapping_add_signed(elements as i64 * ELEMENT_SIZE as i64)
}
