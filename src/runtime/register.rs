//! Register handles: one scalar plus one owned slot

use std::fmt;
use std::ops::{Add, Div, Mul, Rem, Sub};

use super::cell::MemoryCell;
use super::operand::{ArithOp, CmpOp, Operand};
use super::owner::{HandleState, SlotOwner};
use super::session::Session;
use super::Word;
use crate::error::Result;
use crate::trace::SlotId;

/// Scalar value occupying one register slot
///
/// A register is created active and stays active until [`take`](Self::take) or
/// [`assign_take`](Self::assign_take) moves its slot elsewhere. Every
/// operation on an inactive register fails with
/// [`Error::InvalidHandleUse`](crate::Error::InvalidHandleUse).
///
/// ```rust
/// use regtrace::{Register, Session};
///
/// # fn main() -> regtrace::Result<()> {
/// let session = Session::new();
/// let a = Register::new(&session, 6)?;
/// let b = session.register(7)?;
/// assert_eq!((&a * &b)?, 42);
/// assert_eq!(session.current_register_count(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Register<'s> {
    owner: SlotOwner<'s>,
    value: Word,
}

impl<'s> Register<'s> {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Allocates a register holding `value`
    pub fn new(session: &'s Session, value: Word) -> Result<Self> {
        Ok(Register {
            owner: SlotOwner::acquire(session)?,
            value,
        })
    }

    /// Allocates a register holding zero
    pub fn zero(session: &'s Session) -> Result<Self> {
        Register::new(session, 0)
    }

    /// Loads a memory cell into a fresh register, recording a read
    pub fn load(cell: &MemoryCell<'s>) -> Result<Self> {
        let owner = SlotOwner::acquire(cell.session())?;
        let slot = owner.check("load")?;
        let value = cell.traced_read(slot);
        Ok(Register { owner, value })
    }

    /// Copies this register into a newly allocated slot
    pub fn try_clone(&self) -> Result<Self> {
        self.owner.check("copy")?;
        Register::new(self.owner.session(), self.value)
    }

    /// Moves value and slot into a new register; `self` becomes inactive
    pub fn take(&mut self) -> Result<Self> {
        Ok(Register {
            owner: self.owner.take()?,
            value: self.value,
        })
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Current value
    pub fn value(&self) -> Result<Word> {
        self.owner.check("read")?;
        Ok(self.value)
    }

    /// Slot owned by this register
    pub fn slot(&self) -> Result<SlotId> {
        self.owner.check("read")
    }

    /// Lifecycle state
    pub fn state(&self) -> HandleState {
        self.owner.state()
    }

    /// Returns true while the register owns a slot
    pub fn is_active(&self) -> bool {
        self.state() == HandleState::Active
    }

    /// Debug rendering, e.g. `$3(ACTIVE): 42`
    pub fn info(&self) -> String {
        match self.owner.slot() {
            Some(slot) => format!("${}({}): {}", slot, HandleState::Active, self.value),
            None => format!("$-({})", HandleState::Inactive),
        }
    }

    /// Value and slot for a store through a memory cell of `session`
    pub(crate) fn store_parts(&self, session: &Session) -> Result<(Word, SlotId)> {
        let slot = self.owner.check("store")?;
        self.owner.ensure_same_session(session)?;
        Ok((self.value, slot))
    }

    // =========================================================================
    // Assignment
    // =========================================================================

    /// Overwrites the value with a literal
    pub fn set(&mut self, value: Word) -> Result<()> {
        self.owner.check("assign")?;
        self.value = value;
        Ok(())
    }

    /// Copies another register's value; both keep their slots
    pub fn assign(&mut self, other: &Register<'_>) -> Result<()> {
        self.owner.check("assign")?;
        self.value = other.value()?;
        Ok(())
    }

    /// Moves another register into this one
    ///
    /// This register gives up its own slot and inherits `other`'s, which
    /// becomes inactive. Both registers must come from the same session.
    pub fn assign_take(&mut self, other: &mut Register<'s>) -> Result<()> {
        self.owner.check("assign")?;
        other.owner.ensure_same_session(self.owner.session())?;
        self.owner = other.owner.take()?;
        self.value = other.value;
        Ok(())
    }

    /// Loads a memory cell into this register, recording a read tagged with its slot
    pub fn load_from(&mut self, cell: &MemoryCell<'s>) -> Result<()> {
        let slot = self.owner.check("assign")?;
        self.owner.ensure_same_session(cell.session())?;
        self.value = cell.traced_read(slot);
        Ok(())
    }

    // =========================================================================
    // Arithmetic and comparison
    // =========================================================================

    /// `self <op> rhs` without modifying `self`
    pub fn compute(&self, op: ArithOp, rhs: impl Operand) -> Result<Word> {
        self.owner.check("compute")?;
        Ok(op.apply(self.value, rhs.operand_value()?))
    }

    /// `self <op>= rhs`, returning the new value
    pub fn update(&mut self, op: ArithOp, rhs: impl Operand) -> Result<Word> {
        self.owner.check("compute")?;
        self.value = op.apply(self.value, rhs.operand_value()?);
        Ok(self.value)
    }

    /// Pre-increment; there is deliberately no post-increment
    pub fn increment(&mut self) -> Result<Word> {
        self.update(ArithOp::Add, 1)
    }

    /// Pre-decrement
    pub fn decrement(&mut self) -> Result<Word> {
        self.update(ArithOp::Sub, 1)
    }

    /// `self <op> rhs`
    pub fn compare(&self, op: CmpOp, rhs: impl Operand) -> Result<bool> {
        self.owner.check("compare")?;
        Ok(op.apply(self.value, rhs.operand_value()?))
    }

    /// `self < rhs`
    pub fn lt(&self, rhs: impl Operand) -> Result<bool> {
        self.compare(CmpOp::Lt, rhs)
    }

    /// `self <= rhs`
    pub fn le(&self, rhs: impl Operand) -> Result<bool> {
        self.compare(CmpOp::Le, rhs)
    }

    /// `self > rhs`
    pub fn gt(&self, rhs: impl Operand) -> Result<bool> {
        self.compare(CmpOp::Gt, rhs)
    }

    /// `self >= rhs`
    pub fn ge(&self, rhs: impl Operand) -> Result<bool> {
        self.compare(CmpOp::Ge, rhs)
    }

    /// `self == rhs`
    pub fn eq_to(&self, rhs: impl Operand) -> Result<bool> {
        self.compare(CmpOp::Eq, rhs)
    }
}

impl Operand for Register<'_> {
    fn operand_value(&self) -> Result<Word> {
        self.value()
    }
}

impl fmt::Display for Register<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_active() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "<inactive>")
        }
    }
}

macro_rules! register_operator {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<'s, R: Operand> $trait<R> for &Register<'s> {
            type Output = Result<Word>;

            fn $method(self, rhs: R) -> Result<Word> {
                self.compute($op, rhs)
            }
        }

        impl<'a, 's> $trait<&'a Register<'s>> for Word {
            type Output = Result<Word>;

            fn $method(self, rhs: &'a Register<'s>) -> Result<Word> {
                Ok($op.apply(self, rhs.operand_value()?))
            }
        }
    };
}

register_operator!(Add, add, ArithOp::Add);
register_operator!(Sub, sub, ArithOp::Sub);
register_operator!(Mul, mul, ArithOp::Mul);
register_operator!(Div, div, ArithOp::Div);
register_operator!(Rem, rem, ArithOp::Rem);
