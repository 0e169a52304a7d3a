//! Access event records

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Slot id rendered for events that involve no register (literal stores)
pub const NO_REGISTER: i32 = -1;

/// Index of one slot in the register pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(u8);

impl SlotId {
    /// Creates a slot id from a raw pool index
    pub fn new(index: u8) -> Self {
        SlotId(index)
    }

    /// Returns the pool index of this slot
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of memory access
///
/// Serialized as its numeric tag. Tag `0` is reserved for "unknown" and is
/// rejected, as is anything above `3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum AccessKind {
    /// Load from memory into a register
    Read = 1,
    /// Store into memory
    Write = 2,
    /// Read-modify-write of one location
    ReadWrite = 3,
}

impl AccessKind {
    /// Decodes a raw kind tag
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            1 => Ok(AccessKind::Read),
            2 => Ok(AccessKind::Write),
            3 => Ok(AccessKind::ReadWrite),
            _ => Err(Error::UnknownAccessKind { tag }),
        }
    }

    /// Returns the raw kind tag
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Returns the operation letter used in trace lines
    pub fn trace_code(self) -> char {
        match self {
            AccessKind::Read => 'L',
            AccessKind::Write => 'S',
            AccessKind::ReadWrite => 'M',
        }
    }
}

impl TryFrom<u8> for AccessKind {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self> {
        AccessKind::from_tag(tag)
    }
}

impl From<AccessKind> for u8 {
    fn from(kind: AccessKind) -> u8 {
        kind.tag()
    }
}

/// One recorded memory access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEvent {
    /// Read, write or read-modify-write
    pub kind: AccessKind,
    /// Raw byte address that was accessed
    pub address: u64,
    /// Register involved, `None` for literal stores
    pub slot: Option<SlotId>,
}

impl AccessEvent {
    /// Load of `address` into the register holding `slot`
    pub fn read(address: u64, slot: SlotId) -> Self {
        AccessEvent {
            kind: AccessKind::Read,
            address,
            slot: Some(slot),
        }
    }

    /// Store to `address`, from a register or from a literal when `slot` is `None`
    pub fn write(address: u64, slot: Option<SlotId>) -> Self {
        AccessEvent {
            kind: AccessKind::Write,
            address,
            slot,
        }
    }

    /// Builds an event from its raw parts, validating the kind tag
    pub fn from_raw(tag: u8, address: u64, slot: Option<SlotId>) -> Result<Self> {
        Ok(AccessEvent {
            kind: AccessKind::from_tag(tag)?,
            address,
            slot,
        })
    }

    /// Slot id as written in trace lines
    pub fn slot_code(&self) -> i32 {
        self.slot.map_or(NO_REGISTER, |slot| slot.index() as i32)
    }
}
