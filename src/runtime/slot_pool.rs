//! Fixed-capacity register slot bitmap

use super::REGISTER_CAPACITY;
use crate::error::{Error, Result};
use crate::trace::{SlotId, UsageMeter};

/// Bitmap of occupied register slots plus occupancy counters
///
/// Allocation always hands out the lowest free index, so a slot freed early is
/// the first one reused.
#[derive(Debug, Clone, Default)]
pub struct SlotPool {
    /// Bit `i` set means slot `i` is owned by an active handle
    occupied: u64,
    usage: UsageMeter,
}

impl SlotPool {
    /// Creates a pool with every slot free
    pub fn new() -> Self {
        SlotPool::default()
    }

    /// Claims the lowest free slot
    pub fn allocate(&mut self) -> Result<SlotId> {
        let index = (!self.occupied).trailing_zeros() as usize;
        if index >= REGISTER_CAPACITY {
            tracing::warn!(
                "register pool exhausted ({} slots held)",
                self.usage.current()
            );
            return Err(Error::ResourceExhausted {
                capacity: REGISTER_CAPACITY,
            });
        }

        self.occupied |= 1u64 << index;
        self.usage.acquire();
        tracing::trace!("allocate reg: {}", index);
        Ok(SlotId::new(index as u8))
    }

    /// Returns a slot to the pool
    ///
    /// Releasing a free or out-of-range slot is a caller bug; it is logged and
    /// ignored so the counters stay consistent with the bitmap.
    pub fn release(&mut self, slot: SlotId) {
        if !self.is_occupied(slot) {
            tracing::warn!("release of free slot {} ignored", slot);
            return;
        }

        self.occupied &= !(1u64 << slot.index());
        self.usage.release();
        tracing::trace!("free reg: {}", slot);
    }

    /// Returns true if `slot` is currently owned
    pub fn is_occupied(&self, slot: SlotId) -> bool {
        slot.index() < REGISTER_CAPACITY && self.occupied & (1u64 << slot.index()) != 0
    }

    /// Occupied slot count
    pub fn current(&self) -> usize {
        self.usage.current()
    }

    /// Highest occupied slot count seen
    pub fn peak(&self) -> usize {
        self.usage.peak()
    }

    /// Current and peak occupancy together
    pub fn usage(&self) -> UsageMeter {
        self.usage
    }
}
