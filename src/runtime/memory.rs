//! Sparse word-addressed memory behind the traced cells

use std::collections::HashMap;

use super::{Word, ELEMENT_SIZE};
use crate::error::{Error, Result};

/// Raw address handed to the first buffer of a session
pub const DEFAULT_MEMORY_BASE: u64 = 0x5555_0000;

/// Buffers start on cache-line boundaries
const BUFFER_ALIGN: u64 = 64;

/// Simulated memory keyed by raw byte address
///
/// Buffers are reserved by a bump allocator; nothing is ever freed. No bounds
/// are enforced: a location that was never written reads as zero.
#[derive(Debug, Clone)]
pub struct Memory {
    words: HashMap<u64, Word>,
    /// End of the last buffer; the next one starts at the following boundary
    next_free: u64,
}

impl Memory {
    /// Creates an empty memory whose first buffer lands at `base` rounded up
    pub fn new(base: u64) -> Self {
        Memory {
            words: HashMap::new(),
            next_free: base,
        }
    }

    /// Reserves room for `len` zeroed elements, returning the raw address of element 0
    ///
    /// Fails with [`Error::MemoryExhausted`] when the buffer would run past the
    /// end of the 64-bit address space.
    pub fn allocate(&mut self, len: usize) -> Result<u64> {
        let exhausted = || {
            tracing::warn!(
                "no room for {} elements above {:#x}",
                len,
                self.next_free
            );
            Error::MemoryExhausted {
                len,
                next_free: self.next_free,
            }
        };
        let address = self
            .next_free
            .checked_next_multiple_of(BUFFER_ALIGN)
            .ok_or_else(exhausted)?;
        let end = len
            .max(1)
            .checked_mul(ELEMENT_SIZE)
            .and_then(|size| u64::try_from(size).ok())
            .and_then(|size| address.checked_add(size))
            .ok_or_else(exhausted)?;
        self.next_free = end;
        Ok(address)
    }

    /// Reserves a buffer and fills it with `values`
    pub fn load(&mut self, values: &[Word]) -> Result<u64> {
        let address = self.allocate(values.len())?;
        for (i, value) in values.iter().enumerate() {
            self.write(element_address(address, i), *value);
        }
        Ok(address)
    }

    /// Reads the element at `address`
    pub fn read(&self, address: u64) -> Word {
        self.words.get(&address).copied().unwrap_or(0)
    }

    /// Writes the element at `address`
    pub fn write(&mut self, address: u64, value: Word) {
        self.words.insert(address, value);
    }

    /// Reads `len` consecutive elements starting at `address`
    pub fn read_range(&self, address: u64, len: usize) -> Vec<Word> {
        (0..len)
            .map(|i| self.read(element_address(address, i)))
            .collect()
    }
}

impl Default for Memory {
    fn default() -> Self {
        Memory::new(DEFAULT_MEMORY_BASE)
    }
}

fn element_address(base: u64, index: usize) -> u64 {
    base.wrapping_add((index as u64).wrapping_mul(ELEMENT_SIZE as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffers_do_not_overlap() {
        let mut memory = Memory::default();
        let a = memory.load(&[1, 2, 3]).unwrap();
        let b = memory.allocate(16).unwrap();
        assert_eq!(a, DEFAULT_MEMORY_BASE);
        assert!(b >= a + 3 * ELEMENT_SIZE as u64);
        assert_eq!(b % BUFFER_ALIGN, 0);
        assert_eq!(memory.read_range(a, 3), vec![1, 2, 3]);
        assert_eq!(memory.read_range(b, 2), vec![0, 0]);
    }

    #[test]
    fn test_unwritten_reads_zero() {
        let mut memory = Memory::new(0x1001);
        assert_eq!(memory.allocate(1).unwrap(), 0x1040);
        assert_eq!(memory.read(0xdead_0000), 0);
        memory.write(0xdead_0000, -7);
        assert_eq!(memory.read(0xdead_0000), -7);
    }

    #[test]
    fn test_allocation_near_top_of_address_space() {
        let mut memory = Memory::new(u64::MAX - 8);
        assert_eq!(
            memory.allocate(1),
            Err(Error::MemoryExhausted {
                len: 1,
                next_free: u64::MAX - 8
            })
        );

        let top = u64::MAX - BUFFER_ALIGN + 1;
        let mut memory = Memory::new(top);
        assert_eq!(memory.allocate(4).unwrap(), top);
        assert!(memory.allocate(usize::MAX).is_err());
        assert!(memory.load(&[1]).is_err());
        // element addresses wrap past the top
        assert_eq!(memory.read_range(u64::MAX - 3, 2), vec![0, 0]);
    }
}
