//! Trace line rendering and virtual-address mapping

use serde::{Deserialize, Serialize};
use std::io::Write;

use super::event::AccessEvent;
use crate::error::Result;
use crate::runtime::ELEMENT_SIZE;

/// Translation from raw addresses to reported addresses
///
/// Reported address = `(raw - base_address) + base_offset`. Two runs over
/// buffers placed at different raw addresses produce identical traces as long
/// as each run maps its buffer base to the same `base_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddressMapping {
    /// Raw address that maps to `base_offset`
    pub base_address: u64,
    /// Reported address of `base_address`
    pub base_offset: u64,
}

impl AddressMapping {
    /// Creates a mapping
    pub fn new(base_address: u64, base_offset: u64) -> Self {
        AddressMapping {
            base_address,
            base_offset,
        }
    }

    /// Maps a raw address into the reporting space
    pub fn virtual_address(&self, raw: u64) -> u64 {
        raw.wrapping_sub(self.base_address)
            .wrapping_add(self.base_offset)
    }
}

/// Renders one event as `<op> <hex-address>,<size> <slot-id>`
pub fn format_event(event: &AccessEvent, mapping: &AddressMapping) -> String {
    format!(
        "{} {:x},{} {}",
        event.kind.trace_code(),
        mapping.virtual_address(event.address),
        ELEMENT_SIZE,
        event.slot_code()
    )
}

/// Writes every event as one trace line, in log order
pub fn write_trace<W: Write>(
    writer: &mut W,
    events: &[AccessEvent],
    mapping: &AddressMapping,
) -> Result<()> {
    for event in events {
        writeln!(writer, "{}", format_event(event, mapping))?;
    }
    writer.flush()?;
    Ok(())
}
