//! Access tracing for the register runtime
//!
//! Every load and store that passes through a [`MemoryCell`](crate::runtime::MemoryCell)
//! becomes an [`AccessEvent`] appended to the session's [`AccessLog`]. The log is
//! consumed by external tooling, usually through the line format produced by
//! [`format_event`]:
//!
//! ```text
//! <op> <hex-address>,<size> <slot-id>
//! ```
//!
//! `op` is `L`, `S` or `M`; the address is the virtual address computed by the
//! session's [`AddressMapping`]; `slot-id` is `-1` for stores of literals.

mod event;
mod format;
mod log;

pub use event::{AccessEvent, AccessKind, SlotId, NO_REGISTER};
pub use format::{format_event, write_trace, AddressMapping};
pub use log::{AccessLog, UsageMeter};
