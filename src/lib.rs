//! # Regtrace - Register and Memory Access Tracing Runtime
//!
//! Regtrace simulates a machine with a small, fixed set of general-purpose
//! registers working over a byte-addressable memory, and records every load
//! and store for later analysis (typically a cache simulator).
//!
//! Test code writes ordinary-looking arithmetic over [`Register`] and
//! [`Pointer`] handles. The runtime enforces register discipline (at most
//! [`REGISTER_CAPACITY`] live handles, no use after move, no memory-to-memory
//! copies) and produces an access trace as a side effect.
//!
//! ## Quick Start
//!
//! ```rust
//! use regtrace::{Register, Session};
//!
//! # fn main() -> regtrace::Result<()> {
//! let session = Session::new();
//! let src = session.load_buffer(&[1, 2, 3, 4])?;
//! let dst = session.allocate_buffer(4)?;
//! session.set_address_mapping(src, 0x1000)?;
//!
//! let from = session.pointer(src)?;
//! let to = session.pointer(dst)?;
//!
//! // Reverse copy, every element passing through a register
//! for i in 0..4 {
//!     let value = Register::load(&from.index(i)?)?;
//!     to.index(3 - i)?.store(&value)?;
//! }
//!
//! assert_eq!(session.read_buffer(dst, 4), vec![4, 3, 2, 1]);
//! assert_eq!(session.event_count(), 8);
//! assert_eq!(session.peak_register_count(), 3);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Session ─┬─ SlotPool    (36 slots, current / peak)
//!          ├─ AccessLog   (ordered Read / Write / ReadWrite events)
//!          ├─ Memory      (sparse words, bump-allocated buffers)
//!          └─ AddressMapping (raw → reported addresses)
//! ```
//!
//! ### Main Components
//!
//! - [`Session`] - Per-run context owning all shared state
//! - [`Register`] - Scalar value owning one slot
//! - [`Pointer`] - Address owning one slot; yields memory cells
//! - [`MemoryCell`] - Non-owning view through which loads and stores are traced
//! - [`AccessEvent`] - One recorded access
//!
//! ## Trace Format
//!
//! [`Session::trace_lines`] renders one line per event:
//!
//! ```text
//! S 100c,4 -1
//! L 100c,4 2
//! ```
//!
//! The operation is `L` (read), `S` (write) or `M` (read-modify-write), the
//! address is hexadecimal in the reporting space, `4` is the element size and
//! the last field is the register slot (`-1` for literal stores).
//!
//! ## Error Handling
//!
//! Misuse is reported at the point of misuse through [`Error`]:
//!
//! ```rust
//! use regtrace::{Error, Session};
//!
//! let session = Session::new();
//! let mut a = session.register(1).unwrap();
//! let b = a.take().unwrap();
//!
//! match a.value() {
//!     Ok(_) => panic!("Should have failed"),
//!     Err(e) => assert_eq!(e, Error::InvalidHandleUse { operation: "read" }),
//! }
//! assert_eq!(b.value().unwrap(), 1);
//! ```

// Allow specific clippy warnings
#![allow(clippy::should_implement_trait)] // lt/le/deref return Result, not bool/&T

/// Version of the regtrace runtime
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod runtime;
pub mod trace;

// Re-export main types
pub use error::{Error, ErrorSeverity, Result};
pub use runtime::{
    ArithOp, CmpOp, HandleState, MemoryCell, Operand, Pointer, Register, Session,
    SessionConfig, StoreSource, Word, ELEMENT_SIZE, REGISTER_CAPACITY,
};
pub use trace::{AccessEvent, AccessKind, AccessLog, AddressMapping, SlotId, UsageMeter};
