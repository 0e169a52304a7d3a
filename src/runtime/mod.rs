//! Register pool, handles and traced memory
//!
//! A [`Session`] owns all shared state: the slot pool, the access log, the
//! simulated memory and the address mapping. Handles borrow the session for
//! their whole lifetime and give their slot back on drop.
//!
//! ```text
//! Session ──► Register ──┐
//!    │                   ├─► SlotPool (36 slots, current/peak)
//!    └──────► Pointer ───┘
//!                │ deref / index
//!                ▼
//!            MemoryCell ──► load / store ──► AccessLog
//! ```

mod cell;
mod memory;
mod operand;
mod owner;
mod pointer;
mod register;
mod session;
mod slot_pool;

pub use cell::{MemoryCell, StoreSource};
pub use memory::{Memory, DEFAULT_MEMORY_BASE};
pub use operand::{ArithOp, CmpOp, Operand};
pub use owner::HandleState;
pub use pointer::Pointer;
pub use register::Register;
pub use session::{Session, SessionConfig};
pub use slot_pool::SlotPool;

/// Scalar held by registers and stored in memory
pub type Word = i32;

/// Size in bytes of one memory element
pub const ELEMENT_SIZE: usize = std::mem::size_of::<Word>();

/// Number of register slots in every session
pub const REGISTER_CAPACITY: usize = 36;
