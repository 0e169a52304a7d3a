//! Error types for the regtrace runtime

use thiserror::Error;

/// Runtime misuse and export errors
///
/// Every misuse variant signals a logic error in the instrumented code. None of
/// them are transient and none should be retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Resource errors
    /// No free register slot is left in the pool
    ///
    /// **Triggered by:** Creating a register or pointer while every slot is held
    /// **Example:** Keeping 36 registers alive and asking for a 37th
    /// **Prevention:** Let temporaries drop before allocating more handles
    #[error("No more available registers (capacity: {capacity})")]
    ResourceExhausted {
        /// Fixed capacity of the slot pool
        capacity: usize,
    },

    // Handle errors
    /// Operation attempted on a handle that has been moved out of
    ///
    /// **Triggered by:** Reading, writing, comparing or moving an inactive handle
    /// **Example:** `let b = a.take()?; a.value()?`
    /// **Prevention:** Use the handle that received the move
    #[error("Cannot {operation} an inactive register")]
    InvalidHandleUse {
        /// Operation that was rejected
        operation: &'static str,
    },

    /// Memory-to-memory assignment without passing through a register
    ///
    /// **Triggered by:** Storing one memory cell directly into another
    /// **Example:** `p.deref()?.store(&q.deref()?)`
    /// **Prevention:** Load into a register first, then store the register
    #[error("Cannot assign a memory cell to another memory cell directly")]
    DirectMemoryCopyForbidden,

    /// Two handles from different sessions used in one operation
    ///
    /// **Triggered by:** Storing, loading or move-assigning across sessions
    /// **Example:** `a.pointer(buf)?.deref()?.store(&b.register(7)?)`
    /// **Prevention:** Keep every handle of a computation in one session
    #[error("Handle belongs to a different session")]
    ForeignHandle,

    // Memory errors
    /// Simulated address space cannot fit the requested buffer
    ///
    /// **Triggered by:** A memory base or buffer length that overflows 64-bit addresses
    #[error("Cannot allocate a buffer of {len} elements above {next_free:#x}")]
    MemoryExhausted {
        /// Requested element count
        len: usize,
        /// First free raw address at the time of the request
        next_free: u64,
    },

    // Trace errors
    /// Access event carries a kind tag outside the known set
    #[error("Unknown memory access kind tag: {tag}")]
    UnknownAccessKind {
        /// Raw tag value
        tag: u8,
    },

    /// Address mapping changed after a pointer already exists
    ///
    /// **Triggered by:** `set_address_mapping` after the first `Pointer::new`
    /// **Prevention:** Configure the mapping right after allocating buffers
    #[error("Address mapping is locked once a pointer has been created")]
    AddressMappingLocked,

    // External errors
    /// Writing the trace to its sink failed
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON export or config parsing failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Logic error in the instrumented code; abort the computation
    Fatal,
    /// Failure of an external sink that may succeed on another attempt
    Recoverable,
}

impl Error {
    /// Create an inactive-handle error for the named operation
    pub fn inactive(operation: &'static str) -> Self {
        Error::InvalidHandleUse { operation }
    }

    /// Classify error severity
    pub fn classify(&self) -> ErrorSeverity {
        match self {
            Error::Io(_) => ErrorSeverity::Recoverable,
            _ => ErrorSeverity::Fatal,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type for regtrace operations
pub type Result<T> = std::result::Result<T, Error>;
