//! Session context owning all per-run state

use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::io::Write;

use super::memory::{Memory, DEFAULT_MEMORY_BASE};
use super::pointer::Pointer;
use super::register::Register;
use super::slot_pool::SlotPool;
use super::Word;
use crate::error::{Error, Result};
use crate::trace::{self, AccessEvent, AccessLog, AddressMapping, SlotId, UsageMeter};

/// Session options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Raw address of the first buffer the session hands out
    pub memory_base: u64,
    /// Raw address reported as `base_offset`; defaults to `memory_base`
    pub base_address: Option<u64>,
    /// Reported address of `base_address`
    pub base_offset: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            memory_base: DEFAULT_MEMORY_BASE,
            base_address: None,
            base_offset: 0,
        }
    }
}

impl SessionConfig {
    /// Parses a config from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn mapping(&self) -> AddressMapping {
        AddressMapping::new(
            self.base_address.unwrap_or(self.memory_base),
            self.base_offset,
        )
    }
}

/// One independent simulation run
///
/// Holds the register slot pool, the access log, the simulated memory and the
/// address mapping. Handles borrow the session, so every handle is dropped
/// before the session is. A session is not `Sync`; run parallel simulations
/// with one session per thread.
#[derive(Debug)]
pub struct Session {
    pool: RefCell<SlotPool>,
    log: RefCell<AccessLog>,
    memory: RefCell<Memory>,
    mapping: Cell<AddressMapping>,
    /// Set once the first pointer exists
    mapping_locked: Cell<bool>,
}

impl Session {
    /// Creates a session with default options
    pub fn new() -> Self {
        Session::with_config(SessionConfig::default())
    }

    /// Creates a session from explicit options
    pub fn with_config(config: SessionConfig) -> Self {
        let mapping = config.mapping();
        tracing::debug!(
            "new session: memory base {:#x}, mapping {:#x} -> {:#x}",
            config.memory_base,
            mapping.base_address,
            mapping.base_offset
        );
        Session {
            pool: RefCell::new(SlotPool::new()),
            log: RefCell::new(AccessLog::new()),
            memory: RefCell::new(Memory::new(config.memory_base)),
            mapping: Cell::new(mapping),
            mapping_locked: Cell::new(false),
        }
    }

    // =========================================================================
    // Handles
    // =========================================================================

    /// Allocates a register holding `value`
    pub fn register(&self, value: Word) -> Result<Register<'_>> {
        Register::new(self, value)
    }

    /// Allocates a pointer to `address`
    pub fn pointer(&self, address: u64) -> Result<Pointer<'_>> {
        Pointer::new(self, address)
    }

    // =========================================================================
    // Memory
    // =========================================================================

    /// Reserves a zeroed buffer of `len` elements and returns its raw address
    pub fn allocate_buffer(&self, len: usize) -> Result<u64> {
        self.memory.borrow_mut().allocate(len)
    }

    /// Reserves a buffer holding `values` and returns its raw address
    ///
    /// Initialization is not traced.
    pub fn load_buffer(&self, values: &[Word]) -> Result<u64> {
        self.memory.borrow_mut().load(values)
    }

    /// Reads `len` elements without tracing
    pub fn read_buffer(&self, address: u64, len: usize) -> Vec<Word> {
        self.memory.borrow().read_range(address, len)
    }

    pub(crate) fn read_word(&self, address: u64) -> Word {
        self.memory.borrow().read(address)
    }

    pub(crate) fn write_word(&self, address: u64, value: Word) {
        self.memory.borrow_mut().write(address, value);
    }

    // =========================================================================
    // Address mapping
    // =========================================================================

    /// Sets the raw-to-reported address translation
    ///
    /// Only allowed before the first pointer is created.
    pub fn set_address_mapping(&self, base_address: u64, base_offset: u64) -> Result<()> {
        if self.mapping_locked.get() {
            tracing::warn!("address mapping change rejected after pointer creation");
            return Err(Error::AddressMappingLocked);
        }
        tracing::debug!(
            "address mapping set: {:#x} -> {:#x}",
            base_address,
            base_offset
        );
        self.mapping
            .set(AddressMapping::new(base_address, base_offset));
        Ok(())
    }

    /// Current raw-to-reported address translation
    pub fn address_mapping(&self) -> AddressMapping {
        self.mapping.get()
    }

    /// Translates a raw address into the reporting space
    pub fn virtual_address(&self, raw: u64) -> u64 {
        self.mapping.get().virtual_address(raw)
    }

    pub(crate) fn lock_mapping(&self) {
        self.mapping_locked.set(true);
    }

    // =========================================================================
    // Slots
    // =========================================================================

    pub(crate) fn acquire_slot(&self) -> Result<SlotId> {
        self.pool.borrow_mut().allocate()
    }

    pub(crate) fn release_slot(&self, slot: SlotId) {
        self.pool.borrow_mut().release(slot);
    }

    /// Number of slots held by active handles
    pub fn current_register_count(&self) -> usize {
        self.pool.borrow().current()
    }

    /// Highest number of slots held at once during this session
    pub fn peak_register_count(&self) -> usize {
        self.pool.borrow().peak()
    }

    /// Current and peak slot usage together
    pub fn usage(&self) -> UsageMeter {
        self.pool.borrow().usage()
    }

    // =========================================================================
    // Access log
    // =========================================================================

    /// Appends an event to the access log
    pub fn record(&self, event: AccessEvent) {
        self.log.borrow_mut().record(event);
    }

    /// Copies the access log in insertion order
    pub fn snapshot(&self) -> Vec<AccessEvent> {
        self.log.borrow().snapshot()
    }

    /// Number of events recorded so far
    pub fn event_count(&self) -> usize {
        self.log.borrow().len()
    }

    /// Renders every event as a trace line
    pub fn trace_lines(&self) -> Vec<String> {
        let mapping = self.mapping.get();
        self.log
            .borrow()
            .events()
            .iter()
            .map(|event| trace::format_event(event, &mapping))
            .collect()
    }

    /// Writes the trace, one line per event
    ///
    /// Events recorded while writing are not part of this trace.
    pub fn write_trace<W: Write>(&self, writer: &mut W) -> Result<()> {
        let events = self.snapshot();
        tracing::debug!("writing {} trace lines", events.len());
        trace::write_trace(writer, &events, &self.mapping.get())
    }

    /// Exports the access log as a JSON array
    pub fn events_json(&self) -> Result<String> {
        let log = self.log.borrow();
        tracing::debug!("exporting {} events as JSON", log.len());
        Ok(serde_json::to_string(log.events())?)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
