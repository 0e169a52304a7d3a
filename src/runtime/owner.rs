//! Slot ownership shared by registers and pointers

use std::fmt;

use super::session::Session;
use crate::error::{Error, Result};
use crate::trace::SlotId;

/// Lifecycle state of a handle
///
/// `Active -> Inactive` happens only when the handle is moved out of;
/// `Inactive` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// Owns a slot and may be used
    Active,
    /// Moved out of; every operation fails
    Inactive,
}

impl fmt::Display for HandleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleState::Active => write!(f, "ACTIVE"),
            HandleState::Inactive => write!(f, "INACTIVE"),
        }
    }
}

/// Owns at most one slot of a session's pool and frees it on drop
pub(crate) struct SlotOwner<'s> {
    session: &'s Session,
    /// `None` once moved out of
    slot: Option<SlotId>,
}

impl<'s> SlotOwner<'s> {
    /// Claims a fresh slot
    pub(crate) fn acquire(session: &'s Session) -> Result<Self> {
        let slot = session.acquire_slot()?;
        Ok(SlotOwner {
            session,
            slot: Some(slot),
        })
    }

    pub(crate) fn session(&self) -> &'s Session {
        self.session
    }

    pub(crate) fn slot(&self) -> Option<SlotId> {
        self.slot
    }

    pub(crate) fn state(&self) -> HandleState {
        if self.slot.is_some() {
            HandleState::Active
        } else {
            HandleState::Inactive
        }
    }

    /// Returns the owned slot, or fails if the handle was moved out of
    pub(crate) fn check(&self, operation: &'static str) -> Result<SlotId> {
        self.slot.ok_or_else(|| {
            tracing::warn!("rejected {} on inactive register", operation);
            Error::inactive(operation)
        })
    }

    /// Fails unless `session` is the session this handle draws slots from
    pub(crate) fn ensure_same_session(&self, session: &Session) -> Result<()> {
        if std::ptr::eq(self.session, session) {
            Ok(())
        } else {
            tracing::warn!("rejected handle from a different session");
            Err(Error::ForeignHandle)
        }
    }

    /// Moves the slot into a new owner, leaving this one inactive
    pub(crate) fn take(&mut self) -> Result<Self> {
        let slot = self.check("move")?;
        self.slot = None;
        Ok(SlotOwner {
            session: self.session,
            slot: Some(slot),
        })
    }
}

impl Drop for SlotOwner<'_> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            self.session.release_slot(slot);
        }
    }
}

impl fmt::Debug for SlotOwner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotOwner")
            .field("slot", &self.slot)
            .finish()
    }
}
