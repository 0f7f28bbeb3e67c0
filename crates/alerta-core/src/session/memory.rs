//! In-process session persistence.

use std::sync::{Arc, Mutex, MutexGuard};

use super::{SessionError, SessionPersistence, SessionResult};
use crate::models::User;

/// Keeps the serialized user record in memory.
///
/// Clones share one slot, so a clone handed to a second [`super::SessionStore`]
/// behaves like the same storage seen from a fresh process.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemorySessionStore {
    /// Seed the slot with a raw record, as if written by an earlier run.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(raw.into()))),
        }
    }

    /// The raw persisted record, if any.
    pub fn raw(&self) -> Option<String> {
        self.slot().ok().and_then(|guard| guard.clone())
    }

    fn slot(&self) -> SessionResult<MutexGuard<'_, Option<String>>> {
        self.slot
            .lock()
            .map_err(|error| SessionError::Storage(error.to_string()))
    }
}

impl SessionPersistence for MemorySessionStore {
    fn load_user(&self) -> SessionResult<Option<User>> {
        let guard = self.slot()?;
        match guard.as_deref() {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save_user(&self, user: &User) -> SessionResult<()> {
        let raw = serde_json::to_string(user)?;
        *self.slot()? = Some(raw);
        Ok(())
    }

    fn clear_user(&self) -> SessionResult<()> {
        *self.slot()? = None;
        Ok(())
    }
}
