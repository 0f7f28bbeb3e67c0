//! Local session store.
//!
//! Remembers who is using this client across runs. There is no server
//! verification: `login` accepts any password and mints a local identity.
//! Persistence sits behind [`SessionPersistence`] so a verified backend can
//! replace it without touching call sites.

mod file;
mod memory;

use thiserror::Error;
use tokio::sync::watch;

use crate::models::{Role, User};

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

/// Fixed storage key for the persisted user record.
pub const SESSION_STORAGE_KEY: &str = "alerta_user";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Please complete all fields")]
    IncompleteForm,
    #[error("Failed to parse session record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Session storage error: {0}")]
    Storage(String),
}

pub type SessionResult<T> = Result<T, SessionError>;

pub trait SessionPersistence: Send + Sync + 'static {
    fn load_user(&self) -> SessionResult<Option<User>>;
    fn save_user(&self, user: &User) -> SessionResult<()>;
    fn clear_user(&self) -> SessionResult<()>;
}

/// Form-level check the login view runs before calling [`SessionStore::login`].
pub fn validate_login_form(email: &str, password: &str) -> SessionResult<()> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(SessionError::IncompleteForm);
    }
    Ok(())
}

/// Single source of truth for the current user.
///
/// Session changes are published on a watch channel so every view observes
/// login/logout immediately.
pub struct SessionStore<P: SessionPersistence> {
    persistence: P,
    current: watch::Sender<Option<User>>,
}

impl<P: SessionPersistence> SessionStore<P> {
    /// Build the store from whatever record was persisted by a previous run.
    ///
    /// An unreadable or corrupt record is logged and treated as logged out.
    pub fn restore(persistence: P) -> Self {
        let restored = match persistence.load_user() {
            Ok(user) => user,
            Err(SessionError::Json(error)) => {
                tracing::warn!("Discarding corrupt session record: {}", error);
                if let Err(error) = persistence.clear_user() {
                    tracing::warn!("Failed to clear corrupt session record: {}", error);
                }
                None
            }
            Err(error) => {
                tracing::warn!("Failed to load session record: {}", error);
                None
            }
        };

        if let Some(user) = &restored {
            tracing::debug!("Restored session for {}", user.email);
        }

        let (current, _) = watch::channel(restored);
        Self {
            persistence,
            current,
        }
    }

    /// Start a session for `email` with `role`.
    ///
    /// The password is not checked. The record is persisted before it becomes
    /// the current session, so a storage failure leaves the previous session
    /// in place.
    pub fn login(&self, email: &str, _password: &str, role: Role) -> SessionResult<User> {
        let user = User::new(email.trim(), role);
        self.persistence.save_user(&user)?;
        self.current.send_replace(Some(user.clone()));
        tracing::info!("Signed in as {} ({})", user.email, user.role);
        Ok(user)
    }

    /// End the current session. Calling it while logged out is a no-op.
    pub fn logout(&self) {
        let previous = self.current.send_replace(None);
        if let Err(error) = self.persistence.clear_user() {
            tracing::warn!("Failed to clear persisted session: {}", error);
        }
        if let Some(user) = previous {
            tracing::info!("Signed out {}", user.email);
        }
    }

    pub fn current(&self) -> Option<User> {
        self.current.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current.borrow().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.current.subscribe()
    }
}
