//! File-backed session persistence.

use std::io;
use std::path::{Path, PathBuf};

use super::{SessionError, SessionPersistence, SessionResult, SESSION_STORAGE_KEY};
use crate::models::User;

/// Stores the user record as `<dir>/alerta_user.json`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{SESSION_STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionPersistence for FileSessionStore {
    fn load_user(&self) -> SessionResult<Option<User>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(SessionError::Storage(format!(
                "Failed to read {}: {}",
                self.path.display(),
                error
            ))),
        }
    }

    fn save_user(&self, user: &User) -> SessionResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                SessionError::Storage(format!(
                    "Failed to create session directory {}: {}",
                    parent.display(),
                    error
                ))
            })?;
        }

        let raw = serde_json::to_string(user)?;
        std::fs::write(&self.path, raw).map_err(|error| {
            SessionError::Storage(format!(
                "Failed to write {}: {}",
                self.path.display(),
                error
            ))
        })
    }

    fn clear_user(&self) -> SessionResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(SessionError::Storage(format!(
                "Failed to remove {}: {}",
                self.path.display(),
                error
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::session::SessionStore;

    #[test]
    fn file_store_uses_fixed_key() {
        let store = FileSessionStore::in_dir("/tmp/alerta");
        assert!(store.path().ends_with("alerta_user.json"));
    }

    #[test]
    fn login_persists_across_store_instances() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data").join("alerta");

        let first = SessionStore::restore(FileSessionStore::in_dir(&nested));
        first.login("a@b.edu", "x", Role::Student).unwrap();
        drop(first);

        let second = SessionStore::restore(FileSessionStore::in_dir(&nested));
        let user = second.current().unwrap();
        assert_eq!(user.email, "a@b.edu");
        assert_eq!(user.role, Role::Student);
    }

    #[test]
    fn logout_removes_file_and_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let backing = FileSessionStore::in_dir(dir.path());
        let store = SessionStore::restore(backing.clone());
        store.login("admin@b.edu", "x", Role::Admin).unwrap();
        assert!(backing.path().exists());

        store.logout();
        assert!(!backing.path().exists());
        assert!(backing.clear_user().is_ok());
        assert!(SessionStore::restore(backing).current().is_none());
    }

    #[test]
    fn corrupt_file_restores_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let backing = FileSessionStore::in_dir(dir.path());
        std::fs::write(backing.path(), "not-json").unwrap();

        let store = SessionStore::restore(backing.clone());
        assert!(store.current().is_none());
        assert!(!backing.path().exists());
    }
}
