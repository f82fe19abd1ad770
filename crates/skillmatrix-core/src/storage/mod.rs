//! Persistent key-value medium
//!
//! The Matrix Store writes each collection as a complete JSON snapshot under
//! its own key. Any [`KeyValueStore`] can back it:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 MatrixStore                  │
//! ├──────────────────────────────────────────────┤
//! │ "collaborators" │    "teams"    │  "skills"  │
//! └──────────────────────────────────────────────┘
//!          ↓ full snapshot per key, per mutation
//!   SqliteKvStore | JsonDirStore | MemoryStore
//! ```
//!
//! # Example
//!
//! ```
//! use skillmatrix_core::storage::{KeyValueStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.set("teams", "[]").unwrap();
//! assert_eq!(store.get("teams").unwrap().as_deref(), Some("[]"));
//! ```

pub mod json_dir;
pub mod memory;
pub mod sqlite_store;

pub use json_dir::JsonDirStore;
pub use memory::MemoryStore;
pub use sqlite_store::{EntryInfo, SqliteKvStore};

use crate::config::{StorageBackendKind, StorageSettings};
use crate::error::Result;

/// Key holding the collaborator collection
pub const COLLABORATORS_KEY: &str = "collaborators";
/// Key holding the team collection
pub const TEAMS_KEY: &str = "teams";
/// Key holding the skill collection
pub const SKILLS_KEY: &str = "skills";

/// Every key written by the store
pub const ALL_KEYS: [&str; 3] = [COLLABORATORS_KEY, TEAMS_KEY, SKILLS_KEY];

/// A persistent string-to-string medium scoped to one store instance.
///
/// Writes replace the whole value; there is no partial update.
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key was never written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;

    /// All keys currently present, sorted
    fn keys(&self) -> Result<Vec<String>>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}

/// Open the backend described by the storage settings
pub fn open_backend(settings: &StorageSettings) -> Result<Box<dyn KeyValueStore>> {
    let store: Box<dyn KeyValueStore> = match settings.backend {
        StorageBackendKind::Sqlite => Box::new(SqliteKvStore::open(&settings.path)?),
        StorageBackendKind::JsonDir => Box::new(JsonDirStore::open(&settings.path)?),
        StorageBackendKind::Memory => Box::new(MemoryStore::new()),
    };
    tracing::debug!(
        "Opened {} storage at {}",
        store.backend_name(),
        settings.path.display()
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_open_memory_backend() {
        let settings = StorageSettings {
            backend: StorageBackendKind::Memory,
            path: PathBuf::from("unused"),
        };
        let store = open_backend(&settings).unwrap();
        assert_eq!(store.backend_name(), "memory");
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_open_json_dir_backend() {
        let dir = tempfile::tempdir().unwrap();
        let settings = StorageSettings {
            backend: StorageBackendKind::JsonDir,
            path: dir.path().join("data"),
        };
        let store = open_backend(&settings).unwrap();
        store.set(TEAMS_KEY, "[]").unwrap();
        assert_eq!(store.keys().unwrap(), vec![TEAMS_KEY.to_string()]);
    }
}
