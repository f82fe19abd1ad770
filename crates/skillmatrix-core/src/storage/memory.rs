//! In-process [`KeyValueStore`] for tests and throwaway sessions

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::KeyValueStore;
use crate::error::Result;

/// Volatile key-value store.
///
/// Clones share the same map, so a clone kept by a test observes every write
/// made through the store and can be handed to a second store to simulate a
/// restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys present
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.entries.read().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let observer = store.clone();

        store.set("teams", "[]").unwrap();
        assert_eq!(observer.get("teams").unwrap().as_deref(), Some("[]"));
        assert_eq!(observer.len(), 1);

        observer.remove("teams").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_keys_sorted() {
        let store = MemoryStore::new();
        store.set("teams", "[]").unwrap();
        store.set("collaborators", "[]").unwrap();
        store.set("skills", "[]").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["collaborators", "skills", "teams"]);
    }
}
