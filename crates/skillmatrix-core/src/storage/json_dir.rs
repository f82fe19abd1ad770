//! Directory-of-files [`KeyValueStore`]: one `<key>.json` per key

use std::fs;
use std::path::{Path, PathBuf};

use super::KeyValueStore;
use crate::error::{MatrixError, Result, ResultExt};

const EXTENSION: &str = "json";

/// Stores each key as a pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    base_path: PathBuf,
}

impl JsonDirStore {
    /// Open the directory, creating it if needed
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)
            .with_context(|| format!("Creating data directory '{}'", base_path.display()))?;
        Ok(Self { base_path })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(MatrixError::Config(format!("Invalid storage key '{}'", key)));
        }
        Ok(self.base_path.join(format!("{}.{}", key, EXTENSION)))
    }
}

impl KeyValueStore for JsonDirStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Reading '{}'", path.display()))?;
        Ok(Some(content))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;

        // Re-indent valid JSON so the files stay readable; anything else is
        // stored verbatim.
        let content = match serde_json::from_str::<serde_json::Value>(value) {
            Ok(json) => serde_json::to_string_pretty(&json)?,
            Err(_) => value.to_string(),
        };

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content).with_context(|| format!("Writing '{}'", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| format!("Replacing '{}'", path.display()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MatrixError::from(e).context(format!("Removing '{}'", path.display()))),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn backend_name(&self) -> &'static str {
        "json_dir"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirStore::open(dir.path()).unwrap();

        store.set("teams", r#"[{"id":"team1","name":"CIT"}]"#).unwrap();
        let raw = store.get("teams").unwrap().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed[0]["name"], "CIT");
        assert!(dir.path().join("teams.json").exists());
        assert!(!dir.path().join("teams.json.tmp").exists());
    }

    #[test]
    fn test_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirStore::open(dir.path()).unwrap();
        assert_eq!(store.get("skills").unwrap(), None);
        store.remove("skills").unwrap();
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirStore::open(dir.path()).unwrap();
        assert!(store.set("../escape", "[]").is_err());
        assert!(store.get("").is_err());
    }

    #[test]
    fn test_keys_ignore_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirStore::open(dir.path()).unwrap();
        store.set("teams", "[]").unwrap();
        store.set("skills", "[]").unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();

        assert_eq!(store.keys().unwrap(), vec!["skills", "teams"]);
    }
}
