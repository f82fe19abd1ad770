//! Store configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MatrixError, Result, ResultExt};

/// Default location of the SQLite database
pub const DEFAULT_DATA_PATH: &str = ".skillmatrix/matrix.db";

/// Default placeholder avatar service
pub const DEFAULT_AVATAR_URL: &str = "https://ui-avatars.com/api/";

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    /// Persistence settings
    pub storage: StorageSettings,

    /// Placeholder avatar settings
    pub avatar: AvatarSettings,

    /// Recognition report thresholds
    pub recognition: RecognitionSettings,
}

impl MatrixConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the storage backend
    pub fn with_backend(mut self, backend: StorageBackendKind) -> Self {
        self.storage.backend = backend;
        self
    }

    /// Set the storage path
    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage.path = path.into();
        self
    }

    /// Set the recognition thresholds
    pub fn with_recognition(mut self, recognition: RecognitionSettings) -> Self {
        self.recognition = recognition;
        self
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        let r = &self.recognition;
        if r.eligible_threshold > 100 || r.attention_threshold > 100 {
            return Err(MatrixError::Config(
                "recognition thresholds are percentages (0-100)".to_string(),
            ));
        }
        if r.attention_threshold > r.eligible_threshold {
            return Err(MatrixError::Config(format!(
                "attention threshold {} exceeds eligibility threshold {}",
                r.attention_threshold, r.eligible_threshold
            )));
        }
        if !(1..=5).contains(&r.advanced_level) {
            return Err(MatrixError::Config(format!(
                "advanced level must be between 1 and 5, got {}",
                r.advanced_level
            )));
        }
        if self.avatar.base_url.trim().is_empty() {
            return Err(MatrixError::Config("avatar base_url must not be empty".to_string()));
        }
        Ok(())
    }

    /// Load configuration from a TOML file (JSON when the extension is `.json`)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Reading config '{}'", path.display()))?;
        let config: Self = if is_json(path) {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content).map_err(|e| MatrixError::Config(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file, in the format implied by its extension
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self).map_err(|e| MatrixError::Config(e.to_string()))?
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("json"))
}

/// Which [`KeyValueStore`](crate::storage::KeyValueStore) backs the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackendKind {
    /// Single SQLite file
    #[default]
    Sqlite,
    /// Directory with one JSON file per key
    JsonDir,
    /// Nothing survives the process
    Memory,
}

impl std::fmt::Display for StorageBackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendKind::Sqlite => write!(f, "sqlite"),
            StorageBackendKind::JsonDir => write!(f, "json_dir"),
            StorageBackendKind::Memory => write!(f, "memory"),
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Backend kind
    pub backend: StorageBackendKind,

    /// Database file (sqlite) or directory (json_dir)
    pub path: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackendKind::Sqlite,
            path: PathBuf::from(DEFAULT_DATA_PATH),
        }
    }
}

/// Placeholder avatar settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarSettings {
    /// Avatar generation endpoint
    pub base_url: String,

    /// Background color, hex without `#`
    pub background: String,

    /// Foreground color, hex without `#`
    pub color: String,
}

impl Default for AvatarSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_AVATAR_URL.to_string(),
            background: "9b87f5".to_string(),
            color: "fff".to_string(),
        }
    }
}

/// Recognition report thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionSettings {
    /// Aptitude percentage at or above which a collaborator is eligible
    pub eligible_threshold: u8,

    /// Aptitude percentage below which a collaborator needs attention
    pub attention_threshold: u8,

    /// Minimum rating counted as independent execution
    pub advanced_level: u8,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            eligible_threshold: 75,
            attention_threshold: 50,
            advanced_level: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MatrixConfig::default();
        assert_eq!(config.storage.backend, StorageBackendKind::Sqlite);
        assert_eq!(config.storage.path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(config.recognition.eligible_threshold, 75);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = MatrixConfig::new()
            .with_backend(StorageBackendKind::JsonDir)
            .with_data_path("/tmp/matrix");

        assert_eq!(config.storage.backend, StorageBackendKind::JsonDir);
        assert_eq!(config.storage.path, PathBuf::from("/tmp/matrix"));
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let config = MatrixConfig::new().with_recognition(RecognitionSettings {
            eligible_threshold: 40,
            attention_threshold: 60,
            advanced_level: 4,
        });
        assert!(matches!(config.validate(), Err(MatrixError::Config(_))));

        let config = MatrixConfig::new().with_recognition(RecognitionSettings {
            advanced_level: 6,
            ..RecognitionSettings::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml() {
        let config: MatrixConfig = toml::from_str(
            r#"
            [storage]
            backend = "json_dir"
            path = "data"
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.backend, StorageBackendKind::JsonDir);
        assert_eq!(config.avatar, AvatarSettings::default());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = MatrixConfig::new().with_backend(StorageBackendKind::Memory);

        for name in ["skillmatrix.toml", "skillmatrix.json"] {
            let path = dir.path().join(name);
            config.to_file(&path).unwrap();
            assert_eq!(MatrixConfig::from_file(&path).unwrap(), config);
        }
    }
}
