//! Error types for Skillmatrix Core
//!
//! Every fallible operation of the store, the persistence backends and the
//! input layer returns [`MatrixError`]. We use `thiserror` for the Display/Error
//! implementations.

use thiserror::Error;

use crate::types::EntityKind;

/// Result type alias for Skillmatrix operations
pub type Result<T> = std::result::Result<T, MatrixError>;

/// Main error type for Skillmatrix operations
#[derive(Error, Debug)]
pub enum MatrixError {
    /// User input rejected before reaching the store
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Referential guard refused a removal
    #[error("Constraint violation: {0}")]
    Constraint(#[from] ConstraintError),

    /// The targeted entity does not exist; the store state is unchanged
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// Persisted blob failed its integrity check
    #[error("Corrupted entry '{key}': expected hash {expected}, found {actual}")]
    Corrupted {
        key: String,
        expected: String,
        actual: String,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// SQLite errors
    #[error("Storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        source: Box<MatrixError>,
    },
}

/// Errors raised by the input layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} name must not be empty")]
    EmptyName(EntityKind),

    #[error("A team must be selected")]
    MissingTeam,

    #[error("A skill category must be selected")]
    MissingCategory,

    #[error("Unknown team: {0}")]
    UnknownTeam(String),

    #[error("Unknown skill: {0}")]
    UnknownSkill(String),

    #[error("Invalid rating '{0}': expected N/A or 1-5")]
    InvalidRating(String),

    #[error("Unknown skill category '{0}': expected knowledge, hard or soft")]
    InvalidCategory(String),

    #[error("Image is empty")]
    EmptyImage,

    #[error("Unsupported image type: {0}")]
    UnsupportedImage(String),

    #[error("{kind} name '{name}' is ambiguous, use an id: {}", .candidates.join(", "))]
    AmbiguousName {
        kind: EntityKind,
        name: String,
        candidates: Vec<String>,
    },
}

/// Errors raised by the removal guards
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    #[error("Skill \"{name}\" is rated by {collaborators} collaborator(s) and cannot be removed")]
    SkillInUse { name: String, collaborators: usize },

    #[error("Team \"{name}\" has {members} collaborator(s) and cannot be removed")]
    TeamInUse { name: String, members: usize },
}

impl MatrixError {
    /// Shorthand for a [`MatrixError::NotFound`]
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Add context to an error
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// True for errors a user can fix by retrying with different input
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::Validation(_) | Self::Constraint(_) | Self::NotFound { .. } => true,
            Self::WithContext { source, .. } => source.is_user_error(),
            _ => false,
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to a Result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add lazy context to a Result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<MatrixError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_context() {
        let err = MatrixError::not_found(EntityKind::Collaborator, "collaborator-x");
        let err = err.context("Failed to toggle focal flag");

        assert!(err.to_string().contains("Failed to toggle focal flag"));
        assert!(err.to_string().contains("collaborator-x"));
        assert!(err.is_user_error());
    }

    #[test]
    fn test_result_ext() {
        let result: Result<()> = Err(ValidationError::MissingTeam.into());
        let result = result.context("Collaborator form rejected");

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Collaborator form rejected"));
    }

    #[test]
    fn test_io_is_not_user_error() {
        let err: MatrixError = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_constraint_messages() {
        let err = ConstraintError::TeamInUse {
            name: "CIT".to_string(),
            members: 2,
        };
        assert_eq!(
            err.to_string(),
            "Team \"CIT\" has 2 collaborator(s) and cannot be removed"
        );
    }
}
