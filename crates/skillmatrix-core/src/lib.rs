//! Skillmatrix Core - collaborators, teams and skill ratings
//!
//! The crate is built around one owner of state, the [`MatrixStore`]. It
//! holds three collections and mirrors every change into a persistent
//! key-value medium.
//!
//! # Architecture
//!
//! 1. **Model** (`model`, `types`): entities, ids, the rating scale
//! 2. **Store** (`store`, `guard`): mutations, queries, removal guards
//! 3. **Storage** (`storage`): SQLite, JSON directory and in-memory backends
//! 4. **Input** (`forms`, `photo`): validation before anything reaches the store
//! 5. **Projections** (`views`, `recognition`): skill cards, radar data, reports
//!
//! # Quick Start
//!
//! ```
//! use skillmatrix_core::storage::MemoryStore;
//! use skillmatrix_core::{MatrixStore, NewCollaborator, Rating, SkillId};
//!
//! let store = MatrixStore::open(MemoryStore::new()).unwrap();
//! assert_eq!(store.teams().len(), 3);
//!
//! let ana = store
//!     .add_collaborator(NewCollaborator::new("Ana Lima", "", "team1"))
//!     .unwrap();
//! let excel = SkillId::from("skill4");
//! store.update_skill_rating(&ana.id, &excel, Rating::Advanced).unwrap();
//! assert!(store.toggle_skill_aptitude(&ana.id, &excel).unwrap());
//!
//! let radar = store.radar_points(&ana.id).unwrap();
//! assert_eq!(radar[0].subject, "Excel");
//! assert_eq!(radar[0].value, 4);
//! ```

#![deny(unsafe_code)]
#![warn(rust_2018_idioms, missing_debug_implementations, clippy::all)]

pub mod config;
pub mod error;
pub mod forms;
pub mod guard;
pub mod model;
pub mod photo;
pub mod recognition;
pub mod seed;
pub mod storage;
pub mod store;
pub mod types;
pub mod views;

// Re-export commonly used types for convenience
pub use config::{MatrixConfig, RecognitionSettings, StorageBackendKind, StorageSettings};
pub use error::{ConstraintError, MatrixError, Result, ResultExt, ValidationError};
pub use forms::{CollaboratorForm, SkillForm, TeamForm};
pub use model::{
    Collaborator, CollaboratorPatch, NewCollaborator, NewSkill, NewTeam, Skill, SkillPatch,
    SkillRating, Team,
};
pub use photo::PhotoInput;
pub use recognition::{CollaboratorStats, RecognitionReport, RecognitionStatus};
pub use storage::KeyValueStore;
pub use store::{MatrixSnapshot, MatrixStore};
pub use types::{CollaboratorId, EntityKind, Rating, SkillCategory, SkillId, TeamId};
pub use views::{AssignedSkill, CollaboratorCard, RadarPoint, TeamFilter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
