//! Core types for Skillmatrix
//!
//! Identifiers, the rating scale and the skill categories shared by every
//! other module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ValidationError;

/// Kind of entity held by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Collaborator,
    Team,
    Skill,
    SkillRating,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Collaborator => write!(f, "Collaborator"),
            EntityKind::Team => write!(f, "Team"),
            EntityKind::Skill => write!(f, "Skill"),
            EntityKind::SkillRating => write!(f, "Skill rating"),
        }
    }
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Prefix shared by every generated id of this kind
            pub const PREFIX: &'static str = $prefix;

            /// Generate a fresh id. Ids are random, so two calls never collide
            /// regardless of timing.
            pub fn generate() -> Self {
                Self(format!("{}{}", Self::PREFIX, Uuid::new_v4()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

entity_id!(
    /// Unique collaborator identifier
    CollaboratorId,
    "collaborator-"
);
entity_id!(
    /// Unique team identifier
    TeamId,
    "team-"
);
entity_id!(
    /// Unique skill identifier
    SkillId,
    "skill-"
);

/// Ordinal proficiency level of a collaborator in a skill
///
/// Persisted as the string `"N/A"` or the integers 1-5.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "RatingRepr", into = "RatingRepr")]
pub enum Rating {
    /// Unrated or not applicable
    #[default]
    NotApplicable,
    Novice,
    Basic,
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RatingRepr {
    Level(u8),
    Text(String),
}

impl Rating {
    /// Every rating, in cycle order
    pub const ALL: [Rating; 6] = [
        Rating::NotApplicable,
        Rating::Novice,
        Rating::Basic,
        Rating::Intermediate,
        Rating::Advanced,
        Rating::Expert,
    ];

    /// Highest numeric level
    pub const MAX_LEVEL: u8 = 5;

    /// Slider position: 0 for N/A, 1-5 otherwise
    pub fn level(self) -> u8 {
        match self {
            Rating::NotApplicable => 0,
            Rating::Novice => 1,
            Rating::Basic => 2,
            Rating::Intermediate => 3,
            Rating::Advanced => 4,
            Rating::Expert => 5,
        }
    }

    /// Inverse of [`Rating::level`]
    pub fn from_level(level: u8) -> Option<Self> {
        Self::ALL.get(usize::from(level)).copied()
    }

    /// Numeric value, `None` for N/A
    pub fn value(self) -> Option<u8> {
        match self {
            Rating::NotApplicable => None,
            other => Some(other.level()),
        }
    }

    /// Next rating when cycling: N/A -> 1 -> ... -> 5 -> N/A
    pub fn next(self) -> Self {
        match self {
            Rating::Expert => Rating::NotApplicable,
            other => Self::ALL[usize::from(other.level()) + 1],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rating::NotApplicable => "Not applicable",
            Rating::Novice => "Novice",
            Rating::Basic => "Basic",
            Rating::Intermediate => "Intermediate",
            Rating::Advanced => "Advanced",
            Rating::Expert => "Expert",
        }
    }

    /// Legend line describing what the level means in practice
    pub fn description(self) -> &'static str {
        match self {
            Rating::NotApplicable => "Does not apply to this collaborator",
            Rating::Novice => "Needs constant supervision",
            Rating::Basic => "Performs with some help",
            Rating::Intermediate => "Performs independently",
            Rating::Advanced => "Can teach others",
            Rating::Expert => "Reference for the skill",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(level) => write!(f, "{}", level),
            None => write!(f, "N/A"),
        }
    }
}

impl FromStr for Rating {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("n/a") || trimmed.eq_ignore_ascii_case("na") {
            return Ok(Rating::NotApplicable);
        }
        trimmed
            .parse::<u8>()
            .ok()
            .and_then(Rating::from_level)
            .ok_or_else(|| ValidationError::InvalidRating(s.to_string()))
    }
}

impl TryFrom<RatingRepr> for Rating {
    type Error = ValidationError;

    fn try_from(repr: RatingRepr) -> Result<Self, Self::Error> {
        match repr {
            RatingRepr::Level(0) => Err(ValidationError::InvalidRating("0".to_string())),
            RatingRepr::Level(level) => {
                Rating::from_level(level).ok_or_else(|| ValidationError::InvalidRating(level.to_string()))
            }
            RatingRepr::Text(text) if text == "N/A" => Ok(Rating::NotApplicable),
            RatingRepr::Text(text) => Err(ValidationError::InvalidRating(text)),
        }
    }
}

impl From<Rating> for RatingRepr {
    fn from(rating: Rating) -> Self {
        match rating.value() {
            Some(level) => RatingRepr::Level(level),
            None => RatingRepr::Text("N/A".to_string()),
        }
    }
}

/// Skill category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    Knowledge,
    Hard,
    Soft,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 3] = [
        SkillCategory::Knowledge,
        SkillCategory::Hard,
        SkillCategory::Soft,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SkillCategory::Knowledge => "Knowledge",
            SkillCategory::Hard => "Hard Skill",
            SkillCategory::Soft => "Soft Skill",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SkillCategory::Knowledge => "knowledge",
            SkillCategory::Hard => "hard",
            SkillCategory::Soft => "soft",
        }
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SkillCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "knowledge" => Ok(SkillCategory::Knowledge),
            "hard" => Ok(SkillCategory::Hard),
            "soft" => Ok(SkillCategory::Soft),
            _ => Err(ValidationError::InvalidCategory(s.to_string())),
        }
    }
}
