//! Input collection ahead of the store
//!
//! Each form turns raw user input into the `New*` value a store mutation
//! accepts. A form that fails validation never reaches the store.

use crate::config::AvatarSettings;
use crate::error::ValidationError;
use crate::model::{NewCollaborator, NewSkill, NewTeam, Team};
use crate::photo::PhotoInput;
use crate::store::require_name;
use crate::types::{EntityKind, SkillCategory, TeamId};

type Validated<T> = std::result::Result<T, ValidationError>;

/// New collaborator input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollaboratorForm {
    pub name: String,
    pub team_id: Option<TeamId>,
    pub photo: PhotoInput,
}

impl CollaboratorForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn team(mut self, team_id: impl Into<TeamId>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }

    pub fn photo(mut self, photo: PhotoInput) -> Self {
        self.photo = photo;
        self
    }

    /// Check the input against the current teams and resolve the photo.
    ///
    /// The result has no ratings and is not focal.
    pub fn validate(&self, teams: &[Team], avatar: &AvatarSettings) -> Validated<NewCollaborator> {
        let name = require_name(EntityKind::Collaborator, &self.name)?;
        let team_id = match &self.team_id {
            Some(id) if !id.as_str().trim().is_empty() => id.clone(),
            _ => return Err(ValidationError::MissingTeam),
        };
        if !teams.iter().any(|t| t.id == team_id) {
            return Err(ValidationError::UnknownTeam(team_id.to_string()));
        }
        let photo = self.photo.resolve(&name, avatar)?;
        Ok(NewCollaborator::new(name, photo, team_id))
    }
}

/// New team input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamForm {
    pub name: String,
}

impl TeamForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn validate(&self) -> Validated<NewTeam> {
        Ok(NewTeam::new(require_name(EntityKind::Team, &self.name)?))
    }
}

/// New skill input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillForm {
    pub name: String,
    pub category: Option<SkillCategory>,
}

impl SkillForm {
    pub fn new(name: impl Into<String>, category: Option<SkillCategory>) -> Self {
        Self {
            name: name.into(),
            category,
        }
    }

    pub fn validate(&self) -> Validated<NewSkill> {
        let name = require_name(EntityKind::Skill, &self.name)?;
        let category = self.category.ok_or(ValidationError::MissingCategory)?;
        Ok(NewSkill::new(name, category))
    }
}
