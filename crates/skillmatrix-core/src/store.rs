//! MatrixStore: single source of truth for collaborators, teams and skills
//!
//! All reads return owned snapshots. All mutations take the write lock, apply
//! the change to the in-memory state and then write the three collections in
//! full to the backing [`KeyValueStore`] before releasing the lock, so writes
//! are serialized through one owner.
//!
//! Operations targeting a missing entity return [`MatrixError::NotFound`]
//! and leave both the state and the storage untouched.

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::config::StorageSettings;
use crate::error::{MatrixError, Result, ResultExt, ValidationError};
use crate::model::{
    Collaborator, CollaboratorPatch, NewCollaborator, NewSkill, NewTeam, Skill, SkillPatch,
    SkillRating, Team,
};
use crate::seed;
use crate::storage::{self, KeyValueStore, COLLABORATORS_KEY, SKILLS_KEY, TEAMS_KEY};
use crate::types::{CollaboratorId, EntityKind, Rating, SkillId, TeamId};

/// Complete state of the store at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixSnapshot {
    pub collaborators: Vec<Collaborator>,
    pub teams: Vec<Team>,
    pub skills: Vec<Skill>,
}

impl MatrixSnapshot {
    /// Default teams and skills, no collaborators
    pub fn seeded() -> Self {
        Self {
            collaborators: Vec::new(),
            teams: seed::default_teams(),
            skills: seed::default_skills(),
        }
    }

    pub fn collaborator(&self, id: &CollaboratorId) -> Option<&Collaborator> {
        self.collaborators.iter().find(|c| &c.id == id)
    }

    pub fn team(&self, id: &TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| &t.id == id)
    }

    pub fn skill(&self, id: &SkillId) -> Option<&Skill> {
        self.skills.iter().find(|s| &s.id == id)
    }

    fn collaborator_mut(&mut self, id: &CollaboratorId) -> Result<&mut Collaborator> {
        self.collaborators
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| MatrixError::not_found(EntityKind::Collaborator, id.as_str()))
    }

    fn require_team(&self, id: &TeamId) -> std::result::Result<(), ValidationError> {
        if self.team(id).is_some() {
            Ok(())
        } else {
            Err(ValidationError::UnknownTeam(id.to_string()))
        }
    }

    fn require_skills(&self, ratings: &[SkillRating]) -> std::result::Result<(), ValidationError> {
        match ratings.iter().find(|r| self.skill(&r.skill_id).is_none()) {
            Some(missing) => Err(ValidationError::UnknownSkill(missing.skill_id.to_string())),
            None => Ok(()),
        }
    }

    /// Ids of every entity, across all three collections
    fn all_ids(&self) -> HashSet<&str> {
        self.collaborators
            .iter()
            .map(|c| c.id.as_str())
            .chain(self.teams.iter().map(|t| t.id.as_str()))
            .chain(self.skills.iter().map(|s| s.id.as_str()))
            .collect()
    }
}

/// Result of a mutation closure: whether anything must be written
pub(crate) enum Mutation<T> {
    Applied(T),
    Skipped(T),
}

/// The Matrix Store
pub struct MatrixStore {
    state: RwLock<MatrixSnapshot>,
    backend: Box<dyn KeyValueStore>,
}

impl fmt::Debug for MatrixStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("MatrixStore")
            .field("backend", &self.backend.backend_name())
            .field("collaborators", &state.collaborators.len())
            .field("teams", &state.teams.len())
            .field("skills", &state.skills.len())
            .finish()
    }
}

impl MatrixStore {
    /// Restore the store from `backend`, seeding every absent key
    pub fn open(backend: impl KeyValueStore + 'static) -> Result<Self> {
        Self::from_boxed(Box::new(backend))
    }

    /// Open the backend described by `settings` and restore from it
    pub fn from_settings(settings: &StorageSettings) -> Result<Self> {
        Self::from_boxed(storage::open_backend(settings)?)
    }

    fn from_boxed(backend: Box<dyn KeyValueStore>) -> Result<Self> {
        let state = Self::load(backend.as_ref())?;
        tracing::info!(
            "Matrix loaded from {}: {} collaborators, {} teams, {} skills",
            backend.backend_name(),
            state.collaborators.len(),
            state.teams.len(),
            state.skills.len()
        );
        Ok(Self {
            state: RwLock::new(state),
            backend,
        })
    }

    fn load(backend: &dyn KeyValueStore) -> Result<MatrixSnapshot> {
        let state = MatrixSnapshot {
            collaborators: load_key(backend, COLLABORATORS_KEY, Vec::new)?,
            teams: load_key(backend, TEAMS_KEY, seed::default_teams)?,
            skills: load_key(backend, SKILLS_KEY, seed::default_skills)?,
        };

        for c in &state.collaborators {
            if state.team(&c.team_id).is_none() {
                tracing::warn!("Collaborator {} references missing team {}", c.id, c.team_id);
            }
        }
        Ok(state)
    }

    /// Discard in-memory state and restore it from storage
    pub fn reload(&self) -> Result<()> {
        let fresh = Self::load(self.backend.as_ref())?;
        *self.state.write() = fresh;
        Ok(())
    }

    /// Write the current state in full, even if nothing changed
    pub fn flush(&self) -> Result<()> {
        let state = self.state.read();
        self.persist(&state)
    }

    fn persist(&self, state: &MatrixSnapshot) -> Result<()> {
        write_key(self.backend.as_ref(), COLLABORATORS_KEY, &state.collaborators)?;
        write_key(self.backend.as_ref(), TEAMS_KEY, &state.teams)?;
        write_key(self.backend.as_ref(), SKILLS_KEY, &state.skills)?;
        tracing::debug!("Snapshot persisted to {}", self.backend.backend_name());
        Ok(())
    }

    /// Run a mutation under the write lock and persist if it changed anything.
    ///
    /// The closure works on a copy of the state. The copy replaces the live
    /// state only once all three keys are written, so an `Err` leaves memory
    /// unchanged. A failed write also restores the previous snapshot in
    /// storage so no key is left ahead of the others.
    pub(crate) fn mutate<T>(
        &self,
        f: impl FnOnce(&mut MatrixSnapshot) -> Result<Mutation<T>>,
    ) -> Result<T> {
        let mut state = self.state.write();
        let mut next = state.clone();
        match f(&mut next)? {
            Mutation::Applied(value) => {
                if let Err(e) = self.persist(&next) {
                    tracing::warn!("Failed to persist snapshot: {}", e);
                    if let Err(restore) = self.persist(&state) {
                        tracing::error!("Failed to restore previous snapshot: {}", restore);
                    }
                    return Err(e.context("Change not persisted"));
                }
                *state = next;
                Ok(value)
            }
            Mutation::Skipped(value) => Ok(value),
        }
    }

    /// Run a read-only closure against the current state
    pub fn read<T>(&self, f: impl FnOnce(&MatrixSnapshot) -> T) -> T {
        f(&self.state.read())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> MatrixSnapshot {
        self.state.read().clone()
    }

    pub fn collaborators(&self) -> Vec<Collaborator> {
        self.state.read().collaborators.clone()
    }

    pub fn teams(&self) -> Vec<Team> {
        self.state.read().teams.clone()
    }

    pub fn skills(&self) -> Vec<Skill> {
        self.state.read().skills.clone()
    }

    pub fn collaborator(&self, id: &CollaboratorId) -> Option<Collaborator> {
        self.state.read().collaborator(id).cloned()
    }

    pub fn team(&self, id: &TeamId) -> Option<Team> {
        self.state.read().team(id).cloned()
    }

    pub fn skill(&self, id: &SkillId) -> Option<Skill> {
        self.state.read().skill(id).cloned()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Collaborators
    // ─────────────────────────────────────────────────────────────────────

    /// Append a collaborator with a freshly generated id
    pub fn add_collaborator(&self, new: NewCollaborator) -> Result<Collaborator> {
        self.mutate(|state| {
            let name = require_name(EntityKind::Collaborator, &new.name)?;
            state.require_team(&new.team_id)?;
            state.require_skills(&new.skills)?;

            let id = fresh_id(state, CollaboratorId::generate);
            let collaborator = Collaborator::from_new(id, NewCollaborator { name, ..new });
            state.collaborators.push(collaborator.clone());
            tracing::info!("Collaborator added: {} ({})", collaborator.name, collaborator.id);
            Ok(Mutation::Applied(collaborator))
        })
    }

    /// Merge `patch` into the collaborator with that id
    pub fn update_collaborator(
        &self,
        id: &CollaboratorId,
        patch: CollaboratorPatch,
    ) -> Result<Collaborator> {
        self.mutate(|state| {
            let name = match &patch.name {
                Some(name) => Some(require_name(EntityKind::Collaborator, name)?),
                None => None,
            };
            if let Some(team_id) = &patch.team_id {
                state.require_team(team_id)?;
            }
            if let Some(skills) = &patch.skills {
                state.require_skills(skills)?;
            }

            let collaborator = state.collaborator_mut(id)?;
            collaborator.apply(CollaboratorPatch { name, ..patch });
            tracing::info!("Collaborator updated: {}", id);
            Ok(Mutation::Applied(collaborator.clone()))
        })
    }

    /// Remove a collaborator; `None` when the id is absent
    pub fn remove_collaborator(&self, id: &CollaboratorId) -> Result<Option<Collaborator>> {
        self.mutate(|state| {
            match state.collaborators.iter().position(|c| &c.id == id) {
                Some(index) => {
                    let removed = state.collaborators.remove(index);
                    tracing::info!("Collaborator removed: {} ({})", removed.name, removed.id);
                    Ok(Mutation::Applied(Some(removed)))
                }
                None => Ok(Mutation::Skipped(None)),
            }
        })
    }

    /// Flip the focal flag; returns the new value
    pub fn toggle_focal(&self, id: &CollaboratorId) -> Result<bool> {
        self.mutate(|state| {
            let collaborator = state.collaborator_mut(id)?;
            collaborator.is_focal = !collaborator.is_focal;
            tracing::info!("Collaborator {} focal = {}", id, collaborator.is_focal);
            Ok(Mutation::Applied(collaborator.is_focal))
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Ratings
    // ─────────────────────────────────────────────────────────────────────

    /// Set the rating of a collaborator in a skill, creating a non-apt entry
    /// when none exists. Existing entries keep their position.
    pub fn update_skill_rating(
        &self,
        collaborator_id: &CollaboratorId,
        skill_id: &SkillId,
        rating: Rating,
    ) -> Result<SkillRating> {
        self.mutate(|state| {
            if state.skill(skill_id).is_none() {
                return Err(MatrixError::not_found(EntityKind::Skill, skill_id.as_str()));
            }
            let collaborator = state.collaborator_mut(collaborator_id)?;
            collaborator.set_rating(skill_id, rating);
            let entry = collaborator
                .rating_for(skill_id)
                .cloned()
                .ok_or_else(|| MatrixError::not_found(EntityKind::SkillRating, skill_id.as_str()))?;
            tracing::info!("Rating {} / {} = {}", collaborator_id, skill_id, rating);
            Ok(Mutation::Applied(entry))
        })
    }

    /// Flip `is_apt` on an existing rating entry; never creates one
    pub fn toggle_skill_aptitude(
        &self,
        collaborator_id: &CollaboratorId,
        skill_id: &SkillId,
    ) -> Result<bool> {
        self.mutate(|state| {
            let collaborator = state.collaborator_mut(collaborator_id)?;
            let is_apt = collaborator.toggle_aptitude(skill_id).ok_or_else(|| {
                MatrixError::not_found(
                    EntityKind::SkillRating,
                    format!("{}/{}", collaborator_id, skill_id),
                )
            })?;
            tracing::info!("Aptitude {} / {} = {}", collaborator_id, skill_id, is_apt);
            Ok(Mutation::Applied(is_apt))
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Teams
    // ─────────────────────────────────────────────────────────────────────

    pub fn add_team(&self, new: NewTeam) -> Result<Team> {
        self.mutate(|state| {
            let name = require_name(EntityKind::Team, &new.name)?;
            let team = Team {
                id: fresh_id(state, TeamId::generate),
                name,
            };
            state.teams.push(team.clone());
            tracing::info!("Team added: {} ({})", team.name, team.id);
            Ok(Mutation::Applied(team))
        })
    }

    /// Remove a team without checking members; see
    /// [`MatrixStore::try_remove_team`] for the guarded variant
    pub fn remove_team(&self, id: &TeamId) -> Result<Option<Team>> {
        self.mutate(|state| Ok(remove_team_unchecked(state, id)))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Skills
    // ─────────────────────────────────────────────────────────────────────

    pub fn add_skill(&self, new: NewSkill) -> Result<Skill> {
        self.mutate(|state| {
            let name = require_name(EntityKind::Skill, &new.name)?;
            let skill = Skill {
                id: fresh_id(state, SkillId::generate),
                name,
                category: new.category,
            };
            state.skills.push(skill.clone());
            tracing::info!("Skill added: {} ({}, {})", skill.name, skill.id, skill.category);
            Ok(Mutation::Applied(skill))
        })
    }

    /// Merge `patch` into the skill with that id
    pub fn update_skill(&self, id: &SkillId, patch: SkillPatch) -> Result<Skill> {
        self.mutate(|state| {
            let name = match &patch.name {
                Some(name) => Some(require_name(EntityKind::Skill, name)?),
                None => None,
            };
            let skill = state
                .skills
                .iter_mut()
                .find(|s| &s.id == id)
                .ok_or_else(|| MatrixError::not_found(EntityKind::Skill, id.as_str()))?;
            skill.apply(SkillPatch { name, ..patch });
            tracing::info!("Skill updated: {}", id);
            Ok(Mutation::Applied(skill.clone()))
        })
    }

    /// Remove a skill without checking usage; see
    /// [`MatrixStore::try_remove_skill`] for the guarded variant
    pub fn remove_skill(&self, id: &SkillId) -> Result<Option<Skill>> {
        self.mutate(|state| Ok(remove_skill_unchecked(state, id)))
    }
}

pub(crate) fn remove_team_unchecked(state: &mut MatrixSnapshot, id: &TeamId) -> Mutation<Option<Team>> {
    match state.teams.iter().position(|t| &t.id == id) {
        Some(index) => {
            let removed = state.teams.remove(index);
            tracing::info!("Team removed: {} ({})", removed.name, removed.id);
            Mutation::Applied(Some(removed))
        }
        None => Mutation::Skipped(None),
    }
}

pub(crate) fn remove_skill_unchecked(state: &mut MatrixSnapshot, id: &SkillId) -> Mutation<Option<Skill>> {
    match state.skills.iter().position(|s| &s.id == id) {
        Some(index) => {
            let removed = state.skills.remove(index);
            tracing::info!("Skill removed: {} ({})", removed.name, removed.id);
            Mutation::Applied(Some(removed))
        }
        None => Mutation::Skipped(None),
    }
}

/// Trimmed name, rejecting blank input
pub(crate) fn require_name(kind: EntityKind, name: &str) -> std::result::Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(ValidationError::EmptyName(kind))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Generate ids until one is unused. UUIDs make a retry practically
/// impossible, but seeded or imported ids share the namespace.
fn fresh_id<I: AsRef<str>>(state: &MatrixSnapshot, generate: impl Fn() -> I) -> I {
    let taken = state.all_ids();
    loop {
        let id = generate();
        if !taken.contains(id.as_ref()) {
            return id;
        }
    }
}

fn load_key<T: DeserializeOwned>(
    backend: &dyn KeyValueStore,
    key: &str,
    default: impl FnOnce() -> Vec<T>,
) -> Result<Vec<T>> {
    match backend.get(key)? {
        Some(raw) => serde_json::from_str(&raw).with_context(|| format!("Parsing stored '{}'", key)),
        None => {
            tracing::debug!("No stored '{}', using defaults", key);
            Ok(default())
        }
    }
}

fn write_key<T: Serialize>(backend: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    backend.set(key, &json)
}
