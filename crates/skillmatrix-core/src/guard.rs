//! Referential removal guards
//!
//! The raw `remove_team` / `remove_skill` operations never look at the
//! collaborators. These guarded variants refuse to remove an entity that is
//! still referenced, and run the check and the removal under the same write
//! lock so nothing can start referencing it in between.

use crate::error::{ConstraintError, MatrixError, Result};
use crate::model::{Skill, Team};
use crate::store::{remove_skill_unchecked, remove_team_unchecked, MatrixSnapshot, MatrixStore};
use crate::types::{EntityKind, SkillId, TeamId};

impl MatrixSnapshot {
    /// Number of collaborators holding a rating entry for the skill
    pub fn skill_usage(&self, id: &SkillId) -> usize {
        self.collaborators.iter().filter(|c| c.has_skill(id)).count()
    }

    /// Number of collaborators belonging to the team
    pub fn team_member_count(&self, id: &TeamId) -> usize {
        self.collaborators.iter().filter(|c| &c.team_id == id).count()
    }
}

impl MatrixStore {
    pub fn skill_usage(&self, id: &SkillId) -> usize {
        self.read(|state| state.skill_usage(id))
    }

    pub fn team_member_count(&self, id: &TeamId) -> usize {
        self.read(|state| state.team_member_count(id))
    }

    /// Remove a skill nobody is rated in.
    ///
    /// Fails with [`ConstraintError::SkillInUse`] while any collaborator has
    /// an entry for it, and with `NotFound` when the id is unknown.
    pub fn try_remove_skill(&self, id: &SkillId) -> Result<Skill> {
        self.mutate(|state| {
            let skill = state
                .skill(id)
                .ok_or_else(|| MatrixError::not_found(EntityKind::Skill, id.as_str()))?;
            let collaborators = state.skill_usage(id);
            if collaborators > 0 {
                tracing::warn!("Refusing to remove skill {}: {} collaborator(s) rated", id, collaborators);
                return Err(ConstraintError::SkillInUse {
                    name: skill.name.clone(),
                    collaborators,
                }
                .into());
            }
            Ok(remove_skill_unchecked(state, id))
        })?
        .ok_or_else(|| MatrixError::not_found(EntityKind::Skill, id.as_str()))
    }

    /// Remove a team without members.
    ///
    /// Fails with [`ConstraintError::TeamInUse`] while any collaborator
    /// belongs to it, and with `NotFound` when the id is unknown.
    pub fn try_remove_team(&self, id: &TeamId) -> Result<Team> {
        self.mutate(|state| {
            let team = state
                .team(id)
                .ok_or_else(|| MatrixError::not_found(EntityKind::Team, id.as_str()))?;
            let members = state.team_member_count(id);
            if members > 0 {
                tracing::warn!("Refusing to remove team {}: {} member(s)", id, members);
                return Err(ConstraintError::TeamInUse {
                    name: team.name.clone(),
                    members,
                }
                .into());
            }
            Ok(remove_team_unchecked(state, id))
        })?
        .ok_or_else(|| MatrixError::not_found(EntityKind::Team, id.as_str()))
    }
}
