//! Entities held by the Matrix Store
//!
//! Field names serialize in camelCase (`teamId`, `isFocal`, `skillId`,
//! `isApt`) so persisted snapshots keep their established layout.

pub mod collaborator;
pub mod skill;
pub mod team;

pub use collaborator::{Collaborator, CollaboratorPatch, NewCollaborator, SkillRating};
pub use skill::{NewSkill, Skill, SkillPatch};
pub use team::{NewTeam, Team};
