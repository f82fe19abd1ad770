//! Read-only projections used by the presentation layer

use serde::Serialize;

use crate::error::{MatrixError, Result};
use crate::model::{Collaborator, Skill};
use crate::photo;
use crate::store::{MatrixSnapshot, MatrixStore};
use crate::types::{CollaboratorId, EntityKind, Rating, SkillCategory, TeamId};

/// Team name shown when a collaborator's team no longer exists
pub const NO_TEAM: &str = "No team";

/// Outer ring of the radar chart
pub const RADAR_FULL_MARK: u8 = Rating::MAX_LEVEL;

/// Which collaborators a listing covers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TeamFilter {
    #[default]
    All,
    Team(TeamId),
}

impl TeamFilter {
    pub fn matches(&self, collaborator: &Collaborator) -> bool {
        match self {
            TeamFilter::All => true,
            TeamFilter::Team(id) => &collaborator.team_id == id,
        }
    }
}

impl From<Option<TeamId>> for TeamFilter {
    fn from(team: Option<TeamId>) -> Self {
        team.map_or(TeamFilter::All, TeamFilter::Team)
    }
}

/// A catalog skill joined with one collaborator's entry for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedSkill {
    pub skill: Skill,
    pub rating: Rating,
    pub is_apt: bool,
}

/// Everything the skill card shows for one collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorCard {
    pub collaborator: Collaborator,
    pub team_name: String,
    pub initials: String,
    /// Assigned knowledge skills, in catalog order
    pub knowledge: Vec<AssignedSkill>,
    /// Assigned hard and soft skills, in catalog order
    pub other: Vec<AssignedSkill>,
}

impl CollaboratorCard {
    pub fn assigned(&self) -> impl Iterator<Item = &AssignedSkill> {
        self.knowledge.iter().chain(self.other.iter())
    }
}

/// One axis of the radar chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarPoint {
    pub subject: String,
    pub value: u8,
    pub category: SkillCategory,
    pub full_mark: u8,
}

impl MatrixSnapshot {
    pub fn collaborators_in(&self, filter: &TeamFilter) -> Vec<&Collaborator> {
        self.collaborators.iter().filter(|c| filter.matches(c)).collect()
    }

    pub fn team_name(&self, id: &TeamId) -> String {
        self.team(id)
            .map_or_else(|| NO_TEAM.to_string(), |t| t.name.clone())
    }

    /// Collaborators whose team has been removed
    pub fn orphaned_collaborators(&self) -> Vec<&Collaborator> {
        self.collaborators
            .iter()
            .filter(|c| self.team(&c.team_id).is_none())
            .collect()
    }

    pub fn collaborator_card(&self, id: &CollaboratorId) -> Result<CollaboratorCard> {
        let collaborator = self
            .collaborator(id)
            .ok_or_else(|| MatrixError::not_found(EntityKind::Collaborator, id.as_str()))?;

        let (knowledge, other): (Vec<_>, Vec<_>) = self
            .skills
            .iter()
            .filter_map(|skill| {
                collaborator.rating_for(&skill.id).map(|entry| AssignedSkill {
                    skill: skill.clone(),
                    rating: entry.rating,
                    is_apt: entry.is_apt,
                })
            })
            .partition(|assigned| assigned.skill.category == SkillCategory::Knowledge);

        Ok(CollaboratorCard {
            team_name: self.team_name(&collaborator.team_id),
            initials: photo::initials(&collaborator.name),
            collaborator: collaborator.clone(),
            knowledge,
            other,
        })
    }

    /// Radar axes for every numeric rating; empty means not enough data
    pub fn radar_points(&self, id: &CollaboratorId) -> Result<Vec<RadarPoint>> {
        let collaborator = self
            .collaborator(id)
            .ok_or_else(|| MatrixError::not_found(EntityKind::Collaborator, id.as_str()))?;

        Ok(collaborator
            .skills
            .iter()
            .filter_map(|entry| {
                let value = entry.rating.value()?;
                let skill = self.skill(&entry.skill_id);
                Some(RadarPoint {
                    subject: skill.map(|s| s.name.clone()).unwrap_or_default(),
                    value,
                    category: skill.map_or(SkillCategory::Hard, |s| s.category),
                    full_mark: RADAR_FULL_MARK,
                })
            })
            .collect())
    }
}

impl MatrixStore {
    pub fn collaborators_in(&self, filter: &TeamFilter) -> Vec<Collaborator> {
        self.read(|state| state.collaborators_in(filter).into_iter().cloned().collect())
    }

    pub fn team_name(&self, id: &TeamId) -> String {
        self.read(|state| state.team_name(id))
    }

    pub fn orphaned_collaborators(&self) -> Vec<Collaborator> {
        self.read(|state| state.orphaned_collaborators().into_iter().cloned().collect())
    }

    pub fn collaborator_card(&self, id: &CollaboratorId) -> Result<CollaboratorCard> {
        self.read(|state| state.collaborator_card(id))
    }

    pub fn radar_points(&self, id: &CollaboratorId) -> Result<Vec<RadarPoint>> {
        self.read(|state| state.radar_points(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewCollaborator, SkillRating};

    fn snapshot() -> MatrixSnapshot {
        let mut state = MatrixSnapshot::seeded();
        state.skills.push(Skill::new("skill6", "Rust", SkillCategory::Knowledge));
        state.collaborators.push(Collaborator::from_new(
            CollaboratorId::from("c1"),
            NewCollaborator::new("ana lima", "p", "team2")
                .with_rating(SkillRating::new("skill5", Rating::Basic).apt(true))
                .with_rating(SkillRating::new("skill6", Rating::Expert))
                .with_rating(SkillRating::new("skill1", Rating::NotApplicable))
                .with_rating(SkillRating::new("gone", Rating::Intermediate)),
        ));
        state.collaborators.push(Collaborator::from_new(
            CollaboratorId::from("c2"),
            NewCollaborator::new("Bruno", "p", "team-removed"),
        ));
        state
    }

    #[test]
    fn test_team_filter() {
        let state = snapshot();
        assert_eq!(state.collaborators_in(&TeamFilter::All).len(), 2);
        let cit = state.collaborators_in(&TeamFilter::Team(TeamId::from("team2")));
        assert_eq!(cit.len(), 1);
        assert_eq!(cit[0].id, "c1");
        assert_eq!(TeamFilter::from(None), TeamFilter::All);
    }

    #[test]
    fn test_team_name_and_orphans() {
        let state = snapshot();
        assert_eq!(state.team_name(&TeamId::from("team2")), "CIT");
        assert_eq!(state.team_name(&TeamId::from("team-removed")), NO_TEAM);

        let orphans = state.orphaned_collaborators();
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].name, "Bruno");
    }

    #[test]
    fn test_card_groups_in_catalog_order() {
        let card = snapshot().collaborator_card(&CollaboratorId::from("c1")).unwrap();
        assert_eq!(card.team_name, "CIT");
        assert_eq!(card.initials, "AL");

        let knowledge: Vec<_> = card.knowledge.iter().map(|a| a.skill.name.as_str()).collect();
        let other: Vec<_> = card.other.iter().map(|a| a.skill.name.as_str()).collect();
        assert_eq!(knowledge, vec!["Rust"]);
        // catalog order, not rating order; dangling entries are skipped
        assert_eq!(other, vec!["Liderança", "PowerPoint"]);
        assert!(card.other[1].is_apt);
        assert_eq!(card.assigned().count(), 3);
    }

    #[test]
    fn test_radar_points() {
        let points = snapshot().radar_points(&CollaboratorId::from("c1")).unwrap();
        assert_eq!(
            points,
            vec![
                RadarPoint {
                    subject: "PowerPoint".to_string(),
                    value: 2,
                    category: SkillCategory::Hard,
                    full_mark: 5,
                },
                RadarPoint {
                    subject: "Rust".to_string(),
                    value: 5,
                    category: SkillCategory::Knowledge,
                    full_mark: 5,
                },
                RadarPoint {
                    subject: String::new(),
                    value: 3,
                    category: SkillCategory::Hard,
                    full_mark: 5,
                },
            ]
        );

        let empty = snapshot().radar_points(&CollaboratorId::from("c2")).unwrap();
        assert!(empty.is_empty());
        assert!(snapshot().radar_points(&CollaboratorId::from("nobody")).is_err());
    }
}
