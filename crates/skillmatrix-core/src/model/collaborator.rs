use serde::{Deserialize, Serialize};

use crate::types::{CollaboratorId, Rating, SkillId, TeamId};

/// Rating of one collaborator in one skill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRating {
    pub skill_id: SkillId,
    pub rating: Rating,
    /// Qualified to perform the associated task, independent of `rating`
    pub is_apt: bool,
}

impl SkillRating {
    pub fn new(skill_id: impl Into<SkillId>, rating: Rating) -> Self {
        Self {
            skill_id: skill_id.into(),
            rating,
            is_apt: false,
        }
    }

    pub fn apt(mut self, is_apt: bool) -> Self {
        self.is_apt = is_apt;
        self
    }
}

/// A tracked individual
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub id: CollaboratorId,
    pub name: String,
    /// Data-URI of an uploaded image or a placeholder avatar URL
    pub photo: String,
    /// At most one entry per skill, in insertion order
    pub skills: Vec<SkillRating>,
    pub is_focal: bool,
    pub team_id: TeamId,
}

impl Collaborator {
    pub(crate) fn from_new(id: CollaboratorId, new: NewCollaborator) -> Self {
        Self {
            id,
            name: new.name,
            photo: new.photo,
            skills: dedup_ratings(new.skills),
            is_focal: new.is_focal,
            team_id: new.team_id,
        }
    }

    pub fn rating_for(&self, skill_id: &SkillId) -> Option<&SkillRating> {
        self.skills.iter().find(|s| &s.skill_id == skill_id)
    }

    pub fn has_skill(&self, skill_id: &SkillId) -> bool {
        self.rating_for(skill_id).is_some()
    }

    /// Update the rating in place, or append a new non-apt entry
    pub fn set_rating(&mut self, skill_id: &SkillId, rating: Rating) {
        match self.skills.iter_mut().find(|s| &s.skill_id == skill_id) {
            Some(entry) => entry.rating = rating,
            None => self.skills.push(SkillRating::new(skill_id.clone(), rating)),
        }
    }

    /// Flip `is_apt` on an existing entry. Returns the new value, or `None`
    /// when the collaborator has no entry for the skill.
    pub fn toggle_aptitude(&mut self, skill_id: &SkillId) -> Option<bool> {
        let entry = self.skills.iter_mut().find(|s| &s.skill_id == skill_id)?;
        entry.is_apt = !entry.is_apt;
        Some(entry.is_apt)
    }

    /// Merge a patch in place
    pub fn apply(&mut self, patch: CollaboratorPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(photo) = patch.photo {
            self.photo = photo;
        }
        if let Some(team_id) = patch.team_id {
            self.team_id = team_id;
        }
        if let Some(is_focal) = patch.is_focal {
            self.is_focal = is_focal;
        }
        if let Some(skills) = patch.skills {
            self.skills = dedup_ratings(skills);
        }
    }
}

/// Collaborator fields supplied on creation; the store assigns the id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCollaborator {
    pub name: String,
    pub photo: String,
    pub team_id: TeamId,
    #[serde(default)]
    pub skills: Vec<SkillRating>,
    #[serde(default)]
    pub is_focal: bool,
}

impl NewCollaborator {
    pub fn new(name: impl Into<String>, photo: impl Into<String>, team_id: impl Into<TeamId>) -> Self {
        Self {
            name: name.into(),
            photo: photo.into(),
            team_id: team_id.into(),
            skills: Vec::new(),
            is_focal: false,
        }
    }

    pub fn with_rating(mut self, rating: SkillRating) -> Self {
        self.skills.push(rating);
        self
    }

    pub fn focal(mut self, is_focal: bool) -> Self {
        self.is_focal = is_focal;
        self
    }
}

/// Partial collaborator update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorPatch {
    pub name: Option<String>,
    pub photo: Option<String>,
    pub team_id: Option<TeamId>,
    pub is_focal: Option<bool>,
    pub skills: Option<Vec<SkillRating>>,
}

impl CollaboratorPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn photo(mut self, photo: impl Into<String>) -> Self {
        self.photo = Some(photo.into());
        self
    }

    pub fn team(mut self, team_id: impl Into<TeamId>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }

    pub fn focal(mut self, is_focal: bool) -> Self {
        self.is_focal = Some(is_focal);
        self
    }

    pub fn skills(mut self, skills: Vec<SkillRating>) -> Self {
        self.skills = Some(skills);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.photo.is_none()
            && self.team_id.is_none()
            && self.is_focal.is_none()
            && self.skills.is_none()
    }
}

/// Collapse duplicate skill entries: the first occurrence keeps its position,
/// the last occurrence provides the value.
fn dedup_ratings(ratings: Vec<SkillRating>) -> Vec<SkillRating> {
    let mut out: Vec<SkillRating> = Vec::with_capacity(ratings.len());
    for rating in ratings {
        match out.iter_mut().find(|r| r.skill_id == rating.skill_id) {
            Some(existing) => *existing = rating,
            None => out.push(rating),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Collaborator {
        Collaborator::from_new(
            CollaboratorId::from("collaborator-1"),
            NewCollaborator::new("Ana Lima", "photo", "team1"),
        )
    }

    #[test]
    fn test_set_rating_appends_then_updates() {
        let mut c = sample();
        let excel = SkillId::from("skill4");
        c.set_rating(&excel, Rating::Basic);
        c.set_rating(&SkillId::from("skill1"), Rating::Expert);
        c.set_rating(&excel, Rating::Advanced);

        assert_eq!(c.skills.len(), 2);
        assert_eq!(c.skills[0].skill_id, "skill4");
        assert_eq!(c.skills[0].rating, Rating::Advanced);
        assert!(!c.skills[0].is_apt);
    }

    #[test]
    fn test_toggle_aptitude_requires_entry() {
        let mut c = sample();
        let skill = SkillId::from("skill2");
        assert_eq!(c.toggle_aptitude(&skill), None);
        assert!(c.skills.is_empty());

        c.set_rating(&skill, Rating::Novice);
        assert_eq!(c.toggle_aptitude(&skill), Some(true));
        assert_eq!(c.toggle_aptitude(&skill), Some(false));
    }

    #[test]
    fn test_patch_dedups_skills() {
        let mut c = sample();
        c.apply(CollaboratorPatch::default().name("Ana L.").skills(vec![
            SkillRating::new("skill1", Rating::Basic),
            SkillRating::new("skill2", Rating::Basic),
            SkillRating::new("skill1", Rating::Expert).apt(true),
        ]));

        assert_eq!(c.name, "Ana L.");
        assert_eq!(c.skills.len(), 2);
        assert_eq!(c.skills[0].rating, Rating::Expert);
        assert!(c.skills[0].is_apt);
        assert_eq!(c.photo, "photo");
    }

    #[test]
    fn test_camel_case_layout() {
        let mut c = sample();
        c.set_rating(&SkillId::from("skill1"), Rating::NotApplicable);
        let json = serde_json::to_value(&c).unwrap();

        assert_eq!(json["teamId"], "team1");
        assert_eq!(json["isFocal"], false);
        assert_eq!(json["skills"][0]["skillId"], "skill1");
        assert_eq!(json["skills"][0]["rating"], "N/A");
        assert_eq!(json["skills"][0]["isApt"], false);
    }
}
