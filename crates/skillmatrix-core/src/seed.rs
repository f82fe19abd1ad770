//! Collections used when storage holds nothing for a key

use crate::model::{Skill, Team};
use crate::types::SkillCategory;

/// The three default teams
pub fn default_teams() -> Vec<Team> {
    vec![
        Team::new("team1", "Comercial"),
        Team::new("team2", "CIT"),
        Team::new("team3", "Potencial de Mercado"),
    ]
}

/// The five default skills
pub fn default_skills() -> Vec<Skill> {
    vec![
        Skill::new("skill1", "Liderança", SkillCategory::Soft),
        Skill::new("skill2", "Comunicação", SkillCategory::Soft),
        Skill::new("skill3", "Trabalho em Equipe", SkillCategory::Soft),
        Skill::new("skill4", "Excel", SkillCategory::Hard),
        Skill::new("skill5", "PowerPoint", SkillCategory::Hard),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_shape() {
        let teams = default_teams();
        let skills = default_skills();
        assert_eq!(teams.len(), 3);
        assert_eq!(skills.len(), 5);

        let ids: HashSet<_> = skills.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids.len(), skills.len());
        assert_eq!(
            skills.iter().filter(|s| s.category == SkillCategory::Hard).count(),
            2
        );
    }
}
