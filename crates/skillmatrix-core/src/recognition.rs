//! Recognition report
//!
//! Per-collaborator aptitude and autonomy ratios, classified against the
//! thresholds in [`RecognitionSettings`].

use serde::Serialize;

use crate::config::RecognitionSettings;
use crate::model::Collaborator;
use crate::store::{MatrixSnapshot, MatrixStore};
use crate::types::{CollaboratorId, TeamId};
use crate::views::TeamFilter;

/// Where a collaborator stands relative to the thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionStatus {
    Eligible,
    Developing,
    NeedsAttention,
}

impl RecognitionStatus {
    pub fn classify(apt_percentage: u8, settings: &RecognitionSettings) -> Self {
        if apt_percentage < settings.attention_threshold {
            RecognitionStatus::NeedsAttention
        } else if apt_percentage >= settings.eligible_threshold {
            RecognitionStatus::Eligible
        } else {
            RecognitionStatus::Developing
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RecognitionStatus::Eligible => "Eligible",
            RecognitionStatus::Developing => "Developing",
            RecognitionStatus::NeedsAttention => "Needs attention",
        }
    }
}

impl std::fmt::Display for RecognitionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorStats {
    pub collaborator_id: CollaboratorId,
    pub name: String,
    pub team_id: TeamId,
    pub total_skills: usize,
    pub apt_skills: usize,
    pub apt_percentage: u8,
    pub advanced_skills: usize,
    pub independent_percentage: u8,
    pub status: RecognitionStatus,
}

impl CollaboratorStats {
    pub fn compute(collaborator: &Collaborator, settings: &RecognitionSettings) -> Self {
        let total_skills = collaborator.skills.len();
        let apt_skills = collaborator.skills.iter().filter(|s| s.is_apt).count();
        let advanced_skills = collaborator
            .skills
            .iter()
            .filter(|s| s.rating.value().map_or(false, |v| v >= settings.advanced_level))
            .count();
        let apt_percentage = percentage(apt_skills, total_skills);

        Self {
            collaborator_id: collaborator.id.clone(),
            name: collaborator.name.clone(),
            team_id: collaborator.team_id.clone(),
            total_skills,
            apt_skills,
            apt_percentage,
            advanced_skills,
            independent_percentage: percentage(advanced_skills, total_skills),
            status: RecognitionStatus::classify(apt_percentage, settings),
        }
    }
}

/// Report over a set of collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionReport {
    pub settings: RecognitionSettings,
    pub rows: Vec<CollaboratorStats>,
}

impl RecognitionReport {
    pub fn build<'a>(
        collaborators: impl IntoIterator<Item = &'a Collaborator>,
        settings: RecognitionSettings,
    ) -> Self {
        let rows = collaborators
            .into_iter()
            .map(|c| CollaboratorStats::compute(c, &settings))
            .collect();
        Self { settings, rows }
    }

    pub fn needing_attention(&self) -> impl Iterator<Item = &CollaboratorStats> {
        self.rows
            .iter()
            .filter(|r| r.status == RecognitionStatus::NeedsAttention)
    }

    pub fn eligible(&self) -> impl Iterator<Item = &CollaboratorStats> {
        self.rows
            .iter()
            .filter(|r| r.status == RecognitionStatus::Eligible)
    }
}

/// `part / total` as a whole percentage, halves rounded up; 0 for an empty total
pub fn percentage(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let rounded = (part * 200 + total) / (2 * total);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

impl MatrixSnapshot {
    pub fn recognition_report(
        &self,
        filter: &TeamFilter,
        settings: RecognitionSettings,
    ) -> RecognitionReport {
        RecognitionReport::build(self.collaborators_in(filter), settings)
    }
}

impl MatrixStore {
    pub fn recognition_report(
        &self,
        filter: &TeamFilter,
        settings: RecognitionSettings,
    ) -> RecognitionReport {
        self.read(|state| state.recognition_report(filter, settings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewCollaborator, SkillRating};
    use crate::types::Rating;
    use proptest::prelude::*;

    fn collaborator(id: &str, team: &str, entries: &[(Rating, bool)]) -> Collaborator {
        let mut new = NewCollaborator::new(id, "p", team);
        for (i, (rating, apt)) in entries.iter().enumerate() {
            new = new.with_rating(SkillRating::new(format!("s{}", i), *rating).apt(*apt));
        }
        Collaborator::from_new(CollaboratorId::from(id), new)
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13); // 12.5 rounds up
        assert_eq!(percentage(3, 3), 100);
    }

    #[test]
    fn test_classification() {
        let settings = RecognitionSettings::default();
        assert_eq!(RecognitionStatus::classify(49, &settings), RecognitionStatus::NeedsAttention);
        assert_eq!(RecognitionStatus::classify(50, &settings), RecognitionStatus::Developing);
        assert_eq!(RecognitionStatus::classify(74, &settings), RecognitionStatus::Developing);
        assert_eq!(RecognitionStatus::classify(75, &settings), RecognitionStatus::Eligible);
    }

    #[test]
    fn test_stats() {
        let c = collaborator(
            "ana",
            "team1",
            &[
                (Rating::Expert, true),
                (Rating::Advanced, true),
                (Rating::NotApplicable, true),
                (Rating::Basic, false),
            ],
        );
        let stats = CollaboratorStats::compute(&c, &RecognitionSettings::default());
        assert_eq!(stats.total_skills, 4);
        assert_eq!(stats.apt_skills, 3);
        assert_eq!(stats.apt_percentage, 75);
        assert_eq!(stats.advanced_skills, 2);
        assert_eq!(stats.independent_percentage, 50);
        assert_eq!(stats.status, RecognitionStatus::Eligible);
    }

    #[test]
    fn test_no_entries_needs_attention() {
        let c = collaborator("bruno", "team1", &[]);
        let stats = CollaboratorStats::compute(&c, &RecognitionSettings::default());
        assert_eq!(stats.apt_percentage, 0);
        assert_eq!(stats.status, RecognitionStatus::NeedsAttention);
    }

    #[test]
    fn test_report_filter() {
        let mut state = MatrixSnapshot::seeded();
        state.collaborators.push(collaborator("a", "team1", &[(Rating::Basic, true)]));
        state.collaborators.push(collaborator("b", "team2", &[(Rating::Basic, false)]));

        let all = state.recognition_report(&TeamFilter::All, RecognitionSettings::default());
        assert_eq!(all.rows.len(), 2);
        assert_eq!(all.eligible().count(), 1);
        let attention: Vec<_> = all.needing_attention().map(|r| r.name.as_str()).collect();
        assert_eq!(attention, vec!["b"]);

        let team1 = state.recognition_report(
            &TeamFilter::Team(TeamId::from("team1")),
            RecognitionSettings::default(),
        );
        assert_eq!(team1.rows.len(), 1);
        assert_eq!(team1.needing_attention().count(), 0);
    }

    proptest! {
        #[test]
        fn prop_percentage_bounds(total in 1usize..500, part_seed in 0usize..500) {
            let part = part_seed % (total + 1);
            let p = percentage(part, total);
            prop_assert!(p <= 100);
            let exact = part as f64 * 100.0 / total as f64;
            prop_assert!((p as f64 - exact).abs() <= 0.5);
        }
    }
}
