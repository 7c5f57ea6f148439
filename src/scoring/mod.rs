pub mod aggregate;
pub mod engine;
pub mod infraction;
pub mod rules;
pub mod validation;

pub use aggregate::{
    compute_total_score, compute_total_score_with, derive_notes, derive_notes_with,
    parse_stage_key, score_summary, score_summary_with, tie_break_key, ScoreSummary, StageKey,
    TieBreakKey,
};
pub use engine::{
    compute_stage_score, compute_stage_score_with, stage_breakdown, Deduction, StageBreakdown,
};
pub use infraction::Infraction;
pub use rules::{round_half_up, DeductionWeights, RuleSet, BRASILIA};
pub use validation::validate_rules;

use crate::sheet::{NotesByStage, RawObservation, StageNumber};

impl RuleSet {
    pub fn stage_score(&self, observation: &RawObservation) -> f64 {
        compute_stage_score_with(observation, self)
    }

    pub fn breakdown(&self, observation: &RawObservation) -> StageBreakdown {
        stage_breakdown(observation, self)
    }

    pub fn derive_notes<'a, K, I>(&self, details: I) -> NotesByStage
    where
        K: StageKey + ?Sized + 'a,
        I: IntoIterator<Item = (&'a K, &'a RawObservation)>,
    {
        derive_notes_with(details, self)
    }

    pub fn total_score(&self, notes: &NotesByStage) -> f64 {
        compute_total_score_with(notes, self)
    }

    pub fn summary(&self, notes: &NotesByStage, number_of_stages: StageNumber) -> ScoreSummary {
        score_summary_with(notes, number_of_stages, self)
    }
}
