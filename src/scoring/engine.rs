use super::infraction::Infraction;
use super::rules::RuleSet;
use crate::sheet::RawObservation;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deduction {
    pub infraction: Infraction,
    pub count: u32,
    pub weight: f64,  // Per-occurrence penalty from the rule set
    pub amount: f64,  // count * weight
}

/// How a stage score was reached, for audit and display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageBreakdown {
    pub base_score: f64,
    /// Only categories with at least one occurrence.
    pub deductions: Vec<Deduction>,
    pub total_deduction: f64,
    /// `base_score - total_deduction`, before clamping and rounding.
    pub raw: f64,
    /// True when `raw` fell outside the scale (or was not a number).
    pub clamped: bool,
    pub score: f64,
}

/// Score one stage under the built-in rule set.
pub fn compute_stage_score(observation: &RawObservation) -> f64 {
    compute_stage_score_with(observation, RuleSet::builtin_brasilia())
}

/// Score one stage under `rules`. Never fails: a raw value that is not a
/// finite number scores 0 (kept inside the scale).
pub fn compute_stage_score_with(observation: &RawObservation, rules: &RuleSet) -> f64 {
    let total_deduction: f64 = rules
        .weights
        .iter()
        .map(|(infraction, weight)| (observation.count(infraction), weight))
        .filter(|(count, _)| *count > 0)
        .map(|(count, weight)| count as f64 * weight)
        .sum();
    settle(observation.base_score, total_deduction, rules).0
}

pub fn stage_breakdown(observation: &RawObservation, rules: &RuleSet) -> StageBreakdown {
    let base_score = observation.base_score;

    let deductions: Vec<Deduction> = rules
        .weights
        .iter()
        .filter_map(|(infraction, weight)| {
            let count = observation.count(infraction);
            (count > 0).then(|| Deduction {
                infraction,
                count,
                weight,
                amount: count as f64 * weight,
            })
        })
        .collect();

    let total_deduction: f64 = deductions.iter().map(|d| d.amount).sum();
    let raw = base_score - total_deduction;
    let (score, clamped) = settle(base_score, total_deduction, rules);

    StageBreakdown {
        base_score,
        deductions,
        total_deduction,
        raw,
        clamped,
        score,
    }
}

/// Clamp and round `base_score - total_deduction`. Returns the score and
/// whether the raw value had to be pulled onto the scale.
fn settle(base_score: f64, total_deduction: f64, rules: &RuleSet) -> (f64, bool) {
    let raw = base_score - total_deduction;
    if raw.is_finite() {
        let bounded = rules.clamp(raw);
        (rules.round(bounded), bounded != raw)
    } else {
        tracing::debug!(base_score, total_deduction, "stage score is not a number, using 0");
        (rules.round(rules.clamp(0.0)), true)
    }
}
