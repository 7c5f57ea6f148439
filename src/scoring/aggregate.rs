//! Stage-score aggregation: batch derivation, totals and tie-break keys.
//!
//! Everything here is total over its input. Malformed stage keys are skipped,
//! non-finite marks count as 0, and nothing mutates its arguments.

use super::engine::compute_stage_score_with;
use super::rules::RuleSet;
use crate::sheet::{NotesByStage, RawObservation, StageNumber};
use serde::Serialize;
use std::cmp::Ordering;

/// Anything that can name a stage: stage numbers themselves, or the numeric
/// strings used as keys in stored score sheets.
pub trait StageKey {
    /// The stage this key names, or `None` if it is not a positive integer.
    fn stage_number(&self) -> Option<StageNumber>;
}

impl StageKey for str {
    fn stage_number(&self) -> Option<StageNumber> {
        parse_stage_key(self)
    }
}

impl StageKey for String {
    fn stage_number(&self) -> Option<StageNumber> {
        parse_stage_key(self)
    }
}

impl<T: StageKey + ?Sized> StageKey for &T {
    fn stage_number(&self) -> Option<StageNumber> {
        (**self).stage_number()
    }
}

macro_rules! int_stage_key {
    ($($t:ty),*) => {
        $(
            impl StageKey for $t {
                fn stage_number(&self) -> Option<StageNumber> {
                    StageNumber::try_from(*self).ok().filter(|n| *n >= 1)
                }
            }
        )*
    };
}

int_stage_key!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

/// Parse a stage key such as `"3"`, `" 03 "` or `"3.0"`.
///
/// Zero, negative, fractional and non-numeric keys yield `None`.
pub fn parse_stage_key(key: &str) -> Option<StageNumber> {
    let key = key.trim();
    if let Ok(n) = key.parse::<u64>() {
        return StageNumber::try_from(n).ok().filter(|n| *n >= 1);
    }
    let value = key.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value >= 1.0 && value <= StageNumber::MAX as f64
    {
        Some(value as StageNumber)
    } else {
        None
    }
}

/// Comparison values for breaking ties between equal totals, last stage first.
///
/// A greater key wins: keys compare element by element from index 0, which
/// holds the final stage's score.
#[derive(Debug, Clone, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct TieBreakKey(Vec<f64>);

impl TieBreakKey {
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total ordering over keys built by [`tie_break_key`], whose values are
    /// always finite.
    pub fn compare(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

impl From<Vec<f64>> for TieBreakKey {
    fn from(values: Vec<f64>) -> Self {
        Self(values.into_iter().map(finite_or_zero).collect())
    }
}

/// What a leaderboard needs to rank one competitor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub total_score: f64,
    pub tie_break_key: TieBreakKey,
}

impl ScoreSummary {
    /// Ranking order: higher total first, then the greater tie-break key.
    /// `Ordering::Less` means `self` ranks ahead of `other`.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .total_score
            .partial_cmp(&self.total_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.tie_break_key.compare(&self.tie_break_key))
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Score every stage of a sheet under the built-in rule set.
pub fn derive_notes<'a, K, I>(details: I) -> NotesByStage
where
    K: StageKey + ?Sized + 'a,
    I: IntoIterator<Item = (&'a K, &'a RawObservation)>,
{
    derive_notes_with(details, RuleSet::builtin_brasilia())
}

/// Score every stage of a sheet under `rules`.
///
/// Entries whose key is not a stage number are skipped. If two keys name the
/// same stage (`"3"` and `"03"`), the later one in iteration order wins.
pub fn derive_notes_with<'a, K, I>(details: I, rules: &RuleSet) -> NotesByStage
where
    K: StageKey + ?Sized + 'a,
    I: IntoIterator<Item = (&'a K, &'a RawObservation)>,
{
    let mut notes = NotesByStage::new();
    for (key, observation) in details {
        match key.stage_number() {
            Some(stage) => {
                let score = compute_stage_score_with(observation, rules);
                if notes.insert(stage, score).is_some() {
                    tracing::warn!(stage, "stage listed twice, keeping the later entry");
                }
            }
            None => tracing::debug!("skipping score sheet entry with malformed stage key"),
        }
    }
    notes
}

/// Sum of stage scores, rounded to two decimals. Not clamped.
pub fn compute_total_score(notes: &NotesByStage) -> f64 {
    compute_total_score_with(notes, RuleSet::builtin_brasilia())
}

/// Sum of stage scores, rounded to the precision of `rules`.
pub fn compute_total_score_with(notes: &NotesByStage, rules: &RuleSet) -> f64 {
    let total: f64 = notes.values().copied().map(finite_or_zero).sum();
    rules.round(total)
}

/// Build the tie-break key for a competition of `number_of_stages` stages.
///
/// Reads stages `N, N-1, ..., 1`; a stage with no score contributes 0.
/// Zero stages gives an empty key.
pub fn tie_break_key(notes: &NotesByStage, number_of_stages: StageNumber) -> TieBreakKey {
    TieBreakKey(
        (1..=number_of_stages)
            .rev()
            .map(|stage| notes.get(&stage).copied().map(finite_or_zero).unwrap_or(0.0))
            .collect(),
    )
}

/// Total and tie-break key together.
pub fn score_summary(notes: &NotesByStage, number_of_stages: StageNumber) -> ScoreSummary {
    score_summary_with(notes, number_of_stages, RuleSet::builtin_brasilia())
}

pub fn score_summary_with(
    notes: &NotesByStage,
    number_of_stages: StageNumber,
    rules: &RuleSet,
) -> ScoreSummary {
    ScoreSummary {
        total_score: compute_total_score_with(notes, rules),
        tie_break_key: tie_break_key(notes, number_of_stages),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Infraction;
    use crate::sheet::ScoreSheet;
    use std::collections::{BTreeMap, HashMap};

    fn notes(pairs: &[(StageNumber, f64)]) -> NotesByStage {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_parse_stage_key() {
        assert_eq!(parse_stage_key("1"), Some(1));
        assert_eq!(parse_stage_key(" 12 "), Some(12));
        assert_eq!(parse_stage_key("03"), Some(3));
        assert_eq!(parse_stage_key("3.0"), Some(3));
        assert_eq!(parse_stage_key("3.5"), None);
        assert_eq!(parse_stage_key("0"), None);
        assert_eq!(parse_stage_key("-2"), None);
        assert_eq!(parse_stage_key(""), None);
        assert_eq!(parse_stage_key("final"), None);
        assert_eq!(parse_stage_key("NaN"), None);
        assert_eq!(parse_stage_key("99999999999"), None);
    }

    #[test]
    fn test_integer_stage_keys() {
        assert_eq!(2u32.stage_number(), Some(2));
        assert_eq!(0u32.stage_number(), None);
        assert_eq!((-1i64).stage_number(), None);
        assert_eq!(7usize.stage_number(), Some(7));
    }

    #[test]
    fn test_derive_notes_from_string_keys() {
        let mut sheet = ScoreSheet::new();
        sheet.insert(
            "1".to_string(),
            RawObservation::with_base(9.0)
                .with_count(Infraction::StrangeNotes, 2)
                .with_count(Infraction::Remontagem, 1),
        );
        sheet.insert("2".to_string(), RawObservation::with_base(10.0));

        let derived = derive_notes(&sheet);
        assert_eq!(derived, notes(&[(1, 7.5), (2, 10.0)]));
        assert_eq!(compute_total_score(&derived), 17.5);
    }

    #[test]
    fn test_derive_notes_skips_malformed_keys() {
        let mut sheet = ScoreSheet::new();
        sheet.insert("1".to_string(), RawObservation::with_base(8.0));
        sheet.insert("abc".to_string(), RawObservation::with_base(9.0));
        sheet.insert("".to_string(), RawObservation::with_base(9.0));
        sheet.insert("2.5".to_string(), RawObservation::with_base(9.0));

        let derived = derive_notes(&sheet);
        assert_eq!(derived, notes(&[(1, 8.0)]));
    }

    #[test]
    fn test_derive_notes_from_numeric_keys() {
        let mut sheet: HashMap<u32, RawObservation> = HashMap::new();
        sheet.insert(3, RawObservation::with_base(6.0));
        sheet.insert(0, RawObservation::with_base(6.0));

        let derived = derive_notes(&sheet);
        assert_eq!(derived, notes(&[(3, 6.0)]));
    }

    #[test]
    fn test_derive_notes_duplicate_keys_later_wins() {
        // BTreeMap iterates "03" before "3"
        let mut sheet = ScoreSheet::new();
        sheet.insert("03".to_string(), RawObservation::with_base(5.0));
        sheet.insert("3".to_string(), RawObservation::with_base(6.0));

        let derived = derive_notes(&sheet);
        assert_eq!(derived, notes(&[(3, 6.0)]));
    }

    #[test]
    fn test_derive_notes_empty() {
        let sheet = ScoreSheet::new();
        assert!(derive_notes(&sheet).is_empty());
    }

    #[test]
    fn test_total_of_empty_is_zero() {
        assert_eq!(compute_total_score(&NotesByStage::new()), 0.0);
    }

    #[test]
    fn test_total_sums_stages() {
        assert_eq!(compute_total_score(&notes(&[(1, 10.0), (2, 10.0)])), 20.0);
        assert_eq!(compute_total_score(&notes(&[(1, 0.1), (2, 0.2)])), 0.3);
        assert_eq!(compute_total_score(&notes(&[(2, 9.75), (7, 8.33)])), 18.08);
    }

    #[test]
    fn test_total_ignores_non_finite_marks() {
        let n = notes(&[(1, 9.0), (2, f64::NAN), (3, f64::INFINITY)]);
        assert_eq!(compute_total_score(&n), 9.0);
    }

    #[test]
    fn test_total_is_not_clamped() {
        let n: NotesByStage = (1..=5).map(|s| (s, 10.0)).collect();
        assert_eq!(compute_total_score(&n), 50.0);
    }

    #[test]
    fn test_tie_break_key_last_stage_first() {
        let a = tie_break_key(&notes(&[(1, 5.0), (2, 5.0), (3, 9.0)]), 3);
        let b = tie_break_key(&notes(&[(1, 9.0), (2, 5.0), (3, 5.0)]), 3);
        assert_eq!(a.values(), &[9.0, 5.0, 5.0]);
        assert_eq!(b.values(), &[5.0, 5.0, 9.0]);
        assert_eq!(a.compare(&b), Ordering::Greater);
    }

    #[test]
    fn test_tie_break_key_missing_stage_is_zero() {
        let key = tie_break_key(&notes(&[(1, 10.0)]), 3);
        assert_eq!(key.values(), &[0.0, 0.0, 10.0]);
    }

    #[test]
    fn test_tie_break_key_ignores_stages_beyond_count() {
        let key = tie_break_key(&notes(&[(1, 7.0), (4, 9.0)]), 2);
        assert_eq!(key.values(), &[0.0, 7.0]);
    }

    #[test]
    fn test_tie_break_key_zero_stages_is_empty() {
        let key = tie_break_key(&notes(&[(1, 7.0)]), 0);
        assert!(key.is_empty());
    }

    #[test]
    fn test_tie_break_key_from_vec_sanitizes() {
        let key = TieBreakKey::from(vec![f64::NAN, 3.0]);
        assert_eq!(key.values(), &[0.0, 3.0]);
    }

    #[test]
    fn test_summary_ranks_recent_stage_first() {
        let a = score_summary(&notes(&[(1, 5.0), (2, 5.0), (3, 9.0)]), 3);
        let b = score_summary(&notes(&[(1, 9.0), (2, 5.0), (3, 5.0)]), 3);
        assert_eq!(a.total_score, 19.0);
        assert_eq!(b.total_score, 19.0);
        assert_eq!(a.rank_cmp(&b), Ordering::Less);
        assert_eq!(b.rank_cmp(&a), Ordering::Greater);
    }

    #[test]
    fn test_summary_total_dominates_tie_break() {
        let a = score_summary(&notes(&[(1, 10.0), (2, 1.0)]), 2);
        let b = score_summary(&notes(&[(1, 1.0), (2, 9.0)]), 2);
        assert_eq!(a.rank_cmp(&b), Ordering::Less);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let s = score_summary(&notes(&[(1, 7.5), (2, 10.0)]), 2);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["totalScore"], 17.5);
        assert_eq!(json["tieBreakKey"], serde_json::json!([10.0, 7.5]));
    }

    #[test]
    fn test_functions_are_repeatable() {
        let mut sheet: BTreeMap<String, RawObservation> = BTreeMap::new();
        sheet.insert(
            "1".to_string(),
            RawObservation::with_base(8.8).with_count(Infraction::Omission, 7),
        );
        let first = derive_notes(&sheet);
        let second = derive_notes(&sheet);
        assert_eq!(first, second);
        assert_eq!(
            compute_total_score(&first).to_bits(),
            compute_total_score(&second).to_bits()
        );
        assert_eq!(tie_break_key(&first, 2), tie_break_key(&second, 2));
    }
}
