use crate::scoring::{parse_stage_key, RuleSet, StageBreakdown, TieBreakKey};
use crate::sheet::coerce::{lenient_notes, lenient_score_sheet, lenient_stage_count};
use crate::sheet::{NotesByStage, ScoreSheet, StageNumber};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category name used for entries that were registered without one.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A competition as exported by the judging workflow.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    #[serde(default)]
    pub name: String,

    /// Declared number of stages (default: 1, also used for unusable values)
    #[serde(default = "default_stages", deserialize_with = "lenient_stage_count")]
    pub number_of_stages: StageNumber,

    /// Rule set to score with; falls back to config, then the built-in set
    #[serde(default)]
    pub rule_set: Option<String>,

    #[serde(default)]
    pub entries: Vec<Entry>,
}

fn default_stages() -> StageNumber {
    1
}

/// One competitor's registration and score sheet.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default)]
    pub id: Option<String>,

    pub competitor: String,

    #[serde(default)]
    pub category: Option<String>,

    /// Earlier registrations win ties that survive every stage
    #[serde(default)]
    pub registered_at: Option<DateTime<Utc>>,

    /// Stage marks typed directly, keyed by stage as written
    #[serde(default, deserialize_with = "lenient_notes")]
    pub notes: BTreeMap<String, f64>,

    /// Detailed observations per stage
    #[serde(default, deserialize_with = "lenient_score_sheet")]
    pub score_details: ScoreSheet,
}

impl Entry {
    pub fn new(competitor: impl Into<String>) -> Self {
        Self {
            id: None,
            competitor: competitor.into(),
            category: None,
            registered_at: None,
            notes: BTreeMap::new(),
            score_details: ScoreSheet::new(),
        }
    }

    pub fn category_or_default(&self) -> &str {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(UNCATEGORIZED)
    }

    /// Stage scores for this entry: recorded marks, overridden stage by stage
    /// by whatever the detailed observations produce.
    pub fn effective_notes(&self, rules: &RuleSet) -> NotesByStage {
        let mut notes: NotesByStage = self
            .notes
            .iter()
            .filter_map(|(key, mark)| parse_stage_key(key).map(|stage| (stage, *mark)))
            .collect();
        notes.extend(rules.derive_notes(&self.score_details));
        notes
    }

    /// Breakdown of every detailed stage, in stage order. Keys naming the same
    /// stage resolve the way [`Entry::effective_notes`] resolves them.
    pub fn stage_breakdowns(&self, rules: &RuleSet) -> Vec<(StageNumber, StageBreakdown)> {
        let mut by_stage = BTreeMap::new();
        for (key, obs) in &self.score_details {
            if let Some(stage) = parse_stage_key(key) {
                by_stage.insert(stage, rules.breakdown(obs));
            }
        }
        by_stage.into_iter().collect()
    }
}

/// A ranked entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub placement: usize,
    pub championship_points: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
    pub competitor: String,
    pub category: String,
    pub notes: NotesByStage,
    pub total_score: f64,
    pub tie_break_key: TieBreakKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::RawObservation;

    #[test]
    fn test_parse_tournament() {
        let json = r#"{
            "name": "Spring Cup",
            "numberOfStages": 2,
            "ruleSet": "brasilia",
            "entries": [
                {
                    "id": "a1",
                    "competitor": "Trovão",
                    "category": "Pardo - Repetição",
                    "registeredAt": "2026-03-01T12:00:00Z",
                    "notes": {"1": 8.5},
                    "scoreDetails": {"2": {"baseScore": 9, "omissionCount": 2}}
                },
                {"competitor": "Relâmpago"}
            ]
        }"#;
        let t: Tournament = serde_json::from_str(json).unwrap();
        assert_eq!(t.name, "Spring Cup");
        assert_eq!(t.number_of_stages, 2);
        assert_eq!(t.rule_set.as_deref(), Some("brasilia"));
        assert_eq!(t.entries.len(), 2);
        assert!(t.entries[0].registered_at.is_some());
        assert!(t.entries[1].notes.is_empty());
        assert!(t.entries[1].score_details.is_empty());
    }

    #[test]
    fn test_parse_tournament_with_malformed_fields() {
        let json = r#"{
            "name": "Autumn Cup",
            "numberOfStages": null,
            "entries": [
                {"competitor": "Trovão", "scoreDetails": null},
                {
                    "competitor": "Relâmpago",
                    "scoreDetails": {"1": null, "2": {"baseScore": 9, "omissionCount": 1}}
                },
                {"competitor": "Ventania", "scoreDetails": "n/a"}
            ]
        }"#;
        let t: Tournament = serde_json::from_str(json).unwrap();
        assert_eq!(t.number_of_stages, 1);
        assert_eq!(t.entries.len(), 3);
        assert!(t.entries[0].score_details.is_empty());
        assert_eq!(t.entries[1].score_details.len(), 1);
        assert_eq!(t.entries[1].score_details["2"].omission_count, 1);
        assert!(t.entries[2].score_details.is_empty());

        let notes = t.entries[1].effective_notes(&RuleSet::brasilia());
        assert_eq!(notes[&2], 8.9);
    }

    #[test]
    fn test_unusable_stage_count_reads_as_one() {
        for stages in ["0", "-3", "\"three\"", "[]"] {
            let json = format!(r#"{{"numberOfStages": {}}}"#, stages);
            let t: Tournament = serde_json::from_str(&json).unwrap();
            assert_eq!(t.number_of_stages, 1, "{}", stages);
        }
        let t: Tournament = serde_json::from_str(r#"{"numberOfStages": "3"}"#).unwrap();
        assert_eq!(t.number_of_stages, 3);
    }

    #[test]
    fn test_stage_breakdowns_match_effective_notes() {
        let mut entry = Entry::new("Trovão");
        entry
            .score_details
            .insert("3".to_string(), RawObservation::with_base(7.0));
        entry
            .score_details
            .insert("03".to_string(), RawObservation::with_base(9.0));
        entry
            .score_details
            .insert("1".to_string(), RawObservation::with_base(8.0));
        entry
            .score_details
            .insert("x".to_string(), RawObservation::with_base(5.0));

        let rules = RuleSet::brasilia();
        let breakdowns = entry.stage_breakdowns(&rules);
        let stages: Vec<_> = breakdowns.iter().map(|(stage, _)| *stage).collect();
        assert_eq!(stages, vec![1, 3]);

        let notes = entry.effective_notes(&rules);
        for (stage, b) in &breakdowns {
            assert_eq!(notes[stage], b.score);
        }
    }

    #[test]
    fn test_tournament_defaults() {
        let t: Tournament = serde_json::from_str("{}").unwrap();
        assert_eq!(t.number_of_stages, 1);
        assert!(t.rule_set.is_none());
        assert!(t.entries.is_empty());
    }

    #[test]
    fn test_effective_notes_details_override_recorded() {
        let mut entry = Entry::new("Trovão");
        entry.notes.insert("1".to_string(), 8.5);
        entry.notes.insert("2".to_string(), 6.0);
        entry.notes.insert("bogus".to_string(), 9.0);
        entry
            .score_details
            .insert("2".to_string(), RawObservation::with_base(9.5));

        let notes = entry.effective_notes(&RuleSet::brasilia());
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[&1], 8.5);
        assert_eq!(notes[&2], 9.5);
    }

    #[test]
    fn test_category_default() {
        let mut entry = Entry::new("x");
        assert_eq!(entry.category_or_default(), UNCATEGORIZED);
        entry.category = Some("  ".to_string());
        assert_eq!(entry.category_or_default(), UNCATEGORIZED);
        entry.category = Some("Preto".to_string());
        assert_eq!(entry.category_or_default(), "Preto");
    }
}
