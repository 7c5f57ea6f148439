use super::coerce::{lenient_count, lenient_f64};
use crate::scoring::Infraction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A round within a competition, numbered from 1.
pub type StageNumber = u32;

/// One judge's observations for one competitor in one stage.
///
/// Every field is optional on input. Missing and non-numeric values read as 0.
/// Field names follow the judging form (`baseScore`, `strangeNotes`, ...);
/// snake_case spellings are accepted too.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawObservation {
    /// Starting mark before deductions, nominally 0-10.
    #[serde(default, alias = "base_score", deserialize_with = "lenient_f64")]
    pub base_score: f64,

    #[serde(default, alias = "strange_notes", deserialize_with = "lenient_count")]
    pub strange_notes: u32,

    #[serde(default, alias = "grouped_calls", deserialize_with = "lenient_count")]
    pub grouped_calls: u32,

    #[serde(default, alias = "return_count", deserialize_with = "lenient_count")]
    pub return_count: u32,

    #[serde(
        default,
        alias = "rasgada_return_count",
        deserialize_with = "lenient_count"
    )]
    pub rasgada_return_count: u32,

    #[serde(default, alias = "remontagem_count", deserialize_with = "lenient_count")]
    pub remontagem_count: u32,

    #[serde(
        default,
        alias = "start_without_entry_count",
        deserialize_with = "lenient_count"
    )]
    pub start_without_entry_count: u32,

    #[serde(default, alias = "omission_count", deserialize_with = "lenient_count")]
    pub omission_count: u32,

    #[serde(
        default,
        alias = "invalid_chant_count",
        deserialize_with = "lenient_count"
    )]
    pub invalid_chant_count: u32,
}

impl RawObservation {
    /// An observation with only a base score and no infractions.
    pub fn with_base(base_score: f64) -> Self {
        Self {
            base_score,
            ..Self::default()
        }
    }

    /// Builder-style setter for one infraction counter.
    pub fn with_count(mut self, infraction: Infraction, count: u32) -> Self {
        *self.count_mut(infraction) = count;
        self
    }

    /// Number of recorded occurrences of `infraction`.
    pub fn count(&self, infraction: Infraction) -> u32 {
        match infraction {
            Infraction::StrangeNotes => self.strange_notes,
            Infraction::GroupedCalls => self.grouped_calls,
            Infraction::Return => self.return_count,
            Infraction::RasgadaReturn => self.rasgada_return_count,
            Infraction::Remontagem => self.remontagem_count,
            Infraction::StartWithoutEntry => self.start_without_entry_count,
            Infraction::Omission => self.omission_count,
            Infraction::InvalidChant => self.invalid_chant_count,
        }
    }

    fn count_mut(&mut self, infraction: Infraction) -> &mut u32 {
        match infraction {
            Infraction::StrangeNotes => &mut self.strange_notes,
            Infraction::GroupedCalls => &mut self.grouped_calls,
            Infraction::Return => &mut self.return_count,
            Infraction::RasgadaReturn => &mut self.rasgada_return_count,
            Infraction::Remontagem => &mut self.remontagem_count,
            Infraction::StartWithoutEntry => &mut self.start_without_entry_count,
            Infraction::Omission => &mut self.omission_count,
            Infraction::InvalidChant => &mut self.invalid_chant_count,
        }
    }

    /// True when no infraction was recorded.
    pub fn is_clean(&self) -> bool {
        Infraction::ALL.iter().all(|i| self.count(*i) == 0)
    }
}

/// A competitor's observations keyed by stage, keys kept as written.
///
/// Keys are usually numeric strings (`"1"`, `"2"`); malformed keys are
/// skipped when notes are derived.
pub type ScoreSheet = BTreeMap<String, RawObservation>;

/// Finalized stage scores keyed by stage number.
pub type NotesByStage = BTreeMap<StageNumber, f64>;
