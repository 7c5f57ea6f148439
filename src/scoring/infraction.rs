use serde::{Deserialize, Serialize};
use std::fmt;

/// Categories of judging deductions. Each occurrence costs a fixed weight
/// taken from the active rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Infraction {
    StrangeNotes,
    GroupedCalls,
    Return,
    RasgadaReturn,
    Remontagem,
    StartWithoutEntry,
    Omission,
    InvalidChant,
}

impl Infraction {
    /// All categories, in score-sheet order.
    pub const ALL: [Infraction; 8] = [
        Infraction::StrangeNotes,
        Infraction::GroupedCalls,
        Infraction::Return,
        Infraction::RasgadaReturn,
        Infraction::Remontagem,
        Infraction::StartWithoutEntry,
        Infraction::Omission,
        Infraction::InvalidChant,
    ];

    /// Key used in rule set files (`strange_notes`, `remontagem`, ...)
    pub fn key(&self) -> &'static str {
        match self {
            Infraction::StrangeNotes => "strange_notes",
            Infraction::GroupedCalls => "grouped_calls",
            Infraction::Return => "return",
            Infraction::RasgadaReturn => "rasgada_return",
            Infraction::Remontagem => "remontagem",
            Infraction::StartWithoutEntry => "start_without_entry",
            Infraction::Omission => "omission",
            Infraction::InvalidChant => "invalid_chant",
        }
    }

    /// Human-readable name for breakdowns.
    pub fn label(&self) -> &'static str {
        match self {
            Infraction::StrangeNotes => "Strange notes",
            Infraction::GroupedCalls => "Grouped calls",
            Infraction::Return => "Return",
            Infraction::RasgadaReturn => "Rasgada return",
            Infraction::Remontagem => "Remontagem",
            Infraction::StartWithoutEntry => "Start without entry",
            Infraction::Omission => "Omission",
            Infraction::InvalidChant => "Invalid chant",
        }
    }
}

impl fmt::Display for Infraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_unique() {
        let mut seen = std::collections::HashSet::new();
        for infraction in Infraction::ALL {
            assert!(seen.insert(infraction));
        }
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn test_key_matches_serde_name() {
        for infraction in Infraction::ALL {
            let json = serde_json::to_string(&infraction).unwrap();
            assert_eq!(json, format!("\"{}\"", infraction.key()));
        }
    }

    #[test]
    fn test_display_uses_label() {
        assert_eq!(Infraction::StartWithoutEntry.to_string(), "Start without entry");
    }
}
