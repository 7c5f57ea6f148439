use super::types::{Entry, Standing};
use crate::scoring::{RuleSet, ScoreSummary};
use crate::sheet::StageNumber;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Rank entries as one group.
///
/// Order: total descending, then tie-break key descending (last stage first),
/// then earlier registration, then input order. Placements are 1-based and
/// never shared; championship points come from the rule set.
pub fn rank(entries: &[Entry], number_of_stages: StageNumber, rules: &RuleSet) -> Vec<Standing> {
    let mut scored: Vec<(&Entry, _, ScoreSummary)> = entries
        .iter()
        .map(|entry| {
            let notes = entry.effective_notes(rules);
            let summary = rules.summary(&notes, number_of_stages);
            (entry, notes, summary)
        })
        .collect();

    // Stable sort keeps input order for complete ties
    scored.sort_by(|a, b| {
        a.2.rank_cmp(&b.2)
            .then_with(|| registration_cmp(a.0, b.0))
    });

    scored
        .into_iter()
        .enumerate()
        .map(|(idx, (entry, notes, summary))| {
            let placement = idx + 1;
            Standing {
                placement,
                championship_points: rules.points_for(placement),
                entry_id: entry.id.clone(),
                competitor: entry.competitor.clone(),
                category: entry.category_or_default().to_string(),
                notes,
                total_score: summary.total_score,
                tie_break_key: summary.tie_break_key,
                registered_at: entry.registered_at,
            }
        })
        .collect()
}

/// Rank each category separately, keyed by category name.
pub fn rank_by_category(
    entries: &[Entry],
    number_of_stages: StageNumber,
    rules: &RuleSet,
) -> BTreeMap<String, Vec<Standing>> {
    let mut groups: BTreeMap<String, Vec<Entry>> = BTreeMap::new();
    for entry in entries {
        groups
            .entry(entry.category_or_default().to_string())
            .or_default()
            .push(entry.clone());
    }

    groups
        .into_iter()
        .map(|(category, group)| {
            let standings = rank(&group, number_of_stages, rules);
            (category, standings)
        })
        .collect()
}

/// Keep only entries of `category` (case-insensitive, trimmed).
pub fn filter_category(entries: &[Entry], category: &str) -> Vec<Entry> {
    let wanted = category.trim();
    entries
        .iter()
        .filter(|e| e.category_or_default().eq_ignore_ascii_case(wanted))
        .cloned()
        .collect()
}

// Earlier registration first; entries without a time go last
fn registration_cmp(a: &Entry, b: &Entry) -> Ordering {
    match (a.registered_at, b.registered_at) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
