use crate::scoring::StageBreakdown;
use crate::sheet::StageNumber;
use crate::standings::Standing;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a score with a fixed number of decimals ("17.50", "9.75")
pub fn format_score(score: f64, precision: u32) -> String {
    format!("{:.*}", precision as usize, score)
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format standings as a table with columns: Placement, Total, Points, Competitor, Stages
/// No headers. Stage marks are listed last stage first, the order ties are broken in.
pub fn format_standings_table(standings: &[Standing], precision: u32, use_colors: bool) -> String {
    if standings.is_empty() {
        return "No entries found.".to_string();
    }

    let term_width = get_terminal_width();
    let total_width = 7; // fits "100.00"
    let points_width = 4;
    let separator = "  ";

    standings
        .iter()
        .map(|s| {
            let place_str = format!("{:>3}.", s.placement);
            let total_str = format!(
                "{:>width$}",
                format_score(s.total_score, precision),
                width = total_width
            );
            let points_str = format!(
                "{:>width$}",
                format!("{}pt", s.championship_points),
                width = points_width
            );
            let stages_str = s
                .tie_break_key
                .values()
                .iter()
                .map(|v| format_score(*v, precision))
                .collect::<Vec<_>>()
                .join(" ");

            let fixed_width = place_str.len()
                + 1
                + total_width
                + points_width
                + separator.len() * 3
                + stages_str.chars().count();

            let name = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_name(&s.competitor, width - fixed_width)
                }
                Some(_) => truncate_name(&s.competitor, 20),
                None => s.competitor.clone(),
            };

            if use_colors {
                format!(
                    "{} {}{}{}{}{}{}{}",
                    place_str.dimmed(),
                    total_str.bold(),
                    separator,
                    points_str.yellow(),
                    separator,
                    name,
                    separator,
                    stages_str.cyan()
                )
            } else {
                format!(
                    "{} {}{}{}{}{}{}{}",
                    place_str,
                    total_str,
                    separator,
                    points_str,
                    separator,
                    name,
                    separator,
                    stages_str
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format standings as tab-separated values for scripting
/// Columns: placement, total, points, category, competitor, stage marks (last stage first)
pub fn format_tsv(standings: &[Standing], precision: u32) -> String {
    standings
        .iter()
        .map(|s| {
            let mut fields = vec![
                s.placement.to_string(),
                format_score(s.total_score, precision),
                s.championship_points.to_string(),
                s.category.clone(),
                s.competitor.clone(),
            ];
            fields.extend(s.tie_break_key.values().iter().map(|v| format_score(*v, precision)));
            fields.join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format standings as pretty-printed JSON
pub fn format_json(standings: &[Standing]) -> Result<String> {
    serde_json::to_string_pretty(standings).context("Failed to serialize standings")
}

/// Format the per-stage breakdown of one competitor's score sheet
pub fn format_breakdown(
    competitor: &str,
    stages: &[(StageNumber, StageBreakdown)],
    precision: u32,
    use_colors: bool,
) -> String {
    let mut lines = Vec::new();
    lines.push(if use_colors {
        competitor.bold().to_string()
    } else {
        competitor.to_string()
    });

    if stages.is_empty() {
        lines.push("  No detailed observations recorded.".to_string());
        return lines.join("\n");
    }

    for (stage, b) in stages {
        let score = format_score(b.score, precision);
        let header = format!("  Stage {}: {}", stage, score);
        lines.push(if use_colors { header.bold().to_string() } else { header });
        lines.push(format!("    Base: {}", b.base_score));
        for d in &b.deductions {
            let line = format!(
                "    {} x{} @ {} = -{}",
                d.infraction.label(),
                d.count,
                d.weight,
                d.amount
            );
            lines.push(if use_colors { line.red().to_string() } else { line });
        }
        if b.clamped {
            lines.push(format!("    Raw {} kept within the scale", b.raw));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{stage_breakdown, Infraction, RuleSet, TieBreakKey};
    use crate::sheet::{NotesByStage, RawObservation};

    fn standing(placement: usize, name: &str, total: f64, key: Vec<f64>) -> Standing {
        Standing {
            placement,
            championship_points: RuleSet::brasilia().points_for(placement),
            entry_id: None,
            competitor: name.to_string(),
            category: "Pardo".to_string(),
            notes: NotesByStage::new(),
            total_score: total,
            tie_break_key: TieBreakKey::from(key),
            registered_at: None,
        }
    }

    #[test]
    fn test_format_score_fixed_decimals() {
        assert_eq!(format_score(17.5, 2), "17.50");
        assert_eq!(format_score(0.0, 2), "0.00");
        assert_eq!(format_score(9.76, 1), "9.8");
        assert_eq!(format_score(10.0, 0), "10");
    }

    #[test]
    fn test_truncate_name_short() {
        assert_eq!(truncate_name("Trovão", 20), "Trovão");
    }

    #[test]
    fn test_truncate_name_long() {
        assert_eq!(truncate_name("Trovão do Cerrado Azul", 12), "Trovão do...");
    }

    #[test]
    fn test_truncate_name_very_narrow() {
        assert_eq!(truncate_name("Trovão", 3), "Tro");
    }

    #[test]
    fn test_format_standings_table_empty() {
        assert_eq!(format_standings_table(&[], 2, false), "No entries found.");
    }

    #[test]
    fn test_format_standings_table_rows() {
        let rows = vec![
            standing(1, "Trovão", 19.0, vec![9.0, 5.0, 5.0]),
            standing(2, "Relâmpago", 19.0, vec![5.0, 5.0, 9.0]),
        ];
        let result = format_standings_table(&rows, 2, false);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  1."));
        assert!(lines[0].contains("19.00"));
        assert!(lines[0].contains("15pt"));
        assert!(lines[0].contains("Trovão"));
        assert!(lines[0].ends_with("9.00 5.00 5.00"));
        assert!(lines[1].contains("13pt"));
        assert!(lines[1].ends_with("5.00 5.00 9.00"));
    }

    #[test]
    fn test_format_tsv() {
        let rows = vec![standing(1, "Trovão", 17.5, vec![10.0, 7.5])];
        assert_eq!(format_tsv(&rows, 2), "1\t17.50\t15\tPardo\tTrovão\t10.00\t7.50");
        assert_eq!(format_tsv(&[], 2), "");
    }

    #[test]
    fn test_format_json() {
        let rows = vec![standing(1, "Trovão", 17.5, vec![10.0, 7.5])];
        let json = format_json(&rows).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["placement"], 1);
        assert_eq!(value[0]["championshipPoints"], 15);
        assert_eq!(value[0]["totalScore"], 17.5);
        assert_eq!(value[0]["tieBreakKey"], serde_json::json!([10.0, 7.5]));
        assert!(value[0].get("entryId").is_none());
    }

    #[test]
    fn test_format_breakdown() {
        let rules = RuleSet::brasilia();
        let obs = RawObservation::with_base(9.0)
            .with_count(Infraction::StrangeNotes, 2)
            .with_count(Infraction::Remontagem, 1);
        let stages = vec![(1, stage_breakdown(&obs, &rules))];
        let text = format_breakdown("Trovão", &stages, 2, false);
        assert!(text.starts_with("Trovão"));
        assert!(text.contains("Stage 1: 7.50"));
        assert!(text.contains("Base: 9"));
        assert!(text.contains("Strange notes x2 @ 0.25 = -0.5"));
        assert!(text.contains("Remontagem x1 @ 1 = -1"));
        assert!(!text.contains("kept within the scale"));
    }

    #[test]
    fn test_format_breakdown_clamped() {
        let rules = RuleSet::brasilia();
        let stages = vec![(2, stage_breakdown(&RawObservation::with_base(11.0), &rules))];
        let text = format_breakdown("x", &stages, 2, false);
        assert!(text.contains("Stage 2: 10.00"));
        assert!(text.contains("Raw 11 kept within the scale"));
    }

    #[test]
    fn test_format_breakdown_empty() {
        let text = format_breakdown("x", &[], 2, false);
        assert!(text.contains("No detailed observations"));
    }
}
