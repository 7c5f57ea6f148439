//! Deterministic scoring for multi-stage judged competitions.
//!
//! Judges record a base mark and counted infractions per stage. The engine
//! turns each stage into a clamped, rounded score, sums stages into a total,
//! and builds a tie-break key that favors the most recent stage.
//!
//! ```
//! use stage_tally::scoring::{compute_stage_score, derive_notes, score_summary, Infraction};
//! use stage_tally::sheet::{RawObservation, ScoreSheet};
//!
//! let mut sheet = ScoreSheet::new();
//! sheet.insert(
//!     "1".to_string(),
//!     RawObservation::with_base(9.0)
//!         .with_count(Infraction::StrangeNotes, 2)
//!         .with_count(Infraction::Remontagem, 1),
//! );
//! sheet.insert("2".to_string(), RawObservation::with_base(10.0));
//!
//! assert_eq!(compute_stage_score(&sheet["1"]), 7.5);
//!
//! let notes = derive_notes(&sheet);
//! let summary = score_summary(&notes, 2);
//! assert_eq!(summary.total_score, 17.5);
//! assert_eq!(summary.tie_break_key.values(), &[10.0, 7.5]);
//! ```

pub mod config;
pub mod output;
pub mod scoring;
pub mod sheet;
pub mod standings;
