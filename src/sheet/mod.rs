pub mod coerce;
pub mod types;

pub use types::{NotesByStage, RawObservation, ScoreSheet, StageNumber};
