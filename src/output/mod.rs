pub mod formatter;

pub use formatter::{
    format_breakdown, format_json, format_score, format_standings_table, format_tsv,
    should_use_colors,
};
