pub mod rank;
pub mod storage;
pub mod types;

pub use rank::{filter_category, rank, rank_by_category};
pub use storage::{load_tournament, write_output};
pub use types::{Entry, Standing, Tournament, UNCATEGORIZED};
