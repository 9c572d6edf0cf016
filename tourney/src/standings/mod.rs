//! Standings computation and tie-break ranking.
//!
//! - [`aggregator`] folds finished matches into per-team records
//! - [`ranking`] orders records with a fixed chain of tie-break criteria
//!
//! Tables stored on groups and competitions are always the output of the
//! aggregator; recompute them after any change to fixtures or results.

pub mod aggregator;
pub mod ranking;

pub use aggregator::{
    StandingsScope, aggregate, ordered_standings, recalculate_all, recalculate_standings,
    standings_table,
};
pub use ranking::{
    DEFAULT_CRITERIA, Direction, RankCriterion, RankKey, compare_standings, rank, rank_by,
};
