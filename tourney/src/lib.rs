//! # Tourney
//!
//! Standings, tie-break ranking and fixture generation for amateur sports
//! competitions (football, futsal, fut7, society).
//!
//! A competition is played either as a group stage followed by a knockout
//! bracket, or as a single round-robin league. Every operation works against a
//! [`store::Repository`] handle passed in by the caller; the crate keeps no
//! global state and does no I/O.
//!
//! ## Core Modules
//!
//! - [`competition`]: data models, registry and result recording
//! - [`standings`]: aggregation of finished matches and tie-break ranking
//! - [`fixtures`]: group draw, league round-robin and knockout seeding
//! - [`stats`]: top scorers, discipline and goalkeeping tables
//! - [`store`]: repository trait and the serializable in-memory store
//!
//! ## Example
//!
//! ```
//! use tourney::competition::{CompetitionFormat, CompetitionKind, MatchResult, manager};
//! use tourney::fixtures::generate_round_robin;
//! use tourney::standings::standings_table;
//! use tourney::store::MemoryStore;
//!
//! let mut store = MemoryStore::new();
//! let league = manager::create_competition(
//!     &mut store,
//!     "Sunday League",
//!     CompetitionKind::Society,
//!     CompetitionFormat::RoundRobin,
//! )?;
//! let a = manager::add_team(&mut store, league, "Team A")?;
//! let b = manager::add_team(&mut store, league, "Team B")?;
//!
//! let fixtures = generate_round_robin(&mut store, league)?;
//! manager::record_result(
//!     &mut store,
//!     fixtures[0],
//!     MatchResult {
//!         team1_score: 3,
//!         team2_score: 1,
//!         ..MatchResult::default()
//!     },
//! )?;
//!
//! let table = standings_table(&mut store, league, None)?;
//! assert_eq!(table[0].team_id, a);
//! assert_eq!(table[0].points, 3);
//! assert_eq!(table[1].team_id, b);
//! # Ok::<(), tourney::competition::CompetitionError>(())
//! ```

/// Competition models, registry and result recording.
pub mod competition;
pub use competition::{CompetitionError, CompetitionResult, manager};

/// Fixture generation.
pub mod fixtures;
pub use fixtures::{KnockoutOutcome, generate_group_draw, generate_round_robin, seed_knockout};

/// Standings aggregation and ranking.
pub mod standings;
pub use standings::{aggregate, rank, standings_table};

/// Competition statistics.
pub mod stats;
pub use stats::{CompetitionStats, competition_stats, refresh_player_counters};

/// Entity storage.
pub mod store;
pub use store::{MemoryStore, Repository};
