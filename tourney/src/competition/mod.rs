//! Competition registry, data models and result recording.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{CompetitionError, CompetitionResult};
pub use manager::{EventInput, MAX_SCORE, MatchResult, RecordedResult, SkippedEvent};
pub use models::{
    Competition, CompetitionFormat, CompetitionId, CompetitionKind, CompetitionStatus, EventId,
    EventType, Group, GroupId, KnockoutStage, Match, MatchEvent, MatchId, MatchStatus, Player,
    PlayerCounters, PlayerId, Standing, StandingsMap, Team, TeamId,
};
