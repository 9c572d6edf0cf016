//! Competition error types.

use thiserror::Error;

use super::models::{CompetitionFormat, CompetitionId, GroupId, MatchId, TeamId};

/// Competition errors
#[derive(Debug, Error)]
pub enum CompetitionError {
    /// Competition not found
    #[error("Competition not found: {0}")]
    CompetitionNotFound(CompetitionId),

    /// Team not found
    #[error("Team not found: {0}")]
    TeamNotFound(TeamId),

    /// Group not found
    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),

    /// Match not found
    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    /// Operation does not apply to this competition format
    #[error("Competition format mismatch: expected {expected}, got {actual}")]
    WrongFormat {
        expected: CompetitionFormat,
        actual: CompetitionFormat,
    },

    /// A required name was blank
    #[error("A {0} name is required")]
    EmptyName(&'static str),

    /// Group count / group size out of range or larger than the team pool
    #[error(
        "Invalid group layout: {groups} groups of {per_group} teams with {teams} teams available"
    )]
    InvalidGroupLayout {
        groups: usize,
        per_group: usize,
        teams: usize,
    },

    /// Not enough teams to generate fixtures
    #[error("Insufficient teams: need {needed}, have {current}")]
    InsufficientTeams { needed: usize, current: usize },

    /// Score above the accepted maximum
    #[error("Invalid score {score}: at most {max} goals per side")]
    InvalidScore { score: u32, max: u32 },

    /// Bracket size not a supported power of two or above the qualified count
    #[error("Invalid bracket size {size} with {qualified} qualified teams")]
    InvalidBracketSize { size: usize, qualified: usize },

    /// Knockout requested for a competition with no group stage
    #[error("Competition {0} has no groups")]
    NoGroups(CompetitionId),
}

impl CompetitionError {
    /// Message suitable for showing to the person operating the competition
    ///
    /// Lookup failures are collapsed so internal ids are not echoed back.
    pub fn client_message(&self) -> String {
        match self {
            CompetitionError::CompetitionNotFound(_) => "Competition not found".to_string(),
            CompetitionError::TeamNotFound(_) => "Team not found".to_string(),
            CompetitionError::GroupNotFound(_) => "Group not found".to_string(),
            CompetitionError::MatchNotFound(_) => "Match not found".to_string(),
            CompetitionError::NoGroups(_) => {
                "No groups have been set up for this competition".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Whether the error was caused by caller input rather than a missing entity
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CompetitionError::WrongFormat { .. }
                | CompetitionError::EmptyName(_)
                | CompetitionError::InvalidGroupLayout { .. }
                | CompetitionError::InsufficientTeams { .. }
                | CompetitionError::InvalidBracketSize { .. }
                | CompetitionError::InvalidScore { .. }
        )
    }
}

/// Result type for competition operations
pub type CompetitionResult<T> = Result<T, CompetitionError>;
