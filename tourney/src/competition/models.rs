//! Competition data models.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Competition ID type
pub type CompetitionId = i64;
/// Team ID type
pub type TeamId = i64;
/// Player ID type
pub type PlayerId = i64;
/// Group ID type
pub type GroupId = i64;
/// Match ID type
pub type MatchId = i64;
/// Match event ID type
pub type EventId = i64;

/// Sport variant. Carried for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionKind {
    Football,
    Futsal,
    Fut7,
    Society,
}

impl std::fmt::Display for CompetitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompetitionKind::Football => write!(f, "football"),
            CompetitionKind::Futsal => write!(f, "futsal"),
            CompetitionKind::Fut7 => write!(f, "fut7"),
            CompetitionKind::Society => write!(f, "society"),
        }
    }
}

impl std::str::FromStr for CompetitionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "football" => Ok(CompetitionKind::Football),
            "futsal" => Ok(CompetitionKind::Futsal),
            "fut7" => Ok(CompetitionKind::Fut7),
            "society" => Ok(CompetitionKind::Society),
            other => Err(format!("unknown competition kind: {other}")),
        }
    }
}

/// How the competition is played out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionFormat {
    /// Group stage followed by a single-leg knockout bracket
    GroupsKnockout,
    /// Every team meets every other team once, one league table
    RoundRobin,
}

impl std::fmt::Display for CompetitionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompetitionFormat::GroupsKnockout => write!(f, "groups_knockout"),
            CompetitionFormat::RoundRobin => write!(f, "round_robin"),
        }
    }
}

impl std::str::FromStr for CompetitionFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "groups_knockout" => Ok(CompetitionFormat::GroupsKnockout),
            "round_robin" => Ok(CompetitionFormat::RoundRobin),
            other => Err(format!("unknown competition format: {other}")),
        }
    }
}

/// Advisory competition status. Set by callers, never validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionStatus {
    #[default]
    Planning,
    GroupStage,
    KnockoutStage,
    Finished,
}

/// Match status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Finished,
}

/// Kind of match event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Goal,
    YellowCard,
    RedCard,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Goal => write!(f, "goal"),
            EventType::YellowCard => write!(f, "yellow_card"),
            EventType::RedCard => write!(f, "red_card"),
        }
    }
}

impl std::str::FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "goal" => Ok(EventType::Goal),
            "yellow_card" | "yellow" => Ok(EventType::YellowCard),
            "red_card" | "red" => Ok(EventType::RedCard),
            other => Err(format!("unknown event type: {other}")),
        }
    }
}

/// Something that happened during a match, attributed to a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub id: EventId,
    pub match_id: MatchId,
    /// Team of the player when the event was recorded
    pub team_id: TeamId,
    pub player_id: PlayerId,
    pub event_type: EventType,
    /// Free-form minute as typed in ("45+2", "90", ...)
    pub minute: Option<String>,
}

/// A fixture between two teams
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub competition_id: CompetitionId,
    pub team1_id: TeamId,
    pub team2_id: TeamId,
    pub status: MatchStatus,
    pub team1_score: Option<u32>,
    pub team2_score: Option<u32>,
    pub group_id: Option<GroupId>,
    /// Round number for round-robin fixtures
    pub round_number: Option<u32>,
    /// Knockout round label ("Final", "Semifinal", ...)
    pub knockout_round: Option<String>,
    pub date: Option<NaiveDate>,
    pub events: Vec<MatchEvent>,
}

impl Match {
    /// Create a scheduled match with no result
    pub fn scheduled(
        id: MatchId,
        competition_id: CompetitionId,
        team1_id: TeamId,
        team2_id: TeamId,
    ) -> Self {
        Self {
            id,
            competition_id,
            team1_id,
            team2_id,
            status: MatchStatus::Scheduled,
            team1_score: None,
            team2_score: None,
            group_id: None,
            round_number: None,
            knockout_round: None,
            date: None,
            events: Vec::new(),
        }
    }

    /// Place the match in a group
    pub fn in_group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    /// Place the match in a round-robin round
    pub fn in_round(mut self, round_number: u32) -> Self {
        self.round_number = Some(round_number);
        self
    }

    /// Place the match in a knockout round
    pub fn in_knockout_round(mut self, label: impl Into<String>) -> Self {
        self.knockout_round = Some(label.into());
        self
    }

    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finished
    }

    /// Both scores, only when the match is finished and fully scored
    pub fn final_score(&self) -> Option<(u32, u32)> {
        if !self.is_finished() {
            return None;
        }
        match (self.team1_score, self.team2_score) {
            (Some(s1), Some(s2)) => Some((s1, s2)),
            _ => None,
        }
    }

    pub fn involves(&self, team_id: TeamId) -> bool {
        self.team1_id == team_id || self.team2_id == team_id
    }
}

/// Aggregated record of one team inside a scope (a group or a whole competition)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub team_id: TeamId,
    pub competition_id: CompetitionId,
    pub group_id: Option<GroupId>,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
    pub points: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
}

impl Standing {
    /// Zero-valued standing for a team
    pub fn new(team_id: TeamId, competition_id: CompetitionId, group_id: Option<GroupId>) -> Self {
        Self {
            team_id,
            competition_id,
            group_id,
            played: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
            yellow_cards: 0,
            red_cards: 0,
        }
    }
}

/// Standings keyed by team
pub type StandingsMap = BTreeMap<TeamId, Standing>;

/// A group of the group stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub competition_id: CompetitionId,
    pub name: String,
    pub teams: Vec<TeamId>,
    pub matches: Vec<MatchId>,
    pub standings: StandingsMap,
    pub is_finished: bool,
}

impl Group {
    pub fn new(id: GroupId, competition_id: CompetitionId, name: String, teams: Vec<TeamId>) -> Self {
        Self {
            id,
            competition_id,
            name,
            teams,
            matches: Vec::new(),
            standings: StandingsMap::new(),
            is_finished: false,
        }
    }
}

/// Knockout bracket of a competition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KnockoutStage {
    pub competition_id: CompetitionId,
    /// Round label -> match ids, in bracket order
    pub rounds: BTreeMap<String, Vec<MatchId>>,
    /// Opaque payload for bracket rendering
    pub bracket: Option<serde_json::Value>,
}

impl KnockoutStage {
    pub fn new(competition_id: CompetitionId) -> Self {
        Self {
            competition_id,
            rounds: BTreeMap::new(),
            bracket: None,
        }
    }

    /// All match ids across every round
    pub fn match_ids(&self) -> impl Iterator<Item = MatchId> + '_ {
        self.rounds.values().flatten().copied()
    }
}

/// Per-competition counters of a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerCounters {
    pub goals: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
}

/// A player on a team roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Current team
    pub team_id: Option<TeamId>,
    pub competition_stats: BTreeMap<CompetitionId, PlayerCounters>,
}

impl Player {
    pub fn new(id: PlayerId, name: String, team_id: Option<TeamId>) -> Self {
        Self {
            id,
            name,
            team_id,
            competition_stats: BTreeMap::new(),
        }
    }
}

/// A team taking part in a competition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// Current competition
    pub competition_id: Option<CompetitionId>,
    /// Roster, in the order players were added
    pub players: Vec<PlayerId>,
}

impl Team {
    pub fn new(id: TeamId, name: String, competition_id: Option<CompetitionId>) -> Self {
        Self {
            id,
            name,
            competition_id,
            players: Vec::new(),
        }
    }
}

/// A competition and the ids of everything it owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competition {
    pub id: CompetitionId,
    pub name: String,
    pub kind: CompetitionKind,
    pub format: CompetitionFormat,
    pub teams: Vec<TeamId>,
    pub groups: Vec<GroupId>,
    pub matches: Vec<MatchId>,
    /// League table, only used by round-robin competitions
    pub standings: StandingsMap,
    pub knockout_stage: Option<KnockoutStage>,
    pub status: CompetitionStatus,
}

impl Competition {
    pub fn new(
        id: CompetitionId,
        name: String,
        kind: CompetitionKind,
        format: CompetitionFormat,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            format,
            teams: Vec::new(),
            groups: Vec::new(),
            matches: Vec::new(),
            standings: StandingsMap::new(),
            knockout_stage: None,
            status: CompetitionStatus::Planning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_score_requires_finished_and_both_scores() {
        let mut m = Match::scheduled(1, 1, 10, 20);
        m.team1_score = Some(2);
        m.team2_score = Some(1);
        assert_eq!(m.final_score(), None);

        m.status = MatchStatus::Finished;
        assert_eq!(m.final_score(), Some((2, 1)));

        m.team2_score = None;
        assert_eq!(m.final_score(), None);
    }

    #[test]
    fn test_match_builders() {
        let m = Match::scheduled(3, 1, 10, 20).in_group(7).in_round(1);
        assert_eq!(m.group_id, Some(7));
        assert_eq!(m.round_number, Some(1));
        assert!(m.involves(10));
        assert!(!m.involves(30));

        let k = Match::scheduled(4, 1, 10, 20).in_knockout_round("Final");
        assert_eq!(k.knockout_round.as_deref(), Some("Final"));
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!(
            "round_robin".parse::<CompetitionFormat>(),
            Ok(CompetitionFormat::RoundRobin)
        );
        assert_eq!("FUTSAL".parse::<CompetitionKind>(), Ok(CompetitionKind::Futsal));
        assert_eq!("yellow".parse::<EventType>(), Ok(EventType::YellowCard));
        assert!("penalty".parse::<EventType>().is_err());
    }

    #[test]
    fn test_serde_names_are_snake_case() {
        let json = serde_json::to_string(&CompetitionFormat::GroupsKnockout).unwrap();
        assert_eq!(json, "\"groups_knockout\"");
        let json = serde_json::to_string(&EventType::RedCard).unwrap();
        assert_eq!(json, "\"red_card\"");
    }

    #[test]
    fn test_knockout_stage_match_ids() {
        let mut stage = KnockoutStage::new(1);
        stage.rounds.insert("Semifinal".to_string(), vec![5, 6]);
        stage.rounds.insert("Final".to_string(), vec![7]);
        let mut ids: Vec<_> = stage.match_ids().collect();
        ids.sort();
        assert_eq!(ids, vec![5, 6, 7]);
    }
}
