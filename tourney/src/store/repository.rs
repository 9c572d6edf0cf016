//! Repository trait and the in-memory store behind it.
//!
//! The core never reaches for ambient state: every operation takes a
//! `Repository` handle and reads and writes entities through it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::competition::models::{
    Competition, CompetitionId, Group, GroupId, Match, MatchId, Player, PlayerId, Team, TeamId,
};

/// Entity kinds that own an id sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Competition,
    Team,
    Player,
    Group,
    Match,
    Event,
}

/// Trait for entity storage
///
/// Lookups return `None` for unknown ids; callers decide whether that is a
/// fault or a dangling reference to skip.
pub trait Repository {
    /// Allocate the next id of a kind. Ids are monotonic per kind, starting at 1.
    fn next_id(&mut self, kind: EntityKind) -> i64;

    fn competition(&self, id: CompetitionId) -> Option<&Competition>;
    fn competition_mut(&mut self, id: CompetitionId) -> Option<&mut Competition>;
    fn put_competition(&mut self, competition: Competition);

    fn team(&self, id: TeamId) -> Option<&Team>;
    fn team_mut(&mut self, id: TeamId) -> Option<&mut Team>;
    fn put_team(&mut self, team: Team);

    fn player(&self, id: PlayerId) -> Option<&Player>;
    fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player>;
    fn put_player(&mut self, player: Player);

    fn group(&self, id: GroupId) -> Option<&Group>;
    fn group_mut(&mut self, id: GroupId) -> Option<&mut Group>;
    fn put_group(&mut self, group: Group);
    fn remove_group(&mut self, id: GroupId) -> Option<Group>;

    fn match_(&self, id: MatchId) -> Option<&Match>;
    fn match_mut(&mut self, id: MatchId) -> Option<&mut Match>;
    fn put_match(&mut self, m: Match);
    fn remove_match(&mut self, id: MatchId) -> Option<Match>;

    /// Teams of a competition, dropping ids with no stored team
    fn competition_teams(&self, id: CompetitionId) -> Vec<&Team> {
        self.competition(id)
            .map(|c| c.teams.iter().filter_map(|t| self.team(*t)).collect())
            .unwrap_or_default()
    }

    /// Matches of a competition, dropping ids with no stored match
    fn competition_matches(&self, id: CompetitionId) -> Vec<&Match> {
        self.competition(id)
            .map(|c| c.matches.iter().filter_map(|m| self.match_(*m)).collect())
            .unwrap_or_default()
    }

    /// Matches of a group, dropping ids with no stored match
    fn group_matches(&self, id: GroupId) -> Vec<&Match> {
        self.group(id)
            .map(|g| g.matches.iter().filter_map(|m| self.match_(*m)).collect())
            .unwrap_or_default()
    }

    /// Teams of a group, dropping ids with no stored team
    fn group_teams(&self, id: GroupId) -> Vec<&Team> {
        self.group(id)
            .map(|g| g.teams.iter().filter_map(|t| self.team(*t)).collect())
            .unwrap_or_default()
    }

    /// Roster of a team in roster order, dropping ids with no stored player
    fn team_players(&self, id: TeamId) -> Vec<&Player> {
        self.team(id)
            .map(|t| t.players.iter().filter_map(|p| self.player(*p)).collect())
            .unwrap_or_default()
    }
}

/// Per-kind id counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdSequences {
    next: BTreeMap<EntityKind, i64>,
}

impl IdSequences {
    /// Take the next id of a kind and advance the counter
    pub fn allocate(&mut self, kind: EntityKind) -> i64 {
        let slot = self.next.entry(kind).or_insert(1);
        let id = *slot;
        *slot += 1;
        id
    }

    /// The id the next allocation of `kind` will return
    pub fn peek(&self, kind: EntityKind) -> i64 {
        self.next.get(&kind).copied().unwrap_or(1)
    }
}

impl Default for IdSequences {
    fn default() -> Self {
        let next = [
            EntityKind::Competition,
            EntityKind::Team,
            EntityKind::Player,
            EntityKind::Group,
            EntityKind::Match,
            EntityKind::Event,
        ]
        .into_iter()
        .map(|kind| (kind, 1))
        .collect();
        Self { next }
    }
}

/// In-memory `Repository`, serializable as a whole snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    pub competitions: BTreeMap<CompetitionId, Competition>,
    pub teams: BTreeMap<TeamId, Team>,
    pub players: BTreeMap<PlayerId, Player>,
    pub groups: BTreeMap<GroupId, Group>,
    pub matches: BTreeMap<MatchId, Match>,
    pub next_ids: IdSequences,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Repository for MemoryStore {
    fn next_id(&mut self, kind: EntityKind) -> i64 {
        self.next_ids.allocate(kind)
    }

    fn competition(&self, id: CompetitionId) -> Option<&Competition> {
        self.competitions.get(&id)
    }

    fn competition_mut(&mut self, id: CompetitionId) -> Option<&mut Competition> {
        self.competitions.get_mut(&id)
    }

    fn put_competition(&mut self, competition: Competition) {
        self.competitions.insert(competition.id, competition);
    }

    fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.get(&id)
    }

    fn team_mut(&mut self, id: TeamId) -> Option<&mut Team> {
        self.teams.get_mut(&id)
    }

    fn put_team(&mut self, team: Team) {
        self.teams.insert(team.id, team);
    }

    fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    fn put_player(&mut self, player: Player) {
        self.players.insert(player.id, player);
    }

    fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(&id)
    }

    fn group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.groups.get_mut(&id)
    }

    fn put_group(&mut self, group: Group) {
        self.groups.insert(group.id, group);
    }

    fn remove_group(&mut self, id: GroupId) -> Option<Group> {
        self.groups.remove(&id)
    }

    fn match_(&self, id: MatchId) -> Option<&Match> {
        self.matches.get(&id)
    }

    fn match_mut(&mut self, id: MatchId) -> Option<&mut Match> {
        self.matches.get_mut(&id)
    }

    fn put_match(&mut self, m: Match) {
        self.matches.insert(m.id, m);
    }

    fn remove_match(&mut self, id: MatchId) -> Option<Match> {
        self.matches.remove(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competition::models::{CompetitionFormat, CompetitionKind};

    #[test]
    fn test_id_sequences_are_per_kind() {
        let mut store = MemoryStore::new();
        assert_eq!(store.next_id(EntityKind::Team), 1);
        assert_eq!(store.next_id(EntityKind::Team), 2);
        assert_eq!(store.next_id(EntityKind::Match), 1);
        assert_eq!(store.next_ids.peek(EntityKind::Team), 3);
        assert_eq!(store.next_ids.peek(EntityKind::Event), 1);
    }

    #[test]
    fn test_helpers_drop_dangling_ids() {
        let mut store = MemoryStore::new();
        let mut comp = Competition::new(
            1,
            "Cup".to_string(),
            CompetitionKind::Football,
            CompetitionFormat::RoundRobin,
        );
        comp.teams = vec![1, 2, 99];
        comp.matches = vec![5];
        store.put_competition(comp);
        store.put_team(Team::new(1, "A".to_string(), Some(1)));
        store.put_team(Team::new(2, "B".to_string(), Some(1)));

        let names: Vec<_> = store
            .competition_teams(1)
            .iter()
            .map(|t| t.name.clone())
            .collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(store.competition_matches(1).is_empty());
        assert!(store.competition_teams(404).is_empty());
    }

    #[test]
    fn test_snapshot_round_trip_keeps_sequences() {
        let mut store = MemoryStore::new();
        let id = store.next_id(EntityKind::Team);
        store.put_team(Team::new(id, "A".to_string(), None));

        let json = serde_json::to_string(&store).unwrap();
        let mut restored: MemoryStore = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, store);
        assert_eq!(restored.next_id(EntityKind::Team), 2);
    }
}
