//! Competition statistics derived from finished matches.
//!
//! Nothing here is stored except the per-player counters written by
//! [`refresh_player_counters`]; [`competition_stats`] is a read-only fold.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::competition::{
    errors::{CompetitionError, CompetitionResult},
    models::{CompetitionId, EventType, Match, PlayerCounters, PlayerId, TeamId},
};
use crate::store::Repository;

/// Event totals of one player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerStat {
    pub player_id: PlayerId,
    pub name: String,
    /// Current team of the player
    pub team_id: Option<TeamId>,
    pub team_name: Option<String>,
    pub goals: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
}

/// Defensive record of one team
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalkeeperStat {
    pub team_id: TeamId,
    pub team_name: String,
    pub goals_conceded: u32,
    pub matches_played: u32,
    pub avg_conceded: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompetitionStats {
    /// Players with at least one goal, most goals first
    pub top_scorers: Vec<PlayerStat>,
    /// Players with at least one card, most red then most yellow cards first
    pub discipline: Vec<PlayerStat>,
    /// Teams with at least one finished match, best average first
    pub goalkeepers: Vec<GoalkeeperStat>,
}

/// Player totals in first-encounter order
#[derive(Default)]
struct PlayerTally {
    stats: Vec<PlayerStat>,
    index: HashMap<PlayerId, usize>,
}

impl PlayerTally {
    fn entry<S: Repository + ?Sized>(
        &mut self,
        store: &S,
        player_id: PlayerId,
    ) -> Option<&mut PlayerStat> {
        if let Some(&i) = self.index.get(&player_id) {
            return self.stats.get_mut(i);
        }

        let player = store.player(player_id)?;
        let team_name = player
            .team_id
            .and_then(|team_id| store.team(team_id))
            .map(|team| team.name.clone());

        self.index.insert(player_id, self.stats.len());
        self.stats.push(PlayerStat {
            player_id,
            name: player.name.clone(),
            team_id: player.team_id,
            team_name,
            goals: 0,
            yellow_cards: 0,
            red_cards: 0,
        });
        self.stats.last_mut()
    }
}

fn finished_matches<S: Repository + ?Sized>(
    store: &S,
    competition_id: CompetitionId,
) -> CompetitionResult<Vec<&Match>> {
    if store.competition(competition_id).is_none() {
        return Err(CompetitionError::CompetitionNotFound(competition_id));
    }
    Ok(store
        .competition_matches(competition_id)
        .into_iter()
        .filter(|m| m.is_finished())
        .collect())
}

/// Top scorers, discipline table and goalkeeping table of a competition
///
/// Events of players missing from the store are ignored. Sorts are stable, so
/// ties keep the order in which players were first seen.
pub fn competition_stats<S: Repository + ?Sized>(
    store: &S,
    competition_id: CompetitionId,
) -> CompetitionResult<CompetitionStats> {
    let matches = finished_matches(store, competition_id)?;

    let mut tally = PlayerTally::default();
    let mut conceded: HashMap<TeamId, (u32, u32)> = HashMap::new();

    for m in &matches {
        if let Some((s1, s2)) = m.final_score() {
            let home = conceded.entry(m.team1_id).or_default();
            home.0 = home.0.saturating_add(s2);
            home.1 += 1;
            let away = conceded.entry(m.team2_id).or_default();
            away.0 = away.0.saturating_add(s1);
            away.1 += 1;
        }

        for event in &m.events {
            let Some(stat) = tally.entry(store, event.player_id) else {
                log::warn!(
                    "Player {} from match {} not found, skipping event",
                    event.player_id,
                    m.id
                );
                continue;
            };
            match event.event_type {
                EventType::Goal => stat.goals += 1,
                EventType::YellowCard => stat.yellow_cards += 1,
                EventType::RedCard => stat.red_cards += 1,
            }
        }
    }

    let mut top_scorers: Vec<PlayerStat> = tally
        .stats
        .iter()
        .filter(|s| s.goals > 0)
        .cloned()
        .collect();
    top_scorers.sort_by(|a, b| b.goals.cmp(&a.goals));

    let mut discipline: Vec<PlayerStat> = tally
        .stats
        .into_iter()
        .filter(|s| s.yellow_cards > 0 || s.red_cards > 0)
        .collect();
    discipline.sort_by(|a, b| (b.red_cards, b.yellow_cards).cmp(&(a.red_cards, a.yellow_cards)));

    let mut goalkeepers: Vec<GoalkeeperStat> = store
        .competition_teams(competition_id)
        .into_iter()
        .filter_map(|team| {
            let &(goals_conceded, matches_played) = conceded.get(&team.id)?;
            if matches_played == 0 {
                return None;
            }
            Some(GoalkeeperStat {
                team_id: team.id,
                team_name: team.name.clone(),
                goals_conceded,
                matches_played,
                avg_conceded: f64::from(goals_conceded) / f64::from(matches_played),
            })
        })
        .collect();
    goalkeepers.sort_by(|a, b| {
        a.avg_conceded
            .total_cmp(&b.avg_conceded)
            .then(a.goals_conceded.cmp(&b.goals_conceded))
    });

    Ok(CompetitionStats {
        top_scorers,
        discipline,
        goalkeepers,
    })
}

/// Recompute every player's counters for one competition
///
/// Counters are rebuilt from the finished matches; players with no events in
/// the competition lose any stale entry for it. Returns the number of players
/// with a non-empty entry.
pub fn refresh_player_counters<S: Repository + ?Sized>(
    store: &mut S,
    competition_id: CompetitionId,
) -> CompetitionResult<usize> {
    let mut counters: BTreeMap<PlayerId, PlayerCounters> = BTreeMap::new();
    for m in finished_matches(&*store, competition_id)? {
        for event in &m.events {
            let entry = counters.entry(event.player_id).or_default();
            match event.event_type {
                EventType::Goal => entry.goals += 1,
                EventType::YellowCard => entry.yellow_cards += 1,
                EventType::RedCard => entry.red_cards += 1,
            }
        }
    }

    let players: BTreeSet<PlayerId> = store
        .competition_teams(competition_id)
        .iter()
        .flat_map(|team| team.players.iter().copied())
        .chain(counters.keys().copied())
        .collect();

    let mut updated = 0;
    for player_id in players {
        let Some(player) = store.player_mut(player_id) else {
            continue;
        };
        match counters.get(&player_id) {
            Some(totals) => {
                player.competition_stats.insert(competition_id, *totals);
                updated += 1;
            }
            None => {
                player.competition_stats.remove(&competition_id);
            }
        }
    }

    log::debug!(
        "Refreshed competition {} counters for {} players",
        competition_id,
        updated
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competition::manager::{
        EventInput, MatchResult, add_player, add_team, create_competition, record_result,
    };
    use crate::competition::models::{CompetitionFormat, CompetitionKind};
    use crate::fixtures::generate_round_robin;
    use crate::store::MemoryStore;

    fn goal(player_id: PlayerId) -> EventInput {
        EventInput {
            player_id,
            event_type: EventType::Goal,
            minute: None,
        }
    }

    fn card(player_id: PlayerId, event_type: EventType) -> EventInput {
        EventInput {
            player_id,
            event_type,
            minute: None,
        }
    }

    /// Three-team league with two players per team
    fn league() -> (MemoryStore, CompetitionId, Vec<TeamId>, Vec<PlayerId>) {
        let mut store = MemoryStore::new();
        let comp = create_competition(
            &mut store,
            "League",
            CompetitionKind::Football,
            CompetitionFormat::RoundRobin,
        )
        .unwrap();
        let mut teams = Vec::new();
        let mut players = Vec::new();
        for name in ["A", "B", "C"] {
            let team = add_team(&mut store, comp, name).unwrap();
            players.push(add_player(&mut store, team, &format!("{name}1")).unwrap());
            players.push(add_player(&mut store, team, &format!("{name}2")).unwrap());
            teams.push(team);
        }
        generate_round_robin(&mut store, comp).unwrap();
        (store, comp, teams, players)
    }

    #[test]
    fn test_stats_tables() {
        let (mut store, comp, teams, p) = league();
        let ids = store.competition(comp).unwrap().matches.clone();

        // A 2-0 B, A 1-1 C; B vs C unplayed
        record_result(
            &mut store,
            ids[0],
            MatchResult {
                team1_score: 2,
                team2_score: 0,
                date: None,
                events: vec![goal(p[0]), goal(p[1]), card(p[2], EventType::YellowCard)],
            },
        )
        .unwrap();
        record_result(
            &mut store,
            ids[1],
            MatchResult {
                team1_score: 1,
                team2_score: 1,
                date: None,
                events: vec![
                    goal(p[0]),
                    goal(p[4]),
                    card(p[5], EventType::RedCard),
                    card(p[3], EventType::YellowCard),
                    card(p[3], EventType::YellowCard),
                ],
            },
        )
        .unwrap();

        let stats = competition_stats(&store, comp).unwrap();

        let scorers: Vec<_> = stats.top_scorers.iter().map(|s| (s.player_id, s.goals)).collect();
        assert_eq!(scorers, vec![(p[0], 2), (p[1], 1), (p[4], 1)]);
        assert_eq!(stats.top_scorers[0].team_name.as_deref(), Some("A"));

        let discipline: Vec<_> = stats.discipline.iter().map(|s| s.player_id).collect();
        assert_eq!(discipline, vec![p[5], p[3], p[2]]);

        let keepers: Vec<_> = stats
            .goalkeepers
            .iter()
            .map(|g| (g.team_id, g.goals_conceded, g.matches_played))
            .collect();
        // A: 1 in 2, C: 1 in 1, B: 2 in 1
        assert_eq!(keepers, vec![(teams[0], 1, 2), (teams[2], 1, 1), (teams[1], 2, 1)]);
        assert!((stats.goalkeepers[0].avg_conceded - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_players_are_skipped() {
        let (mut store, comp, _, p) = league();
        let first = store.competition(comp).unwrap().matches[0];
        record_result(
            &mut store,
            first,
            MatchResult {
                team1_score: 1,
                team2_score: 0,
                date: None,
                events: vec![goal(p[0])],
            },
        )
        .unwrap();
        store.players.remove(&p[0]);

        let stats = competition_stats(&store, comp).unwrap();
        assert!(stats.top_scorers.is_empty());
        assert_eq!(stats.goalkeepers.len(), 2);
    }

    #[test]
    fn test_refresh_player_counters() {
        let (mut store, comp, _, p) = league();
        let first = store.competition(comp).unwrap().matches[0];
        store
            .player_mut(p[3])
            .unwrap()
            .competition_stats
            .insert(comp, PlayerCounters {
                goals: 9,
                ..PlayerCounters::default()
            });

        record_result(
            &mut store,
            first,
            MatchResult {
                team1_score: 2,
                team2_score: 0,
                date: None,
                events: vec![goal(p[0]), goal(p[0]), card(p[2], EventType::RedCard)],
            },
        )
        .unwrap();

        assert_eq!(refresh_player_counters(&mut store, comp).unwrap(), 2);
        let scorer = store.player(p[0]).unwrap().competition_stats[&comp];
        assert_eq!(scorer.goals, 2);
        assert_eq!(store.player(p[2]).unwrap().competition_stats[&comp].red_cards, 1);
        assert!(!store.player(p[3]).unwrap().competition_stats.contains_key(&comp));
    }

    #[test]
    fn test_unknown_competition() {
        let store = MemoryStore::new();
        assert!(matches!(
            competition_stats(&store, 3),
            Err(CompetitionError::CompetitionNotFound(3))
        ));
    }
}
