//! Standings aggregation over finished matches.
//!
//! Standings are derived state. Every pass starts from zero-valued records and
//! folds the whole match set again; nothing is patched incrementally.

use std::collections::{HashMap, HashSet};

use crate::competition::{
    errors::{CompetitionError, CompetitionResult},
    models::{
        CompetitionFormat, CompetitionId, EventType, GroupId, Match, Standing, StandingsMap,
        TeamId,
    },
};
use crate::store::Repository;

use super::ranking::rank;

/// What a standings table covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandingsScope {
    pub competition_id: CompetitionId,
    /// `None` for a competition-wide (round-robin) table
    pub group_id: Option<GroupId>,
}

impl StandingsScope {
    pub fn competition(competition_id: CompetitionId) -> Self {
        Self {
            competition_id,
            group_id: None,
        }
    }

    pub fn group(competition_id: CompetitionId, group_id: GroupId) -> Self {
        Self {
            competition_id,
            group_id: Some(group_id),
        }
    }
}

/// Card totals per team
#[derive(Debug, Default)]
struct CardTally {
    yellow: HashMap<TeamId, u32>,
    red: HashMap<TeamId, u32>,
}

impl CardTally {
    /// Tally cards of every finished match, keeping only events whose player
    /// currently plays for a team in `team_ids`. Counts go to the event's team.
    fn collect<S: Repository + ?Sized>(
        store: &S,
        team_ids: &HashSet<TeamId>,
        matches: &[&Match],
    ) -> Self {
        let mut tally = Self::default();

        for m in matches.iter().filter(|m| m.is_finished()) {
            for event in &m.events {
                let belongs = store
                    .player(event.player_id)
                    .and_then(|p| p.team_id)
                    .is_some_and(|team_id| team_ids.contains(&team_id));
                if !belongs {
                    continue;
                }

                match event.event_type {
                    EventType::YellowCard => *tally.yellow.entry(event.team_id).or_default() += 1,
                    EventType::RedCard => *tally.red.entry(event.team_id).or_default() += 1,
                    EventType::Goal => {}
                }
            }
        }

        tally
    }
}

/// Apply one finished match to both sides' records
fn apply_result(home: &mut Standing, away: &mut Standing, home_score: u32, away_score: u32) {
    home.played += 1;
    away.played += 1;
    home.goals_for = home.goals_for.saturating_add(home_score);
    home.goals_against = home.goals_against.saturating_add(away_score);
    away.goals_for = away.goals_for.saturating_add(away_score);
    away.goals_against = away.goals_against.saturating_add(home_score);
    home.goal_difference = i64::from(home.goals_for) - i64::from(home.goals_against);
    away.goal_difference = i64::from(away.goals_for) - i64::from(away.goals_against);

    match home_score.cmp(&away_score) {
        std::cmp::Ordering::Greater => {
            home.points += 3;
            home.wins += 1;
            away.losses += 1;
        }
        std::cmp::Ordering::Less => {
            away.points += 3;
            away.wins += 1;
            home.losses += 1;
        }
        std::cmp::Ordering::Equal => {
            home.points += 1;
            away.points += 1;
            home.draws += 1;
            away.draws += 1;
        }
    }
}

/// Compute a fresh standings table for `team_ids` from `matches`
///
/// Every team in `team_ids` gets a record, even without matches. Only finished,
/// fully scored matches between two teams of the set count; other finished
/// matches are skipped with a warning. Card totals come from the players'
/// current team assignment, not the assignment at match time.
pub fn aggregate<S: Repository + ?Sized>(
    store: &S,
    scope: StandingsScope,
    team_ids: &[TeamId],
    matches: &[&Match],
) -> StandingsMap {
    let mut table: StandingsMap = team_ids
        .iter()
        .map(|&team_id| {
            (
                team_id,
                Standing::new(team_id, scope.competition_id, scope.group_id),
            )
        })
        .collect();

    let members: HashSet<TeamId> = team_ids.iter().copied().collect();
    let cards = CardTally::collect(store, &members, matches);

    for m in matches.iter().filter(|m| m.is_finished()) {
        let Some((s1, s2)) = m.final_score() else {
            log::warn!("Match {} is finished but has no complete score, skipping", m.id);
            continue;
        };

        let sides = (table.get(&m.team1_id), table.get(&m.team2_id));
        let (Some(home), Some(away)) = sides else {
            log::warn!(
                "Match {} is finished but team {} or {} is not in the standings being computed",
                m.id,
                m.team1_id,
                m.team2_id
            );
            continue;
        };
        if m.team1_id == m.team2_id {
            log::warn!("Match {} pairs team {} with itself, skipping", m.id, m.team1_id);
            continue;
        }

        let (mut home, mut away) = (home.clone(), away.clone());
        apply_result(&mut home, &mut away, s1, s2);
        table.insert(home.team_id, home);
        table.insert(away.team_id, away);
    }

    for (team_id, standing) in table.iter_mut() {
        standing.yellow_cards = cards.yellow.get(team_id).copied().unwrap_or(0);
        standing.red_cards = cards.red.get(team_id).copied().unwrap_or(0);
    }

    log::debug!(
        "Aggregated {} standings for competition {} group {:?} over {} matches",
        table.len(),
        scope.competition_id,
        scope.group_id,
        matches.len()
    );

    table
}

/// Team ids that still exist in the store, warning about the rest
fn existing_teams<S: Repository + ?Sized>(
    store: &S,
    ids: &[TeamId],
    scope: StandingsScope,
) -> Vec<TeamId> {
    ids.iter()
        .copied()
        .filter(|&team_id| {
            let exists = store.team(team_id).is_some();
            if !exists {
                log::warn!(
                    "Team {} not found while building standings for competition {} group {:?}",
                    team_id,
                    scope.competition_id,
                    scope.group_id
                );
            }
            exists
        })
        .collect()
}

/// Recompute and store the standings of a group or of a round-robin competition
///
/// Groups+knockout competitions need a `group_id`; round-robin competitions
/// always use the competition-wide table. The target table is replaced
/// wholesale.
pub fn recalculate_standings<S: Repository + ?Sized>(
    store: &mut S,
    competition_id: CompetitionId,
    group_id: Option<GroupId>,
) -> CompetitionResult<StandingsMap> {
    let competition = store
        .competition(competition_id)
        .ok_or(CompetitionError::CompetitionNotFound(competition_id))?;

    match (competition.format, group_id) {
        (CompetitionFormat::GroupsKnockout, Some(group_id)) => {
            let group = store
                .group(group_id)
                .filter(|g| g.competition_id == competition_id)
                .ok_or(CompetitionError::GroupNotFound(group_id))?;
            let scope = StandingsScope::group(competition_id, group_id);
            let team_ids = existing_teams(&*store, &group.teams, scope);
            let matches = store.group_matches(group_id);
            let table = aggregate(&*store, scope, &team_ids, &matches);

            if let Some(group) = store.group_mut(group_id) {
                group.standings = table.clone();
            }
            Ok(table)
        }
        (CompetitionFormat::RoundRobin, _) => {
            let scope = StandingsScope::competition(competition_id);
            let team_ids = existing_teams(&*store, &competition.teams, scope);
            let matches = store.competition_matches(competition_id);
            let table = aggregate(&*store, scope, &team_ids, &matches);

            if let Some(competition) = store.competition_mut(competition_id) {
                competition.standings = table.clone();
            }
            Ok(table)
        }
        (actual, None) => Err(CompetitionError::WrongFormat {
            expected: CompetitionFormat::RoundRobin,
            actual,
        }),
    }
}

/// Standings in the scope's team order, for ranking
///
/// Ranking is stable, so ties end up in the order teams were listed in the
/// group or competition.
pub fn ordered_standings(table: &StandingsMap, team_ids: &[TeamId]) -> Vec<Standing> {
    team_ids
        .iter()
        .filter_map(|team_id| table.get(team_id))
        .cloned()
        .collect()
}

/// Recompute, store and rank one standings table
pub fn standings_table<S: Repository + ?Sized>(
    store: &mut S,
    competition_id: CompetitionId,
    group_id: Option<GroupId>,
) -> CompetitionResult<Vec<Standing>> {
    let table = recalculate_standings(store, competition_id, group_id)?;

    let format = store.competition(competition_id).map(|c| c.format);
    let team_ids = match (format, group_id) {
        (Some(CompetitionFormat::GroupsKnockout), Some(group_id)) => store
            .group(group_id)
            .map(|g| g.teams.clone())
            .unwrap_or_default(),
        _ => store
            .competition(competition_id)
            .map(|c| c.teams.clone())
            .unwrap_or_default(),
    };

    Ok(rank(ordered_standings(&table, &team_ids)))
}

/// Recompute every standings table of a competition
///
/// Returns one ranked table per group (in group order) for groups+knockout
/// competitions, or a single competition-wide table for round-robin.
pub fn recalculate_all<S: Repository + ?Sized>(
    store: &mut S,
    competition_id: CompetitionId,
) -> CompetitionResult<Vec<(Option<GroupId>, Vec<Standing>)>> {
    let competition = store
        .competition(competition_id)
        .ok_or(CompetitionError::CompetitionNotFound(competition_id))?;

    match competition.format {
        CompetitionFormat::RoundRobin => {
            let table = standings_table(store, competition_id, None)?;
            Ok(vec![(None, table)])
        }
        CompetitionFormat::GroupsKnockout => {
            let group_ids = competition.groups.clone();
            let mut tables = Vec::with_capacity(group_ids.len());
            for group_id in group_ids {
                if store.group(group_id).is_none() {
                    log::warn!(
                        "Group {} listed by competition {} not found, skipping",
                        group_id,
                        competition_id
                    );
                    continue;
                }
                let table = standings_table(store, competition_id, Some(group_id))?;
                tables.push((Some(group_id), table));
            }
            Ok(tables)
        }
    }
}
