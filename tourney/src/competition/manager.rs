//! Competition manager: registering competitions, teams and players, and
//! recording match results.

use chrono::NaiveDate;

use super::errors::{CompetitionError, CompetitionResult};
use super::models::{
    Competition, CompetitionFormat, CompetitionId, CompetitionKind, EventType, MatchEvent,
    MatchId, MatchStatus, Player, PlayerId, Team, TeamId,
};
use crate::standings::recalculate_standings;
use crate::store::{EntityKind, Repository};

/// One event typed in alongside a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventInput {
    pub player_id: PlayerId,
    pub event_type: EventType,
    pub minute: Option<String>,
}

/// Final score and events of a played match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub team1_score: u32,
    pub team2_score: u32,
    /// Replaces the stored date only when set
    pub date: Option<NaiveDate>,
    pub events: Vec<EventInput>,
}

/// Why an event input was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkippedEvent {
    UnknownPlayer(PlayerId),
    PlayerWithoutTeam(PlayerId),
}

/// Outcome of [`record_result`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedResult {
    pub match_id: MatchId,
    /// Events stored on the match, in input order
    pub recorded: usize,
    pub skipped: Vec<SkippedEvent>,
}

/// Highest score accepted for either side of a match
pub const MAX_SCORE: u32 = 99;

fn required_name(name: &str, what: &'static str) -> CompetitionResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CompetitionError::EmptyName(what));
    }
    Ok(name.to_string())
}

/// Create a competition in the `planning` status
pub fn create_competition<S: Repository + ?Sized>(
    store: &mut S,
    name: &str,
    kind: CompetitionKind,
    format: CompetitionFormat,
) -> CompetitionResult<CompetitionId> {
    let name = required_name(name, "competition")?;
    let id = store.next_id(EntityKind::Competition);
    store.put_competition(Competition::new(id, name, kind, format));

    log::info!("Created {} competition {} ({})", kind, id, format);
    Ok(id)
}

/// Register a team with a competition
pub fn add_team<S: Repository + ?Sized>(
    store: &mut S,
    competition_id: CompetitionId,
    name: &str,
) -> CompetitionResult<TeamId> {
    let name = required_name(name, "team")?;
    if store.competition(competition_id).is_none() {
        return Err(CompetitionError::CompetitionNotFound(competition_id));
    }

    let id = store.next_id(EntityKind::Team);
    store.put_team(Team::new(id, name, Some(competition_id)));
    if let Some(competition) = store.competition_mut(competition_id) {
        competition.teams.push(id);
    }

    log::debug!("Added team {} to competition {}", id, competition_id);
    Ok(id)
}

/// Add a player to the end of a team's roster
pub fn add_player<S: Repository + ?Sized>(
    store: &mut S,
    team_id: TeamId,
    name: &str,
) -> CompetitionResult<PlayerId> {
    let name = required_name(name, "player")?;
    if store.team(team_id).is_none() {
        return Err(CompetitionError::TeamNotFound(team_id));
    }

    let id = store.next_id(EntityKind::Player);
    store.put_player(Player::new(id, name, Some(team_id)));
    if let Some(team) = store.team_mut(team_id) {
        team.players.push(id);
    }

    log::debug!("Added player {} to team {}", id, team_id);
    Ok(id)
}

/// Record the result of a match and refresh the affected standings
///
/// Previous events are discarded. Each event is attributed to the player's
/// current team; inputs naming an unknown player or a player without a team
/// are skipped. Recording over an already finished match overwrites it.
pub fn record_result<S: Repository + ?Sized>(
    store: &mut S,
    match_id: MatchId,
    result: MatchResult,
) -> CompetitionResult<RecordedResult> {
    let mut fixture = store
        .match_(match_id)
        .cloned()
        .ok_or(CompetitionError::MatchNotFound(match_id))?;

    for score in [result.team1_score, result.team2_score] {
        if score > MAX_SCORE {
            return Err(CompetitionError::InvalidScore {
                score,
                max: MAX_SCORE,
            });
        }
    }

    // The standings refresh below must not fail after the match is written
    if let Some(group_id) = fixture.group_id {
        let in_competition = store
            .group(group_id)
            .is_some_and(|g| g.competition_id == fixture.competition_id);
        if store.competition(fixture.competition_id).is_some() && !in_competition {
            return Err(CompetitionError::GroupNotFound(group_id));
        }
    }

    fixture.team1_score = Some(result.team1_score);
    fixture.team2_score = Some(result.team2_score);
    fixture.status = MatchStatus::Finished;
    if let Some(date) = result.date {
        fixture.date = Some(date);
    }

    fixture.events.clear();
    let mut skipped = Vec::new();
    for input in result.events {
        let team_id = match store.player(input.player_id) {
            None => {
                log::warn!(
                    "Event for unknown player {} in match {}, skipping",
                    input.player_id,
                    match_id
                );
                skipped.push(SkippedEvent::UnknownPlayer(input.player_id));
                continue;
            }
            Some(player) => match player.team_id {
                Some(team_id) => team_id,
                None => {
                    log::warn!(
                        "Player {} has no team, skipping event in match {}",
                        input.player_id,
                        match_id
                    );
                    skipped.push(SkippedEvent::PlayerWithoutTeam(input.player_id));
                    continue;
                }
            },
        };

        let event_id = store.next_id(EntityKind::Event);
        fixture.events.push(MatchEvent {
            id: event_id,
            match_id,
            team_id,
            player_id: input.player_id,
            event_type: input.event_type,
            minute: input.minute.filter(|m| !m.trim().is_empty()),
        });
    }

    let recorded = fixture.events.len();
    let competition_id = fixture.competition_id;
    let group_id = fixture.group_id;
    store.put_match(fixture);

    log::info!(
        "Recorded result for match {} ({} events, {} skipped)",
        match_id,
        recorded,
        skipped.len()
    );

    let format = store.competition(competition_id).map(|c| c.format);
    match (group_id, format) {
        (Some(group_id), Some(_)) => {
            recalculate_standings(store, competition_id, Some(group_id))?;
        }
        (None, Some(CompetitionFormat::RoundRobin)) => {
            recalculate_standings(store, competition_id, None)?;
        }
        (_, None) => {
            log::warn!(
                "Match {} belongs to unknown competition {}, standings not refreshed",
                match_id,
                competition_id
            );
        }
        _ => {}
    }

    Ok(RecordedResult {
        match_id,
        recorded,
        skipped,
    })
}
