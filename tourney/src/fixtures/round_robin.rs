//! League round-robin over a whole competition.

use crate::competition::{
    errors::{CompetitionError, CompetitionResult},
    models::{CompetitionFormat, CompetitionId, MatchId, TeamId},
};
use crate::standings::recalculate_standings;
use crate::store::Repository;

use super::{purge_matches, round_robin_pairs, schedule_match};

/// Round number given to every league fixture. Each pair meets once.
pub const LEAGUE_ROUND: u32 = 1;

/// Replace the competition's fixtures with a single round-robin
///
/// Needs at least two teams. Every existing match of the competition is
/// deleted and the league table is rebuilt from the (unplayed) fixtures.
pub fn generate_round_robin<S>(
    store: &mut S,
    competition_id: CompetitionId,
) -> CompetitionResult<Vec<MatchId>>
where
    S: Repository + ?Sized,
{
    let mut competition = store
        .competition(competition_id)
        .cloned()
        .ok_or(CompetitionError::CompetitionNotFound(competition_id))?;

    if competition.format != CompetitionFormat::RoundRobin {
        return Err(CompetitionError::WrongFormat {
            expected: CompetitionFormat::RoundRobin,
            actual: competition.format,
        });
    }

    let team_ids: Vec<TeamId> = store
        .competition_teams(competition_id)
        .iter()
        .map(|t| t.id)
        .collect();
    if team_ids.len() < 2 {
        return Err(CompetitionError::InsufficientTeams {
            needed: 2,
            current: team_ids.len(),
        });
    }

    let previous = std::mem::take(&mut competition.matches);
    purge_matches(store, &mut competition, previous);
    competition.standings.clear();

    let pairs = round_robin_pairs(&team_ids);
    let mut match_ids = Vec::with_capacity(pairs.len());
    for (home, away) in pairs {
        let match_id = schedule_match(store, &mut competition, home, away, |m| {
            m.in_round(LEAGUE_ROUND)
        });
        match_ids.push(match_id);
    }

    store.put_competition(competition);
    recalculate_standings(store, competition_id, None)?;

    log::info!(
        "Generated {} round-robin matches for competition {} ({} teams)",
        match_ids.len(),
        competition_id,
        team_ids.len()
    );

    Ok(match_ids)
}
