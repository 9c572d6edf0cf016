//! Group draw and intra-group fixtures.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::competition::{
    errors::{CompetitionError, CompetitionResult},
    models::{CompetitionFormat, CompetitionId, CompetitionStatus, Group, GroupId, TeamId},
};
use crate::standings::recalculate_standings;
use crate::store::{EntityKind, Repository};

use super::{purge_matches, round_robin_pairs, schedule_match};

/// Maximum number of groups in a draw
pub const MAX_GROUPS: usize = 16;
/// Minimum teams per group
pub const MIN_TEAMS_PER_GROUP: usize = 2;
/// Maximum teams per group
pub const MAX_TEAMS_PER_GROUP: usize = 16;

/// Check a draw layout against the limits and the size of the team pool
pub fn validate_layout(groups: usize, per_group: usize, teams: usize) -> CompetitionResult<()> {
    let in_range = (1..=MAX_GROUPS).contains(&groups)
        && (MIN_TEAMS_PER_GROUP..=MAX_TEAMS_PER_GROUP).contains(&per_group);

    if !in_range || groups * per_group > teams {
        return Err(CompetitionError::InvalidGroupLayout {
            groups,
            per_group,
            teams,
        });
    }
    Ok(())
}

/// Shuffle the pool and deal it into `groups` groups of `per_group` teams
///
/// Dealing goes seat by seat: seat 0 of every group, then seat 1, and so on.
/// Teams left over after `groups * per_group` seats are not placed.
pub fn deal_groups<R: Rng + ?Sized>(
    team_ids: &[TeamId],
    groups: usize,
    per_group: usize,
    rng: &mut R,
) -> Vec<Vec<TeamId>> {
    let mut pool = team_ids.to_vec();
    pool.shuffle(rng);

    let mut dealt: Vec<Vec<TeamId>> = vec![Vec::with_capacity(per_group); groups];
    let mut pool = pool.into_iter();
    'deal: for _seat in 0..per_group {
        for group in dealt.iter_mut() {
            match pool.next() {
                Some(team_id) => group.push(team_id),
                None => break 'deal,
            }
        }
    }
    dealt
}

/// Display name of the i-th group: "Group A", "Group B", ...
pub fn group_name(index: usize) -> String {
    let letter = u8::try_from(index)
        .ok()
        .and_then(|i| b'A'.checked_add(i))
        .filter(u8::is_ascii_uppercase)
        .map(char::from);
    match letter {
        Some(letter) => format!("Group {letter}"),
        None => format!("Group {}", index + 1),
    }
}

/// Draw the competition's teams into groups and schedule every group's round-robin
///
/// Existing groups, their matches and any knockout bracket are deleted first.
/// Validation happens before anything is touched, so a rejected layout leaves
/// the store as it was. Returns the new group ids in draw order.
pub fn generate_group_draw<S, R>(
    store: &mut S,
    competition_id: CompetitionId,
    groups: usize,
    per_group: usize,
    rng: &mut R,
) -> CompetitionResult<Vec<GroupId>>
where
    S: Repository + ?Sized,
    R: Rng + ?Sized,
{
    let mut competition = store
        .competition(competition_id)
        .cloned()
        .ok_or(CompetitionError::CompetitionNotFound(competition_id))?;

    if competition.format != CompetitionFormat::GroupsKnockout {
        return Err(CompetitionError::WrongFormat {
            expected: CompetitionFormat::GroupsKnockout,
            actual: competition.format,
        });
    }

    let team_ids: Vec<TeamId> = store
        .competition_teams(competition_id)
        .iter()
        .map(|t| t.id)
        .collect();
    validate_layout(groups, per_group, team_ids.len())?;

    for group_id in std::mem::take(&mut competition.groups) {
        if let Some(old) = store.remove_group(group_id) {
            purge_matches(store, &mut competition, old.matches);
        }
    }
    if let Some(stage) = competition.knockout_stage.take() {
        purge_matches(store, &mut competition, stage.match_ids().collect::<Vec<_>>());
    }
    competition.standings.clear();
    competition.status = CompetitionStatus::GroupStage;

    let dealt = deal_groups(&team_ids, groups, per_group, rng);
    let mut group_ids = Vec::with_capacity(dealt.len());

    for (index, members) in dealt.into_iter().enumerate() {
        if members.is_empty() {
            continue;
        }

        let group_id = store.next_id(EntityKind::Group);
        let mut group = Group::new(group_id, competition_id, group_name(index), members);

        for (home, away) in round_robin_pairs(&group.teams) {
            let match_id = schedule_match(store, &mut competition, home, away, |m| {
                m.in_group(group_id)
            });
            group.matches.push(match_id);
        }

        log::debug!(
            "{} drawn with teams {:?} and {} matches",
            group.name,
            group.teams,
            group.matches.len()
        );
        store.put_group(group);
        competition.groups.push(group_id);
        group_ids.push(group_id);
    }

    store.put_competition(competition);

    for &group_id in &group_ids {
        recalculate_standings(store, competition_id, Some(group_id))?;
    }

    log::info!(
        "Drew {} groups of {} for competition {} ({} teams in the pool)",
        group_ids.len(),
        per_group,
        competition_id,
        team_ids.len()
    );

    Ok(group_ids)
}
