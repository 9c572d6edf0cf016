//! Fixture generation.
//!
//! Three independent entry points, each of which rewrites the fixtures it owns:
//!
//! - [`group_draw::generate_group_draw`]: random group draw plus a single
//!   round-robin inside every group
//! - [`round_robin::generate_round_robin`]: one league round-robin over every
//!   team of the competition
//! - [`knockout::seed_knockout`]: first knockout round seeded from the group
//!   qualifiers
//!
//! Randomised steps take the random source as a parameter, so a seeded
//! generator reproduces a draw exactly.
//!
//! ## Example
//!
//! ```
//! use rand::{SeedableRng, rngs::StdRng};
//! use tourney::competition::{CompetitionFormat, CompetitionKind, manager};
//! use tourney::fixtures::group_draw::generate_group_draw;
//! use tourney::store::MemoryStore;
//!
//! let mut store = MemoryStore::new();
//! let cup = manager::create_competition(
//!     &mut store,
//!     "Summer Cup",
//!     CompetitionKind::Football,
//!     CompetitionFormat::GroupsKnockout,
//! )?;
//! for i in 0..8 {
//!     manager::add_team(&mut store, cup, &format!("Team {i}"))?;
//! }
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let groups = generate_group_draw(&mut store, cup, 2, 4, &mut rng)?;
//! assert_eq!(groups.len(), 2);
//! # Ok::<(), tourney::competition::CompetitionError>(())
//! ```

pub mod group_draw;
pub mod knockout;
pub mod round_robin;

use crate::competition::models::{Competition, Match, MatchId, TeamId};
use crate::store::{EntityKind, Repository};

pub use group_draw::{
    MAX_GROUPS, MAX_TEAMS_PER_GROUP, MIN_TEAMS_PER_GROUP, deal_groups, generate_group_draw,
};
pub use knockout::{
    BRACKET_SIZES, GroupQualifiers, KnockoutOutcome, QUALIFIERS_PER_GROUP, QualifierReport,
    group_qualifiers, pair_bracket, round_label, seed_knockout,
};
pub use round_robin::generate_round_robin;

/// Every unordered pair of `team_ids`, each exactly once
///
/// Pairs come out in lexicographic index order: (0,1), (0,2), ..., (1,2), ...
pub fn round_robin_pairs(team_ids: &[TeamId]) -> Vec<(TeamId, TeamId)> {
    team_ids
        .iter()
        .enumerate()
        .flat_map(|(i, &home)| team_ids[i + 1..].iter().map(move |&away| (home, away)))
        .collect()
}

/// Create a scheduled match and register it with the competition
///
/// `place` puts the match in its group, round or knockout round.
pub(crate) fn schedule_match<S, F>(
    store: &mut S,
    competition: &mut Competition,
    team1_id: TeamId,
    team2_id: TeamId,
    place: F,
) -> MatchId
where
    S: Repository + ?Sized,
    F: FnOnce(Match) -> Match,
{
    let match_id = store.next_id(EntityKind::Match);
    let fixture = place(Match::scheduled(
        match_id,
        competition.id,
        team1_id,
        team2_id,
    ));
    store.put_match(fixture);
    competition.matches.push(match_id);
    match_id
}

/// Delete matches from the store and from the competition's match list
pub(crate) fn purge_matches<S, I>(store: &mut S, competition: &mut Competition, match_ids: I)
where
    S: Repository + ?Sized,
    I: IntoIterator<Item = MatchId>,
{
    let mut removed = 0usize;
    for match_id in match_ids {
        if store.remove_match(match_id).is_some() {
            removed += 1;
        }
        competition.matches.retain(|id| *id != match_id);
    }
    if removed > 0 {
        log::debug!(
            "Removed {} matches from competition {}",
            removed,
            competition.id
        );
    }
}

/// Sort matches for display: group, then knockout round, then round number, then id
///
/// Matches without a group or round number sort after those with one.
pub fn sort_fixtures(matches: &mut [&Match]) {
    matches.sort_by(|a, b| {
        let key = |m: &Match| {
            (
                m.group_id.unwrap_or(i64::MAX),
                m.knockout_round.clone().unwrap_or_default(),
                m.round_number.unwrap_or(u32::MAX),
                m.id,
            )
        };
        key(a).cmp(&key(b))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_robin_pairs_order() {
        assert_eq!(
            round_robin_pairs(&[1, 2, 3, 4]),
            vec![(1, 2), (1, 3), (1, 4), (2, 3), (2, 4), (3, 4)]
        );
    }

    #[test]
    fn test_round_robin_pairs_degenerate() {
        assert!(round_robin_pairs(&[]).is_empty());
        assert!(round_robin_pairs(&[5]).is_empty());
    }

    #[test]
    fn test_sort_fixtures() {
        let league = Match::scheduled(1, 1, 1, 2).in_round(1);
        let group_b = Match::scheduled(2, 1, 3, 4).in_group(8);
        let group_a = Match::scheduled(3, 1, 5, 6).in_group(7);
        let final_ = Match::scheduled(4, 1, 5, 3).in_knockout_round("Final");

        let mut matches = vec![&league, &final_, &group_b, &group_a];
        sort_fixtures(&mut matches);
        let ids: Vec<_> = matches.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 2, 1, 4]);
    }
}
