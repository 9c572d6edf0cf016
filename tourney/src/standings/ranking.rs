//! Tie-break ranking of standings tables.
//!
//! A ranking is an ordered list of criteria, each a standings field and a
//! direction. Criteria are compared lexicographically and the sort is stable,
//! so teams level on every criterion keep their input order. There is no
//! drawing of lots and no head-to-head criterion.

use std::cmp::Ordering;

use crate::competition::models::Standing;

/// Standings field a criterion reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankKey {
    Points,
    GoalDifference,
    GoalsFor,
    GoalsAgainst,
    Wins,
    RedCards,
    YellowCards,
}

impl RankKey {
    fn value(self, standing: &Standing) -> i64 {
        match self {
            RankKey::Points => i64::from(standing.points),
            RankKey::GoalDifference => standing.goal_difference,
            RankKey::GoalsFor => i64::from(standing.goals_for),
            RankKey::GoalsAgainst => i64::from(standing.goals_against),
            RankKey::Wins => i64::from(standing.wins),
            RankKey::RedCards => i64::from(standing.red_cards),
            RankKey::YellowCards => i64::from(standing.yellow_cards),
        }
    }
}

/// Which end of a criterion ranks first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Higher is better
    Descending,
    /// Lower is better
    Ascending,
}

/// One step of the tie-break chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RankCriterion {
    pub key: RankKey,
    pub direction: Direction,
}

impl RankCriterion {
    pub const fn desc(key: RankKey) -> Self {
        Self {
            key,
            direction: Direction::Descending,
        }
    }

    pub const fn asc(key: RankKey) -> Self {
        Self {
            key,
            direction: Direction::Ascending,
        }
    }

    /// `Less` when `a` ranks above `b`
    pub fn compare(&self, a: &Standing, b: &Standing) -> Ordering {
        let (a, b) = (self.key.value(a), self.key.value(b));
        match self.direction {
            Direction::Descending => b.cmp(&a),
            Direction::Ascending => a.cmp(&b),
        }
    }
}

/// Points, goal difference, goals scored, then fewest red and fewest yellow cards
pub const DEFAULT_CRITERIA: [RankCriterion; 5] = [
    RankCriterion::desc(RankKey::Points),
    RankCriterion::desc(RankKey::GoalDifference),
    RankCriterion::desc(RankKey::GoalsFor),
    RankCriterion::asc(RankKey::RedCards),
    RankCriterion::asc(RankKey::YellowCards),
];

/// Compare two standings through a criteria chain
pub fn compare_standings(a: &Standing, b: &Standing, criteria: &[RankCriterion]) -> Ordering {
    criteria
        .iter()
        .map(|criterion| criterion.compare(a, b))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Order standings best-first with [`DEFAULT_CRITERIA`]
pub fn rank(standings: impl IntoIterator<Item = Standing>) -> Vec<Standing> {
    rank_by(standings, &DEFAULT_CRITERIA)
}

/// Order standings best-first with a custom criteria chain
pub fn rank_by(
    standings: impl IntoIterator<Item = Standing>,
    criteria: &[RankCriterion],
) -> Vec<Standing> {
    let mut ranked: Vec<Standing> = standings.into_iter().collect();
    // `sort_by` is stable
    ranked.sort_by(|a, b| compare_standings(a, b, criteria));
    ranked
}
