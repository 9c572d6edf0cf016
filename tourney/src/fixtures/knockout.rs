//! Knockout bracket seeding from the group stage.
//!
//! Only the first knockout round is generated. Each group sends its top
//! [`QUALIFIERS_PER_GROUP`] teams; the first `bracket_size` qualifiers (in group
//! order, then rank order) are shuffled once and paired off in consecutive
//! positions.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::competition::{
    errors::{CompetitionError, CompetitionResult},
    models::{
        CompetitionFormat, CompetitionId, CompetitionStatus, GroupId, KnockoutStage, MatchId,
        StandingsMap, TeamId,
    },
};
use crate::standings::{StandingsScope, aggregate, ordered_standings, rank};
use crate::store::Repository;

use super::{purge_matches, schedule_match};

/// Teams each group sends to the knockout stage
pub const QUALIFIERS_PER_GROUP: usize = 2;

/// Supported first-round bracket sizes
pub const BRACKET_SIZES: [usize; 5] = [2, 4, 8, 16, 32];

/// Label of the knockout round that starts with `bracket_size` teams
pub fn round_label(bracket_size: usize) -> Option<&'static str> {
    match bracket_size {
        2 => Some("Final"),
        4 => Some("Semifinal"),
        8 => Some("Quartas"),
        16 => Some("Oitavas"),
        32 => Some("16 avos"),
        _ => None,
    }
}

/// Qualified teams of one finished group, best first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupQualifiers {
    pub group_id: GroupId,
    pub team_ids: Vec<TeamId>,
}

/// State of the group stage as seen by knockout seeding
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualifierReport {
    /// Finished groups and their qualifiers, in the competition's group order
    pub qualified: Vec<GroupQualifiers>,
    /// Groups that still have unfinished matches
    pub pending: Vec<GroupId>,
}

impl QualifierReport {
    pub fn all_finished(&self) -> bool {
        self.pending.is_empty()
    }

    /// Qualifiers flattened across groups, in group order then rank order
    pub fn flattened(&self) -> Vec<TeamId> {
        self.qualified
            .iter()
            .flat_map(|g| g.team_ids.iter().copied())
            .collect()
    }

    pub fn qualified_count(&self) -> usize {
        self.qualified.iter().map(|g| g.team_ids.len()).sum()
    }
}

/// Result of a seeding request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnockoutOutcome {
    /// The first round was created
    Seeded {
        round: String,
        match_ids: Vec<MatchId>,
        qualifiers: QualifierReport,
    },
    /// Some groups are not finished; no bracket was created
    GroupsUnfinished { pending: Vec<GroupId> },
}

/// What one group looks like right now
#[derive(Debug)]
struct GroupReview {
    group_id: GroupId,
    finished: bool,
    table: Option<StandingsMap>,
    qualifiers: Vec<TeamId>,
}

/// Read-only pass over the competition's groups
///
/// Finished groups get a fresh standings table and their qualifiers. Nothing is
/// written to the store here.
fn review_groups<S: Repository + ?Sized>(
    store: &S,
    competition_id: CompetitionId,
    group_ids: &[GroupId],
) -> Vec<GroupReview> {
    let mut reviews = Vec::with_capacity(group_ids.len());

    for &group_id in group_ids {
        let Some(group) = store.group(group_id) else {
            log::warn!(
                "Group {} listed by competition {} not found, skipping",
                group_id,
                competition_id
            );
            continue;
        };

        let matches = store.group_matches(group_id);
        let finished = matches.iter().all(|m| m.is_finished());
        if !finished {
            reviews.push(GroupReview {
                group_id,
                finished,
                table: None,
                qualifiers: Vec::new(),
            });
            continue;
        }

        let team_ids: Vec<TeamId> = group
            .teams
            .iter()
            .copied()
            .filter(|&t| store.team(t).is_some())
            .collect();
        let scope = StandingsScope::group(competition_id, group_id);
        let table = aggregate(store, scope, &team_ids, &matches);
        let qualifiers = rank(ordered_standings(&table, &team_ids))
            .into_iter()
            .take(QUALIFIERS_PER_GROUP)
            .map(|s| s.team_id)
            .collect();

        reviews.push(GroupReview {
            group_id,
            finished,
            table: Some(table),
            qualifiers,
        });
    }

    reviews
}

/// Persist finished flags and refreshed tables from a review
fn apply_reviews<S: Repository + ?Sized>(store: &mut S, reviews: &[GroupReview]) {
    for review in reviews {
        if let Some(group) = store.group_mut(review.group_id) {
            group.is_finished = review.finished;
            if let Some(table) = &review.table {
                group.standings = table.clone();
            }
        }
    }
}

fn report_from(reviews: &[GroupReview]) -> QualifierReport {
    let mut report = QualifierReport::default();
    for review in reviews {
        if review.finished {
            report.qualified.push(GroupQualifiers {
                group_id: review.group_id,
                team_ids: review.qualifiers.clone(),
            });
        } else {
            report.pending.push(review.group_id);
        }
    }
    report
}

/// Load a groups+knockout competition that has at least one group
fn group_stage_of<S: Repository + ?Sized>(
    store: &S,
    competition_id: CompetitionId,
) -> CompetitionResult<Vec<GroupId>> {
    let competition = store
        .competition(competition_id)
        .ok_or(CompetitionError::CompetitionNotFound(competition_id))?;

    if competition.format != CompetitionFormat::GroupsKnockout {
        return Err(CompetitionError::WrongFormat {
            expected: CompetitionFormat::GroupsKnockout,
            actual: competition.format,
        });
    }
    if competition.groups.is_empty() {
        return Err(CompetitionError::NoGroups(competition_id));
    }
    Ok(competition.groups.clone())
}

/// Refresh group finished flags and report each finished group's qualifiers
pub fn group_qualifiers<S: Repository + ?Sized>(
    store: &mut S,
    competition_id: CompetitionId,
) -> CompetitionResult<QualifierReport> {
    let group_ids = group_stage_of(&*store, competition_id)?;
    let reviews = review_groups(&*store, competition_id, &group_ids);
    apply_reviews(store, &reviews);
    Ok(report_from(&reviews))
}

/// Pick the first `bracket_size` qualifiers, shuffle them and pair them off
pub fn pair_bracket<R: Rng + ?Sized>(
    qualifiers: &[TeamId],
    bracket_size: usize,
    rng: &mut R,
) -> CompetitionResult<Vec<(TeamId, TeamId)>> {
    if !BRACKET_SIZES.contains(&bracket_size) || bracket_size > qualifiers.len() {
        return Err(CompetitionError::InvalidBracketSize {
            size: bracket_size,
            qualified: qualifiers.len(),
        });
    }

    let mut seeded = qualifiers[..bracket_size].to_vec();
    seeded.shuffle(rng);

    Ok(seeded
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect())
}

/// Seed the first knockout round from the group stage
///
/// When a group still has unfinished matches, only the refreshed finished
/// flags are stored and [`KnockoutOutcome::GroupsUnfinished`] is returned. An
/// invalid bracket size leaves the store untouched. On success any previous
/// knockout matches are deleted before the new round is created.
pub fn seed_knockout<S, R>(
    store: &mut S,
    competition_id: CompetitionId,
    bracket_size: usize,
    rng: &mut R,
) -> CompetitionResult<KnockoutOutcome>
where
    S: Repository + ?Sized,
    R: Rng + ?Sized,
{
    let group_ids = group_stage_of(&*store, competition_id)?;
    let reviews = review_groups(&*store, competition_id, &group_ids);
    let report = report_from(&reviews);

    if !report.all_finished() {
        apply_reviews(store, &reviews);
        log::warn!(
            "Group stage of competition {} not finished, groups pending: {:?}",
            competition_id,
            report.pending
        );
        return Ok(KnockoutOutcome::GroupsUnfinished {
            pending: report.pending,
        });
    }

    let pairs = pair_bracket(&report.flattened(), bracket_size, rng)?;
    let round = round_label(bracket_size)
        .ok_or(CompetitionError::InvalidBracketSize {
            size: bracket_size,
            qualified: report.qualified_count(),
        })?
        .to_string();

    apply_reviews(store, &reviews);

    let mut competition = store
        .competition(competition_id)
        .cloned()
        .ok_or(CompetitionError::CompetitionNotFound(competition_id))?;

    if let Some(previous) = competition.knockout_stage.take() {
        purge_matches(store, &mut competition, previous.match_ids().collect::<Vec<_>>());
    }

    let mut stage = KnockoutStage::new(competition_id);
    let mut match_ids = Vec::with_capacity(pairs.len());
    for (home, away) in pairs {
        let label = round.clone();
        let match_id = schedule_match(store, &mut competition, home, away, move |m| {
            m.in_knockout_round(label)
        });
        match_ids.push(match_id);
    }
    stage.rounds.insert(round.clone(), match_ids.clone());

    competition.knockout_stage = Some(stage);
    competition.status = CompetitionStatus::KnockoutStage;
    store.put_competition(competition);

    log::info!(
        "Seeded {} for competition {} with {} teams",
        round,
        competition_id,
        bracket_size
    );

    Ok(KnockoutOutcome::Seeded {
        round,
        match_ids,
        qualifiers: report,
    })
}
