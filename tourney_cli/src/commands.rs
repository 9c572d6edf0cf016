//! Subcommands: argument parsing and execution against the store.

use std::fmt::Write as _;

use anyhow::{Result, anyhow, bail};
use chrono::NaiveDate;
use pico_args::Arguments;
use rand::Rng;
use tourney::{
    competition::{
        CompetitionError, CompetitionFormat, CompetitionId, CompetitionKind, EventInput,
        EventType, GroupId, Match, MatchId, MatchResult, PlayerId, TeamId, manager,
    },
    fixtures::{
        KnockoutOutcome, generate_group_draw, generate_round_robin, group_qualifiers,
        seed_knockout, sort_fixtures,
    },
    standings::{recalculate_all, standings_table},
    stats::{competition_stats, refresh_player_counters},
    store::{MemoryStore, Repository},
};

/// One CLI invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    NewCompetition {
        name: String,
        kind: CompetitionKind,
        format: CompetitionFormat,
    },
    AddTeam {
        competition: CompetitionId,
        name: String,
    },
    AddPlayer {
        team: TeamId,
        name: String,
    },
    DrawGroups {
        competition: CompetitionId,
        groups: usize,
        per_group: usize,
    },
    RoundRobin {
        competition: CompetitionId,
    },
    Record {
        match_id: MatchId,
        result: MatchResult,
    },
    Knockout {
        competition: CompetitionId,
        size: usize,
    },
    Qualifiers {
        competition: CompetitionId,
    },
    Standings {
        competition: CompetitionId,
        group: Option<GroupId>,
    },
    Fixtures {
        competition: CompetitionId,
    },
    Stats {
        competition: CompetitionId,
    },
    Counters {
        competition: CompetitionId,
    },
}

/// Parse `TYPE:PLAYER[:MINUTE]`, e.g. `goal:12:45+2` or `yellow:7`
pub fn parse_event(raw: &str) -> Result<EventInput, String> {
    let mut parts = raw.splitn(3, ':');
    let event_type: EventType = parts.next().unwrap_or_default().parse()?;
    let player_id: PlayerId = parts
        .next()
        .ok_or_else(|| format!("missing player id in event {raw:?}"))?
        .parse()
        .map_err(|_| format!("invalid player id in event {raw:?}"))?;
    let minute = parts
        .next()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string);

    Ok(EventInput {
        player_id,
        event_type,
        minute,
    })
}

fn parse_kind(raw: &str) -> Result<CompetitionKind, String> {
    raw.parse()
}

fn parse_format(raw: &str) -> Result<CompetitionFormat, String> {
    raw.parse()
}

impl Command {
    /// Build a command from its name and the remaining arguments
    ///
    /// Options are taken before positional arguments, as `pico_args` expects.
    pub fn parse(name: &str, pargs: &mut Arguments) -> Result<Self> {
        let command = match name {
            "new-competition" => {
                let kind = pargs
                    .opt_value_from_fn("--kind", parse_kind)?
                    .unwrap_or(CompetitionKind::Football);
                let format = pargs.value_from_fn("--format", parse_format)?;
                Command::NewCompetition {
                    name: pargs.free_from_str()?,
                    kind,
                    format,
                }
            }
            "add-team" => Command::AddTeam {
                competition: pargs.free_from_str()?,
                name: pargs.free_from_str()?,
            },
            "add-player" => Command::AddPlayer {
                team: pargs.free_from_str()?,
                name: pargs.free_from_str()?,
            },
            "draw-groups" => {
                let groups = pargs.value_from_str("--groups")?;
                let per_group = pargs.value_from_str("--per-group")?;
                Command::DrawGroups {
                    competition: pargs.free_from_str()?,
                    groups,
                    per_group,
                }
            }
            "round-robin" => Command::RoundRobin {
                competition: pargs.free_from_str()?,
            },
            "record" => {
                let date: Option<NaiveDate> = pargs.opt_value_from_str("--date")?;
                let events = pargs.values_from_fn("--event", parse_event)?;
                Command::Record {
                    match_id: pargs.free_from_str()?,
                    result: MatchResult {
                        team1_score: pargs.free_from_str()?,
                        team2_score: pargs.free_from_str()?,
                        date,
                        events,
                    },
                }
            }
            "knockout" => {
                let size = pargs.value_from_str("--size")?;
                Command::Knockout {
                    competition: pargs.free_from_str()?,
                    size,
                }
            }
            "qualifiers" => Command::Qualifiers {
                competition: pargs.free_from_str()?,
            },
            "standings" => {
                let group = pargs.opt_value_from_str("--group")?;
                Command::Standings {
                    competition: pargs.free_from_str()?,
                    group,
                }
            }
            "fixtures" => Command::Fixtures {
                competition: pargs.free_from_str()?,
            },
            "stats" => Command::Stats {
                competition: pargs.free_from_str()?,
            },
            "counters" => Command::Counters {
                competition: pargs.free_from_str()?,
            },
            other => bail!("Unknown command: {other}"),
        };
        Ok(command)
    }

    /// Whether the snapshot has to be written back afterwards
    pub fn mutates(&self) -> bool {
        !matches!(self, Command::Fixtures { .. } | Command::Stats { .. })
    }

    /// Run the command and render its output
    pub fn execute<R: Rng + ?Sized>(self, store: &mut MemoryStore, rng: &mut R) -> Result<String> {
        let mut out = String::new();

        match self {
            Command::NewCompetition { name, kind, format } => {
                let id = manager::create_competition(store, &name, kind, format)
                    .map_err(user_error)?;
                writeln!(out, "Created competition {id}: {name} ({kind}, {format})")?;
            }
            Command::AddTeam { competition, name } => {
                let id = manager::add_team(store, competition, &name).map_err(user_error)?;
                writeln!(out, "Added team {id}: {name}")?;
            }
            Command::AddPlayer { team, name } => {
                let id = manager::add_player(store, team, &name).map_err(user_error)?;
                writeln!(out, "Added player {id}: {name}")?;
            }
            Command::DrawGroups {
                competition,
                groups,
                per_group,
            } => {
                let ids = generate_group_draw(store, competition, groups, per_group, rng)
                    .map_err(user_error)?;
                for id in ids {
                    let Some(group) = store.group(id) else {
                        continue;
                    };
                    let names: Vec<_> = group.teams.iter().map(|t| team_name(store, *t)).collect();
                    writeln!(out, "{}: {}", group.name, names.join(", "))?;
                }
            }
            Command::RoundRobin { competition } => {
                let ids = generate_round_robin(store, competition).map_err(user_error)?;
                writeln!(out, "Generated {} matches", ids.len())?;
            }
            Command::Record { match_id, result } => {
                let recorded = manager::record_result(store, match_id, result).map_err(user_error)?;
                writeln!(
                    out,
                    "Recorded match {} with {} events",
                    recorded.match_id, recorded.recorded
                )?;
                for skipped in recorded.skipped {
                    writeln!(out, "Skipped event: {skipped:?}")?;
                }
            }
            Command::Knockout { competition, size } => {
                match seed_knockout(store, competition, size, rng).map_err(user_error)? {
                    KnockoutOutcome::Seeded {
                        round, match_ids, ..
                    } => {
                        writeln!(out, "{round}:")?;
                        for id in match_ids {
                            if let Some(m) = store.match_(id) {
                                writeln!(out, "  {}", describe_match(store, m))?;
                            }
                        }
                    }
                    KnockoutOutcome::GroupsUnfinished { pending } => {
                        let names: Vec<_> = pending.iter().map(|g| group_name(store, *g)).collect();
                        writeln!(out, "Group stage not finished: {}", names.join(", "))?;
                    }
                }
            }
            Command::Qualifiers { competition } => {
                let report = group_qualifiers(store, competition).map_err(user_error)?;
                for group in &report.qualified {
                    let names: Vec<_> = group
                        .team_ids
                        .iter()
                        .map(|t| team_name(store, *t))
                        .collect();
                    writeln!(out, "{}: {}", group_name(store, group.group_id), names.join(", "))?;
                }
                for group_id in &report.pending {
                    writeln!(out, "{}: not finished", group_name(store, *group_id))?;
                }
            }
            Command::Standings { competition, group } => {
                let tables = match group {
                    Some(group_id) => vec![(
                        Some(group_id),
                        standings_table(store, competition, Some(group_id)).map_err(user_error)?,
                    )],
                    None => recalculate_all(store, competition).map_err(user_error)?,
                };
                for (group_id, table) in tables {
                    if let Some(group_id) = group_id {
                        writeln!(out, "{}", group_name(store, group_id))?;
                    }
                    writeln!(
                        out,
                        "{:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>4} {:>3} {:>3}",
                        "#", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts", "Y", "R"
                    )?;
                    for (pos, s) in table.iter().enumerate() {
                        writeln!(
                            out,
                            "{:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>4} {:>3} {:>3}",
                            pos + 1,
                            team_name(store, s.team_id),
                            s.played,
                            s.wins,
                            s.draws,
                            s.losses,
                            s.goals_for,
                            s.goals_against,
                            s.goal_difference,
                            s.points,
                            s.yellow_cards,
                            s.red_cards
                        )?;
                    }
                }
            }
            Command::Fixtures { competition } => {
                if store.competition(competition).is_none() {
                    return Err(user_error(CompetitionError::CompetitionNotFound(competition)));
                }
                let mut matches = store.competition_matches(competition);
                sort_fixtures(&mut matches);
                for m in matches {
                    writeln!(out, "{}", describe_match(store, m))?;
                }
            }
            Command::Stats { competition } => {
                let stats = competition_stats(store, competition).map_err(user_error)?;
                writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;
            }
            Command::Counters { competition } => {
                let updated = refresh_player_counters(store, competition).map_err(user_error)?;
                writeln!(out, "Updated counters for {updated} players")?;
            }
        }

        Ok(out)
    }
}

/// Turn a library error into the message shown to the operator
fn user_error(err: CompetitionError) -> anyhow::Error {
    log::debug!("{err}");
    anyhow!(err.client_message())
}

fn team_name(store: &MemoryStore, team_id: TeamId) -> String {
    store
        .team(team_id)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| format!("Team #{team_id}"))
}

fn group_name(store: &MemoryStore, group_id: GroupId) -> String {
    store
        .group(group_id)
        .map(|g| g.name.clone())
        .unwrap_or_else(|| format!("Group #{group_id}"))
}

fn describe_match(store: &MemoryStore, m: &Match) -> String {
    let stage = match (&m.knockout_round, m.group_id, m.round_number) {
        (Some(label), _, _) => label.clone(),
        (None, Some(group_id), _) => group_name(store, group_id),
        (None, None, Some(round)) => format!("Round {round}"),
        (None, None, None) => "-".to_string(),
    };
    let score = match m.final_score() {
        Some((s1, s2)) => format!("{s1} x {s2}"),
        None => "x".to_string(),
    };
    let date = m.date.map(|d| format!(" on {d}")).unwrap_or_default();

    format!(
        "#{:<4} [{}] {} {} {}{}",
        m.id,
        stage,
        team_name(store, m.team1_id),
        score,
        team_name(store, m.team2_id),
        date
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use std::ffi::OsString;

    fn args(raw: &[&str]) -> Arguments {
        Arguments::from_vec(raw.iter().map(OsString::from).collect())
    }

    fn run(store: &mut MemoryStore, raw: &[&str]) -> Result<String> {
        let mut pargs = args(&raw[1..]);
        let command = Command::parse(raw[0], &mut pargs)?;
        command.execute(store, &mut StdRng::seed_from_u64(1))
    }

    #[test]
    fn test_parse_event() {
        assert_eq!(
            parse_event("goal:12:45+2"),
            Ok(EventInput {
                player_id: 12,
                event_type: EventType::Goal,
                minute: Some("45+2".to_string()),
            })
        );
        assert_eq!(parse_event("red:3").unwrap().minute, None);
        assert!(parse_event("goal").is_err());
        assert!(parse_event("corner:3").is_err());
        assert!(parse_event("goal:abc").is_err());
    }

    #[test]
    fn test_parse_record() {
        let mut pargs = args(&[
            "4",
            "2",
            "1",
            "--date",
            "2024-06-01",
            "--event",
            "goal:1:10",
            "--event",
            "yellow:2",
        ]);
        let command = Command::parse("record", &mut pargs).unwrap();
        let Command::Record { match_id, result } = command else {
            panic!("expected a record command");
        };
        assert_eq!(match_id, 4);
        assert_eq!((result.team1_score, result.team2_score), (2, 1));
        assert_eq!(result.date, NaiveDate::from_ymd_opt(2024, 6, 1));
        assert_eq!(result.events.len(), 2);
    }

    #[test]
    fn test_unknown_command() {
        assert!(Command::parse("delete-everything", &mut args(&[])).is_err());
    }

    #[test]
    fn test_league_session() {
        let mut store = MemoryStore::new();
        let out = run(
            &mut store,
            &["new-competition", "--format", "round_robin", "Sunday League"],
        )
        .unwrap();
        assert!(out.contains("Created competition 1"));

        run(&mut store, &["add-team", "1", "Reds"]).unwrap();
        run(&mut store, &["add-team", "1", "Blues"]).unwrap();
        run(&mut store, &["add-player", "1", "Ana"]).unwrap();
        run(&mut store, &["round-robin", "1"]).unwrap();

        let out = run(&mut store, &["record", "1", "3", "1", "--event", "goal:1"]).unwrap();
        assert!(out.contains("1 events"));

        let table = run(&mut store, &["standings", "1"]).unwrap();
        let leader = table.lines().nth(1).unwrap();
        assert!(leader.contains("Reds"));

        let fixtures = run(&mut store, &["fixtures", "1"]).unwrap();
        assert!(fixtures.contains("Reds 3 x 1 Blues"));
    }

    #[test]
    fn test_errors_use_client_message() {
        let mut store = MemoryStore::new();
        let err = run(&mut store, &["add-team", "9", "Reds"]).unwrap_err();
        assert_eq!(err.to_string(), "Competition not found");
    }

    #[test]
    fn test_rejected_inputs_keep_store() {
        let mut store = MemoryStore::new();
        for name in ["Cup", "Shield"] {
            run(
                &mut store,
                &["new-competition", "--format", "groups_knockout", name],
            )
            .unwrap();
        }
        run(&mut store, &["add-team", "1", "Reds"]).unwrap();
        run(&mut store, &["add-team", "1", "Blues"]).unwrap();
        run(&mut store, &["draw-groups", "1", "--groups", "1", "--per-group", "2"]).unwrap();
        let before = store.clone();

        let err = run(&mut store, &["record", "1", "100", "0"]).unwrap_err();
        assert!(err.to_string().starts_with("Invalid score 100"));

        let err = run(&mut store, &["standings", "2", "--group", "1"]).unwrap_err();
        assert_eq!(err.to_string(), "Group not found");
        assert_eq!(store, before);
    }

    #[test]
    fn test_read_only_commands() {
        let stats = Command::Stats { competition: 1 };
        let draw = Command::RoundRobin { competition: 1 };
        assert!(!stats.mutates());
        assert!(draw.mutates());
    }
}
