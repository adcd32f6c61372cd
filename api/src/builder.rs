use crate::layout::TournamentLayout;
use crate::rows::{FixtureRow, RawTables, ScorerRow, StandingRow};
use crate::{FALLBACK_LOGO, Match, MatchStatus, Participant, Player, Side, Snapshot, Team, team_logo};
use chrono::Utc;
use log::{debug, info};
use std::collections::BTreeMap;
use std::fmt;

/// One mismatch between incoming data and the tournament layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigProblem {
    UnmappedGroup { team_id: String, group: String },
    UnmappedSlot { key: String, match_id: u32 },
    MissingPlaceholder { match_id: u32, side: Side },
    DuplicateSlot { slot: String, match_id: u32 },
    DuplicateTeam { team_id: String },
}

impl fmt::Display for ConfigProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigProblem::UnmappedGroup { team_id, group } => {
                write!(f, "team {team_id} is in group {group:?}, which has no color")
            }
            ConfigProblem::UnmappedSlot { key, match_id } => {
                write!(f, "match {match_id} has slot key {key:?}, which is not in the slot table")
            }
            ConfigProblem::MissingPlaceholder { match_id, side } => {
                let side = match side {
                    Side::Home => "home",
                    Side::Away => "away",
                };
                write!(f, "match {match_id} has no {side} team and no placeholder name")
            }
            ConfigProblem::DuplicateSlot { slot, match_id } => {
                write!(f, "match {match_id} maps to slot {slot:?}, which is already taken")
            }
            ConfigProblem::DuplicateTeam { team_id } => {
                write!(f, "team {team_id} appears more than once in the standings")
            }
        }
    }
}

/// Data and layout disagree. Carries every problem found, not just the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildError {
    pub problems: Vec<ConfigProblem>,
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} configuration problem(s):", self.problems.len())?;
        for problem in &self.problems {
            write!(f, "\n  - {problem}")?;
        }
        Ok(())
    }
}

impl std::error::Error for BuildError {}

/// Builds the in-memory snapshot from the three raw tables.
///
/// Every row is checked against the layout first; any mismatch fails the whole
/// build so a bad deploy is caught at startup instead of on screen.
pub fn build(layout: TournamentLayout, raw: RawTables, top_n: usize) -> Result<Snapshot, BuildError> {
    layout.check_rows(&raw.fixtures, &raw.standings)?;

    let mut problems = Vec::new();
    let teams = build_teams(&layout, &raw.standings, &mut problems);
    let matches = build_matches(&layout, &raw.fixtures, &mut problems);
    if !problems.is_empty() {
        return Err(BuildError { problems });
    }

    let players = build_players(raw.scorers, top_n);
    info!(
        "snapshot built: {} teams, {} matches, {} scorers",
        teams.len(),
        matches.len(),
        players.len()
    );

    Ok(Snapshot {
        layout,
        teams,
        matches,
        players,
        loaded_at: Utc::now(),
    })
}

/// Fills missing participant names from the layout's placeholder table.
pub fn apply_placeholders(layout: &TournamentLayout, fixtures: &mut [FixtureRow]) -> Result<(), BuildError> {
    let mut problems = Vec::new();
    for row in fixtures.iter_mut() {
        let match_id = row.match_id;
        for (side, name) in [(Side::Home, &mut row.home_team_name), (Side::Away, &mut row.away_team_name)] {
            match participant_name(layout, match_id, side, name.as_deref()) {
                Ok(resolved) => *name = Some(resolved),
                Err(problem) => problems.push(problem),
            }
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(BuildError { problems })
    }
}

fn build_teams(
    layout: &TournamentLayout,
    standings: &[StandingRow],
    problems: &mut Vec<ConfigProblem>,
) -> BTreeMap<String, Team> {
    let mut teams = BTreeMap::new();
    for row in standings {
        let Some(color) = layout.group_color(&row.group_name) else {
            // already reported by check_rows
            continue;
        };
        if teams.contains_key(&row.team_id) {
            problems.push(ConfigProblem::DuplicateTeam { team_id: row.team_id.clone() });
            continue;
        }
        teams.insert(
            row.team_id.clone(),
            Team {
                id: row.team_id.clone(),
                name: row.team_name.clone(),
                group: row.group_name.clone(),
                color: color.to_string(),
                position: row.group_position,
                logo: team_logo(&row.team_id),
            },
        );
    }
    teams
}

fn build_matches(
    layout: &TournamentLayout,
    fixtures: &[FixtureRow],
    problems: &mut Vec<ConfigProblem>,
) -> BTreeMap<String, Match> {
    let mut matches = BTreeMap::new();
    for row in fixtures {
        let Some(slot) = layout.slot_for(&row.round_name, row.group_name.as_deref(), row.match_id) else {
            continue;
        };

        let home = participant(layout, row, Side::Home, problems);
        let away = participant(layout, row, Side::Away, problems);
        let (Some(home), Some(away)) = (home, away) else {
            continue;
        };

        let status = row
            .match_status
            .as_deref()
            .map(MatchStatus::parse)
            .unwrap_or_default();

        let m = Match {
            slot: slot.to_string(),
            match_number: row.match_id,
            round_name: row.round_name.clone(),
            home,
            away,
            winner: derive_winner(row, status),
            pitch: row.pitch.clone(),
            time: row.match_time.clone(),
            score: format_score(
                row.home_team_goals,
                row.away_team_goals,
                row.home_team_penalty_goals,
                row.away_team_penalty_goals,
            ),
            status,
        };
        debug!("match {} → slot {slot}", row.match_id);
        matches.insert(slot.to_string(), m);
    }
    matches
}

fn participant(
    layout: &TournamentLayout,
    row: &FixtureRow,
    side: Side,
    problems: &mut Vec<ConfigProblem>,
) -> Option<Participant> {
    let (id, name) = match side {
        Side::Home => (&row.home_team_id, &row.home_team_name),
        Side::Away => (&row.away_team_id, &row.away_team_name),
    };

    let name = match participant_name(layout, row.match_id, side, name.as_deref()) {
        Ok(name) => name,
        Err(problem) => {
            problems.push(problem);
            return None;
        }
    };

    let team_id = id.clone().filter(|id| !id.is_empty());
    let logo = team_id
        .as_deref()
        .map(team_logo)
        .unwrap_or_else(|| FALLBACK_LOGO.to_string());

    Some(Participant { team_id, name, logo })
}

/// The row's own name, or the layout placeholder while the team is undecided.
fn participant_name(
    layout: &TournamentLayout,
    match_id: u32,
    side: Side,
    name: Option<&str>,
) -> Result<String, ConfigProblem> {
    if let Some(name) = name.filter(|n| !n.is_empty()) {
        return Ok(name.to_string());
    }
    let placeholder = layout
        .placeholder(match_id)
        .ok_or(ConfigProblem::MissingPlaceholder { match_id, side })?;
    Ok(match side {
        Side::Home => placeholder.home.clone(),
        Side::Away => placeholder.away.clone(),
    })
}

fn build_players(mut scorers: Vec<ScorerRow>, top_n: usize) -> Vec<Player> {
    // stable: ties keep source order
    scorers.sort_by(|a, b| b.total_goals.cmp(&a.total_goals));
    scorers
        .into_iter()
        .take(top_n)
        .map(|row| Player {
            logo: team_logo(&row.team_id),
            place: row.place,
            name: row.player_name,
            team_id: row.team_id,
            goals: row.total_goals,
        })
        .collect()
}

/// `"h:a"` with missing goals left blank, plus `" (h:a)"` when either
/// penalty count is present.
pub fn format_score(
    home_goals: Option<u32>,
    away_goals: Option<u32>,
    home_penalties: Option<u32>,
    away_penalties: Option<u32>,
) -> String {
    fn part(v: Option<u32>) -> String {
        v.map(|n| n.to_string()).unwrap_or_default()
    }

    let mut score = format!("{}:{}", part(home_goals), part(away_goals));
    if home_penalties.is_some() || away_penalties.is_some() {
        score.push_str(&format!(" ({}:{})", part(home_penalties), part(away_penalties)));
    }
    score
}

/// Winner of a completed match: goals first, then penalties. Undecided or
/// unfinished matches have no winner.
pub fn derive_winner(row: &FixtureRow, status: MatchStatus) -> Option<Side> {
    if status != MatchStatus::Completed {
        return None;
    }
    let decide = |home: Option<u32>, away: Option<u32>| match (home?, away?) {
        (h, a) if h > a => Some(Side::Home),
        (h, a) if a > h => Some(Side::Away),
        _ => None,
    };
    let (home, away) = (row.home_team_goals?, row.away_team_goals?);
    if home != away {
        return decide(Some(home), Some(away));
    }
    decide(row.home_team_penalty_goals, row.away_team_penalty_goals)
}

/// Splits the leaderboard into two columns, the second taking the extra
/// entry when the count is odd.
pub fn split_scorers<T>(players: &[T]) -> (&[T], &[T]) {
    players.split_at(players.len() / 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> TournamentLayout {
        TournamentLayout::embedded().unwrap()
    }

    fn standing(id: &str, group: &str, position: u32) -> StandingRow {
        StandingRow {
            team_id: id.into(),
            team_name: format!("Team {id}"),
            group_name: group.into(),
            group_position: position,
        }
    }

    fn fixture(round: &str, group: Option<&str>, id: u32) -> FixtureRow {
        FixtureRow {
            round_name: round.into(),
            group_name: group.map(Into::into),
            match_id: id,
            home_team_id: Some("1".into()),
            home_team_name: Some("Team 1".into()),
            away_team_id: Some("2".into()),
            away_team_name: Some("Team 2".into()),
            ..Default::default()
        }
    }

    fn scorers(n: u32) -> Vec<ScorerRow> {
        (1..=n)
            .map(|i| ScorerRow {
                place: i,
                player_name: format!("Player {i}"),
                team_id: "1".into(),
                total_goals: 20 - i,
            })
            .collect()
    }

    #[test]
    fn group_stage_fixture_lands_in_its_slot() {
        let raw = RawTables {
            fixtures: vec![fixture("group_stage", Some("A"), 1)],
            standings: vec![standing("1", "A", 1), standing("2", "A", 2)],
            scorers: vec![],
        };
        let snapshot = build(layout(), raw, 14).unwrap();
        let m = snapshot.match_in_slot("A1").expect("A1 should exist");
        assert_eq!(m.match_number, 1);
        assert_eq!(m.home.logo, "assets/images/team_logos/1.png");
        assert_eq!(snapshot.team("1").map(|t| t.color.as_str()), Some("orange"));
    }

    #[test]
    fn missing_away_goals_leave_blank() {
        assert_eq!(format_score(Some(2), None, None, None), "2:");
        assert_eq!(format_score(None, None, None, None), ":");
    }

    #[test]
    fn penalties_are_appended_when_either_is_present() {
        assert_eq!(format_score(Some(1), Some(1), Some(4), Some(3)), "1:1 (4:3)");
        assert_eq!(format_score(Some(1), Some(1), Some(4), None), "1:1 (4:)");
    }

    #[test]
    fn unknown_group_is_a_configuration_error() {
        let raw = RawTables {
            standings: vec![standing("1", "E", 1)],
            ..Default::default()
        };
        let err = build(layout(), raw, 14).unwrap_err();
        assert_eq!(
            err.problems,
            vec![ConfigProblem::UnmappedGroup { team_id: "1".into(), group: "E".into() }]
        );
    }

    #[test]
    fn unmapped_fixture_is_never_skipped() {
        let raw = RawTables {
            fixtures: vec![fixture("round_of_32", None, 31)],
            ..Default::default()
        };
        assert!(build(layout(), raw, 14).is_err());
    }

    #[test]
    fn duplicate_team_is_reported() {
        let raw = RawTables {
            standings: vec![standing("1", "A", 1), standing("1", "B", 1)],
            ..Default::default()
        };
        let err = build(layout(), raw, 14).unwrap_err();
        assert_eq!(err.problems, vec![ConfigProblem::DuplicateTeam { team_id: "1".into() }]);
    }

    #[test]
    fn undecided_participant_uses_placeholder_and_fallback_logo() {
        let mut row = fixture("quarter_final_1", None, 13);
        row.home_team_id = None;
        row.home_team_name = None;
        let raw = RawTables { fixtures: vec![row], ..Default::default() };
        let snapshot = build(layout(), raw, 14).unwrap();
        let qf = snapshot.match_in_slot("QF1").unwrap();
        assert_eq!(qf.home.name, "1. Group A");
        assert_eq!(qf.home.logo, FALLBACK_LOGO);
        assert!(!qf.home.is_resolved());
    }

    #[test]
    fn apply_placeholders_fills_missing_names() {
        let mut rows = vec![fixture("final", None, 30)];
        rows[0].away_team_name = None;
        apply_placeholders(&layout(), &mut rows).unwrap();
        assert_eq!(rows[0].away_team_name.as_deref(), Some("Winner Match 20"));
        assert_eq!(rows[0].home_team_name.as_deref(), Some("Team 1"));
    }

    #[test]
    fn apply_placeholders_without_entry_is_an_error() {
        let mut rows = vec![fixture("final", None, 31)];
        rows[0].home_team_name = None;
        let err = apply_placeholders(&layout(), &mut rows).unwrap_err();
        assert_eq!(
            err.problems,
            vec![ConfigProblem::MissingPlaceholder { match_id: 31, side: Side::Home }]
        );
    }

    #[test]
    fn participant_name_prefers_row_then_placeholder() {
        let layout = layout();
        assert_eq!(participant_name(&layout, 30, Side::Home, Some("Celtic")).unwrap(), "Celtic");
        assert_eq!(participant_name(&layout, 30, Side::Away, Some("")).unwrap(), "Winner Match 20");
        assert_eq!(
            participant_name(&layout, 31, Side::Away, None).unwrap_err(),
            ConfigProblem::MissingPlaceholder { match_id: 31, side: Side::Away }
        );
    }

    #[test]
    fn winner_requires_completed_match() {
        let mut row = fixture("final", None, 30);
        row.home_team_goals = Some(2);
        row.away_team_goals = Some(1);
        assert_eq!(derive_winner(&row, MatchStatus::Live), None);
        assert_eq!(derive_winner(&row, MatchStatus::Completed), Some(Side::Home));
    }

    #[test]
    fn draw_is_decided_by_penalties() {
        let mut row = fixture("final", None, 30);
        row.home_team_goals = Some(1);
        row.away_team_goals = Some(1);
        assert_eq!(derive_winner(&row, MatchStatus::Completed), None);
        row.home_team_penalty_goals = Some(3);
        row.away_team_penalty_goals = Some(5);
        assert_eq!(derive_winner(&row, MatchStatus::Completed), Some(Side::Away));
    }

    #[test]
    fn fourteen_scorers_split_evenly() {
        let players = build_players(scorers(14), 14);
        let (left, right) = split_scorers(&players);
        assert_eq!((left.len(), right.len()), (7, 7));
    }

    #[test]
    fn odd_count_puts_extra_scorer_in_second_column() {
        let players = build_players(scorers(13), 14);
        let (left, right) = split_scorers(&players);
        assert_eq!((left.len(), right.len()), (6, 7));
        assert_eq!(left[0].name, "Player 1");
        assert_eq!(right[0].name, "Player 7");
    }

    #[test]
    fn scorers_are_cut_to_top_n_keeping_source_order_on_ties() {
        let mut rows = scorers(3);
        rows.push(ScorerRow { place: 4, player_name: "Late".into(), team_id: "2".into(), total_goals: 19 });
        let players = build_players(rows, 2);
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].name, "Player 1");
        assert_eq!(players[1].name, "Late");
    }
}
