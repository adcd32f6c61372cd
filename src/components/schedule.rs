use crate::components::display::{MatchupKind, Node, Table};
use crate::components::match_bracket::{MatchupStyle, matchup};
use crate::components::tree::{group_section, header};
use trophy_api::layout::ScheduleDay;
use trophy_api::{Match, Snapshot};

pub const SCHEDULE_COLUMNS: [&str; 5] = ["Match", "Pitch", "Time", "Fixture", "Result"];

/// Schedule view: group cards and the first day's table on the left, the
/// knockout days on the right.
pub fn tournament_schedule(snapshot: &Snapshot) -> Node {
    let mut days = snapshot.layout.schedule_days.iter();
    let first_day: Vec<Node> = days.next().map(|day| day_table(snapshot, day)).into_iter().collect();
    let later_days: Vec<Node> = days.map(|day| day_table(snapshot, day)).collect();

    let mut groups = vec![group_section(snapshot, "tournament-matches-main-groups")];
    groups.extend(first_day);

    Node::column(
        "tournament-matches-container",
        vec![
            header(snapshot),
            Node::row(
                "tournament-matches-body",
                vec![
                    Node::column("tournament-matches-groups", groups),
                    Node::column("tournament-matches-knockouts", later_days),
                ],
            ),
        ],
    )
}

pub fn day_table(snapshot: &Snapshot, day: &ScheduleDay) -> Node {
    let rows = snapshot.matches_in_slots(&day.slots).map(schedule_row).collect();
    Node::Table(Table {
        class: "tournament-table",
        title: Some(day.title.clone()),
        columns: SCHEDULE_COLUMNS.to_vec(),
        rows,
    })
}

fn schedule_row(m: &Match) -> Vec<Node> {
    vec![
        Node::text("match-cell", m.match_number.to_string()),
        Node::text("pitch-cell", m.pitch.clone().unwrap_or_default()),
        Node::text("time-cell", m.time.clone().unwrap_or_default()),
        Node::column(
            "fixture-cell-container",
            vec![
                matchup(MatchupKind::Fixture, m, MatchupStyle::default()),
                Node::text("fixture-cell-text", m.fixture_label()),
            ],
        ),
        Node::text("result-cell", m.score.clone()),
    ]
}
