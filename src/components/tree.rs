use crate::components::display::{MatchupKind, Node};
use crate::components::match_bracket::{MatchupStyle, slot_matchup};
use crate::components::team_card::{TeamCardInput, team_group};
use trophy_api::{MatchStatus, Snapshot};

const GROUP_STAGE: &str = "group_stage";

/// Bracket view: group cards on the left, then quarter finals, semi finals,
/// and the final with the third-place match.
pub fn tournament_tree(snapshot: &Snapshot) -> Node {
    Node::column(
        "tournament-tree-container",
        vec![
            header(snapshot),
            Node::row(
                "tournament-body",
                vec![
                    Node::column("tournament-left", vec![group_section(snapshot, "main-groups")]),
                    Node::column("tournament-center-left", vec![quarter_finals(snapshot)]),
                    Node::column("tournament-center-right", vec![semi_finals(snapshot)]),
                    Node::column("tournament-right", vec![finals(snapshot)]),
                ],
            ),
        ],
    )
}

pub fn header(snapshot: &Snapshot) -> Node {
    Node::column(
        "tournament-header",
        vec![Node::heading("tournament-title", snapshot.layout.title.clone())],
    )
}

/// One card group per configured group, teams in standing order.
pub fn group_section(snapshot: &Snapshot, class: &'static str) -> Node {
    let champion = champion_id(snapshot);
    let groups = snapshot
        .layout
        .groups
        .iter()
        .map(|group| {
            let finished = group_stage_finished(snapshot, group);
            let teams = snapshot.teams_in_group(group);
            let inputs: Vec<TeamCardInput<'_>> = teams
                .iter()
                .map(|&team| TeamCardInput {
                    team,
                    winner: champion == Some(team.id.as_str()),
                    eliminated: finished && team.position > 2,
                })
                .collect();
            team_group(&snapshot.layout, group, &inputs)
        })
        .collect();

    Node::column("group-section", vec![Node::row(class, groups)])
}

fn quarter_finals(snapshot: &Snapshot) -> Node {
    let layout = &snapshot.layout;
    let brackets: Vec<Node> = layout
        .bracket
        .quarter_finals
        .iter()
        .map(|qf| {
            let style = MatchupStyle {
                label: Some(qf.slot.clone()),
                fills: Some([
                    layout.color_hex(&qf.colors[0]).to_string(),
                    layout.color_hex(&qf.colors[1]).to_string(),
                ]),
                positions: true,
            };
            slot_matchup(snapshot, &qf.slot, MatchupKind::QuarterFinal, style)
        })
        .collect();

    let half = brackets.len().div_ceil(2);
    let mut left = brackets;
    let right = left.split_off(half);
    Node::row(
        "quarter-finals-section",
        vec![Node::column("qf-left", left), Node::column("qf-right", right)],
    )
}

fn semi_finals(snapshot: &Snapshot) -> Node {
    let brackets = snapshot
        .layout
        .bracket
        .semi_finals
        .iter()
        .map(|slot| {
            let style = MatchupStyle { label: Some(slot.clone()), ..Default::default() };
            slot_matchup(snapshot, slot, MatchupKind::SemiFinal, style)
        })
        .collect();
    Node::column("semi-finals-section", brackets)
}

fn finals(snapshot: &Snapshot) -> Node {
    let bracket = &snapshot.layout.bracket;
    let final_match = slot_matchup(
        snapshot,
        &bracket.final_slot,
        MatchupKind::Final,
        MatchupStyle { label: Some(bracket.final_slot.clone()), ..Default::default() },
    );
    let third_place = slot_matchup(
        snapshot,
        &bracket.third_place,
        MatchupKind::Placement,
        MatchupStyle { label: Some(bracket.third_place.clone()), ..Default::default() },
    );
    Node::column("finals-section", vec![final_match, third_place])
}

fn champion_id(snapshot: &Snapshot) -> Option<&str> {
    snapshot
        .match_in_slot(&snapshot.layout.bracket.final_slot)?
        .winner()?
        .team_id
        .as_deref()
}

/// True once every group-stage match involving the group's teams is played.
fn group_stage_finished(snapshot: &Snapshot, group: &str) -> bool {
    let mut matches = snapshot
        .matches
        .values()
        .filter(|m| m.round_name == GROUP_STAGE)
        .filter(|m| {
            m.home
                .team_id
                .as_deref()
                .and_then(|id| snapshot.team(id))
                .is_some_and(|t| t.group == group)
        })
        .peekable();
    matches.peek().is_some() && matches.all(|m| m.status == MatchStatus::Completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::display::Matchup;
    use crate::test_support::sample_snapshot;

    fn matchups(node: &Node) -> Vec<Matchup> {
        let mut found = Vec::new();
        node.walk(&mut |n| {
            if let Node::Matchup(m) = n {
                found.push(m.clone());
            }
        });
        found
    }

    #[test]
    fn tree_shows_every_knockout_slot() {
        let snapshot = sample_snapshot();
        let found = matchups(&tournament_tree(&snapshot));
        let labels: Vec<_> = found.iter().filter_map(|m| m.label.as_deref()).collect();
        assert_eq!(labels, ["QF1", "QF2", "QF3", "QF4", "SF1", "SF2", "Final", "3rd-4th"]);
    }

    #[test]
    fn quarter_final_fills_follow_layout_pairs() {
        let snapshot = sample_snapshot();
        let found = matchups(&tournament_tree(&snapshot));
        let qf3 = found.iter().find(|m| m.label.as_deref() == Some("QF3")).unwrap();
        assert_eq!(qf3.home.fill, "#D2003C");
        assert_eq!(qf3.away.fill, "#790C27");
    }

    #[test]
    fn third_placed_teams_are_eliminated_after_group_stage() {
        let snapshot = sample_snapshot();
        let mut eliminated = Vec::new();
        tournament_tree(&snapshot).walk(&mut |n| {
            if let Node::TeamCard(card) = n
                && card.eliminated
            {
                eliminated.push(card.position);
            }
        });
        assert_eq!(eliminated, [3, 3, 3, 3]);
    }

    #[test]
    fn undecided_final_hides_logos() {
        let snapshot = sample_snapshot();
        let found = matchups(&tournament_tree(&snapshot));
        let final_match = found.iter().find(|m| m.kind == MatchupKind::Final).unwrap();
        assert!(!final_match.show_logos);
        assert_eq!(final_match.home.name, "Winner Match 19");
    }
}
