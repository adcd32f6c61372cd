use crate::components::display::{Node, Table};
use crate::components::tree::header;
use trophy_api::{Player, Snapshot};

pub const SCORER_COLUMNS: [&str; 3] = ["Place", "Player", "Goals"];

/// Leaderboard view: the top scorers split over two side-by-side tables.
pub fn tournament_scorers(snapshot: &Snapshot) -> Node {
    let (left, right) = snapshot.scorer_columns();
    Node::column(
        "tournament-goalscorers-container",
        vec![
            header(snapshot),
            Node::row("goalscorer-body", vec![scorer_table(left), scorer_table(right)]),
        ],
    )
}

pub fn scorer_table(players: &[Player]) -> Node {
    Node::Table(Table {
        class: "goalscorer-tournament-table",
        title: None,
        columns: SCORER_COLUMNS.to_vec(),
        rows: players.iter().map(scorer_row).collect(),
    })
}

fn scorer_row(player: &Player) -> Vec<Node> {
    vec![
        Node::text("place-cell", player.place.to_string()),
        Node::row(
            "player-card",
            vec![
                Node::Image {
                    class: "player-team-logo",
                    src: player.logo.clone(),
                    alt: player.team_id.clone(),
                },
                Node::text("player-name", player.name.clone()),
            ],
        ),
        Node::text("goals-cell", player.goals.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_snapshot;
    use trophy_api::team_logo;

    fn row_counts(node: &Node) -> Vec<usize> {
        let mut counts = Vec::new();
        node.walk(&mut |n| {
            if let Node::Table(t) = n {
                counts.push(t.rows.len());
            }
        });
        counts
    }

    #[test]
    fn fourteen_scorers_split_evenly() {
        let snapshot = sample_snapshot();
        assert_eq!(row_counts(&tournament_scorers(&snapshot)), [7, 7]);
    }

    #[test]
    fn odd_count_puts_extra_row_in_second_table() {
        let mut snapshot = sample_snapshot();
        snapshot.players.truncate(13);
        assert_eq!(row_counts(&tournament_scorers(&snapshot)), [6, 7]);
    }

    #[test]
    fn player_cell_shows_team_logo() {
        let player = Player {
            place: 1,
            name: "L. Gruber".into(),
            team_id: "1".into(),
            goals: 6,
            logo: team_logo("1"),
        };
        let row = scorer_row(&player);
        let Node::Block { children, .. } = &row[1] else {
            panic!("expected player card");
        };
        assert!(matches!(&children[0], Node::Image { src, .. } if src == "assets/images/team_logos/1.png"));
        assert_eq!(row[2], Node::text("goals-cell", "6"));
    }
}
