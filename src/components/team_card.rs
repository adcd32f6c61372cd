use crate::components::display::{Node, TeamCard};
use trophy_api::{Team, TournamentLayout};

pub fn team_card(layout: &TournamentLayout, team: &Team, winner: bool, eliminated: bool) -> Node {
    Node::TeamCard(TeamCard {
        name: team.name.clone(),
        position: team.position,
        logo: team.logo.clone(),
        fill: layout.color_hex(&team.color).to_string(),
        winner,
        // a winner is never shown as eliminated
        eliminated: eliminated && !winner,
    })
}

pub fn group_header(layout: &TournamentLayout, title: impl Into<String>, color_tag: &str) -> Node {
    Node::GroupHeader {
        title: title.into(),
        fill: layout.color_hex(color_tag).to_string(),
    }
}

/// Header plus one card per team, in the order given.
pub fn team_group(layout: &TournamentLayout, group: &str, teams: &[TeamCardInput<'_>]) -> Node {
    let color = layout.group_color(group).unwrap_or_default();
    let cards = teams
        .iter()
        .map(|t| team_card(layout, t.team, t.winner, t.eliminated))
        .collect();

    Node::column(
        "team-group",
        vec![
            group_header(layout, format!("Group {group}"), color),
            Node::column("team-group-cards", cards),
        ],
    )
}

pub struct TeamCardInput<'a> {
    pub team: &'a Team,
    pub winner: bool,
    pub eliminated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use trophy_api::team_logo;

    fn team(color: &str) -> Team {
        Team {
            id: "7".into(),
            name: "Salzburg".into(),
            group: "A".into(),
            color: color.into(),
            position: 1,
            logo: team_logo("7"),
        }
    }

    #[test]
    fn card_resolves_group_color() {
        let layout = TournamentLayout::embedded().unwrap();
        let Node::TeamCard(card) = team_card(&layout, &team("orange"), false, false) else {
            panic!("expected team card");
        };
        assert_eq!(card.fill, "#0E39FF");
        assert_eq!(card.logo, "assets/images/team_logos/7.png");
    }

    #[test]
    fn unknown_color_tag_falls_back_to_neutral() {
        let layout = TournamentLayout::embedded().unwrap();
        let Node::TeamCard(card) = team_card(&layout, &team("teal"), false, false) else {
            panic!("expected team card");
        };
        assert_eq!(card.fill, "#CCCCCC");
    }

    #[test]
    fn winner_takes_precedence_over_eliminated() {
        let layout = TournamentLayout::embedded().unwrap();
        let Node::TeamCard(card) = team_card(&layout, &team("blue"), true, true) else {
            panic!("expected team card");
        };
        assert!(card.winner);
        assert!(!card.eliminated);
    }

    #[test]
    fn unknown_group_header_is_neutral() {
        let layout = TournamentLayout::embedded().unwrap();
        let group = team_group(&layout, "9-12", &[]);
        let Node::Block { children, .. } = group else {
            panic!("expected block");
        };
        assert_eq!(
            children[0],
            Node::GroupHeader { title: "Group 9-12".into(), fill: "#CCCCCC".into() }
        );
    }
}
