use crate::components::display::{Axis, DisplayTree, MatchSide, Matchup, MatchupKind, Node, Table, TeamCard};
use maud::{Markup, html};

/// HTML fragment for the content area.
pub fn render_tree(tree: &DisplayTree) -> Markup {
    html! {
        div class={ "view view-" (tree.view.name()) } {
            (node(&tree.root))
        }
    }
}

fn node(n: &Node) -> Markup {
    match n {
        Node::Block { class, axis, children } => html! {
            div class={ (class) " " (axis_class(*axis)) } {
                @for child in children {
                    (node(child))
                }
            }
        },
        Node::Heading { class, text } => html! { h1 class=(class) { (text) } },
        Node::Text { class, text } => html! { span class=(class) { (text) } },
        Node::Image { class, src, alt } => html! { img class=(class) src=(src) alt=(alt); },
        Node::GroupHeader { title, fill } => html! {
            div.group-header style=(fill_style(fill)) { (title) }
        },
        Node::TeamCard(card) => team_card(card),
        Node::Matchup(m) => matchup(m),
        Node::Table(t) => table(t),
    }
}

fn axis_class(axis: Axis) -> &'static str {
    match axis {
        Axis::Row => "flex-row",
        Axis::Column => "flex-column",
    }
}

fn fill_style(fill: &str) -> String {
    format!("background-color: {fill}")
}

fn team_card(card: &TeamCard) -> Markup {
    html! {
        div class=(team_card_class(card)) style=(fill_style(&card.fill)) {
            span.team-position { (card.position) }
            img.team-logo src=(card.logo) alt=(card.name);
            span.team-name { (card.name) }
        }
    }
}

fn team_card_class(card: &TeamCard) -> String {
    let mut class = "team-card".to_string();
    if card.winner {
        class.push_str(" winner");
    }
    if card.eliminated {
        class.push_str(" eliminated");
    }
    class
}

fn matchup(m: &Matchup) -> Markup {
    if m.kind == MatchupKind::Fixture {
        return fixture_logos(m);
    }
    html! {
        div class={ "bracket-match " (kind_class(m.kind)) } {
            @if let Some(label) = &m.label {
                span.match-label { (label) }
            }
            @if m.kind == MatchupKind::Final {
                span.trophy { "🏆" }
            }
            (match_side(&m.home, m.show_logos))
            (match_side(&m.away, m.show_logos))
        }
    }
}

fn kind_class(kind: MatchupKind) -> &'static str {
    match kind {
        MatchupKind::QuarterFinal => "quarter-final",
        MatchupKind::SemiFinal => "semi-final",
        MatchupKind::Final => "final",
        MatchupKind::Placement => "placement",
        MatchupKind::Fixture => "fixture",
    }
}

fn match_side(side: &MatchSide, show_logo: bool) -> Markup {
    html! {
        div.match-team.winner[side.winner] style=(fill_style(&side.fill)) {
            @if let Some(position) = side.position {
                span.team-position { (position) }
            }
            @if show_logo {
                img.team-logo src=(side.logo) alt=(side.name);
            } @else {
                span.team-name { (side.name) }
            }
        }
    }
}

fn fixture_logos(m: &Matchup) -> Markup {
    html! {
        div.fixture-cell {
            @if m.live {
                span.live-dot {}
            }
            img.fixture-logo src=(m.home.logo) alt=(m.home.name);
            span.vs { "VS" }
            img.fixture-logo src=(m.away.logo) alt=(m.away.name);
        }
    }
}

fn table(t: &Table) -> Markup {
    html! {
        div class={ (t.class) "-wrapper" } {
            @if let Some(title) = &t.title {
                h3.table-title { (title) }
            }
            table class=(t.class) {
                thead {
                    tr {
                        @for column in &t.columns {
                            th { (column) }
                        }
                    }
                }
                tbody {
                    @for row in &t.rows {
                        tr {
                            @for cell in row {
                                td { (node(cell)) }
                            }
                        }
                    }
                }
            }
        }
    }
}
