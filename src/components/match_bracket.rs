use crate::components::display::{MatchSide, Matchup, MatchupKind, Node};
use trophy_api::layout::NEUTRAL_COLOR;
use trophy_api::{FALLBACK_LOGO, Match, Participant, Side, Snapshot};

/// Pieces of a matchup that depend on the bracket position rather than the
/// match itself.
#[derive(Debug, Clone, Default)]
pub struct MatchupStyle {
    pub label: Option<String>,
    /// Hex fills for the home and away box.
    pub fills: Option<[String; 2]>,
    /// Show seed positions 1 and 2 in the boxes.
    pub positions: bool,
}

pub fn matchup(kind: MatchupKind, m: &Match, style: MatchupStyle) -> Node {
    let [home_fill, away_fill] = style
        .fills
        .unwrap_or_else(|| [NEUTRAL_COLOR.to_string(), NEUTRAL_COLOR.to_string()]);
    Node::Matchup(Matchup {
        kind,
        label: style.label,
        home: side(&m.home, home_fill, style.positions.then_some(1), m.winner == Some(Side::Home)),
        away: side(&m.away, away_fill, style.positions.then_some(2), m.winner == Some(Side::Away)),
        show_logos: m.participants_resolved(),
        live: m.is_live(),
    })
}

/// A slot with no fixture loaded yet still takes its place in the bracket.
pub fn empty_matchup(kind: MatchupKind, style: MatchupStyle) -> Node {
    let tbd = Match {
        home: Participant { team_id: None, name: "TBD".into(), logo: FALLBACK_LOGO.into() },
        away: Participant { team_id: None, name: "TBD".into(), logo: FALLBACK_LOGO.into() },
        ..Default::default()
    };
    matchup(kind, &tbd, style)
}

/// Looks up `slot` and renders it, or a TBD placeholder when the slot is empty.
pub fn slot_matchup(snapshot: &Snapshot, slot: &str, kind: MatchupKind, style: MatchupStyle) -> Node {
    match snapshot.match_in_slot(slot) {
        Some(m) => matchup(kind, m, style),
        None => empty_matchup(kind, style),
    }
}

fn side(p: &Participant, fill: String, position: Option<u32>, winner: bool) -> MatchSide {
    MatchSide {
        name: p.name.clone(),
        logo: p.logo.clone(),
        position,
        fill,
        winner,
    }
}
