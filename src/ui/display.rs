//! Terminal renderer for the display tree.
//!
//! Rows are split evenly side by side, columns are stacked by each child's
//! natural height, tables become ratatui tables and cards become single
//! colored lines.

use crate::components::display::{Axis, MatchSide, Matchup, MatchupKind, Node, Table, TeamCard};
use crate::draw::default_border;
use tui::Frame;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Cell, Paragraph, Row, Table as TableWidget};

const LIVE_MARKER: &str = "●";

pub fn render_node(f: &mut Frame, area: Rect, node: &Node) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    match node {
        Node::Block { axis, children, .. } => render_block(f, area, *axis, children),
        Node::Heading { text, .. } => f.render_widget(
            Paragraph::new(text.to_uppercase())
                .alignment(Alignment::Center)
                .style(Style::default().add_modifier(Modifier::BOLD)),
            area,
        ),
        Node::Text { text, .. } => f.render_widget(Paragraph::new(text.as_str()), area),
        Node::Image { .. } => {}
        Node::GroupHeader { title, fill } => f.render_widget(
            Paragraph::new(title.as_str())
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::White).bg(hex_color(fill)).add_modifier(Modifier::BOLD)),
            area,
        ),
        Node::TeamCard(card) => f.render_widget(Paragraph::new(team_card_line(card)), area),
        Node::Matchup(m) => render_matchup(f, area, m),
        Node::Table(t) => render_table(f, area, t),
    }
}

fn render_block(f: &mut Frame, area: Rect, axis: Axis, children: &[Node]) {
    // logos have no terminal form
    let visible: Vec<&Node> = children.iter().filter(|c| !matches!(c, Node::Image { .. })).collect();
    if visible.is_empty() {
        return;
    }
    let areas = match axis {
        Axis::Row => Layout::horizontal(visible.iter().map(|_| Constraint::Fill(1))).split(area),
        Axis::Column => {
            Layout::vertical(visible.iter().map(|c| Constraint::Length(node_height(c)))).split(area)
        }
    };
    for (child, child_area) in visible.into_iter().zip(areas.iter()) {
        render_node(f, *child_area, child);
    }
}

/// Lines a node wants when stacked in a column.
pub fn node_height(node: &Node) -> u16 {
    match node {
        Node::Block { axis: Axis::Column, children, .. } => children.iter().map(node_height).sum(),
        Node::Block { axis: Axis::Row, children, .. } => children.iter().map(node_height).max().unwrap_or(0),
        Node::Heading { .. } => 2,
        Node::Text { .. } | Node::GroupHeader { .. } | Node::TeamCard(_) => 1,
        Node::Image { .. } => 0,
        Node::Matchup(m) if m.kind == MatchupKind::Fixture => 1,
        // border plus two sides
        Node::Matchup(_) => 4,
        // border, header row, one line per row
        Node::Table(t) => t.rows.len() as u16 + 3,
    }
}

pub fn hex_color(hex: &str) -> Color {
    hex.parse().unwrap_or(Color::Gray)
}

fn team_card_line(card: &TeamCard) -> Line<'static> {
    let mut style = Style::default().fg(Color::White).bg(hex_color(&card.fill));
    if card.winner {
        style = style.add_modifier(Modifier::BOLD);
    }
    if card.eliminated {
        style = style.add_modifier(Modifier::DIM | Modifier::CROSSED_OUT);
    }
    let trophy = if card.winner { " ★" } else { "" };
    Line::from(Span::styled(format!(" {} {}{trophy} ", card.position, card.name), style))
}

fn render_matchup(f: &mut Frame, area: Rect, m: &Matchup) {
    if m.kind == MatchupKind::Fixture {
        f.render_widget(Paragraph::new(fixture_text(m)), area);
        return;
    }

    let title = match (&m.label, m.kind) {
        (Some(label), MatchupKind::Final) => format!(" 🏆 {label} "),
        (Some(label), _) => format!(" {label} "),
        (None, _) => String::new(),
    };
    let border = if m.live { Color::Red } else { Color::DarkGray };
    let block = default_border(border).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(Paragraph::new(vec![side_line(&m.home), side_line(&m.away)]), inner);
}

fn side_line(side: &MatchSide) -> Line<'static> {
    let mut style = Style::default().fg(Color::White).bg(hex_color(&side.fill));
    if side.winner {
        style = style.add_modifier(Modifier::BOLD);
    }
    let position = side.position.map(|p| format!("{p} ")).unwrap_or_default();
    Line::from(Span::styled(format!(" {position}{} ", side.name), style))
}

fn fixture_text(m: &Matchup) -> String {
    if m.live { LIVE_MARKER.to_string() } else { String::new() }
}

/// Flattens a table cell to one line of text.
pub fn cell_text(node: &Node) -> String {
    match node {
        Node::Block { children, .. } => children
            .iter()
            .map(cell_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Node::Heading { text, .. } | Node::Text { text, .. } => text.clone(),
        Node::GroupHeader { title, .. } => title.clone(),
        Node::TeamCard(card) => card.name.clone(),
        Node::Matchup(m) if m.kind == MatchupKind::Fixture => fixture_text(m),
        Node::Matchup(m) => format!("{} vs {}", m.home.name, m.away.name),
        Node::Image { .. } | Node::Table(_) => String::new(),
    }
}

fn render_table(f: &mut Frame, area: Rect, t: &Table) {
    let header = Row::new(t.columns.iter().map(|c| Cell::from(*c)))
        .style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED));
    let rows = t
        .rows
        .iter()
        .map(|row| Row::new(row.iter().map(|cell| Cell::from(cell_text(cell)))));
    let widths = column_widths(t);

    let mut block = default_border(Color::DarkGray);
    if let Some(title) = &t.title {
        block = block.title(format!(" {title} "));
    }
    f.render_widget(TableWidget::new(rows, widths).header(header).block(block), area);
}

/// The widest column gets whatever is left after the others take their
/// content width.
fn column_widths(t: &Table) -> Vec<Constraint> {
    let mut widths: Vec<usize> = t.columns.iter().map(|c| c.chars().count()).collect();
    for row in &t.rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell_text(cell).chars().count());
            }
        }
    }
    let widest = widths.iter().enumerate().max_by_key(|(_, w)| **w).map(|(i, _)| i);
    widths
        .iter()
        .enumerate()
        .map(|(i, w)| {
            if Some(i) == widest {
                Constraint::Fill(1)
            } else {
                Constraint::Length(*w as u16)
            }
        })
        .collect()
}
