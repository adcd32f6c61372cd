//! Display tree: the renderer-neutral output of the presentation layer.
//!
//! The browser turns it into HTML, the terminal kiosk into ratatui widgets.
//! Nodes carry CSS class names because the browser stylesheet is keyed on
//! them; the terminal renderer ignores them except for a few layout hints.

use crate::views::View;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayTree {
    pub view: View,
    pub root: Node,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Block {
        class: &'static str,
        axis: Axis,
        children: Vec<Node>,
    },
    Heading {
        class: &'static str,
        text: String,
    },
    Text {
        class: &'static str,
        text: String,
    },
    Image {
        class: &'static str,
        src: String,
        alt: String,
    },
    GroupHeader {
        title: String,
        fill: String,
    },
    TeamCard(TeamCard),
    Matchup(Matchup),
    Table(Table),
}

impl Node {
    pub fn row(class: &'static str, children: Vec<Node>) -> Self {
        Node::Block { class, axis: Axis::Row, children }
    }

    pub fn column(class: &'static str, children: Vec<Node>) -> Self {
        Node::Block { class, axis: Axis::Column, children }
    }

    pub fn heading(class: &'static str, text: impl Into<String>) -> Self {
        Node::Heading { class, text: text.into() }
    }

    pub fn text(class: &'static str, text: impl Into<String>) -> Self {
        Node::Text { class, text: text.into() }
    }

    /// Depth-first walk over this node and everything below it, table cells
    /// included.
    #[cfg(test)]
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Node)) {
        visit(self);
        match self {
            Node::Block { children, .. } => children.iter().for_each(|c| c.walk(visit)),
            Node::Table(table) => table
                .rows
                .iter()
                .flatten()
                .for_each(|cell| cell.walk(visit)),
            _ => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamCard {
    pub name: String,
    pub position: u32,
    pub logo: String,
    /// Resolved hex color.
    pub fill: String,
    pub winner: bool,
    pub eliminated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchupKind {
    QuarterFinal,
    SemiFinal,
    Final,
    Placement,
    /// Compact logos-and-VS cell inside a schedule row.
    Fixture,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSide {
    pub name: String,
    pub logo: String,
    pub position: Option<u32>,
    pub fill: String,
    pub winner: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matchup {
    pub kind: MatchupKind,
    pub label: Option<String>,
    pub home: MatchSide,
    pub away: MatchSide,
    /// Logos only once both participants are known, names otherwise.
    pub show_logos: bool,
    pub live: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub class: &'static str,
    pub title: Option<String>,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<Node>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_visits_table_cells() {
        let tree = Node::column(
            "outer",
            vec![
                Node::heading("title", "Board"),
                Node::Table(Table {
                    class: "t",
                    title: None,
                    columns: vec!["A"],
                    rows: vec![vec![Node::text("cell", "x")], vec![Node::text("cell", "y")]],
                }),
            ],
        );
        let mut texts = Vec::new();
        tree.walk(&mut |node| {
            if let Node::Text { text, .. } = node {
                texts.push(text.clone());
            }
        });
        assert_eq!(texts, ["x", "y"]);
    }
}
