use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Tree,
    Schedule,
    Scorers,
}

impl View {
    pub const ALL: [View; 3] = [View::Tree, View::Schedule, View::Scorers];

    pub fn name(self) -> &'static str {
        match self {
            View::Tree => "tree",
            View::Schedule => "schedule",
            View::Scorers => "scorers",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            View::Tree => "Tournament Tree",
            View::Schedule => "Tournament Schedule",
            View::Scorers => "Goalscorers",
        }
    }

    /// Accepts the short names and the long `tournament_*` spellings.
    pub fn from_name(name: &str) -> Option<View> {
        match name.trim() {
            "tree" | "tournament_tree" => Some(View::Tree),
            "schedule" | "tournament_schedule" => Some(View::Schedule),
            "scorers" | "goalscorers" => Some(View::Scorers),
            _ => None,
        }
    }
}

/// Ordered list of views the board cycles through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRegistry {
    views: Vec<View>,
}

impl Default for ViewRegistry {
    fn default() -> Self {
        Self { views: View::ALL.to_vec() }
    }
}

impl ViewRegistry {
    /// Duplicates are dropped; an empty list falls back to the default order.
    pub fn new(views: impl IntoIterator<Item = View>) -> Self {
        let mut unique = Vec::new();
        for view in views {
            if !unique.contains(&view) {
                unique.push(view);
            }
        }
        if unique.is_empty() {
            return Self::default();
        }
        Self { views: unique }
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn first(&self) -> View {
        self.views[0]
    }

    pub fn get(&self, index: usize) -> Option<View> {
        self.views.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = View> + '_ {
        self.views.iter().copied()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        let view = View::from_name(name)?;
        self.views.iter().position(|v| *v == view)
    }

    /// The entry after `name`, wrapping at the end. Unknown names restart at
    /// the first entry.
    pub fn next_after(&self, name: &str) -> View {
        match self.position(name) {
            Some(index) => self.views[(index + 1) % self.len()],
            None => self.first(),
        }
    }

    pub fn indicator(&self, current: &str) -> ViewIndicator {
        let active = self.position(current);
        ViewIndicator {
            display_name: active
                .map(|i| self.views[i].display_name())
                .unwrap_or("Unknown View")
                .to_string(),
            dots: (0..self.len()).map(|i| Some(i) == active).collect(),
        }
    }
}

/// Name of the active view plus one progress dot per registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewIndicator {
    pub display_name: String,
    pub dots: Vec<bool>,
}
