use crate::components::display::DisplayTree;
use crate::components::schedule::tournament_schedule;
use crate::components::scorers::tournament_scorers;
use crate::components::tree::tournament_tree;
use crate::views::View;
use log::debug;
use trophy_api::Snapshot;

/// Turns a view name into its display tree for one snapshot.
///
/// Holds nothing but the borrowed snapshot, so composing is pure and any
/// number of sessions can share it.
pub struct Composer<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> Composer<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    /// Unknown or missing names render the tree.
    pub fn render(&self, view: Option<&str>) -> DisplayTree {
        let resolved = view.and_then(View::from_name).unwrap_or(View::Tree);
        if view.is_some_and(|name| View::from_name(name).is_none()) {
            debug!("unknown view {view:?}, rendering {}", resolved.name());
        }
        self.render_view(resolved)
    }

    pub fn render_view(&self, view: View) -> DisplayTree {
        let root = match view {
            View::Tree => tournament_tree(self.snapshot),
            View::Schedule => tournament_schedule(self.snapshot),
            View::Scorers => tournament_scorers(self.snapshot),
        };
        DisplayTree { view, root }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_snapshot;

    #[test]
    fn unknown_and_missing_views_render_the_tree() {
        let snapshot = sample_snapshot();
        let composer = Composer::new(&snapshot);
        let tree = composer.render(Some("tree"));
        assert_eq!(composer.render(None), tree);
        assert_eq!(composer.render(Some("league_table")), tree);
        assert_eq!(composer.render(Some("")), tree);
    }

    #[test]
    fn each_view_dispatches_to_its_renderer() {
        let snapshot = sample_snapshot();
        let composer = Composer::new(&snapshot);
        for view in View::ALL {
            let rendered = composer.render(Some(view.name()));
            assert_eq!(rendered.view, view);
        }
        assert_ne!(composer.render_view(View::Schedule).root, composer.render_view(View::Scorers).root);
    }

    #[test]
    fn long_view_names_are_accepted() {
        let snapshot = sample_snapshot();
        let composer = Composer::new(&snapshot);
        assert_eq!(composer.render(Some("goalscorers")).view, View::Scorers);
    }
}
