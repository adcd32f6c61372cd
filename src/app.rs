use crate::components::display::DisplayTree;
use crate::composer::Composer;
use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use crate::state::rotation::ToggleOutcome;
use crate::views::View;
use log::{debug, info};
use trophy_api::Snapshot;

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        let app = Self {
            state: AppState::new(settings.views.clone(), settings.auto_rotate),
            settings,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_snapshot_loaded(&mut self, snapshot: Snapshot) {
        self.state.last_error = None;
        self.state.board.load(snapshot);
    }

    pub fn on_error(&mut self, message: String) {
        self.state.last_error = Some(message);
    }

    // -----------------------------------------------------------------------
    // Rotation
    // -----------------------------------------------------------------------

    /// Returns true when the visible view changed.
    pub fn on_rotation_tick(&mut self, n_intervals: u64) -> bool {
        match self.state.rotation.advance(Some(n_intervals)) {
            Some(view) => {
                debug!("rotated to {}", view.name());
                true
            }
            None => false,
        }
    }

    pub fn toggle_rotation(&mut self) -> ToggleOutcome {
        let outcome = self.state.rotation.toggle();
        info!("rotation {}", if outcome.enabled { "resumed" } else { "paused" });
        outcome
    }

    /// Jumps to the view at `index` in tab order; out of range is ignored.
    pub fn select_tab(&mut self, index: usize) {
        if let Some(view) = self.state.rotation.registry().get(index) {
            self.state.rotation.select(view);
        }
    }

    /// The view on screen; unknown names show the tree.
    pub fn active_view(&self) -> View {
        self.state.rotation.current_view().unwrap_or(View::Tree)
    }

    pub fn display_tree(&self) -> Option<DisplayTree> {
        let snapshot = self.state.board.snapshot.as_ref()?;
        Some(Composer::new(snapshot).render(Some(self.state.rotation.current())))
    }

    // -----------------------------------------------------------------------
    // Screen toggles
    // -----------------------------------------------------------------------

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_snapshot;
    use crate::views::ViewRegistry;

    fn app(auto_rotate: bool) -> App {
        App::new(AppSettings { auto_rotate, ..Default::default() })
    }

    #[test]
    fn nothing_to_draw_before_first_load() {
        let app = app(true);
        assert!(app.display_tree().is_none());
        assert_eq!(app.active_view(), View::Tree);
    }

    #[test]
    fn ticks_rotate_the_drawn_view() {
        let mut app = app(true);
        app.on_snapshot_loaded(sample_snapshot());
        assert!(app.on_rotation_tick(0));
        assert_eq!(app.display_tree().map(|t| t.view), Some(View::Schedule));
        assert!(app.on_rotation_tick(1));
        assert_eq!(app.active_view(), View::Scorers);
    }

    #[test]
    fn paused_kiosk_applies_only_the_first_tick() {
        let mut app = app(false);
        assert!(app.on_rotation_tick(0));
        assert!(!app.on_rotation_tick(1));
        app.toggle_rotation();
        assert!(app.on_rotation_tick(2));
    }

    #[test]
    fn tab_keys_follow_configured_order() {
        let mut app = App::new(AppSettings {
            views: ViewRegistry::new([View::Scorers, View::Tree]),
            ..Default::default()
        });
        app.select_tab(0);
        assert_eq!(app.active_view(), View::Scorers);
        app.select_tab(2);
        assert_eq!(app.active_view(), View::Scorers);
        app.select_tab(1);
        assert_eq!(app.active_view(), View::Tree);
    }

    #[test]
    fn reload_clears_error() {
        let mut app = app(true);
        app.on_error("warehouse unreachable".into());
        app.on_snapshot_loaded(sample_snapshot());
        assert!(app.state.last_error.is_none());
        assert!(app.state.board.snapshot.is_some());
    }
}
