use crate::state::rotation::RotationController;
use crate::views::ViewRegistry;
use chrono::{DateTime, Local};
use trophy_api::Snapshot;

// ---------------------------------------------------------------------------
// Board state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct BoardState {
    /// None until the first load finishes.
    pub snapshot: Option<Snapshot>,
    pub loaded_at: Option<DateTime<Local>>,
}

impl BoardState {
    /// Replaces the whole snapshot; the old one is dropped, never patched.
    pub fn load(&mut self, snapshot: Snapshot) {
        self.loaded_at = Some(snapshot.loaded_at.with_timezone(&Local));
        self.snapshot = Some(snapshot);
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppState {
    pub rotation: RotationController,
    pub board: BoardState,
    pub show_logs: bool,
    pub last_error: Option<String>,
}

impl AppState {
    pub fn new(views: ViewRegistry, auto_rotate: bool) -> Self {
        Self {
            rotation: RotationController::new(views).with_enabled(auto_rotate),
            board: BoardState::default(),
            show_logs: false,
            last_error: None,
        }
    }
}
