use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use trophy_api::Snapshot;

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    /// Full reload: layout, tables, build. There is no partial refresh.
    LoadSnapshot,
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    SnapshotLoaded { snapshot: Box<Snapshot> },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    /// Rotation timer fired; carries the interval count, starting at 0.
    RotationTick(u64),
}
