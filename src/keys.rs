use crate::app::App;
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    match (key_event.code, key_event.modifiers) {
        // Quit
        (Char('q'), _) | (Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Rotation
        (Char(' ') | Char('p'), _) => {
            guard.toggle_rotation();
        }
        (Char(digit @ '1'..='9'), _) => {
            if let Some(n) = digit.to_digit(10) {
                guard.select_tab(n as usize - 1);
            }
        }

        // Full reload
        (Char('r'), _) => {
            drop(guard);
            let _ = network_requests.send(NetworkRequest::LoadSnapshot).await;
        }

        // Screen
        (Char('f'), _) => guard.toggle_full_screen(),
        (Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }
}
