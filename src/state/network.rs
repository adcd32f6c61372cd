use crate::state::messages::{NetworkRequest, NetworkResponse};
use log::{debug, error, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use trophy_api::source::{LoadError, LoadOptions, load_snapshot};

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Loads snapshots off the UI task and reports back over a channel.
pub struct NetworkWorker {
    options: LoadOptions,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        options: LoadOptions,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            options,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let result = match request {
                NetworkRequest::LoadSnapshot => self.handle_load_snapshot().await,
            };

            debug!("snapshot request complete");
            self.stop_loading_animation(result.is_ok()).await;

            let response = result.unwrap_or_else(|err| NetworkResponse::Error {
                message: err.to_string(),
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle_load_snapshot(&self) -> Result<NetworkResponse, LoadError> {
        debug!("loading snapshot from {}", self.options.source);
        let snapshot = load_snapshot(&self.options).await?;
        info!(
            "snapshot loaded: {} teams, {} matches, {} scorers",
            snapshot.teams.len(),
            snapshot.matches.len(),
            snapshot.players.len()
        );
        Ok(NetworkResponse::SnapshotLoaded { snapshot: Box::new(snapshot) })
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state = LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_snapshot_path;
    use trophy_api::source::SnapshotSource;

    async fn load(source: SnapshotSource) -> NetworkResponse {
        let (req_tx, req_rx) = mpsc::channel(4);
        let (resp_tx, mut resp_rx) = mpsc::channel(64);
        let options = LoadOptions { source, ..Default::default() };
        let worker = tokio::spawn(NetworkWorker::new(options, req_rx, resp_tx).run());

        req_tx.send(NetworkRequest::LoadSnapshot).await.unwrap();
        let response = loop {
            match resp_rx.recv().await.unwrap() {
                NetworkResponse::LoadingStateChanged { .. } => continue,
                other => break other,
            }
        };
        worker.abort();
        response
    }

    #[tokio::test]
    async fn loads_snapshot_from_file() {
        let response = load(SnapshotSource::File(sample_snapshot_path())).await;
        match response {
            NetworkResponse::SnapshotLoaded { snapshot } => assert_eq!(snapshot.matches.len(), 30),
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn load_failure_becomes_error_response() {
        let response = load(SnapshotSource::File("/nonexistent/board.json".into())).await;
        assert!(matches!(response, NetworkResponse::Error { message } if message.contains("/nonexistent/board.json")));
    }
}
