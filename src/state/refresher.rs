use crate::state::messages::UiEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

/// Rotation timer for the kiosk. Sends one numbered tick per interval,
/// counting from 0 like the browser does.
pub struct RotationTimer {
    period: Duration,
    ui_events: mpsc::Sender<UiEvent>,
}

impl RotationTimer {
    pub fn new(period: Duration, ui_events: mpsc::Sender<UiEvent>) -> Self {
        Self { period, ui_events }
    }

    pub async fn run(self) {
        let mut rotation_interval = interval(self.period);
        // Skip the immediate first tick so the first view stays up for a full period.
        rotation_interval.tick().await;

        let mut n_intervals: u64 = 0;
        loop {
            rotation_interval.tick().await;
            if self.ui_events.send(UiEvent::RotationTick(n_intervals)).await.is_err() {
                break;
            }
            n_intervals += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_are_numbered_from_zero() {
        let (tx, mut rx) = mpsc::channel(8);
        let timer = tokio::spawn(RotationTimer::new(Duration::from_secs(30), tx).run());

        for expected in 0..3 {
            match rx.recv().await {
                Some(UiEvent::RotationTick(n)) => assert_eq!(n, expected),
                other => panic!("unexpected event {other:?}"),
            }
        }
        timer.abort();
    }
}
