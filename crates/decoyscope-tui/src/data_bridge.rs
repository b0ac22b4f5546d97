//! Data bridge — connects the refresh orchestrator to TUI actions.
//!
//! Runs as a background task: owns the periodic refresh timer and forwards
//! every [`RefreshEvent`] the orchestrator produces as an [`Action`]
//! through the TUI's action channel.

use std::time::Duration;

use decoyscope_core::{RefreshEvent, RefreshOrchestrator};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::action::Action;

/// Forward orchestrator events to the action loop until cancelled.
///
/// `event_tx` is the sender the orchestrator's tasks report through; the
/// timer gets a clone so its ticks arrive on the same channel as fetch
/// results.
pub async fn spawn_data_bridge(
    orchestrator: RefreshOrchestrator,
    event_tx: mpsc::UnboundedSender<RefreshEvent>,
    mut events: mpsc::UnboundedReceiver<RefreshEvent>,
    action_tx: mpsc::UnboundedSender<Action>,
    refresh_interval: Duration,
    cancel: CancellationToken,
) {
    let timer = orchestrator.spawn_timer(refresh_interval, &event_tx, cancel.clone());
    drop(event_tx);
    info!(
        interval = %humantime::format_duration(refresh_interval),
        "refresh timer started"
    );

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Some(event) = events.recv() => {
                if action_tx.send(Action::Refresh(event)).is_err() {
                    break;
                }
            }

            else => break,
        }
    }

    let _ = timer.await;
    debug!("data bridge shut down");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use decoyscope_core::ConsoleConfig;

    use super::*;

    fn orchestrator() -> RefreshOrchestrator {
        let client = ConsoleConfig::default().build_client().unwrap();
        RefreshOrchestrator::new(Arc::new(client), 10)
    }

    #[tokio::test(start_paused = true)]
    async fn forwards_timer_ticks_as_actions() {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (action_tx, mut action_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let bridge = tokio::spawn(spawn_data_bridge(
            orchestrator(),
            event_tx,
            event_rx,
            action_tx,
            Duration::from_secs(30),
            cancel.clone(),
        ));

        tokio::time::advance(Duration::from_secs(31)).await;
        let action = action_rx.recv().await.unwrap();
        assert!(matches!(action, Action::Refresh(RefreshEvent::TimerFired)));

        cancel.cancel();
        bridge.await.unwrap();
    }

    #[tokio::test]
    async fn stops_when_cancelled() {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (action_tx, _action_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        cancel.cancel();

        spawn_data_bridge(
            orchestrator(),
            event_tx,
            event_rx,
            action_tx,
            Duration::from_secs(30),
            cancel,
        )
        .await;
    }
}
