// ── Refresh orchestration ──
//
// Fans out one cycle of fetches, guards against overlapping cycles, and
// runs the off-cycle fetches (page turns, acknowledgements, history, control
// actions). Results travel back as `RefreshEvent`s over an unbounded
// channel; nothing here touches presentation or the dashboard state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Local};
use decoyscope_api::{ApiClient, ControlResponse, NotificationQuery};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::control::ControlAction;
use crate::error::CoreError;
use crate::gate::RefreshGate;
use crate::state::{DataSet, DataUpdate, Payload, Scope};

/// Messages produced by the orchestrator.
#[derive(Debug, Clone)]
pub enum RefreshEvent {
    /// One data set settled.
    Data(DataUpdate),
    /// Every fetch of a cycle settled and the guard is released.
    CycleCompleted { at: DateTime<Local> },
    /// The periodic timer asks for a cycle.
    TimerFired,
    /// A single or bulk acknowledgement finished (the re-fetch follows separately).
    Acknowledged {
        id: Option<String>,
        result: Result<(), CoreError>,
    },
    /// A control action finished.
    ControlFinished {
        action: ControlAction,
        result: Result<ControlResponse, CoreError>,
    },
}

/// Parameters of the log fetch in a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRequest {
    pub page: u32,
    pub size: u32,
}

/// Hands out generation numbers; larger is newer.
#[derive(Debug, Default)]
struct Sequencer(AtomicU64);

impl Sequencer {
    fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

type EventTx = mpsc::UnboundedSender<RefreshEvent>;

fn settle<T>(
    set: DataSet,
    generation: u64,
    scope: Scope,
    result: Result<T, decoyscope_api::Error>,
    wrap: impl FnOnce(T) -> Payload,
) -> RefreshEvent {
    let result = result.map(wrap).map_err(|e| {
        warn!(
            data_set = %set,
            endpoint = e.endpoint().unwrap_or("-"),
            error = %e,
            "fetch failed"
        );
        CoreError::from(e)
    });
    RefreshEvent::Data(DataUpdate {
        set,
        generation,
        scope,
        result,
    })
}

/// Coordinates every fetch the console makes.
#[derive(Clone)]
pub struct RefreshOrchestrator {
    client: Arc<ApiClient>,
    gate: RefreshGate,
    seq: Arc<Sequencer>,
    top_limit: u32,
}

impl RefreshOrchestrator {
    pub fn new(client: Arc<ApiClient>, top_limit: u32) -> Self {
        Self {
            client,
            gate: RefreshGate::new(),
            seq: Arc::new(Sequencer::default()),
            top_limit,
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.gate.is_refreshing()
    }

    // ── Full cycle ───────────────────────────────────────────────────

    /// Start a refresh cycle. Returns `false` and does nothing while one is
    /// already in flight: requests are dropped, not queued.
    pub fn trigger(&self, logs: LogRequest, tx: &EventTx) -> bool {
        let Some(permit) = self.gate.try_begin() else {
            debug!("refresh already in flight; request dropped");
            return false;
        };
        let generation = self.seq.next();
        let client = Arc::clone(&self.client);
        let tx = tx.clone();
        let limit = self.top_limit;
        debug!(generation, page = logs.page, "refresh cycle started");

        tokio::spawn(async move {
            let send = |event: RefreshEvent| {
                let _ = tx.send(event);
            };
            let whole = || Scope::Whole;

            tokio::join!(
                async {
                    send(settle(DataSet::Status, generation, whole(), client.status().await, Payload::Status));
                },
                async {
                    send(settle(DataSet::Stats, generation, whole(), client.stats().await, Payload::Stats));
                },
                async {
                    send(settle(
                        DataSet::UniqueIps,
                        generation,
                        whole(),
                        client.unique_ips().await,
                        Payload::UniqueIps,
                    ));
                },
                async {
                    send(settle(
                        DataSet::TopIps,
                        generation,
                        whole(),
                        client.top_ips(limit).await,
                        Payload::TopIps,
                    ));
                },
                async {
                    send(settle(
                        DataSet::TopCredentials,
                        generation,
                        whole(),
                        client.top_credentials(limit).await,
                        Payload::TopCredentials,
                    ));
                },
                async {
                    send(settle(
                        DataSet::Logs,
                        generation,
                        Scope::LogPage(logs.page),
                        client.logs(logs.page, logs.size).await,
                        Payload::Logs,
                    ));
                },
                async {
                    send(settle(
                        DataSet::UnreadNotifications,
                        generation,
                        whole(),
                        client.unread_notifications().await,
                        Payload::UnreadNotifications,
                    ));
                },
                async {
                    send(settle(
                        DataSet::ProtocolChart,
                        generation,
                        whole(),
                        client.stats().await,
                        Payload::ProtocolChart,
                    ));
                },
                async {
                    send(settle(
                        DataSet::Timeline,
                        generation,
                        whole(),
                        client.timeline().await,
                        Payload::Timeline,
                    ));
                },
            );

            drop(permit);
            debug!(generation, "refresh cycle settled");
            send(RefreshEvent::CycleCompleted { at: Local::now() });
        });
        true
    }

    /// Fire `TimerFired` every `period` until `cancel` trips. The first
    /// tick is one full period away; the initial load is triggered explicitly.
    pub fn spawn_timer(
        &self,
        period: Duration,
        tx: &EventTx,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let tx = tx.clone();
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        if tx.send(RefreshEvent::TimerFired).is_err() {
                            break;
                        }
                    }
                }
            }
            debug!("refresh timer stopped");
        })
    }

    // ── Off-cycle fetches ────────────────────────────────────────────

    /// Fetch one log page outside the cycle (page turn).
    pub fn fetch_logs(&self, logs: LogRequest, tx: &EventTx) {
        let generation = self.seq.next();
        let client = Arc::clone(&self.client);
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = client.logs(logs.page, logs.size).await;
            let _ = tx.send(settle(
                DataSet::Logs,
                generation,
                Scope::LogPage(logs.page),
                result,
                Payload::Logs,
            ));
        });
    }

    /// Fetch the service status alone (after a control action).
    pub fn fetch_status(&self, tx: &EventTx) {
        let generation = self.seq.next();
        let client = Arc::clone(&self.client);
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = client.status().await;
            let _ = tx.send(settle(
                DataSet::Status,
                generation,
                Scope::Whole,
                result,
                Payload::Status,
            ));
        });
    }

    /// Fetch one page of the notification history with its filters.
    pub fn fetch_history(&self, query: NotificationQuery, tx: &EventTx) {
        let generation = self.seq.next();
        let client = Arc::clone(&self.client);
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = client.notifications(&query).await;
            let _ = tx.send(settle(
                DataSet::NotificationHistory,
                generation,
                Scope::History(query),
                result,
                Payload::NotificationHistory,
            ));
        });
    }

    /// Mark one notification read, then re-fetch the unread feed (and the
    /// open history page) whether or not the mutation succeeded.
    pub fn acknowledge(&self, id: String, history: Option<NotificationQuery>, tx: &EventTx) {
        let this = self.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = this
                .client
                .mark_notification_read(&id)
                .await
                .map_err(|e| {
                    warn!(notification = %id, error = %e, "acknowledge failed");
                    CoreError::from(e)
                });
            let _ = tx.send(RefreshEvent::Acknowledged {
                id: Some(id),
                result,
            });
            this.refetch_after_ack(history, &tx).await;
        });
    }

    /// Mark every notification read, then re-fetch like [`Self::acknowledge`].
    pub fn acknowledge_all(&self, history: Option<NotificationQuery>, tx: &EventTx) {
        let this = self.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = this
                .client
                .mark_all_notifications_read()
                .await
                .map_err(|e| {
                    warn!(error = %e, "acknowledge all failed");
                    CoreError::from(e)
                });
            let _ = tx.send(RefreshEvent::Acknowledged { id: None, result });
            this.refetch_after_ack(history, &tx).await;
        });
    }

    async fn refetch_after_ack(&self, history: Option<NotificationQuery>, tx: &EventTx) {
        let generation = self.seq.next();
        let unread = self.client.unread_notifications().await;
        let _ = tx.send(settle(
            DataSet::UnreadNotifications,
            generation,
            Scope::Whole,
            unread,
            Payload::UnreadNotifications,
        ));
        if let Some(query) = history {
            let generation = self.seq.next();
            let page = self.client.notifications(&query).await;
            let _ = tx.send(settle(
                DataSet::NotificationHistory,
                generation,
                Scope::History(query),
                page,
                Payload::NotificationHistory,
            ));
        }
    }

    /// Run a control action. The caller refreshes once `ControlFinished` arrives.
    pub fn run_control(&self, action: ControlAction, tx: &EventTx) {
        let client = Arc::clone(&self.client);
        let tx = tx.clone();
        info!(%action, "control action requested");
        tokio::spawn(async move {
            let result = match action.command() {
                Some(command) => client.control(command).await,
                None => client.clear_logs().await,
            }
            .map_err(|e| {
                warn!(%action, error = %e, "control action failed");
                CoreError::from(e)
            });
            let _ = tx.send(RefreshEvent::ControlFinished { action, result });
        });
    }
}
