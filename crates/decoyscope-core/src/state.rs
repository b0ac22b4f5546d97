// ── Dashboard state ──
//
// One instance, owned by the front-end's action loop. Fetch results reach
// it only through `apply`, which drops anything older than what a data set
// already shows, and anything answering a page or query the operator has
// since moved away from.

use std::collections::HashMap;

use chrono::{DateTime, Local};
use decoyscope_api::{
    LogPage, Notification, NotificationPage, NotificationQuery, Stats, SystemStatus, Timeline,
    TopCredentials, TopIps, UniqueIps,
};
use tracing::{debug, warn};

use crate::config::ConsoleConfig;
use crate::control::{ControlAction, ControlAvailability};
use crate::detail::{LastPage, SessionDetail};
use crate::error::CoreError;
use crate::notifications::HistoryView;
use crate::pagination::LogView;

/// Independently fetched data sets. Each backs exactly one widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum DataSet {
    Status,
    Stats,
    UniqueIps,
    TopIps,
    TopCredentials,
    Logs,
    UnreadNotifications,
    ProtocolChart,
    Timeline,
    NotificationHistory,
}

/// Per-widget view of one data set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Widget<T> {
    #[default]
    Loading,
    Ready(T),
    /// The last fetch failed; carries the reason.
    Failed(String),
}

impl<T> Widget<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// A successful fetch, tagged with what it answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Status(SystemStatus),
    Stats(Stats),
    UniqueIps(UniqueIps),
    TopIps(TopIps),
    TopCredentials(TopCredentials),
    Logs(LogPage),
    UnreadNotifications(Vec<Notification>),
    ProtocolChart(Stats),
    Timeline(Timeline),
    NotificationHistory(NotificationPage),
}

/// What a paged fetch asked for, so late answers to an abandoned page are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Whole,
    LogPage(u32),
    History(NotificationQuery),
}

/// One settled fetch on its way to the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUpdate {
    pub set: DataSet,
    /// Monotonic across the whole console; larger is newer.
    pub generation: u64,
    pub scope: Scope,
    pub result: Result<Payload, CoreError>,
}

/// Outcome of [`DashboardState::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Updated,
    Stale,
    OutOfScope,
}

/// Everything the console shows.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub status: Widget<SystemStatus>,
    pub stats: Widget<Stats>,
    pub unique_ips: Widget<UniqueIps>,
    pub top_ips: Widget<TopIps>,
    pub top_credentials: Widget<TopCredentials>,
    pub logs: Widget<LogPage>,
    pub unread: Widget<Vec<Notification>>,
    pub protocol_chart: Widget<Stats>,
    pub timeline: Widget<Timeline>,
    pub history: Widget<NotificationPage>,

    pub log_view: LogView,
    pub history_view: HistoryView,
    pub last_page: LastPage,
    pub detail: SessionDetail,
    pub pending_control: Option<ControlAction>,
    pub last_updated: Option<DateTime<Local>>,

    applied: HashMap<DataSet, u64>,
}

impl DashboardState {
    pub fn new(config: &ConsoleConfig) -> Self {
        Self {
            status: Widget::Loading,
            stats: Widget::Loading,
            unique_ips: Widget::Loading,
            top_ips: Widget::Loading,
            top_credentials: Widget::Loading,
            logs: Widget::Loading,
            unread: Widget::Loading,
            protocol_chart: Widget::Loading,
            timeline: Widget::Loading,
            history: Widget::Loading,
            log_view: LogView::new(config.page_size),
            history_view: HistoryView::new(config.history_page_size),
            last_page: LastPage::default(),
            detail: SessionDetail::default(),
            pending_control: None,
            last_updated: None,
            applied: HashMap::new(),
        }
    }

    /// Apply one fetch result to the widget it belongs to.
    pub fn apply(&mut self, update: DataUpdate) -> Applied {
        let DataUpdate {
            set,
            generation,
            scope,
            result,
        } = update;

        if self.applied.get(&set).is_some_and(|last| *last >= generation) {
            debug!(%set, generation, "dropping stale result");
            return Applied::Stale;
        }
        if !self.in_scope(&scope) {
            debug!(%set, generation, ?scope, "dropping result for abandoned view");
            return Applied::OutOfScope;
        }
        self.applied.insert(set, generation);

        match result {
            Ok(payload) => self.apply_payload(payload),
            Err(e) => {
                warn!(%set, error = %e, "data set unavailable");
                self.mark_failed(set, e.to_string());
            }
        }
        Applied::Updated
    }

    fn in_scope(&self, scope: &Scope) -> bool {
        match scope {
            Scope::Whole => true,
            Scope::LogPage(page) => *page == self.log_view.page(),
            Scope::History(query) => *query == self.history_view.query(),
        }
    }

    fn apply_payload(&mut self, payload: Payload) {
        match payload {
            Payload::Status(v) => self.status = Widget::Ready(v),
            Payload::Stats(v) => self.stats = Widget::Ready(v),
            Payload::UniqueIps(v) => self.unique_ips = Widget::Ready(v),
            Payload::TopIps(v) => self.top_ips = Widget::Ready(v),
            Payload::TopCredentials(v) => self.top_credentials = Widget::Ready(v),
            Payload::Logs(page) => {
                self.log_view.record(&page);
                self.last_page.replace(self.log_view.page(), &page);
                self.logs = Widget::Ready(page);
            }
            Payload::UnreadNotifications(v) => self.unread = Widget::Ready(v),
            Payload::ProtocolChart(v) => self.protocol_chart = Widget::Ready(v),
            Payload::Timeline(v) => self.timeline = Widget::Ready(v),
            Payload::NotificationHistory(page) => {
                self.history_view.record_total(page.total_pages);
                self.history = Widget::Ready(page);
            }
        }
    }

    /// A failed log fetch keeps the previous page cache for the detail modal.
    fn mark_failed(&mut self, set: DataSet, reason: String) {
        match set {
            DataSet::Status => self.status = Widget::Failed(reason),
            DataSet::Stats => self.stats = Widget::Failed(reason),
            DataSet::UniqueIps => self.unique_ips = Widget::Failed(reason),
            DataSet::TopIps => self.top_ips = Widget::Failed(reason),
            DataSet::TopCredentials => self.top_credentials = Widget::Failed(reason),
            DataSet::Logs => self.logs = Widget::Failed(reason),
            DataSet::UnreadNotifications => self.unread = Widget::Failed(reason),
            DataSet::ProtocolChart => self.protocol_chart = Widget::Failed(reason),
            DataSet::Timeline => self.timeline = Widget::Failed(reason),
            DataSet::NotificationHistory => self.history = Widget::Failed(reason),
        }
    }

    /// Record the end of a refresh cycle, whatever its individual outcomes.
    pub fn complete_cycle(&mut self, at: DateTime<Local>) {
        self.last_updated = Some(at);
    }

    /// Show the loading placeholder for the log table while a new page is fetched.
    pub fn begin_log_fetch(&mut self) {
        self.logs = Widget::Loading;
    }

    pub fn begin_history_fetch(&mut self) {
        self.history = Widget::Loading;
    }

    pub fn unread_count(&self) -> usize {
        self.unread.ready().map_or(0, Vec::len)
    }

    pub fn controls(&self) -> ControlAvailability {
        ControlAvailability::from_status(&self.status, self.pending_control)
    }

    /// Open the session modal from the page cache.
    pub fn open_detail(&mut self, log_id: &str) -> Result<(), CoreError> {
        self.detail.open(log_id, &self.last_page)
    }
}
