// Decoy service API wire types
//
// Field names follow the service's camelCase JSON. Fields use
// `#[serde(default)]` liberally because older deployments omit several of
// them and the console must degrade per widget instead of failing a fetch.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{EnumIter, IntoStaticStr};

// ── Timestamp ────────────────────────────────────────────────────────

/// Server timestamp as shown on screen.
///
/// Accepts RFC 3339, zone-less ISO local date-times, Jackson's array form
/// (`[2024, 6, 15, 10, 30, 0]`), and epoch milliseconds. Anything else is
/// kept verbatim so the operator still sees what the server sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value", into = "String")]
pub enum Timestamp {
    Parsed(NaiveDateTime),
    Raw(String),
}

impl Timestamp {
    pub const DISPLAY_FORMAT: &'static str = "%d/%m/%Y %H:%M";

    pub fn parse(raw: &str) -> Self {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Self::Parsed(dt.naive_local());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Self::Parsed(dt);
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
            return Self::Parsed(dt);
        }
        Self::Raw(raw.to_owned())
    }

    pub fn as_naive(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Parsed(dt) => Some(*dt),
            Self::Raw(_) => None,
        }
    }

    fn from_parts(parts: &[Value]) -> Option<NaiveDateTime> {
        let num = |i: usize| {
            parts
                .get(i)
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
        };
        let year = parts
            .first()
            .and_then(Value::as_i64)
            .and_then(|n| i32::try_from(n).ok())?;
        NaiveDate::from_ymd_opt(year, num(1)?, num(2)?)?.and_hms_nano_opt(
            num(3).unwrap_or(0),
            num(4).unwrap_or(0),
            num(5).unwrap_or(0),
            num(6).unwrap_or(0),
        )
    }
}

impl From<Value> for Timestamp {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Self::parse(&s),
            Value::Number(ref n) => n
                .as_i64()
                .and_then(DateTime::from_timestamp_millis)
                .map_or_else(|| Self::Raw(n.to_string()), |dt| Self::Parsed(dt.naive_utc())),
            Value::Array(ref parts) => {
                Self::from_parts(parts).map_or_else(|| Self::Raw(value.to_string()), Self::Parsed)
            }
            Value::Null => Self::Raw(String::new()),
            other => Self::Raw(other.to_string()),
        }
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> Self {
        match ts {
            Timestamp::Parsed(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
            Timestamp::Raw(s) => s,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parsed(dt) => write!(f, "{}", dt.format(Self::DISPLAY_FORMAT)),
            Self::Raw(s) => f.write_str(s),
        }
    }
}

// ── Status & statistics ──────────────────────────────────────────────

/// `GET /status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub running: bool,
}

/// `GET /stats`. Values are shown verbatim; the totals are not cross-checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stats {
    pub total_logs: u64,
    pub ssh_logs: u64,
    pub telnet_logs: u64,
}

/// `GET /stats/unique-ips`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniqueIps {
    pub unique_ips_count: u64,
}

/// `GET /stats/top-ips`. Already ranked by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopIps {
    pub top_ips: Vec<TopIp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopIp {
    pub ip: String,
    pub count: u64,
    #[serde(default)]
    pub last_attack: Option<Timestamp>,
}

/// `GET /stats/top-credentials`. Older services answer with only a
/// `message`, which decodes to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopCredentials {
    pub top_credentials: Vec<TopCredential>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopCredential {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub count: u64,
}

/// `GET /stats/timeline`: hourly buckets, `hours[i]` pairs with `counts[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeline {
    pub hours: Vec<String>,
    pub counts: Vec<u64>,
}

// ── Logs ─────────────────────────────────────────────────────────────

/// Capture protocol of a log entry. Unknown values are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Protocol {
    Ssh,
    Telnet,
    Other(String),
}

impl Protocol {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ssh => "SSH",
            Self::Telnet => "TELNET",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for Protocol {
    fn from(s: String) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "SSH" => Self::Ssh,
            "TELNET" => Self::Telnet,
            _ => Self::Other(s),
        }
    }
}

impl From<Protocol> for String {
    fn from(p: Protocol) -> Self {
        p.as_str().to_owned()
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One command typed by the intruder during a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandExecution {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
}

/// One intrusion record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
    #[serde(default)]
    pub source_ip: String,
    pub protocol: Protocol,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub commands: Vec<CommandExecution>,
    /// Single-command field written by older capture services.
    #[serde(default)]
    pub command: Option<String>,
}

impl LogEntry {
    /// Commands in capture order, oldest first.
    ///
    /// Falls back to the legacy single `command` field, stamped with the
    /// entry's own timestamp.
    pub fn transcript(&self) -> Vec<CommandExecution> {
        if !self.commands.is_empty() {
            return self.commands.clone();
        }
        match self.command.as_deref() {
            Some(cmd) if !cmd.trim().is_empty() => vec![CommandExecution {
                command: cmd.to_owned(),
                timestamp: self.timestamp.clone(),
            }],
            _ => Vec::new(),
        }
    }

    /// Most recent command, if any.
    pub fn last_command(&self) -> Option<&str> {
        self.commands
            .iter()
            .rev()
            .map(|c| c.command.as_str())
            .find(|c| !c.trim().is_empty())
            .or_else(|| self.command.as_deref().filter(|c| !c.trim().is_empty()))
    }
}

/// `GET /logs` decoded into one shape.
///
/// `total_pages` is `None` when the server answered with a bare array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogPage {
    pub logs: Vec<LogEntry>,
    pub total_pages: Option<u32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum LogsPayload {
    Paged {
        #[serde(default)]
        logs: Vec<LogEntry>,
        #[serde(default, rename = "totalPages")]
        total_pages: Option<u32>,
    },
    Bare(Vec<LogEntry>),
}

impl From<LogsPayload> for LogPage {
    fn from(payload: LogsPayload) -> Self {
        match payload {
            LogsPayload::Paged { logs, total_pages } => Self { logs, total_pages },
            LogsPayload::Bare(logs) => Self {
                logs,
                total_pages: None,
            },
        }
    }
}

// ── Notifications ────────────────────────────────────────────────────

/// Severity of a notification. Unknown values decode to `Other`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    IntoStaticStr,
    strum::Display,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum NotificationType {
    Info,
    Warning,
    Error,
    Success,
    Alert,
    #[serde(other)]
    Other,
}

impl NotificationType {
    /// Types an operator can filter the history by.
    pub fn filterable() -> impl Iterator<Item = Self> {
        use strum::IntoEnumIterator;
        Self::iter().filter(|t| *t != Self::Other)
    }

    /// Query parameter value.
    pub fn as_param(self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub source_ip: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    /// 1=low, 2=medium, 3=high, 4=critical
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default, alias = "highPriority")]
    pub is_high_priority: bool,
    #[serde(default, alias = "critical")]
    pub is_critical: bool,
}

impl Notification {
    pub fn high_priority(&self) -> bool {
        self.is_high_priority || self.priority.is_some_and(|p| p >= 3)
    }

    pub fn critical(&self) -> bool {
        self.is_critical || self.priority == Some(4)
    }
}

/// `GET /notifications`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    pub total_pages: Option<u32>,
    pub total_elements: Option<u64>,
    pub current_page: Option<u32>,
}

/// Query for the full notification history. Empty filters are sent as
/// empty parameters, which the service treats as "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationQuery {
    pub page: u32,
    pub size: u32,
    pub kind: Option<NotificationType>,
    pub category: Option<String>,
}

impl NotificationQuery {
    pub fn pairs(&self) -> [(&'static str, String); 4] {
        [
            ("page", self.page.to_string()),
            ("size", self.size.to_string()),
            (
                "type",
                self.kind.map(NotificationType::as_param).unwrap_or_default().to_owned(),
            ),
            ("category", self.category.clone().unwrap_or_default()),
        ]
    }
}

// ── Control ──────────────────────────────────────────────────────────

/// Body returned by `/start`, `/stop`, `/restart` and `DELETE /logs`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlResponse {
    pub status: Option<String>,
    pub message: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn timestamps_in_every_server_shape() {
        let rfc: Timestamp = serde_json::from_value(json!("2024-06-15T10:30:00Z")).unwrap();
        let naive: Timestamp = serde_json::from_value(json!("2024-06-15T10:30:00.123")).unwrap();
        let array: Timestamp = serde_json::from_value(json!([2024, 6, 15, 10, 30])).unwrap();
        for ts in [rfc, naive, array] {
            assert_eq!(ts.to_string(), "15/06/2024 10:30");
        }
        let raw: Timestamp = serde_json::from_value(json!("yesterday")).unwrap();
        assert_eq!(raw, Timestamp::Raw("yesterday".into()));
        assert_eq!(raw.to_string(), "yesterday");
    }

    #[test]
    fn protocol_keeps_unknown_values() {
        let p: Protocol = serde_json::from_value(json!("ssh")).unwrap();
        assert_eq!(p, Protocol::Ssh);
        let p: Protocol = serde_json::from_value(json!("FTP")).unwrap();
        assert_eq!(p, Protocol::Other("FTP".into()));
        assert_eq!(p.to_string(), "FTP");
    }

    #[test]
    fn bare_and_paged_log_payloads() {
        let bare: LogsPayload =
            serde_json::from_value(json!([{"id": "a", "protocol": "SSH"}])).unwrap();
        let page = LogPage::from(bare);
        assert_eq!(page.total_pages, None);
        assert_eq!(page.logs.len(), 1);

        let paged: LogsPayload =
            serde_json::from_value(json!({"logs": [], "totalPages": 3})).unwrap();
        assert_eq!(LogPage::from(paged).total_pages, Some(3));
    }

    #[test]
    fn legacy_command_becomes_transcript() {
        let entry: LogEntry = serde_json::from_value(json!({
            "id": "l1",
            "protocol": "TELNET",
            "timestamp": "2024-06-15T10:30:00",
            "command": "uname -a"
        }))
        .unwrap();
        let transcript = entry.transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].command, "uname -a");
        assert_eq!(entry.last_command(), Some("uname -a"));
    }

    #[test]
    fn last_command_skips_blank_entries() {
        let entry: LogEntry = serde_json::from_value(json!({
            "id": "l2",
            "protocol": "SSH",
            "commands": [{"command": "wget x"}, {"command": "  "}]
        }))
        .unwrap();
        assert_eq!(entry.last_command(), Some("wget x"));

        let blank: LogEntry = serde_json::from_value(json!({
            "id": "l3",
            "protocol": "SSH",
            "command": "id",
            "commands": [{"command": ""}]
        }))
        .unwrap();
        assert_eq!(blank.last_command(), Some("id"));
    }

    #[test]
    fn notification_aliases_and_unknown_type() {
        let n: Notification = serde_json::from_value(json!({
            "id": "n1",
            "type": "DEBUG",
            "highPriority": true,
            "critical": false
        }))
        .unwrap();
        assert_eq!(n.kind, NotificationType::Other);
        assert!(n.high_priority());
        assert!(!n.critical());

        let n: Notification =
            serde_json::from_value(json!({"id": "n2", "type": "ALERT", "priority": 4})).unwrap();
        assert!(n.critical());
    }

    #[test]
    fn empty_filters_are_blank_params() {
        let q = NotificationQuery {
            page: 0,
            size: 100,
            kind: None,
            category: None,
        };
        assert_eq!(q.pairs()[2], ("type", String::new()));
        let q = NotificationQuery {
            kind: Some(NotificationType::Alert),
            ..q
        };
        assert_eq!(q.pairs()[2], ("type", "ALERT".to_owned()));
    }
}
