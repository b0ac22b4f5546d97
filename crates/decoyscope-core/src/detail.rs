// ── Session detail ──
//
// Expanding a log row never touches the network: the entry is looked up in
// the single-slot cache of the last successfully fetched page. The modal
// keeps its own copy, so a refresh that replaces the cache underneath does
// not change what the operator is reading.

use decoyscope_api::{CommandExecution, LogEntry, LogPage, Protocol, Timestamp};
use tracing::warn;

use crate::error::CoreError;

/// The last page the server returned, replaced wholesale on every
/// successful log fetch and never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastPage {
    page: Option<u32>,
    entries: Vec<LogEntry>,
}

impl LastPage {
    pub fn replace(&mut self, page: u32, data: &LogPage) {
        self.page = Some(page);
        self.entries = data.logs.clone();
    }

    /// Forget the page, e.g. after the server's records were deleted.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn page(&self) -> Option<u32> {
        self.page
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn find(&self, log_id: &str) -> Option<&LogEntry> {
        self.entries.iter().find(|e| e.id == log_id)
    }
}

/// How the operator dismissed the modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum CloseTrigger {
    CloseControl,
    OutsideClick,
    CancelKey,
}

/// Snapshot of one session as shown in the modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub log_id: String,
    pub source_ip: String,
    pub protocol: Protocol,
    pub session_id: Option<String>,
    pub timestamp: Option<Timestamp>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Capture order, oldest first.
    pub transcript: Vec<CommandExecution>,
}

impl SessionView {
    fn from_entry(entry: &LogEntry) -> Self {
        Self {
            log_id: entry.id.clone(),
            source_ip: entry.source_ip.clone(),
            protocol: entry.protocol.clone(),
            session_id: entry.session_id.clone(),
            timestamp: entry.timestamp.clone(),
            username: entry.username.clone(),
            password: entry.password.clone(),
            transcript: entry.transcript(),
        }
    }

    pub fn command_count(&self) -> usize {
        self.transcript.len()
    }
}

/// `Closed -> Open -> Closed`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionDetail {
    #[default]
    Closed,
    Open(SessionView),
}

impl SessionDetail {
    /// Open the modal for `log_id`, looked up in `cache` only.
    pub fn open(&mut self, log_id: &str, cache: &LastPage) -> Result<(), CoreError> {
        let Some(entry) = cache.find(log_id) else {
            warn!(log_id, page = ?cache.page(), "session detail requested for entry not in page cache");
            return Err(CoreError::NotFoundLocal {
                log_id: log_id.to_owned(),
            });
        };
        *self = Self::Open(SessionView::from_entry(entry));
        Ok(())
    }

    /// Close the modal. Returns `false` if it was already closed.
    pub fn close(&mut self, trigger: CloseTrigger) -> bool {
        if matches!(self, Self::Closed) {
            return false;
        }
        tracing::debug!(%trigger, "session detail closed");
        *self = Self::Closed;
        true
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    pub fn view(&self) -> Option<&SessionView> {
        match self {
            Self::Open(view) => Some(view),
            Self::Closed => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cache() -> LastPage {
        let page: LogPage = LogPage {
            logs: vec![
                serde_json::from_value(json!({
                    "id": "l1",
                    "sourceIp": "203.0.113.5",
                    "protocol": "SSH",
                    "sessionId": "s-1",
                    "commands": [
                        {"command": "id", "timestamp": "2024-06-15T10:30:01"},
                        {"command": "uname -a", "timestamp": "2024-06-15T10:30:04"}
                    ]
                }))
                .unwrap(),
                serde_json::from_value(json!({"id": "l2", "protocol": "TELNET"})).unwrap(),
            ],
            total_pages: Some(1),
        };
        let mut cache = LastPage::default();
        cache.replace(0, &page);
        cache
    }

    #[test]
    fn open_preserves_transcript_order() {
        let mut detail = SessionDetail::default();
        detail.open("l1", &cache()).unwrap();
        let view = detail.view().unwrap();
        let commands: Vec<_> = view.transcript.iter().map(|c| c.command.as_str()).collect();
        assert_eq!(commands, vec!["id", "uname -a"]);
        assert_eq!(view.command_count(), 2);
        assert!(detail.is_open());
    }

    #[test]
    fn absent_id_is_not_found_and_stays_closed() {
        let mut detail = SessionDetail::default();
        let err = detail.open("missing", &cache()).unwrap_err();
        assert_eq!(
            err,
            CoreError::NotFoundLocal {
                log_id: "missing".into()
            }
        );
        assert!(!detail.is_open());
    }

    #[test]
    fn session_without_commands_still_opens() {
        let mut detail = SessionDetail::default();
        detail.open("l2", &cache()).unwrap();
        assert!(detail.view().unwrap().transcript.is_empty());
    }

    #[test]
    fn cleared_cache_finds_nothing() {
        let mut cache = cache();
        cache.clear();
        assert_eq!(cache.page(), None);
        assert!(cache.find("l1").is_none());
        assert!(SessionDetail::default().open("l1", &cache).is_err());
    }

    #[test]
    fn closing_twice_is_noop() {
        let mut detail = SessionDetail::default();
        detail.open("l1", &cache()).unwrap();
        assert!(detail.close(CloseTrigger::OutsideClick));
        assert!(!detail.close(CloseTrigger::CancelKey));
        assert!(!detail.close(CloseTrigger::CloseControl));
    }

    #[test]
    fn replaced_cache_does_not_change_open_modal() {
        let mut cache = cache();
        let mut detail = SessionDetail::default();
        detail.open("l1", &cache).unwrap();
        cache.replace(1, &LogPage::default());
        assert!(cache.find("l1").is_none());
        assert_eq!(detail.view().unwrap().source_ip, "203.0.113.5");
    }
}
