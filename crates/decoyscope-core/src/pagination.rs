// ── Log table paging and filters ──
//
// Page and page size drive the server query. Protocol and IP filters are
// applied client-side to whatever page came back, so changing them never
// costs a request.

use decoyscope_api::{LogEntry, LogPage, Protocol};

/// Paging and filter state of the log table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogView {
    page: u32,
    page_size: u32,
    /// `None` until a paged answer arrives, or when the server sends a bare array.
    total_pages: Option<u32>,
    /// Row count of the last page the server returned for `page`.
    last_len: Option<usize>,
    protocol_filter: Option<Protocol>,
    ip_filter: String,
}

impl LogView {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 0,
            page_size: page_size.max(1),
            total_pages: None,
            last_len: None,
            protocol_filter: None,
            ip_filter: String::new(),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// Step back one page. Returns `false` (and changes nothing) at page 0,
    /// in which case no request should be issued.
    pub fn previous_page(&mut self) -> bool {
        if self.page == 0 {
            return false;
        }
        self.page -= 1;
        self.last_len = None;
        true
    }

    /// Step forward one page. Never clamped: asking past the last page
    /// yields an empty page, which then disables forward navigation.
    pub fn next_page(&mut self) -> u32 {
        self.page = self.page.saturating_add(1);
        self.last_len = None;
        self.page
    }

    /// Jump back to the first page (after the logs were cleared).
    pub fn reset(&mut self) {
        self.page = 0;
        self.total_pages = None;
        self.last_len = None;
    }

    pub fn can_go_back(&self) -> bool {
        self.page > 0
    }

    pub fn can_go_forward(&self) -> bool {
        match (self.total_pages, self.last_len) {
            // Empty page at or past the last known page is terminal.
            (Some(total), Some(0)) if self.page + 1 >= total => false,
            (Some(total), _) => self.page + 1 < total,
            // Bare-array answers: a full page may have a successor.
            (None, Some(len)) => u32::try_from(len).is_ok_and(|len| len >= self.page_size),
            (None, None) => false,
        }
    }

    /// Record what the server returned for the current page.
    pub fn record(&mut self, page: &LogPage) {
        self.total_pages = page.total_pages.map(|t| t.max(1));
        self.last_len = Some(page.logs.len());
    }

    /// "Page X of Y" (1-based), with `?` while the total is unknown.
    pub fn label(&self) -> String {
        match self.total_pages {
            Some(total) => format!("Page {} of {}", self.page + 1, total.max(self.page + 1)),
            None => format!("Page {} of ?", self.page + 1),
        }
    }

    // ── Filters ──────────────────────────────────────────────────────

    pub fn protocol_filter(&self) -> Option<&Protocol> {
        self.protocol_filter.as_ref()
    }

    pub fn ip_filter(&self) -> &str {
        &self.ip_filter
    }

    /// Cycle the protocol filter: all, SSH, TELNET, all.
    pub fn cycle_protocol_filter(&mut self) {
        self.protocol_filter = match self.protocol_filter {
            None => Some(Protocol::Ssh),
            Some(Protocol::Ssh) => Some(Protocol::Telnet),
            Some(_) => None,
        };
    }

    pub fn set_protocol_filter(&mut self, protocol: Option<Protocol>) {
        self.protocol_filter = protocol;
    }

    pub fn set_ip_filter(&mut self, needle: impl Into<String>) {
        self.ip_filter = needle.into().trim().to_owned();
    }

    pub fn clear_filters(&mut self) {
        self.protocol_filter = None;
        self.ip_filter.clear();
    }

    pub fn has_filters(&self) -> bool {
        self.protocol_filter.is_some() || !self.ip_filter.is_empty()
    }

    /// Rows of the fetched page that pass both filters, in server order.
    pub fn apply_filters<'a>(&self, logs: &'a [LogEntry]) -> Vec<&'a LogEntry> {
        logs.iter()
            .filter(|log| {
                self.protocol_filter
                    .as_ref()
                    .is_none_or(|p| &log.protocol == p)
            })
            .filter(|log| self.ip_filter.is_empty() || log.source_ip.contains(&self.ip_filter))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(id: &str, ip: &str, protocol: &str) -> LogEntry {
        serde_json::from_value(json!({"id": id, "sourceIp": ip, "protocol": protocol})).unwrap()
    }

    fn page(n: usize, total: Option<u32>) -> LogPage {
        LogPage {
            logs: (0..n)
                .map(|i| entry(&i.to_string(), "10.0.0.1", "SSH"))
                .collect(),
            total_pages: total,
        }
    }

    #[test]
    fn previous_at_zero_is_noop() {
        let mut view = LogView::new(20);
        assert!(!view.previous_page());
        assert_eq!(view.page(), 0);
        assert!(!view.can_go_back());
    }

    #[test]
    fn next_is_unbounded_and_empty_tail_is_terminal() {
        let mut view = LogView::new(20);
        view.record(&page(20, Some(2)));
        assert!(view.can_go_forward());

        assert_eq!(view.next_page(), 1);
        view.record(&page(5, Some(2)));
        assert!(!view.can_go_forward());

        // Pushed past the end anyway.
        assert_eq!(view.next_page(), 2);
        view.record(&page(0, Some(2)));
        assert!(!view.can_go_forward());
        assert_eq!(view.label(), "Page 3 of 3");
    }

    #[test]
    fn bare_array_pages_forward_only_when_full() {
        let mut view = LogView::new(3);
        view.record(&page(3, None));
        assert!(view.can_go_forward());
        assert_eq!(view.label(), "Page 1 of ?");
        view.next_page();
        view.record(&page(1, None));
        assert!(!view.can_go_forward());
    }

    #[test]
    fn filters_are_local_and_keep_order() {
        let logs = vec![
            entry("a", "203.0.113.5", "SSH"),
            entry("b", "198.51.100.7", "TELNET"),
            entry("c", "203.0.113.9", "TELNET"),
        ];
        let mut view = LogView::new(20);
        view.cycle_protocol_filter();
        view.cycle_protocol_filter();
        assert_eq!(view.protocol_filter(), Some(&Protocol::Telnet));
        let ids: Vec<_> = view.apply_filters(&logs).into_iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);

        view.set_ip_filter(" 203.0 ");
        let ids: Vec<_> = view.apply_filters(&logs).into_iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["c"]);

        view.clear_filters();
        assert!(!view.has_filters());
        assert_eq!(view.apply_filters(&logs).len(), 3);
    }
}
