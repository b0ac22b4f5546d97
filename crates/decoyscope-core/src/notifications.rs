// ── Notification lifecycle ──
//
// The unread feed is whatever `/notifications/unread` last returned; read
// state is never flipped locally. The history overlay filters server-side,
// so every filter change produces a new query to fetch.

use decoyscope_api::{NotificationQuery, NotificationType};

/// Categories the service files notifications under.
pub const CATEGORIES: [&str; 4] = ["SYSTEM", "SECURITY", "ATTACK", "PERFORMANCE"];

/// Badge text for `count` unread notifications; hidden at zero.
pub fn badge_text(count: usize) -> Option<String> {
    match count {
        0 => None,
        1..=99 => Some(count.to_string()),
        _ => Some("99+".to_owned()),
    }
}

/// State of the full-history overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryView {
    open: bool,
    page: u32,
    size: u32,
    total_pages: Option<u32>,
    kind: Option<NotificationType>,
    category: Option<String>,
}

impl HistoryView {
    pub fn new(size: u32) -> Self {
        Self {
            open: false,
            page: 0,
            size: size.max(1),
            total_pages: None,
            kind: None,
            category: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Open the overlay and return the query to fetch.
    pub fn open(&mut self) -> NotificationQuery {
        self.open = true;
        self.query()
    }

    /// Close the overlay. Closing twice is a no-op.
    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }

    pub fn query(&self) -> NotificationQuery {
        NotificationQuery {
            page: self.page,
            size: self.size,
            kind: self.kind,
            category: self.category.clone(),
        }
    }

    pub fn kind(&self) -> Option<NotificationType> {
        self.kind
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    pub fn record_total(&mut self, total_pages: Option<u32>) {
        self.total_pages = total_pages;
    }

    // ── Filters (each change restarts at page 0) ─────────────────────

    /// Cycle the type filter through every known type, then back to "any".
    pub fn cycle_kind(&mut self) -> NotificationQuery {
        let mut types = NotificationType::filterable();
        self.kind = match self.kind {
            None => types.next(),
            Some(current) => types.skip_while(|t| *t != current).nth(1),
        };
        self.page = 0;
        self.query()
    }

    /// Cycle the category filter through [`CATEGORIES`], then back to "any".
    pub fn cycle_category(&mut self) -> NotificationQuery {
        let next = match self.category.as_deref() {
            None => CATEGORIES.first(),
            Some(current) => CATEGORIES
                .iter()
                .skip_while(|c| **c != current)
                .nth(1),
        };
        self.category = next.map(|c| (*c).to_owned());
        self.page = 0;
        self.query()
    }

    pub fn set_filters(
        &mut self,
        kind: Option<NotificationType>,
        category: Option<String>,
    ) -> NotificationQuery {
        self.kind = kind;
        self.category = category.filter(|c| !c.is_empty());
        self.page = 0;
        self.query()
    }

    /// Drop both filters; the result is the unfiltered history query.
    pub fn clear_filters(&mut self) -> NotificationQuery {
        self.set_filters(None, None)
    }

    // ── Paging ───────────────────────────────────────────────────────

    pub fn previous_page(&mut self) -> Option<NotificationQuery> {
        if self.page == 0 {
            return None;
        }
        self.page -= 1;
        Some(self.query())
    }

    pub fn next_page(&mut self) -> Option<NotificationQuery> {
        match self.total_pages {
            Some(total) if self.page + 1 >= total => None,
            _ => {
                self.page += 1;
                Some(self.query())
            }
        }
    }
}
