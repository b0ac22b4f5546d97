// decoyscope-core: Refresh engine and presentation state between decoyscope-api and the console.

pub mod config;
pub mod control;
pub mod detail;
pub mod error;
pub mod gate;
pub mod notifications;
pub mod pagination;
pub mod refresh;
pub mod render;
pub mod report;
pub mod state;
pub mod text;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ConsoleConfig, DEFAULT_BASE_URL, TlsVerification};
pub use control::{ControlAction, ControlAvailability};
pub use detail::{CloseTrigger, LastPage, SessionDetail, SessionView};
pub use error::CoreError;
pub use gate::{RefreshGate, RefreshPermit};
pub use notifications::{CATEGORIES, HistoryView, badge_text};
pub use pagination::LogView;
pub use refresh::{LogRequest, RefreshEvent, RefreshOrchestrator};
pub use state::{Applied, DashboardState, DataSet, DataUpdate, Payload, Scope, Widget};

// Wire types the front-end needs without depending on the api crate directly.
pub use decoyscope_api::{
    ApiClient, ControlResponse, LogEntry, LogPage, Notification, NotificationPage,
    NotificationQuery, NotificationType, Protocol, SystemStatus,
};
