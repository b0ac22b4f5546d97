// decoyscope-api: Async Rust client for the decoy capture service JSON API

pub mod client;
pub mod control;
pub mod error;
pub mod logs;
pub mod models;
pub mod notifications;
pub mod stats;
pub mod transport;

pub use client::ApiClient;
pub use control::ControlCommand;
pub use error::Error;
pub use models::{
    CommandExecution, ControlResponse, LogEntry, LogPage, Notification, NotificationPage,
    NotificationQuery, NotificationType, Protocol, Stats, SystemStatus, Timeline, Timestamp,
    TopCredential, TopCredentials, TopIp, TopIps, UniqueIps,
};
pub use transport::{TlsMode, TransportConfig};
