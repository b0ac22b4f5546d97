// ── Runtime console configuration ──
//
// Describes how to reach the decoy service and how often to poll it.
// Never touches disk: `decoyscope-config` or the CLI builds one and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use decoyscope_api::{ApiClient, TlsMode, TransportConfig};
use url::Url;

use crate::error::CoreError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/honeypot";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed lab deployments).
    DangerAcceptInvalid,
}

/// Everything the console needs to poll one decoy service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// API base path, e.g. `http://localhost:8080/api/honeypot`.
    pub base_url: String,
    pub tls: TlsVerification,
    /// Per-request timeout. `None` means no client-side limit.
    pub timeout: Option<Duration>,
    /// Period of the automatic refresh timer.
    pub refresh_interval: Duration,
    /// Log table page size.
    pub page_size: u32,
    /// Entries requested for each ranked list.
    pub top_limit: u32,
    /// Page size of the notification history overlay.
    pub history_page_size: u32,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            tls: TlsVerification::default(),
            timeout: None,
            refresh_interval: Duration::from_secs(30),
            page_size: 20,
            top_limit: 10,
            history_page_size: 100,
        }
    }
}

impl ConsoleConfig {
    pub fn url(&self) -> Result<Url, CoreError> {
        Url::parse(&self.base_url).map_err(|e| CoreError::Config {
            message: format!("invalid base URL '{}': {e}", self.base_url),
        })
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }

    /// Build the API client this configuration describes.
    pub fn build_client(&self) -> Result<ApiClient, CoreError> {
        ApiClient::new(self.url()?, &self.transport()).map_err(|e| CoreError::Config {
            message: e.to_string(),
        })
    }
}
