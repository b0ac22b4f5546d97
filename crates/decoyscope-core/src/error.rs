// ── Core error types ──
//
// Errors surfaced to the console. A failed fetch is attributed to one
// widget and never aborts its siblings. The `From<decoyscope_api::Error>`
// impl collapses every transport-layer failure into `Transport`.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Remote errors ────────────────────────────────────────────────
    /// Network failure, non-2xx answer, or undecodable body.
    #[error("{endpoint}: {message}")]
    Transport {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },

    // ── Local errors ─────────────────────────────────────────────────
    /// Detail lookup against a page cache that no longer holds the entry.
    #[error("Log entry {log_id} is not on the current page")]
    NotFoundLocal { log_id: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<decoyscope_api::Error> for CoreError {
    fn from(err: decoyscope_api::Error) -> Self {
        let endpoint = err.endpoint().unwrap_or("<request>").to_owned();
        let status = err.status();
        let message = match err {
            decoyscope_api::Error::Transport { ref source, .. } if source.is_timeout() => {
                "request timed out".to_owned()
            }
            decoyscope_api::Error::Transport { ref source, .. } if source.is_connect() => {
                format!("cannot connect: {source}")
            }
            decoyscope_api::Error::Status { status, body, .. } if body.is_empty() => {
                format!("HTTP {status}")
            }
            decoyscope_api::Error::Status { status, body, .. } => format!("HTTP {status}: {body}"),
            decoyscope_api::Error::Deserialization { message, .. } => {
                format!("unexpected response: {message}")
            }
            other => other.to_string(),
        };
        Self::Transport {
            endpoint,
            status,
            message,
        }
    }
}
