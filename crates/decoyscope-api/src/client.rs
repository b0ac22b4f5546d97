// Decoy service HTTP client
//
// Wraps `reqwest::Client` with base-path URL construction and error
// normalization. Endpoint groups (stats, logs, notifications, control) are
// implemented as inherent methods in separate files so this module stays
// focused on transport mechanics.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for the decoy service API.
///
/// Every request is resolved against a single base path
/// (e.g. `http://localhost:8080/api/honeypot`). No retries happen here:
/// a failed call surfaces once, tagged with its endpoint.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, mut base_url: Url) -> Self {
        // `Url::join` drops the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { http, base_url }
    }

    /// The API base URL, always with a trailing slash.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Resolve an endpoint such as `/stats/top-ips?limit=10` against the base path.
    pub(crate) fn endpoint_url(&self, endpoint: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(endpoint.trim_start_matches('/'))?)
    }

    /// Build a URL from raw path segments, percent-encoding each one.
    pub(crate) fn segments_url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::CannotBeABase(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Issue one JSON call against `endpoint`.
    ///
    /// Returns `Value::Null` for an empty 2xx body, which is what the
    /// mutating endpoints usually answer with.
    pub async fn call(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<Value, Error> {
        let url = self.endpoint_url(endpoint)?;
        self.execute(url, method, body).await
    }

    pub(crate) async fn execute(
        &self,
        url: Url,
        method: Method,
        body: Option<&Value>,
    ) -> Result<Value, Error> {
        let endpoint = endpoint_label(&url);
        debug!("{method} {url}");

        let mut builder = self.http.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|source| Error::Transport {
            endpoint: endpoint.clone(),
            source,
        })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|source| Error::Transport {
            endpoint: endpoint.clone(),
            source,
        })?;

        if !status.is_success() {
            return Err(Error::Status {
                endpoint,
                status: status.as_u16(),
                body: preview(&text).to_owned(),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| Error::Deserialization {
            endpoint,
            message: format!("{e} (body preview: {:?})", preview(&text)),
            body: text.clone(),
        })
    }

    /// GET `url` and decode the body into `T`.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        let endpoint = endpoint_label(&url);
        let value = self.execute(url, Method::GET, None).await?;
        decode(&endpoint, value)
    }

    /// Send a body-less mutating request and discard whatever comes back.
    pub(crate) async fn send_empty(&self, method: Method, url: Url) -> Result<Value, Error> {
        self.execute(url, method, None).await
    }
}

/// Decode an already-parsed JSON value, keeping the endpoint on failure.
pub(crate) fn decode<T: DeserializeOwned>(endpoint: &str, value: Value) -> Result<T, Error> {
    let raw = value.to_string();
    serde_json::from_value(value).map_err(|e| Error::Deserialization {
        endpoint: endpoint.to_owned(),
        message: e.to_string(),
        body: raw,
    })
}

/// Path plus query, used to name the endpoint in errors and logs.
fn endpoint_label(url: &Url) -> String {
    match url.query() {
        Some(q) => format!("{}?{q}", url.path()),
        None => url.path().to_owned(),
    }
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
