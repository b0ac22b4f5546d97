// Intrusion log endpoints

use reqwest::Method;
use tracing::debug;

use crate::client::{ApiClient, decode};
use crate::error::Error;
use crate::models::{ControlResponse, LogPage, LogsPayload};

impl ApiClient {
    /// `GET /logs?page=P&size=S`
    ///
    /// Accepts both the paged `{logs, totalPages}` object and the bare
    /// array older services return.
    pub async fn logs(&self, page: u32, size: u32) -> Result<LogPage, Error> {
        debug!(page, size, "fetching log page");
        let mut url = self.endpoint_url("logs")?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("size", &size.to_string());
        let payload: LogsPayload = self.get(url).await?;
        Ok(payload.into())
    }

    /// `DELETE /logs`. Irreversible; callers confirm first.
    pub async fn clear_logs(&self) -> Result<ControlResponse, Error> {
        let url = self.endpoint_url("logs")?;
        let value = self.send_empty(Method::DELETE, url).await?;
        if value.is_null() {
            return Ok(ControlResponse::default());
        }
        decode("/logs", value)
    }
}
