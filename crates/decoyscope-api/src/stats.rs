// Status and statistics endpoints
//
// Read-only aggregates refreshed every cycle: service status, counters,
// ranked lists, and the hourly timeline.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Stats, SystemStatus, Timeline, TopCredentials, TopIps, UniqueIps};

impl ApiClient {
    /// `GET /status`
    pub async fn status(&self) -> Result<SystemStatus, Error> {
        self.get(self.endpoint_url("status")?).await
    }

    /// `GET /stats`
    pub async fn stats(&self) -> Result<Stats, Error> {
        self.get(self.endpoint_url("stats")?).await
    }

    /// `GET /stats/unique-ips`
    pub async fn unique_ips(&self) -> Result<UniqueIps, Error> {
        self.get(self.endpoint_url("stats/unique-ips")?).await
    }

    /// `GET /stats/top-ips?limit=N`, ranked by the server.
    pub async fn top_ips(&self, limit: u32) -> Result<TopIps, Error> {
        debug!(limit, "fetching top IPs");
        let mut url = self.endpoint_url("stats/top-ips")?;
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        self.get(url).await
    }

    /// `GET /stats/top-credentials?limit=N`
    pub async fn top_credentials(&self, limit: u32) -> Result<TopCredentials, Error> {
        debug!(limit, "fetching top credentials");
        let mut url = self.endpoint_url("stats/top-credentials")?;
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        self.get(url).await
    }

    /// `GET /stats/timeline`
    pub async fn timeline(&self) -> Result<Timeline, Error> {
        self.get(self.endpoint_url("stats/timeline")?).await
    }
}
