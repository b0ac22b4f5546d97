// Capture service control endpoints

use reqwest::Method;
use tracing::debug;

use crate::client::{ApiClient, decode};
use crate::error::Error;
use crate::models::ControlResponse;

/// Lifecycle commands accepted by the capture service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ControlCommand {
    Start,
    Stop,
    Restart,
}

impl ControlCommand {
    fn path(self) -> &'static str {
        self.into()
    }
}

impl ApiClient {
    /// `POST /start`, `POST /stop`, or `POST /restart`
    pub async fn control(&self, command: ControlCommand) -> Result<ControlResponse, Error> {
        debug!(%command, "sending control command");
        let url = self.endpoint_url(command.path())?;
        let value = self.send_empty(Method::POST, url).await?;
        if value.is_null() {
            return Ok(ControlResponse::default());
        }
        decode(&format!("/{}", command.path()), value)
    }
}
