// Notification endpoints
//
// The unread feed, the filtered history, and the two acknowledgement
// calls. Acknowledgements return nothing useful; callers re-fetch.

use reqwest::Method;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Notification, NotificationPage, NotificationQuery};

impl ApiClient {
    /// `GET /notifications/unread`
    pub async fn unread_notifications(&self) -> Result<Vec<Notification>, Error> {
        self.get(self.endpoint_url("notifications/unread")?).await
    }

    /// `GET /notifications?page&size&type&category`
    pub async fn notifications(&self, query: &NotificationQuery) -> Result<NotificationPage, Error> {
        debug!(?query, "fetching notification history");
        let mut url = self.endpoint_url("notifications")?;
        url.query_pairs_mut().extend_pairs(query.pairs());
        self.get(url).await
    }

    /// `PUT /notifications/{id}/read`
    pub async fn mark_notification_read(&self, id: &str) -> Result<(), Error> {
        let url = self.segments_url(&["notifications", id, "read"])?;
        self.send_empty(Method::PUT, url).await?;
        Ok(())
    }

    /// `PUT /notifications/read-all`
    pub async fn mark_all_notifications_read(&self) -> Result<(), Error> {
        let url = self.endpoint_url("notifications/read-all")?;
        self.send_empty(Method::PUT, url).await?;
        Ok(())
    }
}
