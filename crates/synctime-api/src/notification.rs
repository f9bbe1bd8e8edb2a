//! HTTP implementation of [`NotificationRemote`].

use async_trait::async_trait;
use reqwest::Method;

use synctime_core::result::AppResult;
use synctime_core::types::id::{NotificationId, UserId};
use synctime_entity::NotificationRecord;

use crate::client::{ApiClient, require_ids};
use crate::dto::{CountResponse, IdsRequest};
use crate::traits::NotificationRemote;

/// Notification endpoints over HTTP.
#[derive(Debug, Clone)]
pub struct HttpNotificationApi {
    client: ApiClient,
}

impl HttpNotificationApi {
    /// Creates a new notification API client.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationRemote for HttpNotificationApi {
    async fn list(&self, user_id: &UserId) -> AppResult<Vec<NotificationRecord>> {
        let path = format!("/notification/{user_id}?order=DESC&isListAll=true");
        self.client.get_json(&path).await
    }

    async fn get(&self, id: &NotificationId) -> AppResult<NotificationRecord> {
        self.client.get_json(&format!("/notification/{id}")).await
    }

    async fn mark_read(&self, ids: &[NotificationId]) -> AppResult<()> {
        require_ids(ids, "mark-read")?;
        let body = IdsRequest { ids: ids.to_vec() };
        self.client
            .send(Method::PATCH, "/notification/mark-read", Some(&body))
            .await
    }

    async fn delete(&self, ids: &[NotificationId]) -> AppResult<()> {
        require_ids(ids, "delete")?;
        let body = IdsRequest { ids: ids.to_vec() };
        self.client
            .send(Method::POST, "/notification/delete", Some(&body))
            .await
    }

    async fn unseen_count(&self) -> AppResult<u64> {
        let count: CountResponse = self
            .client
            .get_raw("/notification/count/new-notification")
            .await?;
        Ok(count.value())
    }

    async fn mark_all_seen(&self) -> AppResult<()> {
        self.client
            .send::<()>(
                Method::PUT,
                "/notification/mark-read-new-notification-all",
                None,
            )
            .await
    }
}
