//! SyncService — HTTP client for pushing outbox batches to the cloud

use reqwest::Client;

use crate::utils::AppError;
use shared::models::{OutboxEntry, SyncBatch, SyncBatchResponse};
use shared::util::now_millis;

/// HTTP client for the cloud sync API
pub struct SyncService {
    client: Client,
    cloud_url: String,
    store_id: i64,
}

impl SyncService {
    pub fn new(cloud_url: String, store_id: i64) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            cloud_url,
            store_id,
        })
    }

    /// Push a batch of outbox entries to the cloud
    pub async fn push_batch(&self, items: Vec<OutboxEntry>) -> Result<SyncBatchResponse, AppError> {
        let batch = SyncBatch {
            store_id: self.store_id,
            items,
            sent_at: now_millis(),
        };

        let url = format!("{}/api/store/sync", self.cloud_url);

        let response = self
            .client
            .post(&url)
            .json(&batch)
            .send()
            .await
            .map_err(|e| AppError::internal(format!("Cloud sync request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::internal(format!(
                "Cloud sync failed with status {status}: {body}"
            )));
        }

        let sync_response: SyncBatchResponse = response
            .json()
            .await
            .map_err(|e| AppError::internal(format!("Failed to parse sync response: {e}")))?;

        Ok(sync_response)
    }

    pub fn store_id(&self) -> i64 {
        self.store_id
    }
}
