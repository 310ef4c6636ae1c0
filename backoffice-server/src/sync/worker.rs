//! SyncWorker — background drain of the replication outbox
//!
//! 1. Scan PENDING entries on an interval (priority order)
//! 2. Push batches to the cloud via HTTP
//! 3. Cloud confirms → mark SENT; transport fails → count the attempt,
//!    back off exponentially, park as FAILED after the budget
//! 4. Shutdown via CancellationToken

use sqlx::SqlitePool;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::db::repository::outbox;
use crate::sync::service::SyncService;

/// Outbox drain batch size
const BATCH_SIZE: i64 = 50;
/// Delivery attempts before an entry is parked as FAILED
const MAX_ATTEMPTS: i64 = 10;
/// Initial backoff after a transport failure
const INITIAL_BACKOFF_SECS: u64 = 5;
/// Max backoff between retries
const MAX_BACKOFF_SECS: u64 = 300;

pub struct SyncWorker {
    pool: SqlitePool,
    service: SyncService,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl SyncWorker {
    pub fn new(
        pool: SqlitePool,
        service: SyncService,
        interval_secs: u64,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            pool,
            service,
            interval_secs,
            shutdown,
        }
    }

    /// Main run loop — drain, sleep, repeat; backoff on failure
    pub async fn run(self) {
        tracing::info!(
            store_id = self.service.store_id(),
            "Outbox sync worker started"
        );
        let mut backoff = Duration::from_secs(INITIAL_BACKOFF_SECS);

        loop {
            let sleep_duration = match self.drain_once().await {
                Ok(drained) => {
                    backoff = Duration::from_secs(INITIAL_BACKOFF_SECS);
                    if drained > 0 {
                        tracing::info!(drained, "Outbox entries delivered");
                        // More may be waiting, go straight back
                        Duration::from_secs(0)
                    } else {
                        Duration::from_secs(self.interval_secs)
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        backoff_secs = backoff.as_secs(),
                        "Outbox drain failed, backing off: {e}"
                    );
                    let current = backoff;
                    backoff = (backoff * 2).min(Duration::from_secs(MAX_BACKOFF_SECS));
                    current
                }
            };

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Outbox sync worker received shutdown signal");
                    return;
                }
                _ = tokio::time::sleep(sleep_duration) => {}
            }
        }
    }

    /// Push one batch; returns how many entries were confirmed
    async fn drain_once(&self) -> Result<usize, String> {
        let entries = outbox::list_pending(&self.pool, BATCH_SIZE)
            .await
            .map_err(|e| format!("List pending outbox entries: {e}"))?;

        if entries.is_empty() {
            return Ok(0);
        }

        let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
        let count = ids.len();

        match self.service.push_batch(entries).await {
            Ok(response) => {
                if response.rejected > 0 {
                    tracing::warn!(
                        accepted = response.accepted,
                        rejected = response.rejected,
                        "Sync batch partially rejected"
                    );
                    for err in &response.errors {
                        tracing::warn!("Sync rejection: {err}");
                    }
                }
                outbox::mark_sent(&self.pool, &ids)
                    .await
                    .map_err(|e| format!("Mark outbox entries sent: {e}"))?;
                Ok(count)
            }
            Err(e) => {
                let msg = e.to_string();
                for id in &ids {
                    if let Err(mark_err) =
                        outbox::mark_attempt_failed(&self.pool, *id, &msg, MAX_ATTEMPTS).await
                    {
                        tracing::error!(
                            outbox_id = id,
                            "Failed to record delivery failure: {mark_err}"
                        );
                    }
                }
                Err(msg)
            }
        }
    }
}
