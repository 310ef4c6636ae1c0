//! Business-Day Close Lifecycle service
//!
//! Thin orchestration over the business_day repository: resolves the
//! store's wall-clock "today" (cutoff-aware) for get-or-create and
//! auto-reopen, and converts cent aggregates into API-facing decimals.
//!
//! All state transitions and their atomicity live in
//! [`crate::db::repository::business_day`]; this layer adds no locking
//! because the status column is the mutex.

use chrono::NaiveTime;
use chrono_tz::Tz;
use sqlx::SqlitePool;

use crate::db::repository::{RepoResult, business_day};
use crate::utils::time;
use shared::models::{
    BusinessDay, ClosingEntry, DayCloseEstimate, DayCloseSummary, PendingClosing,
};
use shared::money::cents_to_decimal;

#[derive(Clone)]
pub struct DayCloseService {
    pool: SqlitePool,
    store_id: i64,
    cutoff: NaiveTime,
    tz: Tz,
}

impl DayCloseService {
    pub fn new(pool: SqlitePool, store_id: i64, cutoff: NaiveTime, tz: Tz) -> Self {
        Self {
            pool,
            store_id,
            cutoff,
            tz,
        }
    }

    /// 当前营业日 (YYYY-MM-DD)，按 cutoff 计算
    fn today(&self) -> String {
        time::current_business_date(self.cutoff, self.tz)
            .format("%Y-%m-%d")
            .to_string()
    }

    /// The store's current day, creating today's if none is in flight
    pub async fn current_day(&self, opened_by: i64) -> RepoResult<BusinessDay> {
        business_day::get_or_create(&self.pool, self.store_id, &self.today(), opened_by).await
    }

    pub async fn get_day(&self, day_id: i64) -> RepoResult<Option<BusinessDay>> {
        business_day::find_by_id(&self.pool, day_id).await
    }

    /// Staged entries of a PENDING_CLOSE day (wizard crash recovery)
    pub async fn pending_closings(&self, day_id: i64) -> RepoResult<Vec<PendingClosing>> {
        business_day::list_pending(&self.pool, day_id).await
    }

    /// prepare(): stage the closings, gate the day, return the preview
    pub async fn prepare(
        &self,
        day_id: i64,
        closings: &[ClosingEntry],
    ) -> RepoResult<DayCloseEstimate> {
        let totals = business_day::prepare_close(&self.pool, day_id, closings).await?;
        Ok(DayCloseEstimate {
            day_id,
            closings_count: totals.closings_count,
            estimated_total: cents_to_decimal(totals.estimated_total_cents),
        })
    }

    /// commit(): settle and close, then auto-open today's day
    pub async fn commit(&self, day_id: i64, actor_id: i64) -> RepoResult<DayCloseSummary> {
        let outcome =
            business_day::commit_close(&self.pool, day_id, actor_id, &self.today()).await?;
        Ok(DayCloseSummary {
            total_sales: cents_to_decimal(outcome.day.total_sales_cents),
            day: outcome.day,
            snapshots: outcome.snapshots,
        })
    }

    /// cancel(): discard the staged closings, return to OPEN
    pub async fn cancel(&self, day_id: i64) -> RepoResult<BusinessDay> {
        business_day::cancel_close(&self.pool, day_id).await
    }

    /// Read model for a day's settlement
    pub async fn summary(&self, day_id: i64) -> RepoResult<Option<DayCloseSummary>> {
        let Some(day) = business_day::find_by_id(&self.pool, day_id).await? else {
            return Ok(None);
        };
        let snapshots = business_day::list_snapshots(&self.pool, day_id).await?;
        Ok(Some(DayCloseSummary {
            total_sales: cents_to_decimal(day.total_sales_cents),
            day,
            snapshots,
        }))
    }
}
