//! End-to-end tests for the business day close lifecycle:
//! prepare → commit (or cancel), recovery after interruption, and the
//! replication outbox handoff.

use backoffice_server::db::repository::{RepoError, business_day, outbox, pack};
use backoffice_server::{Config, DbService, ServerState};
use rust_decimal::Decimal;
use shared::models::{BusinessDayStatus, ClosingEntry, OutboxStatus, PackCreate, PackStatus};

const STORE_ID: i64 = 1;
const MANAGER_ID: i64 = 900;

async fn test_state() -> ServerState {
    let db = DbService::new_in_memory().await.unwrap();
    let config = Config::with_overrides("/tmp/backoffice-test", 0, STORE_ID);
    ServerState::with_pool(config, db.pool)
}

async fn register_pack(
    state: &ServerState,
    bin_id: i64,
    opening_counter: i64,
    unit_price_cents: i64,
) -> i64 {
    pack::create(
        &state.pool,
        STORE_ID,
        PackCreate {
            bin_id,
            opening_counter,
            unit_price_cents,
        },
    )
    .await
    .unwrap()
    .id
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_single_pack_close() {
    let state = test_state().await;
    let day = state.day_close.current_day(MANAGER_ID).await.unwrap();
    assert_eq!(day.status, BusinessDayStatus::Open);

    // $2.00 pack, 50 tickets sold
    let pack_id = register_pack(&state, 1, 0, 200).await;

    let closings = vec![ClosingEntry {
        pack_id,
        closing_counter: 50,
        is_depleted: false,
    }];
    let estimate = state.day_close.prepare(day.id, &closings).await.unwrap();
    assert_eq!(estimate.closings_count, 1);
    assert_eq!(estimate.estimated_total, dec("100.00"));

    let staged = state.day_close.get_day(day.id).await.unwrap().unwrap();
    assert_eq!(staged.status, BusinessDayStatus::PendingClose);

    let summary = state.day_close.commit(day.id, MANAGER_ID).await.unwrap();
    assert_eq!(summary.day.status, BusinessDayStatus::Closed);
    assert_eq!(summary.day.total_sales_cents, 10_000);
    assert_eq!(summary.day.total_units_sold, 50);
    assert_eq!(summary.day.closed_by, Some(MANAGER_ID));
    assert_eq!(summary.total_sales, dec("100.00"));
    assert_eq!(summary.snapshots.len(), 1);
    assert_eq!(summary.snapshots[0].units_sold, 50);
    assert_eq!(summary.snapshots[0].sales_amount_cents, 10_000);

    // Staging rows are consumed by the commit
    let pending = state.day_close.pending_closings(day.id).await.unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn test_two_pack_close_with_depletion() {
    let state = test_state().await;
    let day = state.day_close.current_day(MANAGER_ID).await.unwrap();

    // $1.00 pack sold out at 100; $5.00 pack at 25, still active
    let pack_a = register_pack(&state, 1, 0, 100).await;
    let pack_b = register_pack(&state, 2, 0, 500).await;

    let closings = vec![
        ClosingEntry {
            pack_id: pack_a,
            closing_counter: 100,
            is_depleted: true,
        },
        ClosingEntry {
            pack_id: pack_b,
            closing_counter: 25,
            is_depleted: false,
        },
    ];
    let estimate = state.day_close.prepare(day.id, &closings).await.unwrap();
    assert_eq!(estimate.estimated_total, dec("225.00"));

    let summary = state.day_close.commit(day.id, MANAGER_ID).await.unwrap();
    assert_eq!(summary.day.total_sales_cents, 22_500);
    assert_eq!(summary.day.total_units_sold, 125);
    // Estimate and final settlement agree on unchanged inputs
    assert_eq!(summary.total_sales, estimate.estimated_total);

    let a = pack::find_by_id(&state.pool, pack_a).await.unwrap().unwrap();
    let b = pack::find_by_id(&state.pool, pack_b).await.unwrap().unwrap();
    assert_eq!(a.status, PackStatus::Depleted);
    assert_eq!(b.status, PackStatus::Active);
}

#[tokio::test]
async fn test_empty_close_is_valid() {
    let state = test_state().await;
    let day = state.day_close.current_day(MANAGER_ID).await.unwrap();

    let estimate = state.day_close.prepare(day.id, &[]).await.unwrap();
    assert_eq!(estimate.closings_count, 0);
    assert_eq!(estimate.estimated_total, Decimal::ZERO);

    let summary = state.day_close.commit(day.id, MANAGER_ID).await.unwrap();
    assert_eq!(summary.day.status, BusinessDayStatus::Closed);
    assert_eq!(summary.day.total_sales_cents, 0);
    assert!(summary.snapshots.is_empty());
}

#[tokio::test]
async fn test_cancel_returns_day_to_open() {
    let state = test_state().await;
    let day = state.day_close.current_day(MANAGER_ID).await.unwrap();
    let pack_id = register_pack(&state, 1, 0, 200).await;

    let closings = vec![ClosingEntry {
        pack_id,
        closing_counter: 10,
        is_depleted: false,
    }];
    state.day_close.prepare(day.id, &closings).await.unwrap();
    assert_eq!(
        state.day_close.pending_closings(day.id).await.unwrap().len(),
        1
    );

    let reopened = state.day_close.cancel(day.id).await.unwrap();
    assert_eq!(reopened.status, BusinessDayStatus::Open);
    assert!(
        state
            .day_close
            .pending_closings(day.id)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        business_day::list_snapshots(&state.pool, day.id)
            .await
            .unwrap()
            .is_empty()
    );

    // Nothing was settled, the pack is untouched
    let p = pack::find_by_id(&state.pool, pack_id).await.unwrap().unwrap();
    assert_eq!(p.status, PackStatus::Active);
    assert_eq!(p.opening_counter, 0);

    // The wizard can start over with different numbers
    let estimate = state
        .day_close
        .prepare(
            day.id,
            &[ClosingEntry {
                pack_id,
                closing_counter: 30,
                is_depleted: false,
            }],
        )
        .await
        .unwrap();
    assert_eq!(estimate.estimated_total, dec("60.00"));
}

#[tokio::test]
async fn test_invalid_transitions() {
    let state = test_state().await;
    let day = state.day_close.current_day(MANAGER_ID).await.unwrap();

    // Commit without prepare
    let err = state.day_close.commit(day.id, MANAGER_ID).await.unwrap_err();
    assert!(matches!(err, RepoError::InvalidState(_)));

    // Cancel without prepare
    let err = state.day_close.cancel(day.id).await.unwrap_err();
    assert!(matches!(err, RepoError::InvalidState(_)));

    // Double prepare: the second caller loses the gate
    state.day_close.prepare(day.id, &[]).await.unwrap();
    let err = state.day_close.prepare(day.id, &[]).await.unwrap_err();
    assert!(matches!(err, RepoError::InvalidState(_)));

    // Unknown day
    let err = state.day_close.prepare(999, &[]).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));

    // CLOSED is terminal: neither commit nor cancel applies again
    state.day_close.commit(day.id, MANAGER_ID).await.unwrap();
    let err = state.day_close.commit(day.id, MANAGER_ID).await.unwrap_err();
    assert!(matches!(err, RepoError::InvalidState(_)));
    let err = state.day_close.cancel(day.id).await.unwrap_err();
    assert!(matches!(err, RepoError::InvalidState(_)));
}

#[tokio::test]
async fn test_prepare_validation() {
    let state = test_state().await;
    let day = state.day_close.current_day(MANAGER_ID).await.unwrap();
    let pack_id = register_pack(&state, 1, 0, 200).await;

    // Negative counter rejected before any state change
    let err = state
        .day_close
        .prepare(
            day.id,
            &[ClosingEntry {
                pack_id,
                closing_counter: -1,
                is_depleted: false,
            }],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    // Same pack listed twice
    let entry = ClosingEntry {
        pack_id,
        closing_counter: 5,
        is_depleted: false,
    };
    let err = state
        .day_close
        .prepare(day.id, &[entry.clone(), entry])
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    // Unknown pack
    let err = state
        .day_close
        .prepare(
            day.id,
            &[ClosingEntry {
                pack_id: 424242,
                closing_counter: 5,
                is_depleted: false,
            }],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    // Failed validation leaves the day OPEN
    let current = state.day_close.get_day(day.id).await.unwrap().unwrap();
    assert_eq!(current.status, BusinessDayStatus::Open);

    // Another store's pack cannot appear in this store's close
    let foreign = pack::create(
        &state.pool,
        STORE_ID + 1,
        PackCreate {
            bin_id: 9,
            opening_counter: 0,
            unit_price_cents: 100,
        },
    )
    .await
    .unwrap();
    let err = state
        .day_close
        .prepare(
            day.id,
            &[ClosingEntry {
                pack_id: foreign.id,
                closing_counter: 5,
                is_depleted: false,
            }],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[tokio::test]
async fn test_pending_close_survives_for_recovery() {
    let state = test_state().await;
    let day = state.day_close.current_day(MANAGER_ID).await.unwrap();
    let pack_id = register_pack(&state, 1, 10, 150).await;

    state
        .day_close
        .prepare(
            day.id,
            &[ClosingEntry {
                pack_id,
                closing_counter: 40,
                is_depleted: false,
            }],
        )
        .await
        .unwrap();

    // A restarted wizard re-discovers the day mid-close with its
    // staged entries intact, and can resume straight to commit.
    let current = business_day::find_current(&state.pool, STORE_ID)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.id, day.id);
    assert_eq!(current.status, BusinessDayStatus::PendingClose);

    let staged = state.day_close.pending_closings(day.id).await.unwrap();
    assert_eq!(staged.len(), 1);
    assert_eq!(staged[0].pack_id, pack_id);
    assert_eq!(staged[0].closing_counter, 40);

    let summary = state.day_close.commit(day.id, MANAGER_ID).await.unwrap();
    assert_eq!(summary.day.total_units_sold, 30);
    assert_eq!(summary.day.total_sales_cents, 4_500);
}

#[tokio::test]
async fn test_pending_close_survives_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("backoffice.db");
    let db_path = db_path.to_str().unwrap();

    let day_id;
    let pack_id;
    {
        let db = DbService::new(db_path).await.unwrap();
        let config = Config::with_overrides(dir.path().to_str().unwrap(), 0, STORE_ID);
        let state = ServerState::with_pool(config, db.pool);

        let day = state.day_close.current_day(MANAGER_ID).await.unwrap();
        day_id = day.id;
        pack_id = register_pack(&state, 1, 0, 200).await;
        state
            .day_close
            .prepare(
                day.id,
                &[ClosingEntry {
                    pack_id,
                    closing_counter: 12,
                    is_depleted: false,
                }],
            )
            .await
            .unwrap();
        state.pool.close().await;
    }

    // Fresh process: the staged close is still there and commits
    let db = DbService::new(db_path).await.unwrap();
    let config = Config::with_overrides(dir.path().to_str().unwrap(), 0, STORE_ID);
    let state = ServerState::with_pool(config, db.pool);

    let current = business_day::find_current(&state.pool, STORE_ID)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.id, day_id);
    assert_eq!(current.status, BusinessDayStatus::PendingClose);

    let staged = state.day_close.pending_closings(day_id).await.unwrap();
    assert_eq!(staged.len(), 1);
    assert_eq!(staged[0].pack_id, pack_id);

    let summary = state.day_close.commit(day_id, MANAGER_ID).await.unwrap();
    assert_eq!(summary.day.total_sales_cents, 2_400);
}

#[tokio::test]
async fn test_commit_auto_opens_next_day() {
    let state = test_state().await;
    let day = state.day_close.current_day(MANAGER_ID).await.unwrap();

    // current_day is idempotent while a day is in flight
    let again = state.day_close.current_day(MANAGER_ID).await.unwrap();
    assert_eq!(again.id, day.id);

    state.day_close.prepare(day.id, &[]).await.unwrap();
    state.day_close.commit(day.id, MANAGER_ID).await.unwrap();

    // The store is never left without an OPEN day
    let next = state.day_close.current_day(MANAGER_ID).await.unwrap();
    assert_ne!(next.id, day.id);
    assert_eq!(next.status, BusinessDayStatus::Open);
    assert_eq!(next.opened_by, MANAGER_ID);
}

#[tokio::test]
async fn test_commit_enqueues_day_close_outbox_entry() {
    let state = test_state().await;
    let day = state.day_close.current_day(MANAGER_ID).await.unwrap();
    let pack_id = register_pack(&state, 1, 0, 200).await;

    state
        .day_close
        .prepare(
            day.id,
            &[ClosingEntry {
                pack_id,
                closing_counter: 50,
                is_depleted: false,
            }],
        )
        .await
        .unwrap();
    state.day_close.commit(day.id, MANAGER_ID).await.unwrap();

    let entries = outbox::list_pending(&state.pool, 10).await.unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.entity_type, "day_close");
    assert_eq!(entry.entity_id, day.id);
    assert_eq!(entry.priority, 10);
    assert_eq!(entry.status, OutboxStatus::Pending);

    let payload: serde_json::Value = serde_json::from_str(&entry.payload).unwrap();
    assert_eq!(payload["total_sales_cents"], 10_000);
    assert_eq!(payload["snapshot_count"], 1);
}

#[tokio::test]
async fn test_commit_succeeds_when_outbox_unavailable() {
    let state = test_state().await;
    let day = state.day_close.current_day(MANAGER_ID).await.unwrap();
    let pack_id = register_pack(&state, 1, 0, 200).await;

    state
        .day_close
        .prepare(
            day.id,
            &[ClosingEntry {
                pack_id,
                closing_counter: 50,
                is_depleted: false,
            }],
        )
        .await
        .unwrap();

    // Sync queue gone: the enqueue fails inside its savepoint and the
    // close must still land
    sqlx::query("DROP TABLE outbox")
        .execute(&state.pool)
        .await
        .unwrap();

    let summary = state.day_close.commit(day.id, MANAGER_ID).await.unwrap();
    assert_eq!(summary.day.status, BusinessDayStatus::Closed);
    assert_eq!(summary.day.total_sales_cents, 10_000);
    assert_eq!(summary.snapshots.len(), 1);

    // Auto-reopen was part of the same transaction and survived too
    let next = state.day_close.current_day(MANAGER_ID).await.unwrap();
    assert_ne!(next.id, day.id);
    assert_eq!(next.status, BusinessDayStatus::Open);
}

#[tokio::test]
async fn test_negative_delta_settles_as_is() {
    let state = test_state().await;
    let day = state.day_close.current_day(MANAGER_ID).await.unwrap();
    let pack_id = register_pack(&state, 1, 20, 100).await;

    // Closing below opening settles negative, not an error
    state
        .day_close
        .prepare(
            day.id,
            &[ClosingEntry {
                pack_id,
                closing_counter: 15,
                is_depleted: false,
            }],
        )
        .await
        .unwrap();
    let summary = state.day_close.commit(day.id, MANAGER_ID).await.unwrap();
    assert_eq!(summary.day.total_units_sold, -5);
    assert_eq!(summary.day.total_sales_cents, -500);
    assert_eq!(summary.total_sales, dec("-5.00"));
}

#[tokio::test]
async fn test_summary_read_model() {
    let state = test_state().await;
    let day = state.day_close.current_day(MANAGER_ID).await.unwrap();
    let pack_id = register_pack(&state, 1, 0, 250).await;

    state
        .day_close
        .prepare(
            day.id,
            &[ClosingEntry {
                pack_id,
                closing_counter: 8,
                is_depleted: false,
            }],
        )
        .await
        .unwrap();
    state.day_close.commit(day.id, MANAGER_ID).await.unwrap();

    let summary = state.day_close.summary(day.id).await.unwrap().unwrap();
    assert_eq!(summary.total_sales, dec("20.00"));
    assert_eq!(summary.snapshots.len(), 1);
    assert_eq!(summary.snapshots[0].starting_counter, 0);
    assert_eq!(summary.snapshots[0].ending_counter, 8);

    assert!(state.day_close.summary(777).await.unwrap().is_none());
}

#[tokio::test]
async fn test_pack_set_status() {
    let state = test_state().await;
    state.day_close.current_day(MANAGER_ID).await.unwrap();
    let pack_id = register_pack(&state, 1, 0, 200).await;

    let depleted = pack::set_status(&state.pool, pack_id, PackStatus::Depleted)
        .await
        .unwrap();
    assert_eq!(depleted.status, PackStatus::Depleted);

    let back = pack::set_status(&state.pool, pack_id, PackStatus::Active)
        .await
        .unwrap();
    assert_eq!(back.status, PackStatus::Active);

    let err = pack::set_status(&state.pool, 424242, PackStatus::Depleted)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[tokio::test]
async fn test_pack_registration_counts_activation() {
    let state = test_state().await;
    let day = state.day_close.current_day(MANAGER_ID).await.unwrap();

    register_pack(&state, 1, 0, 100).await;
    register_pack(&state, 2, 0, 100).await;

    let current = state.day_close.get_day(day.id).await.unwrap().unwrap();
    assert_eq!(current.total_units_activated, 2);
}
