//! Replication outbox queue tests: standalone enqueue, drain ordering,
//! and the attempt budget.

use backoffice_server::db::repository::outbox;
use backoffice_server::{Config, DbService, ServerState};
use shared::models::{OutboxEnqueue, OutboxStatus};

const STORE_ID: i64 = 1;

async fn test_state() -> ServerState {
    let db = DbService::new_in_memory().await.unwrap();
    let config = Config::with_overrides("/tmp/backoffice-test", 0, STORE_ID);
    ServerState::with_pool(config, db.pool)
}

fn enqueue_request(entity_id: i64, priority: i64) -> OutboxEnqueue {
    OutboxEnqueue {
        entity_type: "day_close".to_string(),
        entity_id,
        operation: "upsert".to_string(),
        payload: serde_json::json!({ "day_id": entity_id }),
        priority,
    }
}

#[tokio::test]
async fn test_enqueue_and_find() {
    let state = test_state().await;

    let id = outbox::enqueue(&state.pool, &enqueue_request(7, 100))
        .await
        .unwrap();

    let entry = outbox::find_by_id(&state.pool, id).await.unwrap().unwrap();
    assert_eq!(entry.entity_type, "day_close");
    assert_eq!(entry.entity_id, 7);
    assert_eq!(entry.status, OutboxStatus::Pending);
    assert_eq!(entry.attempts, 0);
    assert!(entry.sent_at.is_none());

    assert!(outbox::find_by_id(&state.pool, 12345).await.unwrap().is_none());
}

#[tokio::test]
async fn test_drain_order_and_mark_sent() {
    let state = test_state().await;

    // Lower priority value drains first, FIFO within a priority
    let low = outbox::enqueue(&state.pool, &enqueue_request(1, 100))
        .await
        .unwrap();
    let urgent = outbox::enqueue(&state.pool, &enqueue_request(2, 10))
        .await
        .unwrap();

    let pending = outbox::list_pending(&state.pool, 10).await.unwrap();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].id, urgent);
    assert_eq!(pending[1].id, low);

    outbox::mark_sent(&state.pool, &[urgent]).await.unwrap();

    let pending = outbox::list_pending(&state.pool, 10).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, low);
    assert_eq!(outbox::count_pending(&state.pool).await.unwrap(), 1);

    let sent = outbox::find_by_id(&state.pool, urgent).await.unwrap().unwrap();
    assert_eq!(sent.status, OutboxStatus::Sent);
    assert!(sent.sent_at.is_some());
}

#[tokio::test]
async fn test_failed_attempts_park_after_budget() {
    let state = test_state().await;
    let id = outbox::enqueue(&state.pool, &enqueue_request(3, 100))
        .await
        .unwrap();

    // Stays PENDING while attempts remain
    outbox::mark_attempt_failed(&state.pool, id, "connection refused", 3)
        .await
        .unwrap();
    outbox::mark_attempt_failed(&state.pool, id, "connection refused", 3)
        .await
        .unwrap();
    let entry = outbox::find_by_id(&state.pool, id).await.unwrap().unwrap();
    assert_eq!(entry.status, OutboxStatus::Pending);
    assert_eq!(entry.attempts, 2);
    assert_eq!(entry.last_error.as_deref(), Some("connection refused"));

    // The final attempt parks it for reconciliation
    outbox::mark_attempt_failed(&state.pool, id, "connection refused", 3)
        .await
        .unwrap();
    let entry = outbox::find_by_id(&state.pool, id).await.unwrap().unwrap();
    assert_eq!(entry.status, OutboxStatus::Failed);
    assert_eq!(entry.attempts, 3);
    assert!(outbox::list_pending(&state.pool, 10).await.unwrap().is_empty());
}
