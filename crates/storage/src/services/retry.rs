use std::future::Future;
use std::time::Duration;

use crate::error::EngineResult;

const BACKOFF_STEP: Duration = Duration::from_millis(25);

/// Re-runs an idempotent read up to `retries` extra times while it fails
/// transiently. Writes must never go through here.
pub async fn retry_read<T, F, Fut>(retries: u32, mut op: F) -> EngineResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = EngineResult<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Err(e) if e.is_transient() && attempt < retries => {
                attempt += 1;
                tracing::warn!(attempt, error = ?e, "Transient read failure, retrying");
                tokio::time::sleep(BACKOFF_STEP * attempt).await;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MemoryStore, PickStore};
    use crate::services::standings::leaderboard;

    #[tokio::test]
    async fn transient_failures_are_retried_within_budget() {
        let store = MemoryStore::new();
        store.fail_next_reads(2);

        let board = retry_read(2, || leaderboard(&store)).await.unwrap();
        assert!(board.still_in.is_empty());
    }

    #[tokio::test]
    async fn exhausted_budget_surfaces_store_unavailable() {
        let store = MemoryStore::new();
        store.fail_next_reads(3);

        let err = retry_read(1, || leaderboard(&store)).await.unwrap_err();
        assert_eq!(err.kind(), "store_unavailable");
    }

    #[tokio::test]
    async fn non_transient_errors_are_not_retried() {
        let store = MemoryStore::new();
        let mut calls = 0;

        let err = retry_read(5, || {
            calls += 1;
            let store: &dyn PickStore = &store;
            async move {
                store
                    .find_participant(uuid::Uuid::new_v4())
                    .await?
                    .ok_or(crate::error::EngineError::NotFound("Participant"))
            }
        })
        .await
        .unwrap_err();

        assert_eq!(err.kind(), "not_found");
        assert_eq!(calls, 1);
    }
}
