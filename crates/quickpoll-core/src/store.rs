use crate::error::CoreError;
use quickpoll_db::{DbError, DbPool};
use std::future::Future;
use std::time::Duration;

/// Database handle whose calls are bounded by a deadline.
#[derive(Clone, Debug)]
pub struct Store {
    pool: DbPool,
    timeout: Duration,
}

impl Store {
    pub fn new(pool: DbPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Await a store operation, giving up with [`CoreError::StoreTimeout`]
    /// once the deadline passes.
    pub async fn call<T, F>(&self, op: &'static str, fut: F) -> Result<T, CoreError>
    where
        F: Future<Output = Result<T, DbError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(CoreError::from),
            Err(_) => {
                tracing::warn!(
                    op,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "store call timed out"
                );
                Err(CoreError::StoreTimeout(op))
            }
        }
    }
}
