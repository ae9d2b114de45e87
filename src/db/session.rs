//! Scoped session acquisition with commit/rollback and retry.
//!
//! Sessions are per-request transactions. Acquisition retries transient
//! failures up to a fixed bound, rebuilding the process-wide engine after the
//! first failure; cloud-hosted connections go stale and a pool that keeps
//! reusing them reconnects to dead sockets.

use futures::future::BoxFuture;
use sqlx::{Any, AnyConnection, Transaction};
use tracing::{error, warn};

use crate::db::engine::Db;
use crate::error::RolodexError;

const MAX_ATTEMPTS: u32 = 3;

impl Db {
    /// Run `op` inside a fresh unit-of-work session.
    ///
    /// Commits after `op` returns `Ok`, rolls back and propagates the
    /// original error otherwise. The session is released on every exit path;
    /// a dropped transaction rolls back on its own. Exhausting the retry
    /// bound surfaces the last acquisition error to the caller, which is
    /// expected to render a degraded page.
    pub async fn with_session<T, F>(&self, op: F) -> Result<T, RolodexError>
    where
        F: for<'t> FnOnce(&'t mut AnyConnection) -> BoxFuture<'t, Result<T, RolodexError>>,
    {
        let mut tx = self.acquire_session().await?;
        match op(&mut *tx).await {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rb) = tx.rollback().await {
                    warn!(error = %rb, "session rollback failed");
                }
                Err(err)
            }
        }
    }

    async fn acquire_session(&self) -> Result<Transaction<'static, Any>, RolodexError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.begin_probed().await {
                Ok(tx) => return Ok(tx),
                Err(err) => {
                    if attempt >= MAX_ATTEMPTS {
                        error!(
                            attempts = attempt,
                            error = %err,
                            "session acquisition failed, giving up"
                        );
                        return Err(err.into());
                    }
                    warn!(attempt, error = %err, "session acquisition failed, retrying");
                    if attempt == 1 {
                        self.rebuild();
                    }
                }
            }
        }
    }

    /// Begin a transaction and verify liveness with a no-op round trip,
    /// catching stale pooled connections before the caller touches them.
    async fn begin_probed(&self) -> Result<Transaction<'static, Any>, sqlx::Error> {
        let engine = self.engine();
        let mut tx = engine.pool.begin().await?;
        sqlx::query("SELECT 1").execute(&mut *tx).await?;
        Ok(tx)
    }
}
