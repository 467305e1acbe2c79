//! Transaction plumbing shared by the domain services
//!
//! A [`TransactionProvider`] hands out [`TransactionHandle`]s (a pooled
//! PostgreSQL transaction in production, an in-memory one in tests). Services
//! never drive a handle directly: they open a [`TransactionScope`], bind their
//! repository calls to [`TransactionScope::handle`], and pass the outcome to
//! [`TransactionScope::finish`], which commits or rolls back exactly once.
//!
//! A scope that is dropped before `finish` (request cancelled, panic unwinding)
//! drops its handle, and handles roll back when dropped while still open.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, warn};

use crate::error::{DatabaseError, DatabaseResult};

/// An open unit of work that ends in exactly one commit or rollback.
///
/// Implementations must roll back when dropped while still open.
#[async_trait]
pub trait TransactionHandle: Send + Sized {
    /// Make every write performed through this handle durable
    async fn commit(self) -> DatabaseResult<()>;

    /// Discard every write performed through this handle
    async fn rollback(self) -> DatabaseResult<()>;
}

/// Source of transactions, a connection pool or a single connection
#[async_trait]
pub trait TransactionProvider: Send + Sync {
    type Tx: TransactionHandle;

    /// Open a new transaction
    async fn begin(&self) -> DatabaseResult<Self::Tx>;
}

#[async_trait]
impl TransactionProvider for PgPool {
    type Tx = Transaction<'static, Postgres>;

    async fn begin(&self) -> DatabaseResult<Self::Tx> {
        PgPool::begin(self).await.map_err(DatabaseError::Transaction)
    }
}

#[async_trait]
impl TransactionHandle for Transaction<'static, Postgres> {
    async fn commit(self) -> DatabaseResult<()> {
        Transaction::commit(self)
            .await
            .map_err(DatabaseError::Transaction)
    }

    async fn rollback(self) -> DatabaseResult<()> {
        Transaction::rollback(self)
            .await
            .map_err(DatabaseError::Transaction)
    }
}

/// A transaction bound to the lifetime of a single service operation
pub struct TransactionScope<T: TransactionHandle> {
    tx: T,
}

impl<T: TransactionHandle> TransactionScope<T> {
    /// Open a scope on a fresh transaction from `provider`
    pub async fn begin<P>(provider: &P) -> DatabaseResult<Self>
    where
        P: TransactionProvider<Tx = T> + ?Sized,
    {
        let tx = provider.begin().await?;
        debug!("Transaction opened");
        Ok(Self { tx })
    }

    /// The handle repository calls are bound to
    pub fn handle(&mut self) -> &mut T {
        &mut self.tx
    }

    /// End the scope according to `outcome`.
    ///
    /// `Ok` commits; a commit failure is returned as the operation's error.
    /// `Err` rolls back and returns the original error even when the rollback
    /// itself fails (the rollback failure is only logged).
    pub async fn finish<R, E>(self, outcome: Result<R, E>) -> Result<R, E>
    where
        E: From<DatabaseError>,
    {
        match outcome {
            Ok(value) => {
                self.tx.commit().await?;
                debug!("Transaction committed");
                Ok(value)
            }
            Err(err) => {
                match self.tx.rollback().await {
                    Ok(()) => debug!("Transaction rolled back"),
                    Err(rollback_err) => {
                        warn!(error = %rollback_err, "Transaction rollback failed");
                    }
                }
                Err(err)
            }
        }
    }
}
