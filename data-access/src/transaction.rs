//! Transaction boundary and error mapping
//!
//! Multi-step operations run through [`with_transaction`]: the operation gets
//! a live `rusqlite::Transaction`, the transaction commits when it returns
//! `Ok` and rolls back on `Err`. A panic inside the operation drops the
//! transaction, which also rolls back.

use history_store_core::*;
use rusqlite::{ErrorCode, Transaction};
use tokio_rusqlite::Connection;
use tracing::warn;

/// Run `op` inside a transaction on a synchronous connection
pub fn with_transaction<T, F>(
    conn: &mut rusqlite::Connection,
    label: &str,
    op: F,
) -> rusqlite::Result<T>
where
    F: FnOnce(&Transaction<'_>) -> rusqlite::Result<T>,
{
    let tx = conn.transaction()?;

    match op(&tx) {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(e) => {
            warn!(operation = label, error = %e, "Rolling back transaction");
            if let Err(rollback_err) = tx.rollback() {
                warn!(operation = label, error = %rollback_err, "Rollback failed");
            }
            Err(e)
        }
    }
}

/// Run `op` inside a transaction on the connection thread
pub async fn run_in_transaction<T, F>(connection: &Connection, label: &'static str, op: F) -> Result<T>
where
    F: FnOnce(&Transaction<'_>) -> rusqlite::Result<T> + Send + 'static,
    T: Send + 'static,
{
    connection
        .call(move |conn| Ok(with_transaction(conn, label, op)?))
        .await
        .map_err(|e| store_error(label, e))
}

/// Run a single-statement `op` on the connection thread
pub async fn run<T, F>(connection: &Connection, label: &'static str, op: F) -> Result<T>
where
    F: FnOnce(&rusqlite::Connection) -> rusqlite::Result<T> + Send + 'static,
    T: Send + 'static,
{
    connection
        .call(move |conn| Ok(op(conn)?))
        .await
        .map_err(|e| store_error(label, e))
}

/// Map a driver error onto the store error taxonomy
pub fn store_error(operation: &str, err: tokio_rusqlite::Error) -> HistoryStoreError {
    match err {
        tokio_rusqlite::Error::Rusqlite(e) => sqlite_error(operation, e),
        tokio_rusqlite::Error::ConnectionClosed => StoreError::ConnectionClosed.into(),
        other => StoreError::Query {
            details: format!("{}: {}", operation, other),
        }
        .into(),
    }
}

/// Map a rusqlite error, singling out constraint failures
pub fn sqlite_error(operation: &str, err: rusqlite::Error) -> HistoryStoreError {
    let details = format!("{}: {}", operation, err);
    match err {
        rusqlite::Error::SqliteFailure(ref failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            StoreError::ConstraintViolation { details }.into()
        }
        _ => StoreError::Query { details }.into(),
    }
}
