//! Transaction scoping for multi-statement catalog writes.
//!
//! # Invariants
//! - Work either commits as a whole or leaves no visible change.
//! - Inside a caller's transaction, work is scoped by a savepoint: a failure
//!   undoes only that work and leaves the outer transaction open.

use log::warn;
use rusqlite::{Connection, Transaction, TransactionBehavior};

const SAVEPOINT_NAME: &str = "catalog_op";

/// Runs `work` inside one `BEGIN IMMEDIATE` transaction on `conn`.
///
/// Any error returned by `work` drops the transaction, which rolls back every
/// statement issued so far. When `conn` is not in autocommit mode the outer
/// transaction owns the final commit and `work` runs under a savepoint that
/// is rolled back on error.
pub fn in_transaction<T, E, F>(conn: &Connection, work: F) -> Result<T, E>
where
    F: FnOnce(&Connection) -> Result<T, E>,
    E: From<rusqlite::Error>,
{
    if !conn.is_autocommit() {
        return in_savepoint(conn, work);
    }

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let value = work(&*tx)?;
    tx.commit()?;
    Ok(value)
}

fn in_savepoint<T, E, F>(conn: &Connection, work: F) -> Result<T, E>
where
    F: FnOnce(&Connection) -> Result<T, E>,
    E: From<rusqlite::Error>,
{
    conn.execute_batch(&format!("SAVEPOINT {SAVEPOINT_NAME};"))?;
    match work(conn) {
        Ok(value) => {
            conn.execute_batch(&format!("RELEASE {SAVEPOINT_NAME};"))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = conn.execute_batch(&format!(
                "ROLLBACK TO {SAVEPOINT_NAME}; RELEASE {SAVEPOINT_NAME};"
            )) {
                warn!(
                    "event=savepoint_rollback module=db status=error error={rollback_err}"
                );
            }
            Err(err)
        }
    }
}
