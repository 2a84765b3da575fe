//! Repository layer: entity store contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define per-entity data access contracts (create, get, update, delete,
//!   list, search by [`Filter`](crate::search::filter::Filter)).
//! - Own the Food↔Ingredient association table and its cleanup operations.
//! - Isolate SQLite query details from the catalog facade.
//!
//! # Invariants
//! - Write paths validate creation records and referenced identifiers before
//!   any SQL mutation.
//! - Deleting an absent identifier is a no-op reported as `Ok(false)`.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_user_version, latest_version};
use crate::error::{CatalogError, CatalogResult};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};

pub mod association_repo;
pub mod food_repo;
pub mod image_repo;
pub mod ingredient_repo;
pub mod personne_repo;

/// Tables every catalog repository expects after migrations.
pub(crate) const CATALOG_TABLES: [&str; 5] = [
    "personnes",
    "foods",
    "ingredients",
    "food_ingredients",
    "images",
];

/// Verifies that `conn` is migrated to the latest schema.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> CatalogResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(CatalogError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in CATALOG_TABLES {
        if !table_exists(conn, table)? {
            return Err(CatalogError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> CatalogResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Returns whether `table` holds a row with primary key `id`.
pub(crate) fn row_exists(conn: &Connection, table: &'static str, id: i64) -> CatalogResult<bool> {
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1);"),
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// SQLite `LIMIT` value for an optional bound; `-1` means unbounded.
pub(crate) fn limit_value(limit: Option<u32>) -> i64 {
    limit.map_or(-1, i64::from)
}

/// Runs `sql` with positional binds and parses every row.
pub(crate) fn query_all<T>(
    conn: &Connection,
    sql: &str,
    bind_values: Vec<Value>,
    parse: fn(&Row<'_>) -> CatalogResult<T>,
) -> CatalogResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse(row)?);
    }
    Ok(items)
}

/// Runs `sql` expecting at most one row.
pub(crate) fn query_optional<T>(
    conn: &Connection,
    sql: &str,
    id: i64,
    parse: fn(&Row<'_>) -> CatalogResult<T>,
) -> CatalogResult<Option<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse(row)?));
    }
    Ok(None)
}
