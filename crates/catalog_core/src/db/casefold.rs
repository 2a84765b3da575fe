//! Unicode case folding shared by SQL and Rust.
//!
//! # Invariants
//! - `lower_unicode(x)` in SQL and [`casefold`] in Rust produce the same text,
//!   so stored keys and search needles compare consistently.
//! - SQLite's built-in `lower()`, `LIKE` and `NOCASE` fold ASCII only; catalog
//!   text comparisons go through this module instead.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

/// Name of the SQL scalar registered by [`register_lower_unicode`].
pub(crate) const LOWER_UNICODE_FN: &str = "lower_unicode";

/// Lower-cases `text` with full Unicode rules.
pub(crate) fn casefold(text: &str) -> String {
    text.to_lowercase()
}

/// Registers `lower_unicode(text)` on `conn`. `NULL` maps to `NULL`.
pub(crate) fn register_lower_unicode(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        LOWER_UNICODE_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|text| casefold(&text)))
        },
    )
}
