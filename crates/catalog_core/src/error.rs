//! Error taxonomy shared by repositories, search and the catalog facade.
//!
//! # Invariants
//! - Validation and enum errors are raised before any store access.
//! - Store failures are propagated unchanged as `StoreUnavailable`.

use crate::db::DbError;
use crate::model::EntityKind;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Error returned by every catalog operation.
#[derive(Debug)]
pub enum CatalogError {
    /// Required field missing/blank or numeric field out of range.
    Validation {
        field: &'static str,
        reason: &'static str,
    },
    /// Enum field received a string that names no known variant.
    InvalidEnumValue { field: &'static str, value: String },
    /// Operation references an identifier absent from the store.
    ReferenceNotFound { kind: EntityKind, id: i64 },
    /// Write would violate a uniqueness rule.
    UniquenessConflict { field: &'static str },
    /// Delete blocked because dependent rows exist.
    HasDependents { kind: EntityKind, id: i64 },
    /// Update target does not exist.
    NotFound { kind: EntityKind, id: i64 },
    /// Underlying store call failed.
    StoreUnavailable(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation { field, reason } => write!(f, "invalid `{field}`: {reason}"),
            Self::InvalidEnumValue { field, value } => {
                write!(f, "invalid value `{value}` for enum field `{field}`")
            }
            Self::ReferenceNotFound { kind, id } => write!(f, "referenced {kind} not found: {id}"),
            Self::UniquenessConflict { field } => write!(f, "`{field}` is already in use"),
            Self::HasDependents { kind, id } => {
                write!(f, "{kind} {id} still has dependent rows")
            }
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::StoreUnavailable(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "catalog repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "catalog repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted catalog data: {message}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StoreUnavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for CatalogError {
    fn from(value: DbError) -> Self {
        Self::StoreUnavailable(value)
    }
}

impl From<rusqlite::Error> for CatalogError {
    fn from(value: rusqlite::Error) -> Self {
        Self::StoreUnavailable(DbError::Sqlite(value))
    }
}

impl CatalogError {
    pub(crate) fn validation(field: &'static str, reason: &'static str) -> Self {
        Self::Validation { field, reason }
    }

    pub(crate) fn invalid_enum(field: &'static str, value: &str) -> Self {
        Self::InvalidEnumValue {
            field,
            value: value.to_string(),
        }
    }
}

/// Maps a unique-constraint failure on `field` to `UniquenessConflict`.
///
/// Every other error is passed through as a store error.
pub(crate) fn map_unique_violation(err: rusqlite::Error, field: &'static str) -> CatalogError {
    if is_unique_violation(&err) {
        return CatalogError::UniquenessConflict { field };
    }
    err.into()
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        }
        _ => false,
    }
}
