//! Catalog domain model.
//!
//! # Responsibility
//! - Define the entity records returned to callers.
//! - Define creation records and their validation rules.
//!
//! # Invariants
//! - Identifiers are assigned by the store and never reused.
//! - Creation timestamps are assigned once, by the creation operation.
//! - Ownership is one-directional: back references are queries, never fields.

use crate::error::{CatalogError, CatalogResult};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub mod association;
pub mod food;
pub mod image;
pub mod ingredient;
pub mod personne;

pub type PersonneId = i64;
pub type FoodId = i64;
pub type IngredientId = i64;
pub type ImageId = i64;

/// Entity kind named by reference and dependency errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Personne,
    Food,
    Ingredient,
    Image,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Personne => "personne",
            Self::Food => "food",
            Self::Ingredient => "ingredient",
            Self::Image => "image",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current time in Unix epoch milliseconds.
pub(crate) fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub(crate) fn require_text(field: &'static str, value: &str) -> CatalogResult<()> {
    if value.trim().is_empty() {
        return Err(CatalogError::validation(field, "must not be blank"));
    }
    Ok(())
}

pub(crate) fn require_positive(field: &'static str, value: f64) -> CatalogResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CatalogError::validation(
            field,
            "must be a positive finite number",
        ));
    }
    Ok(())
}

/// Trims an optional text field, mapping blank values to `None`.
pub(crate) fn trimmed_opt(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{require_positive, require_text, trimmed_opt};
    use crate::error::CatalogError;

    #[test]
    fn require_text_rejects_whitespace_only() {
        let err = require_text("nom", "   ").unwrap_err();
        assert!(matches!(err, CatalogError::Validation { field: "nom", .. }));
        require_text("nom", " Soup ").unwrap();
    }

    #[test]
    fn require_positive_rejects_zero_and_nan() {
        assert!(require_positive("calories", 0.0).is_err());
        assert!(require_positive("calories", -3.5).is_err());
        assert!(require_positive("calories", f64::NAN).is_err());
        require_positive("calories", 0.1).unwrap();
    }

    #[test]
    fn trimmed_opt_drops_blank_values() {
        assert_eq!(trimmed_opt(Some("  ")), None);
        assert_eq!(trimmed_opt(Some(" a ")), Some("a"));
        assert_eq!(trimmed_opt(None), None);
    }
}
