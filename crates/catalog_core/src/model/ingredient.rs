//! Ingredient model and ingredient type enum.
//!
//! # Invariants
//! - `nom` is unique across the catalog, compared case-insensitively.
//! - Food usage is never stored on the ingredient; it is queried from the
//!   association table.

use crate::error::{CatalogError, CatalogResult};
use crate::model::{require_text, IngredientId};
use serde::{Deserialize, Serialize};

/// Fixed ingredient type set, exchanged as upper-case canonical names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeIngredient {
    Naturel,
    Transforme,
    Synthetique,
}

impl TypeIngredient {
    /// Every variant in declaration order.
    pub const ALL: [TypeIngredient; 3] = [
        TypeIngredient::Naturel,
        TypeIngredient::Transforme,
        TypeIngredient::Synthetique,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Naturel => "NATUREL",
            Self::Transforme => "TRANSFORME",
            Self::Synthetique => "SYNTHETIQUE",
        }
    }

    /// Parses an exact canonical name; surrounding whitespace is ignored.
    pub fn parse(value: &str) -> Option<Self> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|variant| variant.as_str() == wanted)
    }
}

/// Persisted ingredient record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub nom: String,
    pub description: Option<String>,
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type")]
    pub kind: TypeIngredient,
    pub valeur_nutritionnelle: Option<String>,
    /// Unix epoch milliseconds.
    pub date_creation: i64,
}

/// Creation (and full-replacement update) record for an Ingredient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIngredient {
    pub nom: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub valeur_nutritionnelle: Option<String>,
}

impl NewIngredient {
    pub fn new(nom: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            nom: nom.into(),
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Checks required fields and returns the parsed ingredient type.
    pub fn validate(&self) -> CatalogResult<TypeIngredient> {
        require_text("nom", &self.nom)?;
        TypeIngredient::parse(&self.kind).ok_or_else(|| CatalogError::invalid_enum("type", &self.kind))
    }
}

#[cfg(test)]
mod tests {
    use super::{NewIngredient, TypeIngredient};
    use crate::error::CatalogError;

    #[test]
    fn validate_returns_parsed_type() {
        let kind = NewIngredient::new("Salt", " NATUREL ").validate().unwrap();
        assert_eq!(kind, TypeIngredient::Naturel);
    }

    #[test]
    fn validate_rejects_lower_case_type() {
        let err = NewIngredient::new("Salt", "naturel").validate().unwrap_err();
        assert!(matches!(
            err,
            CatalogError::InvalidEnumValue { field: "type", .. }
        ));
    }

    #[test]
    fn validate_checks_name_before_type() {
        let err = NewIngredient::new(" ", "UNKNOWN").validate().unwrap_err();
        assert!(matches!(err, CatalogError::Validation { field: "nom", .. }));
    }
}
