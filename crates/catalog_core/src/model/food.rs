//! Food model and category enum.
//!
//! # Invariants
//! - `categorie` is always one of the fixed `Categorie` variants.
//! - `calories`, when set, is positive and finite.
//! - `personne_id` is a weak reference: a Food may be orphaned.

use crate::error::{CatalogError, CatalogResult};
use crate::model::{require_positive, require_text, FoodId, PersonneId};
use serde::{Deserialize, Serialize};

/// Fixed food category set, exchanged as upper-case canonical names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Categorie {
    Fruits,
    Legumes,
    Cereales,
    Proteines,
    ProduitsLaitiers,
}

impl Categorie {
    /// Every variant in declaration order.
    pub const ALL: [Categorie; 5] = [
        Categorie::Fruits,
        Categorie::Legumes,
        Categorie::Cereales,
        Categorie::Proteines,
        Categorie::ProduitsLaitiers,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fruits => "FRUITS",
            Self::Legumes => "LEGUMES",
            Self::Cereales => "CEREALES",
            Self::Proteines => "PROTEINES",
            Self::ProduitsLaitiers => "PRODUITS_LAITIERS",
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

/// Persisted food record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: FoodId,
    pub nom: String,
    pub description: Option<String>,
    pub categorie: Categorie,
    pub calories: Option<f64>,
    /// Unix epoch milliseconds, immutable after creation.
    pub date_creation: i64,
    pub personne_id: Option<PersonneId>,
}

/// Creation (and full-replacement update) record for a Food.
///
/// `categorie` carries the canonical string received at the boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewFood {
    pub nom: String,
    pub description: Option<String>,
    pub categorie: String,
    pub calories: Option<f64>,
    pub personne_id: Option<PersonneId>,
}

impl NewFood {
    pub fn new(nom: impl Into<String>, categorie: impl Into<String>) -> Self {
        Self {
            nom: nom.into(),
            categorie: categorie.into(),
            ..Self::default()
        }
    }

    /// Checks required fields and returns the parsed category.
    pub fn validate(&self) -> CatalogResult<Categorie> {
        require_text("nom", &self.nom)?;
        let categorie = Categorie::parse(&self.categorie)
            .ok_or_else(|| CatalogError::invalid_enum("categorie", &self.categorie))?;
        if let Some(calories) = self.calories {
            require_positive("calories", calories)?;
        }
        Ok(categorie)
    }
}

#[cfg(test)]
mod tests {
    use super::{Categorie, NewFood};
    use crate::error::CatalogError;

    #[test]
    fn categorie_parse_trims_and_requires_canonical_case() {
        assert_eq!(Categorie::parse("LEGUMES"), Some(Categorie::Legumes));
        assert_eq!(
            Categorie::parse(" PRODUITS_LAITIERS "),
            Some(Categorie::ProduitsLaitiers)
        );
        assert_eq!(Categorie::parse("legumes"), None);
        assert_eq!(Categorie::parse("VIANDES"), None);
    }

    #[test]
    fn validate_reports_unknown_categorie() {
        let err = NewFood::new("Soup", "SOUPES").validate().unwrap_err();
        match err {
            CatalogError::InvalidEnumValue { field, value } => {
                assert_eq!(field, "categorie");
                assert_eq!(value, "SOUPES");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn validate_rejects_non_positive_calories() {
        let mut food = NewFood::new("Soup", "LEGUMES");
        food.calories = Some(0.0);
        let err = food.validate().unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Validation {
                field: "calories",
                ..
            }
        ));
    }
}
