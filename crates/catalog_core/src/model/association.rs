//! Food↔Ingredient association record.
//!
//! # Invariants
//! - At most one row exists per `(food_id, ingredient_id)` pair.
//! - `quantite_utilisee` is positive and `unite` is non-blank.

use crate::error::CatalogResult;
use crate::model::{require_positive, require_text, FoodId, IngredientId};
use serde::{Deserialize, Serialize};

/// "This Food uses this Ingredient in this quantity/unit."
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodIngredient {
    pub food_id: FoodId,
    pub ingredient_id: IngredientId,
    pub quantite_utilisee: f64,
    pub unite: String,
}

pub(crate) fn validate_usage(quantite_utilisee: f64, unite: &str) -> CatalogResult<()> {
    require_positive("quantite_utilisee", quantite_utilisee)?;
    require_text("unite", unite)
}
