//! Image metadata model.
//!
//! Image bytes live in external storage; only `chemin` points at them.
//!
//! # Invariants
//! - An image belongs to a Food, to an Ingredient, or to nothing (orphan),
//!   never to both.
//! - `taille` is a byte count and never negative.
//! - `date_upload` is set once when the row is created.

use crate::error::{CatalogError, CatalogResult};
use crate::model::{require_text, FoodId, ImageId, IngredientId};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static MIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)[a-z]+/[a-z0-9][a-z0-9.+\-]*$").expect("valid mime type regex")
});

/// Persisted image metadata record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: ImageId,
    pub nom_fichier: String,
    pub chemin: String,
    pub type_mime: String,
    /// Byte size.
    pub taille: i64,
    pub description: Option<String>,
    /// Unix epoch milliseconds, immutable after creation.
    pub date_upload: i64,
    pub food_id: Option<FoodId>,
    pub ingredient_id: Option<IngredientId>,
}

/// Creation record for an Image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewImage {
    pub nom_fichier: String,
    pub chemin: String,
    pub type_mime: String,
    pub taille: i64,
    pub description: Option<String>,
    pub food_id: Option<FoodId>,
    pub ingredient_id: Option<IngredientId>,
}

impl NewImage {
    pub fn new(
        nom_fichier: impl Into<String>,
        chemin: impl Into<String>,
        type_mime: impl Into<String>,
        taille: i64,
    ) -> Self {
        Self {
            nom_fichier: nom_fichier.into(),
            chemin: chemin.into(),
            type_mime: type_mime.into(),
            taille,
            ..Self::default()
        }
    }

    /// Attaches the image to a Food.
    pub fn for_food(mut self, food_id: FoodId) -> Self {
        self.food_id = Some(food_id);
        self
    }

    /// Attaches the image to an Ingredient.
    pub fn for_ingredient(mut self, ingredient_id: IngredientId) -> Self {
        self.ingredient_id = Some(ingredient_id);
        self
    }

    pub fn validate(&self) -> CatalogResult<()> {
        require_text("nom_fichier", &self.nom_fichier)?;
        require_text("chemin", &self.chemin)?;
        require_text("type_mime", &self.type_mime)?;
        if !MIME_RE.is_match(self.type_mime.trim()) {
            return Err(CatalogError::validation(
                "type_mime",
                "must look like `type/subtype`",
            ));
        }
        if self.taille < 0 {
            return Err(CatalogError::validation("taille", "must not be negative"));
        }
        if self.food_id.is_some() && self.ingredient_id.is_some() {
            return Err(CatalogError::validation(
                "ingredient_id",
                "an image belongs to a food or an ingredient, not both",
            ));
        }
        Ok(())
    }
}
