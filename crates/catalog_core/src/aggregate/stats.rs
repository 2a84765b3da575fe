//! Store-backed aggregate views over the catalog.
//!
//! # Invariants
//! - Every operation is read-only.
//! - Recency rankings: timestamp descending, then id descending.
//! - Size ranking: `taille` descending, then id ascending.
//! - `total_image_storage` is `0` for an empty catalog.

use crate::aggregate::ranking::{counts_for_all, rank_by_count, Ranked, VariantCount};
use crate::error::{CatalogError, CatalogResult};
use crate::model::food::{Categorie, Food};
use crate::model::image::Image;
use crate::model::ingredient::{Ingredient, TypeIngredient};
use crate::model::personne::Personne;
use crate::model::{EntityKind, FoodId, IngredientId};
use crate::repo::food_repo::{parse_food_row, FoodRepository, SqliteFoodRepository, FOOD_SELECT_SQL};
use crate::repo::image_repo::{parse_image_row, IMAGE_SELECT_SQL};
use crate::repo::ingredient_repo::{IngredientRepository, SqliteIngredientRepository};
use crate::repo::personne_repo::{parse_personne_row, PERSONNE_SELECT_SQL};
use crate::repo::{ensure_connection_ready, limit_value, query_all};
use rusqlite::types::Value;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// Row counts and storage total for the whole catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSummary {
    pub personnes: u64,
    pub foods: u64,
    pub ingredients: u64,
    pub associations: u64,
    pub images: u64,
    pub total_image_storage: i64,
}

/// Read-only aggregation engine bound to one connection.
pub struct CatalogStats<'conn> {
    conn: &'conn Connection,
}

impl<'conn> CatalogStats<'conn> {
    /// Creates the engine from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> CatalogResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn on_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Ingredients ranked by number of foods using them.
    ///
    /// Ingredients used by no food are not listed.
    pub fn most_used_ingredients(&self, top: Option<u32>) -> CatalogResult<Vec<Ranked<Ingredient>>> {
        let ranked = rank_by_count(self.association_column("ingredient_id")?, top);
        let repo = SqliteIngredientRepository::on_ready(self.conn);
        ranked
            .into_iter()
            .map(|entry| -> CatalogResult<Ranked<Ingredient>> {
                let id: IngredientId = entry.item;
                let ingredient = repo.get_ingredient(id)?.ok_or(CatalogError::NotFound {
                    kind: EntityKind::Ingredient,
                    id,
                })?;
                Ok(entry.map(|_| ingredient))
            })
            .collect()
    }

    /// Foods ranked by number of ingredients they use.
    ///
    /// Foods without ingredients are not listed.
    pub fn foods_with_most_ingredients(&self, top: Option<u32>) -> CatalogResult<Vec<Ranked<Food>>> {
        let ranked = rank_by_count(self.association_column("food_id")?, top);
        let repo = SqliteFoodRepository::on_ready(self.conn);
        ranked
            .into_iter()
            .map(|entry| -> CatalogResult<Ranked<Food>> {
                let id: FoodId = entry.item;
                let food = repo.get_food(id)?.ok_or(CatalogError::NotFound {
                    kind: EntityKind::Food,
                    id,
                })?;
                Ok(entry.map(|_| food))
            })
            .collect()
    }

    pub fn recent_personnes(&self, limit: Option<u32>) -> CatalogResult<Vec<Personne>> {
        query_all(
            self.conn,
            &format!("{PERSONNE_SELECT_SQL} ORDER BY date_creation DESC, id DESC LIMIT ?;"),
            vec![Value::Integer(limit_value(limit))],
            parse_personne_row,
        )
    }

    pub fn recent_foods(&self, limit: Option<u32>) -> CatalogResult<Vec<Food>> {
        query_all(
            self.conn,
            &format!("{FOOD_SELECT_SQL} ORDER BY date_creation DESC, id DESC LIMIT ?;"),
            vec![Value::Integer(limit_value(limit))],
            parse_food_row,
        )
    }

    pub fn recent_images(&self, limit: Option<u32>) -> CatalogResult<Vec<Image>> {
        query_all(
            self.conn,
            &format!("{IMAGE_SELECT_SQL} ORDER BY date_upload DESC, id DESC LIMIT ?;"),
            vec![Value::Integer(limit_value(limit))],
            parse_image_row,
        )
    }

    pub fn largest_images(&self, limit: Option<u32>) -> CatalogResult<Vec<Image>> {
        query_all(
            self.conn,
            &format!("{IMAGE_SELECT_SQL} ORDER BY taille DESC, id ASC LIMIT ?;"),
            vec![Value::Integer(limit_value(limit))],
            parse_image_row,
        )
    }

    /// Sum of every image byte size.
    pub fn total_image_storage(&self) -> CatalogResult<i64> {
        let total = self.conn.query_row(
            "SELECT COALESCE(SUM(taille), 0) FROM images;",
            [],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// Food count per category, one entry per category.
    pub fn count_foods_by_categorie(&self) -> CatalogResult<Vec<VariantCount<Categorie>>> {
        let counted = self.grouped_counts("foods", "categorie", Categorie::parse)?;
        Ok(counts_for_all(&Categorie::ALL, counted))
    }

    /// Ingredient count per type, one entry per type.
    pub fn count_ingredients_by_type(&self) -> CatalogResult<Vec<VariantCount<TypeIngredient>>> {
        let counted = self.grouped_counts("ingredients", "type", TypeIngredient::parse)?;
        Ok(counts_for_all(&TypeIngredient::ALL, counted))
    }

    pub fn catalog_summary(&self) -> CatalogResult<CatalogSummary> {
        Ok(CatalogSummary {
            personnes: self.row_count("personnes")?,
            foods: self.row_count("foods")?,
            ingredients: self.row_count("ingredients")?,
            associations: self.row_count("food_ingredients")?,
            images: self.row_count("images")?,
            total_image_storage: self.total_image_storage()?,
        })
    }

    fn association_column(&self, column: &'static str) -> CatalogResult<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {column} FROM food_ingredients;"))?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    fn grouped_counts<V>(
        &self,
        table: &'static str,
        column: &'static str,
        parse: fn(&str) -> Option<V>,
    ) -> CatalogResult<Vec<(V, u64)>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {column}, COUNT(*) FROM {table} GROUP BY {column};"
        ))?;
        let mut rows = stmt.query([])?;
        let mut counted = Vec::new();
        while let Some(row) = rows.next()? {
            let text: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            let variant = parse(&text).ok_or_else(|| {
                CatalogError::InvalidData(format!("invalid value `{text}` in {table}.{column}"))
            })?;
            counted.push((variant, count.unsigned_abs()));
        }
        Ok(counted)
    }

    fn row_count(&self, table: &'static str) -> CatalogResult<u64> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
                row.get(0)
            })?;
        Ok(count.unsigned_abs())
    }
}
