//! Food↔Ingredient association repository.
//!
//! # Responsibility
//! - Own the `food_ingredients` table: upsert, remove, listings, existence.
//! - Provide bulk cleanup used before a Food or Ingredient row is deleted.
//!
//! # Invariants
//! - At most one row per `(food_id, ingredient_id)`; upsert overwrites the
//!   quantity and unit in place and keeps the original insertion position.
//! - Both referenced rows are checked before writing, inside one immediate
//!   transaction.
//! - Listings are ordered by insertion (`rowid ASC`).

use crate::db::in_transaction;
use crate::error::{CatalogError, CatalogResult};
use crate::model::association::{validate_usage, FoodIngredient};
use crate::model::{EntityKind, FoodId, IngredientId};
use crate::repo::{ensure_connection_ready, query_all, row_exists};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};

const ASSOCIATION_SELECT_SQL: &str = "SELECT
    food_id,
    ingredient_id,
    quantite_utilisee,
    unite
FROM food_ingredients";

/// Repository interface for Food↔Ingredient associations.
pub trait AssociationRepository {
    /// Creates or overwrites the association for one pair.
    fn upsert(
        &self,
        food_id: FoodId,
        ingredient_id: IngredientId,
        quantite_utilisee: f64,
        unite: &str,
    ) -> CatalogResult<FoodIngredient>;
    /// Removes one pair; returns `false` when it did not exist.
    fn remove(&self, food_id: FoodId, ingredient_id: IngredientId) -> CatalogResult<bool>;
    /// Removes every association of one Food; returns the number removed.
    fn remove_all_for_food(&self, food_id: FoodId) -> CatalogResult<usize>;
    /// Removes every association of one Ingredient; returns the number removed.
    fn remove_all_for_ingredient(&self, ingredient_id: IngredientId) -> CatalogResult<usize>;
    fn list_for_food(&self, food_id: FoodId) -> CatalogResult<Vec<FoodIngredient>>;
    fn list_for_ingredient(&self, ingredient_id: IngredientId)
        -> CatalogResult<Vec<FoodIngredient>>;
    fn list_all(&self) -> CatalogResult<Vec<FoodIngredient>>;
    fn exists(&self, food_id: FoodId, ingredient_id: IngredientId) -> CatalogResult<bool>;
}

/// SQLite-backed association repository.
pub struct SqliteAssociationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAssociationRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> CatalogResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn on_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AssociationRepository for SqliteAssociationRepository<'_> {
    fn upsert(
        &self,
        food_id: FoodId,
        ingredient_id: IngredientId,
        quantite_utilisee: f64,
        unite: &str,
    ) -> CatalogResult<FoodIngredient> {
        validate_usage(quantite_utilisee, unite)?;
        let unite = unite.trim();

        in_transaction(self.conn, |tx| {
            if !row_exists(tx, "foods", food_id)? {
                return Err(CatalogError::ReferenceNotFound {
                    kind: EntityKind::Food,
                    id: food_id,
                });
            }
            if !row_exists(tx, "ingredients", ingredient_id)? {
                return Err(CatalogError::ReferenceNotFound {
                    kind: EntityKind::Ingredient,
                    id: ingredient_id,
                });
            }

            tx.execute(
                "INSERT INTO food_ingredients (
                    food_id,
                    ingredient_id,
                    quantite_utilisee,
                    unite
                ) VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT (food_id, ingredient_id) DO UPDATE SET
                    quantite_utilisee = excluded.quantite_utilisee,
                    unite = excluded.unite;",
                params![food_id, ingredient_id, quantite_utilisee, unite],
            )?;
            Ok(())
        })?;

        debug!(
            "event=association_upsert module=repo status=ok food_id={food_id} ingredient_id={ingredient_id}"
        );
        Ok(FoodIngredient {
            food_id,
            ingredient_id,
            quantite_utilisee,
            unite: unite.to_string(),
        })
    }

    fn remove(&self, food_id: FoodId, ingredient_id: IngredientId) -> CatalogResult<bool> {
        let removed = self.conn.execute(
            "DELETE FROM food_ingredients WHERE food_id = ?1 AND ingredient_id = ?2;",
            [food_id, ingredient_id],
        )?;
        Ok(removed > 0)
    }

    fn remove_all_for_food(&self, food_id: FoodId) -> CatalogResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM food_ingredients WHERE food_id = ?1;", [food_id])?;
        Ok(removed)
    }

    fn remove_all_for_ingredient(&self, ingredient_id: IngredientId) -> CatalogResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM food_ingredients WHERE ingredient_id = ?1;",
            [ingredient_id],
        )?;
        Ok(removed)
    }

    fn list_for_food(&self, food_id: FoodId) -> CatalogResult<Vec<FoodIngredient>> {
        query_all(
            self.conn,
            &format!("{ASSOCIATION_SELECT_SQL} WHERE food_id = ?1 ORDER BY rowid ASC;"),
            vec![Value::Integer(food_id)],
            parse_association_row,
        )
    }

    fn list_for_ingredient(
        &self,
        ingredient_id: IngredientId,
    ) -> CatalogResult<Vec<FoodIngredient>> {
        query_all(
            self.conn,
            &format!("{ASSOCIATION_SELECT_SQL} WHERE ingredient_id = ?1 ORDER BY rowid ASC;"),
            vec![Value::Integer(ingredient_id)],
            parse_association_row,
        )
    }

    fn list_all(&self) -> CatalogResult<Vec<FoodIngredient>> {
        query_all(
            self.conn,
            &format!("{ASSOCIATION_SELECT_SQL} ORDER BY rowid ASC;"),
            Vec::new(),
            parse_association_row,
        )
    }

    fn exists(&self, food_id: FoodId, ingredient_id: IngredientId) -> CatalogResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM food_ingredients
                WHERE food_id = ?1 AND ingredient_id = ?2
            );",
            [food_id, ingredient_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

fn parse_association_row(row: &Row<'_>) -> CatalogResult<FoodIngredient> {
    Ok(FoodIngredient {
        food_id: row.get("food_id")?,
        ingredient_id: row.get("ingredient_id")?,
        quantite_utilisee: row.get("quantite_utilisee")?,
        unite: row.get("unite")?,
    })
}
