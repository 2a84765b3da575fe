//! Ingredient repository contract and SQLite implementation.
//!
//! # Invariants
//! - `nom` is unique under Unicode lower-casing (`nom_key`); violations
//!   surface as `UniquenessConflict { "nom" }`.
//! - Foods using an ingredient are found through the association table,
//!   never through a field on the ingredient.

use crate::db::casefold;
use crate::error::{map_unique_violation, CatalogError, CatalogResult};
use crate::model::ingredient::{Ingredient, NewIngredient, TypeIngredient};
use crate::model::{now_epoch_ms, trimmed_opt, EntityKind, IngredientId};
use crate::repo::{ensure_connection_ready, query_all, query_optional};
use crate::search::filter::Filter;
use rusqlite::{params, Connection, Row};

pub(crate) const INGREDIENT_SELECT_SQL: &str = "SELECT
    id,
    nom,
    description,
    type,
    valeur_nutritionnelle,
    date_creation
FROM ingredients";

/// Repository interface for Ingredient records.
pub trait IngredientRepository {
    fn create_ingredient(&self, ingredient: &NewIngredient) -> CatalogResult<Ingredient>;
    /// Replaces every mutable field; `date_creation` is preserved.
    fn update_ingredient(
        &self,
        id: IngredientId,
        ingredient: &NewIngredient,
    ) -> CatalogResult<Ingredient>;
    fn get_ingredient(&self, id: IngredientId) -> CatalogResult<Option<Ingredient>>;
    /// Returns `false` when no row had this id.
    fn delete_ingredient(&self, id: IngredientId) -> CatalogResult<bool>;
    fn list_ingredients(&self) -> CatalogResult<Vec<Ingredient>>;
    fn search_ingredients(&self, filter: &Filter) -> CatalogResult<Vec<Ingredient>>;
}

/// SQLite-backed Ingredient repository.
pub struct SqliteIngredientRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteIngredientRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> CatalogResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn on_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl IngredientRepository for SqliteIngredientRepository<'_> {
    fn create_ingredient(&self, ingredient: &NewIngredient) -> CatalogResult<Ingredient> {
        let kind = ingredient.validate()?;

        self.conn
            .execute(
                "INSERT INTO ingredients (
                    nom,
                    nom_key,
                    description,
                    type,
                    valeur_nutritionnelle,
                    date_creation
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    ingredient.nom.trim(),
                    casefold(ingredient.nom.trim()),
                    trimmed_opt(ingredient.description.as_deref()),
                    kind.as_str(),
                    trimmed_opt(ingredient.valeur_nutritionnelle.as_deref()),
                    now_epoch_ms(),
                ],
            )
            .map_err(|err| map_unique_violation(err, "nom"))?;

        load_required(self.conn, self.conn.last_insert_rowid())
    }

    fn update_ingredient(
        &self,
        id: IngredientId,
        ingredient: &NewIngredient,
    ) -> CatalogResult<Ingredient> {
        let kind = ingredient.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE ingredients
                 SET
                    nom = ?2,
                    nom_key = ?3,
                    description = ?4,
                    type = ?5,
                    valeur_nutritionnelle = ?6
                 WHERE id = ?1;",
                params![
                    id,
                    ingredient.nom.trim(),
                    casefold(ingredient.nom.trim()),
                    trimmed_opt(ingredient.description.as_deref()),
                    kind.as_str(),
                    trimmed_opt(ingredient.valeur_nutritionnelle.as_deref()),
                ],
            )
            .map_err(|err| map_unique_violation(err, "nom"))?;

        if changed == 0 {
            return Err(CatalogError::NotFound {
                kind: EntityKind::Ingredient,
                id,
            });
        }
        load_required(self.conn, id)
    }

    fn get_ingredient(&self, id: IngredientId) -> CatalogResult<Option<Ingredient>> {
        query_optional(
            self.conn,
            &format!("{INGREDIENT_SELECT_SQL} WHERE id = ?1;"),
            id,
            parse_ingredient_row,
        )
    }

    fn delete_ingredient(&self, id: IngredientId) -> CatalogResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM ingredients WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn list_ingredients(&self) -> CatalogResult<Vec<Ingredient>> {
        self.search_ingredients(&Filter::all())
    }

    fn search_ingredients(&self, filter: &Filter) -> CatalogResult<Vec<Ingredient>> {
        let (where_sql, bind_values) = filter.to_where_sql();
        query_all(
            self.conn,
            &format!("{INGREDIENT_SELECT_SQL}{where_sql} ORDER BY id ASC;"),
            bind_values,
            parse_ingredient_row,
        )
    }
}

fn load_required(conn: &Connection, id: IngredientId) -> CatalogResult<Ingredient> {
    SqliteIngredientRepository::on_ready(conn)
        .get_ingredient(id)?
        .ok_or(CatalogError::NotFound {
            kind: EntityKind::Ingredient,
            id,
        })
}

pub(crate) fn parse_ingredient_row(row: &Row<'_>) -> CatalogResult<Ingredient> {
    let type_text: String = row.get("type")?;
    let kind = TypeIngredient::parse(&type_text).ok_or_else(|| {
        CatalogError::InvalidData(format!("invalid type `{type_text}` in ingredients.type"))
    })?;

    Ok(Ingredient {
        id: row.get("id")?,
        nom: row.get("nom")?,
        description: row.get("description")?,
        kind,
        valeur_nutritionnelle: row.get("valeur_nutritionnelle")?,
        date_creation: row.get("date_creation")?,
    })
}
