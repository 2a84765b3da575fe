//! Food repository contract and SQLite implementation.
//!
//! # Invariants
//! - `personne_id`, when set, must reference an existing Personne at write
//!   time (`ReferenceNotFound` otherwise).
//! - `date_creation` is written by `create_food` only.
//! - Deleting a Food row never touches its associations or images; callers
//!   clean those up first (see `CatalogService::delete_food`).

use crate::error::{CatalogError, CatalogResult};
use crate::model::food::{Categorie, Food, NewFood};
use crate::model::{now_epoch_ms, trimmed_opt, EntityKind, FoodId, PersonneId};
use crate::repo::{ensure_connection_ready, query_all, query_optional, row_exists};
use crate::search::filter::Filter;
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};

pub(crate) const FOOD_SELECT_SQL: &str = "SELECT
    id,
    nom,
    description,
    categorie,
    calories,
    date_creation,
    personne_id
FROM foods";

/// Repository interface for Food records.
pub trait FoodRepository {
    fn create_food(&self, food: &NewFood) -> CatalogResult<Food>;
    /// Replaces every mutable field; `date_creation` is preserved.
    fn update_food(&self, id: FoodId, food: &NewFood) -> CatalogResult<Food>;
    fn get_food(&self, id: FoodId) -> CatalogResult<Option<Food>>;
    /// Returns `false` when no row had this id.
    fn delete_food(&self, id: FoodId) -> CatalogResult<bool>;
    fn list_foods(&self) -> CatalogResult<Vec<Food>>;
    fn search_foods(&self, filter: &Filter) -> CatalogResult<Vec<Food>>;
    /// Ids of foods owned by one Personne, ascending.
    fn food_ids_for_personne(&self, personne_id: PersonneId) -> CatalogResult<Vec<FoodId>>;
}

/// SQLite-backed Food repository.
pub struct SqliteFoodRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFoodRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> CatalogResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn on_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn ensure_owner_exists(&self, personne_id: Option<PersonneId>) -> CatalogResult<()> {
        if let Some(id) = personne_id {
            if !row_exists(self.conn, "personnes", id)? {
                return Err(CatalogError::ReferenceNotFound {
                    kind: EntityKind::Personne,
                    id,
                });
            }
        }
        Ok(())
    }
}

impl FoodRepository for SqliteFoodRepository<'_> {
    fn create_food(&self, food: &NewFood) -> CatalogResult<Food> {
        let categorie = food.validate()?;
        self.ensure_owner_exists(food.personne_id)?;

        self.conn.execute(
            "INSERT INTO foods (
                nom,
                description,
                categorie,
                calories,
                date_creation,
                personne_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                food.nom.trim(),
                trimmed_opt(food.description.as_deref()),
                categorie.as_str(),
                food.calories,
                now_epoch_ms(),
                food.personne_id,
            ],
        )?;

        load_required(self.conn, self.conn.last_insert_rowid())
    }

    fn update_food(&self, id: FoodId, food: &NewFood) -> CatalogResult<Food> {
        let categorie = food.validate()?;
        self.ensure_owner_exists(food.personne_id)?;

        let changed = self.conn.execute(
            "UPDATE foods
             SET
                nom = ?2,
                description = ?3,
                categorie = ?4,
                calories = ?5,
                personne_id = ?6
             WHERE id = ?1;",
            params![
                id,
                food.nom.trim(),
                trimmed_opt(food.description.as_deref()),
                categorie.as_str(),
                food.calories,
                food.personne_id,
            ],
        )?;

        if changed == 0 {
            return Err(CatalogError::NotFound {
                kind: EntityKind::Food,
                id,
            });
        }
        load_required(self.conn, id)
    }

    fn get_food(&self, id: FoodId) -> CatalogResult<Option<Food>> {
        query_optional(
            self.conn,
            &format!("{FOOD_SELECT_SQL} WHERE id = ?1;"),
            id,
            parse_food_row,
        )
    }

    fn delete_food(&self, id: FoodId) -> CatalogResult<bool> {
        let changed = self.conn.execute("DELETE FROM foods WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn list_foods(&self) -> CatalogResult<Vec<Food>> {
        self.search_foods(&Filter::all())
    }

    fn search_foods(&self, filter: &Filter) -> CatalogResult<Vec<Food>> {
        let (where_sql, bind_values) = filter.to_where_sql();
        query_all(
            self.conn,
            &format!("{FOOD_SELECT_SQL}{where_sql} ORDER BY id ASC;"),
            bind_values,
            parse_food_row,
        )
    }

    fn food_ids_for_personne(&self, personne_id: PersonneId) -> CatalogResult<Vec<FoodId>> {
        query_all(
            self.conn,
            "SELECT id FROM foods WHERE personne_id = ?1 ORDER BY id ASC;",
            vec![Value::Integer(personne_id)],
            |row| Ok(row.get(0)?),
        )
    }
}

fn load_required(conn: &Connection, id: FoodId) -> CatalogResult<Food> {
    SqliteFoodRepository::on_ready(conn)
        .get_food(id)?
        .ok_or(CatalogError::NotFound {
            kind: EntityKind::Food,
            id,
        })
}

pub(crate) fn parse_food_row(row: &Row<'_>) -> CatalogResult<Food> {
    let categorie_text: String = row.get("categorie")?;
    let categorie = Categorie::parse(&categorie_text).ok_or_else(|| {
        CatalogError::InvalidData(format!(
            "invalid categorie `{categorie_text}` in foods.categorie"
        ))
    })?;

    Ok(Food {
        id: row.get("id")?,
        nom: row.get("nom")?,
        description: row.get("description")?,
        categorie,
        calories: row.get("calories")?,
        date_creation: row.get("date_creation")?,
        personne_id: row.get("personne_id")?,
    })
}
