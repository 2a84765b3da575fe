//! Image metadata repository contract and SQLite implementation.
//!
//! # Invariants
//! - The owning Food or Ingredient, when set, must exist at write time.
//! - Deleting a Food deletes its images; deleting an Ingredient only detaches
//!   its images, leaving them as orphans.

use crate::error::{CatalogError, CatalogResult};
use crate::model::image::{Image, NewImage};
use crate::model::{now_epoch_ms, trimmed_opt, EntityKind, FoodId, ImageId, IngredientId};
use crate::repo::{ensure_connection_ready, query_all, query_optional, row_exists};
use crate::search::filter::{Clause, Filter};
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};

pub(crate) const IMAGE_SELECT_SQL: &str = "SELECT
    id,
    nom_fichier,
    chemin,
    type_mime,
    taille,
    description,
    date_upload,
    food_id,
    ingredient_id
FROM images";

/// Repository interface for Image records.
pub trait ImageRepository {
    fn create_image(&self, image: &NewImage) -> CatalogResult<Image>;
    fn get_image(&self, id: ImageId) -> CatalogResult<Option<Image>>;
    /// Returns `false` when no row had this id.
    fn delete_image(&self, id: ImageId) -> CatalogResult<bool>;
    /// Deletes every image owned by one Food; returns the number removed.
    fn delete_images_for_food(&self, food_id: FoodId) -> CatalogResult<usize>;
    /// Clears the owner of every image attached to one Ingredient.
    fn detach_images_from_ingredient(&self, ingredient_id: IngredientId) -> CatalogResult<usize>;
    fn list_images_for_food(&self, food_id: FoodId) -> CatalogResult<Vec<Image>>;
    fn list_images(&self) -> CatalogResult<Vec<Image>>;
    fn search_images(&self, filter: &Filter) -> CatalogResult<Vec<Image>>;
}

/// SQLite-backed Image repository.
pub struct SqliteImageRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteImageRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> CatalogResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn on_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ImageRepository for SqliteImageRepository<'_> {
    fn create_image(&self, image: &NewImage) -> CatalogResult<Image> {
        image.validate()?;
        if let Some(id) = image.food_id {
            if !row_exists(self.conn, "foods", id)? {
                return Err(CatalogError::ReferenceNotFound {
                    kind: EntityKind::Food,
                    id,
                });
            }
        }
        if let Some(id) = image.ingredient_id {
            if !row_exists(self.conn, "ingredients", id)? {
                return Err(CatalogError::ReferenceNotFound {
                    kind: EntityKind::Ingredient,
                    id,
                });
            }
        }

        self.conn.execute(
            "INSERT INTO images (
                nom_fichier,
                chemin,
                type_mime,
                taille,
                description,
                date_upload,
                food_id,
                ingredient_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                image.nom_fichier.trim(),
                image.chemin.trim(),
                image.type_mime.trim().to_ascii_lowercase(),
                image.taille,
                trimmed_opt(image.description.as_deref()),
                now_epoch_ms(),
                image.food_id,
                image.ingredient_id,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_image(id)?.ok_or(CatalogError::NotFound {
            kind: EntityKind::Image,
            id,
        })
    }

    fn get_image(&self, id: ImageId) -> CatalogResult<Option<Image>> {
        query_optional(
            self.conn,
            &format!("{IMAGE_SELECT_SQL} WHERE id = ?1;"),
            id,
            parse_image_row,
        )
    }

    fn delete_image(&self, id: ImageId) -> CatalogResult<bool> {
        let changed = self.conn.execute("DELETE FROM images WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn delete_images_for_food(&self, food_id: FoodId) -> CatalogResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM images WHERE food_id = ?1;", [food_id])?;
        Ok(removed)
    }

    fn detach_images_from_ingredient(&self, ingredient_id: IngredientId) -> CatalogResult<usize> {
        let detached = self.conn.execute(
            "UPDATE images SET ingredient_id = NULL WHERE ingredient_id = ?1;",
            [ingredient_id],
        )?;
        Ok(detached)
    }

    fn list_images_for_food(&self, food_id: FoodId) -> CatalogResult<Vec<Image>> {
        self.search_images(&Filter::all().and(Clause::Equals {
            column: "food_id",
            value: Value::Integer(food_id),
        }))
    }

    fn list_images(&self) -> CatalogResult<Vec<Image>> {
        self.search_images(&Filter::all())
    }

    fn search_images(&self, filter: &Filter) -> CatalogResult<Vec<Image>> {
        let (where_sql, bind_values) = filter.to_where_sql();
        query_all(
            self.conn,
            &format!("{IMAGE_SELECT_SQL}{where_sql} ORDER BY id ASC;"),
            bind_values,
            parse_image_row,
        )
    }
}

pub(crate) fn parse_image_row(row: &Row<'_>) -> CatalogResult<Image> {
    Ok(Image {
        id: row.get("id")?,
        nom_fichier: row.get("nom_fichier")?,
        chemin: row.get("chemin")?,
        type_mime: row.get("type_mime")?,
        taille: row.get("taille")?,
        description: row.get("description")?,
        date_upload: row.get("date_upload")?,
        food_id: row.get("food_id")?,
        ingredient_id: row.get("ingredient_id")?,
    })
}
