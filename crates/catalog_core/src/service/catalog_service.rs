//! Catalog facade.
//!
//! # Responsibility
//! - Single entry point for creation, update, search and deletion of catalog
//!   records.
//! - Sequence compound deletes inside one transaction.
//! - Expose association and aggregation views.
//!
//! # Invariants
//! - Creation records are validated before any store access.
//! - `delete_food`, `delete_ingredient` and `delete_personne` either apply
//!   every cleanup step or none.
//! - Deleting an absent id is a no-op reported as `Ok(false)`.

use crate::aggregate::ranking::{Ranked, VariantCount};
use crate::aggregate::stats::{CatalogStats, CatalogSummary};
use crate::config::{CatalogConfig, PersonneDeletePolicy};
use crate::db::in_transaction;
use crate::error::{CatalogError, CatalogResult};
use crate::model::association::FoodIngredient;
use crate::model::food::{Categorie, Food, NewFood};
use crate::model::image::{Image, NewImage};
use crate::model::ingredient::{Ingredient, NewIngredient, TypeIngredient};
use crate::model::personne::{NewPersonne, Personne};
use crate::model::{EntityKind, FoodId, ImageId, IngredientId, PersonneId};
use crate::repo::association_repo::{AssociationRepository, SqliteAssociationRepository};
use crate::repo::ensure_connection_ready;
use crate::repo::food_repo::{FoodRepository, SqliteFoodRepository};
use crate::repo::image_repo::{ImageRepository, SqliteImageRepository};
use crate::repo::ingredient_repo::{IngredientRepository, SqliteIngredientRepository};
use crate::repo::personne_repo::{PersonneRepository, SqlitePersonneRepository};
use crate::search::criteria::{
    Criteria, FoodCriteria, ImageCriteria, IngredientCriteria, PersonneCriteria,
};
use log::{info, warn};
use rusqlite::Connection;

/// Rows removed alongside one Food.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FoodCleanup {
    removed: bool,
    associations: usize,
    images: usize,
}

/// Catalog facade bound to one migrated connection.
pub struct CatalogService<'conn> {
    conn: &'conn Connection,
    personne_delete_policy: PersonneDeletePolicy,
}

impl<'conn> CatalogService<'conn> {
    /// Creates the facade with an explicit Personne delete policy.
    pub fn try_new(
        conn: &'conn Connection,
        personne_delete_policy: PersonneDeletePolicy,
    ) -> CatalogResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self {
            conn,
            personne_delete_policy,
        })
    }

    /// Creates the facade using the policy carried by `config`.
    pub fn from_config(conn: &'conn Connection, config: &CatalogConfig) -> CatalogResult<Self> {
        Self::try_new(conn, config.personne_delete_policy)
    }

    pub fn personne_delete_policy(&self) -> PersonneDeletePolicy {
        self.personne_delete_policy
    }

    fn personnes(&self) -> SqlitePersonneRepository<'conn> {
        SqlitePersonneRepository::on_ready(self.conn)
    }

    fn foods(&self) -> SqliteFoodRepository<'conn> {
        SqliteFoodRepository::on_ready(self.conn)
    }

    fn ingredients(&self) -> SqliteIngredientRepository<'conn> {
        SqliteIngredientRepository::on_ready(self.conn)
    }

    fn images(&self) -> SqliteImageRepository<'conn> {
        SqliteImageRepository::on_ready(self.conn)
    }

    fn associations(&self) -> SqliteAssociationRepository<'conn> {
        SqliteAssociationRepository::on_ready(self.conn)
    }

    fn stats(&self) -> CatalogStats<'conn> {
        CatalogStats::on_ready(self.conn)
    }

    // Personne

    pub fn create_personne(&self, personne: &NewPersonne) -> CatalogResult<Personne> {
        self.personnes().create_personne(personne)
    }

    pub fn get_personne(&self, id: PersonneId) -> CatalogResult<Option<Personne>> {
        self.personnes().get_personne(id)
    }

    /// Replaces mutable fields; `NotFound` when `id` is absent.
    pub fn update_personne(
        &self,
        id: PersonneId,
        personne: &NewPersonne,
    ) -> CatalogResult<Personne> {
        self.personnes().update_personne(id, personne)
    }

    pub fn list_personnes(&self) -> CatalogResult<Vec<Personne>> {
        self.personnes().list_personnes()
    }

    pub fn search_personnes(&self, criteria: &PersonneCriteria) -> CatalogResult<Vec<Personne>> {
        let filter = criteria.build()?;
        self.personnes().search_personnes(&filter)
    }

    /// Deletes one Personne according to the configured policy.
    ///
    /// `Cascade` removes every owned Food (with associations and images) in
    /// the same transaction. `Reject` fails with `HasDependents` while any
    /// Food is owned.
    pub fn delete_personne(&self, id: PersonneId) -> CatalogResult<bool> {
        let policy = self.personne_delete_policy;
        let result = in_transaction(self.conn, |tx| {
            let food_ids = SqliteFoodRepository::on_ready(tx).food_ids_for_personne(id)?;
            if policy == PersonneDeletePolicy::Reject && !food_ids.is_empty() {
                return Err(CatalogError::HasDependents {
                    kind: EntityKind::Personne,
                    id,
                });
            }

            let mut cleanup = FoodCleanup::default();
            for food_id in &food_ids {
                let removed = delete_food_rows(tx, *food_id)?;
                cleanup.associations += removed.associations;
                cleanup.images += removed.images;
            }
            let removed = SqlitePersonneRepository::on_ready(tx).delete_personne(id)?;
            Ok((removed, food_ids.len(), cleanup))
        });

        match result {
            Ok((removed, foods, cleanup)) => {
                info!(
                    "event=catalog_delete module=service status=ok kind=personne id={id} removed={removed} foods={foods} associations={} images={}",
                    cleanup.associations, cleanup.images
                );
                Ok(removed)
            }
            Err(err) => Err(log_delete_failure(EntityKind::Personne, id, err)),
        }
    }

    // Food

    pub fn create_food(&self, food: &NewFood) -> CatalogResult<Food> {
        self.foods().create_food(food)
    }

    pub fn get_food(&self, id: FoodId) -> CatalogResult<Option<Food>> {
        self.foods().get_food(id)
    }

    /// Replaces mutable fields; `NotFound` when `id` is absent.
    pub fn update_food(&self, id: FoodId, food: &NewFood) -> CatalogResult<Food> {
        self.foods().update_food(id, food)
    }

    pub fn list_foods(&self) -> CatalogResult<Vec<Food>> {
        self.foods().list_foods()
    }

    pub fn search_foods(&self, criteria: &FoodCriteria) -> CatalogResult<Vec<Food>> {
        let filter = criteria.build()?;
        self.foods().search_foods(&filter)
    }

    /// Deletes one Food with its associations and images.
    pub fn delete_food(&self, id: FoodId) -> CatalogResult<bool> {
        match in_transaction(self.conn, |tx| delete_food_rows(tx, id)) {
            Ok(cleanup) => {
                info!(
                    "event=catalog_delete module=service status=ok kind=food id={id} removed={} associations={} images={}",
                    cleanup.removed, cleanup.associations, cleanup.images
                );
                Ok(cleanup.removed)
            }
            Err(err) => Err(log_delete_failure(EntityKind::Food, id, err)),
        }
    }

    // Ingredient

    pub fn create_ingredient(&self, ingredient: &NewIngredient) -> CatalogResult<Ingredient> {
        self.ingredients().create_ingredient(ingredient)
    }

    pub fn get_ingredient(&self, id: IngredientId) -> CatalogResult<Option<Ingredient>> {
        self.ingredients().get_ingredient(id)
    }

    /// Replaces mutable fields; `NotFound` when `id` is absent.
    pub fn update_ingredient(
        &self,
        id: IngredientId,
        ingredient: &NewIngredient,
    ) -> CatalogResult<Ingredient> {
        self.ingredients().update_ingredient(id, ingredient)
    }

    pub fn list_ingredients(&self) -> CatalogResult<Vec<Ingredient>> {
        self.ingredients().list_ingredients()
    }

    pub fn search_ingredients(
        &self,
        criteria: &IngredientCriteria,
    ) -> CatalogResult<Vec<Ingredient>> {
        let filter = criteria.build()?;
        self.ingredients().search_ingredients(&filter)
    }

    /// Deletes one Ingredient, its associations, and detaches its images.
    ///
    /// Foods that used the ingredient are kept.
    pub fn delete_ingredient(&self, id: IngredientId) -> CatalogResult<bool> {
        let result = in_transaction(self.conn, |tx| {
            let associations =
                SqliteAssociationRepository::on_ready(tx).remove_all_for_ingredient(id)?;
            let detached = SqliteImageRepository::on_ready(tx).detach_images_from_ingredient(id)?;
            let removed = SqliteIngredientRepository::on_ready(tx).delete_ingredient(id)?;
            Ok((removed, associations, detached))
        });

        match result {
            Ok((removed, associations, detached)) => {
                info!(
                    "event=catalog_delete module=service status=ok kind=ingredient id={id} removed={removed} associations={associations} detached_images={detached}"
                );
                Ok(removed)
            }
            Err(err) => Err(log_delete_failure(EntityKind::Ingredient, id, err)),
        }
    }

    // Image

    pub fn create_image(&self, image: &NewImage) -> CatalogResult<Image> {
        self.images().create_image(image)
    }

    pub fn get_image(&self, id: ImageId) -> CatalogResult<Option<Image>> {
        self.images().get_image(id)
    }

    pub fn delete_image(&self, id: ImageId) -> CatalogResult<bool> {
        self.images().delete_image(id)
    }

    pub fn list_images(&self) -> CatalogResult<Vec<Image>> {
        self.images().list_images()
    }

    pub fn images_of_food(&self, food_id: FoodId) -> CatalogResult<Vec<Image>> {
        self.images().list_images_for_food(food_id)
    }

    pub fn search_images(&self, criteria: &ImageCriteria) -> CatalogResult<Vec<Image>> {
        let filter = criteria.build()?;
        self.images().search_images(&filter)
    }

    // Associations

    /// Adds `ingredient_id` to `food_id`, or overwrites quantity and unit.
    pub fn add_ingredient_to_food(
        &self,
        food_id: FoodId,
        ingredient_id: IngredientId,
        quantite_utilisee: f64,
        unite: &str,
    ) -> CatalogResult<FoodIngredient> {
        self.associations()
            .upsert(food_id, ingredient_id, quantite_utilisee, unite)
    }

    /// Returns `false` when the pair was not associated.
    pub fn remove_ingredient_from_food(
        &self,
        food_id: FoodId,
        ingredient_id: IngredientId,
    ) -> CatalogResult<bool> {
        self.associations().remove(food_id, ingredient_id)
    }

    pub fn ingredients_of_food(&self, food_id: FoodId) -> CatalogResult<Vec<FoodIngredient>> {
        self.associations().list_for_food(food_id)
    }

    pub fn foods_using_ingredient(
        &self,
        ingredient_id: IngredientId,
    ) -> CatalogResult<Vec<FoodIngredient>> {
        self.associations().list_for_ingredient(ingredient_id)
    }

    pub fn food_uses_ingredient(
        &self,
        food_id: FoodId,
        ingredient_id: IngredientId,
    ) -> CatalogResult<bool> {
        self.associations().exists(food_id, ingredient_id)
    }

    // Aggregates

    pub fn most_used_ingredients(
        &self,
        top: Option<u32>,
    ) -> CatalogResult<Vec<Ranked<Ingredient>>> {
        self.stats().most_used_ingredients(top)
    }

    pub fn foods_with_most_ingredients(&self, top: Option<u32>) -> CatalogResult<Vec<Ranked<Food>>> {
        self.stats().foods_with_most_ingredients(top)
    }

    pub fn recent_personnes(&self, limit: Option<u32>) -> CatalogResult<Vec<Personne>> {
        self.stats().recent_personnes(limit)
    }

    pub fn recent_foods(&self, limit: Option<u32>) -> CatalogResult<Vec<Food>> {
        self.stats().recent_foods(limit)
    }

    pub fn recent_images(&self, limit: Option<u32>) -> CatalogResult<Vec<Image>> {
        self.stats().recent_images(limit)
    }

    pub fn largest_images(&self, limit: Option<u32>) -> CatalogResult<Vec<Image>> {
        self.stats().largest_images(limit)
    }

    pub fn total_image_storage(&self) -> CatalogResult<i64> {
        self.stats().total_image_storage()
    }

    pub fn count_foods_by_categorie(&self) -> CatalogResult<Vec<VariantCount<Categorie>>> {
        self.stats().count_foods_by_categorie()
    }

    pub fn count_ingredients_by_type(&self) -> CatalogResult<Vec<VariantCount<TypeIngredient>>> {
        self.stats().count_ingredients_by_type()
    }

    pub fn catalog_summary(&self) -> CatalogResult<CatalogSummary> {
        self.stats().catalog_summary()
    }
}

/// Removes associations, then images, then the Food row. Caller owns the
/// transaction.
fn delete_food_rows(conn: &Connection, id: FoodId) -> CatalogResult<FoodCleanup> {
    let associations = SqliteAssociationRepository::on_ready(conn).remove_all_for_food(id)?;
    let images = SqliteImageRepository::on_ready(conn).delete_images_for_food(id)?;
    let removed = SqliteFoodRepository::on_ready(conn).delete_food(id)?;
    Ok(FoodCleanup {
        removed,
        associations,
        images,
    })
}

fn log_delete_failure(kind: EntityKind, id: i64, err: CatalogError) -> CatalogError {
    warn!("event=catalog_delete module=service status=error kind={kind} id={id} error={err}");
    err
}

#[cfg(test)]
mod tests {
    use super::CatalogService;
    use crate::config::{CatalogConfig, PersonneDeletePolicy};
    use crate::db::open_db_in_memory;
    use crate::error::CatalogError;
    use rusqlite::Connection;

    #[test]
    fn from_config_carries_delete_policy() {
        let conn = open_db_in_memory().unwrap();
        let config = CatalogConfig {
            personne_delete_policy: PersonneDeletePolicy::Reject,
            ..CatalogConfig::default()
        };
        let service = CatalogService::from_config(&conn, &config).unwrap();
        assert_eq!(
            service.personne_delete_policy(),
            PersonneDeletePolicy::Reject
        );
    }

    #[test]
    fn unmigrated_connection_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        let err = CatalogService::try_new(&conn, PersonneDeletePolicy::Cascade)
            .err()
            .expect("raw connection must be rejected");
        assert!(matches!(
            err,
            CatalogError::UninitializedConnection {
                actual_version: 0,
                ..
            }
        ));
    }

    #[test]
    fn deleting_absent_rows_is_a_no_op() {
        let conn = open_db_in_memory().unwrap();
        let service = CatalogService::try_new(&conn, PersonneDeletePolicy::Cascade).unwrap();
        assert!(!service.delete_food(404).unwrap());
        assert!(!service.delete_ingredient(404).unwrap());
        assert!(!service.delete_personne(404).unwrap());
        assert!(!service.delete_image(404).unwrap());
    }
}
