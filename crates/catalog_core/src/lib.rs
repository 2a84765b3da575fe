//! Core domain logic for the food catalog.
//! This crate is the single source of truth for catalog invariants.

pub mod aggregate;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use aggregate::ranking::{Ranked, VariantCount};
pub use aggregate::stats::{CatalogStats, CatalogSummary};
pub use config::{CatalogConfig, PersonneDeletePolicy};
pub use db::{open_db, open_db_in_memory, DbError};
pub use error::{CatalogError, CatalogResult};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::association::FoodIngredient;
pub use model::food::{Categorie, Food, NewFood};
pub use model::image::{Image, NewImage};
pub use model::ingredient::{Ingredient, NewIngredient, TypeIngredient};
pub use model::personne::{NewPersonne, Personne};
pub use model::{EntityKind, FoodId, ImageId, IngredientId, PersonneId};
pub use search::criteria::{
    Criteria, FoodCriteria, ImageCriteria, IngredientCriteria, PersonneCriteria,
};
pub use search::filter::Filter;
pub use service::catalog_service::CatalogService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
