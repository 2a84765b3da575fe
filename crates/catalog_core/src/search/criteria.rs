//! Per-entity criteria records and their predicate builders.
//!
//! # Responsibility
//! - Turn all-optional criteria records into a conjunctive [`Filter`].
//! - Reject unknown enum strings before any store access.
//!
//! # Invariants
//! - Absent (or blank) fields add no clause; all-absent criteria match all rows.
//! - Range bounds compose independently; `max < min` is accepted and simply
//!   matches nothing.

use crate::error::{CatalogError, CatalogResult};
use crate::model::food::Categorie;
use crate::model::ingredient::TypeIngredient;
use crate::model::{trimmed_opt, FoodId, PersonneId};
use crate::search::filter::{Clause, Filter};
use chrono::NaiveDate;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

/// Builds a store filter from a criteria record.
pub trait Criteria {
    fn build(&self) -> CatalogResult<Filter>;
}

/// Food search criteria.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodCriteria {
    /// Case-insensitive substring of `nom`.
    pub nom: Option<String>,
    /// Canonical category name, exact match.
    pub categorie: Option<String>,
    pub calories_min: Option<f64>,
    pub calories_max: Option<f64>,
    pub personne_id: Option<PersonneId>,
}

impl Criteria for FoodCriteria {
    fn build(&self) -> CatalogResult<Filter> {
        let categorie = parse_enum(
            "categorie",
            self.categorie.as_deref(),
            Categorie::parse,
            Categorie::as_str,
        )?;
        let calories_min = finite("calories_min", self.calories_min)?;
        let calories_max = finite("calories_max", self.calories_max)?;

        Ok(Filter::all()
            .and_some(trimmed_opt(self.nom.as_deref()), |nom| contains("nom", nom))
            .and_some(categorie, |value| equals("categorie", Value::Text(value.into())))
            .and_some(calories_min, |min| Clause::AtLeast {
                column: "calories",
                value: Value::Real(min),
            })
            .and_some(calories_max, |max| Clause::AtMost {
                column: "calories",
                value: Value::Real(max),
            })
            .and_some(self.personne_id, |id| equals("personne_id", Value::Integer(id))))
    }
}

/// Ingredient search criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientCriteria {
    /// Canonical ingredient type name, exact match.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Case-insensitive substring of `nom`.
    pub nom: Option<String>,
}

impl Criteria for IngredientCriteria {
    fn build(&self) -> CatalogResult<Filter> {
        let kind = parse_enum(
            "type",
            self.kind.as_deref(),
            TypeIngredient::parse,
            TypeIngredient::as_str,
        )?;

        Ok(Filter::all()
            .and_some(kind, |value| equals("type", Value::Text(value.into())))
            .and_some(trimmed_opt(self.nom.as_deref()), |nom| contains("nom", nom)))
    }
}

/// Personne search criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonneCriteria {
    /// Case-insensitive substring of `nom`.
    pub nom: Option<String>,
    /// Case-insensitive substring of `email`.
    pub email: Option<String>,
    /// Inclusive lower bound on `date_naissance`.
    pub born_after: Option<NaiveDate>,
    /// Inclusive upper bound on `date_naissance`.
    pub born_before: Option<NaiveDate>,
}

impl Criteria for PersonneCriteria {
    fn build(&self) -> CatalogResult<Filter> {
        Ok(Filter::all()
            .and_some(trimmed_opt(self.nom.as_deref()), |nom| contains("nom", nom))
            .and_some(trimmed_opt(self.email.as_deref()), |email| {
                contains("email", email)
            })
            .and_some(self.born_after, |date| Clause::AtLeast {
                column: "date_naissance",
                value: date_value(date),
            })
            .and_some(self.born_before, |date| Clause::AtMost {
                column: "date_naissance",
                value: date_value(date),
            }))
    }
}

/// Image search criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCriteria {
    pub taille_min: Option<i64>,
    pub taille_max: Option<i64>,
    /// Inclusive lower bound on `date_upload`, epoch milliseconds.
    pub uploaded_after: Option<i64>,
    /// Inclusive upper bound on `date_upload`, epoch milliseconds.
    pub uploaded_before: Option<i64>,
    /// File extension (`png` or `.png`), case-insensitive suffix of `nom_fichier`.
    pub extension: Option<String>,
    pub food_id: Option<FoodId>,
}

impl Criteria for ImageCriteria {
    fn build(&self) -> CatalogResult<Filter> {
        let extension = trimmed_opt(self.extension.as_deref())
            .map(|ext| ext.trim_start_matches('.'))
            .filter(|ext| !ext.is_empty())
            .map(|ext| format!(".{ext}"));

        Ok(Filter::all()
            .and_some(self.taille_min, |min| Clause::AtLeast {
                column: "taille",
                value: Value::Integer(min),
            })
            .and_some(self.taille_max, |max| Clause::AtMost {
                column: "taille",
                value: Value::Integer(max),
            })
            .and_some(self.uploaded_after, |after| Clause::AtLeast {
                column: "date_upload",
                value: Value::Integer(after),
            })
            .and_some(self.uploaded_before, |before| Clause::AtMost {
                column: "date_upload",
                value: Value::Integer(before),
            })
            .and_some(extension, |suffix| Clause::EndsWith {
                column: "nom_fichier",
                suffix,
            })
            .and_some(self.food_id, |id| equals("food_id", Value::Integer(id))))
    }
}

fn contains(column: &'static str, needle: &str) -> Clause {
    Clause::Contains {
        column,
        needle: needle.to_string(),
    }
}

fn equals(column: &'static str, value: Value) -> Clause {
    Clause::Equals { column, value }
}

fn date_value(date: NaiveDate) -> Value {
    // Matches the `%F` text layout rusqlite uses to store `NaiveDate`.
    Value::Text(date.format("%F").to_string())
}

/// Parses an optional enum string into its canonical storage name.
fn parse_enum<E: Copy>(
    field: &'static str,
    raw: Option<&str>,
    parse: fn(&str) -> Option<E>,
    canonical: fn(E) -> &'static str,
) -> CatalogResult<Option<&'static str>> {
    match trimmed_opt(raw) {
        None => Ok(None),
        Some(value) => parse(value)
            .map(|variant| Some(canonical(variant)))
            .ok_or_else(|| CatalogError::invalid_enum(field, value)),
    }
}

fn finite(field: &'static str, value: Option<f64>) -> CatalogResult<Option<f64>> {
    match value {
        Some(number) if !number.is_finite() => Err(CatalogError::validation(
            field,
            "must be a finite number",
        )),
        other => Ok(other),
    }
}
