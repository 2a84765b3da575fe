//! Personne (author) model.
//!
//! # Invariants
//! - `email` is unique across the catalog, compared case-insensitively.
//! - `date_creation` is set once when the row is created.

use crate::error::{CatalogError, CatalogResult};
use crate::model::{require_text, PersonneId};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));
static TELEPHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 .\-()]{5,19}$").expect("valid telephone regex"));

/// Persisted author record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personne {
    pub id: PersonneId,
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub date_naissance: Option<NaiveDate>,
    pub telephone: Option<String>,
    /// Unix epoch milliseconds.
    pub date_creation: i64,
}

/// Creation (and full-replacement update) record for a Personne.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPersonne {
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub date_naissance: Option<NaiveDate>,
    pub telephone: Option<String>,
}

impl NewPersonne {
    pub fn new(
        nom: impl Into<String>,
        prenom: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            nom: nom.into(),
            prenom: prenom.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    /// Checks required fields and formats.
    pub fn validate(&self) -> CatalogResult<()> {
        require_text("nom", &self.nom)?;
        require_text("prenom", &self.prenom)?;
        require_text("email", &self.email)?;
        if !EMAIL_RE.is_match(self.email.trim()) {
            return Err(CatalogError::validation(
                "email",
                "must look like an email address",
            ));
        }
        if let Some(telephone) = self.telephone.as_deref().map(str::trim) {
            if !telephone.is_empty() && !TELEPHONE_RE.is_match(telephone) {
                return Err(CatalogError::validation(
                    "telephone",
                    "must contain 6 to 20 digits or separators",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::NewPersonne;
    use crate::error::CatalogError;

    #[test]
    fn validate_accepts_minimal_record() {
        NewPersonne::new("Durand", "Alice", "a@x.com")
            .validate()
            .unwrap();
    }

    #[test]
    fn validate_rejects_malformed_email() {
        let err = NewPersonne::new("Durand", "Alice", "not-an-email")
            .validate()
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation { field: "email", .. }));
    }

    #[test]
    fn validate_checks_telephone_only_when_present() {
        let mut personne = NewPersonne::new("Durand", "Alice", "a@x.com");
        personne.telephone = Some("+33 6 12 34 56 78".to_string());
        personne.validate().unwrap();

        personne.telephone = Some("call me".to_string());
        let err = personne.validate().unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Validation {
                field: "telephone",
                ..
            }
        ));
    }
}
