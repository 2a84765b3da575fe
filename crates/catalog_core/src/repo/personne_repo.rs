//! Personne repository contract and SQLite implementation.
//!
//! # Invariants
//! - `email` is unique under Unicode lower-casing (`email_key`); violations
//!   surface as `UniquenessConflict { "email" }` and leave the existing row
//!   untouched.
//! - `date_creation` is written by `create_personne` only.

use crate::db::casefold;
use crate::error::{map_unique_violation, CatalogError, CatalogResult};
use crate::model::personne::{NewPersonne, Personne};
use crate::model::{now_epoch_ms, trimmed_opt, EntityKind, PersonneId};
use crate::repo::{ensure_connection_ready, query_all, query_optional};
use crate::search::filter::Filter;
use rusqlite::{params, Connection, Row};

pub(crate) const PERSONNE_SELECT_SQL: &str = "SELECT
    id,
    nom,
    prenom,
    email,
    date_naissance,
    telephone,
    date_creation
FROM personnes";

/// Repository interface for Personne records.
pub trait PersonneRepository {
    fn create_personne(&self, personne: &NewPersonne) -> CatalogResult<Personne>;
    /// Replaces every mutable field; `date_creation` is preserved.
    fn update_personne(&self, id: PersonneId, personne: &NewPersonne) -> CatalogResult<Personne>;
    fn get_personne(&self, id: PersonneId) -> CatalogResult<Option<Personne>>;
    /// Returns `false` when no row had this id.
    fn delete_personne(&self, id: PersonneId) -> CatalogResult<bool>;
    fn list_personnes(&self) -> CatalogResult<Vec<Personne>>;
    fn search_personnes(&self, filter: &Filter) -> CatalogResult<Vec<Personne>>;
}

/// SQLite-backed Personne repository.
pub struct SqlitePersonneRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonneRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> CatalogResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn on_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PersonneRepository for SqlitePersonneRepository<'_> {
    fn create_personne(&self, personne: &NewPersonne) -> CatalogResult<Personne> {
        personne.validate()?;

        self.conn
            .execute(
                "INSERT INTO personnes (
                    nom,
                    prenom,
                    email,
                    email_key,
                    date_naissance,
                    telephone,
                    date_creation
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    personne.nom.trim(),
                    personne.prenom.trim(),
                    personne.email.trim(),
                    casefold(personne.email.trim()),
                    personne.date_naissance,
                    trimmed_opt(personne.telephone.as_deref()),
                    now_epoch_ms(),
                ],
            )
            .map_err(|err| map_unique_violation(err, "email"))?;

        load_required(self.conn, self.conn.last_insert_rowid())
    }

    fn update_personne(&self, id: PersonneId, personne: &NewPersonne) -> CatalogResult<Personne> {
        personne.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE personnes
                 SET
                    nom = ?2,
                    prenom = ?3,
                    email = ?4,
                    email_key = ?5,
                    date_naissance = ?6,
                    telephone = ?7
                 WHERE id = ?1;",
                params![
                    id,
                    personne.nom.trim(),
                    personne.prenom.trim(),
                    personne.email.trim(),
                    casefold(personne.email.trim()),
                    personne.date_naissance,
                    trimmed_opt(personne.telephone.as_deref()),
                ],
            )
            .map_err(|err| map_unique_violation(err, "email"))?;

        if changed == 0 {
            return Err(CatalogError::NotFound {
                kind: EntityKind::Personne,
                id,
            });
        }
        load_required(self.conn, id)
    }

    fn get_personne(&self, id: PersonneId) -> CatalogResult<Option<Personne>> {
        query_optional(
            self.conn,
            &format!("{PERSONNE_SELECT_SQL} WHERE id = ?1;"),
            id,
            parse_personne_row,
        )
    }

    fn delete_personne(&self, id: PersonneId) -> CatalogResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM personnes WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn list_personnes(&self) -> CatalogResult<Vec<Personne>> {
        self.search_personnes(&Filter::all())
    }

    fn search_personnes(&self, filter: &Filter) -> CatalogResult<Vec<Personne>> {
        let (where_sql, bind_values) = filter.to_where_sql();
        query_all(
            self.conn,
            &format!("{PERSONNE_SELECT_SQL}{where_sql} ORDER BY id ASC;"),
            bind_values,
            parse_personne_row,
        )
    }
}

fn load_required(conn: &Connection, id: PersonneId) -> CatalogResult<Personne> {
    SqlitePersonneRepository::on_ready(conn)
        .get_personne(id)?
        .ok_or(CatalogError::NotFound {
            kind: EntityKind::Personne,
            id,
        })
}

pub(crate) fn parse_personne_row(row: &Row<'_>) -> CatalogResult<Personne> {
    Ok(Personne {
        id: row.get("id")?,
        nom: row.get("nom")?,
        prenom: row.get("prenom")?,
        email: row.get("email")?,
        date_naissance: row.get("date_naissance")?,
        telephone: row.get("telephone")?,
        date_creation: row.get("date_creation")?,
    })
}
