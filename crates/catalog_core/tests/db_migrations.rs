use catalog_core::db::migrations::{apply_migrations, latest_version};
use catalog_core::db::{open_db, open_db_in_memory, DbError};
use catalog_core::{CatalogError, CatalogService, PersonneDeletePolicy};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in [
        "personnes",
        "foods",
        "ingredients",
        "food_ingredients",
        "images",
    ] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn opened_connections_enforce_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);

    let err = conn
        .execute(
            "INSERT INTO food_ingredients (food_id, ingredient_id, quantite_utilisee, unite)
             VALUES (1, 1, 2.0, 'g');",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().contains("FOREIGN KEY"));
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "images");
}

#[test]
fn version_one_database_is_upgraded_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("v1.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(include_str!("../src/db/migrations/0001_init.sql"))
        .unwrap();
    conn.execute_batch("PRAGMA user_version = 1;").unwrap();
    conn.execute(
        "INSERT INTO personnes (nom, prenom, email, date_creation)
         VALUES ('Durand', 'Élodie', ' ÉLODIE@Exemple.fr ', 1);",
        [],
    )
    .unwrap();
    drop(conn);

    let mut conn = Connection::open(&path).unwrap();
    apply_migrations(&mut conn).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "images");

    let personnes: i64 = conn
        .query_row("SELECT COUNT(*) FROM personnes;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(personnes, 1);

    let email_key: String = conn
        .query_row("SELECT email_key FROM personnes;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(email_key, "élodie@exemple.fr");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn service_rejects_connection_missing_a_table() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE images;").unwrap();

    let err = CatalogService::try_new(&conn, PersonneDeletePolicy::Cascade)
        .err()
        .expect("missing table must be reported");
    assert!(matches!(err, CatalogError::MissingRequiredTable("images")));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
