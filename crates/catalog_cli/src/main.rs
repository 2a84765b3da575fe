//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `catalog_core` linkage and configuration loading.
//! - When `CATALOG_DB_PATH` is set, open that catalog and print its summary.

use catalog_core::{init_logging_from_config, open_db, CatalogConfig, CatalogService};
use log::error;
use std::process::ExitCode;

fn main() -> ExitCode {
    // A missing `.env` file is fine; the process environment still applies.
    dotenvy::dotenv().ok();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_run module=cli status=error error={message}");
            eprintln!("catalog_cli error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = CatalogConfig::from_env().map_err(|err| err.to_string())?;
    init_logging_from_config(&config)?;

    println!("catalog_core ping={}", catalog_core::ping());
    println!("catalog_core version={}", catalog_core::core_version());

    let Some(db_path) = config.db_path.as_deref() else {
        return Ok(());
    };
    let conn = open_db(db_path).map_err(|err| err.to_string())?;
    let service = CatalogService::from_config(&conn, &config).map_err(|err| err.to_string())?;
    let summary = service.catalog_summary().map_err(|err| err.to_string())?;

    println!(
        "catalog personnes={} foods={} ingredients={} associations={} images={} storage_bytes={}",
        summary.personnes,
        summary.foods,
        summary.ingredients,
        summary.associations,
        summary.images,
        summary.total_image_storage
    );
    Ok(())
}
