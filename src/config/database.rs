//! Database configuration module.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the unique invoice number and the
//! cascading line-item foreign key come straight from the entity attributes.

use crate::entities::{Invoice, LineItem};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Default database location, created on first use.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/invoices.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling back
/// to the given configured value.
#[must_use]
pub fn get_database_url(configured: &str) -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| configured.to_string())
}

/// Returns the file path of a file-backed `SQLite` URL, or `None` for in-memory databases.
#[must_use]
pub fn sqlite_file_path(database_url: &str) -> Option<&Path> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Some(Path::new(path))
}

/// Connects to the database, creating the parent directory of a file-backed `SQLite`
/// database first so a fresh checkout can start without manual setup.
#[instrument]
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(parent) = sqlite_file_path(database_url).and_then(Path::parent) {
        if !parent.as_os_str().is_empty() {
            debug!("Ensuring database directory {:?} exists", parent);
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = Database::connect(database_url).await?;
    info!("Database connection opened");
    Ok(db)
}

/// Creates the `invoices` and `line_items` tables if they do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut invoice_table = schema.create_table_from_entity(Invoice);
    let mut line_item_table = schema.create_table_from_entity(LineItem);

    invoice_table.if_not_exists();
    line_item_table.if_not_exists();

    db.execute(builder.build(&invoice_table)).await?;
    db.execute(builder.build(&line_item_table)).await?;

    debug!("Invoice tables ensured");
    Ok(())
}

/// Connects and ensures the schema in one step.
pub async fn init_db(database_url: &str) -> Result<DatabaseConnection> {
    let db = connect(database_url).await?;
    create_tables(&db).await?;
    Ok(db)
}
