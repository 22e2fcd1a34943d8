//! Database configuration module.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL. Creation is
//! idempotent, which lets `serve` and `seed` call it on every start. `check` uses
//! [`connect_read_only`] and never writes.

use crate::entities::{
    Favorite, Inquiry, Property, PropertyView, SystemState, UserProfile, Viewing,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Directory holding the file of a `sqlite://` URL, if it names one.
fn sqlite_parent_dir(database_url: &str) -> Option<&Path> {
    let path = database_url.strip_prefix("sqlite://")?;
    let path = path.split('?').next().unwrap_or(path);
    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

/// Establishes a connection to the database at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database");
    Database::connect(database_url).await.map_err(Into::into)
}

/// The same URL with any `SQLite` `mode` replaced by `mode=ro`. Other backends are untouched.
fn read_only_url(database_url: &str) -> String {
    if !database_url.starts_with("sqlite://") {
        return database_url.to_string();
    }
    let (base, query) = database_url.split_once('?').unwrap_or((database_url, ""));
    let mut params: Vec<&str> = query
        .split('&')
        .filter(|p| !p.is_empty() && !p.starts_with("mode="))
        .collect();
    params.push("mode=ro");
    format!("{base}?{}", params.join("&"))
}

/// Connects without creating anything: no directory, no database file, no tables.
/// A file-backed `SQLite` store is opened read-only.
pub async fn connect_read_only(database_url: &str) -> Result<DatabaseConnection> {
    create_connection(&read_only_url(database_url)).await
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables that do not exist yet.
///
/// Parent tables come first so the foreign keys on child tables resolve.
#[instrument(skip(db))]
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Property).await?;
    create_table(db, &schema, PropertyView).await?;
    create_table(db, &schema, Inquiry).await?;
    create_table(db, &schema, Viewing).await?;
    create_table(db, &schema, Favorite).await?;
    create_table(db, &schema, UserProfile).await?;
    create_table(db, &schema, SystemState).await?;

    info!("Database tables ensured");
    Ok(())
}

/// Connects and makes sure the schema exists, creating the directory of a file-backed
/// `SQLite` store first. Used by `serve` and `seed`.
pub async fn init_database(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(dir) = sqlite_parent_dir(database_url) {
        std::fs::create_dir_all(dir)?;
    }
    let db = create_connection(database_url).await?;
    create_tables(&db).await?;
    Ok(db)
}
