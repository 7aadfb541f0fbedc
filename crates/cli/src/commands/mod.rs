//! CLI subcommand implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use sqlx::SqlitePool;

use shopfront_storefront::{config, db};

use self::migrate::MigrationError;

/// Open the shop database and bring its schema up to date.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or migrated.
pub async fn connect() -> Result<SqlitePool, MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = config::database_url_from_env();

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    db::migrate(&pool).await?;

    Ok(pool)
}
