/// Database connection and migration tests
pub mod db_tests;


/// Transaction handling tests
pub mod transaction_tests;

use sea_orm::DatabaseConnection;
use migration::MigratorTrait;

use crate::db::{connect_with_config, DatabaseConfig};

/// Fresh migrated database: `TEST_DATABASE_URL` when set, otherwise in-memory sqlite.
pub(crate) async fn setup_test_db() -> anyhow::Result<DatabaseConnection> {
    let url = std::env::var("TEST_DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    let cfg = DatabaseConfig { url, max_connections: 5, min_connections: 1, ..Default::default() };
    let db = connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
