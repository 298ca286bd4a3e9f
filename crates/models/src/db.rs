use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

pub use configs::DatabaseConfig;

/// Connect with pool settings from `[database]`.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let db = Database::connect(connect_options(cfg)).await?;
    Ok(db)
}

pub fn connect_options(cfg: &DatabaseConfig) -> ConnectOptions {
    let mut opt = ConnectOptions::new(cfg.url.clone());
    // An in-memory sqlite database lives inside one connection.
    let (max, min) = if is_sqlite_memory(&cfg.url) { (1, 1) } else { (cfg.max_connections, cfg.min_connections) };
    opt.max_connections(max)
        .min_connections(min)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .sqlx_logging(cfg.sqlx_logging);
    if !is_sqlite_memory(&cfg.url) {
        opt.idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs));
    }
    opt
}

pub fn is_sqlite_memory(url: &str) -> bool {
    url.starts_with("sqlite:") && url.contains(":memory:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_in_memory_sqlite() {
        assert!(is_sqlite_memory("sqlite::memory:"));
        assert!(!is_sqlite_memory("sqlite://data/booking.db"));
        assert!(!is_sqlite_memory("postgres://localhost/booking"));
    }

    #[test]
    fn memory_pool_is_single_connection() {
        let cfg = DatabaseConfig { url: "sqlite::memory:".into(), max_connections: 10, ..Default::default() };
        let opt = connect_options(&cfg);
        assert_eq!(opt.get_max_connections(), Some(1));
        assert_eq!(opt.get_min_connections(), Some(1));
    }
}
