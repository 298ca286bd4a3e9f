//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::warn;

/// Ensure the export directory exists; warn when the sqlite file parent is missing.
pub async fn ensure_env(data_dir: &str, database_url: &str) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {data_dir}: {e}"))?;

    if let Some(path) = sqlite_path(database_url) {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() && tokio::fs::metadata(parent).await.is_err() {
                warn!(path = %parent.display(), "sqlite database directory not found; connection may fail");
            }
        }
    }
    Ok(())
}

/// File path of a `sqlite:` URL, `None` for in-memory or other backends.
pub fn sqlite_path(database_url: &str) -> Option<&str> {
    let rest = database_url.strip_prefix("sqlite:")?;
    let rest = rest.trim_start_matches("//");
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::sqlite_path;

    #[test]
    fn sqlite_path_strips_scheme_and_query() {
        assert_eq!(sqlite_path("sqlite://data/booking.db?mode=rwc"), Some("data/booking.db"));
        assert_eq!(sqlite_path("sqlite:booking.db"), Some("booking.db"));
    }

    #[test]
    fn sqlite_path_ignores_memory_and_postgres() {
        assert_eq!(sqlite_path("sqlite::memory:"), None);
        assert_eq!(sqlite_path("postgres://localhost/booking"), None);
    }
}
