use anyhow::{Context, Result};
use serde::Deserialize;
use anyhow::anyhow;
use chrono::NaiveTime;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub booking: BookingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// Directory for CSV exports and other runtime files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8001, worker_threads: Some(4), data_dir: default_data_dir() }
    }
}

fn default_data_dir() -> String { "data".into() }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }

/// Booking rules: slot grid, fallback opening hours and intake policy.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingConfig {
    #[serde(default = "default_slot_interval")]
    pub slot_interval_minutes: u32,
    #[serde(default = "default_open")]
    pub default_open: String,
    #[serde(default = "default_close")]
    pub default_close: String,
    /// Days (0 = Monday) treated as closed when no business hours row exists.
    #[serde(default = "default_closed_days")]
    pub default_closed_days: Vec<u8>,
    #[serde(default = "default_intake_validity")]
    pub intake_validity_days: u32,
    #[serde(default)]
    pub require_intake: bool,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    /// Offset applied when turning a local date + time into a timestamp.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            slot_interval_minutes: default_slot_interval(),
            default_open: default_open(),
            default_close: default_close(),
            default_closed_days: default_closed_days(),
            intake_validity_days: default_intake_validity(),
            require_intake: false,
            currency_symbol: default_currency_symbol(),
            utc_offset_minutes: 0,
        }
    }
}

fn default_slot_interval() -> u32 { 30 }
fn default_open() -> String { "09:00".into() }
fn default_close() -> String { "17:00".into() }
fn default_closed_days() -> Vec<u8> { vec![6] }
fn default_intake_validity() -> u32 { 365 }
fn default_currency_symbol() -> String { "£".into() }

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Config file when present, otherwise defaults filled from the environment.
    pub fn load_or_env() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_or_env_from(&path)
    }

    /// Only a missing file falls back to the environment; a file that
    /// exists but does not parse is an error.
    pub fn load_or_env_from(path: &str) -> Result<Self> {
        let mut cfg = match std::fs::read_to_string(path) {
            Ok(content) => load_from_str(&content).with_context(|| format!("invalid config file {}", path))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let mut cfg = AppConfig::default();
                if let Ok(host) = std::env::var("SERVER_HOST") { cfg.server.host = host; }
                if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
                    cfg.server.port = port;
                }
                cfg.server.worker_threads = std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok());
                cfg
            }
            Err(e) => return Err(anyhow!("cannot read config file {}: {}", path, e)),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.booking.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        if self.data_dir.trim().is_empty() {
            self.data_dir = default_data_dir();
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://") || lower.starts_with("sqlite:")) {
            return Err(anyhow!("database.url must start with postgres://, postgresql:// or sqlite:"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl BookingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(5..=240).contains(&self.slot_interval_minutes) {
            return Err(anyhow!("booking.slot_interval_minutes must be within 5..=240"));
        }
        let (open, close) = self.default_window()?;
        if open >= close {
            return Err(anyhow!("booking.default_open must be before booking.default_close"));
        }
        if self.default_closed_days.iter().any(|d| *d > 6) {
            return Err(anyhow!("booking.default_closed_days must be within 0..=6"));
        }
        if self.intake_validity_days == 0 {
            return Err(anyhow!("booking.intake_validity_days must be >= 1"));
        }
        if self.utc_offset_minutes.abs() > 14 * 60 {
            return Err(anyhow!("booking.utc_offset_minutes must be within +/-840"));
        }
        Ok(())
    }

    /// Fallback opening window as parsed times.
    pub fn default_window(&self) -> Result<(NaiveTime, NaiveTime)> {
        Ok((parse_hhmm(&self.default_open)?, parse_hhmm(&self.default_close)?))
    }
}

/// Accepts `HH:MM` or `HH:MM:SS`.
pub fn parse_hhmm(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s.trim(), "%H:%M:%S"))
        .map_err(|_| anyhow!("invalid time '{}', expected HH:MM", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_toml_with_defaults() {
        let cfg = load_from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [database]
            url = "sqlite::memory:"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.booking.slot_interval_minutes, 30);
        assert_eq!(cfg.booking.currency_symbol, "£");
        assert_eq!(cfg.booking.default_closed_days, vec![6]);
    }

    #[test]
    fn validate_rejects_reversed_default_window() {
        let b = BookingConfig { default_open: "18:00".into(), default_close: "09:00".into(), ..Default::default() };
        assert!(b.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_scheme() {
        let d = DatabaseConfig { url: "mysql://localhost/db".into(), ..Default::default() };
        assert!(d.validate().is_err());
        let d = DatabaseConfig { url: "sqlite::memory:".into(), ..Default::default() };
        assert!(d.validate().is_ok());
    }

    fn temp_config(name: &str, content: &str) -> String {
        let path = std::env::temp_dir().join(format!("booking_cfg_{}_{}.toml", name, std::process::id()));
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn malformed_file_is_an_error_not_a_fallback() {
        let path = temp_config("malformed", "[booking]\nslot_interval_minutes = \"fifteen\"\n");
        let err = AppConfig::load_or_env_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid config file"), "{:#}", err);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn valid_file_is_used() {
        let path = temp_config("valid", "[database]\nurl = \"sqlite::memory:\"\n\n[booking]\nslot_interval_minutes = 15\n");
        let cfg = AppConfig::load_or_env_from(&path).unwrap();
        assert_eq!(cfg.booking.slot_interval_minutes, 15);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("booking_cfg_does_not_exist.toml");
        // Defaults need a database url from somewhere.
        match AppConfig::load_or_env_from(&path.to_string_lossy()) {
            Ok(cfg) => assert_eq!(cfg.booking.slot_interval_minutes, 30),
            Err(e) => assert!(e.to_string().contains("database.url"), "{}", e),
        }
    }

    #[test]
    fn parse_hhmm_accepts_seconds() {
        assert_eq!(parse_hhmm("09:30").unwrap(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(parse_hhmm("17:00:00").unwrap(), NaiveTime::from_hms_opt(17, 0, 0).unwrap());
        assert!(parse_hhmm("25:00").is_err());
    }
}
