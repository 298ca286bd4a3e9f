//! One-shot admin tool.
//!
//! `setup`         migrate and seed the initial records
//! `setup export`  also write clients and bookings CSVs into `server.data_dir`

use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tracing::info;

use service::db::booking_service::{BookingFilter, BookingPolicy};
use service::export::{self, CsvExport};

async fn write_export(dir: &str, export: CsvExport) -> anyhow::Result<()> {
    let path = Path::new(dir).join(&export.filename);
    tokio::fs::write(&path, export.body).await.with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), event = "export_written", "export written");
    Ok(())
}

async fn run(with_export: bool) -> anyhow::Result<()> {
    let cfg = configs::AppConfig::load_or_env()?;
    common::env::ensure_env(&cfg.server.data_dir, &cfg.database.url).await?;

    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None).await?;

    let report = service::seed::run(&db).await?;
    println!("service: {}", report.service.as_str());
    println!("staff: {}", report.staff.as_str());
    println!("disclaimer: {}", report.disclaimer.as_str());
    println!("package: {}", report.package.as_str());

    if with_export {
        let policy = BookingPolicy::from_config(&cfg.booking)?;
        let now = Utc::now().with_timezone(&policy.rules.offset);
        let currency = cfg.booking.currency_symbol.as_str();
        let clients = export::clients_csv(&db, currency, None, now).await?;
        let bookings = export::bookings_csv(&db, &policy, currency, &BookingFilter::default(), None, now).await?;
        write_export(&cfg.server.data_dir, clients).await?;
        write_export(&cfg.server.data_dir, bookings).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    dotenv().ok();
    common::utils::logging::init_logging_default();

    let with_export = match std::env::args().nth(1).as_deref() {
        None => false,
        Some("export") => true,
        Some(other) => {
            eprintln!("unknown command '{}'; usage: setup [export]", other);
            return std::process::ExitCode::FAILURE;
        }
    };

    match run(with_export).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, event = "setup_failed", "setup failed");
            std::process::ExitCode::FAILURE
        }
    }
}
