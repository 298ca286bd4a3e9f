#![cfg(test)]
use chrono::{DateTime, Duration, Utc};
use migration::MigratorTrait;
use models::{
    booking::{self, BookingStatus},
    catalog, intake_profile, staff,
    db::{connect_with_config, DatabaseConfig},
};
use sea_orm::{prelude::DateTimeWithTimeZone, ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

/// Migrated database per test: `TEST_DATABASE_URL` when set, otherwise a
/// private in-memory sqlite.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let url = std::env::var("TEST_DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    let cfg = DatabaseConfig { url, max_connections: 5, min_connections: 1, ..Default::default() };
    let db = connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn now() -> DateTimeWithTimeZone { Utc::now().into() }

pub async fn seed_service(db: &DatabaseConnection, name: &str, duration_minutes: i32, price_pence: i32) -> Result<catalog::Model, anyhow::Error> {
    let m = catalog::ActiveModel {
        name: Set(name.to_string()),
        description: Set(String::new()),
        duration_minutes: Set(duration_minutes),
        price_pence: Set(price_pence),
        active: Set(true),
        created_at: Set(now()),
        updated_at: Set(now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(m)
}

pub async fn seed_staff(db: &DatabaseConnection, name: &str, email: &str) -> Result<staff::Model, anyhow::Error> {
    let m = staff::ActiveModel {
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        phone: Set(String::new()),
        photo_url: Set(String::new()),
        bio: Set(String::new()),
        active: Set(true),
        created_at: Set(now()),
        updated_at: Set(now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(m)
}

/// Inserts directly, bypassing availability checks. `start` is RFC 3339.
pub async fn seed_booking(
    db: &DatabaseConnection,
    client_id: i32,
    service_id: i32,
    staff_id: i32,
    start: &str,
    status: BookingStatus,
) -> Result<booking::Model, anyhow::Error> {
    let svc = catalog::Entity::find_by_id(service_id).one(db).await?.ok_or_else(|| anyhow::anyhow!("no service {}", service_id))?;
    let start = DateTime::parse_from_rfc3339(start)?;
    let m = booking::ActiveModel {
        client_id: Set(client_id),
        service_id: Set(service_id),
        staff_id: Set(staff_id),
        start_time: Set(start),
        end_time: Set(start + Duration::minutes(svc.duration_minutes as i64)),
        status: Set(status),
        notes: Set(String::new()),
        created_at: Set(now()),
        updated_at: Set(now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(m)
}

/// Completed, consented profile valid for a year.
pub async fn seed_intake(db: &DatabaseConnection, email: &str) -> Result<intake_profile::Model, anyhow::Error> {
    let m = intake_profile::ActiveModel {
        full_name: Set("Test Client".into()),
        email: Set(email.to_ascii_lowercase()),
        phone: Set(String::new()),
        emergency_contact_name: Set(String::new()),
        emergency_contact_phone: Set(String::new()),
        experience_level: Set("beginner".into()),
        goals: Set(String::new()),
        preferences: Set(String::new()),
        consent_booking: Set(true),
        consent_marketing: Set(false),
        consent_privacy: Set(true),
        completed: Set(true),
        completed_date: Set(Some(now())),
        expires_at: Set(Some(now() + Duration::days(365))),
        created_at: Set(now()),
        updated_at: Set(now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(m)
}
