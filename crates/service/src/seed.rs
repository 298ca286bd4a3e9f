//! Initial data for a fresh install. Safe to run repeatedly.

use chrono::Utc;
use sea_orm::{
    prelude::DateTimeWithTimeZone, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::Serialize;
use tracing::info;

use models::{catalog, class_package, intake_disclaimer, staff};

use crate::errors::ServiceResult;

pub const SERVICE_NAME: &str = "Mindfulness Session";
pub const STAFF_EMAIL: &str = "aly@theminddepartment.com";
pub const DISCLAIMER_VERSION: &str = "1.0";
pub const PACKAGE_NAME: &str = "5 Class Pass";

/// Whether each seeded record was `created` or already `exists`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeedReport {
    pub service: SeedOutcome,
    pub staff: SeedOutcome,
    pub disclaimer: SeedOutcome,
    pub package: SeedOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedOutcome {
    Created,
    Exists,
}

impl SeedOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeedOutcome::Created => "created",
            SeedOutcome::Exists => "exists",
        }
    }
}

pub async fn run(db: &DatabaseConnection) -> ServiceResult<SeedReport> {
    let now: DateTimeWithTimeZone = Utc::now().into();

    let service = if catalog::Entity::find().filter(catalog::Column::Name.eq(SERVICE_NAME)).one(db).await?.is_some() {
        SeedOutcome::Exists
    } else {
        catalog::ActiveModel {
            name: Set(SERVICE_NAME.into()),
            description: Set("60-minute guided mindfulness practice to support your wellbeing".into()),
            duration_minutes: Set(60),
            price_pence: Set(2500),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
        SeedOutcome::Created
    };

    let staff = if staff::Entity::find().filter(staff::Column::Email.eq(STAFF_EMAIL)).one(db).await?.is_some() {
        SeedOutcome::Exists
    } else {
        staff::ActiveModel {
            name: Set("Aly Harwood".into()),
            email: Set(STAFF_EMAIL.into()),
            phone: Set("07395812669".into()),
            photo_url: Set(String::new()),
            bio: Set(String::new()),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
        SeedOutcome::Created
    };

    let disclaimer = if intake_disclaimer::Entity::find()
        .filter(intake_disclaimer::Column::Version.eq(DISCLAIMER_VERSION))
        .one(db)
        .await?
        .is_some()
    {
        SeedOutcome::Exists
    } else {
        // Never displace a version an admin already activated.
        let none_active =
            intake_disclaimer::Entity::find().filter(intake_disclaimer::Column::Active.eq(true)).one(db).await?.is_none();
        intake_disclaimer::ActiveModel {
            version: Set(DISCLAIMER_VERSION.into()),
            content: Set("This is a wellbeing service. By proceeding, you confirm you are booking for personal development and wellness purposes.".into()),
            active: Set(none_active),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
        SeedOutcome::Created
    };

    let package = if class_package::Entity::find().filter(class_package::Column::Name.eq(PACKAGE_NAME)).one(db).await?.is_some() {
        SeedOutcome::Exists
    } else {
        class_package::ActiveModel {
            name: Set(PACKAGE_NAME.into()),
            description: Set("Package of 5 mindfulness sessions".into()),
            class_count: Set(5),
            price_pence: Set(10000),
            validity_days: Set(90),
            active: Set(true),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
        SeedOutcome::Created
    };

    let report = SeedReport { service, staff, disclaimer, package };
    info!(
        service = report.service.as_str(),
        staff = report.staff.as_str(),
        disclaimer = report.disclaimer.as_str(),
        package = report.package.as_str(),
        "seed_complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::disclaimer_service::active_disclaimer;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn seed_is_idempotent() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let first = run(&db).await?;
        assert_eq!(first.service, SeedOutcome::Created);
        assert_eq!(first.package, SeedOutcome::Created);

        let second = run(&db).await?;
        assert_eq!(
            second,
            SeedReport { service: SeedOutcome::Exists, staff: SeedOutcome::Exists, disclaimer: SeedOutcome::Exists, package: SeedOutcome::Exists }
        );
        assert_eq!(catalog::Entity::find().all(&db).await?.len(), 1);
        assert_eq!(active_disclaimer(&db).await?.version, "1.0");
        Ok(())
    }
}
