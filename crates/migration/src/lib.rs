//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_service;
mod m20250101_000002_create_staff;
mod m20250101_000003_create_client;
mod m20250101_000004_create_booking;
mod m20250101_000005_create_schedules;
mod m20250101_000006_create_session;
mod m20250101_000007_create_intake;
mod m20250101_000008_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_service::Migration),
            Box::new(m20250101_000002_create_staff::Migration),
            Box::new(m20250101_000003_create_client::Migration),
            Box::new(m20250101_000004_create_booking::Migration),
            Box::new(m20250101_000005_create_schedules::Migration),
            Box::new(m20250101_000006_create_session::Migration),
            Box::new(m20250101_000007_create_intake::Migration),
            // Indexes should always be applied last
            Box::new(m20250101_000008_add_indexes::Migration),
        ]
    }
}
