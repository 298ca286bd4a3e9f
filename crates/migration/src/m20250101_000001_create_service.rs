//! Create `service` table.
//! Bookable treatments with duration and price in pence.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Service::Table)
                    .if_not_exists()
                    .col(pk_auto(Service::Id))
                    .col(string_len(Service::Name, 128).not_null())
                    .col(text(Service::Description).not_null())
                    .col(integer(Service::DurationMinutes).not_null())
                    .col(integer(Service::PricePence).not_null())
                    .col(boolean(Service::Active).not_null())
                    .col(timestamp_with_time_zone(Service::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Service::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Service::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Service { Table, Id, Name, Description, DurationMinutes, PricePence, Active, CreatedAt, UpdatedAt }
