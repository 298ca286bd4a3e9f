//! Create `staff` table and the `staff_service` join table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Staff::Table)
                    .if_not_exists()
                    .col(pk_auto(Staff::Id))
                    .col(string_len(Staff::Name, 128).not_null())
                    .col(string_len(Staff::Email, 255).unique_key().not_null())
                    .col(string_len(Staff::Phone, 32).not_null())
                    .col(string_len(Staff::PhotoUrl, 512).not_null())
                    .col(text(Staff::Bio).not_null())
                    .col(boolean(Staff::Active).not_null())
                    .col(timestamp_with_time_zone(Staff::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Staff::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StaffService::Table)
                    .if_not_exists()
                    .col(integer(StaffService::StaffId).not_null())
                    .col(integer(StaffService::ServiceId).not_null())
                    .primary_key(
                        Index::create()
                            .col(StaffService::StaffId)
                            .col(StaffService::ServiceId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_staff_service_staff")
                            .from(StaffService::Table, StaffService::StaffId)
                            .to(Staff::Table, Staff::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_staff_service_service")
                            .from(StaffService::Table, StaffService::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(StaffService::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Staff::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Staff { Table, Id, Name, Email, Phone, PhotoUrl, Bio, Active, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum StaffService { Table, StaffId, ServiceId }

#[derive(DeriveIden)]
enum Service { Table, Id }
