//! Create `booking` table with FKs to client, service and staff.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(pk_auto(Booking::Id))
                    .col(integer(Booking::ClientId).not_null())
                    .col(integer(Booking::ServiceId).not_null())
                    .col(integer(Booking::StaffId).not_null())
                    .col(timestamp_with_time_zone(Booking::StartTime).not_null())
                    .col(timestamp_with_time_zone(Booking::EndTime).not_null())
                    .col(string_len(Booking::Status, 16).not_null())
                    .col(text(Booking::Notes).not_null())
                    .col(timestamp_with_time_zone(Booking::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Booking::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_client")
                            .from(Booking::Table, Booking::ClientId)
                            .to(Client::Table, Client::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_service")
                            .from(Booking::Table, Booking::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_staff")
                            .from(Booking::Table, Booking::StaffId)
                            .to(Staff::Table, Staff::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Booking::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Booking { Table, Id, ClientId, ServiceId, StaffId, StartTime, EndTime, Status, Notes, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Client { Table, Id }

#[derive(DeriveIden)]
enum Service { Table, Id }

#[derive(DeriveIden)]
enum Staff { Table, Id }
