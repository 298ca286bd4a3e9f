//! Create group `session` table, `session_enrollment` join table and `class_package`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Session::Table)
                    .if_not_exists()
                    .col(pk_auto(Session::Id))
                    .col(string_len(Session::Title, 128).not_null())
                    .col(text(Session::Description).not_null())
                    .col(integer_null(Session::StaffId))
                    .col(timestamp_with_time_zone(Session::StartTime).not_null())
                    .col(integer(Session::DurationMinutes).not_null())
                    .col(integer(Session::Capacity).not_null())
                    .col(integer(Session::PricePence).not_null())
                    .col(boolean(Session::Active).not_null())
                    .col(timestamp_with_time_zone(Session::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Session::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_staff")
                            .from(Session::Table, Session::StaffId)
                            .to(Staff::Table, Staff::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SessionEnrollment::Table)
                    .if_not_exists()
                    .col(integer(SessionEnrollment::SessionId).not_null())
                    .col(integer(SessionEnrollment::ClientId).not_null())
                    .col(timestamp_with_time_zone(SessionEnrollment::EnrolledAt).not_null())
                    .primary_key(
                        Index::create()
                            .col(SessionEnrollment::SessionId)
                            .col(SessionEnrollment::ClientId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollment_session")
                            .from(SessionEnrollment::Table, SessionEnrollment::SessionId)
                            .to(Session::Table, Session::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollment_client")
                            .from(SessionEnrollment::Table, SessionEnrollment::ClientId)
                            .to(Client::Table, Client::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClassPackage::Table)
                    .if_not_exists()
                    .col(pk_auto(ClassPackage::Id))
                    .col(string_len(ClassPackage::Name, 128).unique_key().not_null())
                    .col(text(ClassPackage::Description).not_null())
                    .col(integer(ClassPackage::ClassCount).not_null())
                    .col(integer(ClassPackage::PricePence).not_null())
                    .col(integer(ClassPackage::ValidityDays).not_null())
                    .col(boolean(ClassPackage::Active).not_null())
                    .col(timestamp_with_time_zone(ClassPackage::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ClassPackage::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(SessionEnrollment::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Session::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Session { Table, Id, Title, Description, StaffId, StartTime, DurationMinutes, Capacity, PricePence, Active, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum SessionEnrollment { Table, SessionId, ClientId, EnrolledAt }

#[derive(DeriveIden)]
enum ClassPackage { Table, Id, Name, Description, ClassCount, PricePence, ValidityDays, Active, CreatedAt }

#[derive(DeriveIden)]
enum Staff { Table, Id }

#[derive(DeriveIden)]
enum Client { Table, Id }
