//! Create opening-hours tables: `business_hours`, `staff_schedule`, `closure`, `staff_leave`.
//!
//! `day_of_week` is 0 = Monday .. 6 = Sunday.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BusinessHours::Table)
                    .if_not_exists()
                    .col(pk_auto(BusinessHours::Id))
                    .col(small_integer(BusinessHours::DayOfWeek).unique_key().not_null())
                    .col(boolean(BusinessHours::IsOpen).not_null())
                    .col(time(BusinessHours::OpenTime).not_null())
                    .col(time(BusinessHours::CloseTime).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StaffSchedule::Table)
                    .if_not_exists()
                    .col(pk_auto(StaffSchedule::Id))
                    .col(integer(StaffSchedule::StaffId).not_null())
                    .col(small_integer(StaffSchedule::DayOfWeek).not_null())
                    .col(boolean(StaffSchedule::IsWorking).not_null())
                    .col(time(StaffSchedule::StartTime).not_null())
                    .col(time(StaffSchedule::EndTime).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_staff_schedule_staff")
                            .from(StaffSchedule::Table, StaffSchedule::StaffId)
                            .to(Staff::Table, Staff::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Closure::Table)
                    .if_not_exists()
                    .col(pk_auto(Closure::Id))
                    .col(date(Closure::Date).not_null())
                    .col(string_len(Closure::Reason, 255).not_null())
                    .col(boolean(Closure::AllDay).not_null())
                    .col(time_null(Closure::StartTime))
                    .col(time_null(Closure::EndTime))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StaffLeave::Table)
                    .if_not_exists()
                    .col(pk_auto(StaffLeave::Id))
                    .col(integer(StaffLeave::StaffId).not_null())
                    .col(date(StaffLeave::StartDate).not_null())
                    .col(date(StaffLeave::EndDate).not_null())
                    .col(string_len(StaffLeave::Reason, 255).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_staff_leave_staff")
                            .from(StaffLeave::Table, StaffLeave::StaffId)
                            .to(Staff::Table, Staff::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(StaffLeave::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Closure::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(StaffSchedule::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(BusinessHours::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum BusinessHours { Table, Id, DayOfWeek, IsOpen, OpenTime, CloseTime }

#[derive(DeriveIden)]
enum StaffSchedule { Table, Id, StaffId, DayOfWeek, IsWorking, StartTime, EndTime }

#[derive(DeriveIden)]
enum Closure { Table, Id, Date, Reason, AllDay, StartTime, EndTime }

#[derive(DeriveIden)]
enum StaffLeave { Table, Id, StaffId, StartDate, EndDate, Reason }

#[derive(DeriveIden)]
enum Staff { Table, Id }
