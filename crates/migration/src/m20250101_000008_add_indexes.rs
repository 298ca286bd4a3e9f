use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Booking: availability scans by staff + start time
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_staff_start")
                    .table(Booking::Table)
                    .col(Booking::StaffId)
                    .col(Booking::StartTime)
                    .to_owned(),
            )
            .await?;

        // Booking: client history and aggregates
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_client")
                    .table(Booking::Table)
                    .col(Booking::ClientId)
                    .to_owned(),
            )
            .await?;

        // StaffSchedule: one row per staff and weekday
        manager
            .create_index(
                Index::create()
                    .name("uniq_staff_schedule_staff_day")
                    .table(StaffSchedule::Table)
                    .col(StaffSchedule::StaffId)
                    .col(StaffSchedule::DayOfWeek)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_closure_date")
                    .table(Closure::Table)
                    .col(Closure::Date)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_staff_leave_staff")
                    .table(StaffLeave::Table)
                    .col(StaffLeave::StaffId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_session_start")
                    .table(Session::Table)
                    .col(Session::StartTime)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_booking_staff_start").table(Booking::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_booking_client").table(Booking::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_staff_schedule_staff_day").table(StaffSchedule::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_closure_date").table(Closure::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_staff_leave_staff").table(StaffLeave::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_session_start").table(Session::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Booking { Table, StaffId, ClientId, StartTime }

#[derive(DeriveIden)]
enum StaffSchedule { Table, StaffId, DayOfWeek }

#[derive(DeriveIden)]
enum Closure { Table, Date }

#[derive(DeriveIden)]
enum StaffLeave { Table, StaffId }

#[derive(DeriveIden)]
enum Session { Table, StartTime }
