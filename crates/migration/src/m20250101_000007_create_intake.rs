//! Create intake tables: `intake_profile` (one per email) and `intake_disclaimer`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IntakeProfile::Table)
                    .if_not_exists()
                    .col(pk_auto(IntakeProfile::Id))
                    .col(string_len(IntakeProfile::FullName, 128).not_null())
                    .col(string_len(IntakeProfile::Email, 255).unique_key().not_null())
                    .col(string_len(IntakeProfile::Phone, 32).not_null())
                    .col(string_len(IntakeProfile::EmergencyContactName, 128).not_null())
                    .col(string_len(IntakeProfile::EmergencyContactPhone, 32).not_null())
                    .col(string_len(IntakeProfile::ExperienceLevel, 32).not_null())
                    .col(text(IntakeProfile::Goals).not_null())
                    .col(text(IntakeProfile::Preferences).not_null())
                    .col(boolean(IntakeProfile::ConsentBooking).not_null())
                    .col(boolean(IntakeProfile::ConsentMarketing).not_null())
                    .col(boolean(IntakeProfile::ConsentPrivacy).not_null())
                    .col(boolean(IntakeProfile::Completed).not_null())
                    .col(timestamp_with_time_zone_null(IntakeProfile::CompletedDate))
                    .col(timestamp_with_time_zone_null(IntakeProfile::ExpiresAt))
                    .col(timestamp_with_time_zone(IntakeProfile::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(IntakeProfile::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IntakeDisclaimer::Table)
                    .if_not_exists()
                    .col(pk_auto(IntakeDisclaimer::Id))
                    .col(string_len(IntakeDisclaimer::Version, 32).unique_key().not_null())
                    .col(text(IntakeDisclaimer::Content).not_null())
                    .col(boolean(IntakeDisclaimer::Active).not_null())
                    .col(timestamp_with_time_zone(IntakeDisclaimer::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(IntakeDisclaimer::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(IntakeProfile::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum IntakeProfile {
    Table,
    Id,
    FullName,
    Email,
    Phone,
    EmergencyContactName,
    EmergencyContactPhone,
    ExperienceLevel,
    Goals,
    Preferences,
    ConsentBooking,
    ConsentMarketing,
    ConsentPrivacy,
    Completed,
    CompletedDate,
    ExpiresAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum IntakeDisclaimer { Table, Id, Version, Content, Active, CreatedAt }
