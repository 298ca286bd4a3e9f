//! Create `client` table. Email is the natural key used by public booking.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Client::Table)
                    .if_not_exists()
                    .col(pk_auto(Client::Id))
                    .col(string_len(Client::Name, 128).not_null())
                    .col(string_len(Client::Email, 255).unique_key().not_null())
                    .col(string_len(Client::Phone, 32).not_null())
                    .col(text(Client::Notes).not_null())
                    .col(boolean(Client::MarketingConsent).not_null())
                    .col(timestamp_with_time_zone(Client::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Client::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Client::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Client { Table, Id, Name, Email, Phone, Notes, MarketingConsent, CreatedAt, UpdatedAt }
