use std::{fmt, str::FromStr};

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "no_show")]
    NoShow,
}

impl BookingStatus {
    /// Statuses that occupy the staff member's time.
    pub const BLOCKING: [BookingStatus; 2] = [BookingStatus::Pending, BookingStatus::Confirmed];
    /// Statuses counted in client totals and exports.
    pub const BILLABLE: [BookingStatus; 2] = [BookingStatus::Confirmed, BookingStatus::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::NoShow => "no_show",
        }
    }

    pub fn is_blocking(&self) -> bool { Self::BLOCKING.contains(self) }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for BookingStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" | "canceled" => Ok(BookingStatus::Cancelled),
            "no_show" | "no-show" => Ok(BookingStatus::NoShow),
            other => Err(ModelError::field("status", &format!("unknown status '{}'", other))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "booking")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub client_id: i32,
    pub service_id: i32,
    pub staff_id: i32,
    pub start_time: DateTimeWithTimeZone,
    pub end_time: DateTimeWithTimeZone,
    pub status: BookingStatus,
    pub notes: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Client, Service, Staff }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Client => Entity::belongs_to(crate::client::Entity)
                .from(Column::ClientId)
                .to(crate::client::Column::Id)
                .into(),
            Relation::Service => Entity::belongs_to(crate::catalog::Entity)
                .from(Column::ServiceId)
                .to(crate::catalog::Column::Id)
                .into(),
            Relation::Staff => Entity::belongs_to(crate::staff::Entity)
                .from(Column::StaffId)
                .to(crate::staff::Column::Id)
                .into(),
        }
    }
}

impl Related<crate::client::Entity> for Entity {
    fn to() -> RelationDef { Relation::Client.def() }
}

impl Related<crate::catalog::Entity> for Entity {
    fn to() -> RelationDef { Relation::Service.def() }
}

impl Related<crate::staff::Entity> for Entity {
    fn to() -> RelationDef { Relation::Staff.def() }
}

impl ActiveModelBehavior for ActiveModel {}
