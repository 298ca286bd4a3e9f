//! Group classes with a capacity and enrolled clients.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "session")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub description: String,
    pub staff_id: Option<i32>,
    pub start_time: DateTimeWithTimeZone,
    pub duration_minutes: i32,
    pub capacity: i32,
    pub price_pence: i32,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Staff }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Staff => Entity::belongs_to(crate::staff::Entity)
                .from(Column::StaffId)
                .to(crate::staff::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn end_time(&self) -> DateTimeWithTimeZone {
        self.start_time + chrono::Duration::minutes(self.duration_minutes as i64)
    }

    pub fn available_spots(&self, enrolled: i64) -> i64 { (self.capacity as i64 - enrolled).max(0) }

    pub fn is_full(&self, enrolled: i64) -> bool { enrolled >= self.capacity as i64 }
}

pub fn validate_capacity(capacity: i32) -> Result<i32, ModelError> {
    crate::validate::validate_positive("capacity", capacity, 1000)
}
