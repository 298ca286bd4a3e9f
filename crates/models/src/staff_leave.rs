use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "staff_leave")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub staff_id: i32,
    pub start_date: Date,
    pub end_date: Date,
    pub reason: String,
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

impl Related<crate::staff::Entity> for Entity {
    fn to() -> RelationDef { Relation::Staff.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Inclusive on both ends.
    pub fn covers(&self, day: Date) -> bool { self.start_date <= day && day <= self.end_date }
}

pub fn validate(start: Date, end: Date) -> Result<(), ModelError> {
    if start > end {
        return Err(ModelError::field("staff_leave", "start_date must not be after end_date"));
    }
    Ok(())
}
