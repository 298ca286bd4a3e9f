//! Weekly working pattern per staff member.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::validate::{validate_day_of_week, validate_time_range};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "staff_schedule")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub staff_id: i32,
    pub day_of_week: i16,
    pub is_working: bool,
    pub start_time: Time,
    pub end_time: Time,
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

pub fn validate(day_of_week: i16, is_working: bool, start: Time, end: Time) -> Result<(), ModelError> {
    validate_day_of_week(day_of_week)?;
    if is_working {
        validate_time_range("staff_schedule", start, end)?;
    }
    Ok(())
}
