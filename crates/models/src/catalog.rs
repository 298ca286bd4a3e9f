//! Bookable services (`service` table).
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: String,
    pub duration_minutes: i32,
    pub price_pence: i32,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { match *self {} }
}

impl ActiveModelBehavior for ActiveModel {}

pub const MAX_DURATION_MINUTES: i32 = 480;

pub fn validate_duration(minutes: i32) -> Result<i32, ModelError> {
    if !(5..=MAX_DURATION_MINUTES).contains(&minutes) {
        return Err(ModelError::field("duration_minutes", "must be within 5..=480"));
    }
    Ok(minutes)
}

pub fn validate_price(pence: i32) -> Result<i32, ModelError> {
    if pence < 0 {
        return Err(ModelError::field("price", "must not be negative"));
    }
    Ok(pence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_bounds() {
        assert!(validate_duration(60).is_ok());
        assert!(validate_duration(4).is_err());
        assert!(validate_duration(481).is_err());
        assert!(validate_price(0).is_ok());
        assert!(validate_price(-1).is_err());
    }
}
