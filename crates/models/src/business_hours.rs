//! Opening hours per weekday. `day_of_week` is 0 = Monday .. 6 = Sunday.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::validate::{validate_day_of_week, validate_time_range};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "business_hours")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub day_of_week: i16,
    pub is_open: bool,
    pub open_time: Time,
    pub close_time: Time,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { match *self {} }
}

impl ActiveModelBehavior for ActiveModel {}

pub const DAY_NAMES: [&str; 7] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"];

pub fn day_name(day: i16) -> &'static str {
    usize::try_from(day).ok().and_then(|d| DAY_NAMES.get(d)).copied().unwrap_or("Unknown")
}

pub fn validate(day_of_week: i16, is_open: bool, open: Time, close: Time) -> Result<(), ModelError> {
    validate_day_of_week(day_of_week)?;
    if is_open {
        validate_time_range("business_hours", open, close)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_day_skips_time_check() {
        let t = Time::from_hms_opt(9, 0, 0).unwrap();
        assert!(validate(6, false, t, t).is_ok());
        assert!(validate(6, true, t, t).is_err());
        assert_eq!(day_name(0), "Monday");
        assert_eq!(day_name(9), "Unknown");
    }
}
