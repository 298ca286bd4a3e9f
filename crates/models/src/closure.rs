//! Whole-business closures, either all day or a partial window.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::validate::validate_time_range;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "closure")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub date: Date,
    pub reason: String,
    pub all_day: bool,
    pub start_time: Option<Time>,
    pub end_time: Option<Time>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { match *self {} }
}

impl ActiveModelBehavior for ActiveModel {}

/// Partial closures need an ordered window; all-day closures drop any times.
pub fn validate(all_day: bool, start: Option<Time>, end: Option<Time>) -> Result<(Option<Time>, Option<Time>), ModelError> {
    if all_day {
        return Ok((None, None));
    }
    match (start, end) {
        (Some(s), Some(e)) => {
            validate_time_range("closure", s, e)?;
            Ok((Some(s), Some(e)))
        }
        _ => Err(ModelError::field("closure", "start_time and end_time are required unless all_day")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_closure_needs_window() {
        let a = Time::from_hms_opt(12, 0, 0);
        let b = Time::from_hms_opt(13, 0, 0);
        assert_eq!(validate(true, a, b).unwrap(), (None, None));
        assert!(validate(false, a, None).is_err());
        assert!(validate(false, b, a).is_err());
        assert_eq!(validate(false, a, b).unwrap(), (a, b));
    }
}
