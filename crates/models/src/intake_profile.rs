//! Client intake form with consents. A profile is usable for booking while
//! completed, consented and not past `expires_at`.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "intake_profile")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub full_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: String,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
    pub experience_level: String,
    pub goals: String,
    pub preferences: String,
    pub consent_booking: bool,
    pub consent_marketing: bool,
    pub consent_privacy: bool,
    pub completed: bool,
    pub completed_date: Option<DateTimeWithTimeZone>,
    pub expires_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { match *self {} }
}

impl ActiveModelBehavior for ActiveModel {}

pub const EXPERIENCE_LEVELS: [&str; 4] = ["", "beginner", "intermediate", "advanced"];

impl Model {
    pub fn is_expired(&self, now: DateTimeWithTimeZone) -> bool {
        self.expires_at.map(|exp| exp <= now).unwrap_or(false)
    }

    pub fn is_valid_for_booking(&self, now: DateTimeWithTimeZone) -> bool {
        self.completed && self.consent_booking && self.consent_privacy && !self.is_expired(now)
    }
}

pub fn validate_consents(consent_booking: bool, consent_privacy: bool) -> Result<(), ModelError> {
    if !consent_booking {
        return Err(ModelError::field("consent_booking", "You must consent to booking to proceed."));
    }
    if !consent_privacy {
        return Err(ModelError::field("consent_privacy", "You must accept the privacy policy to proceed."));
    }
    Ok(())
}

pub fn validate_experience_level(level: &str) -> Result<String, ModelError> {
    let l = level.trim().to_ascii_lowercase();
    if !EXPERIENCE_LEVELS.contains(&l.as_str()) {
        return Err(ModelError::field("experience_level", "must be beginner, intermediate or advanced"));
    }
    Ok(l)
}
