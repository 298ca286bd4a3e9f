//! Client intake / consent profiles.

use chrono::{Duration, Utc};
use sea_orm::{
    prelude::DateTimeWithTimeZone, sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use models::{
    intake_profile,
    validate::{validate_email, validate_max_len, validate_phone, validate_required},
};

use crate::errors::{ServiceError, ServiceResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeProfileView {
    pub id: i32,
    pub full_name: String,
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
    pub is_expired: bool,
    pub is_valid_for_booking: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl IntakeProfileView {
    pub fn at(m: intake_profile::Model, now: DateTimeWithTimeZone) -> Self {
        Self {
            is_expired: m.is_expired(now),
            is_valid_for_booking: m.is_valid_for_booking(now),
            id: m.id,
            full_name: m.full_name,
            email: m.email,
            phone: m.phone,
            emergency_contact_name: m.emergency_contact_name,
            emergency_contact_phone: m.emergency_contact_phone,
            experience_level: m.experience_level,
            goals: m.goals,
            preferences: m.preferences,
            consent_booking: m.consent_booking,
            consent_marketing: m.consent_marketing,
            consent_privacy: m.consent_privacy,
            completed: m.completed,
            completed_date: m.completed_date,
            expires_at: m.expires_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

fn view(m: intake_profile::Model) -> IntakeProfileView { IntakeProfileView::at(m, Utc::now().into()) }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntakeInput {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub emergency_contact_name: String,
    #[serde(default)]
    pub emergency_contact_phone: String,
    #[serde(default)]
    pub experience_level: String,
    #[serde(default)]
    pub goals: String,
    #[serde(default)]
    pub preferences: String,
    #[serde(default)]
    pub consent_booking: bool,
    #[serde(default)]
    pub consent_marketing: bool,
    #[serde(default)]
    pub consent_privacy: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntakePatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub experience_level: Option<String>,
    pub goals: Option<String>,
    pub preferences: Option<String>,
    pub consent_booking: Option<bool>,
    pub consent_marketing: Option<bool>,
    pub consent_privacy: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeStatus {
    pub exists: bool,
    pub completed: bool,
    pub profile_id: Option<i32>,
    pub is_valid_for_booking: bool,
}

fn required_email(q: &EmailQuery) -> ServiceResult<String> {
    match q.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        Some(e) => Ok(e.to_ascii_lowercase()),
        None => Err(ServiceError::Validation("email: Email parameter required".into())),
    }
}

async fn find_by_email(db: &DatabaseConnection, email: &str) -> ServiceResult<Option<intake_profile::Model>> {
    Ok(intake_profile::Entity::find().filter(intake_profile::Column::Email.eq(email)).one(db).await?)
}

pub async fn list_profiles(db: &DatabaseConnection) -> ServiceResult<Vec<IntakeProfileView>> {
    let rows = intake_profile::Entity::find().order_by_desc(intake_profile::Column::CreatedAt).all(db).await?;
    Ok(rows.into_iter().map(view).collect())
}

async fn find_profile(db: &DatabaseConnection, id: i32) -> ServiceResult<intake_profile::Model> {
    intake_profile::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("intake profile"))
}

pub async fn get_profile(db: &DatabaseConnection, id: i32) -> ServiceResult<IntakeProfileView> {
    Ok(view(find_profile(db, id).await?))
}

/// Completed on creation, valid for `validity_days`.
pub async fn create_profile(db: &DatabaseConnection, validity_days: u32, input: IntakeInput) -> ServiceResult<IntakeProfileView> {
    let email = validate_email(&input.email)?;
    if find_by_email(db, &email).await?.is_some() {
        return Err(ServiceError::Conflict("email: An intake profile with this email already exists.".into()));
    }
    intake_profile::validate_consents(input.consent_booking, input.consent_privacy)?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let am = intake_profile::ActiveModel {
        full_name: Set(validate_required("full_name", &input.full_name, 200)?),
        email: Set(email),
        phone: Set(validate_phone(&input.phone)?),
        emergency_contact_name: Set(validate_max_len("emergency_contact_name", &input.emergency_contact_name, 200)?),
        emergency_contact_phone: Set(validate_phone(&input.emergency_contact_phone)?),
        experience_level: Set(intake_profile::validate_experience_level(&input.experience_level)?),
        goals: Set(input.goals.trim().to_string()),
        preferences: Set(input.preferences.trim().to_string()),
        consent_booking: Set(input.consent_booking),
        consent_marketing: Set(input.consent_marketing),
        consent_privacy: Set(input.consent_privacy),
        completed: Set(true),
        completed_date: Set(Some(now)),
        expires_at: Set(Some(now + Duration::days(validity_days as i64))),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let m = am.insert(db).await?;
    info!(event = "intake_completed", profile_id = m.id, "intake_completed");
    Ok(view(m))
}

/// Consents are checked against the merged result.
pub async fn update_profile(db: &DatabaseConnection, id: i32, patch: IntakePatch) -> ServiceResult<IntakeProfileView> {
    let current = find_profile(db, id).await?;
    let consent_booking = patch.consent_booking.unwrap_or(current.consent_booking);
    let consent_privacy = patch.consent_privacy.unwrap_or(current.consent_privacy);
    intake_profile::validate_consents(consent_booking, consent_privacy)?;

    let mut am: intake_profile::ActiveModel = current.into();
    if let Some(v) = patch.full_name {
        am.full_name = Set(validate_required("full_name", &v, 200)?);
    }
    if let Some(v) = patch.email {
        am.email = Set(validate_email(&v)?);
    }
    if let Some(v) = patch.phone {
        am.phone = Set(validate_phone(&v)?);
    }
    if let Some(v) = patch.emergency_contact_name {
        am.emergency_contact_name = Set(validate_max_len("emergency_contact_name", &v, 200)?);
    }
    if let Some(v) = patch.emergency_contact_phone {
        am.emergency_contact_phone = Set(validate_phone(&v)?);
    }
    if let Some(v) = patch.experience_level {
        am.experience_level = Set(intake_profile::validate_experience_level(&v)?);
    }
    if let Some(v) = patch.goals {
        am.goals = Set(v.trim().to_string());
    }
    if let Some(v) = patch.preferences {
        am.preferences = Set(v.trim().to_string());
    }
    if let Some(v) = patch.consent_marketing {
        am.consent_marketing = Set(v);
    }
    am.consent_booking = Set(consent_booking);
    am.consent_privacy = Set(consent_privacy);
    am.updated_at = Set(Utc::now().into());
    Ok(view(am.update(db).await?))
}

pub async fn delete_profile(db: &DatabaseConnection, id: i32) -> ServiceResult<()> {
    let res = intake_profile::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("intake profile"));
    }
    Ok(())
}

/// Unknown emails report `exists: false` rather than an error.
pub async fn status(db: &DatabaseConnection, q: &EmailQuery) -> ServiceResult<IntakeStatus> {
    let email = required_email(q)?;
    Ok(match find_by_email(db, &email).await? {
        Some(p) => IntakeStatus {
            exists: true,
            completed: p.completed,
            profile_id: Some(p.id),
            is_valid_for_booking: p.is_valid_for_booking(Utc::now().into()),
        },
        None => IntakeStatus { exists: false, completed: false, profile_id: None, is_valid_for_booking: false },
    })
}

pub async fn by_email(db: &DatabaseConnection, q: &EmailQuery) -> ServiceResult<IntakeProfileView> {
    let email = required_email(q)?;
    find_by_email(db, &email).await?.map(view).ok_or_else(|| ServiceError::not_found("intake profile"))
}

/// Expire one profile now; the client must complete intake again.
pub async fn expire_profile(db: &DatabaseConnection, id: i32) -> ServiceResult<IntakeProfileView> {
    let mut am: intake_profile::ActiveModel = find_profile(db, id).await?.into();
    let now: DateTimeWithTimeZone = Utc::now().into();
    am.expires_at = Set(Some(now));
    am.updated_at = Set(now);
    let m = am.update(db).await?;
    info!(event = "intake_expired", profile_id = id, "intake_expired");
    Ok(view(m))
}

/// Expire every profile; returns the number of rows changed.
pub async fn expire_all(db: &DatabaseConnection) -> ServiceResult<u64> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let res = intake_profile::Entity::update_many()
        .col_expr(intake_profile::Column::ExpiresAt, Expr::value(Some(now)))
        .col_expr(intake_profile::Column::UpdatedAt, Expr::value(now))
        .exec(db)
        .await?;
    info!(event = "intake_expired_all", updated = res.rows_affected, "intake_expired_all");
    Ok(res.rows_affected)
}
