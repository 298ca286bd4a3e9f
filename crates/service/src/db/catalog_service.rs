use chrono::Utc;
use common::{money::{format_pence, Amount}, pagination::Pagination};
use sea_orm::{
    prelude::DateTimeWithTimeZone, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use models::{catalog, validate::validate_required};

use super::{default_true, fetch_page, lower_like, search_term};
use crate::errors::{ServiceError, ServiceResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub duration_minutes: i32,
    /// `"25.00"`
    pub price: String,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl From<catalog::Model> for ServiceView {
    fn from(m: catalog::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            duration_minutes: m.duration_minutes,
            price: format_pence(m.price_pence as i64),
            active: m.active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub duration_minutes: i32,
    pub price: Amount,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServicePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<i32>,
    pub price: Option<Amount>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceFilter {
    pub active: Option<bool>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// List services ordered by name.
pub async fn list_services(db: &DatabaseConnection, filter: &ServiceFilter) -> ServiceResult<Vec<ServiceView>> {
    let mut q = catalog::Entity::find().order_by_asc(catalog::Column::Name);
    if let Some(active) = filter.active {
        q = q.filter(catalog::Column::Active.eq(active));
    }
    if let Some(term) = search_term(&filter.search) {
        q = q.filter(
            Condition::any()
                .add(lower_like((catalog::Entity, catalog::Column::Name), term))
                .add(lower_like((catalog::Entity, catalog::Column::Description), term)),
        );
    }
    let rows = fetch_page(q, db, Pagination::from_query(filter.page, filter.per_page)).await?;
    Ok(rows.into_iter().map(ServiceView::from).collect())
}

pub async fn find_service(db: &DatabaseConnection, id: i32) -> ServiceResult<catalog::Model> {
    catalog::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("service"))
}

pub async fn get_service(db: &DatabaseConnection, id: i32) -> ServiceResult<ServiceView> {
    Ok(find_service(db, id).await?.into())
}

pub async fn create_service(db: &DatabaseConnection, input: ServiceInput) -> ServiceResult<ServiceView> {
    let name = validate_required("name", &input.name, 128)?;
    let duration = catalog::validate_duration(input.duration_minutes)?;
    let price = catalog::validate_price(input.price.to_pence()?)?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let am = catalog::ActiveModel {
        name: Set(name),
        description: Set(input.description.trim().to_string()),
        duration_minutes: Set(duration),
        price_pence: Set(price),
        active: Set(input.active),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let m = am.insert(db).await?;
    info!(service_id = m.id, name = %m.name, "service_created");
    Ok(m.into())
}

pub async fn update_service(db: &DatabaseConnection, id: i32, patch: ServicePatch) -> ServiceResult<ServiceView> {
    let mut am: catalog::ActiveModel = find_service(db, id).await?.into();
    if let Some(name) = patch.name {
        am.name = Set(validate_required("name", &name, 128)?);
    }
    if let Some(description) = patch.description {
        am.description = Set(description.trim().to_string());
    }
    if let Some(d) = patch.duration_minutes {
        am.duration_minutes = Set(catalog::validate_duration(d)?);
    }
    if let Some(price) = patch.price {
        am.price_pence = Set(catalog::validate_price(price.to_pence()?)?);
    }
    if let Some(active) = patch.active {
        am.active = Set(active);
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?.into())
}

/// Fails with a conflict while bookings still reference the service.
pub async fn delete_service(db: &DatabaseConnection, id: i32) -> ServiceResult<()> {
    let res = catalog::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("service"));
    }
    info!(service_id = id, "service_deleted");
    Ok(())
}
