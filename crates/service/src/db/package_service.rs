use chrono::Utc;
use common::money::{format_pence, Amount};
use sea_orm::{prelude::DateTimeWithTimeZone, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::info;

use models::{catalog, class_package, validate::{validate_positive, validate_required}};

use super::default_true;
use crate::errors::{ServiceError, ServiceResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub class_count: i32,
    pub price: String,
    pub validity_days: i32,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
}

impl From<class_package::Model> for PackageView {
    fn from(m: class_package::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            class_count: m.class_count,
            price: format_pence(m.price_pence as i64),
            validity_days: m.validity_days,
            active: m.active,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PackageInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub class_count: i32,
    pub price: Amount,
    pub validity_days: i32,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackagePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub class_count: Option<i32>,
    pub price: Option<Amount>,
    pub validity_days: Option<i32>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageFilter {
    pub active: Option<bool>,
}

pub async fn list_packages(db: &DatabaseConnection, filter: &PackageFilter) -> ServiceResult<Vec<PackageView>> {
    let mut q = class_package::Entity::find().order_by_asc(class_package::Column::Name);
    if let Some(active) = filter.active {
        q = q.filter(class_package::Column::Active.eq(active));
    }
    Ok(q.all(db).await?.into_iter().map(Into::into).collect())
}

async fn find_package(db: &DatabaseConnection, id: i32) -> ServiceResult<class_package::Model> {
    class_package::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("package"))
}

pub async fn get_package(db: &DatabaseConnection, id: i32) -> ServiceResult<PackageView> {
    Ok(find_package(db, id).await?.into())
}

pub async fn create_package(db: &DatabaseConnection, input: PackageInput) -> ServiceResult<PackageView> {
    let am = class_package::ActiveModel {
        name: Set(validate_required("name", &input.name, 128)?),
        description: Set(input.description.trim().to_string()),
        class_count: Set(validate_positive("class_count", input.class_count, 1000)?),
        price_pence: Set(catalog::validate_price(input.price.to_pence()?)?),
        validity_days: Set(validate_positive("validity_days", input.validity_days, 3650)?),
        active: Set(input.active),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    let m = am.insert(db).await?;
    info!(package_id = m.id, name = %m.name, "package_created");
    Ok(m.into())
}

pub async fn update_package(db: &DatabaseConnection, id: i32, patch: PackagePatch) -> ServiceResult<PackageView> {
    let mut am: class_package::ActiveModel = find_package(db, id).await?.into();
    if let Some(name) = patch.name {
        am.name = Set(validate_required("name", &name, 128)?);
    }
    if let Some(description) = patch.description {
        am.description = Set(description.trim().to_string());
    }
    if let Some(n) = patch.class_count {
        am.class_count = Set(validate_positive("class_count", n, 1000)?);
    }
    if let Some(price) = patch.price {
        am.price_pence = Set(catalog::validate_price(price.to_pence()?)?);
    }
    if let Some(days) = patch.validity_days {
        am.validity_days = Set(validate_positive("validity_days", days, 3650)?);
    }
    if let Some(active) = patch.active {
        am.active = Set(active);
    }
    Ok(am.update(db).await?.into())
}

pub async fn delete_package(db: &DatabaseConnection, id: i32) -> ServiceResult<()> {
    let res = class_package::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("package"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    fn input(name: &str) -> PackageInput {
        PackageInput { name: name.into(), description: String::new(), class_count: 5, price: Amount::Text("100".into()), validity_days: 90, active: true }
    }

    #[tokio::test]
    async fn package_crud_and_validation() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let p = create_package(&db, input("5 Class Pass")).await?;
        assert_eq!(p.price, "100.00");
        assert!(matches!(create_package(&db, input("5 Class Pass")).await, Err(ServiceError::Conflict(_))));

        let mut zero = input("Zero");
        zero.class_count = 0;
        assert!(create_package(&db, zero).await.is_err());

        let off = update_package(&db, p.id, PackagePatch { active: Some(false), ..Default::default() }).await?;
        assert!(!off.active);
        assert!(list_packages(&db, &PackageFilter { active: Some(true) }).await?.is_empty());
        assert_eq!(list_packages(&db, &PackageFilter::default()).await?.len(), 1);

        delete_package(&db, p.id).await?;
        assert!(matches!(get_package(&db, p.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
