use std::collections::HashMap;

use chrono::Utc;
use common::pagination::Pagination;
use sea_orm::{
    prelude::DateTimeWithTimeZone,
    sea_query::{Expr, Query},
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use models::{
    catalog, staff, staff_service as offered,
    validate::{validate_email, validate_max_len, validate_phone, validate_required},
};

use super::{default_true, fetch_page, lower_like, search_term};
use crate::errors::{ServiceError, ServiceResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffView {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub photo_url: String,
    pub bio: String,
    pub active: bool,
    /// Service ids this staff member offers. Empty means every service.
    pub services: Vec<i32>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl StaffView {
    fn new(m: staff::Model, services: Vec<i32>) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            phone: m.phone,
            photo_url: m.photo_url,
            bio: m.bio,
            active: m.active,
            services,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaffInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub photo_url: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub service_ids: Vec<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaffPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub bio: Option<String>,
    pub active: Option<bool>,
    /// Replaces the whole set when present.
    pub service_ids: Option<Vec<i32>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaffFilter {
    pub active: Option<bool>,
    /// Only staff offering this service id.
    pub service: Option<i32>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// A staff member with no explicit service list offers every service.
pub fn offers(service_ids: &[i32], service_id: i32) -> bool { service_ids.is_empty() || service_ids.contains(&service_id) }

pub async fn service_ids_of<C: ConnectionTrait>(db: &C, staff_id: i32) -> ServiceResult<Vec<i32>> {
    let rows = offered::Entity::find()
        .filter(offered::Column::StaffId.eq(staff_id))
        .order_by_asc(offered::Column::ServiceId)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|r| r.service_id).collect())
}

async fn service_ids_for<C: ConnectionTrait>(db: &C, staff_ids: &[i32]) -> ServiceResult<HashMap<i32, Vec<i32>>> {
    let mut map: HashMap<i32, Vec<i32>> = HashMap::new();
    if staff_ids.is_empty() {
        return Ok(map);
    }
    let rows = offered::Entity::find()
        .filter(offered::Column::StaffId.is_in(staff_ids.to_vec()))
        .order_by_asc(offered::Column::ServiceId)
        .all(db)
        .await?;
    for r in rows {
        map.entry(r.staff_id).or_default().push(r.service_id);
    }
    Ok(map)
}

async fn check_services_exist<C: ConnectionTrait>(db: &C, ids: &[i32]) -> ServiceResult<Vec<i32>> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(ids);
    }
    let found = catalog::Entity::find().filter(catalog::Column::Id.is_in(ids.clone())).count(db).await?;
    if found as usize != ids.len() {
        return Err(ServiceError::Validation("service_ids: unknown service id".into()));
    }
    Ok(ids)
}

async fn replace_services<C: ConnectionTrait>(db: &C, staff_id: i32, ids: &[i32]) -> ServiceResult<()> {
    offered::Entity::delete_many().filter(offered::Column::StaffId.eq(staff_id)).exec(db).await?;
    if ids.is_empty() {
        return Ok(());
    }
    let links = ids.iter().map(|sid| offered::ActiveModel { staff_id: Set(staff_id), service_id: Set(*sid) });
    offered::Entity::insert_many(links).exec(db).await?;
    Ok(())
}

pub async fn list_staff(db: &DatabaseConnection, filter: &StaffFilter) -> ServiceResult<Vec<StaffView>> {
    let mut q = staff::Entity::find().order_by_asc(staff::Column::Name);
    if let Some(active) = filter.active {
        q = q.filter(staff::Column::Active.eq(active));
    }
    if let Some(service_id) = filter.service {
        let explicit = Query::select()
            .column(offered::Column::StaffId)
            .from(offered::Entity)
            .and_where(Expr::col(offered::Column::ServiceId).eq(service_id))
            .to_owned();
        let any_link = Query::select().column(offered::Column::StaffId).from(offered::Entity).to_owned();
        q = q.filter(
            Condition::any()
                .add(staff::Column::Id.in_subquery(explicit))
                .add(staff::Column::Id.not_in_subquery(any_link)),
        );
    }
    if let Some(term) = search_term(&filter.search) {
        q = q.filter(
            Condition::any()
                .add(lower_like((staff::Entity, staff::Column::Name), term))
                .add(lower_like((staff::Entity, staff::Column::Email), term)),
        );
    }
    let rows = fetch_page(q, db, Pagination::from_query(filter.page, filter.per_page)).await?;
    let ids: Vec<i32> = rows.iter().map(|s| s.id).collect();
    let mut services = service_ids_for(db, &ids).await?;
    Ok(rows
        .into_iter()
        .map(|s| {
            let sv = services.remove(&s.id).unwrap_or_default();
            StaffView::new(s, sv)
        })
        .collect())
}

pub async fn find_staff<C: ConnectionTrait>(db: &C, id: i32) -> ServiceResult<staff::Model> {
    staff::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("staff"))
}

pub async fn get_staff(db: &DatabaseConnection, id: i32) -> ServiceResult<StaffView> {
    let s = find_staff(db, id).await?;
    let services = service_ids_of(db, id).await?;
    Ok(StaffView::new(s, services))
}

pub async fn create_staff(db: &DatabaseConnection, input: StaffInput) -> ServiceResult<StaffView> {
    let name = validate_required("name", &input.name, 128)?;
    let email = validate_email(&input.email)?;
    let phone = validate_phone(&input.phone)?;
    let photo_url = validate_max_len("photo_url", &input.photo_url, 512)?;

    let txn = db.begin().await?;
    let service_ids = check_services_exist(&txn, &input.service_ids).await?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let am = staff::ActiveModel {
        name: Set(name),
        email: Set(email),
        phone: Set(phone),
        photo_url: Set(photo_url),
        bio: Set(input.bio.trim().to_string()),
        active: Set(input.active),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let m = am.insert(&txn).await?;
    replace_services(&txn, m.id, &service_ids).await?;
    txn.commit().await?;
    info!(staff_id = m.id, services = service_ids.len(), "staff_created");
    Ok(StaffView::new(m, service_ids))
}

pub async fn update_staff(db: &DatabaseConnection, id: i32, patch: StaffPatch) -> ServiceResult<StaffView> {
    let txn = db.begin().await?;
    let mut am: staff::ActiveModel = find_staff(&txn, id).await?.into();
    if let Some(name) = patch.name {
        am.name = Set(validate_required("name", &name, 128)?);
    }
    if let Some(email) = patch.email {
        am.email = Set(validate_email(&email)?);
    }
    if let Some(phone) = patch.phone {
        am.phone = Set(validate_phone(&phone)?);
    }
    if let Some(url) = patch.photo_url {
        am.photo_url = Set(validate_max_len("photo_url", &url, 512)?);
    }
    if let Some(bio) = patch.bio {
        am.bio = Set(bio.trim().to_string());
    }
    if let Some(active) = patch.active {
        am.active = Set(active);
    }
    am.updated_at = Set(Utc::now().into());
    let m = am.update(&txn).await?;
    if let Some(ids) = patch.service_ids {
        let ids = check_services_exist(&txn, &ids).await?;
        replace_services(&txn, id, &ids).await?;
    }
    let services = service_ids_of(&txn, id).await?;
    txn.commit().await?;
    Ok(StaffView::new(m, services))
}

pub async fn delete_staff(db: &DatabaseConnection, id: i32) -> ServiceResult<()> {
    let txn = db.begin().await?;
    offered::Entity::delete_many().filter(offered::Column::StaffId.eq(id)).exec(&txn).await?;
    let res = staff::Entity::delete_by_id(id).exec(&txn).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("staff"));
    }
    txn.commit().await?;
    info!(staff_id = id, "staff_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::catalog_service::{create_service, ServiceInput};
    use crate::test_support::get_db;
    use common::money::Amount;

    fn staff_input(name: &str, email: &str, service_ids: Vec<i32>) -> StaffInput {
        StaffInput {
            name: name.into(),
            email: email.into(),
            phone: "07395812669".into(),
            photo_url: String::new(),
            bio: String::new(),
            active: true,
            service_ids,
        }
    }

    async fn service(db: &DatabaseConnection, name: &str) -> anyhow::Result<i32> {
        let s = create_service(
            db,
            ServiceInput { name: name.into(), description: String::new(), duration_minutes: 30, price: Amount::Number(10.0), active: true },
        )
        .await?;
        Ok(s.id)
    }

    #[test]
    fn empty_service_list_offers_everything() {
        assert!(offers(&[], 4));
        assert!(offers(&[1, 4], 4));
        assert!(!offers(&[1, 2], 4));
    }

    #[tokio::test]
    async fn staff_crud_with_services() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let yoga = service(&db, "Yoga").await?;
        let reiki = service(&db, "Reiki").await?;

        let s = create_staff(&db, staff_input("Aly", "ALY@example.com", vec![yoga, yoga])).await?;
        assert_eq!(s.email, "aly@example.com");
        assert_eq!(s.services, vec![yoga]);

        let updated = update_staff(&db, s.id, StaffPatch { service_ids: Some(vec![reiki]), bio: Some("Teacher".into()), ..Default::default() }).await?;
        assert_eq!(updated.services, vec![reiki]);
        assert_eq!(updated.bio, "Teacher");

        let fetched = get_staff(&db, s.id).await?;
        assert_eq!(fetched.services, vec![reiki]);

        delete_staff(&db, s.id).await?;
        assert!(matches!(get_staff(&db, s.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_and_unknown_service_rejected() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        create_staff(&db, staff_input("Aly", "aly@example.com", vec![])).await?;
        let dup = create_staff(&db, staff_input("Other", "aly@example.com", vec![])).await;
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));
        let bad = create_staff(&db, staff_input("Sam", "sam@example.com", vec![999])).await;
        assert!(matches!(bad, Err(ServiceError::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn list_filters_by_offered_service() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let yoga = service(&db, "Yoga").await?;
        let reiki = service(&db, "Reiki").await?;
        create_staff(&db, staff_input("Ann", "ann@example.com", vec![yoga])).await?;
        create_staff(&db, staff_input("Ben", "ben@example.com", vec![reiki])).await?;
        create_staff(&db, staff_input("Cat", "cat@example.com", vec![])).await?;

        let names = |v: Vec<StaffView>| v.into_iter().map(|s| s.name).collect::<Vec<_>>();
        let yoga_staff = list_staff(&db, &StaffFilter { service: Some(yoga), ..Default::default() }).await?;
        assert_eq!(names(yoga_staff), vec!["Ann", "Cat"]);
        let found = list_staff(&db, &StaffFilter { search: Some("ben@".into()), ..Default::default() }).await?;
        assert_eq!(names(found), vec!["Ben"]);
        Ok(())
    }
}
