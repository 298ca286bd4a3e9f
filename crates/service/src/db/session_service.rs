//! Group classes and their enrollments.

use std::collections::HashMap;

use chrono::{FixedOffset, Utc};
use common::{money::{format_pence, Amount}, pagination::Pagination};
use sea_orm::{
    prelude::DateTimeWithTimeZone, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use models::{catalog, session, session_enrollment as enrollment, validate::validate_required};

use super::{client_service::find_client, default_true, fetch_page, staff_service::find_staff};
use crate::clock;
use crate::errors::{ServiceError, ServiceResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub staff: Option<i32>,
    pub start_time: DateTimeWithTimeZone,
    pub end_time: DateTimeWithTimeZone,
    pub duration_minutes: i32,
    pub capacity: i32,
    pub price: String,
    pub active: bool,
    pub enrolled_clients: Vec<i32>,
    pub enrollment_count: i64,
    pub available_spots: i64,
    pub is_full: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl SessionView {
    fn new(m: session::Model, enrolled_clients: Vec<i32>) -> Self {
        let count = enrolled_clients.len() as i64;
        Self {
            id: m.id,
            title: m.title.clone(),
            description: m.description.clone(),
            staff: m.staff_id,
            start_time: m.start_time,
            end_time: m.end_time(),
            duration_minutes: m.duration_minutes,
            capacity: m.capacity,
            price: format_pence(m.price_pence as i64),
            active: m.active,
            enrollment_count: count,
            available_spots: m.available_spots(count),
            is_full: m.is_full(count),
            enrolled_clients,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub staff: Option<i32>,
    pub start_time: DateTimeWithTimeZone,
    pub duration_minutes: i32,
    pub capacity: i32,
    pub price: Amount,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "common::serde_ext::double_option")]
    pub staff: Option<Option<i32>>,
    pub start_time: Option<DateTimeWithTimeZone>,
    pub duration_minutes: Option<i32>,
    pub capacity: Option<i32>,
    pub price: Option<Amount>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionFilter {
    pub active: Option<bool>,
    /// Only sessions starting from now on.
    pub upcoming: Option<bool>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrollInput {
    pub client: i32,
}

async fn enrolled_for(db: &DatabaseConnection, session_ids: &[i32]) -> ServiceResult<HashMap<i32, Vec<i32>>> {
    let mut map: HashMap<i32, Vec<i32>> = HashMap::new();
    if session_ids.is_empty() {
        return Ok(map);
    }
    let rows = enrollment::Entity::find()
        .filter(enrollment::Column::SessionId.is_in(session_ids.to_vec()))
        .order_by_asc(enrollment::Column::EnrolledAt)
        .order_by_asc(enrollment::Column::ClientId)
        .all(db)
        .await?;
    for r in rows {
        map.entry(r.session_id).or_default().push(r.client_id);
    }
    Ok(map)
}

async fn view(db: &DatabaseConnection, m: session::Model) -> ServiceResult<SessionView> {
    let clients = enrolled_for(db, &[m.id]).await?.remove(&m.id).unwrap_or_default();
    Ok(SessionView::new(m, clients))
}

/// Soonest first.
pub async fn list_sessions(db: &DatabaseConnection, offset: FixedOffset, filter: &SessionFilter) -> ServiceResult<Vec<SessionView>> {
    let mut q = session::Entity::find().order_by_asc(session::Column::StartTime);
    if let Some(active) = filter.active {
        q = q.filter(session::Column::Active.eq(active));
    }
    if filter.upcoming.unwrap_or(false) {
        q = q.filter(session::Column::StartTime.gte(clock::now(offset)));
    }
    let rows = fetch_page(q, db, Pagination::from_query(filter.page, filter.per_page)).await?;
    let ids: Vec<i32> = rows.iter().map(|s| s.id).collect();
    let mut enrolled = enrolled_for(db, &ids).await?;
    Ok(rows
        .into_iter()
        .map(|s| {
            let clients = enrolled.remove(&s.id).unwrap_or_default();
            SessionView::new(s, clients)
        })
        .collect())
}

async fn find_session(db: &DatabaseConnection, id: i32) -> ServiceResult<session::Model> {
    session::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("session"))
}

pub async fn get_session(db: &DatabaseConnection, id: i32) -> ServiceResult<SessionView> {
    let m = find_session(db, id).await?;
    view(db, m).await
}

pub async fn create_session(db: &DatabaseConnection, offset: FixedOffset, input: SessionInput) -> ServiceResult<SessionView> {
    if let Some(staff_id) = input.staff {
        find_staff(db, staff_id).await?;
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let am = session::ActiveModel {
        title: Set(validate_required("title", &input.title, 200)?),
        description: Set(input.description.trim().to_string()),
        staff_id: Set(input.staff),
        // Stored in business offset so range filters compare like for like.
        start_time: Set(input.start_time.with_timezone(&offset)),
        duration_minutes: Set(catalog::validate_duration(input.duration_minutes)?),
        capacity: Set(session::validate_capacity(input.capacity)?),
        price_pence: Set(catalog::validate_price(input.price.to_pence()?)?),
        active: Set(input.active),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let m = am.insert(db).await?;
    info!(session_id = m.id, start = %m.start_time, capacity = m.capacity, "session_created");
    Ok(SessionView::new(m, vec![]))
}

pub async fn update_session(db: &DatabaseConnection, offset: FixedOffset, id: i32, patch: SessionPatch) -> ServiceResult<SessionView> {
    let current = find_session(db, id).await?;
    let mut am: session::ActiveModel = current.into();
    if let Some(title) = patch.title {
        am.title = Set(validate_required("title", &title, 200)?);
    }
    if let Some(description) = patch.description {
        am.description = Set(description.trim().to_string());
    }
    if let Some(staff) = patch.staff {
        if let Some(staff_id) = staff {
            find_staff(db, staff_id).await?;
        }
        am.staff_id = Set(staff);
    }
    if let Some(start) = patch.start_time {
        am.start_time = Set(start.with_timezone(&offset));
    }
    if let Some(d) = patch.duration_minutes {
        am.duration_minutes = Set(catalog::validate_duration(d)?);
    }
    if let Some(c) = patch.capacity {
        let enrolled = enrollment::Entity::find().filter(enrollment::Column::SessionId.eq(id)).count(db).await?;
        let c = session::validate_capacity(c)?;
        if (c as u64) < enrolled {
            return Err(ServiceError::Validation(format!("capacity: {} clients are already enrolled", enrolled)));
        }
        am.capacity = Set(c);
    }
    if let Some(price) = patch.price {
        am.price_pence = Set(catalog::validate_price(price.to_pence()?)?);
    }
    if let Some(active) = patch.active {
        am.active = Set(active);
    }
    am.updated_at = Set(Utc::now().into());
    let m = am.update(db).await?;
    view(db, m).await
}

pub async fn delete_session(db: &DatabaseConnection, id: i32) -> ServiceResult<()> {
    let txn = db.begin().await?;
    enrollment::Entity::delete_many().filter(enrollment::Column::SessionId.eq(id)).exec(&txn).await?;
    let res = session::Entity::delete_by_id(id).exec(&txn).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("session"));
    }
    txn.commit().await?;
    info!(session_id = id, "session_deleted");
    Ok(())
}

/// Conflict when the session is full or the client is already enrolled.
pub async fn enroll(db: &DatabaseConnection, session_id: i32, client_id: i32) -> ServiceResult<SessionView> {
    let s = find_session(db, session_id).await?;
    if !s.active {
        return Err(ServiceError::Validation("session: session is not open for enrollment".into()));
    }
    find_client(db, client_id).await?;

    let txn = db.begin().await?;
    let existing = enrollment::Entity::find_by_id((session_id, client_id)).one(&txn).await?;
    if existing.is_some() {
        return Err(ServiceError::Conflict("client is already enrolled in this session".into()));
    }
    let enrolled = enrollment::Entity::find().filter(enrollment::Column::SessionId.eq(session_id)).count(&txn).await?;
    if s.is_full(enrolled as i64) {
        return Err(ServiceError::Conflict("session is full".into()));
    }
    enrollment::ActiveModel {
        session_id: Set(session_id),
        client_id: Set(client_id),
        enrolled_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    info!(session_id, client_id, enrolled = enrolled + 1, capacity = s.capacity, "session_enrolled");
    view(db, s).await
}

pub async fn unenroll(db: &DatabaseConnection, session_id: i32, client_id: i32) -> ServiceResult<SessionView> {
    let s = find_session(db, session_id).await?;
    let res = enrollment::Entity::delete_by_id((session_id, client_id)).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("enrollment"));
    }
    info!(session_id, client_id, "session_unenrolled");
    view(db, s).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::client_service::{create_client, ClientInput};
    use crate::test_support::{get_db, seed_staff};
    use chrono::{DateTime, Duration};

    fn utc() -> FixedOffset { FixedOffset::east_opt(0).unwrap() }

    fn input(title: &str, start: &str, capacity: i32) -> SessionInput {
        SessionInput {
            title: title.into(),
            description: String::new(),
            staff: None,
            start_time: DateTime::parse_from_rfc3339(start).unwrap(),
            duration_minutes: 60,
            capacity,
            price: Amount::Text("12.50".into()),
            active: true,
        }
    }

    async fn client(db: &DatabaseConnection, email: &str) -> anyhow::Result<i32> {
        let c = create_client(
            db,
            ClientInput { name: "C".into(), email: email.into(), phone: String::new(), notes: String::new(), marketing_consent: false },
        )
        .await?;
        Ok(c.id)
    }

    #[tokio::test]
    async fn enrollment_respects_capacity() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let s = create_session(&db, utc(), input("Sound bath", "2031-05-01T18:00:00+00:00", 2)).await?;
        assert_eq!(s.price, "12.50");
        assert_eq!(s.end_time - s.start_time, Duration::minutes(60));
        assert_eq!(s.available_spots, 2);

        let a = client(&db, "a@example.com").await?;
        let b = client(&db, "b@example.com").await?;
        let c = client(&db, "c@example.com").await?;

        enroll(&db, s.id, a).await?;
        assert!(matches!(enroll(&db, s.id, a).await, Err(ServiceError::Conflict(_))));
        let full = enroll(&db, s.id, b).await?;
        assert!(full.is_full);
        assert_eq!(full.available_spots, 0);
        assert_eq!(full.enrolled_clients, vec![a, b]);
        assert!(matches!(enroll(&db, s.id, c).await, Err(ServiceError::Conflict(_))));

        assert!(update_session(&db, utc(), s.id, SessionPatch { capacity: Some(1), ..Default::default() }).await.is_err());

        let after = unenroll(&db, s.id, a).await?;
        assert_eq!(after.enrollment_count, 1);
        assert!(matches!(unenroll(&db, s.id, a).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn list_filters_and_staff_assignment() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let staff = seed_staff(&db, "Aly", "aly@example.com").await?;
        let mut future = input("Future", "2031-05-01T18:00:00+00:00", 5);
        future.staff = Some(staff.id);
        let future = create_session(&db, utc(), future).await?;
        create_session(&db, utc(), input("Past", "2020-05-01T18:00:00+00:00", 5)).await?;
        let mut hidden = input("Hidden", "2031-06-01T18:00:00+00:00", 5);
        hidden.active = false;
        create_session(&db, utc(), hidden).await?;

        let upcoming = list_sessions(&db, utc(), &SessionFilter { upcoming: Some(true), active: Some(true), ..Default::default() }).await?;
        assert_eq!(upcoming.iter().map(|s| s.title.as_str()).collect::<Vec<_>>(), vec!["Future"]);
        assert_eq!(upcoming[0].staff, Some(staff.id));

        let cleared = update_session(&db, utc(), future.id, SessionPatch { staff: Some(None), ..Default::default() }).await?;
        assert_eq!(cleared.staff, None);
        assert!(update_session(&db, utc(), future.id, SessionPatch { staff: Some(Some(999)), ..Default::default() }).await.is_err());

        delete_session(&db, future.id).await?;
        assert!(matches!(get_session(&db, future.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
