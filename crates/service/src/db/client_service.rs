use std::collections::HashMap;

use chrono::{FixedOffset, NaiveDate, Utc};
use common::{money::format_pence, pagination::Pagination};
use sea_orm::{
    prelude::DateTimeWithTimeZone, sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, FromQueryResult, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use models::{
    booking::{self, BookingStatus},
    catalog, client,
    validate::{validate_email, validate_phone, validate_required},
};

use super::{fetch_page, lower_like, search_term};
use crate::clock;
use crate::errors::{ServiceError, ServiceResult};

/// Derived figures over confirmed and completed bookings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientStats {
    pub total_bookings: i64,
    pub total_spent_pence: i64,
    pub last_booking_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientView {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub notes: String,
    pub marketing_consent: bool,
    pub total_bookings: i64,
    /// `"25.00"`
    pub total_spent: String,
    pub last_booking_date: Option<NaiveDate>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl ClientView {
    pub fn new(m: client::Model, stats: ClientStats) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            phone: m.phone,
            notes: m.notes,
            marketing_consent: m.marketing_consent,
            total_bookings: stats.total_bookings,
            total_spent: format_pence(stats.total_spent_pence),
            last_booking_date: stats.last_booking_date,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub marketing_consent: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub marketing_consent: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientFilter {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, FromQueryResult)]
struct TotalsRow {
    client_id: i32,
    booking_count: i64,
    total_spent: Option<i64>,
    last_start: Option<DateTimeWithTimeZone>,
}

/// Aggregate stats for a set of clients in one grouped query. Dates are
/// business-local.
pub async fn stats_for<C: ConnectionTrait>(
    db: &C,
    offset: FixedOffset,
    client_ids: &[i32],
) -> ServiceResult<HashMap<i32, ClientStats>> {
    let mut out: HashMap<i32, ClientStats> = HashMap::new();
    if client_ids.is_empty() {
        return Ok(out);
    }
    let totals = booking::Entity::find()
        .select_only()
        .column(booking::Column::ClientId)
        .column_as(Expr::col((booking::Entity, booking::Column::Id)).count(), "booking_count")
        .column_as(Expr::col((catalog::Entity, catalog::Column::PricePence)).sum(), "total_spent")
        .column_as(Expr::col((booking::Entity, booking::Column::StartTime)).max(), "last_start")
        .join(JoinType::InnerJoin, booking::Relation::Service.def())
        .filter(booking::Column::Status.is_in(BookingStatus::BILLABLE))
        .filter(booking::Column::ClientId.is_in(client_ids.to_vec()))
        .group_by(booking::Column::ClientId)
        .into_model::<TotalsRow>()
        .all(db)
        .await?;
    for row in totals {
        let entry = out.entry(row.client_id).or_default();
        entry.total_bookings = row.booking_count;
        entry.total_spent_pence = row.total_spent.unwrap_or(0);
        entry.last_booking_date = row.last_start.map(|ts| clock::to_local(&ts, offset).date());
    }
    debug!(clients = client_ids.len(), with_bookings = out.len(), "client_stats");
    Ok(out)
}

pub async fn list_clients(db: &DatabaseConnection, offset: FixedOffset, filter: &ClientFilter) -> ServiceResult<Vec<ClientView>> {
    let mut q = client::Entity::find().order_by_asc(client::Column::Name);
    if let Some(term) = search_term(&filter.search) {
        q = q.filter(
            Condition::any()
                .add(lower_like((client::Entity, client::Column::Name), term))
                .add(lower_like((client::Entity, client::Column::Email), term))
                .add(lower_like((client::Entity, client::Column::Phone), term)),
        );
    }
    let rows = fetch_page(q, db, Pagination::from_query(filter.page, filter.per_page)).await?;
    let ids: Vec<i32> = rows.iter().map(|c| c.id).collect();
    let mut stats = stats_for(db, offset, &ids).await?;
    Ok(rows
        .into_iter()
        .map(|c| {
            let s = stats.remove(&c.id).unwrap_or_default();
            ClientView::new(c, s)
        })
        .collect())
}

pub async fn find_client<C: ConnectionTrait>(db: &C, id: i32) -> ServiceResult<client::Model> {
    client::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("client"))
}

pub async fn get_client(db: &DatabaseConnection, offset: FixedOffset, id: i32) -> ServiceResult<ClientView> {
    let c = find_client(db, id).await?;
    let stats = stats_for(db, offset, &[id]).await?.remove(&id).unwrap_or_default();
    Ok(ClientView::new(c, stats))
}

pub async fn create_client(db: &DatabaseConnection, input: ClientInput) -> ServiceResult<ClientView> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let am = client::ActiveModel {
        name: Set(validate_required("name", &input.name, 128)?),
        email: Set(validate_email(&input.email)?),
        phone: Set(validate_phone(&input.phone)?),
        notes: Set(input.notes.trim().to_string()),
        marketing_consent: Set(input.marketing_consent),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let m = am.insert(db).await?;
    info!(client_id = m.id, "client_created");
    Ok(ClientView::new(m, ClientStats::default()))
}

/// Existing client with this email, or a new one. Blank name/phone on an
/// existing record are filled in from the request.
pub async fn upsert_by_email<C: ConnectionTrait>(db: &C, name: &str, email: &str, phone: &str) -> ServiceResult<client::Model> {
    let email = validate_email(email)?;
    let phone = validate_phone(phone)?;
    if let Some(existing) = client::Entity::find().filter(client::Column::Email.eq(email.clone())).one(db).await? {
        let fill_name = existing.name.is_empty() && !name.trim().is_empty();
        let fill_phone = existing.phone.is_empty() && !phone.is_empty();
        if !(fill_name || fill_phone) {
            return Ok(existing);
        }
        let mut am: client::ActiveModel = existing.into();
        if fill_name {
            am.name = Set(validate_required("client_name", name, 128)?);
        }
        if fill_phone {
            am.phone = Set(phone);
        }
        am.updated_at = Set(Utc::now().into());
        return Ok(am.update(db).await?);
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let am = client::ActiveModel {
        name: Set(validate_required("client_name", name, 128)?),
        email: Set(email),
        phone: Set(phone),
        notes: Set(String::new()),
        marketing_consent: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let m = am.insert(db).await?;
    info!(client_id = m.id, "client_created_from_booking");
    Ok(m)
}

pub async fn update_client(db: &DatabaseConnection, offset: FixedOffset, id: i32, patch: ClientPatch) -> ServiceResult<ClientView> {
    let mut am: client::ActiveModel = find_client(db, id).await?.into();
    if let Some(name) = patch.name {
        am.name = Set(validate_required("name", &name, 128)?);
    }
    if let Some(email) = patch.email {
        am.email = Set(validate_email(&email)?);
    }
    if let Some(phone) = patch.phone {
        am.phone = Set(validate_phone(&phone)?);
    }
    if let Some(notes) = patch.notes {
        am.notes = Set(notes.trim().to_string());
    }
    if let Some(consent) = patch.marketing_consent {
        am.marketing_consent = Set(consent);
    }
    am.updated_at = Set(Utc::now().into());
    let m = am.update(db).await?;
    let stats = stats_for(db, offset, &[id]).await?.remove(&id).unwrap_or_default();
    Ok(ClientView::new(m, stats))
}

/// Deleting a client removes their bookings too.
pub async fn delete_client(db: &DatabaseConnection, id: i32) -> ServiceResult<()> {
    let res = client::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("client"));
    }
    info!(client_id = id, "client_deleted");
    Ok(())
}
