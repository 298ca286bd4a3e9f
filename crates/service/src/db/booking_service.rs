use std::{collections::HashMap, sync::Arc};

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use common::{money::format_pence, pagination::Pagination};
use sea_orm::{
    prelude::DateTimeWithTimeZone, sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use models::{
    booking::{self, BookingStatus},
    catalog, client, intake_profile, staff,
    validate::validate_max_len,
};

use super::{client_service, fetch_page, lower_like, search_term, staff_service};
use crate::availability::{AvailabilityService, SeaOrmAvailabilityRepository, Slot, SlotRules};
use crate::clock;
use crate::errors::{ServiceError, ServiceResult};

/// Booking rules resolved from `[booking]` config.
#[derive(Debug, Clone)]
pub struct BookingPolicy {
    pub rules: SlotRules,
    pub require_intake: bool,
}

impl BookingPolicy {
    pub fn from_config(cfg: &configs::BookingConfig) -> ServiceResult<Self> {
        Ok(Self { rules: SlotRules::from_config(cfg)?, require_intake: cfg.require_intake })
    }

    fn availability<'a, C: ConnectionTrait>(&self, db: &'a C) -> AvailabilityService<SeaOrmAvailabilityRepository<'a, C>> {
        AvailabilityService::new(Arc::new(SeaOrmAvailabilityRepository::new(db, self.rules.offset)), self.rules.clone())
    }
}

/// Booking row joined with the names an admin list needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingView {
    pub id: i32,
    pub client: i32,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub service: i32,
    pub service_name: String,
    pub staff: i32,
    pub staff_name: String,
    pub start_time: DateTimeWithTimeZone,
    pub end_time: DateTimeWithTimeZone,
    /// Business-local date of `start_time`.
    pub date: NaiveDate,
    /// Business-local `HH:MM` of `start_time`.
    pub time: String,
    pub duration_minutes: i32,
    /// `"25.00"`
    pub price: String,
    pub status: BookingStatus,
    pub notes: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingInput {
    pub service: i32,
    pub staff: i32,
    pub date: NaiveDate,
    /// `HH:MM`
    pub time: String,
    /// Existing client id; otherwise the client is found or created by email.
    pub client: Option<i32>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    #[serde(default)]
    pub client_phone: String,
    #[serde(default)]
    pub notes: String,
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingPatch {
    pub status: Option<BookingStatus>,
    pub notes: Option<String>,
    pub staff: Option<i32>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingFilter {
    pub status: Option<String>,
    pub staff: Option<i32>,
    pub service: Option<i32>,
    pub client: Option<i32>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkStatusInput {
    pub ids: Vec<i32>,
    pub status: BookingStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotQuery {
    pub staff_id: i32,
    pub service_id: i32,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotList {
    pub date: NaiveDate,
    pub staff_id: i32,
    pub service_id: i32,
    pub duration_minutes: i32,
    pub slots: Vec<Slot>,
}

fn parse_time(field: &str, s: &str) -> ServiceResult<NaiveTime> {
    configs::parse_hhmm(s).map_err(|e| ServiceError::Validation(format!("{}: {}", field, e)))
}

/// Attach client, service and staff details to booking rows.
pub async fn views(db: &DatabaseConnection, policy: &BookingPolicy, rows: Vec<booking::Model>) -> ServiceResult<Vec<BookingView>> {
    let mut client_ids: Vec<i32> = rows.iter().map(|b| b.client_id).collect();
    let mut service_ids: Vec<i32> = rows.iter().map(|b| b.service_id).collect();
    let mut staff_ids: Vec<i32> = rows.iter().map(|b| b.staff_id).collect();
    for v in [&mut client_ids, &mut service_ids, &mut staff_ids] {
        v.sort_unstable();
        v.dedup();
    }
    let clients: HashMap<i32, client::Model> = client::Entity::find()
        .filter(client::Column::Id.is_in(client_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();
    let services: HashMap<i32, catalog::Model> = catalog::Entity::find()
        .filter(catalog::Column::Id.is_in(service_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    let staff: HashMap<i32, staff::Model> = staff::Entity::find()
        .filter(staff::Column::Id.is_in(staff_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    let offset = policy.rules.offset;
    rows.into_iter()
        .map(|b| -> ServiceResult<BookingView> {
            let c = clients.get(&b.client_id).ok_or_else(|| ServiceError::not_found("client"))?;
            let s = services.get(&b.service_id).ok_or_else(|| ServiceError::not_found("service"))?;
            let st = staff.get(&b.staff_id).ok_or_else(|| ServiceError::not_found("staff"))?;
            let local = clock::to_local(&b.start_time, offset);
            Ok(BookingView {
                id: b.id,
                client: c.id,
                client_name: c.name.clone(),
                client_email: c.email.clone(),
                client_phone: c.phone.clone(),
                service: s.id,
                service_name: s.name.clone(),
                staff: st.id,
                staff_name: st.name.clone(),
                start_time: b.start_time,
                end_time: b.end_time,
                date: local.date(),
                time: local.format("%H:%M").to_string(),
                duration_minutes: s.duration_minutes,
                price: format_pence(s.price_pence as i64),
                status: b.status,
                notes: b.notes,
                created_at: b.created_at,
                updated_at: b.updated_at,
            })
        })
        .collect()
}

/// Bookings matching `filter`, newest start first. `ids` narrows to a selection.
pub async fn find_bookings(
    db: &DatabaseConnection,
    policy: &BookingPolicy,
    filter: &BookingFilter,
    ids: Option<&[i32]>,
) -> ServiceResult<Vec<booking::Model>> {
    let offset = policy.rules.offset;
    let mut q = booking::Entity::find().order_by_desc(booking::Column::StartTime).order_by_desc(booking::Column::Id);
    if let Some(status) = filter.status.as_deref().filter(|s| !s.trim().is_empty()) {
        let status: BookingStatus = status.parse()?;
        q = q.filter(booking::Column::Status.eq(status));
    }
    if let Some(id) = filter.staff {
        q = q.filter(booking::Column::StaffId.eq(id));
    }
    if let Some(id) = filter.service {
        q = q.filter(booking::Column::ServiceId.eq(id));
    }
    if let Some(id) = filter.client {
        q = q.filter(booking::Column::ClientId.eq(id));
    }
    if let Some(from) = filter.date_from {
        q = q.filter(booking::Column::StartTime.gte(clock::day_bounds(from, offset).0));
    }
    if let Some(to) = filter.date_to {
        q = q.filter(booking::Column::StartTime.lt(clock::day_bounds(to, offset).1));
    }
    if let Some(ids) = ids {
        q = q.filter(booking::Column::Id.is_in(ids.to_vec()));
    }
    if let Some(term) = search_term(&filter.search) {
        q = q.join(JoinType::InnerJoin, booking::Relation::Client.def()).filter(
            Condition::any()
                .add(lower_like((client::Entity, client::Column::Name), term))
                .add(lower_like((client::Entity, client::Column::Email), term))
                .add(lower_like((booking::Entity, booking::Column::Notes), term)),
        );
    }
    Ok(fetch_page(q, db, Pagination::from_query(filter.page, filter.per_page)).await?)
}

pub async fn list_bookings(db: &DatabaseConnection, policy: &BookingPolicy, filter: &BookingFilter) -> ServiceResult<Vec<BookingView>> {
    let rows = find_bookings(db, policy, filter, None).await?;
    views(db, policy, rows).await
}

pub async fn find_booking(db: &DatabaseConnection, id: i32) -> ServiceResult<booking::Model> {
    booking::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("booking"))
}

pub async fn get_booking(db: &DatabaseConnection, policy: &BookingPolicy, id: i32) -> ServiceResult<BookingView> {
    let b = find_booking(db, id).await?;
    one_view(db, policy, b).await
}

async fn one_view(db: &DatabaseConnection, policy: &BookingPolicy, b: booking::Model) -> ServiceResult<BookingView> {
    views(db, policy, vec![b]).await?.pop().ok_or_else(|| ServiceError::not_found("booking"))
}

/// Active service and active staff member who offers it.
async fn bookable(db: &DatabaseConnection, service_id: i32, staff_id: i32) -> ServiceResult<(catalog::Model, staff::Model)> {
    let service = catalog::Entity::find_by_id(service_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::Validation("service: unknown service".into()))?;
    if !service.active {
        return Err(ServiceError::Validation("service: service is not available for booking".into()));
    }
    let member = staff::Entity::find_by_id(staff_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::Validation("staff: unknown staff member".into()))?;
    if !member.active {
        return Err(ServiceError::Validation("staff: staff member is not available for booking".into()));
    }
    let offered = staff_service::service_ids_of(db, staff_id).await?;
    if !staff_service::offers(&offered, service_id) {
        return Err(ServiceError::Validation("staff: staff member does not offer this service".into()));
    }
    Ok((service, member))
}

async fn ensure_slot_free<C: ConnectionTrait>(
    db: &C,
    policy: &BookingPolicy,
    staff_id: i32,
    date: NaiveDate,
    start: NaiveTime,
    duration_minutes: i32,
    exclude: Option<i32>,
) -> ServiceResult<()> {
    let now = clock::now_local(policy.rules.offset);
    let verdict = policy.availability(db).check(staff_id, date, start, duration_minutes as i64, exclude, now).await?;
    verdict.map_err(|reason| {
        warn!(staff_id, %date, time = %start.format("%H:%M"), ?reason, "slot_unavailable");
        ServiceError::Conflict(format!("time slot not available: {}", reason.describe()))
    })
}

async fn ensure_intake(db: &DatabaseConnection, email: &str) -> ServiceResult<()> {
    let profile = intake_profile::Entity::find().filter(intake_profile::Column::Email.eq(email)).one(db).await?;
    match profile {
        Some(p) if p.is_valid_for_booking(Utc::now().into()) => Ok(()),
        _ => Err(ServiceError::Validation("client: a completed, unexpired intake form is required before booking".into())),
    }
}

#[instrument(skip(db, policy, input), fields(service = input.service, staff = input.staff, date = %input.date))]
pub async fn create_booking(db: &DatabaseConnection, policy: &BookingPolicy, input: BookingInput) -> ServiceResult<BookingView> {
    let start = parse_time("time", &input.time)?;
    let notes = validate_max_len("notes", &input.notes, 2000)?;
    let (service, member) = bookable(db, input.service, input.staff).await?;

    let existing_client = match input.client {
        Some(id) => Some(client_service::find_client(db, id).await?),
        None => None,
    };
    let email = match (&existing_client, input.client_email.as_deref()) {
        (Some(c), _) => c.email.clone(),
        (None, Some(e)) => models::validate::validate_email(e)?,
        (None, None) => return Err(ServiceError::Validation("client_email: required when no client id is given".into())),
    };
    if policy.require_intake {
        ensure_intake(db, &email).await?;
    }

    let status = input.status.unwrap_or(BookingStatus::Confirmed);
    let offset = policy.rules.offset;
    let start_ts = clock::at(input.date, start, offset);
    let end_ts = start_ts + Duration::minutes(service.duration_minutes as i64);

    let txn = db.begin().await?;
    if status.is_blocking() {
        if let Err(e) = ensure_slot_free(&txn, policy, member.id, input.date, start, service.duration_minutes, None).await {
            txn.rollback().await?;
            return Err(e);
        }
    }
    let client = match existing_client {
        Some(c) => c,
        None => {
            let name = input.client_name.as_deref().unwrap_or_default();
            client_service::upsert_by_email(&txn, name, &email, &input.client_phone).await?
        }
    };
    let now: DateTimeWithTimeZone = Utc::now().into();
    let am = booking::ActiveModel {
        client_id: Set(client.id),
        service_id: Set(service.id),
        staff_id: Set(member.id),
        start_time: Set(start_ts),
        end_time: Set(end_ts),
        status: Set(status),
        notes: Set(notes),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let b = am.insert(&txn).await?;
    txn.commit().await?;
    info!(event = "booking_created", booking_id = b.id, client_id = client.id, staff_id = member.id, status = %b.status, "booking_created");
    one_view(db, policy, b).await
}

#[instrument(skip(db, policy, patch))]
pub async fn update_booking(db: &DatabaseConnection, policy: &BookingPolicy, id: i32, patch: BookingPatch) -> ServiceResult<BookingView> {
    let current = find_booking(db, id).await?;
    let offset = policy.rules.offset;
    let status = patch.status.unwrap_or(current.status);
    let moved = patch.date.is_some() || patch.time.is_some() || patch.staff.is_some();
    let local = clock::to_local(&current.start_time, offset);

    let mut am: booking::ActiveModel = current.clone().into();
    // (staff, date, start, minutes) that must be free before saving
    let mut needs_slot: Option<(i32, NaiveDate, NaiveTime, i32)> = None;
    if moved {
        let date = patch.date.unwrap_or(local.date());
        let start = match patch.time.as_deref() {
            Some(t) => parse_time("time", t)?,
            None => local.time(),
        };
        let staff_id = patch.staff.unwrap_or(current.staff_id);
        let (service, _) = bookable(db, current.service_id, staff_id).await?;
        if status.is_blocking() {
            needs_slot = Some((staff_id, date, start, service.duration_minutes));
        }
        let start_ts = clock::at(date, start, offset);
        am.staff_id = Set(staff_id);
        am.start_time = Set(start_ts);
        am.end_time = Set(start_ts + Duration::minutes(service.duration_minutes as i64));
        info!(event = "booking_rescheduled", booking_id = id, staff_id, %date, "booking_rescheduled");
    } else if status.is_blocking() && !current.status.is_blocking() {
        // Re-opening a cancelled booking must not double-book.
        let duration = (current.end_time - current.start_time).num_minutes() as i32;
        needs_slot = Some((current.staff_id, local.date(), local.time(), duration));
    }
    if let Some(notes) = patch.notes {
        am.notes = Set(validate_max_len("notes", &notes, 2000)?);
    }
    am.status = Set(status);
    am.updated_at = Set(Utc::now().into());

    let txn = db.begin().await?;
    if let Some((staff_id, date, start, minutes)) = needs_slot {
        if let Err(e) = ensure_slot_free(&txn, policy, staff_id, date, start, minutes, Some(id)).await {
            txn.rollback().await?;
            return Err(e);
        }
    }
    let b = am.update(&txn).await?;
    txn.commit().await?;
    one_view(db, policy, b).await
}

/// Idempotent; completed bookings cannot be cancelled. The flag is false
/// when the booking was already cancelled.
pub async fn cancel_booking(db: &DatabaseConnection, policy: &BookingPolicy, id: i32) -> ServiceResult<(BookingView, bool)> {
    let current = find_booking(db, id).await?;
    match current.status {
        BookingStatus::Cancelled => return Ok((one_view(db, policy, current).await?, false)),
        BookingStatus::Completed => return Err(ServiceError::Validation("status: completed bookings cannot be cancelled".into())),
        _ => {}
    }
    let mut am: booking::ActiveModel = current.into();
    am.status = Set(BookingStatus::Cancelled);
    am.updated_at = Set(Utc::now().into());
    let b = am.update(db).await?;
    info!(event = "booking_cancelled", booking_id = id, "booking_cancelled");
    Ok((one_view(db, policy, b).await?, true))
}

/// Set `status` on every listed booking; returns how many rows changed.
/// Only closing statuses are accepted: re-opening goes through
/// [`update_booking`], which checks the slot.
pub async fn bulk_update_status(db: &DatabaseConnection, input: BulkStatusInput) -> ServiceResult<u64> {
    if input.status.is_blocking() {
        return Err(ServiceError::Validation(format!(
            "status: bulk updates only accept completed, cancelled or no_show, not {}",
            input.status
        )));
    }
    if input.ids.is_empty() {
        return Ok(0);
    }
    let res = booking::Entity::update_many()
        .col_expr(booking::Column::Status, Expr::value(input.status))
        .col_expr(booking::Column::UpdatedAt, Expr::value(DateTimeWithTimeZone::from(Utc::now())))
        .filter(booking::Column::Id.is_in(input.ids.clone()))
        .exec(db)
        .await?;
    info!(event = "booking_bulk_status", status = %input.status, requested = input.ids.len(), updated = res.rows_affected, "booking_bulk_status");
    Ok(res.rows_affected)
}

pub async fn delete_booking(db: &DatabaseConnection, id: i32) -> ServiceResult<()> {
    let res = booking::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("booking"));
    }
    info!(booking_id = id, "booking_deleted");
    Ok(())
}

/// Candidate slots for a service with one staff member on a date.
pub async fn slots(db: &DatabaseConnection, policy: &BookingPolicy, query: &SlotQuery) -> ServiceResult<SlotList> {
    let service = super::catalog_service::find_service(db, query.service_id).await?;
    let member = staff_service::find_staff(db, query.staff_id).await?;
    let offered = staff_service::service_ids_of(db, member.id).await?;
    let mut list = SlotList {
        date: query.date,
        staff_id: member.id,
        service_id: service.id,
        duration_minutes: service.duration_minutes,
        slots: vec![],
    };
    if !service.active || !member.active || !staff_service::offers(&offered, service.id) {
        return Ok(list);
    }
    let now = clock::now_local(policy.rules.offset);
    list.slots = policy.availability(db).slots(member.id, query.date, service.duration_minutes as i64, now).await?;
    Ok(list)
}
