//! Business hours, staff schedules, closures and staff leave.

use chrono::{NaiveDate, NaiveTime};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::info;

use models::{business_hours, closure, staff_leave, staff_schedule, validate::validate_max_len};

use super::{default_true, staff_service::find_staff};
use crate::errors::{ServiceError, ServiceResult};

fn parse_time(field: &str, s: &str) -> ServiceResult<NaiveTime> {
    configs::parse_hhmm(s).map_err(|e| ServiceError::Validation(format!("{}: {}", field, e)))
}

fn parse_opt_time(field: &str, s: Option<&str>) -> ServiceResult<Option<NaiveTime>> {
    s.filter(|v| !v.trim().is_empty()).map(|v| parse_time(field, v)).transpose()
}

fn hhmm(t: NaiveTime) -> String { t.format("%H:%M").to_string() }

// ---- business hours ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessHoursView {
    pub id: i32,
    pub day_of_week: i16,
    pub day_name: String,
    pub is_open: bool,
    pub open_time: String,
    pub close_time: String,
}

impl From<business_hours::Model> for BusinessHoursView {
    fn from(m: business_hours::Model) -> Self {
        Self {
            id: m.id,
            day_of_week: m.day_of_week,
            day_name: business_hours::day_name(m.day_of_week).to_string(),
            is_open: m.is_open,
            open_time: hhmm(m.open_time),
            close_time: hhmm(m.close_time),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BusinessHoursInput {
    pub day_of_week: i16,
    #[serde(default = "default_true")]
    pub is_open: bool,
    pub open_time: String,
    pub close_time: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BusinessHoursPatch {
    pub day_of_week: Option<i16>,
    pub is_open: Option<bool>,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
}

pub async fn list_business_hours(db: &DatabaseConnection) -> ServiceResult<Vec<BusinessHoursView>> {
    let rows = business_hours::Entity::find().order_by_asc(business_hours::Column::DayOfWeek).all(db).await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

async fn find_business_hours(db: &DatabaseConnection, id: i32) -> ServiceResult<business_hours::Model> {
    business_hours::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("business hours"))
}

pub async fn get_business_hours(db: &DatabaseConnection, id: i32) -> ServiceResult<BusinessHoursView> {
    Ok(find_business_hours(db, id).await?.into())
}

/// A second row for the same weekday is a conflict.
pub async fn create_business_hours(db: &DatabaseConnection, input: BusinessHoursInput) -> ServiceResult<BusinessHoursView> {
    let open = parse_time("open_time", &input.open_time)?;
    let close = parse_time("close_time", &input.close_time)?;
    business_hours::validate(input.day_of_week, input.is_open, open, close)?;
    let am = business_hours::ActiveModel {
        day_of_week: Set(input.day_of_week),
        is_open: Set(input.is_open),
        open_time: Set(open),
        close_time: Set(close),
        ..Default::default()
    };
    let m = am.insert(db).await?;
    info!(day = m.day_of_week, is_open = m.is_open, "business_hours_created");
    Ok(m.into())
}

pub async fn update_business_hours(db: &DatabaseConnection, id: i32, patch: BusinessHoursPatch) -> ServiceResult<BusinessHoursView> {
    let current = find_business_hours(db, id).await?;
    let day = patch.day_of_week.unwrap_or(current.day_of_week);
    let is_open = patch.is_open.unwrap_or(current.is_open);
    let open = match patch.open_time.as_deref() {
        Some(t) => parse_time("open_time", t)?,
        None => current.open_time,
    };
    let close = match patch.close_time.as_deref() {
        Some(t) => parse_time("close_time", t)?,
        None => current.close_time,
    };
    business_hours::validate(day, is_open, open, close)?;
    let mut am: business_hours::ActiveModel = current.into();
    am.day_of_week = Set(day);
    am.is_open = Set(is_open);
    am.open_time = Set(open);
    am.close_time = Set(close);
    Ok(am.update(db).await?.into())
}

pub async fn delete_business_hours(db: &DatabaseConnection, id: i32) -> ServiceResult<()> {
    let res = business_hours::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("business hours"));
    }
    Ok(())
}

// ---- staff schedules ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffScheduleView {
    pub id: i32,
    pub staff: i32,
    pub day_of_week: i16,
    pub day_name: String,
    pub is_working: bool,
    pub start_time: String,
    pub end_time: String,
}

impl From<staff_schedule::Model> for StaffScheduleView {
    fn from(m: staff_schedule::Model) -> Self {
        Self {
            id: m.id,
            staff: m.staff_id,
            day_of_week: m.day_of_week,
            day_name: business_hours::day_name(m.day_of_week).to_string(),
            is_working: m.is_working,
            start_time: hhmm(m.start_time),
            end_time: hhmm(m.end_time),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaffScheduleInput {
    pub staff: i32,
    pub day_of_week: i16,
    #[serde(default = "default_true")]
    pub is_working: bool,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaffSchedulePatch {
    pub day_of_week: Option<i16>,
    pub is_working: Option<bool>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaffFilterQuery {
    pub staff: Option<i32>,
}

pub async fn list_staff_schedules(db: &DatabaseConnection, q: &StaffFilterQuery) -> ServiceResult<Vec<StaffScheduleView>> {
    let mut sel = staff_schedule::Entity::find()
        .order_by_asc(staff_schedule::Column::StaffId)
        .order_by_asc(staff_schedule::Column::DayOfWeek);
    if let Some(staff_id) = q.staff {
        sel = sel.filter(staff_schedule::Column::StaffId.eq(staff_id));
    }
    Ok(sel.all(db).await?.into_iter().map(Into::into).collect())
}

async fn find_staff_schedule(db: &DatabaseConnection, id: i32) -> ServiceResult<staff_schedule::Model> {
    staff_schedule::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("staff schedule"))
}

pub async fn get_staff_schedule(db: &DatabaseConnection, id: i32) -> ServiceResult<StaffScheduleView> {
    Ok(find_staff_schedule(db, id).await?.into())
}

pub async fn create_staff_schedule(db: &DatabaseConnection, input: StaffScheduleInput) -> ServiceResult<StaffScheduleView> {
    find_staff(db, input.staff).await?;
    let start = parse_time("start_time", &input.start_time)?;
    let end = parse_time("end_time", &input.end_time)?;
    staff_schedule::validate(input.day_of_week, input.is_working, start, end)?;
    let am = staff_schedule::ActiveModel {
        staff_id: Set(input.staff),
        day_of_week: Set(input.day_of_week),
        is_working: Set(input.is_working),
        start_time: Set(start),
        end_time: Set(end),
        ..Default::default()
    };
    let m = am.insert(db).await?;
    info!(staff_id = m.staff_id, day = m.day_of_week, "staff_schedule_created");
    Ok(m.into())
}

pub async fn update_staff_schedule(db: &DatabaseConnection, id: i32, patch: StaffSchedulePatch) -> ServiceResult<StaffScheduleView> {
    let current = find_staff_schedule(db, id).await?;
    let day = patch.day_of_week.unwrap_or(current.day_of_week);
    let working = patch.is_working.unwrap_or(current.is_working);
    let start = match patch.start_time.as_deref() {
        Some(t) => parse_time("start_time", t)?,
        None => current.start_time,
    };
    let end = match patch.end_time.as_deref() {
        Some(t) => parse_time("end_time", t)?,
        None => current.end_time,
    };
    staff_schedule::validate(day, working, start, end)?;
    let mut am: staff_schedule::ActiveModel = current.into();
    am.day_of_week = Set(day);
    am.is_working = Set(working);
    am.start_time = Set(start);
    am.end_time = Set(end);
    Ok(am.update(db).await?.into())
}

pub async fn delete_staff_schedule(db: &DatabaseConnection, id: i32) -> ServiceResult<()> {
    let res = staff_schedule::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("staff schedule"));
    }
    Ok(())
}

// ---- closures ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureView {
    pub id: i32,
    pub date: NaiveDate,
    pub reason: String,
    pub all_day: bool,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl From<closure::Model> for ClosureView {
    fn from(m: closure::Model) -> Self {
        Self {
            id: m.id,
            date: m.date,
            reason: m.reason,
            all_day: m.all_day,
            start_time: m.start_time.map(hhmm),
            end_time: m.end_time.map(hhmm),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClosureInput {
    pub date: NaiveDate,
    #[serde(default)]
    pub reason: String,
    #[serde(default = "default_true")]
    pub all_day: bool,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClosurePatch {
    pub date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub all_day: Option<bool>,
    #[serde(default, deserialize_with = "common::serde_ext::double_option")]
    pub start_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "common::serde_ext::double_option")]
    pub end_time: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClosureFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// Newest first.
pub async fn list_closures(db: &DatabaseConnection, f: &ClosureFilter) -> ServiceResult<Vec<ClosureView>> {
    let mut sel = closure::Entity::find().order_by_desc(closure::Column::Date).order_by_asc(closure::Column::Id);
    if let Some(from) = f.date_from {
        sel = sel.filter(closure::Column::Date.gte(from));
    }
    if let Some(to) = f.date_to {
        sel = sel.filter(closure::Column::Date.lte(to));
    }
    Ok(sel.all(db).await?.into_iter().map(Into::into).collect())
}

async fn find_closure(db: &DatabaseConnection, id: i32) -> ServiceResult<closure::Model> {
    closure::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("closure"))
}

pub async fn get_closure(db: &DatabaseConnection, id: i32) -> ServiceResult<ClosureView> {
    Ok(find_closure(db, id).await?.into())
}

pub async fn create_closure(db: &DatabaseConnection, input: ClosureInput) -> ServiceResult<ClosureView> {
    let start = parse_opt_time("start_time", input.start_time.as_deref())?;
    let end = parse_opt_time("end_time", input.end_time.as_deref())?;
    let (start, end) = closure::validate(input.all_day, start, end)?;
    let am = closure::ActiveModel {
        date: Set(input.date),
        reason: Set(validate_max_len("reason", &input.reason, 255)?),
        all_day: Set(input.all_day),
        start_time: Set(start),
        end_time: Set(end),
        ..Default::default()
    };
    let m = am.insert(db).await?;
    info!(date = %m.date, all_day = m.all_day, "closure_created");
    Ok(m.into())
}

pub async fn update_closure(db: &DatabaseConnection, id: i32, patch: ClosurePatch) -> ServiceResult<ClosureView> {
    let current = find_closure(db, id).await?;
    let all_day = patch.all_day.unwrap_or(current.all_day);
    let start = match patch.start_time {
        Some(v) => parse_opt_time("start_time", v.as_deref())?,
        None => current.start_time,
    };
    let end = match patch.end_time {
        Some(v) => parse_opt_time("end_time", v.as_deref())?,
        None => current.end_time,
    };
    let (start, end) = closure::validate(all_day, start, end)?;
    let mut am: closure::ActiveModel = current.into();
    if let Some(date) = patch.date {
        am.date = Set(date);
    }
    if let Some(reason) = patch.reason {
        am.reason = Set(validate_max_len("reason", &reason, 255)?);
    }
    am.all_day = Set(all_day);
    am.start_time = Set(start);
    am.end_time = Set(end);
    Ok(am.update(db).await?.into())
}

pub async fn delete_closure(db: &DatabaseConnection, id: i32) -> ServiceResult<()> {
    let res = closure::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("closure"));
    }
    Ok(())
}

// ---- staff leave ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffLeaveView {
    pub id: i32,
    pub staff: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}

impl From<staff_leave::Model> for StaffLeaveView {
    fn from(m: staff_leave::Model) -> Self {
        Self { id: m.id, staff: m.staff_id, start_date: m.start_date, end_date: m.end_date, reason: m.reason }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaffLeaveInput {
    pub staff: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaffLeavePatch {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
}

/// Most recent leave first.
pub async fn list_staff_leave(db: &DatabaseConnection, q: &StaffFilterQuery) -> ServiceResult<Vec<StaffLeaveView>> {
    let mut sel = staff_leave::Entity::find().order_by_desc(staff_leave::Column::StartDate);
    if let Some(staff_id) = q.staff {
        sel = sel.filter(staff_leave::Column::StaffId.eq(staff_id));
    }
    Ok(sel.all(db).await?.into_iter().map(Into::into).collect())
}

async fn find_staff_leave(db: &DatabaseConnection, id: i32) -> ServiceResult<staff_leave::Model> {
    staff_leave::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("staff leave"))
}

pub async fn get_staff_leave(db: &DatabaseConnection, id: i32) -> ServiceResult<StaffLeaveView> {
    Ok(find_staff_leave(db, id).await?.into())
}

pub async fn create_staff_leave(db: &DatabaseConnection, input: StaffLeaveInput) -> ServiceResult<StaffLeaveView> {
    find_staff(db, input.staff).await?;
    staff_leave::validate(input.start_date, input.end_date)?;
    let am = staff_leave::ActiveModel {
        staff_id: Set(input.staff),
        start_date: Set(input.start_date),
        end_date: Set(input.end_date),
        reason: Set(validate_max_len("reason", &input.reason, 255)?),
        ..Default::default()
    };
    let m = am.insert(db).await?;
    info!(staff_id = m.staff_id, from = %m.start_date, to = %m.end_date, "staff_leave_created");
    Ok(m.into())
}

pub async fn update_staff_leave(db: &DatabaseConnection, id: i32, patch: StaffLeavePatch) -> ServiceResult<StaffLeaveView> {
    let current = find_staff_leave(db, id).await?;
    let start = patch.start_date.unwrap_or(current.start_date);
    let end = patch.end_date.unwrap_or(current.end_date);
    staff_leave::validate(start, end)?;
    let mut am: staff_leave::ActiveModel = current.into();
    am.start_date = Set(start);
    am.end_date = Set(end);
    if let Some(reason) = patch.reason {
        am.reason = Set(validate_max_len("reason", &reason, 255)?);
    }
    Ok(am.update(db).await?.into())
}

pub async fn delete_staff_leave(db: &DatabaseConnection, id: i32) -> ServiceResult<()> {
    let res = staff_leave::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("staff leave"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_staff};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, day).unwrap() }

    #[tokio::test]
    async fn business_hours_unique_per_day() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let input = BusinessHoursInput { day_of_week: 2, is_open: true, open_time: "10:00".into(), close_time: "18:00".into() };
        let created = create_business_hours(&db, input.clone()).await?;
        assert_eq!(created.day_name, "Wednesday");
        assert_eq!(created.open_time, "10:00");
        assert!(matches!(create_business_hours(&db, input).await, Err(ServiceError::Conflict(_))));

        let bad = BusinessHoursInput { day_of_week: 3, is_open: true, open_time: "18:00".into(), close_time: "10:00".into() };
        assert!(create_business_hours(&db, bad).await.is_err());

        create_business_hours(&db, BusinessHoursInput { day_of_week: 0, is_open: true, open_time: "09:00".into(), close_time: "17:00".into() }).await?;
        let days: Vec<i16> = list_business_hours(&db).await?.iter().map(|b| b.day_of_week).collect();
        assert_eq!(days, vec![0, 2]);

        let closed = update_business_hours(&db, created.id, BusinessHoursPatch { is_open: Some(false), ..Default::default() }).await?;
        assert!(!closed.is_open);
        delete_business_hours(&db, created.id).await?;
        assert!(matches!(get_business_hours(&db, created.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn staff_schedule_unique_per_staff_day() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let staff = seed_staff(&db, "Aly", "aly@example.com").await?;
        let input = StaffScheduleInput { staff: staff.id, day_of_week: 1, is_working: true, start_time: "09:00".into(), end_time: "13:00".into() };
        let s = create_staff_schedule(&db, input.clone()).await?;
        assert!(matches!(create_staff_schedule(&db, input).await, Err(ServiceError::Conflict(_))));
        let missing = StaffScheduleInput { staff: 999, day_of_week: 1, is_working: true, start_time: "09:00".into(), end_time: "13:00".into() };
        assert!(matches!(create_staff_schedule(&db, missing).await, Err(ServiceError::NotFound(_))));

        let listed = list_staff_schedules(&db, &StaffFilterQuery { staff: Some(staff.id) }).await?;
        assert_eq!(listed.len(), 1);
        let u = update_staff_schedule(&db, s.id, StaffSchedulePatch { end_time: Some("15:30".into()), ..Default::default() }).await?;
        assert_eq!(u.end_time, "15:30");
        Ok(())
    }

    #[tokio::test]
    async fn closures_validate_window_and_sort_newest_first() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let all_day = create_closure(
            &db,
            ClosureInput { date: d(2031, 12, 25), reason: "Christmas".into(), all_day: true, start_time: Some("10:00".into()), end_time: None },
        )
        .await?;
        assert_eq!(all_day.start_time, None);

        let partial = create_closure(
            &db,
            ClosureInput { date: d(2031, 3, 1), reason: "Training".into(), all_day: false, start_time: Some("12:00".into()), end_time: Some("14:00".into()) },
        )
        .await?;
        assert_eq!(partial.end_time.as_deref(), Some("14:00"));

        let missing = ClosureInput { date: d(2031, 3, 2), reason: String::new(), all_day: false, start_time: None, end_time: None };
        assert!(create_closure(&db, missing).await.is_err());

        let dates: Vec<NaiveDate> = list_closures(&db, &ClosureFilter::default()).await?.iter().map(|c| c.date).collect();
        assert_eq!(dates, vec![d(2031, 12, 25), d(2031, 3, 1)]);
        let march = list_closures(&db, &ClosureFilter { date_from: Some(d(2031, 3, 1)), date_to: Some(d(2031, 3, 31)) }).await?;
        assert_eq!(march.len(), 1);

        let to_all_day = update_closure(&db, partial.id, ClosurePatch { all_day: Some(true), ..Default::default() }).await?;
        assert!(to_all_day.all_day);
        assert_eq!(to_all_day.start_time, None);
        let back = update_closure(
            &db,
            partial.id,
            ClosurePatch { all_day: Some(false), start_time: Some(Some("09:00".into())), end_time: Some(Some("10:00".into())), ..Default::default() },
        )
        .await?;
        assert_eq!(back.start_time.as_deref(), Some("09:00"));
        Ok(())
    }

    #[tokio::test]
    async fn staff_leave_dates_ordered() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let staff = seed_staff(&db, "Aly", "aly@example.com").await?;
        let leave = create_staff_leave(&db, StaffLeaveInput { staff: staff.id, start_date: d(2031, 8, 1), end_date: d(2031, 8, 14), reason: "Holiday".into() }).await?;
        let bad = StaffLeaveInput { staff: staff.id, start_date: d(2031, 8, 14), end_date: d(2031, 8, 1), reason: String::new() };
        assert!(create_staff_leave(&db, bad).await.is_err());
        assert!(update_staff_leave(&db, leave.id, StaffLeavePatch { end_date: Some(d(2031, 7, 1)), ..Default::default() }).await.is_err());
        let listed = list_staff_leave(&db, &StaffFilterQuery { staff: Some(staff.id) }).await?;
        assert_eq!(listed.len(), 1);
        delete_staff_leave(&db, leave.id).await?;
        assert!(list_staff_leave(&db, &StaffFilterQuery::default()).await?.is_empty());
        Ok(())
    }
}
