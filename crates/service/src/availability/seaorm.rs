use chrono::{Duration, FixedOffset, NaiveDate, NaiveDateTime};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use models::{booking, booking::BookingStatus, business_hours, closure, session, staff_leave, staff_schedule};

use super::domain::{ClosureWindow, DayHours, Interval};
use super::repository::AvailabilityRepository;
use crate::clock;
use crate::errors::ServiceError;

/// Upper bound on session length, used to widen the session lookup window.
const MAX_SESSION_MINUTES: i64 = models::catalog::MAX_DURATION_MINUTES as i64;

/// Reads through a borrowed connection, so checks can run inside the
/// transaction that writes the booking.
pub struct SeaOrmAvailabilityRepository<'a, C: ConnectionTrait> {
    pub db: &'a C,
    pub offset: FixedOffset,
}

impl<'a, C: ConnectionTrait> SeaOrmAvailabilityRepository<'a, C> {
    pub fn new(db: &'a C, offset: FixedOffset) -> Self { Self { db, offset } }
}

#[async_trait::async_trait]
impl<'a, C: ConnectionTrait> AvailabilityRepository for SeaOrmAvailabilityRepository<'a, C> {
    async fn business_hours(&self, day: i16) -> Result<Option<DayHours>, ServiceError> {
        let row = business_hours::Entity::find()
            .filter(business_hours::Column::DayOfWeek.eq(day))
            .one(self.db)
            .await?;
        Ok(row.map(|r| DayHours { open: r.is_open, start: r.open_time, end: r.close_time }))
    }

    async fn staff_schedule(&self, staff_id: i32, day: i16) -> Result<Option<DayHours>, ServiceError> {
        let row = staff_schedule::Entity::find()
            .filter(staff_schedule::Column::StaffId.eq(staff_id))
            .filter(staff_schedule::Column::DayOfWeek.eq(day))
            .one(self.db)
            .await?;
        Ok(row.map(|r| DayHours { open: r.is_working, start: r.start_time, end: r.end_time }))
    }

    async fn closures_on(&self, date: NaiveDate) -> Result<Vec<ClosureWindow>, ServiceError> {
        let rows = closure::Entity::find().filter(closure::Column::Date.eq(date)).all(self.db).await?;
        Ok(rows
            .into_iter()
            .map(|c| match (c.all_day, c.start_time, c.end_time) {
                (false, Some(start), Some(end)) => ClosureWindow::Partial { start, end },
                _ => ClosureWindow::AllDay,
            })
            .collect())
    }

    async fn staff_on_leave(&self, staff_id: i32, date: NaiveDate) -> Result<bool, ServiceError> {
        let hit = staff_leave::Entity::find()
            .filter(staff_leave::Column::StaffId.eq(staff_id))
            .filter(staff_leave::Column::StartDate.lte(date))
            .filter(staff_leave::Column::EndDate.gte(date))
            .one(self.db)
            .await?;
        Ok(hit.is_some())
    }

    async fn busy_intervals(
        &self,
        staff_id: i32,
        from: NaiveDateTime,
        to: NaiveDateTime,
        exclude_booking: Option<i32>,
    ) -> Result<Vec<Interval>, ServiceError> {
        let window = Interval::new(from, to);
        let (from_ts, to_ts) = (clock::to_timestamp(from, self.offset), clock::to_timestamp(to, self.offset));

        let mut q = booking::Entity::find()
            .filter(booking::Column::StaffId.eq(staff_id))
            .filter(booking::Column::Status.is_in(BookingStatus::BLOCKING))
            .filter(booking::Column::StartTime.lt(to_ts))
            .filter(booking::Column::EndTime.gt(from_ts));
        if let Some(id) = exclude_booking {
            q = q.filter(booking::Column::Id.ne(id));
        }
        let mut busy: Vec<Interval> = q
            .all(self.db)
            .await?
            .iter()
            .map(|b| Interval::new(clock::to_local(&b.start_time, self.offset), clock::to_local(&b.end_time, self.offset)))
            .collect();

        // Sessions only store a start, so look back far enough to catch long ones.
        let sessions = session::Entity::find()
            .filter(session::Column::StaffId.eq(staff_id))
            .filter(session::Column::Active.eq(true))
            .filter(session::Column::StartTime.gte(from_ts - Duration::minutes(MAX_SESSION_MINUTES)))
            .filter(session::Column::StartTime.lt(to_ts))
            .all(self.db)
            .await?;
        busy.extend(
            sessions
                .iter()
                .map(|s| Interval::new(clock::to_local(&s.start_time, self.offset), clock::to_local(&s.end_time(), self.offset)))
                .filter(|iv| iv.overlaps(&window)),
        );
        Ok(busy)
    }
}
