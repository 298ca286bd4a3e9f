use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, instrument};

use super::domain::{BlockReason, DaySnapshot, Slot, SlotRules};
use super::engine::{check_slot, compute_slots, weekday_index};
use super::repository::AvailabilityRepository;
use crate::errors::ServiceError;

/// Availability queries independent of the web layer.
pub struct AvailabilityService<R: AvailabilityRepository> {
    repo: Arc<R>,
    rules: SlotRules,
}

impl<R: AvailabilityRepository> AvailabilityService<R> {
    pub fn new(repo: Arc<R>, rules: SlotRules) -> Self { Self { repo, rules } }

    pub fn rules(&self) -> &SlotRules { &self.rules }

    /// Collect everything that affects `staff_id` on `date`.
    #[instrument(skip(self))]
    pub async fn snapshot(&self, staff_id: i32, date: NaiveDate, exclude_booking: Option<i32>) -> Result<DaySnapshot, ServiceError> {
        let day = weekday_index(date) as i16;
        let from: NaiveDateTime = date.and_time(NaiveTime::MIN);
        let to = from + Duration::days(1);
        let snapshot = DaySnapshot {
            date,
            business_hours: self.repo.business_hours(day).await?,
            staff_hours: self.repo.staff_schedule(staff_id, day).await?,
            closures: self.repo.closures_on(date).await?,
            on_leave: self.repo.staff_on_leave(staff_id, date).await?,
            busy: self.repo.busy_intervals(staff_id, from, to, exclude_booking).await?,
        };
        debug!(busy = snapshot.busy.len(), closures = snapshot.closures.len(), on_leave = snapshot.on_leave, "availability_snapshot");
        Ok(snapshot)
    }

    /// Every candidate slot of `duration_minutes` on `date` with its availability.
    #[instrument(skip(self))]
    pub async fn slots(&self, staff_id: i32, date: NaiveDate, duration_minutes: i64, now: NaiveDateTime) -> Result<Vec<Slot>, ServiceError> {
        if date < now.date() {
            return Ok(vec![]);
        }
        let snapshot = self.snapshot(staff_id, date, None).await?;
        Ok(compute_slots(&snapshot, duration_minutes, &self.rules, now))
    }

    /// `Ok(Err(reason))` when the requested start cannot be booked.
    #[instrument(skip(self))]
    pub async fn check(
        &self,
        staff_id: i32,
        date: NaiveDate,
        start: NaiveTime,
        duration_minutes: i64,
        exclude_booking: Option<i32>,
        now: NaiveDateTime,
    ) -> Result<Result<(), BlockReason>, ServiceError> {
        let snapshot = self.snapshot(staff_id, date, exclude_booking).await?;
        Ok(check_slot(&snapshot, start, duration_minutes, &self.rules, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::domain::{ClosureWindow, DayHours, Interval};
    use crate::availability::repository::mock::MockAvailabilityRepository;

    fn t(h: u32, m: u32) -> NaiveTime { NaiveTime::from_hms_opt(h, m, 0).unwrap() }
    fn monday() -> NaiveDate { NaiveDate::from_ymd_opt(2030, 1, 7).unwrap() }
    fn long_ago() -> NaiveDateTime { NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_time(t(0, 0)) }

    fn service(repo: Arc<MockAvailabilityRepository>) -> AvailabilityService<MockAvailabilityRepository> {
        AvailabilityService::new(repo, SlotRules::from_config(&configs::BookingConfig::default()).unwrap())
    }

    #[tokio::test]
    async fn slots_respect_business_hours_row() {
        let repo = Arc::new(MockAvailabilityRepository::default());
        repo.business.lock().unwrap().insert(0, DayHours { open: true, start: t(10, 0), end: t(12, 0) });
        let svc = service(repo);
        let slots = svc.slots(1, monday(), 60, long_ago()).await.unwrap();
        let times: Vec<_> = slots.iter().map(|s| s.time.clone()).collect();
        assert_eq!(times, vec!["10:00", "10:30", "11:00"]);
    }

    #[tokio::test]
    async fn other_staff_bookings_do_not_block() {
        let repo = Arc::new(MockAvailabilityRepository::default());
        let d = monday();
        repo.busy.lock().unwrap().push((Some(1), 2, Interval::new(d.and_time(t(9, 0)), d.and_time(t(17, 0)))));
        let svc = service(repo);
        let slots = svc.slots(1, d, 30, long_ago()).await.unwrap();
        assert!(slots.iter().all(|s| s.available));
        let slots = svc.slots(2, d, 30, long_ago()).await.unwrap();
        assert!(slots.iter().all(|s| s.reason == Some(BlockReason::Booked)));
    }

    #[tokio::test]
    async fn check_excludes_the_booking_being_moved() {
        let repo = Arc::new(MockAvailabilityRepository::default());
        let d = monday();
        repo.busy.lock().unwrap().push((Some(7), 1, Interval::new(d.and_time(t(10, 0)), d.and_time(t(11, 0)))));
        let svc = service(repo);
        assert_eq!(svc.check(1, d, t(10, 30), 60, None, long_ago()).await.unwrap(), Err(BlockReason::Booked));
        assert_eq!(svc.check(1, d, t(10, 30), 60, Some(7), long_ago()).await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn leave_and_closures_from_repository() {
        let repo = Arc::new(MockAvailabilityRepository::default());
        let d = monday();
        repo.leave.lock().unwrap().push((1, d, d.succ_opt().unwrap()));
        repo.closures.lock().unwrap().insert(d, vec![ClosureWindow::Partial { start: t(9, 0), end: t(10, 0) }]);
        let svc = service(repo);
        assert_eq!(svc.check(1, d, t(11, 0), 30, None, long_ago()).await.unwrap(), Err(BlockReason::StaffLeave));
        assert_eq!(svc.check(2, d, t(9, 30), 30, None, long_ago()).await.unwrap(), Err(BlockReason::Closed));
        assert_eq!(svc.check(2, d, t(10, 0), 30, None, long_ago()).await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn past_date_has_no_slots() {
        let svc = service(Arc::new(MockAvailabilityRepository::default()));
        let now = NaiveDate::from_ymd_opt(2031, 1, 1).unwrap().and_time(t(0, 0));
        assert!(svc.slots(1, monday(), 30, now).await.unwrap().is_empty());
    }
}
