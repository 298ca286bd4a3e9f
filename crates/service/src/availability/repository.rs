use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use super::domain::{ClosureWindow, DayHours, Interval};
use crate::errors::ServiceError;

/// Reads the rows that feed an availability snapshot.
#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    /// Business hours row for the weekday (0 = Monday).
    async fn business_hours(&self, day: i16) -> Result<Option<DayHours>, ServiceError>;
    async fn staff_schedule(&self, staff_id: i32, day: i16) -> Result<Option<DayHours>, ServiceError>;
    async fn closures_on(&self, date: NaiveDate) -> Result<Vec<ClosureWindow>, ServiceError>;
    async fn staff_on_leave(&self, staff_id: i32, date: NaiveDate) -> Result<bool, ServiceError>;
    /// Blocking bookings and active sessions of the staff member touching `[from, to)`.
    async fn busy_intervals(
        &self,
        staff_id: i32,
        from: NaiveDateTime,
        to: NaiveDateTime,
        exclude_booking: Option<i32>,
    ) -> Result<Vec<Interval>, ServiceError>;
}

/// In-memory repository for tests.
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAvailabilityRepository {
        pub business: Mutex<HashMap<i16, DayHours>>,
        pub schedules: Mutex<HashMap<(i32, i16), DayHours>>,
        pub closures: Mutex<HashMap<NaiveDate, Vec<ClosureWindow>>>,
        pub leave: Mutex<Vec<(i32, NaiveDate, NaiveDate)>>,
        /// (booking id, staff id, interval)
        pub busy: Mutex<Vec<(Option<i32>, i32, Interval)>>,
    }

    #[async_trait]
    impl AvailabilityRepository for MockAvailabilityRepository {
        async fn business_hours(&self, day: i16) -> Result<Option<DayHours>, ServiceError> {
            Ok(self.business.lock().unwrap().get(&day).copied())
        }

        async fn staff_schedule(&self, staff_id: i32, day: i16) -> Result<Option<DayHours>, ServiceError> {
            Ok(self.schedules.lock().unwrap().get(&(staff_id, day)).copied())
        }

        async fn closures_on(&self, date: NaiveDate) -> Result<Vec<ClosureWindow>, ServiceError> {
            Ok(self.closures.lock().unwrap().get(&date).cloned().unwrap_or_default())
        }

        async fn staff_on_leave(&self, staff_id: i32, date: NaiveDate) -> Result<bool, ServiceError> {
            Ok(self.leave.lock().unwrap().iter().any(|(s, from, to)| *s == staff_id && *from <= date && date <= *to))
        }

        async fn busy_intervals(
            &self,
            staff_id: i32,
            from: NaiveDateTime,
            to: NaiveDateTime,
            exclude_booking: Option<i32>,
        ) -> Result<Vec<Interval>, ServiceError> {
            let window = Interval::new(from, to);
            Ok(self
                .busy
                .lock()
                .unwrap()
                .iter()
                .filter(|(id, s, iv)| *s == staff_id && (id.is_none() || *id != exclude_booking) && iv.overlaps(&window))
                .map(|(_, _, iv)| *iv)
                .collect())
        }
    }
}
