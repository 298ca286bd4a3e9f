//! Business-local time. Stored timestamps carry the configured fixed offset,
//! availability works on naive local date/times.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;

pub fn now(offset: FixedOffset) -> DateTimeWithTimeZone { Utc::now().with_timezone(&offset) }

pub fn now_local(offset: FixedOffset) -> NaiveDateTime { now(offset).naive_local() }

/// Local wall-clock time to a stored timestamp.
pub fn to_timestamp(local: NaiveDateTime, offset: FixedOffset) -> DateTimeWithTimeZone {
    let utc = local - Duration::seconds(offset.local_minus_utc() as i64);
    DateTime::<Utc>::from_naive_utc_and_offset(utc, Utc).with_timezone(&offset)
}

pub fn at(date: NaiveDate, time: NaiveTime, offset: FixedOffset) -> DateTimeWithTimeZone {
    to_timestamp(date.and_time(time), offset)
}

/// Stored timestamp to local wall-clock time.
pub fn to_local(ts: &DateTimeWithTimeZone, offset: FixedOffset) -> NaiveDateTime { ts.with_timezone(&offset).naive_local() }

/// `[00:00, next 00:00)` of a local date as stored timestamps.
pub fn day_bounds(date: NaiveDate, offset: FixedOffset) -> (DateTimeWithTimeZone, DateTimeWithTimeZone) {
    let start = to_timestamp(date.and_time(NaiveTime::MIN), offset);
    (start, start + Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_round_trip_with_offset() {
        let offset = FixedOffset::east_opt(60 * 60).unwrap();
        let local = NaiveDate::from_ymd_opt(2030, 6, 1).unwrap().and_hms_opt(9, 30, 0).unwrap();
        let ts = to_timestamp(local, offset);
        assert_eq!(ts.to_rfc3339(), "2030-06-01T09:30:00+01:00");
        assert_eq!(to_local(&ts, offset), local);
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(to_local(&ts, utc).time(), NaiveTime::from_hms_opt(8, 30, 0).unwrap());
    }

    #[test]
    fn day_bounds_span_one_day() {
        let offset = FixedOffset::east_opt(0).unwrap();
        let (start, end) = day_bounds(NaiveDate::from_ymd_opt(2030, 1, 7).unwrap(), offset);
        assert_eq!(end - start, Duration::days(1));
        assert_eq!(start.to_rfc3339(), "2030-01-07T00:00:00+00:00");
    }
}
