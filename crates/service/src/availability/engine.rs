//! Pure availability rules over a [`DaySnapshot`].

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime};

use super::domain::{BlockReason, ClosureWindow, DayHours, DaySnapshot, Interval, Slot, SlotRules};

/// 0 = Monday .. 6 = Sunday
pub fn weekday_index(date: chrono::NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}

/// Business hours (or the configured fallback) narrowed by the staff schedule.
/// `None` when nobody can be booked that day.
pub fn working_window(snapshot: &DaySnapshot, rules: &SlotRules) -> Option<(NaiveTime, NaiveTime)> {
    let business = snapshot
        .business_hours
        .unwrap_or_else(|| rules.fallback_hours(weekday_index(snapshot.date)));
    if !business.open {
        return None;
    }
    let (mut start, mut end) = (business.start, business.end);
    if let Some(DayHours { open, start: s, end: e }) = snapshot.staff_hours {
        if !open {
            return None;
        }
        start = start.max(s);
        end = end.min(e);
    }
    (start < end).then_some((start, end))
}

fn closed_all_day(snapshot: &DaySnapshot) -> bool {
    snapshot.closures.iter().any(|c| matches!(c, ClosureWindow::AllDay))
}

/// Reasons that apply regardless of the window: leave, closures, past, bookings.
fn block_reason(snapshot: &DaySnapshot, slot: &Interval, now: NaiveDateTime) -> Option<BlockReason> {
    if snapshot.on_leave {
        return Some(BlockReason::StaffLeave);
    }
    if closed_all_day(snapshot) {
        return Some(BlockReason::Closed);
    }
    if slot.start < now {
        return Some(BlockReason::Past);
    }
    let date = snapshot.date;
    let partial_hit = snapshot.closures.iter().any(|c| match c {
        ClosureWindow::Partial { start, end } => slot.overlaps(&Interval::new(date.and_time(*start), date.and_time(*end))),
        ClosureWindow::AllDay => false,
    });
    if partial_hit {
        return Some(BlockReason::Closed);
    }
    if snapshot.busy.iter().any(|b| slot.overlaps(b)) {
        return Some(BlockReason::Booked);
    }
    None
}

/// Every candidate slot on the grid with its availability flag.
///
/// Candidates start at the window open and step by the configured interval
/// while the whole service still fits before close. Past dates yield nothing.
pub fn compute_slots(snapshot: &DaySnapshot, duration_minutes: i64, rules: &SlotRules, now: NaiveDateTime) -> Vec<Slot> {
    if snapshot.date < now.date() || duration_minutes <= 0 || rules.interval_minutes <= 0 {
        return vec![];
    }
    let Some((open, close)) = working_window(snapshot, rules) else {
        return vec![];
    };
    let date = snapshot.date;
    let close_at = date.and_time(close);
    let duration = Duration::minutes(duration_minutes);
    let step = Duration::minutes(rules.interval_minutes);

    let mut slots = Vec::new();
    let mut cursor = date.and_time(open);
    while cursor + duration <= close_at {
        let candidate = Interval::new(cursor, cursor + duration);
        let reason = block_reason(snapshot, &candidate, now);
        slots.push(Slot {
            time: candidate.start.format("%H:%M").to_string(),
            end_time: candidate.end.format("%H:%M").to_string(),
            available: reason.is_none(),
            reason,
        });
        cursor += step;
    }
    slots
}

/// Check an arbitrary start time (not necessarily on the grid).
pub fn check_slot(
    snapshot: &DaySnapshot,
    start: NaiveTime,
    duration_minutes: i64,
    rules: &SlotRules,
    now: NaiveDateTime,
) -> Result<(), BlockReason> {
    let date = snapshot.date;
    let candidate = Interval::new(date.and_time(start), date.and_time(start) + Duration::minutes(duration_minutes));
    if snapshot.on_leave {
        return Err(BlockReason::StaffLeave);
    }
    if closed_all_day(snapshot) {
        return Err(BlockReason::Closed);
    }
    if candidate.start < now {
        return Err(BlockReason::Past);
    }
    let Some((open, close)) = working_window(snapshot, rules) else {
        return Err(BlockReason::OutsideHours);
    };
    if candidate.start < date.and_time(open) || candidate.end > date.and_time(close) {
        return Err(BlockReason::OutsideHours);
    }
    match block_reason(snapshot, &candidate, now) {
        Some(reason) => Err(reason),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rules() -> SlotRules { SlotRules::from_config(&configs::BookingConfig::default()).unwrap() }

    fn t(h: u32, m: u32) -> NaiveTime { NaiveTime::from_hms_opt(h, m, 0).unwrap() }

    // 2030-01-07 is a Monday.
    fn monday() -> NaiveDate { NaiveDate::from_ymd_opt(2030, 1, 7).unwrap() }

    fn long_ago() -> NaiveDateTime { NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_time(t(0, 0)) }

    fn hours(start: NaiveTime, end: NaiveTime) -> DayHours { DayHours { open: true, start, end } }

    #[test]
    fn fallback_hours_produce_half_hour_grid() {
        let snap = DaySnapshot::open_day(monday());
        let slots = compute_slots(&snap, 60, &rules(), long_ago());
        // 09:00 .. 16:00 inclusive
        assert_eq!(slots.len(), 15);
        assert_eq!(slots.first().unwrap().time, "09:00");
        assert_eq!(slots.last().unwrap().time, "16:00");
        assert_eq!(slots.last().unwrap().end_time, "17:00");
        assert!(slots.iter().all(|s| s.available));
    }

    #[test]
    fn sunday_is_closed_by_default() {
        let sunday = NaiveDate::from_ymd_opt(2030, 1, 13).unwrap();
        assert_eq!(weekday_index(sunday), 6);
        let snap = DaySnapshot::open_day(sunday);
        assert!(compute_slots(&snap, 30, &rules(), long_ago()).is_empty());
    }

    #[test]
    fn staff_schedule_narrows_business_hours() {
        let mut snap = DaySnapshot::open_day(monday());
        snap.business_hours = Some(hours(t(8, 0), t(18, 0)));
        snap.staff_hours = Some(hours(t(10, 0), t(12, 0)));
        let slots = compute_slots(&snap, 60, &rules(), long_ago());
        let times: Vec<_> = slots.iter().map(|s| s.time.as_str()).collect();
        assert_eq!(times, vec!["10:00", "10:30", "11:00"]);
    }

    #[test]
    fn staff_not_working_or_business_closed_yields_nothing() {
        let mut snap = DaySnapshot::open_day(monday());
        snap.staff_hours = Some(DayHours { open: false, start: t(9, 0), end: t(17, 0) });
        assert!(compute_slots(&snap, 30, &rules(), long_ago()).is_empty());

        let mut snap = DaySnapshot::open_day(monday());
        snap.business_hours = Some(DayHours { open: false, start: t(9, 0), end: t(17, 0) });
        assert!(compute_slots(&snap, 30, &rules(), long_ago()).is_empty());
    }

    #[test]
    fn bookings_block_overlapping_slots_only() {
        let mut snap = DaySnapshot::open_day(monday());
        let d = monday();
        snap.busy.push(Interval::new(d.and_time(t(10, 0)), d.and_time(t(11, 0))));
        let slots = compute_slots(&snap, 60, &rules(), long_ago());
        let blocked: Vec<_> = slots.iter().filter(|s| !s.available).map(|s| s.time.as_str()).collect();
        // 09:30-10:30 and 10:30-11:30 overlap; 09:00-10:00 and 11:00-12:00 touch only.
        assert_eq!(blocked, vec!["09:30", "10:00", "10:30"]);
        assert!(slots.iter().filter(|s| !s.available).all(|s| s.reason == Some(BlockReason::Booked)));
    }

    #[test]
    fn partial_closure_blocks_window() {
        let mut snap = DaySnapshot::open_day(monday());
        snap.closures.push(ClosureWindow::Partial { start: t(12, 0), end: t(13, 0) });
        let slots = compute_slots(&snap, 30, &rules(), long_ago());
        let blocked: Vec<_> = slots.iter().filter(|s| !s.available).map(|s| s.time.as_str()).collect();
        assert_eq!(blocked, vec!["12:00", "12:30"]);
        assert!(slots.iter().filter(|s| !s.available).all(|s| s.reason == Some(BlockReason::Closed)));
    }

    #[test]
    fn all_day_closure_and_leave_block_everything() {
        let mut snap = DaySnapshot::open_day(monday());
        snap.closures.push(ClosureWindow::AllDay);
        let slots = compute_slots(&snap, 30, &rules(), long_ago());
        assert!(!slots.is_empty());
        assert!(slots.iter().all(|s| s.reason == Some(BlockReason::Closed)));

        let mut snap = DaySnapshot::open_day(monday());
        snap.on_leave = true;
        let slots = compute_slots(&snap, 30, &rules(), long_ago());
        assert!(slots.iter().all(|s| s.reason == Some(BlockReason::StaffLeave)));
    }

    #[test]
    fn past_slots_today_are_flagged_and_past_dates_empty() {
        let snap = DaySnapshot::open_day(monday());
        let now = monday().and_time(t(12, 15));
        let slots = compute_slots(&snap, 30, &rules(), now);
        let first_open = slots.iter().find(|s| s.available).unwrap();
        assert_eq!(first_open.time, "12:30");
        assert_eq!(slots[0].reason, Some(BlockReason::Past));

        let tomorrow = monday().succ_opt().unwrap().and_time(t(8, 0));
        assert!(compute_slots(&snap, 30, &rules(), tomorrow).is_empty());
    }

    #[test]
    fn service_longer_than_window_has_no_slots() {
        let mut snap = DaySnapshot::open_day(monday());
        snap.staff_hours = Some(hours(t(9, 0), t(10, 0)));
        assert!(compute_slots(&snap, 90, &rules(), long_ago()).is_empty());
    }

    #[test]
    fn check_slot_accepts_off_grid_starts() {
        let snap = DaySnapshot::open_day(monday());
        assert_eq!(check_slot(&snap, t(9, 10), 30, &rules(), long_ago()), Ok(()));
        assert_eq!(check_slot(&snap, t(16, 45), 30, &rules(), long_ago()), Err(BlockReason::OutsideHours));
        assert_eq!(check_slot(&snap, t(8, 30), 30, &rules(), long_ago()), Err(BlockReason::OutsideHours));
    }

    #[test]
    fn check_slot_reports_conflicts() {
        let d = monday();
        let mut snap = DaySnapshot::open_day(d);
        snap.busy.push(Interval::new(d.and_time(t(14, 0)), d.and_time(t(15, 0))));
        assert_eq!(check_slot(&snap, t(14, 30), 30, &rules(), long_ago()), Err(BlockReason::Booked));
        assert_eq!(check_slot(&snap, t(15, 0), 30, &rules(), long_ago()), Ok(()));
        assert_eq!(check_slot(&snap, t(10, 0), 30, &rules(), d.and_time(t(11, 0))), Err(BlockReason::Past));
    }

    #[test]
    fn check_slot_and_grid_agree_on_reason_order() {
        let d = monday();
        let now = d.and_time(t(12, 0));

        let mut on_leave = DaySnapshot::open_day(d);
        on_leave.on_leave = true;
        let grid = compute_slots(&on_leave, 30, &rules(), now);
        assert_eq!(grid[0].reason, Some(BlockReason::StaffLeave));
        assert_eq!(check_slot(&on_leave, t(9, 0), 30, &rules(), now), Err(BlockReason::StaffLeave));

        let mut closed = DaySnapshot::open_day(d);
        closed.closures.push(ClosureWindow::AllDay);
        let grid = compute_slots(&closed, 30, &rules(), now);
        assert_eq!(grid[0].reason, Some(BlockReason::Closed));
        assert_eq!(check_slot(&closed, t(9, 0), 30, &rules(), now), Err(BlockReason::Closed));
    }
}
