use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Opening window for a single weekday. `open == false` means closed all day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayHours {
    pub open: bool,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosureWindow {
    AllDay,
    Partial { start: NaiveTime, end: NaiveTime },
}

/// Half-open `[start, end)` interval in business-local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self { Self { start, end } }

    pub fn overlaps(&self, other: &Interval) -> bool { self.start < other.end && other.start < self.end }
}

/// Everything needed to decide availability for one staff member on one date.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySnapshot {
    pub date: NaiveDate,
    /// `None` when no business hours row exists for the weekday.
    pub business_hours: Option<DayHours>,
    /// `None` when the staff member follows business hours.
    pub staff_hours: Option<DayHours>,
    pub closures: Vec<ClosureWindow>,
    pub on_leave: bool,
    pub busy: Vec<Interval>,
}

impl DaySnapshot {
    pub fn open_day(date: NaiveDate) -> Self {
        Self { date, business_hours: None, staff_hours: None, closures: vec![], on_leave: false, busy: vec![] }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    Past,
    Closed,
    StaffLeave,
    Booked,
    OutsideHours,
}

impl BlockReason {
    pub fn describe(&self) -> &'static str {
        match self {
            BlockReason::Past => "slot is in the past",
            BlockReason::Closed => "business is closed at this time",
            BlockReason::StaffLeave => "staff member is on leave",
            BlockReason::Booked => "slot is already booked",
            BlockReason::OutsideHours => "slot is outside working hours",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// `HH:MM`
    pub time: String,
    pub end_time: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<BlockReason>,
}

/// Slot grid and fallbacks derived from `[booking]` config.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotRules {
    pub interval_minutes: i64,
    pub default_open: NaiveTime,
    pub default_close: NaiveTime,
    pub default_closed_days: Vec<u8>,
    pub offset: FixedOffset,
}

impl SlotRules {
    pub fn from_config(cfg: &configs::BookingConfig) -> Result<Self, ServiceError> {
        let (default_open, default_close) = cfg.default_window().map_err(|e| ServiceError::Validation(e.to_string()))?;
        let offset = FixedOffset::east_opt(cfg.utc_offset_minutes * 60)
            .ok_or_else(|| ServiceError::Validation("booking.utc_offset_minutes out of range".into()))?;
        Ok(Self {
            interval_minutes: cfg.slot_interval_minutes as i64,
            default_open,
            default_close,
            default_closed_days: cfg.default_closed_days.clone(),
            offset,
        })
    }

    /// Hours used when no business hours row exists for `day` (0 = Monday).
    pub fn fallback_hours(&self, day: u8) -> DayHours {
        DayHours { open: !self.default_closed_days.contains(&day), start: self.default_open, end: self.default_close }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_json_omits_reason_when_free() {
        let free = Slot { time: "09:00".into(), end_time: "10:00".into(), available: true, reason: None };
        assert_eq!(serde_json::to_value(&free).unwrap(), serde_json::json!({"time": "09:00", "end_time": "10:00", "available": true}));
        let blocked = Slot { reason: Some(BlockReason::StaffLeave), available: false, ..free };
        assert_eq!(serde_json::to_value(&blocked).unwrap()["reason"], "staff_leave");
    }
}
