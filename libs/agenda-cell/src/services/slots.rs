//! Slot-grid generation and calendar period math.
//!
//! Everything here is pure and total: invalid configuration degrades to
//! the default grid and unparseable date/time text degrades to `None` (or
//! a midnight label), never an error.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::models::{SlotGridConfig, WeekPeriod};

/// Every time point from `start_of_day` to `end_of_day` inclusive,
/// stepping by `step_minutes`, over the sanitized config.
pub fn generate_slots(config: &SlotGridConfig) -> Vec<NaiveTime> {
    let config = config.sanitized();

    let start = config.start_of_day.num_seconds_from_midnight() as i64 / 60;
    let end = config.end_of_day.num_seconds_from_midnight() as i64 / 60;

    let mut slots = Vec::new();
    let mut minute = start;
    while minute <= end {
        if let Some(slot) = NaiveTime::from_num_seconds_from_midnight_opt(minute as u32 * 60, 0) {
            slots.push(slot);
        }
        minute += config.step_minutes;
    }
    slots
}

/// The Monday-to-Sunday week containing `reference`, rolling backward
/// across month and year boundaries when needed.
pub fn compute_week_period(reference: NaiveDate) -> WeekPeriod {
    let offset = reference.weekday().num_days_from_monday() as i64;
    let start = reference - Duration::days(offset);

    let mut days = [start; 7];
    for (i, day) in days.iter_mut().enumerate() {
        *day = start + Duration::days(i as i64);
    }

    WeekPeriod {
        start,
        end: days[6],
        days,
    }
}

/// "HH:MM" label for grouping entries into grid buckets. Accepts bare
/// times ("9:00", "09:00:00") and full ISO datetimes; anything else
/// labels as midnight.
pub fn normalize_slot_time(raw: &str) -> String {
    parse_time_of_day(raw)
        .unwrap_or_else(|| NaiveTime::from_num_seconds_from_midnight_opt(0, 0).unwrap_or_default())
        .format("%H:%M")
        .to_string()
}

/// Time-of-day from a bare time or the time component of an ISO datetime.
pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    // "2024-06-03T09:00:00" and its zoned variants carry the time after
    // the 'T'.
    let time_part = match raw.split_once('T') {
        Some((_, rest)) => rest
            .trim_end_matches('Z')
            .split(['+', '-', ' '])
            .next()
            .unwrap_or(rest),
        None => raw,
    };

    NaiveTime::parse_from_str(time_part, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time_part, "%H:%M"))
        .ok()
}

/// Calendar date from an ISO date, an ISO datetime, or the legacy
/// "dd/mm/yyyy" format.
pub fn parse_entry_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(datetime.date());
    }
    if let Some((date_part, _)) = raw.split_once('T') {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
            return Some(date);
        }
    }
    NaiveDate::parse_from_str(raw, "%d/%m/%Y").ok()
}
