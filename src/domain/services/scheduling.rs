//! Slot arithmetic for appointment booking.
//!
//! All intervals are half-open `[start, end)` on a single calendar day, so an
//! appointment ending at 09:30 and one starting at 09:30 do not collide.

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use crate::domain::models::appointment::Appointment;
use crate::error::AppError;

/// Half-open interval intersection.
pub fn overlaps(a_start: NaiveTime, a_end: NaiveTime, b_start: NaiveTime, b_end: NaiveTime) -> bool {
    a_start < b_end && b_start < a_end
}

/// End of an appointment that starts at `start` and lasts `duration_min`.
/// Fails when the appointment would run past midnight.
pub fn end_time_for(start: NaiveTime, duration_min: i32) -> Result<NaiveTime, AppError> {
    if duration_min <= 0 {
        return Err(AppError::Validation("Service duration must be positive".into()));
    }
    let (end, wrapped_secs) = start.overflowing_add_signed(Duration::minutes(duration_min as i64));
    if wrapped_secs != 0 {
        return Err(AppError::Validation("Appointment cannot extend past midnight".into()));
    }
    Ok(end)
}

/// First slot-blocking appointment on the same barber and date that overlaps
/// `[start, end)`, ignoring the appointment with id `exclude_id`.
pub fn find_conflict<'a>(
    existing: &'a [Appointment],
    barber_id: &str,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    exclude_id: Option<&str>,
) -> Option<&'a Appointment> {
    existing.iter().find(|a| {
        a.barber_id == barber_id
            && a.date == date
            && exclude_id != Some(a.id.as_str())
            && a.blocks_slot()
            && overlaps(start, end, a.start_time, a.end_time)
    })
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format (YYYY-MM-DD)".into()))
}

/// Accepts `HH:MM` or `HH:MM:SS`; seconds are dropped so slots stay on whole minutes.
pub fn parse_time(raw: &str) -> Result<NaiveTime, AppError> {
    let raw = raw.trim();
    let time = NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| AppError::Validation("Invalid time format (HH:MM)".into()))?;
    time.with_second(0)
        .ok_or_else(|| AppError::Validation("Invalid time format (HH:MM)".into()))
}
