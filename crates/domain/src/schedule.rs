// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Studio-local wall clock conversions.
//!
//! Classes are scheduled as a local date and time in the studio timezone.
//! Every window check compares instants, so these helpers resolve local
//! wall-clock values to UTC and back.
//!
//! ## DST
//!
//! - An ambiguous local time (clocks going back) resolves to the earlier instant
//! - A non-existent local time (clocks going forward) is rejected

use crate::error::DomainError;
use chrono::{Datelike, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, Time};

/// Parses an IANA timezone name.
pub(crate) fn parse_timezone(timezone: &str) -> Result<Tz, DomainError> {
    timezone
        .parse()
        .map_err(|_| DomainError::InvalidTimezone(timezone.to_string()))
}

/// Resolves a studio-local class date and time to a UTC instant.
///
/// # Arguments
///
/// * `date` - The studio-local date
/// * `start_time` - The studio-local start time
/// * `timezone` - IANA timezone of the studio (e.g. `Europe/Athens`)
///
/// # Errors
///
/// Returns an error if:
/// - The timezone is invalid
/// - The local time does not exist in the timezone (DST gap)
pub fn class_start_utc(
    date: Date,
    start_time: Time,
    timezone: &str,
) -> Result<OffsetDateTime, DomainError> {
    let tz: Tz = parse_timezone(timezone)?;

    let naive_date: NaiveDate = NaiveDate::from_ymd_opt(
        date.year(),
        u32::from(u8::from(date.month())),
        u32::from(date.day()),
    )
    .ok_or_else(|| DomainError::InvalidClassSchedule {
        reason: format!("Invalid class date: {date}"),
    })?;

    let naive_time: NaiveTime = NaiveTime::from_hms_opt(
        u32::from(start_time.hour()),
        u32::from(start_time.minute()),
        u32::from(start_time.second()),
    )
    .ok_or_else(|| DomainError::InvalidClassSchedule {
        reason: format!("Invalid class start time: {start_time}"),
    })?;

    let local = tz
        .from_local_datetime(&naive_date.and_time(naive_time))
        .earliest()
        .ok_or_else(|| DomainError::InvalidClassSchedule {
            reason: format!(
                "{date} {start_time} does not exist in {timezone} (skipped by a DST transition)"
            ),
        })?;

    OffsetDateTime::from_unix_timestamp(local.timestamp()).map_err(|e| {
        DomainError::InvalidClassSchedule {
            reason: format!("Class start out of range: {e}"),
        }
    })
}

/// Returns the studio-local calendar date for an instant.
///
/// Subscription validity is judged against this date.
///
/// # Errors
///
/// Returns an error if the timezone is invalid or the instant is out of range.
pub fn local_date(now: OffsetDateTime, timezone: &str) -> Result<Date, DomainError> {
    let tz: Tz = parse_timezone(timezone)?;

    let utc = chrono::DateTime::<chrono::Utc>::from_timestamp(now.unix_timestamp(), 0)
        .ok_or_else(|| DomainError::InvalidClassSchedule {
            reason: format!("Instant out of range: {now}"),
        })?;
    let local: NaiveDate = utc.with_timezone(&tz).date_naive();

    let out_of_range = |_| DomainError::InvalidClassSchedule {
        reason: format!("Local date out of range: {local}"),
    };
    let month: Month = u8::try_from(local.month())
        .map_err(|_| DomainError::InvalidClassSchedule {
            reason: format!("Local month out of range: {local}"),
        })
        .and_then(|m| Month::try_from(m).map_err(out_of_range))?;
    let day: u8 = u8::try_from(local.day()).map_err(|_| DomainError::InvalidClassSchedule {
        reason: format!("Local day out of range: {local}"),
    })?;

    Date::from_calendar_date(local.year(), month, day).map_err(out_of_range)
}

/// Parses an ISO 8601 calendar date (`YYYY-MM-DD`).
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the string is not a valid date.
pub fn parse_iso_date(value: &str) -> Result<Date, DomainError> {
    Date::parse(value, format_description!("[year]-[month]-[day]")).map_err(|e| {
        DomainError::DateParseError {
            date_string: value.to_string(),
            error: e.to_string(),
        }
    })
}

/// Parses a wall-clock time as `HH:MM` or `HH:MM:SS`.
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the string matches neither form.
pub fn parse_wall_clock_time(value: &str) -> Result<Time, DomainError> {
    Time::parse(value, format_description!("[hour]:[minute]:[second]"))
        .or_else(|_| Time::parse(value, format_description!("[hour]:[minute]")))
        .map_err(|e| DomainError::DateParseError {
            date_string: value.to_string(),
            error: e.to_string(),
        })
}
