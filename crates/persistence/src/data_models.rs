// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and their conversions to domain values.
//!
//! Enumerations are stored as their snake_case strings, dates as ISO 8601
//! text, wall-clock times as `HH:MM:SS` and instants as RFC 3339.

use diesel::prelude::*;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use studio_booking_domain::{
    Booking, BookingStatus, ClassCategory, ClassStatus, Credits, EquipmentType, StudioClass,
    Subscription, SubscriptionStatus, WaitlistEntry, parse_iso_date, parse_wall_clock_time,
};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time};

use crate::diesel_schema::{bookings, classes, subscriptions, waitlist};
use crate::error::PersistenceError;

/// Serializable representation of an Actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorData {
    pub id: String,
    pub actor_type: String,
}

/// Serializable representation of a Cause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauseData {
    pub id: String,
    pub description: String,
}

/// Serializable representation of an Action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionData {
    pub name: String,
    pub details: Option<String>,
}

/// Serializable representation of a `StateSnapshot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshotData {
    pub data: String,
}

/// Input for registering a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClass {
    /// Display name.
    pub name: String,
    /// Seat count.
    pub capacity: u32,
    /// Required equipment.
    pub equipment_type: EquipmentType,
    /// Group or personal.
    pub category: ClassCategory,
    /// Studio-local date.
    pub date: Date,
    /// Studio-local start time.
    pub start_time: Time,
}

/// Input for recording a subscription bought through the plan catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    /// The member.
    pub user_id: i64,
    /// The plan in the external catalog.
    pub plan_id: i64,
    /// Starting credits.
    pub credits: Credits,
    /// Equipment covered.
    pub equipment_access: EquipmentType,
    /// Category covered.
    pub category: ClassCategory,
    /// Initial status.
    pub status: SubscriptionStatus,
    /// First valid day.
    pub start_date: Date,
    /// Last valid day.
    pub end_date: Date,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = classes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ClassRow {
    pub class_id: i64,
    pub name: String,
    pub capacity: i32,
    pub enrolled: i32,
    pub equipment_type: String,
    pub category: String,
    pub class_date: String,
    pub start_time: String,
    pub status: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = classes)]
pub struct NewClassRow {
    pub name: String,
    pub capacity: i32,
    pub enrolled: i32,
    pub equipment_type: String,
    pub category: String,
    pub class_date: String,
    pub start_time: String,
    pub status: String,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = subscriptions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SubscriptionRow {
    pub subscription_id: i64,
    pub user_id: i64,
    pub plan_id: i64,
    pub remaining_classes: i32,
    pub is_unlimited: i32,
    pub equipment_access: String,
    pub category: String,
    pub status: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = subscriptions)]
pub struct NewSubscriptionRow {
    pub user_id: i64,
    pub plan_id: i64,
    pub remaining_classes: i32,
    pub is_unlimited: i32,
    pub equipment_access: String,
    pub category: String,
    pub status: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BookingRow {
    pub booking_id: i64,
    pub user_id: i64,
    pub class_id: i64,
    pub subscription_id: Option<i64>,
    pub status: String,
    pub checked_in: i32,
    pub created_at: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = bookings)]
pub struct NewBookingRow {
    pub user_id: i64,
    pub class_id: i64,
    pub subscription_id: Option<i64>,
    pub status: String,
    pub checked_in: i32,
    pub created_at: String,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = waitlist)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WaitlistRow {
    pub waitlist_id: i64,
    pub user_id: i64,
    pub class_id: i64,
    pub position: i32,
    pub created_at: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = waitlist)]
pub struct NewWaitlistRow {
    pub user_id: i64,
    pub class_id: i64,
    pub position: i32,
    pub created_at: String,
}

fn parse_column<T>(column: &str, value: &str) -> Result<T, PersistenceError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    T::from_str(value).map_err(|e| {
        PersistenceError::ReconstructionError(format!("Invalid {column} '{value}': {e}"))
    })
}

fn to_u32(column: &str, value: i32) -> Result<u32, PersistenceError> {
    value.to_u32().ok_or_else(|| {
        PersistenceError::ReconstructionError(format!("Negative {column}: {value}"))
    })
}

/// Converts a count to the `INTEGER` column representation.
pub fn to_i32(column: &str, value: u32) -> Result<i32, PersistenceError> {
    value.to_i32().ok_or_else(|| {
        PersistenceError::SerializationError(format!("{column} out of range: {value}"))
    })
}

/// Formats a wall-clock time as `HH:MM:SS`.
pub fn format_time(value: Time) -> Result<String, PersistenceError> {
    value
        .format(format_description!("[hour]:[minute]:[second]"))
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

/// Formats an instant as RFC 3339.
pub fn format_instant(value: OffsetDateTime) -> Result<String, PersistenceError> {
    value
        .format(&Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

fn parse_instant(column: &str, value: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|e| {
        PersistenceError::ReconstructionError(format!("Invalid {column} '{value}': {e}"))
    })
}

fn parse_date(column: &str, value: &str) -> Result<Date, PersistenceError> {
    parse_iso_date(value).map_err(|e| {
        PersistenceError::ReconstructionError(format!("Invalid {column} '{value}': {e}"))
    })
}

impl TryFrom<ClassRow> for StudioClass {
    type Error = PersistenceError;

    fn try_from(row: ClassRow) -> Result<Self, Self::Error> {
        Ok(Self {
            class_id: row.class_id,
            name: row.name,
            capacity: to_u32("capacity", row.capacity)?,
            enrolled: to_u32("enrolled", row.enrolled)?,
            equipment_type: parse_column::<EquipmentType>("equipment_type", &row.equipment_type)?,
            category: parse_column::<ClassCategory>("category", &row.category)?,
            date: parse_date("class_date", &row.class_date)?,
            start_time: parse_wall_clock_time(&row.start_time).map_err(|e| {
                PersistenceError::ReconstructionError(format!(
                    "Invalid start_time '{}': {e}",
                    row.start_time
                ))
            })?,
            status: parse_column::<ClassStatus>("status", &row.status)?,
        })
    }
}

impl TryFrom<&NewClass> for NewClassRow {
    type Error = PersistenceError;

    fn try_from(class: &NewClass) -> Result<Self, Self::Error> {
        Ok(Self {
            name: class.name.clone(),
            capacity: to_i32("capacity", class.capacity)?,
            enrolled: 0,
            equipment_type: class.equipment_type.as_str().to_string(),
            category: class.category.as_str().to_string(),
            class_date: class.date.to_string(),
            start_time: format_time(class.start_time)?,
            status: ClassStatus::Active.as_str().to_string(),
        })
    }
}

/// Splits credits into the `remaining_classes` and `is_unlimited` columns.
pub fn credits_columns(credits: Credits) -> Result<(i32, i32), PersistenceError> {
    match credits {
        Credits::Limited(n) => Ok((to_i32("remaining_classes", n)?, 0)),
        Credits::Unlimited => Ok((0, 1)),
    }
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = PersistenceError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let credits: Credits = if row.is_unlimited != 0 {
            Credits::Unlimited
        } else {
            Credits::Limited(to_u32("remaining_classes", row.remaining_classes)?)
        };
        Ok(Self {
            subscription_id: row.subscription_id,
            user_id: row.user_id,
            plan_id: row.plan_id,
            credits,
            equipment_access: parse_column::<EquipmentType>(
                "equipment_access",
                &row.equipment_access,
            )?,
            category: parse_column::<ClassCategory>("category", &row.category)?,
            status: parse_column::<SubscriptionStatus>("status", &row.status)?,
            start_date: parse_date("start_date", &row.start_date)?,
            end_date: parse_date("end_date", &row.end_date)?,
        })
    }
}

impl TryFrom<&NewSubscription> for NewSubscriptionRow {
    type Error = PersistenceError;

    fn try_from(subscription: &NewSubscription) -> Result<Self, Self::Error> {
        let (remaining_classes, is_unlimited) = credits_columns(subscription.credits)?;
        Ok(Self {
            user_id: subscription.user_id,
            plan_id: subscription.plan_id,
            remaining_classes,
            is_unlimited,
            equipment_access: subscription.equipment_access.as_str().to_string(),
            category: subscription.category.as_str().to_string(),
            status: subscription.status.as_str().to_string(),
            start_date: subscription.start_date.to_string(),
            end_date: subscription.end_date.to_string(),
        })
    }
}

impl TryFrom<BookingRow> for Booking {
    type Error = PersistenceError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            booking_id: row.booking_id,
            user_id: row.user_id,
            class_id: row.class_id,
            subscription_id: row.subscription_id,
            status: parse_column::<BookingStatus>("status", &row.status)?,
            checked_in: row.checked_in != 0,
            created_at: parse_instant("created_at", &row.created_at)?,
        })
    }
}

impl TryFrom<WaitlistRow> for WaitlistEntry {
    type Error = PersistenceError;

    fn try_from(row: WaitlistRow) -> Result<Self, Self::Error> {
        Ok(Self {
            waitlist_id: row.waitlist_id,
            user_id: row.user_id,
            class_id: row.class_id,
            position: to_u32("position", row.position)?,
            created_at: parse_instant("created_at", &row.created_at)?,
        })
    }
}
