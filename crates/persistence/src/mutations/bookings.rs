// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use studio_booking_domain::BookingStatus;
use time::OffsetDateTime;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{NewBookingRow, format_instant};
use crate::diesel_schema::bookings;
use crate::error::PersistenceError;

/// Inserts a confirmed booking and returns its id.
///
/// # Errors
///
/// Returns an error if the insert fails, including when the member already
/// holds a confirmed booking for the class.
pub fn insert_confirmed_booking(
    conn: &mut SqliteConnection,
    user_id: i64,
    class_id: i64,
    subscription_id: Option<i64>,
    created_at: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    let row: NewBookingRow = NewBookingRow {
        user_id,
        class_id,
        subscription_id,
        status: BookingStatus::Confirmed.as_str().to_string(),
        checked_in: 0,
        created_at: format_instant(created_at)?,
    };
    diesel::insert_into(bookings::table)
        .values(&row)
        .execute(conn)?;
    get_last_insert_rowid(conn)
}

/// Moves a booking to `status`.
///
/// # Errors
///
/// Returns an error if the update fails or the booking does not exist.
pub fn set_booking_status(
    conn: &mut SqliteConnection,
    booking_id: i64,
    status: BookingStatus,
) -> Result<(), PersistenceError> {
    let updated: usize =
        diesel::update(bookings::table.filter(bookings::booking_id.eq(booking_id)))
            .set(bookings::status.eq(status.as_str()))
            .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("Booking {booking_id}")));
    }
    Ok(())
}

/// Flags a booking as checked in.
///
/// # Errors
///
/// Returns an error if the update fails or the booking does not exist.
pub fn mark_checked_in(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<(), PersistenceError> {
    let updated: usize =
        diesel::update(bookings::table.filter(bookings::booking_id.eq(booking_id)))
            .set(bookings::checked_in.eq(1))
            .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("Booking {booking_id}")));
    }
    Ok(())
}
