// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use studio_booking_domain::{Booking, BookingStatus, StudioClass};

use crate::data_models::{BookingRow, ClassRow};
use crate::diesel_schema::{bookings, classes};
use crate::error::PersistenceError;

/// Looks up a booking by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
pub fn find_booking(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<Option<Booking>, PersistenceError> {
    bookings::table
        .filter(bookings::booking_id.eq(booking_id))
        .select(BookingRow::as_select())
        .first::<BookingRow>(conn)
        .optional()?
        .map(Booking::try_from)
        .transpose()
}

/// Lists the confirmed bookings of a class in booking order.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn confirmed_bookings_for_class(
    conn: &mut SqliteConnection,
    class_id: i64,
) -> Result<Vec<Booking>, PersistenceError> {
    bookings::table
        .filter(bookings::class_id.eq(class_id))
        .filter(bookings::status.eq(BookingStatus::Confirmed.as_str()))
        .order(bookings::booking_id.asc())
        .select(BookingRow::as_select())
        .load::<BookingRow>(conn)?
        .into_iter()
        .map(Booking::try_from)
        .collect()
}

/// Lists every booking of a member with its class, latest class first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn bookings_for_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Vec<(Booking, StudioClass)>, PersistenceError> {
    bookings::table
        .inner_join(classes::table)
        .filter(bookings::user_id.eq(user_id))
        .order((
            classes::class_date.desc(),
            classes::start_time.desc(),
            bookings::booking_id.desc(),
        ))
        .select((BookingRow::as_select(), ClassRow::as_select()))
        .load::<(BookingRow, ClassRow)>(conn)?
        .into_iter()
        .map(|(booking, class)| Ok((Booking::try_from(booking)?, StudioClass::try_from(class)?)))
        .collect()
}
