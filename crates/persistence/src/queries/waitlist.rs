// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use studio_booking_domain::{StudioClass, WaitlistEntry};

use crate::data_models::{ClassRow, WaitlistRow};
use crate::diesel_schema::{classes, waitlist};
use crate::error::PersistenceError;

/// Looks up a waitlist entry by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
pub fn find_waitlist_entry(
    conn: &mut SqliteConnection,
    waitlist_id: i64,
) -> Result<Option<WaitlistEntry>, PersistenceError> {
    waitlist::table
        .filter(waitlist::waitlist_id.eq(waitlist_id))
        .select(WaitlistRow::as_select())
        .first::<WaitlistRow>(conn)
        .optional()?
        .map(WaitlistEntry::try_from)
        .transpose()
}

/// Lists the waitlist of a class ordered by position.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn waitlist_for_class(
    conn: &mut SqliteConnection,
    class_id: i64,
) -> Result<Vec<WaitlistEntry>, PersistenceError> {
    waitlist::table
        .filter(waitlist::class_id.eq(class_id))
        .order(waitlist::position.asc())
        .select(WaitlistRow::as_select())
        .load::<WaitlistRow>(conn)?
        .into_iter()
        .map(WaitlistEntry::try_from)
        .collect()
}

/// Lists a member's waitlist entries with their classes, earliest class first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn waitlist_for_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Vec<(WaitlistEntry, StudioClass)>, PersistenceError> {
    waitlist::table
        .inner_join(classes::table)
        .filter(waitlist::user_id.eq(user_id))
        .order((
            classes::class_date.asc(),
            classes::start_time.asc(),
            waitlist::waitlist_id.asc(),
        ))
        .select((WaitlistRow::as_select(), ClassRow::as_select()))
        .load::<(WaitlistRow, ClassRow)>(conn)?
        .into_iter()
        .map(|(entry, class)| {
            Ok((
                WaitlistEntry::try_from(entry)?,
                StudioClass::try_from(class)?,
            ))
        })
        .collect()
}
