// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{NewWaitlistRow, format_instant, to_i32};
use crate::diesel_schema::waitlist;
use crate::error::PersistenceError;

/// Appends a waitlist entry and returns its id.
///
/// # Errors
///
/// Returns an error if the insert fails, including position or member collisions.
pub fn insert_entry(
    conn: &mut SqliteConnection,
    user_id: i64,
    class_id: i64,
    position: u32,
    created_at: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    let row: NewWaitlistRow = NewWaitlistRow {
        user_id,
        class_id,
        position: to_i32("position", position)?,
        created_at: format_instant(created_at)?,
    };
    diesel::insert_into(waitlist::table)
        .values(&row)
        .execute(conn)?;
    get_last_insert_rowid(conn)
}

/// Deletes a waitlist entry.
///
/// # Errors
///
/// Returns an error if the delete fails or the entry does not exist.
pub fn delete_entry(conn: &mut SqliteConnection, waitlist_id: i64) -> Result<(), PersistenceError> {
    let deleted: usize =
        diesel::delete(waitlist::table.filter(waitlist::waitlist_id.eq(waitlist_id)))
            .execute(conn)?;
    if deleted == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Waitlist entry {waitlist_id}"
        )));
    }
    Ok(())
}

/// Gives an entry a new position.
///
/// # Errors
///
/// Returns an error if the update fails or the entry does not exist.
pub fn move_entry(
    conn: &mut SqliteConnection,
    waitlist_id: i64,
    position: u32,
) -> Result<(), PersistenceError> {
    let updated: usize =
        diesel::update(waitlist::table.filter(waitlist::waitlist_id.eq(waitlist_id)))
            .set(waitlist::position.eq(to_i32("position", position)?))
            .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Waitlist entry {waitlist_id}"
        )));
    }
    Ok(())
}
