// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use studio_booking_domain::{ClassStatus, StudioClass};
use tracing::info;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{NewClass, NewClassRow, to_i32};
use crate::diesel_schema::classes;
use crate::error::PersistenceError;
use crate::queries::classes::find_class;

/// Inserts a class and returns it as stored.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_class(
    conn: &mut SqliteConnection,
    class: &NewClass,
) -> Result<StudioClass, PersistenceError> {
    let row: NewClassRow = NewClassRow::try_from(class)?;
    diesel::insert_into(classes::table)
        .values(&row)
        .execute(conn)?;
    let class_id: i64 = get_last_insert_rowid(conn)?;
    info!(class_id, name = %class.name, "Created class");

    find_class(conn, class_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("Class {class_id}")))
}

/// Rewrites the capacity, enrollment counter and status of a class.
///
/// # Errors
///
/// Returns an error if the update fails or the class does not exist.
pub fn update_class(
    conn: &mut SqliteConnection,
    class_id: i64,
    capacity: u32,
    enrolled: u32,
    status: ClassStatus,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(classes::table.filter(classes::class_id.eq(class_id)))
        .set((
            classes::capacity.eq(to_i32("capacity", capacity)?),
            classes::enrolled.eq(to_i32("enrolled", enrolled)?),
            classes::status.eq(status.as_str()),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("Class {class_id}")));
    }
    Ok(())
}
