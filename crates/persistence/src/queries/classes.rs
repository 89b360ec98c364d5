// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use studio_booking_domain::StudioClass;
use time::Date;

use crate::data_models::ClassRow;
use crate::diesel_schema::classes;
use crate::error::PersistenceError;

/// Looks up a class by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
pub fn find_class(
    conn: &mut SqliteConnection,
    class_id: i64,
) -> Result<Option<StudioClass>, PersistenceError> {
    classes::table
        .filter(classes::class_id.eq(class_id))
        .select(ClassRow::as_select())
        .first::<ClassRow>(conn)
        .optional()?
        .map(StudioClass::try_from)
        .transpose()
}

/// Lists classes scheduled between `from` and `to`, inclusive, in schedule order.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn classes_between(
    conn: &mut SqliteConnection,
    from: Date,
    to: Date,
) -> Result<Vec<StudioClass>, PersistenceError> {
    classes::table
        .filter(classes::class_date.ge(from.to_string()))
        .filter(classes::class_date.le(to.to_string()))
        .order((
            classes::class_date.asc(),
            classes::start_time.asc(),
            classes::class_id.asc(),
        ))
        .select(ClassRow::as_select())
        .load::<ClassRow>(conn)?
        .into_iter()
        .map(StudioClass::try_from)
        .collect()
}
