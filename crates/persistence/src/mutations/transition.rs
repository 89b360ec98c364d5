// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Writes the row changes of an engine transition.

use diesel::SqliteConnection;
use studio_booking::Mutation;
use time::OffsetDateTime;
use tracing::debug;

use crate::error::PersistenceError;
use crate::mutations::{bookings, classes, subscriptions, waitlist};

/// Ids assigned to rows inserted while applying a transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedMutations {
    /// New booking ids, in mutation order.
    pub booking_ids: Vec<i64>,
    /// New waitlist entry ids, in mutation order.
    pub waitlist_ids: Vec<i64>,
}

/// Applies mutations in order.
///
/// Must run inside a transaction; a failure part-way leaves partial writes
/// for the caller's rollback to discard.
///
/// # Arguments
///
/// * `conn` - The connection holding the transaction
/// * `mutations` - Row changes in application order
/// * `now` - Creation timestamp for inserted rows
///
/// # Errors
///
/// Returns the first failing write.
pub fn apply_mutations(
    conn: &mut SqliteConnection,
    mutations: &[Mutation],
    now: OffsetDateTime,
) -> Result<AppliedMutations, PersistenceError> {
    let mut applied: AppliedMutations = AppliedMutations::default();

    for mutation in mutations {
        debug!(?mutation, "Applying mutation");
        match mutation {
            Mutation::InsertBooking {
                user_id,
                class_id,
                subscription_id,
            } => {
                let booking_id: i64 = bookings::insert_confirmed_booking(
                    conn,
                    *user_id,
                    *class_id,
                    *subscription_id,
                    now,
                )?;
                applied.booking_ids.push(booking_id);
            }
            Mutation::SetBookingStatus { booking_id, status } => {
                bookings::set_booking_status(conn, *booking_id, *status)?;
            }
            Mutation::MarkCheckedIn { booking_id } => {
                bookings::mark_checked_in(conn, *booking_id)?;
            }
            Mutation::UpdateClass {
                class_id,
                capacity,
                enrolled,
                status,
            } => {
                classes::update_class(conn, *class_id, *capacity, *enrolled, *status)?;
            }
            Mutation::SetCredits {
                subscription_id,
                credits,
            } => {
                subscriptions::set_credits(conn, *subscription_id, *credits)?;
            }
            Mutation::InsertWaitlistEntry {
                user_id,
                class_id,
                position,
            } => {
                let waitlist_id: i64 =
                    waitlist::insert_entry(conn, *user_id, *class_id, *position, now)?;
                applied.waitlist_ids.push(waitlist_id);
            }
            Mutation::DeleteWaitlistEntry { waitlist_id } => {
                waitlist::delete_entry(conn, *waitlist_id)?;
            }
            Mutation::MoveWaitlistEntry {
                waitlist_id,
                position,
            } => {
                waitlist::move_entry(conn, *waitlist_id, *position)?;
            }
        }
    }

    Ok(applied)
}
