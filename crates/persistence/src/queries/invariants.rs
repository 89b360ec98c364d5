// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Consistency checks over the rows of one class.

use diesel::SqliteConnection;
use studio_booking_domain::{StudioClass, WaitlistEntry, is_contiguous};

use crate::error::PersistenceError;
use crate::queries::bookings::confirmed_bookings_for_class;
use crate::queries::classes::find_class;
use crate::queries::waitlist::waitlist_for_class;

/// What the stored rows of a class say about its invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInvariantReport {
    /// The class.
    pub class_id: i64,
    /// Stored seat count.
    pub capacity: u32,
    /// Stored enrollment counter.
    pub enrolled: u32,
    /// Number of confirmed booking rows.
    pub confirmed_bookings: usize,
    /// Waitlist positions in ascending order.
    pub waitlist_positions: Vec<u32>,
    /// Whether the waitlist positions are exactly `1..=N`.
    pub waitlist_contiguous: bool,
}

impl ClassInvariantReport {
    /// Returns whether the enrollment counter matches the confirmed bookings.
    #[must_use]
    pub fn enrollment_matches(&self) -> bool {
        usize::try_from(self.enrolled).is_ok_and(|enrolled| enrolled == self.confirmed_bookings)
    }

    /// Returns whether enrollment is within capacity.
    #[must_use]
    pub const fn within_capacity(&self) -> bool {
        self.enrolled <= self.capacity
    }

    /// Returns whether every invariant holds.
    #[must_use]
    pub fn holds(&self) -> bool {
        self.enrollment_matches() && self.within_capacity() && self.waitlist_contiguous
    }
}

/// Checks the stored rows of a class against its invariants.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the class does not exist, or an
/// error if a query fails.
pub fn check_class_invariants(
    conn: &mut SqliteConnection,
    class_id: i64,
) -> Result<ClassInvariantReport, PersistenceError> {
    let class: StudioClass = find_class(conn, class_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("Class {class_id}")))?;
    let confirmed_bookings: usize = confirmed_bookings_for_class(conn, class_id)?.len();
    let entries: Vec<WaitlistEntry> = waitlist_for_class(conn, class_id)?;

    Ok(ClassInvariantReport {
        class_id,
        capacity: class.capacity,
        enrolled: class.enrolled,
        confirmed_bookings,
        waitlist_positions: entries.iter().map(|e| e.position).collect(),
        waitlist_contiguous: is_contiguous(&entries),
    })
}
