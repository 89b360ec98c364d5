// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::BookingStatus;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A member's claim on a seat in a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Canonical identifier.
    pub booking_id: i64,
    /// The member.
    pub user_id: i64,
    /// The class.
    pub class_id: i64,
    /// The subscription debited for this booking.
    ///
    /// `None` for bookings paid through the external credit ledger.
    pub subscription_id: Option<i64>,
    /// Lifecycle status.
    pub status: BookingStatus,
    /// Whether reception checked the member in.
    pub checked_in: bool,
    /// When the booking was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Booking {
    /// Returns whether this booking holds a seat.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }
}

/// A member queued for a full class.
///
/// Positions for one class are always `1..=N`, in join order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    /// Canonical identifier.
    pub waitlist_id: i64,
    /// The member.
    pub user_id: i64,
    /// The class.
    pub class_id: i64,
    /// 1-based queue position.
    pub position: u32,
    /// When the member joined.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
