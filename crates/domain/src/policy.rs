// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::schedule::parse_timezone;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// Default minutes before class start after which members may not cancel.
pub const DEFAULT_CANCELLATION_WINDOW_MINUTES: i64 = 120;

/// Default minutes before class start after which the waitlist closes.
pub const DEFAULT_WAITLIST_CUTOFF_MINUTES: i64 = 120;

/// Studio-wide booking policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingPolicy {
    /// Members may cancel only while the class is strictly more than this far away.
    pub cancellation_window_minutes: i64,
    /// Full classes accept waitlist joins only while at least this far away.
    pub waitlist_cutoff_minutes: i64,
    /// IANA timezone of the studio.
    pub timezone: String,
}

impl BookingPolicy {
    /// Creates a policy, validating the timezone.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimezone` if the timezone is unknown.
    pub fn new(
        cancellation_window_minutes: i64,
        waitlist_cutoff_minutes: i64,
        timezone: &str,
    ) -> Result<Self, DomainError> {
        parse_timezone(timezone)?;
        Ok(Self {
            cancellation_window_minutes,
            waitlist_cutoff_minutes,
            timezone: timezone.to_string(),
        })
    }

    /// Returns whether a member may still cancel a booking for a class
    /// starting at `class_start`.
    ///
    /// The boundary is exclusive: exactly at the window the request is rejected.
    #[must_use]
    pub fn member_can_cancel(&self, class_start: OffsetDateTime, now: OffsetDateTime) -> bool {
        class_start - now > Duration::minutes(self.cancellation_window_minutes)
    }

    /// Returns whether a full class starting at `class_start` still accepts waitlist joins.
    #[must_use]
    pub fn waitlist_open(&self, class_start: OffsetDateTime, now: OffsetDateTime) -> bool {
        class_start - now >= Duration::minutes(self.waitlist_cutoff_minutes)
    }
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            cancellation_window_minutes: DEFAULT_CANCELLATION_WINDOW_MINUTES,
            waitlist_cutoff_minutes: DEFAULT_WAITLIST_CUTOFF_MINUTES,
            timezone: String::from("UTC"),
        }
    }
}

/// Whole minutes from `now` until `class_start`, negative once started.
#[must_use]
pub fn minutes_until(class_start: OffsetDateTime, now: OffsetDateTime) -> i64 {
    (class_start - now).whole_minutes()
}
