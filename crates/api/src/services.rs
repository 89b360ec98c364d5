// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The collaborators and policy every engine operation runs with.

use std::sync::Arc;
use studio_booking::{Clock, CreditLedger, NotificationDispatcher};
use studio_booking_domain::{BookingPolicy, local_date};
use time::{Date, OffsetDateTime};

use crate::error::{ApiError, translate_domain_error};

/// Shared handles to the clock, dispatcher and credit ledger.
#[derive(Clone)]
pub struct EngineServices {
    /// Source of the current instant.
    pub clock: Arc<dyn Clock>,
    /// Delivers notifications after commit.
    pub dispatcher: Arc<dyn NotificationDispatcher>,
    /// External credit ledger for bookings without a subscription.
    pub ledger: Arc<dyn CreditLedger>,
    /// Studio windows and timezone.
    pub policy: BookingPolicy,
}

impl EngineServices {
    /// Bundles the collaborators.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        ledger: Arc<dyn CreditLedger>,
        policy: BookingPolicy,
    ) -> Self {
        Self {
            clock,
            dispatcher,
            ledger,
            policy,
        }
    }

    /// The current instant.
    #[must_use]
    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    /// The studio-local date of `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy timezone is invalid.
    pub fn today_at(&self, now: OffsetDateTime) -> Result<Date, ApiError> {
        local_date(now, &self.policy.timezone).map_err(translate_domain_error)
    }
}

impl std::fmt::Debug for EngineServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineServices")
            .field("now", &self.clock.now())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
