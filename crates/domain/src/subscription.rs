// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::{ClassCategory, Credits, EquipmentType, SubscriptionStatus};
use serde::{Deserialize, Serialize};
use time::Date;

/// A member's subscription to a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Canonical identifier.
    pub subscription_id: i64,
    /// The subscribed member.
    pub user_id: i64,
    /// The plan in the external catalog.
    pub plan_id: i64,
    /// Remaining class credits.
    pub credits: Credits,
    /// Equipment this subscription covers.
    pub equipment_access: EquipmentType,
    /// Class category this subscription covers.
    pub category: ClassCategory,
    /// Lifecycle status.
    pub status: SubscriptionStatus,
    /// First valid day.
    pub start_date: Date,
    /// Last valid day (inclusive).
    pub end_date: Date,
}

impl Subscription {
    /// Returns whether this subscription may be used for a booking on `today`.
    ///
    /// A subscription is current when it has not passed its end date and is
    /// either active, or cancelled with credits left. Paused and expired
    /// subscriptions are never current. An `active` row whose end date has
    /// passed is treated as expired even before the sweep rewrites it.
    #[must_use]
    pub fn is_current(&self, today: Date) -> bool {
        if self.end_date < today {
            return false;
        }
        match self.status {
            SubscriptionStatus::Active => true,
            SubscriptionStatus::Cancelled => self.credits.has_remaining(),
            SubscriptionStatus::Expired | SubscriptionStatus::Paused => false,
        }
    }

    /// Returns whether this row is still `active` although its end date has passed.
    #[must_use]
    pub fn is_stale_active(&self, today: Date) -> bool {
        self.status == SubscriptionStatus::Active && self.end_date < today
    }
}

/// Picks the subscription a booking for `user_id` should draw on.
///
/// Only current subscriptions qualify. When several are current, an active
/// one is preferred over a cancelled one, then the latest end date, then the
/// highest identifier.
#[must_use]
pub fn select_current_subscription(
    subscriptions: &[Subscription],
    user_id: i64,
    today: Date,
) -> Option<&Subscription> {
    subscriptions
        .iter()
        .filter(|s| s.user_id == user_id && s.is_current(today))
        .max_by_key(|s| {
            (
                s.status == SubscriptionStatus::Active,
                s.end_date,
                s.subscription_id,
            )
        })
}
