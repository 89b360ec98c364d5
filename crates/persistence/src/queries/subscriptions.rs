// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use studio_booking_domain::Subscription;

use crate::data_models::SubscriptionRow;
use crate::diesel_schema::subscriptions;
use crate::error::PersistenceError;

/// Loads every subscription held by any of `user_ids`.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn subscriptions_for_users(
    conn: &mut SqliteConnection,
    user_ids: &[i64],
) -> Result<Vec<Subscription>, PersistenceError> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }
    subscriptions::table
        .filter(subscriptions::user_id.eq_any(user_ids.to_vec()))
        .order(subscriptions::subscription_id.asc())
        .select(SubscriptionRow::as_select())
        .load::<SubscriptionRow>(conn)?
        .into_iter()
        .map(Subscription::try_from)
        .collect()
}

/// Looks up a subscription by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
pub fn find_subscription(
    conn: &mut SqliteConnection,
    subscription_id: i64,
) -> Result<Option<Subscription>, PersistenceError> {
    subscriptions::table
        .filter(subscriptions::subscription_id.eq(subscription_id))
        .select(SubscriptionRow::as_select())
        .first::<SubscriptionRow>(conn)
        .optional()?
        .map(Subscription::try_from)
        .transpose()
}
