// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use studio_booking_domain::{Credits, Subscription, SubscriptionStatus};
use time::Date;
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{NewSubscription, NewSubscriptionRow, credits_columns};
use crate::diesel_schema::subscriptions;
use crate::error::PersistenceError;
use crate::queries::subscriptions::find_subscription;

/// Records a subscription and returns it as stored.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_subscription(
    conn: &mut SqliteConnection,
    subscription: &NewSubscription,
) -> Result<Subscription, PersistenceError> {
    let row: NewSubscriptionRow = NewSubscriptionRow::try_from(subscription)?;
    diesel::insert_into(subscriptions::table)
        .values(&row)
        .execute(conn)?;
    let subscription_id: i64 = get_last_insert_rowid(conn)?;
    info!(
        subscription_id,
        user_id = subscription.user_id,
        "Recorded subscription"
    );

    find_subscription(conn, subscription_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("Subscription {subscription_id}")))
}

/// Rewrites the remaining credits of a subscription.
///
/// # Errors
///
/// Returns an error if the update fails or the subscription does not exist.
pub fn set_credits(
    conn: &mut SqliteConnection,
    subscription_id: i64,
    credits: Credits,
) -> Result<(), PersistenceError> {
    let (remaining_classes, is_unlimited) = credits_columns(credits)?;
    let updated: usize = diesel::update(
        subscriptions::table.filter(subscriptions::subscription_id.eq(subscription_id)),
    )
    .set((
        subscriptions::remaining_classes.eq(remaining_classes),
        subscriptions::is_unlimited.eq(is_unlimited),
    ))
    .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Subscription {subscription_id}"
        )));
    }
    debug!(subscription_id, %credits, "Updated subscription credits");
    Ok(())
}

/// Marks every `active` subscription whose end date is before `today` as `expired`.
///
/// # Returns
///
/// The number of subscriptions expired.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn expire_subscriptions(
    conn: &mut SqliteConnection,
    today: Date,
) -> Result<usize, PersistenceError> {
    let expired: usize = diesel::update(
        subscriptions::table
            .filter(subscriptions::status.eq(SubscriptionStatus::Active.as_str()))
            .filter(subscriptions::end_date.lt(today.to_string())),
    )
    .set(subscriptions::status.eq(SubscriptionStatus::Expired.as_str()))
    .execute(conn)?;

    if expired > 0 {
        info!(expired, %today, "Expired subscriptions past their end date");
    }
    Ok(expired)
}
