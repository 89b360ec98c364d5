// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    ClassCategory, Credits, EquipmentType, Subscription, SubscriptionStatus,
    select_current_subscription,
};
use time::macros::date;

use super::create_test_subscription;

fn base() -> Subscription {
    create_test_subscription(EquipmentType::Both, ClassCategory::Group, Credits::Limited(4))
}

#[test]
fn test_active_subscription_is_current_through_end_date() {
    let subscription: Subscription = base();
    assert!(subscription.is_current(date!(2026 - 06 - 30)));
    assert!(!subscription.is_current(date!(2026 - 07 - 01)));
}

#[test]
fn test_stale_active_row_is_not_current() {
    let subscription: Subscription = base();
    assert!(subscription.is_stale_active(date!(2026 - 07 - 01)));
    assert!(!subscription.is_stale_active(date!(2026 - 06 - 30)));
}

#[test]
fn test_cancelled_subscription_is_current_only_with_credits() {
    let mut subscription: Subscription = base();
    subscription.status = SubscriptionStatus::Cancelled;
    assert!(subscription.is_current(date!(2026 - 03 - 01)));

    subscription.credits = Credits::Limited(0);
    assert!(!subscription.is_current(date!(2026 - 03 - 01)));

    subscription.credits = Credits::Unlimited;
    assert!(subscription.is_current(date!(2026 - 03 - 01)));
}

#[test]
fn test_paused_and_expired_are_never_current() {
    let mut subscription: Subscription = base();
    subscription.status = SubscriptionStatus::Paused;
    assert!(!subscription.is_current(date!(2026 - 03 - 01)));

    subscription.status = SubscriptionStatus::Expired;
    assert!(!subscription.is_current(date!(2026 - 03 - 01)));
}

#[test]
fn test_selection_prefers_active_then_latest_end() {
    let mut cancelled: Subscription = base();
    cancelled.subscription_id = 1;
    cancelled.status = SubscriptionStatus::Cancelled;
    cancelled.end_date = date!(2026 - 12 - 31);

    let mut active_short: Subscription = base();
    active_short.subscription_id = 2;
    active_short.end_date = date!(2026 - 04 - 30);

    let mut active_long: Subscription = base();
    active_long.subscription_id = 3;

    let mut other_user: Subscription = base();
    other_user.subscription_id = 4;
    other_user.user_id = 99;
    other_user.end_date = date!(2027 - 12 - 31);

    let all: Vec<Subscription> = vec![cancelled, active_short, active_long, other_user];
    let chosen: &Subscription =
        select_current_subscription(&all, 42, date!(2026 - 03 - 01)).unwrap();
    assert_eq!(chosen.subscription_id, 3);
}

#[test]
fn test_selection_returns_none_without_current_subscription() {
    let mut paused: Subscription = base();
    paused.status = SubscriptionStatus::Paused;
    assert!(select_current_subscription(&[paused], 42, date!(2026 - 03 - 01)).is_none());
}
