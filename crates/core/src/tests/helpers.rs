// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{ClassState, Command, CoreError, EngineContext, TransitionResult, apply};
use studio_booking_audit::{Actor, Cause};
use studio_booking_domain::{
    Booking, BookingPolicy, BookingStatus, ClassCategory, Credits, EquipmentType, StudioClass,
    Subscription, SubscriptionStatus, WaitlistEntry,
};
use time::OffsetDateTime;
use time::macros::{date, datetime, time};

/// 24 hours before the test class starts.
pub const NOW: OffsetDateTime = datetime!(2026-03-09 09:00 UTC);

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("user-42"), String::from("member"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Member request"))
}

/// A reformer group class on 2026-03-10 at 09:00 UTC.
pub fn create_test_class(capacity: u32) -> StudioClass {
    StudioClass::new(
        1,
        String::from("Morning Reformer"),
        capacity,
        EquipmentType::Reformer,
        ClassCategory::Group,
        date!(2026 - 03 - 10),
        time!(9:00),
    )
}

/// An active reformer group subscription valid for the first half of 2026.
pub fn create_test_subscription(subscription_id: i64, user_id: i64, credits: Credits) -> Subscription {
    Subscription {
        subscription_id,
        user_id,
        plan_id: 3,
        credits,
        equipment_access: EquipmentType::Reformer,
        category: ClassCategory::Group,
        status: SubscriptionStatus::Active,
        start_date: date!(2026 - 01 - 01),
        end_date: date!(2026 - 06 - 30),
    }
}

pub fn create_test_booking(booking_id: i64, user_id: i64, subscription_id: Option<i64>) -> Booking {
    Booking {
        booking_id,
        user_id,
        class_id: 1,
        subscription_id,
        status: BookingStatus::Confirmed,
        checked_in: false,
        created_at: datetime!(2026-03-01 10:00 UTC),
    }
}

pub fn create_test_entry(waitlist_id: i64, user_id: i64, position: u32) -> WaitlistEntry {
    WaitlistEntry {
        waitlist_id,
        user_id,
        class_id: 1,
        position,
        created_at: datetime!(2026-03-02 10:00 UTC),
    }
}

/// A full class of two seats held by users 1 and 2, with users 3, 4 and 5
/// waiting at positions 1, 2 and 3. Every member holds five credits.
pub fn create_full_class_state() -> ClassState {
    let mut class: StudioClass = create_test_class(2);
    class.enrolled = 2;
    class.status = class.derived_status();
    ClassState::new(
        class,
        vec![
            create_test_booking(11, 1, Some(101)),
            create_test_booking(12, 2, Some(102)),
        ],
        vec![
            create_test_entry(21, 3, 1),
            create_test_entry(22, 4, 2),
            create_test_entry(23, 5, 3),
        ],
        (1..=5)
            .map(|user_id| create_test_subscription(100 + user_id, user_id, Credits::Limited(5)))
            .collect(),
    )
}

pub fn run(state: &ClassState, command: Command, now: OffsetDateTime) -> Result<TransitionResult, CoreError> {
    let policy: BookingPolicy = BookingPolicy::default();
    let ctx: EngineContext<'_> = EngineContext::new(now, &policy);
    apply(state, command, &ctx, create_test_actor(), create_test_cause())
}
