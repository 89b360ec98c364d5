// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod subscription;
mod types;

use crate::{
    ClassCategory, Credits, EquipmentType, StudioClass, Subscription, SubscriptionStatus,
    WaitlistEntry,
};
use time::macros::{date, datetime, time};

pub fn create_test_class(equipment_type: EquipmentType, category: ClassCategory) -> StudioClass {
    StudioClass::new(
        1,
        String::from("Morning Reformer"),
        10,
        equipment_type,
        category,
        date!(2026 - 03 - 10),
        time!(9:00),
    )
}

pub fn create_test_subscription(
    equipment_access: EquipmentType,
    category: ClassCategory,
    credits: Credits,
) -> Subscription {
    Subscription {
        subscription_id: 7,
        user_id: 42,
        plan_id: 3,
        credits,
        equipment_access,
        category,
        status: SubscriptionStatus::Active,
        start_date: date!(2026 - 01 - 01),
        end_date: date!(2026 - 06 - 30),
    }
}

pub fn create_test_entry(waitlist_id: i64, position: u32) -> WaitlistEntry {
    WaitlistEntry {
        waitlist_id,
        user_id: 100 + waitlist_id,
        class_id: 1,
        position,
        created_at: datetime!(2026-03-01 12:00 UTC),
    }
}
