// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod audit_tests;
mod initialization_tests;
mod transaction_tests;

use crate::{NewClass, NewSubscription, Persistence, PersistenceError};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use studio_booking_audit::{Actor, Cause};
use studio_booking_domain::{
    ClassCategory, Credits, EquipmentType, StudioClass, Subscription, SubscriptionStatus,
};
use time::OffsetDateTime;
use time::macros::{date, datetime, time};

static FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

pub const NOW: OffsetDateTime = datetime!(2026-03-09 09:00 UTC);

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("test-actor"), String::from("system"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("test-cause"), String::from("Test operation"))
}

pub fn create_test_class(persistence: &mut Persistence, capacity: u32) -> StudioClass {
    let class: NewClass = NewClass {
        name: String::from("Morning Reformer"),
        capacity,
        equipment_type: EquipmentType::Reformer,
        category: ClassCategory::Group,
        date: date!(2026 - 03 - 10),
        start_time: time!(9:00),
    };
    persistence
        .atomically(|tx| tx.create_class(&class))
        .unwrap()
}

pub fn create_test_subscription(
    persistence: &mut Persistence,
    user_id: i64,
    credits: Credits,
) -> Subscription {
    persistence
        .create_subscription(&NewSubscription {
            user_id,
            plan_id: 3,
            credits,
            equipment_access: EquipmentType::Reformer,
            category: ClassCategory::Group,
            status: SubscriptionStatus::Active,
            start_date: date!(2026 - 01 - 01),
            end_date: date!(2026 - 06 - 30),
        })
        .unwrap()
}

/// A unique database file path under the system temp directory.
pub fn temp_database_path() -> PathBuf {
    let id: u64 = FILE_COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "studio_booking_persistence_{}_{id}.db",
        std::process::id()
    ))
}

/// Removes a database file and its WAL side files.
pub fn remove_database(path: &PathBuf) {
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.clone().into_os_string();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }
}

pub fn body_error() -> PersistenceError {
    PersistenceError::Other(String::from("body failed"))
}
