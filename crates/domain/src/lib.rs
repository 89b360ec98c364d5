// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod booking;
mod class;
mod eligibility;
mod error;
mod policy;
mod schedule;
mod subscription;
mod types;
mod waitlist;

#[cfg(test)]
mod tests;

// Re-export public types
pub use booking::{Booking, WaitlistEntry};
pub use class::{MAX_CLASS_CAPACITY, StudioClass};
pub use eligibility::{check_category, check_equipment, validate_subscription_for_class};
pub use error::DomainError;
pub use policy::{
    BookingPolicy, DEFAULT_CANCELLATION_WINDOW_MINUTES, DEFAULT_WAITLIST_CUTOFF_MINUTES,
    minutes_until,
};
pub use schedule::{class_start_utc, local_date, parse_iso_date, parse_wall_clock_time};
pub use subscription::{Subscription, select_current_subscription};
pub use types::{
    ActorRole, BookingStatus, ClassCategory, ClassStatus, Credits, EquipmentType,
    SubscriptionStatus, UNLIMITED_ALLOTMENT_THRESHOLD,
};
pub use waitlist::{is_contiguous, next_position, renumber_after_removal};
