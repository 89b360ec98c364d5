// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! ## Module Organization
//!
//! - `audit`: Audit event persistence
//! - `classes`: Class registry writes
//! - `subscriptions`: Subscription ledger writes and the expiry sweep
//! - `bookings`: Booking store writes
//! - `waitlist`: Waitlist store writes
//! - `transition`: Applies the row changes of an engine transition in order

pub mod audit;
pub mod bookings;
pub mod classes;
pub mod subscriptions;
pub mod transition;
pub mod waitlist;
