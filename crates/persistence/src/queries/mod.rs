// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! Every query takes a plain `SqliteConnection` so that it can run both
//! inside a write transaction and on its own for read projections.
//!
//! ## Module Organization
//!
//! - `audit`: Audit event lookup
//! - `classes`: Class registry lookups
//! - `bookings`: Booking store lookups
//! - `waitlist`: Waitlist store lookups
//! - `subscriptions`: Subscription ledger lookups
//! - `invariants`: Consistency checks over one class

pub mod audit;
pub mod bookings;
pub mod classes;
pub mod invariants;
pub mod subscriptions;
pub mod waitlist;
