// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the studio booking engine.
//!
//! Classes, subscriptions, bookings, waitlist entries and the audit trail
//! live in `SQLite`, accessed through Diesel.
//!
//! ## Transactions
//!
//! Writes go through [`Persistence::atomically`], which opens a
//! `BEGIN IMMEDIATE` transaction and hands the body a [`StudioTx`]. Lock
//! contention is retried up to [`MAX_TRANSACTION_ATTEMPTS`] times.
//!
//! ## Testing
//!
//! [`Persistence::new_in_memory`] gives every caller its own shared-cache
//! in-memory database, named from an atomic counter.

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
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use studio_booking_audit::AuditEvent;
use studio_booking_domain::{Booking, StudioClass, Subscription, WaitlistEntry};
use time::Date;

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod transaction;

#[cfg(test)]
mod tests;

pub use backend::sqlite::DEFAULT_BUSY_TIMEOUT;
pub use data_models::{NewClass, NewSubscription};
pub use error::PersistenceError;
pub use mutations::transition::AppliedMutations;
pub use queries::invariants::ClassInvariantReport;
pub use transaction::{MAX_TRANSACTION_ATTEMPTS, RETRY_BACKOFF, StudioTx, TransactionError};

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Type alias kept for callers that name the backend explicitly.
pub type SqlitePersistence = Persistence;

/// Persistence adapter over one `SQLite` connection.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("memdb_test_{db_id}");
        let shared_memory_url = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection =
            backend::sqlite::initialize_database(&shared_memory_url, DEFAULT_BUSY_TIMEOUT)?;

        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        Self::new_with_file_and_busy_timeout(path, DEFAULT_BUSY_TIMEOUT)
    }

    /// Creates a file-based adapter with an explicit lock wait bound.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    /// * `busy_timeout` - How long to wait for another writer before failing
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file_and_busy_timeout<P: AsRef<Path>>(
        path: P,
        busy_timeout: Duration,
    ) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection =
            backend::sqlite::initialize_database(path_str, busy_timeout)?;

        // WAL lets readers proceed while a booking transaction holds the write lock.
        backend::sqlite::enable_wal_mode(&mut conn)?;

        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    /// Runs `body` in one `BEGIN IMMEDIATE` transaction.
    ///
    /// The transaction commits when `body` returns `Ok` and rolls back
    /// otherwise. When the failure is a serialization conflict the whole body
    /// runs again, up to [`MAX_TRANSACTION_ATTEMPTS`] times in total, so
    /// `body` must not have effects outside the transaction that cannot be
    /// repeated.
    ///
    /// # Errors
    ///
    /// Returns the body's error, or the database error that ended the
    /// transaction.
    pub fn atomically<T, E, F>(&mut self, body: F) -> Result<T, E>
    where
        E: TransactionError,
        F: FnMut(&mut StudioTx<'_>) -> Result<T, E>,
    {
        transaction::run_immediate(&mut self.conn, body)
    }

    /// Expires active subscriptions that ended before `today`.
    ///
    /// # Returns
    ///
    /// The number of subscriptions expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the sweep fails.
    pub fn expire_subscriptions(&mut self, today: Date) -> Result<usize, PersistenceError> {
        self.atomically(|tx| tx.expire_subscriptions(today))
    }

    /// Records a subscription bought through the plan catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_subscription(
        &mut self,
        subscription: &NewSubscription,
    ) -> Result<Subscription, PersistenceError> {
        self.atomically(|tx| tx.create_subscription(subscription))
    }

    // ========================================================================
    // Read Projections
    // ========================================================================

    /// Retrieves a class.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_class(&mut self, class_id: i64) -> Result<Option<StudioClass>, PersistenceError> {
        queries::classes::find_class(&mut self.conn, class_id)
    }

    /// Retrieves a booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_booking(&mut self, booking_id: i64) -> Result<Option<Booking>, PersistenceError> {
        queries::bookings::find_booking(&mut self.conn, booking_id)
    }

    /// Retrieves a waitlist entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_waitlist_entry(
        &mut self,
        waitlist_id: i64,
    ) -> Result<Option<WaitlistEntry>, PersistenceError> {
        queries::waitlist::find_waitlist_entry(&mut self.conn, waitlist_id)
    }

    /// Retrieves a subscription.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_subscription(
        &mut self,
        subscription_id: i64,
    ) -> Result<Option<Subscription>, PersistenceError> {
        queries::subscriptions::find_subscription(&mut self.conn, subscription_id)
    }

    /// Lists classes scheduled between `from` and `to`, inclusive.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn classes_between(
        &mut self,
        from: Date,
        to: Date,
    ) -> Result<Vec<StudioClass>, PersistenceError> {
        queries::classes::classes_between(&mut self.conn, from, to)
    }

    /// Lists the waitlist of a class by position.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn waitlist_for_class(
        &mut self,
        class_id: i64,
    ) -> Result<Vec<WaitlistEntry>, PersistenceError> {
        queries::waitlist::waitlist_for_class(&mut self.conn, class_id)
    }

    /// Lists a member's bookings with their classes, latest class first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn bookings_for_user(
        &mut self,
        user_id: i64,
    ) -> Result<Vec<(Booking, StudioClass)>, PersistenceError> {
        queries::bookings::bookings_for_user(&mut self.conn, user_id)
    }

    /// Lists a member's waitlist entries with their classes.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn waitlist_for_user(
        &mut self,
        user_id: i64,
    ) -> Result<Vec<(WaitlistEntry, StudioClass)>, PersistenceError> {
        queries::waitlist::waitlist_for_user(&mut self.conn, user_id)
    }

    /// Lists a member's subscriptions.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn subscriptions_for_user(
        &mut self,
        user_id: i64,
    ) -> Result<Vec<Subscription>, PersistenceError> {
        queries::subscriptions::subscriptions_for_users(&mut self.conn, &[user_id])
    }

    /// Checks the stored rows of a class against its invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if the class does not exist or a query fails.
    pub fn check_class_invariants(
        &mut self,
        class_id: i64,
    ) -> Result<ClassInvariantReport, PersistenceError> {
        queries::invariants::check_class_invariants(&mut self.conn, class_id)
    }

    // ========================================================================
    // Audit Event Queries
    // ========================================================================

    /// Retrieves an audit event by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is not found or cannot be deserialized.
    pub fn get_audit_event(&mut self, event_id: i64) -> Result<AuditEvent, PersistenceError> {
        queries::audit::get_audit_event(&mut self.conn, event_id)
    }

    /// Retrieves the audit timeline of a class.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or an event cannot be deserialized.
    pub fn audit_events_for_class(
        &mut self,
        class_id: i64,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        queries::audit::audit_events_for_class(&mut self.conn, class_id)
    }
}
