// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write transactions.
//!
//! Every engine operation runs in one `BEGIN IMMEDIATE` transaction. The
//! write lock is taken before the first read, so the state a command is
//! checked against cannot change before its writes land. Lock contention
//! surfaces as `PersistenceError::SerializationConflict` and the whole
//! transaction body is retried a bounded number of times.

use diesel::{Connection, SqliteConnection};
use std::collections::BTreeSet;
use std::time::Duration;
use studio_booking::{ClassState, Mutation};
use studio_booking_audit::AuditEvent;
use studio_booking_domain::{Booking, StudioClass, Subscription, WaitlistEntry};
use time::{Date, OffsetDateTime};
use tracing::warn;

use crate::data_models::{NewClass, NewSubscription};
use crate::error::PersistenceError;
use crate::mutations::transition::AppliedMutations;
use crate::{mutations, queries};

/// Attempts made before a serialization conflict is returned to the caller.
pub const MAX_TRANSACTION_ATTEMPTS: u32 = 3;

/// Pause before the second attempt; later attempts wait proportionally longer.
pub const RETRY_BACKOFF: Duration = Duration::from_millis(25);

/// Error types that can report a retryable conflict.
///
/// Callers wrap `PersistenceError` in their own error type; this trait lets
/// [`crate::Persistence::atomically`] see through the wrapping.
pub trait TransactionError: From<PersistenceError> {
    /// Returns whether the transaction failed because of contention.
    fn is_serialization_conflict(&self) -> bool;
}

impl TransactionError for PersistenceError {
    fn is_serialization_conflict(&self) -> bool {
        Self::is_serialization_conflict(self)
    }
}

/// Failure inside `immediate_transaction`: either from the body, or from
/// Diesel itself (BEGIN, COMMIT or ROLLBACK).
enum TxFailure<E> {
    Body(E),
    Database(diesel::result::Error),
}

impl<E> From<diesel::result::Error> for TxFailure<E> {
    fn from(err: diesel::result::Error) -> Self {
        Self::Database(err)
    }
}

impl<E: From<PersistenceError>> TxFailure<E> {
    fn into_error(self) -> E {
        match self {
            Self::Body(err) => err,
            Self::Database(err) => E::from(PersistenceError::from(err)),
        }
    }
}

/// Runs `body` inside `BEGIN IMMEDIATE`, retrying on serialization conflicts.
pub(crate) fn run_immediate<T, E, F>(conn: &mut SqliteConnection, mut body: F) -> Result<T, E>
where
    E: TransactionError,
    F: FnMut(&mut StudioTx<'_>) -> Result<T, E>,
{
    let mut attempt: u32 = 1;
    loop {
        let outcome: Result<T, TxFailure<E>> = conn.immediate_transaction(|conn| {
            let mut tx: StudioTx<'_> = StudioTx { conn };
            body(&mut tx).map_err(TxFailure::Body)
        });

        let err: E = match outcome {
            Ok(value) => return Ok(value),
            Err(failure) => failure.into_error(),
        };

        if attempt >= MAX_TRANSACTION_ATTEMPTS || !err.is_serialization_conflict() {
            return Err(err);
        }

        warn!(
            attempt,
            max_attempts = MAX_TRANSACTION_ATTEMPTS,
            "Transaction hit a serialization conflict; retrying"
        );
        std::thread::sleep(RETRY_BACKOFF * attempt);
        attempt += 1;
    }
}

/// A connection inside an open write transaction.
///
/// Exposes the reads and writes an engine operation needs. Everything done
/// through one `StudioTx` commits or rolls back together.
pub struct StudioTx<'a> {
    conn: &'a mut SqliteConnection,
}

impl StudioTx<'_> {
    /// Looks up a class.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_class(&mut self, class_id: i64) -> Result<Option<StudioClass>, PersistenceError> {
        queries::classes::find_class(self.conn, class_id)
    }

    /// Looks up a booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_booking(&mut self, booking_id: i64) -> Result<Option<Booking>, PersistenceError> {
        queries::bookings::find_booking(self.conn, booking_id)
    }

    /// Looks up a waitlist entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_waitlist_entry(
        &mut self,
        waitlist_id: i64,
    ) -> Result<Option<WaitlistEntry>, PersistenceError> {
        queries::waitlist::find_waitlist_entry(self.conn, waitlist_id)
    }

    /// Loads everything a command against `class` may read.
    ///
    /// Subscriptions are loaded for `requesting_users`, every booking owner
    /// and every waitlisted member.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn load_class_state(
        &mut self,
        class: StudioClass,
        requesting_users: &[i64],
    ) -> Result<ClassState, PersistenceError> {
        let confirmed: Vec<Booking> =
            queries::bookings::confirmed_bookings_for_class(self.conn, class.class_id)?;
        let entries: Vec<WaitlistEntry> =
            queries::waitlist::waitlist_for_class(self.conn, class.class_id)?;

        let user_ids: BTreeSet<i64> = requesting_users
            .iter()
            .copied()
            .chain(confirmed.iter().map(|b| b.user_id))
            .chain(entries.iter().map(|e| e.user_id))
            .collect();
        let user_ids: Vec<i64> = user_ids.into_iter().collect();
        let subscriptions: Vec<Subscription> =
            queries::subscriptions::subscriptions_for_users(self.conn, &user_ids)?;

        Ok(ClassState::new(class, confirmed, entries, subscriptions))
    }

    /// Writes the row changes of a transition.
    ///
    /// # Errors
    ///
    /// Returns the first failing write.
    pub fn apply_mutations(
        &mut self,
        mutations: &[Mutation],
        now: OffsetDateTime,
    ) -> Result<AppliedMutations, PersistenceError> {
        mutations::transition::apply_mutations(self.conn, mutations, now)
    }

    /// Records an audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence or serialization fails.
    pub fn persist_audit_event(&mut self, event: &AuditEvent) -> Result<i64, PersistenceError> {
        mutations::audit::persist_audit_event(self.conn, event)
    }

    /// Expires active subscriptions that ended before `today`.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn expire_subscriptions(&mut self, today: Date) -> Result<usize, PersistenceError> {
        mutations::subscriptions::expire_subscriptions(self.conn, today)
    }

    /// Registers a class.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_class(&mut self, class: &NewClass) -> Result<StudioClass, PersistenceError> {
        mutations::classes::create_class(self.conn, class)
    }

    /// Records a subscription.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_subscription(
        &mut self,
        subscription: &NewSubscription,
    ) -> Result<Subscription, PersistenceError> {
        mutations::subscriptions::create_subscription(self.conn, subscription)
    }
}
