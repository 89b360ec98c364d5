// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Collaborators the engine calls out to.
//!
//! The engine owns booking state only. Time, member notifications and the
//! external credit ledger sit behind these traits so that callers can swap
//! in fixed clocks and recording fakes.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use time::{Date, Duration, OffsetDateTime, Time};

/// A source of the current instant.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> OffsetDateTime;
}

/// The wall clock of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// A clock that only moves when told to.
///
/// Second resolution.
#[derive(Debug)]
pub struct FixedClock {
    unix_seconds: AtomicI64,
}

impl FixedClock {
    /// Creates a clock stopped at `at`.
    #[must_use]
    pub const fn new(at: OffsetDateTime) -> Self {
        Self {
            unix_seconds: AtomicI64::new(at.unix_timestamp()),
        }
    }

    /// Moves the clock to `at`.
    pub fn set(&self, at: OffsetDateTime) {
        self.unix_seconds
            .store(at.unix_timestamp(), Ordering::SeqCst);
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.unix_seconds
            .fetch_add(by.whole_seconds(), Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(self.unix_seconds.load(Ordering::SeqCst))
            .unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }
}

/// The kind of member notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// The member moved from the waitlist into a confirmed seat.
    WaitlistPromotion,
    /// A booking or waitlist place was cancelled.
    Cancellation,
    /// A reminder about an upcoming class.
    Reminder,
}

impl NotificationKind {
    /// Returns the string representation of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WaitlistPromotion => "waitlist_promotion",
            Self::Cancellation => "cancellation",
            Self::Reminder => "reminder",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured content of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Class display name.
    pub class_name: String,
    /// Studio-local class date.
    pub class_date: Date,
    /// Studio-local start time.
    pub start_time: Time,
    /// Human-readable message.
    pub message: String,
}

/// A message for one member about one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// The recipient.
    pub user_id: i64,
    /// The class concerned.
    pub class_id: i64,
    /// What happened.
    pub kind: NotificationKind,
    /// Details for rendering.
    pub payload: NotificationPayload,
}

/// Error returned by a notification dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchError {
    /// What went wrong.
    pub message: String,
}

impl DispatchError {
    /// Creates a new dispatch error.
    #[must_use]
    pub const fn new(message: String) -> Self {
        Self { message }
    }
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Notification dispatch failed: {}", self.message)
    }
}

impl std::error::Error for DispatchError {}

/// Delivers notifications to members.
///
/// Dispatch happens after the transition has committed. A failure is
/// reported to the caller but never undoes the transition.
pub trait NotificationDispatcher: Send + Sync {
    /// Delivers one notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification could not be delivered.
    fn notify(&self, notification: &Notification) -> Result<(), DispatchError>;
}

/// Error returned by the external credit ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerError {
    /// What went wrong.
    pub message: String,
}

impl LedgerError {
    /// Creates a new ledger error.
    #[must_use]
    pub const fn new(message: String) -> Self {
        Self { message }
    }
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credit ledger call failed: {}", self.message)
    }
}

impl std::error::Error for LedgerError {}

/// The external credit ledger.
///
/// Bookings without a subscription are paid for through this ledger.
/// Booking always requires a subscription, so the engine never debits the
/// ledger to confirm a seat; it only refunds ledger-paid bookings.
///
/// Refunds are made inside the booking transaction and an error aborts it.
/// The engine refunds each booking at most once per operation, even when the
/// transaction is retried. A refund whose transaction then fails to commit is
/// reversed with [`CreditLedger::debit_credit`] for the same member and class.
pub trait CreditLedger: Send + Sync {
    /// Takes one credit from a member for a class.
    ///
    /// The engine calls this only to reverse a refund that did not commit.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger rejected or could not record the debit.
    fn debit_credit(&self, user_id: i64, class_id: i64) -> Result<(), LedgerError>;

    /// Returns one credit to a member for a class.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger rejected or could not record the refund.
    fn refund_credit(&self, user_id: i64, class_id: i64) -> Result<(), LedgerError>;
}
