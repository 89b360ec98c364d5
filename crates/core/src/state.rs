// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::collaborators::Notification;
use studio_booking_audit::{AuditEvent, StateSnapshot};
use studio_booking_domain::{
    Booking, BookingPolicy, BookingStatus, ClassStatus, Credits, StudioClass, Subscription,
    WaitlistEntry,
};
use time::OffsetDateTime;

/// Everything a transition may read about one class, loaded inside the
/// transaction that will write the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassState {
    /// The class row.
    pub class: StudioClass,
    /// Confirmed bookings for the class.
    pub confirmed: Vec<Booking>,
    /// Waitlist entries for the class, ordered by position.
    pub waitlist: Vec<WaitlistEntry>,
    /// Subscriptions of every member the command may touch: the requester,
    /// booking owners and everyone on the waitlist.
    pub subscriptions: Vec<Subscription>,
}

impl ClassState {
    /// Creates a class state, ordering the waitlist by position.
    #[must_use]
    pub fn new(
        class: StudioClass,
        confirmed: Vec<Booking>,
        mut waitlist: Vec<WaitlistEntry>,
        subscriptions: Vec<Subscription>,
    ) -> Self {
        waitlist.sort_by_key(|e| e.position);
        Self {
            class,
            confirmed,
            waitlist,
            subscriptions,
        }
    }

    /// Returns the member's confirmed booking for this class, if any.
    #[must_use]
    pub fn confirmed_booking_of(&self, user_id: i64) -> Option<&Booking> {
        self.confirmed.iter().find(|b| b.user_id == user_id)
    }

    /// Returns the member's waitlist entry for this class, if any.
    #[must_use]
    pub fn waitlist_entry_of(&self, user_id: i64) -> Option<&WaitlistEntry> {
        self.waitlist.iter().find(|e| e.user_id == user_id)
    }

    /// Converts the state to a snapshot for audit purposes.
    #[must_use]
    pub fn to_snapshot(&self) -> StateSnapshot {
        snapshot_of(&self.class, self.waitlist.len())
    }
}

pub(crate) fn snapshot_of(class: &StudioClass, waitlist_len: usize) -> StateSnapshot {
    StateSnapshot::new(format!(
        "class_id={},status={},enrolled={},capacity={},waitlist={}",
        class.class_id, class.status, class.enrolled, class.capacity, waitlist_len
    ))
}

/// Inputs a transition needs besides the class state.
#[derive(Debug, Clone, Copy)]
pub struct EngineContext<'a> {
    /// The instant the transition happens at.
    pub now: OffsetDateTime,
    /// Studio booking policy.
    pub policy: &'a BookingPolicy,
}

impl<'a> EngineContext<'a> {
    /// Creates a context.
    #[must_use]
    pub const fn new(now: OffsetDateTime, policy: &'a BookingPolicy) -> Self {
        Self { now, policy }
    }
}

/// A single row change the persistence layer must apply, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Insert a confirmed booking.
    InsertBooking {
        /// The member.
        user_id: i64,
        /// The class.
        class_id: i64,
        /// The subscription debited, if any.
        subscription_id: Option<i64>,
    },
    /// Move a booking to another status.
    SetBookingStatus {
        /// The booking.
        booking_id: i64,
        /// The new status.
        status: BookingStatus,
    },
    /// Flag a booking as checked in.
    MarkCheckedIn {
        /// The booking.
        booking_id: i64,
    },
    /// Rewrite the class counters and status.
    UpdateClass {
        /// The class.
        class_id: i64,
        /// Seat count.
        capacity: u32,
        /// Confirmed bookings.
        enrolled: u32,
        /// Lifecycle status.
        status: ClassStatus,
    },
    /// Rewrite a subscription's remaining credits.
    SetCredits {
        /// The subscription.
        subscription_id: i64,
        /// Remaining credits.
        credits: Credits,
    },
    /// Append a member to the waitlist.
    InsertWaitlistEntry {
        /// The member.
        user_id: i64,
        /// The class.
        class_id: i64,
        /// The queue position.
        position: u32,
    },
    /// Remove a waitlist entry.
    DeleteWaitlistEntry {
        /// The entry.
        waitlist_id: i64,
    },
    /// Give an entry a new position.
    MoveWaitlistEntry {
        /// The entry.
        waitlist_id: i64,
        /// The new position.
        position: u32,
    },
}

/// A call to make against the external credit ledger inside the transaction.
///
/// Every call names the booking it settles, so a caller can tell a repeated
/// call from a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerCall {
    /// Return a credit for a booking paid through the ledger.
    Refund {
        /// The booking being refunded.
        booking_id: i64,
        /// The member.
        user_id: i64,
        /// The class.
        class_id: i64,
    },
}

impl LedgerCall {
    /// The booking this call settles.
    #[must_use]
    pub const fn booking_id(&self) -> i64 {
        match *self {
            Self::Refund { booking_id, .. } => booking_id,
        }
    }
}

/// A waitlist entry turned into a confirmed booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Promotion {
    /// The entry that was removed.
    pub waitlist_id: i64,
    /// The promoted member.
    pub user_id: i64,
    /// The subscription debited.
    pub subscription_id: i64,
    /// Position the member held before promotion.
    pub position: u32,
}

/// A waitlist entry left in place because its member could not be promoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// The retained entry.
    pub waitlist_id: i64,
    /// The member.
    pub user_id: i64,
    /// Why the member was not eligible.
    pub reason: String,
}

/// What a promotion pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromotionReport {
    /// Members promoted, in promotion order.
    pub promoted: Vec<Promotion>,
    /// Members passed over, in queue order.
    pub skipped: Vec<SkippedEntry>,
}

/// The headline result of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A seat was confirmed.
    Booked {
        /// The member.
        user_id: i64,
        /// The subscription debited.
        subscription_id: i64,
    },
    /// The member joined the waitlist.
    Waitlisted {
        /// The member.
        user_id: i64,
        /// Their queue position.
        position: u32,
    },
    /// A booking was cancelled.
    BookingCancelled {
        /// The booking.
        booking_id: i64,
    },
    /// A waitlist entry was removed.
    LeftWaitlist {
        /// The entry.
        waitlist_id: i64,
    },
    /// A promotion pass ran.
    WaitlistProcessed,
    /// The class capacity changed.
    CapacityChanged {
        /// The new seat count.
        capacity: u32,
    },
    /// The class was cancelled.
    ClassCancelled {
        /// Bookings cancelled with it.
        cancelled_bookings: Vec<i64>,
        /// Waitlist entries removed with it.
        cleared_waitlist_entries: usize,
    },
    /// A booking was checked in.
    CheckedIn {
        /// The booking.
        booking_id: i64,
    },
}

/// The result of a successful state transition.
///
/// Transitions are atomic: the caller writes every mutation, the audit event
/// and the ledger calls in one transaction, or none of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The class row after the transition.
    pub class_after: StudioClass,
    /// Row changes, in the order they must be applied.
    pub mutations: Vec<Mutation>,
    /// External ledger calls to make before commit.
    pub ledger_calls: Vec<LedgerCall>,
    /// Notifications to dispatch after commit.
    pub notifications: Vec<Notification>,
    /// Waitlist promotions performed.
    pub promotions: PromotionReport,
    /// The headline result.
    pub outcome: Outcome,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}
