// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use studio_booking_domain::{ActorRole, Booking};

/// Who asked for a cancellation or waitlist removal.
///
/// Members are bound by ownership and the cancellation window; staff are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    /// The requester's role.
    pub role: ActorRole,
    /// The member's user id, when the requester is a member.
    pub user_id: Option<i64>,
}

impl Requester {
    /// A member acting for themself.
    #[must_use]
    pub const fn member(user_id: i64) -> Self {
        Self {
            role: ActorRole::Member,
            user_id: Some(user_id),
        }
    }

    /// A staff account.
    #[must_use]
    pub const fn staff(role: ActorRole) -> Self {
        Self {
            role,
            user_id: None,
        }
    }

    /// Returns whether this requester acts for `user_id` as a member.
    pub(crate) fn is_member_other_than(&self, user_id: i64) -> bool {
        self.role == ActorRole::Member && self.user_id != Some(user_id)
    }
}

/// A command represents intent against a single class, as data only.
///
/// Commands are the only way to request booking state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Book a seat, falling back to the waitlist when the class is full.
    BookClass {
        /// The member to book.
        user_id: i64,
    },
    /// Join the waitlist of a full class.
    JoinWaitlist {
        /// The member to queue.
        user_id: i64,
    },
    /// Cancel a confirmed booking and promote from the waitlist.
    CancelBooking {
        /// The booking, as loaded in the current transaction.
        booking: Booking,
        /// Who asked.
        requested_by: Requester,
    },
    /// Remove a waitlist entry and close the gap behind it.
    LeaveWaitlist {
        /// The entry to remove.
        waitlist_id: i64,
        /// Who asked.
        requested_by: Requester,
    },
    /// Fill open seats from the waitlist.
    PromoteWaitlist,
    /// Change the seat count, then promote into any new seats.
    SetCapacity {
        /// The requested capacity.
        capacity: i64,
    },
    /// Cancel the class, refunding every booking and clearing the waitlist.
    CancelClass,
    /// Mark a confirmed booking as checked in.
    CheckIn {
        /// The booking, as loaded in the current transaction.
        booking: Booking,
    },
}

impl Command {
    /// The audit action name for this command.
    #[must_use]
    pub const fn action_name(&self) -> &'static str {
        match self {
            Self::BookClass { .. } => "BookClass",
            Self::JoinWaitlist { .. } => "JoinWaitlist",
            Self::CancelBooking { .. } => "CancelBooking",
            Self::LeaveWaitlist { .. } => "LeaveWaitlist",
            Self::PromoteWaitlist => "PromoteWaitlist",
            Self::SetCapacity { .. } => "SetCapacity",
            Self::CancelClass => "CancelClass",
            Self::CheckIn { .. } => "CheckIn",
        }
    }
}
