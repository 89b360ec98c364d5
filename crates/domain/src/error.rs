// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::class::MAX_CLASS_CAPACITY;
use crate::types::{BookingStatus, ClassCategory, EquipmentType};
use time::OffsetDateTime;

/// Errors raised when a booking rule rejects an operation.
///
/// Every variant carries enough context for the client to explain the
/// rejection (which equipment was required, how close the class is, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The class does not exist.
    ClassNotFound(i64),
    /// The class has been cancelled by the studio.
    ClassCancelled(i64),
    /// The class start time is not in the future.
    ClassAlreadyStarted {
        /// The class identifier.
        class_id: i64,
        /// The resolved class start (UTC).
        starts_at: OffsetDateTime,
    },
    /// The user already holds a confirmed booking or a waitlist entry for the class.
    AlreadyBooked {
        /// The user.
        user_id: i64,
        /// The class.
        class_id: i64,
        /// The current waitlist position, when the existing claim is a waitlist entry.
        waitlist_position: Option<u32>,
    },
    /// The user has no current subscription.
    NoActiveSubscription {
        /// The user.
        user_id: i64,
    },
    /// The current subscription has no credits left.
    NoRemainingClasses {
        /// The subscription that was checked.
        subscription_id: i64,
    },
    /// The subscription category does not match the class category.
    CategoryMismatch {
        /// The category the class requires.
        required: ClassCategory,
        /// The category the subscription grants.
        held: ClassCategory,
    },
    /// The subscription does not cover the class equipment.
    EquipmentMismatch {
        /// The equipment the class requires.
        required: EquipmentType,
        /// The equipment access the subscription grants.
        held: EquipmentType,
    },
    /// The class is full and too close to start for the waitlist.
    ClassFullWaitlistClosed {
        /// The class identifier.
        class_id: i64,
        /// Whole minutes until the class starts.
        minutes_until_start: i64,
    },
    /// A waitlist join was requested while seats are still open.
    ClassNotFull {
        /// The class identifier.
        class_id: i64,
        /// Seats still open.
        spots_left: u32,
    },
    /// The booking does not exist.
    BookingNotFound(i64),
    /// The booking is not in a cancellable state.
    NotCancellable {
        /// The booking identifier.
        booking_id: i64,
        /// The current booking status.
        status: BookingStatus,
    },
    /// A member attempted to act on another user's booking.
    NotBookingOwner {
        /// The booking identifier.
        booking_id: i64,
        /// The member attempting the action.
        user_id: i64,
    },
    /// A member cancellation arrived inside the cancellation window.
    CancellationWindowClosed {
        /// The booking identifier.
        booking_id: i64,
        /// Whole minutes until the class starts.
        minutes_until_start: i64,
        /// The configured window in minutes.
        window_minutes: i64,
    },
    /// The waitlist entry does not exist.
    WaitlistEntryNotFound(i64),
    /// A member attempted to remove another user's waitlist entry.
    NotWaitlistOwner {
        /// The waitlist entry identifier.
        waitlist_id: i64,
        /// The member attempting the action.
        user_id: i64,
    },
    /// The booking must be confirmed for this operation.
    BookingNotConfirmed {
        /// The booking identifier.
        booking_id: i64,
        /// The current booking status.
        status: BookingStatus,
    },
    /// A capacity change would be zero or drop below current enrollment.
    InvalidCapacity {
        /// The requested capacity.
        capacity: i64,
        /// Current enrollment.
        enrolled: u32,
    },
    /// The studio timezone is not a known IANA zone.
    InvalidTimezone(String),
    /// A class date/time cannot be resolved to an instant.
    InvalidClassSchedule {
        /// Description of the failure.
        reason: String,
    },
    /// A stored or requested enum value is not recognised.
    InvalidEnumValue {
        /// The enum being parsed.
        kind: &'static str,
        /// The rejected value.
        value: String,
    },
    /// Failed to parse a date or time string.
    DateParseError {
        /// The invalid input.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// The requested date range ends before it starts.
    InvalidDateRange {
        /// Range start.
        from: time::Date,
        /// Range end.
        to: time::Date,
    },
}

impl std::fmt::Display for DomainError {
    #[allow(clippy::too_many_lines)]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClassNotFound(id) => write!(f, "Class {id} not found"),
            Self::ClassCancelled(id) => write!(f, "Class {id} has been cancelled"),
            Self::ClassAlreadyStarted {
                class_id,
                starts_at,
            } => {
                write!(f, "Class {class_id} already started at {starts_at}")
            }
            Self::AlreadyBooked {
                user_id,
                class_id,
                waitlist_position,
            } => match waitlist_position {
                Some(position) => write!(
                    f,
                    "User {user_id} is already on the waitlist for class {class_id} at position {position}"
                ),
                None => write!(f, "User {user_id} already has a booking for class {class_id}"),
            },
            Self::NoActiveSubscription { user_id } => {
                write!(f, "User {user_id} has no active subscription")
            }
            Self::NoRemainingClasses { subscription_id } => {
                write!(f, "Subscription {subscription_id} has no remaining classes")
            }
            Self::CategoryMismatch { required, held } => {
                write!(
                    f,
                    "This class requires a {required} subscription, but the current subscription is {held}"
                )
            }
            Self::EquipmentMismatch { required, held } => {
                write!(
                    f,
                    "This class requires {required} equipment access, but the current subscription covers {held}"
                )
            }
            Self::ClassFullWaitlistClosed {
                class_id,
                minutes_until_start,
            } => {
                write!(
                    f,
                    "Class {class_id} is full and starts in {minutes_until_start} minutes; the waitlist is closed"
                )
            }
            Self::ClassNotFull {
                class_id,
                spots_left,
            } => {
                write!(
                    f,
                    "Class {class_id} still has {spots_left} open spots; book directly instead"
                )
            }
            Self::BookingNotFound(id) => write!(f, "Booking {id} not found"),
            Self::NotCancellable { booking_id, status } => {
                write!(
                    f,
                    "Booking {booking_id} cannot be cancelled from status '{status}'"
                )
            }
            Self::NotBookingOwner {
                booking_id,
                user_id,
            } => {
                write!(f, "Booking {booking_id} does not belong to user {user_id}")
            }
            Self::CancellationWindowClosed {
                booking_id,
                minutes_until_start,
                window_minutes,
            } => {
                write!(
                    f,
                    "Booking {booking_id} cannot be cancelled: the class starts in {minutes_until_start} minutes and cancellations close {window_minutes} minutes before start"
                )
            }
            Self::WaitlistEntryNotFound(id) => write!(f, "Waitlist entry {id} not found"),
            Self::NotWaitlistOwner {
                waitlist_id,
                user_id,
            } => {
                write!(
                    f,
                    "Waitlist entry {waitlist_id} does not belong to user {user_id}"
                )
            }
            Self::BookingNotConfirmed { booking_id, status } => {
                write!(
                    f,
                    "Booking {booking_id} is '{status}', only confirmed bookings can be checked in"
                )
            }
            Self::InvalidCapacity { capacity, enrolled } => {
                write!(
                    f,
                    "Invalid capacity {capacity}: must be between 1 and {MAX_CLASS_CAPACITY} and at least the {enrolled} enrolled"
                )
            }
            Self::InvalidTimezone(tz) => write!(f, "Invalid timezone: {tz}"),
            Self::InvalidClassSchedule { reason } => {
                write!(f, "Invalid class schedule: {reason}")
            }
            Self::InvalidEnumValue { kind, value } => {
                write!(f, "Invalid {kind}: '{value}'")
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::InvalidDateRange { from, to } => {
                write!(f, "Invalid date range: {to} is before {from}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
