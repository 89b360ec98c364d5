// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Dates are ISO 8601 (`YYYY-MM-DD`), wall-clock times `HH:MM` in the studio
//! timezone, and instants RFC 3339.

use serde::{Deserialize, Serialize};

/// API request to book a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    /// The member to book.
    pub user_id: i64,
    /// The class to book.
    pub class_id: i64,
}

/// API request to join the waitlist of a full class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinWaitlistRequest {
    /// The member to queue.
    pub user_id: i64,
    /// The class.
    pub class_id: i64,
}

/// API request to change the seat count of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetCapacityRequest {
    /// The new capacity.
    pub capacity: i64,
}

/// API request to register a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateClassRequest {
    /// Display name.
    pub name: String,
    /// Seat count.
    pub capacity: i64,
    /// `mat`, `reformer` or `both`.
    pub equipment_type: String,
    /// `group` or `personal`.
    pub category: String,
    /// Studio-local date (`YYYY-MM-DD`).
    pub date: String,
    /// Studio-local start time (`HH:MM` or `HH:MM:SS`).
    pub start_time: String,
}

/// Date range for the class schedule projection, both ends inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRangeQuery {
    /// First day (`YYYY-MM-DD`).
    pub from: String,
    /// Last day (`YYYY-MM-DD`).
    pub to: String,
}

/// A class as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    /// Canonical identifier.
    pub class_id: i64,
    /// Display name.
    pub name: String,
    /// Seat count.
    pub capacity: u32,
    /// Confirmed bookings.
    pub enrolled: u32,
    /// Seats still open.
    pub spots_left: u32,
    /// Required equipment.
    pub equipment_type: String,
    /// Class category.
    pub category: String,
    /// Studio-local date.
    pub date: String,
    /// Studio-local start time.
    pub start_time: String,
    /// `active`, `full` or `cancelled`.
    pub status: String,
}

/// A booking as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingInfo {
    /// Canonical identifier.
    pub booking_id: i64,
    /// The member.
    pub user_id: i64,
    /// The class.
    pub class_id: i64,
    /// The subscription charged, if any.
    pub subscription_id: Option<i64>,
    /// Booking status.
    pub status: String,
    /// Whether the member has checked in.
    pub checked_in: bool,
    /// When the booking was made.
    pub created_at: String,
}

/// A waitlist entry as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistEntryInfo {
    /// Canonical identifier.
    pub waitlist_id: i64,
    /// The member.
    pub user_id: i64,
    /// The class.
    pub class_id: i64,
    /// 1-based queue position.
    pub position: u32,
    /// When the member joined.
    pub created_at: String,
}

/// A member moved from the waitlist into a seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotedInfo {
    /// The removed waitlist entry.
    pub waitlist_id: i64,
    /// The member.
    pub user_id: i64,
    /// The booking created for them.
    pub booking_id: i64,
    /// Their position when promoted.
    pub former_position: u32,
}

/// A waitlist entry passed over during promotion; it keeps its place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedInfo {
    /// The retained entry.
    pub waitlist_id: i64,
    /// The member.
    pub user_id: i64,
    /// Why the member could not be promoted.
    pub reason: String,
}

/// API response for a booking request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CreateBookingResponse {
    /// A seat was confirmed.
    Confirmed {
        /// The new booking.
        booking: BookingInfo,
    },
    /// The class was full; the member was queued.
    Waitlisted {
        /// The new waitlist entry.
        entry: WaitlistEntryInfo,
    },
}

/// API response for a waitlist join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinWaitlistResponse {
    /// The new entry.
    pub entry: WaitlistEntryInfo,
    /// A success message.
    pub message: String,
}

/// API response for a booking cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelBookingResponse {
    /// The booking, now cancelled.
    pub booking: BookingInfo,
    /// Members promoted into the freed seat.
    pub promoted: Vec<PromotedInfo>,
    /// Entries passed over.
    pub skipped: Vec<SkippedInfo>,
    /// A success message.
    pub message: String,
}

/// API response for leaving a waitlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveWaitlistResponse {
    /// The removed entry.
    pub waitlist_id: i64,
    /// The class.
    pub class_id: i64,
    /// A success message.
    pub message: String,
}

/// API response for operations that run promotion on a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionResponse {
    /// The class after the operation.
    pub class: ClassInfo,
    /// Members promoted.
    pub promoted: Vec<PromotedInfo>,
    /// Entries passed over.
    pub skipped: Vec<SkippedInfo>,
    /// A success message.
    pub message: String,
}

/// API response for a class cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelClassResponse {
    /// The class, now cancelled.
    pub class: ClassInfo,
    /// Bookings cancelled and refunded.
    pub cancelled_bookings: Vec<i64>,
    /// Waitlist entries removed.
    pub cleared_waitlist_entries: usize,
    /// A success message.
    pub message: String,
}

/// API response for a check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInResponse {
    /// The booking, now checked in.
    pub booking: BookingInfo,
}

/// API response for a class registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateClassResponse {
    /// The stored class.
    pub class: ClassInfo,
    /// A success message.
    pub message: String,
}

/// One class in a member's schedule view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassForUserInfo {
    /// The class.
    pub class: ClassInfo,
    /// The member's confirmed booking, if any.
    pub booking_id: Option<i64>,
    /// The member's waitlist position, if queued.
    pub waitlist_position: Option<u32>,
    /// Whether the member's current subscription can book this class.
    pub eligible: bool,
    /// Why not, when ineligible.
    pub ineligible_reason: Option<String>,
}

/// API response for the member schedule projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassesForUserResponse {
    /// The member.
    pub user_id: i64,
    /// Classes in date and start-time order.
    pub classes: Vec<ClassForUserInfo>,
}

/// A booking with its class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBookingInfo {
    /// The booking.
    pub booking: BookingInfo,
    /// The class booked.
    pub class: ClassInfo,
}

/// API response listing a member's bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBookingsResponse {
    /// The member.
    pub user_id: i64,
    /// Bookings, latest class first.
    pub bookings: Vec<UserBookingInfo>,
}

/// A waitlist entry with its class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserWaitlistInfo {
    /// The entry.
    pub entry: WaitlistEntryInfo,
    /// The class queued for.
    pub class: ClassInfo,
}

/// API response listing a member's waitlist entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserWaitlistResponse {
    /// The member.
    pub user_id: i64,
    /// Entries with their classes.
    pub entries: Vec<UserWaitlistInfo>,
}

/// API response for a subscription expiry sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpirySweepResponse {
    /// Subscriptions moved to `expired`.
    pub expired: usize,
    /// The studio-local day the sweep compared against.
    pub today: String,
}

/// API response for a class consistency check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInvariantsResponse {
    /// The class.
    pub class_id: i64,
    /// Stored enrollment counter.
    pub enrolled: u32,
    /// Confirmed booking rows.
    pub confirmed_bookings: usize,
    /// Stored capacity.
    pub capacity: u32,
    /// Waitlist positions in order.
    pub waitlist_positions: Vec<u32>,
    /// Whether every invariant holds.
    pub holds: bool,
}
