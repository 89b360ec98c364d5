// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary of the studio booking engine.
//!
//! Handlers authorize the actor, run one engine command per transaction
//! and translate every lower-layer error into an [`ApiError`]. Responses
//! are plain serializable DTOs.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod engine;
mod error;
mod handlers;
mod request_response;
mod services;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthorizationService, authenticate_stub};
pub use engine::{
    Committed, EngineError, EngineRequest, SweepOutcome, dispatch_notifications, execute,
    run_expiry_sweep as sweep_expired_subscriptions,
};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use handlers::{
    ApiResult, booking_info, cancel_booking, cancel_class, check_in, check_class_invariants,
    class_info, create_booking, create_class, get_classes_for_user, get_user_bookings,
    get_user_waitlist, join_waitlist, leave_waitlist, promote_waitlist, run_expiry_sweep,
    set_class_capacity, waitlist_entry_info,
};
pub use request_response::{
    BookingInfo, CancelBookingResponse, CancelClassResponse, CheckInResponse, ClassForUserInfo,
    ClassInfo, ClassInvariantsResponse, ClassRangeQuery, ClassesForUserResponse,
    CreateBookingRequest, CreateBookingResponse, CreateClassRequest, CreateClassResponse,
    ExpirySweepResponse, JoinWaitlistRequest, JoinWaitlistResponse, LeaveWaitlistResponse,
    PromotedInfo, PromotionResponse, SetCapacityRequest, SkippedInfo, UserBookingInfo,
    UserBookingsResponse, UserWaitlistInfo, UserWaitlistResponse, WaitlistEntryInfo,
};
pub use services::EngineServices;
