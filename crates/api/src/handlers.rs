// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.

use num_traits::cast::ToPrimitive;
use std::str::FromStr;
use studio_booking::{ClassState, Outcome, PromotionReport};
use studio_booking_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use studio_booking_domain::{
    Booking, ClassCategory, DomainError, EquipmentType, MAX_CLASS_CAPACITY, StudioClass,
    Subscription, WaitlistEntry, class_start_utc, parse_iso_date, parse_wall_clock_time, select_current_subscription,
    validate_subscription_for_class,
};
use studio_booking_persistence::{
    ClassInvariantReport, NewClass, Persistence, PersistenceError, StudioTx,
};
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime, Time};
use tracing::info;

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::engine::{Committed, EngineRequest, SweepOutcome, execute, run_expiry_sweep as sweep};
use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::request_response::{
    BookingInfo, CancelBookingResponse, CancelClassResponse, CheckInResponse, ClassForUserInfo,
    ClassInfo, ClassInvariantsResponse, ClassRangeQuery, ClassesForUserResponse,
    CreateBookingRequest, CreateBookingResponse, CreateClassRequest, CreateClassResponse,
    ExpirySweepResponse, JoinWaitlistRequest, JoinWaitlistResponse, LeaveWaitlistResponse,
    PromotedInfo, PromotionResponse, SetCapacityRequest, SkippedInfo, UserBookingInfo,
    UserBookingsResponse, UserWaitlistInfo, UserWaitlistResponse, WaitlistEntryInfo,
};
use crate::services::EngineServices;

/// The result of an API operation that includes both the response and the audit event.
///
/// This ensures that successful API operations always produce an audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResult<T> {
    /// The API response.
    pub response: T,
    /// The audit event generated by this operation.
    pub audit_event: AuditEvent,
}

// ============================================================================
// Response shaping
// ============================================================================

fn format_time(time: Time) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

fn format_instant(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_else(|_| at.to_string())
}

/// Converts a class into its API shape.
#[must_use]
pub fn class_info(class: &StudioClass) -> ClassInfo {
    ClassInfo {
        class_id: class.class_id,
        name: class.name.clone(),
        capacity: class.capacity,
        enrolled: class.enrolled,
        spots_left: class.spots_left(),
        equipment_type: class.equipment_type.to_string(),
        category: class.category.to_string(),
        date: class.date.to_string(),
        start_time: format_time(class.start_time),
        status: class.status.to_string(),
    }
}

/// Converts a booking into its API shape.
#[must_use]
pub fn booking_info(booking: &Booking) -> BookingInfo {
    BookingInfo {
        booking_id: booking.booking_id,
        user_id: booking.user_id,
        class_id: booking.class_id,
        subscription_id: booking.subscription_id,
        status: booking.status.to_string(),
        checked_in: booking.checked_in,
        created_at: format_instant(booking.created_at),
    }
}

/// Converts a waitlist entry into its API shape.
#[must_use]
pub fn waitlist_entry_info(entry: &WaitlistEntry) -> WaitlistEntryInfo {
    WaitlistEntryInfo {
        waitlist_id: entry.waitlist_id,
        user_id: entry.user_id,
        class_id: entry.class_id,
        position: entry.position,
        created_at: format_instant(entry.created_at),
    }
}

/// Pairs promotions with the bookings inserted for them.
///
/// Promotion bookings are the only inserts of the transitions that promote,
/// so the n-th inserted booking belongs to the n-th promotion.
fn promotion_infos(
    report: &PromotionReport,
    booking_ids: &[i64],
) -> (Vec<PromotedInfo>, Vec<SkippedInfo>) {
    let promoted: Vec<PromotedInfo> = report
        .promoted
        .iter()
        .zip(booking_ids)
        .map(|(promotion, booking_id)| PromotedInfo {
            waitlist_id: promotion.waitlist_id,
            user_id: promotion.user_id,
            booking_id: *booking_id,
            former_position: promotion.position,
        })
        .collect();
    let skipped: Vec<SkippedInfo> = report
        .skipped
        .iter()
        .map(|entry| SkippedInfo {
            waitlist_id: entry.waitlist_id,
            user_id: entry.user_id,
            reason: entry.reason.clone(),
        })
        .collect();
    (promoted, skipped)
}

fn unexpected_outcome(outcome: &Outcome) -> ApiError {
    ApiError::Internal {
        message: format!("Unexpected transition outcome: {outcome:?}"),
    }
}

fn load_booking(persistence: &mut Persistence, booking_id: i64) -> Result<Booking, ApiError> {
    persistence
        .get_booking(booking_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| translate_domain_error(DomainError::BookingNotFound(booking_id)))
}

fn load_waitlist_entry(
    persistence: &mut Persistence,
    waitlist_id: i64,
) -> Result<WaitlistEntry, ApiError> {
    persistence
        .get_waitlist_entry(waitlist_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| translate_domain_error(DomainError::WaitlistEntryNotFound(waitlist_id)))
}

fn first_inserted(ids: &[i64], what: &str) -> Result<i64, ApiError> {
    ids.first().copied().ok_or_else(|| ApiError::Internal {
        message: format!("Transition committed without inserting a {what}"),
    })
}

// ============================================================================
// Member operations
// ============================================================================

/// Books a class for a member.
///
/// When the class is full and the waitlist is still open, the member is
/// queued instead and the response says so.
///
/// # Arguments
///
/// * `persistence` - The store
/// * `services` - Clock, dispatcher, ledger and policy
/// * `request` - The member and class
/// * `authenticated_actor` - The authenticated actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if:
/// - A member books for someone else
/// - The class is missing, cancelled or started
/// - The member already holds a seat or a waitlist place
/// - The member's subscription cannot pay for or cover the class
/// - The class is full and the waitlist has closed
pub fn create_booking(
    persistence: &mut Persistence,
    services: &EngineServices,
    request: &CreateBookingRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: &Cause,
) -> Result<ApiResult<CreateBookingResponse>, ApiError> {
    AuthorizationService::authorize_for_user(
        authenticated_actor,
        request.user_id,
        "create_booking",
    )?;

    let committed: Committed = execute(
        persistence,
        services,
        &EngineRequest::Book {
            user_id: request.user_id,
            class_id: request.class_id,
        },
        &authenticated_actor.to_audit_actor(),
        cause,
    )?;

    let response: CreateBookingResponse = match committed.result.outcome {
        Outcome::Booked { .. } => {
            let booking_id: i64 = first_inserted(&committed.applied.booking_ids, "booking")?;
            CreateBookingResponse::Confirmed {
                booking: booking_info(&load_booking(persistence, booking_id)?),
            }
        }
        Outcome::Waitlisted { .. } => {
            let waitlist_id: i64 =
                first_inserted(&committed.applied.waitlist_ids, "waitlist entry")?;
            CreateBookingResponse::Waitlisted {
                entry: waitlist_entry_info(&load_waitlist_entry(persistence, waitlist_id)?),
            }
        }
        ref other => return Err(unexpected_outcome(other)),
    };

    Ok(ApiResult {
        response,
        audit_event: committed.audit_event,
    })
}

/// Queues a member on the waitlist of a full class.
///
/// # Errors
///
/// Returns an error if:
/// - A member queues someone else
/// - Any booking precondition fails
/// - The class still has open seats
/// - The waitlist has closed
pub fn join_waitlist(
    persistence: &mut Persistence,
    services: &EngineServices,
    request: &JoinWaitlistRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: &Cause,
) -> Result<ApiResult<JoinWaitlistResponse>, ApiError> {
    AuthorizationService::authorize_for_user(
        authenticated_actor,
        request.user_id,
        "join_waitlist",
    )?;

    let committed: Committed = execute(
        persistence,
        services,
        &EngineRequest::JoinWaitlist {
            user_id: request.user_id,
            class_id: request.class_id,
        },
        &authenticated_actor.to_audit_actor(),
        cause,
    )?;

    let Outcome::Waitlisted { position, .. } = committed.result.outcome else {
        return Err(unexpected_outcome(&committed.result.outcome));
    };
    let waitlist_id: i64 = first_inserted(&committed.applied.waitlist_ids, "waitlist entry")?;
    let entry: WaitlistEntry = load_waitlist_entry(persistence, waitlist_id)?;

    Ok(ApiResult {
        response: JoinWaitlistResponse {
            entry: waitlist_entry_info(&entry),
            message: format!("Joined the waitlist at position {position}"),
        },
        audit_event: committed.audit_event,
    })
}

/// Cancels a confirmed booking and promotes from the waitlist.
///
/// Members may cancel only their own bookings and only while the class is
/// more than the cancellation window away. Staff may cancel any booking at
/// any time.
///
/// # Errors
///
/// Returns an error if:
/// - The booking does not exist or is not confirmed
/// - A member cancels another member's booking
/// - A member cancels inside the window
/// - The credit ledger refuses the refund
pub fn cancel_booking(
    persistence: &mut Persistence,
    services: &EngineServices,
    booking_id: i64,
    authenticated_actor: &AuthenticatedActor,
    cause: &Cause,
) -> Result<ApiResult<CancelBookingResponse>, ApiError> {
    let committed: Committed = execute(
        persistence,
        services,
        &EngineRequest::CancelBooking {
            booking_id,
            requested_by: authenticated_actor.to_requester(),
        },
        &authenticated_actor.to_audit_actor(),
        cause,
    )?;

    let (promoted, skipped) =
        promotion_infos(&committed.result.promotions, &committed.applied.booking_ids);
    let booking: Booking = load_booking(persistence, booking_id)?;
    let message: String = if promoted.is_empty() {
        format!("Booking {booking_id} cancelled")
    } else {
        format!(
            "Booking {booking_id} cancelled; {} member(s) promoted from the waitlist",
            promoted.len()
        )
    };

    Ok(ApiResult {
        response: CancelBookingResponse {
            booking: booking_info(&booking),
            promoted,
            skipped,
            message,
        },
        audit_event: committed.audit_event,
    })
}

/// Removes a waitlist entry and closes the gap behind it.
///
/// # Errors
///
/// Returns an error if the entry does not exist or a member removes
/// another member's entry.
pub fn leave_waitlist(
    persistence: &mut Persistence,
    services: &EngineServices,
    waitlist_id: i64,
    authenticated_actor: &AuthenticatedActor,
    cause: &Cause,
) -> Result<ApiResult<LeaveWaitlistResponse>, ApiError> {
    let committed: Committed = execute(
        persistence,
        services,
        &EngineRequest::LeaveWaitlist {
            waitlist_id,
            requested_by: authenticated_actor.to_requester(),
        },
        &authenticated_actor.to_audit_actor(),
        cause,
    )?;

    Ok(ApiResult {
        response: LeaveWaitlistResponse {
            waitlist_id,
            class_id: committed.result.class_after.class_id,
            message: format!("Waitlist entry {waitlist_id} removed"),
        },
        audit_event: committed.audit_event,
    })
}

// ============================================================================
// Staff operations
// ============================================================================

fn promotion_response(committed: &Committed, message: String) -> PromotionResponse {
    let (promoted, skipped) =
        promotion_infos(&committed.result.promotions, &committed.applied.booking_ids);
    PromotionResponse {
        class: class_info(&committed.result.class_after),
        promoted,
        skipped,
        message,
    }
}

/// Fills open seats of a class from its waitlist.
///
/// # Errors
///
/// Returns an error if the actor is not staff, or the class is missing or
/// cancelled.
pub fn promote_waitlist(
    persistence: &mut Persistence,
    services: &EngineServices,
    class_id: i64,
    authenticated_actor: &AuthenticatedActor,
    cause: &Cause,
) -> Result<ApiResult<PromotionResponse>, ApiError> {
    AuthorizationService::authorize_staff_action(authenticated_actor, "promote_waitlist")?;

    let committed: Committed = execute(
        persistence,
        services,
        &EngineRequest::Promote { class_id },
        &authenticated_actor.to_audit_actor(),
        cause,
    )?;

    let message: String = format!(
        "{} member(s) promoted, {} skipped",
        committed.result.promotions.promoted.len(),
        committed.result.promotions.skipped.len()
    );
    Ok(ApiResult {
        response: promotion_response(&committed, message),
        audit_event: committed.audit_event,
    })
}

/// Changes the seat count of a class, then promotes into any new seats.
///
/// # Errors
///
/// Returns an error if the actor is not staff, the class is missing or
/// cancelled, or the capacity is zero or below current enrollment.
pub fn set_class_capacity(
    persistence: &mut Persistence,
    services: &EngineServices,
    class_id: i64,
    request: &SetCapacityRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: &Cause,
) -> Result<ApiResult<PromotionResponse>, ApiError> {
    AuthorizationService::authorize_staff_action(authenticated_actor, "set_class_capacity")?;

    let committed: Committed = execute(
        persistence,
        services,
        &EngineRequest::SetCapacity {
            class_id,
            capacity: request.capacity,
        },
        &authenticated_actor.to_audit_actor(),
        cause,
    )?;

    let message: String = format!("Capacity set to {}", request.capacity);
    Ok(ApiResult {
        response: promotion_response(&committed, message),
        audit_event: committed.audit_event,
    })
}

/// Cancels a class: every booking is cancelled and refunded, the waitlist
/// is cleared and every affected member is notified.
///
/// # Errors
///
/// Returns an error if the actor is not staff, the class is missing or
/// already cancelled, or the credit ledger refuses a refund.
pub fn cancel_class(
    persistence: &mut Persistence,
    services: &EngineServices,
    class_id: i64,
    authenticated_actor: &AuthenticatedActor,
    cause: &Cause,
) -> Result<ApiResult<CancelClassResponse>, ApiError> {
    AuthorizationService::authorize_staff_action(authenticated_actor, "cancel_class")?;

    let committed: Committed = execute(
        persistence,
        services,
        &EngineRequest::CancelClass { class_id },
        &authenticated_actor.to_audit_actor(),
        cause,
    )?;

    let Outcome::ClassCancelled {
        cancelled_bookings,
        cleared_waitlist_entries,
    } = committed.result.outcome.clone()
    else {
        return Err(unexpected_outcome(&committed.result.outcome));
    };

    Ok(ApiResult {
        response: CancelClassResponse {
            class: class_info(&committed.result.class_after),
            message: format!(
                "Class {class_id} cancelled; {} booking(s) refunded, {cleared_waitlist_entries} waitlist entr(ies) cleared",
                cancelled_bookings.len()
            ),
            cancelled_bookings,
            cleared_waitlist_entries,
        },
        audit_event: committed.audit_event,
    })
}

/// Marks a confirmed booking as checked in.
///
/// # Errors
///
/// Returns an error if the actor is not staff, or the booking is missing
/// or not confirmed.
pub fn check_in(
    persistence: &mut Persistence,
    services: &EngineServices,
    booking_id: i64,
    authenticated_actor: &AuthenticatedActor,
    cause: &Cause,
) -> Result<ApiResult<CheckInResponse>, ApiError> {
    AuthorizationService::authorize_staff_action(authenticated_actor, "check_in")?;

    let committed: Committed = execute(
        persistence,
        services,
        &EngineRequest::CheckIn { booking_id },
        &authenticated_actor.to_audit_actor(),
        cause,
    )?;

    Ok(ApiResult {
        response: CheckInResponse {
            booking: booking_info(&load_booking(persistence, booking_id)?),
        },
        audit_event: committed.audit_event,
    })
}

/// Validates a class registration request.
fn parse_new_class(request: &CreateClassRequest, timezone: &str) -> Result<NewClass, ApiError> {
    let name: String = request.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("name"),
            message: String::from("Class name cannot be empty"),
        });
    }
    let capacity: u32 = request
        .capacity
        .to_u32()
        .filter(|capacity| (1..=MAX_CLASS_CAPACITY).contains(capacity))
        .ok_or_else(|| ApiError::InvalidInput {
            field: String::from("capacity"),
            message: format!(
                "Capacity must be between 1 and {MAX_CLASS_CAPACITY}, got {}",
                request.capacity
            ),
        })?;
    let equipment_type: EquipmentType =
        EquipmentType::from_str(&request.equipment_type).map_err(translate_domain_error)?;
    let category: ClassCategory =
        ClassCategory::from_str(&request.category).map_err(translate_domain_error)?;
    let date: Date = parse_iso_date(&request.date).map_err(translate_domain_error)?;
    let start_time: Time =
        parse_wall_clock_time(&request.start_time).map_err(translate_domain_error)?;

    // Rejects local times skipped by a DST transition.
    class_start_utc(date, start_time, timezone).map_err(translate_domain_error)?;

    Ok(NewClass {
        name,
        capacity,
        equipment_type,
        category,
        date,
        start_time,
    })
}

/// Registers a class.
///
/// # Errors
///
/// Returns an error if the actor is not staff, a field is invalid, or the
/// store fails.
pub fn create_class(
    persistence: &mut Persistence,
    services: &EngineServices,
    request: &CreateClassRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: &Cause,
) -> Result<ApiResult<CreateClassResponse>, ApiError> {
    AuthorizationService::authorize_staff_action(authenticated_actor, "create_class")?;

    let new_class: NewClass = parse_new_class(request, &services.policy.timezone)?;
    let actor: Actor = authenticated_actor.to_audit_actor();

    let (class, audit_event) = persistence
        .atomically(
            |tx: &mut StudioTx<'_>| -> Result<(StudioClass, AuditEvent), PersistenceError> {
                let class: StudioClass = tx.create_class(&new_class)?;
                let event: AuditEvent = AuditEvent::new(
                    actor.clone(),
                    cause.clone(),
                    Action::new(
                        String::from("CreateClass"),
                        Some(format!("name={}", class.name)),
                    ),
                    StateSnapshot::new(String::from("none")),
                    ClassState::new(class.clone(), Vec::new(), Vec::new(), Vec::new())
                        .to_snapshot(),
                    class.class_id,
                );
                let event_id: i64 = tx.persist_audit_event(&event)?;
                Ok((class, event.with_event_id(event_id)))
            },
        )
        .map_err(translate_persistence_error)?;

    info!(
        class_id = class.class_id,
        date = %class.date,
        capacity = class.capacity,
        "Class created"
    );

    Ok(ApiResult {
        response: CreateClassResponse {
            message: format!("Class '{}' created", class.name),
            class: class_info(&class),
        },
        audit_event,
    })
}

/// Expires every active subscription whose end date has passed.
///
/// # Errors
///
/// Returns an error if the actor is not staff or the store fails.
pub fn run_expiry_sweep(
    persistence: &mut Persistence,
    services: &EngineServices,
    authenticated_actor: &AuthenticatedActor,
    cause: &Cause,
) -> Result<ExpirySweepResponse, ApiError> {
    AuthorizationService::authorize_staff_action(authenticated_actor, "run_expiry_sweep")?;

    let outcome: SweepOutcome = sweep(
        persistence,
        services,
        &authenticated_actor.to_audit_actor(),
        cause,
    )?;
    Ok(ExpirySweepResponse {
        expired: outcome.expired,
        today: outcome.today.to_string(),
    })
}

/// Reports whether the stored rows of a class are consistent.
///
/// # Errors
///
/// Returns an error if the actor is not staff or the class does not exist.
pub fn check_class_invariants(
    persistence: &mut Persistence,
    class_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ClassInvariantsResponse, ApiError> {
    AuthorizationService::authorize_staff_action(authenticated_actor, "check_class_invariants")?;

    let report: ClassInvariantReport =
        persistence
            .check_class_invariants(class_id)
            .map_err(|err| match err {
                PersistenceError::NotFound(_) => {
                    translate_domain_error(DomainError::ClassNotFound(class_id))
                }
                other => translate_persistence_error(other),
            })?;

    Ok(ClassInvariantsResponse {
        class_id: report.class_id,
        enrolled: report.enrolled,
        confirmed_bookings: report.confirmed_bookings,
        capacity: report.capacity,
        holds: report.holds(),
        waitlist_positions: report.waitlist_positions,
    })
}

// ============================================================================
// Read projections
// ============================================================================

/// Lists classes in a date range as seen by one member.
///
/// Each class carries the member's booking or waitlist position and whether
/// their current subscription could book it.
///
/// # Errors
///
/// Returns an error if:
/// - A member asks about someone else
/// - A date is malformed or the range ends before it starts
/// - The store fails
pub fn get_classes_for_user(
    persistence: &mut Persistence,
    services: &EngineServices,
    user_id: i64,
    query: &ClassRangeQuery,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ClassesForUserResponse, ApiError> {
    AuthorizationService::authorize_for_user(authenticated_actor, user_id, "get_classes_for_user")?;

    let from: Date = parse_iso_date(&query.from).map_err(translate_domain_error)?;
    let to: Date = parse_iso_date(&query.to).map_err(translate_domain_error)?;
    if to < from {
        return Err(translate_domain_error(DomainError::InvalidDateRange {
            from,
            to,
        }));
    }
    let today: Date = services.today_at(services.now())?;

    let classes: Vec<StudioClass> = persistence
        .classes_between(from, to)
        .map_err(translate_persistence_error)?;
    let bookings: Vec<(Booking, StudioClass)> = persistence
        .bookings_for_user(user_id)
        .map_err(translate_persistence_error)?;
    let entries: Vec<(WaitlistEntry, StudioClass)> = persistence
        .waitlist_for_user(user_id)
        .map_err(translate_persistence_error)?;
    let subscriptions: Vec<Subscription> = persistence
        .subscriptions_for_user(user_id)
        .map_err(translate_persistence_error)?;
    let current: Option<&Subscription> =
        select_current_subscription(&subscriptions, user_id, today);

    let classes: Vec<ClassForUserInfo> = classes
        .iter()
        .map(|class| {
            let booking_id: Option<i64> = bookings
                .iter()
                .find(|(b, _)| b.class_id == class.class_id && b.is_confirmed())
                .map(|(b, _)| b.booking_id);
            let waitlist_position: Option<u32> = entries
                .iter()
                .find(|(e, _)| e.class_id == class.class_id)
                .map(|(e, _)| e.position);
            let eligibility: Result<(), DomainError> = current.map_or(
                Err(DomainError::NoActiveSubscription { user_id }),
                |subscription| validate_subscription_for_class(subscription, class),
            );
            ClassForUserInfo {
                class: class_info(class),
                booking_id,
                waitlist_position,
                eligible: eligibility.is_ok(),
                ineligible_reason: eligibility.err().map(|err| err.to_string()),
            }
        })
        .collect();

    Ok(ClassesForUserResponse { user_id, classes })
}

/// Lists a member's bookings with their classes, latest class first.
///
/// # Errors
///
/// Returns an error if a member asks about someone else or the store fails.
pub fn get_user_bookings(
    persistence: &mut Persistence,
    user_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<UserBookingsResponse, ApiError> {
    AuthorizationService::authorize_for_user(authenticated_actor, user_id, "get_user_bookings")?;

    let bookings: Vec<UserBookingInfo> = persistence
        .bookings_for_user(user_id)
        .map_err(translate_persistence_error)?
        .iter()
        .map(|(booking, class)| UserBookingInfo {
            booking: booking_info(booking),
            class: class_info(class),
        })
        .collect();

    Ok(UserBookingsResponse { user_id, bookings })
}

/// Lists a member's waitlist entries with their classes.
///
/// # Errors
///
/// Returns an error if a member asks about someone else or the store fails.
pub fn get_user_waitlist(
    persistence: &mut Persistence,
    user_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<UserWaitlistResponse, ApiError> {
    AuthorizationService::authorize_for_user(authenticated_actor, user_id, "get_user_waitlist")?;

    let entries: Vec<UserWaitlistInfo> = persistence
        .waitlist_for_user(user_id)
        .map_err(translate_persistence_error)?
        .iter()
        .map(|(entry, class)| UserWaitlistInfo {
            entry: waitlist_entry_info(entry),
            class: class_info(class),
        })
        .collect();

    Ok(UserWaitlistResponse { user_id, entries })
}
