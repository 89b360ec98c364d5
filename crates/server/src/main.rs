// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod ledger;
mod live;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use studio_booking::{Clock, CreditLedger, NotificationDispatcher, SystemClock};
use studio_booking_api::{
    ApiError, ApiResult, AuthenticatedActor, AuthorizationService, CancelBookingResponse,
    CancelClassResponse, CheckInResponse, ClassInvariantsResponse, ClassRangeQuery,
    ClassesForUserResponse, CreateBookingRequest, CreateBookingResponse, CreateClassRequest,
    CreateClassResponse, EngineServices, ExpirySweepResponse, JoinWaitlistRequest,
    JoinWaitlistResponse, LeaveWaitlistResponse, PromotionResponse, SetCapacityRequest,
    SweepOutcome, UserBookingsResponse, UserWaitlistResponse, authenticate_stub, cancel_booking,
    cancel_class, check_class_invariants, check_in, create_booking, create_class,
    get_classes_for_user, get_user_bookings, get_user_waitlist, join_waitlist, leave_waitlist,
    promote_waitlist, run_expiry_sweep, set_class_capacity, sweep_expired_subscriptions,
};
use studio_booking_audit::{Actor, AuditEvent, Cause};
use studio_booking_domain::{
    ActorRole, BookingPolicy, DEFAULT_CANCELLATION_WINDOW_MINUTES,
    DEFAULT_WAITLIST_CUTOFF_MINUTES,
};
use studio_booking_persistence::{Persistence, PersistenceError};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::ledger::TracingCreditLedger;
use crate::live::{LiveEvent, LiveEventBroadcaster, live_events_handler};

/// Studio Booking Server - HTTP server for class bookings and waitlists
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// IANA timezone the studio schedules classes in
    #[arg(long, default_value = "UTC")]
    timezone: String,

    /// Minutes before class start after which members can no longer cancel
    #[arg(long, default_value_t = DEFAULT_CANCELLATION_WINDOW_MINUTES)]
    cancellation_window_minutes: i64,

    /// Minutes before class start after which full classes stop accepting waitlist joins
    #[arg(long, default_value_t = DEFAULT_WAITLIST_CUTOFF_MINUTES)]
    waitlist_cutoff_minutes: i64,

    /// Seconds between subscription expiry sweeps; 0 disables the sweep
    #[arg(long, default_value_t = 3600)]
    expiry_sweep_interval_secs: u64,

    /// Milliseconds to wait for another writer before giving up
    #[arg(long, default_value_t = 5000)]
    busy_timeout_ms: u64,
}

/// Application state shared across handlers.
///
/// The persistence adapter sits behind a Mutex; each engine operation holds
/// it for one transaction.
#[derive(Clone)]
struct AppState {
    /// The persistence layer.
    persistence: Arc<Mutex<Persistence>>,
    /// Clock, dispatcher, ledger and policy for engine operations.
    services: EngineServices,
    /// Live event stream.
    live: Arc<LiveEventBroadcaster>,
}

/// Caller identity and cause carried by every write request.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct ActorRequest {
    /// The actor ID performing this action.
    actor_id: String,
    /// The role of the actor: `member`, `reception` or `admin`.
    actor_role: String,
    /// The member's user id when the actor is a member.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    actor_user_id: Option<i64>,
    /// The cause ID for this action.
    cause_id: String,
    /// The cause description.
    cause_description: String,
}

impl ActorRequest {
    fn authenticate(&self) -> Result<AuthenticatedActor, HttpError> {
        authenticate(&self.actor_id, &self.actor_role, self.actor_user_id)
    }

    fn cause(&self) -> Cause {
        Cause::new(self.cause_id.clone(), self.cause_description.clone())
    }
}

/// API request for booking a class.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct CreateBookingApiRequest {
    #[serde(flatten)]
    identity: ActorRequest,
    /// The member to book.
    user_id: i64,
    /// The class to book.
    class_id: i64,
}

/// API request for joining a waitlist.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct JoinWaitlistApiRequest {
    #[serde(flatten)]
    identity: ActorRequest,
    /// The member to queue.
    user_id: i64,
    /// The class.
    class_id: i64,
}

/// API request for changing class capacity.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct SetCapacityApiRequest {
    #[serde(flatten)]
    identity: ActorRequest,
    /// The new seat count.
    capacity: i64,
}

/// API request for registering a class.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct CreateClassApiRequest {
    #[serde(flatten)]
    identity: ActorRequest,
    /// Display name.
    name: String,
    /// Seat count.
    capacity: i64,
    /// `mat`, `reformer` or `both`.
    equipment_type: String,
    /// `group` or `personal`.
    category: String,
    /// Studio-local date (ISO 8601).
    date: String,
    /// Studio-local start time (`HH:MM`).
    start_time: String,
}

/// Caller identity for read endpoints.
#[derive(Debug, Deserialize)]
struct ActorQuery {
    /// The actor ID.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The member's user id when the actor is a member.
    actor_user_id: Option<i64>,
}

/// Query parameters for the member schedule endpoint.
#[derive(Debug, Deserialize)]
struct ClassesForUserQuery {
    /// The actor ID.
    actor_id: String,
    /// The role of the actor.
    actor_role: String,
    /// The member's user id when the actor is a member.
    actor_user_id: Option<i64>,
    /// First day (ISO 8601).
    from: String,
    /// Last day (ISO 8601).
    to: String,
}

/// API response for write operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WriteResponse<T> {
    /// Success indicator.
    success: bool,
    /// The event ID of the persisted audit event.
    #[serde(skip_serializing_if = "Option::is_none")]
    event_id: Option<i64>,
    /// The operation's own response.
    #[serde(flatten)]
    result: T,
}

impl<T> From<ApiResult<T>> for WriteResponse<T> {
    fn from(result: ApiResult<T>) -> Self {
        Self {
            success: true,
            event_id: result.audit_event.event_id,
            result: result.response,
        }
    }
}

/// Serializable representation of an `AuditEvent` for JSON responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AuditEventResponse {
    /// The event ID.
    event_id: Option<i64>,
    /// The actor ID.
    actor_id: String,
    /// The actor type.
    actor_type: String,
    /// The cause ID.
    cause_id: String,
    /// The cause description.
    cause_description: String,
    /// The action name.
    action_name: String,
    /// Optional action details.
    action_details: Option<String>,
    /// State before the transition.
    before_snapshot: String,
    /// State after the transition.
    after_snapshot: String,
    /// The class, for class-scoped events.
    class_id: Option<i64>,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Stable code of the business rule that rejected the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rule: Option<String>,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The violated rule, if any.
    rule: Option<String>,
    /// The error message.
    message: String,
}

impl HttpError {
    const fn new(status: StatusCode, message: String) -> Self {
        Self {
            status,
            rule: None,
            message,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            rule: self.rule,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            rule: err.rule().map(str::to_string),
            message: err.to_string(),
        }
    }
}

impl From<PersistenceError> for HttpError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::EventNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, err.to_string())
            }
            other => {
                error!(error = %other, "Persistence error");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Persistence error: {other}"),
                )
            }
        }
    }
}

/// Converts an `AuditEvent` to an `AuditEventResponse`.
fn audit_event_to_response(event: &AuditEvent) -> AuditEventResponse {
    AuditEventResponse {
        event_id: event.event_id,
        actor_id: event.actor.id.clone(),
        actor_type: event.actor.actor_type.clone(),
        cause_id: event.cause.id.clone(),
        cause_description: event.cause.description.clone(),
        action_name: event.action.name.clone(),
        action_details: event.action.details.clone(),
        before_snapshot: event.before.data.clone(),
        after_snapshot: event.after.data.clone(),
        class_id: event.class_id,
    }
}

/// Parses a role string into an `ActorRole`.
fn parse_role(role_str: &str) -> Result<ActorRole, HttpError> {
    ActorRole::from_str(&role_str.to_lowercase()).map_err(|_| {
        HttpError::new(
            StatusCode::BAD_REQUEST,
            format!("Invalid role: '{role_str}'. Must be 'member', 'reception' or 'admin'"),
        )
    })
}

/// Parses the role and authenticates the caller.
fn authenticate(
    actor_id: &str,
    actor_role: &str,
    actor_user_id: Option<i64>,
) -> Result<AuthenticatedActor, HttpError> {
    let role: ActorRole = parse_role(actor_role)?;
    authenticate_stub(actor_id.to_string(), role, actor_user_id)
        .map_err(|err| HttpError::from(ApiError::from(err)))
}

// ============================================================================
// Bookings and waitlist
// ============================================================================

/// Handler for POST `/bookings` endpoint.
///
/// Books a seat, or queues the member when the class is full.
async fn handle_create_booking(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateBookingApiRequest>,
) -> Result<Json<WriteResponse<CreateBookingResponse>>, HttpError> {
    info!(
        actor_id = %req.identity.actor_id,
        role = %req.identity.actor_role,
        user_id = req.user_id,
        class_id = req.class_id,
        "Handling create_booking request"
    );

    let actor: AuthenticatedActor = req.identity.authenticate()?;
    let request: CreateBookingRequest = CreateBookingRequest {
        user_id: req.user_id,
        class_id: req.class_id,
    };

    let mut persistence = app_state.persistence.lock().await;
    let result: ApiResult<CreateBookingResponse> = create_booking(
        &mut persistence,
        &app_state.services,
        &request,
        &actor,
        &req.identity.cause(),
    )?;
    drop(persistence);

    let event: LiveEvent = match &result.response {
        CreateBookingResponse::Confirmed { booking } => LiveEvent::BookingConfirmed {
            class_id: booking.class_id,
            user_id: booking.user_id,
            booking_id: booking.booking_id,
        },
        CreateBookingResponse::Waitlisted { entry } => LiveEvent::Waitlisted {
            class_id: entry.class_id,
            user_id: entry.user_id,
            position: entry.position,
        },
    };
    app_state.live.broadcast(&event);

    Ok(Json(WriteResponse::from(result)))
}

/// Handler for POST `/bookings/{booking_id}/cancel` endpoint.
///
/// Cancels a booking, refunds it and promotes from the waitlist.
async fn handle_cancel_booking(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
    Json(req): Json<ActorRequest>,
) -> Result<Json<WriteResponse<CancelBookingResponse>>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        role = %req.actor_role,
        booking_id,
        "Handling cancel_booking request"
    );

    let actor: AuthenticatedActor = req.authenticate()?;

    let mut persistence = app_state.persistence.lock().await;
    let result: ApiResult<CancelBookingResponse> = cancel_booking(
        &mut persistence,
        &app_state.services,
        booking_id,
        &actor,
        &req.cause(),
    )?;
    drop(persistence);

    app_state.live.broadcast(&LiveEvent::BookingCancelled {
        class_id: result.response.booking.class_id,
        booking_id,
    });

    Ok(Json(WriteResponse::from(result)))
}

/// Handler for POST `/bookings/{booking_id}/check_in` endpoint.
async fn handle_check_in(
    AxumState(app_state): AxumState<AppState>,
    Path(booking_id): Path<i64>,
    Json(req): Json<ActorRequest>,
) -> Result<Json<WriteResponse<CheckInResponse>>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        role = %req.actor_role,
        booking_id,
        "Handling check_in request"
    );

    let actor: AuthenticatedActor = req.authenticate()?;

    let mut persistence = app_state.persistence.lock().await;
    let result: ApiResult<CheckInResponse> = check_in(
        &mut persistence,
        &app_state.services,
        booking_id,
        &actor,
        &req.cause(),
    )?;
    drop(persistence);

    app_state.live.broadcast(&LiveEvent::CheckedIn {
        class_id: result.response.booking.class_id,
        booking_id,
    });

    Ok(Json(WriteResponse::from(result)))
}

/// Handler for POST `/waitlist` endpoint.
async fn handle_join_waitlist(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<JoinWaitlistApiRequest>,
) -> Result<Json<WriteResponse<JoinWaitlistResponse>>, HttpError> {
    info!(
        actor_id = %req.identity.actor_id,
        role = %req.identity.actor_role,
        user_id = req.user_id,
        class_id = req.class_id,
        "Handling join_waitlist request"
    );

    let actor: AuthenticatedActor = req.identity.authenticate()?;
    let request: JoinWaitlistRequest = JoinWaitlistRequest {
        user_id: req.user_id,
        class_id: req.class_id,
    };

    let mut persistence = app_state.persistence.lock().await;
    let result: ApiResult<JoinWaitlistResponse> = join_waitlist(
        &mut persistence,
        &app_state.services,
        &request,
        &actor,
        &req.identity.cause(),
    )?;
    drop(persistence);

    app_state.live.broadcast(&LiveEvent::Waitlisted {
        class_id: result.response.entry.class_id,
        user_id: result.response.entry.user_id,
        position: result.response.entry.position,
    });

    Ok(Json(WriteResponse::from(result)))
}

/// Handler for POST `/waitlist/{waitlist_id}/leave` endpoint.
async fn handle_leave_waitlist(
    AxumState(app_state): AxumState<AppState>,
    Path(waitlist_id): Path<i64>,
    Json(req): Json<ActorRequest>,
) -> Result<Json<WriteResponse<LeaveWaitlistResponse>>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        role = %req.actor_role,
        waitlist_id,
        "Handling leave_waitlist request"
    );

    let actor: AuthenticatedActor = req.authenticate()?;

    let mut persistence = app_state.persistence.lock().await;
    let result: ApiResult<LeaveWaitlistResponse> = leave_waitlist(
        &mut persistence,
        &app_state.services,
        waitlist_id,
        &actor,
        &req.cause(),
    )?;
    drop(persistence);

    app_state.live.broadcast(&LiveEvent::LeftWaitlist {
        class_id: result.response.class_id,
        waitlist_id,
    });

    Ok(Json(WriteResponse::from(result)))
}

// ============================================================================
// Classes
// ============================================================================

/// Handler for POST `/classes` endpoint.
async fn handle_create_class(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<CreateClassApiRequest>,
) -> Result<Json<WriteResponse<CreateClassResponse>>, HttpError> {
    info!(
        actor_id = %req.identity.actor_id,
        role = %req.identity.actor_role,
        name = %req.name,
        date = %req.date,
        "Handling create_class request"
    );

    let actor: AuthenticatedActor = req.identity.authenticate()?;
    let request: CreateClassRequest = CreateClassRequest {
        name: req.name.clone(),
        capacity: req.capacity,
        equipment_type: req.equipment_type.clone(),
        category: req.category.clone(),
        date: req.date.clone(),
        start_time: req.start_time.clone(),
    };

    let mut persistence = app_state.persistence.lock().await;
    let result: ApiResult<CreateClassResponse> = create_class(
        &mut persistence,
        &app_state.services,
        &request,
        &actor,
        &req.identity.cause(),
    )?;
    drop(persistence);

    app_state.live.broadcast(&LiveEvent::ClassCreated {
        class_id: result.response.class.class_id,
    });

    Ok(Json(WriteResponse::from(result)))
}

/// Handler for POST `/classes/{class_id}/promote` endpoint.
async fn handle_promote_waitlist(
    AxumState(app_state): AxumState<AppState>,
    Path(class_id): Path<i64>,
    Json(req): Json<ActorRequest>,
) -> Result<Json<WriteResponse<PromotionResponse>>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        role = %req.actor_role,
        class_id,
        "Handling promote_waitlist request"
    );

    let actor: AuthenticatedActor = req.authenticate()?;

    let mut persistence = app_state.persistence.lock().await;
    let result: ApiResult<PromotionResponse> = promote_waitlist(
        &mut persistence,
        &app_state.services,
        class_id,
        &actor,
        &req.cause(),
    )?;
    drop(persistence);

    app_state.live.broadcast(&LiveEvent::ClassUpdated {
        class_id,
        enrolled: result.response.class.enrolled,
        capacity: result.response.class.capacity,
    });

    Ok(Json(WriteResponse::from(result)))
}

/// Handler for POST `/classes/{class_id}/capacity` endpoint.
async fn handle_set_capacity(
    AxumState(app_state): AxumState<AppState>,
    Path(class_id): Path<i64>,
    Json(req): Json<SetCapacityApiRequest>,
) -> Result<Json<WriteResponse<PromotionResponse>>, HttpError> {
    info!(
        actor_id = %req.identity.actor_id,
        role = %req.identity.actor_role,
        class_id,
        capacity = req.capacity,
        "Handling set_class_capacity request"
    );

    let actor: AuthenticatedActor = req.identity.authenticate()?;

    let mut persistence = app_state.persistence.lock().await;
    let result: ApiResult<PromotionResponse> = set_class_capacity(
        &mut persistence,
        &app_state.services,
        class_id,
        &SetCapacityRequest {
            capacity: req.capacity,
        },
        &actor,
        &req.identity.cause(),
    )?;
    drop(persistence);

    app_state.live.broadcast(&LiveEvent::ClassUpdated {
        class_id,
        enrolled: result.response.class.enrolled,
        capacity: result.response.class.capacity,
    });

    Ok(Json(WriteResponse::from(result)))
}

/// Handler for POST `/classes/{class_id}/cancel` endpoint.
async fn handle_cancel_class(
    AxumState(app_state): AxumState<AppState>,
    Path(class_id): Path<i64>,
    Json(req): Json<ActorRequest>,
) -> Result<Json<WriteResponse<CancelClassResponse>>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        role = %req.actor_role,
        class_id,
        "Handling cancel_class request"
    );

    let actor: AuthenticatedActor = req.authenticate()?;

    let mut persistence = app_state.persistence.lock().await;
    let result: ApiResult<CancelClassResponse> = cancel_class(
        &mut persistence,
        &app_state.services,
        class_id,
        &actor,
        &req.cause(),
    )?;
    drop(persistence);

    app_state
        .live
        .broadcast(&LiveEvent::ClassCancelled { class_id });

    Ok(Json(WriteResponse::from(result)))
}

/// Handler for GET `/classes/{class_id}/invariants` endpoint.
async fn handle_check_class_invariants(
    AxumState(app_state): AxumState<AppState>,
    Path(class_id): Path<i64>,
    Query(query): Query<ActorQuery>,
) -> Result<Json<ClassInvariantsResponse>, HttpError> {
    debug!(class_id, "Handling check_class_invariants request");

    let actor: AuthenticatedActor =
        authenticate(&query.actor_id, &query.actor_role, query.actor_user_id)?;

    let mut persistence = app_state.persistence.lock().await;
    let response: ClassInvariantsResponse =
        check_class_invariants(&mut persistence, class_id, &actor)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/classes/{class_id}/audit` endpoint.
///
/// Returns the audit timeline of one class, oldest first.
async fn handle_get_class_audit(
    AxumState(app_state): AxumState<AppState>,
    Path(class_id): Path<i64>,
    Query(query): Query<ActorQuery>,
) -> Result<Json<Vec<AuditEventResponse>>, HttpError> {
    info!(class_id, "Handling get_class_audit request");

    let actor: AuthenticatedActor =
        authenticate(&query.actor_id, &query.actor_role, query.actor_user_id)?;
    AuthorizationService::authorize_staff_action(&actor, "get_class_audit")
        .map_err(|err| HttpError::from(ApiError::from(err)))?;

    let mut persistence = app_state.persistence.lock().await;
    let events: Vec<AuditEvent> = persistence.audit_events_for_class(class_id)?;
    drop(persistence);

    Ok(Json(events.iter().map(audit_event_to_response).collect()))
}

/// Handler for GET `/audit/event/{event_id}` endpoint.
async fn handle_get_audit_event(
    AxumState(app_state): AxumState<AppState>,
    Path(event_id): Path<i64>,
    Query(query): Query<ActorQuery>,
) -> Result<Json<AuditEventResponse>, HttpError> {
    info!(event_id, "Handling get_audit_event request");

    let actor: AuthenticatedActor =
        authenticate(&query.actor_id, &query.actor_role, query.actor_user_id)?;
    AuthorizationService::authorize_staff_action(&actor, "get_audit_event")
        .map_err(|err| HttpError::from(ApiError::from(err)))?;

    let mut persistence = app_state.persistence.lock().await;
    let event: AuditEvent = persistence.get_audit_event(event_id)?;
    drop(persistence);

    Ok(Json(audit_event_to_response(&event)))
}

// ============================================================================
// Member projections
// ============================================================================

/// Handler for GET `/users/{user_id}/classes` endpoint.
async fn handle_get_classes_for_user(
    AxumState(app_state): AxumState<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<ClassesForUserQuery>,
) -> Result<Json<ClassesForUserResponse>, HttpError> {
    debug!(user_id, from = %query.from, to = %query.to, "Handling get_classes_for_user request");

    let actor: AuthenticatedActor =
        authenticate(&query.actor_id, &query.actor_role, query.actor_user_id)?;
    let range: ClassRangeQuery = ClassRangeQuery {
        from: query.from,
        to: query.to,
    };

    let mut persistence = app_state.persistence.lock().await;
    let response: ClassesForUserResponse = get_classes_for_user(
        &mut persistence,
        &app_state.services,
        user_id,
        &range,
        &actor,
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/users/{user_id}/bookings` endpoint.
async fn handle_get_user_bookings(
    AxumState(app_state): AxumState<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<ActorQuery>,
) -> Result<Json<UserBookingsResponse>, HttpError> {
    debug!(user_id, "Handling get_user_bookings request");

    let actor: AuthenticatedActor =
        authenticate(&query.actor_id, &query.actor_role, query.actor_user_id)?;

    let mut persistence = app_state.persistence.lock().await;
    let response: UserBookingsResponse = get_user_bookings(&mut persistence, user_id, &actor)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/users/{user_id}/waitlist` endpoint.
async fn handle_get_user_waitlist(
    AxumState(app_state): AxumState<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<ActorQuery>,
) -> Result<Json<UserWaitlistResponse>, HttpError> {
    debug!(user_id, "Handling get_user_waitlist request");

    let actor: AuthenticatedActor =
        authenticate(&query.actor_id, &query.actor_role, query.actor_user_id)?;

    let mut persistence = app_state.persistence.lock().await;
    let response: UserWaitlistResponse = get_user_waitlist(&mut persistence, user_id, &actor)?;
    drop(persistence);

    Ok(Json(response))
}

// ============================================================================
// Subscriptions
// ============================================================================

/// Handler for POST `/subscriptions/expire` endpoint.
async fn handle_expire_subscriptions(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<ActorRequest>,
) -> Result<Json<ExpirySweepResponse>, HttpError> {
    info!(
        actor_id = %req.actor_id,
        role = %req.actor_role,
        "Handling expire_subscriptions request"
    );

    let actor: AuthenticatedActor = req.authenticate()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: ExpirySweepResponse =
        run_expiry_sweep(&mut persistence, &app_state.services, &actor, &req.cause())?;
    drop(persistence);

    if response.expired > 0 {
        app_state.live.broadcast(&LiveEvent::SubscriptionsExpired {
            count: response.expired,
        });
    }

    Ok(Json(response))
}

/// Runs one expiry sweep as the system actor.
async fn sweep_once(app_state: &AppState) -> Result<SweepOutcome, ApiError> {
    let cause: Cause = Cause::new(
        String::from("expiry-sweep"),
        String::from("Scheduled subscription expiry sweep"),
    );

    let mut persistence = app_state.persistence.lock().await;
    let outcome: SweepOutcome = sweep_expired_subscriptions(
        &mut persistence,
        &app_state.services,
        &Actor::system(),
        &cause,
    )?;
    drop(persistence);

    if outcome.expired > 0 {
        app_state.live.broadcast(&LiveEvent::SubscriptionsExpired {
            count: outcome.expired,
        });
    }
    Ok(outcome)
}

/// Sweeps lapsed subscriptions every `every`, starting immediately.
fn spawn_expiry_sweep(app_state: AppState, every: Duration) {
    tokio::spawn(async move {
        let mut ticker: tokio::time::Interval = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match sweep_once(&app_state).await {
                Ok(outcome) => debug!(
                    expired = outcome.expired,
                    today = %outcome.today,
                    "Expiry sweep ran"
                ),
                Err(err) => error!(error = %err, "Expiry sweep failed"),
            }
        }
    });
}

/// Builds the shared state around a store.
fn build_app_state(
    persistence: Persistence,
    clock: Arc<dyn Clock>,
    policy: BookingPolicy,
) -> AppState {
    let live: Arc<LiveEventBroadcaster> = Arc::new(LiveEventBroadcaster::new());
    let services: EngineServices = EngineServices::new(
        clock,
        Arc::clone(&live) as Arc<dyn NotificationDispatcher>,
        Arc::new(TracingCreditLedger) as Arc<dyn CreditLedger>,
        policy,
    );
    AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        services,
        live,
    }
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/bookings", post(handle_create_booking))
        .route("/bookings/{booking_id}/cancel", post(handle_cancel_booking))
        .route("/bookings/{booking_id}/check_in", post(handle_check_in))
        .route("/waitlist", post(handle_join_waitlist))
        .route("/waitlist/{waitlist_id}/leave", post(handle_leave_waitlist))
        .route("/classes", post(handle_create_class))
        .route("/classes/{class_id}/promote", post(handle_promote_waitlist))
        .route("/classes/{class_id}/capacity", post(handle_set_capacity))
        .route("/classes/{class_id}/cancel", post(handle_cancel_class))
        .route(
            "/classes/{class_id}/invariants",
            get(handle_check_class_invariants),
        )
        .route("/classes/{class_id}/audit", get(handle_get_class_audit))
        .route("/users/{user_id}/classes", get(handle_get_classes_for_user))
        .route("/users/{user_id}/bookings", get(handle_get_user_bookings))
        .route("/users/{user_id}/waitlist", get(handle_get_user_waitlist))
        .route("/subscriptions/expire", post(handle_expire_subscriptions))
        .route("/audit/event/{event_id}", get(handle_get_audit_event))
        .route("/live", get(live_events_handler))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Studio Booking Server");

    let policy: BookingPolicy = BookingPolicy::new(
        args.cancellation_window_minutes,
        args.waitlist_cutoff_minutes,
        &args.timezone,
    )?;
    info!(
        timezone = %policy.timezone,
        cancellation_window_minutes = policy.cancellation_window_minutes,
        waitlist_cutoff_minutes = policy.waitlist_cutoff_minutes,
        "Booking policy loaded"
    );

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file_and_busy_timeout(
            db_path,
            Duration::from_millis(args.busy_timeout_ms),
        )?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let app_state: AppState = build_app_state(persistence, Arc::new(SystemClock), policy);

    if args.expiry_sweep_interval_secs > 0 {
        spawn_expiry_sweep(
            app_state.clone(),
            Duration::from_secs(args.expiry_sweep_interval_secs),
        );
    }

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests;
