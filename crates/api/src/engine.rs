// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Runs booking commands against the store.
//!
//! One command is one `BEGIN IMMEDIATE` transaction:
//!
//! 1. Expire stale subscriptions
//! 2. Load the class and everything the command reads
//! 3. Apply the command
//! 4. Write the mutations and the audit event
//! 5. Settle credit-ledger calls
//!
//! A failure at any step rolls everything back. Notifications go out only
//! once the transaction has committed. Ledger refunds are made once per
//! booking across retries, and a refund whose transaction did not commit is
//! reversed with a debit.

use studio_booking::{
    ClassState, Command, CoreError, CreditLedger, EngineContext, LedgerCall, LedgerError,
    Notification, NotificationDispatcher, Requester, TransitionResult, apply,
};
use studio_booking_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use studio_booking_domain::{Booking, DomainError, StudioClass, WaitlistEntry};
use studio_booking_persistence::{
    AppliedMutations, Persistence, PersistenceError, StudioTx, TransactionError,
};
use time::{Date, OffsetDateTime};
use tracing::{debug, error, info, warn};

use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::services::EngineServices;

/// Failures inside an engine transaction.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The store failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    /// The command was rejected or inconsistent with the loaded state.
    #[error(transparent)]
    Core(#[from] CoreError),
    /// A referenced class, booking or entry is missing.
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// The external credit ledger refused a call.
    #[error("credit ledger call {call:?} failed: {source}")]
    Ledger {
        /// The call that failed.
        call: LedgerCall,
        /// The ledger's error.
        #[source]
        source: LedgerError,
    },
}

impl TransactionError for EngineError {
    fn is_serialization_conflict(&self) -> bool {
        matches!(self, Self::Persistence(err) if err.is_serialization_conflict())
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Persistence(err) => translate_persistence_error(err),
            EngineError::Core(err) => translate_core_error(err),
            EngineError::Domain(err) => translate_domain_error(err),
            EngineError::Ledger { call, source } => Self::Internal {
                message: format!("Credit ledger call {call:?} failed: {source}"),
            },
        }
    }
}

/// A booking command, addressed by the row it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineRequest {
    /// Book a class, falling back to the waitlist.
    Book {
        /// The member.
        user_id: i64,
        /// The class.
        class_id: i64,
    },
    /// Join the waitlist of a full class.
    JoinWaitlist {
        /// The member.
        user_id: i64,
        /// The class.
        class_id: i64,
    },
    /// Cancel a booking.
    CancelBooking {
        /// The booking.
        booking_id: i64,
        /// Who asked.
        requested_by: Requester,
    },
    /// Leave a waitlist.
    LeaveWaitlist {
        /// The entry.
        waitlist_id: i64,
        /// Who asked.
        requested_by: Requester,
    },
    /// Fill open seats from the waitlist.
    Promote {
        /// The class.
        class_id: i64,
    },
    /// Change the seat count.
    SetCapacity {
        /// The class.
        class_id: i64,
        /// The requested capacity.
        capacity: i64,
    },
    /// Cancel a class.
    CancelClass {
        /// The class.
        class_id: i64,
    },
    /// Check a booking in.
    CheckIn {
        /// The booking.
        booking_id: i64,
    },
}

/// A committed transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed {
    /// What the engine decided.
    pub result: TransitionResult,
    /// Ids of inserted rows, in mutation order.
    pub applied: AppliedMutations,
    /// The stored audit event, carrying its id.
    pub audit_event: AuditEvent,
}

fn class_by_id(tx: &mut StudioTx<'_>, class_id: i64) -> Result<StudioClass, EngineError> {
    tx.find_class(class_id)?
        .ok_or(EngineError::Domain(DomainError::ClassNotFound(class_id)))
}

fn booking_by_id(tx: &mut StudioTx<'_>, booking_id: i64) -> Result<Booking, EngineError> {
    tx.find_booking(booking_id)?
        .ok_or(EngineError::Domain(DomainError::BookingNotFound(booking_id)))
}

/// Looks up the rows a request targets and turns it into a core command.
///
/// Returns the class, the users whose subscriptions the command needs beyond
/// the class's own members, and the command.
fn resolve(
    tx: &mut StudioTx<'_>,
    request: &EngineRequest,
) -> Result<(StudioClass, Vec<i64>, Command), EngineError> {
    match *request {
        EngineRequest::Book { user_id, class_id } => Ok((
            class_by_id(tx, class_id)?,
            vec![user_id],
            Command::BookClass { user_id },
        )),
        EngineRequest::JoinWaitlist { user_id, class_id } => Ok((
            class_by_id(tx, class_id)?,
            vec![user_id],
            Command::JoinWaitlist { user_id },
        )),
        EngineRequest::CancelBooking {
            booking_id,
            requested_by,
        } => {
            let booking: Booking = booking_by_id(tx, booking_id)?;
            let class: StudioClass = class_by_id(tx, booking.class_id)?;
            Ok((
                class,
                Vec::new(),
                Command::CancelBooking {
                    booking,
                    requested_by,
                },
            ))
        }
        EngineRequest::LeaveWaitlist {
            waitlist_id,
            requested_by,
        } => {
            let entry: WaitlistEntry = tx
                .find_waitlist_entry(waitlist_id)?
                .ok_or(EngineError::Domain(DomainError::WaitlistEntryNotFound(
                    waitlist_id,
                )))?;
            let class: StudioClass = class_by_id(tx, entry.class_id)?;
            Ok((
                class,
                Vec::new(),
                Command::LeaveWaitlist {
                    waitlist_id,
                    requested_by,
                },
            ))
        }
        EngineRequest::Promote { class_id } => Ok((
            class_by_id(tx, class_id)?,
            Vec::new(),
            Command::PromoteWaitlist,
        )),
        EngineRequest::SetCapacity { class_id, capacity } => Ok((
            class_by_id(tx, class_id)?,
            Vec::new(),
            Command::SetCapacity { capacity },
        )),
        EngineRequest::CancelClass { class_id } => Ok((
            class_by_id(tx, class_id)?,
            Vec::new(),
            Command::CancelClass,
        )),
        EngineRequest::CheckIn { booking_id } => {
            let booking: Booking = booking_by_id(tx, booking_id)?;
            let class: StudioClass = class_by_id(tx, booking.class_id)?;
            Ok((class, Vec::new(), Command::CheckIn { booking }))
        }
    }
}

/// Makes the ledger calls of a transition, stopping at the first failure.
///
/// Calls already in `settled` are not repeated, so a transaction body that
/// runs again after a serialization conflict refunds each booking once.
/// Every call that succeeds is appended to `settled`.
pub fn settle_ledger(
    ledger: &dyn CreditLedger,
    calls: &[LedgerCall],
    settled: &mut Vec<LedgerCall>,
) -> Result<(), EngineError> {
    for call in calls {
        if settled.contains(call) {
            debug!(?call, "Credit ledger call already settled");
            continue;
        }
        let outcome: Result<(), LedgerError> = match *call {
            LedgerCall::Refund {
                user_id, class_id, ..
            } => ledger.refund_credit(user_id, class_id),
        };
        outcome.map_err(|source| EngineError::Ledger {
            call: *call,
            source,
        })?;
        settled.push(*call);
        debug!(?call, "Settled credit ledger call");
    }
    Ok(())
}

/// Takes back ledger refunds whose transaction did not commit.
///
/// A refund is reversed with a debit for the same member and class. A failed
/// reversal is logged; the ledger then holds a credit the store does not.
pub fn reverse_uncommitted_ledger_calls(
    ledger: &dyn CreditLedger,
    settled: &[LedgerCall],
    committed: &[LedgerCall],
) {
    for call in settled.iter().filter(|call| !committed.contains(*call)) {
        let reversal: Result<(), LedgerError> = match *call {
            LedgerCall::Refund {
                user_id, class_id, ..
            } => ledger.debit_credit(user_id, class_id),
        };
        match reversal {
            Ok(()) => warn!(?call, "Reversed credit ledger call after rollback"),
            Err(err) => error!(
                ?call,
                booking_id = call.booking_id(),
                error = %err,
                "Failed to reverse credit ledger call after rollback"
            ),
        }
    }
}

/// Delivers notifications, logging failures.
///
/// # Returns
///
/// The number of notifications that could not be delivered.
pub fn dispatch_notifications(
    dispatcher: &dyn NotificationDispatcher,
    notifications: &[Notification],
) -> usize {
    let mut failed: usize = 0;
    for notification in notifications {
        match dispatcher.notify(notification) {
            Ok(()) => debug!(
                user_id = notification.user_id,
                class_id = notification.class_id,
                kind = %notification.kind,
                "Dispatched notification"
            ),
            Err(err) => {
                failed += 1;
                warn!(
                    user_id = notification.user_id,
                    class_id = notification.class_id,
                    kind = %notification.kind,
                    error = %err,
                    "Failed to dispatch notification"
                );
            }
        }
    }
    failed
}

/// Runs one booking command in its own transaction.
///
/// # Arguments
///
/// * `persistence` - The store
/// * `services` - Clock, dispatcher, ledger and policy
/// * `request` - The command and its target
/// * `actor` - Recorded on the audit event
/// * `cause` - Recorded on the audit event
///
/// # Errors
///
/// Returns an error if the target is missing, a booking rule rejects the
/// command, the credit ledger fails, or the store fails. Nothing is written
/// in any of these cases.
pub fn execute(
    persistence: &mut Persistence,
    services: &EngineServices,
    request: &EngineRequest,
    actor: &Actor,
    cause: &Cause,
) -> Result<Committed, ApiError> {
    let now: OffsetDateTime = services.now();
    let today: Date = services.today_at(now)?;
    let ctx: EngineContext<'_> = EngineContext::new(now, &services.policy);

    let ledger: &dyn CreditLedger = services.ledger.as_ref();
    let mut settled: Vec<LedgerCall> = Vec::new();

    let outcome: Result<Committed, EngineError> =
        persistence.atomically(|tx: &mut StudioTx<'_>| -> Result<Committed, EngineError> {
            let expired: usize = tx.expire_subscriptions(today)?;
            if expired > 0 {
                debug!(expired, "Expired stale subscriptions before transition");
            }

            let (class, requesting_users, command) = resolve(tx, request)?;
            let state: ClassState = tx.load_class_state(class, &requesting_users)?;
            let result: TransitionResult =
                apply(&state, command, &ctx, actor.clone(), cause.clone())?;

            let applied: AppliedMutations = tx.apply_mutations(&result.mutations, now)?;
            let event_id: i64 = tx.persist_audit_event(&result.audit_event)?;
            settle_ledger(ledger, &result.ledger_calls, &mut settled)?;

            let audit_event: AuditEvent = result.audit_event.clone().with_event_id(event_id);
            Ok(Committed {
                result,
                applied,
                audit_event,
            })
        });

    let committed_calls: &[LedgerCall] = match &outcome {
        Ok(committed) => &committed.result.ledger_calls,
        Err(_) => &[],
    };
    reverse_uncommitted_ledger_calls(ledger, &settled, committed_calls);

    let committed: Committed = outcome.map_err(|err| {
        debug!(?request, error = %err, "Transition rejected");
        ApiError::from(err)
    })?;

    info!(
        action = %committed.audit_event.action.name,
        class_id = committed.result.class_after.class_id,
        event_id = committed.audit_event.event_id,
        promoted = committed.result.promotions.promoted.len(),
        "Committed transition"
    );

    dispatch_notifications(
        services.dispatcher.as_ref(),
        &committed.result.notifications,
    );
    Ok(committed)
}

/// The outcome of an expiry sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Subscriptions moved to `expired`.
    pub expired: usize,
    /// The studio-local day compared against.
    pub today: Date,
    /// The audit event, recorded only when something expired.
    pub audit_event: Option<AuditEvent>,
}

/// Expires every active subscription whose end date has passed.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn run_expiry_sweep(
    persistence: &mut Persistence,
    services: &EngineServices,
    actor: &Actor,
    cause: &Cause,
) -> Result<SweepOutcome, ApiError> {
    let today: Date = services.today_at(services.now())?;

    let outcome: SweepOutcome = persistence
        .atomically(|tx: &mut StudioTx<'_>| -> Result<SweepOutcome, PersistenceError> {
            let expired: usize = tx.expire_subscriptions(today)?;
            if expired == 0 {
                return Ok(SweepOutcome {
                    expired,
                    today,
                    audit_event: None,
                });
            }
            let event: AuditEvent = AuditEvent::new_global(
                actor.clone(),
                cause.clone(),
                Action::new(
                    String::from("ExpireSubscriptions"),
                    Some(format!("today={today}")),
                ),
                StateSnapshot::new(String::from("expired=0")),
                StateSnapshot::new(format!("expired={expired}")),
            );
            let event_id: i64 = tx.persist_audit_event(&event)?;
            Ok(SweepOutcome {
                expired,
                today,
                audit_event: Some(event.with_event_id(event_id)),
            })
        })
        .map_err(translate_persistence_error)?;

    if outcome.expired > 0 {
        info!(expired = outcome.expired, %today, "Expiry sweep finished");
    }
    Ok(outcome)
}
