// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::collaborators::{Notification, NotificationKind, NotificationPayload};
use crate::command::{Command, Requester};
use crate::error::CoreError;
use crate::state::{
    ClassState, EngineContext, LedgerCall, Mutation, Outcome, Promotion, PromotionReport,
    SkippedEntry, TransitionResult, snapshot_of,
};
use studio_booking_audit::{Action, Actor, AuditEvent, Cause};
use studio_booking_domain::{
    Booking, BookingStatus, ClassStatus, DomainError, MAX_CLASS_CAPACITY, StudioClass,
    Subscription, WaitlistEntry, class_start_utc, local_date, minutes_until, next_position,
    renumber_after_removal, select_current_subscription, validate_subscription_for_class,
};
use time::{Date, OffsetDateTime};

/// Applies a command to the state of one class.
///
/// This function is pure: it reads the loaded state and returns the row
/// changes, ledger calls and notifications the command implies, plus the
/// audit event. Nothing is written here.
///
/// # Arguments
///
/// * `state` - The class state, loaded inside the writing transaction
/// * `command` - The command to apply
/// * `ctx` - The current instant and the studio policy
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if:
/// - The command violates a booking rule
/// - The state is inconsistent with the command (e.g. a booking from another class)
#[allow(clippy::too_many_lines)]
pub fn apply(
    state: &ClassState,
    command: Command,
    ctx: &EngineContext<'_>,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let class_start: OffsetDateTime = class_start_utc(
        state.class.date,
        state.class.start_time,
        &ctx.policy.timezone,
    )?;
    let today: Date = local_date(ctx.now, &ctx.policy.timezone)?;

    let mut work: Transition = Transition::begin(state, class_start, today, ctx.now);
    let action_name: &'static str = command.action_name();

    let (outcome, details) = match command {
        Command::BookClass { user_id } => {
            let subscription: Subscription =
                check_booking_request(state, user_id, ctx, class_start, today)?;
            if state.class.has_capacity() {
                work.confirm_seat(user_id, &subscription)?;
                (
                    Outcome::Booked {
                        user_id,
                        subscription_id: subscription.subscription_id,
                    },
                    format!(
                        "user={user_id} booked with subscription={}",
                        subscription.subscription_id
                    ),
                )
            } else {
                check_waitlist_open(state, ctx, class_start)?;
                let position: u32 = work.enqueue(user_id);
                (
                    Outcome::Waitlisted { user_id, position },
                    format!("user={user_id} waitlisted at position={position}"),
                )
            }
        }
        Command::JoinWaitlist { user_id } => {
            check_booking_request(state, user_id, ctx, class_start, today)?;
            if state.class.has_capacity() {
                return Err(CoreError::DomainViolation(DomainError::ClassNotFull {
                    class_id: state.class.class_id,
                    spots_left: state.class.spots_left(),
                }));
            }
            check_waitlist_open(state, ctx, class_start)?;
            let position: u32 = work.enqueue(user_id);
            (
                Outcome::Waitlisted { user_id, position },
                format!("user={user_id} waitlisted at position={position}"),
            )
        }
        Command::CancelBooking {
            booking,
            requested_by,
        } => {
            check_cancellation(state, &booking, requested_by, ctx, class_start)?;
            work.release_seat(&booking)?;
            work.notify(
                booking.user_id,
                NotificationKind::Cancellation,
                format!("Your booking for {} was cancelled", state.class.name),
            );
            work.sync_class_status();
            work.promote()?;
            (
                Outcome::BookingCancelled {
                    booking_id: booking.booking_id,
                },
                format!(
                    "booking={} user={} cancelled by {}",
                    booking.booking_id, booking.user_id, requested_by.role
                ),
            )
        }
        Command::LeaveWaitlist {
            waitlist_id,
            requested_by,
        } => {
            let entry: &WaitlistEntry = state
                .waitlist
                .iter()
                .find(|e| e.waitlist_id == waitlist_id)
                .ok_or(DomainError::WaitlistEntryNotFound(waitlist_id))?;
            if requested_by.is_member_other_than(entry.user_id) {
                return Err(CoreError::DomainViolation(DomainError::NotWaitlistOwner {
                    waitlist_id,
                    user_id: requested_by.user_id.unwrap_or_default(),
                }));
            }
            work.dequeue(waitlist_id)?;
            (
                Outcome::LeftWaitlist { waitlist_id },
                format!(
                    "waitlist={waitlist_id} user={} left from position={}",
                    entry.user_id, entry.position
                ),
            )
        }
        Command::PromoteWaitlist => {
            check_not_cancelled(&state.class)?;
            work.promote()?;
            (
                Outcome::WaitlistProcessed,
                format!(
                    "promoted={} skipped={}",
                    work.report.promoted.len(),
                    work.report.skipped.len()
                ),
            )
        }
        Command::SetCapacity { capacity } => {
            check_not_cancelled(&state.class)?;
            let new_capacity: u32 = u32::try_from(capacity)
                .ok()
                .filter(|c| (1..=MAX_CLASS_CAPACITY).contains(c) && *c >= state.class.enrolled)
                .ok_or(DomainError::InvalidCapacity {
                    capacity,
                    enrolled: state.class.enrolled,
                })?;
            let previous: u32 = state.class.capacity;
            work.class.capacity = new_capacity;
            work.sync_class_status();
            work.promote()?;
            (
                Outcome::CapacityChanged {
                    capacity: new_capacity,
                },
                format!("capacity {previous} -> {new_capacity}"),
            )
        }
        Command::CancelClass => {
            check_not_cancelled(&state.class)?;
            let mut cancelled_bookings: Vec<i64> = Vec::with_capacity(state.confirmed.len());
            for booking in &state.confirmed {
                work.release_seat(booking)?;
                work.notify(
                    booking.user_id,
                    NotificationKind::Cancellation,
                    format!("{} was cancelled by the studio", state.class.name),
                );
                cancelled_bookings.push(booking.booking_id);
            }
            let cleared_waitlist_entries: usize = work.clear_waitlist();
            work.class.status = ClassStatus::Cancelled;
            (
                Outcome::ClassCancelled {
                    cancelled_bookings,
                    cleared_waitlist_entries,
                },
                format!(
                    "refunded={} cleared_waitlist={}",
                    state.confirmed.len(),
                    cleared_waitlist_entries
                ),
            )
        }
        Command::CheckIn { booking } => {
            check_same_class(state, &booking)?;
            if !booking.is_confirmed() {
                return Err(CoreError::DomainViolation(DomainError::BookingNotConfirmed {
                    booking_id: booking.booking_id,
                    status: booking.status,
                }));
            }
            work.mutations.push(Mutation::MarkCheckedIn {
                booking_id: booking.booking_id,
            });
            (
                Outcome::CheckedIn {
                    booking_id: booking.booking_id,
                },
                format!("booking={} user={}", booking.booking_id, booking.user_id),
            )
        }
    };

    let action: Action = Action::new(action_name.to_string(), Some(details));
    Ok(work.finish(state, actor, cause, action, outcome))
}

fn check_not_cancelled(class: &StudioClass) -> Result<(), CoreError> {
    if class.is_cancelled() {
        return Err(CoreError::DomainViolation(DomainError::ClassCancelled(
            class.class_id,
        )));
    }
    Ok(())
}

fn check_same_class(state: &ClassState, booking: &Booking) -> Result<(), CoreError> {
    if booking.class_id != state.class.class_id {
        return Err(CoreError::Internal(format!(
            "Booking {} belongs to class {}, not class {}",
            booking.booking_id, booking.class_id, state.class.class_id
        )));
    }
    Ok(())
}

/// Validates a booking or waitlist request up to, not including, the
/// capacity decision. Returns the subscription the booking draws on.
fn check_booking_request(
    state: &ClassState,
    user_id: i64,
    ctx: &EngineContext<'_>,
    class_start: OffsetDateTime,
    today: Date,
) -> Result<Subscription, CoreError> {
    check_not_cancelled(&state.class)?;
    if class_start <= ctx.now {
        return Err(CoreError::DomainViolation(DomainError::ClassAlreadyStarted {
            class_id: state.class.class_id,
            starts_at: class_start,
        }));
    }

    if state.confirmed_booking_of(user_id).is_some() {
        return Err(CoreError::DomainViolation(DomainError::AlreadyBooked {
            user_id,
            class_id: state.class.class_id,
            waitlist_position: None,
        }));
    }
    if let Some(entry) = state.waitlist_entry_of(user_id) {
        return Err(CoreError::DomainViolation(DomainError::AlreadyBooked {
            user_id,
            class_id: state.class.class_id,
            waitlist_position: Some(entry.position),
        }));
    }

    let subscription: &Subscription =
        select_current_subscription(&state.subscriptions, user_id, today)
            .ok_or(DomainError::NoActiveSubscription { user_id })?;
    validate_subscription_for_class(subscription, &state.class)?;
    Ok(subscription.clone())
}

fn check_waitlist_open(
    state: &ClassState,
    ctx: &EngineContext<'_>,
    class_start: OffsetDateTime,
) -> Result<(), CoreError> {
    if !ctx.policy.waitlist_open(class_start, ctx.now) {
        return Err(CoreError::DomainViolation(
            DomainError::ClassFullWaitlistClosed {
                class_id: state.class.class_id,
                minutes_until_start: minutes_until(class_start, ctx.now),
            },
        ));
    }
    Ok(())
}

fn check_cancellation(
    state: &ClassState,
    booking: &Booking,
    requested_by: Requester,
    ctx: &EngineContext<'_>,
    class_start: OffsetDateTime,
) -> Result<(), CoreError> {
    check_same_class(state, booking)?;
    if booking.status != BookingStatus::Confirmed {
        return Err(CoreError::DomainViolation(DomainError::NotCancellable {
            booking_id: booking.booking_id,
            status: booking.status,
        }));
    }
    if requested_by.is_member_other_than(booking.user_id) {
        return Err(CoreError::DomainViolation(DomainError::NotBookingOwner {
            booking_id: booking.booking_id,
            user_id: requested_by.user_id.unwrap_or_default(),
        }));
    }
    if !requested_by.role.is_staff() && !ctx.policy.member_can_cancel(class_start, ctx.now) {
        return Err(CoreError::DomainViolation(
            DomainError::CancellationWindowClosed {
                booking_id: booking.booking_id,
                minutes_until_start: minutes_until(class_start, ctx.now),
                window_minutes: ctx.policy.cancellation_window_minutes,
            },
        ));
    }
    Ok(())
}

/// Working copy of a class while a command is applied.
struct Transition {
    class: StudioClass,
    waitlist: Vec<WaitlistEntry>,
    subscriptions: Vec<Subscription>,
    pending_joins: usize,
    class_start: OffsetDateTime,
    today: Date,
    now: OffsetDateTime,
    mutations: Vec<Mutation>,
    ledger_calls: Vec<LedgerCall>,
    notifications: Vec<Notification>,
    report: PromotionReport,
}

impl Transition {
    fn begin(
        state: &ClassState,
        class_start: OffsetDateTime,
        today: Date,
        now: OffsetDateTime,
    ) -> Self {
        Self {
            class: state.class.clone(),
            waitlist: state.waitlist.clone(),
            subscriptions: state.subscriptions.clone(),
            pending_joins: 0,
            class_start,
            today,
            now,
            mutations: Vec::new(),
            ledger_calls: Vec::new(),
            notifications: Vec::new(),
            report: PromotionReport::default(),
        }
    }

    /// Books a seat drawing one credit from `subscription`.
    fn confirm_seat(
        &mut self,
        user_id: i64,
        subscription: &Subscription,
    ) -> Result<(), CoreError> {
        let current = self
            .subscriptions
            .iter_mut()
            .find(|s| s.subscription_id == subscription.subscription_id)
            .ok_or_else(|| {
                CoreError::Internal(format!(
                    "Subscription {} missing from class state",
                    subscription.subscription_id
                ))
            })?;
        let credits = current
            .credits
            .debit()
            .ok_or(DomainError::NoRemainingClasses {
                subscription_id: current.subscription_id,
            })?;

        self.mutations.push(Mutation::InsertBooking {
            user_id,
            class_id: self.class.class_id,
            subscription_id: Some(current.subscription_id),
        });
        if !credits.is_unlimited() {
            self.mutations.push(Mutation::SetCredits {
                subscription_id: current.subscription_id,
                credits,
            });
        }
        current.credits = credits;
        self.class.enrolled += 1;
        Ok(())
    }

    /// Cancels a confirmed booking and returns its credit.
    fn release_seat(&mut self, booking: &Booking) -> Result<(), CoreError> {
        self.mutations.push(Mutation::SetBookingStatus {
            booking_id: booking.booking_id,
            status: BookingStatus::Cancelled,
        });
        self.class.enrolled = self.class.enrolled.saturating_sub(1);

        match booking.subscription_id {
            Some(subscription_id) => {
                let current = self
                    .subscriptions
                    .iter_mut()
                    .find(|s| s.subscription_id == subscription_id)
                    .ok_or_else(|| {
                        CoreError::Internal(format!(
                            "Subscription {subscription_id} for booking {} missing from class state",
                            booking.booking_id
                        ))
                    })?;
                if !current.credits.is_unlimited() {
                    current.credits = current.credits.refund();
                    self.mutations.push(Mutation::SetCredits {
                        subscription_id,
                        credits: current.credits,
                    });
                }
            }
            None => self.ledger_calls.push(LedgerCall::Refund {
                booking_id: booking.booking_id,
                user_id: booking.user_id,
                class_id: booking.class_id,
            }),
        }
        Ok(())
    }

    /// Appends a member to the waitlist and returns their position.
    fn enqueue(&mut self, user_id: i64) -> u32 {
        let position: u32 = next_position(&self.waitlist);
        self.mutations.push(Mutation::InsertWaitlistEntry {
            user_id,
            class_id: self.class.class_id,
            position,
        });
        self.pending_joins += 1;
        position
    }

    /// Removes an entry and moves every later entry up by one.
    fn dequeue(&mut self, waitlist_id: i64) -> Result<WaitlistEntry, CoreError> {
        let index: usize = self
            .waitlist
            .iter()
            .position(|e| e.waitlist_id == waitlist_id)
            .ok_or(DomainError::WaitlistEntryNotFound(waitlist_id))?;
        let removed: WaitlistEntry = self.waitlist.remove(index);
        self.mutations
            .push(Mutation::DeleteWaitlistEntry { waitlist_id });

        for (moved_id, position) in renumber_after_removal(&self.waitlist, removed.position) {
            self.mutations.push(Mutation::MoveWaitlistEntry {
                waitlist_id: moved_id,
                position,
            });
            if let Some(entry) = self.waitlist.iter_mut().find(|e| e.waitlist_id == moved_id) {
                entry.position = position;
            }
        }
        Ok(removed)
    }

    /// Deletes every entry, notifying each member.
    fn clear_waitlist(&mut self) -> usize {
        let entries: Vec<WaitlistEntry> = std::mem::take(&mut self.waitlist);
        for entry in &entries {
            self.mutations.push(Mutation::DeleteWaitlistEntry {
                waitlist_id: entry.waitlist_id,
            });
            self.notify(
                entry.user_id,
                NotificationKind::Cancellation,
                format!(
                    "{} was cancelled by the studio; your waitlist place was removed",
                    self.class.name
                ),
            );
        }
        entries.len()
    }

    /// Fills open seats from the head of the waitlist.
    ///
    /// Members who cannot be promoted keep their entry and position; the
    /// pass moves on to the next member. Nothing is promoted once the class
    /// has started.
    fn promote(&mut self) -> Result<(), CoreError> {
        if self.class.is_cancelled() || self.class_start <= self.now {
            return Ok(());
        }

        let queue: Vec<WaitlistEntry> = self.waitlist.clone();
        for entry in queue {
            if !self.class.has_capacity() {
                break;
            }

            let eligible: Result<Subscription, DomainError> =
                select_current_subscription(&self.subscriptions, entry.user_id, self.today)
                    .ok_or(DomainError::NoActiveSubscription {
                        user_id: entry.user_id,
                    })
                    .and_then(|s| {
                        validate_subscription_for_class(s, &self.class).map(|()| s.clone())
                    });

            let subscription: Subscription = match eligible {
                Ok(subscription) => subscription,
                Err(reason) => {
                    self.report.skipped.push(SkippedEntry {
                        waitlist_id: entry.waitlist_id,
                        user_id: entry.user_id,
                        reason: reason.to_string(),
                    });
                    continue;
                }
            };

            // Position before any renumbering in this pass.
            let position: u32 = self
                .waitlist
                .iter()
                .find(|e| e.waitlist_id == entry.waitlist_id)
                .map_or(entry.position, |e| e.position);

            self.dequeue(entry.waitlist_id)?;
            self.confirm_seat(entry.user_id, &subscription)?;
            self.report.promoted.push(Promotion {
                waitlist_id: entry.waitlist_id,
                user_id: entry.user_id,
                subscription_id: subscription.subscription_id,
                position,
            });
            self.notify(
                entry.user_id,
                NotificationKind::WaitlistPromotion,
                format!("A seat opened up: you are booked into {}", self.class.name),
            );
        }
        self.sync_class_status();
        Ok(())
    }

    fn sync_class_status(&mut self) {
        self.class.status = self.class.derived_status();
    }

    fn notify(&mut self, user_id: i64, kind: NotificationKind, message: String) {
        self.notifications.push(Notification {
            user_id,
            class_id: self.class.class_id,
            kind,
            payload: NotificationPayload {
                class_name: self.class.name.clone(),
                class_date: self.class.date,
                start_time: self.class.start_time,
                message,
            },
        });
    }

    fn finish(
        mut self,
        state: &ClassState,
        actor: Actor,
        cause: Cause,
        action: Action,
        outcome: Outcome,
    ) -> TransitionResult {
        self.sync_class_status();
        if self.class != state.class {
            self.mutations.push(Mutation::UpdateClass {
                class_id: self.class.class_id,
                capacity: self.class.capacity,
                enrolled: self.class.enrolled,
                status: self.class.status,
            });
        }

        let after = snapshot_of(&self.class, self.waitlist.len() + self.pending_joins);
        let audit_event: AuditEvent = AuditEvent::new(
            actor,
            cause,
            action,
            state.to_snapshot(),
            after,
            self.class.class_id,
        );

        TransitionResult {
            class_after: self.class,
            mutations: self.mutations,
            ledger_calls: self.ledger_calls,
            notifications: self.notifications,
            promotions: self.report,
            outcome,
            audit_event,
        }
    }
}
