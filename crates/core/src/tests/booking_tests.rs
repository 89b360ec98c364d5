// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    NOW, create_full_class_state, create_test_booking, create_test_class,
    create_test_subscription, run,
};
use crate::{ClassState, Command, CoreError, Mutation, Outcome, TransitionResult};
use studio_booking_domain::{
    ClassCategory, ClassStatus, Credits, DomainError, EquipmentType, StudioClass, Subscription,
    SubscriptionStatus,
};
use time::macros::{date, datetime};

fn open_class_with_member(subscription: Subscription) -> ClassState {
    ClassState::new(create_test_class(10), Vec::new(), Vec::new(), vec![subscription])
}

#[test]
fn test_booking_open_class_confirms_and_debits() {
    let state: ClassState =
        open_class_with_member(create_test_subscription(7, 42, Credits::Limited(3)));

    let result: TransitionResult = run(&state, Command::BookClass { user_id: 42 }, NOW).unwrap();

    assert_eq!(
        result.outcome,
        Outcome::Booked {
            user_id: 42,
            subscription_id: 7
        }
    );
    assert_eq!(
        result.mutations,
        vec![
            Mutation::InsertBooking {
                user_id: 42,
                class_id: 1,
                subscription_id: Some(7),
            },
            Mutation::SetCredits {
                subscription_id: 7,
                credits: Credits::Limited(2),
            },
            Mutation::UpdateClass {
                class_id: 1,
                capacity: 10,
                enrolled: 1,
                status: ClassStatus::Active,
            },
        ]
    );
    assert_eq!(result.class_after.enrolled, 1);
    assert!(result.notifications.is_empty());
    assert!(result.ledger_calls.is_empty());
}

#[test]
fn test_booking_emits_audit_event() {
    let state: ClassState =
        open_class_with_member(create_test_subscription(7, 42, Credits::Limited(3)));

    let result: TransitionResult = run(&state, Command::BookClass { user_id: 42 }, NOW).unwrap();

    assert_eq!(result.audit_event.action.name, "BookClass");
    assert_eq!(result.audit_event.class_id, Some(1));
    assert_eq!(
        result.audit_event.before.data,
        "class_id=1,status=active,enrolled=0,capacity=10,waitlist=0"
    );
    assert_eq!(
        result.audit_event.after.data,
        "class_id=1,status=active,enrolled=1,capacity=10,waitlist=0"
    );
}

#[test]
fn test_booking_with_unlimited_credits_leaves_credits_untouched() {
    let state: ClassState =
        open_class_with_member(create_test_subscription(7, 42, Credits::Unlimited));

    let result: TransitionResult = run(&state, Command::BookClass { user_id: 42 }, NOW).unwrap();

    assert!(
        !result
            .mutations
            .iter()
            .any(|m| matches!(m, Mutation::SetCredits { .. }))
    );
}

#[test]
fn test_booking_last_seat_marks_class_full() {
    let mut class: StudioClass = create_test_class(2);
    class.enrolled = 1;
    let state: ClassState = ClassState::new(
        class,
        vec![create_test_booking(11, 1, Some(101))],
        Vec::new(),
        vec![create_test_subscription(7, 42, Credits::Limited(3))],
    );

    let result: TransitionResult = run(&state, Command::BookClass { user_id: 42 }, NOW).unwrap();

    assert_eq!(result.class_after.status, ClassStatus::Full);
    assert_eq!(result.class_after.spots_left(), 0);
}

#[test]
fn test_booking_twice_is_rejected() {
    let state: ClassState = ClassState::new(
        create_test_class(10),
        vec![create_test_booking(11, 42, Some(7))],
        Vec::new(),
        vec![create_test_subscription(7, 42, Credits::Limited(3))],
    );

    let result: Result<TransitionResult, CoreError> =
        run(&state, Command::BookClass { user_id: 42 }, NOW);

    assert_eq!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::AlreadyBooked {
            user_id: 42,
            class_id: 1,
            waitlist_position: None,
        })
    );
}

#[test]
fn test_booking_while_waitlisted_reports_position() {
    let state: ClassState = create_full_class_state();

    let result: Result<TransitionResult, CoreError> =
        run(&state, Command::BookClass { user_id: 4 }, NOW);

    assert_eq!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::AlreadyBooked {
            user_id: 4,
            class_id: 1,
            waitlist_position: Some(2),
        })
    );
}

#[test]
fn test_booking_without_subscription_is_rejected() {
    let state: ClassState = ClassState::new(create_test_class(10), Vec::new(), Vec::new(), Vec::new());

    let result: Result<TransitionResult, CoreError> =
        run(&state, Command::BookClass { user_id: 42 }, NOW);

    assert_eq!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::NoActiveSubscription { user_id: 42 })
    );
}

#[test]
fn test_booking_with_stale_active_subscription_is_rejected() {
    let mut subscription: Subscription = create_test_subscription(7, 42, Credits::Limited(3));
    subscription.end_date = date!(2026 - 03 - 08);
    let state: ClassState = open_class_with_member(subscription);

    let result: Result<TransitionResult, CoreError> =
        run(&state, Command::BookClass { user_id: 42 }, NOW);

    assert_eq!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::NoActiveSubscription { user_id: 42 })
    );
}

#[test]
fn test_booking_with_paused_subscription_is_rejected() {
    let mut subscription: Subscription = create_test_subscription(7, 42, Credits::Limited(3));
    subscription.status = SubscriptionStatus::Paused;
    let state: ClassState = open_class_with_member(subscription);

    let result: Result<TransitionResult, CoreError> =
        run(&state, Command::BookClass { user_id: 42 }, NOW);

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::NoActiveSubscription { .. }
        ))
    ));
}

#[test]
fn test_booking_with_cancelled_subscription_and_credits_is_allowed() {
    let mut subscription: Subscription = create_test_subscription(7, 42, Credits::Limited(1));
    subscription.status = SubscriptionStatus::Cancelled;
    let state: ClassState = open_class_with_member(subscription);

    let result: Result<TransitionResult, CoreError> =
        run(&state, Command::BookClass { user_id: 42 }, NOW);

    assert!(result.is_ok());
}

#[test]
fn test_booking_with_no_credits_is_rejected() {
    let state: ClassState =
        open_class_with_member(create_test_subscription(7, 42, Credits::Limited(0)));

    let result: Result<TransitionResult, CoreError> =
        run(&state, Command::BookClass { user_id: 42 }, NOW);

    assert_eq!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::NoRemainingClasses { subscription_id: 7 })
    );
}

#[test]
fn test_booking_with_wrong_category_is_rejected() {
    let mut subscription: Subscription = create_test_subscription(7, 42, Credits::Limited(3));
    subscription.category = ClassCategory::Personal;
    let state: ClassState = open_class_with_member(subscription);

    let result: Result<TransitionResult, CoreError> =
        run(&state, Command::BookClass { user_id: 42 }, NOW);

    assert_eq!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::CategoryMismatch {
            required: ClassCategory::Group,
            held: ClassCategory::Personal,
        })
    );
}

#[test]
fn test_booking_with_wrong_equipment_is_rejected() {
    let mut subscription: Subscription = create_test_subscription(7, 42, Credits::Limited(3));
    subscription.equipment_access = EquipmentType::Mat;
    let state: ClassState = open_class_with_member(subscription);

    let result: Result<TransitionResult, CoreError> =
        run(&state, Command::BookClass { user_id: 42 }, NOW);

    assert_eq!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::EquipmentMismatch {
            required: EquipmentType::Reformer,
            held: EquipmentType::Mat,
        })
    );
}

#[test]
fn test_booking_with_both_equipment_access_is_allowed() {
    let mut subscription: Subscription = create_test_subscription(7, 42, Credits::Limited(3));
    subscription.equipment_access = EquipmentType::Both;
    let state: ClassState = open_class_with_member(subscription);

    let result: Result<TransitionResult, CoreError> =
        run(&state, Command::BookClass { user_id: 42 }, NOW);

    assert!(result.is_ok());
}

#[test]
fn test_booking_cancelled_class_is_rejected_before_subscription_checks() {
    let mut class: StudioClass = create_test_class(10);
    class.status = ClassStatus::Cancelled;
    let state: ClassState = ClassState::new(class, Vec::new(), Vec::new(), Vec::new());

    let result: Result<TransitionResult, CoreError> =
        run(&state, Command::BookClass { user_id: 42 }, NOW);

    assert_eq!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::ClassCancelled(1))
    );
}

#[test]
fn test_booking_started_class_is_rejected() {
    let state: ClassState =
        open_class_with_member(create_test_subscription(7, 42, Credits::Limited(3)));

    let result: Result<TransitionResult, CoreError> = run(
        &state,
        Command::BookClass { user_id: 42 },
        datetime!(2026-03-10 09:00 UTC),
    );

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::ClassAlreadyStarted { class_id: 1, .. }
        ))
    ));
}

#[test]
fn test_booking_full_class_joins_waitlist_at_end() {
    let mut state: ClassState = create_full_class_state();
    state
        .subscriptions
        .push(create_test_subscription(106, 6, Credits::Limited(5)));

    let result: TransitionResult = run(&state, Command::BookClass { user_id: 6 }, NOW).unwrap();

    assert_eq!(
        result.outcome,
        Outcome::Waitlisted {
            user_id: 6,
            position: 4
        }
    );
    assert_eq!(
        result.mutations,
        vec![Mutation::InsertWaitlistEntry {
            user_id: 6,
            class_id: 1,
            position: 4,
        }]
    );
    assert!(result.audit_event.after.data.ends_with("waitlist=4"));
}

#[test]
fn test_booking_full_class_inside_cutoff_is_rejected() {
    let mut state: ClassState = create_full_class_state();
    state
        .subscriptions
        .push(create_test_subscription(106, 6, Credits::Limited(5)));

    let result: Result<TransitionResult, CoreError> = run(
        &state,
        Command::BookClass { user_id: 6 },
        datetime!(2026-03-10 07:01 UTC),
    );

    assert_eq!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::ClassFullWaitlistClosed {
            class_id: 1,
            minutes_until_start: 119,
        })
    );
}

#[test]
fn test_booking_full_class_exactly_at_cutoff_joins_waitlist() {
    let mut state: ClassState = create_full_class_state();
    state
        .subscriptions
        .push(create_test_subscription(106, 6, Credits::Limited(5)));

    let result: Result<TransitionResult, CoreError> = run(
        &state,
        Command::BookClass { user_id: 6 },
        datetime!(2026-03-10 07:00 UTC),
    );

    assert!(matches!(
        result.unwrap().outcome,
        Outcome::Waitlisted { position: 4, .. }
    ));
}

#[test]
fn test_booking_full_class_without_subscription_reports_subscription_first() {
    let state: ClassState = create_full_class_state();

    let result: Result<TransitionResult, CoreError> =
        run(&state, Command::BookClass { user_id: 6 }, datetime!(2026-03-10 08:00 UTC));

    assert_eq!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::NoActiveSubscription { user_id: 6 })
    );
}
