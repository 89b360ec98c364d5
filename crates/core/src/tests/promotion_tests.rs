// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{NOW, create_full_class_state, run};
use crate::{ClassState, Command, CoreError, Mutation, Outcome, Requester, TransitionResult};
use studio_booking_domain::{
    Booking, ClassCategory, ClassStatus, Credits, DomainError, EquipmentType,
};

fn set_credits(state: &mut ClassState, user_id: i64, credits: Credits) {
    for subscription in state.subscriptions.iter_mut().filter(|s| s.user_id == user_id) {
        subscription.credits = credits;
    }
}

fn promoted_users(result: &TransitionResult) -> Vec<i64> {
    result.promotions.promoted.iter().map(|p| p.user_id).collect()
}

#[test]
fn test_ineligible_head_is_skipped_and_keeps_position() {
    let mut state: ClassState = create_full_class_state();
    set_credits(&mut state, 3, Credits::Limited(0));
    let booking: Booking = state.confirmed[0].clone();

    let result: TransitionResult = run(
        &state,
        Command::CancelBooking {
            booking,
            requested_by: Requester::member(1),
        },
        NOW,
    )
    .unwrap();

    assert_eq!(promoted_users(&result), vec![4]);
    assert_eq!(result.promotions.skipped.len(), 1);
    assert_eq!(result.promotions.skipped[0].waitlist_id, 21);
    assert!(
        result.promotions.skipped[0]
            .reason
            .contains("no remaining classes")
    );
    assert!(
        !result
            .mutations
            .contains(&Mutation::DeleteWaitlistEntry { waitlist_id: 21 })
    );
    assert!(result.mutations.contains(&Mutation::MoveWaitlistEntry {
        waitlist_id: 23,
        position: 2,
    }));
    assert!(
        !result
            .mutations
            .iter()
            .any(|m| matches!(m, Mutation::MoveWaitlistEntry { waitlist_id: 21, .. }))
    );
}

#[test]
fn test_member_with_wrong_equipment_is_skipped() {
    let mut state: ClassState = create_full_class_state();
    for subscription in state.subscriptions.iter_mut().filter(|s| s.user_id == 3) {
        subscription.equipment_access = EquipmentType::Mat;
    }

    let result: TransitionResult = run(&state, Command::SetCapacity { capacity: 3 }, NOW).unwrap();

    assert_eq!(promoted_users(&result), vec![4]);
    assert_eq!(result.promotions.skipped[0].user_id, 3);
}

#[test]
fn test_member_with_wrong_category_is_skipped() {
    let mut state: ClassState = create_full_class_state();
    for subscription in state.subscriptions.iter_mut().filter(|s| s.user_id == 3) {
        subscription.category = ClassCategory::Personal;
    }

    let result: TransitionResult = run(&state, Command::SetCapacity { capacity: 3 }, NOW).unwrap();

    assert_eq!(promoted_users(&result), vec![4]);
}

#[test]
fn test_member_without_subscription_is_skipped() {
    let mut state: ClassState = create_full_class_state();
    state.subscriptions.retain(|s| s.user_id != 3);

    let result: TransitionResult = run(&state, Command::SetCapacity { capacity: 3 }, NOW).unwrap();

    assert_eq!(promoted_users(&result), vec![4]);
    assert_eq!(result.promotions.skipped[0].waitlist_id, 21);
}

#[test]
fn test_capacity_increase_promotes_in_queue_order() {
    let state: ClassState = create_full_class_state();

    let result: TransitionResult = run(&state, Command::SetCapacity { capacity: 4 }, NOW).unwrap();

    assert_eq!(result.outcome, Outcome::CapacityChanged { capacity: 4 });
    assert_eq!(
        result.mutations,
        vec![
            Mutation::DeleteWaitlistEntry { waitlist_id: 21 },
            Mutation::MoveWaitlistEntry {
                waitlist_id: 22,
                position: 1,
            },
            Mutation::MoveWaitlistEntry {
                waitlist_id: 23,
                position: 2,
            },
            Mutation::InsertBooking {
                user_id: 3,
                class_id: 1,
                subscription_id: Some(103),
            },
            Mutation::SetCredits {
                subscription_id: 103,
                credits: Credits::Limited(4),
            },
            Mutation::DeleteWaitlistEntry { waitlist_id: 22 },
            Mutation::MoveWaitlistEntry {
                waitlist_id: 23,
                position: 1,
            },
            Mutation::InsertBooking {
                user_id: 4,
                class_id: 1,
                subscription_id: Some(104),
            },
            Mutation::SetCredits {
                subscription_id: 104,
                credits: Credits::Limited(4),
            },
            Mutation::UpdateClass {
                class_id: 1,
                capacity: 4,
                enrolled: 4,
                status: ClassStatus::Full,
            },
        ]
    );
    let positions: Vec<u32> = result.promotions.promoted.iter().map(|p| p.position).collect();
    assert_eq!(positions, vec![1, 1]);
}

#[test]
fn test_promotion_stops_when_waitlist_is_exhausted() {
    let state: ClassState = create_full_class_state();

    let result: TransitionResult = run(&state, Command::SetCapacity { capacity: 7 }, NOW).unwrap();

    assert_eq!(promoted_users(&result), vec![3, 4, 5]);
    assert_eq!(result.class_after.enrolled, 5);
    assert_eq!(result.class_after.status, ClassStatus::Active);
    assert!(result.audit_event.after.data.ends_with("waitlist=0"));
}

#[test]
fn test_seat_stays_open_when_nobody_is_eligible() {
    let mut state: ClassState = create_full_class_state();
    for user_id in 3..=5 {
        set_credits(&mut state, user_id, Credits::Limited(0));
    }

    let result: TransitionResult = run(&state, Command::SetCapacity { capacity: 3 }, NOW).unwrap();

    assert!(result.promotions.promoted.is_empty());
    assert_eq!(result.promotions.skipped.len(), 3);
    assert_eq!(result.class_after.spots_left(), 1);
    assert_eq!(result.class_after.status, ClassStatus::Active);
}

#[test]
fn test_promote_without_open_seats_changes_nothing() {
    let state: ClassState = create_full_class_state();

    let result: TransitionResult = run(&state, Command::PromoteWaitlist, NOW).unwrap();

    assert_eq!(result.outcome, Outcome::WaitlistProcessed);
    assert!(result.mutations.is_empty());
    assert!(result.notifications.is_empty());
}

#[test]
fn test_promote_on_cancelled_class_is_rejected() {
    let mut state: ClassState = create_full_class_state();
    state.class.status = ClassStatus::Cancelled;

    let result: Result<TransitionResult, CoreError> = run(&state, Command::PromoteWaitlist, NOW);

    assert_eq!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::ClassCancelled(1))
    );
}

#[test]
fn test_promote_fills_seat_left_open() {
    let mut state: ClassState = create_full_class_state();
    state.class.capacity = 3;
    state.class.status = state.class.derived_status();

    let result: TransitionResult = run(&state, Command::PromoteWaitlist, NOW).unwrap();

    assert_eq!(promoted_users(&result), vec![3]);
    assert_eq!(result.class_after.status, ClassStatus::Full);
}
