// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    ActorRole, BookingStatus, ClassCategory, ClassStatus, Credits, DomainError, EquipmentType,
    StudioClass, SubscriptionStatus, UNLIMITED_ALLOTMENT_THRESHOLD,
};
use std::str::FromStr;

use super::create_test_class;

#[test]
fn test_equipment_both_covers_everything() {
    assert!(EquipmentType::Both.covers(EquipmentType::Mat));
    assert!(EquipmentType::Both.covers(EquipmentType::Reformer));
    assert!(EquipmentType::Both.covers(EquipmentType::Both));
}

#[test]
fn test_single_equipment_covers_only_itself() {
    assert!(EquipmentType::Mat.covers(EquipmentType::Mat));
    assert!(!EquipmentType::Mat.covers(EquipmentType::Reformer));
    assert!(!EquipmentType::Mat.covers(EquipmentType::Both));
    assert!(EquipmentType::Reformer.covers(EquipmentType::Reformer));
    assert!(!EquipmentType::Reformer.covers(EquipmentType::Mat));
    assert!(!EquipmentType::Reformer.covers(EquipmentType::Both));
}

#[test]
fn test_enum_string_forms_parse_back() {
    for status in [
        BookingStatus::Confirmed,
        BookingStatus::Cancelled,
        BookingStatus::Completed,
        BookingStatus::NoShow,
    ] {
        assert_eq!(BookingStatus::from_str(status.as_str()).unwrap(), status);
    }
    for status in [
        SubscriptionStatus::Active,
        SubscriptionStatus::Expired,
        SubscriptionStatus::Cancelled,
        SubscriptionStatus::Paused,
    ] {
        assert_eq!(SubscriptionStatus::from_str(status.as_str()).unwrap(), status);
    }
    assert_eq!(ClassStatus::from_str("full").unwrap(), ClassStatus::Full);
    assert_eq!(ClassCategory::from_str("personal").unwrap(), ClassCategory::Personal);
    assert_eq!(ActorRole::from_str("reception").unwrap(), ActorRole::Reception);
}

#[test]
fn test_unknown_enum_value_is_rejected() {
    let err: DomainError = EquipmentType::from_str("barre").unwrap_err();
    assert_eq!(
        err,
        DomainError::InvalidEnumValue {
            kind: "equipment type",
            value: String::from("barre"),
        }
    );
    assert!(BookingStatus::from_str("Confirmed").is_err());
}

#[test]
fn test_actor_role_staff() {
    assert!(!ActorRole::Member.is_staff());
    assert!(ActorRole::Reception.is_staff());
    assert!(ActorRole::Admin.is_staff());
}

#[test]
fn test_plan_allotment_threshold_maps_to_unlimited() {
    assert_eq!(Credits::from_plan_allotment(8), Credits::Limited(8));
    assert_eq!(
        Credits::from_plan_allotment(UNLIMITED_ALLOTMENT_THRESHOLD - 1),
        Credits::Limited(998)
    );
    assert_eq!(
        Credits::from_plan_allotment(UNLIMITED_ALLOTMENT_THRESHOLD),
        Credits::Unlimited
    );
    assert_eq!(Credits::from_plan_allotment(5000), Credits::Unlimited);
}

#[test]
fn test_limited_credits_debit_and_refund() {
    let credits: Credits = Credits::Limited(1);
    assert!(credits.has_remaining());

    let debited: Credits = credits.debit().unwrap();
    assert_eq!(debited, Credits::Limited(0));
    assert!(!debited.has_remaining());
    assert_eq!(debited.debit(), None);

    assert_eq!(debited.refund(), Credits::Limited(1));
}

#[test]
fn test_unlimited_credits_never_change() {
    let credits: Credits = Credits::Unlimited;
    assert_eq!(credits.debit(), Some(Credits::Unlimited));
    assert_eq!(credits.refund(), Credits::Unlimited);
    assert!(credits.is_unlimited());
}

#[test]
fn test_class_derived_status_tracks_enrollment() {
    let mut class: StudioClass = create_test_class(EquipmentType::Mat, ClassCategory::Group);
    class.capacity = 2;
    assert_eq!(class.derived_status(), ClassStatus::Active);
    assert_eq!(class.spots_left(), 2);

    class.enrolled = 2;
    assert_eq!(class.derived_status(), ClassStatus::Full);
    assert!(!class.has_capacity());

    class.status = ClassStatus::Cancelled;
    class.enrolled = 0;
    assert_eq!(class.derived_status(), ClassStatus::Cancelled);
}

#[test]
fn test_credits_display() {
    assert_eq!(Credits::Limited(3).to_string(), "3");
    assert_eq!(Credits::Unlimited.to_string(), "unlimited");
}
