// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{create_test_actor, create_test_cause, create_test_class};
use crate::{Persistence, PersistenceError};
use studio_booking_audit::{Action, AuditEvent, StateSnapshot};
use studio_booking_domain::StudioClass;

fn create_test_event(class_id: i64, name: &str, before: &str, after: &str) -> AuditEvent {
    AuditEvent::new(
        create_test_actor(),
        create_test_cause(),
        Action::new(name.to_string(), Some(String::from("user_id=42"))),
        StateSnapshot::new(before.to_string()),
        StateSnapshot::new(after.to_string()),
        class_id,
    )
}

#[test]
fn test_persist_and_retrieve_audit_event() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let class: StudioClass = create_test_class(&mut persistence, 10);
    let event: AuditEvent = create_test_event(class.class_id, "BookClass", "enrolled=0", "enrolled=1");

    let event_id: i64 = persistence
        .atomically(|tx| tx.persist_audit_event(&event))
        .unwrap();
    let loaded: AuditEvent = persistence.get_audit_event(event_id).unwrap();

    assert_eq!(loaded, event.with_event_id(event_id));
}

#[test]
fn test_missing_event_is_reported() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let result: Result<AuditEvent, PersistenceError> = persistence.get_audit_event(999);

    assert_eq!(result, Err(PersistenceError::EventNotFound(999)));
}

#[test]
fn test_class_timeline_is_ordered_and_scoped() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let class: StudioClass = create_test_class(&mut persistence, 10);
    let other: StudioClass = create_test_class(&mut persistence, 10);

    for (class_id, name) in [
        (class.class_id, "BookClass"),
        (other.class_id, "BookClass"),
        (class.class_id, "CancelBooking"),
    ] {
        let event: AuditEvent = create_test_event(class_id, name, "before", "after");
        persistence
            .atomically(|tx| tx.persist_audit_event(&event))
            .unwrap();
    }

    let timeline: Vec<AuditEvent> = persistence.audit_events_for_class(class.class_id).unwrap();

    let names: Vec<&str> = timeline.iter().map(|e| e.action.name.as_str()).collect();
    assert_eq!(names, vec!["BookClass", "CancelBooking"]);
    assert!(timeline.iter().all(|e| e.class_id == Some(class.class_id)));
    assert!(timeline[0].event_id < timeline[1].event_id);
}

#[test]
fn test_global_event_has_no_class() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let event: AuditEvent = AuditEvent::new_global(
        create_test_actor(),
        create_test_cause(),
        Action::new(String::from("ExpireSubscriptions"), None),
        StateSnapshot::new(String::from("expired=0")),
        StateSnapshot::new(String::from("expired=2")),
    );

    let event_id: i64 = persistence
        .atomically(|tx| tx.persist_audit_event(&event))
        .unwrap();

    let loaded: AuditEvent = persistence.get_audit_event(event_id).unwrap();
    assert_eq!(loaded.class_id, None);
    assert_eq!(loaded.action.details, None);
}

#[test]
fn test_rolled_back_event_is_not_stored() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let class: StudioClass = create_test_class(&mut persistence, 10);
    let event: AuditEvent = create_test_event(class.class_id, "BookClass", "a", "b");

    let result: Result<i64, PersistenceError> = persistence.atomically(|tx| {
        tx.persist_audit_event(&event)?;
        Err(super::body_error())
    });

    assert!(result.is_err());
    assert!(
        persistence
            .audit_events_for_class(class.class_id)
            .unwrap()
            .is_empty()
    );
}
