// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Action, Actor, AuditEvent, Cause, StateSnapshot};

#[test]
fn test_actor_creation_requires_all_fields() {
    let actor: Actor = Actor::new(String::from("member-42"), String::from("member"));

    assert_eq!(actor.id, "member-42");
    assert_eq!(actor.actor_type, "member");
}

#[test]
fn test_system_actor() {
    let actor: Actor = Actor::system();
    assert_eq!(actor.id, "system");
    assert_eq!(actor.actor_type, "system");
}

#[test]
fn test_action_creation_with_details() {
    let action: Action = Action::new(
        String::from("CancelBooking"),
        Some(String::from("Cancelled booking 5")),
    );

    assert_eq!(action.name, "CancelBooking");
    assert_eq!(action.details, Some(String::from("Cancelled booking 5")));
}

#[test]
fn test_audit_event_creation_requires_all_fields() {
    let actor: Actor = Actor::new(String::from("desk-1"), String::from("reception"));
    let cause: Cause = Cause::new(String::from("req-456"), String::from("Front desk"));
    let action: Action = Action::new(String::from("BookClass"), None);
    let before: StateSnapshot = StateSnapshot::new(String::from("enrolled=3,capacity=10,waitlist=0"));
    let after: StateSnapshot = StateSnapshot::new(String::from("enrolled=4,capacity=10,waitlist=0"));

    let event: AuditEvent = AuditEvent::new(
        actor.clone(),
        cause.clone(),
        action.clone(),
        before.clone(),
        after.clone(),
        17,
    );

    assert_eq!(event.event_id, None);
    assert_eq!(event.actor, actor);
    assert_eq!(event.cause, cause);
    assert_eq!(event.action, action);
    assert_eq!(event.before, before);
    assert_eq!(event.after, after);
    assert_eq!(event.class_id, Some(17));
}

#[test]
fn test_global_event_has_no_class() {
    let event: AuditEvent = AuditEvent::new_global(
        Actor::system(),
        Cause::new(String::from("sweep"), String::from("Scheduled expiry sweep")),
        Action::new(String::from("ExpireSubscriptions"), None),
        StateSnapshot::new(String::from("expired=0")),
        StateSnapshot::new(String::from("expired=2")),
    );

    assert_eq!(event.class_id, None);
}

#[test]
fn test_with_event_id_keeps_content() {
    let event: AuditEvent = AuditEvent::new(
        Actor::system(),
        Cause::new(String::from("c"), String::from("d")),
        Action::new(String::from("PromoteWaitlist"), None),
        StateSnapshot::new(String::from("before")),
        StateSnapshot::new(String::from("after")),
        3,
    );
    let persisted: AuditEvent = event.clone().with_event_id(11);

    assert_eq!(persisted.event_id, Some(11));
    assert_eq!(persisted.action, event.action);
    assert_eq!(persisted.class_id, Some(3));
}
