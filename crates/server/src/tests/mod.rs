// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use std::sync::Arc;
use studio_booking::{Clock, FixedClock};
use studio_booking_domain::{
    BookingPolicy, ClassCategory, Credits, EquipmentType, Subscription, SubscriptionStatus,
};
use studio_booking_persistence::{NewSubscription, Persistence};
use time::OffsetDateTime;
use time::macros::{date, datetime};
use tower::ServiceExt;

use crate::{AppState, build_app_state};

/// A day before the test classes start.
pub const NOW: OffsetDateTime = datetime!(2026-03-09 09:00 UTC);

/// Helper to create test app state with in-memory persistence and a stopped clock.
pub fn create_test_app_state() -> (AppState, Arc<FixedClock>) {
    let persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    let clock: Arc<FixedClock> = Arc::new(FixedClock::new(NOW));
    let app_state: AppState = build_app_state(
        persistence,
        Arc::clone(&clock) as Arc<dyn Clock>,
        BookingPolicy::default(),
    );
    (app_state, clock)
}

pub fn admin() -> Value {
    json!({
        "actor_id": "admin1",
        "actor_role": "admin",
        "cause_id": "test-cause",
        "cause_description": "Test request",
    })
}

pub fn member(user_id: i64) -> Value {
    json!({
        "actor_id": format!("member-{user_id}"),
        "actor_role": "member",
        "actor_user_id": user_id,
        "cause_id": "test-cause",
        "cause_description": "Test request",
    })
}

/// Merges extra fields into an identity body.
pub fn with(mut identity: Value, fields: Value) -> Value {
    if let (Some(target), Some(extra)) = (identity.as_object_mut(), fields.as_object()) {
        for (key, value) in extra {
            target.insert(key.clone(), value.clone());
        }
    }
    identity
}

pub async fn post_json(app: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    read_response(response).await
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    read_response(response).await
}

async fn read_response(response: axum::response::Response) -> (StatusCode, Value) {
    let status: StatusCode = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Registers a reformer group class for tomorrow morning and returns its id.
pub async fn create_test_class(app: &Router, capacity: i64) -> i64 {
    let (status, body) = post_json(
        app,
        "/classes",
        &with(
            admin(),
            json!({
                "name": "Morning Reformer",
                "capacity": capacity,
                "equipment_type": "reformer",
                "category": "group",
                "date": "2026-03-10",
                "start_time": "09:00",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create class failed: {body}");
    body["class"]["class_id"].as_i64().unwrap()
}

pub async fn create_test_subscription(
    app_state: &AppState,
    user_id: i64,
    end_date: time::Date,
) -> Subscription {
    app_state
        .persistence
        .lock()
        .await
        .create_subscription(&NewSubscription {
            user_id,
            plan_id: 3,
            credits: Credits::Limited(5),
            equipment_access: EquipmentType::Reformer,
            category: ClassCategory::Group,
            status: SubscriptionStatus::Active,
            start_date: date!(2026 - 01 - 01),
            end_date,
        })
        .unwrap()
}

pub async fn book(app: &Router, user_id: i64, class_id: i64) -> (StatusCode, Value) {
    post_json(
        app,
        "/bookings",
        &with(
            member(user_id),
            json!({ "user_id": user_id, "class_id": class_id }),
        ),
    )
    .await
}
