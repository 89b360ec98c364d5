// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{body_error, create_test_class, remove_database, temp_database_path};
use crate::{MAX_TRANSACTION_ATTEMPTS, NewClass, Persistence, PersistenceError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use studio_booking_domain::{ClassCategory, EquipmentType, StudioClass};
use time::macros::{date, time};

fn mat_class() -> NewClass {
    NewClass {
        name: String::from("Lunch Mat"),
        capacity: 6,
        equipment_type: EquipmentType::Mat,
        category: ClassCategory::Group,
        date: date!(2026 - 03 - 11),
        start_time: time!(12:30),
    }
}

#[test]
fn test_body_error_rolls_back_writes() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let class: NewClass = mat_class();

    let result: Result<StudioClass, PersistenceError> = persistence.atomically(|tx| {
        tx.create_class(&class)?;
        Err(body_error())
    });

    assert_eq!(result, Err(body_error()));
    assert!(
        persistence
            .classes_between(date!(2026 - 03 - 01), date!(2026 - 03 - 31))
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_conflict_is_retried_up_to_the_limit() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let mut calls: u32 = 0;

    let result: Result<(), PersistenceError> = persistence.atomically(|_tx| {
        calls += 1;
        Err(PersistenceError::SerializationConflict(String::from(
            "database is locked",
        )))
    });

    assert!(matches!(
        result,
        Err(PersistenceError::SerializationConflict(_))
    ));
    assert_eq!(calls, MAX_TRANSACTION_ATTEMPTS);
}

#[test]
fn test_conflict_then_success_commits() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let class: NewClass = mat_class();
    let mut calls: u32 = 0;

    let created: StudioClass = persistence
        .atomically(|tx| {
            calls += 1;
            let created: StudioClass = tx.create_class(&class)?;
            if calls == 1 {
                return Err(PersistenceError::SerializationConflict(String::from(
                    "busy",
                )));
            }
            Ok(created)
        })
        .unwrap();

    assert_eq!(calls, 2);
    let stored: Vec<StudioClass> = persistence
        .classes_between(date!(2026 - 03 - 11), date!(2026 - 03 - 11))
        .unwrap();
    assert_eq!(stored, vec![created]);
}

#[test]
fn test_other_errors_are_not_retried() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let mut calls: u32 = 0;

    let result: Result<(), PersistenceError> = persistence.atomically(|_tx| {
        calls += 1;
        Err(body_error())
    });

    assert!(result.is_err());
    assert_eq!(calls, 1);
}

#[test]
fn test_lock_messages_classify_as_conflicts() {
    for message in ["database is locked", "database table is locked", "Database is busy"] {
        let err: PersistenceError = PersistenceError::from(DieselError::DatabaseError(
            DatabaseErrorKind::Unknown,
            Box::new(message.to_string()),
        ));
        assert!(err.is_serialization_conflict(), "{message}");
    }

    let constraint: PersistenceError = PersistenceError::from(DieselError::DatabaseError(
        DatabaseErrorKind::UniqueViolation,
        Box::new(String::from("UNIQUE constraint failed: waitlist.class_id")),
    ));
    assert!(!constraint.is_serialization_conflict());
    assert!(!PersistenceError::from(DieselError::NotFound).is_serialization_conflict());
}

#[test]
fn test_writer_waits_for_lock_within_busy_timeout() {
    let path: PathBuf = temp_database_path();
    let mut holder: Persistence = Persistence::new_with_file(&path).unwrap();
    let mut waiter: Persistence =
        Persistence::new_with_file_and_busy_timeout(&path, Duration::from_secs(5)).unwrap();
    let (locked_tx, locked_rx) = mpsc::channel::<()>();

    let handle = thread::spawn(move || {
        holder
            .atomically(|tx| {
                let created: StudioClass = create_class_in(tx)?;
                let _ = locked_tx.send(());
                thread::sleep(Duration::from_millis(200));
                Ok::<StudioClass, PersistenceError>(created)
            })
            .unwrap()
    });

    locked_rx.recv().unwrap();
    let second: StudioClass = create_test_class(&mut waiter, 4);
    let first: StudioClass = handle.join().unwrap();

    assert!(second.class_id > first.class_id);
    remove_database(&path);
}

#[test]
fn test_writer_without_busy_timeout_reports_conflict() {
    let path: PathBuf = temp_database_path();
    let mut holder: Persistence = Persistence::new_with_file(&path).unwrap();
    let mut waiter: Persistence =
        Persistence::new_with_file_and_busy_timeout(&path, Duration::ZERO).unwrap();
    let (locked_tx, locked_rx) = mpsc::channel::<()>();
    let (release_tx, release_rx) = mpsc::channel::<()>();

    let handle = thread::spawn(move || {
        holder
            .atomically(|tx| {
                let created: StudioClass = create_class_in(tx)?;
                let _ = locked_tx.send(());
                let _ = release_rx.recv();
                Ok::<StudioClass, PersistenceError>(created)
            })
            .unwrap()
    });

    locked_rx.recv().unwrap();
    let class: NewClass = mat_class();
    let result: Result<StudioClass, PersistenceError> =
        waiter.atomically(|tx| tx.create_class(&class));
    release_tx.send(()).unwrap();
    handle.join().unwrap();

    assert!(matches!(
        result,
        Err(PersistenceError::SerializationConflict(_))
    ));
    remove_database(&path);
}

fn create_class_in(tx: &mut crate::StudioTx<'_>) -> Result<StudioClass, PersistenceError> {
    tx.create_class(&mat_class())
}
