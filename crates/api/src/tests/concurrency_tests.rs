// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{RecordingDispatcher, RecordingLedger, TestStudio};
use crate::CreateBookingResponse;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;
use studio_booking_domain::{Credits, StudioClass};
use studio_booking_persistence::Persistence;

static FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

fn temp_database_path() -> PathBuf {
    let id: u64 = FILE_COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "studio_booking_api_{}_{id}.db",
        std::process::id()
    ))
}

fn remove_database(path: &PathBuf) {
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.clone().into_os_string();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }
}

fn studio_at(path: &PathBuf) -> TestStudio {
    TestStudio::with_persistence(
        Persistence::new_with_file(path).unwrap(),
        RecordingDispatcher::default(),
        RecordingLedger::default(),
    )
}

fn book_all(mut studio: TestStudio, users: Vec<i64>, class_id: i64) -> JoinHandle<Vec<bool>> {
    std::thread::spawn(move || {
        users
            .into_iter()
            .map(|user_id| {
                matches!(
                    studio.book(user_id, class_id).unwrap(),
                    CreateBookingResponse::Confirmed { .. }
                )
            })
            .collect()
    })
}

#[test]
fn test_concurrent_bookings_never_oversell() {
    let path: PathBuf = temp_database_path();
    let mut setup: TestStudio = studio_at(&path);
    let class_id: i64 = setup.class(3);
    for user_id in 1..=8 {
        setup.subscription(user_id, Credits::Limited(5));
    }

    let left: JoinHandle<Vec<bool>> = book_all(studio_at(&path), vec![1, 3, 5, 7], class_id);
    let right: JoinHandle<Vec<bool>> = book_all(studio_at(&path), vec![2, 4, 6, 8], class_id);
    let mut outcomes: Vec<bool> = left.join().unwrap();
    outcomes.extend(right.join().unwrap());

    let confirmed: usize = outcomes.iter().filter(|confirmed| **confirmed).count();
    assert_eq!(confirmed, 3);

    let class: StudioClass = setup.persistence.get_class(class_id).unwrap().unwrap();
    assert_eq!(class.enrolled, 3);
    let positions: Vec<u32> = setup
        .waitlist_users(class_id)
        .iter()
        .map(|(position, _)| *position)
        .collect();
    assert_eq!(positions, vec![1, 2, 3, 4, 5]);
    setup.assert_invariants(class_id);

    drop(setup);
    remove_database(&path);
}

#[test]
fn test_concurrent_double_booking_by_one_member() {
    let path: PathBuf = temp_database_path();
    let mut setup: TestStudio = studio_at(&path);
    let class_id: i64 = setup.class(5);
    setup.subscription(1, Credits::Limited(5));

    let attempts: Vec<JoinHandle<bool>> = (0..2)
        .map(|_| {
            let mut studio: TestStudio = studio_at(&path);
            std::thread::spawn(move || studio.book(1, class_id).is_ok())
        })
        .collect();
    let succeeded: usize = attempts
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(succeeded, 1);
    let class: StudioClass = setup.persistence.get_class(class_id).unwrap().unwrap();
    assert_eq!(class.enrolled, 1);
    setup.assert_invariants(class_id);

    drop(setup);
    remove_database(&path);
}
