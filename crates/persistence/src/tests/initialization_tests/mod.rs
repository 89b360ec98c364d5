// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend initialization tests.
//!
//! Every other persistence test also goes through `new_in_memory()`, so
//! migrations and foreign key enforcement are exercised throughout.

use super::{create_test_class, remove_database, temp_database_path};
use crate::{PersistenceError, SqlitePersistence};
use std::path::PathBuf;
use studio_booking_domain::StudioClass;

#[test]
fn test_persistence_initialization() {
    let result: Result<SqlitePersistence, PersistenceError> = SqlitePersistence::new_in_memory();
    assert!(result.is_ok());
}

#[test]
fn test_foreign_keys_are_enforced() {
    let mut persistence: SqlitePersistence = SqlitePersistence::new_in_memory().unwrap();
    assert!(persistence.verify_foreign_key_enforcement().is_ok());
}

#[test]
fn test_multiple_in_memory_instances_are_isolated() {
    let mut db1 = SqlitePersistence::new_in_memory().unwrap();
    let mut db2 = SqlitePersistence::new_in_memory().unwrap();

    let class: StudioClass = create_test_class(&mut db1, 10);

    assert!(db1.get_class(class.class_id).unwrap().is_some());
    assert!(db2.get_class(class.class_id).unwrap().is_none());
}

#[test]
fn test_file_database_survives_reopen() {
    let path: PathBuf = temp_database_path();

    let class_id: i64 = {
        let mut persistence = SqlitePersistence::new_with_file(&path).unwrap();
        create_test_class(&mut persistence, 8).class_id
    };

    let mut reopened = SqlitePersistence::new_with_file(&path).unwrap();
    let class: Option<StudioClass> = reopened.get_class(class_id).unwrap();
    assert_eq!(class.map(|c| c.capacity), Some(8));

    drop(reopened);
    remove_database(&path);
}
