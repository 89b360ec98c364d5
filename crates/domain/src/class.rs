// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::{ClassCategory, ClassStatus, EquipmentType};
use serde::{Deserialize, Serialize};
use time::{Date, Time};

/// Largest seat count a class may carry.
pub const MAX_CLASS_CAPACITY: u32 = 1_000;

/// A scheduled class.
///
/// `date` and `start_time` are wall-clock values in the studio timezone.
/// `enrolled` always equals the number of confirmed bookings for the class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudioClass {
    /// Canonical identifier.
    pub class_id: i64,
    /// Display name.
    pub name: String,
    /// Maximum number of confirmed bookings.
    pub capacity: u32,
    /// Current number of confirmed bookings.
    pub enrolled: u32,
    /// Equipment required to attend.
    pub equipment_type: EquipmentType,
    /// Group or personal.
    pub category: ClassCategory,
    /// Studio-local date.
    pub date: Date,
    /// Studio-local start time.
    pub start_time: Time,
    /// Lifecycle status.
    pub status: ClassStatus,
}

impl StudioClass {
    /// Creates a new active class with nobody enrolled.
    ///
    /// # Arguments
    ///
    /// * `class_id` - The canonical identifier
    /// * `name` - Display name
    /// * `capacity` - Seat count
    /// * `equipment_type` - Required equipment
    /// * `category` - Class category
    /// * `date` - Studio-local date
    /// * `start_time` - Studio-local start time
    #[must_use]
    pub const fn new(
        class_id: i64,
        name: String,
        capacity: u32,
        equipment_type: EquipmentType,
        category: ClassCategory,
        date: Date,
        start_time: Time,
    ) -> Self {
        Self {
            class_id,
            name,
            capacity,
            enrolled: 0,
            equipment_type,
            category,
            date,
            start_time,
            status: ClassStatus::Active,
        }
    }

    /// Returns the number of seats still open.
    #[must_use]
    pub const fn spots_left(&self) -> u32 {
        self.capacity.saturating_sub(self.enrolled)
    }

    /// Returns whether a seat is open.
    #[must_use]
    pub const fn has_capacity(&self) -> bool {
        self.enrolled < self.capacity
    }

    /// Returns whether the class was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self.status, ClassStatus::Cancelled)
    }

    /// The status the class should carry for its current enrollment.
    ///
    /// Cancelled classes stay cancelled.
    #[must_use]
    pub const fn derived_status(&self) -> ClassStatus {
        if self.is_cancelled() {
            ClassStatus::Cancelled
        } else if self.enrolled >= self.capacity {
            ClassStatus::Full
        } else {
            ClassStatus::Active
        }
    }
}
