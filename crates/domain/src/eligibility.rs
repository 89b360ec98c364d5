// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Subscription eligibility rules.

use crate::class::StudioClass;
use crate::error::DomainError;
use crate::subscription::Subscription;

/// Checks that the subscription category matches the class category.
///
/// # Errors
///
/// Returns `DomainError::CategoryMismatch` when they differ.
pub fn check_category(subscription: &Subscription, class: &StudioClass) -> Result<(), DomainError> {
    if subscription.category != class.category {
        return Err(DomainError::CategoryMismatch {
            required: class.category,
            held: subscription.category,
        });
    }
    Ok(())
}

/// Checks that the subscription's equipment access covers the class.
///
/// # Errors
///
/// Returns `DomainError::EquipmentMismatch` when access does not cover the class equipment.
pub fn check_equipment(
    subscription: &Subscription,
    class: &StudioClass,
) -> Result<(), DomainError> {
    if !subscription
        .equipment_access
        .covers(class.equipment_type)
    {
        return Err(DomainError::EquipmentMismatch {
            required: class.equipment_type,
            held: subscription.equipment_access,
        });
    }
    Ok(())
}

/// Runs the credit, category and equipment checks in booking order.
///
/// # Errors
///
/// Returns the first failing rule:
/// - `NoRemainingClasses`
/// - `CategoryMismatch`
/// - `EquipmentMismatch`
pub fn validate_subscription_for_class(
    subscription: &Subscription,
    class: &StudioClass,
) -> Result<(), DomainError> {
    if !subscription.credits.has_remaining() {
        return Err(DomainError::NoRemainingClasses {
            subscription_id: subscription.subscription_id,
        });
    }
    check_category(subscription, class)?;
    check_equipment(subscription, class)
}
