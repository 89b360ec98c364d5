// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use studio_booking::CoreError;
use studio_booking_domain::DomainError;
use studio_booking_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A booking rule was violated.
    DomainRuleViolation {
        /// Stable `snake_case` code of the rule (e.g. `already_booked`).
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// The rule code, for rule violations.
    #[must_use]
    pub fn rule(&self) -> Option<&str> {
        match self {
            Self::DomainRuleViolation { rule, .. } => Some(rule),
            _ => None,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

fn rule_violation(rule: &str, message: String) -> ApiError {
    ApiError::DomainRuleViolation {
        rule: rule.to_string(),
        message,
    }
}

fn not_found(resource_type: &str, message: String) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: resource_type.to_string(),
        message,
    }
}

fn invalid_input(field: &str, message: String) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message,
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
/// Every rule rejection carries a stable `snake_case` code clients can match on.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    match err {
        DomainError::ClassNotFound(_) => not_found("Class", message),
        DomainError::BookingNotFound(_) => not_found("Booking", message),
        DomainError::WaitlistEntryNotFound(_) => not_found("Waitlist entry", message),
        DomainError::ClassCancelled(_) => rule_violation("class_cancelled", message),
        DomainError::ClassAlreadyStarted { .. } => {
            rule_violation("class_already_started", message)
        }
        DomainError::AlreadyBooked { .. } => rule_violation("already_booked", message),
        DomainError::NoActiveSubscription { .. } => {
            rule_violation("no_active_subscription", message)
        }
        DomainError::NoRemainingClasses { .. } => rule_violation("no_remaining_classes", message),
        DomainError::CategoryMismatch { .. } => rule_violation("category_mismatch", message),
        DomainError::EquipmentMismatch { .. } => rule_violation("equipment_mismatch", message),
        DomainError::ClassFullWaitlistClosed { .. } => {
            rule_violation("class_full_waitlist_closed", message)
        }
        DomainError::ClassNotFull { .. } => rule_violation("class_not_full", message),
        DomainError::NotCancellable { .. } => rule_violation("not_cancellable", message),
        DomainError::NotBookingOwner { .. } => rule_violation("not_booking_owner", message),
        DomainError::CancellationWindowClosed { .. } => {
            rule_violation("cancellation_window_closed", message)
        }
        DomainError::NotWaitlistOwner { .. } => rule_violation("not_waitlist_owner", message),
        DomainError::BookingNotConfirmed { .. } => {
            rule_violation("booking_not_confirmed", message)
        }
        DomainError::InvalidCapacity { .. } => invalid_input("capacity", message),
        DomainError::InvalidTimezone(_) => invalid_input("timezone", message),
        DomainError::InvalidClassSchedule { .. } => invalid_input("start_time", message),
        DomainError::InvalidEnumValue { kind, .. } => {
            invalid_input(&kind.replace(' ', "_"), message)
        }
        DomainError::DateParseError { .. } => invalid_input("date", message),
        DomainError::InvalidDateRange { .. } => invalid_input("to", message),
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::Internal(msg) => ApiError::Internal {
            message: format!("Internal error: {msg}"),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Storage failures are never the client's fault, so every variant becomes
/// `Internal`; lock contention gets a message that says retrying may help.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::SerializationConflict(msg) => ApiError::Internal {
            message: format!("The studio is busy with another booking, please retry: {msg}"),
        },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
