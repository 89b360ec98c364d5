// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Plan allotments at or above this value are treated as unlimited.
///
/// Plan catalogs historically encoded "unlimited" as a very large monthly
/// class count. Subscriptions created from such a plan carry
/// [`Credits::Unlimited`] instead of the number.
pub const UNLIMITED_ALLOTMENT_THRESHOLD: u32 = 999;

/// Equipment used by a class, or covered by a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentType {
    /// Mat work.
    Mat,
    /// Reformer machines.
    Reformer,
    /// Both mat and reformer.
    Both,
}

impl EquipmentType {
    /// Converts this equipment type to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mat => "mat",
            Self::Reformer => "reformer",
            Self::Both => "both",
        }
    }

    /// Returns whether access of this kind covers a class requiring `required`.
    ///
    /// `Both` covers every class. `Mat` and `Reformer` cover only classes with
    /// the same equipment, so a `Both` class needs `Both` access.
    #[must_use]
    pub const fn covers(&self, required: Self) -> bool {
        matches!(
            (self, required),
            (Self::Both, _) | (Self::Mat, Self::Mat) | (Self::Reformer, Self::Reformer)
        )
    }
}

impl FromStr for EquipmentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mat" => Ok(Self::Mat),
            "reformer" => Ok(Self::Reformer),
            "both" => Ok(Self::Both),
            _ => Err(DomainError::InvalidEnumValue {
                kind: "equipment type",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for EquipmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Class category, shared by classes and subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassCategory {
    /// Group classes.
    Group,
    /// Personal (private) sessions.
    Personal,
}

impl ClassCategory {
    /// Converts this category to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Personal => "personal",
        }
    }
}

impl FromStr for ClassCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "group" => Ok(Self::Group),
            "personal" => Ok(Self::Personal),
            _ => Err(DomainError::InvalidEnumValue {
                kind: "class category",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ClassCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a scheduled class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClassStatus {
    /// Open for booking.
    #[default]
    Active,
    /// Cancelled by the studio.
    Cancelled,
    /// Every seat is taken.
    Full,
}

impl ClassStatus {
    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
            Self::Full => "full",
        }
    }
}

impl FromStr for ClassStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "cancelled" => Ok(Self::Cancelled),
            "full" => Ok(Self::Full),
            _ => Err(DomainError::InvalidEnumValue {
                kind: "class status",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ClassStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Running normally.
    Active,
    /// Past its end date.
    Expired,
    /// Cancelled by the member; remaining credits stay usable until the end date.
    Cancelled,
    /// Temporarily suspended.
    Paused,
}

impl SubscriptionStatus {
    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
            Self::Paused => "paused",
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            "cancelled" => Ok(Self::Cancelled),
            "paused" => Ok(Self::Paused),
            _ => Err(DomainError::InvalidEnumValue {
                kind: "subscription status",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Holds a seat.
    Confirmed,
    /// Released its seat.
    Cancelled,
    /// Attended.
    Completed,
    /// Did not attend.
    NoShow,
}

impl BookingStatus {
    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
            Self::NoShow => "no_show",
        }
    }
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            "no_show" => Ok(Self::NoShow),
            _ => Err(DomainError::InvalidEnumValue {
                kind: "booking status",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The role an actor holds when invoking the engine.
///
/// Members act on their own bookings and are bound by the cancellation
/// window. Reception and admin staff act on behalf of any member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// A studio member acting for themself.
    Member,
    /// Front-desk staff.
    Reception,
    /// Studio administrator.
    Admin,
}

impl ActorRole {
    /// Converts this role to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Reception => "reception",
            Self::Admin => "admin",
        }
    }

    /// Returns whether this role is studio staff.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self, Self::Reception | Self::Admin)
    }
}

impl FromStr for ActorRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Self::Member),
            "reception" => Ok(Self::Reception),
            "admin" => Ok(Self::Admin),
            _ => Err(DomainError::InvalidEnumValue {
                kind: "actor role",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Remaining class credits on a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "remaining", rename_all = "snake_case")]
pub enum Credits {
    /// A finite number of classes.
    Limited(u32),
    /// No limit; debits and refunds are no-ops.
    Unlimited,
}

impl Credits {
    /// Builds credits from a plan's monthly class allotment.
    ///
    /// Allotments at or above [`UNLIMITED_ALLOTMENT_THRESHOLD`] become
    /// [`Credits::Unlimited`].
    #[must_use]
    pub const fn from_plan_allotment(monthly_classes: u32) -> Self {
        if monthly_classes >= UNLIMITED_ALLOTMENT_THRESHOLD {
            Self::Unlimited
        } else {
            Self::Limited(monthly_classes)
        }
    }

    /// Returns whether at least one class can be booked.
    #[must_use]
    pub const fn has_remaining(&self) -> bool {
        match self {
            Self::Limited(n) => *n > 0,
            Self::Unlimited => true,
        }
    }

    /// Returns whether these credits are unlimited.
    #[must_use]
    pub const fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }

    /// Removes one class.
    ///
    /// Returns `None` when no limited credit is left.
    #[must_use]
    pub const fn debit(self) -> Option<Self> {
        match self {
            Self::Limited(0) => None,
            Self::Limited(n) => Some(Self::Limited(n - 1)),
            Self::Unlimited => Some(Self::Unlimited),
        }
    }

    /// Returns one class.
    #[must_use]
    pub const fn refund(self) -> Self {
        match self {
            Self::Limited(n) => Self::Limited(n.saturating_add(1)),
            Self::Unlimited => Self::Unlimited,
        }
    }
}

impl std::fmt::Display for Credits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Limited(n) => write!(f, "{n}"),
            Self::Unlimited => write!(f, "unlimited"),
        }
    }
}
