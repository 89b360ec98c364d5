// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.
//!
//! Identity is established outside this crate. The stub authenticator only
//! checks that the claimed identity is well formed; the authorization
//! service then decides what that identity may do.

use studio_booking::Requester;
use studio_booking_audit::Actor;
use studio_booking_domain::ActorRole;

use crate::error::AuthError;

/// An authenticated actor with an associated role.
///
/// Members carry the user id they act as. Staff accounts (reception and
/// admin) may act on any member's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The role assigned to this actor.
    pub role: ActorRole,
    /// The member this actor is, when the role is `Member`.
    pub user_id: Option<i64>,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `role` - The role assigned to this actor
    /// * `user_id` - The member id, for member actors
    #[must_use]
    pub const fn new(id: String, role: ActorRole, user_id: Option<i64>) -> Self {
        Self { id, role, user_id }
    }

    /// Converts this authenticated actor into an audit Actor.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.role.as_str().to_string())
    }

    /// The requester the engine checks ownership and windows against.
    #[must_use]
    pub const fn to_requester(&self) -> Requester {
        match (self.role, self.user_id) {
            (ActorRole::Member, Some(user_id)) => Requester::member(user_id),
            (role, _) => Requester {
                role,
                user_id: None,
            },
        }
    }
}

/// Stub authentication function.
///
/// This does NOT implement real authentication. It accepts any non-empty
/// actor id and requires members to name the user they act as.
///
/// # Arguments
///
/// * `actor_id` - The identifier of the actor to authenticate
/// * `role` - The role to assign to the actor
/// * `user_id` - The member id, required for members
///
/// # Errors
///
/// Returns an error if:
/// - The actor id is empty
/// - A member actor has no user id
pub fn authenticate_stub(
    actor_id: String,
    role: ActorRole,
    user_id: Option<i64>,
) -> Result<AuthenticatedActor, AuthError> {
    if actor_id.trim().is_empty() {
        return Err(AuthError::AuthenticationFailed {
            reason: String::from("Actor ID cannot be empty"),
        });
    }
    if role == ActorRole::Member && user_id.is_none() {
        return Err(AuthError::AuthenticationFailed {
            reason: String::from("Member actors must carry a user_id"),
        });
    }
    Ok(AuthenticatedActor::new(actor_id, role, user_id))
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that the actor is reception or admin.
    ///
    /// # Arguments
    ///
    /// * `actor` - The authenticated actor
    /// * `action` - The action name reported on failure
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is a member.
    pub fn authorize_staff_action(
        actor: &AuthenticatedActor,
        action: &str,
    ) -> Result<(), AuthError> {
        if actor.role.is_staff() {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("reception or admin"),
            })
        }
    }

    /// Checks that the actor may act for `user_id`.
    ///
    /// Members may only act for themselves; staff may act for anyone.
    ///
    /// # Errors
    ///
    /// Returns an error if a member names a different user.
    pub fn authorize_for_user(
        actor: &AuthenticatedActor,
        user_id: i64,
        action: &str,
    ) -> Result<(), AuthError> {
        if actor.role.is_staff() || actor.user_id == Some(user_id) {
            Ok(())
        } else {
            Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("reception or admin"),
            })
        }
    }
}
