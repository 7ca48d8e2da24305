//! Declarative authorization policies.
//!
//! A route states what it requires as a [`Policy`] value and hands it to
//! [`authorize`] together with the verified claims. Owner ids are read
//! from the database per request by the caller; nothing here is cached.

use crate::errors::ApiError;
use crate::observability::metrics::record_authorization_decision;
use common::jwt::ClaimSet;
use common::types::Role;
use thiserror::Error;

/// Which roles a policy admits.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RoleRequirement {
    /// Any verified identity.
    Any,
    /// Only the listed roles. An empty list admits nobody.
    OneOf(Vec<Role>),
}

/// Role and ownership requirements for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    roles: RoleRequirement,
    owners: Vec<i64>,
}

impl Policy {
    /// Any verified identity, no ownership requirement.
    pub fn authenticated() -> Self {
        Self {
            roles: RoleRequirement::Any,
            owners: Vec::new(),
        }
    }

    /// Exactly `role`.
    pub fn role(role: Role) -> Self {
        Self::any_role(&[role])
    }

    /// Any of `roles`.
    pub fn any_role(roles: &[Role]) -> Self {
        Self {
            roles: RoleRequirement::OneOf(roles.to_vec()),
            owners: Vec::new(),
        }
    }

    /// Additionally require the subject to be `owner_id` (or an admin).
    ///
    /// May be called more than once; matching any listed owner satisfies
    /// the requirement.
    #[must_use]
    pub fn owned_by(mut self, owner_id: i64) -> Self {
        self.owners.push(owner_id);
        self
    }
}

/// Why a request was denied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("Role {provided} is not permitted; requires {}", describe_roles(.required))]
    RoleNotPermitted { required: Vec<Role>, provided: Role },

    #[error("Only the owner or an admin may perform this action")]
    NotOwner,
}

impl Denial {
    /// Bounded label for metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Denial::RoleNotPermitted { .. } => "role_not_permitted",
            Denial::NotOwner => "not_owner",
        }
    }
}

impl From<Denial> for ApiError {
    fn from(denial: Denial) -> Self {
        ApiError::Forbidden(denial.to_string())
    }
}

fn describe_roles(roles: &[Role]) -> String {
    if roles.is_empty() {
        return "no role".to_string();
    }
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Decide whether `claims` satisfy `policy`.
///
/// The role check runs first, then ownership. Admins always satisfy
/// ownership but not a role list that omits `admin`.
///
/// # Errors
///
/// Returns the [`Denial`] for the first requirement that fails.
pub fn authorize(claims: &ClaimSet, policy: &Policy) -> Result<(), Denial> {
    let decision = evaluate(claims, policy);

    match &decision {
        Ok(()) => record_authorization_decision("allow", "none"),
        Err(denial) => {
            tracing::debug!(
                target: "zameen.auth.policy",
                role = %claims.role,
                reason = denial.as_str(),
                "Authorization denied"
            );
            record_authorization_decision("deny", denial.as_str());
        }
    }

    decision
}

fn evaluate(claims: &ClaimSet, policy: &Policy) -> Result<(), Denial> {
    if let RoleRequirement::OneOf(required) = &policy.roles {
        if !required.contains(&claims.role) {
            return Err(Denial::RoleNotPermitted {
                required: required.clone(),
                provided: claims.role,
            });
        }
    }

    if !policy.owners.is_empty()
        && !claims.role.is_admin()
        && !policy.owners.contains(&claims.user_id)
    {
        return Err(Denial::NotOwner);
    }

    Ok(())
}
