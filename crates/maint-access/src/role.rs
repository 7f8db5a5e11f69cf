//! Roles and role reconciliation
//!
//! A [`Role`] decides which dashboard a signed-in person may open and which
//! lifecycle operations they may perform.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access role of a signed-in person
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Resident reporting issues (default for unknown emails)
    User,
    /// Contractor working assigned issues
    Contractor,
    /// Administrator with access to every issue
    Admin,
}

impl Role {
    /// All roles, lowest privilege first
    pub const ALL: [Role; 3] = [Role::User, Role::Contractor, Role::Admin];

    /// Stable lower-case name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Contractor => "contractor",
            Role::Admin => "admin",
        }
    }

    /// Human-facing title used in greetings
    #[inline]
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Role::User => "Resident",
            Role::Contractor => "Technician",
            Role::Admin => "Administrator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" | "resident" => Ok(Role::User),
            "contractor" | "technician" => Ok(Role::Contractor),
            "admin" | "administrator" => Ok(Role::Admin),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

/// Outcome of comparing a stored role against a freshly resolved one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RoleReconciliation {
    /// No profile existed; the resolved role is stored with a new profile
    Created(Role),
    /// Stored role already matches
    Unchanged(Role),
    /// Stored role differs and is overwritten
    Changed {
        /// Previously stored role
        from: Role,
        /// Role derived from the allow-lists
        to: Role,
    },
}

impl RoleReconciliation {
    /// Role in effect after reconciliation
    #[inline]
    #[must_use]
    pub fn effective(&self) -> Role {
        match *self {
            Self::Created(role) | Self::Unchanged(role) => role,
            Self::Changed { to, .. } => to,
        }
    }

    /// Whether the stored profile must be written
    #[inline]
    #[must_use]
    pub fn requires_write(&self) -> bool {
        !matches!(self, Self::Unchanged(_))
    }
}

/// Reconcile a stored role with the allow-list derived role.
///
/// The allow-lists are authoritative: a differing stored role is always
/// replaced, so revoking or granting an email takes effect on next sign-in.
#[must_use]
pub fn reconcile_role(stored: Option<Role>, resolved: Role) -> RoleReconciliation {
    match stored {
        None => RoleReconciliation::Created(resolved),
        Some(current) if current == resolved => RoleReconciliation::Unchanged(current),
        Some(current) => RoleReconciliation::Changed {
            from: current,
            to: resolved,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert_eq!(" Admin ".parse::<Role>().unwrap(), Role::Admin);
        assert!("janitor".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Contractor).unwrap();
        assert_eq!(json, "\"contractor\"");
    }

    #[test]
    fn reconcile_first_sign_in() {
        let r = reconcile_role(None, Role::User);
        assert_eq!(r, RoleReconciliation::Created(Role::User));
        assert!(r.requires_write());
    }

    #[test]
    fn reconcile_unchanged() {
        let r = reconcile_role(Some(Role::Admin), Role::Admin);
        assert!(!r.requires_write());
        assert_eq!(r.effective(), Role::Admin);
    }

    #[test]
    fn reconcile_revoked_contractor() {
        let r = reconcile_role(Some(Role::Contractor), Role::User);
        assert_eq!(
            r,
            RoleReconciliation::Changed {
                from: Role::Contractor,
                to: Role::User
            }
        );
        assert_eq!(r.effective(), Role::User);
    }
}
