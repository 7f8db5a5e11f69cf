//! Allow-list role resolution
//!
//! [`AccessConfig`] is the serializable form of the allow-lists;
//! [`RoleResolver`] is the normalized, immutable in-memory form built from it.

use crate::role::Role;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Allow-list configuration
///
/// Emails are matched case-insensitively. Any email absent from both lists
/// resolves to [`Role::User`].
///
/// A list missing from a config file is empty; a missing section falls back
/// to the built-in lists of [`AccessConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Administrator emails
    #[serde(default)]
    pub admin: Vec<String>,
    /// Contractor emails
    #[serde(default)]
    pub contractor: Vec<String>,
}

impl AccessConfig {
    /// Empty allow-lists (everyone resolves to `user`)
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self {
            admin: Vec::new(),
            contractor: Vec::new(),
        }
    }

    /// With an extra admin email
    #[inline]
    #[must_use]
    pub fn with_admin(mut self, email: impl Into<String>) -> Self {
        self.admin.push(email.into());
        self
    }

    /// With an extra contractor email
    #[inline]
    #[must_use]
    pub fn with_contractor(mut self, email: impl Into<String>) -> Self {
        self.contractor.push(email.into());
        self
    }

    /// Emails present in both lists (admin wins for these)
    #[must_use]
    pub fn overlap(&self) -> Vec<String> {
        let admins: IndexSet<String> = self.admin.iter().map(|e| normalize_email(e)).collect();
        self.contractor
            .iter()
            .map(|e| normalize_email(e))
            .filter(|e| admins.contains(e))
            .collect()
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        let admin = [
            "siddharthpaladugula@gmail.com",
            "samhithbade44@gmail.com",
            "aenreddy.souchithreddy@gmail.com",
            "admin@insta-maintain.com",
            "manager@insta-maintain.com",
            "supervisor@insta-maintain.com",
        ];
        let contractor = [
            "siddharthsleeps@gmail.com",
            "24071a6760@vnrvjiet.in",
            "electrician1@resolve360.com",
            "electrician2@resolve360.com",
            "contractor1@resolve360.com",
            "contractor2@resolve360.com",
            "maintenance1@resolve360.com",
            "maintenance2@resolve360.com",
            "hvac1@resolve360.com",
            "hvac2@resolve360.com",
            "plumber1@insta-maintain.com",
            "plumber2@insta-maintain.com",
            "electrician1@insta-maintain.com",
            "electrician2@insta-maintain.com",
            "contractor1@insta-maintain.com",
            "contractor2@insta-maintain.com",
            "maintenance1@insta-maintain.com",
            "maintenance2@insta-maintain.com",
            "hvac1@insta-maintain.com",
            "hvac2@insta-maintain.com",
        ];
        Self {
            admin: admin.iter().map(|s| (*s).to_string()).collect(),
            contractor: contractor.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

/// Normalize an email for allow-list comparison
#[inline]
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Resolves emails to roles from immutable allow-lists
#[derive(Debug, Clone)]
pub struct RoleResolver {
    admins: IndexSet<String>,
    contractors: IndexSet<String>,
}

impl RoleResolver {
    /// Build a resolver from configuration
    #[must_use]
    pub fn new(config: &AccessConfig) -> Self {
        let overlap = config.overlap();
        if !overlap.is_empty() {
            tracing::warn!(
                emails = ?overlap,
                "allow-list overlap, admin takes precedence"
            );
        }

        Self {
            admins: config.admin.iter().map(|e| normalize_email(e)).collect(),
            contractors: config
                .contractor
                .iter()
                .map(|e| normalize_email(e))
                .collect(),
        }
    }

    /// Resolve the role for an email.
    ///
    /// Checks the admin list first, then the contractor list; everything else
    /// is [`Role::User`].
    #[must_use]
    pub fn resolve_role(&self, email: &str) -> Role {
        let email = normalize_email(email);
        if self.admins.contains(&email) {
            Role::Admin
        } else if self.contractors.contains(&email) {
            Role::Contractor
        } else {
            Role::User
        }
    }

    /// Whether the email is on the allow-list of `role`.
    ///
    /// `user` has no allow-list, so this is always `false` for it; callers
    /// treat residents as authorized by default.
    #[must_use]
    pub fn is_authorized(&self, email: &str, role: Role) -> bool {
        let email = normalize_email(email);
        match role {
            Role::Admin => self.admins.contains(&email),
            Role::Contractor => self.contractors.contains(&email),
            Role::User => false,
        }
    }

    /// Number of admin entries
    #[inline]
    #[must_use]
    pub fn admin_count(&self) -> usize {
        self.admins.len()
    }

    /// Number of contractor entries
    #[inline]
    #[must_use]
    pub fn contractor_count(&self) -> usize {
        self.contractors.len()
    }
}

impl Default for RoleResolver {
    fn default() -> Self {
        Self::new(&AccessConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_builtin_admin() {
        let resolver = RoleResolver::default();
        assert_eq!(resolver.resolve_role("admin@insta-maintain.com"), Role::Admin);
        assert_eq!(resolver.resolve_role("Admin@Insta-Maintain.COM"), Role::Admin);
    }

    #[test]
    fn resolves_builtin_contractor() {
        let resolver = RoleResolver::default();
        assert_eq!(
            resolver.resolve_role("hvac1@resolve360.com"),
            Role::Contractor
        );
    }

    #[test]
    fn unknown_email_is_user() {
        let resolver = RoleResolver::default();
        assert_eq!(resolver.resolve_role("resident@example.org"), Role::User);
        assert_eq!(resolver.resolve_role(""), Role::User);
    }

    #[test]
    fn admin_wins_on_overlap() {
        let config = AccessConfig::empty()
            .with_admin("both@example.org")
            .with_contractor("BOTH@example.org");
        assert_eq!(config.overlap(), vec!["both@example.org".to_string()]);

        let resolver = RoleResolver::new(&config);
        assert_eq!(resolver.resolve_role("both@example.org"), Role::Admin);
        assert!(resolver.is_authorized("both@example.org", Role::Contractor));
    }

    #[test]
    fn is_authorized_never_true_for_user() {
        let resolver = RoleResolver::default();
        assert!(!resolver.is_authorized("resident@example.org", Role::User));
        assert!(!resolver.is_authorized("admin@insta-maintain.com", Role::User));
    }

    #[test]
    fn is_authorized_checks_own_list_only() {
        let resolver = RoleResolver::default();
        assert!(resolver.is_authorized("ADMIN@insta-maintain.com", Role::Admin));
        assert!(!resolver.is_authorized("admin@insta-maintain.com", Role::Contractor));
    }

    #[test]
    fn config_deserializes_with_missing_lists() {
        let config: AccessConfig = serde_json::from_str(r#"{"admin": ["a@x.com"]}"#).unwrap();
        assert_eq!(config.admin, vec!["a@x.com".to_string()]);
        assert!(config.contractor.is_empty());
    }
}
