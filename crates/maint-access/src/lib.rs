//! Insta-Maintain access control
//!
//! Maps an authenticated email to a [`Role`] through injected allow-lists and
//! reconciles stored roles on every sign-in.
//!
//! # Example
//!
//! ```rust
//! use maint_access::{AccessConfig, Role, RoleResolver};
//!
//! let resolver = RoleResolver::new(&AccessConfig::default());
//! assert_eq!(resolver.resolve_role("Admin@Insta-Maintain.com"), Role::Admin);
//! assert_eq!(resolver.resolve_role("someone@example.org"), Role::User);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod resolver;
mod role;

pub use resolver::{normalize_email, AccessConfig, RoleResolver};
pub use role::{reconcile_role, ParseRoleError, Role, RoleReconciliation};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
