//! Insta-Maintain core
//!
//! Issue reporting, lifecycle transitions, role dashboards and sign-in
//! reconciliation over an async persistence boundary.
//!
//! # Core Concepts
//!
//! - [`ReportingService`]: triage, persist, update status, correct category
//! - [`SignInService`]: role resolution and reconciliation per sign-in
//! - [`DashboardService`]: role-selected queries, filters and statistics
//! - [`IssueStore`] / [`UserStore`]: persistence traits, [`MemoryStore`]
//! - [`AppConfig`]: allow-lists, triage tables, retry and lifecycle policy
//!
//! # Example
//!
//! ```rust
//! use maint_core::prelude::*;
//! use std::sync::Arc;
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! runtime.block_on(async {
//!     let store = Arc::new(MemoryStore::new());
//!     let reporting = ReportingService::new(store, Triage::default());
//!     let reporter = Identity::new("uid-1", "resident@example.org", "Resident").reporter();
//!
//!     let receipt = reporting
//!         .report_issue(
//!             reporter,
//!             UploadOutcome::Uploaded { url: "https://img.example.org/1.jpg".into() },
//!             "water leaking from the pipe under the sink",
//!         )
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(receipt.issue.category, Category::Plumbing);
//!     assert_eq!(receipt.issue.status, IssueStatus::Open);
//! });
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod dashboard;
pub mod error;
pub mod lifecycle;
pub mod reporting;
pub mod retry;
pub mod signin;
pub mod store;
pub mod types;

pub use config::AppConfig;
pub use dashboard::{
    Dashboard, DashboardService, DashboardView, IssueFilter, IssueStatistics, UserFilter,
};
pub use error::{
    ConfigError, LifecycleError, MaintError, Result, StoreError, StoreErrorKind, ValidationError,
};
pub use lifecycle::{allowed_transitions, Actor, IssueLifecycle, Transition, TransitionPolicy};
pub use reporting::{ReportReceipt, ReportingService, StatusChange};
pub use retry::{retry_transient, RetryPolicy};
pub use signin::{SignIn, SignInService};
pub use store::{IssueStore, MemoryStore, UserStore};
pub use types::{
    Identity, ImageRef, Issue, IssueId, IssuePatch, IssueStatus, NewIssue, NewUser, Reporter,
    UploadOutcome, UserId, UserProfile,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::dashboard::{Dashboard, DashboardService, IssueFilter, IssueStatistics};
    pub use crate::error::{MaintError, Result, StoreError, StoreErrorKind};
    pub use crate::lifecycle::{Actor, IssueLifecycle, TransitionPolicy};
    pub use crate::reporting::ReportingService;
    pub use crate::retry::RetryPolicy;
    pub use crate::signin::SignInService;
    pub use crate::store::{IssueStore, MemoryStore, UserStore};
    pub use crate::types::{Identity, Issue, IssueId, IssueStatus, UploadOutcome, UserId};
    pub use maint_access::{AccessConfig, Role, RoleResolver};
    pub use maint_triage::{Category, Priority, Triage};
}
