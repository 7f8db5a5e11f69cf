//! Testing utilities for the Insta-Maintain workspace
//!
//! Shared fixtures for identities, uploads, deterministic triage and wired
//! services over an in-memory store.

#![allow(missing_docs)]

use maint_access::{AccessConfig, Role, RoleResolver};
use maint_core::{
    Actor, DashboardService, Identity, IssueLifecycle, MemoryStore, Reporter, ReportingService,
    RetryPolicy, SignInService, TransitionPolicy, UploadOutcome,
};
use maint_triage::{FixedSelector, Triage, TriageConfig};
use std::sync::Arc;

pub const ADMIN_EMAIL: &str = "admin@insta-maintain.com";
pub const PLUMBER_EMAIL: &str = "plumber1@resolve360.com";
pub const RESIDENT_EMAIL: &str = "resident@example.org";

pub fn resident_identity() -> Identity {
    Identity::new("resident-1", RESIDENT_EMAIL, "Riya Resident")
}

pub fn other_resident_identity() -> Identity {
    Identity::new("resident-2", "neighbour@example.org", "Nikhil Neighbour")
}

pub fn admin_identity() -> Identity {
    Identity::new("admin-1", ADMIN_EMAIL, "Asha Admin")
}

pub fn sample_reporter() -> Reporter {
    resident_identity().reporter()
}

pub fn admin_actor() -> Actor {
    Actor::new(ADMIN_EMAIL, Role::Admin)
}

pub fn contractor_actor(email: &str) -> Actor {
    Actor::new(email, Role::Contractor)
}

pub fn resident_actor() -> Actor {
    Actor::new(RESIDENT_EMAIL, Role::User)
}

pub fn upload_ok() -> UploadOutcome {
    UploadOutcome::Uploaded {
        url: "https://storage.example.org/issues/photo.jpg".to_string(),
    }
}

pub fn upload_failed() -> UploadOutcome {
    UploadOutcome::Failed {
        local_ref: "blob:local/photo-1".to_string(),
        reason: "network timeout".to_string(),
    }
}

/// Triage that always picks pool position `index` (clamped)
pub fn fixed_triage(index: usize) -> Triage {
    Triage::with_selector(TriageConfig::default(), Arc::new(FixedSelector(index)))
        .expect("default triage config is valid")
}

/// Allow-lists with one admin and the first plumber as contractor
pub fn test_access() -> AccessConfig {
    AccessConfig::empty()
        .with_admin(ADMIN_EMAIL)
        .with_contractor(PLUMBER_EMAIL)
}

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::default().with_base_delay(std::time::Duration::from_millis(1))
}

/// Services wired over one shared in-memory store
pub struct Desk {
    pub store: Arc<MemoryStore>,
    pub reporting: ReportingService<MemoryStore>,
    pub dashboards: DashboardService<MemoryStore>,
    pub sign_in: SignInService<MemoryStore>,
}

pub fn desk_with_policy(policy: TransitionPolicy) -> Desk {
    let store = Arc::new(MemoryStore::new());
    Desk {
        reporting: ReportingService::new(Arc::clone(&store), fixed_triage(0))
            .with_lifecycle(IssueLifecycle::new(policy))
            .with_retry(fast_retry()),
        dashboards: DashboardService::new(Arc::clone(&store)).with_retry(fast_retry()),
        sign_in: SignInService::new(Arc::clone(&store), RoleResolver::new(&test_access())),
        store,
    }
}

pub fn desk_with_memory_store() -> Desk {
    desk_with_policy(TransitionPolicy::Permissive)
}
