//! Role dashboards
//!
//! Which dashboard a role lands on, which store query feeds it, filtering
//! of the loaded issues and summary statistics.

use crate::error::{MaintError, Result, StoreError};
use crate::retry::{retry_transient, RetryPolicy};
use crate::store::IssueStore;
use crate::types::{Issue, IssueStatus, UserProfile};
use indexmap::IndexMap;
use maint_access::Role;
use maint_triage::{Category, ContractorId, Priority};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Role-specific view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dashboard {
    /// Own issues and reporting
    Resident,
    /// Assigned work
    Contractor,
    /// Every issue, users and statistics
    Admin,
}

impl Dashboard {
    /// Landing dashboard of a role
    #[inline]
    #[must_use]
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::User => Dashboard::Resident,
            Role::Contractor => Dashboard::Contractor,
            Role::Admin => Dashboard::Admin,
        }
    }

    /// Role allowed to open this dashboard; access is an exact match
    #[inline]
    #[must_use]
    pub fn required_role(&self) -> Role {
        match self {
            Dashboard::Resident => Role::User,
            Dashboard::Contractor => Role::Contractor,
            Dashboard::Admin => Role::Admin,
        }
    }

    /// Whether `role` may open this dashboard
    #[inline]
    #[must_use]
    pub fn permits(&self, role: Role) -> bool {
        self.required_role() == role
    }

    /// Display name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Dashboard::Resident => "resident",
            Dashboard::Contractor => "contractor",
            Dashboard::Admin => "admin",
        }
    }
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status and free-text filter over loaded issues
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueFilter {
    /// Only this status
    pub status: Option<IssueStatus>,
    /// Case-insensitive text over description, category and reporter name
    pub search: Option<String>,
}

impl IssueFilter {
    /// Match everything
    #[inline]
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// With a status
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: IssueStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// With a search term
    #[inline]
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Whether an issue passes
    #[must_use]
    pub fn matches(&self, issue: &Issue) -> bool {
        if self.status.is_some_and(|status| status != issue.status) {
            return false;
        }
        let needle = match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => needle.to_lowercase(),
            _ => return true,
        };
        issue
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
            || issue.category.as_str().to_lowercase().contains(&needle)
            || issue.reporter.display_name.to_lowercase().contains(&needle)
    }

    /// Keep passing issues, preserving order
    #[must_use]
    pub fn apply(&self, issues: Vec<Issue>) -> Vec<Issue> {
        issues.into_iter().filter(|issue| self.matches(issue)).collect()
    }
}

/// Role and free-text filter over user profiles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFilter {
    /// Only this role
    pub role: Option<Role>,
    /// Case-insensitive text over display name, email and role
    pub search: Option<String>,
}

impl UserFilter {
    /// With a role
    #[inline]
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// With a search term
    #[inline]
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Whether a profile passes
    #[must_use]
    pub fn matches(&self, user: &UserProfile) -> bool {
        if self.role.is_some_and(|role| role != user.role) {
            return false;
        }
        let needle = match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => needle.to_lowercase(),
            _ => return true,
        };
        user.display_name.to_lowercase().contains(&needle)
            || user.email.to_lowercase().contains(&needle)
            || user.role.as_str().contains(&needle)
    }
}

/// Summary counts over a set of issues
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueStatistics {
    /// All issues
    pub total: usize,
    /// Open issues
    pub open: usize,
    /// Assigned issues
    pub assigned: usize,
    /// Resolved issues
    pub resolved: usize,
    /// Count per category, in first-seen order
    pub by_category: IndexMap<Category, usize>,
    /// Count per priority; every priority is present
    pub by_priority: IndexMap<Priority, usize>,
}

impl Default for IssueStatistics {
    fn default() -> Self {
        Self {
            total: 0,
            open: 0,
            assigned: 0,
            resolved: 0,
            by_category: IndexMap::new(),
            by_priority: Priority::ALL.into_iter().map(|p| (p, 0)).collect(),
        }
    }
}

impl IssueStatistics {
    /// Count issues
    #[must_use]
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut stats = Self::default();
        for issue in issues {
            stats.total += 1;
            match issue.status {
                IssueStatus::Open => stats.open += 1,
                IssueStatus::Assigned => stats.assigned += 1,
                IssueStatus::Resolved => stats.resolved += 1,
            }
            *stats.by_category.entry(issue.category).or_insert(0) += 1;
            *stats.by_priority.entry(issue.priority).or_insert(0) += 1;
        }
        stats
    }
}

/// Loaded dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    /// Which dashboard
    pub dashboard: Dashboard,
    /// Issues after filtering, newest first
    pub issues: Vec<Issue>,
    /// Statistics over everything the viewer can see, before filtering
    pub statistics: IssueStatistics,
}

/// Loads dashboards from the issue store
#[derive(Debug)]
pub struct DashboardService<S: IssueStore + ?Sized> {
    store: Arc<S>,
    retry: RetryPolicy,
}

impl<S: IssueStore + ?Sized> DashboardService<S> {
    /// Create with the default retry policy
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            retry: RetryPolicy::default(),
        }
    }

    /// With a retry policy for resident reads
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Load the viewer's landing dashboard.
    ///
    /// Residents see their own issues (read with retry), contractors the
    /// issues assigned to their email, admins every issue. An admin status
    /// filter is pushed down to the store query.
    ///
    /// # Errors
    /// Store failures, named `load dashboard`.
    pub async fn load(&self, viewer: &UserProfile, filter: &IssueFilter) -> Result<DashboardView> {
        let dashboard = Dashboard::for_role(viewer.role);
        let issues = self
            .query(viewer, filter)
            .await
            .map_err(|e| MaintError::from(e).during("load dashboard"))?;

        let statistics = IssueStatistics::from_issues(&issues);
        let issues = filter.apply(issues);
        tracing::debug!(
            %dashboard,
            viewer = %viewer.email,
            shown = issues.len(),
            "dashboard loaded"
        );

        Ok(DashboardView {
            dashboard,
            issues,
            statistics,
        })
    }

    /// Open a specific dashboard, enforcing the exact-role guard.
    ///
    /// # Errors
    /// `DashboardDenied` when the viewer's role does not match, otherwise as
    /// [`Self::load`].
    pub async fn open(
        &self,
        viewer: &UserProfile,
        dashboard: Dashboard,
        filter: &IssueFilter,
    ) -> Result<DashboardView> {
        if !dashboard.permits(viewer.role) {
            tracing::warn!(%dashboard, role = %viewer.role, "dashboard access denied");
            return Err(MaintError::DashboardDenied {
                dashboard,
                role: viewer.role,
            });
        }
        self.load(viewer, filter).await
    }

    /// Statistics over every issue.
    ///
    /// # Errors
    /// Store failures, named `load statistics`.
    pub async fn statistics(&self) -> Result<IssueStatistics> {
        let issues = self
            .store
            .all_issues()
            .await
            .map_err(|e| MaintError::from(e).during("load statistics"))?;
        Ok(IssueStatistics::from_issues(&issues))
    }

    async fn query(
        &self,
        viewer: &UserProfile,
        filter: &IssueFilter,
    ) -> std::result::Result<Vec<Issue>, StoreError> {
        match viewer.role {
            Role::User => {
                retry_transient(&self.retry, "load resident issues", || {
                    self.store.issues_by_owner(&viewer.id)
                })
                .await
            }
            Role::Contractor => {
                let contractor = ContractorId::new(viewer.email.clone());
                self.store.issues_by_contractor(&contractor).await
            }
            Role::Admin => match filter.status {
                Some(status) => self.store.issues_by_status(status).await,
                None => self.store.all_issues().await,
            },
        }
    }
}
