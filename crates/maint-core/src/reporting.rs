//! Issue reporting and lifecycle service
//!
//! Runs one triage pass per report (classification and contractor from the
//! same pass), persists the issue as Open, and applies status changes and
//! admin corrections through the store.

use crate::error::{LifecycleError, MaintError, Result};
use crate::lifecycle::{Actor, IssueLifecycle, Transition};
use crate::retry::{retry_transient, RetryPolicy};
use crate::store::IssueStore;
use crate::types::{
    Issue, IssueId, IssuePatch, IssueStatus, NewIssue, Reporter, UploadOutcome, UserId,
};
use maint_access::Role;
use maint_triage::{Category, Classification, Triage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result of a successful report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportReceipt {
    /// Persisted issue
    pub issue: Issue,
    /// Classification that produced category, priority and confidence
    pub classification: Classification,
}

/// Result of a status request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Issue after the request
    pub issue: Issue,
    /// What happened
    pub transition: Transition,
}

/// Reporting, status updates and classification corrections
#[derive(Debug)]
pub struct ReportingService<S: IssueStore + ?Sized> {
    store: Arc<S>,
    triage: Triage,
    lifecycle: IssueLifecycle,
    retry: RetryPolicy,
}

impl<S: IssueStore + ?Sized> ReportingService<S> {
    /// Create with the permissive lifecycle and default retry policy
    #[must_use]
    pub fn new(store: Arc<S>, triage: Triage) -> Self {
        Self {
            store,
            triage,
            lifecycle: IssueLifecycle::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// With lifecycle rules
    #[must_use]
    pub fn with_lifecycle(mut self, lifecycle: IssueLifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// With a retry policy for resident reads
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Triage in use
    #[inline]
    #[must_use]
    pub fn triage(&self) -> &Triage {
        &self.triage
    }

    /// Lifecycle rules in use
    #[inline]
    #[must_use]
    pub fn lifecycle(&self) -> &IssueLifecycle {
        &self.lifecycle
    }

    /// Report a new issue.
    ///
    /// # Workflow
    /// 1. Classify the description and assign a contractor in one pass
    /// 2. Validate the draft (owner, image reference)
    /// 3. Persist as Open
    ///
    /// A failed upload is not an error: the local reference is stored with
    /// `upload_success = false`. A failed write discards the classification;
    /// callers retry the whole report.
    ///
    /// # Errors
    /// Validation or store failures, named `submit issue`.
    pub async fn report_issue(
        &self,
        reporter: Reporter,
        upload: UploadOutcome,
        description: &str,
    ) -> Result<ReportReceipt> {
        let outcome = self.triage.triage(description);
        let classification = outcome.classification.clone();
        let draft = NewIssue::from_triage(reporter, &upload, description, outcome);
        draft
            .validate()
            .map_err(|e| MaintError::from(e).during("submit issue"))?;

        if let UploadOutcome::Failed { reason, .. } = &upload {
            tracing::warn!(
                reporter = %draft.reporter.email,
                reason = %reason,
                "image upload failed, storing local reference"
            );
        }

        let issue = self
            .store
            .create_issue(draft)
            .await
            .map_err(|e| MaintError::from(e).during("submit issue"))?;

        tracing::info!(
            issue = %issue.id,
            category = %issue.category,
            priority = %issue.priority,
            contractor = %issue.assigned_contractor,
            confidence = issue.confidence,
            "issue reported"
        );

        Ok(ReportReceipt {
            issue,
            classification,
        })
    }

    /// A resident's own issues, newest first, retrying transient errors.
    ///
    /// # Errors
    /// Store failures after retries, named `load issues`.
    pub async fn resident_issues(&self, owner: &UserId) -> Result<Vec<Issue>> {
        retry_transient(&self.retry, "load resident issues", || {
            self.store.issues_by_owner(owner)
        })
        .await
        .map_err(|e| MaintError::from(e).during("load issues"))
    }

    /// Refresh the resident's list after a report.
    ///
    /// The issue was already written, so exhausting retries only logs a
    /// warning and yields `None`.
    pub async fn refresh_after_report(&self, owner: &UserId) -> Option<Vec<Issue>> {
        match self.resident_issues(owner).await {
            Ok(issues) => Some(issues),
            Err(err) => {
                tracing::warn!(
                    owner = %owner,
                    error = %err,
                    "could not refresh issues after report"
                );
                None
            }
        }
    }

    /// Move an issue to a new status.
    ///
    /// Requesting the current status writes nothing.
    ///
    /// # Errors
    /// `IssueNotFound`, `Forbidden`, `IllegalTransition` or store failures,
    /// named `update status`.
    pub async fn update_status(
        &self,
        actor: &Actor,
        id: IssueId,
        to: IssueStatus,
    ) -> Result<StatusChange> {
        self.apply_status(actor, id, to)
            .await
            .map_err(|e| e.during("update status"))
    }

    async fn apply_status(
        &self,
        actor: &Actor,
        id: IssueId,
        to: IssueStatus,
    ) -> Result<StatusChange> {
        let issue = self.load_issue(id).await?;
        self.lifecycle.authorize(actor, &issue)?;
        let transition = self.lifecycle.plan(issue.status, to)?;

        if !transition.requires_write() {
            tracing::debug!(issue = %id, status = %to, "status unchanged");
            return Ok(StatusChange { issue, transition });
        }

        let from = issue.status;
        let issue = self.store.update_issue(id, IssuePatch::status(to)).await?;
        tracing::info!(issue = %id, %from, %to, actor = %actor.email, "status updated");
        Ok(StatusChange { issue, transition })
    }

    /// Correct the category of an issue (admins only).
    ///
    /// Priority is taken from the category table, a contractor is drawn
    /// from the new category's pool, and confidence becomes 1.0. Correcting
    /// to the current category writes nothing.
    ///
    /// # Errors
    /// `Forbidden` for non-admins, `IssueNotFound` or store failures, named
    /// `correct category`.
    pub async fn correct_category(
        &self,
        actor: &Actor,
        id: IssueId,
        category: Category,
    ) -> Result<Issue> {
        self.apply_correction(actor, id, category)
            .await
            .map_err(|e| e.during("correct category"))
    }

    async fn apply_correction(
        &self,
        actor: &Actor,
        id: IssueId,
        category: Category,
    ) -> Result<Issue> {
        if actor.role != Role::Admin {
            return Err(LifecycleError::Forbidden {
                actor: actor.email.clone(),
                issue: id,
            }
            .into());
        }

        let issue = self.load_issue(id).await?;
        if issue.category == category {
            return Ok(issue);
        }

        let priority = self.triage.classifier().table().profile(category).priority;
        let contractor = self.triage.assigner().assign(category);
        let patch = IssuePatch::corrected(category, priority, contractor);
        let updated = self.store.update_issue(id, patch).await?;

        tracing::info!(
            issue = %id,
            from = %issue.category,
            to = %category,
            contractor = %updated.assigned_contractor,
            "category corrected"
        );
        Ok(updated)
    }

    async fn load_issue(&self, id: IssueId) -> Result<Issue> {
        self.store
            .get_issue(id)
            .await?
            .ok_or_else(|| LifecycleError::IssueNotFound(id).into())
    }
}
