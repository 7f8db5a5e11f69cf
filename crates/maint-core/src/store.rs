//! Persistence boundary
//!
//! Async traits for issue and user records plus [`MemoryStore`], an
//! in-process implementation backing tests and the operator binary.
//!
//! Listings are sorted by creation time, newest first.

use crate::error::{StoreError, StoreErrorKind};
use crate::types::{
    Issue, IssueId, IssuePatch, IssueStatus, NewIssue, NewUser, UserId, UserProfile,
};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use maint_access::Role;
use maint_triage::ContractorId;
use std::sync::atomic::{AtomicU64, Ordering};

/// Issue persistence
#[async_trait]
pub trait IssueStore: Send + Sync {
    /// Persist a new issue. Status is always Open; id and timestamps are
    /// assigned by the store.
    async fn create_issue(&self, draft: NewIssue) -> Result<Issue, StoreError>;

    /// Merge a partial update and refresh `updated_at`
    async fn update_issue(&self, id: IssueId, patch: IssuePatch) -> Result<Issue, StoreError>;

    /// Fetch one issue
    async fn get_issue(&self, id: IssueId) -> Result<Option<Issue>, StoreError>;

    /// Issues reported by one resident
    async fn issues_by_owner(&self, owner: &UserId) -> Result<Vec<Issue>, StoreError>;

    /// Every issue
    async fn all_issues(&self) -> Result<Vec<Issue>, StoreError>;

    /// Issues in one status
    async fn issues_by_status(&self, status: IssueStatus) -> Result<Vec<Issue>, StoreError>;

    /// Issues assigned to one contractor
    async fn issues_by_contractor(
        &self,
        contractor: &ContractorId,
    ) -> Result<Vec<Issue>, StoreError>;
}

/// User profile persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch one profile
    async fn get_user(&self, id: &UserId) -> Result<Option<UserProfile>, StoreError>;

    /// Create (or replace) a profile
    async fn create_user(&self, user: NewUser) -> Result<UserProfile, StoreError>;

    /// Overwrite the stored role and set `updated_at`
    async fn update_user_role(&self, id: &UserId, role: Role) -> Result<UserProfile, StoreError>;

    /// Every profile
    async fn all_users(&self) -> Result<Vec<UserProfile>, StoreError>;

    /// Profiles with one role
    async fn users_by_role(&self, role: Role) -> Result<Vec<UserProfile>, StoreError>;
}

#[derive(Debug, Clone)]
struct StoredIssue {
    seq: u64,
    issue: Issue,
}

/// In-memory store for both issues and users
#[derive(Debug, Default)]
pub struct MemoryStore {
    issues: DashMap<IssueId, StoredIssue>,
    users: DashMap<UserId, UserProfile>,
    next_seq: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored issues
    #[inline]
    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    /// Number of stored profiles
    #[inline]
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    fn collect_issues(&self, keep: impl Fn(&Issue) -> bool) -> Vec<Issue> {
        let mut entries: Vec<StoredIssue> = self
            .issues
            .iter()
            .filter(|entry| keep(&entry.issue))
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by(|a, b| {
            b.issue
                .created_at
                .cmp(&a.issue.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        entries.into_iter().map(|entry| entry.issue).collect()
    }

    fn collect_users(&self, keep: impl Fn(&UserProfile) -> bool) -> Vec<UserProfile> {
        let mut users: Vec<UserProfile> = self
            .users
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        users
    }
}

#[async_trait]
impl IssueStore for MemoryStore {
    async fn create_issue(&self, draft: NewIssue) -> Result<Issue, StoreError> {
        draft
            .validate()
            .map_err(|e| StoreError::new(StoreErrorKind::Invalid, e.to_string()))?;

        if let Some(requested) = draft.requested_status {
            if requested != IssueStatus::Open {
                tracing::debug!(%requested, "ignoring requested status at creation");
            }
        }

        let issue = draft.into_issue(IssueId::new(), Utc::now());
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.issues.insert(
            issue.id,
            StoredIssue {
                seq,
                issue: issue.clone(),
            },
        );
        Ok(issue)
    }

    async fn update_issue(&self, id: IssueId, patch: IssuePatch) -> Result<Issue, StoreError> {
        let mut entry = self
            .issues
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(format!("issue {id}")))?;
        patch.apply_to(&mut entry.issue, Utc::now());
        Ok(entry.issue.clone())
    }

    async fn get_issue(&self, id: IssueId) -> Result<Option<Issue>, StoreError> {
        Ok(self.issues.get(&id).map(|entry| entry.issue.clone()))
    }

    async fn issues_by_owner(&self, owner: &UserId) -> Result<Vec<Issue>, StoreError> {
        Ok(self.collect_issues(|issue| &issue.reporter.user_id == owner))
    }

    async fn all_issues(&self) -> Result<Vec<Issue>, StoreError> {
        Ok(self.collect_issues(|_| true))
    }

    async fn issues_by_status(&self, status: IssueStatus) -> Result<Vec<Issue>, StoreError> {
        Ok(self.collect_issues(|issue| issue.status == status))
    }

    async fn issues_by_contractor(
        &self,
        contractor: &ContractorId,
    ) -> Result<Vec<Issue>, StoreError> {
        Ok(self.collect_issues(|issue| {
            issue.assigned_contractor.matches_email(contractor.as_str())
        }))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, id: &UserId) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.users.get(id).map(|entry| entry.value().clone()))
    }

    async fn create_user(&self, user: NewUser) -> Result<UserProfile, StoreError> {
        let profile = user.into_profile(Utc::now());
        self.users.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    async fn update_user_role(&self, id: &UserId, role: Role) -> Result<UserProfile, StoreError> {
        let mut entry = self
            .users
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(format!("user {id}")))?;
        entry.role = role;
        entry.updated_at = Some(Utc::now());
        Ok(entry.value().clone())
    }

    async fn all_users(&self) -> Result<Vec<UserProfile>, StoreError> {
        Ok(self.collect_users(|_| true))
    }

    async fn users_by_role(&self, role: Role) -> Result<Vec<UserProfile>, StoreError> {
        Ok(self.collect_users(|user| user.role == role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Identity, UploadOutcome};
    use maint_triage::Triage;

    fn draft(owner: &str, text: &str) -> NewIssue {
        NewIssue::from_triage(
            Identity::new(owner, format!("{owner}@x.com"), owner).reporter(),
            &UploadOutcome::Uploaded { url: "u".into() },
            text,
            Triage::default().triage(text),
        )
    }

    #[tokio::test]
    async fn create_forces_open() {
        let store = MemoryStore::new();
        let issue = store
            .create_issue(draft("a", "leak").with_requested_status(IssueStatus::Resolved))
            .await
            .unwrap();
        assert_eq!(issue.status, IssueStatus::Open);
        assert_eq!(store.get_issue(issue.id).await.unwrap(), Some(issue));
    }

    #[tokio::test]
    async fn create_rejects_invalid_draft() {
        let store = MemoryStore::new();
        let mut invalid = draft("a", "leak");
        invalid.reporter.user_id = UserId::new("  ");

        let err = store.create_issue(invalid).await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::Invalid);
        assert!(!err.is_transient());
        assert_eq!(store.issue_count(), 0);
    }

    #[tokio::test]
    async fn listings_are_newest_first() {
        let store = MemoryStore::new();
        let first = store.create_issue(draft("a", "leak")).await.unwrap();
        let second = store.create_issue(draft("a", "fuse")).await.unwrap();
        store.create_issue(draft("b", "wall")).await.unwrap();

        let mine = store.issues_by_owner(&UserId::new("a")).await.unwrap();
        assert_eq!(
            mine.iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );
        assert_eq!(store.all_issues().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn update_missing_issue_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update_issue(IssueId::new(), IssuePatch::status(IssueStatus::Resolved))
            .await
            .unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::NotFound);
    }

    #[tokio::test]
    async fn update_merges_and_filters_by_status() {
        let store = MemoryStore::new();
        let issue = store.create_issue(draft("a", "leak")).await.unwrap();
        let updated = store
            .update_issue(issue.id, IssuePatch::status(IssueStatus::Assigned))
            .await
            .unwrap();

        assert_eq!(updated.status, IssueStatus::Assigned);
        assert_eq!(updated.category, issue.category);
        assert_eq!(updated.created_at, issue.created_at);
        assert!(updated.updated_at >= issue.updated_at);
        assert_eq!(store.issues_by_status(IssueStatus::Assigned).await.unwrap().len(), 1);
        assert!(store.issues_by_status(IssueStatus::Open).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn user_role_update() {
        let store = MemoryStore::new();
        let identity = Identity::new("u1", "u1@x.com", "U1");
        store
            .create_user(NewUser::from_identity(&identity, Role::User))
            .await
            .unwrap();

        let updated = store
            .update_user_role(&identity.subject, Role::Contractor)
            .await
            .unwrap();
        assert_eq!(updated.role, Role::Contractor);
        assert!(updated.updated_at.is_some());
        assert_eq!(store.users_by_role(Role::Contractor).await.unwrap().len(), 1);
        assert!(store
            .update_user_role(&UserId::new("ghost"), Role::Admin)
            .await
            .is_err());
    }
}
