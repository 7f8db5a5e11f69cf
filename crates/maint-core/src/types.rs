//! Core types for Insta-Maintain
//!
//! Defines the data model shared by the services and the store boundary:
//! - Issue and user records
//! - Identity and image inputs from external collaborators
//! - Creation drafts and partial updates

use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use maint_access::Role;
use maint_triage::{Category, ContractorId, Priority, TriageOutcome};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Unique issue identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IssueId(pub Ulid);

impl IssueId {
    /// Generate new issue ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for IssueId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Auth subject id of a person
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Create from subject id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Subject id as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle status of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IssueStatus {
    /// Reported, not yet picked up
    Open,
    /// Picked up by a contractor
    Assigned,
    /// Fixed
    Resolved,
}

impl IssueStatus {
    /// Every status in lifecycle order
    pub const ALL: [IssueStatus; 3] = [
        IssueStatus::Open,
        IssueStatus::Assigned,
        IssueStatus::Resolved,
    ];

    /// Display name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Open => "Open",
            IssueStatus::Assigned => "Assigned",
            IssueStatus::Resolved => "Resolved",
        }
    }

    /// Position in the forward lifecycle
    #[inline]
    #[must_use]
    pub fn rank(&self) -> u8 {
        match self {
            IssueStatus::Open => 0,
            IssueStatus::Assigned => 1,
            IssueStatus::Resolved => 2,
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IssueStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownStatus(s.to_string()))
    }
}

/// Authenticated identity handed over by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable subject id
    pub subject: UserId,
    /// Login email
    pub email: String,
    /// Display name
    pub display_name: String,
}

impl Identity {
    /// Create identity
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        email: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            subject: UserId::new(subject),
            email: email.into(),
            display_name: display_name.into(),
        }
    }

    /// Reporter record for issues filed by this identity
    #[must_use]
    pub fn reporter(&self) -> Reporter {
        Reporter {
            user_id: self.subject.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

/// Person who reported an issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reporter {
    /// Owner id
    pub user_id: UserId,
    /// Email
    pub email: String,
    /// Display name
    pub display_name: String,
}

/// Reference to the issue photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageRef {
    /// Durable URL in object storage
    Remote {
        /// Public URL
        url: String,
    },
    /// Client-local handle; may not outlive the reporting session
    Local {
        /// Opaque handle
        handle: String,
    },
}

impl ImageRef {
    /// URL or handle
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            ImageRef::Remote { url } => url,
            ImageRef::Local { handle } => handle,
        }
    }

    /// Whether the reference is durable
    #[inline]
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, ImageRef::Remote { .. })
    }
}

/// Result of the image upload performed by the storage collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UploadOutcome {
    /// Upload succeeded
    Uploaded {
        /// Public URL
        url: String,
    },
    /// Upload failed; a local reference is used instead
    Failed {
        /// Local fallback reference
        local_ref: String,
        /// Failure reason reported by storage
        reason: String,
    },
}

impl UploadOutcome {
    /// Image reference to persist
    #[must_use]
    pub fn image_ref(&self) -> ImageRef {
        match self {
            UploadOutcome::Uploaded { url } => ImageRef::Remote { url: url.clone() },
            UploadOutcome::Failed { local_ref, .. } => ImageRef::Local {
                handle: local_ref.clone(),
            },
        }
    }

    /// Whether the upload succeeded
    #[inline]
    #[must_use]
    pub fn succeeded(&self) -> bool {
        matches!(self, UploadOutcome::Uploaded { .. })
    }
}

/// Persisted maintenance issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue id
    pub id: IssueId,
    /// Reporting resident
    pub reporter: Reporter,
    /// Photo reference
    pub image: ImageRef,
    /// `false` when the image reference may be ephemeral
    pub upload_success: bool,
    /// Free-text description
    pub description: Option<String>,
    /// Category
    pub category: Category,
    /// Priority derived from the category
    pub priority: Priority,
    /// Contractor responsible for the issue
    pub assigned_contractor: ContractorId,
    /// Classification confidence in [0, 1]
    pub confidence: f64,
    /// Lifecycle status
    pub status: IssueStatus,
    /// Creation time (immutable)
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

/// Draft of a new issue, before the store assigns id, status and timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIssue {
    /// Reporting resident
    pub reporter: Reporter,
    /// Photo reference
    pub image: ImageRef,
    /// Whether the upload succeeded
    pub upload_success: bool,
    /// Free-text description
    pub description: Option<String>,
    /// Category
    pub category: Category,
    /// Priority
    pub priority: Priority,
    /// Assigned contractor
    pub assigned_contractor: ContractorId,
    /// Classification confidence
    pub confidence: f64,
    /// Status asked for by the caller; stores always create issues as Open
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_status: Option<IssueStatus>,
}

impl NewIssue {
    /// Draft an issue from one triage pass.
    ///
    /// Category, priority, confidence and contractor all come from
    /// `outcome`, so they are always consistent with each other.
    #[must_use]
    pub fn from_triage(
        reporter: Reporter,
        upload: &UploadOutcome,
        description: &str,
        outcome: TriageOutcome,
    ) -> Self {
        let TriageOutcome {
            classification,
            contractor,
        } = outcome;
        let description = description.trim();

        Self {
            reporter,
            image: upload.image_ref(),
            upload_success: upload.succeeded(),
            description: (!description.is_empty()).then(|| description.to_string()),
            category: classification.category,
            priority: classification.priority,
            assigned_contractor: contractor,
            confidence: classification.confidence,
            requested_status: None,
        }
    }

    /// With a caller-requested status (ignored at creation)
    #[inline]
    #[must_use]
    pub fn with_requested_status(mut self, status: IssueStatus) -> Self {
        self.requested_status = Some(status);
        self
    }

    /// Check required fields.
    ///
    /// # Errors
    /// - `MissingOwner` for a blank owner id
    /// - `MissingImage` for a blank image reference
    /// - `MissingContractor` for a blank contractor
    /// - `InvalidConfidence` for a confidence outside [0, 1]
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.reporter.user_id.as_str().trim().is_empty() {
            return Err(ValidationError::MissingOwner);
        }
        if self.image.as_str().trim().is_empty() {
            return Err(ValidationError::MissingImage);
        }
        if self.assigned_contractor.as_str().trim().is_empty() {
            return Err(ValidationError::MissingContractor);
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ValidationError::InvalidConfidence(self.confidence));
        }
        Ok(())
    }

    /// Materialize as an Open issue
    #[must_use]
    pub fn into_issue(self, id: IssueId, now: DateTime<Utc>) -> Issue {
        Issue {
            id,
            reporter: self.reporter,
            image: self.image,
            upload_success: self.upload_success,
            description: self.description,
            category: self.category,
            priority: self.priority,
            assigned_contractor: self.assigned_contractor,
            confidence: self.confidence,
            status: IssueStatus::Open,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial issue update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssuePatch {
    /// New status
    pub status: Option<IssueStatus>,
    /// Corrected category
    pub category: Option<Category>,
    /// Priority of the corrected category
    pub priority: Option<Priority>,
    /// Reassigned contractor
    pub assigned_contractor: Option<ContractorId>,
    /// Corrected confidence
    pub confidence: Option<f64>,
}

impl IssuePatch {
    /// Status-only update
    #[inline]
    #[must_use]
    pub fn status(status: IssueStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Manual classification correction. Category, priority and contractor
    /// move together; a human decision carries full confidence.
    #[must_use]
    pub fn corrected(category: Category, priority: Priority, contractor: ContractorId) -> Self {
        Self {
            status: None,
            category: Some(category),
            priority: Some(priority),
            assigned_contractor: Some(contractor),
            confidence: Some(1.0),
        }
    }

    /// Whether nothing would change
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.assigned_contractor.is_none()
            && self.confidence.is_none()
    }

    /// Merge into an issue and refresh `updated_at`; `created_at` is kept
    pub fn apply_to(self, issue: &mut Issue, now: DateTime<Utc>) {
        if let Some(status) = self.status {
            issue.status = status;
        }
        if let Some(category) = self.category {
            issue.category = category;
        }
        if let Some(priority) = self.priority {
            issue.priority = priority;
        }
        if let Some(contractor) = self.assigned_contractor {
            issue.assigned_contractor = contractor;
        }
        if let Some(confidence) = self.confidence {
            issue.confidence = confidence;
        }
        issue.updated_at = now;
    }
}

/// Stored user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Auth subject id
    pub id: UserId,
    /// Login email
    pub email: String,
    /// Display name
    pub display_name: String,
    /// Role from the last sign-in
    pub role: Role,
    /// Whether the account is active
    pub active: bool,
    /// First sign-in time
    pub created_at: DateTime<Utc>,
    /// Last profile change
    pub updated_at: Option<DateTime<Utc>>,
}

/// Profile to create on first sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    /// Auth subject id
    pub id: UserId,
    /// Login email
    pub email: String,
    /// Display name
    pub display_name: String,
    /// Resolved role
    pub role: Role,
}

impl NewUser {
    /// Draft a profile from an identity and resolved role
    #[must_use]
    pub fn from_identity(identity: &Identity, role: Role) -> Self {
        Self {
            id: identity.subject.clone(),
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
            role,
        }
    }

    /// Materialize as an active profile
    #[must_use]
    pub fn into_profile(self, now: DateTime<Utc>) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email,
            display_name: self.display_name,
            role: self.role,
            active: true,
            created_at: now,
            updated_at: None,
        }
    }
}
