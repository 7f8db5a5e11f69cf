//! Error types for Insta-Maintain core
//!
//! Provides error handling for:
//! - Issue creation validation
//! - Persistence failures (with transient/permanent classification)
//! - Lifecycle authorization and transition rules
//! - Configuration loading

use crate::dashboard::Dashboard;
use crate::types::{IssueId, IssueStatus};
use maint_access::Role;
use maint_triage::TriageConfigError;
use std::path::PathBuf;

/// Main core error type
#[derive(Debug, thiserror::Error)]
pub enum MaintError {
    /// Input rejected before any write
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Persistence boundary failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Lifecycle rule violated
    #[error("lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Role may not open a dashboard
    #[error("{role} may not open the {dashboard} dashboard")]
    DashboardDenied {
        /// Requested dashboard
        dashboard: Dashboard,
        /// Viewer role
        role: Role,
    },

    /// Failure of a named user-facing operation
    #[error("{operation} failed: {source}")]
    Operation {
        /// Operation name shown to the user
        operation: &'static str,
        /// Underlying error
        source: Box<MaintError>,
    },
}

impl MaintError {
    /// Wrap with the name of the failed operation
    #[must_use]
    pub fn during(self, operation: &'static str) -> Self {
        match self {
            already @ MaintError::Operation { .. } => already,
            other => MaintError::Operation {
                operation,
                source: Box::new(other),
            },
        }
    }

    /// Name of the failed operation, if attached
    #[must_use]
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            MaintError::Operation { operation, .. } => Some(operation),
            _ => None,
        }
    }

    /// Innermost error, skipping operation wrappers
    #[must_use]
    pub fn root(&self) -> &MaintError {
        match self {
            MaintError::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    /// Check if retrying the whole flow may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self.root() {
            MaintError::Store(e) => e.is_transient(),
            _ => false,
        }
    }
}

/// Issue draft validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Owner id is blank
    #[error("issue has no owner")]
    MissingOwner,

    /// Image reference is blank
    #[error("issue has no image reference")]
    MissingImage,

    /// Contractor is blank
    #[error("issue has no assigned contractor")]
    MissingContractor,

    /// Confidence outside [0, 1]
    #[error("confidence {0} is outside [0, 1]")]
    InvalidConfidence(f64),

    /// Unknown status name
    #[error("unknown status: {0}")]
    UnknownStatus(String),
}

/// Structured persistence failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    /// Record does not exist
    NotFound,
    /// Query index is still building
    IndexNotReady,
    /// Access rejected; can be transient right after sign-in
    PermissionDenied,
    /// Backend unreachable
    Unavailable,
    /// Record rejected by the store's own checks
    Invalid,
    /// Any other backend failure
    Internal,
}

impl StoreErrorKind {
    /// Whether a retry may succeed
    #[inline]
    #[must_use]
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            StoreErrorKind::IndexNotReady
                | StoreErrorKind::PermissionDenied
                | StoreErrorKind::Unavailable
        )
    }
}

/// Persistence boundary error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind:?}: {message}")]
pub struct StoreError {
    /// Failure kind
    pub kind: StoreErrorKind,
    /// Backend message
    pub message: String,
}

impl StoreError {
    /// Create a store error
    #[must_use]
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Record not found
    #[must_use]
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::new(StoreErrorKind::NotFound, format!("{what} not found"))
    }

    /// Whether a retry may succeed
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

/// Lifecycle errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// Actor may not modify this issue
    #[error("{actor} may not modify issue {issue}")]
    Forbidden {
        /// Acting email
        actor: String,
        /// Target issue
        issue: IssueId,
    },

    /// Transition not allowed by the active policy
    #[error("transition {from} -> {to} is not allowed")]
    IllegalTransition {
        /// Current status
        from: IssueStatus,
        /// Requested status
        to: IssueStatus,
    },

    /// Issue does not exist
    #[error("issue {0} not found")]
    IssueNotFound(IssueId),
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Invalid TOML
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid YAML
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Triage section rejected
    #[error("invalid triage configuration: {0}")]
    Triage(#[from] TriageConfigError),

    /// Retry section rejected
    #[error("invalid retry policy: {0}")]
    Retry(String),

    /// Unknown file extension
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(PathBuf),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, MaintError>;
