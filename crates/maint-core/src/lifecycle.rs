//! Issue lifecycle
//!
//! Status transitions Open, Assigned and Resolved, the policy deciding which
//! moves are legal, and who may perform them.

use crate::error::LifecycleError;
use crate::types::{Issue, IssueStatus, UserProfile};
use maint_access::Role;
use serde::{Deserialize, Serialize};

/// Which status moves are legal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Any status to any other status
    #[default]
    Permissive,
    /// Forward only: Open, then Assigned, then Resolved (skipping allowed)
    Monotonic,
}

/// Statuses reachable from `from` under `policy` (the current one excluded)
pub fn allowed_transitions(policy: TransitionPolicy, from: IssueStatus) -> Vec<IssueStatus> {
    use crate::types::IssueStatus::*;
    match (policy, from) {
        (TransitionPolicy::Permissive, _) => {
            IssueStatus::ALL.into_iter().filter(|s| *s != from).collect()
        }
        (TransitionPolicy::Monotonic, Open) => vec![Assigned, Resolved],
        (TransitionPolicy::Monotonic, Assigned) => vec![Resolved],
        (TransitionPolicy::Monotonic, Resolved) => vec![],
    }
}

/// Planned effect of a status request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    /// Requested status equals the current one; nothing is written
    Unchanged(IssueStatus),
    /// Effective move
    Move {
        /// Current status
        from: IssueStatus,
        /// New status
        to: IssueStatus,
    },
}

impl Transition {
    /// Status after the transition
    #[inline]
    #[must_use]
    pub fn target(&self) -> IssueStatus {
        match self {
            Transition::Unchanged(status) => *status,
            Transition::Move { to, .. } => *to,
        }
    }

    /// Whether the store must be written
    #[inline]
    #[must_use]
    pub fn requires_write(&self) -> bool {
        matches!(self, Transition::Move { .. })
    }
}

/// Person acting on an issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Login email
    pub email: String,
    /// Current role
    pub role: Role,
}

impl Actor {
    /// Create an actor
    #[must_use]
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            role,
        }
    }
}

impl From<&UserProfile> for Actor {
    fn from(profile: &UserProfile) -> Self {
        Self::new(profile.email.clone(), profile.role)
    }
}

/// Transition and authorization rules
#[derive(Debug, Clone, Copy, Default)]
pub struct IssueLifecycle {
    policy: TransitionPolicy,
}

impl IssueLifecycle {
    /// Create with a policy
    #[inline]
    #[must_use]
    pub fn new(policy: TransitionPolicy) -> Self {
        Self { policy }
    }

    /// Active policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Plan a status request.
    ///
    /// # Errors
    /// `IllegalTransition` if the policy forbids the move.
    pub fn plan(&self, from: IssueStatus, to: IssueStatus) -> Result<Transition, LifecycleError> {
        if from == to {
            return Ok(Transition::Unchanged(from));
        }
        if allowed_transitions(self.policy, from).contains(&to) {
            Ok(Transition::Move { from, to })
        } else {
            Err(LifecycleError::IllegalTransition { from, to })
        }
    }

    /// Check that `actor` may modify `issue`.
    ///
    /// Admins may act on any issue, contractors only on issues assigned to
    /// their email, residents never.
    ///
    /// # Errors
    /// `Forbidden` otherwise.
    pub fn authorize(&self, actor: &Actor, issue: &Issue) -> Result<(), LifecycleError> {
        let permitted = match actor.role {
            Role::Admin => true,
            Role::Contractor => issue.assigned_contractor.matches_email(&actor.email),
            Role::User => false,
        };
        if permitted {
            Ok(())
        } else {
            Err(LifecycleError::Forbidden {
                actor: actor.email.clone(),
                issue: issue.id,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IssueStatus::*;
    use crate::types::{Identity, IssueId, NewIssue, UploadOutcome};
    use chrono::Utc;
    use maint_triage::{ContractorId, Triage};

    fn issue_for(contractor: &str) -> Issue {
        let upload = UploadOutcome::Uploaded { url: "u".into() };
        let mut draft = NewIssue::from_triage(
            Identity::new("uid", "r@x.com", "R").reporter(),
            &upload,
            "leak",
            Triage::default().triage("leak"),
        );
        draft.assigned_contractor = ContractorId::new(contractor);
        draft.into_issue(IssueId::new(), Utc::now())
    }

    #[test]
    fn permissive_allows_everything_else() {
        for from in IssueStatus::ALL {
            let allowed = allowed_transitions(TransitionPolicy::Permissive, from);
            assert_eq!(allowed.len(), 2);
            assert!(!allowed.contains(&from));
        }
        let lifecycle = IssueLifecycle::default();
        assert!(lifecycle.plan(Resolved, Open).is_ok());
    }

    #[test]
    fn monotonic_is_forward_only() {
        let lifecycle = IssueLifecycle::new(TransitionPolicy::Monotonic);
        assert_eq!(
            lifecycle.plan(Open, Resolved),
            Ok(Transition::Move { from: Open, to: Resolved })
        );
        assert_eq!(
            lifecycle.plan(Resolved, Assigned),
            Err(LifecycleError::IllegalTransition { from: Resolved, to: Assigned })
        );
        assert!(allowed_transitions(TransitionPolicy::Monotonic, Resolved).is_empty());
    }

    #[test]
    fn same_status_is_noop() {
        for policy in [TransitionPolicy::Permissive, TransitionPolicy::Monotonic] {
            let plan = IssueLifecycle::new(policy).plan(Resolved, Resolved).unwrap();
            assert_eq!(plan, Transition::Unchanged(Resolved));
            assert!(!plan.requires_write());
        }
    }

    #[test]
    fn authorization_by_role() {
        let lifecycle = IssueLifecycle::default();
        let issue = issue_for("plumber1@resolve360.com");

        assert!(lifecycle.authorize(&Actor::new("boss@x.com", Role::Admin), &issue).is_ok());
        assert!(lifecycle
            .authorize(&Actor::new("PLUMBER1@resolve360.com", Role::Contractor), &issue)
            .is_ok());
        assert!(matches!(
            lifecycle.authorize(&Actor::new("plumber2@resolve360.com", Role::Contractor), &issue),
            Err(LifecycleError::Forbidden { .. })
        ));
        assert!(lifecycle.authorize(&Actor::new("r@x.com", Role::User), &issue).is_err());
    }
}
