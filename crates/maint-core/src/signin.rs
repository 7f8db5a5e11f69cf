//! Sign-in completion
//!
//! Resolves the role of an authenticated identity on every sign-in and
//! reconciles it with the stored profile. A differing stored role is
//! overwritten.

use crate::dashboard::{Dashboard, UserFilter};
use crate::error::{MaintError, Result};
use crate::store::UserStore;
use crate::types::{Identity, NewUser, UserProfile};
use maint_access::{reconcile_role, RoleReconciliation, RoleResolver};
use std::sync::Arc;

/// Completed sign-in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignIn {
    /// Profile after reconciliation
    pub profile: UserProfile,
    /// What happened to the stored role
    pub reconciliation: RoleReconciliation,
    /// Landing dashboard
    pub dashboard: Dashboard,
    /// Greeting for the landing page
    pub greeting: String,
}

/// Completes sign-ins against the user store
#[derive(Debug)]
pub struct SignInService<U: UserStore + ?Sized> {
    users: Arc<U>,
    resolver: RoleResolver,
}

impl<U: UserStore + ?Sized> SignInService<U> {
    /// Create from a user store and role resolver
    #[must_use]
    pub fn new(users: Arc<U>, resolver: RoleResolver) -> Self {
        Self { users, resolver }
    }

    /// Role resolver in use
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &RoleResolver {
        &self.resolver
    }

    /// Complete a sign-in.
    ///
    /// # Workflow
    /// 1. Resolve the role from the email
    /// 2. Fetch the stored profile
    /// 3. Create it, overwrite its role, or keep it as is
    ///
    /// # Errors
    /// Store failures, named `sign in`.
    pub async fn complete_sign_in(&self, identity: &Identity) -> Result<SignIn> {
        self.sign_in(identity)
            .await
            .map_err(|e| e.during("sign in"))
    }

    async fn sign_in(&self, identity: &Identity) -> Result<SignIn> {
        let resolved = self.resolver.resolve_role(&identity.email);
        let stored = self.users.get_user(&identity.subject).await?;
        let reconciliation = reconcile_role(stored.as_ref().map(|p| p.role), resolved);

        let profile = match (stored, reconciliation) {
            (None, _) => {
                self.users
                    .create_user(NewUser::from_identity(identity, reconciliation.effective()))
                    .await?
            }
            (Some(_), RoleReconciliation::Changed { from, to }) => {
                tracing::warn!(
                    user = %identity.subject,
                    email = %identity.email,
                    %from,
                    %to,
                    "stored role differs from allow-lists, overwriting"
                );
                self.users.update_user_role(&identity.subject, to).await?
            }
            (Some(profile), _) => profile,
        };

        let dashboard = Dashboard::for_role(profile.role);
        let greeting = format!("Welcome, {} ({})", profile.display_name, profile.role.title());
        tracing::info!(
            user = %profile.id,
            role = %profile.role,
            %dashboard,
            "sign-in completed"
        );

        Ok(SignIn {
            profile,
            reconciliation,
            dashboard,
            greeting,
        })
    }

    /// Profiles for the admin user list, newest first.
    ///
    /// # Errors
    /// Store failures, named `load users`.
    pub async fn list_users(&self, filter: &UserFilter) -> Result<Vec<UserProfile>> {
        let users = match filter.role {
            Some(role) => self.users.users_by_role(role).await,
            None => self.users.all_users().await,
        }
        .map_err(|e| MaintError::from(e).during("load users"))?;

        Ok(users.into_iter().filter(|user| filter.matches(user)).collect())
    }
}
