//! Application configuration
//!
//! One immutable [`AppConfig`] carries the allow-lists, triage tables,
//! retry policy and transition policy. Loaded once from TOML or YAML; every
//! section falls back to built-in defaults.

use crate::error::ConfigError;
use crate::lifecycle::{IssueLifecycle, TransitionPolicy};
use crate::retry::RetryPolicy;
use maint_access::{AccessConfig, RoleResolver};
use maint_triage::{PoolSelector, Triage, TriageConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Upper bound on configured retries
pub const MAX_RETRIES: u32 = 10;

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Role allow-lists
    pub access: AccessConfig,
    /// Category table, confidence policy and contractor pools
    pub triage: TriageConfig,
    /// Retry policy for resident reads
    pub retry: RetryPolicy,
    /// Status transition policy
    pub lifecycle: TransitionPolicy,
}

impl AppConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With allow-lists
    #[inline]
    #[must_use]
    pub fn with_access(mut self, access: AccessConfig) -> Self {
        self.access = access;
        self
    }

    /// With triage configuration
    #[inline]
    #[must_use]
    pub fn with_triage(mut self, triage: TriageConfig) -> Self {
        self.triage = triage;
        self
    }

    /// With retry policy
    #[inline]
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// With transition policy
    #[inline]
    #[must_use]
    pub fn with_lifecycle(mut self, lifecycle: TransitionPolicy) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Parse and validate TOML.
    ///
    /// # Errors
    /// Syntax errors or a failed [`Self::validate`].
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate YAML.
    ///
    /// # Errors
    /// Syntax errors or a failed [`Self::validate`].
    pub fn from_yaml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.toml`, `.yaml` or `.yml` file.
    ///
    /// # Errors
    /// I/O errors, unknown extensions, or parse/validation errors.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let parse: fn(&str) -> Result<Self, ConfigError> = match extension.as_deref() {
            Some("toml") => Self::from_toml_str,
            Some("yaml" | "yml") => Self::from_yaml_str,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };

        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = parse(&input)?;

        tracing::info!(
            path = %path.display(),
            admins = config.access.admin.len(),
            contractors = config.access.contractor.len(),
            lifecycle = ?config.lifecycle,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Validate every section.
    ///
    /// # Errors
    /// The first failing triage check, or a retry count above
    /// [`MAX_RETRIES`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.triage.validate()?;
        if self.retry.max_retries > MAX_RETRIES {
            return Err(ConfigError::Retry(format!(
                "max_retries {} exceeds {MAX_RETRIES}",
                self.retry.max_retries
            )));
        }
        Ok(())
    }

    /// Role resolver over the allow-lists
    #[must_use]
    pub fn role_resolver(&self) -> RoleResolver {
        RoleResolver::new(&self.access)
    }

    /// Triage with random contractor selection.
    ///
    /// # Errors
    /// The triage validation error.
    pub fn build_triage(&self) -> Result<Triage, ConfigError> {
        Ok(Triage::new(self.triage.clone())?)
    }

    /// Triage with an explicit selector.
    ///
    /// # Errors
    /// The triage validation error.
    pub fn build_triage_with(
        &self,
        selector: Arc<dyn PoolSelector>,
    ) -> Result<Triage, ConfigError> {
        Ok(Triage::with_selector(self.triage.clone(), selector)?)
    }

    /// Lifecycle rules
    #[inline]
    #[must_use]
    pub fn issue_lifecycle(&self) -> IssueLifecycle {
        IssueLifecycle::new(self.lifecycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maint_access::Role;
    use maint_triage::Category;

    #[test]
    fn empty_toml_is_default() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.lifecycle, TransitionPolicy::Permissive);
    }

    #[test]
    fn toml_sections_override_defaults() {
        let input = r#"
            lifecycle = "monotonic"

            [access]
            admin = ["Chief@Example.org"]

            [retry]
            max_retries = 1
            base_delay_ms = 10

            [triage.confidence]
            cap = 0.9

            [triage.contractors.pools]
            Plumbing = ["p@example.org"]
        "#;
        let config = AppConfig::from_toml_str(input).unwrap();

        assert_eq!(config.lifecycle, TransitionPolicy::Monotonic);
        assert_eq!(config.retry.max_retries, 1);
        assert_eq!(config.triage.confidence.cap, 0.9);
        assert!(config.access.contractor.is_empty());
        assert_eq!(config.role_resolver().resolve_role("chief@example.org"), Role::Admin);

        let triage = config.build_triage().unwrap();
        assert_eq!(triage.assigner().assign(Category::Plumbing).as_str(), "p@example.org");
        assert_eq!(triage.assigner().assign(Category::Hvac).as_str(), "general@resolve360.com");
    }

    #[test]
    fn yaml_is_accepted() {
        let input = "lifecycle: monotonic\nretry:\n  max_retries: 2\n";
        let config = AppConfig::from_yaml_str(input).unwrap();
        assert_eq!(config.issue_lifecycle().policy(), TransitionPolicy::Monotonic);
        assert_eq!(config.retry.base_delay_ms, 2_000);
    }

    #[test]
    fn invalid_sections_are_rejected() {
        assert!(matches!(
            AppConfig::from_toml_str("[retry]\nmax_retries = 50\n"),
            Err(ConfigError::Retry(_))
        ));
        assert!(matches!(
            AppConfig::from_toml_str("[triage.confidence]\nbase = 1.5\n"),
            Err(ConfigError::Triage(_))
        ));
        assert!(matches!(
            AppConfig::from_toml_str("lifecycle = \"sideways\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(matches!(
            AppConfig::load("settings.ini"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
