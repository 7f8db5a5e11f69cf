//! Triage configuration
//!
//! Bundles the category table, confidence policy and contractor pools so they
//! can be loaded once and handed to [`Triage`].

use crate::assigner::{ContractorAssigner, ContractorId, PoolConfig, PoolSelector};
use crate::category::{Category, CategoryTable};
use crate::classifier::{Classification, Classifier};
use crate::confidence::ConfidencePolicy;
use crate::error::TriageConfigError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Complete triage configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// Ordered category table (validated on deserialization)
    pub categories: CategoryTable,
    /// Score-to-confidence policy
    pub confidence: ConfidencePolicy,
    /// Contractor pools
    pub contractors: PoolConfig,
}

impl TriageConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a category table
    #[inline]
    #[must_use]
    pub fn with_categories(mut self, categories: CategoryTable) -> Self {
        self.categories = categories;
        self
    }

    /// With a confidence policy
    #[inline]
    #[must_use]
    pub fn with_confidence(mut self, confidence: ConfidencePolicy) -> Self {
        self.confidence = confidence;
        self
    }

    /// With contractor pools
    #[inline]
    #[must_use]
    pub fn with_contractors(mut self, contractors: PoolConfig) -> Self {
        self.contractors = contractors;
        self
    }

    /// Validate every part.
    ///
    /// # Errors
    /// First failing check of [`ConfidencePolicy::validate`] or
    /// [`PoolConfig::validate`]; the table is valid by construction.
    pub fn validate(&self) -> Result<(), TriageConfigError> {
        self.confidence.validate()?;
        self.contractors.validate()
    }
}

/// Outcome of a full triage pass: classification plus assigned contractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageOutcome {
    /// Keyword classification
    pub classification: Classification,
    /// Contractor drawn from the category pool
    pub contractor: ContractorId,
}

/// Classifier and assigner built from one configuration
#[derive(Debug, Clone, Default)]
pub struct Triage {
    classifier: Classifier,
    assigner: ContractorAssigner,
}

impl Triage {
    /// Build from configuration with random contractor selection.
    ///
    /// # Errors
    /// Returns the configuration validation error.
    pub fn new(config: TriageConfig) -> Result<Self, TriageConfigError> {
        config.validate()?;
        Ok(Self {
            classifier: Classifier::new(config.categories, config.confidence)?,
            assigner: ContractorAssigner::new(config.contractors)?,
        })
    }

    /// Build from configuration with an explicit selector.
    ///
    /// # Errors
    /// Returns the configuration validation error.
    pub fn with_selector(
        config: TriageConfig,
        selector: Arc<dyn PoolSelector>,
    ) -> Result<Self, TriageConfigError> {
        config.validate()?;
        Ok(Self {
            classifier: Classifier::new(config.categories, config.confidence)?,
            assigner: ContractorAssigner::with_selector(config.contractors, selector)?,
        })
    }

    /// Classify a description and assign a contractor from the same pass
    #[must_use]
    pub fn triage(&self, description: &str) -> TriageOutcome {
        let classification = self.classifier.classify(description);
        let contractor = self.assigner.assign(classification.pool_key());
        TriageOutcome {
            classification,
            contractor,
        }
    }

    /// The classifier
    #[inline]
    #[must_use]
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// The assigner
    #[inline]
    #[must_use]
    pub fn assigner(&self) -> &ContractorAssigner {
        &self.assigner
    }

    /// Categories in tie-break order
    #[inline]
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.classifier.categories()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assigner::FixedSelector;
    use crate::category::Priority;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_is_valid() {
        assert!(TriageConfig::default().validate().is_ok());
    }

    #[test]
    fn config_deserializes_from_partial_json() {
        let json = r#"{
            "confidence": { "no_match": 0.55, "cap": 0.95 },
            "contractors": { "pools": { "HVAC": ["cool@x.com"] } }
        }"#;
        let config: TriageConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.categories, CategoryTable::default());
        assert_eq!(config.confidence.no_match, 0.55);
        assert_eq!(config.confidence.base, 0.5);
        assert_eq!(config.contractors.pools.len(), 1);
        assert_eq!(config.contractors.fallback.as_str(), "general@resolve360.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_rejects_invalid_table() {
        let json = r#"{ "categories": [] }"#;
        let err = serde_json::from_str::<TriageConfig>(json).unwrap_err();
        assert!(err.to_string().contains("missing from table"));
    }

    #[test]
    fn triage_uses_same_pass() {
        let triage =
            Triage::with_selector(TriageConfig::default(), Arc::new(FixedSelector(0))).unwrap();
        let outcome = triage.triage("the thermostat and the duct");

        assert_eq!(outcome.classification.category, Category::Hvac);
        assert_eq!(outcome.classification.priority, Priority::High);
        assert_eq!(outcome.contractor, ContractorId::new("hvac1@resolve360.com"));
    }

    #[test]
    fn triage_rejects_bad_confidence() {
        let config = TriageConfig::new().with_confidence(ConfidencePolicy {
            base: -0.1,
            ..ConfidencePolicy::default()
        });
        assert!(Triage::new(config).is_err());
    }
}
