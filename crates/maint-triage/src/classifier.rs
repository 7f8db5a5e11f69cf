//! Keyword classifier
//!
//! Scores a free-text description against the ordered [`CategoryTable`] and
//! derives category, confidence, priority and explanation. Pure and total:
//! the same text always yields the same [`Classification`].

use crate::category::{Category, CategoryTable, Priority};
use crate::confidence::ConfidencePolicy;
use crate::error::TriageConfigError;
use serde::{Deserialize, Serialize};

/// Result of classifying one description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Winning category
    pub category: Category,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Priority of the winning category
    pub priority: Priority,
    /// Explanatory text of the winning category
    pub explanation: String,
    /// Number of distinct keywords matched for the winning category
    pub score: usize,
    /// The matched keywords, in table order
    pub matched_keywords: Vec<String>,
}

impl Classification {
    /// Key of the contractor pool serving this classification
    #[inline]
    #[must_use]
    pub fn pool_key(&self) -> Category {
        self.category
    }

    /// Whether no keyword matched and the fallback category was used
    #[inline]
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.score == 0
    }
}

/// Keyword classifier over an injected table
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    table: CategoryTable,
    policy: ConfidencePolicy,
}

impl Classifier {
    /// Create a classifier from a table and confidence policy.
    ///
    /// # Errors
    /// Any failure of [`ConfidencePolicy::validate`].
    pub fn new(table: CategoryTable, policy: ConfidencePolicy) -> Result<Self, TriageConfigError> {
        policy.validate()?;
        Ok(Self { table, policy })
    }

    /// Classify a description.
    ///
    /// # Algorithm
    /// 1. Lower-case the text
    /// 2. Count distinct keyword substrings per category
    /// 3. Highest count wins; ties go to the earliest category in the table
    /// 4. No match at all falls back to [`Category::FALLBACK`] with the
    ///    policy's `no_match` confidence
    #[must_use]
    pub fn classify(&self, description: &str) -> Classification {
        let lowered = description.to_lowercase();

        let mut best: Option<(&crate::category::CategoryProfile, usize)> = None;
        for profile in self.table.iter() {
            let score = profile.score(&lowered);
            if score > best.map_or(0, |(_, top)| top) {
                best = Some((profile, score));
            }
        }

        let (profile, score) = best.unwrap_or((self.table.profile(Category::FALLBACK), 0));
        let matched_keywords = profile
            .matches(&lowered)
            .map(str::to_string)
            .collect::<Vec<_>>();

        let classification = Classification {
            category: profile.category,
            confidence: self.policy.confidence(score),
            priority: profile.priority,
            explanation: profile.description.clone(),
            score,
            matched_keywords,
        };

        tracing::debug!(
            category = %classification.category,
            score,
            confidence = classification.confidence,
            "classified description"
        );

        classification
    }

    /// Categories in tie-break order
    #[inline]
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.table.categories()
    }

    /// Keyword table
    #[inline]
    #[must_use]
    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    /// Confidence policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &ConfidencePolicy {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryProfile;

    #[test]
    fn leaking_pipe_is_plumbing() {
        let result = Classifier::default().classify("water leaking from the pipe under the sink");
        assert_eq!(result.category, Category::Plumbing);
        assert_eq!(result.priority, Priority::High);
        assert_eq!(result.score, 4);
        assert_eq!(result.matched_keywords, vec!["pipe", "leak", "water", "sink"]);
        assert!(!result.is_fallback());
    }

    #[test]
    fn exposed_wire_is_electrical() {
        let result =
            Classifier::default().classify("broken light switch and exposed wire near outlet");
        assert_eq!(result.category, Category::Electrical);
        assert_eq!(result.priority, Priority::Critical);
    }

    #[test]
    fn empty_text_falls_back() {
        let result = Classifier::default().classify("");
        assert_eq!(result.category, Category::CommonArea);
        assert_eq!(result.priority, Priority::Low);
        assert_eq!(result.confidence, 0.3);
        assert!(result.is_fallback());
        assert!(result.matched_keywords.is_empty());
    }

    #[test]
    fn whitespace_falls_back() {
        let result = Classifier::default().classify("   \t\n ");
        assert_eq!(result.category, Category::CommonArea);
        assert_eq!(result.confidence, 0.3);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let result = Classifier::default().classify("THERMOSTAT is dead");
        assert_eq!(result.category, Category::Hvac);
    }

    #[test]
    fn tie_goes_to_first_declared() {
        // one Civil keyword, one Electrical keyword: Electrical is declared first
        let classifier = Classifier::default();
        for _ in 0..10 {
            let result = classifier.classify("wall fuse");
            assert_eq!(result.category, Category::Electrical);
            assert_eq!(result.score, 1);
        }
    }

    #[test]
    fn tie_break_follows_table_order() {
        let mut profiles: Vec<CategoryProfile> =
            CategoryTable::default().iter().cloned().collect();
        profiles.swap(1, 2);
        let classifier = Classifier::new(
            CategoryTable::new(profiles).unwrap(),
            ConfidencePolicy::default(),
        )
        .unwrap();
        assert_eq!(classifier.classify("wall fuse").category, Category::Civil);
    }

    #[test]
    fn repeated_keyword_does_not_break_tie() {
        let mut profiles: Vec<CategoryProfile> =
            CategoryTable::default().iter().cloned().collect();
        profiles[2].keywords.push("WALL ".to_string());
        let classifier = Classifier::new(
            CategoryTable::new(profiles).unwrap(),
            ConfidencePolicy::default(),
        )
        .unwrap();

        let result = classifier.classify("wall fuse");
        assert_eq!(result.category, Category::Electrical);
        assert_eq!(result.score, 1);
    }

    #[test]
    fn out_of_range_policy_is_rejected() {
        let policy = ConfidencePolicy {
            no_match: 1.5,
            ..ConfidencePolicy::default()
        };
        assert!(matches!(
            Classifier::new(CategoryTable::default(), policy),
            Err(TriageConfigError::ConfidenceOutOfRange { field: "no_match", .. })
        ));
    }

    #[test]
    fn substring_containment_counts() {
        // "leaking" contains "leak"
        let result = Classifier::default().classify("leaking");
        assert_eq!(result.category, Category::Plumbing);
        assert_eq!(result.score, 1);
    }

    #[test]
    fn explanation_comes_from_table() {
        let result = Classifier::default().classify("crack in the ceiling");
        assert_eq!(result.category, Category::Civil);
        assert_eq!(result.explanation, "Structural and civil engineering issues");
    }
}
