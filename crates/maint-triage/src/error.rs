//! Error types for triage configuration
//!
//! Classification and assignment themselves never fail; only building the
//! tables from configuration can.

use crate::category::Category;

/// Invalid triage configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TriageConfigError {
    /// Category listed more than once
    #[error("category listed twice: {0}")]
    DuplicateCategory(Category),

    /// Category absent from the table
    #[error("category missing from table: {0}")]
    MissingCategory(Category),

    /// Blank keyword
    #[error("blank keyword in category {0}")]
    EmptyKeyword(Category),

    /// Unrecognised category name
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// Confidence constant outside [0, 1]
    #[error("confidence {field} out of range: {value}")]
    ConfidenceOutOfRange {
        /// Offending field
        field: &'static str,
        /// Offending value
        value: f64,
    },

    /// No-match confidence above the single-match confidence
    #[error("no-match confidence {no_match} exceeds single-match confidence {single_match}")]
    NonMonotonicConfidence {
        /// Confidence for zero matches
        no_match: f64,
        /// Confidence for one match
        single_match: f64,
    },

    /// Contractor pool without members
    #[error("contractor pool for {0} is empty")]
    EmptyPool(Category),

    /// Blank fallback contractor
    #[error("fallback contractor must not be blank")]
    EmptyFallback,
}
