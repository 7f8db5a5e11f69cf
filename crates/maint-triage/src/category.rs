//! Issue categories, priorities and the ordered keyword table

use crate::error::TriageConfigError;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const CATEGORY_COUNT: usize = 5;

/// Maintenance domain an issue belongs to
///
/// The declaration order is the default table order, which decides ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Leaks, clogs, fixtures
    Plumbing = 0,
    /// Wiring, outlets, power
    Electrical = 1,
    /// Structural and finish damage
    Civil = 2,
    /// General upkeep of shared spaces
    #[serde(rename = "Common Area Maintenance/Housekeeping")]
    CommonArea = 3,
    /// Heating, ventilation and air conditioning
    #[serde(rename = "HVAC")]
    Hvac = 4,
}

impl Category {
    /// Every category in declaration order
    pub const ALL: [Category; CATEGORY_COUNT] = [
        Category::Plumbing,
        Category::Electrical,
        Category::Civil,
        Category::CommonArea,
        Category::Hvac,
    ];

    /// Category used when no keyword matches
    pub const FALLBACK: Category = Category::CommonArea;

    /// Display name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Plumbing => "Plumbing",
            Category::Electrical => "Electrical",
            Category::Civil => "Civil",
            Category::CommonArea => "Common Area Maintenance/Housekeeping",
            Category::Hvac => "HVAC",
        }
    }

    #[inline]
    pub(crate) fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = TriageConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .or_else(|| match wanted.to_ascii_lowercase().as_str() {
                "common" | "common_area" | "housekeeping" => Some(Category::CommonArea),
                _ => None,
            })
            .ok_or_else(|| TriageConfigError::UnknownCategory(s.to_string()))
    }
}

/// Urgency of an issue, fixed per category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Safety hazard
    Critical,
    /// Needs prompt attention
    High,
    /// Schedule soon
    Medium,
    /// Routine
    Low,
}

impl Priority {
    /// Every priority, most urgent first
    pub const ALL: [Priority; 4] = [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    /// Lower-case name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword set, priority and description of one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryProfile {
    /// Category this profile configures
    pub category: Category,
    /// Lower-case keywords matched as substrings
    pub keywords: Vec<String>,
    /// Priority given to every issue of this category
    pub priority: Priority,
    /// Explanatory text shown with the classification
    pub description: String,
}

impl CategoryProfile {
    /// Create a profile
    #[must_use]
    pub fn new(
        category: Category,
        keywords: &[&str],
        priority: Priority,
        description: impl Into<String>,
    ) -> Self {
        Self {
            category,
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
            priority,
            description: description.into(),
        }
    }

    /// Keywords contained in already lower-cased text
    ///
    /// Each keyword counts once, however often it occurs.
    pub fn matches<'a>(&'a self, lowered: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.keywords
            .iter()
            .map(String::as_str)
            .filter(move |k| lowered.contains(*k))
    }

    /// Number of distinct keywords contained in already lower-cased text
    #[inline]
    #[must_use]
    pub fn score(&self, lowered: &str) -> usize {
        self.matches(lowered).count()
    }
}

/// Ordered, validated category table
///
/// Holds exactly one profile per [`Category`]. Iteration follows the
/// configured order, which is also the tie-break order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CategoryProfile>", into = "Vec<CategoryProfile>")]
pub struct CategoryTable {
    profiles: Vec<CategoryProfile>,
    slots: [usize; CATEGORY_COUNT],
}

impl CategoryTable {
    /// Build a table from profiles in tie-break order.
    ///
    /// Keywords are lower-cased and trimmed; repeats within a profile are
    /// dropped, keeping the first occurrence.
    ///
    /// # Errors
    /// - `DuplicateCategory` / `MissingCategory` unless every category
    ///   appears exactly once
    /// - `EmptyKeyword` for a blank keyword (it would match every text)
    pub fn new(mut profiles: Vec<CategoryProfile>) -> Result<Self, TriageConfigError> {
        let mut slots = [usize::MAX; CATEGORY_COUNT];

        for (position, profile) in profiles.iter_mut().enumerate() {
            let slot = &mut slots[profile.category.slot()];
            if *slot != usize::MAX {
                return Err(TriageConfigError::DuplicateCategory(profile.category));
            }
            *slot = position;

            let mut keywords = IndexSet::with_capacity(profile.keywords.len());
            for keyword in &profile.keywords {
                let keyword = keyword.trim().to_lowercase();
                if keyword.is_empty() {
                    return Err(TriageConfigError::EmptyKeyword(profile.category));
                }
                keywords.insert(keyword);
            }
            profile.keywords = keywords.into_iter().collect();
        }

        if let Some(missing) = Category::ALL
            .into_iter()
            .find(|c| slots[c.slot()] == usize::MAX)
        {
            return Err(TriageConfigError::MissingCategory(missing));
        }

        Ok(Self { profiles, slots })
    }

    /// Profile of a category
    #[inline]
    #[must_use]
    pub fn profile(&self, category: Category) -> &CategoryProfile {
        &self.profiles[self.slots[category.slot()]]
    }

    /// Profiles in tie-break order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &CategoryProfile> {
        self.profiles.iter()
    }

    /// Categories in tie-break order
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.profiles.iter().map(|p| p.category).collect()
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self {
            profiles: vec![
                CategoryProfile::new(
                    Category::Plumbing,
                    &[
                        "pipe", "leak", "water", "drain", "faucet", "toilet", "sink", "shower",
                        "valve",
                    ],
                    Priority::High,
                    "Water-related issues including leaks, clogs, and fixture problems",
                ),
                CategoryProfile::new(
                    Category::Electrical,
                    &[
                        "wire",
                        "outlet",
                        "switch",
                        "light",
                        "power",
                        "circuit",
                        "breaker",
                        "fuse",
                        "electrical",
                    ],
                    Priority::Critical,
                    "Electrical issues including wiring, outlets, and power problems",
                ),
                CategoryProfile::new(
                    Category::Civil,
                    &[
                        "wall",
                        "ceiling",
                        "floor",
                        "crack",
                        "structural",
                        "concrete",
                        "brick",
                        "paint",
                        "damage",
                    ],
                    Priority::Medium,
                    "Structural and civil engineering issues",
                ),
                CategoryProfile::new(
                    Category::CommonArea,
                    &[
                        "clean",
                        "trash",
                        "litter",
                        "maintenance",
                        "common",
                        "area",
                        "housekeeping",
                        "cleaning",
                    ],
                    Priority::Low,
                    "General maintenance and housekeeping issues",
                ),
                CategoryProfile::new(
                    Category::Hvac,
                    &[
                        "air",
                        "conditioning",
                        "heating",
                        "ventilation",
                        "ac",
                        "hvac",
                        "cooling",
                        "thermostat",
                        "duct",
                    ],
                    Priority::High,
                    "Heating, ventilation, and air conditioning issues",
                ),
            ],
            slots: [0, 1, 2, 3, 4],
        }
    }
}

impl TryFrom<Vec<CategoryProfile>> for CategoryTable {
    type Error = TriageConfigError;

    fn try_from(profiles: Vec<CategoryProfile>) -> Result<Self, Self::Error> {
        Self::new(profiles)
    }
}

impl From<CategoryTable> for Vec<CategoryProfile> {
    fn from(table: CategoryTable) -> Self {
        table.profiles
    }
}
