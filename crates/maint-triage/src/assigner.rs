//! Contractor assignment
//!
//! Maps a [`Category`] to its configured contractor pool and picks one member
//! through a pluggable [`PoolSelector`]:
//! - [`RandomSelector`]: uniform random choice (production default)
//! - [`FixedSelector`]: always the same position (tests)
//! - [`RoundRobinSelector`]: cycles through the pool (tests, demos)

use crate::category::Category;
use crate::error::TriageConfigError;
use indexmap::IndexMap;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Contractor identity (login email)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractorId(pub String);

impl ContractorId {
    /// Create from an email
    #[inline]
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    /// Email as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a login email
    #[inline]
    #[must_use]
    pub fn matches_email(&self, email: &str) -> bool {
        self.0.trim().eq_ignore_ascii_case(email.trim())
    }
}

impl fmt::Display for ContractorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContractorId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Contractor pool configuration
///
/// Categories without a pool are served by `fallback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Pool members per category, in configured order
    #[serde(default)]
    pub pools: IndexMap<Category, Vec<ContractorId>>,
    /// Generic contractor for categories without a pool
    #[serde(default = "PoolConfig::default_fallback")]
    pub fallback: ContractorId,
}

impl PoolConfig {
    fn default_fallback() -> ContractorId {
        ContractorId::new("general@resolve360.com")
    }

    /// Pools with no entries at all
    #[must_use]
    pub fn empty() -> Self {
        Self {
            pools: IndexMap::new(),
            fallback: Self::default_fallback(),
        }
    }

    /// With a pool for a category, replacing any existing one
    #[must_use]
    pub fn with_pool(mut self, category: Category, members: &[&str]) -> Self {
        self.pools.insert(
            category,
            members.iter().map(|m| ContractorId::new(*m)).collect(),
        );
        self
    }

    /// Check pools and fallback.
    ///
    /// # Errors
    /// - `EmptyPool` for a configured pool without members
    /// - `EmptyFallback` for a blank fallback identity
    pub fn validate(&self) -> Result<(), TriageConfigError> {
        if self.fallback.as_str().trim().is_empty() {
            return Err(TriageConfigError::EmptyFallback);
        }
        for (category, members) in &self.pools {
            if members.is_empty() || members.iter().any(|m| m.as_str().trim().is_empty()) {
                return Err(TriageConfigError::EmptyPool(*category));
            }
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::empty()
            .with_pool(
                Category::Plumbing,
                &["plumber1@resolve360.com", "plumber2@resolve360.com"],
            )
            .with_pool(
                Category::Electrical,
                &["electrician1@resolve360.com", "electrician2@resolve360.com"],
            )
            .with_pool(
                Category::Civil,
                &["contractor1@resolve360.com", "contractor2@resolve360.com"],
            )
            .with_pool(
                Category::CommonArea,
                &["maintenance1@resolve360.com", "maintenance2@resolve360.com"],
            )
            .with_pool(
                Category::Hvac,
                &["hvac1@resolve360.com", "hvac2@resolve360.com"],
            )
    }
}

/// Picks a position within a non-empty pool
///
/// Implementations may return any index; the assigner clamps it into the
/// pool, so every selector yields a pool member.
pub trait PoolSelector: Send + Sync + fmt::Debug {
    /// Choose an index in `0..pool_len` (`pool_len >= 1`)
    fn select(&self, pool_len: usize) -> usize;
}

/// Uniform random selection
#[derive(Debug)]
pub struct RandomSelector {
    rng: Mutex<StdRng>,
}

impl RandomSelector {
    /// Seeded from the operating system
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Reproducible sequence from a seed
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolSelector for RandomSelector {
    fn select(&self, pool_len: usize) -> usize {
        self.rng.lock().random_range(0..pool_len.max(1))
    }
}

/// Always selects the same position
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedSelector(pub usize);

impl PoolSelector for FixedSelector {
    fn select(&self, _pool_len: usize) -> usize {
        self.0
    }
}

/// Cycles through positions on every call
#[derive(Debug, Default)]
pub struct RoundRobinSelector {
    next: AtomicUsize,
}

impl PoolSelector for RoundRobinSelector {
    fn select(&self, pool_len: usize) -> usize {
        self.next.fetch_add(1, Ordering::Relaxed) % pool_len.max(1)
    }
}

/// Assigns contractors to categories
#[derive(Debug, Clone)]
pub struct ContractorAssigner {
    pools: IndexMap<Category, Vec<ContractorId>>,
    fallback: ContractorId,
    selector: Arc<dyn PoolSelector>,
}

impl ContractorAssigner {
    /// Create an assigner with random selection.
    ///
    /// # Errors
    /// Returns the pool validation error, see [`PoolConfig::validate`].
    pub fn new(config: PoolConfig) -> Result<Self, TriageConfigError> {
        Self::with_selector(config, Arc::new(RandomSelector::new()))
    }

    /// Create an assigner with an explicit selector.
    ///
    /// # Errors
    /// Returns the pool validation error, see [`PoolConfig::validate`].
    pub fn with_selector(
        config: PoolConfig,
        selector: Arc<dyn PoolSelector>,
    ) -> Result<Self, TriageConfigError> {
        config.validate()?;
        Ok(Self {
            pools: config.pools,
            fallback: config.fallback,
            selector,
        })
    }

    /// Members eligible for a category (the fallback alone if unconfigured)
    #[must_use]
    pub fn pool(&self, category: Category) -> &[ContractorId] {
        match self.pools.get(&category) {
            Some(members) if !members.is_empty() => members,
            _ => std::slice::from_ref(&self.fallback),
        }
    }

    /// Pick a contractor for a category.
    ///
    /// Selection is random by default; verify results as pool membership,
    /// not as a specific member.
    #[must_use]
    pub fn assign(&self, category: Category) -> ContractorId {
        let pool = self.pool(category);
        let index = self.selector.select(pool.len()).min(pool.len() - 1);
        let contractor = pool[index].clone();

        tracing::debug!(%category, %contractor, pool_size = pool.len(), "assigned contractor");
        contractor
    }

    /// Generic contractor for unconfigured categories
    #[inline]
    #[must_use]
    pub fn fallback(&self) -> &ContractorId {
        &self.fallback
    }
}

impl Default for ContractorAssigner {
    fn default() -> Self {
        Self {
            pools: PoolConfig::default().pools,
            fallback: PoolConfig::default_fallback(),
            selector: Arc::new(RandomSelector::new()),
        }
    }
}
