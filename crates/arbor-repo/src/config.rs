use serde::{Deserialize, Serialize};

use crate::error::{RepoError, RepoResult};

/// Configuration for a [`Repository`](crate::Repository).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Maximum number of trees kept in the cache. When exceeded, the
    /// oldest clean trees are evicted; trees with unwritten changes are never
    /// evicted implicitly. `0` disables eviction.
    pub cache_capacity: usize,
    /// Re-hash every fetched object and reject it if the digest does not
    /// match the ID it was fetched under.
    pub verify_reads: bool,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 1024,
            verify_reads: false,
        }
    }
}

impl RepoConfig {
    /// Default capacity with read verification turned on.
    pub fn verified() -> Self {
        Self {
            verify_reads: true,
            ..Default::default()
        }
    }

    /// Parse from TOML. Missing keys take their default values.
    pub fn from_toml_str(s: &str) -> RepoResult<Self> {
        toml::from_str(s).map_err(|e| RepoError::Config(e.to_string()))
    }
}
