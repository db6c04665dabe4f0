//! Configuration module for the analysis engine.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `RCA_` and use double underscores
//! to separate nested levels:
//! - `RCA_CLUSTERING__SEED=7` sets `clustering.seed`
//! - `RCA_SEARCH__DEFAULT_TOP_K=10` sets `search.default_top_k`
//! - `RCA_LOGGING__LEVEL=debug` sets `logging.level`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::analysis::{
    ClusterOptions, DEFAULT_CORRELATION_LIMIT, DEFAULT_PREVIEW_SIZE, MAX_CORRELATION_LIMIT,
    MAX_PREVIEW_SIZE,
};
use crate::vector::{
    DEFAULT_MAX_ITERATIONS, DEFAULT_N_INIT, DEFAULT_SEED, DEFAULT_TOLERANCE, KMeansConfig,
    VectorDimension,
};

/// Directory searched for in the current directory and its ancestors
pub const CONFIG_DIR: &str = ".rootcause";

const ENV_PREFIX: &str = "RCA_";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Embedding space settings
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Similarity search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Failure-pattern clustering settings
    #[serde(default)]
    pub clustering: ClusteringConfig,

    /// Deployment correlation settings
    #[serde(default)]
    pub correlation: CorrelationConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EmbeddingConfig {
    /// Dimension every stored embedding and query vector must have
    #[serde(default)]
    pub dimension: VectorDimension,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SearchConfig {
    /// Number of matches returned when the caller does not say
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ClusteringConfig {
    /// Number of clusters requested when the caller does not say
    #[serde(default = "default_clusters")]
    pub default_clusters: usize,

    /// Seed for centroid initialization; fixed so runs are reproducible
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Seeded restarts; the lowest-inertia partition wins
    #[serde(default = "default_n_init")]
    pub n_init: usize,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Convergence tolerance on centroid movement
    #[serde(default = "default_tolerance")]
    pub tolerance: f32,

    /// Member records shown per cluster, capped at 5
    #[serde(default = "default_preview_size")]
    pub preview_size: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CorrelationConfig {
    /// Maximum number of deployment/log pairs returned, capped at 20
    #[serde(default = "default_correlation_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_top_k() -> usize {
    5
}
fn default_clusters() -> usize {
    5
}
fn default_seed() -> u64 {
    DEFAULT_SEED
}
fn default_n_init() -> usize {
    DEFAULT_N_INIT
}
fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}
fn default_tolerance() -> f32 {
    DEFAULT_TOLERANCE
}
fn default_preview_size() -> usize {
    DEFAULT_PREVIEW_SIZE
}
fn default_correlation_limit() -> usize {
    DEFAULT_CORRELATION_LIMIT
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            embedding: EmbeddingConfig::default(),
            search: SearchConfig::default(),
            clustering: ClusteringConfig::default(),
            correlation: CorrelationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimension: VectorDimension::default(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_top_k: default_top_k(),
        }
    }
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            default_clusters: default_clusters(),
            seed: default_seed(),
            n_init: default_n_init(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            preview_size: default_preview_size(),
        }
    }
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            limit: default_correlation_limit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ClusteringConfig {
    pub fn kmeans(&self) -> KMeansConfig {
        KMeansConfig {
            seed: self.seed,
            n_init: self.n_init,
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
        }
    }

    pub fn options(&self) -> ClusterOptions {
        ClusterOptions {
            kmeans: self.kmeans(),
            preview_size: self.preview_size.min(MAX_PREVIEW_SIZE),
        }
    }
}

impl CorrelationConfig {
    /// Configured limit lowered to [`MAX_CORRELATION_LIMIT`].
    pub fn effective_limit(&self) -> usize {
        self.limit.min(MAX_CORRELATION_LIMIT)
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        // Try to find the workspace config by looking for .rootcause directory
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));

        Self::load_from(config_path)
    }

    /// Load configuration from a specific file, still honoring env overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(path.as_ref()))
            // Double underscore (__) separates nested levels,
            // single underscore (_) remains as is within field names
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".")
                    .into()
            }))
            .extract::<Settings>()
            .map_err(Box::new)
            .inspect(Settings::warn_on_capped_values)
    }

    fn warn_on_capped_values(&self) {
        if self.clustering.preview_size > MAX_PREVIEW_SIZE {
            warn!(
                configured = self.clustering.preview_size,
                max = MAX_PREVIEW_SIZE,
                "clustering.preview_size exceeds the maximum and will be capped"
            );
        }
        if self.correlation.limit > MAX_CORRELATION_LIMIT {
            warn!(
                configured = self.correlation.limit,
                max = MAX_CORRELATION_LIMIT,
                "correlation.limit exceeds the maximum and will be capped"
            );
        }
    }

    /// Find the workspace config by looking for the .rootcause directory
    /// Searches from current directory up to root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(CONFIG_DIR);
            if config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }

        None
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Render the effective settings as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
