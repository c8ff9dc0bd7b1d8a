//! Ranking configuration.
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file (default: `~/.config/linkrank/config.toml`), then environment
//! variables prefixed `LINKRANK__` with `__` between nested keys, e.g.
//! `LINKRANK__WEIGHTS__SIMILARITY=0.25` or `LINKRANK__CLIENT__TIMEOUT_SECS=5`.

use crate::error::{RankError, Result};
use crate::normalize::{
    AUTHORITY_GLOBAL_MAX, Normalization, POPULARITY_GLOBAL_MAX,
};
use ::config::{Config, Environment, File, FileFormat};
use linkrank_fetch::{ClientConfig, MAX_BATCH_TITLES};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Unexpanded location of the user configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "~/.config/linkrank/config.toml";

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Per-signal weights of the final score. Must be non-negative and sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub graph_affinity: f64,
    pub similarity: f64,
    pub authority: f64,
    pub popularity: f64,
    pub link_position: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            graph_affinity: 0.40,
            similarity: 0.30,
            authority: 0.20,
            popularity: 0.10,
            link_position: 0.0,
        }
    }
}

impl Weights {
    /// Trades authority for the source's own link order.
    pub fn link_position() -> Self {
        Self {
            graph_affinity: 0.40,
            similarity: 0.30,
            authority: 0.0,
            popularity: 0.20,
            link_position: 0.10,
        }
    }

    /// Named weighting scheme: `default` or `link-position`.
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" => Some(Self::default()),
            "link-position" | "link_position" => Some(Self::link_position()),
            _ => None,
        }
    }

    pub fn total(&self) -> f64 {
        self.graph_affinity + self.similarity + self.authority + self.popularity + self.link_position
    }

    pub fn validate(&self) -> Result<()> {
        let named = [
            ("graph_affinity", self.graph_affinity),
            ("similarity", self.similarity),
            ("authority", self.authority),
            ("popularity", self.popularity),
            ("link_position", self.link_position),
        ];
        if let Some((name, value)) = named.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
            return Err(RankError::InvalidConfig(format!(
                "weight {} must be a non-negative number, got {}",
                name, value
            )));
        }

        let total = self.total();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(RankError::InvalidConfig(format!(
                "weights must sum to 1.0, got {:.6}",
                total
            )));
        }
        Ok(())
    }
}

/// Normalization strategy for each signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    pub popularity: Normalization,
    pub authority: Normalization,
    pub similarity: Normalization,
    pub graph_affinity: Normalization,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            popularity: Normalization::Log {
                global_max: POPULARITY_GLOBAL_MAX,
            },
            authority: Normalization::Log {
                global_max: AUTHORITY_GLOBAL_MAX,
            },
            similarity: Normalization::batch_max(),
            graph_affinity: Normalization::ExistingFraction,
        }
    }
}

impl NormalizationConfig {
    /// Every open-ended count scaled by its batch maximum instead of a
    /// global bound.
    pub fn batch_relative() -> Self {
        Self {
            popularity: Normalization::batch_max(),
            authority: Normalization::batch_max(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankConfig {
    /// Links returned per ranking
    pub top_n: usize,
    /// Candidates scored per ranking, in intro link order
    pub max_candidates: usize,
    /// Existing graph nodes consulted for graph affinity
    pub max_existing: usize,
    /// Deadline for each signal collector
    pub collector_timeout_secs: u64,
    pub weights: Weights,
    pub normalization: NormalizationConfig,
    pub client: ClientConfig,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            top_n: 7,
            max_candidates: MAX_BATCH_TITLES,
            max_existing: MAX_BATCH_TITLES,
            collector_timeout_secs: 15,
            weights: Weights::default(),
            normalization: NormalizationConfig::default(),
            client: ClientConfig::default(),
        }
    }
}

impl RankConfig {
    /// Defaults, then `path` (when given, it must exist), then `LINKRANK__*`
    /// environment variables. The result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&RankConfig::default())?);

        if let Some(path) = path {
            info!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        let config: RankConfig = builder
            .add_source(
                Environment::with_prefix("LINKRANK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Parse a TOML document on top of the defaults, without consulting
    /// the environment.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: RankConfig = Config::builder()
            .add_source(Config::try_from(&RankConfig::default())?)
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn collector_timeout(&self) -> Duration {
        Duration::from_secs(self.collector_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;

        if self.top_n == 0 {
            return Err(RankError::InvalidConfig("top_n must be at least 1".to_string()));
        }
        if !(1..=MAX_BATCH_TITLES).contains(&self.max_candidates) {
            return Err(RankError::InvalidConfig(format!(
                "max_candidates must be between 1 and {}, got {}",
                MAX_BATCH_TITLES, self.max_candidates
            )));
        }
        if !(1..=MAX_BATCH_TITLES).contains(&self.max_existing) {
            return Err(RankError::InvalidConfig(format!(
                "max_existing must be between 1 and {}, got {}",
                MAX_BATCH_TITLES, self.max_existing
            )));
        }
        if self.collector_timeout_secs == 0 {
            return Err(RankError::InvalidConfig(
                "collector_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.client.max_concurrent_requests == 0 {
            return Err(RankError::InvalidConfig(
                "client.max_concurrent_requests must be at least 1".to_string(),
            ));
        }

        let n = &self.normalization;
        for (name, strategy) in [
            ("popularity", n.popularity),
            ("authority", n.authority),
            ("similarity", n.similarity),
            ("graph_affinity", n.graph_affinity),
        ] {
            strategy
                .validate()
                .map_err(|e| RankError::InvalidConfig(format!("normalization.{}: {}", name, e)))?;
        }

        Ok(())
    }
}
