//! Mapping raw signals onto a common `[0, 1]` scale.
//!
//! Open-ended counts that are comparable across requests (views,
//! backlinks) use a fixed logarithmic bound. Signals whose ceiling only
//! exists inside the current batch (similarity) are scaled by the batch
//! maximum. Graph affinity is the fraction of the existing graph linking
//! to a candidate.

use serde::{Deserialize, Serialize};

/// Divisor floor for batch-relative scaling.
pub const DEFAULT_EPSILON: f64 = 0.001;

/// Monthly views of a near-top article.
pub const POPULARITY_GLOBAL_MAX: f64 = 50_000_000.0;

/// Inbound links of a near-top article.
pub const AUTHORITY_GLOBAL_MAX: f64 = 2_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Normalization {
    /// `log1p(raw) / log1p(global_max)`
    Log { global_max: f64 },
    /// `raw / max(batch_max, epsilon)`
    BatchMax { epsilon: f64 },
    /// `raw / max(existing_len, 1)`
    ExistingFraction,
}

impl Normalization {
    pub fn batch_max() -> Self {
        Normalization::BatchMax {
            epsilon: DEFAULT_EPSILON,
        }
    }

    /// Normalize a whole batch. `existing_len` is the size of the
    /// existing-node set the batch was gathered against.
    pub fn apply(&self, raw: &[f64], existing_len: usize) -> Vec<f64> {
        match *self {
            Normalization::Log { global_max } => {
                raw.iter().map(|&value| log_scale(value, global_max)).collect()
            }
            Normalization::BatchMax { epsilon } => batch_relative(raw, epsilon),
            Normalization::ExistingFraction => raw
                .iter()
                .map(|&value| existing_fraction(value, existing_len))
                .collect(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match *self {
            Normalization::Log { global_max } if !(global_max.is_finite() && global_max > 0.0) => {
                Err(format!("log global_max must be positive, got {}", global_max))
            }
            Normalization::BatchMax { epsilon } if !(epsilon.is_finite() && epsilon > 0.0) => {
                Err(format!("batch epsilon must be positive, got {}", epsilon))
            }
            _ => Ok(()),
        }
    }
}

pub fn log_scale(raw: f64, global_max: f64) -> f64 {
    if global_max <= 0.0 {
        return 0.0;
    }
    (raw.max(0.0).ln_1p() / global_max.ln_1p()).clamp(0.0, 1.0)
}

pub fn batch_relative(raw: &[f64], epsilon: f64) -> Vec<f64> {
    let max = raw.iter().copied().fold(0.0_f64, f64::max);
    let divisor = max.max(epsilon);
    raw.iter()
        .map(|&value| (value / divisor).clamp(0.0, 1.0))
        .collect()
}

pub fn existing_fraction(raw: f64, existing_len: usize) -> f64 {
    let divisor = existing_len.max(1) as f64;
    (raw / divisor).clamp(0.0, 1.0)
}

/// Earlier links in the intro score higher: `1 - index / pool_len`.
pub fn link_position_score(index: usize, pool_len: usize) -> f64 {
    if pool_len == 0 {
        return 0.0;
    }
    (1.0 - index as f64 / pool_len as f64).clamp(0.0, 1.0)
}
