// Weighted scoring and top-N ranking of candidate signal bundles

use crate::config::{RankConfig, Weights};
use crate::model::{ScoredLink, SignalBundle, SignalScores};
use crate::normalize::link_position_score;
use crate::similarity::similarity_to_source;
use tracing::debug;

/// Weighted sum of normalized signals, scaled to `[0, 100]`.
pub fn weighted_score(signals: &SignalScores, weights: &Weights) -> f64 {
    let sum = signals.graph_affinity * weights.graph_affinity
        + signals.similarity * weights.similarity
        + signals.authority * weights.authority
        + signals.popularity * weights.popularity
        + signals.link_position * weights.link_position;
    sum * 100.0
}

/// Stable sort by descending score, then keep the first `top_n`. Links with
/// equal scores keep their incoming order.
pub fn rank(mut links: Vec<ScoredLink>, top_n: usize) -> Vec<ScoredLink> {
    links.sort_by(|a, b| b.score.total_cmp(&a.score));
    links.truncate(top_n);
    links
}

/// Score every bundle with a non-empty extract and return the top-N.
///
/// `bundles` must be in extractor order; `pool_len` is the size of the
/// filtered candidate pool the link positions refer to.
pub fn score_bundles(
    bundles: &[SignalBundle],
    source_extract: &str,
    existing_len: usize,
    pool_len: usize,
    config: &RankConfig,
) -> Vec<ScoredLink> {
    let scorable: Vec<&SignalBundle> = bundles.iter().filter(|b| b.has_extract()).collect();
    if scorable.is_empty() {
        return Vec::new();
    }
    if scorable.len() < bundles.len() {
        debug!(
            "Dropped {} candidates without an extract",
            bundles.len() - scorable.len()
        );
    }

    let extracts: Vec<&str> = scorable.iter().map(|b| b.extract.as_str()).collect();
    let similarity_raw = similarity_to_source(source_extract, &extracts);

    let column = |f: fn(&SignalBundle) -> f64| -> Vec<f64> {
        scorable.iter().map(|b| f(*b)).collect()
    };
    let popularity_raw = column(|b| b.pageviews as f64);
    let authority_raw = column(|b| b.backlinks as f64);
    let affinity_raw = column(|b| b.graph_connections as f64);

    let n = &config.normalization;
    let popularity = n.popularity.apply(&popularity_raw, existing_len);
    let authority = n.authority.apply(&authority_raw, existing_len);
    let similarity = n.similarity.apply(&similarity_raw, existing_len);
    let affinity = n.graph_affinity.apply(&affinity_raw, existing_len);

    let links = scorable
        .iter()
        .enumerate()
        .map(|(i, bundle)| {
            let signals = SignalScores {
                graph_affinity: if existing_len == 0 { 0.0 } else { affinity[i] },
                similarity: similarity[i],
                authority: authority[i],
                popularity: popularity[i],
                link_position: link_position_score(bundle.link_position, pool_len),
            };
            ScoredLink {
                title: bundle.title.clone(),
                score: weighted_score(&signals, &config.weights),
                signals,
            }
        })
        .collect();

    rank(links, config.top_n)
}
