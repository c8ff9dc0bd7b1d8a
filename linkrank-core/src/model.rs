use serde::{Deserialize, Serialize};

/// Raw signals gathered for one candidate during a single ranking call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalBundle {
    pub title: String,
    /// Views over the trailing 30-day window
    pub pageviews: u64,
    /// Main-namespace inbound links
    pub backlinks: u64,
    pub extract: String,
    /// Existing graph nodes whose article links here
    pub graph_connections: u64,
    /// Index in the source article's intro link order
    pub link_position: usize,
}

impl SignalBundle {
    pub fn new(title: impl Into<String>, link_position: usize) -> Self {
        Self {
            title: title.into(),
            link_position,
            ..Self::default()
        }
    }

    pub fn has_extract(&self) -> bool {
        !self.extract.trim().is_empty()
    }
}

/// Normalized signals in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalScores {
    pub graph_affinity: f64,
    pub similarity: f64,
    pub authority: f64,
    pub popularity: f64,
    pub link_position: f64,
}

/// One ranked neighbour of the source article.
///
/// `score` is a weighted sum scaled to `[0, 100]`. Some signals are scaled
/// relative to the batch they were ranked in, so only the order of links
/// from the same call is comparable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredLink {
    pub title: String,
    pub score: f64,
    pub signals: SignalScores,
}
