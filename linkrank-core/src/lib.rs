pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod normalize;
pub mod rank;
pub mod report;
pub mod score;
pub mod signals;
pub mod similarity;

pub use config::{RankConfig, Weights};
pub use error::RankError;
pub use model::{ScoredLink, SignalBundle, SignalScores};
pub use rank::{LinkRanker, rank_links};
