//! Ranking orchestration.
//!
//! One call runs the pipeline end to end: intro links of the source are
//! extracted and filtered, the per-signal collectors run concurrently under
//! a shared deadline, and the gathered bundles are scored and cut to the
//! configured top-N. Collectors never abort a ranking; a failing signal is
//! read as neutral for every candidate.

use crate::config::RankConfig;
use crate::error::{RankError, Result};
use crate::filter::{classify, filter_candidates, node_key};
use crate::model::{ScoredLink, SignalBundle};
use crate::score::score_bundles;
use crate::signals::{
    GraphAffinity, collect_authority, collect_extracts, collect_graph_affinity, collect_popularity,
    isolate,
};
use chrono::{NaiveDate, Utc};
use linkrank_fetch::WikiClient;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, info, warn};

/// Rank the most relevant outbound links of `source` with an existing client.
pub async fn rank_links(
    client: &WikiClient,
    config: &RankConfig,
    source: &str,
    existing: &[String],
) -> Result<Vec<ScoredLink>> {
    LinkRanker::with_client(client.clone(), config.clone())?
        .rank_links(source, existing)
        .await
}

/// Outcome of filtering one extracted intro link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Verdict {
    Kept,
    Meta(String),
    Source,
    Existing,
    Duplicate,
    OverLimit,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Kept => write!(f, "kept"),
            Verdict::Meta(reason) => write!(f, "meta page: {}", reason),
            Verdict::Source => write!(f, "source article"),
            Verdict::Existing => write!(f, "already in graph"),
            Verdict::Duplicate => write!(f, "duplicate"),
            Verdict::OverLimit => write!(f, "over candidate limit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateVerdict {
    pub title: String,
    pub verdict: Verdict,
}

pub struct LinkRanker {
    client: WikiClient,
    config: RankConfig,
    today: Option<NaiveDate>,
}

impl LinkRanker {
    /// Validate `config` and build a client from its `client` section.
    pub fn new(config: RankConfig) -> Result<Self> {
        let client = WikiClient::new(config.client.clone())?;
        Self::with_client(client, config)
    }

    /// Validate `config` and rank through an existing client.
    pub fn with_client(client: WikiClient, config: RankConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client,
            config,
            today: None,
        })
    }

    /// Pin the date the page view window is measured back from.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn config(&self) -> &RankConfig {
        &self.config
    }

    pub async fn rank_links(&self, source: &str, existing: &[String]) -> Result<Vec<ScoredLink>> {
        let source = source.trim();
        if source.is_empty() {
            return Err(RankError::EmptySourceTitle);
        }

        let existing = distinct_existing(existing);
        info!("Ranking links of {} against {} existing nodes", source, existing.len());

        let extracted = self.candidates(source).await;
        let mut pool = filter_candidates(&extracted, source, &existing);
        pool.truncate(self.config.max_candidates);
        debug!("{} of {} intro links survive filtering", pool.len(), extracted.len());

        if pool.is_empty() {
            info!("No candidate links for {}", source);
            return Ok(Vec::new());
        }

        let collected = self.collect_signals(source, &pool, &existing).await;
        let source_extract = self.source_extract(source, collected.summary).await;

        let ranked = score_bundles(
            &collected.bundles,
            &source_extract,
            collected.existing_pages,
            pool.len(),
            &self.config,
        );

        info!("Ranked {} links for {}", ranked.len(), source);
        Ok(ranked)
    }

    /// Intro links of `source` in page order. Extraction failure yields an
    /// empty list.
    pub async fn candidates(&self, source: &str) -> Vec<String> {
        match self.client.intro_links(source).await {
            Ok(links) => links.into_iter().map(|link| link.title).collect(),
            Err(e) => {
                warn!("Failed to extract links from {}: {}", source, e);
                Vec::new()
            }
        }
    }

    /// Every extracted intro link with the filtering decision made for it.
    pub async fn candidate_verdicts(&self, source: &str, existing: &[String]) -> Vec<CandidateVerdict> {
        let source = source.trim();
        let extracted = self.candidates(source).await;
        verdicts(&extracted, source, existing, self.config.max_candidates)
    }

    /// Run every collector concurrently and fold the results into one bundle
    /// per candidate, in pool order.
    async fn collect_signals(&self, source: &str, pool: &[String], existing: &[String]) -> Collected {
        let deadline = self.config.collector_timeout();
        let weights = &self.config.weights;
        let today = self.today.unwrap_or_else(|| Utc::now().date_naive());

        let popularity = async {
            if weights.popularity == 0.0 {
                return HashMap::new();
            }
            isolate("popularity", deadline, collect_popularity(&self.client, pool, today)).await
        };
        let authority = async {
            if weights.authority == 0.0 {
                return HashMap::new();
            }
            isolate("authority", deadline, collect_authority(&self.client, pool)).await
        };
        let affinity = async {
            if weights.graph_affinity == 0.0 || existing.is_empty() {
                return GraphAffinity::default();
            }
            isolate(
                "graph_affinity",
                deadline,
                collect_graph_affinity(&self.client, pool, existing, self.config.max_existing),
            )
            .await
        };
        let extracts = isolate("extracts", deadline, collect_extracts(&self.client, pool));
        let summary = async {
            match tokio::time::timeout(deadline, self.client.page_summary(source)).await {
                Ok(Ok(summary)) => Some(summary.extract),
                Ok(Err(e)) => {
                    debug!("No summary for {}: {}", source, e);
                    None
                }
                Err(_) => {
                    debug!("Summary request for {} timed out", source);
                    None
                }
            }
        };

        let (mut popularity, mut authority, mut affinity, mut extracts, summary) =
            tokio::join!(popularity, authority, affinity, extracts, summary);

        let bundles = pool
            .iter()
            .enumerate()
            .map(|(position, title)| SignalBundle {
                pageviews: popularity.remove(title).unwrap_or(0),
                backlinks: authority.remove(title).unwrap_or(0),
                extract: extracts.remove(title).unwrap_or_default(),
                graph_connections: affinity.counts.remove(title).unwrap_or(0),
                ..SignalBundle::new(title.clone(), position)
            })
            .collect();

        Collected {
            bundles,
            summary,
            existing_pages: affinity.pages,
        }
    }

    /// Source text the candidates are compared against: the summary extract,
    /// or a plain extract lookup when the summary was missing or empty.
    async fn source_extract(&self, source: &str, summary: Option<String>) -> String {
        if let Some(extract) = summary
            && !extract.trim().is_empty()
        {
            return extract;
        }

        let titles = [source.to_string()];
        match self.client.extracts(&titles).await {
            Ok(mut found) => found.remove(source).unwrap_or_default(),
            Err(e) => {
                warn!("No extract for source {}: {}", source, e);
                String::new()
            }
        }
    }
}

/// Gathered signals of one ranking.
struct Collected {
    bundles: Vec<SignalBundle>,
    /// Source summary extract, when the summary endpoint produced one
    summary: Option<String>,
    /// Existing-node pages the graph affinity was counted over
    existing_pages: usize,
}

/// Existing labels as a set of graph nodes: blank labels dropped, one label
/// per node key, first spelling kept.
fn distinct_existing(existing: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    existing
        .iter()
        .filter(|label| !label.trim().is_empty() && seen.insert(node_key(label)))
        .cloned()
        .collect()
}

/// Filtering decisions for extracted links, mirroring `filter_candidates`
/// followed by truncation to `max_candidates`.
pub fn verdicts(
    extracted: &[String],
    source: &str,
    existing: &[String],
    max_candidates: usize,
) -> Vec<CandidateVerdict> {
    let existing: HashSet<String> = existing.iter().map(|label| node_key(label)).collect();
    let source_key = node_key(source);
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = 0usize;

    extracted
        .iter()
        .map(|title| {
            let key = node_key(title);
            let verdict = if let Some(reason) = classify(title) {
                Verdict::Meta(reason.to_string())
            } else if key == source_key {
                Verdict::Source
            } else if existing.contains(&key) {
                Verdict::Existing
            } else if !seen.insert(key) {
                Verdict::Duplicate
            } else if kept >= max_candidates {
                Verdict::OverLimit
            } else {
                kept += 1;
                Verdict::Kept
            };
            CandidateVerdict {
                title: title.clone(),
                verdict,
            }
        })
        .collect()
}
