// Signal collectors: one fetcher per relevance signal

use chrono::{Days, NaiveDate};
use futures::future::join_all;
use linkrank_fetch::{FetchError, MAX_BATCH_TITLES, WikiClient};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Trailing 30-day view window: `[today - 31 days, today - 1 day]`.
pub fn pageview_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today.checked_sub_days(Days::new(31)).unwrap_or(NaiveDate::MIN);
    let end = today.checked_sub_days(Days::new(1)).unwrap_or(NaiveDate::MIN);
    (start, end)
}

/// Run one collector under a deadline. Errors and timeouts degrade to the
/// signal's neutral value so one failing source never aborts a ranking.
pub async fn isolate<T, F>(signal: &str, deadline: Duration, collector: F) -> T
where
    T: Default,
    F: Future<Output = Result<T, FetchError>>,
{
    match tokio::time::timeout(deadline, collector).await {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            warn!(signal, error = %e, "Signal collector failed, using neutral values");
            T::default()
        }
        Err(_) => {
            warn!(signal, ?deadline, "Signal collector timed out, using neutral values");
            T::default()
        }
    }
}

/// Views over the trailing window, one request per title, at most
/// `max_concurrent_requests` in flight. A title whose request fails counts
/// as zero views.
pub async fn collect_popularity(
    client: &WikiClient,
    titles: &[String],
    today: NaiveDate,
) -> Result<HashMap<String, u64>, FetchError> {
    let (start, end) = pageview_window(today);
    let semaphore = Semaphore::new(client.config().max_concurrent_requests.max(1));

    let requests = titles.iter().map(|title| {
        let semaphore = &semaphore;
        async move {
            let _permit = semaphore.acquire().await.ok();
            let views = match client.daily_views(title, start, end).await {
                Ok(views) => views,
                Err(e) => {
                    debug!("No page views for {}: {}", title, e);
                    0
                }
            };
            (title.clone(), views)
        }
    });

    Ok(join_all(requests).await.into_iter().collect())
}

/// Inbound main-namespace link counts, one request per title.
pub async fn collect_authority(
    client: &WikiClient,
    titles: &[String],
) -> Result<HashMap<String, u64>, FetchError> {
    client.backlink_counts(titles).await
}

/// Intro extracts for the first batch of titles.
pub async fn collect_extracts(
    client: &WikiClient,
    titles: &[String],
) -> Result<HashMap<String, String>, FetchError> {
    client.extracts(first_batch(titles)).await
}

/// Link counts per candidate from the existing graph, and how many existing
/// pages they were counted over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphAffinity {
    pub counts: HashMap<String, u64>,
    pub pages: usize,
}

/// For each candidate, the number of distinct existing-node articles that
/// link to it. `existing` is expected to hold one label per node; only the
/// first `max_existing` are consulted. Labels resolving to the same page
/// count as one page; labels with no page are left out.
pub async fn collect_graph_affinity(
    client: &WikiClient,
    candidates: &[String],
    existing: &[String],
    max_existing: usize,
) -> Result<GraphAffinity, FetchError> {
    if existing.is_empty() || candidates.is_empty() {
        return Ok(GraphAffinity::default());
    }

    let consulted = &existing[..existing.len().min(max_existing)];
    let page_links = client.page_links(consulted).await?;
    debug!("{} of {} existing nodes resolved to pages", page_links.len(), consulted.len());

    Ok(GraphAffinity {
        counts: count_affinity(candidates, &page_links),
        pages: page_links.len(),
    })
}

/// Count, per candidate, how many pages in `page_links` link to it. A page
/// listing the same link twice counts once.
pub fn count_affinity(
    candidates: &[String],
    page_links: &HashMap<String, Vec<String>>,
) -> HashMap<String, u64> {
    let wanted: HashSet<&str> = candidates.iter().map(String::as_str).collect();
    let mut counts: HashMap<String, u64> = candidates.iter().map(|c| (c.clone(), 0)).collect();

    for links in page_links.values() {
        let linked: HashSet<&str> = links
            .iter()
            .map(String::as_str)
            .filter(|title| wanted.contains(title))
            .collect();
        for title in linked {
            if let Some(count) = counts.get_mut(title) {
                *count += 1;
            }
        }
    }
    counts
}

fn first_batch(titles: &[String]) -> &[String] {
    &titles[..titles.len().min(MAX_BATCH_TITLES)]
}
