use crate::error::{FetchError, Result};
use crate::response::{
    PageLink, PageSummary, PageviewsResponse, ParseResponse, QueryBatch, QueryResponse,
};
use chrono::NaiveDate;
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use url::Url;

/// Titles per `action=query` request accepted by the remote service.
pub const MAX_BATCH_TITLES: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// MediaWiki action API, e.g. `https://en.wikipedia.org/w/api.php`
    pub api_endpoint: String,
    /// Wikipedia REST base, e.g. `https://en.wikipedia.org/api/rest_v1`
    pub rest_endpoint: String,
    /// Wikimedia metrics REST base, e.g. `https://wikimedia.org/api/rest_v1`
    pub metrics_endpoint: String,
    /// Project name used by the page view metrics, e.g. `en.wikipedia`
    pub project: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    /// Upper bound on in-flight per-title requests
    pub max_concurrent_requests: usize,
    /// Sentences kept in each plain-text extract
    pub extract_sentences: u32,
    /// Continuation rounds followed per batch before giving up
    pub max_continuations: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_endpoint: "https://en.wikipedia.org/w/api.php".to_string(),
            rest_endpoint: "https://en.wikipedia.org/api/rest_v1".to_string(),
            metrics_endpoint: "https://wikimedia.org/api/rest_v1".to_string(),
            project: "en.wikipedia".to_string(),
            user_agent: format!(
                "linkrank/{} (https://github.com/linkrank/linkrank)",
                env!("CARGO_PKG_VERSION")
            ),
            timeout_secs: 10,
            max_retries: 2,
            retry_backoff_ms: 250,
            max_concurrent_requests: 8,
            extract_sentences: 3,
            max_continuations: 10,
        }
    }
}

impl ClientConfig {
    /// Point every endpoint at one base URL laid out like the public
    /// deployment. Used against local mirrors and mock servers.
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            api_endpoint: format!("{}/w/api.php", base),
            rest_endpoint: format!("{}/api/rest_v1", base),
            metrics_endpoint: format!("{}/api/rest_v1", base),
            ..Self::default()
        }
    }
}

/// Client for the encyclopedia content and metrics services.
///
/// Every call parses the response into a narrow typed record; anything
/// unexpected surfaces as a [`FetchError`] for the caller to isolate.
#[derive(Clone)]
pub struct WikiClient {
    client: Client,
    config: ClientConfig,
}

impl WikiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs.div_ceil(2)))
            .pool_max_idle_per_host(config.max_concurrent_requests.max(1))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// REST page summary for one title.
    pub async fn page_summary(&self, title: &str) -> Result<PageSummary> {
        let url = self.rest_url(&self.config.rest_endpoint, &["page", "summary", &path_title(title)])?;
        match self.get_json::<PageSummary>(url, &[]).await {
            Err(FetchError::Status { status: 404, .. }) => Err(FetchError::NotFound(title.to_string())),
            other => other,
        }
    }

    /// Outbound article links of the introduction (section 0), in page order.
    pub async fn intro_links(&self, title: &str) -> Result<Vec<PageLink>> {
        let url = self.api_url()?;
        let params = [
            ("action", "parse".to_string()),
            ("page", title.to_string()),
            ("prop", "links".to_string()),
            ("section", "0".to_string()),
            ("redirects", "1".to_string()),
            ("format", "json".to_string()),
            ("formatversion", "2".to_string()),
        ];

        let response: ParseResponse = self.get_json(url, &params).await?;
        if let Some(error) = response.error {
            return Err(FetchError::Api {
                code: error.code,
                info: error.info,
            });
        }

        let links: Vec<PageLink> = response
            .parse
            .map(|page| page.links)
            .unwrap_or_default()
            .into_iter()
            .filter(PageLink::is_article)
            .collect();

        debug!("{} intro links for {}", links.len(), title);
        Ok(links)
    }

    /// Plain-text intro extracts, keyed by requested title. Titles with no
    /// page or an empty extract are absent from the map.
    pub async fn extracts(&self, titles: &[String]) -> Result<HashMap<String, String>> {
        let params = [
            ("prop", "extracts".to_string()),
            ("exintro", "1".to_string()),
            ("explaintext", "1".to_string()),
            ("exsentences", self.config.extract_sentences.to_string()),
            ("exlimit", "max".to_string()),
        ];
        let batch = self.query_batch(&params, titles).await?;

        Ok(titles
            .iter()
            .filter_map(|title| {
                let extract = batch.page_for(title)?.extract.as_deref()?.trim();
                (!extract.is_empty()).then(|| (title.clone(), extract.to_string()))
            })
            .collect())
    }

    /// Main-namespace inbound link count of one article. A missing page
    /// counts as zero. The count stops growing once `max_continuations`
    /// rounds have been followed.
    pub async fn backlink_count(&self, title: &str) -> Result<u64> {
        let params = [
            ("prop", "linkshere".to_string()),
            ("lhnamespace", "0".to_string()),
            ("lhprop", "pageid".to_string()),
            ("lhlimit", "max".to_string()),
        ];
        let batch = self.query_batch(&params, &[title.to_string()]).await?;

        let count = batch
            .page_for(title)
            .map(|page| page.linkshere.len() as u64)
            .unwrap_or(0);
        if batch.truncated {
            debug!("Backlink count of {} capped at {}", title, count);
        }
        Ok(count)
    }

    /// Inbound link counts keyed by requested title. Each title is counted
    /// by its own request so every title gets the same continuation budget.
    pub async fn backlink_counts(&self, titles: &[String]) -> Result<HashMap<String, u64>> {
        let counts = self.per_title(titles, |title| self.backlink_count(title)).await?;
        Ok(counts.into_iter().collect())
    }

    /// Outbound article links of one page together with the title the API
    /// resolved it to. `None` when the page does not exist.
    pub async fn outbound_links(&self, title: &str) -> Result<Option<(String, Vec<String>)>> {
        let params = [
            ("prop", "links".to_string()),
            ("plnamespace", "0".to_string()),
            ("pllimit", "max".to_string()),
        ];
        let batch = self.query_batch(&params, &[title.to_string()]).await?;

        Ok(batch.page_for(title).map(|page| {
            let links = page
                .links
                .iter()
                .filter(|link| link.is_article())
                .map(|link| link.title.clone())
                .collect();
            (page.title.clone(), links)
        }))
    }

    /// Outbound article links of whole pages, keyed by the page title the
    /// API resolved each requested title to. Titles resolving to the same
    /// page appear once; missing pages are absent.
    pub async fn page_links(&self, titles: &[String]) -> Result<HashMap<String, Vec<String>>> {
        let pages = self.per_title(titles, |title| self.outbound_links(title)).await?;
        Ok(pages.into_iter().filter_map(|(_, page)| page).collect())
    }

    /// Sum of daily user views of one article over `[start, end]`.
    /// An article the metrics service has no data for counts as zero views.
    pub async fn daily_views(&self, title: &str, start: NaiveDate, end: NaiveDate) -> Result<u64> {
        let start = start.format("%Y%m%d").to_string();
        let end = end.format("%Y%m%d").to_string();
        let title = path_title(title);
        let url = self.rest_url(
            &self.config.metrics_endpoint,
            &[
                "metrics",
                "pageviews",
                "per-article",
                &self.config.project,
                "all-access",
                "user",
                &title,
                "daily",
                &start,
                &end,
            ],
        )?;

        match self.get_json::<PageviewsResponse>(url, &[]).await {
            Ok(response) => Ok(response.total_views()),
            Err(FetchError::Status { status: 404, .. }) => Ok(0),
            Err(e) => Err(e),
        }
    }

    /// One request per title, at most `max_concurrent_requests` in flight.
    /// The first failing title fails the whole call.
    async fn per_title<'a, T, F, Fut>(&self, titles: &'a [String], fetch: F) -> Result<Vec<(String, T)>>
    where
        F: Fn(&'a str) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let semaphore = Semaphore::new(self.config.max_concurrent_requests.max(1));
        let requests = titles.iter().map(|title| {
            let semaphore = &semaphore;
            let fetch = &fetch;
            async move {
                let _permit = semaphore.acquire().await.ok();
                fetch(title.as_str()).await.map(|value| (title.clone(), value))
            }
        });

        join_all(requests).await.into_iter().collect()
    }

    /// Run one `action=query` batch and follow its continuations.
    async fn query_batch(&self, params: &[(&str, String)], titles: &[String]) -> Result<QueryBatch> {
        if titles.len() > MAX_BATCH_TITLES {
            return Err(FetchError::BatchTooLarge {
                len: titles.len(),
                max: MAX_BATCH_TITLES,
            });
        }

        let mut batch = QueryBatch::default();
        if titles.is_empty() {
            return Ok(batch);
        }

        let url = self.api_url()?;
        let mut base: Vec<(&str, String)> = vec![
            ("action", "query".to_string()),
            ("titles", titles.join("|")),
            ("redirects", "1".to_string()),
            ("format", "json".to_string()),
            ("formatversion", "2".to_string()),
        ];
        base.extend(params.iter().cloned());

        let mut continuation: Vec<(String, String)> = Vec::new();
        let mut rounds = 0;

        loop {
            let mut request: Vec<(&str, String)> = base.clone();
            request.extend(continuation.iter().map(|(k, v)| (k.as_str(), v.clone())));

            let response: QueryResponse = self.get_json(url.clone(), &request).await?;
            if let Some(error) = response.error {
                return Err(FetchError::Api {
                    code: error.code,
                    info: error.info,
                });
            }
            if let Some(body) = response.query {
                batch.absorb(body);
            }

            let Some(next) = response.continuation else {
                break;
            };
            rounds += 1;
            if rounds > self.config.max_continuations {
                batch.truncated = true;
                warn!(
                    "Stopping after {} continuation rounds for {} titles",
                    self.config.max_continuations,
                    titles.len()
                );
                break;
            }
            continuation = next
                .into_iter()
                .map(|(key, value)| {
                    let value = match value {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    (key, value)
                })
                .collect();
        }

        Ok(batch)
    }

    /// GET and decode JSON, retrying transient failures with linear backoff.
    async fn get_json<T: DeserializeOwned>(&self, url: Url, query: &[(&str, String)]) -> Result<T> {
        let mut attempt = 0;
        loop {
            match self.try_get_json(url.clone(), query).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = Duration::from_millis(self.config.retry_backoff_ms * u64::from(attempt));
                    warn!("Request to {} failed ({}), retry {} in {:?}", url, e, attempt, delay);
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_get_json<T: DeserializeOwned>(&self, url: Url, query: &[(&str, String)]) -> Result<T> {
        debug!("Fetching {}", url);

        let response = self.client.get(url.clone()).query(query).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn api_url(&self) -> Result<Url> {
        Url::parse(&self.config.api_endpoint)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", self.config.api_endpoint, e)))
    }

    fn rest_url(&self, base: &str, segments: &[&str]) -> Result<Url> {
        let mut url =
            Url::parse(base).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", base, e)))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(format!("{} cannot be a base", base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// REST endpoints address articles by their underscore form.
fn path_title(title: &str) -> String {
    title.trim().replace(' ', "_")
}
