use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Namespace id of encyclopedia articles.
pub const MAIN_NAMESPACE: i64 = 0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    #[serde(default)]
    pub info: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageLink {
    pub ns: i64,
    pub title: String,
    #[serde(default)]
    pub exists: Option<bool>,
}

impl PageLink {
    pub fn is_article(&self) -> bool {
        self.ns == MAIN_NAMESPACE
    }
}

/// `action=parse` response
#[derive(Debug, Clone, Deserialize)]
pub struct ParseResponse {
    pub parse: Option<ParsedPage>,
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParsedPage {
    pub title: String,
    #[serde(default)]
    pub links: Vec<PageLink>,
}

/// `action=query` response, shared by the `extracts`, `links` and
/// `linkshere` props. Only the fields those props fill are modelled.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    #[serde(rename = "continue")]
    pub continuation: Option<BTreeMap<String, serde_json::Value>>,
    pub query: Option<QueryBody>,
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryBody {
    #[serde(default)]
    pub normalized: Vec<TitleMapping>,
    #[serde(default)]
    pub redirects: Vec<TitleMapping>,
    #[serde(default)]
    pub pages: Vec<QueryPage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TitleMapping {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryPage {
    pub title: String,
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub invalid: bool,
    pub extract: Option<String>,
    #[serde(default)]
    pub links: Vec<PageLink>,
    #[serde(default)]
    pub linkshere: Vec<LinkHere>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkHere {
    pub pageid: Option<u64>,
}

impl QueryPage {
    /// Fold a continuation round for the same page into this one.
    pub fn merge(&mut self, other: QueryPage) {
        if self.extract.as_deref().is_none_or(str::is_empty) {
            self.extract = other.extract;
        }
        self.links.extend(other.links);
        self.linkshere.extend(other.linkshere);
        self.missing |= other.missing;
        self.invalid |= other.invalid;
    }
}

/// Pages from every continuation round of one batch, keyed by the title
/// the API resolved them to, plus the requested -> resolved title aliases.
#[derive(Debug, Clone, Default)]
pub struct QueryBatch {
    pub pages: HashMap<String, QueryPage>,
    pub aliases: HashMap<String, String>,
    /// Set when continuation stopped at the round limit with results left.
    pub truncated: bool,
}

impl QueryBatch {
    pub fn absorb(&mut self, body: QueryBody) {
        for mapping in body.normalized.into_iter().chain(body.redirects) {
            self.record_alias(mapping.from, mapping.to);
        }
        for page in body.pages {
            match self.pages.get_mut(&page.title) {
                Some(existing) => existing.merge(page),
                None => {
                    self.pages.insert(page.title.clone(), page);
                }
            }
        }
    }

    fn record_alias(&mut self, from: String, to: String) {
        // A redirect target may itself be the target of an earlier
        // normalization, so rewrite chained aliases in place.
        for target in self.aliases.values_mut() {
            if *target == from {
                *target = to.clone();
            }
        }
        self.aliases.entry(from).or_insert(to);
    }

    /// Page for a title as it was requested, following normalization and
    /// redirects.
    pub fn page_for(&self, requested: &str) -> Option<&QueryPage> {
        let resolved = self
            .aliases
            .get(requested)
            .map(String::as_str)
            .unwrap_or(requested);
        self.pages
            .get(resolved)
            .filter(|page| !page.missing && !page.invalid)
    }
}

/// Wikimedia REST page summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSummary {
    pub title: String,
    #[serde(default)]
    pub extract: String,
    pub description: Option<String>,
}

/// Wikimedia REST per-article page views
#[derive(Debug, Clone, Deserialize)]
pub struct PageviewsResponse {
    #[serde(default)]
    pub items: Vec<PageviewItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageviewItem {
    pub views: u64,
}

impl PageviewsResponse {
    pub fn total_views(&self) -> u64 {
        self.items.iter().map(|item| item.views).sum()
    }
}
