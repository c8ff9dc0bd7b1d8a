// Meta-page filtering for candidate titles

use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

const META_PREFIXES: &[&str] = &[
    "Wikipedia:",
    "Category:",
    "Template:",
    "Help:",
    "Portal:",
    "File:",
    "Image:",
    "Special:",
    "Talk:",
    "User:",
    "Draft:",
    "Module:",
    "Book:",
    "MediaWiki:",
    "TimedText:",
];

const META_MARKERS: &[&str] = &[
    "disambiguation",
    "list of",
    "index of",
    "glossary of",
    "outline of",
    "timeline",
    "chronology",
    "comparison of",
    "history of",
    "bibliography",
    "career",
    "early life",
    "personal life",
];

/// Parenthetical qualifiers that name an academic field rather than a
/// disambiguation variant.
const ALLOWED_QUALIFIERS: &[&str] = &[
    "physics",
    "mathematics",
    "chemistry",
    "biology",
    "philosophy",
    "concept",
    "theory",
];

static YEAR_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\D)(?:1[5-9]|20)\d{2}(?:\D|$)").expect("year pattern is valid")
});

static QUALIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^()]*)\)").expect("qualifier pattern is valid"));

/// Why a title was rejected as a meta page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaReason {
    Namespace(&'static str),
    Marker(&'static str),
    YearToken,
    Qualifier(String),
}

impl fmt::Display for MetaReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaReason::Namespace(prefix) => write!(f, "namespace {}", prefix),
            MetaReason::Marker(marker) => write!(f, "contains \"{}\"", marker),
            MetaReason::YearToken => write!(f, "date-like title"),
            MetaReason::Qualifier(q) => write!(f, "qualifier ({})", q),
        }
    }
}

/// Classify a title, returning the first rule that rejects it.
pub fn classify(title: &str) -> Option<MetaReason> {
    if let Some(prefix) = META_PREFIXES.iter().copied().find(|p| title.starts_with(*p)) {
        return Some(MetaReason::Namespace(prefix));
    }

    let lower = title.to_lowercase();
    if let Some(marker) = META_MARKERS.iter().copied().find(|m| lower.contains(*m)) {
        return Some(MetaReason::Marker(marker));
    }

    if YEAR_TOKEN.is_match(title) {
        return Some(MetaReason::YearToken);
    }

    QUALIFIER
        .captures_iter(&lower)
        .map(|caps| caps[1].trim().to_string())
        .find(|q| !ALLOWED_QUALIFIERS.contains(&q.as_str()))
        .map(MetaReason::Qualifier)
}

pub fn is_meta_page(title: &str) -> bool {
    classify(title).is_some()
}

/// Graph node identity: case-insensitive, underscores read as spaces.
pub fn node_key(title: &str) -> String {
    title.trim().replace('_', " ").to_lowercase()
}

/// Drop meta pages, the source itself, titles already in the graph and
/// duplicates. Order of the surviving candidates is preserved.
pub fn filter_candidates(candidates: &[String], source: &str, existing: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = existing.iter().map(|label| node_key(label)).collect();
    seen.insert(node_key(source));

    candidates
        .iter()
        .filter(|title| !title.trim().is_empty() && !is_meta_page(title))
        .filter(|title| seen.insert(node_key(title)))
        .cloned()
        .collect()
}
