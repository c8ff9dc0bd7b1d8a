//! TF-IDF text similarity between a source extract and candidate extracts.
//!
//! Every call builds its corpus from scratch: the source extract plus one
//! document per candidate. Nothing is cached between calls.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("non-word pattern is valid"));

/// Common English words that carry no topical signal. Only words longer
/// than two characters are listed; shorter tokens are dropped anyway.
const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "also", "and", "any", "are",
    "because", "been", "before", "being", "below", "between", "both", "but", "can", "could",
    "did", "does", "doing", "down", "during", "each", "few", "for", "from", "further",
    "had", "has", "have", "having", "her", "here", "hers", "herself", "him", "himself",
    "his", "how", "into", "its", "itself", "just", "known", "more", "most", "not",
    "now", "off", "once", "one", "only", "other", "our", "ours", "out", "over",
    "own", "same", "she", "should", "some", "such", "than", "that", "the", "their",
    "them", "then", "there", "these", "they", "this", "those", "through", "too", "under",
    "until", "upon", "very", "was", "were", "what", "when", "where", "which", "while",
    "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "may",
    "used", "use", "many", "within", "without", "often", "well", "became", "become",
];

/// Lowercase, strip non-word characters, split on whitespace, and drop
/// short tokens and stop words.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lower, "");

    stripped
        .split_whitespace()
        .filter(|token| token.chars().count() > 2 && !STOP_WORDS.contains(token))
        .map(str::to_string)
        .collect()
}

/// Token counts divided by document length.
pub fn term_frequencies(tokens: &[String]) -> HashMap<String, f64> {
    let mut counts: HashMap<String, f64> = HashMap::new();
    if tokens.is_empty() {
        return counts;
    }

    for token in tokens {
        *counts.entry(token.clone()).or_insert(0.0) += 1.0;
    }

    let len = tokens.len() as f64;
    for value in counts.values_mut() {
        *value /= len;
    }
    counts
}

/// Sparse, non-negative TF-IDF weights for one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TfIdfVector {
    weights: HashMap<String, f64>,
}

impl TfIdfVector {
    pub fn get(&self, token: &str) -> f64 {
        self.weights.get(token).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn norm(&self) -> f64 {
        self.weights.values().map(|w| w * w).sum::<f64>().sqrt()
    }

    pub fn dot(&self, other: &TfIdfVector) -> f64 {
        // Only shared tokens contribute; iterate the smaller side.
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .weights
            .iter()
            .map(|(token, w)| w * large.get(token))
            .sum()
    }
}

/// Document frequencies over one corpus.
#[derive(Debug, Clone)]
pub struct Corpus {
    doc_freq: HashMap<String, usize>,
    total_docs: usize,
}

impl Corpus {
    pub fn new(documents: &[Vec<String>]) -> Self {
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for tokens in documents {
            let unique: HashSet<&String> = tokens.iter().collect();
            for token in unique {
                *doc_freq.entry(token.clone()).or_insert(0) += 1;
            }
        }

        Self {
            doc_freq,
            total_docs: documents.len(),
        }
    }

    /// Smoothed inverse document frequency: `ln(N / (1 + df)) + 1`.
    pub fn idf(&self, token: &str) -> f64 {
        let df = self.doc_freq.get(token).copied().unwrap_or(0) as f64;
        (self.total_docs as f64 / (1.0 + df)).ln() + 1.0
    }

    pub fn vectorize(&self, tokens: &[String]) -> TfIdfVector {
        let weights = term_frequencies(tokens)
            .into_iter()
            .map(|(token, tf)| {
                let weight = tf * self.idf(&token);
                (token, weight)
            })
            .collect();
        TfIdfVector { weights }
    }
}

/// Cosine of the angle between two sparse vectors; 0 when either is empty.
pub fn cosine_similarity(a: &TfIdfVector, b: &TfIdfVector) -> f64 {
    let a_norm = a.norm();
    let b_norm = b.norm();
    if a_norm == 0.0 || b_norm == 0.0 {
        return 0.0;
    }
    (a.dot(b) / (a_norm * b_norm)).clamp(0.0, 1.0)
}

/// Similarity of each candidate text to the source text, in input order.
pub fn similarity_to_source<S: AsRef<str>>(source: &str, candidates: &[S]) -> Vec<f64> {
    let mut documents = Vec::with_capacity(candidates.len() + 1);
    documents.push(tokenize(source));
    documents.extend(candidates.iter().map(|text| tokenize(text.as_ref())));

    let corpus = Corpus::new(&documents);
    let source_vector = corpus.vectorize(&documents[0]);

    documents[1..]
        .iter()
        .map(|tokens| cosine_similarity(&source_vector, &corpus.vectorize(tokens)))
        .collect()
}
