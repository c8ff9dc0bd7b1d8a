// Tests for tokenization and TF-IDF cosine similarity

use linkrank_core::similarity::{cosine_similarity, similarity_to_source, tokenize, Corpus};

// ============================================================================
// Tokenizer Tests
// ============================================================================

#[test]
fn test_tokenize_lowercases_and_strips_punctuation() {
    assert_eq!(
        tokenize("Photons, carry MOMENTUM!"),
        vec!["photons", "carry", "momentum"]
    );
}

#[test]
fn test_tokenize_drops_short_tokens_and_stop_words() {
    assert_eq!(tokenize("It is the speed of light"), vec!["speed", "light"]);
}

#[test]
fn test_tokenize_joins_hyphenated_words() {
    assert_eq!(tokenize("wave-particle duality"), vec!["waveparticle", "duality"]);
}

#[test]
fn test_tokenize_is_idempotent() {
    let text = "Quantum electrodynamics describes how light and matter interact.";
    let once = tokenize(text);
    let twice = tokenize(&once.join(" "));
    assert_eq!(once, twice);
}

#[test]
fn test_tokenize_of_empty_text() {
    assert!(tokenize("").is_empty());
    assert!(tokenize("a an of ...").is_empty());
}

// ============================================================================
// Similarity Tests
// ============================================================================

#[test]
fn test_identical_documents_have_similarity_one() {
    let text = "Photons are massless particles of electromagnetic radiation.";
    let scores = similarity_to_source(text, &[text]);
    assert!((scores[0] - 1.0).abs() < 1e-9);
}

#[test]
fn test_disjoint_documents_have_similarity_zero() {
    let scores = similarity_to_source("photon light radiation", &["banana orchard harvest"]);
    assert_eq!(scores, vec![0.0]);
}

#[test]
fn test_empty_documents_have_similarity_zero() {
    assert_eq!(similarity_to_source("", &["photon light"]), vec![0.0]);
    assert_eq!(similarity_to_source("photon light", &[""]), vec![0.0]);
}

#[test]
fn test_similarity_is_bounded_and_ordered() {
    let source = "Photon elementary particle electromagnetic radiation light";
    let candidates = [
        "Electromagnetic radiation carries light as photon particles",
        "Quantum mechanics describes particle behaviour",
        "Medieval castle architecture",
    ];
    let scores = similarity_to_source(source, &candidates);

    assert_eq!(scores.len(), 3);
    assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
    assert!(scores[0] > scores[1]);
    assert!(scores[1] > scores[2]);
}

#[test]
fn test_cosine_is_symmetric() {
    let docs = vec![
        tokenize("photon light electromagnetic"),
        tokenize("light wave optics"),
    ];
    let corpus = Corpus::new(&docs);
    let a = corpus.vectorize(&docs[0]);
    let b = corpus.vectorize(&docs[1]);

    assert!((cosine_similarity(&a, &b) - cosine_similarity(&b, &a)).abs() < 1e-12);
}

#[test]
fn test_scores_follow_candidate_order() {
    let source = "photon light";
    let forward = similarity_to_source(source, &["photon", "castle"]);
    let reverse = similarity_to_source(source, &["castle", "photon"]);
    assert_eq!(forward[0], reverse[1]);
    assert_eq!(forward[1], reverse[0]);
}
