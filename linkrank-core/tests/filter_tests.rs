// Tests for meta-page filtering and candidate pool construction

use linkrank_core::filter::{classify, filter_candidates, is_meta_page, node_key, MetaReason};

fn titles(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Meta Page Tests
// ============================================================================

#[test]
fn test_meta_pages_are_rejected() {
    for title in [
        "Wikipedia:Sandbox",
        "List of prime ministers",
        "Albert Einstein (disambiguation)",
        "Timeline of physics",
        "Revolutions of 1848",
    ] {
        assert!(is_meta_page(title), "{} should be rejected", title);
    }
}

#[test]
fn test_articles_are_accepted() {
    for title in ["Quantum mechanics", "Theory (physics)", "World War II", "Photon"] {
        assert!(!is_meta_page(title), "{} should be accepted", title);
    }
}

#[test]
fn test_every_namespace_prefix_is_rejected() {
    for title in [
        "Category:Bosons",
        "Template:Infobox particle",
        "Help:Contents",
        "Portal:Physics",
        "File:Photon.svg",
        "Image:Photon.png",
        "Special:Random",
        "Talk:Photon",
        "User:Example",
        "Draft:Photon gas",
        "Module:Citation",
        "Book:Optics",
        "MediaWiki:Common.css",
        "TimedText:Photon.webm.en.srt",
    ] {
        assert!(
            matches!(classify(title), Some(MetaReason::Namespace(_))),
            "{} should be a namespace page",
            title
        );
    }
}

#[test]
fn test_markers_match_anywhere_in_title() {
    assert!(is_meta_page("Early life of Isaac Newton"));
    assert!(is_meta_page("Einstein's career"));
    assert!(is_meta_page("Chronology of the universe"));
    assert!(is_meta_page("Comparison of optics software"));
    assert!(is_meta_page("INDEX OF PHYSICS ARTICLES"));
}

#[test]
fn test_year_tokens() {
    assert!(is_meta_page("2004 in science"));
    assert!(is_meta_page("Solvay Conference 1927"));
    assert!(!is_meta_page("Apollo 11"));
    assert!(!is_meta_page("Boeing 747"));
    assert!(!is_meta_page("E1234 code"));
}

#[test]
fn test_academic_qualifiers_are_allowed() {
    for title in [
        "Field (physics)",
        "Ring (mathematics)",
        "Bond (chemistry)",
        "Cell (biology)",
        "Being (philosophy)",
        "Energy (concept)",
        "Set (theory)",
    ] {
        assert!(!is_meta_page(title), "{} should be accepted", title);
    }
}

#[test]
fn test_other_qualifiers_are_rejected() {
    assert_eq!(
        classify("Mercury (element)"),
        Some(MetaReason::Qualifier("element".to_string()))
    );
    assert!(is_meta_page("Photon (band)"));
    assert!(is_meta_page("Light (Physics) (album)"));
}

// ============================================================================
// Candidate Pool Tests
// ============================================================================

#[test]
fn test_node_key_normalizes_case_and_underscores() {
    assert_eq!(node_key("Quantum_Mechanics"), "quantum mechanics");
    assert_eq!(node_key("  Photon "), "photon");
}

#[test]
fn test_filter_preserves_order() {
    let candidates = titles(&[
        "Quantum mechanics",
        "Electromagnetic radiation",
        "List of particles",
        "1900 in science",
    ]);
    let filtered = filter_candidates(&candidates, "Photon", &[]);
    assert_eq!(filtered, titles(&["Quantum mechanics", "Electromagnetic radiation"]));
}

#[test]
fn test_filter_drops_source_existing_and_duplicates() {
    let candidates = titles(&["photon", "Light", "Electron", "Electron", "Gluon", ""]);
    let existing = titles(&["light"]);
    let filtered = filter_candidates(&candidates, "Photon", &existing);
    assert_eq!(filtered, titles(&["Electron", "Gluon"]));
}

#[test]
fn test_filter_of_empty_pool() {
    assert!(filter_candidates(&[], "Photon", &titles(&["Light"])).is_empty());
}
