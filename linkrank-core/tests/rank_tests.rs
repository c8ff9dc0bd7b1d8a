// End-to-end ranking tests against a mock encyclopedia

use chrono::NaiveDate;
use linkrank_core::rank::Verdict;
use linkrank_core::{LinkRanker, RankConfig, RankError, Weights, rank_links};
use linkrank_fetch::{ClientConfig, WikiClient};
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PHOTON_INTRO: &str = "A photon is an elementary particle that is a quantum of the \
    electromagnetic field, including electromagnetic radiation such as light and radio waves.";

fn test_config(server: &MockServer) -> RankConfig {
    RankConfig {
        client: ClientConfig {
            retry_backoff_ms: 1,
            ..ClientConfig::with_base_url(&server.uri())
        },
        ..RankConfig::default()
    }
}

fn ranker_for(server: &MockServer) -> LinkRanker {
    LinkRanker::new(test_config(server))
        .unwrap()
        .with_today(NaiveDate::from_ymd_opt(2025, 10, 17).unwrap())
}

fn titles(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

async fn mount_intro_links(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("action", "parse"))
        .and(query_param("page", "Photon"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "parse": {
                "title": "Photon",
                "links": [
                    {"ns": 0, "title": "Quantum mechanics", "exists": true},
                    {"ns": 0, "title": "Electromagnetic radiation", "exists": true},
                    {"ns": 0, "title": "List of particles", "exists": true},
                    {"ns": 0, "title": "1900 in science", "exists": true}
                ]
            }
        })))
        .mount(server)
        .await;
}

async fn mount_summary(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/rest_v1/page/summary/Photon"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "title": "Photon",
            "extract": PHOTON_INTRO,
        })))
        .mount(server)
        .await;
}

async fn mount_extracts(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("action", "query"))
        .and(query_param("prop", "extracts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "query": {"pages": [
                {"title": "Photon", "extract": PHOTON_INTRO},
                {"title": "Quantum mechanics", "extract": "Quantum mechanics is a fundamental theory describing nature at the scale of atoms and subatomic particles."},
                {"title": "Electromagnetic radiation", "extract": "Electromagnetic radiation consists of waves of the electromagnetic field which carry momentum and radiant energy as photons."}
            ]}
        })))
        .mount(server)
        .await;
}

async fn mount_backlinks(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("action", "query"))
        .and(query_param("prop", "linkshere"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "query": {"pages": [
                {"title": "Quantum mechanics", "linkshere": [{"pageid": 1}, {"pageid": 2}]},
                {"title": "Electromagnetic radiation", "linkshere": [{"pageid": 3}]}
            ]}
        })))
        .mount(server)
        .await;
}

async fn mount_pageviews(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/api/rest_v1/metrics/pageviews/per-article/.*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{"views": 5000}, {"views": 7000}]
        })))
        .mount(server)
        .await;
}

async fn mount_all(server: &MockServer) {
    mount_intro_links(server).await;
    mount_summary(server).await;
    mount_extracts(server).await;
    mount_backlinks(server).await;
    mount_pageviews(server).await;
}

fn assert_sorted_descending(scores: &[f64]) {
    assert!(scores.windows(2).all(|w| w[0] >= w[1]), "not sorted: {:?}", scores);
}

// ============================================================================
// Pipeline Tests
// ============================================================================

#[tokio::test]
async fn test_photon_ranking_drops_meta_pages() {
    let mock_server = MockServer::start().await;
    mount_all(&mock_server).await;

    let ranked = ranker_for(&mock_server).rank_links("Photon", &[]).await.unwrap();

    assert_eq!(ranked.len(), 2);
    let names: Vec<&str> = ranked.iter().map(|l| l.title.as_str()).collect();
    assert!(names.contains(&"Quantum mechanics"));
    assert!(names.contains(&"Electromagnetic radiation"));
    assert_sorted_descending(&ranked.iter().map(|l| l.score).collect::<Vec<_>>());

    for link in &ranked {
        assert!((0.0..=100.0).contains(&link.score));
        assert_eq!(link.signals.graph_affinity, 0.0);
        assert!(link.signals.popularity > 0.0);
    }
}

#[tokio::test]
async fn test_top_n_caps_result_length() {
    let mock_server = MockServer::start().await;
    mount_all(&mock_server).await;

    let config = test_config(&mock_server).with_top_n(1);
    let client = WikiClient::new(config.client.clone()).unwrap();
    let ranked = rank_links(&client, &config, "Photon", &[]).await.unwrap();

    assert_eq!(ranked.len(), 1);
}

#[tokio::test]
async fn test_similarity_favours_shared_vocabulary() {
    let mock_server = MockServer::start().await;
    mount_all(&mock_server).await;

    let ranked = ranker_for(&mock_server).rank_links("Photon", &[]).await.unwrap();
    let radiation = ranked
        .iter()
        .find(|l| l.title == "Electromagnetic radiation")
        .unwrap();

    // Highest similarity in the batch is scaled to one.
    assert!((radiation.signals.similarity - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_existing_nodes_drive_graph_affinity() {
    let mock_server = MockServer::start().await;
    mount_all(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("action", "query"))
        .and(query_param("prop", "links"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "query": {"pages": [
                {"title": "Wave-particle duality", "links": [
                    {"ns": 0, "title": "Quantum mechanics"},
                    {"ns": 0, "title": "Photon"}
                ]}
            ]}
        })))
        .mount(&mock_server)
        .await;

    let existing = titles(&["Wave-particle duality"]);
    let ranked = ranker_for(&mock_server)
        .rank_links("Photon", &existing)
        .await
        .unwrap();

    let quantum = ranked.iter().find(|l| l.title == "Quantum mechanics").unwrap();
    let radiation = ranked
        .iter()
        .find(|l| l.title == "Electromagnetic radiation")
        .unwrap();
    assert_eq!(quantum.signals.graph_affinity, 1.0);
    assert_eq!(radiation.signals.graph_affinity, 0.0);
}

#[tokio::test]
async fn test_graph_affinity_counts_resolved_pages_only() {
    let mock_server = MockServer::start().await;
    mount_all(&mock_server).await;

    let duality = serde_json::json!({"title": "Wave-particle duality", "links": [
        {"ns": 0, "title": "Quantum mechanics"}
    ]});

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("prop", "links"))
        .and(query_param("titles", "Wave-particle duality"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "query": {"pages": [duality.clone()]}
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("prop", "links"))
        .and(query_param("titles", "Duality (physics)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "query": {
                "redirects": [{"from": "Duality (physics)", "to": "Wave-particle duality"}],
                "pages": [duality]
            }
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("prop", "links"))
        .and(query_param("titles", "Unwritten article"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "query": {"pages": [{"title": "Unwritten article", "missing": true}]}
        })))
        .mount(&mock_server)
        .await;

    let existing = titles(&["Wave-particle duality", "Duality (physics)", "Unwritten article"]);
    let ranked = ranker_for(&mock_server)
        .rank_links("Photon", &existing)
        .await
        .unwrap();

    // One page behind three labels: the redirect collapses and the missing
    // page is not part of the graph.
    let quantum = ranked.iter().find(|l| l.title == "Quantum mechanics").unwrap();
    assert_eq!(quantum.signals.graph_affinity, 1.0);
    assert!(ranked.iter().all(|l| (0.0..=100.0).contains(&l.score)));
}

#[tokio::test]
async fn test_existing_nodes_are_not_ranked() {
    let mock_server = MockServer::start().await;
    mount_all(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("action", "query"))
        .and(query_param("prop", "links"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "query": {"pages": []}
        })))
        .mount(&mock_server)
        .await;

    let ranked = ranker_for(&mock_server)
        .rank_links("Photon", &titles(&["quantum_mechanics"]))
        .await
        .unwrap();

    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].title, "Electromagnetic radiation");
}

// ============================================================================
// Degradation Tests
// ============================================================================

#[tokio::test]
async fn test_empty_source_is_rejected() {
    let mock_server = MockServer::start().await;

    let result = ranker_for(&mock_server).rank_links("   ", &[]).await;
    assert!(matches!(result, Err(RankError::EmptySourceTitle)));
}

#[tokio::test]
async fn test_extractor_failure_yields_empty_ranking() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let ranked = ranker_for(&mock_server).rank_links("Photon", &[]).await.unwrap();
    assert!(ranked.is_empty());
}

#[tokio::test]
async fn test_failing_collector_degrades_to_neutral() {
    let mock_server = MockServer::start().await;
    mount_intro_links(&mock_server).await;
    mount_summary(&mock_server).await;
    mount_extracts(&mock_server).await;
    mount_pageviews(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("prop", "linkshere"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let ranked = ranker_for(&mock_server).rank_links("Photon", &[]).await.unwrap();

    assert_eq!(ranked.len(), 2);
    assert!(ranked.iter().all(|l| l.signals.authority == 0.0));
}

#[tokio::test]
async fn test_candidates_without_extract_are_excluded() {
    let mock_server = MockServer::start().await;
    mount_intro_links(&mock_server).await;
    mount_summary(&mock_server).await;
    mount_backlinks(&mock_server).await;
    mount_pageviews(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("prop", "extracts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "query": {"pages": [
                {"title": "Quantum mechanics", "extract": "Quantum mechanics is a fundamental theory."},
                {"title": "Electromagnetic radiation", "extract": ""}
            ]}
        })))
        .mount(&mock_server)
        .await;

    let ranked = ranker_for(&mock_server).rank_links("Photon", &[]).await.unwrap();

    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].title, "Quantum mechanics");
}

#[tokio::test]
async fn test_source_extract_falls_back_when_summary_missing() {
    let mock_server = MockServer::start().await;
    mount_intro_links(&mock_server).await;
    mount_extracts(&mock_server).await;
    mount_backlinks(&mock_server).await;
    mount_pageviews(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/rest_v1/page/summary/Photon"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let ranked = ranker_for(&mock_server).rank_links("Photon", &[]).await.unwrap();

    assert!(ranked.iter().any(|l| l.signals.similarity > 0.0));
}

// ============================================================================
// Link Verdict Tests
// ============================================================================

#[tokio::test]
async fn test_candidate_verdicts_explain_filtering() {
    let mock_server = MockServer::start().await;
    mount_intro_links(&mock_server).await;

    let verdicts = ranker_for(&mock_server)
        .candidate_verdicts("Photon", &titles(&["Quantum mechanics"]))
        .await;

    assert_eq!(verdicts.len(), 4);
    assert_eq!(verdicts[0].verdict, Verdict::Existing);
    assert_eq!(verdicts[1].verdict, Verdict::Kept);
    assert!(matches!(verdicts[2].verdict, Verdict::Meta(ref r) if r.contains("list of")));
    assert_eq!(
        verdicts[3].verdict,
        Verdict::Meta("date-like title".to_string())
    );
}

#[test]
fn test_ranker_rejects_invalid_weights() {
    let config = RankConfig::default().with_weights(Weights {
        graph_affinity: 0.9,
        ..Weights::default()
    });
    assert!(matches!(
        LinkRanker::new(config),
        Err(RankError::InvalidConfig(_))
    ));
}

#[tokio::test]
async fn test_rank_links_rejects_invalid_config_before_any_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server).with_weights(Weights {
        graph_affinity: 1.0,
        similarity: 1.0,
        authority: 1.0,
        popularity: 1.0,
        link_position: 0.0,
    });
    let client = WikiClient::new(config.client.clone()).unwrap();

    let result = rank_links(&client, &config, "Photon", &[]).await;
    assert!(matches!(result, Err(RankError::InvalidConfig(_))));
    assert!(matches!(
        LinkRanker::with_client(client, config),
        Err(RankError::InvalidConfig(_))
    ));
}
