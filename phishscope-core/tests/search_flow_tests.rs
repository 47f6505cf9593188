// End-to-end search view flows against a mocked backend

use phishscope_client::{ApiClient, ClientConfig};
use phishscope_core::search::{Completion, SearchBackend, SearchState, SearchView, threat_level, ThreatLevel};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    let config = ClientConfig::new(&format!("{}/api/v1", server.uri()), Duration::from_secs(2)).unwrap();
    ApiClient::new(config).unwrap()
}

fn paypal_body() -> serde_json::Value {
    json!({
        "query": "paypal",
        "search_type": "universal_wildcard",
        "sources_searched": ["phishtank", "openphish", "certificates"],
        "total_found": 3,
        "returned": 3,
        "limit": 50,
        "offset": 0,
        "results_by_type": {
            "phishing_url": [
                {"result_type": "phishing_url", "url": "http://paypal-login.example", "source": "phishtank", "created_at": "2024-01-20T14:30:00"},
                {"result_type": "phishing_url", "url": "http://paypa1.example", "source": "openphish", "created_at": "2024-01-20T13:30:00"}
            ],
            "ssl_certificate": [
                {"result_type": "ssl_certificate", "title": "paypal-secure.example", "source": "certificates", "created_at": "2024-01-20T12:30:00"}
            ]
        },
        "all_results": []
    })
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_paypal_search_renders_cards_and_summary() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search/"))
        .and(query_param("q", "paypal"))
        .and(query_param_is_missing("sources"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paypal_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut view = SearchView::new();
    view.set_query("paypal");

    let request = view.submit().expect("non-empty query issues a request");
    let outcome = client.search(&request).await;
    assert_eq!(view.complete(request.generation, outcome), Completion::Applied);

    let cards = view.category_cards();
    assert_eq!(cards.len(), 2);
    assert_eq!((cards[0].label.as_str(), cards[0].count), ("Phishing URL", 2));
    assert_eq!((cards[1].label.as_str(), cards[1].count), ("SSL Certificate", 1));
    assert!(view.summary_line().unwrap().starts_with("Found 3 results"));

    let buckets = view.buckets();
    assert_eq!(threat_level(&buckets[0].results[0]), ThreatLevel::High);
    assert_eq!(buckets[1].results[0].subject_cn(), Some("paypal-secure.example"));
}

#[tokio::test]
async fn test_source_filter_is_sent_comma_joined() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search/"))
        .and(query_param("q", "bank"))
        .and(query_param("sources", "phishtank,ut1_gambling"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "bank",
            "sources_searched": ["phishtank", "ut1_gambling"],
            "total_found": 0,
            "results_by_type": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut view = SearchView::new();
    view.set_query("bank");
    view.filter_mut().toggle("phishtank");
    view.filter_mut().toggle("ut1_gambling");

    let request = view.submit().unwrap();
    let outcome = client.search(&request).await;
    view.complete(request.generation, outcome);

    assert!(view.category_cards().is_empty());
    assert_eq!(view.summary_line().unwrap(), "Found 0 results for \"bank\" in 2 sources");
}

#[tokio::test]
async fn test_blank_query_never_reaches_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut view = SearchView::new();
    for blank in ["", "   ", "\t\n"] {
        view.set_query(blank);
        if let Some(request) = view.submit() {
            let outcome = client.search(&request).await;
            view.complete(request.generation, outcome);
        }
        assert_eq!(view.state(), &SearchState::Idle);
    }

    server.verify().await;
}

#[tokio::test]
async fn test_backend_failure_shows_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "Invalid sources"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut view = SearchView::new();
    view.set_query("paypal");
    let request = view.submit().unwrap();
    let outcome = client.search(&request).await;
    view.complete(request.generation, outcome);

    match view.state() {
        SearchState::Error(message) => assert!(message.contains("Search failed")),
        other => panic!("expected error state, got {:?}", other),
    }
}
