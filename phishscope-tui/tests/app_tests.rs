use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use phishscope_client::{ApiClient, ApiError, ClientConfig};
use phishscope_core::Page;
use phishscope_core::domains::seed_domains;
use phishscope_tui::{App, AppMessage, Focus, LogLevel, ui};
use ratatui::{Terminal, backend::TestBackend};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    let config = ClientConfig::new(&format!("{}/api/v1", server.uri()), Duration::from_secs(2)).unwrap();
    ApiClient::new(config).unwrap()
}

fn press(app: &mut App, code: KeyCode) {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

async fn settle(app: &mut App, done: impl Fn(&App) -> bool) {
    for _ in 0..300 {
        app.process_messages();
        if done(app) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("background work did not finish in time");
}

fn screen_text(app: &App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(160, 50)).unwrap();
    terminal.draw(|f| ui(f, app)).unwrap();
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

async fn mount_sources(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/search/sources/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "main_sources": ["phishtank", "openphish", "certificates"],
            "ut1_categories": ["gambling", "malware"],
            "search_capabilities": {"wildcard": "Substring match"},
            "usage_examples": {"basic": "/search/?q=paypal"}
        })))
        .mount(server)
        .await;
}

// ============================================================================
// Page lifecycle
// ============================================================================

#[tokio::test]
async fn test_background_tasks_follow_the_mounted_page() {
    let server = MockServer::start().await;
    let mut app = App::new(client_for(&server));
    app.start();

    assert_eq!(app.shell().current(), Page::Home);
    assert!(app.is_simulating());
    assert!(!app.is_dashboard_polling());

    press(&mut app, KeyCode::Char('2'));
    assert_eq!(app.shell().current(), Page::Dashboard);
    assert!(!app.is_simulating());
    assert!(app.is_dashboard_polling());

    press(&mut app, KeyCode::Char('3'));
    assert!(!app.is_dashboard_polling());
    assert!(!app.is_simulating());
}

#[tokio::test]
async fn test_goto_placeholder_and_unknown_pages() {
    let server = MockServer::start().await;
    let mut app = App::new(client_for(&server));
    app.start();

    press(&mut app, KeyCode::Char('g'));
    type_text(&mut app, "gdpr");
    assert_eq!(app.focus(), &Focus::Goto("gdpr".to_string()));
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.shell().current(), Page::Gdpr);
    assert!(screen_text(&app).contains("GDPR Compliance"));

    press(&mut app, KeyCode::Char('g'));
    type_text(&mut app, "nowhere");
    press(&mut app, KeyCode::Enter);
    assert!(screen_text(&app).contains("Page Not Found"));
}

#[tokio::test]
async fn test_detections_ignored_while_home_is_unmounted() {
    let server = MockServer::start().await;
    let mut app = App::new(client_for(&server));
    app.start();
    app.navigate(Page::Search);

    let mut domain = seed_domains().remove(0);
    domain.domain = "late-arrival.com".to_string();
    app.handle_message(AppMessage::DomainDetected(domain.clone()));
    assert_eq!(app.domains().len(), 5);

    app.navigate(Page::Home);
    app.handle_message(AppMessage::DomainDetected(domain));
    assert_eq!(app.domains().rows()[0].domain, "late-arrival.com");
}

#[tokio::test]
async fn test_domain_filter_keys() {
    let server = MockServer::start().await;
    let mut app = App::new(client_for(&server));
    app.start();

    press(&mut app, KeyCode::Char('/'));
    type_text(&mut app, "amazon");
    press(&mut app, KeyCode::Esc);

    assert_eq!(app.domains().visible().len(), 1);
    assert!(screen_text(&app).contains("amaz0n-prime-renewal.org"));
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_search_from_keyboard_renders_summary() {
    let server = MockServer::start().await;
    mount_sources(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search/"))
        .and(query_param("q", "paypal"))
        .and(query_param_is_missing("sources"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "paypal",
            "sources_searched": ["phishtank", "openphish", "certificates"],
            "total_found": 3,
            "results_by_type": {
                "phishing_url": [
                    {"result_type": "phishing_url", "url": "http://paypal-login.example", "source": "phishtank", "created_at": "2024-01-20T14:30:00"},
                    {"result_type": "phishing_url", "url": "http://paypa1.example", "source": "openphish", "created_at": "2024-01-20T13:30:00"}
                ],
                "ssl_certificate": [
                    {"result_type": "ssl_certificate", "title": "paypal-secure.example", "source": "certificates", "created_at": "2024-01-20T12:30:00"}
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = App::new(client_for(&server));
    app.start();
    press(&mut app, KeyCode::Char('3'));
    settle(&mut app, |app| app.search().available_sources().is_some()).await;
    assert_eq!(app.source_options().len(), 6);
    assert_eq!(app.source_options()[3], "ut1");
    assert_eq!(app.source_options()[4], "ut1_gambling");

    press(&mut app, KeyCode::Char('/'));
    type_text(&mut app, "paypal");
    press(&mut app, KeyCode::Enter);
    assert!(app.search().is_loading());

    settle(&mut app, |app| app.search().response().is_some()).await;

    let screen = screen_text(&app);
    assert!(screen.contains("Found 3 results for \"paypal\" in 3 sources"));
    assert!(screen.contains("Phishing URL"));
    assert!(screen.contains("paypal-secure.example"));
}

#[tokio::test]
async fn test_selected_sources_are_sent() {
    let server = MockServer::start().await;
    mount_sources(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search/"))
        .and(query_param("sources", "openphish,ut1_malware"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "bank",
            "sources_searched": ["openphish", "ut1_malware"],
            "total_found": 0,
            "results_by_type": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = App::new(client_for(&server));
    app.start();
    app.navigate(Page::Search);
    settle(&mut app, |app| app.search().available_sources().is_some()).await;

    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Char(' '));
    for _ in 0..4 {
        press(&mut app, KeyCode::Down);
    }
    press(&mut app, KeyCode::Char(' '));

    press(&mut app, KeyCode::Char('/'));
    type_text(&mut app, "bank");
    press(&mut app, KeyCode::Enter);

    settle(&mut app, |app| app.search().response().is_some()).await;
    assert!(screen_text(&app).contains("Found 0 results"));
}

#[tokio::test]
async fn test_all_ut1_categories_filter_is_sent_alone() {
    let server = MockServer::start().await;
    mount_sources(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search/"))
        .and(query_param("sources", "ut1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "casino",
            "sources_searched": ["ut1"],
            "total_found": 0,
            "results_by_type": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = App::new(client_for(&server));
    app.start();
    app.navigate(Page::Search);
    settle(&mut app, |app| app.search().available_sources().is_some()).await;

    let options = app.source_options();
    let index = options.iter().position(|s| s == "ut1").unwrap();
    assert!(options[index + 1..].iter().all(|s| s.starts_with("ut1_")));
    assert!(screen_text(&app).contains("[ ] All UT1 categories"));

    for _ in 0..index {
        press(&mut app, KeyCode::Down);
    }
    press(&mut app, KeyCode::Char(' '));
    assert!(screen_text(&app).contains("[x] All UT1 categories"));

    press(&mut app, KeyCode::Char('/'));
    type_text(&mut app, "casino");
    press(&mut app, KeyCode::Enter);

    settle(&mut app, |app| app.search().response().is_some()).await;
    assert!(screen_text(&app).contains("Found 0 results for \"casino\" in 1 sources"));
}

#[tokio::test]
async fn test_blank_search_only_logs() {
    let server = MockServer::start().await;
    mount_sources(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut app = App::new(client_for(&server));
    app.start();
    app.navigate(Page::Search);
    press(&mut app, KeyCode::Char('/'));
    type_text(&mut app, "   ");
    press(&mut app, KeyCode::Enter);

    assert!(!app.search().is_loading());
    assert!(app.logs().iter().any(|(level, _)| *level == LogLevel::Warn));
}

#[tokio::test]
async fn test_stale_search_message_is_dropped() {
    let server = MockServer::start().await;
    let mut app = App::new(client_for(&server));
    app.handle_message(AppMessage::SearchCompleted {
        generation: 42,
        outcome: Err(ApiError::Backend("too late".to_string())),
    });
    assert!(app.search().response().is_none());
    assert!(app.logs().is_empty());
}

// ============================================================================
// Dashboard
// ============================================================================

#[tokio::test]
async fn test_dashboard_failure_shows_banner_and_zeroes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/stats/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "Failed to fetch statistics: connection refused",
            "database_status": "error"
        })))
        .mount(&server)
        .await;

    let mut app = App::new(client_for(&server));
    app.start();
    app.navigate(Page::Dashboard);
    settle(&mut app, |app| !app.dashboard().is_loading()).await;

    assert!(app.dashboard().error().is_some());
    assert_eq!(app.dashboard().statistics().unwrap().total_certificates, 0);
    let screen = screen_text(&app);
    assert!(screen.contains("Failed to load statistics"));
    assert!(screen.contains("Database error"));
}

#[tokio::test]
async fn test_dashboard_renders_statistics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/stats/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_certificates": 1234567,
            "recent_certificates_24h": 999,
            "certificates_with_domains": 1000,
            "avg_certificates_per_day": 1500.0,
            "grand_total_intelligence": 2000000,
            "phishing_data": {
                "total_phishing_urls": 1500000,
                "sources": {
                    "phishtank": 10,
                    "ut1_blacklists": {"total_ut1_urls": 50, "categories_count": 2, "categories": {"adult": 5, "malware": 45}}
                }
            },
            "database_status": "connected"
        })))
        .mount(&server)
        .await;

    let mut app = App::new(client_for(&server));
    app.start();
    app.navigate(Page::Dashboard);
    settle(&mut app, |app| !app.dashboard().is_loading()).await;

    let screen = screen_text(&app);
    assert!(screen.contains("Database connected"));
    assert!(screen.contains("1.2M"));
    assert!(screen.contains("1.5M"));
    assert!(screen.contains("malware"));
}

async fn mount_connected_stats(server: &MockServer, expected_fetches: u64) {
    Mock::given(method("GET"))
        .and(path("/api/v1/stats/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_certificates": 42,
            "database_status": "connected"
        })))
        .expect(expected_fetches)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_manual_refresh_runs_through_the_poll_task() {
    let server = MockServer::start().await;
    mount_connected_stats(&server, 2).await;

    let mut app = App::new(client_for(&server));
    app.start();
    press(&mut app, KeyCode::Char('2'));
    settle(&mut app, |app| !app.dashboard().is_loading()).await;
    let first = app.dashboard().last_updated();

    press(&mut app, KeyCode::Char('r'));
    settle(&mut app, |app| app.dashboard().last_updated() != first).await;

    // Leaving tears the poll task down, so a refresh request goes nowhere
    app.navigate(Page::Home);
    app.navigate(Page::Search);
    press(&mut app, KeyCode::Char('r'));
    tokio::time::sleep(Duration::from_millis(100)).await;
    server.verify().await;
}

#[tokio::test]
async fn test_statistics_from_an_earlier_mount_are_dropped() {
    let server = MockServer::start().await;
    mount_connected_stats(&server, 2).await;

    let mut app = App::new(client_for(&server));
    app.start();
    app.navigate(Page::Dashboard);
    settle(&mut app, |app| !app.dashboard().is_loading()).await;
    app.navigate(Page::Home);
    app.navigate(Page::Dashboard);
    for _ in 0..300 {
        if server.received_requests().await.unwrap_or_default().len() >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    app.process_messages();
    assert!(app.dashboard().is_database_connected());

    app.handle_message(AppMessage::StatisticsLoaded {
        mount: 1,
        outcome: Err(ApiError::Backend("late failure".to_string())),
    });
    assert!(app.dashboard().error().is_none());
    assert_eq!(app.dashboard().statistics().unwrap().total_certificates, 42);

    app.handle_message(AppMessage::StatisticsLoaded {
        mount: 2,
        outcome: Err(ApiError::Backend("current failure".to_string())),
    });
    assert!(app.dashboard().error().unwrap().contains("current failure"));
}
