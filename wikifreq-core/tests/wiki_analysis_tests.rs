// End-to-end analysis against a mocked MediaWiki API

use serde_json::json;
use tokio_util::sync::CancellationToken;
use wikifreq_core::crawl::{AnalyzeOptions, execute_analysis};
use wikifreq_core::{AnalyzeError, AnalyzeRequest};
use wikifreq_scanner::{SourceConfig, WikiClient};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

async fn mount_article(server: &MockServer, title: &str, text: &str, links: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("prop", "extracts"))
        .and(query_param("titles", title))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {"pages": [{"ns": 0, "title": title, "extract": text}]}
        })))
        .mount(server)
        .await;

    let links: Vec<serde_json::Value> = links
        .iter()
        .map(|link| {
            let ns = if link.starts_with("Talk:") { 1 } else { 0 };
            json!({"ns": ns, "title": link})
        })
        .collect();

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("prop", "links"))
        .and(query_param("titles", title))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {"pages": [{"ns": 0, "title": title, "links": links}]}
        })))
        .mount(server)
        .await;
}

async fn mount_missing(server: &MockServer, title: &str) {
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("prop", "extracts"))
        .and(query_param("titles", title))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {"pages": [{"ns": 0, "title": title, "missing": true}]}
        })))
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> WikiClient {
    let config = SourceConfig::default()
        .with_endpoint(format!("{}/w/api.php", server.uri()))
        .with_timeout(2);
    WikiClient::from_config(&config).unwrap()
}

#[tokio::test]
async fn test_analysis_over_mocked_wiki() {
    let server = MockServer::start().await;

    mount_article(&server, "Seabrooke", "Seabrooke is a harbour town.", &["Harbour", "Ghost", "Talk:Seabrooke"]).await;
    mount_article(&server, "Harbour", "A harbour shelters boats.", &["Seabrooke", "Boat"]).await;
    mount_article(&server, "Boat", "Boats float.", &[]).await;
    mount_missing(&server, "Ghost").await;

    let request = AnalyzeRequest::new("Seabrooke")
        .with_depth(1)
        .with_ignore(["a", "is"]);
    let mut options = AnalyzeOptions::new(request);
    options.workers = 2;

    let analysis = execute_analysis(client_for(&server), options, CancellationToken::new())
        .await
        .unwrap();

    // Seabrooke (5 words) + Harbour (4 words); Ghost is missing, Boat is beyond depth 1.
    assert_eq!(analysis.stats.total_words, 9);
    assert_eq!(analysis.stats.documents_fetched, 2);
    assert_eq!(analysis.stats.titles_skipped, 1);
    assert_eq!(analysis.stats.visited, 3);

    let harbour = analysis.table.get("harbour").unwrap();
    assert_eq!(harbour.count, 2);
    assert!((harbour.percentage - 200.0 / 9.0).abs() < 1e-9);
    assert!(!analysis.table.contains("a"));
    assert!(!analysis.table.contains("is"));
    assert!(!analysis.table.contains("float"));
}

#[tokio::test]
async fn test_missing_seed_over_mocked_wiki() {
    let server = MockServer::start().await;
    mount_missing(&server, "FakeTitle123").await;

    let result = execute_analysis(
        client_for(&server),
        AnalyzeOptions::new(AnalyzeRequest::new("FakeTitle123").with_depth(1)),
        CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(AnalyzeError::NotFound(ref title)) if title == "FakeTitle123"));
}

#[tokio::test]
async fn test_unreachable_seed_is_source_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = execute_analysis(
        client_for(&server),
        AnalyzeOptions::new(AnalyzeRequest::new("Anything")),
        CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(AnalyzeError::Source { .. })));
}
