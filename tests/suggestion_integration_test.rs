use incident_copilot::advisory::{AdvisoryService, HttpAdvisoryClient};
use incident_copilot::models::{IncidentStatus, Severity, HEURISTIC_CONFIDENCE};
use incident_copilot::suggestion::{heuristic_suggestion, SuggestionEngine};
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;

fn engine_for(url: &str) -> SuggestionEngine {
    let client = HttpAdvisoryClient::new(url, 2).unwrap();
    SuggestionEngine::new(Some(Arc::new(client) as Arc<dyn AdvisoryService>))
}

#[tokio::test]
async fn test_major_outage_is_sev1() {
    let engine = SuggestionEngine::heuristic_only();
    let result = engine.classify("Major outage", "data loss on payments").await;

    assert_eq!(result.severity_proposed, Severity::Sev1);
    assert_eq!(result.status_proposed, IncidentStatus::Open);
    assert_eq!(result.confidence, HEURISTIC_CONFIDENCE);
}

#[tokio::test]
async fn test_empty_input_is_complete() {
    let engine = SuggestionEngine::heuristic_only();
    let result = engine.classify("", "").await;

    assert_eq!(result.severity_proposed, Severity::Sev3);
    assert_eq!(result.suggested_title, "Incident (title to be specified)");
    assert!(result.impact_summary.starts_with("Impact to be determined"));
    assert_eq!(result.action_items.len(), 4);
    assert!(result.tags.is_empty());
    assert!(result.summary.ends_with("- Proposed severity: SEV3"));
}

#[tokio::test]
async fn test_tags_are_deduplicated_and_capped() {
    let engine = SuggestionEngine::heuristic_only();
    let result = engine
        .classify(
            "API API billing auth db cache queue cdn network latency timeout",
            "eu-west us-east 5xx api",
        )
        .await;

    assert_eq!(result.tags.len(), 8);
    assert_eq!(
        result.tags,
        vec!["api", "billing", "auth", "db", "cache", "queue", "cdn", "network"]
    );
}

#[tokio::test]
async fn test_advisory_response_is_merged_field_by_field() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/incident-suggest")
        .match_body(Matcher::PartialJson(json!({
            "title": "Checkout errors",
            "heuristic": { "severityProposed": "SEV2" }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "suggestedTitle": "Checkout returning 5xx in eu-west",
                "severityProposed": "SEV1",
                "actionItems": ["Roll back release 42", 7],
                "confidence": 0.9,
                "unknownField": true
            })
            .to_string(),
        )
        .create_async()
        .await;

    let engine = engine_for(&server.url());
    let result = engine
        .classify("Checkout errors", "5xx on checkout api in eu-west")
        .await;
    let heuristic = heuristic_suggestion("Checkout errors", "5xx on checkout api in eu-west");

    mock.assert_async().await;
    assert_eq!(result.suggested_title, "Checkout returning 5xx in eu-west");
    assert_eq!(result.severity_proposed, Severity::Sev1);
    assert_eq!(result.action_items, vec!["Roll back release 42"]);
    assert_eq!(result.confidence, 0.9);
    // Fields the advisory left out keep the rule-based values
    assert_eq!(result.summary, heuristic.summary);
    assert_eq!(result.impact_summary, heuristic.impact_summary);
    assert_eq!(result.tags, heuristic.tags);
    assert_eq!(result.status_proposed, IncidentStatus::Open);
}

#[tokio::test]
async fn test_advisory_server_error_falls_back() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/incident-suggest")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let engine = engine_for(&server.url());
    let result = engine.classify("db timeout", "primary unreachable").await;

    mock.assert_async().await;
    assert_eq!(result, heuristic_suggestion("db timeout", "primary unreachable"));
}

#[tokio::test]
async fn test_malformed_advisory_body_falls_back() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/incident-suggest")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{not json")
        .create_async()
        .await;

    let engine = engine_for(&server.url());
    let result = engine.classify("cache stampede", "").await;

    assert_eq!(result, heuristic_suggestion("cache stampede", ""));
}

#[tokio::test]
async fn test_non_object_advisory_body_falls_back() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/incident-suggest")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[1, 2, 3]")
        .create_async()
        .await;

    let engine = engine_for(&server.url());
    let result = engine.classify("cdn purge", "minor").await;

    assert_eq!(result, heuristic_suggestion("cdn purge", "minor"));
}

#[tokio::test]
async fn test_unreachable_advisory_returns_heuristic() {
    // Nothing listens on port 9 locally
    let engine = engine_for("http://127.0.0.1:9");
    let result = engine.classify("queue backlog", "consumers degraded").await;

    assert_eq!(result, heuristic_suggestion("queue backlog", "consumers degraded"));
    assert_eq!(result.confidence, 0.55);
}
