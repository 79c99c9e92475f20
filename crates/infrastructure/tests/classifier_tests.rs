//! HTTP priority advisor against a mock model endpoint

use civic_issues_application::PriorityAdvisor;
use civic_issues_common::ClassifierConfig;
use civic_issues_domain::errors::IntegrationError;
use civic_issues_domain::Priority;
use civic_issues_infrastructure::HttpPriorityAdvisor;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

fn advisor(server: &MockServer, api_key: Option<&str>) -> HttpPriorityAdvisor {
    let config = ClassifierConfig {
        enabled: true,
        endpoint: server.uri(),
        model: "gemini-2.0-flash".to_string(),
        api_key: api_key.map(str::to_string),
    };
    HttpPriorityAdvisor::new(&config, Duration::from_millis(500)).unwrap()
}

fn reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    }))
}

#[tokio::test]
async fn test_classify_reads_label_from_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(query_param("key", "secret"))
        .and(body_string_contains("electric wires hanging over the road"))
        .respond_with(reply("SEVERE\n"))
        .expect(1)
        .mount(&server)
        .await;

    let priority = advisor(&server, Some("secret"))
        .classify("electric wires hanging over the road")
        .await
        .unwrap();

    assert_eq!(priority, Priority::Severe);
}

#[tokio::test]
async fn test_classify_takes_first_label_in_prose() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(reply("output = urgent, not severe"))
        .mount(&server)
        .await;

    let priority = advisor(&server, None).classify("water main leak").await.unwrap();
    assert_eq!(priority, Priority::Urgent);
}

#[tokio::test]
async fn test_reply_without_label_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(reply("I cannot tell"))
        .mount(&server)
        .await;

    let err = advisor(&server, None).classify("graffiti").await.unwrap_err();
    assert!(matches!(err, IntegrationError::Classifier(_)));
}

#[tokio::test]
async fn test_server_error_is_classifier_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = advisor(&server, None).classify("pothole").await.unwrap_err();
    assert!(matches!(err, IntegrationError::Classifier(_)));
}

#[tokio::test]
async fn test_slow_reply_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(reply("NORMAL").set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let err = advisor(&server, None).classify("broken bench").await.unwrap_err();
    assert!(matches!(err, IntegrationError::Classifier(_)));
}
