//! Integration tests for REST API
//!
//! Drives the full router (middleware included) over in-memory backends.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use civic_issues_api_rest::{create_app, issue_token, ApiConfig, AppState, Backends};
use civic_issues_application::{
    InMemoryIssueStore, IssueStore, Principal, ServiceConfig,
};
use civic_issues_domain::{Authority, Citizen, Office};
use civic_issues_testing::{
    builders::AuthorityBuilder,
    fixtures::{create_test_authority, create_test_citizen, create_test_office_at, ENGINEER_ROLE},
    mocks::{MemoryBlobStorage, MockNotificationDispatcher, StubPriorityAdvisor},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use tower::ServiceExt;

const SECRET: &str = "integration-secret-integration-secret";
const BOUNDARY: &str = "civic-test-boundary";

struct TestApp {
    router: Router,
    office: Office,
    representative: Authority,
    engineer: Authority,
    citizen: Citizen,
}

impl TestApp {
    async fn new() -> Self {
        let store = Arc::new(InMemoryIssueStore::new());

        let office = create_test_office_at(0.0, 0.0);
        store.insert_office(&office).await.unwrap();
        let representative = AuthorityBuilder::new(office.id)
            .with_email(format!("rep@{}.gov.in", office.id))
            .representative()
            .build();
        store.insert_authority(&representative).await.unwrap();
        let engineer = create_test_authority(&office, ENGINEER_ROLE);
        store.insert_authority(&engineer).await.unwrap();
        let citizen = create_test_citizen();
        store.insert_citizen(&citizen).await.unwrap();

        let config = ApiConfig {
            jwt_secret: SECRET.to_string(),
            ..ApiConfig::default()
        };
        let backends = Backends {
            store,
            storage: Arc::new(MemoryBlobStorage::new()),
            dispatcher: Arc::new(MockNotificationDispatcher::new()),
            advisor: Arc::new(StubPriorityAdvisor::default()),
        };
        let state = AppState::new(config, backends, ServiceConfig::default());

        Self {
            router: create_app(state),
            office,
            representative,
            engineer,
            citizen,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn citizen_token(&self) -> String {
        token(Principal::Citizen(self.citizen.id))
    }

    fn representative_token(&self) -> String {
        token(Principal::Authority(self.representative.id))
    }

    fn engineer_token(&self) -> String {
        token(Principal::Authority(self.engineer.id))
    }

    /// Report an issue at `(lat, lon)` as the seeded citizen
    async fn report(&self, title: &str, lat: f64, lon: f64) -> Value {
        let lat = lat.to_string();
        let lon = lon.to_string();
        let body = multipart(
            &[
                ("title", title),
                ("description", "Reported from the integration suite"),
                ("latitude", &lat),
                ("longitude", &lon),
            ],
            None,
        );
        let (status, body) = self
            .send(multipart_request(body, Some(&self.citizen_token())))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"].clone()
    }
}

fn token(principal: Principal) -> String {
    issue_token(SECRET, principal, Duration::from_secs(600)).unwrap()
}

fn multipart(fields: &[(&str, &str)], file: Option<(&str, &str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((name, file_name, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(body: Vec<u8>, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/issues")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).unwrap()
}

fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: Method, uri: &str, bearer: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str, bearer: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new().await;

    let (status, body) = app.send(get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");

    let (status, body) = app.send(get("/health/ready", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ready"], true);
    assert!(body["data"]["checks"].get("database").is_none());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-me")
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "trace-me");
}

#[tokio::test]
async fn test_create_issue_routes_to_nearest_office() {
    let app = TestApp::new().await;
    let issue = app.report("Pothole on Main Road", 0.001, 0.001).await;

    assert_eq!(issue["officeId"], app.office.id.to_string());
    assert_eq!(issue["status"], "UNDER_REVIEW");
    assert_eq!(issue["priority"], "NORMAL");
    assert_eq!(issue["reporterId"], app.citizen.id.to_string());
    assert_eq!(issue["upvoteCount"], 0);
}

#[tokio::test]
async fn test_create_issue_with_image_attachment() {
    let app = TestApp::new().await;
    let body = multipart(
        &[
            ("title", "Overflowing drain"),
            ("description", "Water on the footpath"),
            ("latitude", "0.002"),
            ("longitude", "0.002"),
            ("isAnonymous", "true"),
        ],
        Some(("image", "drain.png", "image/png", b"\x89PNG fake image bytes")),
    );

    let (status, body) = app
        .send(multipart_request(body, Some(&app.citizen_token())))
        .await;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["isAnonymous"], true);
    assert!(body["data"].get("reporterId").is_none());
    assert!(body["data"]["imageUrl"].as_str().unwrap().contains("issues/images"));
}

#[tokio::test]
async fn test_create_issue_requires_citizen() {
    let app = TestApp::new().await;
    let body = multipart(
        &[
            ("title", "Broken bench"),
            ("description", "Park bench snapped"),
            ("latitude", "0"),
            ("longitude", "0"),
        ],
        None,
    );

    let (status, body) = app.send(multipart_request(body, None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "AUTHENTICATION_REQUIRED");
    assert!(body["request_id"].is_string());
}

#[tokio::test]
async fn test_create_issue_reports_missing_field() {
    let app = TestApp::new().await;
    let body = multipart(
        &[("title", "No location"), ("description", "Somewhere"), ("longitude", "0")],
        None,
    );

    let (status, body) = app
        .send(multipart_request(body, Some(&app.citizen_token())))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(body["details"]["field"], "latitude");
}

#[tokio::test]
async fn test_create_issue_rejects_out_of_range_coordinates() {
    let app = TestApp::new().await;
    let body = multipart(
        &[
            ("title", "Off the map"),
            ("description", "Impossible latitude"),
            ("latitude", "91"),
            ("longitude", "0"),
        ],
        None,
    );

    let (status, body) = app
        .send(multipart_request(body, Some(&app.citizen_token())))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_COORDINATES");
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let app = TestApp::new().await;
    let (status, body) = app.send(get("/api/v1/notifications", Some("garbage"))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_nearby_search_returns_distance_and_pagination() {
    let app = TestApp::new().await;
    let issue = app.report("Streetlight out", 0.001, 0.001).await;

    let (status, body) = app
        .send(get(
            "/api/v1/issues/nearby?latitude=0&longitude=0&radius=500",
            None,
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["id"], issue["id"]);
    assert_eq!(body["data"][0]["distanceInMeters"], 157);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["pagination"]["totalPages"], 1);
}

#[tokio::test]
async fn test_nearby_search_requires_coordinates() {
    let app = TestApp::new().await;
    let (status, body) = app.send(get("/api/v1/issues/nearby?radius=500", None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_malformed_issue_id_is_bad_request() {
    let app = TestApp::new().await;
    let (status, body) = app.send(get("/api/v1/issues/not-a-uuid", None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_unknown_issue_is_not_found() {
    let app = TestApp::new().await;
    let uri = format!("/api/v1/issues/{}", uuid::Uuid::new_v4());
    let (status, body) = app.send(get(&uri, None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "ISSUE_NOT_FOUND");
}

#[tokio::test]
async fn test_upvote_twice_conflicts() {
    let app = TestApp::new().await;
    let issue = app.report("Garbage pile", 0.0, 0.0).await;
    let uri = format!("/api/v1/issues/{}/upvote", issue["id"].as_str().unwrap());

    let (status, body) = app
        .send(empty_request(Method::PUT, &uri, &app.citizen_token()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["upvoteCount"], 1);
    assert_eq!(body["data"]["voted"], true);

    let (status, body) = app
        .send(empty_request(Method::PUT, &uri, &app.citizen_token()))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "ALREADY_VOTED");

    let (status, body) = app
        .send(empty_request(Method::DELETE, &uri, &app.citizen_token()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["upvoteCount"], 0);
}

#[tokio::test]
async fn test_forward_requires_representative() {
    let app = TestApp::new().await;
    let issue = app.report("Fallen tree", 0.0, 0.0).await;

    let (status, body) = app
        .send(json_request(
            Method::PUT,
            "/api/v1/issues/forward",
            &app.engineer_token(),
            json!({ "issueId": issue["id"], "department": "roads", "role": ENGINEER_ROLE }),
        ))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "NOT_REPRESENTATIVE");
}

#[tokio::test]
async fn test_forward_validates_body() {
    let app = TestApp::new().await;
    let issue = app.report("Fallen tree", 0.0, 0.0).await;

    let (status, body) = app
        .send(json_request(
            Method::PUT,
            "/api/v1/issues/forward",
            &app.representative_token(),
            json!({ "issueId": issue["id"], "department": "", "role": ENGINEER_ROLE }),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["problems"][0], "department: length");
}

#[tokio::test]
async fn test_resolution_round_trip() {
    let app = TestApp::new().await;
    let issue = app.report("Leaking pipe", 0.0, 0.0).await;
    let issue_id = issue["id"].clone();

    let (status, body) = app
        .send(json_request(
            Method::PUT,
            "/api/v1/issues/forward",
            &app.representative_token(),
            json!({ "issueId": issue_id, "department": "water", "role": ENGINEER_ROLE }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["status"], "FORWARDED");
    assert_eq!(body["data"]["assignedToId"], app.engineer.id.to_string());

    let (status, body) = app
        .send(get("/api/v1/issues/authority", Some(&app.engineer_token())))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);

    let (status, body) = app
        .send(json_request(
            Method::PUT,
            "/api/v1/issues/update",
            &app.engineer_token(),
            json!({ "issueId": issue_id, "status": "RESOLVED", "description": "Pipe replaced" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["status"], "RESOLVED");

    let (status, body) = app
        .send(get("/api/v1/notifications", Some(&app.citizen_token())))
        .await;
    assert_eq!(status, StatusCode::OK);
    let pending = body["data"].as_array().unwrap();
    assert_eq!(pending.len(), 1);
    let notification_id = pending[0]["id"].clone();

    let (status, body) = app
        .send(json_request(
            Method::PUT,
            "/api/v1/issues/reject-resolution",
            &app.citizen_token(),
            json!({ "issueId": issue_id, "notificationId": notification_id, "message": "Still leaking" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["dispute"], true);

    let (status, body) = app
        .send(get("/api/v1/issues/conflicts", Some(&app.representative_token())))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["id"], issue_id);

    let uri = format!("/api/v1/issues/{}/citizen-fault", issue_id.as_str().unwrap());
    let (status, body) = app
        .send(empty_request(Method::POST, &uri, &app.representative_token()))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["dispute"], false);
    assert!(body["data"]["conflictResolvedAt"].is_string());
}

#[tokio::test]
async fn test_office_provisioning_is_admin_only() {
    let app = TestApp::new().await;
    let admin = token(Principal::Admin);

    let (status, body) = app
        .send(json_request(
            Method::POST,
            "/api/v1/offices",
            &admin,
            json!({ "name": "North Ward", "latitude": 10.0, "longitude": 10.0 }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let office_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(json_request(
            Method::POST,
            "/api/v1/offices",
            &admin,
            json!({ "name": "north ward", "latitude": 11.0, "longitude": 11.0 }),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "DUPLICATE_OFFICE");

    let (status, body) = app
        .send(json_request(
            Method::POST,
            "/api/v1/offices",
            &app.citizen_token(),
            json!({ "name": "South Ward", "latitude": 1.0, "longitude": 1.0 }),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "INSUFFICIENT_PERMISSIONS");

    let uri = format!("/api/v1/offices/{}/authorities", office_id);
    let (status, body) = app
        .send(json_request(
            Method::POST,
            &uri,
            &admin,
            json!({ "name": "Asha Rao", "email": "asha@north.gov.in", "role": "Drainage Engineer", "departmentName": "water" }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["officeId"], office_id);
    assert_eq!(body["data"]["isRepresentative"], false);
}

#[tokio::test]
async fn test_analytics_accepts_plain_dates() {
    let app = TestApp::new().await;
    app.report("Broken signal", 0.0, 0.0).await;

    let today = chrono::Utc::now().date_naive();
    let uri = format!(
        "/api/v1/issues/analytics?fromDate={}&toDate={}",
        today - chrono::Duration::days(7),
        today
    );
    let (status, body) = app
        .send(get(&uri, Some(&app.representative_token())))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let (status, body) = app
        .send(get(
            "/api/v1/issues/analytics?fromDate=last-week",
            Some(&app.representative_token()),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "fromDate");
}
