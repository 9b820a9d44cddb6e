//! Integration tests for the contact site router
//!
//! Covers:
//! - Health reporting with and without mail configured
//! - Contact validation order and error bodies
//! - Send success and failure, including production detail hiding
//! - API 404s, 405s and the static site fallback
//! - Metrics counters
//! - A real TCP round trip with graceful shutdown

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use contact_api::{
    create_router, serve_with_shutdown, AppState, ContactMetrics, SubmissionOutcome,
};
use contact_core::{ContactMailer, ContactTemplate, Environment, StubMailSender};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const RECEIVER: &str = "owner@example.com";

/// Test fixture: router state plus handles on the stub transport and metrics
struct TestSite {
    state: AppState,
    sender: Option<Arc<StubMailSender>>,
    metrics: Arc<ContactMetrics>,
    _static_dir: TempDir,
}

impl TestSite {
    fn new(environment: Environment, sender: Option<StubMailSender>) -> Self {
        let static_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            static_dir.path().join("index.html"),
            "<!doctype html><title>Jayid Botamed Health Care</title>",
        )
        .unwrap();
        std::fs::write(static_dir.path().join("style.css"), "body { margin: 0; }").unwrap();

        let sender = sender.map(Arc::new);
        let mailer = sender.clone().map(|s| {
            ContactMailer::new(
                s,
                ContactTemplate::new("Jayid Botamed Health Care", "site@example.com", RECEIVER),
            )
        });
        let metrics = Arc::new(ContactMetrics::new().unwrap());
        let state = AppState::new(environment, mailer, metrics.clone(), static_dir.path());

        Self {
            state,
            sender,
            metrics,
            _static_dir: static_dir,
        }
    }

    fn configured() -> Self {
        Self::new(Environment::Development, Some(StubMailSender::succeeding()))
    }

    fn unconfigured() -> Self {
        Self::new(Environment::Development, None)
    }

    fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    fn sender(&self) -> &StubMailSender {
        self.sender.as_deref().unwrap()
    }

    async fn get(&self, uri: &str) -> Response {
        self.router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_raw(&self, uri: &str, body: &str) -> Response {
        self.router()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn post_json(&self, uri: &str, body: Value) -> Response {
        self.post_raw(uri, &body.to_string()).await
    }
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn valid_submission() -> Value {
    json!({
        "name": "  Amina Yusuf ",
        "phone": " +252 61 7523834 ",
        "message": "\nI would like to book an appointment.  "
    })
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health_reports_configuration() {
    let site = TestSite::configured();

    for uri in ["/health", "/api/health"] {
        let response = site.get(uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "status": "ok",
                "environment": "development",
                "emailConfigured": true
            })
        );
    }
}

#[tokio::test]
async fn test_health_without_mail_in_production() {
    let site = TestSite::new(Environment::Production, None);

    let body = body_json(site.get("/api/health").await).await;
    assert_eq!(body["environment"], "production");
    assert_eq!(body["emailConfigured"], false);
}

// ---------------------------------------------------------------------------
// Contact validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_missing_fields_reports_received_flags() {
    let site = TestSite::configured();

    let response = site
        .post_json("/api/contact", json!({ "name": "Amina", "phone": "" }))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({
            "error": "All fields are required",
            "received": { "name": true, "phone": false, "message": false }
        })
    );
    assert_eq!(site.sender().attempts(), 0);
    assert_eq!(site.metrics.submissions(SubmissionOutcome::MissingFields), 1);
}

#[tokio::test]
async fn test_empty_body_is_missing_every_field() {
    let site = TestSite::configured();

    let response = site.post_raw("/contact", "").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["received"],
        json!({ "name": false, "phone": false, "message": false })
    );
}

#[tokio::test]
async fn test_whitespace_only_fields_are_invalid_data() {
    let site = TestSite::configured();

    let response = site
        .post_json(
            "/api/contact",
            json!({ "name": "   ", "phone": "123", "message": "hi" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "All fields must contain valid data" })
    );
    assert_eq!(site.sender().attempts(), 0);
}

#[tokio::test]
async fn test_non_string_field_is_invalid_data() {
    let site = TestSite::configured();

    let response = site
        .post_json(
            "/api/contact",
            json!({ "name": "Amina", "phone": 7523834, "message": "hi" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "All fields must contain valid data"
    );
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let site = TestSite::configured();

    let response = site.post_raw("/api/contact", "{\"name\": ").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid JSON body");
    assert!(body["details"].is_string());

    let response = site.post_raw("/api/contact", "[1, 2, 3]").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid JSON body");

    assert_eq!(site.metrics.submissions(SubmissionOutcome::InvalidBody), 2);
}

#[tokio::test]
async fn test_validation_runs_before_configuration_check() {
    let site = TestSite::unconfigured();

    let response = site.post_json("/api/contact", json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "All fields are required");
}

// ---------------------------------------------------------------------------
// Contact delivery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_not_configured_returns_500() {
    let site = TestSite::unconfigured();

    let response = site.post_json("/api/contact", valid_submission()).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Email service not configured. Please contact administrator." })
    );
    assert_eq!(site.metrics.submissions(SubmissionOutcome::NotConfigured), 1);
    assert_eq!(site.metrics.send_count(), 0);
}

#[tokio::test]
async fn test_successful_submission_sends_one_email() {
    let site = TestSite::configured();

    let response = site.post_json("/api/contact", valid_submission()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "message": "Message sent successfully!" })
    );

    let sent = site.sender().sent();
    assert_eq!(sent.len(), 1);
    let mail = &sent[0];
    assert_eq!(mail.to, RECEIVER);
    assert_eq!(mail.reply_to.as_deref(), Some("+252 61 7523834"));
    assert_eq!(mail.subject, "New Contact Form Message from Amina Yusuf");
    assert!(mail.text.contains("Name: Amina Yusuf\n"));
    assert!(mail.text.contains("Phone: +252 61 7523834\n"));
    assert!(mail.text.contains("I would like to book an appointment.\n"));

    assert_eq!(site.metrics.submissions(SubmissionOutcome::Sent), 1);
    assert_eq!(site.metrics.send_count(), 1);
}

#[tokio::test]
async fn test_contact_without_api_prefix() {
    let site = TestSite::configured();

    let response = site.post_json("/contact", valid_submission()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(site.sender().sent().len(), 1);
}

#[tokio::test]
async fn test_repeated_submissions_send_repeatedly() {
    let site = TestSite::configured();

    for _ in 0..2 {
        let response = site.post_json("/api/contact", valid_submission()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(site.sender().sent().len(), 2);
    assert_eq!(site.metrics.submissions(SubmissionOutcome::Sent), 2);
}

#[tokio::test]
async fn test_send_failure_includes_details_outside_production() {
    let site = TestSite::new(
        Environment::Development,
        Some(StubMailSender::failing("535 Authentication failed")),
    );

    let response = site.post_json("/api/contact", valid_submission()).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({
            "error": "Failed to send message. Please try again later.",
            "details": "535 Authentication failed"
        })
    );
    assert_eq!(site.sender().attempts(), 1);
    assert_eq!(site.metrics.submissions(SubmissionOutcome::SendFailed), 1);
}

#[tokio::test]
async fn test_send_failure_hides_details_in_production() {
    let site = TestSite::new(
        Environment::Production,
        Some(StubMailSender::failing("535 Authentication failed")),
    );

    let response = site.post_json("/api/contact", valid_submission()).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Failed to send message. Please try again later." })
    );
    assert_eq!(site.sender().attempts(), 1);
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_unknown_api_path_is_json_404() {
    let site = TestSite::configured();

    let response = site.get("/api/unknown?x=1").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        json!({
            "error": "API endpoint not found",
            "method": "GET",
            "path": "/api/unknown?x=1"
        })
    );

    let response = site.post_json("/api/contact/extra", json!({})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["method"], "POST");
    assert_eq!(body["path"], "/api/contact/extra");

    for uri in ["/api", "/api/"] {
        let response = site.get(uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "uri {}", uri);
        let body = body_json(response).await;
        assert_eq!(body["error"], "API endpoint not found");
        assert_eq!(body["path"], uri);
    }
}

#[tokio::test]
async fn test_wrong_method_on_contact() {
    let site = TestSite::configured();

    let response = site.get("/api/contact").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Method not allowed" })
    );
    assert_eq!(site.sender().attempts(), 0);
}

#[tokio::test]
async fn test_wrong_method_on_static_path() {
    let site = TestSite::configured();

    let response = site.post_json("/about", json!({})).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Method not allowed" })
    );
}

#[tokio::test]
async fn test_static_assets_and_spa_fallback() {
    let site = TestSite::configured();

    let response = site.get("/style.css").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "body { margin: 0; }");

    for uri in ["/", "/about/team", "/services"] {
        let response = site.get(uri).await;
        assert_eq!(response.status(), StatusCode::OK, "uri {}", uri);
        assert!(body_text(response)
            .await
            .contains("<title>Jayid Botamed Health Care</title>"));
    }
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let site = TestSite::configured();

    site.post_json("/api/contact", valid_submission()).await;
    site.post_json("/api/contact", json!({})).await;

    let response = site.get("/api/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(text.contains("contact_submissions_total{outcome=\"sent\"} 1"));
    assert!(text.contains("contact_submissions_total{outcome=\"missing_fields\"} 1"));
}

#[tokio::test]
async fn test_request_id_header_present() {
    let site = TestSite::configured();

    let response = site.get("/api/health").await;
    assert!(response.headers().contains_key("x-request-id"));
}

// ---------------------------------------------------------------------------
// Real server
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_server_round_trip_and_shutdown() {
    let site = TestSite::configured();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(serve_with_shutdown(listener, site.state.clone(), async move {
        let _ = shutdown_rx.await;
    }));

    let client = reqwest::Client::new();

    let health: Value = client
        .get(format!("http://{}/api/health", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["emailConfigured"], true);

    let response = client
        .post(format!("http://{}/api/contact", addr))
        .json(&valid_submission())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(site.sender().sent().len(), 1);

    shutdown_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}
