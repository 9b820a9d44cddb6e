//! Route definitions for the contact site
//!
//! - GET  /health, /api/health   - configuration snapshot
//! - POST /contact, /api/contact - contact form submission
//! - GET  /api/metrics           - Prometheus metrics
//! - any other /api path         - JSON 404
//! - everything else             - static assets, falling back to index.html

use axum::{
    body::Bytes,
    extract::{OriginalUri, State},
    http::{header, Method, StatusCode},
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{any, get, get_service, post, MethodRouter},
    Json, Router,
};
use contact_core::{
    ContactMailer, ContactSubmission, Environment, FieldPresence, MailError, RawSubmission,
    SentMail, Settings, SmtpMailSender, SubmissionError,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    catch_panic::CatchPanicLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use super::middleware::{cors_layer, panic_response, request_logging_middleware};
use super::{
    ContactSentResponse, HealthResponse, ERR_API_NOT_FOUND, ERR_FIELDS_REQUIRED,
    ERR_INTERNAL, ERR_INVALID_BODY, ERR_INVALID_DATA, ERR_METHOD_NOT_ALLOWED,
    ERR_NOT_CONFIGURED, ERR_SEND_FAILED, STATUS_OK,
};
use crate::telemetry::{ContactMetrics, SubmissionOutcome};

/// State shared by every route. Built once at startup and never mutated.
#[derive(Clone)]
pub struct AppState {
    pub environment: Environment,
    /// `None` when any mail variable was missing at startup
    pub mailer: Option<ContactMailer>,
    pub metrics: Arc<ContactMetrics>,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(
        environment: Environment,
        mailer: Option<ContactMailer>,
        metrics: Arc<ContactMetrics>,
        static_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            environment,
            mailer,
            metrics,
            static_dir: static_dir.into(),
        }
    }

    /// Wire the SMTP sender from settings when mail is configured
    pub fn from_settings(
        settings: &Settings,
        metrics: Arc<ContactMetrics>,
    ) -> Result<Self, MailError> {
        let mailer = match &settings.mail {
            Some(mail) => {
                let sender = SmtpMailSender::new(mail)?;
                Some(ContactMailer::from_settings(
                    Arc::new(sender),
                    &settings.site_name,
                    mail,
                ))
            }
            None => None,
        };

        Ok(Self::new(
            settings.environment.clone(),
            mailer,
            metrics,
            settings.static_dir.clone(),
        ))
    }

    pub fn email_configured(&self) -> bool {
        self.mailer.is_some()
    }

    /// Internal error text is only returned outside production
    pub fn expose_details(&self) -> bool {
        !self.environment.is_production()
    }

    fn details(&self, err: &impl ToString) -> Option<String> {
        self.expose_details().then(|| err.to_string())
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("environment", &self.environment)
            .field("email_configured", &self.email_configured())
            .field("static_dir", &self.static_dir)
            .finish()
    }
}

/// API error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InvalidBody(String),
    MissingFields(FieldPresence),
    InvalidData,
    NotConfigured,
    SendFailed { details: Option<String> },
    NotFound { method: String, path: String },
    MethodNotAllowed,
    Internal { details: Option<String> },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) | ApiError::MissingFields(_) | ApiError::InvalidData => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::NotConfigured | ApiError::SendFailed { .. } | ApiError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Metrics label for errors raised by the contact endpoint
    pub fn outcome(&self) -> Option<SubmissionOutcome> {
        match self {
            ApiError::InvalidBody(_) => Some(SubmissionOutcome::InvalidBody),
            ApiError::MissingFields(_) => Some(SubmissionOutcome::MissingFields),
            ApiError::InvalidData => Some(SubmissionOutcome::InvalidData),
            ApiError::NotConfigured => Some(SubmissionOutcome::NotConfigured),
            ApiError::SendFailed { .. } | ApiError::Internal { .. } => {
                Some(SubmissionOutcome::SendFailed)
            }
            ApiError::NotFound { .. } | ApiError::MethodNotAllowed => None,
        }
    }

    pub fn body(&self) -> Value {
        match self {
            ApiError::InvalidBody(reason) => json!({
                "error": ERR_INVALID_BODY,
                "details": reason,
            }),
            ApiError::MissingFields(received) => json!({
                "error": ERR_FIELDS_REQUIRED,
                "received": received,
            }),
            ApiError::InvalidData => json!({ "error": ERR_INVALID_DATA }),
            ApiError::NotConfigured => json!({ "error": ERR_NOT_CONFIGURED }),
            ApiError::SendFailed { details } => with_details(ERR_SEND_FAILED, details),
            ApiError::NotFound { method, path } => json!({
                "error": ERR_API_NOT_FOUND,
                "method": method,
                "path": path,
            }),
            ApiError::MethodNotAllowed => json!({ "error": ERR_METHOD_NOT_ALLOWED }),
            ApiError::Internal { details } => with_details(ERR_INTERNAL, details),
        }
    }
}

fn with_details(error: &str, details: &Option<String>) -> Value {
    let mut body = json!({ "error": error });
    if let Some(details) = details {
        body["details"] = Value::String(details.clone());
    }
    body
}

impl From<SubmissionError> for ApiError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::InvalidBody(reason) => ApiError::InvalidBody(reason),
            SubmissionError::MissingFields(presence) => ApiError::MissingFields(presence),
            SubmissionError::InvalidData => ApiError::InvalidData,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}

/// Create the router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let index = state.static_dir.join("index.html");
    // Non-GET requests outside /api get the JSON 405 instead of an empty one
    let assets: MethodRouter =
        get_service(ServeDir::new(&state.static_dir).fallback(ServeFile::new(index)))
            .fallback(method_not_allowed);

    let routes = Router::new()
        // Contact and health, with and without the /api prefix
        .route("/health", get(health_check).fallback(method_not_allowed))
        .route("/api/health", get(health_check).fallback(method_not_allowed))
        .route("/contact", post(submit_contact).fallback(method_not_allowed))
        .route("/api/contact", post(submit_contact).fallback(method_not_allowed))
        .route("/api/metrics", get(metrics).fallback(method_not_allowed))
        // Unknown API paths never reach the HTML shell
        .route("/api", any(api_not_found))
        .route("/api/", any(api_not_found))
        .route("/api/*rest", any(api_not_found))
        .fallback_service(assets);

    with_middleware(routes, state)
}

/// Apply the shared layer stack and bind the state
fn with_middleware(routes: Router<AppState>, state: AppState) -> Router {
    let expose_details = state.expose_details();

    routes
        .layer(from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .layer(CatchPanicLayer::custom(move |err| panic_response(err, expose_details)))
        .with_state(state)
}

/// GET /health - configuration snapshot taken at startup
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: STATUS_OK.to_string(),
        environment: state.environment.as_str().to_string(),
        email_configured: state.email_configured(),
    })
}

/// POST /contact - validate a submission and email it to the site owner
///
/// Checks run in a fixed order: field presence, trimming, emptiness, mail
/// configuration, then a single send attempt.
#[tracing::instrument(name = "Contact submission", skip(state, body), fields(body_bytes = body.len()))]
pub async fn submit_contact(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ContactSentResponse>, ApiError> {
    tracing::info!("Contact submission received");

    let result = process_submission(&state, &body).await;

    let outcome = match &result {
        Ok(_) => SubmissionOutcome::Sent,
        Err(err) => err.outcome().unwrap_or(SubmissionOutcome::SendFailed),
    };
    state.metrics.record_outcome(outcome);

    result.map(|_| Json(ContactSentResponse::default()))
}

async fn process_submission(state: &AppState, body: &[u8]) -> Result<SentMail, ApiError> {
    let raw = RawSubmission::from_json_bytes(body).map_err(reject)?;
    let submission = ContactSubmission::parse(&raw).map_err(reject)?;
    tracing::debug!("Validation passed");

    let Some(mailer) = state.mailer.clone() else {
        tracing::error!("Email transport not configured");
        return Err(ApiError::NotConfigured);
    };

    let started = Instant::now();
    // Spawned so that a client disconnect cannot cancel a send in flight
    let joined = tokio::spawn(async move { mailer.deliver(&submission).await }).await;
    state
        .metrics
        .observe_send_duration(started.elapsed().as_secs_f64());

    match joined {
        Ok(Ok(sent)) => {
            tracing::info!(message_id = %sent.message_id, "Email sent");
            Ok(sent)
        }
        Ok(Err(err)) => {
            tracing::error!(error = %err, "Email sending failed");
            Err(ApiError::SendFailed {
                details: state.details(&err),
            })
        }
        Err(err) => {
            tracing::error!(error = %err, "Email task did not complete");
            Err(ApiError::Internal {
                details: state.details(&err),
            })
        }
    }
}

fn reject(err: SubmissionError) -> ApiError {
    tracing::warn!(reason = err.kind(), "Validation failed");
    ApiError::from(err)
}

/// GET /api/metrics - Prometheus text format
pub async fn metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = state.metrics.encode_text().map_err(|e| ApiError::Internal {
        details: state.details(&e),
    })?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response())
}

/// Any unmatched path under /api
pub async fn api_not_found(method: Method, OriginalUri(uri): OriginalUri) -> ApiError {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    tracing::warn!(method = %method, path = %path, "API endpoint not found");
    ApiError::NotFound {
        method: method.to_string(),
        path,
    }
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
