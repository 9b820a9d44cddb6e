//! HTTP handlers for the contact site
//!
//! - `routes`: router assembly, endpoint handlers and the API error type
//! - `middleware`: request logging, CORS and panic recovery
//!
//! Every `/api` response is JSON. Everything outside `/api` is a static file
//! or the HTML shell.

pub mod middleware;
pub mod routes;

pub use middleware::{cors_layer, panic_response, request_logging_middleware};
pub use routes::{
    api_not_found, create_router, health_check, metrics, submit_contact, ApiError, AppState,
};

use serde::{Deserialize, Serialize};

pub const STATUS_OK: &str = "ok";
pub const MSG_SENT: &str = "Message sent successfully!";
pub const ERR_FIELDS_REQUIRED: &str = "All fields are required";
pub const ERR_INVALID_DATA: &str = "All fields must contain valid data";
pub const ERR_INVALID_BODY: &str = "Invalid JSON body";
pub const ERR_NOT_CONFIGURED: &str = "Email service not configured. Please contact administrator.";
pub const ERR_SEND_FAILED: &str = "Failed to send message. Please try again later.";
pub const ERR_API_NOT_FOUND: &str = "API endpoint not found";
pub const ERR_METHOD_NOT_ALLOWED: &str = "Method not allowed";
pub const ERR_INTERNAL: &str = "Internal server error";

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub environment: String,
    pub email_configured: bool,
}

/// Successful contact submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactSentResponse {
    pub message: String,
}

impl Default for ContactSentResponse {
    fn default() -> Self {
        Self {
            message: MSG_SENT.to_string(),
        }
    }
}
