//! Contact Site Server
//!
//! HTTP front for the Jayid Botamed Health Care website. Serves the static
//! single-page site and a small JSON API behind it.
//!
//! ## Features
//!
//! - **Contact form**: validates `name`, `phone` and `message` and emails them
//!   to the site owner through an SMTP relay
//! - **Health check**: reports environment and whether mail is configured
//! - **Static site**: assets from a directory, unknown paths get `index.html`
//! - **Telemetry**: structured request logs and Prometheus counters
//!
//! ## Architecture
//!
//! 1. **Handler** (`handler/`): router, endpoint handlers, the JSON error
//!    type and middleware.
//!
//! 2. **Telemetry** (`telemetry/`): tracing subscriber setup and metrics.
//!
//! Domain rules live in `contact-core`.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Start the server on $PORT (default 5000)
//! contact-site serve
//!
//! # Print the configuration snapshot and probe the relay
//! contact-site check-config
//! ```

pub mod handler;
pub mod telemetry;

pub use handler::{create_router, ApiError, AppState, HealthResponse};
pub use telemetry::{init_tracing, ContactMetrics, LogFormat, SubmissionOutcome};

use std::future::Future;
use tokio::net::TcpListener;

pub const SERVICE_NAME: &str = "contact-site";
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Serve the router on `listener` until `shutdown` resolves. In-flight
/// requests are allowed to finish.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    state: AppState,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let router = create_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
