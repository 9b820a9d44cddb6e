//! Contact site entry point
//!
//! Serves the static website and the contact form API.

use anyhow::Context;
use clap::{Parser, Subcommand};
use contact_api::{
    handler::STATUS_OK, init_tracing, serve_with_shutdown, AppState, ContactMetrics,
    HealthResponse, LogFormat, SERVICE_NAME, SERVICE_VERSION,
};
use contact_core::Settings;
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "contact-site")]
#[command(about = "Jayid Botamed Health Care website server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Port to listen on, overrides PORT
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to, overrides HOST
        #[arg(long)]
        host: Option<String>,
    },

    /// Print the configuration snapshot and test the SMTP relay
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(LogFormat::from_env())?;

    let cli = Cli::parse();
    let settings = Settings::from_env().context("invalid configuration")?;

    match cli.command.unwrap_or(Commands::Serve {
        port: None,
        host: None,
    }) {
        Commands::Serve { port, host } => serve(settings, host, port).await,
        Commands::CheckConfig => check_config(settings).await,
    }
}

async fn serve(settings: Settings, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    log_mail_configuration(&settings);

    let metrics = Arc::new(ContactMetrics::new()?);
    let state = AppState::from_settings(&settings, metrics).context("failed to build mailer")?;

    // Probe the relay without holding up startup
    if let Some(mailer) = state.mailer.clone() {
        tokio::spawn(async move {
            match mailer.verify().await {
                Ok(()) => tracing::info!("SMTP relay reachable and credentials accepted"),
                Err(e) => tracing::error!(error = %e, "SMTP relay verification failed"),
            }
        });
    }

    let host = host.unwrap_or_else(|| settings.host.clone());
    let port = port.unwrap_or(settings.port);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", host, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("Starting {} v{} on {}", SERVICE_NAME, SERVICE_VERSION, addr);
    tracing::info!(
        environment = %settings.environment,
        static_dir = %settings.static_dir.display(),
        "Serving static site"
    );
    tracing::info!("Health check: http://{}/api/health", addr);

    serve_with_shutdown(listener, state, shutdown_signal()).await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn check_config(settings: Settings) -> anyhow::Result<()> {
    log_mail_configuration(&settings);

    let metrics = Arc::new(ContactMetrics::new()?);
    let state = AppState::from_settings(&settings, metrics)?;

    let health = HealthResponse {
        status: STATUS_OK.to_string(),
        environment: settings.environment.to_string(),
        email_configured: state.email_configured(),
    };
    println!("{}", serde_json::to_string_pretty(&health)?);

    let Some(mailer) = state.mailer else {
        anyhow::bail!("email is not configured");
    };
    mailer
        .verify()
        .await
        .context("SMTP relay verification failed")?;
    println!("SMTP relay verified");
    Ok(())
}

fn log_mail_configuration(settings: &Settings) {
    let vars = [
        ("SENDER_EMAIL", settings.mail_vars.sender_email),
        ("SENDER_PASSWORD", settings.mail_vars.sender_password),
        ("RECEIVER_EMAIL", settings.mail_vars.receiver_email),
    ];

    for (var, set) in vars {
        if set {
            tracing::info!(var, "Mail variable set");
        } else {
            tracing::warn!(var, "Mail variable not set");
        }
    }

    if settings.email_configured() {
        tracing::info!("Email transport configured");
    } else {
        tracing::warn!("Email not configured; contact submissions will be rejected");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
