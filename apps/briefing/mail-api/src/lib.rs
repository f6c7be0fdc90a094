//! BriefMe mail API
//!
//! HTTP surface over the mail dispatcher:
//!
//! - `GET  /health`
//! - `POST /api/test/email`: account test email through the provider chain
//! - `POST /api/briefings/send`: deliver a rendered briefing
//! - `POST /api/test/resend-direct`: Resend only, no fallback
//!
//! Configuration is read from the environment once at startup.

pub mod config;
pub mod content;
pub mod error;
pub mod handlers;
pub mod state;

use axum::Router;
use config::Config;
use core_config::FromEnv;
use eyre::{Result, WrapErr};
use mailer::provider::http_client;
use mailer::{Dispatcher, ResendProvider};
use state::AppState;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, error, info, warn};

/// Build the application state from loaded configuration
pub fn build_state(config: &Config) -> Result<AppState> {
    let dispatcher = Dispatcher::from_config(&config.mailer)?;
    let mut state = AppState::new(config.app, dispatcher);

    if let Some(credentials) = &config.mailer.resend {
        let provider = ResendProvider::new(credentials.clone(), http_client(config.mailer.timeout)?);
        state = state.with_resend(provider, config.resend_from.clone());
    }

    Ok(state)
}

/// Router with request tracing
pub fn app(state: AppState) -> Router {
    handlers::router(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

/// Run the mail API until SIGINT or SIGTERM
pub async fn run() -> Result<()> {
    let config = Config::from_env().wrap_err("Failed to load configuration")?;
    core_config::tracing::init_tracing(&config.environment);

    info!(
        name = %config.app.name,
        version = %config.app.version,
        environment = ?config.environment,
        "Starting mail API"
    );

    let state = build_state(&config).wrap_err("Failed to set up email delivery")?;
    let providers = state.dispatcher.provider_names();
    if providers.is_empty() {
        warn!(
            debug_dir = %state.dispatcher.debug_store().dir().display(),
            "No email providers configured, messages will be written to the debug store"
        );
    } else {
        info!(providers = ?providers, "Email providers configured");
    }

    let address = config.server.address();
    let listener = TcpListener::bind(&address)
        .await
        .wrap_err_with(|| format!("Failed to bind mail API to {address}"))?;

    info!("Server listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Mail API server failed")?;

    info!("Mail API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully");
        },
    }
}
