//! Documentation of the Tempo couples cycle-tracking API.
//!
//! Two linked accounts, `her` and `him`, share one cycle. She logs period days and moods; he gets
//! a daily card explaining the phase she is in and what tends to help.
//!
//!
//!
//! # General Infrastructure
//! - Single axum process in front of one SQLite file
//! - Pure cycle math lives in the `tempo-cycle` crate, this crate only stores and serves
//! - Sessions are issued by an external identity provider and read from the `session` table
//!
//!
//!
//! # Request Flow
//!
//! - [`auth::AuthUser`] resolves the bearer token to a user or answers 401
//! - [`auth::require_couple`] loads the caller's couple or answers 404 with `onboardingRequired`
//! - Role checks answer 403 naming the side that may perform the action
//! - Storage work runs through [`state::State::db`] on the blocking pool
//! - Handlers hand rows to [`cards`] to build the JSON views
//!
//!
//!
//! # Notes
//!
//! ## Period Start
//! The anchor stored on the couple is the only date cards and the calendar compute from. Every
//! period check-in re-reads the newest 100 check-ins and infers the start of the latest
//! contiguous run of active days, then writes it back when tracking is shared. An explicit
//! cycle update or onboarding date overwrites it the same way.
//!
//! ## Concurrency
//! Two check-ins landing together both recompute from history and write the same anchor, so the
//! last writer wins and the result converges.
//!
//!
//!
//! # Setup
//!
//! Run with defaults.
//! ```sh
//! cargo run
//! ```
//!
//! Seed articles and a dev session.
//! ```sh
//! cargo run -p tempo-seed -- articles articles.json
//! cargo run -p tempo-seed -- session her@example.com --name Ana
//! ```
//!
//! Verbose logs.
//! ```sh
//! RUST_LOG=info cargo run
//! ```
use std::{sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
};
use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod auth;
pub mod cards;
pub mod config;
pub mod database;
pub mod error;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;

use config::Config;
use state::State;

const LOCAL_ORIGIN: &str = "http://localhost:3000";

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = [config.cors_origin.as_str(), LOCAL_ORIGIN]
        .into_iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60))
}

pub fn router(state: Arc<State>) -> Router {
    let cors = cors_layer(&state.config);

    routes::api_routes().layer(cors).with_state(state)
}

pub async fn start_server() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = State::new(config).context("Failed to open database")?;

    info!("Starting server...");
    let address = format!("0.0.0.0:{}", state.config.port);
    let app = router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
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
}
