//! HTTP API server for purchase proof generation.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use marketplace_prover::{
    setup_purchase, CircuitKeys, Groth16Backend, ProverBackend, VerificationKeyJson, VerifierGate,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod handlers;
mod routes;

use config::ServerConfig;

/// Application state shared across handlers
///
/// Key material is fixed at startup, so no lock is needed.
pub struct AppState {
    pub backend: Arc<dyn ProverBackend>,
    pub gate: VerifierGate,
    pub verification_key: VerificationKeyJson,
    pub prove_timeout: Duration,
}

impl AppState {
    pub fn new(keys: CircuitKeys, prove_timeout: Duration) -> Self {
        Self {
            gate: VerifierGate::new(&keys.verifying_key),
            verification_key: VerificationKeyJson::from_verifying_key(&keys.verifying_key),
            backend: Arc::new(Groth16Backend::new(Arc::new(keys.proving_key))),
            prove_timeout,
        }
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

fn load_or_setup_keys(config: &ServerConfig) -> Result<CircuitKeys, marketplace_prover::KeyError> {
    let keys_dir = config.keys_dir.as_path();
    if CircuitKeys::exist_in(keys_dir) {
        tracing::info!("Loading existing circuit keys from {:?}", keys_dir);
        return CircuitKeys::load_from_directory(keys_dir);
    }

    tracing::info!("Running purchase circuit setup (this may take a while)...");
    let keys = setup_purchase(&mut rand::thread_rng())?;
    keys.save_to_directory(keys_dir)?;
    tracing::info!("Circuit keys saved to {:?}", keys_dir);
    Ok(keys)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting marketplace proof server...");

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let keys = match load_or_setup_keys(&config) {
        Ok(keys) => keys,
        Err(e) => {
            tracing::error!(error = %e, "failed to prepare circuit keys");
            std::process::exit(1);
        }
    };

    let state = Arc::new(AppState::new(keys, config.prove_timeout));

    tracing::info!("Listening on {}", config.bind_addr);
    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, addr = %config.bind_addr, "failed to bind");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app(state)).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
