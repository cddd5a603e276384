//! API route definitions.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::AppState;

/// Create API routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Proof generation
        .route("/api/prove/purchase", post(handlers::prove_purchase))
        // Verifier side
        .route("/api/calldata", post(handlers::format_calldata))
        .route("/api/verify", post(handlers::verify_proof))
        .route("/api/verification-key", get(handlers::verification_key))
}
