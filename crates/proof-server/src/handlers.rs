//! Request handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use marketplace_circuits::PurchaseInputs;
use marketplace_prover::{generate_proof, Calldata, GeneratedProof, ProofJson, VerificationKeyJson};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::AppState;

/// A proof in its JSON form together with its public signals.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofRequest {
    pub proof: ProofJson,
    pub public_signals: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub public_signals: usize,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text())
    }
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        public_signals: state.gate.num_public_signals(),
    })
}

/// Generate a purchase proof.
///
/// Proving runs on the blocking pool. On timeout the client gets a 504; the
/// blocking task itself cannot be cancelled and runs to completion.
pub async fn prove_purchase(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PurchaseInputs>, JsonRejection>,
) -> Result<Json<GeneratedProof>, ApiError> {
    let Json(inputs) = payload?;

    let backend = Arc::clone(&state.backend);
    let task = tokio::task::spawn_blocking(move || generate_proof(backend.as_ref(), &inputs));

    let generated = tokio::time::timeout(state.prove_timeout, task)
        .await
        .map_err(|_| ApiError::Timeout(state.prove_timeout))?
        .map_err(|e| ApiError::Internal(format!("prover task failed: {e}")))??;

    Ok(Json(generated))
}

/// Convert a JSON proof into verifier calldata.
pub async fn format_calldata(
    payload: Result<Json<ProofRequest>, JsonRejection>,
) -> Result<Json<Calldata>, ApiError> {
    let Json(request) = payload?;
    let calldata = Calldata::from_json(&request.proof, &request.public_signals)?;
    Ok(Json(calldata))
}

/// Run the verifier gate on a JSON proof.
pub async fn verify_proof(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ProofRequest>, JsonRejection>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let Json(request) = payload?;
    let calldata = Calldata::from_json(&request.proof, &request.public_signals)?;
    let valid = state.gate.verify(&calldata);
    tracing::info!(valid, "proof verified");
    Ok(Json(VerifyResponse { valid }))
}

pub async fn verification_key(State(state): State<Arc<AppState>>) -> Json<VerificationKeyJson> {
    Json(state.verification_key.clone())
}
