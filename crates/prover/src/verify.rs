//! Verifier gate: the pairing check every purchase must pass.

use ark_bn254::{Bn254, Fr};
use ark_groth16::{prepare_verifying_key, Groth16, PreparedVerifyingKey, Proof, VerifyingKey};
use ark_snark::SNARK;
use marketplace_circuits::PublicSignals;
use thiserror::Error;

use crate::calldata::{Calldata, CalldataError, VerificationKeyJson};

/// Errors during verification
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("Malformed input: {0}")]
    MalformedInput(#[from] CalldataError),
    #[error("expected {expected} public signals, got {actual}")]
    SignalCount { expected: usize, actual: usize },
    #[error("Proof rejected by pairing check")]
    Rejected,
    #[error("Verification failed: {0}")]
    Verification(String),
}

impl VerifyError {
    /// Whether the failure happened before the pairing check ran.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            VerifyError::MalformedInput(_) | VerifyError::SignalCount { .. }
        )
    }
}

/// Stateless Groth16 acceptance test over a fixed verifying key.
///
/// The key is prepared once at construction and never changes afterwards.
#[derive(Clone)]
pub struct VerifierGate {
    pvk: PreparedVerifyingKey<Bn254>,
}

impl VerifierGate {
    pub fn new(vk: &VerifyingKey<Bn254>) -> Self {
        Self {
            pvk: prepare_verifying_key(vk),
        }
    }

    pub fn from_json(vk: &VerificationKeyJson) -> Result<Self, CalldataError> {
        Ok(Self::new(&vk.to_verifying_key()?))
    }

    pub fn verifying_key(&self) -> &VerifyingKey<Bn254> {
        &self.pvk.vk
    }

    /// Number of public signals the key was generated for.
    pub fn num_public_signals(&self) -> usize {
        self.pvk.vk.gamma_abc_g1.len().saturating_sub(1)
    }

    /// Accept or reject formatted calldata.
    ///
    /// Malformed input and a false pairing equation both return `false`;
    /// the distinction only shows up in the debug log.
    pub fn verify(&self, calldata: &Calldata) -> bool {
        match self.check(calldata) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(malformed = e.is_malformed(), error = %e, "proof denied");
                false
            }
        }
    }

    /// Like [`verify`](Self::verify), but reports why a proof was denied.
    pub fn check(&self, calldata: &Calldata) -> Result<(), VerifyError> {
        let expected = self.num_public_signals();
        if calldata.inputs.len() != expected {
            return Err(VerifyError::SignalCount {
                expected,
                actual: calldata.inputs.len(),
            });
        }

        let proof = calldata.proof()?;
        let signals = calldata.public_signals()?;

        if self.verify_proof(&proof, &signals)? {
            Ok(())
        } else {
            Err(VerifyError::Rejected)
        }
    }

    /// Verify an already decoded proof against decoded public signals.
    pub fn verify_proof(
        &self,
        proof: &Proof<Bn254>,
        signals: &PublicSignals,
    ) -> Result<bool, VerifyError> {
        let public_inputs: &[Fr] = signals.as_slice();
        if public_inputs.len() != self.num_public_signals() {
            return Err(VerifyError::SignalCount {
                expected: self.num_public_signals(),
                actual: public_inputs.len(),
            });
        }
        Groth16::<Bn254>::verify_with_processed_vk(&self.pvk, public_inputs, proof)
            .map_err(|e| VerifyError::Verification(e.to_string()))
    }
}
