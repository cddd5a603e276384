//! Witness solving and proof generation behind the [`ProverBackend`] seam.

use std::sync::Arc;
use std::time::Instant;

use ark_bn254::Bn254;
use ark_groth16::{Groth16, Proof, ProvingKey};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};
use ark_snark::SNARK;
use ark_std::rand::{CryptoRng, RngCore};
use marketplace_circuits::{
    ConstraintF, InputError, PublicSignals, PurchaseAssignment, PurchaseInputs, Violation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calldata::{format_calldata, Calldata, ProofJson};

/// Errors during proof generation
#[derive(Error, Debug)]
pub enum ProverError {
    #[error(transparent)]
    InvalidInput(#[from] InputError),
    #[error("Constraint doesn't match: {0}")]
    ConstraintViolation(Violation),
    #[error("Proof generation failed: {0}")]
    Proving(String),
}

/// A full satisfying assignment of the purchase circuit.
///
/// Only [`solve_assignment`] creates one, so holding a `Witness` means the
/// constraint system was satisfied.
#[derive(Clone, Debug)]
pub struct Witness {
    assignment: PurchaseAssignment,
    num_constraints: usize,
}

impl Witness {
    pub fn assignment(&self) -> &PurchaseAssignment {
        &self.assignment
    }

    pub fn public_signals(&self) -> PublicSignals {
        self.assignment.public_signals()
    }

    pub fn num_constraints(&self) -> usize {
        self.num_constraints
    }
}

/// Synthesize the purchase circuit for `assignment` and check every constraint.
pub fn solve_assignment(assignment: &PurchaseAssignment) -> Result<Witness, ProverError> {
    if let Err(violation) = assignment.check() {
        tracing::info!(%violation, "purchase assignment violates the relation");
        return Err(ProverError::ConstraintViolation(violation));
    }

    let cs = ConstraintSystem::<ConstraintF>::new_ref();
    assignment
        .circuit()
        .generate_constraints(cs.clone())
        .map_err(|e| ProverError::Proving(e.to_string()))?;

    let satisfied = cs
        .is_satisfied()
        .map_err(|e| ProverError::Proving(e.to_string()))?;
    if !satisfied {
        let at = cs
            .which_is_unsatisfied()
            .map_err(|e| ProverError::Proving(e.to_string()))?
            .unwrap_or_else(|| "unknown".to_string());
        return Err(ProverError::ConstraintViolation(Violation::Unsatisfied(at)));
    }

    Ok(Witness {
        assignment: assignment.clone(),
        num_constraints: cs.num_constraints(),
    })
}

/// The off-chain proving capability.
///
/// Implementations hold no shared mutable state, so one backend can serve
/// concurrent requests from many buyers.
pub trait ProverBackend: Send + Sync {
    /// Compute a witness, failing with [`ProverError::ConstraintViolation`]
    /// when the assignment is unsatisfiable.
    fn solve(&self, assignment: &PurchaseAssignment) -> Result<Witness, ProverError> {
        solve_assignment(assignment)
    }

    /// Produce a proof and its public signals from a solved witness.
    fn prove(&self, witness: Witness) -> Result<(Proof<Bn254>, PublicSignals), ProverError>;
}

/// Groth16 prover over BN254 with a fixed proving key.
#[derive(Clone)]
pub struct Groth16Backend {
    proving_key: Arc<ProvingKey<Bn254>>,
}

impl Groth16Backend {
    pub fn new(proving_key: Arc<ProvingKey<Bn254>>) -> Self {
        Self { proving_key }
    }

    /// Prove with caller-supplied randomness.
    pub fn prove_with_rng<R: RngCore + CryptoRng>(
        &self,
        witness: Witness,
        rng: &mut R,
    ) -> Result<(Proof<Bn254>, PublicSignals), ProverError> {
        let signals = witness.public_signals();
        let proof = Groth16::<Bn254>::prove(&self.proving_key, witness.assignment.circuit(), rng)
            .map_err(|e| ProverError::Proving(e.to_string()))?;
        Ok((proof, signals))
    }
}

impl ProverBackend for Groth16Backend {
    fn prove(&self, witness: Witness) -> Result<(Proof<Bn254>, PublicSignals), ProverError> {
        self.prove_with_rng(witness, &mut rand::thread_rng())
    }
}

/// Everything a buyer's client needs to submit a purchase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedProof {
    pub proof: ProofJson,
    pub public_signals: Vec<String>,
    pub calldata: Calldata,
}

/// Parse, solve, prove and format in one go.
pub fn generate_proof<B: ProverBackend + ?Sized>(
    backend: &B,
    inputs: &PurchaseInputs,
) -> Result<GeneratedProof, ProverError> {
    let start = Instant::now();
    let assignment = PurchaseAssignment::try_from(inputs)?;

    let witness = backend.solve(&assignment)?;
    tracing::debug!(constraints = witness.num_constraints(), "witness solved");

    let (proof, signals) = backend.prove(witness)?;
    tracing::info!(elapsed = ?start.elapsed(), "purchase proof generated");

    Ok(GeneratedProof {
        proof: ProofJson::from_proof(&proof),
        public_signals: signals.to_decimal_strings(),
        calldata: format_calldata(&proof, &signals),
    })
}
