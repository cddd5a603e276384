//! Proof generation library for proof-gated marketplace purchases.
//!
//! - [`setup`]: circuit-specific Groth16 setup and key persistence
//! - [`backend`]: the [`ProverBackend`] seam, witness solving and proving
//! - [`calldata`]: JSON proof/key layouts and the verifier calldata layout
//! - [`verify`]: the [`VerifierGate`] pairing check

pub mod backend;
pub mod calldata;
pub mod setup;
pub mod verify;

pub use backend::{
    generate_proof, solve_assignment, GeneratedProof, Groth16Backend, ProverBackend, ProverError,
    Witness,
};
pub use calldata::{format_calldata, Calldata, CalldataError, ProofJson, VerificationKeyJson};
pub use setup::{setup_purchase, CircuitKeys, KeyError};
pub use verify::{VerifierGate, VerifyError};
