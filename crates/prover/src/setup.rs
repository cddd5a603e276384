//! Circuit-specific Groth16 setup and key persistence.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, ProvingKey, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, SerializationError};
use ark_snark::SNARK;
use ark_std::rand::{CryptoRng, RngCore};
use marketplace_circuits::PurchaseCircuit;
use thiserror::Error;

use crate::calldata::VerificationKeyJson;

pub const PROVING_KEY_FILE: &str = "purchase.pk";
pub const VERIFYING_KEY_FILE: &str = "purchase.vk";
pub const VERIFICATION_KEY_JSON_FILE: &str = "verification_key.json";

/// Errors while producing, saving or loading key material
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Setup failed: {0}")]
    Setup(String),
    #[error("Key I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Key serialization failed: {0}")]
    Serialization(#[from] SerializationError),
    #[error("Key JSON export failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Proving and verifying key for the purchase circuit.
#[derive(Clone)]
pub struct CircuitKeys {
    pub proving_key: ProvingKey<Bn254>,
    pub verifying_key: VerifyingKey<Bn254>,
}

/// Run a circuit-specific setup for the purchase circuit.
///
/// Single-party setup: whoever controls `rng` can forge proofs. Production
/// keys come from a ceremony and are loaded with
/// [`CircuitKeys::load_from_directory`].
pub fn setup_purchase<R: RngCore + CryptoRng>(rng: &mut R) -> Result<CircuitKeys, KeyError> {
    let (proving_key, verifying_key) =
        Groth16::<Bn254>::circuit_specific_setup(PurchaseCircuit::<Fr>::empty(), rng)
            .map_err(|e| KeyError::Setup(e.to_string()))?;

    tracing::debug!(
        public_inputs = verifying_key.gamma_abc_g1.len() - 1,
        "purchase circuit setup complete"
    );

    Ok(CircuitKeys {
        proving_key,
        verifying_key,
    })
}

impl CircuitKeys {
    /// Write both keys (compressed) and the JSON verification key into `dir`.
    pub fn save_to_directory(&self, dir: &Path) -> Result<(), KeyError> {
        fs::create_dir_all(dir)?;

        let mut pk_file = BufWriter::new(File::create(dir.join(PROVING_KEY_FILE))?);
        self.proving_key.serialize_compressed(&mut pk_file)?;

        let mut vk_file = BufWriter::new(File::create(dir.join(VERIFYING_KEY_FILE))?);
        self.verifying_key.serialize_compressed(&mut vk_file)?;

        let json = VerificationKeyJson::from_verifying_key(&self.verifying_key);
        let json_file = BufWriter::new(File::create(dir.join(VERIFICATION_KEY_JSON_FILE))?);
        serde_json::to_writer_pretty(json_file, &json)?;

        Ok(())
    }

    /// Load keys previously written by [`save_to_directory`](Self::save_to_directory).
    ///
    /// The verifying key is fully validated; the proving key is trusted local
    /// material and skips the (slow) subgroup checks.
    pub fn load_from_directory(dir: &Path) -> Result<Self, KeyError> {
        let pk_file = BufReader::new(File::open(dir.join(PROVING_KEY_FILE))?);
        let proving_key = ProvingKey::<Bn254>::deserialize_compressed_unchecked(pk_file)?;

        let vk_file = BufReader::new(File::open(dir.join(VERIFYING_KEY_FILE))?);
        let verifying_key = VerifyingKey::<Bn254>::deserialize_compressed(vk_file)?;

        Ok(Self {
            proving_key,
            verifying_key,
        })
    }

    /// Whether `dir` holds a complete key set.
    pub fn exist_in(dir: &Path) -> bool {
        dir.join(PROVING_KEY_FILE).is_file() && dir.join(VERIFYING_KEY_FILE).is_file()
    }
}
