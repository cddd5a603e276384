//! Proof and verifying-key encodings shared with the on-chain verifier.
//!
//! Two layouts exist for a Groth16 proof:
//!
//! - [`ProofJson`], the prover's native JSON form (`pi_a`, `pi_b`, `pi_c`). Every
//!   `Fq2` coordinate of the G2 point `pi_b` is written `[c0, c1]`.
//! - [`Calldata`], the argument layout of `purchaseWithProof` and of the verifier
//!   contract. The EVM pairing precompile (EIP-197) reads `Fq2` elements as
//!   `[c1, c0]`, so both coordinate pairs of `B` are swapped. `A` and `C` are
//!   passed through unchanged.
//!
//! The swap is a fixed protocol constant. Forgetting it does not raise an error;
//! the proof just stops verifying. `tests::test_g2_generator_golden_vector`
//! pins the exact order.

use ark_bn254::{Bn254, Fq, Fq2, G1Affine, G2Affine};
use ark_groth16::{Proof, VerifyingKey};
use marketplace_circuits::{
    decimal_to_field, field_to_be_bytes, field_to_decimal, FieldError, PublicSignals, SignalError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors while decoding proof or key material.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalldataError {
    #[error("invalid coordinate in {what}: {reason}")]
    Coordinate { what: &'static str, reason: FieldError },
    #[error("{0} is not in affine form")]
    NotAffine(&'static str),
    #[error("{0} is not on the curve")]
    NotOnCurve(&'static str),
    #[error("{0} is not in the prime-order subgroup")]
    NotInSubgroup(&'static str),
    #[error("{0}")]
    Signals(#[from] SignalError),
    #[error("verifying key has {actual} IC points, expected nPublic + 1 = {expected}")]
    IcLength { expected: usize, actual: usize },
}

/// Groth16 proof in the prover's JSON layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofJson {
    pub pi_a: [String; 3],
    pub pi_b: [[String; 2]; 3],
    pub pi_c: [String; 3],
    pub protocol: String,
    pub curve: String,
}

impl ProofJson {
    pub fn from_proof(proof: &Proof<Bn254>) -> Self {
        Self {
            pi_a: g1_to_json(&proof.a),
            pi_b: g2_to_json(&proof.b),
            pi_c: g1_to_json(&proof.c),
            protocol: "groth16".to_string(),
            curve: "bn128".to_string(),
        }
    }

    pub fn to_proof(&self) -> Result<Proof<Bn254>, CalldataError> {
        Ok(Proof {
            a: g1_from_json(&self.pi_a, "pi_a")?,
            b: g2_from_json(&self.pi_b, "pi_b")?,
            c: g1_from_json(&self.pi_c, "pi_c")?,
        })
    }
}

/// Proof and public signals laid out as the verifier's call signature expects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calldata {
    pub a: [String; 2],
    /// `[[x.c1, x.c0], [y.c1, y.c0]]`
    pub b: [[String; 2]; 2],
    pub c: [String; 2],
    pub inputs: Vec<String>,
}

/// Re-encode a proof and its public signals for the on-chain verifier.
///
/// Pure structural re-encoding; no curve arithmetic happens here.
pub fn format_calldata(proof: &Proof<Bn254>, signals: &PublicSignals) -> Calldata {
    Calldata {
        a: g1_to_pair(&proof.a),
        b: g2_to_swapped(&proof.b),
        c: g1_to_pair(&proof.c),
        inputs: signals.to_decimal_strings(),
    }
}

impl Calldata {
    /// Format a JSON proof together with its decimal public signals.
    pub fn from_json(proof: &ProofJson, public_signals: &[String]) -> Result<Self, CalldataError> {
        let signals = PublicSignals::from_decimal_strings(public_signals)?;
        Ok(format_calldata(&proof.to_proof()?, &signals))
    }

    /// Decode the proof points, undoing the `B` coordinate swap.
    pub fn proof(&self) -> Result<Proof<Bn254>, CalldataError> {
        Ok(Proof {
            a: g1_from_pair(&self.a, "a")?,
            b: g2_from_swapped(&self.b, "b")?,
            c: g1_from_pair(&self.c, "c")?,
        })
    }

    pub fn public_signals(&self) -> Result<PublicSignals, CalldataError> {
        Ok(PublicSignals::from_decimal_strings(&self.inputs)?)
    }

    /// Render as the comma-separated argument list a Solidity call takes,
    /// each element a 0x-prefixed 32-byte big-endian word.
    pub fn to_solidity_calldata(&self) -> Result<String, CalldataError> {
        let word = |value: &String, what: &'static str| -> Result<String, CalldataError> {
            let element: Fq = decimal_to_field(value)
                .map_err(|reason| CalldataError::Coordinate { what, reason })?;
            Ok(format!("\"0x{}\"", hex::encode(field_to_be_bytes(&element))))
        };
        let pair = |values: &[String; 2], what: &'static str| -> Result<String, CalldataError> {
            Ok(format!("[{},{}]", word(&values[0], what)?, word(&values[1], what)?))
        };

        let inputs = self
            .inputs
            .iter()
            .map(|value| {
                let element: ark_bn254::Fr = decimal_to_field(value).map_err(|reason| {
                    CalldataError::Coordinate {
                        what: "inputs",
                        reason,
                    }
                })?;
                Ok(format!("\"0x{}\"", hex::encode(field_to_be_bytes(&element))))
            })
            .collect::<Result<Vec<_>, CalldataError>>()?;

        Ok(format!(
            "{},[{},{}],{},[{}]",
            pair(&self.a, "a")?,
            pair(&self.b[0], "b")?,
            pair(&self.b[1], "b")?,
            pair(&self.c, "c")?,
            inputs.join(",")
        ))
    }
}

/// Groth16 verifying key in the JSON layout exported at setup time.
///
/// G2 coordinates use the native `[c0, c1]` order, like [`ProofJson`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationKeyJson {
    pub protocol: String,
    pub curve: String,
    #[serde(rename = "nPublic")]
    pub n_public: usize,
    pub vk_alpha_1: [String; 3],
    pub vk_beta_2: [[String; 2]; 3],
    pub vk_gamma_2: [[String; 2]; 3],
    pub vk_delta_2: [[String; 2]; 3],
    #[serde(rename = "IC")]
    pub ic: Vec<[String; 3]>,
}

impl VerificationKeyJson {
    pub fn from_verifying_key(vk: &VerifyingKey<Bn254>) -> Self {
        Self {
            protocol: "groth16".to_string(),
            curve: "bn128".to_string(),
            n_public: vk.gamma_abc_g1.len().saturating_sub(1),
            vk_alpha_1: g1_to_json(&vk.alpha_g1),
            vk_beta_2: g2_to_json(&vk.beta_g2),
            vk_gamma_2: g2_to_json(&vk.gamma_g2),
            vk_delta_2: g2_to_json(&vk.delta_g2),
            ic: vk.gamma_abc_g1.iter().map(g1_to_json).collect(),
        }
    }

    pub fn to_verifying_key(&self) -> Result<VerifyingKey<Bn254>, CalldataError> {
        if self.ic.len() != self.n_public + 1 {
            return Err(CalldataError::IcLength {
                expected: self.n_public + 1,
                actual: self.ic.len(),
            });
        }
        Ok(VerifyingKey {
            alpha_g1: g1_from_json(&self.vk_alpha_1, "vk_alpha_1")?,
            beta_g2: g2_from_json(&self.vk_beta_2, "vk_beta_2")?,
            gamma_g2: g2_from_json(&self.vk_gamma_2, "vk_gamma_2")?,
            delta_g2: g2_from_json(&self.vk_delta_2, "vk_delta_2")?,
            gamma_abc_g1: self
                .ic
                .iter()
                .map(|point| g1_from_json(point, "IC"))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

fn fq(value: &str, what: &'static str) -> Result<Fq, CalldataError> {
    decimal_to_field(value).map_err(|reason| CalldataError::Coordinate { what, reason })
}

fn g1_to_pair(point: &G1Affine) -> [String; 2] {
    [field_to_decimal(&point.x), field_to_decimal(&point.y)]
}

fn g1_to_json(point: &G1Affine) -> [String; 3] {
    let [x, y] = g1_to_pair(point);
    [x, y, "1".to_string()]
}

fn g2_to_json(point: &G2Affine) -> [[String; 2]; 3] {
    [
        [field_to_decimal(&point.x.c0), field_to_decimal(&point.x.c1)],
        [field_to_decimal(&point.y.c0), field_to_decimal(&point.y.c1)],
        ["1".to_string(), "0".to_string()],
    ]
}

fn g2_to_swapped(point: &G2Affine) -> [[String; 2]; 2] {
    [
        [field_to_decimal(&point.x.c1), field_to_decimal(&point.x.c0)],
        [field_to_decimal(&point.y.c1), field_to_decimal(&point.y.c0)],
    ]
}

fn g1_from_pair(coords: &[String; 2], what: &'static str) -> Result<G1Affine, CalldataError> {
    let point = G1Affine::new_unchecked(fq(&coords[0], what)?, fq(&coords[1], what)?);
    if !point.is_on_curve() {
        return Err(CalldataError::NotOnCurve(what));
    }
    if !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(CalldataError::NotInSubgroup(what));
    }
    Ok(point)
}

fn g1_from_json(coords: &[String; 3], what: &'static str) -> Result<G1Affine, CalldataError> {
    if coords[2] != "1" {
        return Err(CalldataError::NotAffine(what));
    }
    g1_from_pair(&[coords[0].clone(), coords[1].clone()], what)
}

fn g2_from_coordinates(
    x: (Fq, Fq),
    y: (Fq, Fq),
    what: &'static str,
) -> Result<G2Affine, CalldataError> {
    let point = G2Affine::new_unchecked(Fq2::new(x.0, x.1), Fq2::new(y.0, y.1));
    if !point.is_on_curve() {
        return Err(CalldataError::NotOnCurve(what));
    }
    if !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(CalldataError::NotInSubgroup(what));
    }
    Ok(point)
}

fn g2_from_json(coords: &[[String; 2]; 3], what: &'static str) -> Result<G2Affine, CalldataError> {
    if coords[2][0] != "1" || coords[2][1] != "0" {
        return Err(CalldataError::NotAffine(what));
    }
    g2_from_coordinates(
        (fq(&coords[0][0], what)?, fq(&coords[0][1], what)?),
        (fq(&coords[1][0], what)?, fq(&coords[1][1], what)?),
        what,
    )
}

fn g2_from_swapped(coords: &[[String; 2]; 2], what: &'static str) -> Result<G2Affine, CalldataError> {
    g2_from_coordinates(
        (fq(&coords[0][1], what)?, fq(&coords[0][0], what)?),
        (fq(&coords[1][1], what)?, fq(&coords[1][0], what)?),
        what,
    )
}
