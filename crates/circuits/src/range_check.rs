//! Range check gadgets for preventing field arithmetic wrap-around.
//!
//! In ZK circuits, all arithmetic happens in a finite field. Without range checks,
//! subtracting a larger amount from a smaller one (e.g., a balance of 5 against a
//! price of 10) wraps around to a huge positive number that would happily satisfy
//! a naive "difference is non-negative" check.

use ark_ff::PrimeField;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

/// Number of bits a monetary amount (in wei) may occupy.
pub const AMOUNT_BITS: usize = 128;

/// Enforce that a field element fits in `num_bits` bits.
///
/// The value is decomposed into its canonical little-endian bits and every bit
/// at position `num_bits` or above is forced to zero.
pub fn enforce_range<F: PrimeField>(
    _cs: ConstraintSystemRef<F>,
    value: &FpVar<F>,
    num_bits: usize,
) -> Result<(), SynthesisError> {
    let value_bits = value.to_bits_le()?;

    for bit in value_bits.iter().skip(num_bits) {
        bit.enforce_equal(&Boolean::FALSE)?;
    }

    Ok(())
}

/// Enforce that a value is a valid amount, i.e. fits in [`AMOUNT_BITS`] bits.
pub fn enforce_amount_range<F: PrimeField>(
    cs: ConstraintSystemRef<F>,
    value: &FpVar<F>,
) -> Result<(), SynthesisError> {
    enforce_range(cs, value, AMOUNT_BITS)
}

/// Enforce that a >= b (non-negative difference).
///
/// Both operands must already be range-checked to [`AMOUNT_BITS`]. Then `a - b`
/// fits in [`AMOUNT_BITS`] bits exactly when `a >= b`; otherwise it wraps to
/// `p - (b - a)`, which is far wider than the field's low 128 bits allow.
pub fn enforce_geq<F: PrimeField>(
    cs: ConstraintSystemRef<F>,
    a: &FpVar<F>,
    b: &FpVar<F>,
) -> Result<(), SynthesisError> {
    let diff = a - b;
    enforce_amount_range(cs, &diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fr;
    use ark_relations::r1cs::ConstraintSystem;
    use std::ops::Neg;

    const ONE_ETH: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn test_range_check_valid() {
        let cs = ConstraintSystem::<Fr>::new_ref();

        let value = FpVar::new_witness(cs.clone(), || Ok(Fr::from(ONE_ETH))).unwrap();

        enforce_amount_range(cs.clone(), &value).unwrap();

        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_range_check_max_u128() {
        let cs = ConstraintSystem::<Fr>::new_ref();

        let value = FpVar::new_witness(cs.clone(), || Ok(Fr::from(u128::MAX))).unwrap();

        enforce_amount_range(cs.clone(), &value).unwrap();

        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_range_check_overflow() {
        let cs = ConstraintSystem::<Fr>::new_ref();

        // p - 5, what "0 - 5" looks like inside the field
        let wrapped_value = Fr::from(5u64).neg();
        let value = FpVar::new_witness(cs.clone(), || Ok(wrapped_value)).unwrap();

        enforce_amount_range(cs.clone(), &value).unwrap();

        assert!(!cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_range_check_custom_width() {
        let cs = ConstraintSystem::<Fr>::new_ref();

        let value = FpVar::new_witness(cs.clone(), || Ok(Fr::from(256u64))).unwrap();

        enforce_range(cs.clone(), &value, 8).unwrap();

        assert!(!cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_geq_valid() {
        let cs = ConstraintSystem::<Fr>::new_ref();

        let a = FpVar::new_witness(cs.clone(), || Ok(Fr::from(2 * ONE_ETH))).unwrap();
        let b = FpVar::new_witness(cs.clone(), || Ok(Fr::from(ONE_ETH))).unwrap();

        enforce_geq(cs.clone(), &a, &b).unwrap();

        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_geq_equal() {
        let cs = ConstraintSystem::<Fr>::new_ref();

        let a = FpVar::new_witness(cs.clone(), || Ok(Fr::from(ONE_ETH))).unwrap();
        let b = FpVar::new_witness(cs.clone(), || Ok(Fr::from(ONE_ETH))).unwrap();

        enforce_geq(cs.clone(), &a, &b).unwrap();

        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn test_geq_invalid() {
        let cs = ConstraintSystem::<Fr>::new_ref();

        let a = FpVar::new_witness(cs.clone(), || Ok(Fr::from(ONE_ETH / 2))).unwrap();
        let b = FpVar::new_witness(cs.clone(), || Ok(Fr::from(ONE_ETH))).unwrap();

        enforce_geq(cs.clone(), &a, &b).unwrap();

        // 0.5 ETH - 1 ETH wraps to a huge field element
        assert!(!cs.is_satisfied().unwrap());
    }
}
