//! Decimal-string codec for field elements.
//!
//! Every value that crosses the off-chain/on-chain boundary (public signals,
//! curve coordinates) is carried as a base-10 string. Parsing is strict: only
//! ASCII digits, and the value must already be reduced, so a signal can never
//! alias another one modulo `p`. Prover inputs additionally accept `0x` hex,
//! the way EVM addresses are written.

use ark_ff::PrimeField;
use num_bigint::BigUint;
use thiserror::Error;

/// Errors while decoding a field element.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("empty value")]
    Empty,
    #[error("not a decimal integer: {0:?}")]
    NotDecimal(String),
    #[error("not a hex integer: {0:?}")]
    NotHex(String),
    #[error("value {0} is not below the field modulus")]
    OutOfField(String),
}

/// Render a field element as its canonical decimal representation.
pub fn field_to_decimal<F: PrimeField>(value: &F) -> String {
    let big: BigUint = (*value).into();
    big.to_string()
}

/// Parse a canonical decimal string into a field element.
pub fn decimal_to_field<F: PrimeField>(value: &str) -> Result<F, FieldError> {
    reduced(parse_decimal(value)?, value)
}

/// Parse an input integer given either in decimal or as `0x`-prefixed hex.
pub fn integer_to_field<F: PrimeField>(value: &str) -> Result<F, FieldError> {
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(digits) => reduced(parse_hex(digits, value)?, value),
        None => decimal_to_field(value),
    }
}

fn reduced<F: PrimeField>(big: BigUint, value: &str) -> Result<F, FieldError> {
    let modulus: BigUint = F::MODULUS.into();
    if big >= modulus {
        return Err(FieldError::OutOfField(value.to_string()));
    }
    Ok(F::from(big))
}

fn parse_hex(digits: &str, value: &str) -> Result<BigUint, FieldError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(FieldError::NotHex(value.to_string()));
    }
    BigUint::parse_bytes(digits.as_bytes(), 16).ok_or_else(|| FieldError::NotHex(value.to_string()))
}

/// Parse a decimal string into an unbounded integer.
pub fn parse_decimal(value: &str) -> Result<BigUint, FieldError> {
    if value.is_empty() {
        return Err(FieldError::Empty);
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FieldError::NotDecimal(value.to_string()));
    }
    BigUint::parse_bytes(value.as_bytes(), 10).ok_or_else(|| FieldError::NotDecimal(value.to_string()))
}

/// Encode a field element as a 32-byte big-endian word, as the EVM expects.
pub fn field_to_be_bytes<F: PrimeField>(value: &F) -> [u8; 32] {
    let big: BigUint = (*value).into();
    let bytes = big.to_bytes_be();
    let mut word = [0u8; 32];
    word[32 - bytes.len()..].copy_from_slice(&bytes);
    word
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::{Fq, Fr};
    use num_traits::Zero;

    #[test]
    fn test_decimal_roundtrip() {
        let value = Fr::from(1_000_000_000_000_000_000u128);
        let text = field_to_decimal(&value);
        assert_eq!(text, "1000000000000000000");
        assert_eq!(decimal_to_field::<Fr>(&text).unwrap(), value);
    }

    #[test]
    fn test_zero_renders_as_digit() {
        assert_eq!(field_to_decimal(&Fr::from(0u64)), "0");
        assert!(parse_decimal("0").unwrap().is_zero());
    }

    #[test]
    fn test_rejects_non_decimal() {
        assert_eq!(decimal_to_field::<Fr>(""), Err(FieldError::Empty));
        assert!(matches!(decimal_to_field::<Fr>("0x12"), Err(FieldError::NotDecimal(_))));
        assert!(matches!(decimal_to_field::<Fr>("-1"), Err(FieldError::NotDecimal(_))));
        assert!(matches!(decimal_to_field::<Fr>("1 "), Err(FieldError::NotDecimal(_))));
    }

    #[test]
    fn test_input_integers_accept_hex() {
        let address = "0x00000000000000000000000000000000075bcd15";
        assert_eq!(integer_to_field::<Fr>(address).unwrap(), Fr::from(123_456_789u64));
        assert_eq!(integer_to_field::<Fr>("0XFF").unwrap(), Fr::from(255u64));
        assert_eq!(integer_to_field::<Fr>("42").unwrap(), Fr::from(42u64));

        assert!(matches!(integer_to_field::<Fr>("0x"), Err(FieldError::NotHex(_))));
        assert!(matches!(integer_to_field::<Fr>("0xzz"), Err(FieldError::NotHex(_))));
        assert!(matches!(integer_to_field::<Fr>("-0x1"), Err(FieldError::NotDecimal(_))));

        let modulus: BigUint = Fr::MODULUS.into();
        let unreduced = format!("0x{}", modulus.to_str_radix(16));
        assert!(matches!(integer_to_field::<Fr>(&unreduced), Err(FieldError::OutOfField(_))));
    }

    #[test]
    fn test_rejects_unreduced_values() {
        let modulus: BigUint = Fr::MODULUS.into();
        let err = decimal_to_field::<Fr>(&modulus.to_string()).unwrap_err();
        assert!(matches!(err, FieldError::OutOfField(_)));

        let below = &modulus - 1u32;
        assert!(decimal_to_field::<Fr>(&below.to_string()).is_ok());
    }

    #[test]
    fn test_be_bytes_are_left_padded() {
        let word = field_to_be_bytes(&Fq::from(0x0102u64));
        assert_eq!(&word[..30], &[0u8; 30]);
        assert_eq!(&word[30..], &[0x01, 0x02]);
    }
}
