//! Account addresses and token references.

use std::fmt;
use std::str::FromStr;

use ark_ff::PrimeField;
use marketplace_circuits::{field_to_decimal, ConstraintF};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AddressError {
    #[error("address must start with 0x")]
    MissingPrefix,
    #[error("address must be 20 bytes, got {0}")]
    WrongLength(usize),
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// A 20-byte account or contract address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    /// Address whose low eight bytes hold `value`.
    pub fn from_low_u64_be(value: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&value.to_be_bytes());
        Address(bytes)
    }

    /// The address as a circuit signal (a 160-bit integer, always below the modulus).
    pub fn to_field(&self) -> ConstraintF {
        ConstraintF::from_be_bytes_mod_order(&self.0)
    }

    /// The address as a decimal signal value.
    pub fn to_decimal(&self) -> String {
        field_to_decimal(&self.to_field())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or(AddressError::MissingPrefix)?;
        let bytes = hex::decode(digits)?;
        let bytes: [u8; 20] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AddressError::WrongLength(bytes.len()))?;
        Ok(Address(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Identifies one NFT: the token contract and the token id within it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenRef {
    pub contract: Address,
    pub token_id: u64,
}

impl TokenRef {
    pub fn new(contract: Address, token_id: u64) -> Self {
        Self { contract, token_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let text = "0x00000000000000000000000000000000075bcd15";
        let address: Address = text.parse().unwrap();
        assert_eq!(address, Address::from_low_u64_be(123_456_789));
        assert_eq!(address.to_string(), text);
    }

    #[test]
    fn test_decimal_signal() {
        assert_eq!(Address::from_low_u64_be(123_456_789).to_decimal(), "123456789");
        assert_eq!(Address::ZERO.to_decimal(), "0");

        let max = Address([0xff; 20]);
        assert_eq!(
            max.to_decimal(),
            "1461501637330902918203684832716283019655932542975" // 2^160 - 1
        );
    }

    #[test]
    fn test_rejects_bad_addresses() {
        assert_eq!("1234".parse::<Address>(), Err(AddressError::MissingPrefix));
        assert_eq!("0x1234".parse::<Address>(), Err(AddressError::WrongLength(2)));
        assert!(matches!("0xzz".parse::<Address>(), Err(AddressError::Hex(_))));
    }

    #[test]
    fn test_serde_as_string() {
        let address = Address::from_low_u64_be(1);
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, "\"0x0000000000000000000000000000000000000001\"");
        assert_eq!(serde_json::from_str::<Address>(&json).unwrap(), address);
    }
}
