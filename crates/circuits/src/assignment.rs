//! Purchase input assignment: the seven named signals fed to the circuit.

use std::fmt;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::field::{field_to_decimal, integer_to_field, FieldError};
use crate::purchase::PurchaseCircuit;
use crate::range_check::AMOUNT_BITS;
use crate::signals::PublicSignals;
use crate::ConstraintF;

/// A signal value as it appears in JSON: a decimal or `0x`-hex string, or a
/// plain integer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalValue {
    Text(String),
    Integer(u64),
}

impl SignalValue {
    fn to_field(&self, name: &'static str) -> Result<ConstraintF, InputError> {
        match self {
            SignalValue::Text(text) => integer_to_field(text.trim())
                .map_err(|reason| InputError::InvalidSignal { name, reason }),
            SignalValue::Integer(value) => Ok(ConstraintF::from(*value)),
        }
    }
}

impl From<&str> for SignalValue {
    fn from(value: &str) -> Self {
        SignalValue::Text(value.to_string())
    }
}

impl From<String> for SignalValue {
    fn from(value: String) -> Self {
        SignalValue::Text(value)
    }
}

impl From<u64> for SignalValue {
    fn from(value: u64) -> Self {
        SignalValue::Integer(value)
    }
}

impl From<u128> for SignalValue {
    fn from(value: u128) -> Self {
        SignalValue::Text(value.to_string())
    }
}

/// Structured proof-generation input, as submitted by the buyer's client.
///
/// All seven fields are required; there are no defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PurchaseInputs {
    pub nft_token_id: SignalValue,
    pub listing_price: SignalValue,
    pub current_owner: SignalValue,
    pub buyer_balance: SignalValue,
    pub buyer_address: SignalValue,
    pub actual_price: SignalValue,
    pub timestamp: SignalValue,
}

/// Errors while turning [`PurchaseInputs`] into field elements.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("invalid value for signal `{name}`: {reason}")]
    InvalidSignal { name: &'static str, reason: FieldError },
}

/// The clause of the purchase relation an assignment breaks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    /// An amount does not fit in [`AMOUNT_BITS`] bits.
    AmountOutOfRange(&'static str),
    /// `buyerBalance < listingPrice`.
    InsufficientBalance,
    /// `actualPrice != listingPrice`.
    PriceMismatch,
    /// The constraint system itself was unsatisfied at the named constraint.
    Unsatisfied(String),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::AmountOutOfRange(name) => {
                write!(f, "{name} exceeds {AMOUNT_BITS} bits")
            }
            Violation::InsufficientBalance => write!(f, "buyerBalance is below listingPrice"),
            Violation::PriceMismatch => write!(f, "actualPrice differs from listingPrice"),
            Violation::Unsatisfied(at) => write!(f, "unsatisfied constraint {at}"),
        }
    }
}

/// A fully parsed assignment of every circuit signal.
///
/// Ephemeral and off-chain only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PurchaseAssignment {
    /// Private: the balance the buyer claims to hold
    pub buyer_balance: ConstraintF,
    /// Private: the price the buyer is paying
    pub actual_price: ConstraintF,

    pub nft_token_id: ConstraintF,
    pub listing_price: ConstraintF,
    pub current_owner: ConstraintF,
    pub buyer_address: ConstraintF,
    pub timestamp: ConstraintF,
}

impl TryFrom<&PurchaseInputs> for PurchaseAssignment {
    type Error = InputError;

    fn try_from(inputs: &PurchaseInputs) -> Result<Self, Self::Error> {
        Ok(Self {
            buyer_balance: inputs.buyer_balance.to_field("buyerBalance")?,
            actual_price: inputs.actual_price.to_field("actualPrice")?,
            nft_token_id: inputs.nft_token_id.to_field("nftTokenId")?,
            listing_price: inputs.listing_price.to_field("listingPrice")?,
            current_owner: inputs.current_owner.to_field("currentOwner")?,
            buyer_address: inputs.buyer_address.to_field("buyerAddress")?,
            timestamp: inputs.timestamp.to_field("timestamp")?,
        })
    }
}

impl PurchaseAssignment {
    /// Evaluate the purchase relation outside the circuit.
    ///
    /// Returns the first violated clause. This mirrors the constraints
    /// of [`PurchaseCircuit`] and exists for diagnostics only; the
    /// constraint system stays the authority.
    pub fn check(&self) -> Result<(), Violation> {
        let balance: BigUint = self.buyer_balance.into();
        let price: BigUint = self.listing_price.into();

        if balance.bits() > AMOUNT_BITS as u64 {
            return Err(Violation::AmountOutOfRange("buyerBalance"));
        }
        if price.bits() > AMOUNT_BITS as u64 {
            return Err(Violation::AmountOutOfRange("listingPrice"));
        }
        if balance < price {
            return Err(Violation::InsufficientBalance);
        }
        if self.actual_price != self.listing_price {
            return Err(Violation::PriceMismatch);
        }
        Ok(())
    }

    /// The public signals this assignment exposes, in protocol order.
    pub fn public_signals(&self) -> PublicSignals {
        PublicSignals::new(
            self.nft_token_id,
            self.listing_price,
            self.current_owner,
            self.buyer_address,
            self.timestamp,
        )
    }

    /// Circuit instance carrying this assignment.
    pub fn circuit(&self) -> PurchaseCircuit<ConstraintF> {
        PurchaseCircuit::new(
            self.buyer_balance,
            self.actual_price,
            self.nft_token_id,
            self.listing_price,
            self.current_owner,
            self.buyer_address,
            self.timestamp,
        )
    }

    /// Render back to the JSON input record.
    pub fn to_inputs(&self) -> PurchaseInputs {
        PurchaseInputs {
            nft_token_id: field_to_decimal(&self.nft_token_id).into(),
            listing_price: field_to_decimal(&self.listing_price).into(),
            current_owner: field_to_decimal(&self.current_owner).into(),
            buyer_balance: field_to_decimal(&self.buyer_balance).into(),
            buyer_address: field_to_decimal(&self.buyer_address).into(),
            actual_price: field_to_decimal(&self.actual_price).into(),
            timestamp: field_to_decimal(&self.timestamp).into(),
        }
    }
}
