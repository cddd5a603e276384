//! The public signal vector and its fixed order.
//!
//! The order below is the order in which [`PurchaseCircuit`](crate::PurchaseCircuit)
//! allocates its public inputs, and therefore the order the verifying key's
//! `IC` points are bound to. Changing it is a breaking protocol change.
//!
//! | index | signal          |
//! |-------|-----------------|
//! | 0     | `nftTokenId`    |
//! | 1     | `listingPrice`  |
//! | 2     | `currentOwner`  |
//! | 3     | `buyerAddress`  |
//! | 4     | `timestamp`     |

use crate::field::{decimal_to_field, field_to_decimal, FieldError};
use crate::ConstraintF;

pub const NFT_TOKEN_ID: usize = 0;
pub const LISTING_PRICE: usize = 1;
pub const CURRENT_OWNER: usize = 2;
pub const BUYER_ADDRESS: usize = 3;
pub const TIMESTAMP: usize = 4;

/// Number of public signals exposed by the purchase circuit.
pub const NUM_PUBLIC_SIGNALS: usize = 5;

/// Signal names in protocol order.
pub const SIGNAL_NAMES: [&str; NUM_PUBLIC_SIGNALS] = [
    "nftTokenId",
    "listingPrice",
    "currentOwner",
    "buyerAddress",
    "timestamp",
];

/// Errors while decoding a public signal vector.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    #[error("expected {expected} public signals, got {actual}")]
    WrongLength { expected: usize, actual: usize },
    #[error("public signal {index} ({name}): {reason}")]
    Invalid {
        index: usize,
        name: &'static str,
        reason: FieldError,
    },
}

/// Ordered public signals of one purchase proof.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicSignals(Vec<ConstraintF>);

impl PublicSignals {
    pub fn new(
        nft_token_id: ConstraintF,
        listing_price: ConstraintF,
        current_owner: ConstraintF,
        buyer_address: ConstraintF,
        timestamp: ConstraintF,
    ) -> Self {
        Self(vec![
            nft_token_id,
            listing_price,
            current_owner,
            buyer_address,
            timestamp,
        ])
    }

    /// Decode decimal strings, enforcing the exact length and canonical values.
    pub fn from_decimal_strings<S: AsRef<str>>(values: &[S]) -> Result<Self, SignalError> {
        if values.len() != NUM_PUBLIC_SIGNALS {
            return Err(SignalError::WrongLength {
                expected: NUM_PUBLIC_SIGNALS,
                actual: values.len(),
            });
        }
        values
            .iter()
            .enumerate()
            .map(|(index, value)| {
                decimal_to_field(value.as_ref()).map_err(|reason| SignalError::Invalid {
                    index,
                    name: SIGNAL_NAMES[index],
                    reason,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn to_decimal_strings(&self) -> Vec<String> {
        self.0.iter().map(field_to_decimal).collect()
    }

    pub fn as_slice(&self) -> &[ConstraintF] {
        &self.0
    }

    pub fn nft_token_id(&self) -> ConstraintF {
        self.0[NFT_TOKEN_ID]
    }

    pub fn listing_price(&self) -> ConstraintF {
        self.0[LISTING_PRICE]
    }

    pub fn current_owner(&self) -> ConstraintF {
        self.0[CURRENT_OWNER]
    }

    pub fn buyer_address(&self) -> ConstraintF {
        self.0[BUYER_ADDRESS]
    }

    pub fn timestamp(&self) -> ConstraintF {
        self.0[TIMESTAMP]
    }
}
