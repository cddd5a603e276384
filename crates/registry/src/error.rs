//! Revert reasons for registry operations.

use thiserror::Error;

use crate::ledger::{AssetError, FundsError};

/// Every failed operation reverts with one of these and changes no state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    #[error("Price must be greater than 0")]
    InvalidPrice,

    #[error("Not the token owner")]
    NotTokenOwner,

    #[error("Marketplace is not approved to transfer the token")]
    NotApproved,

    #[error("Not the seller")]
    NotSeller,

    #[error("Listing {0} does not exist")]
    ListingNotFound(u64),

    #[error("Listing is not active")]
    ListingNotActive(u64),

    #[error("Incorrect payment amount")]
    IncorrectPayment { expected: u128, actual: u128 },

    #[error("Invalid zero-knowledge proof")]
    InvalidProof,

    #[error("Asset transfer failed: {0}")]
    Asset(#[from] AssetError),

    #[error("Payment failed: {0}")]
    Payment(#[from] FundsError),
}
