//! Events emitted by successful registry operations.

use serde::{Deserialize, Serialize};

use crate::address::Address;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum MarketEvent {
    #[serde(rename_all = "camelCase")]
    Listed {
        listing_id: u64,
        token_contract: Address,
        token_id: u64,
        price: u128,
    },
    #[serde(rename_all = "camelCase")]
    Sale {
        listing_id: u64,
        buyer: Address,
        price: u128,
    },
    #[serde(rename_all = "camelCase")]
    ListingCancelled { listing_id: u64 },
}
