//! Listing state.

use serde::{Deserialize, Serialize};

use crate::address::{Address, TokenRef};

/// A marketplace listing.
///
/// While `Active`, the token sits in the registry's escrow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Registry-assigned id, starting at 1
    pub id: u64,
    /// The NFT for sale
    pub token: TokenRef,
    /// Owner of the token when the listing was created; receives payment
    pub seller: Address,
    /// Sale price in wei, always > 0
    pub price: u128,
    /// Current status of the listing
    pub status: ListingStatus,
}

impl Listing {
    pub fn is_active(&self) -> bool {
        self.status == ListingStatus::Active
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ListingStatus {
    #[default]
    Active,    // For sale, token in escrow
    Sold,      // Terminal
    Cancelled, // Terminal, token returned to seller
}
