//! Marketplace listing registry.
//!
//! Sellers escrow an NFT in a listing; buyers take it by presenting a purchase
//! proof that the [`VerifierGate`](marketplace_prover::VerifierGate) accepts.

pub mod address;
pub mod error;
pub mod events;
pub mod ledger;
pub mod listing;
pub mod registry;

pub use address::{Address, AddressError, TokenRef};
pub use error::MarketError;
pub use events::MarketEvent;
pub use ledger::{AssetError, AssetLedger, FundsError, InMemoryFunds, InMemoryNfts, ValueLedger};
pub use listing::{Listing, ListingStatus};
pub use registry::Registry;
