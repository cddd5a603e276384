//! Listing registry: the state machine that gates asset transfer on a proof.
//!
//! ```text
//! Active ──purchase_with_proof──▶ Sold        (terminal)
//!   │
//!   └────cancel_listing─────────▶ Cancelled   (terminal)
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use marketplace_circuits::{ConstraintF, PublicSignals};
use marketplace_prover::{Calldata, VerifierGate};

use crate::address::{Address, TokenRef};
use crate::error::MarketError;
use crate::events::MarketEvent;
use crate::ledger::{AssetLedger, ValueLedger};
use crate::listing::{Listing, ListingStatus};

/// Everything an operation may touch, captured so a failure can be undone.
struct Snapshot<A, V> {
    listings: BTreeMap<u64, Listing>,
    next_listing_id: u64,
    events_len: usize,
    assets: A,
    funds: V,
}

/// Marketplace listing registry.
///
/// Calls are applied one at a time (`&mut self`), and each one either fully
/// succeeds or leaves the registry and both ledgers exactly as they were.
pub struct Registry<A, V> {
    /// The registry's own address; the escrow holder for active listings
    address: Address,
    verifier: Arc<VerifierGate>,
    listings: BTreeMap<u64, Listing>,
    next_listing_id: u64,
    events: Vec<MarketEvent>,
    assets: A,
    funds: V,
}

impl<A: AssetLedger, V: ValueLedger> Registry<A, V> {
    pub fn new(address: Address, verifier: Arc<VerifierGate>, assets: A, funds: V) -> Self {
        Self {
            address,
            verifier,
            listings: BTreeMap::new(),
            next_listing_id: 1,
            events: Vec::new(),
            assets,
            funds,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn listing(&self, listing_id: u64) -> Option<&Listing> {
        self.listings.get(&listing_id)
    }

    pub fn events(&self) -> &[MarketEvent] {
        &self.events
    }

    pub fn assets(&self) -> &A {
        &self.assets
    }

    pub fn funds(&self) -> &V {
        &self.funds
    }

    /// Direct access to the asset ledger, for calls made outside the registry
    /// (minting, approvals).
    pub fn assets_mut(&mut self) -> &mut A {
        &mut self.assets
    }

    /// Direct access to the value ledger, for calls made outside the registry.
    pub fn funds_mut(&mut self) -> &mut V {
        &mut self.funds
    }

    /// List `token` for `price`, moving it into escrow.
    ///
    /// The caller must own the token and have approved the registry.
    pub fn create_listing(
        &mut self,
        caller: Address,
        token: TokenRef,
        price: u128,
    ) -> Result<u64, MarketError> {
        self.atomically("create_listing", |reg| {
            if price == 0 {
                return Err(MarketError::InvalidPrice);
            }
            if reg.assets.owner_of(&token) != Some(caller) {
                return Err(MarketError::NotTokenOwner);
            }
            if !reg.assets.is_approved(&token, &reg.address) {
                return Err(MarketError::NotApproved);
            }

            let escrow = reg.address;
            reg.assets.transfer_from(&escrow, &caller, &escrow, &token)?;

            let listing_id = reg.next_listing_id;
            reg.next_listing_id += 1;
            reg.listings.insert(
                listing_id,
                Listing {
                    id: listing_id,
                    token,
                    seller: caller,
                    price,
                    status: ListingStatus::Active,
                },
            );
            reg.events.push(MarketEvent::Listed {
                listing_id,
                token_contract: token.contract,
                token_id: token.token_id,
                price,
            });

            tracing::info!(listing_id, seller = %caller, price, "listing created");
            Ok(listing_id)
        })
    }

    /// Buy an active listing with a purchase proof.
    ///
    /// `payment` is the value attached by `caller` and must equal the listing
    /// price. The proof must pass the verifier gate and its public signals must
    /// name this listing's token, price and seller, and `caller` as buyer.
    pub fn purchase_with_proof(
        &mut self,
        caller: Address,
        listing_id: u64,
        calldata: &Calldata,
        payment: u128,
    ) -> Result<(), MarketError> {
        self.atomically("purchase_with_proof", |reg| {
            let listing = reg
                .listings
                .get_mut(&listing_id)
                .ok_or(MarketError::ListingNotFound(listing_id))?;
            if !listing.is_active() {
                return Err(MarketError::ListingNotActive(listing_id));
            }
            if payment != listing.price {
                return Err(MarketError::IncorrectPayment {
                    expected: listing.price,
                    actual: payment,
                });
            }
            if !signals_bind(listing, &caller, calldata) {
                tracing::debug!(listing_id, "public signals do not match the listing");
                return Err(MarketError::InvalidProof);
            }
            if !reg.verifier.verify(calldata) {
                return Err(MarketError::InvalidProof);
            }

            listing.status = ListingStatus::Sold;
            let (seller, token, price) = (listing.seller, listing.token, listing.price);

            let escrow = reg.address;
            reg.funds.transfer_value(&caller, &seller, price)?;
            reg.assets.transfer_from(&escrow, &escrow, &caller, &token)?;

            reg.events.push(MarketEvent::Sale {
                listing_id,
                buyer: caller,
                price,
            });

            tracing::info!(listing_id, buyer = %caller, price, "listing sold");
            Ok(())
        })
    }

    /// Withdraw an active listing and return the token to its seller.
    pub fn cancel_listing(&mut self, caller: Address, listing_id: u64) -> Result<(), MarketError> {
        self.atomically("cancel_listing", |reg| {
            let listing = reg
                .listings
                .get_mut(&listing_id)
                .ok_or(MarketError::ListingNotFound(listing_id))?;
            if listing.seller != caller {
                return Err(MarketError::NotSeller);
            }
            if !listing.is_active() {
                return Err(MarketError::ListingNotActive(listing_id));
            }

            listing.status = ListingStatus::Cancelled;
            let token = listing.token;

            let escrow = reg.address;
            reg.assets.transfer_from(&escrow, &escrow, &caller, &token)?;

            reg.events.push(MarketEvent::ListingCancelled { listing_id });

            tracing::info!(listing_id, "listing cancelled");
            Ok(())
        })
    }

    /// Run `op` as one transaction: on error, every change it made is undone.
    fn atomically<T>(
        &mut self,
        name: &'static str,
        op: impl FnOnce(&mut Self) -> Result<T, MarketError>,
    ) -> Result<T, MarketError> {
        let snapshot = Snapshot {
            listings: self.listings.clone(),
            next_listing_id: self.next_listing_id,
            events_len: self.events.len(),
            assets: self.assets.clone(),
            funds: self.funds.clone(),
        };

        op(self).map_err(|e| {
            self.listings = snapshot.listings;
            self.next_listing_id = snapshot.next_listing_id;
            self.events.truncate(snapshot.events_len);
            self.assets = snapshot.assets;
            self.funds = snapshot.funds;
            tracing::warn!(operation = name, error = %e, "reverted");
            e
        })
    }
}

/// Whether the proof's public signals describe this exact purchase.
fn signals_bind(listing: &Listing, buyer: &Address, calldata: &Calldata) -> bool {
    let signals: PublicSignals = match calldata.public_signals() {
        Ok(signals) => signals,
        Err(_) => return false,
    };
    signals.nft_token_id() == ConstraintF::from(listing.token.token_id)
        && signals.listing_price() == ConstraintF::from(listing.price)
        && signals.current_owner() == listing.seller.to_field()
        && signals.buyer_address() == buyer.to_field()
}
