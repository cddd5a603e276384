//! PurchaseCircuit: Proves a buyer is eligible to purchase a listed NFT.

use ark_ff::PrimeField;
use ark_r1cs_std::{alloc::AllocVar, fields::fp::FpVar, prelude::*};
use ark_relations::ns;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use crate::range_check::{enforce_amount_range, enforce_geq};

/// Circuit that proves: "buyer_balance >= listing_price AND actual_price == listing_price"
///
/// Public inputs (in this order, see [`crate::signals`]):
/// - nft_token_id: The token being purchased
/// - listing_price: The price the seller listed
/// - current_owner: The seller, as a field element
/// - buyer_address: The buyer, as a field element
/// - timestamp: Unix seconds at proof generation
///
/// Private witnesses:
/// - buyer_balance: The balance the buyer claims
/// - actual_price: The price the buyer is paying
///
/// The circuit proves the claimed values are consistent with the public
/// listing; it does not bind `buyer_balance` to any authoritative source.
#[derive(Clone, Debug)]
pub struct PurchaseCircuit<F: PrimeField> {
    /// Private: Balance claimed by the buyer
    pub buyer_balance: Option<F>,
    /// Private: Price the buyer is paying
    pub actual_price: Option<F>,

    /// Public: Token id of the listed NFT
    pub nft_token_id: Option<F>,
    /// Public: Listed price
    pub listing_price: Option<F>,
    /// Public: Seller address
    pub current_owner: Option<F>,
    /// Public: Buyer address
    pub buyer_address: Option<F>,
    /// Public: Proof timestamp
    pub timestamp: Option<F>,
}

impl<F: PrimeField> PurchaseCircuit<F> {
    /// Create a new circuit instance for proving.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        buyer_balance: F,
        actual_price: F,
        nft_token_id: F,
        listing_price: F,
        current_owner: F,
        buyer_address: F,
        timestamp: F,
    ) -> Self {
        Self {
            buyer_balance: Some(buyer_balance),
            actual_price: Some(actual_price),
            nft_token_id: Some(nft_token_id),
            listing_price: Some(listing_price),
            current_owner: Some(current_owner),
            buyer_address: Some(buyer_address),
            timestamp: Some(timestamp),
        }
    }

    /// Create an empty circuit for setup.
    pub fn empty() -> Self {
        Self {
            buyer_balance: None,
            actual_price: None,
            nft_token_id: None,
            listing_price: None,
            current_owner: None,
            buyer_address: None,
            timestamp: None,
        }
    }
}

fn assigned<F: PrimeField>(value: Option<F>) -> impl FnOnce() -> Result<F, SynthesisError> {
    move || value.ok_or(SynthesisError::AssignmentMissing)
}

impl<F: PrimeField> ConstraintSynthesizer<F> for PurchaseCircuit<F> {
    fn generate_constraints(self, cs: ConstraintSystemRef<F>) -> Result<(), SynthesisError> {
        // 1. Allocate private witnesses
        let balance_var =
            FpVar::new_witness(ns!(cs, "buyer_balance"), assigned(self.buyer_balance))?;
        let actual_price_var =
            FpVar::new_witness(ns!(cs, "actual_price"), assigned(self.actual_price))?;

        // 2. Allocate public inputs, in public signal order
        let _nft_token_id_var =
            FpVar::new_input(ns!(cs, "nft_token_id"), assigned(self.nft_token_id))?;
        let listing_price_var =
            FpVar::new_input(ns!(cs, "listing_price"), assigned(self.listing_price))?;
        let _current_owner_var =
            FpVar::new_input(ns!(cs, "current_owner"), assigned(self.current_owner))?;
        let _buyer_address_var =
            FpVar::new_input(ns!(cs, "buyer_address"), assigned(self.buyer_address))?;
        let _timestamp_var = FpVar::new_input(ns!(cs, "timestamp"), assigned(self.timestamp))?;

        // 3. Both amounts must be genuine 128-bit values before comparing them
        enforce_amount_range(cs.clone(), &balance_var)?;
        enforce_amount_range(cs.clone(), &listing_price_var)?;

        // 4. buyer_balance >= listing_price
        enforce_geq(cs.clone(), &balance_var, &listing_price_var)?;

        // 5. actual_price == listing_price
        actual_price_var.enforce_equal(&listing_price_var)?;

        Ok(())
    }
}
