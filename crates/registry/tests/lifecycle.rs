//! End-to-end listing lifecycle with real purchase proofs.

use std::sync::{Arc, OnceLock};

use ark_std::rand::{rngs::StdRng, SeedableRng};
use marketplace_circuits::PurchaseInputs;
use marketplace_prover::{generate_proof, setup_purchase, Calldata, CircuitKeys, Groth16Backend, VerifierGate};
use marketplace_registry::{
    Address, AssetLedger, InMemoryFunds, InMemoryNfts, ListingStatus, MarketError, MarketEvent,
    Registry, TokenRef, ValueLedger,
};

const ONE_ETH: u128 = 1_000_000_000_000_000_000;

fn keys() -> &'static CircuitKeys {
    static KEYS: OnceLock<CircuitKeys> = OnceLock::new();
    KEYS.get_or_init(|| setup_purchase(&mut StdRng::seed_from_u64(2024)).unwrap())
}

fn market() -> Address {
    Address::from_low_u64_be(0x4d41524b)
}

fn seller() -> Address {
    Address::from_low_u64_be(123_456_789)
}

fn buyer() -> Address {
    Address::from_low_u64_be(987_654_321)
}

fn nft_contract() -> Address {
    Address::from_low_u64_be(0x4e4654)
}

fn token(id: u64) -> TokenRef {
    TokenRef::new(nft_contract(), id)
}

/// Registry with tokens 1 and 2 minted to the seller and approved for the
/// registry, and 5 ETH credited to the buyer.
fn registry() -> Registry<InMemoryNfts, InMemoryFunds> {
    let mut nfts = InMemoryNfts::new();
    for id in [1, 2] {
        nfts.mint(token(id), seller());
        nfts.approve(&seller(), &market(), &token(id)).unwrap();
    }
    let mut funds = InMemoryFunds::new();
    funds.credit(buyer(), 5 * ONE_ETH).unwrap();

    Registry::new(
        market(),
        Arc::new(VerifierGate::new(&keys().verifying_key)),
        nfts,
        funds,
    )
}

fn purchase_inputs(token_id: u64, price: u128, buyer: Address) -> PurchaseInputs {
    PurchaseInputs {
        nft_token_id: token_id.into(),
        listing_price: price.into(),
        current_owner: seller().to_decimal().into(),
        buyer_balance: (2 * ONE_ETH).into(),
        buyer_address: buyer.to_decimal().into(),
        actual_price: price.into(),
        timestamp: 1_700_000_000u64.into(),
    }
}

fn prove(token_id: u64, price: u128, buyer: Address) -> Calldata {
    let backend = Groth16Backend::new(Arc::new(keys().proving_key.clone()));
    generate_proof(&backend, &purchase_inputs(token_id, price, buyer))
        .unwrap()
        .calldata
}

#[test]
fn test_create_listing() {
    let mut reg = registry();

    let id = reg.create_listing(seller(), token(1), ONE_ETH).unwrap();

    assert_eq!(id, 1);
    let listing = reg.listing(id).unwrap();
    assert_eq!(listing.seller, seller());
    assert_eq!(listing.price, ONE_ETH);
    assert_eq!(listing.status, ListingStatus::Active);
    assert_eq!(reg.assets().owner_of(&token(1)), Some(market()));
    assert_eq!(
        reg.events(),
        &[MarketEvent::Listed {
            listing_id: 1,
            token_contract: nft_contract(),
            token_id: 1,
            price: ONE_ETH,
        }]
    );

    assert_eq!(reg.create_listing(seller(), token(2), ONE_ETH), Ok(2));
}

#[test]
fn test_zero_price_rejected() {
    let mut reg = registry();

    assert_eq!(
        reg.create_listing(seller(), token(1), 0),
        Err(MarketError::InvalidPrice)
    );
    assert!(reg.listing(1).is_none());
    assert!(reg.events().is_empty());
    assert_eq!(reg.assets().owner_of(&token(1)), Some(seller()));

    // the failed call did not consume an id
    assert_eq!(reg.create_listing(seller(), token(1), ONE_ETH), Ok(1));
}

#[test]
fn test_listing_requires_ownership_and_approval() {
    let mut reg = registry();
    assert_eq!(
        reg.create_listing(buyer(), token(1), ONE_ETH),
        Err(MarketError::NotTokenOwner)
    );

    reg.assets_mut().mint(token(3), seller());
    assert_eq!(
        reg.create_listing(seller(), token(3), ONE_ETH),
        Err(MarketError::NotApproved)
    );
}

#[test]
fn test_purchase_with_valid_proof() {
    let mut reg = registry();
    let id = reg.create_listing(seller(), token(1), ONE_ETH).unwrap();
    let calldata = prove(1, ONE_ETH, buyer());

    reg.purchase_with_proof(buyer(), id, &calldata, ONE_ETH).unwrap();

    assert_eq!(reg.listing(id).unwrap().status, ListingStatus::Sold);
    assert_eq!(reg.assets().owner_of(&token(1)), Some(buyer()));
    assert_eq!(reg.funds().balance_of(&seller()), ONE_ETH);
    assert_eq!(reg.funds().balance_of(&buyer()), 4 * ONE_ETH);
    assert_eq!(
        reg.events().last(),
        Some(&MarketEvent::Sale {
            listing_id: id,
            buyer: buyer(),
            price: ONE_ETH,
        })
    );

    // second purchase on the same id
    assert_eq!(
        reg.purchase_with_proof(buyer(), id, &calldata, ONE_ETH),
        Err(MarketError::ListingNotActive(id))
    );
}

#[test]
fn test_invalid_proof_changes_nothing() {
    let mut reg = registry();
    let id = reg.create_listing(seller(), token(1), ONE_ETH).unwrap();

    // well-formed proof over the right signals, made with a different setup
    let foreign_keys = setup_purchase(&mut StdRng::seed_from_u64(77)).unwrap();
    let foreign = Groth16Backend::new(Arc::new(foreign_keys.proving_key));
    let calldata = generate_proof(&foreign, &purchase_inputs(1, ONE_ETH, buyer()))
        .unwrap()
        .calldata;

    assert_eq!(
        reg.purchase_with_proof(buyer(), id, &calldata, ONE_ETH),
        Err(MarketError::InvalidProof)
    );
    assert_eq!(reg.listing(id).unwrap().status, ListingStatus::Active);
    assert_eq!(reg.assets().owner_of(&token(1)), Some(market()));
    assert_eq!(reg.funds().balance_of(&buyer()), 5 * ONE_ETH);
    assert_eq!(reg.events().len(), 1);
}

#[test]
fn test_malformed_proof_rejected() {
    let mut reg = registry();
    let id = reg.create_listing(seller(), token(1), ONE_ETH).unwrap();

    let garbage = Calldata {
        a: ["0x1234".to_string(), "0".to_string()],
        b: [
            ["0".to_string(), "0".to_string()],
            ["0".to_string(), "0".to_string()],
        ],
        c: ["0".to_string(), "0".to_string()],
        inputs: vec!["0".to_string(); 4],
    };

    assert_eq!(
        reg.purchase_with_proof(buyer(), id, &garbage, ONE_ETH),
        Err(MarketError::InvalidProof)
    );
    assert!(reg.listing(id).unwrap().is_active());
}

#[test]
fn test_tampered_signal_rejected() {
    let mut reg = registry();
    let id = reg.create_listing(seller(), token(1), ONE_ETH).unwrap();
    let mut calldata = prove(1, ONE_ETH, buyer());
    calldata.inputs[4] = "1700000001".to_string();

    assert_eq!(
        reg.purchase_with_proof(buyer(), id, &calldata, ONE_ETH),
        Err(MarketError::InvalidProof)
    );
}

#[test]
fn test_proof_is_bound_to_listing_and_buyer() {
    let mut reg = registry();
    let first = reg.create_listing(seller(), token(1), ONE_ETH).unwrap();
    let second = reg.create_listing(seller(), token(2), ONE_ETH).unwrap();
    let calldata = prove(1, ONE_ETH, buyer());

    // replay against a different listing
    assert_eq!(
        reg.purchase_with_proof(buyer(), second, &calldata, ONE_ETH),
        Err(MarketError::InvalidProof)
    );

    // submitted by someone else
    let thief = Address::from_low_u64_be(666);
    reg.funds_mut().credit(thief, 5 * ONE_ETH).unwrap();
    assert_eq!(
        reg.purchase_with_proof(thief, first, &calldata, ONE_ETH),
        Err(MarketError::InvalidProof)
    );

    assert!(reg.listing(first).unwrap().is_active());
    assert!(reg.listing(second).unwrap().is_active());
}

#[test]
fn test_payment_must_match_price() {
    let mut reg = registry();
    let id = reg.create_listing(seller(), token(1), ONE_ETH).unwrap();
    let calldata = prove(1, ONE_ETH, buyer());

    assert_eq!(
        reg.purchase_with_proof(buyer(), id, &calldata, ONE_ETH / 2),
        Err(MarketError::IncorrectPayment {
            expected: ONE_ETH,
            actual: ONE_ETH / 2,
        })
    );
    assert!(reg.listing(id).unwrap().is_active());
}

#[test]
fn test_failed_settlement_rolls_back_sale() {
    let mut reg = registry();
    let id = reg.create_listing(seller(), token(1), ONE_ETH).unwrap();

    // the proof only attests a claimed balance; the buyer here holds nothing
    let broke = Address::from_low_u64_be(42);
    let calldata = prove(1, ONE_ETH, broke);

    let err = reg
        .purchase_with_proof(broke, id, &calldata, ONE_ETH)
        .unwrap_err();
    assert!(matches!(err, MarketError::Payment(_)));

    assert_eq!(reg.listing(id).unwrap().status, ListingStatus::Active);
    assert_eq!(reg.assets().owner_of(&token(1)), Some(market()));
    assert_eq!(reg.funds().balance_of(&seller()), 0);
    assert_eq!(reg.events().len(), 1);

    // the honest buyer can still take it
    let calldata = prove(1, ONE_ETH, buyer());
    reg.purchase_with_proof(buyer(), id, &calldata, ONE_ETH).unwrap();
}

#[test]
fn test_failed_asset_transfer_refunds_payment() {
    let mut reg = registry();
    let id = reg.create_listing(seller(), token(1), ONE_ETH).unwrap();

    // escrowed token moved out from under the registry
    let stranger = Address::from_low_u64_be(31337);
    reg.assets_mut().mint(token(1), stranger);

    let calldata = prove(1, ONE_ETH, buyer());
    let err = reg
        .purchase_with_proof(buyer(), id, &calldata, ONE_ETH)
        .unwrap_err();
    assert!(matches!(err, MarketError::Asset(_)));

    // payment moved before the asset transfer failed and must be undone
    assert_eq!(reg.funds().balance_of(&buyer()), 5 * ONE_ETH);
    assert_eq!(reg.funds().balance_of(&seller()), 0);
    assert_eq!(reg.listing(id).unwrap().status, ListingStatus::Active);
    assert_eq!(reg.assets().owner_of(&token(1)), Some(stranger));
    assert_eq!(reg.events().len(), 1);
}

#[test]
fn test_cancel_listing() {
    let mut reg = registry();
    let id = reg.create_listing(seller(), token(1), ONE_ETH).unwrap();

    assert_eq!(reg.cancel_listing(buyer(), id), Err(MarketError::NotSeller));
    assert!(reg.listing(id).unwrap().is_active());

    reg.cancel_listing(seller(), id).unwrap();
    assert_eq!(reg.listing(id).unwrap().status, ListingStatus::Cancelled);
    assert_eq!(reg.assets().owner_of(&token(1)), Some(seller()));
    assert_eq!(
        reg.events().last(),
        Some(&MarketEvent::ListingCancelled { listing_id: id })
    );

    assert_eq!(
        reg.cancel_listing(seller(), id),
        Err(MarketError::ListingNotActive(id))
    );

    let calldata = prove(1, ONE_ETH, buyer());
    assert_eq!(
        reg.purchase_with_proof(buyer(), id, &calldata, ONE_ETH),
        Err(MarketError::ListingNotActive(id))
    );
}

#[test]
fn test_unknown_listing() {
    let mut reg = registry();
    assert_eq!(
        reg.cancel_listing(seller(), 9),
        Err(MarketError::ListingNotFound(9))
    );
}

#[test]
fn test_revert_reasons() {
    assert_eq!(MarketError::InvalidPrice.to_string(), "Price must be greater than 0");
    assert_eq!(MarketError::NotSeller.to_string(), "Not the seller");
    assert_eq!(MarketError::InvalidProof.to_string(), "Invalid zero-knowledge proof");
}
