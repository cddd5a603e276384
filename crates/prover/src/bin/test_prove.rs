//! Standalone check that proof generation and verification work with loaded keys

use std::sync::Arc;
use std::time::Instant;

use marketplace_circuits::PurchaseInputs;
use marketplace_prover::{generate_proof, setup::CircuitKeys, Groth16Backend, VerifierGate};

fn main() {
    println!("Loading keys from disk...");
    let start = Instant::now();
    let keys = match CircuitKeys::load_from_directory(std::path::Path::new("keys")) {
        Ok(keys) => keys,
        Err(e) => {
            eprintln!("Failed to load keys: {}", e);
            std::process::exit(1);
        }
    };
    println!("Keys loaded in {:?}", start.elapsed());

    let backend = Groth16Backend::new(Arc::new(keys.proving_key));
    let gate = VerifierGate::new(&keys.verifying_key);

    let inputs = PurchaseInputs {
        nft_token_id: "1".into(),
        listing_price: "1000000000000000000".into(),
        current_owner: "123456789".into(),
        buyer_balance: "2000000000000000000".into(),
        buyer_address: "987654321".into(),
        actual_price: "1000000000000000000".into(),
        timestamp: 1_700_000_000u64.into(),
    };

    println!("\nGenerating purchase proof...");
    let start = Instant::now();
    let generated = match generate_proof(&backend, &inputs) {
        Ok(generated) => generated,
        Err(e) => {
            eprintln!("Proof generation failed: {}", e);
            std::process::exit(1);
        }
    };
    println!("Proof generation completed in {:?}", start.elapsed());
    println!("Public signals: {:?}", generated.public_signals);

    match generated.calldata.to_solidity_calldata() {
        Ok(calldata) => println!("\nCalldata: {}", calldata),
        Err(e) => eprintln!("Calldata rendering failed: {}", e),
    }

    if gate.verify(&generated.calldata) {
        println!("\nProof verified");
    } else {
        eprintln!("\nProof did NOT verify");
        std::process::exit(1);
    }
}
