//! Run the purchase circuit setup and write the keys to disk.
//!
//! Usage:
//!   export-keys [OUTPUT_DIR]
//!
//! Writes `purchase.pk`, `purchase.vk` and `verification_key.json` into
//! `OUTPUT_DIR` (default: `keys`).

use std::path::PathBuf;
use std::time::Instant;

use marketplace_prover::setup::{setup_purchase, VERIFICATION_KEY_JSON_FILE};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("keys"));

    tracing::info!("Running purchase circuit setup...");
    let start = Instant::now();
    let keys = match setup_purchase(&mut rand::thread_rng()) {
        Ok(keys) => keys,
        Err(e) => {
            tracing::error!(error = %e, "setup failed");
            std::process::exit(1);
        }
    };
    tracing::info!("Setup completed in {:?}", start.elapsed());

    if let Err(e) = keys.save_to_directory(&out_dir) {
        tracing::error!(error = %e, "failed to write keys");
        std::process::exit(1);
    }

    tracing::info!(
        "Keys written to {:?} (verification key: {})",
        out_dir,
        VERIFICATION_KEY_JSON_FILE
    );
}
