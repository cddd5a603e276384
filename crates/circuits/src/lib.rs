//! ZK circuit for proof-gated marketplace purchases.
//!
//! This crate provides:
//! - `PurchaseCircuit`: Prove `buyerBalance >= listingPrice` and
//!   `actualPrice == listingPrice` for a public listing
//! - `PurchaseInputs` / `PurchaseAssignment`: The seven named input signals
//! - `PublicSignals`: The ordered public signal vector shared with the verifier

pub mod assignment;
pub mod field;
pub mod purchase;
pub mod range_check;
pub mod signals;


pub use assignment::{InputError, PurchaseAssignment, PurchaseInputs, SignalValue, Violation};
pub use field::{
    decimal_to_field, field_to_be_bytes, field_to_decimal, integer_to_field, FieldError,
};
pub use purchase::PurchaseCircuit;
pub use signals::{PublicSignals, SignalError, NUM_PUBLIC_SIGNALS};

use ark_bn254::Fr;

/// Common type aliases
pub type ConstraintF = Fr;
