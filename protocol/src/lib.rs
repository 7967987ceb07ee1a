// Copyright (c) 2026 Champz Labs. MIT License.
// See LICENSE for details.

//! # Champz Purchase Protocol — Core Library
//!
//! The signed-purchase authorization scheme behind the Champz spore-bundle
//! shop: an off-chain authority pre-approves a batch purchase by signing a
//! Keccak-256 commitment over it, and this library verifies that signature,
//! prevents replay and double-claiming, validates payment, and records the
//! claims atomically in a persistent ledger.
//!
//! ## Architecture
//!
//! - **crypto** — Keccak-256, Ethereum-convention signer recovery, and the
//!   authority-side signing helper. Both halves of the convention in one
//!   place so they cannot drift apart.
//! - **purchase** — the protocol proper: batch commitment, tagged order
//!   digest, claim ledger, and the authorization engine.
//! - **types** — the 20-byte address and 65-byte signature wire types.
//! - **config** — every tag, width, and policy constant.
//!
//! ## Trust Model
//!
//! The engine trusts exactly one identity: the authorized signer recorded
//! at initialization. Buyers are not authenticated beyond being bound into
//! the signed digest — a signature over buyer A's order is worthless to
//! buyer B. Replay is stopped twice over: the claim ledger rejects
//! re-claimed bundle ids forever, and the freshness window bounds how long
//! a signed order stays submittable at all.

pub mod config;
pub mod crypto;
pub mod purchase;
pub mod types;

pub use purchase::{
    BundlesPurchased, ClaimLedger, EngineOptions, PricingMode, PurchaseEngine, PurchaseError,
    PurchaseOrder,
};
pub use types::{Address, Signature};
