//! # Purchase Protocol
//!
//! The three layers of the signed-purchase scheme, each built on the one
//! below:
//!
//! ```text
//! commitment.rs — PurchaseBatch: validation + the purchases commitment
//! message.rs    — the tagged order digest the authority signs
//! engine.rs     — PurchaseEngine: recover, authorize, check, commit
//! ```
//!
//! plus the state they share:
//!
//! ```text
//! ledger.rs     — ClaimLedger: sled-backed claims, identities, audit log
//! event.rs      — BundlesPurchased audit record
//! error.rs      — PurchaseError taxonomy
//! ```
//!
//! Only the ledger holds state between requests; commitment and message
//! building are pure functions of their inputs.

pub mod commitment;
pub mod engine;
pub mod error;
pub mod event;
pub mod ledger;
pub mod message;

pub use commitment::PurchaseBatch;
pub use engine::{EngineOptions, PricingMode, PurchaseEngine, PurchaseOrder};
pub use error::PurchaseError;
pub use event::BundlesPurchased;
pub use ledger::{ClaimLedger, LedgerError};
pub use message::order_digest;
