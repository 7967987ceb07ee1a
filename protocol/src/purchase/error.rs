//! # Purchase Error Taxonomy
//!
//! Every way a purchase request can be rejected. Each variant is terminal
//! for the request it rejects: the engine performs no retries and leaves
//! no partial state behind, so the boundary layer can surface the kind
//! directly and let the submitter correct and resubmit.

use primitive_types::U256;
use thiserror::Error;

use crate::crypto::RecoverError;
use crate::purchase::ledger::LedgerError;
use crate::types::Address;

/// Rejection reasons for purchase processing and administration.
#[derive(Debug, Error)]
pub enum PurchaseError {
    /// The bundle-id and value sequences have different lengths.
    #[error("malformed batch: {ids} bundle ids but {values} values")]
    MalformedBatch {
        /// Number of bundle ids supplied.
        ids: usize,
        /// Number of values supplied.
        values: usize,
    },

    /// The batch carries no items. An empty batch has no economic content
    /// and its degenerate commitment could be pre-signed and replayed.
    #[error("empty batch")]
    EmptyBatch,

    /// The same bundle id appears more than once in one batch. Accepting
    /// it would let a single authorization claim the id twice in one call.
    #[error("duplicate bundle id in batch: {id}")]
    DuplicateItem {
        /// The repeated id.
        id: U256,
    },

    /// The signature bytes are structurally invalid.
    #[error("invalid signature: {0}")]
    InvalidSignature(#[from] RecoverError),

    /// The signature is well formed but was not produced by the
    /// authorized signer.
    #[error("unauthorized signer: recovered {recovered}")]
    UnauthorizedSigner {
        /// The address the signature actually recovers to.
        recovered: Address,
    },

    /// The order timestamp is outside the configured validity window.
    #[error("stale order: signed at {timestamp}, now {now}")]
    StaleOrder {
        /// The order's timestamp (Unix seconds).
        timestamp: u64,
        /// The engine's clock at evaluation (Unix seconds).
        now: u64,
    },

    /// A bundle id in the batch has already been claimed. Nothing in the
    /// batch is claimed when this fires.
    #[error("bundle already claimed: {id}")]
    AlreadyClaimed {
        /// The first offending id.
        id: U256,
    },

    /// The attached payment does not equal the batch total. Over- and
    /// under-payment are rejected alike; there is no partial fill.
    #[error("payment mismatch: expected {expected}, attached {attached}")]
    PaymentMismatch {
        /// Sum of the effective prices.
        expected: U256,
        /// Value attached to the request.
        attached: U256,
    },

    /// `initialize` was called on an engine that already has an
    /// authorized signer.
    #[error("already initialized")]
    AlreadyInitialized,

    /// The engine has no authorized signer yet.
    #[error("not initialized")]
    NotInitialized,

    /// Summing or scaling prices overflowed 256 bits.
    #[error("amount overflow while computing the batch total")]
    AmountOverflow,

    /// The underlying ledger store failed.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
