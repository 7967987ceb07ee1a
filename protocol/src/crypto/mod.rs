//! # Cryptographic Primitives
//!
//! Everything the purchase protocol needs from cryptography, and nothing
//! more: Keccak-256 hashing, Ethereum-convention signer recovery, and the
//! authority-side signing helper. The signing and verifying halves live
//! side by side so their conventions — the signed-message prefix and the
//! recovery-byte encoding — can never drift apart unnoticed.
//!
//! ```text
//! hash.rs     — keccak256 / keccak256_multi
//! recover.rs  — signable_digest, recover_signer (the on-chain half)
//! signer.rs   — AuthorityKey (the off-chain half)
//! ```

pub mod hash;
pub mod recover;
pub mod signer;

pub use hash::{keccak256, keccak256_multi};
pub use recover::{recover_signer, signable_digest, RecoverError};
pub use signer::{AuthorityKey, AuthorityKeyError};
