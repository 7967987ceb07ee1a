//! # Signer Recovery
//!
//! Recovers the signing address from an order digest and a 65-byte
//! recoverable signature, mirroring Ethereum's `ecrecover` for messages
//! signed through the `personal_sign` RPC: the verifier re-applies the
//! `"\x19Ethereum Signed Message:\n32"` prefix before recovery, because
//! that is what the authority's wallet hashed when it signed. A prefix
//! mismatch between the two sides is a correctness bug, not a variant.
//!
//! [`recover_signer`] is a pure function — no state, no clock — so it can
//! be unit-tested against signature fixtures in isolation.

use thiserror::Error;

use super::hash::{keccak256, keccak256_multi};
use crate::config::SIGNED_MESSAGE_PREFIX;
use crate::types::{Address, Signature};

/// Structural failures while recovering a signer.
///
/// Each variant means the signature bytes themselves are malformed; a
/// well-formed signature by the wrong key recovers to a different address
/// instead, which is the caller's comparison to make.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecoverError {
    /// The recovery byte is not 0, 1, 27, or 28.
    #[error("invalid recovery byte: {0}")]
    InvalidRecoveryId(u8),

    /// The `r ‖ s` half does not parse as a valid signature scalar pair.
    #[error("signature scalars out of range")]
    InvalidScalars,

    /// No public key could be recovered from the digest/signature pair.
    #[error("public key recovery failed")]
    RecoveryFailed,
}

/// The digest the authority actually signs: the order digest wrapped in
/// the Ethereum signed-message prefix and hashed again.
pub fn signable_digest(order_digest: &[u8; 32]) -> [u8; 32] {
    keccak256_multi(&[SIGNED_MESSAGE_PREFIX, order_digest])
}

/// Derives the 20-byte address of an uncompressed secp256k1 public key:
/// the low 20 bytes of the Keccak-256 hash of the 64-byte curve point.
pub(crate) fn address_of(public_key: &libsecp256k1::PublicKey) -> Address {
    // serialize() yields 65 bytes with a 0x04 marker; the address hashes
    // only the point coordinates.
    let digest = keccak256(&public_key.serialize()[1..]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[12..]);
    Address::new(bytes)
}

/// Recovers the address that signed `order_digest`.
///
/// Accepts the recovery byte in both conventions: `27`/`28` as produced
/// by `eth_sign`-style wallets, and raw `0`/`1`.
///
/// # Errors
///
/// Returns a [`RecoverError`] when the signature is structurally invalid.
pub fn recover_signer(
    order_digest: &[u8; 32],
    signature: &Signature,
) -> Result<Address, RecoverError> {
    let recovery_byte = match signature.v() {
        v @ 27..=28 => v - 27,
        v @ 0..=1 => v,
        v => return Err(RecoverError::InvalidRecoveryId(v)),
    };
    let recovery_id = libsecp256k1::RecoveryId::parse(recovery_byte)
        .map_err(|_| RecoverError::InvalidRecoveryId(signature.v()))?;

    let mut rs = [0u8; 64];
    rs.copy_from_slice(signature.rs());
    let parsed = libsecp256k1::Signature::parse_standard(&rs)
        .map_err(|_| RecoverError::InvalidScalars)?;

    let message = libsecp256k1::Message::parse(&signable_digest(order_digest));
    let public_key = libsecp256k1::recover(&message, &parsed, &recovery_id)
        .map_err(|_| RecoverError::RecoveryFailed)?;

    Ok(address_of(&public_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::signer::AuthorityKey;

    #[test]
    fn recovers_the_signing_address() {
        let key = AuthorityKey::random();
        let digest = keccak256(b"an order digest");
        let sig = key.sign_digest(&digest);
        assert_eq!(recover_signer(&digest, &sig).unwrap(), key.address());
    }

    #[test]
    fn different_digest_recovers_different_address() {
        // A valid signature over digest A, verified against digest B,
        // recovers *some* address — just not the signer's. The engine
        // turns that mismatch into an authorization failure.
        let key = AuthorityKey::random();
        let sig = key.sign_digest(&keccak256(b"digest A"));
        let recovered = recover_signer(&keccak256(b"digest B"), &sig).unwrap();
        assert_ne!(recovered, key.address());
    }

    #[test]
    fn accepts_raw_recovery_byte() {
        let key = AuthorityKey::random();
        let digest = keccak256(b"raw v");
        let mut raw = key.sign_digest(&digest).0;
        raw[64] -= 27; // 27/28 -> 0/1
        let recovered = recover_signer(&digest, &Signature::new(raw)).unwrap();
        assert_eq!(recovered, key.address());
    }

    #[test]
    fn rejects_garbage_recovery_byte() {
        let key = AuthorityKey::random();
        let digest = keccak256(b"bad v");
        let mut raw = key.sign_digest(&digest).0;
        raw[64] = 99;
        assert_eq!(
            recover_signer(&digest, &Signature::new(raw)),
            Err(RecoverError::InvalidRecoveryId(99))
        );
    }

    #[test]
    fn rejects_out_of_range_scalars() {
        // All-0xFF r and s are above the curve order.
        let mut raw = [0xFFu8; 65];
        raw[64] = 27;
        assert_eq!(
            recover_signer(&keccak256(b"x"), &Signature::new(raw)),
            Err(RecoverError::InvalidScalars)
        );
    }

    #[test]
    fn prefix_is_part_of_the_signed_bytes() {
        // Signing the raw digest without the prefix must not verify:
        // the recovered address will differ from the signer's.
        let key = AuthorityKey::random();
        let digest = keccak256(b"unprefixed");
        let sig = key.sign_raw_digest(&digest);
        let recovered = recover_signer(&digest, &sig).unwrap();
        assert_ne!(recovered, key.address());
    }
}
