//! # Authority Signing
//!
//! The off-chain half of the protocol: the authority that pre-approves
//! purchases holds a secp256k1 secret key and signs order digests with it.
//! This module exists so the `sign` tooling and the test suite produce
//! signatures through the exact convention the verifier expects —
//! prefix, then sign, then append `v = recovery id + 27`.

use rand::rngs::OsRng;
use thiserror::Error;

use super::recover::{address_of, signable_digest};
use crate::types::{Address, Signature};

/// Errors from loading an authority key.
#[derive(Debug, Error, PartialEq)]
pub enum AuthorityKeyError {
    /// The key material was not 64 hex characters.
    #[error("secret key must be 32 bytes of hex, got {0} bytes")]
    BadLength(usize),

    /// The string was not valid hexadecimal.
    #[error("invalid hex: {0}")]
    BadHex(#[from] hex::FromHexError),

    /// The scalar is zero or not below the curve order.
    #[error("secret key scalar out of range")]
    OutOfRange,
}

/// A purchase-authority signing key.
///
/// Wraps a secp256k1 secret key and knows how to produce the 65-byte
/// recoverable signatures the engine verifies. The secret never leaves
/// this struct; only the derived [`Address`] is exposed.
pub struct AuthorityKey {
    secret: libsecp256k1::SecretKey,
}

impl AuthorityKey {
    /// Loads a key from 32 raw bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, AuthorityKeyError> {
        let secret =
            libsecp256k1::SecretKey::parse(bytes).map_err(|_| AuthorityKeyError::OutOfRange)?;
        Ok(Self { secret })
    }

    /// Loads a key from a hex string, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, AuthorityKeyError> {
        let raw = hex::decode(s.strip_prefix("0x").unwrap_or(s))?;
        let bytes: [u8; 32] = raw
            .as_slice()
            .try_into()
            .map_err(|_| AuthorityKeyError::BadLength(raw.len()))?;
        Self::from_bytes(&bytes)
    }

    /// Generates a fresh random key from the OS entropy source.
    pub fn random() -> Self {
        Self {
            secret: libsecp256k1::SecretKey::random(&mut OsRng),
        }
    }

    /// The address this key signs as — what the engine's authorized-signer
    /// comparison sees after recovery.
    pub fn address(&self) -> Address {
        address_of(&libsecp256k1::PublicKey::from_secret_key(&self.secret))
    }

    /// Signs an order digest.
    ///
    /// Applies the signed-message prefix first, then signs the prefixed
    /// digest and appends the recovery byte in wallet convention
    /// (`v ∈ {27, 28}`). The result round-trips through
    /// [`recover_signer`](super::recover::recover_signer).
    pub fn sign_digest(&self, order_digest: &[u8; 32]) -> Signature {
        let message = libsecp256k1::Message::parse(&signable_digest(order_digest));
        let (sig, recovery_id) = libsecp256k1::sign(&message, &self.secret);

        let mut raw = [0u8; 65];
        raw[..64].copy_from_slice(&sig.serialize());
        raw[64] = recovery_id.serialize() + 27;
        Signature::new(raw)
    }

    /// Signs a digest without applying the signed-message prefix. Exists
    /// to prove the verifier rejects unprefixed signatures.
    #[cfg(test)]
    pub(crate) fn sign_raw_digest(&self, digest: &[u8; 32]) -> Signature {
        let message = libsecp256k1::Message::parse(digest);
        let (sig, recovery_id) = libsecp256k1::sign(&message, &self.secret);

        let mut raw = [0u8; 65];
        raw[..64].copy_from_slice(&sig.serialize());
        raw[64] = recovery_id.serialize() + 27;
        Signature::new(raw)
    }
}

impl std::fmt::Debug for AuthorityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The secret stays out of logs; the address identifies the key.
        write!(f, "AuthorityKey({})", self.address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::keccak256;
    use crate::crypto::recover::recover_signer;

    #[test]
    fn address_is_stable_for_a_key() {
        let key = AuthorityKey::random();
        assert_eq!(key.address(), key.address());
    }

    #[test]
    fn distinct_keys_have_distinct_addresses() {
        assert_ne!(AuthorityKey::random().address(), AuthorityKey::random().address());
    }

    #[test]
    fn hex_roundtrip_preserves_address() {
        // A fixed, valid scalar — this is the well-known "all ones" test key.
        let hex_key = "0101010101010101010101010101010101010101010101010101010101010101";
        let a = AuthorityKey::from_hex(hex_key).unwrap();
        let b = AuthorityKey::from_hex(&format!("0x{hex_key}")).unwrap();
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn zero_scalar_rejected() {
        assert_eq!(
            AuthorityKey::from_bytes(&[0u8; 32]).unwrap_err(),
            AuthorityKeyError::OutOfRange
        );
    }

    #[test]
    fn short_hex_rejected() {
        assert_eq!(
            AuthorityKey::from_hex("0xabcd").unwrap_err(),
            AuthorityKeyError::BadLength(2)
        );
    }

    #[test]
    fn signature_has_wallet_convention_v() {
        let key = AuthorityKey::random();
        let sig = key.sign_digest(&keccak256(b"digest"));
        assert!(sig.v() == 27 || sig.v() == 28);
    }

    #[test]
    fn sign_then_recover_roundtrip() {
        let key = AuthorityKey::random();
        let digest = keccak256(b"a purchase order");
        let sig = key.sign_digest(&digest);
        assert_eq!(recover_signer(&digest, &sig).unwrap(), key.address());
    }
}
