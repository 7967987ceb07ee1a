//! # Protocol Constants
//!
//! Every byte-layout and policy constant of the purchase protocol lives
//! here. The domain tags and the signed-message prefix are consensus with
//! the off-chain authority: change any of them and every signature the
//! authority has ever produced stops verifying.

// ---------------------------------------------------------------------------
// Domain Separation Tags
// ---------------------------------------------------------------------------

/// Leading tag of every signed order. Binds the signature to the purchase
/// message format — a signature over this layout cannot be replayed as
/// authorization for an unrelated message shape.
pub const PURCHASE_TAG: &[u8] = b"Purchase";

/// Tag preceding the order timestamp word.
pub const TIMESTAMP_TAG: &[u8] = b"Timestamp";

/// Project tag preceding the purchases commitment.
pub const DOMAIN_TAG: &[u8] = b"Champz";

/// Prefix applied to the order digest before signing, exactly as Ethereum's
/// `personal_sign` / `eth_sign` RPCs do for a 32-byte payload. The off-chain
/// authority signs through that RPC convention, so the verifier must hash
/// through the identical prefix.
pub const SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

// ---------------------------------------------------------------------------
// Fixed Widths
// ---------------------------------------------------------------------------

/// Account identifiers are 20-byte Ethereum-style addresses.
pub const ADDRESS_LENGTH: usize = 20;

/// Every bundle id, amount, and timestamp is encoded as a big-endian,
/// left-zero-padded 32-byte word before hashing.
pub const WORD_LENGTH: usize = 32;

/// Keccak-256 digest length.
pub const DIGEST_LENGTH: usize = 32;

/// Recoverable signatures are `r ‖ s ‖ v`: 64 bytes of signature material
/// plus one recovery byte.
pub const SIGNATURE_LENGTH: usize = 65;

// ---------------------------------------------------------------------------
// Order Freshness Policy
// ---------------------------------------------------------------------------

/// Default maximum age of a signed order, in seconds. Orders older than
/// this are rejected as stale. A window of 0 disables the check.
pub const DEFAULT_MAX_ORDER_AGE_SECS: u64 = 3_600;

/// Default tolerance for order timestamps ahead of the engine's clock,
/// in seconds. Covers clock skew between the authority and the engine.
pub const DEFAULT_MAX_CLOCK_DRIFT_SECS: u64 = 300;

// ---------------------------------------------------------------------------
// Versioning
// ---------------------------------------------------------------------------

/// Protocol version string reported by the node API.
pub const PROTOCOL_VERSION: &str = "0.1.0";
