//! # Authorization & Ledger Engine
//!
//! The purchase state machine. One call per request, strictly ordered:
//! validate the batch, rebuild the digests, recover and compare the
//! signer, check freshness, check claims, check payment, then commit —
//! any failure aborts the whole request with no state change. Cheap,
//! stateless checks run before any ledger read; ledger mutation happens
//! only after every precondition has passed.
//!
//! The engine performs no internal retries. Each rejection is terminal
//! for its request; the submitter corrects and resubmits.

use chrono::Utc;
use parking_lot::Mutex;
use primitive_types::U256;

use crate::config::{DEFAULT_MAX_CLOCK_DRIFT_SECS, DEFAULT_MAX_ORDER_AGE_SECS};
use crate::crypto::recover_signer;
use crate::purchase::commitment::PurchaseBatch;
use crate::purchase::error::PurchaseError;
use crate::purchase::event::BundlesPurchased;
use crate::purchase::ledger::ClaimLedger;
use crate::purchase::message::order_digest;
use crate::types::{Address, Signature};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// How the engine derives per-bundle prices from the signed values.
///
/// The two modes are distinct protocols — the authority signs different
/// numbers in each — and are never mixed within one deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingMode {
    /// The signed values are the prices themselves.
    PriceList,
    /// The signed values are quantities; each effective price is
    /// quantity × this stored unit price.
    UnitPrice(U256),
}

/// Engine policy knobs.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Maximum accepted order age in seconds. 0 disables the check.
    pub max_order_age_secs: u64,
    /// Tolerance for timestamps ahead of the engine clock, in seconds.
    /// Only consulted while the age check is enabled.
    pub max_clock_drift_secs: u64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_order_age_secs: DEFAULT_MAX_ORDER_AGE_SECS,
            max_clock_drift_secs: DEFAULT_MAX_CLOCK_DRIFT_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// One purchase request. Ephemeral — constructed per call, never stored.
#[derive(Debug, Clone)]
pub struct PurchaseOrder {
    /// The caller claiming the bundles. The signature must bind this
    /// exact identity or recovery lands on a different address.
    pub buyer: Address,
    /// When the authority approved the order (Unix seconds).
    pub timestamp: u64,
    /// Bundle ids to claim.
    pub bundle_ids: Vec<U256>,
    /// Signed values: prices or quantities, per the pricing mode.
    pub values: Vec<U256>,
    /// The authority's recoverable signature over the order digest.
    pub signature: Signature,
    /// Payment attached to the request. Must equal the batch total.
    pub payment: U256,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The purchase authorization engine.
///
/// Owns the persistent [`ClaimLedger`] and serializes its check-and-commit
/// section behind a mutex, so two requests racing for overlapping bundle
/// ids resolve cleanly: the first wins, the second observes the claims and
/// fails whole.
pub struct PurchaseEngine {
    ledger: ClaimLedger,
    options: EngineOptions,
    /// Guards claims-check through commit. Accessor reads outside a
    /// purchase don't take it.
    commit_lock: Mutex<()>,
}

impl PurchaseEngine {
    /// Builds an engine over an opened ledger.
    pub fn new(ledger: ClaimLedger, options: EngineOptions) -> Self {
        Self {
            ledger,
            options,
            commit_lock: Mutex::new(()),
        }
    }

    /// The underlying store, for read-only status reporting.
    pub fn ledger(&self) -> &ClaimLedger {
        &self.ledger
    }

    // -- administration -----------------------------------------------------

    /// One-time setup: records the authorized signer, the payment
    /// receiver, and (for unit-price deployments) the unit price.
    ///
    /// # Errors
    ///
    /// Returns [`PurchaseError::AlreadyInitialized`] if an authorized
    /// signer is already recorded.
    pub fn initialize(
        &self,
        owner: Address,
        payment_receiver: Address,
        unit_price: Option<U256>,
    ) -> Result<(), PurchaseError> {
        if self.ledger.owner()?.is_some() {
            return Err(PurchaseError::AlreadyInitialized);
        }
        self.ledger.set_owner(&owner)?;
        self.ledger.set_payment_receiver(&payment_receiver)?;
        if let Some(price) = unit_price {
            self.ledger.set_unit_price(&price)?;
        }
        self.ledger.flush()?;
        tracing::info!(%owner, receiver = %payment_receiver, "engine initialized");
        Ok(())
    }

    /// Hands the authorized-signer role to a new identity. Only the
    /// current holder may call this.
    pub fn transfer_authority(
        &self,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), PurchaseError> {
        let owner = self.ledger.owner()?.ok_or(PurchaseError::NotInitialized)?;
        if caller != owner {
            return Err(PurchaseError::UnauthorizedSigner { recovered: caller });
        }
        self.ledger.set_owner(&new_owner)?;
        self.ledger.flush()?;
        tracing::info!(from = %owner, to = %new_owner, "authority transferred");
        Ok(())
    }

    // -- accessors ----------------------------------------------------------

    /// The authorized-signer identity, if initialized.
    pub fn owner(&self) -> Result<Option<Address>, PurchaseError> {
        Ok(self.ledger.owner()?)
    }

    /// Whether a bundle id has been claimed.
    pub fn claimed_bundle(&self, id: U256) -> Result<bool, PurchaseError> {
        Ok(self.ledger.is_claimed(id)?)
    }

    /// The active pricing mode.
    pub fn pricing_mode(&self) -> Result<PricingMode, PurchaseError> {
        Ok(self
            .ledger
            .unit_price()?
            .map_or(PricingMode::PriceList, PricingMode::UnitPrice))
    }

    /// Cumulative payment collected for the receiver.
    pub fn collected(&self) -> Result<U256, PurchaseError> {
        Ok(self.ledger.collected()?)
    }

    // -- the purchase path --------------------------------------------------

    /// Processes a purchase request against the current wall clock.
    pub fn purchase(&self, order: &PurchaseOrder) -> Result<BundlesPurchased, PurchaseError> {
        self.purchase_at(order, Utc::now().timestamp().max(0) as u64)
    }

    /// Processes a purchase request with an explicit clock. The clock only
    /// feeds the freshness check; exposed for deterministic tests.
    pub fn purchase_at(
        &self,
        order: &PurchaseOrder,
        now: u64,
    ) -> Result<BundlesPurchased, PurchaseError> {
        // 1. Shape and duplicate validation, before anything else.
        let batch = PurchaseBatch::new(order.bundle_ids.clone(), order.values.clone())?;

        // 2–3. Rebuild what the authority signed and recover the signer.
        let digest = order_digest(&order.buyer, order.timestamp, &batch.commitment());
        let recovered = recover_signer(&digest, &order.signature)?;

        // 4. The recovered identity must be the authorized signer.
        let owner = self.ledger.owner()?.ok_or(PurchaseError::NotInitialized)?;
        if recovered != owner {
            tracing::warn!(buyer = %order.buyer, %recovered, "rejected: unauthorized signer");
            return Err(PurchaseError::UnauthorizedSigner { recovered });
        }

        // 5. Freshness window.
        self.check_freshness(order.timestamp, now)?;

        // Effective prices are a pure function of batch and mode; compute
        // them before taking the lock.
        let (prices, unit_price, total) = self.price_batch(&batch)?;

        // 6–8 run under the commit lock: between the claims check and the
        // claims flip, no other request may touch the ledger.
        let _guard = self.commit_lock.lock();

        // 6. Every id must be unclaimed.
        for id in batch.bundle_ids() {
            if self.ledger.is_claimed(*id)? {
                return Err(PurchaseError::AlreadyClaimed { id: *id });
            }
        }

        // 7. Exact payment, no partial fills, no refunds.
        if order.payment != total {
            return Err(PurchaseError::PaymentMismatch {
                expected: total,
                attached: order.payment,
            });
        }

        // 8. Commit. The claims flip is a single atomic batch; the
        // payment credit and audit record follow it.
        self.ledger.claim_all(batch.bundle_ids())?;
        self.ledger.add_collected(total)?;

        let event = BundlesPurchased {
            buyer: order.buyer,
            bundle_ids: batch.bundle_ids().to_vec(),
            prices,
            unit_price,
            total,
            timestamp: order.timestamp,
        };
        self.ledger.append_event(&event)?;
        self.ledger.flush()?;

        tracing::info!(
            buyer = %order.buyer,
            bundles = batch.len(),
            %total,
            "purchase committed"
        );
        Ok(event)
    }

    /// Rejects orders outside the validity window: older than the
    /// configured age, or further in the future than the drift allowance.
    fn check_freshness(&self, timestamp: u64, now: u64) -> Result<(), PurchaseError> {
        if self.options.max_order_age_secs == 0 {
            return Ok(());
        }
        let expired = now.saturating_sub(timestamp) > self.options.max_order_age_secs;
        let from_future = timestamp.saturating_sub(now) > self.options.max_clock_drift_secs;
        if expired || from_future {
            return Err(PurchaseError::StaleOrder { timestamp, now });
        }
        Ok(())
    }

    /// Effective per-bundle prices and their checked total.
    fn price_batch(
        &self,
        batch: &PurchaseBatch,
    ) -> Result<(Vec<U256>, Option<U256>, U256), PurchaseError> {
        let (prices, unit_price) = match self.pricing_mode()? {
            PricingMode::PriceList => (batch.values().to_vec(), None),
            PricingMode::UnitPrice(unit) => {
                let scaled = batch
                    .values()
                    .iter()
                    .map(|quantity| {
                        quantity
                            .checked_mul(unit)
                            .ok_or(PurchaseError::AmountOverflow)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                (scaled, Some(unit))
            }
        };

        let mut total = U256::zero();
        for price in &prices {
            total = total
                .checked_add(*price)
                .ok_or(PurchaseError::AmountOverflow)?;
        }
        Ok((prices, unit_price, total))
    }
}
