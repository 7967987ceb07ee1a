//! # Purchase HTTP API
//!
//! Builds the axum router exposing the engine's operation surface. All
//! handlers share state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                    | Description                        |
//! |--------|-------------------------|------------------------------------|
//! | GET    | `/health`               | Liveness probe                     |
//! | GET    | `/status`               | Version, owner, totals             |
//! | POST   | `/purchase`             | Submit a signed purchase order     |
//! | GET    | `/bundles/:id/claimed`  | Claim-ledger membership            |
//! | GET    | `/owner`                | The authorized-signer identity     |
//!
//! Failures come back as JSON naming the rejection kind, so the submitter
//! can correct and resubmit without parsing prose.

use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use champz_protocol::{Address, PurchaseEngine, PurchaseError, PurchaseOrder, Signature};

use crate::cli::parse_u256;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state for all request handlers. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// The service's reported version string.
    pub version: String,
    /// The purchase engine over the persistent ledger.
    pub engine: Arc<PurchaseEngine>,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all routes, CORS, and tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/purchase", post(purchase_handler))
        .route("/bundles/:id/claimed", get(claimed_handler))
        .route("/owner", get(owner_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request / Response Types
// ---------------------------------------------------------------------------

/// Body of `POST /purchase`: the signed order plus the attached payment
/// and the buyer, which HTTP has no ambient caller channel for.
#[derive(Debug, Serialize, Deserialize)]
pub struct PurchaseRequest {
    /// The buyer the signed order is bound to.
    pub buyer: Address,
    /// Order timestamp (Unix seconds).
    pub timestamp: u64,
    /// The authority's 65-byte signature, hex encoded.
    pub signature: Signature,
    /// Bundle ids to claim.
    pub bundle_ids: Vec<U256>,
    /// Signed prices (or quantities, in unit-price mode).
    pub prices: Vec<U256>,
    /// Attached payment; must equal the batch total exactly.
    pub payment: U256,
}

/// Response payload for `GET /status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Service version.
    pub version: String,
    /// The authorized signer, if initialized.
    pub owner: Option<Address>,
    /// Active pricing mode: "price-list" or "unit-price".
    pub pricing_mode: String,
    /// The stored unit price, in unit-price mode.
    pub unit_price: Option<U256>,
    /// Number of claimed bundles.
    pub claimed_bundles: usize,
    /// Cumulative collected payment.
    pub collected: U256,
}

/// Response payload for `GET /bundles/:id/claimed`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimedResponse {
    /// The queried bundle id.
    pub bundle_id: U256,
    /// Whether it has been claimed.
    pub claimed: bool,
}

/// Response payload for `GET /owner`.
#[derive(Debug, Serialize, Deserialize)]
pub struct OwnerResponse {
    /// The authorized signer, if initialized.
    pub owner: Option<Address>,
}

/// JSON error envelope: a stable machine-readable kind plus the display
/// form of the underlying error.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Rejection kind, e.g. "already_claimed".
    pub error: String,
    /// Human-readable detail.
    pub message: String,
}

// ---------------------------------------------------------------------------
// Error Mapping
// ---------------------------------------------------------------------------

/// Stable wire name for each rejection kind.
fn error_kind(err: &PurchaseError) -> &'static str {
    match err {
        PurchaseError::MalformedBatch { .. } => "malformed_batch",
        PurchaseError::EmptyBatch => "empty_batch",
        PurchaseError::DuplicateItem { .. } => "duplicate_item",
        PurchaseError::InvalidSignature(_) => "invalid_signature",
        PurchaseError::UnauthorizedSigner { .. } => "unauthorized_signer",
        PurchaseError::StaleOrder { .. } => "stale_order",
        PurchaseError::AlreadyClaimed { .. } => "already_claimed",
        PurchaseError::PaymentMismatch { .. } => "payment_mismatch",
        PurchaseError::AlreadyInitialized => "already_initialized",
        PurchaseError::NotInitialized => "not_initialized",
        PurchaseError::AmountOverflow => "amount_overflow",
        PurchaseError::Ledger(_) => "ledger_error",
    }
}

fn error_status(err: &PurchaseError) -> StatusCode {
    match err {
        PurchaseError::MalformedBatch { .. }
        | PurchaseError::EmptyBatch
        | PurchaseError::DuplicateItem { .. }
        | PurchaseError::StaleOrder { .. }
        | PurchaseError::PaymentMismatch { .. }
        | PurchaseError::AmountOverflow => StatusCode::BAD_REQUEST,
        PurchaseError::InvalidSignature(_) | PurchaseError::UnauthorizedSigner { .. } => {
            StatusCode::UNAUTHORIZED
        }
        PurchaseError::AlreadyClaimed { .. } | PurchaseError::AlreadyInitialized => {
            StatusCode::CONFLICT
        }
        PurchaseError::NotInitialized => StatusCode::SERVICE_UNAVAILABLE,
        PurchaseError::Ledger(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: PurchaseError) -> Response {
    let body = ErrorResponse {
        error: error_kind(&err).to_string(),
        message: err.to_string(),
    };
    (error_status(&err), Json(body)).into_response()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health_handler() -> &'static str {
    "ok"
}

async fn status_handler(State(state): State<AppState>) -> Response {
    let engine = &state.engine;
    let status = (|| -> Result<StatusResponse, PurchaseError> {
        let unit_price = engine.ledger().unit_price()?;
        Ok(StatusResponse {
            version: state.version.clone(),
            owner: engine.owner()?,
            pricing_mode: if unit_price.is_some() {
                "unit-price".to_string()
            } else {
                "price-list".to_string()
            },
            unit_price,
            claimed_bundles: engine.ledger().claimed_count(),
            collected: engine.collected()?,
        })
    })();

    match status {
        Ok(body) => Json(body).into_response(),
        Err(err) => error_response(err),
    }
}

async fn purchase_handler(
    State(state): State<AppState>,
    Json(request): Json<PurchaseRequest>,
) -> Response {
    let order = PurchaseOrder {
        buyer: request.buyer,
        timestamp: request.timestamp,
        bundle_ids: request.bundle_ids,
        values: request.prices,
        signature: request.signature,
        payment: request.payment,
    };

    match state.engine.purchase(&order) {
        Ok(event) => (StatusCode::OK, Json(event)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn claimed_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let bundle_id = match parse_u256(&id) {
        Ok(id) => id,
        Err(message) => {
            let body = ErrorResponse {
                error: "bad_bundle_id".to_string(),
                message,
            };
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    match state.engine.claimed_bundle(bundle_id) {
        Ok(claimed) => Json(ClaimedResponse { bundle_id, claimed }).into_response(),
        Err(err) => error_response(err),
    }
}

async fn owner_handler(State(state): State<AppState>) -> Response {
    match state.engine.owner() {
        Ok(owner) => Json(OwnerResponse { owner }).into_response(),
        Err(err) => error_response(err),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::Utc;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use champz_protocol::crypto::AuthorityKey;
    use champz_protocol::purchase::message::order_digest;
    use champz_protocol::purchase::PurchaseBatch;
    use champz_protocol::{BundlesPurchased, ClaimLedger, EngineOptions};

    fn test_app() -> (Router, AuthorityKey) {
        let engine = PurchaseEngine::new(
            ClaimLedger::open_temporary().expect("temp ledger"),
            EngineOptions::default(),
        );
        let authority = AuthorityKey::random();
        engine
            .initialize(authority.address(), Address::new([0xEE; 20]), None)
            .unwrap();
        let state = AppState {
            version: "test".to_string(),
            engine: Arc::new(engine),
        };
        (create_router(state), authority)
    }

    fn signed_request(authority: &AuthorityKey, payment: U256) -> PurchaseRequest {
        let buyer = Address::new([0xB0; 20]);
        let timestamp = Utc::now().timestamp() as u64;
        let bundle_ids = vec![U256::from(1), U256::from(2)];
        let prices = vec![U256::exp10(18), U256::exp10(18) * U256::from(2)];
        let batch = PurchaseBatch::new(bundle_ids.clone(), prices.clone()).unwrap();
        let digest = order_digest(&buyer, timestamp, &batch.commitment());
        PurchaseRequest {
            buyer,
            timestamp,
            signature: authority.sign_digest(&digest),
            bundle_ids,
            prices,
            payment,
        }
    }

    async fn post_purchase(router: Router, request: &PurchaseRequest) -> (StatusCode, Vec<u8>) {
        let response = router
            .oneshot(
                Request::post("/purchase")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(request).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (router, _) = test_app();
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn purchase_then_replay() {
        let (router, authority) = test_app();
        let request = signed_request(&authority, U256::exp10(18) * U256::from(3));

        let (status, body) = post_purchase(router.clone(), &request).await;
        assert_eq!(status, StatusCode::OK);
        let event: BundlesPurchased = serde_json::from_slice(&body).unwrap();
        assert_eq!(event.bundle_ids, request.bundle_ids);

        // Identical resubmission conflicts.
        let (status, body) = post_purchase(router.clone(), &request).await;
        assert_eq!(status, StatusCode::CONFLICT);
        let err: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(err.error, "already_claimed");

        // And the claim is visible through the read endpoint.
        let response = router
            .oneshot(
                Request::get("/bundles/1/claimed")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let claimed: ClaimedResponse = serde_json::from_slice(&body).unwrap();
        assert!(claimed.claimed);
    }

    #[tokio::test]
    async fn wrong_payment_maps_to_bad_request() {
        let (router, authority) = test_app();
        let request = signed_request(&authority, U256::exp10(18) * U256::from(2));

        let (status, body) = post_purchase(router, &request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let err: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(err.error, "payment_mismatch");
    }

    #[tokio::test]
    async fn impostor_signature_maps_to_unauthorized() {
        let (router, _authority) = test_app();
        let impostor = AuthorityKey::random();
        let request = signed_request(&impostor, U256::exp10(18) * U256::from(3));

        let (status, body) = post_purchase(router, &request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let err: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(err.error, "unauthorized_signer");
    }

    #[tokio::test]
    async fn owner_endpoint_reports_the_authority() {
        let (router, authority) = test_app();
        let response = router
            .oneshot(Request::get("/owner").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let owner: OwnerResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(owner.owner, Some(authority.address()));
    }

    #[tokio::test]
    async fn garbage_bundle_id_is_rejected() {
        let (router, _) = test_app();
        let response = router
            .oneshot(
                Request::get("/bundles/not-a-number/claimed")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
