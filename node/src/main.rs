// Copyright (c) 2026 Champz Labs. MIT License.
// See LICENSE for details.

//! # Champz Purchase Node
//!
//! Entry point for the `champz-node` binary. Parses CLI arguments,
//! initializes logging, opens the claim ledger, and serves the purchase
//! API — or runs one of the offline subcommands.
//!
//! - `run`     — serve the HTTP API over an initialized ledger
//! - `init`    — record the authorized signer, receiver, and pricing
//! - `sign`    — produce an authority signature for a purchase order
//! - `version` — print build version information

mod api;
mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;
use primitive_types::U256;
use std::sync::Arc;
use tokio::signal;

use champz_protocol::crypto::AuthorityKey;
use champz_protocol::purchase::message::order_digest;
use champz_protocol::purchase::PurchaseBatch;
use champz_protocol::{ClaimLedger, EngineOptions, PurchaseEngine};

use cli::{ChampzNodeCli, Commands};
use logging::LogFormat;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ChampzNodeCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Init(args) => init_ledger(args),
        Commands::Sign(args) => sign_order(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Opens the ledger under `data_dir` and serves the purchase API.
async fn run_node(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(
        "champz_node=info,champz_protocol=info,tower_http=debug",
        LogFormat::from_str_lossy(&args.log_format),
    );

    tracing::info!(
        port = args.port,
        data_dir = %args.data_dir.display(),
        max_order_age = args.max_order_age,
        "starting champz-node"
    );

    // --- Persistent ledger ---
    let db_path = args.data_dir.join("db");
    std::fs::create_dir_all(&db_path)
        .with_context(|| format!("failed to create ledger directory: {}", db_path.display()))?;
    let ledger = ClaimLedger::open(&db_path)
        .with_context(|| format!("failed to open ledger at {}", db_path.display()))?;

    // --- Engine ---
    let options = EngineOptions {
        max_order_age_secs: args.max_order_age,
        max_clock_drift_secs: args.max_clock_drift,
    };
    let engine = Arc::new(PurchaseEngine::new(ledger, options));
    match engine.owner()? {
        Some(owner) => tracing::info!(%owner, "ledger opened"),
        None => tracing::warn!("ledger is not initialized; run `champz-node init` first"),
    }

    // --- API server ---
    let state = api::AppState {
        version: format!(
            "{} (protocol {})",
            env!("CARGO_PKG_VERSION"),
            champz_protocol::config::PROTOCOL_VERSION,
        ),
        engine,
    };
    let router = api::create_router(state);
    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind API listener on {addr}"))?;
    tracing::info!("purchase API listening on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    tracing::info!("champz-node stopped");
    Ok(())
}

/// One-time ledger initialization: authorized signer, payment receiver,
/// and optional unit price.
fn init_ledger(args: cli::InitArgs) -> Result<()> {
    let owner = match (&args.owner, &args.key) {
        (Some(owner), _) => *owner,
        (None, Some(key)) => AuthorityKey::from_hex(key)
            .context("invalid authority key")?
            .address(),
        (None, None) => bail!("provide either --owner or --key to identify the authority"),
    };

    let db_path = args.data_dir.join("db");
    std::fs::create_dir_all(&db_path)
        .with_context(|| format!("failed to create ledger directory: {}", db_path.display()))?;
    let ledger = ClaimLedger::open(&db_path)
        .with_context(|| format!("failed to open ledger at {}", db_path.display()))?;

    let engine = PurchaseEngine::new(ledger, EngineOptions::default());
    engine
        .initialize(owner, args.receiver, args.unit_price)
        .context("initialization failed")?;

    println!("ledger initialized at {}", db_path.display());
    println!("  authorized signer: {owner}");
    println!("  payment receiver:  {}", args.receiver);
    match args.unit_price {
        Some(price) => println!("  pricing:           unit-price ({price} wei per unit)"),
        None => println!("  pricing:           price-list"),
    }
    Ok(())
}

/// Signs a purchase order as the off-chain authority and prints the
/// submittable pieces as JSON on stdout.
fn sign_order(args: cli::SignArgs) -> Result<()> {
    let authority = AuthorityKey::from_hex(&args.key).context("invalid authority key")?;
    let timestamp = args
        .timestamp
        .unwrap_or_else(|| chrono::Utc::now().timestamp().max(0) as u64);

    let batch = PurchaseBatch::new(args.bundle_ids.clone(), args.prices.clone())
        .context("invalid batch")?;
    let digest = order_digest(&args.buyer, timestamp, &batch.commitment());
    let signature = authority.sign_digest(&digest);

    // The suggested payment assumes price-list mode; in unit-price mode
    // the caller scales quantities by the stored unit price instead.
    let mut total = U256::zero();
    for price in &args.prices {
        total = total
            .checked_add(*price)
            .context("price total overflows 256 bits")?;
    }

    let output = serde_json::json!({
        "signer": authority.address(),
        "buyer": args.buyer,
        "timestamp": timestamp,
        "bundle_ids": args.bundle_ids,
        "prices": args.prices,
        "order_digest": format!("0x{}", hex::encode(digest)),
        "signature": signature,
        "suggested_payment": total,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_version() {
    println!(
        "champz-node {} (protocol {})",
        env!("CARGO_PKG_VERSION"),
        champz_protocol::config::PROTOCOL_VERSION,
    );
}

/// Resolves when the process receives a shutdown signal.
async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
