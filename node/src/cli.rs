//! # CLI Interface
//!
//! Defines the command-line argument structure for `champz-node` using
//! `clap` derive. Four subcommands: `run`, `init`, `sign`, and `version`.

use clap::{Parser, Subcommand};
use primitive_types::U256;
use std::path::PathBuf;

use champz_protocol::Address;

/// Parses a 256-bit value from decimal or `0x`-prefixed hex.
///
/// Shared by CLI arguments and API path parameters — prices arrive as
/// wei-scale decimals from humans and as hex words from tooling.
pub fn parse_u256(s: &str) -> Result<U256, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex_digits) => U256::from_str_radix(hex_digits, 16).map_err(|_| ()),
        None => U256::from_dec_str(s).map_err(|_| ()),
    };
    parsed.map_err(|()| format!("not a 256-bit integer: {s}"))
}

/// Champz purchase authorization service.
///
/// Hosts the signed-purchase engine over a persistent claim ledger and
/// exposes it through an HTTP API. Also carries the off-chain authority
/// tooling (`sign`) so signatures are always produced through the same
/// convention the engine verifies.
#[derive(Parser, Debug)]
#[command(
    name = "champz-node",
    about = "Champz purchase authorization service",
    version,
    propagate_version = true
)]
pub struct ChampzNodeCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the `champz-node` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the purchase API over an initialized ledger.
    Run(RunArgs),
    /// Initialize a ledger: record the authorized signer, the payment
    /// receiver, and (optionally) a unit price.
    Init(InitArgs),
    /// Sign a purchase order as the off-chain authority.
    Sign(SignArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the data directory holding the claim ledger.
    #[arg(long, short = 'd', env = "CHAMPZ_DATA_DIR", default_value = "~/.champz")]
    pub data_dir: PathBuf,

    /// Port for the HTTP API.
    #[arg(long, env = "CHAMPZ_API_PORT", default_value_t = 8731)]
    pub port: u16,

    /// Maximum accepted order age in seconds. 0 disables the check.
    #[arg(long, env = "CHAMPZ_MAX_ORDER_AGE", default_value_t = 3_600)]
    pub max_order_age: u64,

    /// Allowance for order timestamps ahead of this host's clock, seconds.
    #[arg(long, env = "CHAMPZ_MAX_CLOCK_DRIFT", default_value_t = 300)]
    pub max_clock_drift: u64,

    /// Log output format: "pretty" or "json".
    #[arg(long, env = "CHAMPZ_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

/// Arguments for the `init` subcommand.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Path to the data directory to initialize.
    #[arg(long, short = 'd', env = "CHAMPZ_DATA_DIR", default_value = "~/.champz")]
    pub data_dir: PathBuf,

    /// Hex-encoded authority secret key; the authorized signer is derived
    /// from it. **Never pass this flag in production** — use the
    /// environment or pass `--owner` with just the address instead.
    #[arg(long, env = "CHAMPZ_AUTHORITY_KEY", conflicts_with = "owner")]
    pub key: Option<String>,

    /// The authorized-signer address, when the secret stays elsewhere.
    #[arg(long)]
    pub owner: Option<Address>,

    /// The address credited with collected payments.
    #[arg(long)]
    pub receiver: Address,

    /// Unit price in wei. Presence selects unit-price mode: signed values
    /// become quantities scaled by this price.
    #[arg(long, value_parser = parse_u256)]
    pub unit_price: Option<U256>,
}

/// Arguments for the `sign` subcommand.
#[derive(Parser, Debug)]
pub struct SignArgs {
    /// Hex-encoded authority secret key.
    #[arg(long, env = "CHAMPZ_AUTHORITY_KEY")]
    pub key: String,

    /// The buyer the order is bound to.
    #[arg(long)]
    pub buyer: Address,

    /// Order timestamp (Unix seconds). Defaults to the current time.
    #[arg(long)]
    pub timestamp: Option<u64>,

    /// Bundle ids, comma separated.
    #[arg(long, value_delimiter = ',', value_parser = parse_u256, required = true)]
    pub bundle_ids: Vec<U256>,

    /// Prices (or quantities, in unit-price mode), comma separated,
    /// matching `--bundle-ids` by position.
    #[arg(long, value_delimiter = ',', value_parser = parse_u256, required = true)]
    pub prices: Vec<U256>,
}
