//! Liquidity Pool Rust SDK
//!
//! Client for the oracle-priced two-asset liquidity pool on Solana.
//! Create pools, quote and submit deposits, and read pool state without an
//! Anchor dependency.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use liquidity_pool_sdk::{DepositParams, LiquidityPoolClient};
//! use solana_sdk::{pubkey::Pubkey, signature::Keypair};
//! use std::str::FromStr;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LiquidityPoolClient::devnet();
//!     let keypair = Keypair::new(); // use a funded keypair
//!
//!     let sol  = Pubkey::from_str("So11111111111111111111111111111111111111112")?;
//!     let usdc = Pubkey::from_str("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v")?;
//!
//!     let params = DepositParams {
//!         mint_a: sol, mint_b: usdc, amount_a: 1_000_000_000, amount_b: None,
//!         max_slippage_bps: 50, min_shares_out: None,
//!         price_feed_a: None, price_feed_b: None,
//!     };
//!
//!     // 1. Preview: USD value of each leg and shares to be minted
//!     let preview = client.preview_deposit(params.clone()).await?;
//!     println!("value ${}  shares {}", preview.contribution_value as f64 / 1e6, preview.shares_out);
//!
//!     // 2. Deposit with a 0.5% share floor
//!     let result = client.deposit(&keypair, params).await?;
//!     println!("Deposited! tx: {}", result.signature);
//!     Ok(())
//! }
//! ```
//!
//! # Feature Overview
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`LiquidityPoolClient::create_pool`] | Create the pool for a mint pair with pinned feeds |
//! | [`LiquidityPoolClient::deposit`] | Deposit both assets, receive shares |
//! | [`LiquidityPoolClient::preview_deposit`] | Off-chain valuation and share quote |
//! | [`LiquidityPoolClient::pool_info`] | Ledger, reserves, share supply |

pub mod client;
pub mod error;
pub mod instructions;
pub mod math;
pub mod state;
pub mod types;

pub use client::LiquidityPoolClient;
pub use error::{Error, Result};
pub use types::*;

/// Parse a 32-byte Pyth feed id from hex, with or without a `0x` prefix.
pub fn feed_id_from_hex(s: &str) -> Result<[u8; 32]> {
    let raw = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(raw)
        .map_err(|e| Error::InvalidArgument(format!("feed id {s:?}: {e}")))?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| Error::InvalidArgument(format!("feed id must be 32 bytes, got {}", b.len())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_id_hex_accepts_prefix() {
        let id = "ef0d8b6fda2ceba41da15d4095d1da392a0d2f8ed0c6c7bc0f4cfac8c280b56d";
        let a = feed_id_from_hex(id).unwrap();
        let b = feed_id_from_hex(&format!("0x{id}")).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0], 0xef);
    }

    #[test]
    fn feed_id_hex_rejects_bad_input() {
        assert!(matches!(feed_id_from_hex("0xabcd"), Err(Error::InvalidArgument(_))));
        assert!(matches!(feed_id_from_hex("zz"), Err(Error::InvalidArgument(_))));
    }
}
