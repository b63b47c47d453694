//! Parameter and result types for [`crate::LiquidityPoolClient`].
//!
//! Results serialize to JSON with base58 pubkeys and hex feed ids.

use serde::{Serialize, Serializer};
use solana_sdk::pubkey::Pubkey;

// ─── Defaults (mirror programs/liquidity-pool/src/constants.rs) ───────────────

pub const DEFAULT_RATIO_TOLERANCE_BPS: u16 = 100;
pub const DEFAULT_MAX_CONFIDENCE_BPS:  u16 = 200;
pub const DEFAULT_MAX_PRICE_AGE_SECS:  u32 = 60;

// ─── Serde helpers ────────────────────────────────────────────────────────────

fn as_base58<S: Serializer>(key: &Pubkey, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.collect_str(key)
}

fn as_hex<S: Serializer>(id: &[u8; 32], s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&hex::encode(id))
}

// ─── Pool parameters ──────────────────────────────────────────────────────────

/// Arguments of the on-chain `initialize_pool` instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolParams {
    pub fee_rate_bps:        u16,
    #[serde(serialize_with = "as_hex")]
    pub price_feed_id_a:     [u8; 32],
    #[serde(serialize_with = "as_hex")]
    pub price_feed_id_b:     [u8; 32],
    pub ratio_tolerance_bps: u16,
    pub max_confidence_bps:  u16,
    pub max_price_age_secs:  u32,
}

impl PoolParams {
    /// Default oracle policy for the given feeds.
    pub fn new(fee_rate_bps: u16, price_feed_id_a: [u8; 32], price_feed_id_b: [u8; 32]) -> Self {
        Self {
            fee_rate_bps,
            price_feed_id_a,
            price_feed_id_b,
            ratio_tolerance_bps: DEFAULT_RATIO_TOLERANCE_BPS,
            max_confidence_bps:  DEFAULT_MAX_CONFIDENCE_BPS,
            max_price_age_secs:  DEFAULT_MAX_PRICE_AGE_SECS,
        }
    }

    /// Borsh encoding, field order as declared on-chain.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + 32 + 32 + 2 + 2 + 4);
        out.extend_from_slice(&self.fee_rate_bps.to_le_bytes());
        out.extend_from_slice(&self.price_feed_id_a);
        out.extend_from_slice(&self.price_feed_id_b);
        out.extend_from_slice(&self.ratio_tolerance_bps.to_le_bytes());
        out.extend_from_slice(&self.max_confidence_bps.to_le_bytes());
        out.extend_from_slice(&self.max_price_age_secs.to_le_bytes());
        out
    }
}

/// Parameters for [`crate::LiquidityPoolClient::create_pool`].
#[derive(Debug, Clone)]
pub struct CreatePoolParams {
    pub mint_a: Pubkey,
    pub mint_b: Pubkey,
    pub params: PoolParams,
}

/// Result of a successful `create_pool` call.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePoolResult {
    pub signature: String,
    #[serde(serialize_with = "as_base58")]
    pub pool: Pubkey,
    #[serde(serialize_with = "as_base58")]
    pub pool_authority: Pubkey,
    #[serde(serialize_with = "as_base58")]
    pub vault_a: Pubkey,
    #[serde(serialize_with = "as_base58")]
    pub vault_b: Pubkey,
    #[serde(serialize_with = "as_base58")]
    pub share_mint: Pubkey,
    #[serde(serialize_with = "as_base58")]
    pub mint_a: Pubkey,
    #[serde(serialize_with = "as_base58")]
    pub mint_b: Pubkey,
    pub params: PoolParams,
}

// ─── Deposit ──────────────────────────────────────────────────────────────────

/// Parameters for [`crate::LiquidityPoolClient::deposit`] and
/// [`crate::LiquidityPoolClient::preview_deposit`].
///
/// `mint_a` / `mint_b` may be given in either order; the SDK maps them onto
/// the pool's ordering.
#[derive(Debug, Clone)]
pub struct DepositParams {
    pub mint_a:   Pubkey,
    pub mint_b:   Pubkey,
    pub amount_a: u64,
    /// `None` → computed from oracle prices so both legs carry equal value.
    pub amount_b: Option<u64>,
    /// Shares may come in this far below the quote (bps). 0 disables the guard.
    pub max_slippage_bps: u16,
    /// Absolute share minimum. A quote below it fails before sending.
    pub min_shares_out: Option<u64>,
    /// Feed accounts; `None` → the Pyth sponsored feed account (shard 0).
    pub price_feed_a: Option<Pubkey>,
    pub price_feed_b: Option<Pubkey>,
}

/// Off-chain quote of a deposit against current pool and oracle state.
#[derive(Debug, Clone, Serialize)]
pub struct DepositPreview {
    #[serde(serialize_with = "as_base58")]
    pub pool: Pubkey,
    /// Amounts in pool ordering
    pub amount_a: u64,
    pub amount_b: u64,
    /// Oracle value of each leg, USD with 6 decimals
    pub value_a: u64,
    pub value_b: u64,
    pub contribution_value: u64,
    pub shares_out: u64,
    pub share_supply: u64,
    pub total_pool_value: u64,
    pub price_a: f64,
    pub price_b: f64,
    pub price_age_a_secs: i64,
    pub price_age_b_secs: i64,
}

/// Result of a successful `deposit` call.
#[derive(Debug, Clone, Serialize)]
pub struct DepositResult {
    pub signature: String,
    #[serde(serialize_with = "as_base58")]
    pub pool: Pubkey,
    #[serde(serialize_with = "as_base58")]
    pub share_account: Pubkey,
    pub amount_a: u64,
    pub amount_b: u64,
    pub expected_shares: u64,
    pub min_shares_out: u64,
}

// ─── Pool info ────────────────────────────────────────────────────────────────

/// Ledger state plus live vault balances and share supply.
#[derive(Debug, Clone, Serialize)]
pub struct PoolInfo {
    #[serde(serialize_with = "as_base58")]
    pub pool: Pubkey,
    #[serde(serialize_with = "as_base58")]
    pub creator: Pubkey,
    #[serde(serialize_with = "as_base58")]
    pub mint_a: Pubkey,
    #[serde(serialize_with = "as_base58")]
    pub mint_b: Pubkey,
    #[serde(serialize_with = "as_base58")]
    pub vault_a: Pubkey,
    #[serde(serialize_with = "as_base58")]
    pub vault_b: Pubkey,
    #[serde(serialize_with = "as_base58")]
    pub share_mint: Pubkey,
    #[serde(serialize_with = "as_hex")]
    pub price_feed_id_a: [u8; 32],
    #[serde(serialize_with = "as_hex")]
    pub price_feed_id_b: [u8; 32],
    pub reserve_a: u64,
    pub reserve_b: u64,
    pub token_a_deposits: u64,
    pub token_b_deposits: u64,
    pub total_pool_value: u64,
    pub share_supply: u64,
    /// USD per whole share (share mint has 6 decimals); 0 when empty
    pub value_per_share: f64,
    pub fee_rate_bps: u16,
    pub ratio_tolerance_bps: u16,
    pub max_confidence_bps: u16,
    pub max_price_age_secs: u32,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_encode_in_declared_order() {
        let p = PoolParams::new(30, [1; 32], [2; 32]);
        let bytes = p.encode();
        assert_eq!(bytes.len(), 74);
        assert_eq!(&bytes[0..2], &30u16.to_le_bytes());
        assert_eq!(&bytes[2..34], &[1; 32]);
        assert_eq!(&bytes[34..66], &[2; 32]);
        assert_eq!(&bytes[66..68], &100u16.to_le_bytes());
        assert_eq!(&bytes[68..70], &200u16.to_le_bytes());
        assert_eq!(&bytes[70..74], &60u32.to_le_bytes());
    }

    #[test]
    fn json_uses_base58_and_hex() {
        let info = DepositResult {
            signature: "sig".into(),
            pool: Pubkey::new_from_array([0; 32]),
            share_account: Pubkey::new_from_array([0; 32]),
            amount_a: 1,
            amount_b: 2,
            expected_shares: 3,
            min_shares_out: 3,
        };
        let v = serde_json::to_value(&info).unwrap();
        assert_eq!(v["pool"], "11111111111111111111111111111111");

        let p = serde_json::to_value(PoolParams::new(0, [0xab; 32], [0; 32])).unwrap();
        assert_eq!(p["price_feed_id_a"], "ab".repeat(32));
    }
}
