use anchor_lang::prelude::*;

#[event]
pub struct PoolInitialized {
    pub pool_config: Pubkey,
    pub creator: Pubkey,
    pub token_a_mint: Pubkey,
    pub token_b_mint: Pubkey,
    pub share_mint: Pubkey,
    pub price_feed_id_a: [u8; 32],
    pub price_feed_id_b: [u8; 32],
    pub fee_rate_bps: u16,
    pub ratio_tolerance_bps: u16,
    pub max_confidence_bps: u16,
    pub max_price_age_secs: u32,
}

/// Emitted once per accepted deposit, after the ledger update.
#[event]
pub struct LiquidityDeposited {
    pub pool_config: Pubkey,
    pub depositor: Pubkey,
    pub amount_a: u64,
    pub amount_b: u64,
    /// Oracle valuation of each leg, USD e6
    pub value_a: u64,
    pub value_b: u64,
    pub shares_minted: u64,
    /// Ledger totals after this deposit
    pub token_a_deposits: u64,
    pub token_b_deposits: u64,
    pub total_pool_value: u64,
}
