use anchor_lang::prelude::*;

/// PDA seeds
pub const POOL_CONFIG_SEED: &[u8] = b"pool_config";
pub const POOL_AUTHORITY_SEED: &[u8] = b"pool_authority";
pub const VAULT_SEED: &[u8] = b"vault";
pub const SHARE_MINT_SEED: &[u8] = b"share_mint";
pub const SHARE_MINT_AUTHORITY_SEED: &[u8] = b"share_mint_authority";

/// Denominator for basis-point math (u128 to avoid up-cast noise)
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Fee rate must stay strictly below 10 %
pub const MAX_FEE_RATE_BPS: u16 = 1_000;

/// Deposit legs may differ in oracle value by at most this much
pub const DEFAULT_RATIO_TOLERANCE_BPS: u16 = 100;
pub const MAX_RATIO_TOLERANCE_BPS: u16 = 1_000;

/// Oracle confidence interval, relative to price
pub const DEFAULT_MAX_CONFIDENCE_BPS: u16 = 200;

/// Oracle staleness window (seconds)
pub const DEFAULT_MAX_PRICE_AGE_SECS: u32 = 60;
pub const MAX_PRICE_AGE_SECS: u32 = 3_600;

/// Pool value is denominated in USD with 6 decimals
pub const VALUE_DECIMALS: i32 = 6;

/// LP share mint decimals
pub const SHARE_MINT_DECIMALS: u8 = 6;

/// First deposit: share base units minted per micro-USD of contribution
pub const INITIAL_SHARES_PER_VALUE_UNIT: u64 = 1;

/// |exponent| bound accepted from a price feed
pub const MAX_PRICE_EXPONENT_ABS: i32 = 18;

/// Owner of Pyth `PriceUpdateV2` accounts (pyth-solana-receiver)
pub const PYTH_RECEIVER_PROGRAM_ID: Pubkey = pubkey!("rec5EKMGg6MxZYaMdyBfgwp4d5rB9T1VQH5pJv5LtFJ");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pyth_receiver_id_decodes() {
        assert_eq!(
            PYTH_RECEIVER_PROGRAM_ID.to_string(),
            "rec5EKMGg6MxZYaMdyBfgwp4d5rB9T1VQH5pJv5LtFJ"
        );
    }
}
