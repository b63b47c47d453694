use anchor_lang::prelude::*;
use crate::{constants::*, error::PoolError, oracle::OraclePolicy};

/// Creator-supplied pool parameters.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolParams {
    pub fee_rate_bps: u16,
    pub price_feed_id_a: [u8; 32],
    pub price_feed_id_b: [u8; 32],
    pub ratio_tolerance_bps: u16,
    pub max_confidence_bps: u16,
    pub max_price_age_secs: u32,
}

impl PoolParams {
    pub fn validate(&self) -> Result<()> {
        require!(self.fee_rate_bps < MAX_FEE_RATE_BPS, PoolError::InvalidFeeRate);
        require!(
            self.ratio_tolerance_bps > 0 && self.ratio_tolerance_bps <= MAX_RATIO_TOLERANCE_BPS,
            PoolError::InvalidOracleParams
        );
        require!(
            self.max_confidence_bps > 0 && (self.max_confidence_bps as u128) <= BPS_DENOMINATOR,
            PoolError::InvalidOracleParams
        );
        require!(
            self.max_price_age_secs > 0 && self.max_price_age_secs <= MAX_PRICE_AGE_SECS,
            PoolError::InvalidOracleParams
        );
        require!(
            self.price_feed_id_a != [0; 32] && self.price_feed_id_b != [0; 32],
            PoolError::InvalidOracleParams
        );
        Ok(())
    }
}

/// Bumps of every PDA the pool owns, as found by the account validator.
#[derive(Clone, Copy, Debug, Default)]
pub struct PoolBumps {
    pub pool_config: u8,
    pub pool_authority: u8,
    pub share_mint_authority: u8,
    pub vault_a: u8,
    pub vault_b: u8,
    pub share_mint: u8,
}

/// Addresses and settings written into a pool at initialization.
#[derive(Clone, Copy, Debug)]
pub struct PoolInit {
    pub creator: Pubkey,
    pub token_a_mint: Pubkey,
    pub token_b_mint: Pubkey,
    pub token_a_vault: Pubkey,
    pub token_b_vault: Pubkey,
    pub share_mint: Pubkey,
    pub params: PoolParams,
    pub bumps: PoolBumps,
    pub created_at: i64,
}

// ─── PoolConfig ────────────────────────────────────────────────────────────
// One ledger per ordered mint pair, keyed by PDA ["pool_config", mint_a, mint_b].
// Vault and share-mint authorities are PDAs derived from this account's
// address; only their bumps are stored.
#[account]
#[derive(Debug, Default)]
pub struct PoolConfig {
    pub creator: Pubkey,                 // 32
    pub token_a_mint: Pubkey,            // 32
    pub token_b_mint: Pubkey,            // 32
    pub token_a_vault: Pubkey,           // 32
    pub token_b_vault: Pubkey,           // 32
    pub share_mint: Pubkey,              // 32
    /// Pyth feed ids pinned at initialization
    pub price_feed_id_a: [u8; 32],       // 32
    pub price_feed_id_b: [u8; 32],       // 32
    /// Fee rate in basis points (e.g. 50 = 0.50 %)
    pub fee_rate_bps: u16,               // 2
    pub ratio_tolerance_bps: u16,        // 2
    pub max_confidence_bps: u16,         // 2
    pub max_price_age_secs: u32,         // 4
    /// Cumulative deposits, never decremented
    pub token_a_deposits: u64,           // 8
    pub token_b_deposits: u64,           // 8
    /// Running oracle valuation of contributions, USD e6
    pub total_pool_value: u64,           // 8
    pub created_at: i64,                 // 8
    pub bump: u8,                        // 1
    pub authority_bump: u8,              // 1
    pub share_mint_authority_bump: u8,   // 1
    pub vault_a_bump: u8,                // 1
    pub vault_b_bump: u8,                // 1
    pub share_mint_bump: u8,             // 1
}

impl PoolConfig {
    // 8 discriminator + 32*8 + 2+2+2+4 + 8*4 + 6 = 312
    pub const LEN: usize = 312;

    /// A freshly allocated account is all zeroes; mints are set exactly once.
    pub fn is_initialized(&self) -> bool {
        self.token_a_mint != Pubkey::default()
    }

    /// Write the pool's identity and policy. Fails on a pool that is already
    /// live and leaves it untouched.
    pub fn initialize(&mut self, init: PoolInit) -> Result<()> {
        require!(!self.is_initialized(), PoolError::AlreadyInitialized);
        require_keys_neq!(init.token_a_mint, init.token_b_mint, PoolError::IdenticalMints);
        init.params.validate()?;

        *self = PoolConfig {
            creator: init.creator,
            token_a_mint: init.token_a_mint,
            token_b_mint: init.token_b_mint,
            token_a_vault: init.token_a_vault,
            token_b_vault: init.token_b_vault,
            share_mint: init.share_mint,
            price_feed_id_a: init.params.price_feed_id_a,
            price_feed_id_b: init.params.price_feed_id_b,
            fee_rate_bps: init.params.fee_rate_bps,
            ratio_tolerance_bps: init.params.ratio_tolerance_bps,
            max_confidence_bps: init.params.max_confidence_bps,
            max_price_age_secs: init.params.max_price_age_secs,
            token_a_deposits: 0,
            token_b_deposits: 0,
            total_pool_value: 0,
            created_at: init.created_at,
            bump: init.bumps.pool_config,
            authority_bump: init.bumps.pool_authority,
            share_mint_authority_bump: init.bumps.share_mint_authority,
            vault_a_bump: init.bumps.vault_a,
            vault_b_bump: init.bumps.vault_b,
            share_mint_bump: init.bumps.share_mint,
        };
        Ok(())
    }

    /// No deposit has been accepted yet; the next one sets the exchange rate.
    pub fn is_awaiting_first_deposit(&self) -> bool {
        self.token_a_deposits == 0 && self.token_b_deposits == 0
    }

    /// Feed ids named by a depositor must be the ones pinned at initialization.
    pub fn check_feed_ids(&self, feed_id_a: &[u8; 32], feed_id_b: &[u8; 32]) -> Result<()> {
        require!(
            *feed_id_a == self.price_feed_id_a && *feed_id_b == self.price_feed_id_b,
            PoolError::OracleIdentityMismatch
        );
        Ok(())
    }

    pub fn oracle_policy(&self) -> OraclePolicy {
        OraclePolicy {
            max_age_secs: self.max_price_age_secs,
            max_confidence_bps: self.max_confidence_bps,
        }
    }

    /// Fold an accepted deposit into the accumulators.
    /// All sums are checked before any field is written.
    pub fn record_deposit(&mut self, amount_a: u64, amount_b: u64, value: u64) -> Result<()> {
        let token_a_deposits = self
            .token_a_deposits
            .checked_add(amount_a)
            .ok_or(PoolError::MathOverflow)?;
        let token_b_deposits = self
            .token_b_deposits
            .checked_add(amount_b)
            .ok_or(PoolError::MathOverflow)?;
        let total_pool_value = self
            .total_pool_value
            .checked_add(value)
            .ok_or(PoolError::MathOverflow)?;

        self.token_a_deposits = token_a_deposits;
        self.token_b_deposits = token_b_deposits;
        self.total_pool_value = total_pool_value;
        Ok(())
    }
}
