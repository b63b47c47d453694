/// Liquidity Pool: a two-asset pool priced by Pyth oracles.
///
/// 2 instructions:
///   initialize_pool  create the ledger, PDA-owned vaults and share mint for a mint pair
///   deposit          add both assets at the oracle ratio and receive pool shares
///
/// Deposits are valued in USD (6 decimals) from fresh, fully verified Pyth
/// price updates. A deposit whose legs disagree with the oracle ratio beyond
/// the pool's tolerance is rejected, never rebalanced.

// ─── Security contact ─────────────────────────────────────────────────────────

use solana_security_txt::security_txt;

#[cfg(not(feature = "no-entrypoint"))]
security_txt! {
    name:             "Liquidity Pool",
    project_url:      "https://github.com/liquidity-pool/liquidity-pool",
    contacts:         "email:security@liquidity-pool.dev",
    policy:           "Please report security vulnerabilities by email. \
                       We aim to respond within 48 hours.",
    source_code:      "https://github.com/liquidity-pool/liquidity-pool",
    preferred_languages: "en"
}

pub mod constants;
pub mod error;
pub mod events;
pub mod instructions;
pub mod oracle;
pub mod state;

use anchor_lang::prelude::*;
pub use constants::*;
pub use instructions::*;
pub use state::*;

declare_id!("D84sXEooUu4FJ2EqdULee5HoELxb6Nfs1hiiLS6N73yp");

#[program]
pub mod liquidity_pool {
    use super::*;

    /// Create the pool for a mint pair. PDAs control vaults and share mint.
    pub fn initialize_pool(ctx: Context<InitializePool>, params: PoolParams) -> Result<()> {
        initialize_pool::handler(ctx, params)
    }

    /// Deposit both assets at the oracle price ratio and receive shares.
    pub fn deposit(
        ctx: Context<Deposit>,
        amount_a: u64,
        amount_b: u64,
        min_shares_out: u64,
        price_feed_id_a: [u8; 32],
        price_feed_id_b: [u8; 32],
    ) -> Result<()> {
        deposit::handler(ctx, amount_a, amount_b, min_shares_out, price_feed_id_a, price_feed_id_b)
    }
}
