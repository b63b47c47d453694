use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::{
    constants::*,
    error::PoolError,
    events::PoolInitialized,
    state::{PoolBumps, PoolConfig, PoolInit, PoolParams},
};

/// Create the pool ledger for an ordered mint pair.
/// Vaults and the share mint are PDAs owned by program-derived authorities;
/// no key held by the creator can move pool funds or mint shares.
///
/// Accounts are `init_if_needed` so a repeat call reaches the handler and
/// fails with `AlreadyInitialized` instead of a generic allocation error.
pub fn handler(ctx: Context<InitializePool>, params: PoolParams) -> Result<()> {
    let init = PoolInit {
        creator: ctx.accounts.creator.key(),
        token_a_mint: ctx.accounts.token_a_mint.key(),
        token_b_mint: ctx.accounts.token_b_mint.key(),
        token_a_vault: ctx.accounts.token_a_vault.key(),
        token_b_vault: ctx.accounts.token_b_vault.key(),
        share_mint: ctx.accounts.share_mint.key(),
        params,
        bumps: PoolBumps {
            pool_config: ctx.bumps.pool_config,
            pool_authority: ctx.bumps.pool_authority,
            share_mint_authority: ctx.bumps.share_mint_authority,
            vault_a: ctx.bumps.token_a_vault,
            vault_b: ctx.bumps.token_b_vault,
            share_mint: ctx.bumps.share_mint,
        },
        created_at: Clock::get()?.unix_timestamp,
    };
    ctx.accounts.pool_config.initialize(init)?;

    emit!(PoolInitialized {
        pool_config: ctx.accounts.pool_config.key(),
        creator: init.creator,
        token_a_mint: init.token_a_mint,
        token_b_mint: init.token_b_mint,
        share_mint: init.share_mint,
        price_feed_id_a: params.price_feed_id_a,
        price_feed_id_b: params.price_feed_id_b,
        fee_rate_bps: params.fee_rate_bps,
        ratio_tolerance_bps: params.ratio_tolerance_bps,
        max_confidence_bps: params.max_confidence_bps,
        max_price_age_secs: params.max_price_age_secs,
    });

    msg!(
        "Pool created: {}/{} share_mint={} fee={}bps tolerance={}bps",
        init.token_a_mint,
        init.token_b_mint,
        init.share_mint,
        params.fee_rate_bps,
        params.ratio_tolerance_bps
    );
    Ok(())
}

#[derive(Accounts)]
pub struct InitializePool<'info> {
    #[account(mut)]
    pub creator: Signer<'info>,

    #[account(mint::token_program = token_program)]
    pub token_a_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        constraint = token_b_mint.key() != token_a_mint.key() @ PoolError::IdenticalMints,
        mint::token_program = token_program,
    )]
    pub token_b_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        init_if_needed,
        payer = creator,
        space = PoolConfig::LEN,
        seeds = [POOL_CONFIG_SEED, token_a_mint.key().as_ref(), token_b_mint.key().as_ref()],
        bump,
    )]
    pub pool_config: Box<Account<'info, PoolConfig>>,

    /// CHECK: PDA vault authority, owns both vaults, holds no data
    #[account(
        seeds = [POOL_AUTHORITY_SEED, pool_config.key().as_ref()],
        bump,
    )]
    pub pool_authority: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = creator,
        seeds = [VAULT_SEED, pool_config.key().as_ref(), token_a_mint.key().as_ref()],
        bump,
        token::mint = token_a_mint,
        token::authority = pool_authority,
        token::token_program = token_program,
    )]
    pub token_a_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        init_if_needed,
        payer = creator,
        seeds = [VAULT_SEED, pool_config.key().as_ref(), token_b_mint.key().as_ref()],
        bump,
        token::mint = token_b_mint,
        token::authority = pool_authority,
        token::token_program = token_program,
    )]
    pub token_b_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// CHECK: PDA mint authority of share_mint, holds no data
    #[account(
        seeds = [SHARE_MINT_AUTHORITY_SEED, pool_config.key().as_ref()],
        bump,
    )]
    pub share_mint_authority: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = creator,
        seeds = [SHARE_MINT_SEED, pool_config.key().as_ref()],
        bump,
        mint::decimals = SHARE_MINT_DECIMALS,
        mint::authority = share_mint_authority,
        mint::token_program = token_program,
    )]
    pub share_mint: Box<InterfaceAccount<'info, Mint>>,

    /// SPL Token or Token-2022; both pool mints and the share mint live under it
    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}
