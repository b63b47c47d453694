use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{self, Mint, MintTo, TokenAccount, TokenInterface, TransferChecked},
};
use crate::{
    constants::*,
    error::PoolError,
    events::LiquidityDeposited,
    instructions::share_math::{quote_deposit, AssetLeg, PoolSnapshot},
    oracle,
    state::PoolConfig,
};

// ─── Handler ──────────────────────────────────────────────────────────────
/// Deposit both assets at the oracle ratio and receive pool shares.
///
/// Every check (feed identity, price freshness, ratio band, share floor)
/// runs before the first transfer. The first deposit into an empty pool
/// sets the share exchange rate.
pub fn handler(
    ctx: Context<Deposit>,
    amount_a: u64,
    amount_b: u64,
    min_shares_out: u64,
    price_feed_id_a: [u8; 32],
    price_feed_id_b: [u8; 32],
) -> Result<()> {
    require!(amount_a > 0 && amount_b > 0, PoolError::ZeroAmount);

    // Read pool state into locals before any mutable borrows
    let pool = &ctx.accounts.pool_config;
    pool.check_feed_ids(&price_feed_id_a, &price_feed_id_b)?;
    let policy = pool.oracle_policy();
    let snapshot = PoolSnapshot::capture(pool, ctx.accounts.share_mint.supply);
    let pool_key = pool.key();
    let share_mint_authority_bump = pool.share_mint_authority_bump;
    let decimals_a = ctx.accounts.token_a_mint.decimals;
    let decimals_b = ctx.accounts.token_b_mint.decimals;

    let now = Clock::get()?.unix_timestamp;
    let price_a = oracle::read_price(&ctx.accounts.price_feed_a, &price_feed_id_a, now, &policy)?;
    let price_b = oracle::read_price(&ctx.accounts.price_feed_b, &price_feed_id_b, now, &policy)?;

    let quote = quote_deposit(
        &AssetLeg { amount: amount_a, price: price_a, mint_decimals: decimals_a },
        &AssetLeg { amount: amount_b, price: price_b, mint_decimals: decimals_b },
        &snapshot,
        min_shares_out,
    )?;

    // Transfer tokens from depositor into vaults
    token_interface::transfer_checked(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            TransferChecked {
                from: ctx.accounts.depositor_token_a.to_account_info(),
                mint: ctx.accounts.token_a_mint.to_account_info(),
                to: ctx.accounts.token_a_vault.to_account_info(),
                authority: ctx.accounts.depositor.to_account_info(),
            },
        ),
        amount_a,
        decimals_a,
    )?;
    token_interface::transfer_checked(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            TransferChecked {
                from: ctx.accounts.depositor_token_b.to_account_info(),
                mint: ctx.accounts.token_b_mint.to_account_info(),
                to: ctx.accounts.token_b_vault.to_account_info(),
                authority: ctx.accounts.depositor.to_account_info(),
            },
        ),
        amount_b,
        decimals_b,
    )?;

    // Mint shares, signed by the share mint authority PDA
    let seeds = &[
        SHARE_MINT_AUTHORITY_SEED,
        pool_key.as_ref(),
        &[share_mint_authority_bump],
    ];
    let signer_seeds = &[&seeds[..]];
    token_interface::mint_to(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            MintTo {
                mint: ctx.accounts.share_mint.to_account_info(),
                to: ctx.accounts.depositor_share_account.to_account_info(),
                authority: ctx.accounts.share_mint_authority.to_account_info(),
            },
            signer_seeds,
        ),
        quote.shares_out,
    )?;

    let pool = &mut ctx.accounts.pool_config;
    pool.record_deposit(amount_a, amount_b, quote.contribution_value)?;

    emit!(LiquidityDeposited {
        pool_config: pool_key,
        depositor: ctx.accounts.depositor.key(),
        amount_a,
        amount_b,
        value_a: quote.value_a,
        value_b: quote.value_b,
        shares_minted: quote.shares_out,
        token_a_deposits: pool.token_a_deposits,
        token_b_deposits: pool.token_b_deposits,
        total_pool_value: pool.total_pool_value,
    });

    msg!(
        "Deposit: a={} b={} value={} shares={} pool_value={}",
        amount_a,
        amount_b,
        quote.contribution_value,
        quote.shares_out,
        pool.total_pool_value
    );
    Ok(())
}

#[derive(Accounts)]
pub struct Deposit<'info> {
    #[account(mut)]
    pub depositor: Signer<'info>,

    #[account(
        mut,
        seeds = [
            POOL_CONFIG_SEED,
            pool_config.token_a_mint.as_ref(),
            pool_config.token_b_mint.as_ref(),
        ],
        bump = pool_config.bump,
    )]
    pub pool_config: Box<Account<'info, PoolConfig>>,

    #[account(
        address = pool_config.token_a_mint @ PoolError::PoolMismatch,
        mint::token_program = token_program,
    )]
    pub token_a_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        address = pool_config.token_b_mint @ PoolError::PoolMismatch,
        mint::token_program = token_program,
    )]
    pub token_b_mint: Box<InterfaceAccount<'info, Mint>>,

    /// CHECK: PDA vault authority
    #[account(
        seeds = [POOL_AUTHORITY_SEED, pool_config.key().as_ref()],
        bump = pool_config.authority_bump,
    )]
    pub pool_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        address = pool_config.token_a_vault @ PoolError::PoolMismatch,
        token::authority = pool_authority,
        token::token_program = token_program,
    )]
    pub token_a_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        address = pool_config.token_b_vault @ PoolError::PoolMismatch,
        token::authority = pool_authority,
        token::token_program = token_program,
    )]
    pub token_b_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// CHECK: PDA mint authority of share_mint
    #[account(
        seeds = [SHARE_MINT_AUTHORITY_SEED, pool_config.key().as_ref()],
        bump = pool_config.share_mint_authority_bump,
    )]
    pub share_mint_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        address = pool_config.share_mint @ PoolError::PoolMismatch,
    )]
    pub share_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        constraint = depositor_token_a.mint == pool_config.token_a_mint @ PoolError::PoolMismatch,
        constraint = depositor_token_a.owner == depositor.key(),
    )]
    pub depositor_token_a: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = depositor_token_b.mint == pool_config.token_b_mint @ PoolError::PoolMismatch,
        constraint = depositor_token_b.owner == depositor.key(),
    )]
    pub depositor_token_b: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        init_if_needed,
        payer = depositor,
        associated_token::mint = share_mint,
        associated_token::authority = depositor,
        associated_token::token_program = token_program,
    )]
    pub depositor_share_account: Box<InterfaceAccount<'info, TokenAccount>>,

    /// CHECK: owner, layout and feed id are verified in oracle::read_price
    pub price_feed_a: UncheckedAccount<'info>,

    /// CHECK: owner, layout and feed id are verified in oracle::read_price
    pub price_feed_b: UncheckedAccount<'info>,

    pub token_program: Interface<'info, TokenInterface>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}
