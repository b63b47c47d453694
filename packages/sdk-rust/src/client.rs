//! [`LiquidityPoolClient`]: the main entry point for integrations.

use std::time::{SystemTime, UNIX_EPOCH};

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    instruction::Instruction,
    pubkey,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    instructions::{
        deposit_ix, derive_ata, derive_pool_authority, derive_pool_config,
        derive_price_feed_account, derive_share_mint, derive_vault, initialize_pool_ix,
    },
    math::{balanced_amount_b, quote_deposit, share_floor},
    state::{
        parse_mint, parse_pool_config, parse_price_update, parse_token_amount, PoolConfigState,
        PriceFeedState,
    },
    types::{
        CreatePoolParams, CreatePoolResult, DepositParams, DepositPreview, DepositResult, PoolInfo,
    },
};

// ─── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_PROGRAM_ID: Pubkey = pubkey!("D84sXEooUu4FJ2EqdULee5HoELxb6Nfs1hiiLS6N73yp");
const DEVNET_RPC:  &str = "https://api.devnet.solana.com";
const MAINNET_RPC: &str = "https://api.mainnet-beta.solana.com";

// ─── Client ───────────────────────────────────────────────────────────────────

/// Async liquidity pool client for Solana.
///
/// ```rust,no_run
/// # use liquidity_pool_sdk::LiquidityPoolClient;
/// # use solana_sdk::pubkey::Pubkey;
/// # use std::str::FromStr;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = LiquidityPoolClient::devnet();
/// let sol  = Pubkey::from_str("So11111111111111111111111111111111111111112")?;
/// let usdc = Pubkey::from_str("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v")?;
/// let info = client.pool_info(sol, usdc).await?;
/// println!("pool value: ${}", info.total_pool_value as f64 / 1e6);
/// # Ok(())
/// # }
/// ```
pub struct LiquidityPoolClient {
    rpc_url:    String,
    program_id: Pubkey,
}

/// A pool located on-chain, with the caller's mint order mapped onto it.
struct FoundPool {
    address: Pubkey,
    state:   PoolConfigState,
    /// `true` when the caller's `mint_a` is the pool's `token_a_mint`
    same_order: bool,
}

/// Everything needed to quote or submit a deposit, in pool ordering.
struct DepositContext {
    pool:          FoundPool,
    /// Owner of both pool mints and the share mint
    token_program: Pubkey,
    share_supply:  u64,
    decimals_a:   u8,
    decimals_b:   u8,
    feed_a_addr:  Pubkey,
    feed_b_addr:  Pubkey,
    feed_a:       PriceFeedState,
    feed_b:       PriceFeedState,
    amount_a:     u64,
    amount_b:     u64,
}

impl LiquidityPoolClient {
    /// Create a client pointing at any RPC endpoint.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url:    rpc_url.into(),
            program_id: DEFAULT_PROGRAM_ID,
        }
    }

    /// Pre-configured client for Solana devnet.
    pub fn devnet() -> Self {
        Self::new(DEVNET_RPC)
    }

    /// Pre-configured client for Solana mainnet-beta.
    pub fn mainnet() -> Self {
        Self::new(MAINNET_RPC)
    }

    /// Override the program ID (useful for locally deployed programs in tests).
    pub fn with_program_id(mut self, program_id: Pubkey) -> Self {
        self.program_id = program_id;
        self
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    // ── Write operations ──────────────────────────────────────────────────────

    /// Create the pool for a mint pair, pinning its two price feeds.
    pub async fn create_pool(
        &self,
        payer:  &Keypair,
        params: CreatePoolParams,
    ) -> Result<CreatePoolResult> {
        if params.mint_a == params.mint_b {
            return Err(Error::InvalidArgument("pool mints must differ".into()));
        }
        let rpc = self.rpc();

        // Both pool mints and the share mint live under mint A's program.
        let token_program = rpc.get_account(&params.mint_a).await?.owner;
        let mint_b_program = rpc.get_account(&params.mint_b).await?.owner;
        if mint_b_program != token_program {
            return Err(Error::InvalidArgument(format!(
                "mints belong to different token programs ({token_program}, {mint_b_program})"
            )));
        }

        let (pool, _)           = derive_pool_config(&params.mint_a, &params.mint_b, &self.program_id);
        let (pool_authority, _) = derive_pool_authority(&pool, &self.program_id);
        let (vault_a, _)        = derive_vault(&pool, &params.mint_a, &self.program_id);
        let (vault_b, _)        = derive_vault(&pool, &params.mint_b, &self.program_id);
        let (share_mint, _)     = derive_share_mint(&pool, &self.program_id);

        let ix = initialize_pool_ix(
            &self.program_id,
            &payer.pubkey(),
            &params.mint_a,
            &params.mint_b,
            &token_program,
            &params.params,
        );
        info!(%pool, mint_a = %params.mint_a, mint_b = %params.mint_b, "creating pool");
        let sig = self.sign_and_send(&rpc, &[ix], payer).await?;

        Ok(CreatePoolResult {
            signature: sig.to_string(),
            pool,
            pool_authority,
            vault_a,
            vault_b,
            share_mint,
            mint_a: params.mint_a,
            mint_b: params.mint_b,
            params: params.params,
        })
    }

    /// Deposit both assets and receive pool shares.
    ///
    /// The pool is auto-discovered for the mint pair (both orderings are
    /// tried). If `params.amount_b` is `None` the SDK reads both oracle
    /// prices and computes the matching amount. The quote is computed
    /// locally and `min_shares_out` is derived from `max_slippage_bps`,
    /// raised to `params.min_shares_out` when that is stricter. A quote below
    /// `params.min_shares_out` returns [`Error::SlippageExceeded`] unsent.
    pub async fn deposit(&self, payer: &Keypair, params: DepositParams) -> Result<DepositResult> {
        let rpc = self.rpc();
        let ctx = self.deposit_context(&rpc, &params).await?;
        let quote = quote_ctx(&ctx)?;
        let min_shares_out =
            share_floor(quote.shares_out, params.max_slippage_bps, params.min_shares_out)?;

        let owner = payer.pubkey();
        let state = &ctx.pool.state;
        let ix = deposit_ix(
            &self.program_id,
            &owner,
            &ctx.pool.address,
            state,
            &ctx.token_program,
            &derive_ata(&owner, &state.token_a_mint, &ctx.token_program),
            &derive_ata(&owner, &state.token_b_mint, &ctx.token_program),
            &ctx.feed_a_addr,
            &ctx.feed_b_addr,
            ctx.amount_a,
            ctx.amount_b,
            min_shares_out,
        );
        info!(
            pool = %ctx.pool.address,
            amount_a = ctx.amount_a,
            amount_b = ctx.amount_b,
            expected_shares = quote.shares_out,
            min_shares_out,
            "depositing"
        );
        let sig = self.sign_and_send(&rpc, &[ix], payer).await?;

        Ok(DepositResult {
            signature:       sig.to_string(),
            pool:            ctx.pool.address,
            share_account:   derive_ata(&owner, &state.share_mint, &ctx.token_program),
            amount_a:        ctx.amount_a,
            amount_b:        ctx.amount_b,
            expected_shares: quote.shares_out,
            min_shares_out,
        })
    }

    // ── Read operations ───────────────────────────────────────────────────────

    /// Quote a deposit without submitting a transaction.
    pub async fn preview_deposit(&self, params: DepositParams) -> Result<DepositPreview> {
        let rpc = self.rpc();
        let ctx = self.deposit_context(&rpc, &params).await?;
        let quote = quote_ctx(&ctx)?;
        let now = unix_now();

        Ok(DepositPreview {
            pool:               ctx.pool.address,
            amount_a:           ctx.amount_a,
            amount_b:           ctx.amount_b,
            value_a:            quote.value_a,
            value_b:            quote.value_b,
            contribution_value: quote.contribution_value,
            shares_out:         quote.shares_out,
            share_supply:       ctx.share_supply,
            total_pool_value:   ctx.pool.state.total_pool_value,
            price_a:            ctx.feed_a.ui_price(),
            price_b:            ctx.feed_b.ui_price(),
            // a publish time ahead of the local clock reads as fresh
            price_age_a_secs:   (now - ctx.feed_a.publish_time).max(0),
            price_age_b_secs:   (now - ctx.feed_b.publish_time).max(0),
        })
    }

    /// Fetch pool ledger plus live vault balances and share supply.
    pub async fn pool_info(&self, mint_a: Pubkey, mint_b: Pubkey) -> Result<PoolInfo> {
        let rpc = self.rpc();
        let found = self.find_pool_inner(&rpc, &mint_a, &mint_b).await?;
        let s = found.state;

        let reserve_a = parse_token_amount(&rpc.get_account_data(&s.token_a_vault).await?)?;
        let reserve_b = parse_token_amount(&rpc.get_account_data(&s.token_b_vault).await?)?;
        let share_supply = parse_mint(&rpc.get_account_data(&s.share_mint).await?)?.supply;

        let value_per_share = if share_supply == 0 {
            0.0
        } else {
            s.total_pool_value as f64 / share_supply as f64
        };

        Ok(PoolInfo {
            pool:                found.address,
            creator:             s.creator,
            mint_a:              s.token_a_mint,
            mint_b:              s.token_b_mint,
            vault_a:             s.token_a_vault,
            vault_b:             s.token_b_vault,
            share_mint:          s.share_mint,
            price_feed_id_a:     s.price_feed_id_a,
            price_feed_id_b:     s.price_feed_id_b,
            reserve_a,
            reserve_b,
            token_a_deposits:    s.token_a_deposits,
            token_b_deposits:    s.token_b_deposits,
            total_pool_value:    s.total_pool_value,
            share_supply,
            value_per_share,
            fee_rate_bps:        s.fee_rate_bps,
            ratio_tolerance_bps: s.ratio_tolerance_bps,
            max_confidence_bps:  s.max_confidence_bps,
            max_price_age_secs:  s.max_price_age_secs,
            created_at:          s.created_at,
        })
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn rpc(&self) -> RpcClient {
        RpcClient::new_with_commitment(self.rpc_url.clone(), CommitmentConfig::confirmed())
    }

    async fn sign_and_send(
        &self,
        rpc:          &RpcClient,
        instructions: &[Instruction],
        payer:        &Keypair,
    ) -> Result<Signature> {
        let blockhash = rpc.get_latest_blockhash().await?;
        let tx = Transaction::new_signed_with_payer(
            instructions,
            Some(&payer.pubkey()),
            &[payer],
            blockhash,
        );
        let sig = rpc.send_and_confirm_transaction(&tx).await?;
        debug!(%sig, "transaction confirmed");
        Ok(sig)
    }

    /// Try both PDA orderings for a mint pair.
    async fn find_pool_inner(
        &self,
        rpc:    &RpcClient,
        mint_a: &Pubkey,
        mint_b: &Pubkey,
    ) -> Result<FoundPool> {
        for (first, second, same_order) in [(mint_a, mint_b, true), (mint_b, mint_a, false)] {
            let (address, _) = derive_pool_config(first, second, &self.program_id);
            if let Ok(data) = rpc.get_account_data(&address).await {
                if let Ok(state) = parse_pool_config(&data) {
                    debug!(%address, same_order, "pool found");
                    return Ok(FoundPool { address, state, same_order });
                }
            }
        }
        Err(Error::PoolNotFound(*mint_a, *mint_b))
    }

    /// Resolve pool, mints and feeds; map caller amounts into pool ordering.
    async fn deposit_context(&self, rpc: &RpcClient, params: &DepositParams) -> Result<DepositContext> {
        let pool = self.find_pool_inner(rpc, &params.mint_a, &params.mint_b).await?;
        let state = &pool.state;

        // Feeds named by the caller follow the caller's ordering.
        let (caller_feed_a, caller_feed_b) = if pool.same_order {
            (params.price_feed_a, params.price_feed_b)
        } else {
            (params.price_feed_b, params.price_feed_a)
        };
        let feed_a_addr =
            caller_feed_a.unwrap_or_else(|| derive_price_feed_account(&state.price_feed_id_a, 0));
        let feed_b_addr =
            caller_feed_b.unwrap_or_else(|| derive_price_feed_account(&state.price_feed_id_b, 0));

        let keys = [state.token_a_mint, state.token_b_mint, state.share_mint, feed_a_addr, feed_b_addr];
        let accounts = rpc.get_multiple_accounts(&keys).await?;
        let token_program = account_owner(&accounts, &keys, 0)?;
        if account_owner(&accounts, &keys, 1)? != token_program {
            return Err(Error::InvalidArgument(format!(
                "pool mints belong to different token programs ({}, {})",
                state.token_a_mint, state.token_b_mint
            )));
        }
        let decimals_a   = parse_mint(account_data(&accounts, &keys, 0)?)?.decimals;
        let decimals_b   = parse_mint(account_data(&accounts, &keys, 1)?)?.decimals;
        let share_supply = parse_mint(account_data(&accounts, &keys, 2)?)?.supply;
        let feed_a       = parse_price_update(account_data(&accounts, &keys, 3)?)?;
        let feed_b       = parse_price_update(account_data(&accounts, &keys, 4)?)?;

        let (amount_a, amount_b) = match (pool.same_order, params.amount_b) {
            (true, Some(b))  => (params.amount_a, b),
            (false, Some(b)) => (b, params.amount_a),
            (true, None)  => {
                let b = balanced_amount_b(params.amount_a, &feed_a, decimals_a, &feed_b, decimals_b)?;
                (params.amount_a, b)
            }
            (false, None) => {
                // caller's mint_a is the pool's token B
                let a = balanced_amount_b(params.amount_a, &feed_b, decimals_b, &feed_a, decimals_a)?;
                (a, params.amount_a)
            }
        };

        Ok(DepositContext {
            pool,
            token_program,
            share_supply,
            decimals_a,
            decimals_b,
            feed_a_addr,
            feed_b_addr,
            feed_a,
            feed_b,
            amount_a,
            amount_b,
        })
    }
}

// ─── Utilities ────────────────────────────────────────────────────────────────

fn quote_ctx(ctx: &DepositContext) -> Result<crate::math::Quote> {
    quote_deposit(
        &ctx.pool.state,
        ctx.share_supply,
        ctx.amount_a,
        &ctx.feed_a,
        ctx.decimals_a,
        ctx.amount_b,
        &ctx.feed_b,
        ctx.decimals_b,
    )
}

fn account_data<'a>(accounts: &'a [Option<Account>], keys: &[Pubkey], i: usize) -> Result<&'a [u8]> {
    accounts
        .get(i)
        .and_then(|a| a.as_ref())
        .map(|a| a.data.as_slice())
        .ok_or_else(|| Error::InvalidArgument(format!("account {} not found", keys[i])))
}

fn account_owner(accounts: &[Option<Account>], keys: &[Pubkey], i: usize) -> Result<Pubkey> {
    accounts
        .get(i)
        .and_then(|a| a.as_ref())
        .map(|a| a.owner)
        .ok_or_else(|| Error::InvalidArgument(format!("account {} not found", keys[i])))
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
