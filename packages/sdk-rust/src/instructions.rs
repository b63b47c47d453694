//! Low-level Anchor instruction builders.
//!
//! Each function constructs a [`solana_sdk::instruction::Instruction`] ready
//! for signing and submission.  Account order mirrors the Anchor
//! `#[derive(Accounts)]` structs in the on-chain program exactly.
//!
//! Anchor instruction discriminators: `sha256("global:{name}")[..8]`.
//! Anchor account discriminators:    `sha256("account:{TypeName}")[..8]`.

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey,
    pubkey::Pubkey,
    system_program, sysvar,
};

use crate::{state::PoolConfigState, types::PoolParams};

// ─── Well-known program IDs ───────────────────────────────────────────────────

pub const SPL_TOKEN_ID:         Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
pub const TOKEN_2022_ID:        Pubkey = pubkey!("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");
pub const ATA_PROGRAM_ID:       Pubkey = pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");
/// Program whose PDAs are the Pyth sponsored price feed addresses. The
/// accounts themselves are owned by the Pyth receiver program.
pub const PYTH_PUSH_ORACLE_ID:  Pubkey = pubkey!("pythWSnswVUd12oZpeFP8e9CVaEqJg25g1Vtc2biRsT");

// ─── PDA seeds (mirrors programs/liquidity-pool/src/constants.rs) ────────────

pub const POOL_CONFIG_SEED:          &[u8] = b"pool_config";
pub const POOL_AUTHORITY_SEED:       &[u8] = b"pool_authority";
pub const VAULT_SEED:                &[u8] = b"vault";
pub const SHARE_MINT_SEED:           &[u8] = b"share_mint";
pub const SHARE_MINT_AUTHORITY_SEED: &[u8] = b"share_mint_authority";

// ─── PDA derivation helpers ───────────────────────────────────────────────────

/// Derive the pool config PDA for the given mint pair.
pub fn derive_pool_config(mint_a: &Pubkey, mint_b: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[POOL_CONFIG_SEED, mint_a.as_ref(), mint_b.as_ref()],
        program_id,
    )
}

/// Derive the pool-authority PDA that owns both vaults.
pub fn derive_pool_authority(pool: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[POOL_AUTHORITY_SEED, pool.as_ref()], program_id)
}

/// Derive the vault PDA holding `mint` for a pool.
pub fn derive_vault(pool: &Pubkey, mint: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_SEED, pool.as_ref(), mint.as_ref()], program_id)
}

pub fn derive_share_mint(pool: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[SHARE_MINT_SEED, pool.as_ref()], program_id)
}

pub fn derive_share_mint_authority(pool: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[SHARE_MINT_AUTHORITY_SEED, pool.as_ref()], program_id)
}

/// Derive the Associated Token Account for a wallet + mint under
/// `token_program` (SPL Token or Token-2022).
pub fn derive_ata(wallet: &Pubkey, mint: &Pubkey, token_program: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[wallet.as_ref(), token_program.as_ref(), mint.as_ref()],
        &ATA_PROGRAM_ID,
    )
    .0
}

/// Pyth sponsored feed account for `feed_id` on `shard_id` (0 for the default shard).
pub fn derive_price_feed_account(feed_id: &[u8; 32], shard_id: u16) -> Pubkey {
    Pubkey::find_program_address(
        &[&shard_id.to_le_bytes(), feed_id.as_ref()],
        &PYTH_PUSH_ORACLE_ID,
    )
    .0
}

// ─── Discriminator ────────────────────────────────────────────────────────────

pub(crate) fn disc(name: &str) -> [u8; 8] {
    let preimage = format!("global:{name}");
    let h = solana_sdk::hash::hash(preimage.as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&h.to_bytes()[..8]);
    out
}

// ─── initialize_pool ─────────────────────────────────────────────────────────

/// Build the `initialize_pool` instruction.
///
/// Every pool-owned account is a PDA, so the creator is the only signer.
/// `token_program` owns both mints; the share mint is created under it too.
pub fn initialize_pool_ix(
    program_id:    &Pubkey,
    creator:       &Pubkey,
    mint_a:        &Pubkey,
    mint_b:        &Pubkey,
    token_program: &Pubkey,
    params:        &PoolParams,
) -> Instruction {
    let (pool, _)                 = derive_pool_config(mint_a, mint_b, program_id);
    let (pool_authority, _)       = derive_pool_authority(&pool, program_id);
    let (vault_a, _)              = derive_vault(&pool, mint_a, program_id);
    let (vault_b, _)              = derive_vault(&pool, mint_b, program_id);
    let (share_mint_authority, _) = derive_share_mint_authority(&pool, program_id);
    let (share_mint, _)           = derive_share_mint(&pool, program_id);

    let mut data = disc("initialize_pool").to_vec();
    data.extend_from_slice(&params.encode());

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*creator,                true),   // mut + signer
            AccountMeta::new_readonly(*mint_a,         false),
            AccountMeta::new_readonly(*mint_b,         false),
            AccountMeta::new(pool,                     false),  // mut PDA (init)
            AccountMeta::new_readonly(pool_authority,  false),
            AccountMeta::new(vault_a,                  false),  // mut PDA (init)
            AccountMeta::new(vault_b,                  false),  // mut PDA (init)
            AccountMeta::new_readonly(share_mint_authority, false),
            AccountMeta::new(share_mint,               false),  // mut PDA (init)
            AccountMeta::new_readonly(*token_program,  false),
            AccountMeta::new_readonly(system_program::ID, false),
            AccountMeta::new_readonly(sysvar::rent::ID, false),
        ],
        data,
    }
}

// ─── deposit ──────────────────────────────────────────────────────────────────

/// Build the `deposit` instruction.
///
/// `depositor_token_a` / `depositor_token_b` must hold `pool.token_a_mint` /
/// `pool.token_b_mint` and be owned by `depositor`. The depositor's share ATA
/// is created by the program if missing. Feed ids are taken from the pool.
#[allow(clippy::too_many_arguments)]
pub fn deposit_ix(
    program_id:        &Pubkey,
    depositor:         &Pubkey,
    pool:              &Pubkey,
    state:             &PoolConfigState,
    token_program:     &Pubkey,
    depositor_token_a: &Pubkey,
    depositor_token_b: &Pubkey,
    price_feed_a:      &Pubkey,
    price_feed_b:      &Pubkey,
    amount_a:          u64,
    amount_b:          u64,
    min_shares_out:    u64,
) -> Instruction {
    let (pool_authority, _)       = derive_pool_authority(pool, program_id);
    let (share_mint_authority, _) = derive_share_mint_authority(pool, program_id);
    let share_account             = derive_ata(depositor, &state.share_mint, token_program);

    let mut data = disc("deposit").to_vec();
    data.extend_from_slice(&amount_a.to_le_bytes());
    data.extend_from_slice(&amount_b.to_le_bytes());
    data.extend_from_slice(&min_shares_out.to_le_bytes());
    data.extend_from_slice(&state.price_feed_id_a);
    data.extend_from_slice(&state.price_feed_id_b);

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*depositor,                 true),   // mut + signer
            AccountMeta::new(*pool,                      false),  // mut (ledger)
            AccountMeta::new_readonly(state.token_a_mint, false),
            AccountMeta::new_readonly(state.token_b_mint, false),
            AccountMeta::new_readonly(pool_authority,     false),
            AccountMeta::new(state.token_a_vault,         false),  // mut
            AccountMeta::new(state.token_b_vault,         false),  // mut
            AccountMeta::new_readonly(share_mint_authority, false),
            AccountMeta::new(state.share_mint,            false),  // mut (supply)
            AccountMeta::new(*depositor_token_a,          false),  // mut
            AccountMeta::new(*depositor_token_b,          false),  // mut
            AccountMeta::new(share_account,               false),  // mut ATA (init_if_needed)
            AccountMeta::new_readonly(*price_feed_a,      false),
            AccountMeta::new_readonly(*price_feed_b,      false),
            AccountMeta::new_readonly(*token_program,     false),
            AccountMeta::new_readonly(ATA_PROGRAM_ID,     false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data,
    }
}
