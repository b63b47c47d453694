//! LiteSVM harness: deploys the built program, creates mints, funded
//! depositors and Pyth price accounts, and sends SDK-built instructions.

#![allow(dead_code)]

use std::path::PathBuf;

use litesvm::{types::TransactionResult, LiteSVM};
use litesvm_token::{CreateAssociatedTokenAccount, CreateMint, MintTo};
use liquidity_pool::error::PoolError;
use liquidity_pool_sdk::{
    client::DEFAULT_PROGRAM_ID,
    instructions::{deposit_ix, derive_ata, derive_pool_config, initialize_pool_ix},
    state::{
        parse_mint, parse_pool_config, parse_token_amount, PoolConfigState,
        PRICE_UPDATE_V2_DISCRIMINATOR,
    },
    PoolParams,
};
use solana_sdk::{
    account::Account,
    clock::Clock,
    instruction::{Instruction, InstructionError},
    pubkey,
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
    transaction::{Transaction, TransactionError},
};

pub const NOW: i64 = 1_700_000_000;
pub const FEED_A: [u8; 32] = [0xa1; 32];
pub const FEED_B: [u8; 32] = [0xb2; 32];
pub const DECIMALS: u8 = 1;

const PYTH_RECEIVER_ID: Pubkey = pubkey!("rec5EKMGg6MxZYaMdyBfgwp4d5rB9T1VQH5pJv5LtFJ");

pub fn program_bytes() -> Option<Vec<u8>> {
    let mut so_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    so_path.push("../../target/deploy/liquidity_pool.so");
    std::fs::read(so_path).ok()
}

pub fn send_tx(svm: &mut LiteSVM, ixs: &[Instruction], signer: &Keypair) -> TransactionResult {
    let tx = Transaction::new_signed_with_payer(
        ixs,
        Some(&signer.pubkey()),
        &[signer],
        svm.latest_blockhash(),
    );
    let res = svm.send_transaction(tx);

    if let Err(failed) = &res {
        println!("error:\t{:?}", failed.err);
        for log in &failed.meta.logs {
            println!("{log}");
        }
    }
    res
}

pub fn assert_pool_error(res: TransactionResult, expected: PoolError) {
    let failed = res.expect_err("transaction should fail");
    assert_eq!(
        failed.err,
        TransactionError::InstructionError(0, InstructionError::Custom(u32::from(expected)))
    );
}

/// `PriceUpdateV2` with full verification, conf at 0.1% of price.
pub fn price_update(feed_id: [u8; 32], whole_usd: i64, publish_time: i64) -> Vec<u8> {
    let price = whole_usd * 100_000_000;
    let mut data = PRICE_UPDATE_V2_DISCRIMINATOR.to_vec();
    data.extend_from_slice(&[7; 32]); // write authority
    data.push(1); // Full
    data.extend_from_slice(&feed_id);
    data.extend_from_slice(&price.to_le_bytes());
    data.extend_from_slice(&(price as u64 / 1_000).to_le_bytes());
    data.extend_from_slice(&(-8i32).to_le_bytes());
    data.extend_from_slice(&publish_time.to_le_bytes());
    data.extend_from_slice(&publish_time.to_le_bytes()); // prev_publish_time
    data.extend_from_slice(&price.to_le_bytes()); // ema_price
    data.extend_from_slice(&0u64.to_le_bytes()); // ema_conf
    data.extend_from_slice(&1u64.to_le_bytes()); // posted_slot
    data
}

/// One pool under test: mint A priced at $20, mint B at $1, both with
/// one decimal, cluster clock pinned to `NOW`.
pub struct Harness {
    pub svm:           LiteSVM,
    pub payer:         Keypair,
    pub token_program: Pubkey,
    pub mint_a:        Pubkey,
    pub mint_b:        Pubkey,
    pub feed_a:        Pubkey,
    pub feed_b:        Pubkey,
}

impl Harness {
    /// `None` when the program has not been built with `anchor build`.
    pub fn new(token_program: Pubkey) -> Option<Self> {
        let Some(bytes) = program_bytes() else {
            eprintln!("skipping: target/deploy/liquidity_pool.so not found, run `anchor build` first");
            return None;
        };
        let mut svm = LiteSVM::new();
        let _ = svm.add_program(DEFAULT_PROGRAM_ID, &bytes);

        let mut clock: Clock = svm.get_sysvar();
        clock.unix_timestamp = NOW;
        svm.set_sysvar(&clock);

        let payer = Keypair::new();
        svm.airdrop(&payer.pubkey(), 100_000_000_000).unwrap();

        let mut h = Self {
            svm,
            payer,
            token_program,
            mint_a: Pubkey::default(),
            mint_b: Pubkey::default(),
            feed_a: Pubkey::new_unique(),
            feed_b: Pubkey::new_unique(),
        };
        h.mint_a = h.create_mint(DECIMALS);
        h.mint_b = h.create_mint(DECIMALS);
        h.set_price(h.feed_a, FEED_A, 20, NOW - 5);
        h.set_price(h.feed_b, FEED_B, 1, NOW - 5);
        Some(h)
    }

    pub fn create_mint(&mut self, decimals: u8) -> Pubkey {
        CreateMint::new(&mut self.svm, &self.payer)
            .decimals(decimals)
            .token_program_id(&self.token_program)
            .send()
            .unwrap()
    }

    pub fn set_price(&mut self, address: Pubkey, feed_id: [u8; 32], whole_usd: i64, publish_time: i64) {
        let account = Account {
            lamports:   1_000_000_000,
            data:       price_update(feed_id, whole_usd, publish_time),
            owner:      PYTH_RECEIVER_ID,
            executable: false,
            rent_epoch: 0,
        };
        self.svm.set_account(address, account).unwrap();
    }

    pub fn pool(&self) -> Pubkey {
        derive_pool_config(&self.mint_a, &self.mint_b, &DEFAULT_PROGRAM_ID).0
    }

    pub fn pool_state(&self) -> PoolConfigState {
        let account = self.svm.get_account(&self.pool()).expect("pool exists");
        parse_pool_config(&account.data).unwrap()
    }

    pub fn initialize_ix(&self, fee_rate_bps: u16) -> Instruction {
        initialize_pool_ix(
            &DEFAULT_PROGRAM_ID,
            &self.payer.pubkey(),
            &self.mint_a,
            &self.mint_b,
            &self.token_program,
            &PoolParams::new(fee_rate_bps, FEED_A, FEED_B),
        )
    }

    pub fn initialize(&mut self, fee_rate_bps: u16) -> TransactionResult {
        let ix = self.initialize_ix(fee_rate_bps);
        send_tx(&mut self.svm, &[ix], &self.payer)
    }

    /// Token account of `owner` for `mint`, created if missing, topped up by `amount`.
    pub fn fund(&mut self, owner: &Pubkey, mint: &Pubkey, amount: u64) -> Pubkey {
        let ata = derive_ata(owner, mint, &self.token_program);
        if self.svm.get_account(&ata).is_none() {
            CreateAssociatedTokenAccount::new(&mut self.svm, &self.payer, mint)
                .owner(owner)
                .token_program_id(&self.token_program)
                .send()
                .unwrap();
        }
        MintTo::new(&mut self.svm, &self.payer, mint, &ata, amount)
            .token_program_id(&self.token_program)
            .send()
            .unwrap();
        ata
    }

    /// Fresh keypair holding SOL plus `amount_a` / `amount_b` of the pool mints.
    pub fn depositor(&mut self, amount_a: u64, amount_b: u64) -> Keypair {
        let depositor = Keypair::new();
        self.svm.airdrop(&depositor.pubkey(), 10_000_000_000).unwrap();
        let (mint_a, mint_b) = (self.mint_a, self.mint_b);
        self.fund(&depositor.pubkey(), &mint_a, amount_a);
        self.fund(&depositor.pubkey(), &mint_b, amount_b);
        depositor
    }

    pub fn deposit_ix(
        &self,
        depositor:      &Keypair,
        amount_a:       u64,
        amount_b:       u64,
        min_shares_out: u64,
    ) -> Instruction {
        let owner = depositor.pubkey();
        deposit_ix(
            &DEFAULT_PROGRAM_ID,
            &owner,
            &self.pool(),
            &self.pool_state(),
            &self.token_program,
            &derive_ata(&owner, &self.mint_a, &self.token_program),
            &derive_ata(&owner, &self.mint_b, &self.token_program),
            &self.feed_a,
            &self.feed_b,
            amount_a,
            amount_b,
            min_shares_out,
        )
    }

    pub fn deposit(
        &mut self,
        depositor:      &Keypair,
        amount_a:       u64,
        amount_b:       u64,
        min_shares_out: u64,
    ) -> TransactionResult {
        let ix = self.deposit_ix(depositor, amount_a, amount_b, min_shares_out);
        send_tx(&mut self.svm, &[ix], depositor)
    }

    pub fn token_balance(&self, account: &Pubkey) -> u64 {
        self.svm
            .get_account(account)
            .map_or(0, |a| parse_token_amount(&a.data).unwrap())
    }

    pub fn share_balance(&self, owner: &Pubkey) -> u64 {
        let share_mint = self.pool_state().share_mint;
        self.token_balance(&derive_ata(owner, &share_mint, &self.token_program))
    }

    pub fn share_supply(&self) -> u64 {
        let share_mint = self.pool_state().share_mint;
        let account = self.svm.get_account(&share_mint).expect("share mint exists");
        parse_mint(&account.data).unwrap().supply
    }

    pub fn vault_balances(&self) -> (u64, u64) {
        let state = self.pool_state();
        (
            self.token_balance(&state.token_a_vault),
            self.token_balance(&state.token_b_vault),
        )
    }
}
