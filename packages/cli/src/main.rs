use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use liquidity_pool_sdk::{
    feed_id_from_hex, CreatePoolParams, DepositParams, LiquidityPoolClient, PoolParams,
    DEFAULT_MAX_CONFIDENCE_BPS, DEFAULT_MAX_PRICE_AGE_SECS, DEFAULT_RATIO_TOLERANCE_BPS,
};
use serde_json::json;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair},
};
use std::str::FromStr;
use tracing::debug;
use tracing_subscriber::EnvFilter;

// ─── Token symbol registry (mainnet-beta) ────────────────────────────────────

const KNOWN_TOKENS: &[(&str, &str)] = &[
    ("SOL",  "So11111111111111111111111111111111111111112"),
    ("USDC", "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"),
    ("USDT", "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB"),
];

/// Resolve a symbol (SOL, USDC, USDT) or raw base-58 mint address to a Pubkey.
fn resolve_mint(symbol_or_address: &str) -> Result<Pubkey> {
    let upper = symbol_or_address.to_uppercase();
    if let Some((_, addr)) = KNOWN_TOKENS.iter().find(|(sym, _)| upper == *sym) {
        return Ok(Pubkey::from_str(addr)?);
    }
    Pubkey::from_str(symbol_or_address).map_err(|_| {
        anyhow!(
            "Unknown token '{}'. Use a built-in symbol ({}) or a base-58 mint address.",
            symbol_or_address,
            KNOWN_TOKENS.iter().map(|(s, _)| *s).collect::<Vec<_>>().join(", ")
        )
    })
}

/// Split `A-B` into symbols and resolved mints.
fn parse_pair(pair: &str) -> Result<(&str, &str, Pubkey, Pubkey)> {
    let Some((sym_a, sym_b)) = pair.split_once('-').filter(|(a, b)| !a.is_empty() && !b.is_empty())
    else {
        return Err(anyhow!(
            "--pair must be TOKEN_A-TOKEN_B (e.g. SOL-USDC or <mintA>-<mintB>). Got: '{}'",
            pair
        ));
    };
    let mint_a = resolve_mint(sym_a).context("pair: token A")?;
    let mint_b = resolve_mint(sym_b).context("pair: token B")?;
    if mint_a == mint_b {
        return Err(anyhow!("Token A and token B in --pair must be different."));
    }
    Ok((sym_a, sym_b, mint_a, mint_b))
}

/// Expand `~/` to `$HOME/` in keypair paths.
fn expand_home(path: &str) -> String {
    match path.strip_prefix("~/") {
        Some(rest) => format!("{}/{rest}", std::env::var("HOME").unwrap_or_default()),
        None => path.to_string(),
    }
}

fn load_keypair(path: &str) -> Result<Keypair> {
    let expanded = expand_home(path);
    read_keypair_file(&expanded).map_err(|e| {
        anyhow!(
            "Cannot load keypair from '{}': {}\n  \
             Set LP_KEYPAIR or pass --keypair to specify a different path.",
            expanded,
            e
        )
    })
}

fn parse_pubkey_opt(value: Option<&str>, what: &str) -> Result<Option<Pubkey>> {
    value
        .map(|s| Pubkey::from_str(s).with_context(|| format!("{what}: invalid base-58 address '{s}'")))
        .transpose()
}

/// USD e6 → display string.
fn usd(value: u64) -> String {
    format!("${:.6}", value as f64 / 1e6)
}

// ─── Logging ──────────────────────────────────────────────────────────────────

/// Log to stderr so `--json` output on stdout stays parseable. `RUST_LOG`
/// overrides the default `warn` filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// ─── Version banner ───────────────────────────────────────────────────────────

fn print_banner() {
    let ver = env!("CARGO_PKG_VERSION");
    println!();
    println!("  Liquidity Pool  v{ver}  ·  oracle-priced two-asset pool on Solana");
    println!("  {}", "─".repeat(62));
    println!("  Program   {}", liquidity_pool_sdk::client::DEFAULT_PROGRAM_ID);
    println!("  Pricing   Pyth pull oracle, fully verified updates only");
    println!();
}

// ─── CLI definition ───────────────────────────────────────────────────────────

/// Liquidity Pool: oracle-priced two-asset deposits on Solana.
///
/// Every command supports --json for machine-readable output.
/// Global options can also be set via environment variables:
///   LP_RPC_URL     Solana JSON-RPC endpoint
///   LP_KEYPAIR     path to Ed25519 keypair JSON
///   LP_PROGRAM_ID  deployed program address
#[derive(Parser)]
#[command(
    name    = "liquidity-pool",
    version = env!("CARGO_PKG_VERSION"),
    about   = "Oracle-priced two-asset liquidity pool: create pools and deposit at Pyth value.",
    after_help = "\
ENVIRONMENT:
  LP_RPC_URL     Solana JSON-RPC endpoint  [default: https://api.devnet.solana.com]
  LP_KEYPAIR     Path to Ed25519 keypair JSON  [default: ~/.config/solana/id.json]
  LP_PROGRAM_ID  Program address  [default: built-in deployment]
  RUST_LOG       Log filter for stderr diagnostics  [default: warn]

QUICK START:
  liquidity-pool create-pool --pair SOL-USDC --feed-a <HEX> --feed-b <HEX>
  liquidity-pool preview     --pair SOL-USDC --amount 1000000000
  liquidity-pool deposit     --pair SOL-USDC --amount 1000000000
  liquidity-pool pool-info   --pair SOL-USDC"
)]
struct Cli {
    /// Solana JSON-RPC endpoint
    #[arg(
        long,
        global     = true,
        value_name = "URL",
        default_value = "https://api.devnet.solana.com",
        env = "LP_RPC_URL"
    )]
    rpc_url: String,

    /// Path to the signer's Ed25519 keypair JSON file
    #[arg(
        long,
        global     = true,
        value_name = "PATH",
        default_value = "~/.config/solana/id.json",
        env = "LP_KEYPAIR"
    )]
    keypair: String,

    /// Program address, for local or alternate deployments
    #[arg(long, global = true, value_name = "PUBKEY", env = "LP_PROGRAM_ID")]
    program_id: Option<String>,

    /// Output machine-readable JSON instead of human-readable text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the pool for a token pair and pin its two Pyth price feeds
    ///
    /// Vaults, share mint and authorities are PDAs of the pool; no human
    /// key controls them. Creating the same pair twice fails.
    #[command(
        after_help = "\
EXAMPLES:
  # SOL/USDC with SOL/USD and USDC/USD feeds, defaults for the oracle policy
  liquidity-pool create-pool --pair SOL-USDC \\
    --feed-a ef0d8b6fda2ceba41da15d4095d1da392a0d2f8ed0c6c7bc0f4cfac8c280b56d \\
    --feed-b eaa020c61cc479712813461ce153894a96a6c00b21ed0cfc2798d1f9a9e9c94a

  # Tighter ratio band and fresher prices
  liquidity-pool create-pool --pair <mintA>-<mintB> --feed-a <HEX> --feed-b <HEX> \\
    --ratio-tolerance-bps 50 --max-price-age-secs 30

NOTES:
  Feed ids are 32-byte hex, with or without 0x.
  The fee rate is stored for later use; deposits do not charge it."
    )]
    CreatePool {
        /// Token pair, e.g. SOL-USDC or <mintA>-<mintB>
        #[arg(long, value_name = "A-B")]
        pair: String,

        /// Pyth feed id pricing token A in USD
        #[arg(long, value_name = "HEX")]
        feed_a: String,

        /// Pyth feed id pricing token B in USD
        #[arg(long, value_name = "HEX")]
        feed_b: String,

        /// Fee rate in basis points, below 1000
        #[arg(long, value_name = "BPS", default_value_t = 30)]
        fee_bps: u16,

        /// Largest allowed gap between the two legs' values (bps of the larger)
        #[arg(long, value_name = "BPS", default_value_t = DEFAULT_RATIO_TOLERANCE_BPS)]
        ratio_tolerance_bps: u16,

        /// Largest allowed confidence interval (bps of price)
        #[arg(long, value_name = "BPS", default_value_t = DEFAULT_MAX_CONFIDENCE_BPS)]
        max_confidence_bps: u16,

        /// Oldest accepted price publish time, in seconds
        #[arg(long, value_name = "SECS", default_value_t = DEFAULT_MAX_PRICE_AGE_SECS)]
        max_price_age_secs: u32,
    },

    /// Deposit both tokens at oracle value and receive pool shares
    #[command(
        after_help = "\
EXAMPLES:
  # Deposit 1 SOL; the USDC leg is sized from oracle prices
  liquidity-pool deposit --pair SOL-USDC --amount 1000000000

  # Explicit legs, accept at most 1% fewer shares than quoted
  liquidity-pool deposit --pair SOL-USDC --amount 1000000000 --amount-b 150000000 \\
    --max-slippage-bps 100

NOTES:
  Amounts are atomic units of the tokens as written in --pair.
  Both legs must be within the pool's ratio tolerance by value."
    )]
    Deposit {
        #[command(flatten)]
        args: DepositArgs,
    },

    /// Quote a deposit without sending a transaction
    Preview {
        #[command(flatten)]
        args: DepositArgs,
    },

    /// Show pool ledger, vault balances and share value
    PoolInfo {
        /// Token pair, e.g. SOL-USDC
        #[arg(long, value_name = "A-B")]
        pair: String,
    },
}

#[derive(clap::Args)]
struct DepositArgs {
    /// Token pair, e.g. SOL-USDC or <mintA>-<mintB>
    #[arg(long, value_name = "A-B")]
    pair: String,

    /// Amount of the first token in --pair (atomic units)
    #[arg(long, value_name = "AMOUNT")]
    amount: u64,

    /// Amount of the second token; omitted → balanced at oracle prices
    #[arg(long, value_name = "AMOUNT")]
    amount_b: Option<u64>,

    /// Shares may come in this far below the quote (bps); 0 disables the guard
    #[arg(long, value_name = "BPS", default_value_t = 50)]
    max_slippage_bps: u16,

    /// Absolute share minimum; the deposit is not sent if the quote is lower
    #[arg(long, value_name = "SHARES")]
    min_shares: Option<u64>,

    /// Price update account for the first token [default: sponsored feed]
    #[arg(long, value_name = "PUBKEY")]
    feed_account_a: Option<String>,

    /// Price update account for the second token [default: sponsored feed]
    #[arg(long, value_name = "PUBKEY")]
    feed_account_b: Option<String>,
}

impl DepositArgs {
    fn to_params(&self) -> Result<DepositParams> {
        let (_, _, mint_a, mint_b) = parse_pair(&self.pair)?;
        if self.amount == 0 || self.amount_b == Some(0) {
            return Err(anyhow!("--amount and --amount-b must be greater than zero."));
        }
        Ok(DepositParams {
            mint_a,
            mint_b,
            amount_a: self.amount,
            amount_b: self.amount_b,
            max_slippage_bps: self.max_slippage_bps,
            min_shares_out: self.min_shares,
            price_feed_a: parse_pubkey_opt(self.feed_account_a.as_deref(), "--feed-account-a")?,
            price_feed_b: parse_pubkey_opt(self.feed_account_b.as_deref(), "--feed-account-b")?,
        })
    }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args().len() == 1 {
        print_banner();
        Cli::command().print_long_help().ok();
        println!();
        return Ok(());
    }

    init_tracing();
    let cli = Cli::parse();

    let mut client = LiquidityPoolClient::new(cli.rpc_url.clone());
    if let Some(id) = cli.program_id.as_deref() {
        let id = Pubkey::from_str(id).with_context(|| format!("--program-id: invalid address '{id}'"))?;
        client = client.with_program_id(id);
    }
    debug!(rpc = %cli.rpc_url, program = %client.program_id(), "client ready");

    match &cli.command {
        Commands::CreatePool {
            pair,
            feed_a,
            feed_b,
            fee_bps,
            ratio_tolerance_bps,
            max_confidence_bps,
            max_price_age_secs,
        } => {
            let params = PoolParams {
                fee_rate_bps:        *fee_bps,
                price_feed_id_a:     feed_id_from_hex(feed_a).context("--feed-a")?,
                price_feed_id_b:     feed_id_from_hex(feed_b).context("--feed-b")?,
                ratio_tolerance_bps: *ratio_tolerance_bps,
                max_confidence_bps:  *max_confidence_bps,
                max_price_age_secs:  *max_price_age_secs,
            };
            cmd_create_pool(&client, &cli.keypair, pair, params, cli.json).await?;
        }
        Commands::Deposit { args } => {
            cmd_deposit(&client, &cli.keypair, args, cli.json).await?;
        }
        Commands::Preview { args } => {
            cmd_preview(&client, args, cli.json).await?;
        }
        Commands::PoolInfo { pair } => {
            cmd_pool_info(&client, pair, cli.json).await?;
        }
    }

    Ok(())
}

// ─── create-pool ─────────────────────────────────────────────────────────────

async fn cmd_create_pool(
    client: &LiquidityPoolClient,
    keypair_path: &str,
    pair: &str,
    params: PoolParams,
    json_output: bool,
) -> Result<()> {
    let (sym_a, sym_b, mint_a, mint_b) = parse_pair(pair)?;
    let payer = load_keypair(keypair_path)?;

    let result = client
        .create_pool(&payer, CreatePoolParams { mint_a, mint_b, params })
        .await
        .context("create-pool transaction failed")?;

    if json_output {
        println!("{}", json!({
            "status":  "ok",
            "command": "create-pool",
            "pair":    pair,
            "result":  result,
        }));
    } else {
        println!("─── Pool Created ─────────────────────────────────────────────────");
        println!("  Pair             {pair}");
        println!("  Token A          {sym_a}  ({mint_a})");
        println!("  Token B          {sym_b}  ({mint_b})");
        println!("  Pool PDA         {}", result.pool);
        println!("  Pool authority   {}", result.pool_authority);
        println!("  Vault A          {}", result.vault_a);
        println!("  Vault B          {}", result.vault_b);
        println!("  Share mint       {}", result.share_mint);
        println!("  Feed A           {}", hex_id(&params.price_feed_id_a));
        println!("  Feed B           {}", hex_id(&params.price_feed_id_b));
        println!("  Fee rate         {} bps", params.fee_rate_bps);
        println!("  Ratio tolerance  {} bps", params.ratio_tolerance_bps);
        println!("  Max confidence   {} bps", params.max_confidence_bps);
        println!("  Max price age    {} s", params.max_price_age_secs);
        println!("  Transaction      {}", result.signature);
        println!();
        println!("  Pool is empty. Seed it next:");
        println!("    liquidity-pool deposit --pair {pair} --amount <AMT_A>");
    }
    Ok(())
}

fn hex_id(id: &[u8; 32]) -> String {
    hex::encode(id)
}

// ─── deposit ─────────────────────────────────────────────────────────────────

async fn cmd_deposit(
    client: &LiquidityPoolClient,
    keypair_path: &str,
    args: &DepositArgs,
    json_output: bool,
) -> Result<()> {
    let params = args.to_params()?;
    let payer = load_keypair(keypair_path)?;

    let result = client
        .deposit(&payer, params)
        .await
        .context("deposit transaction failed")?;

    if json_output {
        println!("{}", json!({
            "status":  "ok",
            "command": "deposit",
            "pair":    args.pair,
            "result":  result,
        }));
    } else {
        println!("─── Liquidity Deposited ──────────────────────────────────────────");
        println!("  Pair             {}", args.pair);
        println!("  Pool             {}", result.pool);
        println!("  Amount A         {:>20}", result.amount_a);
        println!("  Amount B         {:>20}", result.amount_b);
        println!("  Expected shares  {:>20}", result.expected_shares);
        println!("  Min shares       {:>20}", result.min_shares_out);
        println!("  Share account    {}", result.share_account);
        println!("  Transaction      {}", result.signature);
    }
    Ok(())
}

// ─── preview ─────────────────────────────────────────────────────────────────

async fn cmd_preview(client: &LiquidityPoolClient, args: &DepositArgs, json_output: bool) -> Result<()> {
    let params = args.to_params()?;
    let preview = client
        .preview_deposit(params)
        .await
        .context("could not quote deposit")?;

    if json_output {
        println!("{}", json!({
            "status":  "ok",
            "command": "preview",
            "pair":    args.pair,
            "result":  preview,
        }));
    } else {
        println!("─── Deposit Preview: {} ───────────────────────────────────────", args.pair);
        println!("  Pool             {}", preview.pool);
        println!("  Amount A         {:>20}  @ {:.6} USD  (age {} s)",
                 preview.amount_a, preview.price_a, preview.price_age_a_secs);
        println!("  Amount B         {:>20}  @ {:.6} USD  (age {} s)",
                 preview.amount_b, preview.price_b, preview.price_age_b_secs);
        println!("  Value A          {:>20}", usd(preview.value_a));
        println!("  Value B          {:>20}", usd(preview.value_b));
        println!("  Contribution     {:>20}", usd(preview.contribution_value));
        println!("  Shares out       {:>20}", preview.shares_out);
        println!();
        println!("  Share supply     {:>20}", preview.share_supply);
        println!("  Pool value       {:>20}", usd(preview.total_pool_value));
        println!();
        println!("  Amounts are in pool order; no transaction was sent.");
    }
    Ok(())
}

// ─── pool-info ───────────────────────────────────────────────────────────────

async fn cmd_pool_info(client: &LiquidityPoolClient, pair: &str, json_output: bool) -> Result<()> {
    let (_, _, mint_a, mint_b) = parse_pair(pair)?;
    let info = client
        .pool_info(mint_a, mint_b)
        .await
        .with_context(|| format!(
            "Pool not found for '{pair}'. Run `liquidity-pool create-pool --pair {pair}` first."
        ))?;

    if json_output {
        println!("{}", json!({
            "status":  "ok",
            "command": "pool-info",
            "pair":    pair,
            "result":  info,
        }));
    } else {
        println!("─── Pool Info: {pair} ──────────────────────────────────────────────");
        println!("  Pool             {}", info.pool);
        println!("  Creator          {}", info.creator);
        println!();
        println!("  Token A          {}", info.mint_a);
        println!("  Vault A          {}", info.vault_a);
        println!("  Reserve A        {:>20}", info.reserve_a);
        println!("  Deposited A      {:>20}", info.token_a_deposits);
        println!("  Feed A           {}", hex_id(&info.price_feed_id_a));
        println!();
        println!("  Token B          {}", info.mint_b);
        println!("  Vault B          {}", info.vault_b);
        println!("  Reserve B        {:>20}", info.reserve_b);
        println!("  Deposited B      {:>20}", info.token_b_deposits);
        println!("  Feed B           {}", hex_id(&info.price_feed_id_b));
        println!();
        println!("  Share mint       {}", info.share_mint);
        println!("  Share supply     {:>20}", info.share_supply);
        println!("  Pool value       {:>20}", usd(info.total_pool_value));
        if info.share_supply > 0 {
            println!("  Value per share  {:>20.6}  USD", info.value_per_share);
        } else {
            println!("  Value per share  (pool is empty, awaiting first deposit)");
        }
        println!();
        println!("  Fee rate         {} bps", info.fee_rate_bps);
        println!("  Ratio tolerance  {} bps", info.ratio_tolerance_bps);
        println!("  Max confidence   {} bps", info.max_confidence_bps);
        println!("  Max price age    {} s", info.max_price_age_secs);
    }
    Ok(())
}
