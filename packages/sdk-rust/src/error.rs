//! SDK error type.

use solana_sdk::pubkey::Pubkey;

/// All errors returned by the liquidity pool SDK.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ── RPC / network ────────────────────────────────────────────────────────
    /// A Solana JSON-RPC call failed.
    #[error("RPC error: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),

    // ── Pool discovery ───────────────────────────────────────────────────────
    /// No pool exists for the given mint pair in either PDA ordering.
    #[error("Pool not found for mints {0} / {1}")]
    PoolNotFound(Pubkey, Pubkey),

    // ── Oracle ───────────────────────────────────────────────────────────────
    /// The feed account carries a different feed than the pool pins.
    #[error("Price feed mismatch: pool expects {expected}, account holds {found}")]
    OracleMismatch { expected: String, found: String },

    /// The price update is only partially verified or non-positive.
    #[error("Price update for feed {0} is not usable (unverified or non-positive)")]
    UnreliablePrice(String),

    // ── Deposit ──────────────────────────────────────────────────────────────
    #[error("Deposit amounts must be greater than zero")]
    ZeroAmount,

    /// One leg rounds to zero USD value at the current price.
    #[error("Deposit leg has zero oracle value")]
    ZeroDepositValue,

    /// Legs disagree with the oracle ratio beyond the pool's tolerance.
    #[error("Deposit ratio out of tolerance: value_a={value_a} value_b={value_b} \
             tolerance={tolerance_bps}bps")]
    RatioOutOfTolerance { value_a: u64, value_b: u64, tolerance_bps: u16 },

    #[error("Deposit would mint zero shares")]
    ZeroShares,

    /// The quoted shares fall below the caller's minimum.
    #[error("Slippage guard triggered: estimated_shares={estimated}, min_shares_out={min}")]
    SlippageExceeded { estimated: u64, min: u64 },

    // ── Arithmetic ───────────────────────────────────────────────────────────
    #[error("Integer overflow in valuation / share math")]
    MathOverflow,

    // ── Account parsing ──────────────────────────────────────────────────────
    /// Raw account bytes could not be deserialized.
    #[error("Account parse error at offset {offset}: {reason}")]
    ParseError { offset: usize, reason: String },

    // ── Validation ───────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience alias so every module can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;
