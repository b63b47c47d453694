use anchor_lang::prelude::*;

#[error_code]
pub enum PoolError {
    #[msg("Pool is already initialized for this mint pair")]
    AlreadyInitialized,
    #[msg("Account does not belong to this pool")]
    PoolMismatch,
    #[msg("Price feed id does not match the pool or the feed account")]
    OracleIdentityMismatch,
    #[msg("Oracle price is stale, unverified or outside the confidence band")]
    StaleOrUnreliablePrice,
    #[msg("Deposit ratio deviates from the oracle price ratio")]
    RatioOutOfTolerance,
    #[msg("Shares minted below minimum: slippage exceeded")]
    SlippageExceeded,
    #[msg("Amount must be greater than zero")]
    ZeroAmount,
    #[msg("Deposit leg has zero oracle value")]
    ZeroDepositValue,
    #[msg("Deposit would mint zero shares")]
    ZeroShares,
    #[msg("Fee rate must be below 1000 bps")]
    InvalidFeeRate,
    #[msg("Pool mints must differ")]
    IdenticalMints,
    #[msg("Invalid oracle policy parameters")]
    InvalidOracleParams,
    #[msg("Price feed account is not a valid Pyth price update")]
    InvalidOracleAccount,
    #[msg("Math overflow")]
    MathOverflow,
}
