//! Valuation and share math.
//!
//! Mirrors the on-chain arithmetic exactly so off-chain quotes match
//! on-chain results. Staleness and confidence are left to the program; the
//! clock it checks against is the cluster's, not ours.

use crate::error::{Error, Result};
use crate::state::{PoolConfigState, PriceFeedState};

// ─── Constants ────────────────────────────────────────────────────────────────

/// Basis-point denominator.
pub const BPS_DENOMINATOR: u128 = 10_000;
/// Pool value is USD with this many decimals.
pub const VALUE_DECIMALS: i32 = 6;
/// First deposit: share base units per micro-USD.
pub const INITIAL_SHARES_PER_VALUE_UNIT: u64 = 1;

/// Outcome of a deposit, all values USD e6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub value_a:            u64,
    pub value_b:            u64,
    pub contribution_value: u64,
    pub shares_out:         u64,
}

// ─── Valuation ────────────────────────────────────────────────────────────────

/// `amount × price × 10^(exponent + 6 − decimals)`, floored.
pub fn token_value(amount: u64, feed: &PriceFeedState, decimals: u8) -> Result<u128> {
    let price = u128::try_from(feed.price)
        .map_err(|_| Error::UnreliablePrice(hex::encode(feed.feed_id)))?;
    let raw = (amount as u128).checked_mul(price).ok_or(Error::MathOverflow)?;

    let scale = feed.exponent + VALUE_DECIMALS - decimals as i32;
    if scale >= 0 {
        let factor = 10u128.checked_pow(scale as u32).ok_or(Error::MathOverflow)?;
        raw.checked_mul(factor).ok_or(Error::MathOverflow)
    } else {
        Ok(10u128
            .checked_pow(scale.unsigned_abs())
            .map_or(0, |divisor| raw / divisor))
    }
}

/// Smallest `amount_b` whose value is at least the value of `amount_a`.
pub fn balanced_amount_b(
    amount_a:   u64,
    feed_a:     &PriceFeedState,
    decimals_a: u8,
    feed_b:     &PriceFeedState,
    decimals_b: u8,
) -> Result<u64> {
    let value_a = token_value(amount_a, feed_a, decimals_a)?;
    let price_b = u128::try_from(feed_b.price)
        .ok()
        .filter(|p| *p > 0)
        .ok_or_else(|| Error::UnreliablePrice(hex::encode(feed_b.feed_id)))?;

    // value_b = amount_b × price_b × 10^scale  →  solve for amount_b, rounding up
    let scale = feed_b.exponent + VALUE_DECIMALS - decimals_b as i32;
    let (num, den) = if scale >= 0 {
        let factor = 10u128.checked_pow(scale as u32).ok_or(Error::MathOverflow)?;
        (value_a, price_b.checked_mul(factor).ok_or(Error::MathOverflow)?)
    } else {
        let factor = 10u128
            .checked_pow(scale.unsigned_abs())
            .ok_or(Error::MathOverflow)?;
        (value_a.checked_mul(factor).ok_or(Error::MathOverflow)?, price_b)
    };
    let amount_b = num.div_ceil(den);
    u64::try_from(amount_b).map_err(|_| Error::MathOverflow)
}

// ─── Quote ────────────────────────────────────────────────────────────────────

/// Quote a deposit of `amount_a` / `amount_b` (pool ordering) into `pool`.
///
/// * `share_supply` – current supply of the pool's share mint
/// * returns the same failures the program would, as SDK errors
#[allow(clippy::too_many_arguments)]
pub fn quote_deposit(
    pool:         &PoolConfigState,
    share_supply: u64,
    amount_a:     u64,
    feed_a:       &PriceFeedState,
    decimals_a:   u8,
    amount_b:     u64,
    feed_b:       &PriceFeedState,
    decimals_b:   u8,
) -> Result<Quote> {
    if amount_a == 0 || amount_b == 0 {
        return Err(Error::ZeroAmount);
    }
    for (feed, pinned) in [(feed_a, &pool.price_feed_id_a), (feed_b, &pool.price_feed_id_b)] {
        if feed.feed_id != *pinned {
            return Err(Error::OracleMismatch {
                expected: hex::encode(pinned),
                found:    hex::encode(feed.feed_id),
            });
        }
        if !feed.fully_verified {
            return Err(Error::UnreliablePrice(hex::encode(feed.feed_id)));
        }
    }

    let value_a = token_value(amount_a, feed_a, decimals_a)?;
    let value_b = token_value(amount_b, feed_b, decimals_b)?;
    if value_a == 0 || value_b == 0 {
        return Err(Error::ZeroDepositValue);
    }
    let value_a = u64::try_from(value_a).map_err(|_| Error::MathOverflow)?;
    let value_b = u64::try_from(value_b).map_err(|_| Error::MathOverflow)?;

    let deviation = (value_a.abs_diff(value_b) as u128) * BPS_DENOMINATOR;
    let allowed = (value_a.max(value_b) as u128) * pool.ratio_tolerance_bps as u128;
    if deviation > allowed {
        return Err(Error::RatioOutOfTolerance {
            value_a,
            value_b,
            tolerance_bps: pool.ratio_tolerance_bps,
        });
    }

    let contribution_value = value_a.checked_add(value_b).ok_or(Error::MathOverflow)?;
    let shares_out = if pool.is_awaiting_first_deposit() {
        contribution_value
            .checked_mul(INITIAL_SHARES_PER_VALUE_UNIT)
            .ok_or(Error::MathOverflow)?
    } else {
        let shares = (share_supply as u128)
            .checked_mul(contribution_value as u128)
            .ok_or(Error::MathOverflow)?
            .checked_div(pool.total_pool_value as u128)
            .ok_or(Error::MathOverflow)?;
        u64::try_from(shares).map_err(|_| Error::MathOverflow)?
    };
    if shares_out == 0 {
        return Err(Error::ZeroShares);
    }

    Ok(Quote { value_a, value_b, contribution_value, shares_out })
}

/// Slippage floor: `shares × (10_000 − max_slippage_bps) / 10_000`.
pub fn min_shares_with_slippage(shares: u64, max_slippage_bps: u16) -> u64 {
    if max_slippage_bps == 0 {
        return 0;
    }
    let keep = BPS_DENOMINATOR.saturating_sub(max_slippage_bps as u128);
    ((shares as u128) * keep / BPS_DENOMINATOR) as u64
}

/// Share floor sent on-chain: the stricter of the bps floor and the
/// caller's absolute minimum.
///
/// Fails with [`Error::SlippageExceeded`] when the quote already falls
/// below the caller's minimum, so the transaction is never sent.
pub fn share_floor(estimated: u64, max_slippage_bps: u16, min_shares_out: Option<u64>) -> Result<u64> {
    let floor = min_shares_with_slippage(estimated, max_slippage_bps);
    match min_shares_out {
        Some(min) if estimated < min => Err(Error::SlippageExceeded { estimated, min }),
        Some(min) => Ok(floor.max(min)),
        None => Ok(floor),
    }
}
