use anchor_lang::prelude::*;
use crate::{constants::*, error::PoolError, oracle::OraclePrice, state::PoolConfig};

/// One side of a deposit: how much, at what price, in which denomination.
#[derive(Clone, Copy, Debug)]
pub struct AssetLeg {
    pub amount: u64,
    pub price: OraclePrice,
    pub mint_decimals: u8,
}

/// Pool figures the share computation depends on, read before any mutation.
#[derive(Clone, Copy, Debug)]
pub struct PoolSnapshot {
    pub share_supply: u64,
    pub total_pool_value: u64,
    pub awaiting_first_deposit: bool,
    pub ratio_tolerance_bps: u16,
}

impl PoolSnapshot {
    pub fn capture(pool: &PoolConfig, share_supply: u64) -> Self {
        Self {
            share_supply,
            total_pool_value: pool.total_pool_value,
            awaiting_first_deposit: pool.is_awaiting_first_deposit(),
            ratio_tolerance_bps: pool.ratio_tolerance_bps,
        }
    }
}

/// Everything a deposit will do, computed before the first token moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepositQuote {
    /// Oracle value of each leg, USD e6
    pub value_a: u64,
    pub value_b: u64,
    /// value_a + value_b
    pub contribution_value: u64,
    pub shares_out: u64,
}

/// USD value (6 decimals) of `amount` base units of a token.
///
/// value = amount × price × 10^(exponent + 6 − mint_decimals), floored.
pub fn token_value(amount: u64, price: &OraclePrice, mint_decimals: u8) -> Result<u128> {
    let price_units =
        u128::try_from(price.price).map_err(|_| error!(PoolError::StaleOrUnreliablePrice))?;
    let raw = (amount as u128)
        .checked_mul(price_units)
        .ok_or(PoolError::MathOverflow)?;

    let scale = price.exponent + VALUE_DECIMALS - mint_decimals as i32;
    if scale >= 0 {
        let factor = 10u128
            .checked_pow(scale as u32)
            .ok_or(PoolError::MathOverflow)?;
        Ok(raw.checked_mul(factor).ok_or(PoolError::MathOverflow)?)
    } else {
        // 10^39 and beyond exceed u128; any u128 divided by them floors to 0
        Ok(match 10u128.checked_pow(scale.unsigned_abs()) {
            Some(divisor) => raw / divisor,
            None => 0,
        })
    }
}

/// Both legs must carry (near) equal oracle value:
/// |value_a − value_b| × 10_000 ≤ tolerance_bps × max(value_a, value_b)
pub fn check_ratio(value_a: u128, value_b: u128, tolerance_bps: u16) -> Result<()> {
    require!(value_a > 0 && value_b > 0, PoolError::ZeroDepositValue);

    let deviation = value_a
        .abs_diff(value_b)
        .checked_mul(BPS_DENOMINATOR)
        .ok_or(PoolError::MathOverflow)?;
    let allowed = value_a
        .max(value_b)
        .checked_mul(tolerance_bps as u128)
        .ok_or(PoolError::MathOverflow)?;
    require!(deviation <= allowed, PoolError::RatioOutOfTolerance);
    Ok(())
}

/// Shares owed for `contribution_value`.
///
/// The first deposit mints at the fixed bootstrap rate; every later one
/// mints `share_supply × contribution / total_pool_value`, so value per
/// share never moves.
pub fn shares_for_contribution(contribution_value: u64, pool: &PoolSnapshot) -> Result<u64> {
    if pool.awaiting_first_deposit {
        return Ok(contribution_value
            .checked_mul(INITIAL_SHARES_PER_VALUE_UNIT)
            .ok_or(PoolError::MathOverflow)?);
    }

    let shares = (pool.share_supply as u128)
        .checked_mul(contribution_value as u128)
        .ok_or(PoolError::MathOverflow)?
        .checked_div(pool.total_pool_value as u128)
        .ok_or(PoolError::MathOverflow)?;
    Ok(u64::try_from(shares).map_err(|_| error!(PoolError::MathOverflow))?)
}

/// Price both legs, enforce the ratio band and the slippage floor, and
/// return the full outcome of the deposit.
///
/// * `leg_a`, `leg_b`    – amounts with their oracle prices and mint decimals
/// * `pool`              – share supply and valuation before this deposit
/// * `min_shares_out`    – slippage guard; returns `SlippageExceeded` if violated
pub fn quote_deposit(
    leg_a: &AssetLeg,
    leg_b: &AssetLeg,
    pool: &PoolSnapshot,
    min_shares_out: u64,
) -> Result<DepositQuote> {
    require!(leg_a.amount > 0 && leg_b.amount > 0, PoolError::ZeroAmount);

    let value_a = token_value(leg_a.amount, &leg_a.price, leg_a.mint_decimals)?;
    let value_b = token_value(leg_b.amount, &leg_b.price, leg_b.mint_decimals)?;
    check_ratio(value_a, value_b, pool.ratio_tolerance_bps)?;

    let value_a = u64::try_from(value_a).map_err(|_| error!(PoolError::MathOverflow))?;
    let value_b = u64::try_from(value_b).map_err(|_| error!(PoolError::MathOverflow))?;
    let contribution_value = value_a
        .checked_add(value_b)
        .ok_or(PoolError::MathOverflow)?;

    let shares_out = shares_for_contribution(contribution_value, pool)?;
    require!(shares_out > 0, PoolError::ZeroShares);
    require!(shares_out >= min_shares_out, PoolError::SlippageExceeded);

    Ok(DepositQuote {
        value_a,
        value_b,
        contribution_value,
        shares_out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(whole_usd: i64, exponent: i32) -> OraclePrice {
        OraclePrice {
            price: whole_usd * 10i64.pow(exponent.unsigned_abs()),
            conf: 0,
            exponent,
            publish_time: 0,
        }
    }

    fn leg(amount: u64, whole_usd: i64, mint_decimals: u8) -> AssetLeg {
        AssetLeg { amount, price: price(whole_usd, -8), mint_decimals }
    }

    fn fresh_pool() -> PoolSnapshot {
        PoolSnapshot {
            share_supply: 0,
            total_pool_value: 0,
            awaiting_first_deposit: true,
            ratio_tolerance_bps: DEFAULT_RATIO_TOLERANCE_BPS,
        }
    }

    #[test]
    fn values_respect_mint_decimals_and_exponent() {
        // 1.5 SOL (9 decimals) at $150 → $225
        let sol = price(150, -8);
        assert_eq!(token_value(1_500_000_000, &sol, 9).unwrap(), 225_000_000);

        // 10 USDC (6 decimals) at $1 → $10
        let usdc = price(1, -8);
        assert_eq!(token_value(10_000_000, &usdc, 6).unwrap(), 10_000_000);

        // positive scale: 3 whole tokens (0 decimals) at $2 with exponent 0
        let coarse = OraclePrice { price: 2, conf: 0, exponent: 0, publish_time: 0 };
        assert_eq!(token_value(3, &coarse, 0).unwrap(), 6_000_000);
    }

    #[test]
    fn value_floors_toward_zero() {
        // 1 base unit of a 9-decimal token at $0.5 → 0.0000000005 USD → 0
        let half = OraclePrice { price: 50_000_000, conf: 0, exponent: -8, publish_time: 0 };
        assert_eq!(token_value(1, &half, 9).unwrap(), 0);
    }

    #[test]
    fn ratio_band_boundary() {
        // 1 % tolerance: 99 vs 100 passes, 98 vs 100 fails
        check_ratio(99_000_000, 100_000_000, 100).unwrap();
        check_ratio(100_000_000, 99_000_000, 100).unwrap();
        assert_eq!(
            check_ratio(98_999_999, 100_000_000, 100).unwrap_err(),
            PoolError::RatioOutOfTolerance.into()
        );
    }

    #[test]
    fn zero_value_leg_is_rejected() {
        assert_eq!(
            check_ratio(0, 100, 100).unwrap_err(),
            PoolError::ZeroDepositValue.into()
        );
    }

    #[test]
    fn first_deposit_mints_at_bootstrap_rate() {
        let quote = quote_deposit(&leg(100, 20, 1), &leg(2_000, 1, 1), &fresh_pool(), 1).unwrap();
        assert_eq!(quote.value_a, 200_000_000);
        assert_eq!(quote.value_b, 200_000_000);
        assert_eq!(quote.contribution_value, 400_000_000);
        assert_eq!(quote.shares_out, 400_000_000 * INITIAL_SHARES_PER_VALUE_UNIT);
    }

    #[test]
    fn later_deposit_preserves_value_per_share() {
        let pool = PoolSnapshot {
            share_supply: 1_000_000,
            total_pool_value: 3_000_000,
            awaiting_first_deposit: false,
            ratio_tolerance_bps: 100,
        };
        // contribution $2 into a $3 pool with 1.0 share supply
        let quote = quote_deposit(&leg(1, 1, 0), &leg(1, 1, 0), &pool, 0).unwrap();
        assert_eq!(quote.contribution_value, 2_000_000);
        assert_eq!(quote.shares_out, 666_666);
    }

    #[test]
    fn ratio_outside_band_is_rejected() {
        let err = quote_deposit(&leg(100, 20, 1), &leg(1_000, 1, 1), &fresh_pool(), 0).unwrap_err();
        assert_eq!(err, PoolError::RatioOutOfTolerance.into());
    }

    #[test]
    fn slippage_floor_is_inclusive() {
        let pool = fresh_pool();
        let exact = quote_deposit(&leg(100, 20, 1), &leg(2_000, 1, 1), &pool, 400_000_000).unwrap();
        assert_eq!(exact.shares_out, 400_000_000);

        let err = quote_deposit(&leg(100, 20, 1), &leg(2_000, 1, 1), &pool, 400_000_001).unwrap_err();
        assert_eq!(err, PoolError::SlippageExceeded.into());
    }

    #[test]
    fn dust_deposit_into_large_pool_mints_nothing() {
        let pool = PoolSnapshot {
            share_supply: 1,
            total_pool_value: 1_000_000_000_000,
            awaiting_first_deposit: false,
            ratio_tolerance_bps: 100,
        };
        let err = quote_deposit(&leg(1, 1, 0), &leg(1, 1, 0), &pool, 0).unwrap_err();
        assert_eq!(err, PoolError::ZeroShares.into());
    }

    #[test]
    fn zero_amounts_are_rejected() {
        let err = quote_deposit(&leg(0, 20, 1), &leg(2_000, 1, 1), &fresh_pool(), 0).unwrap_err();
        assert_eq!(err, PoolError::ZeroAmount.into());
    }
}
