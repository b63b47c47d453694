use anchor_lang::prelude::*;
use crate::{constants::*, error::PoolError};

// ─── Pyth PriceUpdateV2 layout ─────────────────────────────────────────────
//   [0..8]    anchor discriminator
//   [8..40]   write_authority
//   [40]      verification level: 0 = Partial { num_signatures: u8 }, 1 = Full
//   [base..]  feed_id(32) price(i64) conf(u64) exponent(i32) publish_time(i64) ...
// base is 42 for Partial and 41 for Full.
pub const PRICE_UPDATE_V2_DISCRIMINATOR: [u8; 8] = [34, 241, 35, 99, 157, 126, 244, 205];
const VERIFICATION_LEVEL_OFFSET: usize = 40;
const VERIFICATION_PARTIAL: u8 = 0;
const VERIFICATION_FULL: u8 = 1;

/// Price as reported by a feed: `price * 10^exponent` USD per whole token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OraclePrice {
    pub price: i64,
    pub conf: u64,
    pub exponent: i32,
    pub publish_time: i64,
}

/// Freshness and confidence thresholds a pool applies to every read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OraclePolicy {
    pub max_age_secs: u32,
    pub max_confidence_bps: u16,
}

impl Default for OraclePolicy {
    fn default() -> Self {
        Self {
            max_age_secs: DEFAULT_MAX_PRICE_AGE_SECS,
            max_confidence_bps: DEFAULT_MAX_CONFIDENCE_BPS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriceUpdate {
    pub feed_id: [u8; 32],
    pub fully_verified: bool,
    pub price: OraclePrice,
}

impl OraclePrice {
    /// Reject non-positive, stale or low-confidence prices.
    ///
    /// A publish time ahead of `now` counts as age zero: the cluster clock
    /// routinely trails Pythnet.
    pub fn validate(&self, now: i64, policy: &OraclePolicy) -> Result<()> {
        require!(self.price > 0, PoolError::StaleOrUnreliablePrice);
        require!(
            self.exponent.unsigned_abs() <= MAX_PRICE_EXPONENT_ABS as u32,
            PoolError::InvalidOracleAccount
        );

        let age = now.saturating_sub(self.publish_time).max(0);
        require!(
            age <= policy.max_age_secs as i64,
            PoolError::StaleOrUnreliablePrice
        );

        // conf / price <= max_confidence_bps / 10_000
        let lhs = (self.conf as u128)
            .checked_mul(BPS_DENOMINATOR)
            .ok_or(PoolError::MathOverflow)?;
        let rhs = (self.price as u128)
            .checked_mul(policy.max_confidence_bps as u128)
            .ok_or(PoolError::MathOverflow)?;
        require!(lhs <= rhs, PoolError::StaleOrUnreliablePrice);
        Ok(())
    }
}

/// Decode the price message out of raw `PriceUpdateV2` account data.
pub fn parse_price_update(data: &[u8]) -> Result<PriceUpdate> {
    let discriminator: [u8; 8] = read_bytes(data, 0)?;
    require!(
        discriminator == PRICE_UPDATE_V2_DISCRIMINATOR,
        PoolError::InvalidOracleAccount
    );

    let level = *data
        .get(VERIFICATION_LEVEL_OFFSET)
        .ok_or(PoolError::InvalidOracleAccount)?;
    let (base, fully_verified) = match level {
        VERIFICATION_PARTIAL => (VERIFICATION_LEVEL_OFFSET + 2, false),
        VERIFICATION_FULL => (VERIFICATION_LEVEL_OFFSET + 1, true),
        _ => return err!(PoolError::InvalidOracleAccount),
    };

    let off_price = base + 32;
    let off_conf = off_price + 8;
    let off_exponent = off_conf + 8;
    let off_publish_time = off_exponent + 4;

    Ok(PriceUpdate {
        feed_id: read_bytes(data, base)?,
        fully_verified,
        price: OraclePrice {
            price: i64::from_le_bytes(read_bytes(data, off_price)?),
            conf: u64::from_le_bytes(read_bytes(data, off_conf)?),
            exponent: i32::from_le_bytes(read_bytes(data, off_exponent)?),
            publish_time: i64::from_le_bytes(read_bytes(data, off_publish_time)?),
        },
    })
}

/// Validate a price update against the feed id the caller named and the
/// pool's oracle policy.
pub fn price_from_update(
    data: &[u8],
    expected_feed_id: &[u8; 32],
    now: i64,
    policy: &OraclePolicy,
) -> Result<OraclePrice> {
    let update = parse_price_update(data)?;
    require!(
        update.feed_id == *expected_feed_id,
        PoolError::OracleIdentityMismatch
    );
    require!(update.fully_verified, PoolError::StaleOrUnreliablePrice);
    update.price.validate(now, policy)?;
    Ok(update.price)
}

/// Read a fresh price from a Pyth receiver account.
pub fn read_price(
    feed: &AccountInfo,
    expected_feed_id: &[u8; 32],
    now: i64,
    policy: &OraclePolicy,
) -> Result<OraclePrice> {
    #[cfg(not(feature = "mock-oracle"))]
    require_keys_eq!(
        *feed.owner,
        PYTH_RECEIVER_PROGRAM_ID,
        PoolError::InvalidOracleAccount
    );

    let data = feed.try_borrow_data()?;
    price_from_update(&data, expected_feed_id, now, policy)
}

fn read_bytes<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N]> {
    data.get(offset..offset + N)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| error!(PoolError::InvalidOracleAccount))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: [u8; 32] = [7; 32];
    const NOW: i64 = 1_700_000_000;

    fn price_update(level: &[u8], feed_id: [u8; 32], price: OraclePrice) -> Vec<u8> {
        let mut data = PRICE_UPDATE_V2_DISCRIMINATOR.to_vec();
        data.extend_from_slice(&[9; 32]); // write authority
        data.extend_from_slice(level);
        data.extend_from_slice(&feed_id);
        data.extend_from_slice(&price.price.to_le_bytes());
        data.extend_from_slice(&price.conf.to_le_bytes());
        data.extend_from_slice(&price.exponent.to_le_bytes());
        data.extend_from_slice(&price.publish_time.to_le_bytes());
        data.extend_from_slice(&price.publish_time.to_le_bytes()); // prev_publish_time
        data.extend_from_slice(&price.price.to_le_bytes()); // ema_price
        data.extend_from_slice(&price.conf.to_le_bytes()); // ema_conf
        data.extend_from_slice(&42u64.to_le_bytes()); // posted_slot
        data
    }

    fn usd(whole: i64) -> OraclePrice {
        OraclePrice {
            price: whole * 100_000_000,
            conf: 50_000,
            exponent: -8,
            publish_time: NOW - 5,
        }
    }

    #[test]
    fn parses_fully_verified_update() {
        let data = price_update(&[VERIFICATION_FULL], FEED, usd(20));
        let update = parse_price_update(&data).unwrap();
        assert_eq!(update.feed_id, FEED);
        assert!(update.fully_verified);
        assert_eq!(update.price, usd(20));
    }

    #[test]
    fn parses_partially_verified_update_at_shifted_offset() {
        let data = price_update(&[VERIFICATION_PARTIAL, 3], FEED, usd(1));
        let update = parse_price_update(&data).unwrap();
        assert!(!update.fully_verified);
        assert_eq!(update.price, usd(1));
    }

    #[test]
    fn rejects_wrong_discriminator_and_truncated_data() {
        let mut data = price_update(&[VERIFICATION_FULL], FEED, usd(1));
        data[0] ^= 0xff;
        assert_eq!(
            parse_price_update(&data).unwrap_err(),
            PoolError::InvalidOracleAccount.into()
        );

        let data = price_update(&[VERIFICATION_FULL], FEED, usd(1));
        assert_eq!(
            parse_price_update(&data[..80]).unwrap_err(),
            PoolError::InvalidOracleAccount.into()
        );
    }

    #[test]
    fn feed_id_must_match_request() {
        let data = price_update(&[VERIFICATION_FULL], FEED, usd(20));
        let err = price_from_update(&data, &[8; 32], NOW, &OraclePolicy::default()).unwrap_err();
        assert_eq!(err, PoolError::OracleIdentityMismatch.into());
    }

    #[test]
    fn partial_verification_is_unreliable() {
        let data = price_update(&[VERIFICATION_PARTIAL, 1], FEED, usd(20));
        let err = price_from_update(&data, &FEED, NOW, &OraclePolicy::default()).unwrap_err();
        assert_eq!(err, PoolError::StaleOrUnreliablePrice.into());
    }

    #[test]
    fn staleness_boundary_is_inclusive() {
        let policy = OraclePolicy { max_age_secs: 60, max_confidence_bps: 200 };
        let mut price = usd(20);

        price.publish_time = NOW - 60;
        assert!(price.validate(NOW, &policy).is_ok());

        price.publish_time = NOW - 61;
        assert_eq!(
            price.validate(NOW, &policy).unwrap_err(),
            PoolError::StaleOrUnreliablePrice.into()
        );

    }

    #[test]
    fn price_published_ahead_of_cluster_clock_is_fresh() {
        let policy = OraclePolicy::default();
        let mut price = usd(20);

        price.publish_time = NOW + 2;
        assert!(price.validate(NOW, &policy).is_ok());

        price.publish_time = NOW + 3_600;
        assert!(price.validate(NOW, &policy).is_ok());

        let data = price_update(&[VERIFICATION_FULL], FEED, price);
        assert_eq!(price_from_update(&data, &FEED, NOW, &policy).unwrap(), price);
    }

    #[test]
    fn confidence_boundary_is_inclusive() {
        let policy = OraclePolicy { max_age_secs: 60, max_confidence_bps: 200 };
        let mut price = usd(20);

        // 2 % of $20 at exponent -8
        price.conf = 40_000_000;
        assert!(price.validate(NOW, &policy).is_ok());

        price.conf = 40_000_001;
        assert_eq!(
            price.validate(NOW, &policy).unwrap_err(),
            PoolError::StaleOrUnreliablePrice.into()
        );
    }

    #[test]
    fn non_positive_price_is_unreliable() {
        let mut price = usd(1);
        price.price = 0;
        assert_eq!(
            price.validate(NOW, &OraclePolicy::default()).unwrap_err(),
            PoolError::StaleOrUnreliablePrice.into()
        );
    }
}
