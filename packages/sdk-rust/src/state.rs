//! On-chain account deserialization.
//!
//! Parses raw account bytes for `PoolConfig` (312 bytes), SPL token accounts
//! and mints, and Pyth `PriceUpdateV2` feeds. Byte offsets mirror the
//! on-chain layouts exactly.

use solana_sdk::pubkey::Pubkey;
use crate::error::{Error, Result};

// ─── PoolConfig ───────────────────────────────────────────────────────────────

/// Deserialized `PoolConfig` account state.
///
/// Layout (after 8-byte Anchor discriminator):
/// ```text
/// creator(32)  token_a_mint(32)  token_b_mint(32)  token_a_vault(32)
/// token_b_vault(32)  share_mint(32)  price_feed_id_a(32)  price_feed_id_b(32)
/// fee_rate_bps(2)  ratio_tolerance_bps(2)  max_confidence_bps(2)
/// max_price_age_secs(4)  token_a_deposits(8)  token_b_deposits(8)
/// total_pool_value(8)  created_at(8)  bumps(6)  = 312 bytes
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfigState {
    pub creator:             Pubkey,
    pub token_a_mint:        Pubkey,
    pub token_b_mint:        Pubkey,
    pub token_a_vault:       Pubkey,
    pub token_b_vault:       Pubkey,
    pub share_mint:          Pubkey,
    pub price_feed_id_a:     [u8; 32],
    pub price_feed_id_b:     [u8; 32],
    pub fee_rate_bps:        u16,
    pub ratio_tolerance_bps: u16,
    pub max_confidence_bps:  u16,
    pub max_price_age_secs:  u32,
    pub token_a_deposits:    u64,
    pub token_b_deposits:    u64,
    /// USD with 6 decimals
    pub total_pool_value:    u64,
    pub created_at:          i64,
}

impl PoolConfigState {
    pub fn is_awaiting_first_deposit(&self) -> bool {
        self.token_a_deposits == 0 && self.token_b_deposits == 0
    }
}

pub const POOL_CONFIG_LEN: usize = 312;

/// Deserialize a `PoolConfig` account from raw bytes.
pub fn parse_pool_config(data: &[u8]) -> Result<PoolConfigState> {
    if data.len() < POOL_CONFIG_LEN {
        return Err(Error::ParseError {
            offset: 0,
            reason: format!("PoolConfig account is {} bytes; expected {}", data.len(), POOL_CONFIG_LEN),
        });
    }
    Ok(PoolConfigState {
        creator:             read_pubkey(data, 8)?,
        token_a_mint:        read_pubkey(data, 40)?,
        token_b_mint:        read_pubkey(data, 72)?,
        token_a_vault:       read_pubkey(data, 104)?,
        token_b_vault:       read_pubkey(data, 136)?,
        share_mint:          read_pubkey(data, 168)?,
        price_feed_id_a:     read_array(data, 200)?,
        price_feed_id_b:     read_array(data, 232)?,
        fee_rate_bps:        read_u16(data, 264)?,
        ratio_tolerance_bps: read_u16(data, 266)?,
        max_confidence_bps:  read_u16(data, 268)?,
        max_price_age_secs:  u32::from_le_bytes(read_array(data, 270)?),
        token_a_deposits:    read_u64(data, 274)?,
        token_b_deposits:    read_u64(data, 282)?,
        total_pool_value:    read_u64(data, 290)?,
        created_at:          i64::from_le_bytes(read_array(data, 298)?),
    })
}

// ─── SPL token account / mint ─────────────────────────────────────────────────

/// Read the `amount` field from a packed SPL token account.
///
/// Token account layout: `mint(32) owner(32) amount(8) …`
pub fn parse_token_amount(data: &[u8]) -> Result<u64> {
    if data.len() < 72 {
        return Err(Error::ParseError {
            offset: 64,
            reason: format!("Token account is {} bytes; need at least 72", data.len()),
        });
    }
    read_u64(data, 64)
}

/// Supply and decimals of a packed SPL mint.
///
/// Mint layout: `mint_authority(36) supply(8) decimals(1) is_initialized(1) freeze_authority(36)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintState {
    pub supply:   u64,
    pub decimals: u8,
}

pub fn parse_mint(data: &[u8]) -> Result<MintState> {
    if data.len() < 82 {
        return Err(Error::ParseError {
            offset: 0,
            reason: format!("Mint account is {} bytes; expected 82", data.len()),
        });
    }
    Ok(MintState {
        supply:   read_u64(data, 36)?,
        decimals: data[44],
    })
}

// ─── Pyth PriceUpdateV2 ───────────────────────────────────────────────────────

pub const PRICE_UPDATE_V2_DISCRIMINATOR: [u8; 8] = [34, 241, 35, 99, 157, 126, 244, 205];

/// Price message of a Pyth receiver account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceFeedState {
    pub feed_id:        [u8; 32],
    pub fully_verified: bool,
    pub price:          i64,
    pub conf:           u64,
    pub exponent:       i32,
    pub publish_time:   i64,
}

impl PriceFeedState {
    /// Price as a float, for display only.
    pub fn ui_price(&self) -> f64 {
        self.price as f64 * 10f64.powi(self.exponent)
    }
}

/// Deserialize a `PriceUpdateV2` account.
///
/// Verification level is a Borsh enum: `Partial { num_signatures: u8 }`
/// (tag 0, 2 bytes) or `Full` (tag 1, 1 byte), so the message offset shifts.
pub fn parse_price_update(data: &[u8]) -> Result<PriceFeedState> {
    let disc: [u8; 8] = read_array(data, 0)?;
    if disc != PRICE_UPDATE_V2_DISCRIMINATOR {
        return Err(Error::ParseError {
            offset: 0,
            reason: "not a PriceUpdateV2 account".into(),
        });
    }
    let (base, fully_verified) = match data.get(40) {
        Some(0) => (42, false),
        Some(1) => (41, true),
        _ => {
            return Err(Error::ParseError {
                offset: 40,
                reason: "unknown verification level".into(),
            })
        }
    };
    Ok(PriceFeedState {
        feed_id:      read_array(data, base)?,
        fully_verified,
        price:        i64::from_le_bytes(read_array(data, base + 32)?),
        conf:         read_u64(data, base + 40)?,
        exponent:     i32::from_le_bytes(read_array(data, base + 48)?),
        publish_time: i64::from_le_bytes(read_array(data, base + 52)?),
    })
}

// ─── Byte-slice primitives ────────────────────────────────────────────────────

pub(crate) fn read_array<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N]> {
    data.get(offset..offset + N)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| Error::ParseError {
            offset,
            reason: format!("slice too short for {N} bytes"),
        })
}

pub(crate) fn read_pubkey(data: &[u8], offset: usize) -> Result<Pubkey> {
    Ok(Pubkey::from(read_array::<32>(data, offset)?))
}

pub(crate) fn read_u16(data: &[u8], offset: usize) -> Result<u16> {
    Ok(u16::from_le_bytes(read_array(data, offset)?))
}

pub(crate) fn read_u64(data: &[u8], offset: usize) -> Result<u64> {
    Ok(u64::from_le_bytes(read_array(data, offset)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_bytes() -> Vec<u8> {
        let mut d = vec![0u8; 8];
        for k in 1..=6u8 {
            d.extend_from_slice(&[k; 32]);
        }
        d.extend_from_slice(&[0xa1; 32]);
        d.extend_from_slice(&[0xb2; 32]);
        d.extend_from_slice(&30u16.to_le_bytes());
        d.extend_from_slice(&100u16.to_le_bytes());
        d.extend_from_slice(&200u16.to_le_bytes());
        d.extend_from_slice(&60u32.to_le_bytes());
        d.extend_from_slice(&150u64.to_le_bytes());
        d.extend_from_slice(&3_000u64.to_le_bytes());
        d.extend_from_slice(&600_000_000u64.to_le_bytes());
        d.extend_from_slice(&1_700_000_000i64.to_le_bytes());
        d.extend_from_slice(&[255, 254, 253, 252, 251, 250]);
        d
    }

    #[test]
    fn pool_config_offsets() {
        let data = pool_bytes();
        assert_eq!(data.len(), POOL_CONFIG_LEN);

        let pool = parse_pool_config(&data).unwrap();
        assert_eq!(pool.creator, Pubkey::from([1; 32]));
        assert_eq!(pool.share_mint, Pubkey::from([6; 32]));
        assert_eq!(pool.price_feed_id_b, [0xb2; 32]);
        assert_eq!(pool.fee_rate_bps, 30);
        assert_eq!(pool.max_price_age_secs, 60);
        assert_eq!(pool.token_b_deposits, 3_000);
        assert_eq!(pool.total_pool_value, 600_000_000);
        assert_eq!(pool.created_at, 1_700_000_000);
        assert!(!pool.is_awaiting_first_deposit());
    }

    #[test]
    fn short_pool_config_is_a_parse_error() {
        let data = pool_bytes();
        assert!(matches!(
            parse_pool_config(&data[..200]),
            Err(Error::ParseError { offset: 0, .. })
        ));
    }

    #[test]
    fn mint_supply_and_decimals() {
        let mut data = vec![0u8; 82];
        data[36..44].copy_from_slice(&400_000_000u64.to_le_bytes());
        data[44] = 6;
        assert_eq!(parse_mint(&data).unwrap(), MintState { supply: 400_000_000, decimals: 6 });
    }

    #[test]
    fn price_update_full_and_partial() {
        let mut full = PRICE_UPDATE_V2_DISCRIMINATOR.to_vec();
        full.extend_from_slice(&[0; 32]);
        full.push(1);
        full.extend_from_slice(&[7; 32]);
        full.extend_from_slice(&2_000_000_000i64.to_le_bytes());
        full.extend_from_slice(&1_000u64.to_le_bytes());
        full.extend_from_slice(&(-8i32).to_le_bytes());
        full.extend_from_slice(&99i64.to_le_bytes());

        let feed = parse_price_update(&full).unwrap();
        assert!(feed.fully_verified);
        assert_eq!(feed.feed_id, [7; 32]);
        assert_eq!(feed.exponent, -8);
        assert_eq!(feed.publish_time, 99);
        assert!((feed.ui_price() - 20.0).abs() < 1e-9);

        let mut partial = full[..40].to_vec();
        partial.extend_from_slice(&[0, 2]);
        partial.extend_from_slice(&full[41..]);
        let feed = parse_price_update(&partial).unwrap();
        assert!(!feed.fully_verified);
        assert_eq!(feed.price, 2_000_000_000);
    }
}
