use corelib::{OrderbookError, Pool};
use serde::Serialize;

/// Shares at or below this percentage are treated as unused pools.
pub const NEGLIGIBLE_SHARE_PCT: f64 = 1e-9;

/// Portion of one simulated trade routed through one pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribution {
    pub pool_index: usize,
    /// Percentage of the trade volume, 0..=100.
    pub share_pct: f64,
    pub protocol: String,
    pub fee_bps: f64,
}

/// Map a distribution vector onto the pools it refers to.
///
/// Zero and negligible entries are skipped. No formatting happens here; the
/// presentation layer owns all string building.
pub fn attribute(distribution: &[f64], pools: &[Pool]) -> Result<Vec<Attribution>, OrderbookError> {
    if distribution.len() != pools.len() {
        return Err(OrderbookError::LengthMismatch {
            expected: pools.len(),
            got: distribution.len(),
        });
    }

    Ok(distribution
        .iter()
        .zip(pools)
        .enumerate()
        .filter(|(_, (share, _))| share.is_finite() && **share > NEGLIGIBLE_SHARE_PCT)
        .map(|(pool_index, (share, pool))| Attribution {
            pool_index,
            share_pct: *share,
            protocol: pool.protocol_system.clone(),
            fee_bps: decode_fee_bps(pool),
        })
        .collect())
}

/// Fee tier from the pool's `fee` static attribute.
///
/// The attribute is a hex string (`"0x01f4"` = 500) in hundredths of a bp,
/// so `0x01f4` decodes to 5 bps. Missing, empty or undecodable values give 0.
pub fn decode_fee_bps(pool: &Pool) -> f64 {
    let Some(raw) = pool.attribute("fee") else {
        return 0.0;
    };

    let hex = raw.trim();
    let hex = hex
        .strip_prefix("0x")
        .or_else(|| hex.strip_prefix("0X"))
        .unwrap_or(hex);

    if hex.is_empty() {
        return 0.0;
    }

    u64::from_str_radix(hex, 16)
        .map(|v| v as f64 / 100.0)
        .unwrap_or(0.0)
}
