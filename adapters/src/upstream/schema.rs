//! Structural validation of orderbook payloads at the fetch boundary.
//!
//! Two classes of problems are distinguished:
//!
//! - **Fatal**: the payload cannot describe a pair at all (bad token
//!   addresses, a pool without exactly two tokens). Rejected as
//!   [`FetchError::Malformed`]; the caller keeps its previous snapshot.
//! - **Degraded**: individual trade records whose parallel vectors do not
//!   match the pool count, or liquidity vectors of the wrong length. Those
//!   entries are dropped with a warning and the rest of the book survives,
//!   since partial liquidity data is still informative.

use corelib::{Orderbook, TradeRecord, is_valid_address};
use tracing::warn;

use super::errors::FetchError;

pub fn validate_orderbook(mut ob: Orderbook) -> Result<Orderbook, FetchError> {
    for (label, token) in [("token0", &ob.token0), ("token1", &ob.token1)] {
        if !is_valid_address(&token.address) {
            return Err(FetchError::Malformed(format!(
                "{label} has invalid address {:?}",
                token.address
            )));
        }
    }

    for (i, pool) in ob.pools.iter().enumerate() {
        if pool.tokens.len() != 2 {
            return Err(FetchError::Malformed(format!(
                "pool {} ({}) lists {} tokens, expected 2",
                i,
                pool.id,
                pool.tokens.len()
            )));
        }
    }

    let pool_count = ob.pools.len();

    let dropped0to1 = retain_aligned(&mut ob.trades0to1, pool_count);
    let dropped1to0 = retain_aligned(&mut ob.trades1to0, pool_count);

    if dropped0to1 + dropped1to0 > 0 {
        warn!(
            pools = pool_count,
            dropped0to1,
            dropped1to0,
            "dropped misaligned trade records"
        );
    }

    for (label, lqdty) in [
        ("aggt0lqdty", &mut ob.aggt0lqdty),
        ("aggt1lqdty", &mut ob.aggt1lqdty),
    ] {
        if !lqdty.is_empty() && lqdty.len() != pool_count {
            warn!(
                vector = label,
                len = lqdty.len(),
                pools = pool_count,
                "liquidity vector does not match pool count, ignoring it"
            );
            lqdty.clear();
        }
    }

    Ok(ob)
}

fn retain_aligned(trades: &mut Vec<TradeRecord>, pool_count: usize) -> usize {
    let before = trades.len();
    trades.retain(|t| t.is_aligned(pool_count));
    before - trades.len()
}
