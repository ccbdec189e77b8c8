//! Wire model of a synthetic orderbook as returned by the simulation backend.
//!
//! Every type here mirrors the JSON shape one-to-one and is treated as
//! immutable once deserialized: a refresh produces a new `Orderbook` rather
//! than patching an existing one.

use serde::{Deserialize, Deserializer, Serialize};

/// ERC-20 style token descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub address: String,
    pub decimals: u32,
    pub symbol: String,

    /// Estimated gas units for one transfer/swap leg. The backend sends it as
    /// a decimal string; plain numbers are accepted too.
    #[serde(default, deserialize_with = "string_or_number")]
    pub gas: String,
}

/// AMM pool taking part in the simulated routes.
///
/// Position in `Orderbook::pools` is significant: index `i` refers to the same
/// pool in every distribution, gas and liquidity vector of both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub address: String,
    pub id: String,
    pub tokens: Vec<Token>,
    pub protocol_system: String,
    pub protocol_type_name: String,

    #[serde(default)]
    pub contract_ids: Vec<String>,

    /// Raw protocol attributes, e.g. `("fee", "0x01f4")`, `("tick_spacing", "0x0a")`.
    #[serde(default)]
    pub static_attributes: Vec<(String, String)>,

    #[serde(default)]
    pub creation_tx: String,

    /// Fee resolved by the backend (bps).
    #[serde(default)]
    pub fee: f64,

    /// Last block timestamp at which the pool state changed.
    #[serde(default)]
    pub last_updated_at: u64,
}

impl Pool {
    /// Case-insensitive lookup into `static_attributes`. First match wins.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.static_attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// One simulated trade of a given input size in one direction.
///
/// `distribution`, `gas_costs`, `gas_costs_usd` and `gas_costs_output` are
/// parallel to `Orderbook::pools`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Input amount, in the sold asset.
    pub amount: f64,

    /// Output amount, in the bought asset.
    pub output: f64,

    /// Percentage of `amount` routed to each pool.
    pub distribution: Vec<f64>,

    #[serde(default)]
    pub gas_costs: Vec<u64>,

    #[serde(default)]
    pub gas_costs_usd: Vec<f64>,

    #[serde(default)]
    pub gas_costs_output: Vec<f64>,

    /// Effective execution price (output / input) in the direction's own units.
    pub ratio: f64,
}

impl TradeRecord {
    /// True when every parallel vector matches the pool count.
    ///
    /// Gas vectors may be absent (empty) on older payloads; only the
    /// distribution is mandatory.
    pub fn is_aligned(&self, pool_count: usize) -> bool {
        let optional_ok = |len: usize| len == 0 || len == pool_count;

        self.distribution.len() == pool_count
            && optional_ok(self.gas_costs.len())
            && optional_ok(self.gas_costs_usd.len())
            && optional_ok(self.gas_costs_output.len())
    }
}

/// Best bid / best ask summary for one orientation of the book.
///
/// All fields are `None` when either side of the book has no liquidity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MidPriceDescriptor {
    pub best_bid: Option<f64>,
    pub best_ask: Option<f64>,
    pub mid: Option<f64>,
    pub spread: Option<f64>,
    pub spread_pct: Option<f64>,
}

impl MidPriceDescriptor {
    /// Build a descriptor from the two boundary prices.
    ///
    /// A missing or non-finite boundary means that side has no liquidity.
    pub fn from_boundaries(best_bid: Option<f64>, best_ask: Option<f64>) -> Self {
        let (Some(bid), Some(ask)) = (best_bid, best_ask) else {
            return Self::default();
        };
        if !bid.is_finite() || !ask.is_finite() {
            return Self::default();
        }

        let mid = (bid + ask) / 2.0;
        let spread = ask - bid;
        let spread_pct = if mid != 0.0 { Some(spread / mid) } else { None };

        Self {
            best_bid: Some(bid),
            best_ask: Some(ask),
            mid: Some(mid),
            spread: Some(spread),
            spread_pct,
        }
    }

    /// Same book viewed in the inverted price coordinate.
    ///
    /// The best bid in token0/token1 is the reciprocal of the best ask in
    /// token1/token0 and vice versa.
    pub fn inverted(&self) -> Self {
        let recip = |p: Option<f64>| p.filter(|v| *v != 0.0).map(|v| 1.0 / v);
        Self::from_boundaries(recip(self.best_ask), recip(self.best_bid))
    }

    pub fn has_liquidity(&self) -> bool {
        self.mid.is_some()
    }
}

/// Synthetic orderbook for one token pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Orderbook {
    pub token0: Token,
    pub token1: Token,

    #[serde(default)]
    pub block: u64,

    #[serde(default)]
    pub timestamp: u64,

    /// Upstream spot prices per pool, token1 per token0. Carried through
    /// unchanged for consumers of the serialized snapshot; curves and
    /// descriptors are derived from the trade records instead.
    #[serde(default)]
    pub prices0to1: Vec<f64>,

    /// Upstream spot prices per pool, token0 per token1. Pass-through.
    #[serde(default)]
    pub prices1to0: Vec<f64>,

    /// Simulations selling token0 for token1 (bid side).
    #[serde(default)]
    pub trades0to1: Vec<TradeRecord>,

    /// Simulations selling token1 for token0 (ask side).
    #[serde(default)]
    pub trades1to0: Vec<TradeRecord>,

    /// Aggregate token0 liquidity per pool.
    #[serde(default)]
    pub aggt0lqdty: Vec<f64>,

    /// Aggregate token1 liquidity per pool.
    #[serde(default)]
    pub aggt1lqdty: Vec<f64>,

    pub pools: Vec<Pool>,

    /// USD reference price of the chain's native asset.
    #[serde(rename = "eth_usd", default)]
    pub usd_reference: f64,

    #[serde(default)]
    pub mpd0to1: MidPriceDescriptor,

    #[serde(default)]
    pub mpd1to0: MidPriceDescriptor,
}

impl Orderbook {
    /// Highest `last_updated_at` across pools.
    pub fn freshest_pool_update(&self) -> u64 {
        self.pools
            .iter()
            .map(|p| p.last_updated_at)
            .max()
            .unwrap_or(0)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}
