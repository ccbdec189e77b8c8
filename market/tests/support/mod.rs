#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use adapters::upstream::{FetchError, OrderbookSource};
use corelib::{MidPriceDescriptor, Orderbook, PairTag, Pool, Token, TradeRecord};

pub const WETH: &str = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";
pub const USDC: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";

pub fn pair() -> PairTag {
    PairTag::new(WETH, USDC)
}

pub fn token(addr: &str, symbol: &str, decimals: u32) -> Token {
    Token {
        address: addr.into(),
        decimals,
        symbol: symbol.into(),
        gas: "30000".into(),
    }
}

pub fn pool(protocol: &str, fee_hex: &str) -> Pool {
    Pool {
        address: format!("0x{protocol}"),
        id: format!("0x{protocol}"),
        tokens: vec![token(USDC, "USDC", 6), token(WETH, "WETH", 18)],
        protocol_system: protocol.into(),
        protocol_type_name: format!("{protocol}_pool"),
        contract_ids: vec![],
        static_attributes: vec![("fee".into(), fee_hex.into())],
        creation_tx: String::new(),
        fee: 0.0,
        last_updated_at: 0,
    }
}

pub fn pools() -> Vec<Pool> {
    vec![
        pool("uniswap_v2", "0x1e"),
        pool("uniswap_v3", "0x01f4"),
        pool("sushiswap_v2", "0x1e"),
        pool("pancakeswap_v3", "0x64"),
    ]
}

pub fn trade(amount: f64, ratio: f64, distribution: [f64; 4]) -> TradeRecord {
    TradeRecord {
        amount,
        output: amount * ratio,
        distribution: distribution.to_vec(),
        gas_costs: vec![120_000; 4],
        gas_costs_usd: vec![0.15; 4],
        gas_costs_output: vec![0.0; 4],
        ratio,
    }
}

/// Bid prices as given, ask prices as given in token1/token0 (ratios are
/// inverted when building the 1→0 records).
pub fn orderbook(bid_prices: &[f64], ask_prices: &[f64]) -> Orderbook {
    let dist = [20.0, 30.0, 0.0, 50.0];
    Orderbook {
        token0: token(WETH, "WETH", 18),
        token1: token(USDC, "USDC", 6),
        block: 21_000_000,
        timestamp: 1_700_000_000,
        prices0to1: vec![],
        prices1to0: vec![],
        trades0to1: bid_prices
            .iter()
            .enumerate()
            .map(|(i, p)| trade(i as f64 + 1.0, *p, dist))
            .collect(),
        trades1to0: ask_prices
            .iter()
            .enumerate()
            .map(|(i, p)| trade((i as f64 + 1.0) * 1000.0, 1.0 / p, dist))
            .collect(),
        aggt0lqdty: vec![10.0; 4],
        aggt1lqdty: vec![20_000.0; 4],
        pools: pools(),
        usd_reference: 1960.02,
        mpd0to1: MidPriceDescriptor::default(),
        mpd1to0: MidPriceDescriptor::default(),
    }
}

/// Source that replays a scripted list of results, then keeps failing.
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<Orderbook, FetchError>>>,
    pub calls: Mutex<usize>,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<Orderbook, FetchError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl OrderbookSource for ScriptedSource {
    async fn fetch_orderbook(&self, _pair: &PairTag) -> Result<Orderbook, FetchError> {
        *self.calls.lock().unwrap() += 1;
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Status(503)))
    }
}
