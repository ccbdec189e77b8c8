use serde::{Deserialize, Serialize};

/// Side of the synthetic book, from the liquidity provider's point of view.
///
/// `Bid`: the trader sells token0 for token1 (LPs are buying token0).
/// `Ask`: the trader sells token1 for token0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    #[default]
    Bid,
    Ask,
}

impl Side {
    pub fn label(&self) -> &'static str {
        match self {
            Side::Bid => "Bids",
            Side::Ask => "Asks",
        }
    }
}

/// One plotted point of the depth chart.
///
/// `price` is always expressed in token1 per token0 regardless of side.
/// `input` is in the sold asset and `output` in the bought asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub price: f64,
    pub input: f64,
    pub side: Side,
    pub distribution: Vec<f64>,
    pub output: f64,
}
