use corelib::{CurvePoint, Side, TradeRecord};
use serde::Serialize;

/// Bid and ask curves sharing one price axis (token1 per token0), each
/// sorted ascending by price.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Curves {
    pub bids: Vec<CurvePoint>,
    pub asks: Vec<CurvePoint>,
}

impl Curves {
    /// Build both curves from already normalized records.
    pub fn build(trades0to1: &[TradeRecord], trades1to0: &[TradeRecord]) -> Self {
        Self {
            bids: build_bids(trades0to1),
            asks: build_asks(trades1to0),
        }
    }

    /// Highest finite bid price. Curves are sorted, so this reads from the
    /// upper boundary.
    pub fn best_bid(&self) -> Option<f64> {
        self.bids.iter().rev().map(|p| p.price).find(|p| p.is_finite())
    }

    /// Lowest finite ask price. A zero-ratio record prices at `inf` and
    /// sorts last, so an ask side made only of those has no best ask.
    pub fn best_ask(&self) -> Option<f64> {
        self.asks.iter().map(|p| p.price).find(|p| p.is_finite())
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    pub fn points(&self, side: Side) -> &[CurvePoint] {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }
}

/// token0 → token1 simulations. The native ratio is already token1 per
/// token0, so it is used as the price directly.
pub fn build_bids(trades: &[TradeRecord]) -> Vec<CurvePoint> {
    let mut points: Vec<CurvePoint> = trades
        .iter()
        .map(|t| point(Side::Bid, t.ratio, t))
        .collect();
    sort_by_price(&mut points);
    points
}

/// token1 → token0 simulations, re-expressed as token1 per token0.
///
/// A zero ratio yields an infinite price. It is kept and sorts last.
pub fn build_asks(trades: &[TradeRecord]) -> Vec<CurvePoint> {
    let mut points: Vec<CurvePoint> = trades
        .iter()
        .map(|t| point(Side::Ask, 1.0 / t.ratio, t))
        .collect();
    sort_by_price(&mut points);
    points
}

/// Output is re-derived from the record's own ratio so the tooltip always
/// agrees with the plotted price, independent of upstream rounding.
fn point(side: Side, price: f64, t: &TradeRecord) -> CurvePoint {
    CurvePoint {
        price,
        input: t.amount,
        side,
        distribution: t.distribution.clone(),
        output: t.ratio * t.amount,
    }
}

/// Stable: equal prices keep upstream (size) order.
fn sort_by_price(points: &mut [CurvePoint]) {
    points.sort_by(|a, b| a.price.total_cmp(&b.price));
}

/// Largest relative gap between the re-derived output (`ratio * amount`)
/// and the `output` reported upstream.
pub fn max_output_drift(trades: &[TradeRecord]) -> f64 {
    trades
        .iter()
        .filter(|t| t.output.abs() > f64::EPSILON)
        .map(|t| ((t.ratio * t.amount - t.output) / t.output).abs())
        .filter(|d| d.is_finite())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(amount: f64, ratio: f64) -> TradeRecord {
        TradeRecord {
            amount,
            output: amount * ratio,
            distribution: vec![60.0, 40.0],
            gas_costs: vec![],
            gas_costs_usd: vec![],
            gas_costs_output: vec![],
            ratio,
        }
    }

    fn prices(points: &[CurvePoint]) -> Vec<f64> {
        points.iter().map(|p| p.price).collect()
    }

    #[test]
    fn bids_use_ratio_as_price() {
        let bids = build_bids(&[rec(1.0, 12.0), rec(2.0, 10.0), rec(3.0, 15.0)]);

        assert_eq!(prices(&bids), vec![10.0, 12.0, 15.0]);
        assert!(bids.iter().all(|p| p.side == Side::Bid));
        assert_eq!(bids[0].output, 20.0);
    }

    #[test]
    fn asks_invert_the_ratio() {
        let asks = build_asks(&[rec(100.0, 1.0 / 16.0), rec(200.0, 1.0 / 20.0), rec(50.0, 1.0 / 18.0)]);

        let p = prices(&asks);
        assert!((p[0] - 16.0).abs() < 1e-9);
        assert!((p[1] - 18.0).abs() < 1e-9);
        assert!((p[2] - 20.0).abs() < 1e-9);
        assert!(asks.iter().all(|p| p.side == Side::Ask));
    }

    #[test]
    fn ties_keep_upstream_order() {
        let bids = build_bids(&[rec(3.0, 10.0), rec(1.0, 10.0), rec(2.0, 10.0)]);
        let inputs: Vec<f64> = bids.iter().map(|p| p.input).collect();
        assert_eq!(inputs, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn zero_ratio_ask_sorts_last() {
        let asks = build_asks(&[rec(1.0, 0.0), rec(1.5, 0.5)]);
        assert_eq!(asks[0].price, 2.0);
        assert!(asks[1].price.is_infinite());
    }

    #[test]
    fn best_bid_and_ask_are_boundary_reads() {
        let curves = Curves {
            bids: build_bids(&[rec(1.0, 10.0), rec(2.0, 12.0), rec(3.0, 15.0)]),
            asks: build_asks(&[rec(1.0, 1.0 / 16.0), rec(2.0, 1.0 / 18.0), rec(3.0, 1.0 / 20.0)]),
        };

        assert_eq!(curves.best_bid(), Some(15.0));
        assert!((curves.best_ask().unwrap() - 16.0).abs() < 1e-9);
    }

    #[test]
    fn infinite_ask_prices_are_not_best_ask() {
        let curves = Curves {
            bids: build_bids(&[rec(1.0, 10.0)]),
            asks: build_asks(&[rec(1.0, 0.0), rec(2.0, 0.5), rec(3.0, 0.0)]),
        };
        assert_eq!(curves.best_ask(), Some(2.0));

        let exhausted = Curves {
            bids: curves.bids.clone(),
            asks: build_asks(&[rec(1.0, 0.0), rec(2.0, 0.0)]),
        };
        assert_eq!(exhausted.best_ask(), None);
        assert_eq!(exhausted.best_bid(), Some(10.0));
    }

    #[test]
    fn empty_inputs_give_empty_curves() {
        let curves = Curves::build(&[], &[]);
        assert!(curves.is_empty());
        assert_eq!(curves.best_bid(), None);
        assert_eq!(curves.best_ask(), None);
    }

    #[test]
    fn drift_detects_upstream_disagreement() {
        let mut t = rec(2.0, 10.0);
        assert_eq!(max_output_drift(&[t.clone()]), 0.0);

        t.output = 19.0;
        let d = max_output_drift(&[t]);
        assert!((d - 1.0 / 19.0).abs() < 1e-12);
    }
}
