//! Orderbook Synthesizer
//!
//! Owns the current snapshot for one pair and decides which upstream payloads
//! are allowed to replace it.
//!
//! ## Refresh lifecycle
//!
//! ```text
//! begin_refresh() -> FetchTicket { pair, seq }
//!        ... fetch happens elsewhere ...
//! apply(ticket, orderbook) -> Published | Unchanged | Superseded
//! ```
//!
//! - Tickets carry a sequence number. A payload is accepted only if its
//!   ticket is newer than the last one applied and targets the current pair;
//!   late answers to older requests are discarded.
//! - A payload identical to the current book is reported as `Unchanged`
//!   and does not move the refresh marker.
//! - Every published snapshot gets a strictly increasing [`RefreshMarker`].
//!   Subscribers compare markers instead of snapshot contents.
//! - Snapshots are immutable and shared behind `Arc`. Curves are built once
//!   here and reused by every render.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use corelib::{MidPriceDescriptor, Orderbook, PairTag};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::book::curve::max_output_drift;
use crate::book::{Curves, dedup_by_input};

/// Upstream outputs further than this (relative) from `ratio * amount` are
/// reported in the logs.
const OUTPUT_DRIFT_TOLERANCE: f64 = 1e-6;

/// Monotonic "refreshed at" counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RefreshMarker(pub u64);

impl fmt::Display for RefreshMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle for one in-flight fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub pair: PairTag,
    pub seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Published(RefreshMarker),
    Unchanged(RefreshMarker),
    Superseded,
}

/// Pooled liquidity summed across every pool of the pair.
///
/// Bid-side sellers draw on `token1`, ask-side sellers on `token0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LiquiditySummary {
    pub token0: f64,
    pub token1: f64,
}

impl LiquiditySummary {
    fn from_orderbook(orderbook: &Orderbook) -> Self {
        let total = |v: &[f64]| v.iter().copied().filter(|x| x.is_finite()).sum();
        Self {
            token0: total(&orderbook.aggt0lqdty),
            token1: total(&orderbook.aggt1lqdty),
        }
    }
}

/// Immutable, render-ready view of one orderbook.
#[derive(Debug, Clone, Serialize)]
pub struct OrderbookSnapshot {
    pub pair: PairTag,

    /// Book with deduplicated trades and recomputed descriptors.
    pub orderbook: Orderbook,

    pub curves: Curves,

    /// Descriptor in token1 per token0.
    pub mpd0to1: MidPriceDescriptor,

    /// Same book in token0 per token1.
    pub mpd1to0: MidPriceDescriptor,

    pub liquidity: LiquiditySummary,

    pub refreshed_at: RefreshMarker,
    pub received_at: DateTime<Utc>,
}

impl OrderbookSnapshot {
    pub fn has_liquidity(&self) -> bool {
        self.mpd0to1.has_liquidity()
    }
}

/// Deduplicate, build curves and compute descriptors for one payload.
///
/// Never fails: empty or one-sided books produce empty curves and undefined
/// descriptors.
pub fn synthesize(pair: PairTag, mut orderbook: Orderbook, marker: RefreshMarker) -> OrderbookSnapshot {
    orderbook.trades0to1 = dedup_by_input(std::mem::take(&mut orderbook.trades0to1));
    orderbook.trades1to0 = dedup_by_input(std::mem::take(&mut orderbook.trades1to0));

    let drift = max_output_drift(&orderbook.trades0to1).max(max_output_drift(&orderbook.trades1to0));
    if drift > OUTPUT_DRIFT_TOLERANCE {
        debug!(drift, "upstream output differs from ratio * amount");
    }

    let curves = Curves::build(&orderbook.trades0to1, &orderbook.trades1to0);

    let mpd0to1 = MidPriceDescriptor::from_boundaries(curves.best_bid(), curves.best_ask());
    let mpd1to0 = mpd0to1.inverted();

    orderbook.mpd0to1 = mpd0to1;
    orderbook.mpd1to0 = mpd1to0;

    let liquidity = LiquiditySummary::from_orderbook(&orderbook);

    OrderbookSnapshot {
        pair,
        orderbook,
        curves,
        mpd0to1,
        mpd1to0,
        liquidity,
        refreshed_at: marker,
        received_at: Utc::now(),
    }
}

pub struct OrderbookSynthesizer {
    pair: PairTag,
    current: Option<Arc<OrderbookSnapshot>>,

    /// Raw payload behind `current`, for change detection.
    last_payload: Option<Orderbook>,

    issued_seq: u64,
    applied_seq: u64,
    marker: u64,
}

impl OrderbookSynthesizer {
    pub fn new(pair: PairTag) -> Self {
        Self {
            pair,
            current: None,
            last_payload: None,
            issued_seq: 0,
            applied_seq: 0,
            marker: 0,
        }
    }

    pub fn pair(&self) -> &PairTag {
        &self.pair
    }

    pub fn current(&self) -> Option<Arc<OrderbookSnapshot>> {
        self.current.clone()
    }

    pub fn marker(&self) -> Option<RefreshMarker> {
        self.current.as_ref().map(|s| s.refreshed_at)
    }

    /// Switch to another pair. The current snapshot is dropped and every
    /// outstanding ticket becomes stale.
    pub fn switch_pair(&mut self, pair: PairTag) {
        if pair == self.pair {
            return;
        }
        info!(from = %self.pair, to = %pair, "pair switched");
        self.pair = pair;
        self.current = None;
        self.last_payload = None;
        self.applied_seq = self.issued_seq;
    }

    pub fn begin_refresh(&mut self) -> FetchTicket {
        self.issued_seq += 1;
        FetchTicket {
            pair: self.pair.clone(),
            seq: self.issued_seq,
        }
    }

    /// Offer a completed payload. See the module docs for the acceptance rules.
    #[instrument(
        target = "synthesizer",
        skip(self, orderbook),
        fields(pair = %ticket.pair, seq = ticket.seq)
    )]
    pub fn apply(&mut self, ticket: &FetchTicket, orderbook: Orderbook) -> ApplyOutcome {
        if ticket.pair != self.pair || ticket.seq <= self.applied_seq {
            debug!(applied_seq = self.applied_seq, "discarding superseded payload");
            return ApplyOutcome::Superseded;
        }
        self.applied_seq = ticket.seq;

        if let (Some(current), Some(last)) = (&self.current, &self.last_payload)
            && *last == orderbook
        {
            debug!(marker = %current.refreshed_at, "payload unchanged");
            return ApplyOutcome::Unchanged(current.refreshed_at);
        }

        self.marker += 1;
        let marker = RefreshMarker(self.marker);

        let snapshot = synthesize(self.pair.clone(), orderbook.clone(), marker);

        info!(
            %marker,
            bids = snapshot.curves.bids.len(),
            asks = snapshot.curves.asks.len(),
            best_bid = ?snapshot.mpd0to1.best_bid,
            best_ask = ?snapshot.mpd0to1.best_ask,
            block = snapshot.orderbook.block,
            pools_updated_at = snapshot.orderbook.freshest_pool_update(),
            "orderbook snapshot published"
        );

        self.current = Some(Arc::new(snapshot));
        self.last_payload = Some(orderbook);

        ApplyOutcome::Published(marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::{Token, TradeRecord};

    fn token(addr: &str, symbol: &str) -> Token {
        Token {
            address: addr.into(),
            decimals: 18,
            symbol: symbol.into(),
            gas: String::new(),
        }
    }

    fn rec(amount: f64, ratio: f64) -> TradeRecord {
        TradeRecord {
            amount,
            output: amount * ratio,
            distribution: vec![],
            gas_costs: vec![],
            gas_costs_usd: vec![],
            gas_costs_output: vec![],
            ratio,
        }
    }

    fn book(bids: &[f64], asks: &[f64]) -> Orderbook {
        Orderbook {
            token0: token("0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", "WETH"),
            token1: token("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "USDC"),
            block: 1,
            timestamp: 0,
            prices0to1: vec![],
            prices1to0: vec![],
            trades0to1: bids
                .iter()
                .enumerate()
                .map(|(i, p)| rec(i as f64 + 1.0, *p))
                .collect(),
            trades1to0: asks
                .iter()
                .enumerate()
                .map(|(i, p)| rec(i as f64 + 1.0, 1.0 / p))
                .collect(),
            aggt0lqdty: vec![],
            aggt1lqdty: vec![],
            pools: vec![],
            usd_reference: 0.0,
            mpd0to1: MidPriceDescriptor::default(),
            mpd1to0: MidPriceDescriptor::default(),
        }
    }

    fn pair() -> PairTag {
        PairTag::new(
            "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
            "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
        )
    }

    #[test]
    fn boundary_descriptors() {
        let snap = synthesize(pair(), book(&[10.0, 12.0, 15.0], &[16.0, 18.0, 20.0]), RefreshMarker(1));
        let d = snap.mpd0to1;

        assert_eq!(d.best_bid, Some(15.0));
        assert!((d.best_ask.unwrap() - 16.0).abs() < 1e-9);
        assert!((d.mid.unwrap() - 15.5).abs() < 1e-9);
        assert!((d.spread.unwrap() - 1.0).abs() < 1e-9);
        assert!((d.spread_pct.unwrap() - 0.0645).abs() < 1e-4);

        let inv = snap.mpd1to0;
        assert!((inv.best_bid.unwrap() - 1.0 / 16.0).abs() < 1e-12);
        assert!((inv.best_ask.unwrap() - 1.0 / 15.0).abs() < 1e-12);

        assert_eq!(snap.orderbook.mpd0to1, d);
    }

    #[test]
    fn liquidity_sums_pools_and_skips_non_finite() {
        let mut ob = book(&[10.0], &[11.0]);
        ob.aggt0lqdty = vec![1.5, 2.5, f64::NAN];
        ob.aggt1lqdty = vec![3000.0, f64::INFINITY, 1000.0];

        let snap = synthesize(pair(), ob, RefreshMarker(1));

        assert_eq!(snap.liquidity, LiquiditySummary { token0: 4.0, token1: 4000.0 });
    }

    #[test]
    fn spot_prices_pass_through_to_snapshot() {
        let mut ob = book(&[10.0], &[11.0]);
        ob.prices0to1 = vec![10.4, 10.6];
        ob.prices1to0 = vec![0.096, 0.094];

        let snap = synthesize(pair(), ob, RefreshMarker(1));

        assert_eq!(snap.orderbook.prices0to1, vec![10.4, 10.6]);
        assert_eq!(snap.orderbook.prices1to0, vec![0.096, 0.094]);
        assert_eq!(snap.mpd0to1.best_bid, Some(10.0));
    }

    #[test]
    fn empty_book_has_undefined_descriptors() {
        let snap = synthesize(pair(), book(&[], &[]), RefreshMarker(1));

        assert_eq!(snap.mpd0to1, MidPriceDescriptor::default());
        assert_eq!(snap.mpd1to0, MidPriceDescriptor::default());
        assert!(!snap.has_liquidity());
        assert!(snap.curves.is_empty());
    }

    #[test]
    fn exhausted_ask_side_reads_as_no_liquidity() {
        let mut ob = book(&[10.0, 12.0], &[]);
        ob.trades1to0 = vec![rec(1.0, 0.0), rec(2.0, 0.0)];

        let snap = synthesize(pair(), ob, RefreshMarker(1));

        assert_eq!(snap.curves.asks.len(), 2);
        assert_eq!(snap.mpd0to1, MidPriceDescriptor::default());
        assert_eq!(snap.mpd1to0, MidPriceDescriptor::default());
        assert!(!snap.has_liquidity());
    }

    #[test]
    fn one_sided_book_has_undefined_descriptors() {
        let snap = synthesize(pair(), book(&[10.0], &[]), RefreshMarker(1));
        assert_eq!(snap.mpd0to1.mid, None);
        assert_eq!(snap.curves.bids.len(), 1);
    }

    #[test]
    fn markers_increase_on_publish() {
        let mut s = OrderbookSynthesizer::new(pair());

        let t1 = s.begin_refresh();
        assert_eq!(s.apply(&t1, book(&[10.0], &[11.0])), ApplyOutcome::Published(RefreshMarker(1)));

        let t2 = s.begin_refresh();
        assert_eq!(s.apply(&t2, book(&[10.5], &[11.0])), ApplyOutcome::Published(RefreshMarker(2)));

        assert_eq!(s.marker(), Some(RefreshMarker(2)));
    }

    #[test]
    fn identical_payload_is_unchanged() {
        let mut s = OrderbookSynthesizer::new(pair());

        let t1 = s.begin_refresh();
        s.apply(&t1, book(&[10.0], &[11.0]));
        let before = s.current().unwrap();

        let t2 = s.begin_refresh();
        assert_eq!(s.apply(&t2, book(&[10.0], &[11.0])), ApplyOutcome::Unchanged(RefreshMarker(1)));
        assert!(Arc::ptr_eq(&before, &s.current().unwrap()));
    }

    #[test]
    fn late_answer_to_older_ticket_is_discarded() {
        let mut s = OrderbookSynthesizer::new(pair());

        let old = s.begin_refresh();
        let new = s.begin_refresh();

        assert_eq!(s.apply(&new, book(&[12.0], &[13.0])), ApplyOutcome::Published(RefreshMarker(1)));
        assert_eq!(s.apply(&old, book(&[10.0], &[11.0])), ApplyOutcome::Superseded);
        assert_eq!(s.current().unwrap().mpd0to1.best_bid, Some(12.0));
    }

    #[test]
    fn older_ticket_completing_first_is_still_accepted() {
        let mut s = OrderbookSynthesizer::new(pair());

        let old = s.begin_refresh();
        let _new = s.begin_refresh();

        assert!(matches!(s.apply(&old, book(&[10.0], &[11.0])), ApplyOutcome::Published(_)));
    }

    #[test]
    fn same_ticket_cannot_apply_twice() {
        let mut s = OrderbookSynthesizer::new(pair());
        let t = s.begin_refresh();

        s.apply(&t, book(&[10.0], &[11.0]));
        assert_eq!(s.apply(&t, book(&[9.0], &[11.0])), ApplyOutcome::Superseded);
    }

    #[test]
    fn switching_pair_invalidates_outstanding_tickets() {
        let mut s = OrderbookSynthesizer::new(pair());
        let t = s.begin_refresh();
        s.apply(&t, book(&[10.0], &[11.0]));

        let in_flight = s.begin_refresh();
        s.switch_pair(PairTag::new(
            "0x6b175474e89094c44da98b954eedeac495271d0f",
            "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
        ));

        assert!(s.current().is_none());
        assert_eq!(s.apply(&in_flight, book(&[10.0], &[11.0])), ApplyOutcome::Superseded);

        let fresh = s.begin_refresh();
        assert_eq!(s.apply(&fresh, book(&[1.0], &[1.1])), ApplyOutcome::Published(RefreshMarker(2)));
    }
}
