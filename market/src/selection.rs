//! Selection Bridge
//!
//! Projects a clicked curve point back into swap-composer inputs. Pure and
//! idempotent: the same point over the same snapshot always yields the same
//! value, and the snapshot is only read.

use corelib::{CurvePoint, Pool, Side, Token};
use serde::Serialize;

use crate::synthesizer::{OrderbookSnapshot, RefreshMarker};

/// Payload handed to the swap composer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub datapoint: CurvePoint,
    pub bids_pools: Vec<Pool>,
    pub asks_pools: Vec<Pool>,
}

/// What the composer fields should show after a click.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposerInputs {
    pub side: Side,
    pub sell_token: Token,
    pub buy_token: Token,
    pub sell_amount: f64,
    pub buy_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionOutcome {
    /// Snapshot the selection was taken from.
    pub marker: RefreshMarker,
    pub selection: Selection,
    pub composer: ComposerInputs,
}

/// BID: sell `input` token0, buy `output` token1. ASK: the reverse.
pub fn select(point: &CurvePoint, snapshot: &OrderbookSnapshot) -> SelectionOutcome {
    let ob = &snapshot.orderbook;

    let (sell_token, buy_token) = match point.side {
        Side::Bid => (ob.token0.clone(), ob.token1.clone()),
        Side::Ask => (ob.token1.clone(), ob.token0.clone()),
    };

    SelectionOutcome {
        marker: snapshot.refreshed_at,
        selection: Selection {
            datapoint: point.clone(),
            // both directions route through the same pool set
            bids_pools: ob.pools.clone(),
            asks_pools: ob.pools.clone(),
        },
        composer: ComposerInputs {
            side: point.side,
            sell_token,
            buy_token,
            sell_amount: point.input,
            buy_amount: point.output,
        },
    }
}

/// Point at `index` on one side, in plotted (price-ascending) order.
pub fn point_at(snapshot: &OrderbookSnapshot, side: Side, index: usize) -> Option<&CurvePoint> {
    snapshot.curves.points(side).get(index)
}
