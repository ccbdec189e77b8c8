use corelib::{CurvePoint, Side};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::tooltip::axis_label;
use crate::synthesizer::{OrderbookSnapshot, RefreshMarker};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DisplayError {
    #[error("log base must be positive and different from 1, got {0}")]
    InvalidLogBase(f64),
}

/// Scale of the size (y) axes. The price axis is always linear.
///
/// Deserialized values go through [`AxisScale::log`], so a decoded scale
/// always has a usable base.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", try_from = "RawAxisScale")]
pub enum AxisScale {
    Value,
    Log { base: f64 },
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawAxisScale {
    Value,
    Log { base: f64 },
}

impl TryFrom<RawAxisScale> for AxisScale {
    type Error = DisplayError;

    fn try_from(raw: RawAxisScale) -> Result<Self, Self::Error> {
        match raw {
            RawAxisScale::Value => Ok(AxisScale::Value),
            RawAxisScale::Log { base } => AxisScale::log(base),
        }
    }
}

impl AxisScale {
    pub fn log(base: f64) -> Result<Self, DisplayError> {
        if !base.is_finite() || base <= 0.0 || base == 1.0 {
            return Err(DisplayError::InvalidLogBase(base));
        }
        Ok(AxisScale::Log { base })
    }

    /// Re-check a scale built directly from its variant.
    pub fn validate(&self) -> Result<(), DisplayError> {
        match *self {
            AxisScale::Value => Ok(()),
            AxisScale::Log { base } => AxisScale::log(base).map(|_| ()),
        }
    }

    fn admits(&self, v: f64) -> bool {
        match self {
            AxisScale::Value => v.is_finite(),
            AxisScale::Log { .. } => v.is_finite() && v > 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub y_axis: AxisScale,
}

impl DisplayConfig {
    pub fn validate(&self) -> Result<(), DisplayError> {
        self.y_axis.validate()
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            y_axis: AxisScale::Value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepMode {
    Start,
    End,
}

/// `x` is price (token1 per token0), `y` is input size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub x: f64,
    pub y: f64,
    pub point: CurvePoint,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: &'static str,
    pub side: Side,
    pub step: StepMode,
    /// Bids and asks are plotted against separate size axes because their
    /// inputs are denominated in different tokens.
    pub y_axis_index: usize,
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisConfig {
    pub scale: AxisScale,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepthChart {
    pub marker: RefreshMarker,
    pub token0: String,
    pub token1: String,
    pub bids: Series,
    pub asks: Series,
    pub x_axis: AxisConfig,
    /// Axis-label text for `x_axis.min` / `x_axis.max`, price over inverse price.
    pub x_labels: Vec<String>,
    pub y_axes: [AxisConfig; 2],
    pub mid: Option<f64>,
}

/// Loading and no-liquidity are separate states so the UI can show the
/// right placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum DepthView {
    /// No snapshot received yet.
    Pending,
    /// A snapshot exists but neither side has any point.
    Empty { marker: RefreshMarker },
    Ready(Box<DepthChart>),
}

impl DepthView {
    pub fn chart(&self) -> Option<&DepthChart> {
        match self {
            DepthView::Ready(c) => Some(c.as_ref()),
            _ => None,
        }
    }
}

pub fn render(snapshot: Option<&OrderbookSnapshot>, config: &DisplayConfig) -> DepthView {
    let Some(snapshot) = snapshot else {
        return DepthView::Pending;
    };

    if snapshot.curves.is_empty() {
        return DepthView::Empty {
            marker: snapshot.refreshed_at,
        };
    }

    let bids = series(Side::Bid, StepMode::Start, 0, &snapshot.curves.bids);
    let asks = series(Side::Ask, StepMode::End, 1, &snapshot.curves.asks);

    let x_axis = axis(
        AxisScale::Value,
        bids.points.iter().chain(&asks.points).map(|p| p.x),
    );
    let x_labels = [x_axis.min, x_axis.max]
        .into_iter()
        .flatten()
        .map(axis_label)
        .collect();

    let y_axes = [
        axis(config.y_axis, bids.points.iter().map(|p| p.y)),
        axis(config.y_axis, asks.points.iter().map(|p| p.y)),
    ];

    DepthView::Ready(Box::new(DepthChart {
        marker: snapshot.refreshed_at,
        token0: snapshot.orderbook.token0.symbol.clone(),
        token1: snapshot.orderbook.token1.symbol.clone(),
        bids,
        asks,
        x_axis,
        x_labels,
        y_axes,
        mid: snapshot.mpd0to1.mid,
    }))
}

fn series(side: Side, step: StepMode, y_axis_index: usize, points: &[CurvePoint]) -> Series {
    Series {
        name: side.label(),
        side,
        step,
        y_axis_index,
        points: points
            .iter()
            .map(|p| SeriesPoint {
                x: p.price,
                y: p.input,
                point: p.clone(),
            })
            .collect(),
    }
}

/// Data bounds restricted to values the scale can plot.
fn axis(scale: AxisScale, values: impl Iterator<Item = f64>) -> AxisConfig {
    let (min, max) = values
        .filter(|v| scale.admits(*v))
        .fold((None, None), |(lo, hi): (Option<f64>, Option<f64>), v| {
            (
                Some(lo.map_or(v, |l| l.min(v))),
                Some(hi.map_or(v, |h| h.max(v))),
            )
        });

    AxisConfig { scale, min, max }
}
