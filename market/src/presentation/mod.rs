//! Rendering-facing projection of a snapshot.
//!
//! Everything here is a pure function of `(snapshot, DisplayConfig)`; axis
//! changes never touch the curves themselves.

pub mod depth;
pub mod tooltip;

pub use depth::{
    AxisConfig, AxisScale, DepthChart, DepthView, DisplayConfig, DisplayError, Series,
    SeriesPoint, StepMode, render,
};
pub use tooltip::{format_amount, tooltip_lines};
