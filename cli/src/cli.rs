use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};
use corelib::Side;
use market::presentation::{AxisScale, DisplayConfig, DisplayError};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AxisCli {
    Value,
    Log,
}

#[derive(Debug, Parser)]
#[clap(name = "depthbook", version, about = "Synthetic AMM orderbook viewer")]
pub struct Cli {
    /// Simulation backend base URL (overrides DEPTHBOOK_UPSTREAM_URL)
    #[clap(long, global = true)]
    pub upstream_url: Option<String>,

    /// Request timeout in seconds (overrides DEPTHBOOK_TIMEOUT_SECS)
    #[clap(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Size axis scale
    #[clap(long, value_enum, default_value = "value", global = true)]
    pub y_axis: AxisCli,

    /// Logarithm base when --y-axis=log
    #[clap(long, default_value = "10", global = true)]
    pub log_base: f64,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch one orderbook and print its depth view
    Snapshot {
        token0: String,
        token1: String,

        /// Select a point, e.g. `bid:3` or `ask:0`
        #[clap(long)]
        select: Option<PointRef>,

        /// Print tooltip lines for a point
        #[clap(long)]
        tooltip: Option<PointRef>,

        /// Simulate a single trade of this many token0 instead of the full curve
        #[clap(long)]
        single_point: Option<f64>,
    },

    /// Poll the backend and print a summary on every new snapshot
    Watch {
        token0: String,
        token1: String,

        /// Seconds between refreshes (overrides DEPTHBOOK_REFRESH_SECS)
        #[clap(long)]
        every_secs: Option<u64>,
    },

    /// Build the depth view from a saved backend response
    Replay {
        #[clap(long)]
        file: PathBuf,

        #[clap(long)]
        select: Option<PointRef>,

        #[clap(long)]
        tooltip: Option<PointRef>,
    },
}

impl Cli {
    pub fn display_config(&self) -> Result<DisplayConfig, DisplayError> {
        let y_axis = match self.y_axis {
            AxisCli::Value => AxisScale::Value,
            AxisCli::Log => AxisScale::log(self.log_base)?,
        };
        Ok(DisplayConfig { y_axis })
    }
}

/// `<side>:<index>` into one curve, index in plotted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointRef {
    pub side: Side,
    pub index: usize,
}

impl FromStr for PointRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (side, index) = s
            .split_once(':')
            .ok_or_else(|| format!("expected <bid|ask>:<index>, got {s:?}"))?;

        let side = match side.to_ascii_lowercase().as_str() {
            "bid" | "bids" => Side::Bid,
            "ask" | "asks" => Side::Ask,
            other => return Err(format!("unknown side {other:?}")),
        };

        let index = index
            .parse()
            .map_err(|_| format!("invalid index {index:?}"))?;

        Ok(Self { side, index })
    }
}
