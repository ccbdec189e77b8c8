mod cli;
mod commands;
mod config;

use clap::Parser;
use common::logger::init_logger;

use crate::cli::{Cli, Command};
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let mut cfg = AppConfig::from_env();
    init_logger("depthbook", cfg.json_logs);

    if let Some(url) = &args.upstream_url {
        cfg.upstream_url = url.clone();
    }
    if let Some(secs) = args.timeout_secs {
        cfg.request_timeout = std::time::Duration::from_secs(secs);
    }

    let display_cfg = args.display_config()?;

    tracing::debug!(upstream = %cfg.upstream_url, display = ?display_cfg, "configuration loaded");

    match args.command {
        Command::Snapshot {
            token0,
            token1,
            select,
            tooltip,
            single_point,
        } => {
            commands::snapshot(&cfg, display_cfg, &token0, &token1, select, tooltip, single_point).await
        }

        Command::Watch {
            token0,
            token1,
            every_secs,
        } => {
            if let Some(secs) = every_secs {
                cfg.refresh_every = std::time::Duration::from_secs(secs.max(1));
            }
            commands::watch(&cfg, display_cfg, &token0, &token1).await
        }

        Command::Replay {
            file,
            select,
            tooltip,
        } => commands::replay(&cfg, display_cfg, &file, select, tooltip).await,
    }
}
