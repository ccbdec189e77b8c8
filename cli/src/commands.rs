use std::sync::Arc;

use adapters::upstream::{HttpOrderbookClient, SinglePointRequest, parse_orderbook_response};
use anyhow::{Context, Result, anyhow};
use corelib::PairTag;
use market::feed::RefreshFeed;
use market::presentation::{DepthView, DisplayConfig};
use market::state::AppState;
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::info;

use crate::cli::PointRef;
use crate::config::AppConfig;

fn client(cfg: &AppConfig) -> Result<HttpOrderbookClient> {
    HttpOrderbookClient::new(&cfg.upstream_url, cfg.request_timeout, &cfg.failure_marker)
        .context("failed to build http client")
}

fn pair_from_args(token0: &str, token1: &str) -> Result<PairTag> {
    let pair = PairTag::new(token0, token1);
    if !pair.is_valid() {
        return Err(anyhow!("token0 and token1 must be two distinct 0x addresses, got {pair}"));
    }
    Ok(pair)
}

/// Depth view plus optional selection and tooltip, as one JSON document.
fn report(state: &mut AppState, select: Option<PointRef>, tooltip: Option<PointRef>) -> Result<Value> {
    let snapshot = state.snapshot();

    let mut out = json!({
        "pair": state.pair().to_string(),
        "view": state.view(),
        "mpd0to1": snapshot.as_ref().map(|s| s.mpd0to1),
        "mpd1to0": snapshot.as_ref().map(|s| s.mpd1to0),
        "notices": state.notices().collect::<Vec<_>>(),
    });

    if let Some(p) = tooltip {
        out["tooltip"] = json!(state.tooltip_at(p.side, p.index)?);
    }

    if let Some(p) = select {
        out["selection"] = serde_json::to_value(state.select_at(p.side, p.index)?)?;
    }

    Ok(out)
}

pub async fn snapshot(
    cfg: &AppConfig,
    display: DisplayConfig,
    token0: &str,
    token1: &str,
    select: Option<PointRef>,
    tooltip: Option<PointRef>,
    single_point: Option<f64>,
) -> Result<()> {
    let pair = pair_from_args(token0, token1)?;
    let source = client(cfg)?;

    let sps = single_point.map(|amount| SinglePointRequest {
        input: pair.token0.clone(),
        amount,
    });

    let mut state = AppState::new(pair, display)?;
    let ticket = state.begin_refresh();
    let result = source.fetch_with(&ticket.pair, sps).await;
    state.complete_refresh(&ticket, result);

    println!("{}", serde_json::to_string_pretty(&report(&mut state, select, tooltip)?)?);
    Ok(())
}

pub async fn replay(
    cfg: &AppConfig,
    display: DisplayConfig,
    file: &std::path::Path,
    select: Option<PointRef>,
    tooltip: Option<PointRef>,
) -> Result<()> {
    let body = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;

    let orderbook = parse_orderbook_response(200, &body, &cfg.failure_marker)
        .with_context(|| format!("{} does not hold a usable orderbook", file.display()))?;

    let pair = PairTag::new(&orderbook.token0.address, &orderbook.token1.address);
    let mut state = AppState::new(pair, display)?;
    let ticket = state.begin_refresh();
    state.complete_refresh(&ticket, Ok(orderbook));

    println!("{}", serde_json::to_string_pretty(&report(&mut state, select, tooltip)?)?);
    Ok(())
}

pub async fn watch(cfg: &AppConfig, display: DisplayConfig, token0: &str, token1: &str) -> Result<()> {
    let pair = pair_from_args(token0, token1)?;
    let source = Arc::new(client(cfg)?);
    let state = Arc::new(RwLock::new(AppState::new(pair, display)?));

    let feed = RefreshFeed::new(source, Arc::clone(&state));
    let mut markers = feed.subscribe();
    let mut failures = feed.subscribe_failures();
    let every = cfg.refresh_every;

    let handle = tokio::spawn(feed.run(every));

    loop {
        tokio::select! {
            changed = markers.changed() => {
                if changed.is_err() {
                    break;
                }
                let guard = state.read().await;
                println!("{}", summary_line(&guard));
            }
            changed = failures.changed() => {
                if changed.is_err() {
                    break;
                }
                for notice in state.write().await.drain_notices() {
                    println!("{}", json!({ "notice": notice }));
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    handle.abort();
    Ok(())
}

fn summary_line(state: &AppState) -> Value {
    let view = state.view();
    let snapshot = state.snapshot();

    let (bids, asks) = match &view {
        DepthView::Ready(chart) => (chart.bids.points.len(), chart.asks.points.len()),
        _ => (0, 0),
    };

    json!({
        "pair": state.pair().to_string(),
        "marker": snapshot.as_ref().map(|s| s.refreshed_at.0),
        "block": snapshot.as_ref().map(|s| s.orderbook.block),
        "bids": bids,
        "asks": asks,
        "best_bid": snapshot.as_ref().and_then(|s| s.mpd0to1.best_bid),
        "best_ask": snapshot.as_ref().and_then(|s| s.mpd0to1.best_ask),
        "spread_pct": snapshot.as_ref().and_then(|s| s.mpd0to1.spread_pct),
        "liquidity": snapshot.as_ref().map(|s| s.liquidity),
    })
}
