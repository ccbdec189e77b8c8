//! Refresh feed
//!
//! Polls an [`OrderbookSource`] for the current pair and pushes the results
//! into a shared [`AppState`].
//!
//! Data flow:
//! Source → RefreshFeed → AppState (synthesizer) → watch channel of markers
//!
//! Failed cycles leave the snapshot alone and queue a notice in the state;
//! the running count of failures is published on a second channel so a
//! consumer knows when to drain notices.
//!
//! The loop is sequential, so there is never more than one fetch in flight
//! per pair. The state lock is not held while the request is outstanding.

use std::sync::Arc;
use std::time::Duration;

use adapters::upstream::OrderbookSource;
use common::logger::{TraceId, annotate_span, refresh_span, warn_if_slow};
use tokio::sync::{RwLock, watch};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{Instrument, debug, info};

use crate::state::AppState;
use crate::synthesizer::{ApplyOutcome, RefreshMarker};

pub type SharedState = Arc<RwLock<AppState>>;

/// Fetches slower than this are reported on the `performance` target.
const SLOW_FETCH: Duration = Duration::from_secs(10);

/// Result of one refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Published(RefreshMarker),
    Unchanged(RefreshMarker),
    Superseded,
    Failed,
}

impl From<Option<ApplyOutcome>> for RefreshOutcome {
    fn from(o: Option<ApplyOutcome>) -> Self {
        match o {
            Some(ApplyOutcome::Published(m)) => RefreshOutcome::Published(m),
            Some(ApplyOutcome::Unchanged(m)) => RefreshOutcome::Unchanged(m),
            Some(ApplyOutcome::Superseded) => RefreshOutcome::Superseded,
            None => RefreshOutcome::Failed,
        }
    }
}

pub struct RefreshFeed<S> {
    source: Arc<S>,
    state: SharedState,
    markers: watch::Sender<Option<RefreshMarker>>,
    failures: watch::Sender<u64>,
}

impl<S: OrderbookSource> RefreshFeed<S> {
    pub fn new(source: Arc<S>, state: SharedState) -> Self {
        let (markers, _) = watch::channel(None);
        let (failures, _) = watch::channel(0);
        Self {
            source,
            state,
            markers,
            failures,
        }
    }

    /// Receives the marker of every newly published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Option<RefreshMarker>> {
        self.markers.subscribe()
    }

    /// Receives the number of failed cycles so far. Each bump means at least
    /// one new notice is waiting in the state.
    pub fn subscribe_failures(&self) -> watch::Receiver<u64> {
        self.failures.subscribe()
    }

    /// One fetch-and-apply cycle.
    pub async fn refresh_once(&self) -> RefreshOutcome {
        let ticket = self.state.write().await.begin_refresh();
        let trace_id = TraceId::new();
        let span = refresh_span(&ticket.pair.to_string(), &trace_id);

        async {
            let result = warn_if_slow(
                "orderbook_fetch",
                SLOW_FETCH,
                self.source.fetch_orderbook(&ticket.pair),
            )
            .await;

            let outcome: RefreshOutcome = self
                .state
                .write()
                .await
                .complete_refresh(&ticket, result)
                .into();

            match outcome {
                RefreshOutcome::Published(marker) => {
                    annotate_span(marker.0);
                    self.markers.send_replace(Some(marker));
                }
                RefreshOutcome::Failed => {
                    self.failures.send_modify(|n| *n += 1);
                }
                other => debug!(outcome = ?other, "nothing new to publish"),
            }

            outcome
        }
        .instrument(span)
        .await
    }

    /// Refresh on a fixed cadence. Never returns; abort the task to stop it.
    pub async fn run(self, every: Duration) {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let pair = self.state.read().await.pair().clone();
        info!(
            pair = %pair,
            every_ms = every.as_millis() as u64,
            "orderbook refresh feed started"
        );

        loop {
            ticker.tick().await;
            self.refresh_once().await;
        }
    }
}
