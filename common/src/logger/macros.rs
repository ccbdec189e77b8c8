use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{Span, field};

use super::TraceId;

/// Root span for one refresh of one pair.
///
/// `marker` is left empty and recorded once a snapshot is published.
pub fn refresh_span(pair: &str, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "refresh",
        trace_id = %trace_id,
        pair = %pair,
        marker = field::Empty
    )
}

/// Record the published refresh marker on the current span.
pub fn annotate_span(marker: u64) {
    Span::current().record("marker", marker);
}

/// Await `fut` and warn on the `performance` target if it took longer than `max`.
pub async fn warn_if_slow<F, T>(label: &'static str, max: Duration, fut: F) -> T
where
    F: Future<Output = T>,
{
    let start = Instant::now();
    let out = fut.await;
    let elapsed = start.elapsed();
    if elapsed > max {
        tracing::warn!(
            target: "performance",
            label = label,
            elapsed_ms = elapsed.as_millis() as u64,
            "slow operation detected"
        );
    }
    out
}
