pub mod client;
pub mod errors;
pub mod response;
pub mod schema;

use async_trait::async_trait;
use corelib::{Orderbook, PairTag};

pub use client::{HttpOrderbookClient, OrderbookRequest, SinglePointRequest};
pub use errors::FetchError;
pub use response::{DEFAULT_FAILURE_MARKER, parse_orderbook_response};

/// Source of simulated orderbooks for a token pair.
///
/// Implementations return a payload that already passed schema validation;
/// consumers never see structurally broken data.
#[async_trait]
pub trait OrderbookSource: Send + Sync {
    async fn fetch_orderbook(&self, pair: &PairTag) -> Result<Orderbook, FetchError>;
}
