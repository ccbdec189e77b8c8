use std::time::Duration;

use async_trait::async_trait;
use corelib::{Orderbook, PairTag};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, instrument};

use super::OrderbookSource;
use super::errors::FetchError;
use super::response::parse_orderbook_response;

/// Body of `POST {base}/orderbook`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderbookRequest {
    /// `"<token0>-<token1>"`
    pub tag: String,

    /// Optional single-point simulation instead of the full curve.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sps: Option<SinglePointRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SinglePointRequest {
    /// Address of the token being sold.
    pub input: String,
    pub amount: f64,
}

#[derive(Clone)]
pub struct HttpOrderbookClient {
    http: Client,
    base_url: String,
    failure_marker: String,
}

impl HttpOrderbookClient {
    /// Simulations can take tens of seconds server-side, so `timeout` should
    /// be generous (the CLI defaults to 60s).
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        failure_marker: impl Into<String>,
    ) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            failure_marker: failure_marker.into(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/orderbook", self.base_url)
    }

    /// Build the request body, rejecting pairs that are not two distinct
    /// well-formed addresses before anything goes on the wire.
    pub fn request_for(
        pair: &PairTag,
        sps: Option<SinglePointRequest>,
    ) -> Result<OrderbookRequest, FetchError> {
        if !pair.is_valid() {
            return Err(FetchError::InvalidAddress(pair.to_string()));
        }

        Ok(OrderbookRequest {
            tag: pair.to_string(),
            sps,
        })
    }

    #[instrument(skip(self, sps), fields(pair = %pair), level = "debug")]
    pub async fn fetch_with(
        &self,
        pair: &PairTag,
        sps: Option<SinglePointRequest>,
    ) -> Result<Orderbook, FetchError> {
        let body = Self::request_for(pair, sps)?;

        let resp = self.http.post(self.endpoint()).json(&body).send().await?;

        let status = resp.status().as_u16();
        let text = resp.text().await?;

        debug!(status, bytes = text.len(), "orderbook response received");

        parse_orderbook_response(status, &text, &self.failure_marker)
    }
}

#[async_trait]
impl OrderbookSource for HttpOrderbookClient {
    async fn fetch_orderbook(&self, pair: &PairTag) -> Result<Orderbook, FetchError> {
        self.fetch_with(pair, None).await
    }
}
