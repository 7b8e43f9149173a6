//! Market Data Integration
//!
//! Abstractions over the remote market data and execution service.

mod demo;
mod http;

pub use demo::{DemoMarketClient, demo_signal};
pub use http::HttpMarketClient;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::MarketConfig;
use crate::error::Result;
use crate::model::MarketSignal;
use crate::trade::{Account, Position, TradeReceipt, TradeRequest};

/// Source of raw market signals (Strategy pattern)
///
/// Implemented by the live HTTP client and by the demo data source.
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    /// Fetch the current signal for the next recommendation card
    async fn fetch_signal(&self) -> Result<MarketSignal>;

    /// Check if the service is available
    async fn health_check(&self) -> bool;

    /// Client name
    fn name(&self) -> &str;
}

/// Submits user-confirmed orders and reports what they left behind
#[async_trait]
pub trait TradeExecutor: Send + Sync {
    async fn execute_trade(&self, request: &TradeRequest) -> Result<TradeReceipt>;

    /// Current position in `symbol`, `None` when nothing is held
    async fn get_position(&self, symbol: &str) -> Result<Option<Position>>;

    async fn get_account(&self) -> Result<Account>;
}

/// Signal source and trade executor backed by the same service
#[derive(Clone)]
pub struct MarketClients {
    pub data: Arc<dyn MarketDataClient>,
    pub executor: Arc<dyn TradeExecutor>,
}

impl MarketClients {
    fn shared<T: MarketDataClient + TradeExecutor + 'static>(client: T) -> Self {
        let client = Arc::new(client);
        Self {
            data: client.clone(),
            executor: client,
        }
    }

    /// Pick the live client when a base URL is configured, demo data otherwise
    pub fn from_config(config: &MarketConfig) -> Result<Self> {
        match &config.base_url {
            Some(url) => {
                tracing::info!("Using market service at {}", url);
                Ok(Self::shared(HttpMarketClient::new(url, config.timeout())?))
            }
            None => {
                tracing::info!("No market service configured, serving demo data");
                Ok(Self::shared(DemoMarketClient::new()))
            }
        }
    }
}
