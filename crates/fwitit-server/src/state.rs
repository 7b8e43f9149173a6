//! Application State

use std::sync::Arc;

use fwitit_core::{
    FallbackPolicy, MarketClients, MarketDataClient, RecommendationFetcher, RecommendationStore,
    TradeExecutor,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Signal source (live service or demo deck)
    pub market: Arc<dyn MarketDataClient>,

    /// Order submission for user-confirmed trades
    pub executor: Arc<dyn TradeExecutor>,

    /// Fetch cycle with the configured fallback policy
    pub fetcher: RecommendationFetcher,

    /// Provider state shared by every request
    pub store: Arc<RecommendationStore>,
}

impl AppState {
    pub fn new(clients: MarketClients, policy: FallbackPolicy) -> Self {
        Self {
            fetcher: RecommendationFetcher::new(clients.data.clone(), policy),
            market: clients.data,
            executor: clients.executor,
            store: Arc::new(RecommendationStore::new()),
        }
    }
}
